use std::fmt;
use std::io;
use std::path::PathBuf;

/// How the coordinator schedules extractions within one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Discipline {
    /// One file at a time, in scan order.
    Sequential,
    /// `.docx` parsing runs in parallel; automation stays on the dispatch loop.
    #[default]
    Concurrent,
}

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("folder not found: {0}")]
    NotFound(PathBuf),
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("folder {path} is not readable: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("failed to start extraction runtime: {0}")]
    Runtime(#[source] io::Error),
}

/// Per-file failure. Caught by the coordinator and never propagated further.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionError {
    pub file_name: String,
    pub cause: ExtractionCause,
    pub message: String,
}

impl ExtractionError {
    pub(crate) fn new(
        file_name: impl Into<String>,
        cause: ExtractionCause,
        message: impl Into<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            cause,
            message: message.into(),
        }
    }
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.file_name, self.cause, self.message)
    }
}

impl std::error::Error for ExtractionError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionCause {
    ReadFailure,
    ParseFailure,
    AutomationFailure,
}

impl fmt::Display for ExtractionCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionCause::ReadFailure => write!(f, "read failure"),
            ExtractionCause::ParseFailure => write!(f, "parse failure"),
            ExtractionCause::AutomationFailure => write!(f, "automation failure"),
        }
    }
}

/// What a strategy hands back: raw text still to be tokenized, or a count
/// already computed by an external application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted {
    Text(String),
    WordCount(u64),
}
