use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use tally_core::BatchSummary;
use tally_logging::tally_debug;

use crate::persist::{AtomicFileWriter, PersistError};

pub const REPORT_PREFIX: &str = "word-count-results-";
pub const REPORT_EXTENSION: &str = ".txt";

/// The persisted report: where it went and exactly what was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub path: PathBuf,
    pub contents: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("summary must be finalized before writing")]
    NotFinalized,
    #[error("failed to write report: {0}")]
    Persist(#[from] PersistError),
}

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Writes `word-count-results-{timestamp}.txt` into the processed folder.
#[derive(Clone)]
pub struct ReportWriter {
    clock: Clock,
}

impl Default for ReportWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportWriter {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(Utc::now))
    }

    pub fn with_clock(clock: Clock) -> Self {
        Self { clock }
    }

    pub fn write(&self, summary: &BatchSummary, folder: &Path) -> Result<Report, ReportError> {
        if !summary.is_finalized() {
            return Err(ReportError::NotFinalized);
        }
        let filename = report_file_name((self.clock)());
        let contents = summary.report_contents();
        let path = AtomicFileWriter::new(folder).create(&filename, &contents)?;
        tally_debug!("Wrote {} bytes to {}", contents.len(), path.display());
        Ok(Report { path, contents })
    }
}

/// RFC 3339 UTC with milliseconds, `:` and `.` replaced by `-`.
pub fn report_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-")
}

pub fn report_file_name(now: DateTime<Utc>) -> String {
    format!(
        "{REPORT_PREFIX}{}{REPORT_EXTENSION}",
        report_timestamp(now)
    )
}
