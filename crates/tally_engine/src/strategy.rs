use std::fs;
use std::path::Path;
use std::sync::Arc;

use tally_core::{ExtractionResult, WhitespaceWordCounter, WordCounter};

use crate::automation::{
    count_words_with, AutomationSettings, DocumentAutomation, PowerShellWordAutomation,
};
use crate::docx::{DocxTextExtractor, TextExtractor};
use crate::{Extracted, ExtractionCause, ExtractionError};

/// Extraction procedure chosen from a file's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// `.docx`: parsed in-process, counted by the tokenizer.
    Docx,
    /// `.doc`: counted by an external word processor.
    LegacyDoc,
}

impl ExtractionStrategy {
    /// Case-insensitive extension match; `None` means the file is skipped.
    pub fn for_file_name(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        if ext.eq_ignore_ascii_case("docx") {
            Some(Self::Docx)
        } else if ext.eq_ignore_ascii_case("doc") {
            Some(Self::LegacyDoc)
        } else {
            None
        }
    }

    /// Whether this strategy may overlap with other extractions.
    pub fn runs_concurrently(self) -> bool {
        matches!(self, Self::Docx)
    }
}

/// The collaborators every strategy needs. Cheap to clone into tasks.
#[derive(Clone)]
pub struct Extractors {
    text: Arc<dyn TextExtractor>,
    automation: Arc<dyn DocumentAutomation>,
    counter: Arc<dyn WordCounter>,
}

impl Extractors {
    pub fn new(
        text: Arc<dyn TextExtractor>,
        automation: Arc<dyn DocumentAutomation>,
        counter: Arc<dyn WordCounter>,
    ) -> Self {
        Self {
            text,
            automation,
            counter,
        }
    }

    /// `docx-rs` for `.docx`, Word over PowerShell for `.doc`.
    pub fn standard(settings: AutomationSettings) -> Self {
        Self::new(
            Arc::new(DocxTextExtractor),
            Arc::new(PowerShellWordAutomation::new(settings)),
            Arc::new(WhitespaceWordCounter),
        )
    }

    pub fn extract(
        &self,
        strategy: ExtractionStrategy,
        file_name: &str,
        path: &Path,
    ) -> Result<Extracted, ExtractionError> {
        match strategy {
            ExtractionStrategy::Docx => {
                let bytes = fs::read(path).map_err(|err| {
                    ExtractionError::new(file_name, ExtractionCause::ReadFailure, err.to_string())
                })?;
                let text = self.text.extract_text(&bytes).map_err(|err| {
                    ExtractionError::new(file_name, ExtractionCause::ParseFailure, err.to_string())
                })?;
                Ok(Extracted::Text(text))
            }
            ExtractionStrategy::LegacyDoc => count_words_with(self.automation.as_ref(), path)
                .map(Extracted::WordCount)
                .map_err(|err| {
                    ExtractionError::new(
                        file_name,
                        ExtractionCause::AutomationFailure,
                        err.to_string(),
                    )
                }),
        }
    }

    /// Extracts and counts one file; failures become failed results.
    pub fn extract_result(
        &self,
        strategy: ExtractionStrategy,
        file_name: &str,
        path: &Path,
    ) -> ExtractionResult {
        match self.extract(strategy, file_name, path) {
            Ok(Extracted::Text(text)) => {
                ExtractionResult::succeeded(file_name, self.counter.count(&text))
            }
            Ok(Extracted::WordCount(count)) => ExtractionResult::succeeded(file_name, count),
            Err(err) => {
                ExtractionResult::failed(file_name, format!("{}: {}", err.cause, err.message))
            }
        }
    }
}
