/// Outcome of extracting one file. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    file_name: String,
    word_count: u64,
    succeeded: bool,
    error_message: Option<String>,
}

impl ExtractionResult {
    pub fn succeeded(file_name: impl Into<String>, word_count: u64) -> Self {
        Self {
            file_name: file_name.into(),
            word_count,
            succeeded: true,
            error_message: None,
        }
    }

    /// A failed extraction always carries a zero word count.
    pub fn failed(file_name: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            word_count: 0,
            succeeded: false,
            error_message: Some(error_message.into()),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn word_count(&self) -> u64 {
        self.word_count
    }

    pub fn is_success(&self) -> bool {
        self.succeeded
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }
}
