use crate::ExtractionResult;

pub fn processed_line(file_name: &str, word_count: u64) -> String {
    format!("Processed {file_name}: {word_count} words")
}

pub fn total_line(total_word_count: u64) -> String {
    format!("Total word count across all files: {total_word_count}")
}

/// Report lines and running total for one batch.
///
/// Lines are appended in the order results are recorded; callers feed results
/// in scan order. Failed results only move the `failed_files` counter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchSummary {
    ordered_messages: Vec<String>,
    total_word_count: u64,
    processed_files: usize,
    failed_files: usize,
    skipped_files: usize,
    finalized: bool,
}

impl BatchSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds results in iteration order and finalizes the summary.
    pub fn from_results<I>(results: I) -> Self
    where
        I: IntoIterator<Item = ExtractionResult>,
    {
        let mut summary = Self::new();
        for result in results {
            summary.record(&result);
        }
        summary.finalize();
        summary
    }

    pub fn record(&mut self, result: &ExtractionResult) {
        debug_assert!(!self.finalized, "record after finalize");
        if self.finalized {
            return;
        }
        if result.is_success() {
            self.ordered_messages
                .push(processed_line(result.file_name(), result.word_count()));
            self.total_word_count += result.word_count();
            self.processed_files += 1;
        } else {
            self.failed_files += 1;
        }
    }

    /// Counts an entry that was not dispatched (directory, unknown extension).
    pub fn record_skipped(&mut self) {
        self.skipped_files += 1;
    }

    /// Appends the grand total line. Later calls are no-ops.
    pub fn finalize(&mut self) {
        if self.finalized {
            return;
        }
        self.ordered_messages.push(total_line(self.total_word_count));
        self.finalized = true;
    }

    pub fn ordered_messages(&self) -> &[String] {
        &self.ordered_messages
    }

    pub fn total_word_count(&self) -> u64 {
        self.total_word_count
    }

    pub fn processed_files(&self) -> usize {
        self.processed_files
    }

    pub fn failed_files(&self) -> usize {
        self.failed_files
    }

    pub fn skipped_files(&self) -> usize {
        self.skipped_files
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Newline-joined report body, without a trailing newline.
    pub fn report_contents(&self) -> String {
        self.ordered_messages.join("\n")
    }
}
