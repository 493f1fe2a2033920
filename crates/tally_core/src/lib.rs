//! Wordtally core: pure data model, ordering and aggregation helpers.
mod entry;
mod result;
mod summary;
mod tokenize;

pub use entry::{order_entries, parse_sequence_number, FileEntry};
pub use result::ExtractionResult;
pub use summary::{processed_line, total_line, BatchSummary};
pub use tokenize::{count_words, WhitespaceWordCounter, WordCounter};
