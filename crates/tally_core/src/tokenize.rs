pub trait WordCounter: Send + Sync {
    fn count(&self, text: &str) -> u64;
}

/// Counts runs of non-whitespace characters.
pub fn count_words(text: &str) -> u64 {
    text.split_whitespace().count() as u64
}

#[derive(Debug, Default, Clone, Copy)]
pub struct WhitespaceWordCounter;

impl WordCounter for WhitespaceWordCounter {
    fn count(&self, text: &str) -> u64 {
        count_words(text)
    }
}
