#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use tally_core::{count_words, WhitespaceWordCounter};
use tally_engine::{
    AutomationError, AutomationSession, DocumentAutomation, Extractors, ParseError,
    TextExtractor,
};

pub fn init_logging() {
    tally_logging::initialize_for_tests();
}

pub fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

/// Treats file bytes as UTF-8 text.
///
/// Content starting with `CORRUPT` fails to parse; content starting with
/// `SLOW ` is delayed by `slow_delay` before returning the rest; content
/// starting with `PANIC` panics.
pub struct PlainTextExtractor {
    pub slow_delay: Duration,
    pub base_delay: Duration,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub completed: Mutex<Vec<String>>,
    pub started_at: Mutex<Vec<Instant>>,
}

impl PlainTextExtractor {
    pub fn new() -> Self {
        Self {
            slow_delay: Duration::from_millis(500),
            base_delay: Duration::ZERO,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            completed: Mutex::new(Vec::new()),
            started_at: Mutex::new(Vec::new()),
        }
    }

    pub fn with_base_delay(base_delay: Duration) -> Self {
        Self {
            base_delay,
            ..Self::new()
        }
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn completion_order(&self) -> Vec<String> {
        self.completed.lock().unwrap().clone()
    }

    pub fn started_at(&self) -> Vec<Instant> {
        self.started_at.lock().unwrap().clone()
    }
}

impl TextExtractor for PlainTextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ParseError> {
        self.started_at.lock().unwrap().push(Instant::now());
        if bytes.starts_with(b"PANIC") {
            panic!("extractor blew up");
        }
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let result = match std::str::from_utf8(bytes) {
            Err(err) => Err(ParseError(err.to_string())),
            Ok(text) if text.starts_with("CORRUPT") => {
                Err(ParseError("not a zip archive".to_string()))
            }
            Ok(text) => {
                thread::sleep(self.base_delay);
                let text = match text.strip_prefix("SLOW ") {
                    Some(rest) => {
                        thread::sleep(self.slow_delay);
                        rest
                    }
                    None => text,
                };
                self.completed.lock().unwrap().push(text.to_string());
                Ok(text.to_string())
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

#[derive(Default)]
pub struct AutomationStats {
    pub launched: AtomicUsize,
    pub closed: AtomicUsize,
    pub active: AtomicUsize,
    pub max_active: AtomicUsize,
    pub closed_at: Mutex<Vec<Instant>>,
}

impl AutomationStats {
    pub fn launched(&self) -> usize {
        self.launched.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    pub fn closed_at(&self) -> Vec<Instant> {
        self.closed_at.lock().unwrap().clone()
    }
}

/// Counts words of the file's text as if a word processor had.
///
/// Content `OPEN_FAIL` fails in `open`, `QUERY_FAIL` fails in `word_count`.
#[derive(Default)]
pub struct FakeAutomation {
    pub stats: Arc<AutomationStats>,
    pub fail_launch: bool,
    pub query_delay: Duration,
}

impl FakeAutomation {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentAutomation for FakeAutomation {
    fn launch(&self) -> Result<Box<dyn AutomationSession>, AutomationError> {
        if self.fail_launch {
            return Err(AutomationError::Launch {
                program: "fake-word".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not installed"),
            });
        }
        self.stats.launched.fetch_add(1, Ordering::SeqCst);
        let now = self.stats.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.stats.max_active.fetch_max(now, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            stats: self.stats.clone(),
            query_delay: self.query_delay,
            content: None,
        }))
    }
}

struct FakeSession {
    stats: Arc<AutomationStats>,
    query_delay: Duration,
    content: Option<String>,
}

impl AutomationSession for FakeSession {
    fn open(&mut self, path: &Path) -> Result<(), AutomationError> {
        let content = fs::read_to_string(path)?;
        if content.trim() == "OPEN_FAIL" {
            return Err(AutomationError::Open {
                path: path.to_path_buf(),
                message: "document is password protected".to_string(),
            });
        }
        self.content = Some(content);
        Ok(())
    }

    fn word_count(&mut self) -> Result<u64, AutomationError> {
        thread::sleep(self.query_delay);
        match self.content.as_deref() {
            Some(text) if text.trim() == "QUERY_FAIL" => {
                Err(AutomationError::Query("COM call rejected".to_string()))
            }
            Some(text) => Ok(count_words(text)),
            None => Err(AutomationError::Query("no document".to_string())),
        }
    }

    fn close(&mut self) -> Result<(), AutomationError> {
        self.stats.closed_at.lock().unwrap().push(Instant::now());
        self.stats.closed.fetch_add(1, Ordering::SeqCst);
        self.stats.active.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn extractors(text: Arc<PlainTextExtractor>, automation: Arc<FakeAutomation>) -> Extractors {
    Extractors::new(text, automation, Arc::new(WhitespaceWordCounter))
}
