//! Wordtally engine: directory scanning, extraction strategies, batch
//! coordination and report persistence.
mod automation;
mod batch;
mod decode;
mod docx;
mod persist;
mod report;
mod scan;
mod strategy;
mod types;

pub use automation::{
    count_words_with, AutomationError, AutomationSession, AutomationSettings, DocumentAutomation,
    PowerShellWordAutomation, SessionGuard,
};
pub use batch::BatchCoordinator;
pub use decode::{decode_console_output, parse_word_count, DecodeError};
pub use docx::{DocxTextExtractor, ParseError, TextExtractor};
pub use persist::{AtomicFileWriter, PersistError};
pub use report::{
    report_file_name, report_timestamp, Clock, Report, ReportError, ReportWriter, REPORT_EXTENSION,
    REPORT_PREFIX,
};
pub use scan::scan;
pub use strategy::{ExtractionStrategy, Extractors};
pub use types::{BatchError, Discipline, Extracted, ExtractionCause, ExtractionError, ScanError};
