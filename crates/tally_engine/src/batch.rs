use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use futures_util::future::join_all;
use tally_core::{BatchSummary, ExtractionResult, FileEntry};
use tally_logging::{tally_debug, tally_error, tally_info};
use tokio::task::{JoinError, JoinHandle};

use crate::scan::scan;
use crate::strategy::{ExtractionStrategy, Extractors};
use crate::{BatchError, Discipline};

/// A file that survived filtering, in scan order.
struct Dispatch {
    file_name: String,
    path: PathBuf,
    strategy: ExtractionStrategy,
}

/// A scan slot: either finished inline or still running on the blocking pool.
enum Slot {
    Ready(ExtractionResult),
    Pending {
        file_name: String,
        handle: JoinHandle<ExtractionResult>,
    },
}

pub struct BatchCoordinator {
    extractors: Extractors,
    discipline: Discipline,
}

impl BatchCoordinator {
    pub fn new(extractors: Extractors, discipline: Discipline) -> Self {
        Self {
            extractors,
            discipline,
        }
    }

    /// Runs one batch over `folder`. Only a failed scan (or, for the concurrent
    /// discipline, a runtime that cannot start) is an error; per-file failures
    /// are logged and left out of the summary.
    pub fn run(&self, folder: &Path) -> Result<BatchSummary, BatchError> {
        match self.discipline {
            Discipline::Sequential => self.run_sequential(folder),
            Discipline::Concurrent => {
                let runtime = tokio::runtime::Builder::new_multi_thread()
                    .enable_all()
                    .build()
                    .map_err(BatchError::Runtime)?;
                runtime.block_on(self.run_concurrent(folder))
            }
        }
    }

    pub fn run_sequential(&self, folder: &Path) -> Result<BatchSummary, BatchError> {
        let mut summary = BatchSummary::new();
        let planned = plan(folder, scan(folder)?, &mut summary);
        tally_info!(
            "Processing {} documents in {} sequentially",
            planned.len(),
            folder.display()
        );

        for item in planned {
            let result = extract_isolated(&self.extractors, &item);
            record(&mut summary, result);
        }

        summary.finalize();
        log_totals(&summary);
        Ok(summary)
    }

    /// Concurrent discipline. Must be awaited on a multi-threaded runtime.
    ///
    /// `.docx` work is spawned onto the blocking pool and keyed by its scan
    /// slot. `.doc` work is awaited before the next file is dispatched. The
    /// summary is folded once, after every slot has been joined.
    pub async fn run_concurrent(&self, folder: &Path) -> Result<BatchSummary, BatchError> {
        let mut summary = BatchSummary::new();
        let planned = plan(folder, scan(folder)?, &mut summary);
        tally_info!(
            "Processing {} documents in {} concurrently",
            planned.len(),
            folder.display()
        );

        let mut slots = Vec::with_capacity(planned.len());
        for item in planned {
            let extractors = self.extractors.clone();
            let strategy = item.strategy;
            let file_name = item.file_name.clone();
            let handle = tokio::task::spawn_blocking(move || extract_isolated(&extractors, &item));
            if strategy.runs_concurrently() {
                slots.push(Slot::Pending { file_name, handle });
            } else {
                let result = handle
                    .await
                    .unwrap_or_else(|err| join_failed(&file_name, err));
                slots.push(Slot::Ready(result));
            }
        }

        let results = join_all(slots.into_iter().map(|slot| async move {
            match slot {
                Slot::Ready(result) => result,
                Slot::Pending { file_name, handle } => handle
                    .await
                    .unwrap_or_else(|err| join_failed(&file_name, err)),
            }
        }))
        .await;

        for result in results {
            record(&mut summary, result);
        }
        summary.finalize();
        log_totals(&summary);
        Ok(summary)
    }
}

/// Drops directories and unrecognized files, keeping scan order.
fn plan(folder: &Path, entries: Vec<FileEntry>, summary: &mut BatchSummary) -> Vec<Dispatch> {
    let mut planned = Vec::with_capacity(entries.len());
    for entry in entries {
        if !entry.is_regular_file() {
            tally_debug!("Skipping non-file entry {}", entry.name());
            summary.record_skipped();
            continue;
        }
        let Some(strategy) = ExtractionStrategy::for_file_name(entry.name()) else {
            tally_debug!("Skipping unrecognized file {}", entry.name());
            summary.record_skipped();
            continue;
        };
        planned.push(Dispatch {
            file_name: entry.name().to_string(),
            path: folder.join(entry.name()),
            strategy,
        });
    }
    planned
}

fn record(summary: &mut BatchSummary, result: ExtractionResult) {
    if result.is_success() {
        tally_info!(
            "Processed {}: {} words",
            result.file_name(),
            result.word_count()
        );
    } else {
        tally_error!(
            "Error processing {}: {}",
            result.file_name(),
            result.error_message().unwrap_or("unknown error")
        );
    }
    summary.record(&result);
}

/// Runs one extraction. A panicking collaborator fails only this file.
fn extract_isolated(extractors: &Extractors, item: &Dispatch) -> ExtractionResult {
    panic::catch_unwind(AssertUnwindSafe(|| {
        extractors.extract_result(item.strategy, &item.file_name, &item.path)
    }))
    .unwrap_or_else(|payload| {
        ExtractionResult::failed(
            &item.file_name,
            format!("extraction panicked: {}", panic_message(payload.as_ref())),
        )
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

fn join_failed(file_name: &str, err: JoinError) -> ExtractionResult {
    ExtractionResult::failed(file_name, format!("extraction task failed: {err}"))
}

fn log_totals(summary: &BatchSummary) {
    tally_info!(
        "Total word count across all files: {} ({} processed, {} failed, {} skipped)",
        summary.total_word_count(),
        summary.processed_files(),
        summary.failed_files(),
        summary.skipped_files()
    );
}
