use anyhow::Context;
use tally_core::BatchSummary;
use tally_engine::{BatchCoordinator, Extractors, Report, ReportWriter};
use tally_logging::{tally_debug, tally_info};

use crate::cli::Cli;
use crate::settings::load_settings;

/// One full batch: settings, scan and extraction, then the report.
pub fn run(cli: &Cli) -> anyhow::Result<Report> {
    let settings = cli.apply_overrides(load_settings(cli.config.as_deref())?);
    tally_debug!("Effective settings: {:?}", settings);

    let folder = cli.folder.as_path();
    tally_info!("Processing documents in folder: {}", folder.display());

    let coordinator = BatchCoordinator::new(
        Extractors::standard(settings.automation()),
        settings.discipline(),
    );
    let summary: BatchSummary = coordinator
        .run(folder)
        .with_context(|| format!("failed to process {}", folder.display()))?;

    let report = ReportWriter::new()
        .write(&summary, folder)
        .with_context(|| format!("failed to save results in {}", folder.display()))?;
    Ok(report)
}
