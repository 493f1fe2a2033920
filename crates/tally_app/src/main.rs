mod cli;
mod logging;
mod run;
mod settings;

use std::process::ExitCode;

use clap::Parser;
use tally_logging::{tally_error, tally_info};

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    logging::initialize(cli.verbose, cli.log_file.as_deref());

    let code = match run::run(&cli) {
        Ok(report) => {
            tally_info!("Results saved to: {}", report.path.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            tally_error!("An error occurred: {:#}", err);
            ExitCode::FAILURE
        }
    };
    log::logger().flush();
    code
}
