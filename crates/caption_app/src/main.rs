mod app;
mod cli;
mod render;

use std::process::ExitCode;

use clap::Parser;
use engine_logging::engine_error;

use crate::app::RunOutcome;
use crate::cli::Cli;

const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    engine_logging::initialize(cli.log_destination(), cli.log_level());

    match app::run(cli).await {
        Ok(RunOutcome::Succeeded) => ExitCode::SUCCESS,
        Ok(RunOutcome::SomeFailed) => ExitCode::FAILURE,
        Ok(RunOutcome::Cancelled) => ExitCode::from(EXIT_INTERRUPTED),
        Err(err) => {
            engine_error!("run aborted: {:#}", err);
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
