//! Application entry point.
//!
//! Parses command-line arguments and delegates execution to [`runner::run`].

use buildmatrix::{cli::Cli, runner};
use clap::Parser;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt;

fn main() -> ExitCode {
    let cli = Cli::parse().with_default_command();
    let max_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::ERROR
    };
    fmt()
        .with_max_level(max_level)
        .with_writer(std::io::stderr)
        .init();
    match runner::run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "buildmatrix failed");
            ExitCode::FAILURE
        }
    }
}
