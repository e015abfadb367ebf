//! Application entry point.
//!
//! Parses command-line arguments and delegates execution to
//! [`runner::run`].

use clap::Parser;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt;
use tsugite::{cli::Cli, runner};

fn main() -> ExitCode {
    let cli = Cli::parse();
    fmt()
        .with_max_level(Level::WARN)
        .with_writer(std::io::stderr)
        .init();
    match runner::run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "translation failed");
            ExitCode::FAILURE
        }
    }
}
