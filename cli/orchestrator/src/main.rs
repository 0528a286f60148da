//! microgen command-line entry point
//!
//! Parses the flags, installs the tracing subscriber and runs one generation.
//! Any error is logged and turns into exit status 1.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

use std::process::ExitCode;

use clap::Parser;
use logging::TracingSink;
use microgen_cli::{execute, Cli};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let flags = match cli.resolve_flags() {
        Ok(flags) => flags,
        Err(e) => {
            init_tracing(config::DEFAULT_VERBOSITY);
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(flags.verbosity);
    let sink = TracingSink::new(flags.verbosity);

    match execute(&cli, flags, &sink) {
        Ok(report) => {
            if cli.dry_run {
                for unit in &report.units {
                    println!("{}", unit);
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins; otherwise debug output only above the normal level
fn init_tracing(verbosity: u8) {
    let default =
        if verbosity > logging::LEVEL_NORMAL { "microgen=debug" } else { "microgen=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
