#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
//! Command-line surface of the microgen generator.
//!
//! [`Cli`] holds the parsed flags; [`execute`] resolves them against the
//! optional config file and hands one request to the pipeline.

use std::path::PathBuf;

use clap::{Parser, ValueHint};
use config::{Config, FlagOverrides, GenerationFlags};
use logging::LogSink;
use pipeline::{RunReport, RunRequest};
use thiserror::Error;

/// Errors that can occur while running the command.
#[derive(Debug, Error)]
pub enum CliError {
    /// The config file could not be loaded.
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    /// Generation failed.
    #[error(transparent)]
    Pipeline(#[from] pipeline::PipelineError),
}

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// Generate a go-kit microservice around a tagged Go interface
#[derive(Debug, Parser)]
#[command(name = "microgen", version, about, long_about = None)]
pub struct Cli {
    /// Structural model (JSON) of the file declaring the service interface
    #[arg(
        long,
        value_name = "PATH",
        value_hint = ValueHint::FilePath,
        default_value = "service.json"
    )]
    pub file: PathBuf,

    /// Structural model (JSON) of the generated protobuf structs, for drift checks
    #[arg(long = "pb-go", value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub pb_go: Option<PathBuf>,

    /// Output directory; defaults to the directory of --file
    #[arg(long, value_name = "DIR", value_hint = ValueHint::DirPath)]
    pub out: Option<PathBuf>,

    /// Import path of the service package; discovered from go.mod when omitted
    #[arg(long, value_name = "IMPORT")]
    pub package: Option<String>,

    /// Package of the generated .proto file; no .proto file when empty
    #[arg(long = "proto-package", value_name = "NAME")]
    pub proto_package: Option<String>,

    /// Also generate the cmd/<service>/main.go scaffold
    #[arg(long)]
    pub main: bool,

    /// Skip the exchanges, endpoints and client layer
    #[arg(long = "no-core")]
    pub no_core: bool,

    /// Logging verbosity level
    #[arg(short, long, value_name = "LEVEL")]
    pub verbose: Option<u8>,

    /// Print every message
    #[arg(long)]
    pub debug: bool,

    /// Config file; defaults to <config dir>/microgen/config.toml when present
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Print the plan without writing anything
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

impl Cli {
    fn overrides(&self) -> FlagOverrides {
        FlagOverrides {
            output_dir: self.out.clone(),
            import_package: self.package.clone(),
            protocol_package: self.proto_package.clone(),
            emit_entry_point: self.main,
            skip_core: self.no_core,
            verbosity: self.verbose,
            debug: self.debug,
        }
    }

    /// Merge the flags over the config file
    pub fn resolve_flags(&self) -> Result<GenerationFlags> {
        let config = Config::load(self.config.as_deref())?;
        Ok(config.resolve(self.overrides(), &self.file))
    }

    /// The pipeline request for already resolved `flags`
    pub fn request(&self, flags: GenerationFlags) -> RunRequest {
        let request = RunRequest::new(&self.file, flags).dry_run(self.dry_run);
        match &self.pb_go {
            Some(wire) => request.with_wire_file(wire),
            None => request,
        }
    }
}

/// Run one generation for already resolved `flags`
pub fn execute(cli: &Cli, flags: GenerationFlags, sink: &dyn LogSink) -> Result<RunReport> {
    Ok(pipeline::run(&cli.request(flags), sink)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_map_to_overrides() {
        let cli = Cli::parse_from([
            "microgen",
            "--file",
            "svc/service.json",
            "--out",
            "gen",
            "--package",
            "github.com/acme/svc",
            "--proto-package",
            "acme.svc",
            "--main",
            "--no-core",
            "-v",
            "4",
        ]);
        let overrides = cli.overrides();
        assert_eq!(overrides.output_dir, Some(PathBuf::from("gen")));
        assert_eq!(overrides.import_package.as_deref(), Some("github.com/acme/svc"));
        assert_eq!(overrides.protocol_package.as_deref(), Some("acme.svc"));
        assert!(overrides.emit_entry_point);
        assert!(overrides.skip_core);
        assert_eq!(overrides.verbosity, Some(4));
        assert!(!overrides.debug);
    }

    #[test]
    fn wire_file_and_dry_run_reach_the_request() {
        let cli = Cli::parse_from(["microgen", "--pb-go", "svc.pb.json", "--dry-run"]);
        let request = cli.request(GenerationFlags::default());
        assert_eq!(request.source, PathBuf::from("service.json"));
        assert_eq!(request.wire, Some(PathBuf::from("svc.pb.json")));
        assert!(request.dry_run);
    }
}
