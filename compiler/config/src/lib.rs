#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Microgen Configuration
//!
//! This crate owns the generation flags consumed by the planner and the optional
//! TOML configuration file that supplies their defaults:
//! - output directory and import package of the service
//! - protocol-definition package field and entry-point scaffold toggles
//! - logging verbosity
//!
//! Command-line values override file values; whatever is still missing is
//! resolved here (output directory from the source path, import package from
//! `go.mod`) before the flags reach the generator core.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod gomod;

pub use gomod::{discover_import_package, module_path_from_go_mod};

/// Default verbosity of a run.
pub const DEFAULT_VERBOSITY: u8 = 1;
/// Verbosity selected by the debug switch.
pub const DEBUG_VERBOSITY: u8 = 100;

/// Errors that can occur when loading or saving configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    /// Failed to parse the TOML configuration file
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    /// Failed to serialize configuration to TOML format
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// Configuration file was not found at the specified path
    #[error("Config file not found at: {0}")]
    NotFound(PathBuf),
    /// Could not locate the user's configuration directory
    #[error("Could not find user config directory")]
    ConfigDirUnavailable,
    /// No `module` line could be found for the output directory
    #[error("could not find module path in go.mod above {0}")]
    ModulePathNotFound(PathBuf),
}

/// Resolved options of one generation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationFlags {
    /// Directory all artifact paths are relative to
    pub output_dir: PathBuf,
    /// Go import path of the service package, used to qualify generated references
    pub import_package: String,
    /// Package field of the protocol-definition file; empty disables that file
    pub protocol_package: String,
    /// Emit the `main.go` scaffold regardless of interface tags
    pub emit_entry_point: bool,
    /// Emit the request/response, endpoint and client layer
    pub emit_core: bool,
    /// Informational verbosity level
    pub verbosity: u8,
}

impl Default for GenerationFlags {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            import_package: String::new(),
            protocol_package: String::new(),
            emit_entry_point: false,
            emit_core: true,
            verbosity: DEFAULT_VERBOSITY,
        }
    }
}

impl GenerationFlags {
    /// Whether a protocol-definition file was requested
    pub fn wants_protocol_file(&self) -> bool { !self.protocol_package.trim().is_empty() }
}

/// Values given on the command line; `None` defers to the config file
#[derive(Debug, Clone, Default)]
pub struct FlagOverrides {
    /// `--out`
    pub output_dir: Option<PathBuf>,
    /// `--package`
    pub import_package: Option<String>,
    /// `--proto-package`
    pub protocol_package: Option<String>,
    /// `--main`
    pub emit_entry_point: bool,
    /// `--no-core`
    pub skip_core: bool,
    /// `-v`
    pub verbosity: Option<u8>,
    /// `--debug`
    pub debug: bool,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Defaults for generation flags
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[generation]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Where to write generated files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    /// Import path of the service package
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_package: Option<String>,
    /// Protocol-definition package field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol_package: Option<String>,
    /// Emit the entry-point scaffold
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emit_entry_point: Option<bool>,
    /// Emit the foundational layer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emit_core: Option<bool>,
}

/// `[logging]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Verbosity level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbosity: Option<u8>,
    /// Print all messages
    #[serde(default)]
    pub debug: bool,
}

impl Config {
    /// Load configuration from a TOML file at `path`
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save this configuration as a pretty-printed TOML file at `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Returns the default config file path:
    /// `{config_dir()}/microgen/config.toml`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir =
            dirs::config_dir().ok_or(ConfigError::ConfigDirUnavailable)?.join("microgen");
        Ok(config_dir.join("config.toml"))
    }

    /// Load an explicitly named file, or the default file when it exists
    ///
    /// An explicit path that does not exist is an error; a missing default file
    /// yields the default configuration.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) if !path.exists() => Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Ok(path) if path.exists() => Self::from_file(path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Merge command-line overrides over this configuration and fill in the rest
    ///
    /// The import package falls back to the `go.mod` module path of the output
    /// directory; when that cannot be found it stays empty and the planner
    /// reports every unit that needs it.
    pub fn resolve(&self, overrides: FlagOverrides, source_file: &Path) -> GenerationFlags {
        let gen = &self.generation;
        let output_dir = overrides
            .output_dir
            .or_else(|| gen.output_dir.clone())
            .unwrap_or_else(|| default_output_dir(source_file));
        let import_package = overrides
            .import_package
            .or_else(|| gen.import_package.clone())
            .filter(|p| !p.trim().is_empty())
            .or_else(|| discover_import_package(&output_dir).ok())
            .unwrap_or_default();
        let verbosity = if overrides.debug || self.logging.debug {
            DEBUG_VERBOSITY
        } else {
            overrides.verbosity.or(self.logging.verbosity).unwrap_or(DEFAULT_VERBOSITY)
        };

        GenerationFlags {
            output_dir,
            import_package,
            protocol_package: overrides
                .protocol_package
                .or_else(|| gen.protocol_package.clone())
                .unwrap_or_default(),
            emit_entry_point: overrides.emit_entry_point || gen.emit_entry_point.unwrap_or(false),
            emit_core: !overrides.skip_core && gen.emit_core.unwrap_or(true),
            verbosity,
        }
    }
}

/// Directory of the source file, or the current directory for a bare file name
fn default_output_dir(source_file: &Path) -> PathBuf {
    match source_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_from_file() {
        let temp_file = NamedTempFile::new().expect("Failed to create temporary file");
        let toml_content = r#"
            [generation]
            output_dir = "generated"
            import_package = "github.com/acme/stringsvc"
            protocol_package = "acme.stringsvc"
            emit_entry_point = true

            [logging]
            verbosity = 4
        "#;
        fs::write(&temp_file, toml_content).expect("Failed to write TOML content");

        let loaded = Config::from_file(&temp_file).expect("Failed to load config");
        assert_eq!(loaded.generation.output_dir, Some(PathBuf::from("generated")));
        assert_eq!(loaded.generation.import_package.as_deref(), Some("github.com/acme/stringsvc"));
        assert_eq!(loaded.generation.protocol_package.as_deref(), Some("acme.stringsvc"));
        assert_eq!(loaded.generation.emit_entry_point, Some(true));
        assert_eq!(loaded.generation.emit_core, None);
        assert_eq!(loaded.logging.verbosity, Some(4));
        assert!(!loaded.logging.debug);

        let result = Config::from_file("nonexistent_file.toml");
        match result.expect_err("Expected error for nonexistent file") {
            ConfigError::FileRead(_) => {}
            other => panic!("Expected FileRead error, got {:?}", other),
        }

        let temp_file =
            NamedTempFile::new().expect("Failed to create temporary file for parse error test");
        fs::write(&temp_file, "invalid toml content").expect("Failed to write invalid TOML");
        match Config::from_file(&temp_file).expect_err("Expected parse error for invalid TOML") {
            ConfigError::Parse(_) => {}
            other => panic!("Expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_save_round_trip() {
        let config = Config {
            generation: GenerationConfig {
                protocol_package: Some("acme.svc".to_string()),
                emit_core: Some(false),
                ..GenerationConfig::default()
            },
            logging: LoggingConfig { verbosity: Some(2), debug: false },
        };
        let temp_file = NamedTempFile::new().expect("Failed to create temporary file");
        config.save(&temp_file).expect("save succeeds");
        let contents = fs::read_to_string(&temp_file).expect("Failed to read saved config");
        assert!(contents.contains("acme.svc"));
        assert_eq!(Config::from_file(&temp_file).expect("reload"), config);
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let dir = tempfile::tempdir().expect("Failed to create temporary directory");
        let missing = dir.path().join("microgen.toml");
        match Config::load(Some(&missing)).expect_err("explicit file must exist") {
            ConfigError::NotFound(path) => assert_eq!(path, missing),
            other => panic!("Expected NotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_default_path() {
        let path = Config::default_path().expect("Failed to get default config path");
        let path_str = path.to_str().expect("Path should be valid UTF-8");
        assert!(path_str.contains("microgen"));
        assert!(path_str.ends_with("config.toml"));
    }

    #[test]
    fn test_resolve_prefers_overrides() {
        let config = Config {
            generation: GenerationConfig {
                output_dir: Some(PathBuf::from("from-file")),
                import_package: Some("example.com/file".to_string()),
                protocol_package: Some("file.pkg".to_string()),
                emit_entry_point: Some(false),
                emit_core: Some(true),
            },
            logging: LoggingConfig { verbosity: Some(3), debug: false },
        };
        let overrides = FlagOverrides {
            output_dir: Some(PathBuf::from("from-cli")),
            import_package: Some("example.com/cli".to_string()),
            protocol_package: None,
            emit_entry_point: true,
            skip_core: true,
            verbosity: Some(5),
            debug: false,
        };
        let flags = config.resolve(overrides, Path::new("svc/service.go"));
        assert_eq!(flags.output_dir, PathBuf::from("from-cli"));
        assert_eq!(flags.import_package, "example.com/cli");
        assert_eq!(flags.protocol_package, "file.pkg");
        assert!(flags.emit_entry_point);
        assert!(!flags.emit_core);
        assert_eq!(flags.verbosity, 5);
        assert!(flags.wants_protocol_file());
    }

    #[test]
    fn test_resolve_defaults() {
        let dir = tempfile::tempdir().expect("Failed to create temporary directory");
        fs::write(dir.path().join("go.mod"), "module github.com/acme/stringsvc\n\ngo 1.21\n")
            .expect("write go.mod");
        let source = dir.path().join("service.go");

        let flags = Config::default()
            .resolve(FlagOverrides { debug: true, ..FlagOverrides::default() }, &source);
        assert_eq!(flags.output_dir, dir.path().to_path_buf());
        assert_eq!(flags.import_package, "github.com/acme/stringsvc");
        assert!(flags.emit_core);
        assert!(!flags.emit_entry_point);
        assert!(!flags.wants_protocol_file());
        assert_eq!(flags.verbosity, DEBUG_VERBOSITY);
    }

    #[test]
    fn test_default_output_dir_for_bare_file_name() {
        assert_eq!(default_output_dir(Path::new("service.go")), PathBuf::from("."));
        assert_eq!(default_output_dir(Path::new("a/b/service.go")), PathBuf::from("a/b"));
    }
}
