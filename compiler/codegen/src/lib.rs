#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Go source generation utilities for microgen.
//!
//! This crate holds the pieces every artifact renderer shares: a [`GoFile`]
//! buffer that tracks imports and prints the generated-file header, rendering
//! of structural types as Go syntax, naming helpers, and the write policies
//! that persist rendered text.
//!
//! What each artifact contains lives in the pipeline crate.

use thiserror::Error;

pub mod go_file;
pub mod type_render;
pub mod utils;
pub mod write;

pub use go_file::GoFile;
pub use type_render::TypeRenderer;
pub use write::{write_source, SkipReason, WriteOutcome, WritePolicy};

/// Version stamped into generated file headers.
pub const GENERATOR_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error type for code generation operations in this crate.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// Underlying I/O error while reading or writing files.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Formatting error when building generated source.
    #[error(transparent)]
    Fmt(#[from] std::fmt::Error),
    /// A pattern used to inspect existing sources failed to compile.
    #[error(transparent)]
    Regex(#[from] regex::Error),
    /// Generic message-based error.
    #[error("{0}")]
    Message(String),
}

impl From<String> for CodegenError {
    fn from(msg: String) -> Self { CodegenError::Message(msg) }
}

/// Convenient result type for codegen functions in this crate.
pub type Result<T> = std::result::Result<T, CodegenError>;

/// Trim trailing whitespace from each line and drop trailing blank lines.
/// Always ensures the returned string ends with a single newline when not empty.
pub fn clean_generated_source(src: &str) -> String {
    let mut lines: Vec<&str> = src.lines().map(str::trim_end).collect();

    while matches!(lines.last(), Some(line) if line.is_empty()) {
        lines.pop();
    }

    if lines.is_empty() {
        String::new()
    } else {
        format!("{}\n", lines.join("\n"))
    }
}
