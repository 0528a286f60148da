#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Microgen structural type model
//!
//! This crate defines the read-only declaration model produced by the external
//! Go source parser: interfaces, methods, parameters, structs and the recursive
//! `TypeRef` descriptor. The generator core only reads these snapshots; it never
//! mutates them once validation begins.

pub mod declarations;
pub mod types;

use thiserror::Error;

// Re-export the model types for convenience
pub use declarations::*;
pub use types::*;

/// Errors raised while loading or saving a structural model.
#[derive(Debug, Error)]
pub enum IrError {
    /// I/O failure while reading or writing a model file.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The model file is not valid JSON for the expected shape.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, IrError>;
