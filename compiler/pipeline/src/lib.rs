#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! High-level pipeline that turns a tagged Go service interface into the
//! layered go-kit microservice around it.
//!
//! ## Module Organization
//!
//! - `generation_context` - Everything renderers need about one run
//! - `artifact` - The catalog of artifacts, their paths, policies and activation
//! - `planner` - Ordered, deduplicated generation units for one run
//! - `module_generators` - One renderer per artifact
//! - `template_management` - Embedded templates and placeholder filling
//! - `orchestration` - The `run` entry point tying everything together

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

pub mod artifact;
pub mod generation_context;
pub mod module_generators;
pub mod orchestration;
pub mod planner;
pub mod template_management;

pub use artifact::ArtifactKind;
pub use generation_context::{GenerationContext, GenerationContextBuilder};
pub use orchestration::{run, RunReport, RunRequest, UnitReport};
pub use planner::{plan, GenerationUnit, Plan, PlanBuilder};

/// Convenient result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that can occur while running the generation pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The interface broke the shape contract.
    #[error("validation: {0}")]
    Validation(#[from] analysis::ValidationError),
    /// Some activated units are missing prerequisites.
    #[error(transparent)]
    Planning(#[from] PlanningError),
    /// No interface in the source file carries a `@microgen` line.
    #[error("could not find interface with @microgen tag (found: {})", list_or_none(.found))]
    NoTaggedInterface {
        /// Names of the interfaces that were found
        found: Vec<String>,
    },
    /// One generation unit failed.
    #[error("{}: {source}", .path.display())]
    Unit {
        /// Output path of the failing unit
        path: PathBuf,
        /// What went wrong
        source: Box<PipelineError>,
    },
    /// Error propagated from the codegen crate.
    #[error(transparent)]
    Codegen(#[from] codegen::CodegenError),
    /// Error loading a structural model.
    #[error(transparent)]
    Ir(#[from] ir::IrError),
    /// I/O error while creating or writing files.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Formatting error when writing out generated code.
    #[error(transparent)]
    Fmt(#[from] std::fmt::Error),
    /// Generic message-based error.
    #[error("{0}")]
    Message(String),
}

fn list_or_none(names: &[String]) -> String {
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}

/// Every activated unit whose prerequisites are not met
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanningError {
    failures: Vec<UnitFailure>,
}

/// Why one unit cannot be planned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitFailure {
    /// The artifact
    pub kind: ArtifactKind,
    /// Missing prerequisite
    pub reason: String,
}

impl PlanningError {
    /// Wrap failures; `None` when there are none
    pub fn from_failures(failures: Vec<UnitFailure>) -> Option<Self> {
        if failures.is_empty() {
            None
        } else {
            Some(Self { failures })
        }
    }

    /// The failures, in plan order
    pub fn failures(&self) -> &[UnitFailure] { &self.failures }
}

impl fmt::Display for PlanningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot plan generation:")?;
        for failure in &self.failures {
            write!(f, "\n  {}: {}", failure.kind, failure.reason)?;
        }
        Ok(())
    }
}

impl std::error::Error for PlanningError {}
