//! Pipeline orchestration for the main entry point.
//!
//! [`run`] coordinates every stage of one generation: loading the structural
//! models, interpreting directives, validation, planning and executing the
//! planned units in order.

use std::fmt;
use std::path::PathBuf;

use analysis::InterfaceValidator;
use codegen::{WriteOutcome, GENERATOR_VERSION};
use config::GenerationFlags;
use ir::{SourceFile, WireStructFile};
use logging::{LogSink, LEVEL_DETAIL, LEVEL_NORMAL};
use semantics::{find_service_interface, interpret_directives};

use crate::artifact::ArtifactKind;
use crate::generation_context::GenerationContext;
use crate::planner::plan;
use crate::{PipelineError, Result};

const LOG_MODULE: &str = "microgen";

/// Inputs of one run
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Structural model of the Go file declaring the service interface
    pub source: PathBuf,
    /// Structural model of the generated protobuf structs, for drift checks
    pub wire: Option<PathBuf>,
    /// Resolved generation flags
    pub flags: GenerationFlags,
    /// Plan without writing anything
    pub dry_run: bool,
}

impl RunRequest {
    /// Request generating from `source` with `flags`
    pub fn new(source: impl Into<PathBuf>, flags: GenerationFlags) -> Self {
        Self { source: source.into(), wire: None, flags, dry_run: false }
    }

    /// Cross-check exchanges against a wire-format struct file
    pub fn with_wire_file(mut self, wire: impl Into<PathBuf>) -> Self {
        self.wire = Some(wire.into());
        self
    }

    /// Only plan
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// What happened to one planned unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitReport {
    /// The artifact
    pub kind: ArtifactKind,
    /// Output path
    pub path: PathBuf,
    /// `None` on a dry run
    pub outcome: Option<WriteOutcome>,
}

impl fmt::Display for UnitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Some(outcome) => write!(f, "{}: {}", self.path.display(), outcome),
            None => write!(f, "{}: planned ({})", self.path.display(), self.kind),
        }
    }
}

/// Result of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Name of the service interface
    pub interface: String,
    /// Every planned unit in plan order
    pub units: Vec<UnitReport>,
}

impl RunReport {
    /// Units that wrote or merged a file
    pub fn written(&self) -> impl Iterator<Item = &UnitReport> {
        self.units.iter().filter(|u| matches!(&u.outcome, Some(o) if !o.is_skipped()))
    }
}

/// Generate every requested artifact of the tagged interface in `request.source`
///
/// Stops at the first validation, planning or unit failure; files written by
/// earlier units stay in place.
pub fn run(request: &RunRequest, sink: &dyn LogSink) -> Result<RunReport> {
    sink.info(LEVEL_NORMAL, LOG_MODULE, &format!("@microgen {}", GENERATOR_VERSION));

    let source = SourceFile::from_file(&request.source)?;
    let wire = request.wire.as_deref().map(WireStructFile::from_file).transpose()?;

    let interface = find_service_interface(&source).ok_or_else(|| {
        PipelineError::NoTaggedInterface {
            found: source.interfaces.iter().map(|i| i.name.clone()).collect(),
        }
    })?;
    sink.info(LEVEL_DETAIL, LOG_MODULE, &format!("service interface: {}", interface.name));

    let directives = interpret_directives(interface, sink);
    InterfaceValidator::new(&directives).with_wire_file(wire.as_ref()).validate(interface)?;
    sink.info(LEVEL_DETAIL, LOG_MODULE, "validation passed");

    let ctx = GenerationContext::builder()
        .interface(interface.clone())
        .directives(directives)
        .source_package(source.package.clone())
        .flags(request.flags.clone())
        .build()?;
    let plan = plan(&ctx, sink)?;

    let mut report = RunReport { interface: interface.name.clone(), units: Vec::new() };
    for unit in &plan {
        let path = unit.output_path(&ctx);
        let outcome = if request.dry_run {
            None
        } else {
            let outcome = unit
                .generate(&ctx)
                .map_err(|e| PipelineError::Unit { path: path.clone(), source: Box::new(e) })?;
            sink.info(LEVEL_DETAIL, LOG_MODULE, &format!("{}: {}", path.display(), outcome));
            Some(outcome)
        };
        report.units.push(UnitReport { kind: unit.kind(), path, outcome });
    }

    if request.dry_run {
        sink.info(LEVEL_NORMAL, LOG_MODULE, &format!("{} files planned", report.units.len()));
    } else {
        sink.info(LEVEL_NORMAL, LOG_MODULE, "all files successfully generated");
    }
    Ok(report)
}
