//! Generation planner
//!
//! A [`Plan`] is built by walking [`ArtifactKind::CATALOG`] in order and
//! appending each activated artifact, so the precedence of the catalog is the
//! order of the plan.

use std::path::{Path, PathBuf};

use codegen::{write_source, WriteOutcome, WritePolicy};
use logging::{LogSink, LEVEL_DETAIL};

use crate::artifact::ArtifactKind;
use crate::generation_context::GenerationContext;
use crate::{PlanningError, Result, UnitFailure};

const LOG_MODULE: &str = "planner";

/// One planned artifact: where it goes, how it is written and who renders it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationUnit {
    kind: ArtifactKind,
    path: PathBuf,
    policy: WritePolicy,
}

impl GenerationUnit {
    /// Unit for `kind` in the given context
    pub fn new(kind: ArtifactKind, ctx: &GenerationContext) -> Self {
        Self { kind, path: kind.relative_path(ctx), policy: kind.policy() }
    }

    /// The artifact this unit produces
    pub fn kind(&self) -> ArtifactKind { self.kind }

    /// How the file meets an existing one
    pub fn policy(&self) -> WritePolicy { self.policy }

    /// Path relative to the output directory
    pub fn logical_path(&self) -> &Path { &self.path }

    /// Path the unit writes to
    pub fn output_path(&self, ctx: &GenerationContext) -> PathBuf {
        ctx.output_dir().join(&self.path)
    }

    /// Source text of the artifact
    pub fn render(&self, ctx: &GenerationContext) -> Result<String> {
        self.kind.generator().render(ctx)
    }

    /// Render the artifact and apply the write policy
    pub fn generate(&self, ctx: &GenerationContext) -> Result<WriteOutcome> {
        let source = self.render(ctx)?;
        Ok(write_source(&self.output_path(ctx), &source, self.policy)?)
    }
}

/// Ordered generation units of one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    units: Vec<GenerationUnit>,
}

impl Plan {
    /// Units in precedence order
    pub fn iter(&self) -> impl Iterator<Item = &GenerationUnit> { self.units.iter() }

    /// Number of units
    pub fn len(&self) -> usize { self.units.len() }

    /// Whether nothing was requested
    pub fn is_empty(&self) -> bool { self.units.is_empty() }

    /// Artifact kinds in plan order
    pub fn kinds(&self) -> Vec<ArtifactKind> { self.units.iter().map(|u| u.kind).collect() }
}

impl<'a> IntoIterator for &'a Plan {
    type Item = &'a GenerationUnit;
    type IntoIter = std::slice::Iter<'a, GenerationUnit>;

    fn into_iter(self) -> Self::IntoIter { self.units.iter() }
}

/// Builder appending each candidate unit only when it is activated
pub struct PlanBuilder<'a> {
    ctx: &'a GenerationContext,
    units: Vec<GenerationUnit>,
    failures: Vec<UnitFailure>,
}

impl<'a> PlanBuilder<'a> {
    /// Start an empty plan for `ctx`
    pub fn new(ctx: &'a GenerationContext) -> Self {
        Self { ctx, units: Vec::new(), failures: Vec::new() }
    }

    /// Append `kind` if it is active and not yet planned
    pub fn candidate(mut self, kind: ArtifactKind) -> Self {
        if !kind.is_active(self.ctx) || self.units.iter().any(|u| u.kind == kind) {
            return self;
        }
        let missing = kind.missing_prerequisites(self.ctx);
        if missing.is_empty() {
            self.units.push(GenerationUnit::new(kind, self.ctx));
        } else {
            self.failures
                .extend(missing.into_iter().map(|reason| UnitFailure { kind, reason }));
        }
        self
    }

    /// Append every catalog entry, in precedence order
    pub fn catalog(self) -> Self {
        ArtifactKind::CATALOG.iter().fold(self, |builder, kind| builder.candidate(*kind))
    }

    /// The complete plan, or every prerequisite failure
    pub fn build(self) -> std::result::Result<Plan, PlanningError> {
        match PlanningError::from_failures(self.failures) {
            Some(err) => Err(err),
            None => Ok(Plan { units: self.units }),
        }
    }
}

/// Plan every artifact requested by the flags and interface tags
pub fn plan(ctx: &GenerationContext, sink: &dyn LogSink) -> Result<Plan> {
    let plan = PlanBuilder::new(ctx).catalog().build()?;
    for unit in &plan {
        sink.info(
            LEVEL_DETAIL,
            LOG_MODULE,
            &format!("planned {} -> {}", unit.kind(), unit.logical_path().display()),
        );
    }
    if plan.is_empty() {
        sink.info(LEVEL_DETAIL, LOG_MODULE, "nothing requested");
    }
    Ok(plan)
}
