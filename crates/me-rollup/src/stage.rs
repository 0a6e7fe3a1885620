//! Rollup stage trait
//!
//! Each stage aggregates one layer into the next. Stages never fail: input
//! they cannot place is reported as a [`RollupWarning`] and skipped.

use crate::pipeline::PipelineConfig;
use crate::signal::QualitySignal;
use chrono::{DateTime, Utc};
use me_model::{ProjectId, Rollup, RollupWarning};

/// Shared inputs for one pipeline run
#[derive(Clone, Copy)]
pub struct StageContext<'a> {
    /// Project the rollups belong to
    pub project_id: &'a ProjectId,
    /// Stamp applied to every rollup of the run
    pub generated_at: DateTime<Utc>,
    /// Pipeline settings
    pub config: &'a PipelineConfig,
    /// Placeholder KPI source
    pub signal: &'a dyn QualitySignal,
}

impl std::fmt::Debug for StageContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageContext")
            .field("project_id", self.project_id)
            .field("generated_at", &self.generated_at)
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}

/// Result of one stage
#[derive(Debug, Clone, PartialEq)]
pub struct StageOutput<T> {
    /// Rollups in chronological order
    pub rollups: Vec<T>,
    /// Inputs left out of bucketing
    pub warnings: Vec<RollupWarning>,
}

impl<T> StageOutput<T> {
    /// Output without warnings
    #[inline]
    #[must_use]
    pub fn clean(rollups: Vec<T>) -> Self {
        Self {
            rollups,
            warnings: Vec::new(),
        }
    }
}

/// One aggregation layer
///
/// # Contract
/// - Deterministic: equal input and context give equal output
/// - Reads only `input`, never an earlier layer
/// - Empty input gives empty output
pub trait RollupStage {
    /// Records consumed
    type Input;

    /// Rollups produced
    type Output: Rollup;

    /// Stage name for logs
    fn name(&self) -> &'static str;

    /// Aggregate `input` into rollups
    fn run(&self, input: &[Self::Input], ctx: &StageContext<'_>) -> StageOutput<Self::Output>;
}
