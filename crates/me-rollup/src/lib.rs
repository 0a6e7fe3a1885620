//! M&E Rollup System
//!
//! Turns a project's daily observations into layered period summaries and
//! the analysis views built on them.
//!
//! # Core Concepts
//!
//! - [`RollupStage`]: one aggregation layer (weekly, monthly, quarterly)
//! - [`RollupPipeline`]: runs the three stages leaf to root into a
//!   [`RollupSnapshot`](me_model::RollupSnapshot)
//! - [`KpiDeriver`]: KPI, milestone, budget and risk derivations
//! - [`QualitySignal`]: injected source for placeholder KPI inputs
//! - [`FilterEngine`]: period + range selection with a summary
//! - [`VarianceAnalyzer`]: planned-vs-actual classification
//! - [`MetricsSummarizer`]: top-level metrics over raw observations
//!
//! Higher layers only ever read the layer directly below them.
//!
//! # Example
//!
//! ```rust,ignore
//! use me_rollup::{PipelineConfig, RollupPipeline};
//!
//! let pipeline = RollupPipeline::new(PipelineConfig::default());
//! let snapshot = pipeline.run(&project, &observations, clock.now());
//! let variance = VarianceAnalyzer::analyze(&snapshot.weekly);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod filter;
mod kpi;
mod metrics;
mod monthly;
mod order;
mod pipeline;
mod quarterly;
mod signal;
mod stage;
mod stats;
mod variance;
mod weekly;

// Re-exports
pub use filter::FilterEngine;
pub use kpi::{KpiDeriver, MILESTONE_STEP, TOTAL_MILESTONES};
pub use metrics::MetricsSummarizer;
pub use monthly::MonthlyStage;
pub use order::chronological;
pub use pipeline::{AggregationMode, PipelineConfig, RollupPipeline};
pub use quarterly::QuarterlyStage;
pub use signal::{
    FixedQualitySignal, MonthlyContext, QualitySignal, WeeklyContext, DEFAULT_QUALITY_SCORE,
    MAX_MISSED_MILESTONES, QUALITY_SCORE_RANGE,
};
pub use stage::{RollupStage, StageContext, StageOutput};
pub use variance::{VarianceAnalyzer, ON_TRACK_TOLERANCE};
pub use weekly::WeeklyStage;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
