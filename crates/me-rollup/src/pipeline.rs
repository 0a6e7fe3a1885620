//! Three-stage rollup pipeline

use crate::monthly::MonthlyStage;
use crate::quarterly::QuarterlyStage;
use crate::signal::{FixedQualitySignal, QualitySignal};
use crate::stage::{RollupStage, StageContext, StageOutput};
use crate::weekly::WeeklyStage;
use chrono::{DateTime, Utc};
use me_calendar::WeekStartMode;
use me_model::{DailyObservation, ProjectId, RollupSnapshot};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How monthly and quarterly layers average their members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AggregationMode {
    /// Plain mean of member means
    #[default]
    Unweighted,
    /// Member means weighted by operational days
    Weighted,
}

/// Pipeline settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineConfig {
    /// How weekly date ranges are anchored
    pub week_start_mode: WeekStartMode,
    /// Monthly/quarterly averaging
    pub aggregation_mode: AggregationMode,
    /// Project budget used for quarterly budget analysis
    pub total_budget: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            week_start_mode: WeekStartMode::default(),
            aggregation_mode: AggregationMode::default(),
            total_budget: 0.0,
        }
    }
}

impl PipelineConfig {
    /// With week start mode
    #[must_use]
    pub fn with_week_start_mode(mut self, mode: WeekStartMode) -> Self {
        self.week_start_mode = mode;
        self
    }

    /// With aggregation mode
    #[must_use]
    pub fn with_aggregation_mode(mut self, mode: AggregationMode) -> Self {
        self.aggregation_mode = mode;
        self
    }

    /// With total budget
    #[must_use]
    pub fn with_total_budget(mut self, budget: f64) -> Self {
        self.total_budget = budget;
        self
    }
}

/// Runs weekly, monthly and quarterly stages leaf to root
///
/// Every run starts from the complete observation set; there is no
/// incremental path.
#[derive(Clone)]
pub struct RollupPipeline {
    config: PipelineConfig,
    signal: Arc<dyn QualitySignal>,
}

impl std::fmt::Debug for RollupPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RollupPipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for RollupPipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl RollupPipeline {
    /// Create pipeline with the fixed default quality signal
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            signal: Arc::new(FixedQualitySignal::default()),
        }
    }

    /// With quality signal provider
    #[must_use]
    pub fn with_signal(mut self, signal: Arc<dyn QualitySignal>) -> Self {
        self.signal = signal;
        self
    }

    /// Pipeline settings
    #[inline]
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Build a full snapshot for `project`
    ///
    /// Observations whose date does not parse are left out and reported in
    /// [`RollupSnapshot::warnings`].
    #[must_use]
    pub fn run(
        &self,
        project: &ProjectId,
        observations: &[DailyObservation],
        now: DateTime<Utc>,
    ) -> RollupSnapshot {
        let ctx = StageContext {
            project_id: project,
            generated_at: now,
            config: &self.config,
            signal: self.signal.as_ref(),
        };

        let mut warnings = Vec::new();
        let weekly = run_stage(&WeeklyStage::new(), observations, &ctx, &mut warnings);
        let monthly = run_stage(&MonthlyStage::new(), &weekly, &ctx, &mut warnings);
        let quarterly = run_stage(&QuarterlyStage::new(), &monthly, &ctx, &mut warnings);

        tracing::info!(
            project = %project,
            observations = observations.len(),
            weeks = weekly.len(),
            months = monthly.len(),
            quarters = quarterly.len(),
            warnings = warnings.len(),
            "Rollups recomputed"
        );

        RollupSnapshot {
            weekly,
            monthly,
            quarterly,
            warnings,
            generated_at: Some(now),
        }
    }
}

fn run_stage<S: RollupStage>(
    stage: &S,
    input: &[S::Input],
    ctx: &StageContext<'_>,
    warnings: &mut Vec<me_model::RollupWarning>,
) -> Vec<S::Output> {
    let StageOutput {
        rollups,
        warnings: stage_warnings,
    } = stage.run(input, ctx);
    tracing::debug!(
        stage = stage.name(),
        input = input.len(),
        output = rollups.len(),
        "Stage complete"
    );
    warnings.extend(stage_warnings);
    rollups
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use me_model::Rollup;
    use me_test_utils::{assert_close, observation_on, EPSILON};
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap()
    }

    fn sample() -> Vec<DailyObservation> {
        vec![
            observation_on("2024-01-15", 25.0, 20.0),
            observation_on("2024-01-16", 28.0, 25.0),
            observation_on("2024-02-20", 35.0, 30.0),
            observation_on("2024-04-09", 48.0, 40.0),
        ]
    }

    #[test]
    fn layers_are_built_leaf_to_root() {
        let snapshot = RollupPipeline::default().run(&ProjectId::new("p1"), &sample(), now());

        assert_eq!(snapshot.weekly.len(), 3);
        assert_eq!(snapshot.monthly.len(), 3);
        assert_eq!(snapshot.quarterly.len(), 2);
        assert_eq!(snapshot.generated_at, Some(now()));
        assert!(snapshot.warnings.is_empty());
        assert!(snapshot.weekly.iter().all(|w| w.generated_at == now()));
    }

    #[test]
    fn variance_identity_holds_on_every_layer() {
        let snapshot = RollupPipeline::default().run(&ProjectId::new("p1"), &sample(), now());

        fn check<R: Rollup>(rollups: &[R]) {
            for r in rollups {
                let agg = r.aggregate();
                assert!(
                    (agg.variance - (agg.avg_physical_progress - agg.avg_financial_progress)).abs()
                        < EPSILON
                );
            }
        }
        check(&snapshot.weekly);
        check(&snapshot.monthly);
        check(&snapshot.quarterly);
    }

    #[test]
    fn rerun_is_identical() {
        let pipeline = RollupPipeline::default();
        let a = pipeline.run(&ProjectId::new("p1"), &sample(), now());
        let b = pipeline.run(&ProjectId::new("p1"), &sample(), now());
        assert_eq!(a, b);
    }

    #[test]
    fn iso_mode_moves_week_ranges() {
        let records = [observation_on("2025-03-05", 10.0, 10.0)];
        let fixed = RollupPipeline::default().run(&ProjectId::new("p1"), &records, now());
        let iso = RollupPipeline::new(
            PipelineConfig::default().with_week_start_mode(WeekStartMode::IsoCalendar),
        )
        .run(&ProjectId::new("p1"), &records, now());

        assert_eq!(fixed.weekly[0].id, iso.weekly[0].id);
        assert_ne!(fixed.weekly[0].aggregate.start_date, iso.weekly[0].aggregate.start_date);
        assert_eq!(iso.weekly[0].aggregate.start_date.to_string(), "2025-03-03");
    }

    #[test]
    fn bad_dates_are_reported_not_fatal() {
        let mut records = sample();
        records[1].date = "2024-13-01".into();
        let snapshot = RollupPipeline::default().run(&ProjectId::new("p1"), &records, now());

        assert_eq!(snapshot.warnings.len(), 1);
        assert_eq!(snapshot.warnings[0].observation_id, records[1].id);
        assert_close(snapshot.weekly[0].aggregate.avg_physical_progress, 25.0);
    }

    #[test]
    fn empty_set_is_empty_snapshot() {
        let snapshot = RollupPipeline::default().run(&ProjectId::new("p1"), &[], now());
        assert!(snapshot.is_empty());
        assert!(snapshot.warnings.is_empty());
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"aggregationMode":"weighted","totalBudget":5000.0}"#).unwrap();
        assert_eq!(config.aggregation_mode, AggregationMode::Weighted);
        assert_eq!(config.week_start_mode, WeekStartMode::FixedOffset);
        assert_close(config.total_budget, 5000.0);
    }
}
