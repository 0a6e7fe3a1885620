//! Monthly rollups -> quarterly rollups

use crate::kpi::KpiDeriver;
use crate::stage::{RollupStage, StageContext, StageOutput};
use crate::stats::combine_aggregates;
use me_calendar::{quarter_of, quarter_range, CalendarError};
use me_model::{MonthlyRollup, QuarterlyRollup, RollupWarning};
use std::collections::BTreeMap;

/// Groups monthly rollups by (year, quarter)
#[derive(Debug, Clone, Copy, Default)]
pub struct QuarterlyStage;

impl QuarterlyStage {
    /// Create quarterly stage
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn build(
        (year, quarter): (i32, u32),
        months: &[&MonthlyRollup],
        ctx: &StageContext<'_>,
    ) -> Result<QuarterlyRollup, CalendarError> {
        let range = quarter_range(year, quarter)?;
        let members: Vec<_> = months.iter().map(|m| &m.aggregate).collect();
        let aggregate = combine_aggregates(&members, range, ctx.config.aggregation_mode);
        let kpis: Vec<_> = months.iter().map(|m| &m.kpis).collect();

        Ok(QuarterlyRollup {
            id: QuarterlyRollup::key_id(ctx.project_id, year, quarter),
            project_id: ctx.project_id.clone(),
            quarter,
            year,
            kpis: KpiDeriver::quarterly(&kpis),
            budget_analysis: KpiDeriver::budget(
                ctx.config.total_budget,
                aggregate.avg_financial_progress,
                aggregate.operational_days,
            ),
            risk_assessment: KpiDeriver::risk(aggregate.total_issues),
            month_ids: months.iter().map(|m| m.id.clone()).collect(),
            aggregate,
            generated_at: ctx.generated_at,
        })
    }
}

impl RollupStage for QuarterlyStage {
    type Input = MonthlyRollup;
    type Output = QuarterlyRollup;

    fn name(&self) -> &'static str {
        "quarterly"
    }

    fn run(&self, input: &[MonthlyRollup], ctx: &StageContext<'_>) -> StageOutput<QuarterlyRollup> {
        let mut out = StageOutput::clean(Vec::new());
        let mut groups: BTreeMap<(i32, u32), Vec<&MonthlyRollup>> = BTreeMap::new();

        for month in input {
            match quarter_of(month.month) {
                Ok(quarter) => groups.entry((month.year, quarter)).or_default().push(month),
                Err(err) => {
                    tracing::warn!(id = %month.id, "Skipping month: {}", err);
                    out.warnings.push(RollupWarning {
                        observation_id: month.id.as_str().into(),
                        date: month.aggregate.start_date.to_string(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        for (key, months) in groups {
            match Self::build(key, &months, ctx) {
                Ok(rollup) => out.rollups.push(rollup),
                Err(err) => {
                    tracing::warn!(year = key.0, quarter = key.1, "Skipping quarter: {}", err);
                    out.warnings.extend(months.iter().map(|m| RollupWarning {
                        observation_id: m.id.as_str().into(),
                        date: m.aggregate.start_date.to_string(),
                        reason: err.to_string(),
                    }));
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monthly::MonthlyStage;
    use crate::pipeline::PipelineConfig;
    use crate::signal::FixedQualitySignal;
    use crate::weekly::WeeklyStage;
    use chrono::{NaiveDate, TimeZone, Utc};
    use me_model::{DailyObservation, ProjectId, Weather};
    use me_test_utils::{assert_close, detailed_observation, observation_on};

    fn run_with(input: &[DailyObservation], config: &PipelineConfig) -> StageOutput<QuarterlyRollup> {
        let project = ProjectId::new("p1");
        let signal = FixedQualitySignal::default();
        let ctx = StageContext {
            project_id: &project,
            generated_at: Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap(),
            config,
            signal: &signal,
        };
        let weekly = WeeklyStage::new().run(input, &ctx);
        let monthly = MonthlyStage::new().run(&weekly.rollups, &ctx);
        QuarterlyStage::new().run(&monthly.rollups, &ctx)
    }

    fn run(input: &[DailyObservation]) -> StageOutput<QuarterlyRollup> {
        run_with(input, &PipelineConfig::default())
    }

    #[test]
    fn one_quarter_from_three_months() {
        let out = run(&[
            observation_on("2024-01-15", 10.0, 10.0),
            observation_on("2024-02-13", 20.0, 15.0),
            observation_on("2024-03-12", 30.0, 20.0),
        ]);

        assert_eq!(out.rollups.len(), 1);
        let q1 = &out.rollups[0];
        assert_eq!(q1.id, "p1-2024-Q1");
        assert_eq!(q1.month_ids, vec!["p1-2024-M01", "p1-2024-M02", "p1-2024-M03"]);
        assert_close(q1.aggregate.avg_physical_progress, 20.0);
        assert_close(q1.aggregate.avg_financial_progress, 15.0);
        assert_close(q1.aggregate.variance, 5.0);
        assert_eq!(q1.aggregate.operational_days, 3);
        assert_eq!(q1.aggregate.start_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(q1.aggregate.end_date, NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
    }

    #[test]
    fn budget_uses_configured_total() {
        let config = PipelineConfig::default().with_total_budget(2_000_000.0);
        let out = run_with(
            &[
                observation_on("2024-04-15", 30.0, 20.0),
                observation_on("2024-04-16", 30.0, 30.0),
            ],
            &config,
        );

        let q2 = &out.rollups[0];
        assert_eq!(q2.quarter, 2);
        let budget = &q2.budget_analysis;
        assert_close(budget.allocated_budget, 2_000_000.0);
        assert_close(budget.utilization_rate, 0.25);
        assert_close(budget.utilized_budget, 500_000.0);
        assert_close(budget.remaining_budget, 1_500_000.0);
        assert_close(budget.burn_rate, 250_000.0);
    }

    #[test]
    fn risk_from_issue_total() {
        let out = run(&[
            detailed_observation("2024-07-15", 40.0, 30.0, 1, 4, Weather::Stormy, 12),
            detailed_observation("2024-08-13", 45.0, 35.0, 1, 3, Weather::Cloudy, 12),
        ]);

        let risk = out.rollups[0].risk_assessment;
        assert_eq!(
            (risk.low_risk, risk.medium_risk, risk.high_risk, risk.critical_risk),
            (30, 35, 21, 2)
        );
    }

    #[test]
    fn health_is_mean_of_four_kpis() {
        let out = run(&[observation_on("2024-01-15", 20.0, 10.0)]);
        let kpis = &out.rollups[0].kpis;
        let expected = (kpis.base.on_time_performance
            + kpis.base.budget_efficiency
            + kpis.base.quality_score
            + kpis.resource_utilization)
            / 4.0;
        assert_close(kpis.overall_project_health, expected);
        assert_close(kpis.resource_utilization, 1.0 / 31.0 * 100.0);
    }

    #[test]
    fn quarters_span_years_in_order() {
        let out = run(&[
            observation_on("2025-01-14", 60.0, 55.0),
            observation_on("2024-11-12", 50.0, 45.0),
        ]);

        let keys: Vec<(i32, u32)> = out.rollups.iter().map(|q| (q.year, q.quarter)).collect();
        assert_eq!(keys, vec![(2024, 4), (2025, 1)]);
    }

    #[test]
    fn empty_months_give_nothing() {
        let out = run(&[]);
        assert!(out.rollups.is_empty());
        assert!(out.warnings.is_empty());
    }
}
