//! Weekly rollups -> monthly rollups

use crate::kpi::KpiDeriver;
use crate::signal::MonthlyContext;
use crate::stage::{RollupStage, StageContext, StageOutput};
use crate::stats::combine_aggregates;
use chrono::Datelike;
use me_calendar::{days_in_month, month_range, CalendarError};
use me_model::{MonthlyRollup, RollupWarning, WeeklyRollup};
use std::collections::BTreeMap;

/// Groups weekly rollups by the calendar month of their start date
#[derive(Debug, Clone, Copy, Default)]
pub struct MonthlyStage;

impl MonthlyStage {
    /// Create monthly stage
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn build(
        (year, month): (i32, u32),
        weeks: &[&WeeklyRollup],
        ctx: &StageContext<'_>,
    ) -> Result<MonthlyRollup, CalendarError> {
        let range = month_range(year, month)?;
        let days = days_in_month(year, month)?;

        let members: Vec<_> = weeks.iter().map(|w| &w.aggregate).collect();
        let aggregate = combine_aggregates(&members, range, ctx.config.aggregation_mode);

        let missed = ctx.signal.missed_milestones(&MonthlyContext {
            year,
            month,
            avg_physical_progress: aggregate.avg_physical_progress,
            total_issues: aggregate.total_issues,
        });

        Ok(MonthlyRollup {
            id: MonthlyRollup::key_id(ctx.project_id, year, month),
            project_id: ctx.project_id.clone(),
            month,
            year,
            kpis: KpiDeriver::monthly(weeks.iter().map(|w| &w.kpis), aggregate.operational_days, days),
            milestones: KpiDeriver::milestones(aggregate.avg_physical_progress, missed),
            week_ids: weeks.iter().map(|w| w.id.clone()).collect(),
            aggregate,
            generated_at: ctx.generated_at,
        })
    }
}

impl RollupStage for MonthlyStage {
    type Input = WeeklyRollup;
    type Output = MonthlyRollup;

    fn name(&self) -> &'static str {
        "monthly"
    }

    fn run(&self, input: &[WeeklyRollup], ctx: &StageContext<'_>) -> StageOutput<MonthlyRollup> {
        let mut groups: BTreeMap<(i32, u32), Vec<&WeeklyRollup>> = BTreeMap::new();
        for week in input {
            let start = week.aggregate.start_date;
            groups.entry((start.year(), start.month())).or_default().push(week);
        }

        let mut out = StageOutput::clean(Vec::with_capacity(groups.len()));
        for (key, weeks) in groups {
            match Self::build(key, &weeks, ctx) {
                Ok(rollup) => out.rollups.push(rollup),
                Err(err) => {
                    tracing::warn!(year = key.0, month = key.1, "Skipping month: {}", err);
                    out.warnings.extend(weeks.iter().flat_map(|w| {
                        w.log_ids.iter().map(|id| RollupWarning {
                            observation_id: id.clone(),
                            date: w.aggregate.start_date.to_string(),
                            reason: err.to_string(),
                        })
                    }));
                }
            }
        }
        out
    }
}
