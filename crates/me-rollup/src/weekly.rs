//! Daily observations -> weekly rollups

use crate::kpi::KpiDeriver;
use crate::order::chronological;
use crate::signal::WeeklyContext;
use crate::stage::{RollupStage, StageContext, StageOutput};
use crate::stats::mean;
use me_calendar::{iso_week_of, week_range, IsoWeekId};
use me_model::{DailyObservation, PeriodAggregate, RollupWarning, WeatherSummary, WeeklyRollup};
use std::collections::BTreeMap;

/// Groups observations by ISO week
#[derive(Debug, Clone, Copy, Default)]
pub struct WeeklyStage;

impl WeeklyStage {
    /// Create weekly stage
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn build(
        week: IsoWeekId,
        members: &[&DailyObservation],
        ctx: &StageContext<'_>,
    ) -> Result<WeeklyRollup, me_calendar::CalendarError> {
        let range = week_range(week, ctx.config.week_start_mode)?;

        let avg_physical = mean(members.iter().map(|o| o.physical_progress));
        let avg_financial = mean(members.iter().map(|o| o.financial_progress));
        let avg_labor = mean(members.iter().map(|o| f64::from(o.labor_count)));
        let total_accomplishments: usize = members.iter().map(|o| o.accomplishments.len()).sum();
        let total_issues: usize = members.iter().map(|o| o.issues.len()).sum();
        let weather_summary: WeatherSummary = members.iter().map(|o| o.weather).collect();

        let quality = ctx.signal.quality_score(&WeeklyContext {
            week,
            avg_physical_progress: avg_physical,
            avg_financial_progress: avg_financial,
            total_issues,
        });

        Ok(WeeklyRollup {
            id: WeeklyRollup::key_id(ctx.project_id, week.year, week.week),
            project_id: ctx.project_id.clone(),
            week: week.week,
            year: week.year,
            aggregate: PeriodAggregate {
                start_date: range.start,
                end_date: range.end,
                avg_physical_progress: avg_physical,
                avg_financial_progress: avg_financial,
                total_accomplishments,
                total_issues,
                avg_labor_count: avg_labor,
                operational_days: u32::try_from(members.len()).unwrap_or(u32::MAX),
                weather_summary,
                variance: avg_physical - avg_financial,
            },
            kpis: KpiDeriver::weekly(avg_physical, avg_financial, avg_labor, quality),
            log_ids: members.iter().map(|o| o.id.clone()).collect(),
            generated_at: ctx.generated_at,
        })
    }
}

impl RollupStage for WeeklyStage {
    type Input = DailyObservation;
    type Output = WeeklyRollup;

    fn name(&self) -> &'static str {
        "weekly"
    }

    fn run(&self, input: &[DailyObservation], ctx: &StageContext<'_>) -> StageOutput<WeeklyRollup> {
        let mut warnings = Vec::new();
        let mut groups: BTreeMap<IsoWeekId, Vec<&DailyObservation>> = BTreeMap::new();

        for obs in chronological(input) {
            match obs.calendar_date() {
                Ok(date) => groups.entry(iso_week_of(date)).or_default().push(obs),
                Err(err) => {
                    tracing::warn!(id = %obs.id, date = %obs.date, "Skipping observation: {}", err);
                    warnings.push(RollupWarning {
                        observation_id: obs.id.clone(),
                        date: obs.date.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        let mut rollups = Vec::with_capacity(groups.len());
        for (week, members) in groups {
            match Self::build(week, &members, ctx) {
                Ok(rollup) => rollups.push(rollup),
                Err(err) => {
                    tracing::warn!(%week, "Skipping week: {}", err);
                    warnings.extend(members.iter().map(|obs| RollupWarning {
                        observation_id: obs.id.clone(),
                        date: obs.date.clone(),
                        reason: err.to_string(),
                    }));
                }
            }
        }

        StageOutput { rollups, warnings }
    }
}
