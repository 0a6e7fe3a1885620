//! KPI derivation
//!
//! Every formula here works on aggregate numbers only; stages decide what
//! those aggregates are.

use crate::signal::{MAX_MISSED_MILESTONES, QUALITY_SCORE_RANGE};
use crate::stats::mean;
use me_model::{
    BudgetAnalysis, KpiBundle, MilestoneEstimate, MonthlyKpis, QuarterlyKpis, RiskAssessment,
};

/// Physical-progress points per milestone
pub const MILESTONE_STEP: f64 = 25.0;

/// Milestones in a project (0/25/50/75/100 percent gates)
pub const TOTAL_MILESTONES: u32 = 4;

const ON_TIME_BONUS: f64 = 10.0;
const BUDGET_BONUS: f64 = 15.0;
const PRODUCTIVITY_SCALE: f64 = 10.0;

/// KPI formulas for every rollup layer
#[derive(Debug, Clone, Copy, Default)]
pub struct KpiDeriver;

impl KpiDeriver {
    /// Weekly KPI bundle
    ///
    /// `productivity_index` is 0 when no labor was recorded.
    #[must_use]
    pub fn weekly(
        avg_physical: f64,
        avg_financial: f64,
        avg_labor: f64,
        quality_score: f64,
    ) -> KpiBundle {
        let productivity_index = if avg_labor > 0.0 {
            (avg_physical / avg_labor) * PRODUCTIVITY_SCALE
        } else {
            0.0
        };

        KpiBundle {
            on_time_performance: (avg_physical + ON_TIME_BONUS).min(100.0),
            budget_efficiency: (avg_financial + BUDGET_BONUS).min(100.0),
            quality_score: Self::bounded_quality(quality_score),
            productivity_index,
        }
    }

    /// Clamp a quality score into [`QUALITY_SCORE_RANGE`]
    ///
    /// Non-finite input falls back to the lower bound.
    #[inline]
    #[must_use]
    pub fn bounded_quality(score: f64) -> f64 {
        if score.is_finite() {
            score.clamp(*QUALITY_SCORE_RANGE.start(), *QUALITY_SCORE_RANGE.end())
        } else {
            *QUALITY_SCORE_RANGE.start()
        }
    }

    /// Field-wise mean of KPI bundles
    #[must_use]
    pub fn average<'a, I>(bundles: I) -> KpiBundle
    where
        I: IntoIterator<Item = &'a KpiBundle>,
        I::IntoIter: Clone,
    {
        let iter = bundles.into_iter();
        KpiBundle {
            on_time_performance: mean(iter.clone().map(|k| k.on_time_performance)),
            budget_efficiency: mean(iter.clone().map(|k| k.budget_efficiency)),
            quality_score: mean(iter.clone().map(|k| k.quality_score)),
            productivity_index: mean(iter.map(|k| k.productivity_index)),
        }
    }

    /// Share of the month with observations, capped at 100
    #[must_use]
    pub fn resource_utilization(operational_days: u32, days_in_month: u32) -> f64 {
        if days_in_month == 0 {
            return 0.0;
        }
        (f64::from(operational_days) / f64::from(days_in_month) * 100.0).min(100.0)
    }

    /// Monthly KPIs from the member weeks' bundles
    #[must_use]
    pub fn monthly<'a, I>(weekly: I, operational_days: u32, days_in_month: u32) -> MonthlyKpis
    where
        I: IntoIterator<Item = &'a KpiBundle>,
        I::IntoIter: Clone,
    {
        MonthlyKpis {
            base: Self::average(weekly),
            resource_utilization: Self::resource_utilization(operational_days, days_in_month),
        }
    }

    /// Quarterly KPIs from the member months' bundles
    ///
    /// Overall health is the mean of on-time performance, budget efficiency,
    /// quality and resource utilization.
    #[must_use]
    pub fn quarterly(monthly: &[&MonthlyKpis]) -> QuarterlyKpis {
        let base = Self::average(monthly.iter().map(|m| &m.base));
        let resource_utilization = mean(monthly.iter().map(|m| m.resource_utilization));
        let overall_project_health = mean([
            base.on_time_performance,
            base.budget_efficiency,
            base.quality_score,
            resource_utilization,
        ]);

        QuarterlyKpis {
            base,
            resource_utilization,
            overall_project_health,
        }
    }

    /// Milestone estimate from physical progress
    ///
    /// `missed` is capped at [`MAX_MISSED_MILESTONES`]; upcoming is what is
    /// left of [`TOTAL_MILESTONES`].
    #[must_use]
    pub fn milestones(avg_physical: f64, missed: u32) -> MilestoneEstimate {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let achieved = ((avg_physical.max(0.0) / MILESTONE_STEP).floor() as u32).min(TOTAL_MILESTONES);
        let missed = missed.min(MAX_MISSED_MILESTONES);
        MilestoneEstimate {
            achieved,
            missed,
            upcoming: TOTAL_MILESTONES.saturating_sub(achieved + missed),
        }
    }

    /// Budget position for a quarter
    ///
    /// `burn_rate` is 0 when there were no operational days.
    #[must_use]
    pub fn budget(total_budget: f64, avg_financial: f64, operational_days: u32) -> BudgetAnalysis {
        let utilization_rate = avg_financial / 100.0;
        let utilized_budget = total_budget * utilization_rate;
        let burn_rate = if operational_days > 0 {
            utilized_budget / f64::from(operational_days)
        } else {
            0.0
        };

        BudgetAnalysis {
            allocated_budget: total_budget,
            utilized_budget,
            remaining_budget: total_budget - utilized_budget,
            utilization_rate,
            burn_rate,
        }
    }

    /// Risk buckets from the quarter's issue count
    #[must_use]
    pub fn risk(total_issues: usize) -> RiskAssessment {
        let issues = u32::try_from(total_issues).unwrap_or(u32::MAX);
        RiskAssessment {
            low_risk: 100u32.saturating_sub(issues.saturating_mul(10)),
            medium_risk: issues.saturating_mul(5).min(50),
            high_risk: issues.saturating_mul(3).min(30),
            critical_risk: issues.saturating_sub(5).min(20),
        }
    }
}
