//! Placeholder KPI inputs
//!
//! Quality inspections and milestone tracking are not fed into this engine.
//! The values that stand in for them come from a [`QualitySignal`] so hosts
//! can plug in a real feed and tests stay deterministic.

use me_calendar::IsoWeekId;
use std::ops::RangeInclusive;

/// Quality score used by [`FixedQualitySignal::default`]
pub const DEFAULT_QUALITY_SCORE: f64 = 90.0;

/// Bounds every quality score is clamped into
pub const QUALITY_SCORE_RANGE: RangeInclusive<f64> = 85.0..=100.0;

/// Upper bound on the missed-milestone estimate per month
pub const MAX_MISSED_MILESTONES: u32 = 2;

/// What a signal provider sees when scoring a week
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeeklyContext {
    /// Week being scored
    pub week: IsoWeekId,
    /// Mean physical progress of the week
    pub avg_physical_progress: f64,
    /// Mean financial progress of the week
    pub avg_financial_progress: f64,
    /// Issues reported during the week
    pub total_issues: usize,
}

/// What a signal provider sees when estimating a month
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyContext {
    /// Calendar year
    pub year: i32,
    /// Calendar month, 1..=12
    pub month: u32,
    /// Mean physical progress of the month
    pub avg_physical_progress: f64,
    /// Issues reported during the month
    pub total_issues: usize,
}

/// Source of placeholder KPI inputs
#[cfg_attr(test, mockall::automock)]
pub trait QualitySignal: Send + Sync {
    /// Quality score for a week; clamped to [`QUALITY_SCORE_RANGE`] by the caller
    fn quality_score(&self, ctx: &WeeklyContext) -> f64;

    /// Missed milestones for a month; capped at [`MAX_MISSED_MILESTONES`] by the caller
    fn missed_milestones(&self, ctx: &MonthlyContext) -> u32;
}

/// Constant signal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedQualitySignal {
    quality_score: f64,
    missed_milestones: u32,
}

impl FixedQualitySignal {
    /// Create signal with a fixed quality score and no missed milestones
    #[inline]
    #[must_use]
    pub fn new(quality_score: f64) -> Self {
        Self {
            quality_score,
            missed_milestones: 0,
        }
    }

    /// With fixed missed-milestone count
    #[inline]
    #[must_use]
    pub fn with_missed_milestones(mut self, missed: u32) -> Self {
        self.missed_milestones = missed;
        self
    }
}

impl Default for FixedQualitySignal {
    fn default() -> Self {
        Self::new(DEFAULT_QUALITY_SCORE)
    }
}

impl QualitySignal for FixedQualitySignal {
    fn quality_score(&self, _ctx: &WeeklyContext) -> f64 {
        self.quality_score
    }

    fn missed_milestones(&self, _ctx: &MonthlyContext) -> u32 {
        self.missed_milestones
    }
}
