//! Planned-vs-actual variance

use me_model::{ProgressVariance, Rollup, VarianceStatus};

/// Points below plan still counted as on track
pub const ON_TRACK_TOLERANCE: f64 = 5.0;

/// Turns rollups into labeled variance records
#[derive(Debug, Clone, Copy, Default)]
pub struct VarianceAnalyzer;

impl VarianceAnalyzer {
    /// One record per rollup, in input order
    ///
    /// Planned progress is the financial average, actual progress the
    /// physical average.
    #[must_use]
    pub fn analyze<R: Rollup>(rollups: &[R]) -> Vec<ProgressVariance> {
        rollups
            .iter()
            .map(|rollup| {
                let agg = rollup.aggregate();
                ProgressVariance {
                    period: rollup.label(),
                    planned_progress: agg.avg_financial_progress,
                    actual_progress: agg.avg_physical_progress,
                    variance: agg.variance,
                    status: Self::classify(agg.variance),
                }
            })
            .collect()
    }

    /// Tri-state classification of a variance
    #[inline]
    #[must_use]
    pub fn classify(variance: f64) -> VarianceStatus {
        if variance >= 0.0 {
            VarianceStatus::Ahead
        } else if variance > -ON_TRACK_TOLERANCE {
            VarianceStatus::OnTrack
        } else {
            VarianceStatus::Behind
        }
    }
}
