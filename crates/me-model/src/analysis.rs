//! Derived analysis views: variance records and top-level metrics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Planned-vs-actual classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VarianceStatus {
    Ahead,
    OnTrack,
    Behind,
}

impl VarianceStatus {
    /// Stable literal (`ahead`, `on-track`, `behind`)
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            VarianceStatus::Ahead => "ahead",
            VarianceStatus::OnTrack => "on-track",
            VarianceStatus::Behind => "behind",
        }
    }
}

impl fmt::Display for VarianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Variance record for one rollup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressVariance {
    pub period: String,
    pub planned_progress: f64,
    pub actual_progress: f64,
    pub variance: f64,
    pub status: VarianceStatus,
}

/// Direction of the most recent progress change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    #[default]
    Stable,
}

/// Top-level snapshot over the raw observations
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeMetrics {
    pub total_logs: usize,
    pub avg_daily_progress: f64,
    pub trend_direction: TrendDirection,
    pub last_updated: Option<DateTime<Utc>>,
}
