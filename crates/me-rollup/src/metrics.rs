//! Top-level metrics over raw observations

use crate::order::chronological;
use crate::stats::mean;
use me_model::{DailyObservation, MeMetrics, TrendDirection};
use std::cmp::Ordering;

/// Derives [`MeMetrics`] from the observation set
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSummarizer;

impl MetricsSummarizer {
    /// Summarize `observations`
    ///
    /// Trend compares the physical progress of the last two records in date
    /// order; `last_updated` is the `updated_at` of the last one.
    #[must_use]
    pub fn summarize(observations: &[DailyObservation]) -> MeMetrics {
        let ordered = chronological(observations);

        let trend_direction = match ordered.as_slice() {
            [.., previous, last] => {
                match last.physical_progress.partial_cmp(&previous.physical_progress) {
                    Some(Ordering::Greater) => TrendDirection::Up,
                    Some(Ordering::Less) => TrendDirection::Down,
                    _ => TrendDirection::Stable,
                }
            }
            _ => TrendDirection::Stable,
        };

        MeMetrics {
            total_logs: observations.len(),
            avg_daily_progress: mean(observations.iter().map(|o| o.physical_progress)),
            trend_direction,
            last_updated: ordered.last().map(|o| o.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use me_test_utils::{assert_close, observation_on};

    #[test]
    fn empty_is_stable_and_zero() {
        let metrics = MetricsSummarizer::summarize(&[]);
        assert_eq!(metrics.total_logs, 0);
        assert_close(metrics.avg_daily_progress, 0.0);
        assert_eq!(metrics.trend_direction, TrendDirection::Stable);
        assert_eq!(metrics.last_updated, None);
    }

    #[test]
    fn single_record_is_stable() {
        let metrics = MetricsSummarizer::summarize(&[observation_on("2024-01-15", 25.0, 20.0)]);
        assert_eq!(metrics.total_logs, 1);
        assert_eq!(metrics.trend_direction, TrendDirection::Stable);
    }

    #[test]
    fn trend_follows_date_order_not_input_order() {
        let records = [
            observation_on("2024-01-17", 32.0, 30.0),
            observation_on("2024-01-15", 25.0, 20.0),
            observation_on("2024-01-16", 28.0, 25.0),
        ];
        let metrics = MetricsSummarizer::summarize(&records);
        assert_eq!(metrics.trend_direction, TrendDirection::Up);
        assert_close(metrics.avg_daily_progress, 85.0 / 3.0);

        let falling = [
            observation_on("2024-01-15", 30.0, 20.0),
            observation_on("2024-01-16", 28.0, 25.0),
        ];
        assert_eq!(MetricsSummarizer::summarize(&falling).trend_direction, TrendDirection::Down);

        let flat = [
            observation_on("2024-01-15", 30.0, 20.0),
            observation_on("2024-01-16", 30.0, 25.0),
        ];
        assert_eq!(MetricsSummarizer::summarize(&flat).trend_direction, TrendDirection::Stable);
    }

    #[test]
    fn last_updated_is_from_latest_record() {
        let mut early = observation_on("2024-01-15", 25.0, 20.0);
        early.updated_at = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let mut late = observation_on("2024-01-16", 28.0, 25.0);
        late.updated_at = Utc.with_ymd_and_hms(2024, 1, 16, 18, 0, 0).unwrap();

        let metrics = MetricsSummarizer::summarize(&[late.clone(), early]);
        assert_eq!(metrics.last_updated, Some(late.updated_at));
    }
}
