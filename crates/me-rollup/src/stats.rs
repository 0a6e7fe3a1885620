//! Division-safe averaging and layer merging

use crate::pipeline::AggregationMode;
use me_calendar::DateRange;
use me_model::{PeriodAggregate, WeatherSummary};

/// Arithmetic mean; `0.0` for no values
pub(crate) fn mean<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    sum / count.max(1) as f64
}

/// Mean weighted by `weight`; `None` when every weight is zero
pub(crate) fn weighted_mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = (f64, u32)>,
{
    let (sum, total) = values
        .into_iter()
        .fold((0.0, 0u64), |(sum, total), (v, w)| {
            (sum + v * f64::from(w), total + u64::from(w))
        });
    (total > 0).then(|| sum / total as f64)
}

/// Merge lower-layer aggregates into one covering `range`
///
/// Progress and labor are means of the member means, weighted by
/// operational days under [`AggregationMode::Weighted`]. Counts are summed and
/// variance is recomputed from the merged means.
pub(crate) fn combine_aggregates(
    members: &[&PeriodAggregate],
    range: DateRange,
    mode: AggregationMode,
) -> PeriodAggregate {
    let layer_mean = |value: fn(&PeriodAggregate) -> f64| -> f64 {
        match mode {
            AggregationMode::Unweighted => mean(members.iter().map(|a| value(a))),
            AggregationMode::Weighted => {
                weighted_mean(members.iter().map(|a| (value(a), a.operational_days)))
                    .unwrap_or_else(|| mean(members.iter().map(|a| value(a))))
            }
        }
    };

    let avg_physical = layer_mean(|a| a.avg_physical_progress);
    let avg_financial = layer_mean(|a| a.avg_financial_progress);
    let mut weather_summary = WeatherSummary::default();
    for member in members {
        weather_summary.merge(&member.weather_summary);
    }

    PeriodAggregate {
        start_date: range.start,
        end_date: range.end,
        avg_physical_progress: avg_physical,
        avg_financial_progress: avg_financial,
        total_accomplishments: members.iter().map(|a| a.total_accomplishments).sum(),
        total_issues: members.iter().map(|a| a.total_issues).sum(),
        avg_labor_count: layer_mean(|a| a.avg_labor_count),
        operational_days: members.iter().map(|a| a.operational_days).sum(),
        weather_summary,
        variance: avg_physical - avg_financial,
    }
}
