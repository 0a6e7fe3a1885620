//! Period + date-range selection

use crate::order::chronological;
use crate::stats::mean;
use me_calendar::DateRange;
use me_model::{
    AggregatedData, DailyObservation, FilterPeriod, FilterSummary, FilteredRecords, MeFilter,
    Rollup, RollupSnapshot,
};

/// Selects raw observations or one rollup layer and summarizes the result
#[derive(Debug, Clone, Copy)]
pub struct FilterEngine<'a> {
    snapshot: &'a RollupSnapshot,
    observations: &'a [DailyObservation],
}

impl<'a> FilterEngine<'a> {
    /// Create engine over one consistent snapshot and its observations
    #[inline]
    #[must_use]
    pub fn new(snapshot: &'a RollupSnapshot, observations: &'a [DailyObservation]) -> Self {
        Self {
            snapshot,
            observations,
        }
    }

    /// Apply `filter`; `None` when no filter is given
    ///
    /// Daily records match when their date lies in the range. Rollups match
    /// only when their whole range lies inside it.
    #[must_use]
    pub fn apply(&self, filter: Option<&MeFilter>) -> Option<AggregatedData> {
        let filter = filter?;
        let range = filter.date_range;

        let (records, totals) = match filter.period {
            FilterPeriod::Daily => {
                let selected: Vec<DailyObservation> = chronological(self.observations)
                    .into_iter()
                    .filter(|o| o.calendar_date().is_ok_and(|d| range.contains(d)))
                    .cloned()
                    .collect();
                let totals = Totals::from_observations(&selected);
                (FilteredRecords::Daily(selected), totals)
            }
            FilterPeriod::Weekly => {
                let selected = contained(&self.snapshot.weekly, range);
                let totals = Totals::from_rollups(&selected);
                (FilteredRecords::Weekly(selected), totals)
            }
            FilterPeriod::Monthly => {
                let selected = contained(&self.snapshot.monthly, range);
                let totals = Totals::from_rollups(&selected);
                (FilteredRecords::Monthly(selected), totals)
            }
            FilterPeriod::Quarterly => {
                let selected = contained(&self.snapshot.quarterly, range);
                let totals = Totals::from_rollups(&selected);
                (FilteredRecords::Quarterly(selected), totals)
            }
        };

        tracing::debug!(period = %filter.period, %range, matched = records.len(), "Filter applied");

        Some(AggregatedData {
            filter: *filter,
            summary: totals.into_summary(filter),
            records,
        })
    }
}

fn contained<R: Rollup + Clone>(rollups: &[R], range: DateRange) -> Vec<R> {
    rollups
        .iter()
        .filter(|r| range.contains_range(&r.range()))
        .cloned()
        .collect()
}

struct Totals {
    entries: usize,
    avg_physical: f64,
    avg_financial: f64,
    accomplishments: usize,
    issues: usize,
}

impl Totals {
    fn from_observations(records: &[DailyObservation]) -> Self {
        Self {
            entries: records.len(),
            avg_physical: mean(records.iter().map(|o| o.physical_progress)),
            avg_financial: mean(records.iter().map(|o| o.financial_progress)),
            accomplishments: records.iter().map(|o| o.accomplishments.len()).sum(),
            issues: records.iter().map(|o| o.issues.len()).sum(),
        }
    }

    fn from_rollups<R: Rollup>(records: &[R]) -> Self {
        Self {
            entries: records.len(),
            avg_physical: mean(records.iter().map(|r| r.aggregate().avg_physical_progress)),
            avg_financial: mean(records.iter().map(|r| r.aggregate().avg_financial_progress)),
            accomplishments: records.iter().map(|r| r.aggregate().total_accomplishments).sum(),
            issues: records.iter().map(|r| r.aggregate().total_issues).sum(),
        }
    }

    fn into_summary(self, filter: &MeFilter) -> FilterSummary {
        FilterSummary {
            total_entries: self.entries,
            avg_physical_progress: self.avg_physical,
            avg_financial_progress: self.avg_financial,
            total_accomplishments: self.accomplishments,
            total_issues: self.issues,
            overall_variance: self.avg_physical - self.avg_financial,
            period_label: format!("{} view: {}", filter.period.title(), filter.date_range),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::RollupPipeline;
    use chrono::{TimeZone, Utc};
    use me_model::{ProjectId, Weather};
    use me_test_utils::{assert_close, detailed_observation, observation_on};

    fn records() -> Vec<DailyObservation> {
        vec![
            detailed_observation("2024-01-15", 25.0, 20.0, 2, 1, Weather::Sunny, 10),
            detailed_observation("2024-01-16", 28.0, 25.0, 1, 0, Weather::Cloudy, 12),
            observation_on("2024-01-30", 33.0, 28.0),
            observation_on("2024-02-06", 36.0, 30.0),
        ]
    }

    fn snapshot(records: &[DailyObservation]) -> RollupSnapshot {
        RollupPipeline::default().run(
            &ProjectId::new("p1"),
            records,
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
        )
    }

    #[test]
    fn no_filter_no_result() {
        let records = records();
        let snapshot = snapshot(&records);
        assert!(FilterEngine::new(&snapshot, &records).apply(None).is_none());
    }

    #[test]
    fn daily_selection_and_summary() {
        let records = records();
        let snapshot = snapshot(&records);
        let filter = MeFilter::parse(FilterPeriod::Daily, "2024-01-15", "2024-01-16").unwrap();

        let data = FilterEngine::new(&snapshot, &records).apply(Some(&filter)).unwrap();
        assert_eq!(data.records.len(), 2);
        assert_eq!(data.summary.total_entries, 2);
        assert_close(data.summary.avg_physical_progress, 26.5);
        assert_close(data.summary.avg_financial_progress, 22.5);
        assert_close(data.summary.overall_variance, 4.0);
        assert_eq!(data.summary.total_accomplishments, 3);
        assert_eq!(data.summary.total_issues, 1);
        assert_eq!(data.summary.period_label, "Daily view: 2024-01-15 to 2024-01-16");
    }

    #[test]
    fn daily_full_span_counts_everything() {
        let records = records();
        let snapshot = snapshot(&records);
        let filter = MeFilter::parse(FilterPeriod::Daily, "2024-01-01", "2024-12-31").unwrap();

        let data = FilterEngine::new(&snapshot, &records).apply(Some(&filter)).unwrap();
        assert_eq!(data.summary.total_entries, records.len());
    }

    #[test]
    fn weekly_requires_full_containment() {
        let records = records();
        let snapshot = snapshot(&records);
        // week 5 runs 2024-01-29..=2024-02-04 and straddles the month end
        let filter = MeFilter::parse(FilterPeriod::Weekly, "2024-01-01", "2024-01-31").unwrap();

        let data = FilterEngine::new(&snapshot, &records).apply(Some(&filter)).unwrap();
        let FilteredRecords::Weekly(weeks) = &data.records else {
            panic!("expected weekly records");
        };
        let ids: Vec<&str> = weeks.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["p1-2024-W03"]);
        assert_eq!(data.summary.period_label, "Weekly view: 2024-01-01 to 2024-01-31");
    }

    #[test]
    fn monthly_and_quarterly_layers() {
        let records = records();
        let snapshot = snapshot(&records);

        let months = MeFilter::parse(FilterPeriod::Monthly, "2024-01-01", "2024-02-29").unwrap();
        let data = FilterEngine::new(&snapshot, &records).apply(Some(&months)).unwrap();
        assert!(matches!(data.records, FilteredRecords::Monthly(ref m) if m.len() == 2));

        let partial = MeFilter::parse(FilterPeriod::Quarterly, "2024-01-01", "2024-02-29").unwrap();
        let data = FilterEngine::new(&snapshot, &records).apply(Some(&partial)).unwrap();
        assert!(data.records.is_empty());
        assert_close(data.summary.avg_physical_progress, 0.0);
        assert_close(data.summary.overall_variance, 0.0);

        let q1 = MeFilter::parse(FilterPeriod::Quarterly, "2024-01-01", "2024-03-31").unwrap();
        let data = FilterEngine::new(&snapshot, &records).apply(Some(&q1)).unwrap();
        assert_eq!(data.records.len(), 1);
        assert_eq!(data.summary.total_accomplishments, 3);
        assert_eq!(data.summary.total_issues, 1);
    }
}
