//! Filter requests and their aggregated results

use crate::observation::DailyObservation;
use crate::rollup::{FilterPeriod, MonthlyRollup, QuarterlyRollup, WeeklyRollup};
use me_calendar::{CalendarError, DateRange};
use serde::{Deserialize, Serialize};

/// Period + date range selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeFilter {
    pub period: FilterPeriod,
    pub date_range: DateRange,
}

impl MeFilter {
    /// Create filter
    #[inline]
    #[must_use]
    pub fn new(period: FilterPeriod, date_range: DateRange) -> Self {
        Self { period, date_range }
    }

    /// Create filter from `YYYY-MM-DD` bounds
    ///
    /// # Errors
    /// Returns error if either bound is not a real date or they are reversed.
    pub fn parse(period: FilterPeriod, start: &str, end: &str) -> Result<Self, CalendarError> {
        Ok(Self::new(period, DateRange::parse(start, end)?))
    }
}

/// Summary numbers over a filtered selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSummary {
    pub total_entries: usize,
    pub avg_physical_progress: f64,
    pub avg_financial_progress: f64,
    pub total_accomplishments: usize,
    pub total_issues: usize,
    /// `avg_physical_progress - avg_financial_progress`
    pub overall_variance: f64,
    pub period_label: String,
}

/// Selected records, one variant per filter period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "period", content = "records", rename_all = "lowercase")]
pub enum FilteredRecords {
    Daily(Vec<DailyObservation>),
    Weekly(Vec<WeeklyRollup>),
    Monthly(Vec<MonthlyRollup>),
    Quarterly(Vec<QuarterlyRollup>),
}

impl FilteredRecords {
    /// Number of selected records
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            FilteredRecords::Daily(v) => v.len(),
            FilteredRecords::Weekly(v) => v.len(),
            FilteredRecords::Monthly(v) => v.len(),
            FilteredRecords::Quarterly(v) => v.len(),
        }
    }

    /// Whether nothing was selected
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Filter result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedData {
    pub filter: MeFilter,
    pub records: FilteredRecords,
    pub summary: FilterSummary,
}
