//! Rollup records
//!
//! Weekly, monthly and quarterly rollups share a [`PeriodAggregate`] body and
//! differ in their key, KPI bundle and extra blocks. They are value objects:
//! a [`RollupSnapshot`] is always replaced as a whole.

use crate::ids::{ObservationId, ProjectId};
use crate::observation::Weather;
use chrono::{DateTime, NaiveDate, Utc};
use me_calendar::{month_name, DateRange};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Count of days per weather category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSummary {
    pub sunny: u32,
    pub cloudy: u32,
    pub rainy: u32,
    pub stormy: u32,
}

impl WeatherSummary {
    /// Count one day of `weather`
    #[inline]
    pub fn record(&mut self, weather: Weather) {
        match weather {
            Weather::Sunny => self.sunny += 1,
            Weather::Cloudy => self.cloudy += 1,
            Weather::Rainy => self.rainy += 1,
            Weather::Stormy => self.stormy += 1,
        }
    }

    /// Component-wise add
    #[inline]
    pub fn merge(&mut self, other: &WeatherSummary) {
        self.sunny += other.sunny;
        self.cloudy += other.cloudy;
        self.rainy += other.rainy;
        self.stormy += other.stormy;
    }

    /// Days recorded for `weather`
    #[inline]
    #[must_use]
    pub fn get(&self, weather: Weather) -> u32 {
        match weather {
            Weather::Sunny => self.sunny,
            Weather::Cloudy => self.cloudy,
            Weather::Rainy => self.rainy,
            Weather::Stormy => self.stormy,
        }
    }

    /// Total days recorded
    #[inline]
    #[must_use]
    pub fn total(&self) -> u32 {
        self.sunny + self.cloudy + self.rainy + self.stormy
    }
}

impl FromIterator<Weather> for WeatherSummary {
    fn from_iter<I: IntoIterator<Item = Weather>>(iter: I) -> Self {
        let mut summary = Self::default();
        for weather in iter {
            summary.record(weather);
        }
        summary
    }
}

/// Aggregate body shared by every rollup layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodAggregate {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub avg_physical_progress: f64,
    pub avg_financial_progress: f64,
    pub total_accomplishments: usize,
    pub total_issues: usize,
    pub avg_labor_count: f64,
    /// Days with an observation (summed up the hierarchy)
    pub operational_days: u32,
    pub weather_summary: WeatherSummary,
    /// `avg_physical_progress - avg_financial_progress`
    pub variance: f64,
}

impl PeriodAggregate {
    /// Date range covered
    #[inline]
    #[must_use]
    pub fn range(&self) -> DateRange {
        DateRange {
            start: self.start_date,
            end: self.end_date,
        }
    }
}

/// KPI bundle carried by every rollup
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiBundle {
    pub on_time_performance: f64,
    pub budget_efficiency: f64,
    pub quality_score: f64,
    pub productivity_index: f64,
}

/// Monthly KPIs: weekly bundle plus resource utilization
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyKpis {
    #[serde(flatten)]
    pub base: KpiBundle,
    pub resource_utilization: f64,
}

/// Quarterly KPIs: monthly bundle plus overall project health
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuarterlyKpis {
    #[serde(flatten)]
    pub base: KpiBundle,
    pub resource_utilization: f64,
    pub overall_project_health: f64,
}

/// Milestone estimate (heuristic, not a tracker)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneEstimate {
    pub achieved: u32,
    pub missed: u32,
    pub upcoming: u32,
}

/// Quarter budget position
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetAnalysis {
    pub allocated_budget: f64,
    pub utilized_budget: f64,
    pub remaining_budget: f64,
    /// Fraction in `[0, 1]`
    pub utilization_rate: f64,
    /// Utilized budget per operational day
    pub burn_rate: f64,
}

/// Independent risk buckets; they need not sum to 100
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub low_risk: u32,
    pub medium_risk: u32,
    pub high_risk: u32,
    pub critical_risk: u32,
}

/// One ISO week of observations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyRollup {
    pub id: String,
    pub project_id: ProjectId,
    pub week: u32,
    /// ISO week-numbering year
    pub year: i32,
    #[serde(flatten)]
    pub aggregate: PeriodAggregate,
    pub kpis: KpiBundle,
    /// Member observations, date order
    pub log_ids: Vec<ObservationId>,
    pub generated_at: DateTime<Utc>,
}

impl WeeklyRollup {
    /// Stable id for a week key
    #[must_use]
    pub fn key_id(project: &ProjectId, year: i32, week: u32) -> String {
        format!("{project}-{year}-W{week:02}")
    }
}

/// One calendar month of weekly rollups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRollup {
    pub id: String,
    pub project_id: ProjectId,
    pub month: u32,
    pub year: i32,
    #[serde(flatten)]
    pub aggregate: PeriodAggregate,
    pub kpis: MonthlyKpis,
    pub milestones: MilestoneEstimate,
    /// Member weekly rollup ids
    pub week_ids: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl MonthlyRollup {
    /// Stable id for a month key
    #[must_use]
    pub fn key_id(project: &ProjectId, year: i32, month: u32) -> String {
        format!("{project}-{year}-M{month:02}")
    }
}

/// One quarter of monthly rollups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuarterlyRollup {
    pub id: String,
    pub project_id: ProjectId,
    pub quarter: u32,
    pub year: i32,
    #[serde(flatten)]
    pub aggregate: PeriodAggregate,
    pub kpis: QuarterlyKpis,
    pub budget_analysis: BudgetAnalysis,
    pub risk_assessment: RiskAssessment,
    /// Member monthly rollup ids
    pub month_ids: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl QuarterlyRollup {
    /// Stable id for a quarter key
    #[must_use]
    pub fn key_id(project: &ProjectId, year: i32, quarter: u32) -> String {
        format!("{project}-{year}-Q{quarter}")
    }
}

/// Read access shared by the three rollup layers
pub trait Rollup {
    /// Stable rollup id
    fn id(&self) -> &str;

    /// Shared aggregate body
    fn aggregate(&self) -> &PeriodAggregate;

    /// Human-readable period label
    fn label(&self) -> String;

    /// Covered date range
    #[inline]
    fn range(&self) -> DateRange {
        self.aggregate().range()
    }
}

impl Rollup for WeeklyRollup {
    fn id(&self) -> &str {
        &self.id
    }

    fn aggregate(&self) -> &PeriodAggregate {
        &self.aggregate
    }

    fn label(&self) -> String {
        format!("Week {}, {}", self.week, self.year)
    }
}

impl Rollup for MonthlyRollup {
    fn id(&self) -> &str {
        &self.id
    }

    fn aggregate(&self) -> &PeriodAggregate {
        &self.aggregate
    }

    fn label(&self) -> String {
        match month_name(self.month) {
            Ok(name) => format!("{name} {}", self.year),
            Err(_) => format!("Month {}, {}", self.month, self.year),
        }
    }
}

impl Rollup for QuarterlyRollup {
    fn id(&self) -> &str {
        &self.id
    }

    fn aggregate(&self) -> &PeriodAggregate {
        &self.aggregate
    }

    fn label(&self) -> String {
        format!("Q{} {}", self.quarter, self.year)
    }
}

/// Error parsing a period name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown period: {0:?}")]
pub struct ParsePeriodError(pub String);

/// Rollup layer granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RollupPeriod {
    Weekly,
    Monthly,
    Quarterly,
}

impl RollupPeriod {
    /// Stable literal
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RollupPeriod::Weekly => "weekly",
            RollupPeriod::Monthly => "monthly",
            RollupPeriod::Quarterly => "quarterly",
        }
    }
}

impl fmt::Display for RollupPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RollupPeriod {
    type Err = ParsePeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" => Ok(RollupPeriod::Weekly),
            "monthly" => Ok(RollupPeriod::Monthly),
            "quarterly" => Ok(RollupPeriod::Quarterly),
            _ => Err(ParsePeriodError(s.to_string())),
        }
    }
}

/// Filter granularity: raw days or one rollup layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterPeriod {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
}

impl FilterPeriod {
    /// Stable literal
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterPeriod::Daily => "daily",
            FilterPeriod::Weekly => "weekly",
            FilterPeriod::Monthly => "monthly",
            FilterPeriod::Quarterly => "quarterly",
        }
    }

    /// Capitalized name for labels
    #[inline]
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            FilterPeriod::Daily => "Daily",
            FilterPeriod::Weekly => "Weekly",
            FilterPeriod::Monthly => "Monthly",
            FilterPeriod::Quarterly => "Quarterly",
        }
    }
}

impl From<RollupPeriod> for FilterPeriod {
    fn from(period: RollupPeriod) -> Self {
        match period {
            RollupPeriod::Weekly => FilterPeriod::Weekly,
            RollupPeriod::Monthly => FilterPeriod::Monthly,
            RollupPeriod::Quarterly => FilterPeriod::Quarterly,
        }
    }
}

impl fmt::Display for FilterPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterPeriod {
    type Err = ParsePeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("daily") {
            return Ok(FilterPeriod::Daily);
        }
        s.parse::<RollupPeriod>()
            .map(FilterPeriod::from)
            .map_err(|_| ParsePeriodError(s.to_string()))
    }
}

/// Observation left out of bucketing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollupWarning {
    pub observation_id: ObservationId,
    /// The offending date literal
    pub date: String,
    pub reason: String,
}

/// One complete, consistent set of rollups
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollupSnapshot {
    pub weekly: Vec<WeeklyRollup>,
    pub monthly: Vec<MonthlyRollup>,
    pub quarterly: Vec<QuarterlyRollup>,
    #[serde(default)]
    pub warnings: Vec<RollupWarning>,
    /// `None` until the first pipeline run
    pub generated_at: Option<DateTime<Utc>>,
}

impl RollupSnapshot {
    /// Snapshot with no rollups
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether all layers are empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weekly.is_empty() && self.monthly.is_empty() && self.quarterly.is_empty()
    }

    /// Owned copy of one layer
    #[must_use]
    pub fn series(&self, period: RollupPeriod) -> RollupSeries {
        match period {
            RollupPeriod::Weekly => RollupSeries::Weekly(self.weekly.clone()),
            RollupPeriod::Monthly => RollupSeries::Monthly(self.monthly.clone()),
            RollupPeriod::Quarterly => RollupSeries::Quarterly(self.quarterly.clone()),
        }
    }
}

/// One rollup layer, tagged by granularity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "period", content = "rollups", rename_all = "lowercase")]
pub enum RollupSeries {
    Weekly(Vec<WeeklyRollup>),
    Monthly(Vec<MonthlyRollup>),
    Quarterly(Vec<QuarterlyRollup>),
}

impl RollupSeries {
    /// Granularity of the series
    #[inline]
    #[must_use]
    pub fn period(&self) -> RollupPeriod {
        match self {
            RollupSeries::Weekly(_) => RollupPeriod::Weekly,
            RollupSeries::Monthly(_) => RollupPeriod::Monthly,
            RollupSeries::Quarterly(_) => RollupPeriod::Quarterly,
        }
    }

    /// Number of rollups
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            RollupSeries::Weekly(v) => v.len(),
            RollupSeries::Monthly(v) => v.len(),
            RollupSeries::Quarterly(v) => v.len(),
        }
    }

    /// Whether the series is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids in order
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        match self {
            RollupSeries::Weekly(v) => v.iter().map(Rollup::id).collect(),
            RollupSeries::Monthly(v) => v.iter().map(Rollup::id).collect(),
            RollupSeries::Quarterly(v) => v.iter().map(Rollup::id).collect(),
        }
    }
}
