//! M&E Data Model
//!
//! Typed records shared by every crate in the workspace.
//!
//! # Core Concepts
//!
//! - [`DailyObservation`]: one day of site progress for one project
//! - [`WeeklyRollup`] / [`MonthlyRollup`] / [`QuarterlyRollup`]: derived
//!   period summaries, each built from the layer below
//! - [`Rollup`]: common read access across the three rollup layers
//! - [`RollupSnapshot`]: one complete, consistent set of rollups
//! - [`MeFilter`] / [`AggregatedData`]: period + range selection and its summary
//! - [`ProgressVariance`] / [`MeMetrics`]: derived analysis views
//!
//! Field names serialize in camelCase and enum values as the lowercase
//! literals downstream reports depend on (`sunny`, `operational`,
//! `on-track`, ...).
//!
//! # Example
//!
//! ```rust
//! use me_model::{ObservationDraft, Weather};
//!
//! let draft = ObservationDraft::new("tower-a", "2024-01-15", "site-engineer")
//!     .with_progress(25.0, 20.0)
//!     .with_weather(Weather::Sunny)
//!     .with_accomplishment("Poured level 3 slab");
//! assert!(draft.validate().is_ok());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod analysis;
mod clock;
mod filter;
mod ids;
mod observation;
mod rollup;

// Re-exports
pub use analysis::{MeMetrics, ProgressVariance, TrendDirection, VarianceStatus};
pub use clock::{Clock, SystemClock};
pub use filter::{AggregatedData, FilterSummary, FilteredRecords, MeFilter};
pub use ids::{IdGenerator, ObservationId, ProjectId, UlidGenerator};
pub use observation::{
    clamp_percentage, DailyObservation, EquipmentStatus, ObservationDraft, ObservationPatch,
    ValidationError, Weather,
};
pub use rollup::{
    BudgetAnalysis, FilterPeriod, KpiBundle, MilestoneEstimate, MonthlyKpis, MonthlyRollup,
    ParsePeriodError, PeriodAggregate, QuarterlyKpis, QuarterlyRollup, RiskAssessment, Rollup,
    RollupPeriod, RollupSeries, RollupSnapshot, RollupWarning, WeatherSummary, WeeklyRollup,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn draft_to_observation_round_trip() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap();
        let draft = ObservationDraft::new("tower-a", "2024-01-15", "engineer")
            .with_progress(125.0, -3.0)
            .with_issue("Crane inspection overdue");

        draft.validate().unwrap();
        let obs = DailyObservation::from_draft(ObservationId::new("obs-1"), draft, now);

        assert_eq!(obs.physical_progress, 100.0);
        assert_eq!(obs.financial_progress, 0.0);
        assert_eq!(obs.issues.len(), 1);
        assert_eq!(obs.created_at, now);
        assert_eq!(obs.updated_at, now);

        let json = serde_json::to_value(&obs).unwrap();
        let back: DailyObservation = serde_json::from_value(json).unwrap();
        assert_eq!(back, obs);
    }

    #[test]
    fn empty_snapshot_series() {
        let snapshot = RollupSnapshot::empty();
        assert!(snapshot.series(RollupPeriod::Weekly).is_empty());
        assert!(snapshot.series(RollupPeriod::Monthly).is_empty());
        assert!(snapshot.series(RollupPeriod::Quarterly).is_empty());
    }
}
