//! Testing utilities for the M&E workspace
//!
//! Shared fixtures, deterministic clock/id sources and float assertions.

#![allow(missing_docs)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use me_model::{Clock, DailyObservation, IdGenerator, ObservationDraft, ObservationId, Weather};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

pub const TEST_PROJECT: &str = "test-project";
pub const TEST_AUTHOR: &str = "site-engineer";

/// Epsilon used by [`assert_close`]
pub const EPSILON: f64 = 1e-9;

/// Clock that only moves when told to
#[derive(Debug)]
pub struct FixedClock {
    millis: AtomicI64,
}

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self {
            millis: AtomicI64::new(at.timestamp_millis()),
        }
    }

    /// Midnight UTC on the given day
    pub fn on(year: i32, month: u32, day: u32) -> Self {
        Self::new(Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap())
    }

    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(by.num_milliseconds(), Ordering::SeqCst);
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        Self::on(2024, 1, 1)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.millis.load(Ordering::SeqCst))
            .single()
            .unwrap()
    }
}

/// `obs-1`, `obs-2`, ...
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> ObservationId {
        let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        ObservationId::new(format!("obs-{n}"))
    }
}

pub fn draft_on(date: &str, physical: f64, financial: f64) -> ObservationDraft {
    ObservationDraft::new(TEST_PROJECT, date, TEST_AUTHOR)
        .with_progress(physical, financial)
        .with_labor(10)
}

/// Observation with id `obs-{date}` stamped at midnight of 2024-01-01
pub fn observation_on(date: &str, physical: f64, financial: f64) -> DailyObservation {
    let stamp = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    DailyObservation::from_draft(
        ObservationId::new(format!("obs-{date}")),
        draft_on(date, physical, financial),
        stamp,
    )
}

/// Observation with notes, weather and crew size filled in
pub fn detailed_observation(
    date: &str,
    physical: f64,
    financial: f64,
    accomplishments: usize,
    issues: usize,
    weather: Weather,
    labor: u32,
) -> DailyObservation {
    let mut obs = observation_on(date, physical, financial);
    obs.accomplishments = (0..accomplishments).map(|i| format!("task {i}")).collect();
    obs.issues = (0..issues).map(|i| format!("issue {i}")).collect();
    obs.weather = weather;
    obs.labor_count = labor;
    obs
}

#[track_caller]
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < EPSILON,
        "expected {expected}, got {actual}"
    );
}

