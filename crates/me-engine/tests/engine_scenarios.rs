//! End-to-end engine scenarios

use me_engine::prelude::*;
use me_model::{RollupSeries, TrendDirection, VarianceStatus, Weather};
use me_test_utils::{
    assert_close, draft_on, observation_on, FixedClock, SequentialIds, TEST_AUTHOR, TEST_PROJECT,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn engine() -> MeEngine {
    MeEngine::builder(EngineConfig::new(TEST_PROJECT).with_total_budget(500_000.0))
        .clock(Arc::new(FixedClock::on(2024, 1, 31)))
        .ids(Arc::new(SequentialIds::new()))
        .build()
        .unwrap()
}

fn weekly(engine: &MeEngine) -> Vec<me_model::WeeklyRollup> {
    match engine.list_rollups(RollupPeriod::Weekly) {
        RollupSeries::Weekly(weeks) => weeks,
        other => panic!("expected weekly series, got {:?}", other.period()),
    }
}

#[test]
fn week_three_average_and_status() {
    let mut engine = engine();
    engine.add_observation(draft_on("2024-01-15", 25.0, 20.0)).unwrap();
    engine.add_observation(draft_on("2024-01-16", 28.0, 25.0)).unwrap();

    let weeks = weekly(&engine);
    assert_eq!(weeks.len(), 1);
    assert_eq!((weeks[0].year, weeks[0].week), (2024, 3));
    assert_close(weeks[0].aggregate.avg_physical_progress, 26.5);
    assert_close(weeks[0].aggregate.variance, 4.0);
    assert_eq!(engine.variance()[0].status, VarianceStatus::Ahead);
}

#[test]
fn third_observation_updates_the_week() {
    let mut engine = engine();
    engine.add_observation(draft_on("2024-01-15", 25.0, 20.0)).unwrap();
    engine.add_observation(draft_on("2024-01-16", 28.0, 25.0)).unwrap();
    engine.add_observation(draft_on("2024-01-17", 32.0, 30.0)).unwrap();

    let weeks = weekly(&engine);
    assert_close(weeks[0].aggregate.avg_physical_progress, 85.0 / 3.0);
    assert_eq!(weeks[0].aggregate.operational_days, 3);
    assert_eq!(
        weeks[0].log_ids.iter().map(|id| id.as_str()).collect::<Vec<_>>(),
        vec!["obs-1", "obs-2", "obs-3"]
    );
}

#[test]
fn weekly_filter_over_january() {
    let mut engine = engine();
    for (date, p) in [("2024-01-10", 10.0), ("2024-01-17", 20.0), ("2024-01-30", 30.0)] {
        engine.add_observation(draft_on(date, p, p - 2.0)).unwrap();
    }

    let filter = MeFilter::parse(FilterPeriod::Weekly, "2024-01-01", "2024-01-31").unwrap();
    let data = engine.apply_filter(Some(&filter)).unwrap();
    assert_eq!(data.summary.total_entries, 2);
    assert_close(data.summary.avg_physical_progress, 15.0);
    assert_close(data.summary.overall_variance, 2.0);
    assert_eq!(data.summary.period_label, "Weekly view: 2024-01-01 to 2024-01-31");
}

#[test]
fn removing_last_record_of_a_week_drops_the_week() {
    let mut engine = engine();
    engine.add_observation(draft_on("2024-01-15", 25.0, 20.0)).unwrap();
    let lone = engine.add_observation(draft_on("2024-01-23", 30.0, 26.0)).unwrap();
    assert_eq!(weekly(&engine).len(), 2);

    engine.remove_observation(&lone.id).unwrap();
    let weeks = weekly(&engine);
    assert_eq!(weeks.len(), 1);
    assert_eq!(weeks[0].week, 3);
}

#[test]
fn moving_a_record_between_weeks() {
    let mut engine = engine();
    let record = engine.add_observation(draft_on("2024-01-15", 25.0, 20.0)).unwrap();
    engine
        .update_observation(&record.id, ObservationPatch::new().date("2024-01-24"))
        .unwrap();

    let weeks = weekly(&engine);
    assert_eq!(weeks.len(), 1);
    assert_eq!(weeks[0].week, 4);
}

#[test]
fn empty_engine_boundary() {
    let engine = engine();
    let metrics = engine.metrics();
    assert_eq!(metrics.total_logs, 0);
    assert_close(metrics.avg_daily_progress, 0.0);
    assert_eq!(metrics.trend_direction, TrendDirection::Stable);
    for period in [RollupPeriod::Weekly, RollupPeriod::Monthly, RollupPeriod::Quarterly] {
        assert!(engine.list_rollups(period).is_empty());
    }
}

#[test]
fn metrics_follow_mutations() {
    let mut engine = engine();
    engine.add_observation(draft_on("2024-01-16", 28.0, 25.0)).unwrap();
    engine.add_observation(draft_on("2024-01-15", 25.0, 20.0)).unwrap();

    let metrics = engine.metrics();
    assert_eq!(metrics.total_logs, 2);
    assert_close(metrics.avg_daily_progress, 26.5);
    assert_eq!(metrics.trend_direction, TrendDirection::Up);
}

#[test]
fn bulk_load_reports_bad_dates() {
    let mut bad = observation_on("2024-01-15", 50.0, 50.0);
    bad.date = "2024-02-30".into();
    let records = vec![
        bad,
        observation_on("2024-01-16", 28.0, 25.0),
        observation_on("2024-01-17", 32.0, 30.0),
    ];

    let mut engine = engine();
    assert_eq!(engine.load_observations(records), 3);
    assert_eq!(engine.warnings().len(), 1);
    assert_eq!(engine.warnings()[0].date, "2024-02-30");
    assert_eq!(weekly(&engine)[0].aggregate.operational_days, 2);
    assert_eq!(engine.list_observations().last().unwrap().date, "2024-02-30");
}

#[test]
fn bulk_load_counts_a_repeated_id_once() {
    let first = observation_on("2024-01-15", 25.0, 20.0);
    let mut repeat = observation_on("2024-01-16", 28.0, 25.0);
    repeat.id = first.id.clone();

    let mut engine = engine();
    assert_eq!(engine.load_observations(vec![first.clone(), repeat]), 1);
    assert_eq!(weekly(&engine)[0].aggregate.operational_days, 1);

    engine.remove_observation(&first.id).unwrap();
    assert!(engine.snapshot().is_empty());
}

#[test]
fn drafts_for_other_projects_are_rejected() {
    let mut engine = engine();
    let draft = ObservationDraft::new("other-site", "2024-01-15", TEST_AUTHOR);
    let err = engine.add_observation(draft).unwrap_err();
    assert!(err.is_validation());
    assert!(engine.list_observations().is_empty());
}

#[test]
fn exported_literals_are_stable() {
    let mut engine = engine();
    engine
        .add_observation(
            draft_on("2024-01-15", 20.0, 22.0)
                .with_weather(Weather::Stormy)
                .with_accomplishment("poured slab"),
        )
        .unwrap();

    let observation = serde_json::to_value(&engine.list_observations()[0]).unwrap();
    assert_eq!(observation["weather"], "stormy");
    assert_eq!(observation["equipmentStatus"], "operational");
    assert_eq!(observation["physicalProgress"], 20.0);

    let variance = serde_json::to_value(engine.variance()).unwrap();
    assert_eq!(variance[0]["status"], "on-track");
    assert_eq!(variance[0]["plannedProgress"], 22.0);

    let series = serde_json::to_value(engine.list_rollups(RollupPeriod::Quarterly)).unwrap();
    assert_eq!(series["period"], "quarterly");
    assert_eq!(series["rollups"][0]["budgetAnalysis"]["allocatedBudget"], 500_000.0);
}
