//! Property tests for calendar bucketing.
//!
//! Checks that every date lands in a week and quarter whose ranges actually
//! contain it, across arbitrary years including the ISO year boundary.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use me_calendar::{
    iso_week_of, month_range, quarter_of, quarter_range, week_range, WeekStartMode,
};
use proptest::prelude::*;

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (0u64..(365 * 40)).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2000, 1, 1)
            .unwrap()
            .checked_add_days(Days::new(offset))
            .unwrap()
    })
}

proptest! {
    #[test]
    fn iso_week_range_contains_date(date in arb_date()) {
        let week = iso_week_of(date);
        let range = week_range(week, WeekStartMode::IsoCalendar).unwrap();
        prop_assert!(range.contains(date));
        prop_assert_eq!(range.start.weekday(), Weekday::Mon);
    }

    #[test]
    fn iso_year_is_within_one_of_calendar_year(date in arb_date()) {
        let week = iso_week_of(date);
        prop_assert!((week.year - date.year()).abs() <= 1);
        prop_assert!((1..=53).contains(&week.week));
    }

    #[test]
    fn quarter_range_contains_month(date in arb_date()) {
        let quarter = quarter_of(date.month()).unwrap();
        let range = quarter_range(date.year(), quarter).unwrap();
        prop_assert!(range.contains(date));
        prop_assert!(range.contains_range(&month_range(date.year(), date.month()).unwrap()));
    }
}

#[test]
fn fixed_offset_and_iso_agree_when_year_starts_on_monday() {
    // 2024-01-01 is a Monday
    let week = iso_week_of(NaiveDate::from_ymd_opt(2024, 3, 6).unwrap());
    assert_eq!(
        week_range(week, WeekStartMode::FixedOffset).unwrap(),
        week_range(week, WeekStartMode::IsoCalendar).unwrap()
    );
}

#[test]
fn fixed_offset_drifts_in_other_years() {
    // 2025-01-01 is a Wednesday
    let week = iso_week_of(NaiveDate::from_ymd_opt(2025, 3, 5).unwrap());
    assert_ne!(
        week_range(week, WeekStartMode::FixedOffset).unwrap(),
        week_range(week, WeekStartMode::IsoCalendar).unwrap()
    );
}
