//! ISO-8601 week bucketing
//!
//! Week 1 is the week containing the year's first Thursday; weeks run Monday
//! to Sunday. Dates in late December can belong to week 1 of the next year
//! and dates in early January to the last week of the previous one.

use crate::error::CalendarError;
use crate::range::DateRange;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// ISO week identifier (week-numbering year + week)
///
/// Ordering is chronological: by year, then week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IsoWeekId {
    /// ISO week-numbering year (may differ from the calendar year)
    pub year: i32,
    /// Week number, 1..=53
    pub week: u32,
}

impl IsoWeekId {
    /// Create week id
    #[inline]
    #[must_use]
    pub fn new(year: i32, week: u32) -> Self {
        Self { year, week }
    }
}

impl fmt::Display for IsoWeekId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{:02}", self.year, self.week)
    }
}

/// How a week id is mapped back to its first day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeekStartMode {
    /// `Jan 1 + (week - 1) * 7 days`
    ///
    /// Does not land on the ISO Monday in most years. Kept as the default so
    /// rollup date ranges match existing reports.
    #[default]
    FixedOffset,
    /// The true ISO Monday of the week
    IsoCalendar,
}

/// ISO week containing `date`
#[inline]
#[must_use]
pub fn iso_week_of(date: NaiveDate) -> IsoWeekId {
    let iso = date.iso_week();
    IsoWeekId::new(iso.year(), iso.week())
}

/// First day of the week under the given mode
///
/// # Errors
/// Returns [`CalendarError::InvalidWeek`] for week numbers the year does not
/// have.
pub fn week_start(id: IsoWeekId, mode: WeekStartMode) -> Result<NaiveDate, CalendarError> {
    let invalid = || CalendarError::InvalidWeek {
        year: id.year,
        week: id.week,
    };

    match mode {
        WeekStartMode::FixedOffset => {
            if !(1..=53).contains(&id.week) {
                return Err(invalid());
            }
            let jan_first = NaiveDate::from_ymd_opt(id.year, 1, 1).ok_or(CalendarError::OutOfRange)?;
            jan_first
                .checked_add_days(Days::new(u64::from(id.week - 1) * 7))
                .ok_or(CalendarError::OutOfRange)
        }
        WeekStartMode::IsoCalendar => {
            NaiveDate::from_isoywd_opt(id.year, id.week, Weekday::Mon).ok_or_else(invalid)
        }
    }
}

/// Seven-day range starting at [`week_start`]
///
/// # Errors
/// Same as [`week_start`].
pub fn week_range(id: IsoWeekId, mode: WeekStartMode) -> Result<DateRange, CalendarError> {
    let start = week_start(id, mode)?;
    let end = start
        .checked_add_days(Days::new(6))
        .ok_or(CalendarError::OutOfRange)?;
    DateRange::new(start, end)
}
