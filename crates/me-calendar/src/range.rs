//! Date parsing, inclusive ranges and month helpers

use crate::error::CalendarError;
use chrono::{Datelike, Month, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical date format for observation dates and filter bounds
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date
///
/// Surrounding whitespace is ignored. Impossible dates such as
/// `2023-02-29` are rejected.
///
/// # Errors
/// Returns [`CalendarError::InvalidDate`] when the text is not a real date.
pub fn parse_date(input: &str) -> Result<NaiveDate, CalendarError> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
        .map_err(|_| CalendarError::invalid_date(input))
}

/// Inclusive date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    /// First day (inclusive)
    pub start: NaiveDate,
    /// Last day (inclusive)
    pub end: NaiveDate,
}

impl DateRange {
    /// Create range
    ///
    /// # Errors
    /// Returns [`CalendarError::InvalidRange`] if `start > end`.
    #[inline]
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, CalendarError> {
        if start > end {
            return Err(CalendarError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parse both bounds from `YYYY-MM-DD` text
    ///
    /// # Errors
    /// Returns error if either bound fails to parse or they are reversed.
    pub fn parse(start: &str, end: &str) -> Result<Self, CalendarError> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    /// Whether `date` lies inside the range
    #[inline]
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Whether `other` lies entirely inside this range
    ///
    /// Partial overlap does not count.
    #[inline]
    #[must_use]
    pub fn contains_range(&self, other: &DateRange) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    /// Number of days covered, both ends included
    #[inline]
    #[must_use]
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to {}",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }
}

/// First to last day of a calendar month
///
/// # Errors
/// Returns [`CalendarError::InvalidMonth`] for months outside 1..=12.
pub fn month_range(year: i32, month: u32) -> Result<DateRange, CalendarError> {
    let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or(CalendarError::InvalidMonth(month))?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or(CalendarError::OutOfRange)?;
    let end = next.pred_opt().ok_or(CalendarError::OutOfRange)?;
    DateRange::new(start, end)
}

/// Number of days in a calendar month
///
/// # Errors
/// Returns [`CalendarError::InvalidMonth`] for months outside 1..=12.
pub fn days_in_month(year: i32, month: u32) -> Result<u32, CalendarError> {
    Ok(month_range(year, month)?.end.day())
}

/// English month name (`"January"`)
///
/// # Errors
/// Returns [`CalendarError::InvalidMonth`] for months outside 1..=12.
pub fn month_name(month: u32) -> Result<&'static str, CalendarError> {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name())
        .ok_or(CalendarError::InvalidMonth(month))
}
