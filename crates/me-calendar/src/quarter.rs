//! Quarter bucketing

use crate::error::CalendarError;
use crate::range::{month_range, DateRange};
use std::ops::RangeInclusive;

/// Quarter (1..=4) containing `month`
///
/// # Errors
/// Returns [`CalendarError::InvalidMonth`] for months outside 1..=12.
#[inline]
pub fn quarter_of(month: u32) -> Result<u32, CalendarError> {
    if !(1..=12).contains(&month) {
        return Err(CalendarError::InvalidMonth(month));
    }
    Ok(month.div_ceil(3))
}

/// Months belonging to `quarter`
///
/// # Errors
/// Returns [`CalendarError::InvalidQuarter`] for quarters outside 1..=4.
#[inline]
pub fn quarter_months(quarter: u32) -> Result<RangeInclusive<u32>, CalendarError> {
    if !(1..=4).contains(&quarter) {
        return Err(CalendarError::InvalidQuarter(quarter));
    }
    let first = (quarter - 1) * 3 + 1;
    Ok(first..=first + 2)
}

/// First day of the quarter's first month to last day of its last month
///
/// # Errors
/// Returns [`CalendarError::InvalidQuarter`] for quarters outside 1..=4.
pub fn quarter_range(year: i32, quarter: u32) -> Result<DateRange, CalendarError> {
    let months = quarter_months(quarter)?;
    let first = month_range(year, *months.start())?;
    let last = month_range(year, *months.end())?;
    DateRange::new(first.start, last.end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn months_map_to_quarters() {
        let quarters: Vec<u32> = (1..=12).map(|m| quarter_of(m).unwrap()).collect();
        assert_eq!(quarters, vec![1, 1, 1, 2, 2, 2, 3, 3, 3, 4, 4, 4]);
    }

    #[test]
    fn out_of_range_month() {
        assert_eq!(quarter_of(0), Err(CalendarError::InvalidMonth(0)));
        assert_eq!(quarter_of(13), Err(CalendarError::InvalidMonth(13)));
    }

    #[test]
    fn quarter_bounds() {
        let q1 = quarter_range(2024, 1).unwrap();
        assert_eq!(q1.start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(q1.end, NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());

        let q4 = quarter_range(2024, 4).unwrap();
        assert_eq!(q4.end, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
    }

    #[test]
    fn quarter_months_range() {
        assert_eq!(quarter_months(2).unwrap(), 4..=6);
        assert!(quarter_months(5).is_err());
    }
}
