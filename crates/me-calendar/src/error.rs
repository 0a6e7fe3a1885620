//! Calendar errors

/// Errors raised while parsing or bucketing calendar values
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    /// Text is not a real `YYYY-MM-DD` calendar date
    #[error("invalid date: {input:?}")]
    InvalidDate {
        /// The rejected input
        input: String,
    },

    /// Month outside 1..=12
    #[error("invalid month: {0}")]
    InvalidMonth(u32),

    /// Quarter outside 1..=4
    #[error("invalid quarter: {0}")]
    InvalidQuarter(u32),

    /// Week number that does not exist in the given year
    #[error("invalid week {week} for year {year}")]
    InvalidWeek {
        /// Week-numbering year
        year: i32,
        /// Week number
        week: u32,
    },

    /// Range whose start lies after its end
    #[error("invalid range: {start} is after {end}")]
    InvalidRange {
        /// Range start
        start: chrono::NaiveDate,
        /// Range end
        end: chrono::NaiveDate,
    },

    /// Date arithmetic left the representable calendar
    #[error("date out of range")]
    OutOfRange,
}

impl CalendarError {
    /// Create an invalid date error
    #[inline]
    pub fn invalid_date(input: impl Into<String>) -> Self {
        Self::InvalidDate {
            input: input.into(),
        }
    }
}
