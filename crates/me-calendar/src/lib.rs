//! M&E Calendar Bucketing
//!
//! Pure functions that place dates into the calendar periods used by the
//! rollup pipeline.
//!
//! # Core Concepts
//!
//! - [`IsoWeekId`]: ISO-8601 week-numbering year and week
//! - [`iso_week_of`]: date -> ISO week (year boundaries included)
//! - [`quarter_of`]: month -> quarter
//! - [`DateRange`]: inclusive date span with containment checks
//! - [`WeekStartMode`]: how a week id maps back to its first day
//!
//! # Example
//!
//! ```rust
//! use me_calendar::{iso_week_of, parse_date, quarter_of};
//!
//! let date = parse_date("2024-12-30").unwrap();
//! let week = iso_week_of(date);
//! assert_eq!((week.year, week.week), (2025, 1));
//! assert_eq!(quarter_of(11).unwrap(), 4);
//! ```

#![warn(unreachable_pub)]

mod error;
mod iso_week;
mod quarter;
mod range;

pub use error::CalendarError;
pub use iso_week::{iso_week_of, week_range, week_start, IsoWeekId, WeekStartMode};
pub use quarter::{quarter_months, quarter_of, quarter_range};
pub use range::{days_in_month, month_name, month_range, parse_date, DateRange, DATE_FORMAT};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
