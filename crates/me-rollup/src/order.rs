//! Chronological ordering of observations

use me_model::DailyObservation;

/// Observations in date order
///
/// Stable: same-day records keep their input order. Records whose date does
/// not parse sort after every dated record.
#[must_use]
pub fn chronological<'a, I>(observations: I) -> Vec<&'a DailyObservation>
where
    I: IntoIterator<Item = &'a DailyObservation>,
{
    let mut keyed: Vec<_> = observations
        .into_iter()
        .map(|obs| (obs.calendar_date().ok(), obs))
        .collect();
    keyed.sort_by_key(|(date, _)| (date.is_none(), *date));
    keyed.into_iter().map(|(_, obs)| obs).collect()
}
