//! Daily progress observations
//!
//! A [`DailyObservation`] is the only record the engine owns. Drafts and
//! patches are the two ways callers shape one: [`ObservationDraft`] for
//! creation, [`ObservationPatch`] for partial updates.

use crate::ids::{ObservationId, ProjectId};
use chrono::{DateTime, NaiveDate, Utc};
use me_calendar::{parse_date, CalendarError};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Site weather for the day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    #[default]
    Sunny,
    Cloudy,
    Rainy,
    Stormy,
}

impl Weather {
    /// Every variant, in tally order
    pub const ALL: [Weather; 4] = [Weather::Sunny, Weather::Cloudy, Weather::Rainy, Weather::Stormy];

    /// Stable literal used in exports
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Weather::Sunny => "sunny",
            Weather::Cloudy => "cloudy",
            Weather::Rainy => "rainy",
            Weather::Stormy => "stormy",
        }
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Equipment availability for the day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquipmentStatus {
    #[default]
    Operational,
    Partial,
    Down,
}

impl EquipmentStatus {
    /// Stable literal used in exports
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentStatus::Operational => "operational",
            EquipmentStatus::Partial => "partial",
            EquipmentStatus::Down => "down",
        }
    }
}

impl fmt::Display for EquipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation failures for drafts and patches
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Required field is empty
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Date does not parse to a real calendar date
    #[error("invalid date {value:?}")]
    InvalidDate {
        /// Rejected text
        value: String,
        /// Underlying calendar error
        #[source]
        source: CalendarError,
    },

    /// Percentage is NaN or infinite
    #[error("{field} must be a finite percentage, got {value}")]
    NonFinitePercentage {
        /// Field name
        field: &'static str,
        /// Rejected value
        value: f64,
    },

    /// Draft targets a different project than the repository
    #[error("observation belongs to project {actual}, expected {expected}")]
    ProjectMismatch {
        /// Repository project
        expected: ProjectId,
        /// Draft project
        actual: ProjectId,
    },
}

/// Clamp a percentage into `[0, 100]`
#[inline]
#[must_use]
pub fn clamp_percentage(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

fn check_finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NonFinitePercentage { field, value })
    }
}

/// Fields shared by drafts and stored records that validation looks at
struct Fields<'a> {
    project_id: &'a ProjectId,
    created_by: &'a str,
    date: &'a str,
    physical_progress: f64,
    financial_progress: f64,
}

fn check_fields(fields: Fields<'_>) -> Result<(), ValidationError> {
    if fields.project_id.is_blank() {
        return Err(ValidationError::MissingField("projectId"));
    }
    if fields.created_by.trim().is_empty() {
        return Err(ValidationError::MissingField("createdBy"));
    }
    check_date(fields.date)?;
    check_finite("physicalProgress", fields.physical_progress)?;
    check_finite("financialProgress", fields.financial_progress)?;
    Ok(())
}

fn check_date(value: &str) -> Result<NaiveDate, ValidationError> {
    parse_date(value).map_err(|source| ValidationError::InvalidDate {
        value: value.to_string(),
        source,
    })
}

/// One day of recorded site progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyObservation {
    /// Immutable id
    pub id: ObservationId,
    /// Owning project
    pub project_id: ProjectId,
    /// `YYYY-MM-DD`, kept verbatim for export
    pub date: String,
    /// Percent of work physically complete
    pub physical_progress: f64,
    /// Percent of budget spent
    pub financial_progress: f64,
    #[serde(default)]
    pub accomplishments: Vec<String>,
    #[serde(default)]
    pub issues: Vec<String>,
    pub weather: Weather,
    pub labor_count: u32,
    pub equipment_status: EquipmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DailyObservation {
    /// Build from a validated draft, clamping percentages
    #[must_use]
    pub fn from_draft(id: ObservationId, draft: ObservationDraft, now: DateTime<Utc>) -> Self {
        let mut obs = Self {
            id,
            project_id: draft.project_id,
            date: draft.date.trim().to_string(),
            physical_progress: draft.physical_progress,
            financial_progress: draft.financial_progress,
            accomplishments: draft.accomplishments,
            issues: draft.issues,
            weather: draft.weather,
            labor_count: draft.labor_count,
            equipment_status: draft.equipment_status,
            notes: draft.notes,
            created_by: draft.created_by,
            created_at: now,
            updated_at: now,
        };
        obs.clamp_percentages();
        obs
    }

    /// Parsed calendar date
    ///
    /// # Errors
    /// Returns error if the stored literal is not a real date (possible for
    /// records restored in bulk).
    #[inline]
    pub fn calendar_date(&self) -> Result<NaiveDate, CalendarError> {
        parse_date(&self.date)
    }

    /// Check the invariants `add`/`update` enforce
    ///
    /// # Errors
    /// Returns the first violated rule.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_fields(Fields {
            project_id: &self.project_id,
            created_by: &self.created_by,
            date: &self.date,
            physical_progress: self.physical_progress,
            financial_progress: self.financial_progress,
        })
    }

    /// Clamp both percentages into `[0, 100]`
    ///
    /// Returns `true` if either value changed.
    pub fn clamp_percentages(&mut self) -> bool {
        let physical = clamp_percentage(self.physical_progress);
        let financial = clamp_percentage(self.financial_progress);
        #[allow(clippy::float_cmp)]
        let changed = physical != self.physical_progress || financial != self.financial_progress;
        self.physical_progress = physical;
        self.financial_progress = financial;
        changed
    }

    /// Apply a patch in place and stamp `updated_at`
    ///
    /// Does not validate; callers validate the result before committing it.
    pub fn apply_patch(&mut self, patch: ObservationPatch, now: DateTime<Utc>) {
        if let Some(date) = patch.date {
            self.date = date.trim().to_string();
        }
        if let Some(v) = patch.physical_progress {
            self.physical_progress = v;
        }
        if let Some(v) = patch.financial_progress {
            self.financial_progress = v;
        }
        if let Some(v) = patch.accomplishments {
            self.accomplishments = v;
        }
        if let Some(v) = patch.issues {
            self.issues = v;
        }
        if let Some(v) = patch.weather {
            self.weather = v;
        }
        if let Some(v) = patch.labor_count {
            self.labor_count = v;
        }
        if let Some(v) = patch.equipment_status {
            self.equipment_status = v;
        }
        if let Some(v) = patch.notes {
            self.notes = v;
        }
        self.updated_at = now;
    }
}

/// Fields supplied when recording a new observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationDraft {
    pub project_id: ProjectId,
    pub date: String,
    pub physical_progress: f64,
    pub financial_progress: f64,
    #[serde(default)]
    pub accomplishments: Vec<String>,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default)]
    pub weather: Weather,
    #[serde(default)]
    pub labor_count: u32,
    #[serde(default)]
    pub equipment_status: EquipmentStatus,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_by: String,
}

impl ObservationDraft {
    /// Create draft with zero progress and default conditions
    #[must_use]
    pub fn new(
        project_id: impl Into<ProjectId>,
        date: impl Into<String>,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            date: date.into(),
            physical_progress: 0.0,
            financial_progress: 0.0,
            accomplishments: Vec::new(),
            issues: Vec::new(),
            weather: Weather::default(),
            labor_count: 0,
            equipment_status: EquipmentStatus::default(),
            notes: None,
            created_by: created_by.into(),
        }
    }

    /// With physical and financial progress
    #[inline]
    #[must_use]
    pub fn with_progress(mut self, physical: f64, financial: f64) -> Self {
        self.physical_progress = physical;
        self.financial_progress = financial;
        self
    }

    /// With accomplishment note
    #[inline]
    #[must_use]
    pub fn with_accomplishment(mut self, note: impl Into<String>) -> Self {
        self.accomplishments.push(note.into());
        self
    }

    /// With issue note
    #[inline]
    #[must_use]
    pub fn with_issue(mut self, note: impl Into<String>) -> Self {
        self.issues.push(note.into());
        self
    }

    /// With weather
    #[inline]
    #[must_use]
    pub fn with_weather(mut self, weather: Weather) -> Self {
        self.weather = weather;
        self
    }

    /// With labor headcount
    #[inline]
    #[must_use]
    pub fn with_labor(mut self, count: u32) -> Self {
        self.labor_count = count;
        self
    }

    /// With equipment status
    #[inline]
    #[must_use]
    pub fn with_equipment(mut self, status: EquipmentStatus) -> Self {
        self.equipment_status = status;
        self
    }

    /// With free-text notes
    #[inline]
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Check required fields, date and percentage finiteness
    ///
    /// Out-of-range but finite percentages pass; they are clamped on
    /// conversion.
    ///
    /// # Errors
    /// Returns the first violated rule.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_fields(Fields {
            project_id: &self.project_id,
            created_by: &self.created_by,
            date: &self.date,
            physical_progress: self.physical_progress,
            financial_progress: self.financial_progress,
        })
    }

    /// Whether either percentage lies outside `[0, 100]`
    #[inline]
    #[must_use]
    pub fn needs_clamping(&self) -> bool {
        !(0.0..=100.0).contains(&self.physical_progress)
            || !(0.0..=100.0).contains(&self.financial_progress)
    }
}

/// Partial update; `None` leaves a field untouched
///
/// `notes` is doubly optional: `Some(None)` clears the notes. In JSON an
/// absent key leaves them alone and `"notes": null` clears them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObservationPatch {
    pub date: Option<String>,
    pub physical_progress: Option<f64>,
    pub financial_progress: Option<f64>,
    pub accomplishments: Option<Vec<String>>,
    pub issues: Option<Vec<String>>,
    pub weather: Option<Weather>,
    pub labor_count: Option<u32>,
    pub equipment_status: Option<EquipmentStatus>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl ObservationPatch {
    /// Empty patch
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the patch changes nothing
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    #[must_use]
    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    #[must_use]
    pub fn physical_progress(mut self, value: f64) -> Self {
        self.physical_progress = Some(value);
        self
    }

    #[must_use]
    pub fn financial_progress(mut self, value: f64) -> Self {
        self.financial_progress = Some(value);
        self
    }

    #[must_use]
    pub fn accomplishments(mut self, notes: Vec<String>) -> Self {
        self.accomplishments = Some(notes);
        self
    }

    #[must_use]
    pub fn issues(mut self, notes: Vec<String>) -> Self {
        self.issues = Some(notes);
        self
    }

    #[must_use]
    pub fn weather(mut self, weather: Weather) -> Self {
        self.weather = Some(weather);
        self
    }

    #[must_use]
    pub fn labor_count(mut self, count: u32) -> Self {
        self.labor_count = Some(count);
        self
    }

    #[must_use]
    pub fn equipment_status(mut self, status: EquipmentStatus) -> Self {
        self.equipment_status = Some(status);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: Option<String>) -> Self {
        self.notes = Some(notes);
        self
    }
}
