//! Owned, date-ordered observation store for one project

use crate::error::{EngineError, EngineResult};
use chrono::{DateTime, Utc};
use me_model::{
    DailyObservation, ObservationDraft, ObservationId, ObservationPatch, ProjectId,
    ValidationError,
};
use std::collections::HashSet;

/// Single-writer store of a project's daily observations
///
/// Records are kept in date order; same-day records keep insertion order and
/// records with an unparseable date sort last.
#[derive(Debug, Clone, Default)]
pub struct LogRepository {
    project_id: ProjectId,
    records: Vec<DailyObservation>,
}

impl LogRepository {
    /// Create empty repository
    #[inline]
    #[must_use]
    pub fn new(project_id: impl Into<ProjectId>) -> Self {
        Self {
            project_id: project_id.into(),
            records: Vec::new(),
        }
    }

    /// Owning project
    #[inline]
    #[must_use]
    pub fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    /// Whether `draft` would be accepted by [`add`](Self::add)
    ///
    /// # Errors
    /// Returns [`ValidationError`] for a missing field, bad date, non-finite
    /// percentage or a draft for another project.
    pub fn check(&self, draft: &ObservationDraft) -> Result<(), ValidationError> {
        draft.validate()?;
        if draft.project_id != self.project_id {
            return Err(ValidationError::ProjectMismatch {
                expected: self.project_id.clone(),
                actual: draft.project_id.clone(),
            });
        }
        Ok(())
    }

    /// Validate `draft` and store it under `id`
    ///
    /// Finite percentages outside `[0, 100]` are clamped.
    ///
    /// # Errors
    /// Same as [`check`](Self::check).
    pub fn add(
        &mut self,
        id: ObservationId,
        draft: ObservationDraft,
        now: DateTime<Utc>,
    ) -> Result<DailyObservation, ValidationError> {
        self.check(&draft)?;
        if draft.needs_clamping() {
            tracing::warn!(
                %id,
                physical = draft.physical_progress,
                financial = draft.financial_progress,
                "Clamping progress into [0, 100]"
            );
        }

        let record = DailyObservation::from_draft(id, draft, now);
        self.records.push(record.clone());
        self.reorder();
        Ok(record)
    }

    /// Apply `patch` to the record with `id`
    ///
    /// The record is only replaced if the patched version validates.
    ///
    /// # Errors
    /// Returns [`EngineError::NotFound`] for an unknown id or
    /// [`EngineError::Validation`] if the patched record is invalid.
    pub fn update(
        &mut self,
        id: &ObservationId,
        patch: ObservationPatch,
        now: DateTime<Utc>,
    ) -> EngineResult<DailyObservation> {
        let index = self.position(id)?;

        let mut patched = self.records[index].clone();
        let date_changed = patch.date.is_some();
        patched.apply_patch(patch, now);
        patched.validate()?;
        if patched.clamp_percentages() {
            tracing::warn!(%id, "Clamping patched progress into [0, 100]");
        }

        self.records[index] = patched.clone();
        if date_changed {
            self.reorder();
        }
        Ok(patched)
    }

    /// Remove the record with `id`
    ///
    /// # Errors
    /// Returns [`EngineError::NotFound`] for an unknown id.
    pub fn remove(&mut self, id: &ObservationId) -> EngineResult<DailyObservation> {
        let index = self.position(id)?;
        Ok(self.records.remove(index))
    }

    /// Replace the whole store with `records`
    ///
    /// Records for other projects are dropped, as is every record after the
    /// first with a given id. Non-finite percentages become 0 and
    /// out-of-range ones are clamped. Unparseable dates are kept; the rollup
    /// pipeline reports them. Returns the number of records kept.
    pub fn load(&mut self, records: impl IntoIterator<Item = DailyObservation>) -> usize {
        self.records.clear();
        let mut seen = HashSet::new();
        for mut record in records {
            if record.project_id != self.project_id {
                tracing::warn!(
                    id = %record.id,
                    project = %record.project_id,
                    expected = %self.project_id,
                    "Dropping record for another project"
                );
                continue;
            }
            if !seen.insert(record.id.clone()) {
                tracing::warn!(
                    id = %record.id,
                    date = %record.date,
                    "Dropping record with repeated id"
                );
                continue;
            }
            for value in [&mut record.physical_progress, &mut record.financial_progress] {
                if !value.is_finite() {
                    *value = 0.0;
                }
            }
            if record.clamp_percentages() {
                tracing::warn!(id = %record.id, "Clamping loaded progress into [0, 100]");
            }
            self.records.push(record);
        }
        self.reorder();
        self.records.len()
    }

    /// Record by id
    #[must_use]
    pub fn get(&self, id: &ObservationId) -> Option<&DailyObservation> {
        self.records.iter().find(|r| &r.id == id)
    }

    /// All records in date order
    #[inline]
    #[must_use]
    pub fn list(&self) -> &[DailyObservation] {
        &self.records
    }

    /// Number of records
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn position(&self, id: &ObservationId) -> EngineResult<usize> {
        self.records
            .iter()
            .position(|r| &r.id == id)
            .ok_or_else(|| EngineError::not_found(id.clone()))
    }

    fn reorder(&mut self) {
        self.records.sort_by_cached_key(|r| {
            let date = r.calendar_date().ok();
            (date.is_none(), date)
        });
    }
}
