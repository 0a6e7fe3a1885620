//! Per-project M&E engine
//!
//! Owns the observation repository and the latest rollup snapshot. Every
//! successful mutation runs one full recompute and swaps the snapshot.

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::repository::LogRepository;
use me_model::{
    AggregatedData, Clock, DailyObservation, IdGenerator, MeFilter, MeMetrics, ObservationDraft,
    ObservationId, ObservationPatch, ProgressVariance, ProjectId, RollupPeriod, RollupSeries,
    RollupSnapshot, RollupWarning, SystemClock, UlidGenerator,
};
use me_rollup::{
    FilterEngine, FixedQualitySignal, MetricsSummarizer, QualitySignal, RollupPipeline,
    VarianceAnalyzer,
};
use std::sync::Arc;

/// Rollup and variance engine for one project
///
/// Mutations take `&mut self`, reads take `&self`. A snapshot handed out by
/// [`snapshot`](Self::snapshot) stays complete and unchanged after later
/// mutations.
pub struct MeEngine {
    config: EngineConfig,
    repository: LogRepository,
    pipeline: RollupPipeline,
    snapshot: Arc<RollupSnapshot>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl std::fmt::Debug for MeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeEngine")
            .field("project_id", self.repository.project_id())
            .field("observations", &self.repository.len())
            .field("weeks", &self.snapshot.weekly.len())
            .field("clock", &self.clock)
            .field("ids", &self.ids)
            .finish_non_exhaustive()
    }
}

impl MeEngine {
    /// Create engine with system clock, ULID ids and the configured fixed
    /// quality score
    ///
    /// # Errors
    /// Returns a config error if `config` fails validation.
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        Self::builder(config).build()
    }

    /// Start building an engine with injected collaborators
    #[inline]
    #[must_use]
    pub fn builder(config: EngineConfig) -> MeEngineBuilder {
        MeEngineBuilder::new(config)
    }

    /// Engine settings
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Project this engine serves
    #[inline]
    #[must_use]
    pub fn project_id(&self) -> &ProjectId {
        self.repository.project_id()
    }

    /// Record a new observation
    ///
    /// # Errors
    /// Returns [`EngineError::Validation`](crate::EngineError::Validation) if
    /// the draft is rejected; nothing changes in that case and no id is
    /// drawn.
    pub fn add_observation(&mut self, draft: ObservationDraft) -> EngineResult<DailyObservation> {
        self.repository.check(&draft)?;
        let id = self.ids.next_id();
        let record = self.repository.add(id, draft, self.clock.now())?;
        tracing::info!(project = %self.project_id(), id = %record.id, date = %record.date, "Observation added");
        self.recompute();
        Ok(record)
    }

    /// Patch an existing observation
    ///
    /// # Errors
    /// Returns not-found for an unknown id, or a validation error if the
    /// patched record is invalid. Nothing changes on error.
    pub fn update_observation(
        &mut self,
        id: &ObservationId,
        patch: ObservationPatch,
    ) -> EngineResult<()> {
        if patch.is_empty() {
            tracing::debug!(%id, "Empty patch");
        }
        self.repository.update(id, patch, self.clock.now())?;
        tracing::info!(project = %self.project_id(), %id, "Observation updated");
        self.recompute();
        Ok(())
    }

    /// Delete an observation
    ///
    /// # Errors
    /// Returns not-found for an unknown id.
    pub fn remove_observation(&mut self, id: &ObservationId) -> EngineResult<()> {
        self.repository.remove(id)?;
        tracing::info!(project = %self.project_id(), %id, "Observation removed");
        self.recompute();
        Ok(())
    }

    /// Replace every observation with `records` and recompute once
    ///
    /// Returns the number of records kept.
    pub fn load_observations(
        &mut self,
        records: impl IntoIterator<Item = DailyObservation>,
    ) -> usize {
        let kept = self.repository.load(records);
        tracing::info!(project = %self.project_id(), kept, "Observations loaded");
        self.recompute();
        kept
    }

    /// Observations in date order
    #[must_use]
    pub fn list_observations(&self) -> Vec<DailyObservation> {
        self.repository.list().to_vec()
    }

    /// Observation by id
    #[must_use]
    pub fn observation(&self, id: &ObservationId) -> Option<&DailyObservation> {
        self.repository.get(id)
    }

    /// One layer of the latest snapshot
    #[must_use]
    pub fn list_rollups(&self, period: RollupPeriod) -> RollupSeries {
        self.snapshot.series(period)
    }

    /// Latest complete snapshot
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> Arc<RollupSnapshot> {
        Arc::clone(&self.snapshot)
    }

    /// Records left out of the latest bucketing
    #[inline]
    #[must_use]
    pub fn warnings(&self) -> &[RollupWarning] {
        &self.snapshot.warnings
    }

    /// Filter raw observations or a rollup layer; `None` without a filter
    #[must_use]
    pub fn apply_filter(&self, filter: Option<&MeFilter>) -> Option<AggregatedData> {
        FilterEngine::new(&self.snapshot, self.repository.list()).apply(filter)
    }

    /// Variance records for the weekly layer
    #[must_use]
    pub fn variance(&self) -> Vec<ProgressVariance> {
        self.variance_for(RollupPeriod::Weekly)
    }

    /// Variance records for any rollup layer
    #[must_use]
    pub fn variance_for(&self, period: RollupPeriod) -> Vec<ProgressVariance> {
        match period {
            RollupPeriod::Weekly => VarianceAnalyzer::analyze(&self.snapshot.weekly),
            RollupPeriod::Monthly => VarianceAnalyzer::analyze(&self.snapshot.monthly),
            RollupPeriod::Quarterly => VarianceAnalyzer::analyze(&self.snapshot.quarterly),
        }
    }

    /// Top-level metrics over the raw observations
    #[must_use]
    pub fn metrics(&self) -> MeMetrics {
        MetricsSummarizer::summarize(self.repository.list())
    }

    fn recompute(&mut self) {
        let snapshot = self
            .pipeline
            .run(self.repository.project_id(), self.repository.list(), self.clock.now());
        for warning in &snapshot.warnings {
            tracing::warn!(
                id = %warning.observation_id,
                date = %warning.date,
                "Observation excluded from rollups: {}",
                warning.reason
            );
        }
        self.snapshot = Arc::new(snapshot);
    }
}

/// Builder for [`MeEngine`]
pub struct MeEngineBuilder {
    config: EngineConfig,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    signal: Option<Arc<dyn QualitySignal>>,
}

impl std::fmt::Debug for MeEngineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeEngineBuilder")
            .field("config", &self.config)
            .field("clock", &self.clock)
            .field("ids", &self.ids)
            .field("custom_signal", &self.signal.is_some())
            .finish()
    }
}

impl MeEngineBuilder {
    /// Start from defaults
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            clock: Arc::new(SystemClock),
            ids: Arc::new(UlidGenerator),
            signal: None,
        }
    }

    /// With time source
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// With id generator
    #[must_use]
    pub fn ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// With quality signal provider
    #[must_use]
    pub fn quality_signal(mut self, signal: Arc<dyn QualitySignal>) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Build an empty engine
    ///
    /// # Errors
    /// Returns a config error if the config fails
    /// [`validate`](EngineConfig::validate).
    pub fn build(self) -> EngineResult<MeEngine> {
        self.config.validate()?;
        let signal = self.signal.unwrap_or_else(|| {
            Arc::new(FixedQualitySignal::new(self.config.default_quality_score))
        });
        let pipeline = RollupPipeline::new(self.config.pipeline_config()).with_signal(signal);

        tracing::debug!(project = %self.config.project_id, "Engine created");
        Ok(MeEngine {
            repository: LogRepository::new(self.config.project_id.clone()),
            pipeline,
            snapshot: Arc::new(RollupSnapshot::empty()),
            clock: self.clock,
            ids: self.ids,
            config: self.config,
        })
    }
}
