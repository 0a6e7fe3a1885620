//! Per-project engine registry
//!
//! Hosts with several sessions touching the same project go through the
//! registry. Each project's engine sits behind its own `RwLock`: writers are
//! serialized, readers run in parallel with each other but never alongside a
//! write.

use crate::config::EngineConfig;
use crate::engine::MeEngine;
use crate::error::EngineResult;
use dashmap::DashMap;
use me_model::ProjectId;
use parking_lot::RwLock;
use std::sync::Arc;

/// Engine shared between sessions
pub type SharedEngine = Arc<RwLock<MeEngine>>;

/// Thread-safe map of project id to engine
#[derive(Debug, Default)]
pub struct ProjectRegistry {
    engines: DashMap<ProjectId, SharedEngine>,
}

impl ProjectRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine for `config.project_id`, created on first use
    ///
    /// An existing engine is returned unchanged; `config` only applies when
    /// the engine is created.
    ///
    /// # Errors
    /// Returns a config error if `config` fails validation.
    pub fn open(&self, config: EngineConfig) -> EngineResult<SharedEngine> {
        let project = config.project_id.clone();
        let engine = MeEngine::new(config)?;
        let shared = self
            .engines
            .entry(project)
            .or_insert_with(|| {
                tracing::info!(project = %engine.project_id(), "Registering project engine");
                Arc::new(RwLock::new(engine))
            })
            .clone();
        Ok(shared)
    }

    /// Register a prebuilt engine, replacing any engine for the same project
    pub fn insert(&self, engine: MeEngine) -> SharedEngine {
        let project = engine.project_id().clone();
        let shared = Arc::new(RwLock::new(engine));
        if self.engines.insert(project.clone(), shared.clone()).is_some() {
            tracing::warn!(%project, "Replaced project engine");
        }
        shared
    }

    /// Engine for `project`
    #[must_use]
    pub fn get(&self, project: &ProjectId) -> Option<SharedEngine> {
        self.engines.get(project).map(|e| Arc::clone(e.value()))
    }

    /// Run `f` under the project's write lock
    ///
    /// Returns `None` for an unknown project.
    pub fn write<R>(&self, project: &ProjectId, f: impl FnOnce(&mut MeEngine) -> R) -> Option<R> {
        let engine = self.get(project)?;
        let mut guard = engine.write();
        Some(f(&mut guard))
    }

    /// Run `f` under the project's read lock
    ///
    /// Returns `None` for an unknown project.
    pub fn read<R>(&self, project: &ProjectId, f: impl FnOnce(&MeEngine) -> R) -> Option<R> {
        let engine = self.get(project)?;
        let guard = engine.read();
        Some(f(&guard))
    }

    /// Drop a project's engine
    pub fn remove(&self, project: &ProjectId) -> Option<SharedEngine> {
        self.engines.remove(project).map(|(_, engine)| engine)
    }

    /// Registered project ids, sorted
    #[must_use]
    pub fn projects(&self) -> Vec<ProjectId> {
        let mut ids: Vec<_> = self.engines.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Number of registered projects
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.engines.len()
    }

    /// Whether no project is registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use me_test_utils::draft_on;

    #[test]
    fn open_is_idempotent() {
        let registry = ProjectRegistry::new();
        let a = registry.open(EngineConfig::new("test-project")).unwrap();
        let b = registry
            .open(EngineConfig::new("test-project").with_total_budget(99.0))
            .unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(b.read().config().total_budget, 0.0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn open_rejects_invalid_config() {
        let registry = ProjectRegistry::new();
        assert!(registry.open(EngineConfig::default()).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn write_then_read() {
        let registry = ProjectRegistry::new();
        registry.open(EngineConfig::new("test-project")).unwrap();
        let project = ProjectId::new("test-project");

        let added = registry
            .write(&project, |engine| engine.add_observation(draft_on("2024-01-15", 25.0, 20.0)))
            .unwrap();
        assert!(added.is_ok());

        let weeks = registry.read(&project, |engine| engine.snapshot().weekly.len());
        assert_eq!(weeks, Some(1));
        assert_eq!(registry.read(&ProjectId::new("other"), |e| e.metrics()), None);
    }

    #[test]
    fn insert_replace_and_remove() {
        let registry = ProjectRegistry::new();
        registry.insert(MeEngine::new(EngineConfig::new("b")).unwrap());
        registry.insert(MeEngine::new(EngineConfig::new("a")).unwrap());
        registry.insert(MeEngine::new(EngineConfig::new("a").with_total_budget(5.0)).unwrap());

        assert_eq!(registry.projects(), vec![ProjectId::new("a"), ProjectId::new("b")]);
        let a = registry.get(&ProjectId::new("a")).unwrap();
        assert_eq!(a.read().config().total_budget, 5.0);

        assert!(registry.remove(&ProjectId::new("a")).is_some());
        assert!(registry.get(&ProjectId::new("a")).is_none());
    }
}
