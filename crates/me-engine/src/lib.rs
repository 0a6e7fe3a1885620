//! M&E Engine
//!
//! The single owned aggregate behind a project's monitoring and evaluation
//! views:
//! - [`LogRepository`] owns the daily observations
//! - [`MeEngine`] validates mutations, reruns the rollup pipeline once per
//!   mutation and publishes the new snapshot atomically
//! - [`ProjectRegistry`] serializes writers per project for multi-session hosts
//! - [`EngineConfig`] loads settings from TOML, YAML or JSON
//!
//! # Example
//!
//! ```rust,ignore
//! use me_engine::{EngineConfig, MeEngine};
//! use me_model::{ObservationDraft, RollupPeriod};
//!
//! let mut engine = MeEngine::new(EngineConfig::new("tower-b").with_total_budget(2.5e6))?;
//! engine.add_observation(
//!     ObservationDraft::new("tower-b", "2024-01-15", "site-engineer").with_progress(25.0, 20.0),
//! )?;
//!
//! let weeks = engine.list_rollups(RollupPeriod::Weekly);
//! let variance = engine.variance();
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod registry;
mod repository;

// Re-exports
pub use config::EngineConfig;
pub use engine::{MeEngine, MeEngineBuilder};
pub use error::{EngineError, EngineResult};
pub use registry::{ProjectRegistry, SharedEngine};
pub use repository::LogRepository;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for hosts embedding the engine
    pub use crate::{EngineConfig, EngineError, MeEngine, ProjectRegistry};
    pub use me_model::{
        DailyObservation, FilterPeriod, MeFilter, ObservationDraft, ObservationId,
        ObservationPatch, ProjectId, RollupPeriod,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
