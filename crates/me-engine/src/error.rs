//! Error types for the M&E engine

use me_model::{ObservationId, ValidationError};
use std::path::PathBuf;

/// Main engine error type
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Draft or patched record breaks a validation rule
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// No observation with this id
    #[error("observation not found: {id}")]
    NotFound {
        /// Requested id
        id: ObservationId,
    },

    /// Configuration is invalid
    #[error("configuration error: {0}")]
    Config(String),

    /// Config file could not be read
    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// TOML config did not parse
    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    /// YAML config did not parse
    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON config did not parse
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    /// Create not-found error
    #[inline]
    pub fn not_found(id: impl Into<ObservationId>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Check if error is a missing observation
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if error is a validation failure
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if error came from configuration
    #[inline]
    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::ConfigIo { .. } | Self::Toml(_) | Self::Yaml(_) | Self::Json(_)
        )
    }
}

/// Result alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicates() {
        let err = EngineError::not_found("obs-9");
        assert!(err.is_not_found());
        assert!(!err.is_validation());
        assert_eq!(err.to_string(), "observation not found: obs-9");

        let err = EngineError::from(ValidationError::MissingField("createdBy"));
        assert!(err.is_validation());
        assert!(!err.is_config());

        assert!(EngineError::Config("bad".into()).is_config());
    }
}
