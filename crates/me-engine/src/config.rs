//! Engine configuration
//!
//! Loaded from TOML, YAML or JSON, picked by file extension:
//!
//! ```toml
//! projectId = "tower-b"
//! totalBudget = 2500000.0
//! weekStartMode = "iso-calendar"
//! aggregationMode = "weighted"
//! defaultQualityScore = 92.0
//! ```

use crate::error::{EngineError, EngineResult};
use me_calendar::WeekStartMode;
use me_model::ProjectId;
use me_rollup::{AggregationMode, PipelineConfig, DEFAULT_QUALITY_SCORE, QUALITY_SCORE_RANGE};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Per-project engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Project the engine serves
    pub project_id: ProjectId,
    /// Project budget for quarterly budget analysis
    pub total_budget: f64,
    /// How week ranges are anchored
    pub week_start_mode: WeekStartMode,
    /// Monthly/quarterly averaging
    pub aggregation_mode: AggregationMode,
    /// Quality score used when no quality feed is injected
    pub default_quality_score: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            project_id: ProjectId::default(),
            total_budget: 0.0,
            week_start_mode: WeekStartMode::default(),
            aggregation_mode: AggregationMode::default(),
            default_quality_score: DEFAULT_QUALITY_SCORE,
        }
    }
}

impl EngineConfig {
    /// Create default configuration for a project
    #[inline]
    #[must_use]
    pub fn new(project_id: impl Into<ProjectId>) -> Self {
        Self {
            project_id: project_id.into(),
            ..Self::default()
        }
    }

    /// With total budget
    #[inline]
    #[must_use]
    pub fn with_total_budget(mut self, budget: f64) -> Self {
        self.total_budget = budget;
        self
    }

    /// With week start mode
    #[inline]
    #[must_use]
    pub fn with_week_start_mode(mut self, mode: WeekStartMode) -> Self {
        self.week_start_mode = mode;
        self
    }

    /// With aggregation mode
    #[inline]
    #[must_use]
    pub fn with_aggregation_mode(mut self, mode: AggregationMode) -> Self {
        self.aggregation_mode = mode;
        self
    }

    /// With default quality score
    #[inline]
    #[must_use]
    pub fn with_default_quality_score(mut self, score: f64) -> Self {
        self.default_quality_score = score;
        self
    }

    /// Load and validate a config file
    ///
    /// `.toml`, `.yaml`/`.yml` and `.json` are supported.
    ///
    /// # Errors
    /// Returns error if the file cannot be read, does not parse, has an
    /// unknown extension or fails [`validate`](Self::validate).
    pub fn from_path(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| EngineError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let config: Self = match extension.as_deref() {
            Some("toml") => toml::from_str(&text)?,
            Some("yaml" | "yml") => serde_yaml::from_str(&text)?,
            Some("json") => serde_json::from_str(&text)?,
            other => {
                return Err(EngineError::Config(format!(
                    "unsupported config format: {}",
                    other.unwrap_or("<none>")
                )))
            }
        };

        config.validate()?;
        tracing::info!(path = %path.display(), project = %config.project_id, "Loaded engine config");
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// Returns [`EngineError::Config`] for a blank project id, a negative or
    /// non-finite budget, or a quality score outside `[85, 100]`.
    pub fn validate(&self) -> EngineResult<()> {
        if self.project_id.is_blank() {
            return Err(EngineError::Config("projectId must not be empty".into()));
        }
        if !self.total_budget.is_finite() || self.total_budget < 0.0 {
            return Err(EngineError::Config(format!(
                "totalBudget must be a finite non-negative number, got {}",
                self.total_budget
            )));
        }
        if !QUALITY_SCORE_RANGE.contains(&self.default_quality_score) {
            return Err(EngineError::Config(format!(
                "defaultQualityScore must be within {}..={}, got {}",
                QUALITY_SCORE_RANGE.start(),
                QUALITY_SCORE_RANGE.end(),
                self.default_quality_score
            )));
        }
        Ok(())
    }

    /// Settings handed to the rollup pipeline
    #[must_use]
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::default()
            .with_week_start_mode(self.week_start_mode)
            .with_aggregation_mode(self.aggregation_mode)
            .with_total_budget(self.total_budget)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn write_config(name: &str, body: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        std::fs::File::create(&path)
            .unwrap()
            .write_all(body.as_bytes())
            .unwrap();
        (dir, path)
    }

    #[test]
    fn loads_toml() {
        let (_dir, path) = write_config(
            "engine.toml",
            r#"
                projectId = "tower-b"
                totalBudget = 2500000.0
                weekStartMode = "iso-calendar"
                aggregationMode = "weighted"
            "#,
        );

        let config = EngineConfig::from_path(&path).unwrap();
        assert_eq!(
            config,
            EngineConfig::new("tower-b")
                .with_total_budget(2_500_000.0)
                .with_week_start_mode(WeekStartMode::IsoCalendar)
                .with_aggregation_mode(AggregationMode::Weighted)
        );
    }

    #[test]
    fn loads_yaml_and_json() {
        let (_dir, path) = write_config("engine.yml", "projectId: site-a\ntotalBudget: 1000\n");
        let config = EngineConfig::from_path(&path).unwrap();
        assert_eq!(config.project_id.as_str(), "site-a");
        assert_eq!(config.default_quality_score, DEFAULT_QUALITY_SCORE);

        let (_dir, path) = write_config(
            "engine.json",
            r#"{"projectId":"site-b","defaultQualityScore":95.0}"#,
        );
        let config = EngineConfig::from_path(&path).unwrap();
        assert_eq!(config.default_quality_score, 95.0);
        assert_eq!(config.week_start_mode, WeekStartMode::FixedOffset);
    }

    #[test]
    fn rejects_bad_values() {
        let (_dir, path) = write_config("engine.toml", "projectId = \"a\"\ntotalBudget = -5.0\n");
        let err = EngineConfig::from_path(&path).unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));

        let low_quality = EngineConfig::new("a").with_default_quality_score(50.0);
        assert!(low_quality.validate().is_err());

        assert!(EngineConfig::default().validate().is_err());
        assert!(EngineConfig::new("a").with_total_budget(f64::NAN).validate().is_err());
    }

    #[test]
    fn rejects_unknown_extension_and_syntax() {
        let (_dir, path) = write_config("engine.ini", "projectId=a");
        assert!(matches!(EngineConfig::from_path(&path), Err(EngineError::Config(_))));

        let (_dir, path) = write_config("engine.toml", "projectId = ");
        assert!(matches!(EngineConfig::from_path(&path), Err(EngineError::Toml(_))));

        let (_dir, path) = write_config("engine.toml", "project_id = \"a\"\n");
        assert!(matches!(EngineConfig::from_path(&path), Err(EngineError::Toml(_))));

        let missing = EngineConfig::from_path("/definitely/not/here.toml").unwrap_err();
        assert!(missing.is_config());
    }

    #[test]
    fn pipeline_settings_follow_config() {
        let pipeline = EngineConfig::new("a")
            .with_total_budget(10.0)
            .with_aggregation_mode(AggregationMode::Weighted)
            .pipeline_config();
        assert_eq!(pipeline.total_budget, 10.0);
        assert_eq!(pipeline.aggregation_mode, AggregationMode::Weighted);
    }
}
