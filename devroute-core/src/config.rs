//! Configuration for the decision core
//!
//! Scoring weights, container bounds, anchor handlers and learning behaviour.
//! Every field has a default so a partial TOML file is enough.

use crate::error::{CoreError, Result};
use crate::learning::LearningMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CoreConfig {
    /// Whether `orchestrate` runs the full pipeline at startup
    pub orchestration_enabled: Option<bool>,

    /// Directory for the file-backed key-value store
    pub state_dir: Option<PathBuf>,

    /// Scoring weights for the ranking engine
    pub scoring: ScoringConfig,

    /// Container capacities and output caps
    pub limits: LimitsConfig,

    /// Last-resort handlers
    pub anchors: AnchorConfig,

    /// Learning feedback behaviour
    pub learning: LearningConfig,
}

impl CoreConfig {
    /// Load configuration from file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| CoreError::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CoreError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn orchestration_enabled(&self) -> bool {
        self.orchestration_enabled.unwrap_or(true)
    }

    pub fn state_dir(&self) -> PathBuf {
        self.state_dir.clone().unwrap_or_else(|| PathBuf::from(".devroute/state"))
    }
}

/// Scoring weights and constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub base_score: f32,
    pub success_rate_weight: f32,
    pub capability_match_weight: f32,
    pub complexity_weight: f32,
    pub recency_bonus: f32,
    pub confidence_weight: f32,

    /// Alignment when handler class equals problem complexity
    pub exact_alignment: f32,
    /// Alignment of a complex handler on an expert problem
    pub expert_alignment: f32,
    /// Alignment of a complex handler on a simple problem
    pub over_engineered_alignment: f32,
    pub partial_alignment: f32,

    pub recency_window_days: i64,
    pub min_score: f32,
    pub max_score: f32,

    /// Success rate above which reasoning mentions it
    pub reasoning_success_threshold: f32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base_score: 0.5,
            success_rate_weight: 0.3,
            capability_match_weight: 0.3,
            complexity_weight: 0.2,
            recency_bonus: 0.1,
            confidence_weight: 0.1,
            exact_alignment: 1.0,
            expert_alignment: 0.9,
            over_engineered_alignment: 0.3,
            partial_alignment: 0.6,
            recency_window_days: 7,
            min_score: 0.1,
            max_score: 1.0,
            reasoning_success_threshold: 0.8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub analysis_cache_capacity: usize,
    pub session_capacity: usize,
    pub decision_log_capacity: usize,
    pub pattern_capacity: usize,
    pub suggestion_candidates: usize,
    pub rendered_suggestions: usize,
    pub backup_handlers: usize,
    pub recommendation_fallbacks: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            analysis_cache_capacity: 100,
            session_capacity: 50,
            decision_log_capacity: 500,
            pattern_capacity: 1000,
            suggestion_candidates: 5,
            rendered_suggestions: 3,
            backup_handlers: 3,
            recommendation_fallbacks: 2,
        }
    }
}

/// The three anchor handlers, primary first
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorConfig {
    pub primary: String,
    pub secondary: String,
    pub tertiary: String,
}

impl AnchorConfig {
    pub fn all(&self) -> [&str; 3] {
        [&self.primary, &self.secondary, &self.tertiary]
    }
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            primary: "file-analyzer".to_string(),
            secondary: "auto-fixer".to_string(),
            tertiary: "quick-fixer".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    pub enabled: bool,
    pub mode: LearningMode,
    pub success_confidence_step: f32,
    pub failure_confidence_step: f32,
    pub usage_confidence_step: f32,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: LearningMode::Adaptive,
            success_confidence_step: 0.02,
            failure_confidence_step: 0.05,
            usage_confidence_step: 0.01,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_constants() {
        let config = CoreConfig::default();
        assert_eq!(config.scoring.base_score, 0.5);
        assert_eq!(config.limits.analysis_cache_capacity, 100);
        assert_eq!(config.limits.session_capacity, 50);
        assert_eq!(config.anchors.primary, "file-analyzer");
        assert!(config.orchestration_enabled());
        assert!(config.learning.enabled);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: CoreConfig = toml::from_str(
            r#"
            orchestration_enabled = false

            [scoring]
            recency_bonus = 0.2

            [limits]
            decision_log_capacity = 10
            "#,
        )
        .unwrap();

        assert!(!config.orchestration_enabled());
        assert_eq!(config.scoring.recency_bonus, 0.2);
        assert_eq!(config.scoring.success_rate_weight, 0.3);
        assert_eq!(config.limits.decision_log_capacity, 10);
        assert_eq!(config.limits.session_capacity, 50);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = CoreConfig::default();
        config.anchors.primary = "structural-rebuilder".to_string();
        config.learning.mode = LearningMode::Training;
        config.save(&path).unwrap();

        let loaded = CoreConfig::from_file(&path).unwrap();
        assert_eq!(loaded.anchors.primary, "structural-rebuilder");
        assert_eq!(loaded.learning.mode, LearningMode::Training);
    }
}
