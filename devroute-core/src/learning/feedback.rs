//! Outcome feedback, suggestions and harvesting

use super::extractors::{self, ActionType, OutcomeContext};
use super::pattern_store::{LearningPattern, LearningSession, PatternStore, PatternType};
use super::state::{LearningMode, LearningState};
use crate::classifier::{ProblemClassifier, ProblemType, RequestContext};
use crate::config::LearningConfig;
use crate::error::Result;
use crate::registry::CapabilityRegistry;
use crate::workspace::WorkspaceProvider;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Result a handler reports for an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}

/// Longest source excerpt kept as a harvested pattern's before-state
const HARVEST_EXCERPT_CHARS: usize = 200;

pub struct FeedbackLoop {
    patterns: Arc<RwLock<PatternStore>>,
    registry: Arc<RwLock<CapabilityRegistry>>,
    state: RwLock<LearningState>,
    success_step: f32,
    failure_step: f32,
    suggestion_candidates: usize,
    rendered_suggestions: usize,
}

impl FeedbackLoop {
    pub fn new(
        patterns: Arc<RwLock<PatternStore>>,
        registry: Arc<RwLock<CapabilityRegistry>>,
        config: &LearningConfig,
        suggestion_candidates: usize,
        rendered_suggestions: usize,
    ) -> Self {
        Self {
            patterns,
            registry,
            state: RwLock::new(LearningState::new(config.enabled, config.mode)),
            success_step: config.success_confidence_step,
            failure_step: config.failure_confidence_step,
            suggestion_candidates,
            rendered_suggestions,
        }
    }

    pub async fn is_enabled(&self) -> bool {
        self.state.read().await.is_learning_enabled
    }

    pub async fn toggle(&self) -> bool {
        let mut state = self.state.write().await;
        state.is_learning_enabled = !state.is_learning_enabled;
        info!("Learning {}", if state.is_learning_enabled { "enabled" } else { "disabled" });
        state.is_learning_enabled
    }

    pub async fn set_mode(&self, mode: LearningMode) {
        let mut state = self.state.write().await;
        if state.learning_mode != mode {
            info!("Learning mode {} -> {}", state.learning_mode, mode);
            state.learning_mode = mode;
        }
    }

    pub async fn state(&self) -> LearningState {
        self.state.read().await.clone()
    }

    pub async fn restore_state(&self, state: LearningState) {
        *self.state.write().await = state;
    }

    /// Count a learning event such as a classification; ignored while learning is off
    pub async fn record_event(&self, kind: &str) {
        let mut state = self.state.write().await;
        if !state.is_learning_enabled {
            return;
        }
        if kind == "classification" {
            state.classification_events += 1;
        }
        state.mark(kind, None);
    }

    /// Learn from a reported outcome
    pub async fn record_outcome(&self, handler_name: &str, action_type: &str, outcome: Outcome, ctx: &OutcomeContext) {
        let mut state = self.state.write().await;
        state.last_attempted = Some(Utc::now());
        if !state.is_learning_enabled {
            debug!("Learning disabled, ignoring {} outcome from {}", action_type, handler_name);
            return;
        }

        state.outcomes_recorded += 1;
        if outcome.is_success() {
            state.successful_outcomes += 1;
        }

        if state.learning_mode.adjusts_confidence() {
            let delta = if outcome.is_success() { self.success_step } else { -self.failure_step };
            match self.registry.write().await.record_outcome(handler_name, outcome.is_success(), delta) {
                Ok(confidence) => debug!("{} confidence now {:.2}", handler_name, confidence),
                Err(e) => debug!("No confidence update for {}: {}", handler_name, e),
            }
        }

        let action = ActionType::from(action_type);
        let mut learned = Vec::new();
        if outcome.is_success() {
            match extractors::extract(&action, handler_name, ctx) {
                Ok(pattern) => learned.push(pattern),
                Err(e) => debug!("No pattern from {} outcome: {}", action, e),
            }
            if action == ActionType::Orchestration {
                match extractors::routing_pattern(ctx) {
                    Ok(pattern) => learned.push(pattern),
                    Err(e) => debug!("No routing pattern from orchestration outcome: {}", e),
                }
            }
        }

        let mut session = LearningSession::new(handler_name, action.to_string(), outcome.is_success());
        {
            let mut store = self.patterns.write().await;
            for pattern in learned {
                session.patterns.push(pattern.id);
                store.add_pattern(pattern);
                state.patterns_created += 1;
            }
            store.add_session(session);
        }

        state.mark(action_type, Some(handler_name));
    }

    /// Up to the configured number of rendered suggestions for a scenario
    pub async fn suggest(&self, code: &str, scenario: &str) -> Vec<String> {
        let store = self.patterns.read().await;
        let matched = store.matching(scenario, self.suggestion_candidates);

        if matched.is_empty() {
            debug!("No learned patterns for {}, using generic suggestions", scenario);
            return generic_suggestions(code, scenario);
        }

        matched.into_iter().take(self.rendered_suggestions).map(render).collect()
    }

    /// Classify every matching workspace file and store what it shows.
    /// Only runs in training mode with learning on.
    pub async fn harvest(
        &self,
        provider: &dyn WorkspaceProvider,
        classifier: &dyn ProblemClassifier,
        glob: &str,
    ) -> Result<usize> {
        let mut state = self.state.write().await;
        if !state.is_learning_enabled || !state.learning_mode.allows_harvest() {
            warn!(
                "Harvest skipped: learning {} in {} mode",
                if state.is_learning_enabled { "enabled" } else { "disabled" },
                state.learning_mode
            );
            return Ok(0);
        }

        let files = provider.list_files(glob).await?;
        let mut harvested = Vec::new();
        for path in files {
            let code = match provider.read_file(&path).await {
                Ok(code) => code,
                Err(e) => {
                    warn!("Skipping {}: {:#}", path.display(), e);
                    continue;
                }
            };

            let file_path = path.to_string_lossy();
            let classification = classifier.classify(&code, &file_path, &RequestContext::default());
            if classification.problem_type == ProblemType::Unknown {
                continue;
            }

            let pattern_type = match classification.problem_type {
                ProblemType::ComponentCreation => PatternType::ComponentPattern,
                _ => PatternType::CodeStructure,
            };
            let excerpt: String = code.chars().take(HARVEST_EXCERPT_CHARS).collect();
            harvested.push(
                LearningPattern::new(pattern_type, "harvest")
                    .with_states(excerpt, String::new())
                    .with_reasoning(format!("{}: {}", file_path, classification.indicators.join("; ")))
                    .with_confidence(classification.confidence)
                    .with_scenarios([classification.problem_type.as_str(), "harvest"]),
            );
        }

        let count = harvested.len();
        let mut store = self.patterns.write().await;
        for pattern in harvested {
            store.add_pattern(pattern);
        }
        state.patterns_created += count as u64;
        state.mark("harvest", None);

        info!("Harvested {} patterns matching {}", count, glob);
        Ok(count)
    }

    /// Drop every pattern, session and counter
    pub async fn reset_learning(&self) {
        self.patterns.write().await.clear();
        self.state.write().await.reset_counters();
        info!("Learning state reset");
    }
}

fn render(pattern: &LearningPattern) -> String {
    let mut text = format!(
        "{} ({} pattern, {:.0}% confidence, from {})",
        pattern.reasoning,
        pattern.pattern_type,
        pattern.confidence * 100.0,
        pattern.learned_from
    );
    if !pattern.after_state.is_empty() {
        text.push_str(&format!(": {}", pattern.after_state));
    }
    text
}

fn generic_suggestions(code: &str, scenario: &str) -> Vec<String> {
    let size = code.len();
    let scope = if size > 1000 {
        format!("Split this {}-character module into smaller units before applying {} changes", size, scenario)
    } else {
        format!("Keep the {} change to this {}-character snippet small and focused", scenario, size)
    };
    vec![
        format!("Review {} changes against the existing project conventions", scenario),
        scope,
        format!("Add a test covering the {} behaviour before changing it", scenario),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::RuleClassifier;
    use crate::workspace::FsWorkspace;

    fn feedback(config: &LearningConfig) -> (FeedbackLoop, Arc<RwLock<PatternStore>>, Arc<RwLock<CapabilityRegistry>>) {
        let patterns = Arc::new(RwLock::new(PatternStore::new(1000, 50)));
        let registry = Arc::new(RwLock::new(CapabilityRegistry::seeded(0.01)));
        (FeedbackLoop::new(patterns.clone(), registry.clone(), config, 5, 3), patterns, registry)
    }

    fn fix_context() -> OutcomeContext {
        OutcomeContext {
            before: Some("const a = 1;;".to_string()),
            after: Some("const a = 1;".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_disabled_learning_stores_nothing() {
        let (feedback, patterns, registry) = feedback(&LearningConfig::default());
        assert!(!feedback.toggle().await);

        feedback.record_outcome("auto-fixer", "auto-fix", Outcome::Success, &fix_context()).await;

        assert_eq!(patterns.read().await.pattern_count(), 0);
        assert_eq!(patterns.read().await.session_count(), 0);
        let state = feedback.state().await;
        assert!(state.last_attempted.is_some());
        assert_eq!(state.outcomes_recorded, 0);
        assert_eq!(registry.read().await.get("auto-fixer").unwrap().confidence, 0.85);
    }

    #[tokio::test]
    async fn test_success_stores_pattern_and_adjusts_confidence() {
        let (feedback, patterns, registry) = feedback(&LearningConfig::default());
        feedback.record_outcome("auto-fixer", "auto-fix", Outcome::Success, &fix_context()).await;

        assert_eq!(patterns.read().await.pattern_count(), 1);
        let confidence = registry.read().await.get("auto-fixer").unwrap().confidence;
        assert!((confidence - 0.87).abs() < 1e-6);

        let state = feedback.state().await;
        assert_eq!(state.patterns_created, 1);
        assert_eq!(state.last_learning_action.unwrap().handler_name.as_deref(), Some("auto-fixer"));
    }

    #[tokio::test]
    async fn test_failure_lowers_confidence_without_pattern() {
        let (feedback, patterns, registry) = feedback(&LearningConfig::default());
        feedback.record_outcome("quick-fixer", "auto-fix", Outcome::Failure, &fix_context()).await;

        assert_eq!(patterns.read().await.pattern_count(), 0);
        assert_eq!(patterns.read().await.session_count(), 1);
        let confidence = registry.read().await.get("quick-fixer").unwrap().confidence;
        assert!((confidence - 0.85).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_static_mode_keeps_confidence() {
        let config = LearningConfig { mode: LearningMode::Static, ..Default::default() };
        let (feedback, patterns, registry) = feedback(&config);
        feedback.record_outcome("auto-fixer", "auto-fix", Outcome::Success, &fix_context()).await;

        assert_eq!(patterns.read().await.pattern_count(), 1);
        assert_eq!(registry.read().await.get("auto-fixer").unwrap().confidence, 0.85);
    }

    #[tokio::test]
    async fn test_missing_context_creates_no_pattern() {
        let (feedback, patterns, _) = feedback(&LearningConfig::default());
        feedback
            .record_outcome("component-generator", "component-creation", Outcome::Success, &OutcomeContext::default())
            .await;
        assert_eq!(patterns.read().await.pattern_count(), 0);
        assert_eq!(patterns.read().await.session_count(), 1);
    }

    #[tokio::test]
    async fn test_orchestration_success_reinforces_routing() {
        let (feedback, patterns, _) = feedback(&LearningConfig::default());
        let ctx = OutcomeContext {
            description: Some("routing accepted".to_string()),
            problem_type: Some(ProblemType::RoutingIssue),
            primary_handler: Some("route-analyzer".to_string()),
            ..Default::default()
        };
        feedback.record_outcome("route-analyzer", "orchestration", Outcome::Success, &ctx).await;

        let store = patterns.read().await;
        assert_eq!(store.pattern_count(), 2);
        let session = store.sessions().next().unwrap();
        assert_eq!(session.patterns.len(), 2);
        assert!(store.patterns().any(|p| p.before_state == "routing-issue" && p.after_state == "route-analyzer"));
    }

    #[tokio::test]
    async fn test_suggest_ranks_learned_patterns() {
        let (feedback, _, _) = feedback(&LearningConfig::default());
        for (i, confidence) in [0.6f32, 0.9, 0.7, 0.8].into_iter().enumerate() {
            let ctx = OutcomeContext { confidence: Some(confidence), description: Some(format!("fix {}", i)), ..fix_context() };
            feedback.record_outcome("auto-fixer", "auto-fix", Outcome::Success, &ctx).await;
        }

        let suggestions = feedback.suggest("const a = 1;;", "auto-fix").await;
        assert_eq!(suggestions.len(), 3);
        assert!(suggestions[0].starts_with("fix 1"));
        assert!(suggestions[1].starts_with("fix 3"));
        assert!(suggestions[2].starts_with("fix 2"));
    }

    #[tokio::test]
    async fn test_suggest_falls_back_to_generic() {
        let (feedback, _, _) = feedback(&LearningConfig::default());
        let short = feedback.suggest("let a;", "routing").await;
        assert_eq!(short.len(), 3);
        assert!(short[1].contains("6-character snippet"));

        let long = feedback.suggest(&"x".repeat(1500), "routing").await;
        assert!(long[1].starts_with("Split this 1500-character module"));
    }

    #[tokio::test]
    async fn test_reset_learning() {
        let (feedback, patterns, _) = feedback(&LearningConfig::default());
        feedback.record_outcome("auto-fixer", "auto-fix", Outcome::Success, &fix_context()).await;
        feedback.reset_learning().await;

        assert_eq!(patterns.read().await.pattern_count(), 0);
        assert_eq!(patterns.read().await.session_count(), 0);
        let state = feedback.state().await;
        assert_eq!(state.outcomes_recorded, 0);
        assert!(state.is_learning_enabled);
    }

    #[tokio::test]
    async fn test_harvest_requires_training_mode() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/bad.ts"), "import x from \"\";").unwrap();
        std::fs::write(dir.path().join("src/plain.ts"), "const a = 1;").unwrap();
        std::fs::write(dir.path().join("src/New.tsx"), "").unwrap();

        let workspace = FsWorkspace::new(dir.path());
        let classifier = RuleClassifier::new();
        let (feedback, patterns, _) = feedback(&LearningConfig::default());

        assert_eq!(feedback.harvest(&workspace, &classifier, "src/*").await.unwrap(), 0);

        feedback.set_mode(LearningMode::Training).await;
        assert_eq!(feedback.harvest(&workspace, &classifier, "src/*").await.unwrap(), 2);

        let store = patterns.read().await;
        assert!(store.patterns().all(|p| p.learned_from == "harvest"));
        assert!(store.patterns().any(|p| p.pattern_type == PatternType::ComponentPattern));
        assert_eq!(store.matching("syntax-error", 5).len(), 1);
    }
}
