//! The decision core facade
//!
//! Wires classifier, registry, ranking, orchestrator and learning loop
//! together from a [`CoreConfig`] and exposes the in-process API a host
//! drives. Nothing here is global; every collaborator is handed its shared
//! state at construction.

use crate::cache::{AnalysisCache, CacheEntry};
use crate::classifier::{ClassificationContext, ProblemClassification, ProblemClassifier, RequestContext, RuleClassifier};
use crate::config::CoreConfig;
use crate::error::Result;
use crate::learning::{FeedbackLoop, LearningMode, LearningState, Outcome, OutcomeContext, PatternSnapshot, PatternStore};
use crate::orchestrator::{OrchestrationSnapshot, Orchestrator};
use crate::ranking::{OrchestrationResult, RankingEngine};
use crate::registry::{CapabilityRegistry, HandlerCapability};
use crate::storage::{
    self, KeyValueStore, LEARNING_PATTERNS_KEY, LEARNING_STATE_KEY, ORCHESTRATION_DATA_KEY,
};
use crate::workspace::WorkspaceProvider;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Snapshot of the core's counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreStats {
    pub registered_handlers: usize,
    pub total_decisions: u64,
    pub most_used_handler: Option<String>,
    pub average_confidence: f32,
    pub patterns_stored: usize,
    pub sessions_stored: usize,
    pub learning_enabled: bool,
    pub orchestration_enabled: bool,
}

pub struct DecisionCore {
    classifier: Arc<dyn ProblemClassifier>,
    registry: Arc<RwLock<CapabilityRegistry>>,
    patterns: Arc<RwLock<PatternStore>>,
    orchestrator: Orchestrator,
    feedback: FeedbackLoop,
    analyses: RwLock<AnalysisCache>,
}

impl DecisionCore {
    pub fn new(config: CoreConfig) -> Self {
        Self::with_classifier(config, Arc::new(RuleClassifier::new()))
    }

    /// Build with a substitute classifier
    pub fn with_classifier(config: CoreConfig, classifier: Arc<dyn ProblemClassifier>) -> Self {
        let limits = &config.limits;
        let registry = Arc::new(RwLock::new(CapabilityRegistry::seeded(config.learning.usage_confidence_step)));
        let patterns = Arc::new(RwLock::new(PatternStore::new(limits.pattern_capacity, limits.session_capacity)));

        let ranking = RankingEngine::new(config.scoring.clone(), config.anchors.clone(), limits);
        let orchestrator = Orchestrator::new(
            classifier.clone(),
            registry.clone(),
            ranking,
            limits.decision_log_capacity,
            config.orchestration_enabled(),
        );
        let feedback = FeedbackLoop::new(
            patterns.clone(),
            registry.clone(),
            &config.learning,
            limits.suggestion_candidates,
            limits.rendered_suggestions,
        );

        Self {
            classifier,
            registry,
            patterns,
            orchestrator,
            feedback,
            analyses: RwLock::new(AnalysisCache::new(limits.analysis_cache_capacity)),
        }
    }

    /// Classify and remember the analysis; failed classifications are not recorded
    pub async fn classify(&self, code: &str, file_path: &str, context: &RequestContext) -> ProblemClassification {
        match self.classifier.try_classify(code, file_path, context) {
            Ok(classification) => {
                self.note_classification(&classification).await;
                classification
            }
            Err(e) => {
                warn!("Classification of {} failed: {}", file_path, e);
                ProblemClassification::classification_error(ClassificationContext::new(code, file_path, context))
            }
        }
    }

    pub async fn orchestrate(
        &self,
        code: &str,
        file_path: &str,
        action: Option<&str>,
        context: RequestContext,
    ) -> OrchestrationResult {
        let routed = self.orchestrator.route(code, file_path, action, context).await;
        if routed.classified {
            self.note_classification(&routed.result.classification).await;
        }
        routed.result
    }

    async fn note_classification(&self, classification: &ProblemClassification) {
        self.feedback.record_event("classification").await;
        match serde_json::to_value(classification) {
            Ok(data) => self.analyses.write().await.record(CacheEntry::new(
                "classification",
                data,
                classification.context.file_path.clone(),
            )),
            Err(e) => warn!("Could not cache classification: {}", e),
        }
    }

    pub async fn record_outcome(&self, handler_name: &str, action_type: &str, outcome: Outcome, context: &OutcomeContext) {
        self.feedback.record_outcome(handler_name, action_type, outcome, context).await;
    }

    pub async fn suggest(&self, code: &str, scenario: &str) -> Vec<String> {
        self.feedback.suggest(code, scenario).await
    }

    pub async fn stats(&self) -> CoreStats {
        let (registered_handlers, most_used_handler) = {
            let registry = self.registry.read().await;
            (registry.len(), registry.most_used().map(|h| h.name.clone()))
        };
        let (patterns_stored, sessions_stored) = {
            let patterns = self.patterns.read().await;
            (patterns.pattern_count(), patterns.session_count())
        };

        CoreStats {
            registered_handlers,
            total_decisions: self.orchestrator.total_decisions().await,
            most_used_handler,
            average_confidence: self.orchestrator.average_confidence().await,
            patterns_stored,
            sessions_stored,
            learning_enabled: self.feedback.is_enabled().await,
            orchestration_enabled: self.orchestrator.is_enabled(),
        }
    }

    pub async fn toggle_learning(&self) -> bool {
        self.feedback.toggle().await
    }

    pub fn toggle_orchestration(&self) -> bool {
        self.orchestrator.toggle()
    }

    pub async fn set_learning_mode(&self, mode: LearningMode) {
        self.feedback.set_mode(mode).await;
    }

    pub async fn learning_state(&self) -> LearningState {
        self.feedback.state().await
    }

    pub async fn reset_learning(&self) {
        self.feedback.reset_learning().await;
    }

    pub async fn harvest(&self, provider: &dyn WorkspaceProvider, glob: &str) -> Result<usize> {
        self.feedback.harvest(provider, self.classifier.as_ref(), glob).await
    }

    pub async fn recent_analyses(&self, limit: usize) -> Vec<CacheEntry> {
        self.analyses.read().await.recent(limit)
    }

    /// Registered handlers in registration order
    pub async fn handlers(&self) -> Vec<HandlerCapability> {
        self.registry.read().await.all().cloned().collect()
    }

    /// Best-effort restore; a missing key is skipped silently, a bad one with a warning
    pub async fn load(&self, store: &dyn KeyValueStore) {
        match storage::load_snapshot::<PatternSnapshot>(store, LEARNING_PATTERNS_KEY).await {
            Ok(Some(snapshot)) => self.patterns.write().await.restore(snapshot),
            Ok(None) => {}
            Err(e) => warn!("Skipping {}: {}", LEARNING_PATTERNS_KEY, e),
        }

        match storage::load_snapshot::<LearningState>(store, LEARNING_STATE_KEY).await {
            Ok(Some(state)) => self.feedback.restore_state(state).await,
            Ok(None) => {}
            Err(e) => warn!("Skipping {}: {}", LEARNING_STATE_KEY, e),
        }

        match storage::load_snapshot::<OrchestrationSnapshot>(store, ORCHESTRATION_DATA_KEY).await {
            Ok(Some(snapshot)) => self.orchestrator.restore(snapshot).await,
            Ok(None) => {}
            Err(e) => warn!("Skipping {}: {}", ORCHESTRATION_DATA_KEY, e),
        }

        info!("Loaded persisted state");
    }

    /// Write all three snapshots; failures are logged and skipped
    pub async fn persist(&self, store: &dyn KeyValueStore) {
        let patterns = self.patterns.read().await.snapshot();
        if let Err(e) = storage::save_snapshot(store, LEARNING_PATTERNS_KEY, &patterns).await {
            warn!("Could not persist {}: {}", LEARNING_PATTERNS_KEY, e);
        }

        let state = self.feedback.state().await;
        if let Err(e) = storage::save_snapshot(store, LEARNING_STATE_KEY, &state).await {
            warn!("Could not persist {}: {}", LEARNING_STATE_KEY, e);
        }

        let orchestration = self.orchestrator.snapshot().await;
        if let Err(e) = storage::save_snapshot(store, ORCHESTRATION_DATA_KEY, &orchestration).await {
            warn!("Could not persist {}: {}", ORCHESTRATION_DATA_KEY, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{Complexity, ProblemType};
    use crate::error::CoreError;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;
    use serde_json::{Value, json};

    struct UnavailableStore;

    #[async_trait]
    impl KeyValueStore for UnavailableStore {
        async fn get(&self, _key: &str) -> Result<Option<Value>> {
            Err(CoreError::StoreUnavailable("offline".to_string()))
        }

        async fn set(&self, _key: &str, _value: Value) -> Result<()> {
            Err(CoreError::StoreUnavailable("offline".to_string()))
        }
    }

    const STRUCTURAL: &str = "function A() {\n  if (ready) {\n    useEffect(() => {});\n  }\n}";

    #[tokio::test]
    async fn test_classify_records_event_and_cache() {
        let core = DecisionCore::new(CoreConfig::default());
        let classification = core.classify("import x from \"\";", "src/a.ts", &RequestContext::default()).await;
        assert_eq!(classification.problem_type, ProblemType::SyntaxError);
        assert_eq!(classification.complexity, Complexity::Simple);
        assert_eq!(classification.confidence, 0.85);

        assert_eq!(core.learning_state().await.classification_events, 1);
        let recent = core.recent_analyses(10).await;
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].source, "src/a.ts");
    }

    #[tokio::test]
    async fn test_failed_classification_is_not_recorded() {
        let classifier = Arc::new(RuleClassifier::new().with_max_input(16));
        let core = DecisionCore::with_classifier(CoreConfig::default(), classifier);

        let big = "a".repeat(64);
        let classification = core.classify(&big, "big.js", &RequestContext::default()).await;
        assert_eq!(classification.indicators, vec!["classification error".to_string()]);
        assert_eq!(core.learning_state().await.classification_events, 0);
        assert!(core.recent_analyses(10).await.is_empty());

        let result = core.orchestrate(&big, "big.js", None, RequestContext::default()).await;
        assert_eq!(result.classification.indicators, vec!["classification error".to_string()]);
        assert_eq!(core.learning_state().await.classification_events, 0);
        assert!(core.recent_analyses(10).await.is_empty());
    }

    #[tokio::test]
    async fn test_classify_with_learning_off_skips_event() {
        let core = DecisionCore::new(CoreConfig::default());
        core.toggle_learning().await;
        core.classify("const a = 1;", "a.js", &RequestContext::default()).await;
        assert_eq!(core.learning_state().await.classification_events, 0);
    }

    #[tokio::test]
    async fn test_stats_after_routing() {
        let core = DecisionCore::new(CoreConfig::default());
        let empty = core.stats().await;
        assert_eq!(empty.total_decisions, 0);
        assert_eq!(empty.average_confidence, 0.0);
        assert!(empty.most_used_handler.is_none());
        assert!(empty.registered_handlers >= 15);

        let result = core.orchestrate(STRUCTURAL, "src/A.tsx", None, RequestContext::default()).await;
        let stats = core.stats().await;
        assert_eq!(stats.total_decisions, 1);
        assert_eq!(stats.most_used_handler.as_deref(), Some(result.primary_handler.as_str()));
        assert_eq!(stats.average_confidence, result.confidence);
        assert!(stats.orchestration_enabled);
    }

    #[tokio::test]
    async fn test_toggle_orchestration_degrades() {
        let core = DecisionCore::new(CoreConfig::default());
        assert!(!core.toggle_orchestration());
        let result = core.orchestrate(STRUCTURAL, "src/A.tsx", None, RequestContext::default()).await;
        assert_eq!(result.confidence, 0.6);
        assert!(core.recent_analyses(10).await.is_empty());
    }

    #[tokio::test]
    async fn test_persist_and_load() {
        let store = MemoryStore::new();
        let first = DecisionCore::new(CoreConfig::default());
        first.orchestrate(STRUCTURAL, "src/A.tsx", None, RequestContext::default()).await;
        let ctx = OutcomeContext {
            before: Some("a;;".to_string()),
            after: Some("a;".to_string()),
            ..Default::default()
        };
        first.record_outcome("auto-fixer", "auto-fix", Outcome::Success, &ctx).await;
        first.set_learning_mode(LearningMode::Training).await;
        first.persist(&store).await;
        assert_eq!(store.len().await, 3);

        let second = DecisionCore::new(CoreConfig::default());
        second.load(&store).await;
        assert_eq!(second.stats().await, first.stats().await);
        assert_eq!(second.learning_state().await.learning_mode, LearningMode::Training);
        assert_eq!(second.suggest("a;;", "auto-fix").await, first.suggest("a;;", "auto-fix").await);
    }

    #[tokio::test]
    async fn test_load_skips_bad_keys() {
        let store = MemoryStore::new();
        store.set(LEARNING_STATE_KEY, json!({"version": 42, "data": {}})).await.unwrap();
        store.set(LEARNING_PATTERNS_KEY, json!({"version": 1, "data": 17})).await.unwrap();
        store
            .set(ORCHESTRATION_DATA_KEY, json!({"decisions": [], "total_decisions": 4, "handler_stats": []}))
            .await
            .unwrap();

        let core = DecisionCore::new(CoreConfig::default());
        core.load(&store).await;
        let stats = core.stats().await;
        assert_eq!(stats.total_decisions, 4);
        assert_eq!(stats.patterns_stored, 0);
        assert!(stats.learning_enabled);
    }

    #[tokio::test]
    async fn test_unavailable_store_is_not_fatal() {
        let core = DecisionCore::new(CoreConfig::default());
        core.load(&UnavailableStore).await;
        core.persist(&UnavailableStore).await;
        let result = core.orchestrate("", "src/New.tsx", Some("create-component"), RequestContext::default()).await;
        assert_eq!(result.classification.problem_type, ProblemType::ComponentCreation);
    }

    #[tokio::test]
    async fn test_disabled_learning_keeps_pattern_count() {
        let core = DecisionCore::new(CoreConfig::default());
        core.toggle_learning().await;
        let ctx = OutcomeContext { component_type: Some("form".to_string()), ..Default::default() };
        core.record_outcome("component-generator", "component-creation", Outcome::Success, &ctx).await;
        assert_eq!(core.stats().await.patterns_stored, 0);
    }
}
