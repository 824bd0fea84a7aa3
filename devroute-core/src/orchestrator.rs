//! Orchestration: classify, rank, dispatch bookkeeping
//!
//! The orchestrator is the single entry point that turns a unit of work into
//! a routing decision. Calls are serialised through an internal mutex so two
//! classification/ranking passes never interleave.

use crate::cache::BoundedFifo;
use crate::classifier::{ClassificationContext, ProblemClassification, ProblemClassifier, RequestContext};
use crate::ranking::{OrchestrationResult, RankingEngine};
use crate::registry::{CapabilityRegistry, HandlerStats};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// Confidence reported when orchestration is switched off
pub const DISABLED_CONFIDENCE: f32 = 0.6;

/// Outcome of one routing call
#[derive(Debug, Clone)]
pub struct Routed {
    pub result: OrchestrationResult,
    /// True when the classifier ran and succeeded
    pub classified: bool,
}

/// One retained decision, keyed `"{problem_type}-{timestamp}"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionEntry {
    pub key: String,
    pub result: OrchestrationResult,
}

/// Persisted orchestration state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrchestrationSnapshot {
    /// Oldest first
    pub decisions: Vec<DecisionEntry>,
    pub total_decisions: u64,
    pub handler_stats: Vec<HandlerStats>,
    #[serde(default)]
    pub orchestration_enabled: Option<bool>,
}

struct DecisionLog {
    entries: BoundedFifo<String, OrchestrationResult>,
    total: u64,
}

impl DecisionLog {
    fn record(&mut self, result: &OrchestrationResult) {
        let mut key = decision_key(result.classification.problem_type.as_str(), result.timestamp);
        let mut suffix = 1;
        while self.entries.contains_key(&key) {
            key = format!(
                "{}-{}",
                decision_key(result.classification.problem_type.as_str(), result.timestamp),
                suffix
            );
            suffix += 1;
        }

        if let Some((evicted, _)) = self.entries.insert(key, result.clone()) {
            debug!("Decision log full, dropped {}", evicted);
        }
        self.total += 1;
    }
}

fn decision_key(problem_type: &str, timestamp: DateTime<Utc>) -> String {
    format!("{}-{}", problem_type, timestamp.timestamp_micros())
}

pub struct Orchestrator {
    classifier: Arc<dyn ProblemClassifier>,
    registry: Arc<RwLock<CapabilityRegistry>>,
    ranking: RankingEngine,
    enabled: AtomicBool,
    log: Mutex<DecisionLog>,
}

impl Orchestrator {
    pub fn new(
        classifier: Arc<dyn ProblemClassifier>,
        registry: Arc<RwLock<CapabilityRegistry>>,
        ranking: RankingEngine,
        decision_capacity: usize,
        enabled: bool,
    ) -> Self {
        Self {
            classifier,
            registry,
            ranking,
            enabled: AtomicBool::new(enabled),
            log: Mutex::new(DecisionLog { entries: BoundedFifo::new(decision_capacity), total: 0 }),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Flip the orchestration switch and return the new value
    pub fn toggle(&self) -> bool {
        let enabled = !self.enabled.fetch_xor(true, Ordering::SeqCst);
        info!("Orchestration {}", if enabled { "enabled" } else { "disabled" });
        enabled
    }

    pub async fn orchestrate(
        &self,
        code: &str,
        file_path: &str,
        action: Option<&str>,
        context: RequestContext,
    ) -> OrchestrationResult {
        self.route(code, file_path, action, context).await.result
    }

    /// Full routing cycle; `action` fills `context.action` when the context has none
    pub async fn route(
        &self,
        code: &str,
        file_path: &str,
        action: Option<&str>,
        mut context: RequestContext,
    ) -> Routed {
        let mut log = self.log.lock().await;

        if !self.is_enabled() {
            debug!("Orchestration disabled, routing {} to primary anchor", file_path);
            return Routed { result: self.disabled_result(code, file_path), classified: false };
        }

        if context.action.is_none() {
            context.action = action.map(str::to_string);
        }

        let (classification, classified) = match self.classifier.try_classify(code, file_path, &context) {
            Ok(classification) => (classification, true),
            Err(e) => {
                warn!("Classification of {} failed: {}", file_path, e);
                let ctx = ClassificationContext::new(code, file_path, &context);
                (ProblemClassification::classification_error(ctx), false)
            }
        };

        let result = {
            let mut registry = self.registry.write().await;
            let result = self.ranking.recommend(&registry, &classification);
            if let Err(e) = registry.record_usage(&result.primary_handler) {
                warn!("Could not record usage of {}: {}", result.primary_handler, e);
            }
            result
        };

        log.record(&result);
        info!(
            "Routed {} ({}) to {} with confidence {:.2}",
            file_path, classification.problem_type, result.primary_handler, result.confidence
        );

        Routed { result, classified }
    }

    fn disabled_result(&self, code: &str, file_path: &str) -> OrchestrationResult {
        let anchors = self.ranking.anchors();
        OrchestrationResult {
            primary_handler: anchors.primary.clone(),
            backup_handlers: vec![anchors.secondary.clone(), anchors.tertiary.clone()],
            reasoning: "Orchestration disabled; routed to the primary anchor handler".to_string(),
            confidence: DISABLED_CONFIDENCE,
            classification: ProblemClassification::not_classified(file_path, code.len()),
            recommendations: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    pub async fn total_decisions(&self) -> u64 {
        self.log.lock().await.total
    }

    /// Retained decisions, oldest first
    pub async fn decisions(&self) -> Vec<DecisionEntry> {
        let log = self.log.lock().await;
        log.entries
            .iter()
            .map(|(key, result)| DecisionEntry { key: key.clone(), result: result.clone() })
            .collect()
    }

    /// Mean confidence over the retained decisions, 0.0 when none
    pub async fn average_confidence(&self) -> f32 {
        let log = self.log.lock().await;
        if log.entries.is_empty() {
            return 0.0;
        }
        let sum: f32 = log.entries.values().map(|r| r.confidence).sum();
        sum / log.entries.len() as f32
    }

    pub async fn snapshot(&self) -> OrchestrationSnapshot {
        let decisions = self.decisions().await;
        let total_decisions = self.total_decisions().await;
        let handler_stats = self.registry.read().await.export_stats();
        OrchestrationSnapshot {
            decisions,
            total_decisions,
            handler_stats,
            orchestration_enabled: Some(self.is_enabled()),
        }
    }

    pub async fn restore(&self, snapshot: OrchestrationSnapshot) {
        let applied = self.registry.write().await.apply_stats(&snapshot.handler_stats);

        let mut log = self.log.lock().await;
        log.entries.clear();
        for entry in snapshot.decisions {
            log.entries.insert(entry.key, entry.result);
        }
        log.total = snapshot.total_decisions.max(log.entries.len() as u64);

        if let Some(enabled) = snapshot.orchestration_enabled {
            self.set_enabled(enabled);
        }

        info!(
            "Restored {} decisions and stats for {} handlers",
            log.entries.len(),
            applied
        );
    }
}
