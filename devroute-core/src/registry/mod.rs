//! Capability registry for dispatchable handlers
//!
//! Owns every handler's declared abilities and its mutable usage state.
//! Handlers live in an insertion-ordered arena with a name index, so
//! iteration order is stable across runs.

pub mod seed;

use crate::error::{CoreError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use tracing::{debug, info};

/// Handler families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HandlerCategory {
    Core,
    Music,
    Routes,
    Deployment,
    Utilities,
    Intelligence,
    ImportExport,
}

impl fmt::Display for HandlerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HandlerCategory::Core => "core",
            HandlerCategory::Music => "music",
            HandlerCategory::Routes => "routes",
            HandlerCategory::Deployment => "deployment",
            HandlerCategory::Utilities => "utilities",
            HandlerCategory::Intelligence => "intelligence",
            HandlerCategory::ImportExport => "import-export",
        };
        f.write_str(s)
    }
}

/// Capability tags a handler can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    FileAnalysis,
    CodeQuality,
    PatternMatching,
    StructuralRefactor,
    HookRules,
    Refactoring,
    SyntaxRepair,
    AutoFix,
    QuickFix,
    Training,
    ComponentGeneration,
    Templates,
    DomainAnalysis,
    MusicAnalysis,
    MusicGeneration,
    AudioProcessing,
    RouteAnalysis,
    RouteVisualization,
    RouteRepair,
    Navigation,
    PerformanceOptimization,
    Memoization,
    TestGeneration,
    Deployment,
    Build,
    ImportExport,
}

/// Size of problem a handler is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HandlerComplexity {
    Simple,
    Moderate,
    Complex,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerCapability {
    pub name: String,
    pub category: HandlerCategory,
    pub capabilities: BTreeSet<Capability>,
    pub strengths: Vec<String>,
    pub limitations: Vec<String>,
    pub complexity_class: HandlerComplexity,
    pub success_rate: f32,
    pub average_execution_time_ms: u64,
    pub last_used: Option<DateTime<Utc>>,
    pub confidence: f32,
    pub usage_count: u64,
    pub successes: u64,
    pub failures: u64,
}

impl HandlerCapability {
    pub fn new(
        name: impl Into<String>,
        category: HandlerCategory,
        complexity_class: HandlerComplexity,
        success_rate: f32,
        average_execution_time_ms: u64,
    ) -> Self {
        let success_rate = success_rate.clamp(0.0, 1.0);
        Self {
            name: name.into(),
            category,
            capabilities: BTreeSet::new(),
            strengths: Vec::new(),
            limitations: Vec::new(),
            complexity_class,
            success_rate,
            average_execution_time_ms,
            last_used: None,
            confidence: success_rate,
            usage_count: 0,
            successes: 0,
            failures: 0,
        }
    }

    pub fn with_capabilities(mut self, capabilities: impl IntoIterator<Item = Capability>) -> Self {
        self.capabilities.extend(capabilities);
        self
    }

    pub fn with_strengths(mut self, strengths: &[&str]) -> Self {
        self.strengths.extend(strengths.iter().map(|s| s.to_string()));
        self
    }

    pub fn with_limitations(mut self, limitations: &[&str]) -> Self {
        self.limitations.extend(limitations.iter().map(|s| s.to_string()));
        self
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    fn stats(&self) -> HandlerStats {
        HandlerStats {
            name: self.name.clone(),
            confidence: self.confidence,
            last_used: self.last_used,
            usage_count: self.usage_count,
            successes: self.successes,
            failures: self.failures,
        }
    }
}

/// Persisted mutable state of one handler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerStats {
    pub name: String,
    pub confidence: f32,
    pub last_used: Option<DateTime<Utc>>,
    pub usage_count: u64,
    #[serde(default)]
    pub successes: u64,
    #[serde(default)]
    pub failures: u64,
}

#[derive(Debug, Clone)]
pub struct CapabilityRegistry {
    handlers: Vec<HandlerCapability>,
    index: HashMap<String, usize>,
    usage_step: f32,
}

impl CapabilityRegistry {
    pub fn new(usage_step: f32) -> Self {
        Self { handlers: Vec::new(), index: HashMap::new(), usage_step }
    }

    /// Registry populated with the built-in handler table
    pub fn seeded(usage_step: f32) -> Self {
        let mut registry = Self::new(usage_step);
        for handler in seed::default_handlers() {
            registry.register(handler);
        }
        info!("Created default registry with {} handlers", registry.len());
        registry
    }

    /// Register a handler; a second registration under the same name replaces the first
    pub fn register(&mut self, handler: HandlerCapability) {
        match self.index.get(&handler.name) {
            Some(&slot) => {
                debug!("Replacing handler: {}", handler.name);
                self.handlers[slot] = handler;
            }
            None => {
                debug!("Registered handler: {} ({})", handler.name, handler.category);
                self.index.insert(handler.name.clone(), self.handlers.len());
                self.handlers.push(handler);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&HandlerCapability> {
        self.index.get(name).map(|&slot| &self.handlers[slot])
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut HandlerCapability> {
        let slot = *self.index.get(name).ok_or_else(|| CoreError::UnknownHandler(name.to_string()))?;
        Ok(&mut self.handlers[slot])
    }

    /// Handlers in registration order
    pub fn all(&self) -> impl Iterator<Item = &HandlerCapability> {
        self.handlers.iter()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Mark a handler as dispatched: stamps `last_used` and nudges confidence up
    pub fn record_usage(&mut self, name: &str) -> Result<()> {
        self.record_usage_at(name, Utc::now())
    }

    pub fn record_usage_at(&mut self, name: &str, now: DateTime<Utc>) -> Result<()> {
        let step = self.usage_step;
        let handler = self.get_mut(name)?;
        handler.last_used = Some(now);
        handler.usage_count += 1;
        handler.confidence = (handler.confidence + step).min(1.0);
        debug!("Recorded usage of {} (confidence {:.2})", name, handler.confidence);
        Ok(())
    }

    /// Count an outcome and shift confidence by `delta`, clamped to [0, 1]
    pub fn record_outcome(&mut self, name: &str, success: bool, delta: f32) -> Result<f32> {
        let handler = self.get_mut(name)?;
        if success {
            handler.successes += 1;
        } else {
            handler.failures += 1;
        }
        handler.confidence = (handler.confidence + delta).clamp(0.0, 1.0);
        Ok(handler.confidence)
    }

    /// Handler with the most dispatches; ties go to the smallest name
    pub fn most_used(&self) -> Option<&HandlerCapability> {
        self.handlers
            .iter()
            .filter(|h| h.usage_count > 0)
            .max_by(|a, b| a.usage_count.cmp(&b.usage_count).then_with(|| b.name.cmp(&a.name)))
    }

    pub fn export_stats(&self) -> Vec<HandlerStats> {
        self.handlers.iter().map(HandlerCapability::stats).collect()
    }

    /// Restore persisted state onto registered handlers; unknown names are skipped
    pub fn apply_stats(&mut self, stats: &[HandlerStats]) -> usize {
        let mut applied = 0;
        for entry in stats {
            if let Ok(handler) = self.get_mut(&entry.name) {
                handler.confidence = entry.confidence.clamp(0.0, 1.0);
                handler.last_used = entry.last_used;
                handler.usage_count = entry.usage_count;
                handler.successes = entry.successes;
                handler.failures = entry.failures;
                applied += 1;
            } else {
                debug!("Skipping stats for unregistered handler {}", entry.name);
            }
        }
        applied
    }
}
