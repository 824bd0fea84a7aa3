//! Learned patterns and outcome sessions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternType {
    CodeStructure,
    ErrorFix,
    Optimization,
    ComponentPattern,
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PatternType::CodeStructure => "code-structure",
            PatternType::ErrorFix => "error-fix",
            PatternType::Optimization => "optimization",
            PatternType::ComponentPattern => "component-pattern",
        };
        f.write_str(s)
    }
}

/// A before/after transformation or routing decision that worked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningPattern {
    pub id: Uuid,
    pub pattern_type: PatternType,
    pub before_state: String,
    pub after_state: String,
    pub reasoning: String,
    pub confidence: f32,
    pub applicable_scenarios: Vec<String>,
    pub learned_from: String,
    pub timestamp: DateTime<Utc>,
}

impl LearningPattern {
    pub fn new(pattern_type: PatternType, learned_from: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            pattern_type,
            before_state: String::new(),
            after_state: String::new(),
            reasoning: String::new(),
            confidence: 0.5,
            applicable_scenarios: Vec::new(),
            learned_from: learned_from.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_states(mut self, before: impl Into<String>, after: impl Into<String>) -> Self {
        self.before_state = before.into();
        self.after_state = after.into();
        self
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = reasoning.into();
        self
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn with_scenarios<I, S>(mut self, scenarios: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for scenario in scenarios {
            let scenario = scenario.into();
            if !scenario.is_empty() && !self.applicable_scenarios.contains(&scenario) {
                self.applicable_scenarios.push(scenario);
            }
        }
        self
    }

    /// Tagged with the scenario, or learned from a source naming it
    pub fn applies_to(&self, scenario: &str) -> bool {
        self.applicable_scenarios.iter().any(|s| s == scenario) || self.learned_from.contains(scenario)
    }
}

/// Patterns produced by one reported outcome of a handler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningSession {
    pub id: Uuid,
    pub handler_name: String,
    pub action_type: String,
    pub success: bool,
    pub patterns: Vec<Uuid>,
    pub timestamp: DateTime<Utc>,
}

impl LearningSession {
    pub fn new(handler_name: impl Into<String>, action_type: impl Into<String>, success: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            handler_name: handler_name.into(),
            action_type: action_type.into(),
            success,
            patterns: Vec::new(),
            timestamp: Utc::now(),
        }
    }
}

/// Persisted form of the store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternSnapshot {
    pub patterns: Vec<LearningPattern>,
    pub sessions: Vec<LearningSession>,
}

/// Bounded, insertion-ordered storage for patterns and sessions
#[derive(Debug, Clone)]
pub struct PatternStore {
    patterns: VecDeque<LearningPattern>,
    sessions: VecDeque<LearningSession>,
    pattern_capacity: usize,
    session_capacity: usize,
}

impl PatternStore {
    pub fn new(pattern_capacity: usize, session_capacity: usize) -> Self {
        Self {
            patterns: VecDeque::new(),
            sessions: VecDeque::new(),
            pattern_capacity: pattern_capacity.max(1),
            session_capacity: session_capacity.max(1),
        }
    }

    /// Store a pattern, returning the oldest one if it had to make room
    pub fn add_pattern(&mut self, pattern: LearningPattern) -> Option<LearningPattern> {
        debug!("Stored {} pattern learned from {}", pattern.pattern_type, pattern.learned_from);
        self.patterns.push_back(pattern);
        if self.patterns.len() > self.pattern_capacity {
            return self.patterns.pop_front();
        }
        None
    }

    pub fn add_session(&mut self, session: LearningSession) -> Option<LearningSession> {
        self.sessions.push_back(session);
        if self.sessions.len() > self.session_capacity {
            return self.sessions.pop_front();
        }
        None
    }

    /// Patterns oldest first
    pub fn patterns(&self) -> impl Iterator<Item = &LearningPattern> {
        self.patterns.iter()
    }

    /// Sessions oldest first
    pub fn sessions(&self) -> impl Iterator<Item = &LearningSession> {
        self.sessions.iter()
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Patterns applying to `scenario`, highest confidence first, at most `limit`
    pub fn matching(&self, scenario: &str, limit: usize) -> Vec<&LearningPattern> {
        let mut matched: Vec<_> = self.patterns.iter().filter(|p| p.applies_to(scenario)).collect();
        // Stable: equal confidence keeps older patterns first
        matched.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        matched.truncate(limit);
        matched
    }

    pub fn clear(&mut self) {
        self.patterns.clear();
        self.sessions.clear();
    }

    pub fn snapshot(&self) -> PatternSnapshot {
        PatternSnapshot {
            patterns: self.patterns.iter().cloned().collect(),
            sessions: self.sessions.iter().cloned().collect(),
        }
    }

    /// Replace contents with a snapshot, keeping the newest entries that fit
    pub fn restore(&mut self, snapshot: PatternSnapshot) {
        self.clear();
        for pattern in snapshot.patterns {
            self.add_pattern(pattern);
        }
        for session in snapshot.sessions {
            self.add_session(session);
        }
    }
}
