//! Process-wide learning toggle and counters

use crate::error::CoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LearningMode {
    /// Store patterns and adjust handler confidence from outcomes
    #[default]
    Adaptive,
    /// Store patterns only
    Static,
    /// Adaptive, plus workspace harvesting
    Training,
}

impl LearningMode {
    pub fn adjusts_confidence(&self) -> bool {
        !matches!(self, LearningMode::Static)
    }

    pub fn allows_harvest(&self) -> bool {
        matches!(self, LearningMode::Training)
    }
}

impl fmt::Display for LearningMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LearningMode::Adaptive => "adaptive",
            LearningMode::Static => "static",
            LearningMode::Training => "training",
        };
        f.write_str(s)
    }
}

impl FromStr for LearningMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "adaptive" => Ok(LearningMode::Adaptive),
            "static" => Ok(LearningMode::Static),
            "training" => Ok(LearningMode::Training),
            other => Err(CoreError::Config(format!("unknown learning mode '{}'", other))),
        }
    }
}

/// Most recent thing the learning loop acted on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningAction {
    pub kind: String,
    pub handler_name: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningState {
    pub is_learning_enabled: bool,
    pub learning_mode: LearningMode,
    #[serde(default)]
    pub total_events: u64,
    #[serde(default)]
    pub classification_events: u64,
    #[serde(default)]
    pub outcomes_recorded: u64,
    #[serde(default)]
    pub successful_outcomes: u64,
    #[serde(default)]
    pub patterns_created: u64,
    #[serde(default)]
    pub last_learning_action: Option<LearningAction>,
    /// Set on every reported outcome, even while learning is off
    #[serde(default)]
    pub last_attempted: Option<DateTime<Utc>>,
}

impl LearningState {
    pub fn new(enabled: bool, mode: LearningMode) -> Self {
        Self {
            is_learning_enabled: enabled,
            learning_mode: mode,
            total_events: 0,
            classification_events: 0,
            outcomes_recorded: 0,
            successful_outcomes: 0,
            patterns_created: 0,
            last_learning_action: None,
            last_attempted: None,
        }
    }

    pub fn mark(&mut self, kind: &str, handler_name: Option<&str>) {
        self.total_events += 1;
        self.last_learning_action = Some(LearningAction {
            kind: kind.to_string(),
            handler_name: handler_name.map(str::to_string),
            timestamp: Utc::now(),
        });
    }

    /// Zero every counter; toggle and mode survive
    pub fn reset_counters(&mut self) {
        *self = Self::new(self.is_learning_enabled, self.learning_mode);
    }
}

impl Default for LearningState {
    fn default() -> Self {
        Self::new(true, LearningMode::Adaptive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_capabilities() {
        assert!(LearningMode::Adaptive.adjusts_confidence());
        assert!(!LearningMode::Static.adjusts_confidence());
        assert!(LearningMode::Training.adjusts_confidence());
        assert!(LearningMode::Training.allows_harvest());
        assert!(!LearningMode::Adaptive.allows_harvest());
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("training".parse::<LearningMode>().unwrap(), LearningMode::Training);
        assert!("eager".parse::<LearningMode>().is_err());
        assert_eq!(LearningMode::Static.to_string(), "static");
    }

    #[test]
    fn test_reset_keeps_toggle_and_mode() {
        let mut state = LearningState::new(false, LearningMode::Training);
        state.mark("classification", None);
        state.outcomes_recorded = 4;
        state.reset_counters();
        assert_eq!(state, LearningState::new(false, LearningMode::Training));
    }

    #[test]
    fn test_older_payload_without_counters() {
        let state: LearningState =
            serde_json::from_str(r#"{"is_learning_enabled": false, "learning_mode": "static"}"#).unwrap();
        assert!(!state.is_learning_enabled);
        assert_eq!(state.learning_mode, LearningMode::Static);
        assert_eq!(state.total_events, 0);
    }
}
