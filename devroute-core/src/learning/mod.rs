//! Learning feedback loop
//!
//! Turns reported handler outcomes into stored patterns, answers suggestion
//! queries from those patterns, and keeps the process-wide learning state.

pub mod extractors;
pub mod feedback;
pub mod pattern_store;
pub mod state;

pub use extractors::{ActionType, OutcomeContext};
pub use feedback::{FeedbackLoop, Outcome};
pub use pattern_store::{LearningPattern, LearningSession, PatternSnapshot, PatternStore, PatternType};
pub use state::{LearningAction, LearningMode, LearningState};
