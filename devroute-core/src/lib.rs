//! Core functionality for devroute
//!
//! This crate decides which handler should work on a unit of code: it
//! classifies the problem, ranks registered handlers against it, and learns
//! from the outcomes handlers report back.

pub mod cache;
pub mod classifier;
pub mod config;
pub mod decision_core;
pub mod error;
pub mod learning;
pub mod orchestrator;
pub mod ranking;
pub mod registry;
pub mod storage;
pub mod workspace;

pub use classifier::{Complexity, ProblemClassification, ProblemClassifier, ProblemType, RequestContext, RuleClassifier};
pub use config::CoreConfig;
pub use decision_core::{CoreStats, DecisionCore};
pub use error::{CoreError, Result};
pub use learning::{LearningMode, Outcome, OutcomeContext};
pub use ranking::{HandlerRecommendation, OrchestrationResult};
pub use registry::{CapabilityRegistry, HandlerCapability};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore};
pub use workspace::{FsWorkspace, WorkspaceProvider};
