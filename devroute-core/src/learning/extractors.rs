//! Pattern extraction strategies keyed by action type
//!
//! Each action kind shapes its pattern differently and needs different
//! context fields. A missing field means no pattern, never a panic.

use super::pattern_store::{LearningPattern, PatternType};
use crate::classifier::ProblemType;
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Kind of work a handler reported on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionType {
    FileAnalysis,
    ComponentCreation,
    AutoFix,
    Optimization,
    /// Analysis within a specialised domain, e.g. `music-analysis`
    DomainAnalysis { domain: String },
    Orchestration,
    Other(String),
}

impl From<&str> for ActionType {
    fn from(s: &str) -> Self {
        match s {
            "file-analysis" => ActionType::FileAnalysis,
            "component-creation" | "create-component" => ActionType::ComponentCreation,
            "auto-fix" => ActionType::AutoFix,
            "optimization" => ActionType::Optimization,
            "orchestration" => ActionType::Orchestration,
            other => match other.strip_suffix("-analysis") {
                Some(domain) if !domain.is_empty() => ActionType::DomainAnalysis { domain: domain.to_string() },
                _ => ActionType::Other(other.to_string()),
            },
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionType::FileAnalysis => f.write_str("file-analysis"),
            ActionType::ComponentCreation => f.write_str("component-creation"),
            ActionType::AutoFix => f.write_str("auto-fix"),
            ActionType::Optimization => f.write_str("optimization"),
            ActionType::DomainAnalysis { domain } => write!(f, "{}-analysis", domain),
            ActionType::Orchestration => f.write_str("orchestration"),
            ActionType::Other(name) => f.write_str(name),
        }
    }
}

/// Structured context attached to a reported outcome
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutcomeContext {
    pub before: Option<String>,
    pub after: Option<String>,
    pub file_name: Option<String>,
    pub component_type: Option<String>,
    pub description: Option<String>,
    pub problem_type: Option<ProblemType>,
    pub primary_handler: Option<String>,
    pub confidence: Option<f32>,
}

fn require<'a>(value: &'a Option<String>, action: &ActionType, field: &'static str) -> Result<&'a str> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(CoreError::MissingContext { action: action.to_string(), field }),
    }
}

fn source(handler: &str, action: &ActionType) -> String {
    format!("{}/{}", handler, action)
}

/// Derive the pattern a successful action teaches
pub fn extract(action: &ActionType, handler: &str, ctx: &OutcomeContext) -> Result<LearningPattern> {
    let pattern = match action {
        ActionType::FileAnalysis => {
            let file = require(&ctx.file_name, action, "file_name")?;
            let extension = Path::new(file).extension().and_then(|e| e.to_str()).unwrap_or_default();
            LearningPattern::new(PatternType::CodeStructure, source(handler, action))
                .with_states(ctx.before.clone().unwrap_or_default(), ctx.after.clone().unwrap_or_default())
                .with_reasoning(format!("Structure of {} analysed by {}", file, handler))
                .with_confidence(ctx.confidence.unwrap_or(0.7))
                .with_scenarios(["file-analysis", extension])
        }
        ActionType::ComponentCreation => {
            let component = require(&ctx.component_type, action, "component_type")?;
            LearningPattern::new(PatternType::ComponentPattern, source(handler, action))
                .with_states(String::new(), ctx.after.clone().unwrap_or_default())
                .with_reasoning(format!("Created a {} component", component))
                .with_confidence(ctx.confidence.unwrap_or(0.8))
                .with_scenarios(["component-creation", component])
        }
        ActionType::AutoFix => {
            let before = require(&ctx.before, action, "before")?;
            let after = require(&ctx.after, action, "after")?;
            let reasoning = ctx.description.clone().unwrap_or_else(|| format!("Fix applied by {}", handler));
            LearningPattern::new(PatternType::ErrorFix, source(handler, action))
                .with_states(before, after)
                .with_reasoning(reasoning)
                .with_confidence(ctx.confidence.unwrap_or(0.75))
                .with_scenarios(["auto-fix", "error-fix"])
        }
        ActionType::Optimization => {
            let before = require(&ctx.before, action, "before")?;
            let after = require(&ctx.after, action, "after")?;
            let reasoning = ctx
                .description
                .clone()
                .unwrap_or_else(|| format!("Optimisation applied by {}", handler));
            LearningPattern::new(PatternType::Optimization, source(handler, action))
                .with_states(before, after)
                .with_reasoning(reasoning)
                .with_confidence(ctx.confidence.unwrap_or(0.7))
                .with_scenarios(["optimization", "performance"])
        }
        ActionType::DomainAnalysis { domain } => {
            let description = require(&ctx.description, action, "description")?;
            LearningPattern::new(PatternType::CodeStructure, source(handler, action))
                .with_states(ctx.before.clone().unwrap_or_default(), ctx.after.clone().unwrap_or_default())
                .with_reasoning(description)
                .with_confidence(ctx.confidence.unwrap_or(0.65))
                .with_scenarios(["domain-analysis".to_string(), domain.clone(), action.to_string()])
        }
        ActionType::Orchestration | ActionType::Other(_) => {
            let description = require(&ctx.description, action, "description")?;
            LearningPattern::new(PatternType::CodeStructure, source(handler, action))
                .with_states(ctx.before.clone().unwrap_or_default(), ctx.after.clone().unwrap_or_default())
                .with_reasoning(description)
                .with_confidence(ctx.confidence.unwrap_or(0.6))
                .with_scenarios([action.to_string()])
        }
    };
    Ok(pattern)
}

/// Pattern reinforcing a `problem type -> primary handler` routing pair
pub fn routing_pattern(ctx: &OutcomeContext) -> Result<LearningPattern> {
    let action = ActionType::Orchestration;
    let problem_type = ctx
        .problem_type
        .ok_or_else(|| CoreError::MissingContext { action: action.to_string(), field: "problem_type" })?;
    let handler = require(&ctx.primary_handler, &action, "primary_handler")?;

    Ok(LearningPattern::new(PatternType::CodeStructure, "orchestration")
        .with_states(problem_type.as_str(), handler)
        .with_reasoning(format!("{} problems were resolved by {}", problem_type, handler))
        .with_confidence(ctx.confidence.unwrap_or(0.7))
        .with_scenarios(["orchestration", "routing", problem_type.as_str()]))
}
