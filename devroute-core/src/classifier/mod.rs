//! Problem classification
//!
//! Turns `(code, file path, context)` into a [`ProblemClassification`] by
//! walking an ordered rule table where the first matching rule wins.

pub mod rules;
pub mod signals;

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

pub use rules::{Rule, RuleId, RULES};
pub use signals::Signals;

/// Inputs above this size are refused rather than scanned
const MAX_INPUT_BYTES: usize = 4 * 1024 * 1024;

/// Kind of problem a unit of work presents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProblemType {
    StructuralIssue,
    SyntaxError,
    ComponentCreation,
    DomainAnalysis,
    PerformanceIssue,
    RoutingIssue,
    ComplexRefactor,
    SimpleFix,
    Unknown,
}

impl ProblemType {
    pub fn all() -> [ProblemType; 9] {
        [
            ProblemType::StructuralIssue,
            ProblemType::SyntaxError,
            ProblemType::ComponentCreation,
            ProblemType::DomainAnalysis,
            ProblemType::PerformanceIssue,
            ProblemType::RoutingIssue,
            ProblemType::ComplexRefactor,
            ProblemType::SimpleFix,
            ProblemType::Unknown,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProblemType::StructuralIssue => "structural-issue",
            ProblemType::SyntaxError => "syntax-error",
            ProblemType::ComponentCreation => "component-creation",
            ProblemType::DomainAnalysis => "domain-analysis",
            ProblemType::PerformanceIssue => "performance-issue",
            ProblemType::RoutingIssue => "routing-issue",
            ProblemType::ComplexRefactor => "complex-refactor",
            ProblemType::SimpleFix => "simple-fix",
            ProblemType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ProblemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProblemType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        ProblemType::all()
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::Classification(format!("unknown problem type '{}'", s)))
    }
}

/// How hard the problem looks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Complexity {
    Simple,
    Moderate,
    Complex,
    Expert,
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Complexity::Simple => "simple",
            Complexity::Moderate => "moderate",
            Complexity::Complex => "complex",
            Complexity::Expert => "expert",
        };
        f.write_str(s)
    }
}

/// Caller-supplied fields accompanying a request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestContext {
    pub action: Option<String>,
    pub file_name: Option<String>,
    pub component_type: Option<String>,
    pub description: Option<String>,
    pub confidence: Option<f32>,
}

impl RequestContext {
    pub fn with_action(action: impl Into<String>) -> Self {
        Self { action: Some(action.into()), ..Default::default() }
    }
}

/// Context attached to a classification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationContext {
    pub file_path: String,
    pub code_length: usize,
    pub action: Option<String>,
    pub file_name: Option<String>,
    pub component_type: Option<String>,
    pub description: Option<String>,
    /// Confidence the caller already had in its own request
    pub confidence: Option<f32>,
}

impl ClassificationContext {
    pub fn new(code: &str, file_path: &str, context: &RequestContext) -> Self {
        Self {
            file_path: file_path.to_string(),
            code_length: code.len(),
            action: context.action.clone(),
            file_name: context.file_name.clone(),
            component_type: context.component_type.clone(),
            description: context.description.clone(),
            confidence: context.confidence,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemClassification {
    pub problem_type: ProblemType,
    pub complexity: Complexity,
    pub confidence: f32,
    pub indicators: Vec<String>,
    pub context: ClassificationContext,
}

impl ProblemClassification {
    /// Result returned when classification itself fails
    pub fn classification_error(context: ClassificationContext) -> Self {
        Self {
            problem_type: ProblemType::Unknown,
            complexity: Complexity::Moderate,
            confidence: 0.5,
            indicators: vec!["classification error".to_string()],
            context,
        }
    }

    /// Placeholder attached to results produced without classifying
    pub fn not_classified(file_path: &str, code_length: usize) -> Self {
        Self {
            problem_type: ProblemType::Unknown,
            complexity: Complexity::Moderate,
            confidence: 0.5,
            indicators: vec!["orchestration disabled".to_string()],
            context: ClassificationContext {
                file_path: file_path.to_string(),
                code_length,
                ..Default::default()
            },
        }
    }
}

/// Anything that can classify a unit of work
pub trait ProblemClassifier: Send + Sync {
    fn try_classify(&self, code: &str, file_path: &str, context: &RequestContext) -> Result<ProblemClassification>;

    /// Classify, degrading to the `classification error` result on failure
    fn classify(&self, code: &str, file_path: &str, context: &RequestContext) -> ProblemClassification {
        match self.try_classify(code, file_path, context) {
            Ok(classification) => classification,
            Err(e) => {
                warn!("Classification of {} failed: {}", file_path, e);
                ProblemClassification::classification_error(ClassificationContext::new(code, file_path, context))
            }
        }
    }
}

/// Deterministic first-match rule classifier
#[derive(Debug, Clone)]
pub struct RuleClassifier {
    max_input_bytes: usize,
}

impl RuleClassifier {
    pub fn new() -> Self {
        Self { max_input_bytes: MAX_INPUT_BYTES }
    }

    pub fn with_max_input(mut self, bytes: usize) -> Self {
        self.max_input_bytes = bytes;
        self
    }

    /// Every rule that would match, in priority order
    pub fn matching_rules(&self, code: &str, file_path: &str, context: &RequestContext) -> Vec<RuleId> {
        let signals = Signals::extract(code, file_path, context);
        RULES.iter().filter(|r| r.evaluate(&signals).is_some()).map(|r| r.id).collect()
    }
}

impl Default for RuleClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ProblemClassifier for RuleClassifier {
    fn try_classify(&self, code: &str, file_path: &str, context: &RequestContext) -> Result<ProblemClassification> {
        if code.len() > self.max_input_bytes {
            return Err(CoreError::Classification(format!(
                "input of {} bytes exceeds limit of {}",
                code.len(),
                self.max_input_bytes
            )));
        }

        let signals = Signals::extract(code, file_path, context);
        let ctx = ClassificationContext::new(code, file_path, context);

        let classification = match rules::first_match(&signals) {
            Some((rule, indicators)) => {
                debug!("Rule {:?} matched {}", rule.id, file_path);
                ProblemClassification {
                    problem_type: rule.problem_type,
                    complexity: rule.complexity,
                    confidence: rule.confidence,
                    indicators,
                    context: ctx,
                }
            }
            None => ProblemClassification {
                problem_type: ProblemType::Unknown,
                complexity: Complexity::Moderate,
                confidence: 0.5,
                indicators: vec!["no rule matched".to_string()],
                context: ctx,
            },
        };

        Ok(classification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn classify(code: &str, path: &str, context: &RequestContext) -> ProblemClassification {
        RuleClassifier::new().classify(code, path, context)
    }

    #[test]
    fn test_structural_issue() {
        let code = "function Panel({ open }) {\n  if (open) {\n    const [v, setV] = useState(0);\n  }\n  return null;\n}";
        let result = classify(code, "src/Panel.tsx", &RequestContext::default());
        assert_eq!(result.problem_type, ProblemType::StructuralIssue);
        assert_eq!(result.complexity, Complexity::Complex);
        assert_eq!(result.confidence, 0.9);
    }

    #[test]
    fn test_empty_import_is_syntax_error() {
        let result = classify("import x from \"\";", "src/a.ts", &RequestContext::default());
        assert_eq!(result.problem_type, ProblemType::SyntaxError);
        assert_eq!(result.complexity, Complexity::Simple);
        assert_eq!(result.confidence, 0.85);
    }

    #[test]
    fn test_unbalanced_delimiters() {
        let result = classify("function a() { return (1 + 2; }", "a.js", &RequestContext::default());
        assert_eq!(result.problem_type, ProblemType::SyntaxError);
        assert_eq!(result.confidence, 0.8);
    }

    #[test]
    fn test_component_creation_from_action() {
        let result = classify("", "src/New.tsx", &RequestContext::with_action("create-component"));
        assert_eq!(result.problem_type, ProblemType::ComponentCreation);
        assert_eq!(result.complexity, Complexity::Moderate);
        assert_eq!(result.confidence, 0.9);
    }

    #[test]
    fn test_blank_input_is_component_creation() {
        let result = classify("   \n", "src/New.tsx", &RequestContext::default());
        assert_eq!(result.problem_type, ProblemType::ComponentCreation);
    }

    #[test]
    fn test_domain_analysis() {
        let code = "export const progression = ['C', 'G']; const tempo = 120; playChord(progression);";
        let result = classify(code, "src/music/player.ts", &RequestContext::default());
        assert_eq!(result.problem_type, ProblemType::DomainAnalysis);
        assert_eq!(result.confidence, 0.85);
        assert!(result.indicators.iter().any(|i| i.contains("tempo")));
    }

    #[test]
    fn test_performance_issue() {
        let code = "function List({ items }) {\n  return <ul>{items.map(i => <li onClick={() => pick(i)}>{i}</li>)}</ul>;\n}";
        let result = classify(code, "src/List.tsx", &RequestContext::default());
        assert_eq!(result.problem_type, ProblemType::PerformanceIssue);
        assert_eq!(result.complexity, Complexity::Moderate);
        assert_eq!(result.confidence, 0.8);
        assert_eq!(result.indicators.len(), 2);
    }

    #[test]
    fn test_routing_issue_from_path() {
        let result = classify("export default function About() { return null; }", "app/routes/about.tsx", &RequestContext::default());
        assert_eq!(result.problem_type, ProblemType::RoutingIssue);
        assert_eq!(result.confidence, 0.85);
    }

    #[test]
    fn test_complex_refactor() {
        let mut code = String::new();
        for i in 0..12 {
            code.push_str(&format!("import m{} from './m{}';\n", i, i));
        }
        for i in 0..7 {
            code.push_str(&format!("function helper{}(value) {{\n  return value + {};\n}}\n", i, i));
        }
        code.push_str(&"// padding to make the module large enough\n".repeat(10));
        assert!(code.len() > 1000);

        let result = classify(&code, "src/utils/index.js", &RequestContext::default());
        assert_eq!(result.problem_type, ProblemType::ComplexRefactor);
        assert_eq!(result.complexity, Complexity::Expert);
        assert_eq!(result.confidence, 0.7);
    }

    #[test]
    fn test_simple_fix() {
        let result = classify("const a = 1;;", "a.js", &RequestContext::default());
        assert_eq!(result.problem_type, ProblemType::SimpleFix);
        assert_eq!(result.complexity, Complexity::Simple);

        let result = classify("return value === undefined", "a.js", &RequestContext::default());
        assert_eq!(result.problem_type, ProblemType::SimpleFix);
    }

    #[test]
    fn test_default_unknown() {
        let result = classify("const a = 1;", "a.js", &RequestContext::default());
        assert_eq!(result.problem_type, ProblemType::Unknown);
        assert_eq!(result.complexity, Complexity::Moderate);
        assert_eq!(result.confidence, 0.5);
        assert!(!result.indicators.is_empty());
    }

    #[test]
    fn test_oversized_input_falls_back() {
        let classifier = RuleClassifier::new().with_max_input(8);
        let result = classifier.classify("const value = 1;", "a.js", &RequestContext::default());
        assert_eq!(result.problem_type, ProblemType::Unknown);
        assert_eq!(result.indicators, vec!["classification error".to_string()]);
    }

    #[test]
    fn test_oversized_input_reports_error() {
        let classifier = RuleClassifier::new().with_max_input(8);
        let err = classifier.try_classify("const value = 1;", "a.js", &RequestContext::default());
        assert!(matches!(err, Err(CoreError::Classification(_))));
    }

    #[test]
    fn test_context_carries_caller_fields() {
        let context = RequestContext {
            action: Some("fix".to_string()),
            file_name: Some("Panel.tsx".to_string()),
            component_type: Some("panel".to_string()),
            description: Some("sidebar".to_string()),
            confidence: Some(0.4),
        };
        let result = classify("const a = 1;", "src/Panel.tsx", &context);
        assert_eq!(result.context.file_name.as_deref(), Some("Panel.tsx"));
        assert_eq!(result.context.confidence, Some(0.4));
        assert_eq!(result.context.component_type.as_deref(), Some("panel"));
        assert_eq!(result.context.code_length, 12);
    }

    #[test]
    fn test_structural_shadows_later_rules() {
        // Conditional + hook also unbalanced: structural rule still wins
        let code = "if (x) { useEffect(() => {}";
        let classifier = RuleClassifier::new();
        let matching = classifier.matching_rules(code, "a.tsx", &RequestContext::default());
        assert_eq!(matching.first(), Some(&RuleId::StructuralIssue));
        assert!(matching.contains(&RuleId::UnbalancedDelimiters));
        let result = classifier.classify(code, "a.tsx", &RequestContext::default());
        assert_eq!(result.problem_type, ProblemType::StructuralIssue);
    }

    #[test]
    fn test_problem_type_round_trips_through_str() {
        for t in ProblemType::all() {
            assert_eq!(t.as_str().parse::<ProblemType>().unwrap(), t);
        }
        assert!("nonsense".parse::<ProblemType>().is_err());
    }

    proptest! {
        #[test]
        fn prop_classification_is_bounded_and_deterministic(code in ".{0,400}", path in "[a-z/]{0,20}\\.tsx?") {
            let classifier = RuleClassifier::new();
            let ctx = RequestContext::default();
            let first = classifier.classify(&code, &path, &ctx);
            let second = classifier.classify(&code, &path, &ctx);
            prop_assert!((0.0..=1.0).contains(&first.confidence));
            prop_assert!(!first.indicators.is_empty());
            prop_assert_eq!(first, second);
        }
    }
}
