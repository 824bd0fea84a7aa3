//! Ordered classification rules
//!
//! `RULES` is evaluated top to bottom and the first rule whose predicate
//! yields indicators decides the classification. Later rules are unreachable
//! once an earlier one matches.

use super::{Complexity, ProblemType, Signals};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleId {
    StructuralIssue,
    EmptyImport,
    UnbalancedDelimiters,
    ComponentCreation,
    DomainAnalysis,
    PerformanceIssue,
    RoutingIssue,
    ComplexRefactor,
    SimpleFix,
}

pub struct Rule {
    pub id: RuleId,
    pub problem_type: ProblemType,
    pub complexity: Complexity,
    pub confidence: f32,
    predicate: fn(&Signals) -> Option<Vec<String>>,
}

impl Rule {
    /// Indicators if the rule matches
    pub fn evaluate(&self, signals: &Signals) -> Option<Vec<String>> {
        (self.predicate)(signals)
    }
}

pub static RULES: &[Rule] = &[
    Rule {
        id: RuleId::StructuralIssue,
        problem_type: ProblemType::StructuralIssue,
        complexity: Complexity::Complex,
        confidence: 0.9,
        predicate: structural_issue,
    },
    Rule {
        id: RuleId::EmptyImport,
        problem_type: ProblemType::SyntaxError,
        complexity: Complexity::Simple,
        confidence: 0.85,
        predicate: empty_import,
    },
    Rule {
        id: RuleId::UnbalancedDelimiters,
        problem_type: ProblemType::SyntaxError,
        complexity: Complexity::Simple,
        confidence: 0.8,
        predicate: unbalanced_delimiters,
    },
    Rule {
        id: RuleId::ComponentCreation,
        problem_type: ProblemType::ComponentCreation,
        complexity: Complexity::Moderate,
        confidence: 0.9,
        predicate: component_creation,
    },
    Rule {
        id: RuleId::DomainAnalysis,
        problem_type: ProblemType::DomainAnalysis,
        complexity: Complexity::Moderate,
        confidence: 0.85,
        predicate: domain_analysis,
    },
    Rule {
        id: RuleId::PerformanceIssue,
        problem_type: ProblemType::PerformanceIssue,
        complexity: Complexity::Moderate,
        confidence: 0.8,
        predicate: performance_issue,
    },
    Rule {
        id: RuleId::RoutingIssue,
        problem_type: ProblemType::RoutingIssue,
        complexity: Complexity::Moderate,
        confidence: 0.85,
        predicate: routing_issue,
    },
    Rule {
        id: RuleId::ComplexRefactor,
        problem_type: ProblemType::ComplexRefactor,
        complexity: Complexity::Expert,
        confidence: 0.7,
        predicate: complex_refactor,
    },
    Rule {
        id: RuleId::SimpleFix,
        problem_type: ProblemType::SimpleFix,
        complexity: Complexity::Simple,
        confidence: 0.8,
        predicate: simple_fix,
    },
];

/// First matching rule and its indicators
pub fn first_match(signals: &Signals) -> Option<(&'static Rule, Vec<String>)> {
    RULES.iter().find_map(|rule| rule.evaluate(signals).map(|indicators| (rule, indicators)))
}

fn structural_issue(s: &Signals) -> Option<Vec<String>> {
    s.conditional_with_state
        .then(|| vec!["conditional construct combined with stateful hook".to_string()])
}

fn empty_import(s: &Signals) -> Option<Vec<String>> {
    s.empty_import.then(|| vec!["import with empty target".to_string()])
}

fn unbalanced_delimiters(s: &Signals) -> Option<Vec<String>> {
    if s.delimiters_balanced() {
        return None;
    }

    let mut indicators = Vec::new();
    if s.open_braces != s.close_braces {
        indicators.push(format!("unbalanced braces: {} open, {} close", s.open_braces, s.close_braces));
    }
    if s.open_parens != s.close_parens {
        indicators.push(format!(
            "unbalanced parentheses: {} open, {} close",
            s.open_parens, s.close_parens
        ));
    }
    Some(indicators)
}

fn component_creation(s: &Signals) -> Option<Vec<String>> {
    if s.create_component_requested {
        Some(vec!["create-component action requested".to_string()])
    } else if s.is_blank {
        Some(vec!["empty input".to_string()])
    } else {
        None
    }
}

fn domain_analysis(s: &Signals) -> Option<Vec<String>> {
    if s.music_terms.is_empty() {
        return None;
    }
    Some(vec![format!("music domain terms: {}", s.music_terms.join(", "))])
}

fn performance_issue(s: &Signals) -> Option<Vec<String>> {
    (s.performance_findings.len() >= 2)
        .then(|| s.performance_findings.iter().map(|f| f.to_string()).collect())
}

fn routing_issue(s: &Signals) -> Option<Vec<String>> {
    let mut indicators = Vec::new();
    if s.routing_in_path {
        indicators.push("file path is a route module".to_string());
    }
    if s.routing_in_content {
        indicators.push("navigation or router usage in code".to_string());
    }
    (!indicators.is_empty()).then_some(indicators)
}

fn complex_refactor(s: &Signals) -> Option<Vec<String>> {
    if s.code_length <= 1000 {
        return None;
    }

    let mut indicators = Vec::new();
    if s.function_defs > 5 {
        indicators.push(format!("{} function definitions", s.function_defs));
    }
    if s.type_defs > 3 {
        indicators.push(format!("{} type definitions", s.type_defs));
    }
    if s.imports > 10 {
        indicators.push(format!("{} imports", s.imports));
    }
    if s.max_class_methods > 5 {
        indicators.push(format!("class with {} methods", s.max_class_methods));
    }

    (indicators.len() >= 2).then_some(indicators)
}

fn simple_fix(s: &Signals) -> Option<Vec<String>> {
    let mut indicators = Vec::new();
    if s.double_terminator {
        indicators.push("doubled statement terminator".to_string());
    }
    if s.mentions_missing {
        indicators.push("literal 'missing' in code".to_string());
    }
    if s.short_with_undefined {
        indicators.push("short snippet referencing undefined".to_string());
    }
    (!indicators.is_empty()).then_some(indicators)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_order_is_fixed() {
        let order: Vec<RuleId> = RULES.iter().map(|r| r.id).collect();
        assert_eq!(
            order,
            vec![
                RuleId::StructuralIssue,
                RuleId::EmptyImport,
                RuleId::UnbalancedDelimiters,
                RuleId::ComponentCreation,
                RuleId::DomainAnalysis,
                RuleId::PerformanceIssue,
                RuleId::RoutingIssue,
                RuleId::ComplexRefactor,
                RuleId::SimpleFix,
            ]
        );
    }

    #[test]
    fn test_confidences_within_unit_interval() {
        for rule in RULES {
            assert!((0.0..=1.0).contains(&rule.confidence), "{:?}", rule.id);
        }
    }

    #[test]
    fn test_single_performance_finding_is_not_enough() {
        let signals = Signals { performance_findings: vec!["list rendering without useMemo"], ..Default::default() };
        assert!(performance_issue(&signals).is_none());
    }

    #[test]
    fn test_complex_refactor_needs_two_criteria() {
        let one = Signals { code_length: 5000, function_defs: 9, ..Default::default() };
        assert!(complex_refactor(&one).is_none());

        let two = Signals { code_length: 5000, function_defs: 9, imports: 11, ..Default::default() };
        assert_eq!(complex_refactor(&two).map(|i| i.len()), Some(2));

        let short = Signals { code_length: 1000, function_defs: 9, imports: 11, ..Default::default() };
        assert!(complex_refactor(&short).is_none());
    }

    #[test]
    fn test_first_match_on_empty_signals() {
        assert!(first_match(&Signals::default()).is_none());
    }
}
