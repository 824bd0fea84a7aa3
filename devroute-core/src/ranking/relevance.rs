//! Which handlers are relevant to which problem types

use crate::classifier::ProblemType;
use crate::registry::{Capability as C, HandlerCapability, HandlerCategory};

/// How a handler qualifies as a candidate
#[derive(Debug, Clone, Copy)]
pub enum MatchRule {
    Category(HandlerCategory),
    AnyCapability(&'static [C]),
    /// Nothing matches; the anchors are used instead
    Nothing,
}

#[derive(Debug, Clone, Copy)]
pub struct Relevance {
    /// Tags counted in the capability match ratio
    pub relevant_tags: &'static [C],
    pub match_rule: MatchRule,
    /// Substrings that make a handler strength worth citing
    pub strength_keywords: &'static [&'static str],
}

impl Relevance {
    pub fn matches(&self, handler: &HandlerCapability) -> bool {
        match self.match_rule {
            MatchRule::Category(category) => handler.category == category,
            MatchRule::AnyCapability(tags) => tags.iter().any(|t| handler.has_capability(*t)),
            MatchRule::Nothing => false,
        }
    }

    /// |handler tags ∩ relevant tags| / max(1, |relevant tags|)
    pub fn capability_match_ratio(&self, handler: &HandlerCapability) -> f32 {
        let matched = self.relevant_tags.iter().filter(|t| handler.has_capability(**t)).count();
        matched as f32 / self.relevant_tags.len().max(1) as f32
    }

    pub fn matched_strengths<'a>(&self, handler: &'a HandlerCapability) -> Vec<&'a str> {
        handler
            .strengths
            .iter()
            .filter(|s| {
                let lower = s.to_lowercase();
                self.strength_keywords.iter().any(|k| lower.contains(k))
            })
            .map(String::as_str)
            .collect()
    }
}

pub fn relevance_for(problem_type: ProblemType) -> Relevance {
    match problem_type {
        ProblemType::StructuralIssue => Relevance {
            relevant_tags: &[C::StructuralRefactor, C::HookRules, C::Refactoring],
            match_rule: MatchRule::AnyCapability(&[C::StructuralRefactor, C::HookRules, C::Refactoring]),
            strength_keywords: &["structure", "hook", "refactor"],
        },
        ProblemType::SyntaxError => Relevance {
            relevant_tags: &[C::SyntaxRepair, C::AutoFix, C::QuickFix],
            match_rule: MatchRule::AnyCapability(&[C::SyntaxRepair, C::AutoFix]),
            strength_keywords: &["syntax", "import", "bracket"],
        },
        ProblemType::ComponentCreation => Relevance {
            relevant_tags: &[C::ComponentGeneration, C::Templates],
            match_rule: MatchRule::AnyCapability(&[C::ComponentGeneration]),
            strength_keywords: &["component", "scaffold", "prop"],
        },
        ProblemType::DomainAnalysis => Relevance {
            relevant_tags: &[C::MusicAnalysis, C::DomainAnalysis, C::AudioProcessing, C::MusicGeneration],
            match_rule: MatchRule::Category(HandlerCategory::Music),
            strength_keywords: &["music", "tempo", "melody", "chord"],
        },
        ProblemType::PerformanceIssue => Relevance {
            relevant_tags: &[C::PerformanceOptimization, C::Memoization],
            match_rule: MatchRule::AnyCapability(&[C::PerformanceOptimization, C::Memoization]),
            strength_keywords: &["memo", "render", "performance"],
        },
        ProblemType::RoutingIssue => Relevance {
            relevant_tags: &[C::RouteAnalysis, C::RouteRepair, C::RouteVisualization, C::Navigation],
            match_rule: MatchRule::Category(HandlerCategory::Routes),
            strength_keywords: &["route", "navigation", "link"],
        },
        ProblemType::ComplexRefactor => Relevance {
            relevant_tags: &[C::StructuralRefactor, C::Refactoring, C::FileAnalysis],
            match_rule: MatchRule::AnyCapability(&[C::StructuralRefactor, C::Refactoring]),
            strength_keywords: &["refactor", "structure", "analysis"],
        },
        ProblemType::SimpleFix => Relevance {
            relevant_tags: &[C::QuickFix, C::AutoFix, C::PatternMatching],
            match_rule: MatchRule::AnyCapability(&[C::QuickFix, C::AutoFix]),
            strength_keywords: &["fix", "typo", "one-line"],
        },
        ProblemType::Unknown => Relevance {
            relevant_tags: &[C::FileAnalysis, C::CodeQuality],
            match_rule: MatchRule::Nothing,
            strength_keywords: &["analysis"],
        },
    }
}
