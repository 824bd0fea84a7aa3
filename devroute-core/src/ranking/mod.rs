//! Scoring and ranking of candidate handlers
//!
//! For a classification the engine picks candidates through the relevance
//! table, scores each one, and turns the ranking into an
//! [`OrchestrationResult`]. Any failure while ranking produces the anchor
//! fallback result instead.

pub mod relevance;

use crate::classifier::{Complexity, ProblemClassification};
use crate::config::{AnchorConfig, LimitsConfig, ScoringConfig};
use crate::error::{CoreError, Result};
use crate::registry::{CapabilityRegistry, HandlerCapability, HandlerComplexity};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, warn};

pub use relevance::{relevance_for, MatchRule, Relevance};

/// Confidence forced onto the anchor fallback result
pub const FALLBACK_CONFIDENCE: f32 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerRecommendation {
    pub handler_name: String,
    pub confidence: f32,
    pub reasoning: String,
    pub estimated_success_rate: f32,
    pub fallback_handlers: Vec<String>,
    pub execution_order: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationResult {
    pub primary_handler: String,
    pub backup_handlers: Vec<String>,
    pub reasoning: String,
    pub confidence: f32,
    pub classification: ProblemClassification,
    pub recommendations: Vec<HandlerRecommendation>,
    pub timestamp: DateTime<Utc>,
}

/// Per-factor contributions for one candidate
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBreakdown {
    pub success: f32,
    pub capability_match: f32,
    pub alignment: f32,
    pub recency: f32,
    pub confidence: f32,
    /// Sum before clamping, used to order candidates that clamp to the same score
    pub raw: f32,
    pub score: f32,
}

#[derive(Debug, Clone)]
pub struct RankingEngine {
    scoring: ScoringConfig,
    anchors: AnchorConfig,
    backups: usize,
    fallbacks: usize,
}

impl RankingEngine {
    pub fn new(scoring: ScoringConfig, anchors: AnchorConfig, limits: &LimitsConfig) -> Self {
        Self {
            scoring,
            anchors,
            backups: limits.backup_handlers,
            fallbacks: limits.recommendation_fallbacks,
        }
    }

    pub fn anchors(&self) -> &AnchorConfig {
        &self.anchors
    }

    pub fn recommend(
        &self,
        registry: &CapabilityRegistry,
        classification: &ProblemClassification,
    ) -> OrchestrationResult {
        self.recommend_at(registry, classification, Utc::now())
    }

    pub fn recommend_at(
        &self,
        registry: &CapabilityRegistry,
        classification: &ProblemClassification,
        now: DateTime<Utc>,
    ) -> OrchestrationResult {
        match self.try_recommend(registry, classification, now) {
            Ok(result) => result,
            Err(e) => {
                warn!("Ranking for {} failed, using anchors: {}", classification.problem_type, e);
                self.fallback_result(classification)
            }
        }
    }

    /// Anchor result used whenever ranking cannot complete
    pub fn fallback_result(&self, classification: &ProblemClassification) -> OrchestrationResult {
        OrchestrationResult {
            primary_handler: self.anchors.primary.clone(),
            backup_handlers: vec![self.anchors.secondary.clone(), self.anchors.tertiary.clone()],
            reasoning: "Ranking unavailable; routed to anchor handlers".to_string(),
            confidence: FALLBACK_CONFIDENCE,
            classification: classification.clone(),
            recommendations: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    fn try_recommend(
        &self,
        registry: &CapabilityRegistry,
        classification: &ProblemClassification,
        now: DateTime<Utc>,
    ) -> Result<OrchestrationResult> {
        let relevance = relevance_for(classification.problem_type);
        let candidates = self.candidates(registry, &relevance)?;

        let mut scored = Vec::with_capacity(candidates.len());
        for handler in candidates {
            let breakdown = self.score(handler, &relevance, classification.complexity, now)?;
            scored.push((handler, breakdown));
        }

        // Stable sort keeps registration order among exact ties
        scored.sort_by(|a, b| {
            b.1.score
                .partial_cmp(&a.1.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.1.raw.partial_cmp(&a.1.raw).unwrap_or(Ordering::Equal))
        });

        let ranked_names: Vec<&str> = scored.iter().map(|(h, _)| h.name.as_str()).collect();

        let recommendations: Vec<HandlerRecommendation> = scored
            .iter()
            .enumerate()
            .map(|(rank, (handler, breakdown))| HandlerRecommendation {
                handler_name: handler.name.clone(),
                confidence: breakdown.score,
                reasoning: self.reasoning(handler, &relevance, classification.complexity),
                estimated_success_rate: handler.success_rate * breakdown.score,
                fallback_handlers: ranked_names
                    .iter()
                    .filter(|n| **n != handler.name)
                    .take(self.fallbacks)
                    .map(|n| n.to_string())
                    .collect(),
                execution_order: rank + 1,
            })
            .collect();

        let primary = recommendations.first().ok_or(CoreError::EmptyRegistry)?;

        let backups: Vec<String> = ranked_names
            .iter()
            .filter(|n| **n != primary.handler_name)
            .take(self.backups)
            .map(|n| n.to_string())
            .collect();

        debug!(
            "Ranked {} candidates for {}: primary {} ({:.2})",
            recommendations.len(),
            classification.problem_type,
            primary.handler_name,
            primary.confidence
        );

        Ok(OrchestrationResult {
            primary_handler: primary.handler_name.clone(),
            backup_handlers: backups,
            reasoning: primary.reasoning.clone(),
            confidence: primary.confidence,
            classification: classification.clone(),
            recommendations,
            timestamp: now,
        })
    }

    /// Handlers relevant to the problem, or the anchors when none are
    pub fn candidates<'a>(
        &self,
        registry: &'a CapabilityRegistry,
        relevance: &Relevance,
    ) -> Result<Vec<&'a HandlerCapability>> {
        if registry.is_empty() {
            return Err(CoreError::EmptyRegistry);
        }

        let matched: Vec<_> = registry.all().filter(|h| relevance.matches(h)).collect();
        if !matched.is_empty() {
            return Ok(matched);
        }

        self.anchors
            .all()
            .into_iter()
            .map(|name| registry.get(name).ok_or_else(|| CoreError::MissingAnchor(name.to_string())))
            .collect()
    }

    pub fn score(
        &self,
        handler: &HandlerCapability,
        relevance: &Relevance,
        complexity: Complexity,
        now: DateTime<Utc>,
    ) -> Result<ScoreBreakdown> {
        let s = &self.scoring;

        let success = handler.success_rate * s.success_rate_weight;
        let capability_match = relevance.capability_match_ratio(handler) * s.capability_match_weight;
        let alignment = self.complexity_alignment(handler.complexity_class, complexity) * s.complexity_weight;
        let window = Duration::try_days(s.recency_window_days).ok_or_else(|| {
            CoreError::Config(format!("recency window of {} days is out of range", s.recency_window_days))
        })?;
        let recency = match handler.last_used {
            Some(last) if now.signed_duration_since(last) <= window => s.recency_bonus,
            _ => 0.0,
        };
        let confidence = handler.confidence * s.confidence_weight;

        let raw = s.base_score + success + capability_match + alignment + recency + confidence;
        if !raw.is_finite() {
            return Err(CoreError::NonFiniteScore { handler: handler.name.clone() });
        }

        Ok(ScoreBreakdown {
            success,
            capability_match,
            alignment,
            recency,
            confidence,
            raw,
            score: raw.clamp(s.min_score, s.max_score),
        })
    }

    pub fn complexity_alignment(&self, handler: HandlerComplexity, problem: Complexity) -> f32 {
        let s = &self.scoring;
        match (handler, problem) {
            (HandlerComplexity::Complex, Complexity::Expert) => s.expert_alignment,
            (HandlerComplexity::Complex, Complexity::Simple) => s.over_engineered_alignment,
            (HandlerComplexity::Simple, Complexity::Simple)
            | (HandlerComplexity::Moderate, Complexity::Moderate)
            | (HandlerComplexity::Complex, Complexity::Complex) => s.exact_alignment,
            _ => s.partial_alignment,
        }
    }

    fn reasoning(&self, handler: &HandlerCapability, relevance: &Relevance, complexity: Complexity) -> String {
        let mut clauses = Vec::new();

        if handler.success_rate > self.scoring.reasoning_success_threshold {
            clauses.push(format!("High success rate ({:.0}%)", handler.success_rate * 100.0));
        }

        for strength in relevance.matched_strengths(handler) {
            clauses.push(format!("Strong at {}", strength));
        }

        let alignment = self.complexity_alignment(handler.complexity_class, complexity);
        if alignment >= self.scoring.expert_alignment {
            clauses.push(format!("Well suited to {} problems", complexity));
        }

        if clauses.is_empty() {
            "General-purpose match for this problem".to_string()
        } else {
            clauses.join("; ")
        }
    }
}
