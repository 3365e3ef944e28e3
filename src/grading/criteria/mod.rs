//! Heuristic criterion scoring.
//!
//! A criterion is routed to a scoring family by substring match on its
//! lower-cased name, checked in this order:
//!
//! | family     | name contains            |
//! |------------|--------------------------|
//! | content    | `content`, `quality`     |
//! | writing    | `grammar`, `writing`     |
//! | creativity | `creativity`, `original` |
//!
//! Each family starts from a base score and applies banded bonuses and
//! penalties derived from [`ContentStatistics`]. The band thresholds are tuning
//! constants; what must hold is that each band moves the score monotonically.
//! Anything else receives the configured neutral score.

pub mod content;
pub mod creativity;
pub mod writing;

use serde::{Deserialize, Serialize};

use crate::config::GradingConfig;
use crate::grading::rubric::{Rubric, RubricCriterion};
use crate::grading::types::CriterionScore;
use crate::models::ContentStatistics;
use crate::utils::round2;

/// Scoring rule applied to a criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionFamily {
    Content,
    Writing,
    Creativity,
    Other,
}

impl CriterionFamily {
    /// Route a criterion name to its family.
    pub fn classify(name: &str) -> Self {
        let lower = name.to_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

        if has(&["content", "quality"]) {
            Self::Content
        } else if has(&["grammar", "writing"]) {
            Self::Writing
        } else if has(&["creativity", "original"]) {
            Self::Creativity
        } else {
            Self::Other
        }
    }

    /// Returns the human-readable name of this family.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Content => "Content",
            Self::Writing => "Writing",
            Self::Creativity => "Creativity",
            Self::Other => "General",
        }
    }
}

impl std::fmt::Display for CriterionFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Content => write!(f, "content"),
            Self::Writing => write!(f, "writing"),
            Self::Creativity => write!(f, "creativity"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Running score with a trail of the adjustments applied.
#[derive(Debug, Clone)]
pub struct ScoreCard {
    score: i32,
    evidence: Vec<String>,
}

impl ScoreCard {
    pub fn new(base: i32) -> Self {
        Self {
            score: base,
            evidence: vec![format!("base {}", base)],
        }
    }

    pub fn adjust(&mut self, delta: i32, reason: impl Into<String>) {
        self.score += delta;
        self.evidence.push(format!("{:+} {}", delta, reason.into()));
    }

    /// Final score clamped to 0-100.
    pub fn score(&self) -> u8 {
        self.score.clamp(0, 100) as u8
    }

    pub fn into_parts(self) -> (u8, Vec<String>) {
        let score = self.score();
        (score, self.evidence)
    }
}

/// Score one criterion from precomputed statistics.
pub fn evaluate_criterion(
    criterion: &RubricCriterion,
    stats: &ContentStatistics,
    config: &GradingConfig,
) -> CriterionScore {
    let family = CriterionFamily::classify(&criterion.name);

    let (score, evidence) = match family {
        CriterionFamily::Content => content::score(stats).into_parts(),
        CriterionFamily::Writing => writing::score(stats).into_parts(),
        CriterionFamily::Creativity => creativity::score(stats).into_parts(),
        CriterionFamily::Other => (
            config.neutral_score.min(100),
            vec!["no matching scoring rule; neutral score".to_string()],
        ),
    };

    build_score(criterion, family, score, config.criterion_confidence, evidence)
}

/// Score every criterion, preserving rubric order.
pub fn evaluate_rubric(
    rubric: &Rubric,
    stats: &ContentStatistics,
    config: &GradingConfig,
) -> Vec<CriterionScore> {
    rubric
        .iter()
        .map(|criterion| evaluate_criterion(criterion, stats, config))
        .collect()
}

/// Assemble a [`CriterionScore`] for `criterion`, clamping `score` to 0-100.
pub fn build_score(
    criterion: &RubricCriterion,
    family: CriterionFamily,
    score: u8,
    confidence: f64,
    evidence: Vec<String>,
) -> CriterionScore {
    let score = score.min(100);
    CriterionScore {
        criterion: criterion.name.clone(),
        family,
        score,
        weight: criterion.effective_weight(),
        confidence,
        max_points: criterion.max_points,
        points: round2(score as f64 / 100.0 * criterion.max_points as f64),
        evidence,
    }
}

/// Weighted average of criterion scores, rounded to the nearest integer.
///
/// Returns `neutral` when there are no scores or the weights sum to zero.
pub fn overall_score(scores: &[CriterionScore], neutral: u8) -> u8 {
    let total_weight: f64 = scores.iter().map(|s| s.weight).sum();
    if scores.is_empty() || total_weight <= 0.0 || !total_weight.is_finite() {
        return neutral.min(100);
    }

    let weighted: f64 = scores.iter().map(|s| s.score as f64 * s.weight).sum();
    (weighted / total_weight).round().clamp(0.0, 100.0) as u8
}
