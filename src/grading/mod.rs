//! Rubric grading: criterion scoring, overall score and feedback.

pub mod criteria;
pub mod feedback;
pub mod llm;
pub mod rubric;
pub mod types;

pub use criteria::{evaluate_rubric, overall_score, CriterionFamily};
pub use rubric::{Rubric, RubricCriterion};
pub use types::{CriterionScore, GradingComparison, GradingResult};

use crate::config::GradingConfig;
use crate::models::ContentStatistics;

/// Scores and feedback for one submission, before timing and provenance are
/// attached.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeSheet {
    pub criterion_scores: Vec<CriterionScore>,
    pub overall_score: u8,
    pub feedback: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
}

impl GradeSheet {
    /// Derive the overall score and feedback from criterion scores.
    ///
    /// `feedback` replaces the templated paragraph when given.
    pub fn from_scores(
        stats: &ContentStatistics,
        criterion_scores: Vec<CriterionScore>,
        feedback: Option<String>,
        config: &GradingConfig,
    ) -> Self {
        let overall = overall_score(&criterion_scores, config.neutral_score);
        let feedback = feedback
            .unwrap_or_else(|| feedback::generate_feedback(stats, &criterion_scores, overall));

        Self {
            strengths: feedback::strengths(&criterion_scores, overall),
            improvements: feedback::improvements(&criterion_scores, overall),
            criterion_scores,
            overall_score: overall,
            feedback,
        }
    }
}

/// Grade with the local heuristic scorer.
pub fn grade_heuristic(
    stats: &ContentStatistics,
    rubric: &Rubric,
    config: &GradingConfig,
) -> GradeSheet {
    let scores = evaluate_rubric(rubric, stats, config);
    GradeSheet::from_scores(stats, scores, None, config)
}
