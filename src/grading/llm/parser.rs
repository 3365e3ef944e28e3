//! Response parsing for external grading.

use serde::Deserialize;

use crate::grading::criteria::{build_score, CriterionFamily};
use crate::grading::rubric::Rubric;
use crate::grading::types::CriterionScore;
use crate::utils::extract_json_str;

#[derive(Debug, Deserialize)]
struct GradingResponse {
    scores: Vec<ScoreEntry>,
    #[serde(default)]
    feedback: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScoreEntry {
    criterion: String,
    score: f64,
    #[serde(default)]
    rationale: String,
}

/// Parse error types.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("No JSON found in response")]
    NoJson,
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),
    #[error("Score {score} for '{criterion}' out of range 0-100")]
    ScoreOutOfRange { criterion: String, score: f64 },
    #[error("Missing score for criterion '{0}'")]
    MissingCriterion(String),
}

/// Validated external grading.
#[derive(Debug, Clone)]
pub struct ParsedGrading {
    /// Scores in rubric order.
    pub scores: Vec<CriterionScore>,
    pub feedback: Option<String>,
}

/// Parse a provider response, requiring a 0-100 score for every criterion.
///
/// Entries for unknown criteria are ignored; the first entry for a criterion
/// wins.
pub fn parse_grading_response(
    response: &str,
    rubric: &Rubric,
    confidence: f64,
) -> Result<ParsedGrading, ParseError> {
    let json_str = extract_json_str(response).ok_or(ParseError::NoJson)?;

    let parsed: GradingResponse =
        serde_json::from_str(json_str).map_err(|e| ParseError::InvalidJson(e.to_string()))?;

    let mut scores = Vec::with_capacity(rubric.len());
    for criterion in rubric.iter() {
        let entry = parsed
            .scores
            .iter()
            .find(|e| e.criterion.eq_ignore_ascii_case(&criterion.name))
            .ok_or_else(|| ParseError::MissingCriterion(criterion.name.clone()))?;

        if !entry.score.is_finite() || !(0.0..=100.0).contains(&entry.score) {
            return Err(ParseError::ScoreOutOfRange {
                criterion: criterion.name.clone(),
                score: entry.score,
            });
        }

        let evidence = if entry.rationale.trim().is_empty() {
            Vec::new()
        } else {
            vec![entry.rationale.trim().to_string()]
        };

        scores.push(build_score(
            criterion,
            CriterionFamily::classify(&criterion.name),
            entry.score.round() as u8,
            confidence,
            evidence,
        ));
    }

    let feedback = parsed
        .feedback
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty());

    Ok(ParsedGrading { scores, feedback })
}
