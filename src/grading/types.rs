//! Core types for grading results.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::grading::criteria::CriterionFamily;
use crate::models::{ContentStatistics, GradingMethod};

/// Result of scoring one rubric criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionScore {
    /// Criterion name as given in the rubric.
    pub criterion: String,
    /// Which scoring rule applied.
    pub family: CriterionFamily,
    /// Score from 0-100.
    pub score: u8,
    pub weight: f64,
    pub confidence: f64,
    pub max_points: u32,
    /// `score` scaled to `max_points`.
    pub points: f64,
    /// Adjustments that produced the score.
    #[serde(default)]
    pub evidence: Vec<String>,
}

/// Complete grading of a single submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingResult {
    /// Weighted average of criterion scores, 0-100.
    pub overall_score: u8,
    /// Caller-supplied maximum the overall score was scaled to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaled_score: Option<f64>,
    /// Per-criterion scores in rubric order, serialized as a name-keyed map.
    #[serde(with = "score_map")]
    pub criterion_scores: Vec<CriterionScore>,
    pub feedback: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub content_statistics: ContentStatistics,
    pub confidence: f64,
    pub grading_method: GradingMethod,
    pub model_used: String,
    /// Timestamp of grading (RFC 3339 format).
    pub graded_at: String,
    pub processing_time_ms: u64,
}

impl GradingResult {
    pub fn score_for(&self, criterion: &str) -> Option<&CriterionScore> {
        self.criterion_scores
            .iter()
            .find(|s| s.criterion == criterion)
    }
}

/// Change in scores between two gradings of the same rubric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingComparison {
    pub before_score: u8,
    pub after_score: u8,
    pub overall_delta: i32,
    /// Per-criterion deltas (positive = improvement), in the order of `after`.
    pub criterion_deltas: Vec<(String, i32)>,
    pub improvements: Vec<String>,
    pub regressions: Vec<String>,
}

/// Serde adapter writing `Vec<CriterionScore>` as an ordered map keyed by
/// criterion name.
pub(crate) mod score_map {
    use super::*;

    pub fn serialize<S: Serializer>(
        scores: &[CriterionScore],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(scores.len()))?;
        for score in scores {
            map.serialize_entry(&score.criterion, score)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<CriterionScore>, D::Error> {
        struct ScoreMapVisitor;

        impl<'de> Visitor<'de> for ScoreMapVisitor {
            type Value = Vec<CriterionScore>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of criterion names to scores")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut scores = Vec::new();
                while let Some((name, mut score)) = access.next_entry::<String, CriterionScore>()? {
                    score.criterion = name;
                    scores.push(score);
                }
                Ok(scores)
            }
        }

        deserializer.deserialize_map(ScoreMapVisitor)
    }
}
