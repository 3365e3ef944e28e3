use std::fmt::{Display, Formatter};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{AnalyzerError, AnalyzerResult};

/// A student's submission as handed over by the web layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionText {
    pub content: String,
    pub assignment_id: String,
    pub student_id: String,
}

impl SubmissionText {
    pub fn new(
        content: impl Into<String>,
        assignment_id: impl Into<String>,
        student_id: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            assignment_id: assignment_id.into(),
            student_id: student_id.into(),
        }
    }

    /// Parse a submission from a JSON request body.
    ///
    /// A missing or null `content` field is an invalid request, not an empty
    /// submission.
    pub fn from_json(body: &str) -> AnalyzerResult<Self> {
        serde_json::from_str(body)
            .map_err(|e| AnalyzerError::invalid(format!("malformed submission: {}", e)))
    }
}

/// A previously stored text to compare a submission against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceText {
    pub id: String,
    pub text: String,
}

impl ReferenceText {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Keyword-bag tone label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Display for Sentiment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Positive => write!(f, "positive"),
            Self::Negative => write!(f, "negative"),
            Self::Neutral => write!(f, "neutral"),
        }
    }
}

/// Derived statistics for a piece of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentStatistics {
    pub word_count: usize,
    pub sentence_count: usize,
    pub avg_words_per_sentence: f64,
    /// Flesch-style reading ease, 0-100, higher is easier.
    pub readability_score: f64,
    pub sentiment: Sentiment,
    /// Blend of long-word ratio and lexical diversity, 0-100.
    pub complexity_score: f64,
}

/// How a grading result was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradingMethod {
    /// Local heuristic scorer.
    Heuristic,
    /// External grading provider.
    External,
    /// External provider was configured but failed; heuristic result returned.
    HeuristicFallback,
}

impl Display for GradingMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Heuristic => write!(f, "heuristic"),
            Self::External => write!(f, "external"),
            Self::HeuristicFallback => write!(f, "heuristic_fallback"),
        }
    }
}

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output.
    #[default]
    Pretty,
    /// JSON output.
    Json,
    /// Markdown report.
    Markdown,
}
