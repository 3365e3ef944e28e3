//! Analyzer configuration.
//!
//! Every heuristic threshold lives here so hosts can tune them without
//! touching the scoring code. Settings can be provided via:
//! - a JSON file (`--config` on the CLI, or [`AnalyzerConfig::from_file`])
//! - environment variables for the common knobs (see [`AnalyzerConfig::with_env`])
//!
//! Missing fields in a file fall back to the defaults.

use std::env;
use std::fs;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{AnalyzerError, AnalyzerResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub statistics: StatisticsConfig,
    pub grading: GradingConfig,
    pub detection: DetectionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticsConfig {
    /// Number of leading words used for the syllable estimate.
    pub syllable_sample_size: usize,
    /// Readability reported for text with no words.
    pub neutral_readability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradingConfig {
    /// Score for criteria outside the known families, and the overall score
    /// when the rubric carries no weight.
    pub neutral_score: u8,
    /// Confidence attached to each heuristic criterion score.
    pub criterion_confidence: f64,
    /// Confidence of a heuristic grading result.
    pub heuristic_confidence: f64,
    /// Confidence of a heuristic result produced after the external grader failed.
    pub fallback_confidence: f64,
    /// Confidence of a result produced by the external grader.
    pub external_confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Texts shorter than this are not assessed for AI authorship.
    pub min_words: usize,
    /// Similarity (0-1) above which a submission is flagged.
    pub similarity_threshold: f64,
    /// Similarity (0-1) a reference needs to be listed as a match.
    pub match_floor: f64,
    pub preview_chars: usize,
    /// Distinct ratio of long words below which text counts as repetitive.
    pub repetition_ratio: f64,
    /// Formal connectives per 100 words above which text counts as overly formal.
    pub formal_per_100_words: f64,
    /// First-person phrases per 100 words below which text lacks a personal voice.
    pub personal_per_100_words: f64,
    /// Sentence-length variance below which structure counts as too uniform.
    pub sentence_variance: f64,
    /// Sequencing words per 10 sentences above which transitions count as generic.
    pub transitions_per_10_sentences: f64,
    /// Fraction of true indicators above which text counts as AI-generated.
    pub ai_ratio_threshold: f64,
    /// Word n-gram length used by the paraphrase check.
    pub paraphrase_ngram: usize,
    /// N-gram overlap or shared-vocabulary ratio above which a reference
    /// counts as paraphrased.
    pub paraphrase_threshold: f64,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            syllable_sample_size: 20,
            neutral_readability: 50.0,
        }
    }
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            neutral_score: 70,
            criterion_confidence: 0.8,
            heuristic_confidence: 0.85,
            fallback_confidence: 0.7,
            external_confidence: 0.9,
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_words: 10,
            similarity_threshold: 0.7,
            match_floor: 0.3,
            preview_chars: 100,
            repetition_ratio: 0.7,
            formal_per_100_words: 0.5,
            personal_per_100_words: 0.5,
            sentence_variance: 4.0,
            transitions_per_10_sentences: 2.0,
            ai_ratio_threshold: 0.6,
            paraphrase_ngram: 3,
            paraphrase_threshold: 0.6,
        }
    }
}

impl AnalyzerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config file, then validate it.
    pub fn from_file(path: &Path) -> AnalyzerResult<Self> {
        let json = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// Apply environment overrides.
    ///
    /// Reads:
    /// - `GRADEKIT_NEUTRAL_SCORE` - score for unmatched criteria and empty rubrics
    /// - `GRADEKIT_SIMILARITY_THRESHOLD` - plagiarism flag threshold (0-1)
    /// - `GRADEKIT_MIN_WORDS` - minimum words for AI-content assessment
    /// - `GRADEKIT_SYLLABLE_SAMPLE` - words sampled for the syllable estimate
    ///
    /// Unparseable values are ignored with a warning.
    pub fn with_env(mut self) -> Self {
        if let Some(v) = env_parse("GRADEKIT_NEUTRAL_SCORE") {
            self.grading.neutral_score = v;
        }
        if let Some(v) = env_parse("GRADEKIT_SIMILARITY_THRESHOLD") {
            self.detection.similarity_threshold = v;
        }
        if let Some(v) = env_parse("GRADEKIT_MIN_WORDS") {
            self.detection.min_words = v;
        }
        if let Some(v) = env_parse("GRADEKIT_SYLLABLE_SAMPLE") {
            self.statistics.syllable_sample_size = v;
        }
        self
    }

    pub fn with_neutral_score(mut self, score: u8) -> Self {
        self.grading.neutral_score = score;
        self
    }

    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.detection.similarity_threshold = threshold;
        self
    }

    pub fn with_min_words(mut self, min_words: usize) -> Self {
        self.detection.min_words = min_words;
        self
    }

    /// Reject settings that would break the scoring invariants.
    pub fn validate(&self) -> AnalyzerResult<()> {
        if self.grading.neutral_score > 100 {
            return Err(AnalyzerError::invalid("neutral_score must be within 0-100"));
        }
        if self.statistics.syllable_sample_size == 0 {
            return Err(AnalyzerError::invalid(
                "syllable_sample_size must be at least 1",
            ));
        }
        if !(0.0..=100.0).contains(&self.statistics.neutral_readability) {
            return Err(AnalyzerError::invalid(
                "neutral_readability must be within 0-100",
            ));
        }
        if self.detection.paraphrase_ngram == 0 {
            return Err(AnalyzerError::invalid("paraphrase_ngram must be at least 1"));
        }
        for (name, value) in [
            ("similarity_threshold", self.detection.similarity_threshold),
            ("paraphrase_threshold", self.detection.paraphrase_threshold),
            ("match_floor", self.detection.match_floor),
            ("ai_ratio_threshold", self.detection.ai_ratio_threshold),
            ("criterion_confidence", self.grading.criterion_confidence),
            ("heuristic_confidence", self.grading.heuristic_confidence),
            ("fallback_confidence", self.grading.fallback_confidence),
            ("external_confidence", self.grading.external_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(AnalyzerError::invalid(format!(
                    "{} must be within 0-1, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("Ignoring unparseable value '{}' for {}", raw, key);
            None
        }
    }
}
