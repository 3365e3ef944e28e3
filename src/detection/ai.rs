//! Stylometric indicators of machine-generated text.
//!
//! Five independent indicators are computed; text is labelled AI-generated
//! when the fraction of indicators that fire exceeds the configured ratio
//! (0.6 by default, so four of five). These are weak signals and the result
//! is advisory.

use std::collections::HashSet;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::analysis::{count_phrase, normalized_words, sentences, words};
use crate::config::DetectionConfig;
use crate::utils::round2;

const FORMAL_CONNECTIVES: &[&str] = &[
    "furthermore",
    "moreover",
    "consequently",
    "therefore",
    "thus",
    "hence",
];

const PERSONAL_PHRASES: &[&str] = &["i think", "i believe", "in my opinion", "personally", "i feel"];

const GENERIC_TRANSITIONS: &[&str] = &[
    "first",
    "second",
    "third",
    "finally",
    "in conclusion",
    "to begin with",
];

/// Words with more characters than this take part in the repetition check.
const REPETITION_MIN_CHARS: usize = 3;

/// Which indicators fired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiIndicators {
    pub repetitive_phrases: bool,
    pub overly_formal: bool,
    pub lack_of_personal_voice: bool,
    pub perfect_structure: bool,
    pub generic_transitions: bool,
}

impl AiIndicators {
    pub const TOTAL: usize = 5;

    pub fn count(&self) -> usize {
        [
            self.repetitive_phrases,
            self.overly_formal,
            self.lack_of_personal_voice,
            self.perfect_structure,
            self.generic_transitions,
        ]
        .iter()
        .filter(|&&fired| fired)
        .count()
    }

    /// Names of the indicators that fired, in declaration order.
    pub fn fired(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.repetitive_phrases {
            out.push("repetitive_phrases");
        }
        if self.overly_formal {
            out.push("overly_formal");
        }
        if self.lack_of_personal_voice {
            out.push("lack_of_personal_voice");
        }
        if self.perfect_structure {
            out.push("perfect_structure");
        }
        if self.generic_transitions {
            out.push("generic_transitions");
        }
        out
    }
}

/// Outcome of the AI-content check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiDetection {
    pub is_ai_generated: bool,
    /// Fraction of indicators that fired, 0-100.
    pub confidence: f64,
    pub indicators: AiIndicators,
    /// False when the text was too short to assess.
    pub assessed: bool,
}

impl AiDetection {
    /// Neutral result for text below the minimum length.
    pub fn not_assessed() -> Self {
        Self {
            is_ai_generated: false,
            confidence: 0.0,
            indicators: AiIndicators::default(),
            assessed: false,
        }
    }

    /// Label from a set of indicators.
    pub fn classify(indicators: AiIndicators, config: &DetectionConfig) -> Self {
        let ratio = indicators.count() as f64 / AiIndicators::TOTAL as f64;
        Self {
            is_ai_generated: ratio > config.ai_ratio_threshold,
            confidence: round2(ratio * 100.0),
            indicators,
            assessed: true,
        }
    }
}

/// Compute all five indicators for `text`.
pub fn compute_indicators(text: &str, config: &DetectionConfig) -> AiIndicators {
    let tokens = normalized_words(text);
    let sentence_lengths: Vec<f64> = sentences(text)
        .iter()
        .map(|s| words(s).len() as f64)
        .collect();

    let per_100_words = |count: usize| {
        if tokens.is_empty() {
            0.0
        } else {
            count as f64 / tokens.len() as f64 * 100.0
        }
    };
    let phrase_total =
        |phrases: &[&str]| -> usize { phrases.iter().map(|p| count_phrase(&tokens, p)).sum() };

    let long_words: Vec<&str> = tokens
        .iter()
        .map(String::as_str)
        .filter(|w| w.chars().count() > REPETITION_MIN_CHARS)
        .collect();
    let repetitive_phrases = if long_words.is_empty() {
        false
    } else {
        let distinct: HashSet<&str> = long_words.iter().copied().collect();
        (distinct.len() as f64 / long_words.len() as f64) < config.repetition_ratio
    };

    let overly_formal = per_100_words(phrase_total(FORMAL_CONNECTIVES)) > config.formal_per_100_words;

    let lack_of_personal_voice =
        per_100_words(phrase_total(PERSONAL_PHRASES)) < config.personal_per_100_words;

    let perfect_structure = sentence_lengths.len() >= 3
        && population_variance(&sentence_lengths) < config.sentence_variance;

    let generic_transitions = if sentence_lengths.is_empty() {
        false
    } else {
        let per_10 = phrase_total(GENERIC_TRANSITIONS) as f64 / sentence_lengths.len() as f64 * 10.0;
        per_10 > config.transitions_per_10_sentences
    };

    let indicators = AiIndicators {
        repetitive_phrases,
        overly_formal,
        lack_of_personal_voice,
        perfect_structure,
        generic_transitions,
    };
    debug!("AI indicators fired: {:?}", indicators.fired());
    indicators
}

/// Assess `text`, returning a neutral result when it is too short.
pub fn detect_ai_content(text: &str, config: &DetectionConfig) -> AiDetection {
    let word_count = words(text).len();
    if word_count < config.min_words {
        debug!(
            "Skipping AI detection: {} words below minimum {}",
            word_count, config.min_words
        );
        return AiDetection::not_assessed();
    }
    AiDetection::classify(compute_indicators(text, config), config)
}

fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / values.len() as f64
}
