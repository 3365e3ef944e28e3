//! Text statistics shared by grading and detection.
//!
//! Everything here is a pure function of the input text. The submodules are the
//! leaves of the analyzer: counting and readability, keyword sentiment, and
//! lexical complexity. `code` holds the separate checks for programming
//! submissions.

pub mod code;
pub mod complexity;
pub mod sentiment;
pub mod statistics;

pub use code::{analyze_code, CodeAnalysis};
pub use complexity::complexity_score;
pub use sentiment::classify_sentiment;
pub use statistics::{count_syllables, extract_statistics, TextStatistics};

use crate::config::StatisticsConfig;
use crate::models::ContentStatistics;

/// Whitespace-delimited words, empty tokens discarded.
pub fn words(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Sentences split on `.`, `!` and `?`, trimmed, whitespace-only segments dropped.
pub fn sentences(text: &str) -> Vec<&str> {
    text.split(|c: char| matches!(c, '.' | '!' | '?'))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Lower-cased words with punctuation removed, for set and phrase comparisons.
pub fn normalized_words(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| {
            w.chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(char::to_lowercase)
                .collect::<String>()
        })
        .filter(|w| !w.is_empty())
        .collect()
}

/// Count occurrences of a (possibly multi-word) phrase on word boundaries.
///
/// `tokens` must come from [`normalized_words`]; `phrase` is matched
/// case-insensitively.
pub fn count_phrase(tokens: &[String], phrase: &str) -> usize {
    let needle: Vec<String> = phrase.split_whitespace().map(str::to_lowercase).collect();
    if needle.is_empty() || needle.len() > tokens.len() {
        return 0;
    }
    tokens
        .windows(needle.len())
        .filter(|window| window.iter().zip(&needle).all(|(a, b)| a == b))
        .count()
}

/// Compute the full statistics record for a text.
///
/// Never fails: empty or unusual input degrades to neutral values.
pub fn analyze_content(text: &str, config: &StatisticsConfig) -> ContentStatistics {
    let stats = extract_statistics(text, config);
    let tokens = words(text);

    ContentStatistics {
        word_count: stats.word_count,
        sentence_count: stats.sentence_count,
        avg_words_per_sentence: stats.avg_words_per_sentence,
        readability_score: stats.readability_score,
        sentiment: classify_sentiment(text),
        complexity_score: complexity_score(&tokens),
    }
}
