//! Keyword-bag tone classifier.
//!
//! This is a counting heuristic, not a statistical model. Keywords match as
//! substrings, so "goodness" counts as "good" and "problems" as "problem".

use crate::models::Sentiment;

const POSITIVE_WORDS: &[&str] = &[
    "good",
    "great",
    "excellent",
    "positive",
    "beneficial",
    "effective",
    "successful",
    "improved",
    "amazing",
    "wonderful",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad",
    "poor",
    "negative",
    "harmful",
    "ineffective",
    "problem",
    "failed",
    "worse",
    "terrible",
    "awful",
];

/// Occurrences of each keyword list in the text, case-insensitive.
pub fn keyword_counts(text: &str) -> (usize, usize) {
    let lower = text.to_lowercase();
    let count = |list: &[&str]| -> usize { list.iter().map(|kw| lower.matches(kw).count()).sum() };
    (count(POSITIVE_WORDS), count(NEGATIVE_WORDS))
}

/// Majority of keyword occurrences wins; a tie is neutral.
pub fn classify_sentiment(text: &str) -> Sentiment {
    let (positive, negative) = keyword_counts(text);
    if positive > negative {
        Sentiment::Positive
    } else if negative > positive {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_majority() {
        assert_eq!(
            classify_sentiment("A great and wonderful result, with one problem."),
            Sentiment::Positive
        );
    }

    #[test]
    fn negative_majority_is_case_insensitive() {
        assert_eq!(
            classify_sentiment("TERRIBLE planning and an Awful launch."),
            Sentiment::Negative
        );
    }

    #[test]
    fn tie_is_neutral() {
        assert_eq!(
            classify_sentiment("Good ideas, bad execution."),
            Sentiment::Neutral
        );
        assert_eq!(classify_sentiment("The river flows."), Sentiment::Neutral);
    }

    #[test]
    fn overlapping_keywords_both_count() {
        // "ineffective" contains "effective": one positive, one negative hit
        assert_eq!(keyword_counts("an ineffective plan"), (1, 1));
        assert_eq!(
            classify_sentiment("an ineffective plan"),
            Sentiment::Neutral
        );
    }

    #[test]
    fn repeated_keywords_count_each_occurrence() {
        assert_eq!(keyword_counts("good good good bad"), (3, 1));
    }
}
