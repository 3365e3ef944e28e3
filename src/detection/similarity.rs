//! Word-overlap similarity between a submission and reference texts.

use std::collections::HashSet;

use crate::analysis::normalized_words;

/// Lower-cased, punctuation-stripped word set.
pub fn word_set(text: &str) -> HashSet<String> {
    normalized_words(text).into_iter().collect()
}

/// Space-joined word n-grams of `tokens`. Empty when there are fewer than
/// `n` tokens.
pub fn ngram_set(tokens: &[String], n: usize) -> HashSet<String> {
    if n == 0 {
        return HashSet::new();
    }
    tokens.windows(n).map(|w| w.join(" ")).collect()
}

/// Jaccard similarity |A ∩ B| / |A ∪ B| in 0-1. Two empty sets score 0.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Jaccard similarity of two texts' word sets.
pub fn text_similarity(a: &str, b: &str) -> f64 {
    jaccard(&word_set(a), &word_set(b))
}

/// Word and n-gram sets of one text, built once and compared many times.
#[derive(Debug, Clone)]
pub struct TextProfile {
    pub words: HashSet<String>,
    pub ngrams: HashSet<String>,
}

impl TextProfile {
    pub fn new(text: &str, ngram: usize) -> Self {
        let tokens = normalized_words(text);
        Self {
            ngrams: ngram_set(&tokens, ngram),
            words: tokens.into_iter().collect(),
        }
    }

    pub fn similarity(&self, other: &TextProfile) -> f64 {
        jaccard(&self.words, &other.words)
    }

    /// N-gram overlap relative to the smaller text, in 0-1.
    ///
    /// Measured against the smaller set so a short passage lifted into a
    /// longer essay still scores high.
    pub fn ngram_overlap(&self, other: &TextProfile) -> f64 {
        let smaller = self.ngrams.len().min(other.ngrams.len());
        if smaller == 0 {
            return 0.0;
        }
        self.ngrams.intersection(&other.ngrams).count() as f64 / smaller as f64
    }

    /// Shared vocabulary relative to the larger vocabulary, in 0-1.
    pub fn vocabulary_overlap(&self, other: &TextProfile) -> f64 {
        let larger = self.words.len().max(other.words.len());
        if larger == 0 {
            return 0.0;
        }
        self.words.intersection(&other.words).count() as f64 / larger as f64
    }

    /// Whether `other` looks like a reworded copy of this text.
    ///
    /// Requires at least one n-gram on both sides; otherwise there is no
    /// phrasing to compare.
    pub fn is_paraphrase_of(&self, other: &TextProfile, threshold: f64) -> bool {
        if self.ngrams.is_empty() || other.ngrams.is_empty() {
            return false;
        }
        self.ngram_overlap(other) > threshold || self.vocabulary_overlap(other) > threshold
    }
}
