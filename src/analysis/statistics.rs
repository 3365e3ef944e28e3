//! Word and sentence counts with a Flesch-style readability estimate.

use log::debug;

use super::{sentences, words};
use crate::config::StatisticsConfig;
use crate::utils::round1;

/// Counts and readability for a text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStatistics {
    pub word_count: usize,
    pub sentence_count: usize,
    pub avg_words_per_sentence: f64,
    pub avg_syllables_per_word: f64,
    pub readability_score: f64,
}

/// Extract counts and readability.
///
/// readability = clamp(0, 100, 206.835 - 1.015 * words/sentence - 84.6 * syllables/word)
///
/// Syllables are averaged over the first `syllable_sample_size` words only.
/// Text without words gets the configured neutral readability.
pub fn extract_statistics(text: &str, config: &StatisticsConfig) -> TextStatistics {
    let words = words(text);
    let sentence_count = sentences(text).len();
    let word_count = words.len();

    if word_count == 0 {
        return TextStatistics {
            word_count: 0,
            sentence_count,
            avg_words_per_sentence: 0.0,
            avg_syllables_per_word: 0.0,
            readability_score: config.neutral_readability,
        };
    }

    let avg_words_per_sentence = word_count as f64 / sentence_count.max(1) as f64;

    let sample = &words[..word_count.min(config.syllable_sample_size.max(1))];
    let syllables: usize = sample.iter().map(|w| count_syllables(w)).sum();
    let avg_syllables_per_word = syllables as f64 / sample.len() as f64;

    let raw = 206.835 - 1.015 * avg_words_per_sentence - 84.6 * avg_syllables_per_word;
    let readability_score = if raw.is_finite() {
        round1(raw.clamp(0.0, 100.0))
    } else {
        debug!("Readability estimate degenerated ({}), using neutral value", raw);
        config.neutral_readability
    };

    TextStatistics {
        word_count,
        sentence_count,
        avg_words_per_sentence: round1(avg_words_per_sentence),
        avg_syllables_per_word,
        readability_score,
    }
}

/// Approximate syllables in a word by counting vowel groups.
///
/// Leading and trailing punctuation is ignored. A trailing silent `e` is
/// dropped when the word has more than one group. Letters outside `aeiouy`
/// (including non-Latin scripts) count as consonants, so every word gets at
/// least one syllable.
pub fn count_syllables(word: &str) -> usize {
    let word = word
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();

    let mut count = 0;
    let mut prev_was_vowel = false;
    for c in word.chars() {
        let is_vowel = matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
        if is_vowel && !prev_was_vowel {
            count += 1;
        }
        prev_was_vowel = is_vowel;
    }

    if word.ends_with('e') && count > 1 {
        count -= 1;
    }

    count.max(1)
}
