//! Lexical complexity: long-word ratio blended with lexical diversity.

use std::collections::HashSet;

use crate::utils::round1;

/// Words longer than this many characters count as complex.
const COMPLEX_WORD_CHARS: usize = 6;

/// complexity = 100 * (0.6 * complex ratio + 0.4 * unique ratio), one decimal.
///
/// Lengths are measured in characters. Uniqueness is case-folded. Empty input
/// scores 0.
pub fn complexity_score(words: &[&str]) -> f64 {
    if words.is_empty() {
        return 0.0;
    }

    let total = words.len() as f64;
    let complex = words
        .iter()
        .filter(|w| w.chars().count() > COMPLEX_WORD_CHARS)
        .count() as f64;
    let unique: HashSet<String> = words.iter().map(|w| w.to_lowercase()).collect();

    let complex_ratio = complex / total;
    let unique_ratio = unique.len() as f64 / total;

    round1((complex_ratio * 0.6 + unique_ratio * 0.4) * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_zero() {
        assert_eq!(complexity_score(&[]), 0.0);
    }

    #[test]
    fn all_short_unique_words() {
        // 0 complex, 4/4 unique: 0.4 * 100
        assert_eq!(complexity_score(&["the", "cat", "sat", "down"]), 40.0);
    }

    #[test]
    fn all_long_unique_words() {
        assert_eq!(
            complexity_score(&["extraordinary", "institutional", "accountability"]),
            100.0
        );
    }

    #[test]
    fn case_folded_uniqueness() {
        // 0 complex, 1 distinct of 3: 0.4 * 33.33
        assert_eq!(complexity_score(&["Dog", "dog", "DOG"]), 13.3);
    }

    #[test]
    fn counts_characters_not_bytes() {
        // "élève" is 5 characters but 7 bytes; not complex
        assert_eq!(complexity_score(&["élève"]), 40.0);
    }
}
