//! Plagiarism and AI-content detection.
//!
//! Similarity is the Jaccard overlap of word sets between the submission and
//! each reference. A submission is flagged when the highest similarity exceeds
//! the configured threshold or the AI-content check labels it generated.
//! Each reference is also checked for paraphrasing (shared word n-grams or
//! vocabulary); that is reported per reference and does not affect flagging.

pub mod ai;
pub mod similarity;

use std::collections::HashSet;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::DetectionConfig;
use crate::error::{AnalyzerError, AnalyzerResult};
use crate::models::ReferenceText;
use crate::utils::{preview, round2};

pub use ai::{detect_ai_content, AiDetection, AiIndicators};
pub use similarity::{jaccard, ngram_set, text_similarity, word_set, TextProfile};

/// Reported in [`PlagiarismResult::detection_method`].
pub const DETECTION_METHOD: &str = "jaccard_word_overlap+ngram_paraphrase+stylometric_indicators";

/// Similarity against one reference, 0-100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSimilarity {
    pub reference_id: String,
    pub similarity: f64,
    /// Reworded overlap with this reference.
    pub paraphrase: bool,
}

/// A reference similar enough to report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub reference_id: String,
    /// Similarity 0-100.
    pub similarity: f64,
    pub paraphrase: bool,
    /// Start of the submission text.
    pub preview: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlagiarismResult {
    /// Highest similarity over all references, 0-100.
    pub highest_similarity: f64,
    /// One entry per reference, in input order.
    pub similarity_scores: Vec<ReferenceSimilarity>,
    /// References at or above the match floor, most similar first.
    pub matches: Vec<Match>,
    pub ai_detection: AiDetection,
    pub flagged: bool,
    pub detection_method: String,
}

/// Compare `text` against `references` and run the AI-content check.
///
/// Fails only on a reference with an empty id.
pub fn detect_plagiarism(
    text: &str,
    references: &[ReferenceText],
    config: &DetectionConfig,
) -> AnalyzerResult<PlagiarismResult> {
    if let Some(pos) = references.iter().position(|r| r.id.trim().is_empty()) {
        return Err(AnalyzerError::invalid(format!(
            "reference at index {} has an empty id",
            pos
        )));
    }

    let submission = TextProfile::new(text, config.paraphrase_ngram);
    let comparisons: Vec<Comparison> = references
        .iter()
        .map(|r| {
            let profile = TextProfile::new(&r.text, config.paraphrase_ngram);
            Comparison {
                fraction: submission.similarity(&profile),
                paraphrase: submission.is_paraphrase_of(&profile, config.paraphrase_threshold),
            }
        })
        .collect();

    let highest = comparisons.iter().map(|c| c.fraction).fold(0.0_f64, f64::max);
    // Flag on the reported value so the two always agree
    let highest_similarity = round2(highest * 100.0);

    let similarity_scores = references
        .iter()
        .zip(&comparisons)
        .map(|(r, c)| ReferenceSimilarity {
            reference_id: r.id.clone(),
            similarity: round2(c.fraction * 100.0),
            paraphrase: c.paraphrase,
        })
        .collect();

    let matches = rank_matches(text, references, &comparisons, config);

    let ai_detection = detect_ai_content(text, config);
    let flagged =
        highest_similarity / 100.0 > config.similarity_threshold || ai_detection.is_ai_generated;

    debug!(
        "Plagiarism check: {} references, highest {:.2}, {} matches, {} paraphrased, flagged {}",
        references.len(),
        highest,
        matches.len(),
        comparisons.iter().filter(|c| c.paraphrase).count(),
        flagged
    );

    Ok(PlagiarismResult {
        highest_similarity,
        similarity_scores,
        matches,
        ai_detection,
        flagged,
        detection_method: DETECTION_METHOD.to_string(),
    })
}

struct Comparison {
    fraction: f64,
    paraphrase: bool,
}

fn rank_matches(
    text: &str,
    references: &[ReferenceText],
    comparisons: &[Comparison],
    config: &DetectionConfig,
) -> Vec<Match> {
    let mut ranked: Vec<(usize, f64)> = comparisons
        .iter()
        .map(|c| c.fraction)
        .enumerate()
        .filter(|&(_, f)| f >= config.match_floor && f > 0.0)
        .collect();
    // Stable sort keeps input order on ties
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let excerpt = preview(text, config.preview_chars);
    ranked
        .into_iter()
        .map(|(idx, f)| Match {
            reference_id: references[idx].id.clone(),
            similarity: round2(f * 100.0),
            paraphrase: comparisons[idx].paraphrase,
            preview: excerpt.clone(),
        })
        .collect()
}

/// Ids that appear more than once among `references`.
pub fn duplicate_reference_ids(references: &[ReferenceText]) -> Vec<&str> {
    let mut seen = HashSet::new();
    let mut dupes = Vec::new();
    for r in references {
        if !seen.insert(r.id.as_str()) && !dupes.contains(&r.id.as_str()) {
            dupes.push(r.id.as_str());
        }
    }
    dupes
}
