//! Templated feedback for a graded submission.
//!
//! Feedback is a deterministic function of the statistics, the criterion
//! scores and the overall score. The same inputs always produce the same
//! string.

use crate::grading::types::CriterionScore;
use crate::models::ContentStatistics;
use crate::utils::humanize;

/// Criterion scores at or above this are called out as strengths.
const STRENGTH_SCORE: u8 = 90;
/// Criterion scores below this are called out for improvement.
const FOCUS_SCORE: u8 = 70;
const MAX_LIST_ITEMS: usize = 5;

/// Build the feedback paragraph: an opening by overall band, remarks on
/// length and readability, then per-criterion remarks in rubric order.
pub fn generate_feedback(
    stats: &ContentStatistics,
    scores: &[CriterionScore],
    overall: u8,
) -> String {
    let mut parts: Vec<String> = vec![opening(overall).to_string()];

    if stats.word_count < 100 {
        parts.push("Consider expanding your content to provide more detail and depth.".to_string());
    } else if stats.word_count > 1000 {
        parts.push(
            "Your content is quite comprehensive. Consider being more concise where possible."
                .to_string(),
        );
    }

    if stats.readability_score < 40.0 {
        parts.push("Consider using simpler sentence structures to improve readability.".to_string());
    } else if stats.readability_score > 80.0 {
        parts.push("Your writing is very clear and easy to understand.".to_string());
    }

    for score in scores {
        let name = humanize(&score.criterion);
        if score.score < FOCUS_SCORE {
            parts.push(format!("Focus on improving {}.", name));
        } else if score.score >= STRENGTH_SCORE {
            parts.push(format!("Excellent work on {}!", name));
        }
    }

    parts.join(" ")
}

fn opening(overall: u8) -> &'static str {
    match overall {
        90.. => "Excellent work! Your submission demonstrates outstanding understanding and quality.",
        80..=89 => {
            "Good work! Your submission shows solid understanding with room for minor improvements."
        }
        70..=79 => "Satisfactory work. Consider addressing the areas mentioned below.",
        60..=69 => {
            "Needs improvement. Please review the requirements and revise your submission."
        }
        _ => "Significant improvement needed. Please review the requirements and resubmit.",
    }
}

/// Criteria the student did well on, at most five.
pub fn strengths(scores: &[CriterionScore], overall: u8) -> Vec<String> {
    let mut items: Vec<String> = scores
        .iter()
        .filter(|s| s.score >= STRENGTH_SCORE)
        .map(|s| format!("Excellent {}", humanize(&s.criterion)))
        .take(MAX_LIST_ITEMS)
        .collect();

    if items.is_empty() && overall >= 70 {
        items.push("Solid foundational understanding".to_string());
    }
    items
}

/// Criteria that need work, at most five.
pub fn improvements(scores: &[CriterionScore], overall: u8) -> Vec<String> {
    let mut items: Vec<String> = scores
        .iter()
        .filter(|s| s.score < FOCUS_SCORE)
        .map(|s| format!("Focus on improving {}", humanize(&s.criterion)))
        .take(MAX_LIST_ITEMS)
        .collect();

    if items.is_empty() && overall < 95 {
        items.push("Continue refining writing skills".to_string());
    }
    items
}
