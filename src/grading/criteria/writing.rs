//! Grammar and writing: rewards moderate sentence length and readable prose.

use crate::grading::criteria::ScoreCard;
use crate::models::ContentStatistics;

const BASE: i32 = 75;

pub fn score(stats: &ContentStatistics) -> ScoreCard {
    let mut card = ScoreCard::new(BASE);

    let avg = stats.avg_words_per_sentence;
    if (10.0..=25.0).contains(&avg) {
        card.adjust(15, format!("{:.1} words per sentence", avg));
    } else if avg < 5.0 {
        card.adjust(-15, format!("{:.1} words per sentence, fragmented", avg));
    }

    let readability = stats.readability_score;
    if readability >= 60.0 {
        card.adjust(10, format!("readability {:.1}", readability));
    } else if readability < 30.0 {
        card.adjust(-10, format!("readability {:.1}, hard to read", readability));
    }

    card
}
