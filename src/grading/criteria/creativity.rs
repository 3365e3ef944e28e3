//! Creativity and originality: rewards varied vocabulary and a definite tone.

use crate::grading::criteria::ScoreCard;
use crate::models::{ContentStatistics, Sentiment};

const BASE: i32 = 70;

pub fn score(stats: &ContentStatistics) -> ScoreCard {
    let mut card = ScoreCard::new(BASE);

    let complexity = stats.complexity_score;
    if complexity >= 60.0 {
        card.adjust(20, format!("complexity {:.1}, varied vocabulary", complexity));
    } else if complexity < 30.0 {
        card.adjust(-15, format!("complexity {:.1}, repetitive vocabulary", complexity));
    }

    if stats.sentiment != Sentiment::Neutral {
        card.adjust(10, format!("{} tone", stats.sentiment));
    }

    card
}
