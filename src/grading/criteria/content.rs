//! Content quality: rewards length and lexical complexity.

use crate::grading::criteria::ScoreCard;
use crate::models::ContentStatistics;

const BASE: i32 = 70;

pub fn score(stats: &ContentStatistics) -> ScoreCard {
    let mut card = ScoreCard::new(BASE);

    match stats.word_count {
        n if n >= 200 => card.adjust(15, format!("{} words, substantial length", n)),
        n if n >= 100 => card.adjust(10, format!("{} words, adequate length", n)),
        n if n < 50 => card.adjust(-20, format!("{} words, too short", n)),
        _ => {}
    }

    let complexity = stats.complexity_score;
    if complexity >= 70.0 {
        card.adjust(10, format!("complexity {:.1}, rich vocabulary", complexity));
    } else if complexity < 40.0 {
        card.adjust(-10, format!("complexity {:.1}, simple vocabulary", complexity));
    }

    card
}
