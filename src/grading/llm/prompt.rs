//! Prompt construction for external grading.

use crate::grading::rubric::Rubric;
use crate::models::ContentStatistics;

/// Submissions longer than this are truncated in the prompt.
const MAX_SUBMISSION_CHARS: usize = 12_000;

/// Builds a single prompt asking for a 0-100 score on every criterion.
pub fn build_grading_prompt(text: &str, stats: &ContentStatistics, rubric: &Rubric) -> String {
    let mut prompt = String::new();

    prompt.push_str(
        "You are grading a student submission against a rubric.\n\n\
         Score every criterion from 0 to 100. Criteria have different weights \
         reflecting their relative importance.\n\n\
         ## Rubric\n\n",
    );

    for criterion in rubric.iter() {
        prompt.push_str(&format!(
            "- {} (max points: {}, weight: {:.2})\n",
            criterion.name,
            criterion.max_points,
            criterion.effective_weight()
        ));
    }

    prompt.push_str(&format!(
        r#"
## Statistics

- Words: {}
- Sentences: {}
- Average words per sentence: {:.1}
- Readability: {:.1}

## Submission

```
{}
```

## Response Format

Respond with JSON only:

```json
{{
  "scores": [
    {{"criterion": "<name exactly as listed>", "score": <0-100>, "rationale": "<one sentence>"}}
  ],
  "feedback": "<short paragraph addressed to the student>"
}}
```

Include every criterion exactly once.
"#,
        stats.word_count,
        stats.sentence_count,
        stats.avg_words_per_sentence,
        stats.readability_score,
        truncate(text, MAX_SUBMISSION_CHARS),
    ));

    prompt
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}\n... (truncated)", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::rubric::RubricCriterion;
    use crate::models::Sentiment;

    fn stats() -> ContentStatistics {
        ContentStatistics {
            word_count: 4,
            sentence_count: 1,
            avg_words_per_sentence: 4.0,
            readability_score: 90.0,
            sentiment: Sentiment::Neutral,
            complexity_score: 40.0,
        }
    }

    #[test]
    fn lists_every_criterion_in_order() {
        let rubric = Rubric::new()
            .with_criterion(RubricCriterion::new("content_quality", 40))
            .with_criterion(RubricCriterion::new("grammar", 60));
        let prompt = build_grading_prompt("The essay text.", &stats(), &rubric);

        let content = prompt.find("- content_quality (max points: 40").unwrap();
        let grammar = prompt.find("- grammar (max points: 60").unwrap();
        assert!(content < grammar);
        assert!(prompt.contains("The essay text."));
        assert!(prompt.contains("\"scores\""));
    }

    #[test]
    fn truncates_long_submissions() {
        let text = "word ".repeat(5000);
        let out = truncate(&text, 100);
        assert!(out.ends_with("(truncated)"));
        assert_eq!(truncate("short", 100), "short");
    }
}
