//! End-to-end checks of the analyzer's public API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use gradekit::cache::AnalysisCache;
use gradekit::grading::{Rubric, RubricCriterion};
use gradekit::llm::{LlmClient, LlmError};
use gradekit::models::GradingMethod;
use gradekit::{Analyzer, AnalyzerConfig, AnalyzerError, ReferenceText, SubmissionText};

struct MockLlmClient {
    response: Result<String, String>,
    calls: AtomicUsize,
}

impl MockLlmClient {
    fn ok(response: &str) -> Self {
        Self {
            response: Ok(response.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    fn unavailable() -> Self {
        Self {
            response: Err("not installed".to_string()),
            calls: AtomicUsize::new(0),
        }
    }
}

impl LlmClient for MockLlmClient {
    fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone().map_err(LlmError::Unavailable)
    }
}

fn standard_rubric() -> Rubric {
    Rubric::from_json(
        r#"{"content_quality": {"max_points": 40},
            "grammar": {"max_points": 30},
            "creativity": {"max_points": 30}}"#,
    )
    .unwrap()
}

fn words(n: usize) -> String {
    let vocab = [
        "river", "stone", "bridge", "market", "lantern", "harbor", "orchard", "meadow",
    ];
    (0..n)
        .map(|i| vocab[i % vocab.len()])
        .collect::<Vec<_>>()
        .join(" ")
}

#[test]
fn statistics_are_bounded_and_idempotent() {
    let analyzer = Analyzer::default();
    for text in [
        "",
        "The cat sat.",
        "Supercalifragilisticexpialidocious antidisestablishmentarianism.",
        "Ünïcödé текст 日本語!!! ???",
        &words(500),
    ] {
        let a = analyzer.analyze_content(text).unwrap();
        let b = analyzer.analyze_content(text).unwrap();
        assert_eq!(a, b);
        assert!((0.0..=100.0).contains(&a.readability_score), "{}", text);
        assert!((0.0..=100.0).contains(&a.complexity_score), "{}", text);
    }
}

#[test]
fn the_cat_sat() {
    let stats = Analyzer::default().analyze_content("The cat sat.").unwrap();
    assert_eq!(stats.word_count, 3);
    assert_eq!(stats.sentence_count, 1);
    assert_eq!(stats.avg_words_per_sentence, 3.0);
    assert_eq!(stats.readability_score, 100.0);
}

#[test]
fn content_quality_monotonic_in_length() {
    let analyzer = Analyzer::default();
    let rubric = Rubric::new().with_criterion(RubricCriterion::new("content_quality", 100));

    let scores: Vec<u8> = [40, 60, 120, 250]
        .iter()
        .map(|&n| {
            analyzer
                .grade_submission(&words(n), &rubric)
                .unwrap()
                .overall_score
        })
        .collect();

    assert!(scores.windows(2).all(|w| w[0] <= w[1]), "{:?}", scores);
    assert!(scores[0] < scores[3]);
}

#[test]
fn overall_score_bounds_and_empty_rubric() {
    let analyzer = Analyzer::default();

    let empty = analyzer.grade_submission("Any text at all.", &Rubric::new()).unwrap();
    assert_eq!(empty.overall_score, 70);
    assert!(empty.criterion_scores.is_empty());

    for n in [0, 5, 80, 400] {
        let result = analyzer.grade_submission(&words(n), &standard_rubric()).unwrap();
        assert!(result.overall_score <= 100);
        assert!(result.criterion_scores.iter().all(|s| s.score <= 100));
    }
}

#[test]
fn criterion_scores_follow_rubric_order() {
    let result = Analyzer::default()
        .grade_submission(&words(150), &standard_rubric())
        .unwrap();
    let names: Vec<_> = result
        .criterion_scores
        .iter()
        .map(|s| s.criterion.as_str())
        .collect();
    assert_eq!(names, vec!["content_quality", "grammar", "creativity"]);

    let json = serde_json::to_string(&result).unwrap();
    let content = json.find("\"content_quality\":").unwrap();
    let creativity = json.find("\"creativity\":").unwrap();
    assert!(content < creativity);
}

#[test]
fn identical_reference_is_flagged() {
    let text = words(60);
    let refs = vec![ReferenceText::new("prior-2023", text.clone())];
    let result = Analyzer::default().detect_plagiarism(&text, &refs).unwrap();

    assert_eq!(result.highest_similarity, 100.0);
    assert!(result.flagged);
    assert_eq!(result.matches[0].reference_id, "prior-2023");
}

#[test]
fn no_references_means_no_matches() {
    let result = Analyzer::default()
        .detect_plagiarism(&words(60), &[])
        .unwrap();
    assert_eq!(result.highest_similarity, 0.0);
    assert!(result.matches.is_empty());
}

#[test]
fn formal_impersonal_essay_indicators() {
    let body = "Public transport networks reduce congestion and lower emissions \
                when cities invest in frequent reliable service for commuters";
    let text = (0..15)
        .map(|i| {
            let lead = if i % 5 == 1 { "Furthermore" } else { "Indeed" };
            format!("{} {}.", lead, body)
        })
        .collect::<Vec<_>>()
        .join(" ");

    let result = Analyzer::default().detect_plagiarism(&text, &[]).unwrap();
    let indicators = result.ai_detection.indicators;

    assert!(result.ai_detection.assessed);
    assert!(indicators.overly_formal);
    assert!(indicators.lack_of_personal_voice);
}

#[test]
fn uniform_formal_essay_is_flagged_as_ai_without_references() {
    let body = "The committee reviewed the annual budget and approved new funding \
                for public libraries across several rural districts this year";
    let leads = ["Furthermore", "Moreover", "Consequently", "Meanwhile"];
    let text = (0..15)
        .map(|i| format!("{} {}.", leads[i % leads.len()], body))
        .collect::<Vec<_>>()
        .join(" ");

    let result = Analyzer::default().detect_plagiarism(&text, &[]).unwrap();
    let detection = &result.ai_detection;

    assert_eq!(
        detection.indicators.fired(),
        vec![
            "repetitive_phrases",
            "overly_formal",
            "lack_of_personal_voice",
            "perfect_structure",
        ]
    );
    assert!(detection.is_ai_generated);
    assert_eq!(detection.confidence, 80.0);
    assert_eq!(result.highest_similarity, 0.0);
    assert!(result.matches.is_empty());
    // Flagged on the AI label alone
    assert!(result.flagged);
}

#[test]
fn external_provider_unavailable_falls_back() {
    let client = Arc::new(MockLlmClient::unavailable());
    let analyzer = Analyzer::default().with_llm_client(client.clone());

    let result = analyzer
        .grade_submission(&words(150), &standard_rubric())
        .unwrap();

    assert_eq!(result.grading_method, GradingMethod::HeuristicFallback);
    assert_eq!(result.confidence, 0.7);
    assert_eq!(result.criterion_scores.len(), 3);
    // Unavailable is not retried
    assert_eq!(client.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn external_provider_scores_are_used() {
    let client = Arc::new(MockLlmClient::ok(
        r#"```json
{"scores": [
  {"criterion": "content_quality", "score": 100},
  {"criterion": "grammar", "score": 100},
  {"criterion": "creativity", "score": 100}
]}
```"#,
    ));
    let result = Analyzer::default()
        .with_llm_client(client)
        .grade_submission(&words(30), &standard_rubric())
        .unwrap();

    assert_eq!(result.grading_method, GradingMethod::External);
    assert_eq!(result.overall_score, 100);
    assert!(result.feedback.starts_with("Excellent work!"));
}

#[test]
fn shared_analyzer_with_cache_across_threads() {
    let cache = Arc::new(AnalysisCache::new());
    let analyzer = Arc::new(Analyzer::default().with_cache(cache.clone()));
    let text = Arc::new(words(200));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let analyzer = Arc::clone(&analyzer);
            let text = Arc::clone(&text);
            thread::spawn(move || {
                analyzer
                    .grade_submission(&text, &standard_rubric())
                    .unwrap()
                    .overall_score
            })
        })
        .collect();

    let scores: Vec<u8> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(scores.windows(2).all(|w| w[0] == w[1]));

    let stats = cache.grading.stats();
    assert_eq!(stats.hits + stats.misses, 4);
    assert_eq!(stats.entries, 1);
}

#[test]
fn invalid_inputs_are_rejected() {
    let analyzer = Analyzer::default();

    assert!(matches!(
        Rubric::from_json(r#"{"content": {"max_points": 0}}"#),
        Err(AnalyzerError::InvalidInput(_))
    ));
    assert!(matches!(
        SubmissionText::from_json(r#"{"content": null, "assignment_id": "a", "student_id": "s"}"#),
        Err(AnalyzerError::InvalidInput(_))
    ));
    assert!(matches!(
        analyzer.detect_plagiarism("text", &[ReferenceText::new("", "x")]),
        Err(AnalyzerError::InvalidInput(_))
    ));
    assert!(matches!(
        analyzer.grade_submission_scaled("text", &standard_rubric(), -5.0),
        Err(AnalyzerError::InvalidInput(_))
    ));
}

#[test]
fn config_changes_neutral_score() {
    let analyzer = Analyzer::new(AnalyzerConfig::new().with_neutral_score(55));
    let result = analyzer.grade_submission("Some text.", &Rubric::new()).unwrap();
    assert_eq!(result.overall_score, 55);
}
