//! Entry point for hosts: statistics, grading and plagiarism checks.

use std::sync::Arc;
use std::time::Instant;

use log::{debug, info, warn};

use crate::analysis::{self, CodeAnalysis};
use crate::cache::{self, AnalysisCache};
use crate::config::AnalyzerConfig;
use crate::detection::{self, duplicate_reference_ids, PlagiarismResult};
use crate::error::{AnalyzerError, AnalyzerResult};
use crate::grading::llm::LlmGrader;
use crate::grading::{grade_heuristic, GradeSheet, GradingResult, Rubric};
use crate::llm::LlmClient;
use crate::models::{ContentStatistics, GradingMethod, ReferenceText, SubmissionText};
use crate::utils::round2;

/// Reported as `model_used` for locally graded results.
pub const HEURISTIC_MODEL: &str = "heuristic";

/// Heuristic submission analyzer.
///
/// Stateless apart from the optional injected cache, so one instance can be
/// shared across threads behind an `Arc`.
pub struct Analyzer {
    config: AnalyzerConfig,
    cache: Option<Arc<AnalysisCache>>,
    grader: Option<LlmGrader>,
    /// Mixed into every cache key; see [`cache::analyzer_fingerprint`].
    fingerprint: u64,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        let fingerprint = cache::analyzer_fingerprint(&config, None);
        Self {
            config,
            cache: None,
            grader: None,
            fingerprint,
        }
    }

    /// Memoize grading and plagiarism results in `cache`.
    pub fn with_cache(mut self, cache: Arc<AnalysisCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Grade through an external provider, falling back to heuristics when it
    /// fails.
    pub fn with_llm_client(mut self, client: Arc<dyn LlmClient>) -> Self {
        let grader = LlmGrader::new(client, self.config.grading.external_confidence);
        self.fingerprint = cache::analyzer_fingerprint(&self.config, Some(&grader.model_name()));
        self.grader = Some(grader);
        self
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn cache(&self) -> Option<&Arc<AnalysisCache>> {
        self.cache.as_ref()
    }

    /// Word, sentence, readability, sentiment and complexity statistics.
    pub fn analyze_content(&self, text: &str) -> AnalyzerResult<ContentStatistics> {
        Ok(analysis::analyze_content(text, &self.config.statistics))
    }

    /// Comment, complexity, naming, requirement, delimiter and indentation
    /// checks for a programming submission.
    ///
    /// Each requirement is a keyword expected somewhere in `code`; blank
    /// requirements are rejected because they would always match.
    pub fn analyze_code(
        &self,
        code: &str,
        requirements: &[String],
    ) -> AnalyzerResult<CodeAnalysis> {
        if let Some(pos) = requirements.iter().position(|r| r.trim().is_empty()) {
            return Err(AnalyzerError::invalid(format!(
                "requirement at index {} is blank",
                pos
            )));
        }
        Ok(analysis::analyze_code(code, requirements))
    }

    /// Score `text` against every criterion of `rubric`.
    pub fn grade_submission(&self, text: &str, rubric: &Rubric) -> AnalyzerResult<GradingResult> {
        self.grade_inner(text, rubric, None)
    }

    /// Like [`grade_submission`](Self::grade_submission), also reporting the
    /// overall score scaled to `max_score`.
    pub fn grade_submission_scaled(
        &self,
        text: &str,
        rubric: &Rubric,
        max_score: f64,
    ) -> AnalyzerResult<GradingResult> {
        if !max_score.is_finite() || max_score <= 0.0 {
            return Err(AnalyzerError::invalid(format!(
                "max score must be positive, got {}",
                max_score
            )));
        }
        self.grade_inner(text, rubric, Some(max_score))
    }

    /// Grade a submission record, logging who it belongs to.
    pub fn grade(
        &self,
        submission: &SubmissionText,
        rubric: &Rubric,
    ) -> AnalyzerResult<GradingResult> {
        info!(
            "Grading submission for assignment {} by student {}",
            submission.assignment_id, submission.student_id
        );
        let result = self.grade_submission(&submission.content, rubric)?;
        info!(
            "Graded assignment {} for student {}: {} ({})",
            submission.assignment_id,
            submission.student_id,
            result.overall_score,
            result.grading_method
        );
        Ok(result)
    }

    /// Compare `text` against `references` and check for AI-generated content.
    pub fn detect_plagiarism(
        &self,
        text: &str,
        references: &[ReferenceText],
    ) -> AnalyzerResult<PlagiarismResult> {
        let dupes = duplicate_reference_ids(references);
        if !dupes.is_empty() {
            warn!("Duplicate reference ids: {}", dupes.join(", "));
        }

        let compute = || detection::detect_plagiarism(text, references, &self.config.detection);
        match &self.cache {
            Some(cache) => cache
                .plagiarism
                .get_or_try_insert_with(
                    cache::detection_key(self.fingerprint, text, references),
                    compute,
                ),
            None => compute(),
        }
    }

    fn grade_inner(
        &self,
        text: &str,
        rubric: &Rubric,
        max_score: Option<f64>,
    ) -> AnalyzerResult<GradingResult> {
        rubric.validate()?;

        let compute = || Ok(self.compute_grading(text, rubric, max_score));
        match &self.cache {
            // A fallback result reflects a provider outage, not the submission,
            // so the next call must try the provider again.
            Some(cache) => cache.grading.get_or_try_insert_when(
                cache::grading_key(self.fingerprint, text, rubric, max_score),
                compute,
                |result| result.grading_method != GradingMethod::HeuristicFallback,
            ),
            None => compute(),
        }
    }

    fn compute_grading(&self, text: &str, rubric: &Rubric, max_score: Option<f64>) -> GradingResult {
        let start = Instant::now();
        let grading = &self.config.grading;
        let stats = analysis::analyze_content(text, &self.config.statistics);

        let (sheet, method, confidence, model) = match &self.grader {
            Some(grader) => match grader.grade(text, &stats, rubric) {
                Ok(parsed) => (
                    GradeSheet::from_scores(&stats, parsed.scores, parsed.feedback, grading),
                    GradingMethod::External,
                    grading.external_confidence,
                    grader.model_name(),
                ),
                Err(e) => {
                    warn!("External grading failed, using heuristics: {}", e);
                    (
                        grade_heuristic(&stats, rubric, grading),
                        GradingMethod::HeuristicFallback,
                        grading.fallback_confidence,
                        HEURISTIC_MODEL.to_string(),
                    )
                }
            },
            None => (
                grade_heuristic(&stats, rubric, grading),
                GradingMethod::Heuristic,
                grading.heuristic_confidence,
                HEURISTIC_MODEL.to_string(),
            ),
        };

        let processing_time_ms = start.elapsed().as_millis() as u64;
        debug!(
            "Graded {} criteria in {}ms: overall {}",
            sheet.criterion_scores.len(),
            processing_time_ms,
            sheet.overall_score
        );

        GradingResult {
            overall_score: sheet.overall_score,
            max_score,
            scaled_score: max_score.map(|max| round2(sheet.overall_score as f64 / 100.0 * max)),
            criterion_scores: sheet.criterion_scores,
            feedback: sheet.feedback,
            strengths: sheet.strengths,
            improvements: sheet.improvements,
            content_statistics: stats,
            confidence,
            grading_method: method,
            model_used: model,
            graded_at: chrono::Utc::now().to_rfc3339(),
            processing_time_ms,
        }
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::RubricCriterion;
    use crate::llm::test_support::MockLlmClient;

    const ESSAY: &str = "Renewable energy has improved rapidly over the last decade. \
        Solar panels are cheaper and more efficient than ever before. \
        Wind turbines now supply a large share of electricity in several countries. \
        Storage remains a problem, but new battery chemistry looks promising.";

    fn rubric() -> Rubric {
        Rubric::new()
            .with_criterion(RubricCriterion::new("content_quality", 40))
            .with_criterion(RubricCriterion::new("grammar", 30))
            .with_criterion(RubricCriterion::new("creativity", 30))
    }

    #[test]
    fn heuristic_grading_by_default() {
        let result = Analyzer::default().grade_submission(ESSAY, &rubric()).unwrap();

        assert_eq!(result.grading_method, GradingMethod::Heuristic);
        assert_eq!(result.confidence, 0.85);
        assert_eq!(result.model_used, HEURISTIC_MODEL);
        assert_eq!(result.criterion_scores.len(), 3);
        assert!(result.overall_score <= 100);
        assert!(result.scaled_score.is_none());
    }

    #[test]
    fn scaled_score() {
        let result = Analyzer::default()
            .grade_submission_scaled(ESSAY, &rubric(), 50.0)
            .unwrap();
        let expected = round2(result.overall_score as f64 / 2.0);
        assert_eq!(result.scaled_score, Some(expected));
        assert_eq!(result.max_score, Some(50.0));
    }

    #[test]
    fn rejects_non_positive_max_score() {
        let analyzer = Analyzer::default();
        assert!(analyzer.grade_submission_scaled(ESSAY, &rubric(), 0.0).is_err());
        assert!(analyzer
            .grade_submission_scaled(ESSAY, &rubric(), f64::NAN)
            .is_err());
    }

    #[test]
    fn rejects_invalid_rubric() {
        let rubric = Rubric::new().with_criterion(RubricCriterion::new("content", 0));
        let err = Analyzer::default().grade_submission(ESSAY, &rubric).unwrap_err();
        assert!(matches!(err, AnalyzerError::InvalidInput(_)));
    }

    #[test]
    fn external_grading_with_mock() {
        let client = Arc::new(MockLlmClient::new(
            r#"{"scores": [
                {"criterion": "content_quality", "score": 91, "rationale": "Clear"},
                {"criterion": "grammar", "score": 80, "rationale": "Clean"},
                {"criterion": "creativity", "score": 60, "rationale": "Plain"}
            ], "feedback": "Solid overview."}"#,
        ));
        let analyzer = Analyzer::default().with_llm_client(client);

        let result = analyzer.grade_submission(ESSAY, &rubric()).unwrap();

        assert_eq!(result.grading_method, GradingMethod::External);
        assert_eq!(result.confidence, 0.9);
        assert_eq!(result.model_used, "mock");
        assert_eq!(result.feedback, "Solid overview.");
        assert_eq!(result.score_for("grammar").unwrap().score, 80);
        // (91*0.4 + 80*0.3 + 60*0.3) / 1.0 = 78.4
        assert_eq!(result.overall_score, 78);
    }

    #[test]
    fn provider_failure_falls_back_to_heuristics() {
        let client = Arc::new(MockLlmClient::failing("connection refused"));
        let analyzer = Analyzer::default().with_llm_client(client.clone());

        let result = analyzer.grade_submission(ESSAY, &rubric()).unwrap();
        let heuristic = Analyzer::default().grade_submission(ESSAY, &rubric()).unwrap();

        assert_eq!(result.grading_method, GradingMethod::HeuristicFallback);
        assert_eq!(result.confidence, 0.7);
        assert_eq!(result.overall_score, heuristic.overall_score);
        assert_eq!(result.criterion_scores, heuristic.criterion_scores);
        assert_eq!(client.calls(), 3);
    }

    #[test]
    fn cache_hit_returns_identical_result() {
        let cache = Arc::new(AnalysisCache::new());
        let analyzer = Analyzer::default().with_cache(cache.clone());

        let first = analyzer.grade_submission(ESSAY, &rubric()).unwrap();
        let second = analyzer.grade_submission(ESSAY, &rubric()).unwrap();

        assert_eq!(first, second);
        assert_eq!(cache.grading.stats().hits, 1);
        assert_eq!(cache.grading.stats().misses, 1);
    }

    #[test]
    fn fallback_results_are_not_cached() {
        let cache = Arc::new(AnalysisCache::new());
        let client = Arc::new(MockLlmClient::sequence(vec![
            Err("timeout".to_string()),
            Err("timeout".to_string()),
            Err("timeout".to_string()),
            Ok(r#"{"scores": [
                {"criterion": "content_quality", "score": 90},
                {"criterion": "grammar", "score": 90},
                {"criterion": "creativity", "score": 90}
            ]}"#
            .to_string()),
        ]));
        let analyzer = Analyzer::default()
            .with_cache(cache.clone())
            .with_llm_client(client.clone());

        let first = analyzer.grade_submission(ESSAY, &rubric()).unwrap();
        assert_eq!(first.grading_method, GradingMethod::HeuristicFallback);
        assert!(cache.grading.is_empty());

        let second = analyzer.grade_submission(ESSAY, &rubric()).unwrap();
        assert_eq!(second.grading_method, GradingMethod::External);
        assert_eq!(client.calls(), 4);

        let third = analyzer.grade_submission(ESSAY, &rubric()).unwrap();
        assert_eq!(third, second);
        assert_eq!(client.calls(), 4);
    }

    #[test]
    fn shared_cache_separates_configs() {
        let cache = Arc::new(AnalysisCache::new());
        let default = Analyzer::default().with_cache(cache.clone());
        let lenient =
            Analyzer::new(AnalyzerConfig::new().with_neutral_score(40)).with_cache(cache.clone());
        let empty = Rubric::new();

        assert_eq!(default.grade_submission(ESSAY, &empty).unwrap().overall_score, 70);
        assert_eq!(lenient.grade_submission(ESSAY, &empty).unwrap().overall_score, 40);
        assert_eq!(cache.grading.len(), 2);
    }

    #[test]
    fn shared_cache_separates_graders() {
        let cache = Arc::new(AnalysisCache::new());
        let local = Analyzer::default().with_cache(cache.clone());
        let external = Analyzer::default()
            .with_cache(cache.clone())
            .with_llm_client(Arc::new(MockLlmClient::new(
                r#"{"scores": [{"criterion": "creativity", "score": 12}]}"#,
            )));
        let rubric = Rubric::new().with_criterion(RubricCriterion::new("creativity", 10));

        let heuristic = local.grade_submission(ESSAY, &rubric).unwrap();
        let graded = external.grade_submission(ESSAY, &rubric).unwrap();

        assert_eq!(heuristic.grading_method, GradingMethod::Heuristic);
        assert_eq!(graded.grading_method, GradingMethod::External);
        assert_eq!(graded.overall_score, 12);
    }

    #[test]
    fn shared_cache_separates_detection_configs() {
        let cache = Arc::new(AnalysisCache::new());
        let refs = vec![ReferenceText::new("r1", "alpha beta gamma delta")];
        let text = "alpha beta gamma epsilon";
        let default = Analyzer::default().with_cache(cache.clone());
        let strict = Analyzer::new(AnalyzerConfig::new().with_similarity_threshold(0.5))
            .with_cache(cache.clone());

        // 3 shared of 5 distinct words
        assert!(!default.detect_plagiarism(text, &refs).unwrap().flagged);
        assert!(strict.detect_plagiarism(text, &refs).unwrap().flagged);
        assert_eq!(cache.plagiarism.len(), 2);
    }

    #[test]
    fn cached_plagiarism_result() {
        let cache = Arc::new(AnalysisCache::new());
        let analyzer = Analyzer::default().with_cache(cache.clone());
        let refs = vec![ReferenceText::new("r1", ESSAY)];

        let first = analyzer.detect_plagiarism(ESSAY, &refs).unwrap();
        let second = analyzer.detect_plagiarism(ESSAY, &refs).unwrap();

        assert_eq!(first, second);
        assert!(first.flagged);
        assert_eq!(cache.plagiarism.stats().hits, 1);
    }

    #[test]
    fn grade_submission_record() {
        let submission = SubmissionText::new(ESSAY, "hw-1", "student-9");
        let by_record = Analyzer::default().grade(&submission, &rubric()).unwrap();
        let by_text = Analyzer::default().grade_submission(ESSAY, &rubric()).unwrap();
        assert_eq!(by_record.criterion_scores, by_text.criterion_scores);
    }

    #[test]
    fn analyze_code_checks_requirements() {
        let code = "def area(radius):\n    return 3.14 * radius ** 2\n";
        let analysis = Analyzer::default()
            .analyze_code(code, &["def".to_string(), "math.pi".to_string()])
            .unwrap();
        assert_eq!(analysis.requirements.met, vec!["def"]);
        assert_eq!(analysis.requirements.completion, 50.0);
        assert!(analysis.syntax_issues.is_empty());
    }

    #[test]
    fn analyze_code_rejects_blank_requirement() {
        let err = Analyzer::default()
            .analyze_code("x = 1", &["  ".to_string()])
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::InvalidInput(_)));
    }

    #[test]
    fn analyzer_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Analyzer>();
    }
}
