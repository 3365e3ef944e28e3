//! Persistence and comparison of grading results.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::AnalyzerResult;
use crate::grading::types::{GradingComparison, GradingResult};

const DEFAULT_RESULTS_DIR: &str = ".gradekit/results";

/// Get the default result storage directory.
pub fn default_results_dir() -> PathBuf {
    PathBuf::from(DEFAULT_RESULTS_DIR)
}

/// Generate a timestamped filename with the given prefix.
pub fn default_result_filename(prefix: &str) -> String {
    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    format!("{}_{}.json", prefix, timestamp)
}

/// Save any serializable result as pretty JSON.
///
/// If `path` is None, saves to the default directory under a timestamped name.
pub fn save_json<T: serde::Serialize>(
    value: &T,
    prefix: &str,
    path: Option<&Path>,
) -> AnalyzerResult<PathBuf> {
    let save_path = match path {
        Some(p) => p.to_path_buf(),
        None => default_results_dir().join(default_result_filename(prefix)),
    };

    if let Some(parent) = save_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(&save_path, serde_json::to_string_pretty(value)?)?;
    debug!("Saved {} to {}", prefix, save_path.display());
    Ok(save_path)
}

/// Save a grading result to disk.
pub fn save_result(result: &GradingResult, path: Option<&Path>) -> AnalyzerResult<PathBuf> {
    save_json(result, "grading", path)
}

/// Load a saved grading result.
pub fn load_result(path: &Path) -> AnalyzerResult<GradingResult> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

/// List saved results in `dir`, oldest first.
pub fn list_results(dir: &Path) -> AnalyzerResult<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut results = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().map(|e| e == "json").unwrap_or(false) {
            results.push(path);
        }
    }

    // Filenames embed the timestamp
    results.sort();
    Ok(results)
}

/// Compare two gradings. Criteria are matched by name; deltas follow the
/// order of `after`.
pub fn compare_results(before: &GradingResult, after: &GradingResult) -> GradingComparison {
    let mut criterion_deltas = Vec::new();
    let mut improvements = Vec::new();
    let mut regressions = Vec::new();

    for after_score in &after.criterion_scores {
        let Some(before_score) = before.score_for(&after_score.criterion) else {
            continue;
        };
        let delta = after_score.score as i32 - before_score.score as i32;
        let line = format!(
            "{}: {} -> {}",
            after_score.criterion, before_score.score, after_score.score
        );
        if delta > 0 {
            improvements.push(line);
        } else if delta < 0 {
            regressions.push(line);
        }
        criterion_deltas.push((after_score.criterion.clone(), delta));
    }

    GradingComparison {
        before_score: before.overall_score,
        after_score: after.overall_score,
        overall_delta: after.overall_score as i32 - before.overall_score as i32,
        criterion_deltas,
        improvements,
        regressions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::Analyzer;
    use crate::error::AnalyzerError;
    use crate::grading::{Rubric, RubricCriterion};

    fn rubric() -> Rubric {
        Rubric::new()
            .with_criterion(RubricCriterion::new("content_quality", 50))
            .with_criterion(RubricCriterion::new("grammar", 50))
    }

    fn grade(text: &str) -> GradingResult {
        Analyzer::default().grade_submission(text, &rubric()).unwrap()
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("result.json");
        let result = grade("A short answer about tides and the moon.");

        let saved = save_result(&result, Some(&path)).unwrap();
        assert_eq!(saved, path);

        let loaded = load_result(&path).unwrap();
        assert_eq!(loaded, result);
        assert_eq!(list_results(&dir.path().join("nested")).unwrap(), vec![path]);
    }

    #[test]
    fn load_rejects_garbage() {
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(file.path(), "not json").unwrap();
        assert!(matches!(
            load_result(file.path()),
            Err(AnalyzerError::Json(_))
        ));
    }

    #[test]
    fn missing_dir_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_results(&dir.path().join("absent")).unwrap().is_empty());
    }

    #[test]
    fn compare_shows_improvement() {
        let before = grade("Too short.");
        let after = grade(&"Tides follow the moon because gravity pulls on the oceans. ".repeat(12));

        let comparison = compare_results(&before, &after);

        assert!(comparison.overall_delta > 0);
        assert!(comparison
            .improvements
            .iter()
            .any(|i| i.starts_with("content_quality:")));
        assert_eq!(comparison.criterion_deltas.len(), 2);
    }

    #[test]
    fn compare_ignores_unmatched_criteria() {
        let before = grade("Some text here.");
        let other = Rubric::new().with_criterion(RubricCriterion::new("creativity", 10));
        let after = Analyzer::default()
            .grade_submission("Some text here.", &other)
            .unwrap();

        let comparison = compare_results(&before, &after);
        assert!(comparison.criterion_deltas.is_empty());
        assert!(comparison.regressions.is_empty());
    }

    #[test]
    fn default_filename_has_prefix() {
        let name = default_result_filename("grading");
        assert!(name.starts_with("grading_"));
        assert!(name.ends_with(".json"));
    }
}
