//! Command dispatch for the `gradekit` binary.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use log::{debug, info};

use crate::analyzer::Analyzer;
use crate::cli::{AnalyzeArgs, Command, CompareArgs, DetectArgs, GradeArgs, HistoryArgs};
use crate::error::AnalyzerError;
use crate::grading::Rubric;
use crate::models::ReferenceText;
use crate::{report, store};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Analyzer(#[from] AnalyzerError),
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("{0}")]
    User(String),
}

pub struct App {
    analyzer: Analyzer,
    verbose: bool,
}

impl App {
    pub fn new(analyzer: Analyzer, verbose: bool) -> Self {
        Self { analyzer, verbose }
    }

    /// Run a command, returning the text to print.
    pub fn run(&self, command: Command) -> Result<String, AppError> {
        match command {
            Command::Analyze(opts) => self.handle_analyze(opts),
            Command::Grade(opts) => self.handle_grade(opts),
            Command::Detect(opts) => self.handle_detect(opts),
            Command::Compare(opts) => self.handle_compare(opts),
            Command::History(opts) => self.handle_history(opts),
        }
    }

    fn handle_analyze(&self, opts: AnalyzeArgs) -> Result<String, AppError> {
        let text = read_input(&opts.input)?;
        if opts.code {
            let analysis = self.analyzer.analyze_code(&text, &opts.requirements)?;
            return Ok(report::format_code_analysis(&analysis, opts.format));
        }
        let stats = self.analyzer.analyze_content(&text)?;
        Ok(report::format_statistics(&stats, opts.format))
    }

    fn handle_grade(&self, opts: GradeArgs) -> Result<String, AppError> {
        let text = read_input(&opts.input)?;
        let rubric = Rubric::from_json(&read_input(&opts.rubric)?)?;
        info!(
            "Grading {} against {} criteria",
            opts.input.display(),
            rubric.len()
        );

        let result = match opts.max_score {
            Some(max) => self.analyzer.grade_submission_scaled(&text, &rubric, max)?,
            None => self.analyzer.grade_submission(&text, &rubric)?,
        };

        if let Some(save_path) = opts.save {
            let path = store::save_result(&result, save_path.as_deref())?;
            info!("Grading saved to: {}", path.display());
        }

        Ok(report::format_grading(
            &result,
            opts.format,
            opts.full || self.verbose,
        ))
    }

    fn handle_detect(&self, opts: DetectArgs) -> Result<String, AppError> {
        let text = read_input(&opts.input)?;
        let references = opts
            .references
            .iter()
            .map(|path| {
                let id = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .ok_or_else(|| {
                        AppError::User(format!("Reference path has no file name: {}", path.display()))
                    })?;
                Ok(ReferenceText::new(id, read_input(path)?))
            })
            .collect::<Result<Vec<_>, AppError>>()?;
        debug!("Loaded {} references", references.len());

        let result = self.analyzer.detect_plagiarism(&text, &references)?;

        if let Some(save_path) = opts.save {
            let path = store::save_json(&result, "plagiarism", save_path.as_deref())?;
            info!("Plagiarism result saved to: {}", path.display());
        }

        Ok(report::format_plagiarism(&result, opts.format))
    }

    fn handle_compare(&self, opts: CompareArgs) -> Result<String, AppError> {
        let before = store::load_result(&opts.before).map_err(|e| {
            AppError::User(format!("Failed to load 'before' result: {}", e))
        })?;
        let after = store::load_result(&opts.after)
            .map_err(|e| AppError::User(format!("Failed to load 'after' result: {}", e)))?;

        let comparison = store::compare_results(&before, &after);
        Ok(report::format_comparison(&comparison, opts.format))
    }

    fn handle_history(&self, opts: HistoryArgs) -> Result<String, AppError> {
        let dir = opts.dir.unwrap_or_else(store::default_results_dir);
        let results = store::list_results(&dir)?;
        debug!("Found {} saved results in {}", results.len(), dir.display());

        if results.is_empty() {
            return Ok(format!("No saved results in {}", dir.display()));
        }
        Ok(results
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

/// Read a file, or stdin when the path is `-`.
fn read_input(path: &Path) -> Result<String, AppError> {
    let read_err = |source| AppError::Read {
        path: path.display().to_string(),
        source,
    };

    if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).map_err(read_err)?;
        Ok(buf)
    } else {
        fs::read_to_string(path).map_err(read_err)
    }
}
