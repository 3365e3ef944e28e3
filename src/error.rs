/// Errors surfaced to callers of the analyzer.
///
/// Only contract violations end up here. Degraded heuristics and an
/// unavailable external grader are handled internally and never reach the
/// caller as errors.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnalyzerError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

pub type AnalyzerResult<T> = Result<T, AnalyzerError>;
