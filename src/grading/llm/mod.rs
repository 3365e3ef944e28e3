//! Rubric grading through an external provider.

pub mod parser;
pub mod prompt;

use std::sync::Arc;

use log::{debug, warn};

use crate::grading::rubric::Rubric;
use crate::llm::{LlmClient, LlmError};
use crate::models::ContentStatistics;

pub use parser::{ParseError, ParsedGrading};

/// Grades a submission by prompting an [`LlmClient`] for per-criterion scores.
pub struct LlmGrader {
    client: Arc<dyn LlmClient>,
    max_retries: usize,
    confidence: f64,
}

impl LlmGrader {
    pub fn new(client: Arc<dyn LlmClient>, confidence: f64) -> Self {
        Self {
            client,
            max_retries: 3,
            confidence,
        }
    }

    /// Set the maximum number of attempts.
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    pub fn model_name(&self) -> String {
        self.client.model_name()
    }

    /// Request and validate scores, retrying on client or parse failures.
    ///
    /// An unavailable provider is not retried.
    pub fn grade(
        &self,
        text: &str,
        stats: &ContentStatistics,
        rubric: &Rubric,
    ) -> Result<ParsedGrading, LlmError> {
        let prompt_text = prompt::build_grading_prompt(text, stats, rubric);

        for attempt in 1..=self.max_retries {
            match self.client.complete(&prompt_text) {
                Ok(response) => {
                    match parser::parse_grading_response(&response, rubric, self.confidence) {
                        Ok(parsed) => {
                            debug!("External grading succeeded on attempt {}", attempt);
                            return Ok(parsed);
                        }
                        Err(e) => {
                            warn!(
                                "Parse error (attempt {}/{}): {}",
                                attempt, self.max_retries, e
                            );
                        }
                    }
                }
                Err(e @ LlmError::Unavailable(_)) => return Err(e),
                Err(e) => {
                    warn!(
                        "LLM error (attempt {}/{}): {}",
                        attempt, self.max_retries, e
                    );
                }
            }
        }

        Err(LlmError::MaxRetriesExceeded(self.max_retries))
    }
}
