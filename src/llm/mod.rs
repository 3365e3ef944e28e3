//! External grading provider clients.
//!
//! This module provides the request/response contract for an external
//! grader and CLI-backed implementations. Prompting and parsing for grading
//! live in `grading::llm`.
//!
//! # Configuration
//!
//! LLM settings can be configured via:
//! - CLI arguments: `--llm-provider`, `--llm-model`, `--opencode-backend`
//! - Environment variables: `GRADEKIT_LLM_PROVIDER`, `GRADEKIT_LLM_MODEL`,
//!   `GRADEKIT_OPENCODE_BACKEND`
//!
//! CLI arguments take precedence over environment variables. With no provider
//! configured the analyzer grades heuristically.

use std::env;
use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::sync::Arc;

use log::{debug, warn};

/// Available LLM providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    /// Claude CLI
    Claude,
    /// OpenCode CLI
    OpenCode,
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Claude => write!(f, "claude"),
            Self::OpenCode => write!(f, "opencode"),
        }
    }
}

impl std::str::FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "claude" => Ok(Self::Claude),
            "opencode" => Ok(Self::OpenCode),
            _ => Err(format!(
                "Unknown LLM provider: '{}'. Valid options: claude, opencode",
                s
            )),
        }
    }
}

/// Configuration for the external grader.
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    /// Provider to use; `None` disables external grading.
    pub provider: Option<LlmProvider>,
    /// Optional model override.
    pub model: Option<String>,
    /// Backend provider for opencode (e.g., "lmstudio", "ollama").
    pub opencode_backend: Option<String>,
}

impl LlmConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create config from environment variables.
    ///
    /// Reads:
    /// - `GRADEKIT_LLM_PROVIDER` - provider name (claude, opencode)
    /// - `GRADEKIT_LLM_MODEL` - model name
    /// - `GRADEKIT_OPENCODE_BACKEND` - backend for opencode (e.g., lmstudio, ollama)
    pub fn from_env() -> Self {
        let provider = env::var("GRADEKIT_LLM_PROVIDER")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .and_then(|s| match s.parse() {
                Ok(p) => Some(p),
                Err(e) => {
                    warn!("Ignoring GRADEKIT_LLM_PROVIDER: {}", e);
                    None
                }
            });

        let model = env::var("GRADEKIT_LLM_MODEL").ok();
        let opencode_backend = env::var("GRADEKIT_OPENCODE_BACKEND").ok();

        Self {
            provider,
            model,
            opencode_backend,
        }
    }

    pub fn with_provider(mut self, provider: LlmProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Merge with CLI overrides. CLI values take precedence.
    pub fn with_overrides(
        mut self,
        provider: Option<LlmProvider>,
        model: Option<String>,
        opencode_backend: Option<String>,
    ) -> Self {
        if let Some(p) = provider {
            self.provider = Some(p);
        }
        if let Some(m) = model {
            self.model = Some(m);
        }
        if let Some(b) = opencode_backend {
            self.opencode_backend = Some(b);
        }
        self
    }

    /// Create a client for the configured provider, if any.
    pub fn create_client(&self) -> Option<Arc<dyn LlmClient>> {
        let provider = self.provider?;
        let client: Arc<dyn LlmClient> = match provider {
            LlmProvider::Claude => Arc::new(ClaudeCliClient {
                model: self.model.clone(),
            }),
            LlmProvider::OpenCode => Arc::new(OpenCodeClient {
                model: self.model.clone(),
                backend: self.opencode_backend.clone(),
            }),
        };
        Some(client)
    }

    /// Name reported as `model_used` in results.
    pub fn model_label(&self) -> String {
        match (self.provider, &self.model) {
            (Some(p), Some(m)) => format!("{}:{}", p, m),
            (Some(p), None) => p.to_string(),
            (None, _) => "heuristic".to_string(),
        }
    }
}

/// Trait for LLM completion clients.
pub trait LlmClient: Send + Sync {
    /// Send a prompt to the LLM and return the completion response.
    fn complete(&self, prompt: &str) -> Result<String, LlmError>;

    /// Name reported as `model_used` in results.
    fn model_name(&self) -> String {
        "external".to_string()
    }
}

/// Map a spawn failure: a missing binary means the provider is unavailable.
fn spawn_error(program: &str, e: io::Error) -> LlmError {
    if e.kind() == io::ErrorKind::NotFound {
        LlmError::Unavailable(format!("{} CLI not found in PATH", program))
    } else {
        LlmError::ClientError(format!("Failed to run {} CLI: {}", program, e))
    }
}

/// Claude CLI client implementation.
#[derive(Debug, Default)]
pub struct ClaudeCliClient {
    pub model: Option<String>,
}

impl ClaudeCliClient {
    pub fn new() -> Self {
        Self { model: None }
    }

    pub fn with_model(model: impl Into<String>) -> Self {
        Self {
            model: Some(model.into()),
        }
    }
}

impl LlmClient for ClaudeCliClient {
    fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        // Use stdin for prompt to avoid command line length limits
        let mut args = vec!["--print"];
        if let Some(ref model) = self.model {
            args.push("--model");
            args.push(model);
        }

        let mut child = Command::new("claude")
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| spawn_error("claude", e))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(prompt.as_bytes())
                .map_err(|e| LlmError::ClientError(format!("Failed to write to stdin: {}", e)))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| LlmError::ClientError(format!("Failed to wait for claude CLI: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LlmError::ClientError(format!(
                "claude CLI failed (exit {}): {}",
                output.status.code().unwrap_or(-1),
                stderr.trim()
            )));
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            debug!("Claude CLI stderr: {}", stderr.trim());
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn model_name(&self) -> String {
        match &self.model {
            Some(m) => format!("claude:{}", m),
            None => "claude".to_string(),
        }
    }
}

/// OpenCode CLI client implementation.
#[derive(Debug, Default)]
pub struct OpenCodeClient {
    pub model: Option<String>,
    /// Backend provider (e.g., "lmstudio", "ollama").
    pub backend: Option<String>,
}

impl OpenCodeClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = Some(backend.into());
        self
    }

    /// Model argument in opencode's `backend/model` form.
    fn model_arg(&self) -> Option<String> {
        match (&self.backend, &self.model) {
            (Some(backend), Some(model)) if !model.contains('/') => {
                Some(format!("{}/{}", backend, model))
            }
            (_, Some(model)) => Some(model.clone()),
            // A bare backend is not a usable model path; use opencode defaults
            (_, None) => None,
        }
    }
}

impl LlmClient for OpenCodeClient {
    fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let model_arg = self.model_arg();
        let mut args = vec!["run", prompt, "--format", "json"];
        if let Some(ref m) = model_arg {
            args.push("-m");
            args.push(m);
        }

        let output = Command::new("opencode")
            .args(&args)
            .output()
            .map_err(|e| spawn_error("opencode", e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LlmError::ClientError(format!(
                "opencode CLI failed (exit {}): {}",
                output.status.code().unwrap_or(-1),
                stderr.trim()
            )));
        }

        // Each line is a JSON event; collect the text parts
        let stdout = String::from_utf8_lossy(&output.stdout);
        let text_parts: Vec<String> = stdout
            .lines()
            .filter_map(|line| serde_json::from_str::<serde_json::Value>(line).ok())
            .filter(|json| json.get("type").and_then(|v| v.as_str()) == Some("text"))
            .filter_map(|json| {
                json.get("part")
                    .and_then(|p| p.get("text"))
                    .and_then(|t| t.as_str())
                    .map(str::to_string)
            })
            .collect();

        if text_parts.is_empty() {
            return Err(LlmError::ClientError(format!(
                "No text output from opencode. Raw output: {}",
                stdout.chars().take(500).collect::<String>()
            )));
        }

        Ok(text_parts.join(""))
    }

    fn model_name(&self) -> String {
        match self.model_arg() {
            Some(m) => format!("opencode:{}", m),
            None => "opencode".to_string(),
        }
    }
}

/// Errors from LLM operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("LLM provider unavailable: {0}")]
    Unavailable(String),

    #[error("LLM client error: {0}")]
    ClientError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Max retries ({0}) exceeded")]
    MaxRetriesExceeded(usize),
}

/// Mock LLM clients for testing.
#[cfg(test)]
pub mod test_support {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    /// Replays canned responses in order, repeating the last one.
    pub struct MockLlmClient {
        responses: Vec<Result<String, String>>,
        calls: AtomicUsize,
        pub prompts: Mutex<Vec<String>>,
    }

    impl MockLlmClient {
        pub fn new(response: impl Into<String>) -> Self {
            Self::sequence(vec![Ok(response.into())])
        }

        pub fn failing(message: impl Into<String>) -> Self {
            Self::sequence(vec![Err(message.into())])
        }

        pub fn sequence(responses: Vec<Result<String, String>>) -> Self {
            Self {
                responses,
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl LlmClient for MockLlmClient {
        fn complete(&self, prompt: &str) -> Result<String, LlmError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if let Ok(mut prompts) = self.prompts.lock() {
                prompts.push(prompt.to_string());
            }
            let idx = n.min(self.responses.len().saturating_sub(1));
            match self.responses.get(idx) {
                Some(Ok(r)) => Ok(r.clone()),
                Some(Err(e)) => Err(LlmError::ClientError(e.clone())),
                None => Err(LlmError::Unavailable("no responses".to_string())),
            }
        }

        fn model_name(&self) -> String {
            "mock".to_string()
        }
    }
}
