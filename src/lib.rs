//! Heuristic analysis of student submissions: text statistics, rubric
//! grading with templated feedback, and plagiarism / AI-content checks.
//!
//! The [`Analyzer`](analyzer::Analyzer) is the entry point for hosts.

pub mod analysis;
pub mod analyzer;
pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod detection;
pub mod error;
pub mod grading;
pub mod llm;
pub mod models;
pub mod report;
pub mod store;
pub mod utils;

pub use analyzer::Analyzer;
pub use config::AnalyzerConfig;
pub use error::{AnalyzerError, AnalyzerResult};
pub use models::{ContentStatistics, ReferenceText, Sentiment, SubmissionText};
