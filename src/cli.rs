use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::llm::LlmProvider;
use crate::models::OutputFormat;

/// Command line interface definition for gradekit.
#[derive(Parser, Debug)]
#[command(name = "gradekit")]
#[command(about = "Grade submissions, generate feedback and check for plagiarism")]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbosity")]
    pub quiet: bool,

    /// Analyzer configuration file (JSON)
    #[arg(long, global = true, env = "GRADEKIT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub llm: LlmArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// External grader selection. Overrides the `GRADEKIT_*` environment.
#[derive(Args, Debug, Clone, Default)]
pub struct LlmArgs {
    /// External grading provider (claude, opencode)
    #[arg(long = "llm-provider", global = true, value_parser = parse_provider)]
    pub provider: Option<LlmProvider>,

    /// Model passed to the provider
    #[arg(long = "llm-model", global = true)]
    pub model: Option<String>,

    /// Backend for opencode (e.g., lmstudio, ollama)
    #[arg(long, global = true)]
    pub opencode_backend: Option<String>,
}

fn parse_provider(s: &str) -> Result<LlmProvider, String> {
    s.parse()
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print content statistics for a text
    Analyze(AnalyzeArgs),
    /// Grade a submission against a rubric
    Grade(GradeArgs),
    /// Compare a submission against reference texts
    Detect(DetectArgs),
    /// Compare two saved grading results
    Compare(CompareArgs),
    /// List saved results, oldest first
    History(HistoryArgs),
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Submission file, or `-` for stdin
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Treat the input as source code
    #[arg(long)]
    pub code: bool,

    /// Keyword the code must contain (repeatable)
    #[arg(long = "require", value_name = "KEYWORD", requires = "code")]
    pub requirements: Vec<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct GradeArgs {
    /// Submission file, or `-` for stdin
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Rubric file (JSON object of criterion name to settings)
    #[arg(short, long)]
    pub rubric: PathBuf,

    /// Also report the overall score scaled to this maximum
    #[arg(long)]
    pub max_score: Option<f64>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,

    /// Include per-criterion evidence and statistics
    #[arg(long)]
    pub full: bool,

    /// Save the result as JSON (optionally to a specific path)
    #[arg(long, value_name = "PATH")]
    pub save: Option<Option<PathBuf>>,
}

#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Submission file, or `-` for stdin
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Reference file; the file stem becomes the reference id
    #[arg(long = "reference", value_name = "FILE")]
    pub references: Vec<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,

    /// Save the result as JSON (optionally to a specific path)
    #[arg(long, value_name = "PATH")]
    pub save: Option<Option<PathBuf>>,
}

#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Earlier saved grading result
    pub before: PathBuf,

    /// Later saved grading result
    pub after: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Results directory (defaults to .gradekit/results)
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_grade_with_global_flags() {
        let cli = Cli::try_parse_from([
            "gradekit",
            "grade",
            "essay.txt",
            "--rubric",
            "rubric.json",
            "--max-score",
            "20",
            "--format",
            "json",
            "--save",
            "-vv",
            "--llm-provider",
            "opencode",
        ])
        .unwrap();

        assert_eq!(cli.verbosity, 2);
        assert_eq!(cli.llm.provider, Some(LlmProvider::OpenCode));
        match cli.command {
            Command::Grade(args) => {
                assert_eq!(args.rubric, PathBuf::from("rubric.json"));
                assert_eq!(args.max_score, Some(20.0));
                assert_eq!(args.format, OutputFormat::Json);
                assert_eq!(args.save, Some(None));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn parses_repeated_references() {
        let cli = Cli::try_parse_from([
            "gradekit",
            "detect",
            "-",
            "--reference",
            "a.txt",
            "--reference",
            "b.txt",
        ])
        .unwrap();
        match cli.command {
            Command::Detect(args) => {
                assert_eq!(args.input, PathBuf::from("-"));
                assert_eq!(args.references.len(), 2);
                assert_eq!(args.save, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn parses_code_analysis() {
        let cli = Cli::try_parse_from([
            "gradekit",
            "analyze",
            "main.py",
            "--code",
            "--require",
            "def",
            "--require",
            "return",
        ])
        .unwrap();
        match cli.command {
            Command::Analyze(args) => {
                assert!(args.code);
                assert_eq!(args.requirements, vec!["def", "return"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn require_needs_code_flag() {
        let result = Cli::try_parse_from(["gradekit", "analyze", "essay.txt", "--require", "x"]);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_unknown_provider() {
        let result = Cli::try_parse_from(["gradekit", "--llm-provider", "gpt", "analyze", "x.txt"]);
        assert!(result.is_err());
    }
}
