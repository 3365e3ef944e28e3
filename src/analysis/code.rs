//! Heuristics for programming submissions.
//!
//! Line-based and token-based only: nothing here parses the language, so
//! string literals and comments containing brackets or keywords are counted
//! like code.

use std::collections::BTreeSet;
use std::fmt;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::utils::{round1, round2};

/// Control-structure keywords counted towards complexity.
const CONTROL_KEYWORDS: &[&str] = &[
    "if", "elif", "else", "for", "while", "try", "except", "class", "def",
];

static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Za-z_][A-Za-z0-9_]*\b").expect("identifier pattern"));

// `name =` but not `name ==`
static ASSIGNMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([A-Za-z_][A-Za-z0-9_]*)\s*=(?:[^=]|$)").expect("assignment pattern")
});

static CAMEL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z][A-Z]").expect("camel pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingConsistency {
    /// Only one of snake_case / camelCase appears.
    Consistent,
    /// Both styles appear.
    Mixed,
    /// No styled names were assigned.
    Unknown,
}

impl fmt::Display for NamingConsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Consistent => write!(f, "consistent"),
            Self::Mixed => write!(f, "mixed"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamingReport {
    pub snake_case: usize,
    pub camel_case: usize,
    pub consistency: NamingConsistency,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementReport {
    pub met: Vec<String>,
    pub missing: Vec<String>,
    /// Percentage of requirements found, 0-100. 0 when none were given.
    pub completion: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyntaxIssue {
    MismatchedParentheses,
    MismatchedBrackets,
    MismatchedBraces,
    MissingColonAfterDef,
}

impl fmt::Display for SyntaxIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MismatchedParentheses => write!(f, "Mismatched parentheses"),
            Self::MismatchedBrackets => write!(f, "Mismatched brackets"),
            Self::MismatchedBraces => write!(f, "Mismatched braces"),
            Self::MissingColonAfterDef => write!(f, "Missing colon after function definition"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleReport {
    /// Fraction of non-blank lines indented by four spaces or a tab.
    pub indentation_ratio: f64,
    pub avg_line_length: f64,
    /// Indentation ratio as 0-100.
    pub style_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeAnalysis {
    pub line_count: usize,
    /// Comment lines over non-blank lines, 0-1.
    pub comment_ratio: f64,
    /// Number of control-structure keywords.
    pub complexity: usize,
    pub naming: NamingReport,
    pub requirements: RequirementReport,
    pub syntax_issues: Vec<SyntaxIssue>,
    pub style: StyleReport,
}

/// Analyze `code`, checking each of `requirements` as a case-insensitive
/// substring.
pub fn analyze_code(code: &str, requirements: &[String]) -> CodeAnalysis {
    let lines: Vec<&str> = code.lines().collect();
    let non_blank = lines.iter().filter(|l| !l.trim().is_empty()).count();

    let analysis = CodeAnalysis {
        line_count: lines.len(),
        comment_ratio: comment_ratio(&lines, non_blank),
        complexity: control_complexity(code),
        naming: naming(code),
        requirements: check_requirements(code, requirements),
        syntax_issues: syntax_issues(code, &lines),
        style: style(&lines, non_blank),
    };
    debug!(
        "Code analysis: {} lines, complexity {}, {} syntax issues",
        analysis.line_count,
        analysis.complexity,
        analysis.syntax_issues.len()
    );
    analysis
}

fn comment_ratio(lines: &[&str], non_blank: usize) -> f64 {
    if non_blank == 0 {
        return 0.0;
    }
    let comments = lines
        .iter()
        .map(|l| l.trim_start())
        .filter(|l| l.starts_with('#') || l.starts_with("//"))
        .count();
    round2(comments as f64 / non_blank as f64)
}

fn control_complexity(code: &str) -> usize {
    IDENTIFIER_RE
        .find_iter(code)
        .filter(|m| CONTROL_KEYWORDS.contains(&m.as_str()))
        .count()
}

fn naming(code: &str) -> NamingReport {
    let names: BTreeSet<&str> = ASSIGNMENT_RE
        .captures_iter(code)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .collect();

    let snake_case = names
        .iter()
        .filter(|n| n.trim_start_matches('_').contains('_'))
        .count();
    let camel_case = names.iter().filter(|n| CAMEL_RE.is_match(n)).count();

    let consistency = match (snake_case, camel_case) {
        (0, 0) => NamingConsistency::Unknown,
        (0, _) | (_, 0) => NamingConsistency::Consistent,
        _ => NamingConsistency::Mixed,
    };

    NamingReport {
        snake_case,
        camel_case,
        consistency,
    }
}

fn check_requirements(code: &str, requirements: &[String]) -> RequirementReport {
    let lower = code.to_lowercase();
    let (met, missing): (Vec<String>, Vec<String>) = requirements
        .iter()
        .cloned()
        .partition(|r| lower.contains(&r.to_lowercase()));

    let completion = if requirements.is_empty() {
        0.0
    } else {
        round1(met.len() as f64 / requirements.len() as f64 * 100.0)
    };

    RequirementReport {
        met,
        missing,
        completion,
    }
}

/// True when every `close` has a preceding `open` and none are left open.
fn balanced(code: &str, open: char, close: char) -> bool {
    let mut depth: i64 = 0;
    for c in code.chars() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth < 0 {
                return false;
            }
        }
    }
    depth == 0
}

fn syntax_issues(code: &str, lines: &[&str]) -> Vec<SyntaxIssue> {
    let mut issues = Vec::new();
    if !balanced(code, '(', ')') {
        issues.push(SyntaxIssue::MismatchedParentheses);
    }
    if !balanced(code, '[', ']') {
        issues.push(SyntaxIssue::MismatchedBrackets);
    }
    if !balanced(code, '{', '}') {
        issues.push(SyntaxIssue::MismatchedBraces);
    }
    if lines.iter().any(|l| {
        let line = l.trim();
        line.starts_with("def ") && !line.ends_with(':')
    }) {
        issues.push(SyntaxIssue::MissingColonAfterDef);
    }
    issues
}

fn style(lines: &[&str], non_blank: usize) -> StyleReport {
    let indented = lines
        .iter()
        .filter(|l| l.starts_with("    ") || l.starts_with('\t'))
        .count();
    let indentation_ratio = if non_blank == 0 {
        0.0
    } else {
        indented as f64 / non_blank as f64
    };
    let avg_line_length = if lines.is_empty() {
        0.0
    } else {
        lines.iter().map(|l| l.chars().count()).sum::<usize>() as f64 / lines.len() as f64
    };

    StyleReport {
        indentation_ratio: round2(indentation_ratio),
        avg_line_length: round1(avg_line_length),
        style_score: round1((indentation_ratio * 100.0).min(100.0)),
    }
}
