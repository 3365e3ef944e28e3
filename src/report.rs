//! Report formatting for analyzer output.

use serde::Serialize;

use crate::analysis::CodeAnalysis;
use crate::detection::PlagiarismResult;
use crate::grading::types::{GradingComparison, GradingResult};
use crate::models::{ContentStatistics, OutputFormat};
use crate::utils::humanize;

const WRAP_WIDTH: usize = 76;

/// Format content statistics for output.
pub fn format_statistics(stats: &ContentStatistics, format: OutputFormat) -> String {
    match format {
        OutputFormat::Pretty => format_statistics_pretty(stats),
        OutputFormat::Json => format_json(stats),
        OutputFormat::Markdown => format_statistics_markdown(stats),
    }
}

/// Format a code analysis for output.
pub fn format_code_analysis(analysis: &CodeAnalysis, format: OutputFormat) -> String {
    match format {
        OutputFormat::Pretty => format_code_pretty(analysis),
        OutputFormat::Json => format_json(analysis),
        OutputFormat::Markdown => format_code_markdown(analysis),
    }
}

/// Format a grading result for output.
pub fn format_grading(result: &GradingResult, format: OutputFormat, verbose: bool) -> String {
    match format {
        OutputFormat::Pretty => format_grading_pretty(result, verbose),
        OutputFormat::Json => format_json(result),
        OutputFormat::Markdown => format_grading_markdown(result, verbose),
    }
}

/// Format a plagiarism result for output.
pub fn format_plagiarism(result: &PlagiarismResult, format: OutputFormat) -> String {
    match format {
        OutputFormat::Pretty => format_plagiarism_pretty(result),
        OutputFormat::Json => format_json(result),
        OutputFormat::Markdown => format_plagiarism_markdown(result),
    }
}

/// Format a comparison for output.
pub fn format_comparison(comparison: &GradingComparison, format: OutputFormat) -> String {
    match format {
        OutputFormat::Pretty => format_comparison_pretty(comparison),
        OutputFormat::Json => format_json(comparison),
        OutputFormat::Markdown => format_comparison_markdown(comparison),
    }
}

fn format_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("Error: {}", e))
}

fn format_statistics_pretty(stats: &ContentStatistics) -> String {
    format!(
        "Content Statistics\n\
         \x20 Words: {}\n\
         \x20 Sentences: {}\n\
         \x20 Avg words/sentence: {:.1}\n\
         \x20 Readability: {:.1}\n\
         \x20 Sentiment: {}\n\
         \x20 Complexity: {:.1}\n",
        stats.word_count,
        stats.sentence_count,
        stats.avg_words_per_sentence,
        stats.readability_score,
        stats.sentiment,
        stats.complexity_score
    )
}

fn format_statistics_markdown(stats: &ContentStatistics) -> String {
    let mut output = String::from("## Content Statistics\n\n| Metric | Value |\n|--------|-------|\n");
    output.push_str(&format!("| Words | {} |\n", stats.word_count));
    output.push_str(&format!("| Sentences | {} |\n", stats.sentence_count));
    output.push_str(&format!(
        "| Avg words/sentence | {:.1} |\n",
        stats.avg_words_per_sentence
    ));
    output.push_str(&format!("| Readability | {:.1} |\n", stats.readability_score));
    output.push_str(&format!("| Sentiment | {} |\n", stats.sentiment));
    output.push_str(&format!("| Complexity | {:.1} |\n", stats.complexity_score));
    output
}

fn format_code_pretty(analysis: &CodeAnalysis) -> String {
    let mut output = String::from("Code Analysis\n");
    output.push_str(&format!("  Lines: {}\n", analysis.line_count));
    output.push_str(&format!(
        "  Comment ratio: {:.2}\n",
        analysis.comment_ratio
    ));
    output.push_str(&format!("  Control structures: {}\n", analysis.complexity));
    output.push_str(&format!(
        "  Naming: {} ({} snake_case, {} camelCase)\n",
        analysis.naming.consistency, analysis.naming.snake_case, analysis.naming.camel_case
    ));
    output.push_str(&format!(
        "  Style: {:.1} (avg line length {:.1})\n",
        analysis.style.style_score, analysis.style.avg_line_length
    ));

    let reqs = &analysis.requirements;
    if !reqs.met.is_empty() || !reqs.missing.is_empty() {
        output.push_str(&format!(
            "\nRequirements: {}/{} ({:.1}%)\n",
            reqs.met.len(),
            reqs.met.len() + reqs.missing.len(),
            reqs.completion
        ));
        for r in &reqs.met {
            output.push_str(&format!("  + {}\n", r));
        }
        for r in &reqs.missing {
            output.push_str(&format!("  - {}\n", r));
        }
    }

    if analysis.syntax_issues.is_empty() {
        output.push_str("\nNo syntax issues found.\n");
    } else {
        output.push_str("\nSyntax issues:\n");
        for issue in &analysis.syntax_issues {
            output.push_str(&format!("  ! {}\n", issue));
        }
    }
    output
}

fn format_code_markdown(analysis: &CodeAnalysis) -> String {
    let mut output = String::from("## Code Analysis\n\n| Metric | Value |\n|--------|-------|\n");
    output.push_str(&format!("| Lines | {} |\n", analysis.line_count));
    output.push_str(&format!("| Comment ratio | {:.2} |\n", analysis.comment_ratio));
    output.push_str(&format!("| Control structures | {} |\n", analysis.complexity));
    output.push_str(&format!("| Naming | {} |\n", analysis.naming.consistency));
    output.push_str(&format!("| Style score | {:.1} |\n", analysis.style.style_score));
    output.push_str(&format!(
        "| Requirements met | {:.1}% |\n",
        analysis.requirements.completion
    ));

    if !analysis.syntax_issues.is_empty() {
        output.push_str("\n### Syntax Issues\n\n");
        for issue in &analysis.syntax_issues {
            output.push_str(&format!("- {}\n", issue));
        }
    }
    output
}

fn format_grading_pretty(result: &GradingResult, verbose: bool) -> String {
    let mut output = String::new();

    output.push_str(&format!("Overall Score: {}/100", result.overall_score));
    if let (Some(scaled), Some(max)) = (result.scaled_score, result.max_score) {
        output.push_str(&format!(" ({:.2}/{})", scaled, max));
    }
    output.push('\n');
    output.push_str(&format!(
        "Method: {} ({}, confidence {:.2})\n\n",
        result.grading_method, result.model_used, result.confidence
    ));

    output.push_str("Criteria:\n");
    for score in &result.criterion_scores {
        output.push_str(&format!(
            "  {}: {}/100 ({:.2}/{} pts, weight {:.2})\n",
            humanize(&score.criterion),
            score.score,
            score.points,
            score.max_points,
            score.weight
        ));
        if verbose {
            output.push_str(&format!("    {} rules\n", score.family.name()));
            for e in &score.evidence {
                output.push_str(&format!("    - {}\n", e));
            }
        }
    }
    output.push('\n');

    output.push_str("Feedback:\n");
    for line in wrap_text(&result.feedback, WRAP_WIDTH) {
        output.push_str(&format!("  {}\n", line));
    }

    if !result.strengths.is_empty() {
        output.push_str("\nStrengths:\n");
        for s in &result.strengths {
            output.push_str(&format!("  + {}\n", s));
        }
    }
    if !result.improvements.is_empty() {
        output.push_str("\nImprovements:\n");
        for i in &result.improvements {
            output.push_str(&format!("  - {}\n", i));
        }
    }

    if verbose {
        output.push('\n');
        output.push_str(&format_statistics_pretty(&result.content_statistics));
        output.push_str(&format!(
            "\nGraded at {} in {}ms\n",
            result.graded_at, result.processing_time_ms
        ));
    }

    output
}

fn format_grading_markdown(result: &GradingResult, verbose: bool) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "# Grading Report\n\n**Overall Score**: {}/100\n",
        result.overall_score
    ));
    if let (Some(scaled), Some(max)) = (result.scaled_score, result.max_score) {
        output.push_str(&format!("**Scaled Score**: {:.2}/{}\n", scaled, max));
    }
    output.push_str(&format!(
        "**Method**: {} ({})\n\n",
        result.grading_method, result.model_used
    ));

    output.push_str("## Criteria\n\n| Criterion | Family | Score | Points | Weight |\n|-----------|--------|-------|--------|--------|\n");
    for score in &result.criterion_scores {
        output.push_str(&format!(
            "| {} | {} | {} | {:.2}/{} | {:.2} |\n",
            humanize(&score.criterion),
            score.family.name(),
            score.score,
            score.points,
            score.max_points,
            score.weight
        ));
    }
    output.push('\n');

    output.push_str(&format!("## Feedback\n\n{}\n\n", result.feedback));

    if !result.strengths.is_empty() {
        output.push_str("## Strengths\n\n");
        for s in &result.strengths {
            output.push_str(&format!("- {}\n", s));
        }
        output.push('\n');
    }
    if !result.improvements.is_empty() {
        output.push_str("## Improvements\n\n");
        for i in &result.improvements {
            output.push_str(&format!("- {}\n", i));
        }
        output.push('\n');
    }

    if verbose {
        output.push_str(&format_statistics_markdown(&result.content_statistics));
    }

    output
}

fn format_plagiarism_pretty(result: &PlagiarismResult) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Plagiarism Check: {}\n",
        if result.flagged { "FLAGGED" } else { "clear" }
    ));
    output.push_str(&format!(
        "Highest similarity: {:.2}%\n\n",
        result.highest_similarity
    ));

    if result.matches.is_empty() {
        output.push_str("No matching references.\n");
    } else {
        output.push_str("Matches:\n");
        for m in &result.matches {
            output.push_str(&format!(
                "  {}: {:.2}%{}\n",
                m.reference_id,
                m.similarity,
                if m.paraphrase { " (paraphrased)" } else { "" }
            ));
        }
    }

    let ai = &result.ai_detection;
    output.push_str("\nAI content: ");
    if ai.assessed {
        output.push_str(&format!(
            "{} (confidence {:.0}%)\n",
            if ai.is_ai_generated {
                "likely generated"
            } else {
                "likely human"
            },
            ai.confidence
        ));
        for name in ai.indicators.fired() {
            output.push_str(&format!("  - {}\n", humanize(name)));
        }
    } else {
        output.push_str("not assessed (text too short)\n");
    }

    output
}

fn format_plagiarism_markdown(result: &PlagiarismResult) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "# Plagiarism Report\n\n**Flagged**: {}\n**Highest Similarity**: {:.2}%\n**Method**: {}\n\n",
        if result.flagged { "yes" } else { "no" },
        result.highest_similarity,
        result.detection_method
    ));

    output.push_str(
        "## References\n\n| Reference | Similarity | Paraphrase |\n|-----------|------------|------------|\n",
    );
    for s in &result.similarity_scores {
        output.push_str(&format!(
            "| {} | {:.2}% | {} |\n",
            s.reference_id,
            s.similarity,
            if s.paraphrase { "yes" } else { "no" }
        ));
    }
    output.push('\n');

    let ai = &result.ai_detection;
    output.push_str("## AI Content\n\n");
    if ai.assessed {
        output.push_str(&format!(
            "**Generated**: {}\n**Confidence**: {:.0}%\n\n",
            if ai.is_ai_generated { "likely" } else { "unlikely" },
            ai.confidence
        ));
        for name in ai.indicators.fired() {
            output.push_str(&format!("- {}\n", humanize(name)));
        }
    } else {
        output.push_str("Not assessed: text too short.\n");
    }

    output
}

fn signed(delta: i32) -> String {
    if delta > 0 {
        format!("+{}", delta)
    } else {
        delta.to_string()
    }
}

fn format_comparison_pretty(comparison: &GradingComparison) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Grading Comparison\n\nBefore: {} -> After: {} ({})\n\n",
        comparison.before_score,
        comparison.after_score,
        signed(comparison.overall_delta)
    ));

    if !comparison.criterion_deltas.is_empty() {
        output.push_str("Criteria:\n");
        for (name, delta) in &comparison.criterion_deltas {
            output.push_str(&format!("  {}: {}\n", humanize(name), signed(*delta)));
        }
        output.push('\n');
    }

    if !comparison.improvements.is_empty() {
        output.push_str("Improvements:\n");
        for imp in &comparison.improvements {
            output.push_str(&format!("  + {}\n", imp));
        }
        output.push('\n');
    }

    if !comparison.regressions.is_empty() {
        output.push_str("Regressions:\n");
        for reg in &comparison.regressions {
            output.push_str(&format!("  - {}\n", reg));
        }
        output.push('\n');
    }

    output
}

fn format_comparison_markdown(comparison: &GradingComparison) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "# Grading Comparison\n\n**Before**: {}\n**After**: {}\n**Change**: {}\n\n",
        comparison.before_score,
        comparison.after_score,
        signed(comparison.overall_delta)
    ));

    if !comparison.improvements.is_empty() {
        output.push_str("## Improvements\n\n");
        for imp in &comparison.improvements {
            output.push_str(&format!("- {}\n", imp));
        }
        output.push('\n');
    }

    if !comparison.regressions.is_empty() {
        output.push_str("## Regressions\n\n");
        for reg in &comparison.regressions {
            output.push_str(&format!("- {}\n", reg));
        }
    }

    output
}

/// Wrap text to fit within a given width
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        if current_line.is_empty() {
            current_line = word.to_string();
        } else if current_line.chars().count() + 1 + word.chars().count() <= width {
            current_line.push(' ');
            current_line.push_str(word);
        } else {
            lines.push(current_line);
            current_line = word.to_string();
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}
