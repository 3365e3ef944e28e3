/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// First `max_chars` characters of `text`, with an ellipsis when truncated.
///
/// Counts characters rather than bytes so multi-byte input never splits.
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// Render a criterion name for people: `content_quality` -> `content quality`.
pub fn humanize(name: &str) -> String {
    name.replace('_', " ")
}

/// Extract JSON content from an LLM response.
///
/// Handles three formats:
/// 1. JSON in a ```json code fence
/// 2. JSON in a generic ``` code fence
/// 3. Raw JSON starting with `{`
///
/// Returns the extracted JSON string slice, or None if no JSON found.
pub fn extract_json_str(response: &str) -> Option<&str> {
    if let Some(start) = response.find("```json") {
        let content_start = start + 7;
        let end = response[content_start..]
            .find("```")
            .map(|e| content_start + e)?;
        return Some(response[content_start..end].trim());
    }

    if let Some(start) = response.find("```") {
        let content_start = start + 3;
        // Skip language identifier on same line
        let line_end = response[content_start..]
            .find('\n')
            .map(|n| content_start + n + 1)
            .unwrap_or(content_start);
        let end = response[line_end..].find("```").map(|e| line_end + e)?;
        return Some(response[line_end..end].trim());
    }

    let start = response.find('{')?;
    let end = response.rfind('}')?;
    if start <= end {
        Some(response[start..=end].trim())
    } else {
        None
    }
}
