// src/gateway/sanitize.rs

const FENCE: &str = "```";

/// Strips a markdown code fence (optionally tagged, e.g. ```` ```json ````) wrapped
/// around a model response, plus surrounding whitespace.
///
/// Unfenced text is returned trimmed. Whether the result is valid JSON is the
/// caller's concern.
pub fn sanitize(raw: &str) -> String {
    let trimmed = raw.trim();
    let Some(after_open) = trimmed.strip_prefix(FENCE) else {
        return trimmed.to_string();
    };

    let body = match after_open.find('\n') {
        Some(newline) => &after_open[newline + 1..],
        // Single-line fence: skip the language tag, if any.
        None => after_open.trim_start_matches(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-'),
    };

    let body = body.trim_end();
    let body = body.strip_suffix(FENCE).unwrap_or(body);
    body.trim().to_string()
}
