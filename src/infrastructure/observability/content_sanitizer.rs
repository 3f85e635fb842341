const MAX_VISIBLE_CHARS: usize = 100;

const SENSITIVE_PATTERNS: [&str; 7] = [
    "Bearer ",
    "api_key=",
    "password=",
    "secret=",
    "token=",
    "access-token=",
    "refresh-token=",
];

/// Shortens chat content and masks credentials before it reaches a log line.
pub fn sanitize_content(content: &str) -> String {
    let trimmed = content.trim();

    if trimmed.is_empty() {
        return String::from("[EMPTY]");
    }

    let total_chars = trimmed.chars().count();
    let visible = if total_chars > MAX_VISIBLE_CHARS {
        let cut = trimmed
            .char_indices()
            .nth(MAX_VISIBLE_CHARS)
            .map(|(idx, _)| idx)
            .unwrap_or(trimmed.len());
        format!("{}... ({} chars total)", &trimmed[..cut], total_chars)
    } else {
        trimmed.to_string()
    };

    redact_sensitive_patterns(&visible)
}

fn redact_sensitive_patterns(text: &str) -> String {
    let mut result = text.to_string();

    for pattern in SENSITIVE_PATTERNS {
        let mut search_from = 0;
        while let Some(found) = result[search_from..].find(pattern) {
            let value_start = search_from + found + pattern.len();
            let value_end = result[value_start..]
                .find(|c: char| c.is_whitespace() || matches!(c, '&' | ';' | '"' | '\''))
                .map(|i| value_start + i)
                .unwrap_or(result.len());

            result.replace_range(value_start..value_end, "[REDACTED]");
            search_from = value_start + "[REDACTED]".len();
        }
    }

    result
}
