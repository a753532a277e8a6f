use once_cell::sync::Lazy;
use regex::Regex;

static LINE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n|\s*-\s+").expect("line break pattern is valid"));

/// Splits an assistant reply into display lines: one per newline and one
/// per ` - ` bullet, trimmed, empties dropped.
pub fn format_reply_lines(message: &str) -> Vec<String> {
    LINE_BREAK
        .split(message)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
