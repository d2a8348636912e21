//! Multiple-choice option lines: detection and selection handling.

use std::sync::LazyLock;

use regex::Regex;

/// A selectable answer line: one uppercase letter A–D, a literal period, then
/// at least one whitespace character, at the start of the line.
static OPTION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-D]\.\s").expect("option pattern compiles"));

/// Extract lettered multiple-choice lines (A.–D.) from a message, trimmed,
/// in original order. Non-matching lines are dropped from the result (they
/// stay in the message itself for display). Empty or non-matching input
/// yields an empty vec, never an error.
pub fn parse_options(message: &str) -> Vec<String> {
    message
        .split('\n')
        .filter(|line| OPTION_LINE.is_match(line))
        .map(|line| line.trim().to_string())
        .collect()
}

/// Resolve a selected option line into the next chat input value: its leading
/// letter, lower-cased (the service expects "a".."d", not the full line).
/// Returns `None` for empty or non-option input.
pub fn option_input_value(option: &str) -> Option<String> {
    let letter = option.split('.').next()?.trim();
    let mut chars = letter.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if ('A'..='D').contains(&c) => {
            Some(c.to_ascii_lowercase().to_string())
        }
        _ => None,
    }
}
