//! Minimum-quality check for override justifications.

/// Shortest accepted justification, in characters after trimming.
pub const MIN_JUSTIFICATION_CHARS: usize = 20;

/// Filler that never counts as a reason, compared case-insensitively.
const PLACEHOLDERS: [&str; 10] = [
    "n/a", "na", "none", "todo", "tbd", "test", "testing", "fix", "override", "placeholder",
];

/// Returns the trimmed justification, or a reason it was rejected.
pub fn assess(input: &str) -> Result<String, String> {
    let text = input.trim();
    if text.is_empty() {
        return Err("justification is empty".to_string());
    }
    if !text.chars().any(char::is_alphanumeric) {
        return Err("justification has no words".to_string());
    }
    let lowered = text.to_lowercase();
    let stripped = lowered.trim_matches(|c: char| !c.is_alphanumeric());
    if PLACEHOLDERS.iter().any(|p| *p == stripped) || is_repeated_char(stripped) {
        return Err("justification is a placeholder".to_string());
    }
    let length = text.chars().count();
    if length < MIN_JUSTIFICATION_CHARS {
        return Err(format!(
            "justification is too short ({length} characters, need at least {MIN_JUSTIFICATION_CHARS})"
        ));
    }
    Ok(text.to_string())
}

fn is_repeated_char(text: &str) -> bool {
    let mut chars = text.chars().filter(|c| !c.is_whitespace());
    match chars.next() {
        Some(first) => chars.all(|c| c == first),
        None => false,
    }
}
