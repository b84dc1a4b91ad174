//! Plain-text summary derivation from markdown note bodies.

use once_cell::sync::Lazy;
use regex::Regex;

/// Shown when a note body is empty or whitespace-only.
pub const EMPTY_NOTE_SUMMARY: &str = "Empty note";

const SUMMARY_MAX_CHARS: usize = 100;

static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^#{1,6}\s+").expect("valid heading regex"));

/// Derives a short plain-text preview from note content.
///
/// Rules:
/// - Whitespace-only content yields [`EMPTY_NOTE_SUMMARY`].
/// - Heading hashes, bold/italic asterisks and backticks are stripped.
/// - The first non-empty line is used, truncated to 100 characters with a
///   trailing `...` when cut.
pub fn summarize(content: &str) -> String {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return EMPTY_NOTE_SUMMARY.to_string();
    }

    let without_headings = HEADING_RE.replace_all(trimmed, "");
    let cleaned = without_headings.replace(['*', '`'], "");

    let first_line = cleaned
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("");

    if first_line.is_empty() {
        return EMPTY_NOTE_SUMMARY.to_string();
    }

    let char_count = first_line.chars().count();
    if char_count > SUMMARY_MAX_CHARS {
        let mut truncated = first_line
            .chars()
            .take(SUMMARY_MAX_CHARS)
            .collect::<String>();
        truncated.push_str("...");
        truncated
    } else {
        first_line.to_string()
    }
}
