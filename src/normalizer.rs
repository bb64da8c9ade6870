// 🧹 Text Normalizer
// Cleans raw feedback text before it reaches the linguistic engine

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Anything that is not a word char, whitespace, or basic punctuation
static DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s.,!?;:\-()]").unwrap());

/// Normalize feedback text.
///
/// Collapses whitespace runs to one space, strips characters outside
/// `{word chars, whitespace, . , ! ? ; : - ( )}` and trims the result.
/// Empty input (or input made entirely of stripped characters) yields `""`.
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let collapsed = WHITESPACE_RUN.replace_all(text, " ");
    let cleaned = DISALLOWED.replace_all(&collapsed, "");

    cleaned.trim().to_string()
}
