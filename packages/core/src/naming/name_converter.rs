//! Name conversion: text to url-safe tokens.
//!
//! ```rust
//! use pagetree_core::naming::{convert_to_urlname, convert_url_name};
//!
//! assert_eq!(convert_to_urlname("klingon$&stößel "), "klingon-stoessel");
//! assert_eq!(convert_url_name("Au", 3), "-au");
//! ```

use regex::Regex;
use std::sync::OnceLock;

/// Minimum length of a urlname segment.
///
/// Shorter segments are left-padded with dashes so they never collide with
/// two-letter language codes used as path prefixes.
pub const MIN_URLNAME_LENGTH: usize = 3;

const PAD_CHAR: char = '-';

// Anything outside the allowed token alphabet becomes a separator
const DISALLOWED_PATTERN: &str = r"[^a-z0-9\-_]+";

const REPEATED_SEPARATOR_PATTERN: &str = r"-{2,}";

/// German umlauts expand to two letters instead of dropping the diaeresis
fn expand_umlauts(text: &str) -> String {
    let mut expanded = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            'ä' | 'Ä' => expanded.push_str("ae"),
            'ö' | 'Ö' => expanded.push_str("oe"),
            'ü' | 'Ü' => expanded.push_str("ue"),
            'ß' => expanded.push_str("ss"),
            other => expanded.push(other),
        }
    }
    expanded
}

/// Converts arbitrary text into a url-friendly token.
///
/// Transliterates to ASCII, lowercases, replaces disallowed characters with
/// dashes, collapses repeated dashes and trims them from both ends. Total:
/// input made only of disallowed characters yields an empty string.
pub fn convert_to_urlname(text: &str) -> String {
    static DISALLOWED: OnceLock<Regex> = OnceLock::new();
    static REPEATED: OnceLock<Regex> = OnceLock::new();
    let disallowed = DISALLOWED.get_or_init(|| Regex::new(DISALLOWED_PATTERN).unwrap());
    let repeated = REPEATED.get_or_init(|| Regex::new(REPEATED_SEPARATOR_PATTERN).unwrap());

    let ascii = deunicode::deunicode(&expand_umlauts(text)).to_lowercase();
    let replaced = disallowed.replace_all(&ascii, "-");
    let collapsed = repeated.replace_all(&replaced, "-");

    collapsed.trim_matches(PAD_CHAR).to_string()
}

/// Converts text into a urlname segment of at least `min_length` characters.
///
/// Names shorter than `min_length` are filled up with leading dashes.
pub fn convert_url_name(text: &str, min_length: usize) -> String {
    let token = convert_to_urlname(text);
    let length = token.chars().count();
    if length < min_length {
        let mut padded = PAD_CHAR.to_string().repeat(min_length - length);
        padded.push_str(&token);
        padded
    } else {
        token
    }
}
