//! Free text normalization for BR Code fields.
//!
//! Payment apps only accept a reduced ASCII set in merchant name, city,
//! description and reference label. Accented letters degrade to their base
//! letter and everything else outside the set is dropped.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

const ALLOWED_PUNCTUATION: [char; 6] = ['.', ',', '-', '/', '@', ':'];

fn is_allowed(c: &char) -> bool {
    c.is_ascii_alphanumeric() || *c == ' ' || ALLOWED_PUNCTUATION.contains(c)
}

/// Normalizes `text` to the BR Code character set and cuts it at `max_length`.
///
/// Never fails, the worst case is an empty string.
///
/// # Example
/// ```ignore
/// use crate::pix::sanitize;
///
/// assert_eq!(sanitize("  São   Paulo!!! ", 15), "Sao Paulo");
/// ```
pub fn sanitize(text: &str, max_length: usize) -> String {
    let ascii_text = text
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .filter(is_allowed)
        .collect::<String>();

    ascii_text
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
        .chars()
        .take(max_length)
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// Same as [sanitize] but keeps only `[A-Za-z0-9]`, used for the reference label.
pub fn sanitize_alphanumeric(text: &str, max_length: usize) -> String {
    sanitize(text, usize::MAX)
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(max_length)
        .collect()
}
