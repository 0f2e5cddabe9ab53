//! Utility functions and helpers.

/// Truncate `s` to at most `max_chars` characters.
///
/// Counts Unicode scalar values, never splitting a multi-byte character:
/// ```ignore
/// assert_eq!(truncate_chars("héllo", 2), "hé");
/// ```
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
