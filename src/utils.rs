//! String helpers shared by the fetcher, translator, and renderer.

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` bytes (backing off to a character
/// boundary) with an ellipsis and byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}

/// The first `max` characters of `s`.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Make an API timestamp readable: `2025-05-06T10:00:00Z` -> `2025-05-06 10:00:00 UTC`.
///
/// The value is otherwise passed through untouched; it is never parsed.
pub fn format_published(raw: &str) -> String {
    raw.replace('T', " ").replace('Z', " UTC")
}
