//! Marker-anchored text extraction shared by the reading and abstract rules.

/// Returns the text between `start_marker` and the earliest of `end_markers`
/// (or the end of `text` when none follows). `None` when `start_marker` is
/// absent. An empty `end_markers` slice captures to the end of the text.
pub fn extract_section<'a>(
    text: &'a str,
    start_marker: &str,
    end_markers: &[&str],
) -> Option<&'a str> {
    let start = text.find(start_marker)? + start_marker.len();
    let rest = &text[start..];
    let end = end_markers
        .iter()
        .filter(|marker| !marker.is_empty())
        .filter_map(|marker| rest.find(marker))
        .min()
        .unwrap_or(rest.len());
    Some(&rest[..end])
}

/// Collapses `\r\n`, `\r` and `\n` into a single `\n`.
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Length in logical characters after newline normalization.
pub fn normalized_len(text: &str) -> usize {
    normalize_newlines(text).chars().count()
}
