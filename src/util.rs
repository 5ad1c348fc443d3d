//! Shared utility helpers.

/// Maximum number of characters kept in an error snippet.
const SNIPPET_CHARS: usize = 60;

/// 1-based line number of a byte offset.
#[inline]
pub fn line_of(source: &str, offset: usize) -> usize {
    let end = offset.min(source.len());
    source.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}

/// First line of text starting at `offset`, truncated for error messages.
pub fn snippet_at(source: &str, offset: usize) -> String {
    let rest = source.get(offset..).unwrap_or("");
    let first_line = rest.lines().next().unwrap_or("").trim_end();
    let mut snippet: String = first_line.chars().take(SNIPPET_CHARS).collect();
    if first_line.chars().count() > SNIPPET_CHARS {
        snippet.push_str("...");
    }
    snippet
}

/// Case-insensitive starts_with check without allocating.
#[inline]
pub fn starts_with_ci(haystack: &str, needle: &str) -> bool {
    haystack.len() >= needle.len()
        && haystack.as_bytes()[..needle.len()].eq_ignore_ascii_case(needle.as_bytes())
}
