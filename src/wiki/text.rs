//! Pure text shaping for article summaries and content.
//!
//! All lengths here are counted in characters (Unicode scalar values), so a
//! `max_length` of 100 never splits a multi-byte character.

/// Appended on its own paragraph whenever content is cut.
pub const TRUNCATION_MARKER: &str = "\n\n[Content truncated...]";

/// Appended before [`TRUNCATION_MARKER`] when no clean break point was found.
pub const HARD_CUT_ELLIPSIS: &str = "...";

/// Keeps the first `count` sentences of `summary`.
///
/// Splits on `.`, trims each fragment, drops empty ones, rejoins with `". "`
/// and makes sure the result ends with exactly one period. Returns an empty
/// string when the summary has no non-empty fragments.
#[must_use]
pub fn limit_sentences(summary: &str, count: usize) -> String {
    let mut result = summary
        .split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(count)
        .collect::<Vec<_>>()
        .join(". ");

    if !result.is_empty() && !result.ends_with('.') {
        result.push('.');
    }
    result
}

/// Truncates `content` to roughly `max_length` characters.
///
/// Content that already fits is returned unchanged. Otherwise the last `.`
/// or newline inside the first `max_length` characters is used as the cut
/// point, but only if it lies beyond 80% of `max_length`; failing that the
/// prefix is cut hard and followed by [`HARD_CUT_ELLIPSIS`]. Either way the
/// result ends with [`TRUNCATION_MARKER`].
#[must_use]
pub fn truncate_content(content: &str, max_length: usize) -> String {
    let prefix_end = match content.char_indices().nth(max_length) {
        Some((idx, _)) => idx,
        None => return content.to_string(),
    };
    let prefix = &content[..prefix_end];

    let break_point = prefix.rfind(|c| c == '.' || c == '\n');

    if let Some(byte_idx) = break_point {
        let char_pos = prefix[..byte_idx].chars().count();
        // char_pos > 0.8 * max_length, kept in integers
        if char_pos * 5 > max_length * 4 {
            let mut out = String::with_capacity(byte_idx + 1 + TRUNCATION_MARKER.len());
            out.push_str(&content[..=byte_idx]);
            out.push_str(TRUNCATION_MARKER);
            return out;
        }
    }

    let mut out = String::with_capacity(
        prefix.len() + HARD_CUT_ELLIPSIS.len() + TRUNCATION_MARKER.len(),
    );
    out.push_str(prefix);
    out.push_str(HARD_CUT_ELLIPSIS);
    out.push_str(TRUNCATION_MARKER);
    out
}
