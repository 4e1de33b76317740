//! Turning a multi-result search into one chosen title.

/// Builds the numbered question shown to the user.
#[must_use]
pub fn format_options(query: &str, candidates: &[String]) -> String {
    let options = candidates
        .iter()
        .enumerate()
        .map(|(i, title)| format!("{}. {title}", i + 1))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Found {} Wikipedia articles for '{query}':\n\n{options}\n\nWhich article would you like?",
        candidates.len()
    )
}

/// Resolves the user's answer against the candidate titles.
///
/// A case-insensitive substring match wins first, taking the earliest
/// candidate that matches. Otherwise the answer is read as a 1-based index.
/// Returns `None` if neither applies.
#[must_use]
pub fn resolve_selection<'a>(input: &str, candidates: &'a [String]) -> Option<&'a str> {
    let needle = input.to_lowercase();

    if let Some(title) = candidates
        .iter()
        .find(|title| title.to_lowercase().contains(&needle))
    {
        return Some(title);
    }

    let index = input.parse::<usize>().ok()?;
    index
        .checked_sub(1)
        .and_then(|i| candidates.get(i))
        .map(String::as_str)
}
