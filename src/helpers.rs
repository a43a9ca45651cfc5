use crate::character_sets::is_ascii_tab_or_newline;
use std::borrow::Cow;

/// Fast check if string contains tabs or newlines.
pub(crate) fn has_tabs_or_newline(input: &str) -> bool {
    memchr::memchr3(b'\t', b'\n', b'\r', input.as_bytes()).is_some()
}

/// Trim leading and trailing C0 controls and spaces per the WHATWG URL spec.
/// Returns the trimmed slice and whether anything was removed.
pub(crate) fn trim_c0_or_space(input: &str) -> (&str, bool) {
    let trimmed = input.trim_matches(|c: char| c <= ' ');
    (trimmed, trimmed.len() != input.len())
}

/// Remove all ASCII tab and newline characters.
/// Returns a borrowed slice when nothing had to be removed.
pub(crate) fn remove_tab_or_newline(input: &str) -> (Cow<'_, str>, bool) {
    if !has_tabs_or_newline(input) {
        return (Cow::Borrowed(input), false);
    }
    let cleaned: String = input
        .chars()
        .filter(|&c| !is_ascii_tab_or_newline(c))
        .collect();
    (Cow::Owned(cleaned), true)
}
