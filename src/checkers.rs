/// A single-dot path segment: `.` or `%2e` in any ASCII case.
pub(crate) fn is_single_dot_path_segment(s: &str) -> bool {
    s == "." || s.eq_ignore_ascii_case("%2e")
}

/// A double-dot path segment: `..` or any `%2e`-encoded spelling of it in any
/// ASCII case.
pub(crate) fn is_double_dot_path_segment(s: &str) -> bool {
    if s == ".." {
        return true;
    }
    s.eq_ignore_ascii_case(".%2e")
        || s.eq_ignore_ascii_case("%2e.")
        || s.eq_ignore_ascii_case("%2e%2e")
}

/// A Windows drive letter: an ASCII alpha followed by `:` or `|`.
pub(crate) fn is_windows_drive_letter(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 2 && bytes[0].is_ascii_alphabetic() && matches!(bytes[1], b':' | b'|')
}

/// A normalized Windows drive letter uses `:`.
pub(crate) fn is_normalized_windows_drive_letter(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Whether the remaining input starts with a Windows drive letter: the first
/// two scalars form a drive letter and the third (if any) is `/`, `\`, `?`
/// or `#`.
pub(crate) fn starts_with_windows_drive_letter(s: &[char]) -> bool {
    if s.len() < 2 || !s[0].is_ascii_alphabetic() || !matches!(s[1], ':' | '|') {
        return false;
    }
    s.len() == 2 || matches!(s[2], '/' | '\\' | '?' | '#')
}
