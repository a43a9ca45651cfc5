/// Check if 4 bytes match `xn--` (case insensitive).
fn is_punycode_prefix(slice: &[u8]) -> bool {
    slice.len() >= 4
        && matches!(slice[0], b'x' | b'X')
        && matches!(slice[1], b'n' | b'N')
        && slice[2] == b'-'
        && slice[3] == b'-'
}

/// Check if any label of the domain carries the Punycode `xn--` prefix.
pub(crate) fn has_punycode(domain: &str) -> bool {
    let bytes = domain.as_bytes();
    if bytes.len() < 4 {
        return false;
    }
    if is_punycode_prefix(bytes) {
        return true;
    }
    memchr::memchr_iter(b'.', bytes).any(|pos| is_punycode_prefix(&bytes[pos + 1..]))
}

/// Process a domain using the IDNA `ToASCII` algorithm with the WHATWG UTS #46
/// profile (transitional processing off, CheckHyphens off, VerifyDNSLength
/// false).
///
/// # Errors
///
/// Returns the underlying IDNA error when the domain cannot be mapped.
pub(crate) fn domain_to_ascii(domain: &str) -> Result<String, idna::Errors> {
    // Fast path: pure ASCII without percent-escapes or Punycode labels maps
    // to its lowercase form. Punycode labels still need full validation.
    if domain.is_ascii() && !domain.contains('%') && !has_punycode(domain) {
        return Ok(domain.to_ascii_lowercase());
    }
    idna::domain_to_ascii(domain)
}

/// The escape hatch for inputs a stricter UTS #46 implementation rejects but
/// the URL Standard keeps: ASCII scalars plus the comparison symbols U+2260,
/// U+226E and U+226F, with no `xn--` label anywhere.
pub(crate) fn contains_only_ascii_or_misc_and_no_punycode(domain: &str) -> bool {
    domain
        .chars()
        .all(|c| c.is_ascii() || matches!(c, '\u{2260}' | '\u{226e}' | '\u{226f}'))
        && !has_punycode(domain)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_to_ascii() {
        assert_eq!(domain_to_ascii("example.com").unwrap(), "example.com");
        assert_eq!(domain_to_ascii("EXAMPLE.COM").unwrap(), "example.com");

        let result = domain_to_ascii("日本.jp").unwrap();
        assert!(result.starts_with("xn--"));

        assert_eq!(domain_to_ascii("faß.example").unwrap(), "xn--fa-hia.example");
    }

    #[test]
    fn test_has_punycode() {
        assert!(has_punycode("xn--fa-hia.example"));
        assert!(has_punycode("example.XN--abc"));
        assert!(!has_punycode("example.com"));
        assert!(!has_punycode("axn--b.com"));
    }

    #[test]
    fn test_ascii_or_misc_escape_hatch() {
        assert!(contains_only_ascii_or_misc_and_no_punycode("abc"));
        assert!(!contains_only_ascii_or_misc_and_no_punycode("xn--abc"));
        assert!(contains_only_ascii_or_misc_and_no_punycode("abcxn--"));
        assert!(!contains_only_ascii_or_misc_and_no_punycode("abc.xn--"));
        assert!(contains_only_ascii_or_misc_and_no_punycode("xnabc--"));
        assert!(contains_only_ascii_or_misc_and_no_punycode("xn.--"));
        assert!(contains_only_ascii_or_misc_and_no_punycode("ab\u{2260}c"));
        assert!(!contains_only_ascii_or_misc_and_no_punycode("ab\u{2261}c"));
    }
}
