//! Percent-encoding machinery. Byte formatting and decoding come from the
//! `percent-encoding` crate; set membership is decided by
//! [`PercentEncodeSet`] so callers can supply runtime-configured sets.

use crate::character_sets::PercentEncodeSet;
use percent_encoding::{percent_decode, percent_encode_byte};

/// A single-byte character map used to encode query scalars under an
/// encoding override. Scalars the map cannot represent fall back to UTF-8.
#[derive(Debug, Clone, Copy)]
pub struct EncodingOverride {
    name: &'static str,
    encode: fn(char) -> Option<u8>,
}

impl EncodingOverride {
    /// The name of the character map.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn encode(&self, c: char) -> Option<u8> {
        (self.encode)(c)
    }
}

fn iso_8859_1_byte(c: char) -> Option<u8> {
    let u = c as u32;
    (u <= 0xff).then_some(u as u8)
}

/// ISO-8859-1 (Latin-1): code points up to U+00FF map to themselves.
pub const ISO_8859_1: EncodingOverride = EncodingOverride {
    name: "ISO-8859-1",
    encode: iso_8859_1_byte,
};

/// Percent-encode a single scalar into `output` under `set`.
pub(crate) fn percent_encode_char(output: &mut String, c: char, set: PercentEncodeSet) {
    if !set.contains(c) {
        output.push(c);
        return;
    }
    let mut utf8 = [0u8; 4];
    for &b in c.encode_utf8(&mut utf8).as_bytes() {
        output.push_str(percent_encode_byte(b));
    }
}

/// Percent-encode a single scalar, routing it through the encoding override
/// when one is given and the scalar is representable in it.
pub(crate) fn percent_encode_char_with(
    output: &mut String,
    c: char,
    set: PercentEncodeSet,
    encoding: Option<EncodingOverride>,
) {
    if let Some(encoding) = encoding
        && let Some(b) = encoding.encode(c)
    {
        if set.contains_byte(b) {
            output.push_str(percent_encode_byte(b));
        } else {
            output.push(b as char);
        }
        return;
    }
    percent_encode_char(output, c, set);
}

/// Percent-encode every scalar of `input` under `set`.
pub(crate) fn percent_encode_str(input: &str, set: PercentEncodeSet) -> String {
    let mut output = String::with_capacity(input.len());
    for c in input.chars() {
        percent_encode_char(&mut output, c, set);
    }
    output
}

/// Percent-encode raw bytes under `set`. Used where decoded bytes must be
/// re-encoded without a round trip through UTF-8.
pub(crate) fn percent_encode_bytes(input: &[u8], set: PercentEncodeSet) -> String {
    let mut output = String::with_capacity(input.len());
    for &b in input {
        if set.contains_byte(b) {
            output.push_str(percent_encode_byte(b));
        } else {
            output.push(b as char);
        }
    }
    output
}

/// Decode `%HH` sequences once. Malformed sequences are left literal.
pub(crate) fn percent_decode_to_bytes(input: &[u8]) -> Vec<u8> {
    percent_decode(input).collect()
}

/// Decode `%HH` sequences once into a string, replacing ill-formed UTF-8.
pub fn percent_decode_string(input: &str) -> String {
    percent_decode(input.as_bytes()).decode_utf8_lossy().into_owned()
}

/// Repeatedly percent-decode until a fixed point is reached. Each pass either
/// strictly shortens the byte string or leaves it unchanged, so this
/// terminates.
pub(crate) fn repeated_percent_decode_bytes(input: &[u8]) -> Vec<u8> {
    let mut current = input.to_vec();
    loop {
        let decoded = percent_decode_to_bytes(&current);
        if decoded == current {
            return current;
        }
        current = decoded;
    }
}

/// Repeatedly percent-decode a string until a fixed point is reached.
pub fn repeated_percent_decode(input: &str) -> String {
    String::from_utf8_lossy(&repeated_percent_decode_bytes(input.as_bytes())).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character_sets::{
        C0_PERCENT_ENCODE_SET, PATH_PERCENT_ENCODE_SET, QUERY_PERCENT_ENCODE_SET,
        USERINFO_PERCENT_ENCODE_SET,
    };

    #[test]
    fn test_percent_encode_char() {
        let mut out = String::new();
        percent_encode_char(&mut out, 'a', PATH_PERCENT_ENCODE_SET);
        percent_encode_char(&mut out, '{', PATH_PERCENT_ENCODE_SET);
        percent_encode_char(&mut out, 'é', PATH_PERCENT_ENCODE_SET);
        assert_eq!(out, "a%7B%C3%A9");
    }

    #[test]
    fn test_percent_encode_str() {
        assert_eq!(
            percent_encode_str("us er:pass\\", USERINFO_PERCENT_ENCODE_SET),
            "us%20er%3Apass%5C"
        );
        assert_eq!(percent_encode_str("plain", C0_PERCENT_ENCODE_SET), "plain");
    }

    #[test]
    fn test_encoding_override() {
        let mut out = String::new();
        percent_encode_char_with(&mut out, 'é', QUERY_PERCENT_ENCODE_SET, Some(ISO_8859_1));
        assert_eq!(out, "%E9");

        // Unmappable scalars fall back to UTF-8.
        let mut out = String::new();
        percent_encode_char_with(&mut out, '€', QUERY_PERCENT_ENCODE_SET, Some(ISO_8859_1));
        assert_eq!(out, "%E2%82%AC");
    }

    #[test]
    fn test_percent_decode_leaves_invalid_literal() {
        assert_eq!(percent_decode_string("hello%20world"), "hello world");
        assert_eq!(percent_decode_string("%2F"), "/");
        assert_eq!(percent_decode_string("100%"), "100%");
        assert_eq!(percent_decode_string("%zz"), "%zz");
    }

    #[test]
    fn test_repeated_decode_fixed_point() {
        assert_eq!(repeated_percent_decode("%25%32%35"), "%");
        assert_eq!(repeated_percent_decode("%2525252525"), "%");
        let once = repeated_percent_decode("%25%32%35asd%%");
        assert_eq!(repeated_percent_decode(&once), once);
    }
}
