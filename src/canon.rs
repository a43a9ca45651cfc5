//! URL canonicalization profiles composing parser options with
//! post-processing passes: percent-decode loops, component removal and query
//! sorting. The stock profiles mirror well-known policies; custom ones are
//! assembled from a [`Parser`] and the builder-style flags.

use crate::character_sets::{
    C0_OR_SPACE_PERCENT_ENCODE_SET, PATH_PERCENT_ENCODE_SET, PercentEncodeSet,
    QUERY_PERCENT_ENCODE_SET,
};
use crate::error::{ErrorKind, Result};
use crate::parser::Parser;
use crate::unicode::percent_encode::{
    ISO_8859_1, percent_encode_bytes, repeated_percent_decode_bytes,
};
use crate::url::Url;
use std::collections::HashMap;
use std::sync::LazyLock;

/// How a profile sorts query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuerySort {
    /// Leave the query untouched.
    #[default]
    Unsorted,
    /// Stable sort on parameter names; repeated names keep their order.
    Keys,
    /// Sort on the entire name/value pair.
    Parameter,
}

/// The percent-encode set Google Safe Browsing canonicalization re-encodes
/// with: everything below 0x21 plus `#` and `%`.
pub const GOOGLE_SAFE_BROWSING_PERCENT_ENCODE_SET: PercentEncodeSet =
    C0_OR_SPACE_PERCENT_ENCODE_SET.set(b'#').set(b'%');

/// A path encode set that tolerates `<` and `>` (and never re-encodes dots).
pub const LAX_PATH_PERCENT_ENCODE_SET: PercentEncodeSet = PATH_PERCENT_ENCODE_SET
    .clear(b'.')
    .clear(b'<')
    .clear(b'>');

/// A query encode set that keeps `"` (and friends) literal.
pub const LAX_QUERY_PERCENT_ENCODE_SET: PercentEncodeSet = QUERY_PERCENT_ENCODE_SET
    .clear(b'"')
    .clear(b'%')
    .clear(b'/')
    .clear(b';')
    .clear(b'?')
    .clear(b'{');

/// A canonicalization policy: a configured parser plus post passes applied to
/// every record it produces.
#[derive(Debug, Clone)]
pub struct Canonicalizer {
    parser: Parser,
    remove_user_info: bool,
    remove_port: bool,
    remove_fragment: bool,
    sort_query: QuerySort,
    repeated_percent_decoding: bool,
    default_scheme: Option<String>,
}

impl Canonicalizer {
    /// A canonicalizer around `parser` with no post passes.
    pub fn new(parser: Parser) -> Self {
        Self {
            parser,
            remove_user_info: false,
            remove_port: false,
            remove_fragment: false,
            sort_query: QuerySort::Unsorted,
            repeated_percent_decoding: false,
            default_scheme: None,
        }
    }

    /// Strip username and password.
    #[must_use]
    pub fn remove_user_info(mut self) -> Self {
        self.remove_user_info = true;
        self
    }

    /// Strip the port even when it is not the scheme default.
    #[must_use]
    pub fn remove_port(mut self) -> Self {
        self.remove_port = true;
        self
    }

    /// Strip the fragment.
    #[must_use]
    pub fn remove_fragment(mut self) -> Self {
        self.remove_fragment = true;
        self
    }

    /// Sort query parameters.
    #[must_use]
    pub fn sort_query(mut self, sort: QuerySort) -> Self {
        self.sort_query = sort;
        self
    }

    /// Percent-decode host, path, query and fragment to a fixed point and
    /// re-encode them with
    /// [`GOOGLE_SAFE_BROWSING_PERCENT_ENCODE_SET`].
    #[must_use]
    pub fn repeated_percent_decoding(mut self) -> Self {
        self.repeated_percent_decoding = true;
        self
    }

    /// Retry scheme-less inputs as `<scheme>://<input>`.
    #[must_use]
    pub fn default_scheme(mut self, scheme: &str) -> Self {
        self.default_scheme = Some(scheme.to_string());
        self
    }

    /// Parse and canonicalize an absolute URL.
    ///
    /// # Errors
    ///
    /// Returns the parse error when the input (and, when configured, its
    /// default-scheme retry) cannot be parsed.
    pub fn parse(&self, input: &str) -> Result<Url> {
        let mut url = self.parse_with_default_scheme(input)?;
        self.apply(&mut url);
        Ok(url)
    }

    /// Parse `input` against the base `raw_url`, then canonicalize.
    ///
    /// # Errors
    ///
    /// Returns the parse error when the base or the input cannot be parsed.
    pub fn parse_ref(&self, raw_url: &str, input: &str) -> Result<Url> {
        let base = self.parse_with_default_scheme(raw_url)?;
        let mut url = base.join(input)?;
        self.apply(&mut url);
        Ok(url)
    }

    /// Parse and serialize in one step.
    ///
    /// # Errors
    ///
    /// Returns the parse error when the input cannot be parsed.
    pub fn canonicalize(&self, input: &str) -> Result<String> {
        Ok(self.parse(input)?.href(false))
    }

    fn parse_with_default_scheme(&self, input: &str) -> Result<Url> {
        match self.parser.parse(input) {
            Ok(url) => Ok(url),
            Err(e)
                if e.kind() == ErrorKind::MissingSchemeNonRelativeUrl
                    && self.default_scheme.is_some() =>
            {
                let scheme = self.default_scheme.as_deref().unwrap_or_default();
                self.parser.parse(&format!("{scheme}://{input}"))
            }
            Err(e) => Err(e),
        }
    }

    fn apply(&self, url: &mut Url) {
        if self.repeated_percent_decoding {
            if !url.hostname().is_empty() {
                let host = decode_encode(url.hostname());
                url.set_hostname(&host);
            }
            if !url.pathname().is_empty() {
                let path = decode_encode(&url.pathname());
                url.set_pathname(&path);
            }
            if !url.search().is_empty() {
                url.search_params().iterate(|name, value| {
                    *name = decode_encode(name);
                    *value = decode_encode(value);
                });
            }
            let hash = url.hash();
            if !hash.is_empty() {
                let fragment = decode_encode(hash.trim_start_matches('#'));
                url.set_hash(&fragment);
            }
        }

        if self.remove_port {
            url.set_port("");
        }
        if self.remove_user_info {
            url.set_username("");
            url.set_password("");
        }
        if self.remove_fragment {
            url.set_hash("");
        }

        match self.sort_query {
            QuerySort::Unsorted => {}
            QuerySort::Keys => url.search_params().sort(),
            QuerySort::Parameter => url.search_params().sort_absolute(),
        }
    }
}

/// Repeatedly percent-decode, then re-encode with the Safe Browsing set.
/// Works on raw bytes so decoded non-UTF-8 sequences survive the round trip.
fn decode_encode(s: &str) -> String {
    percent_encode_bytes(
        &repeated_percent_decode_bytes(s.as_bytes()),
        GOOGLE_SAFE_BROWSING_PERCENT_ENCODE_SET,
    )
}

/// Trim leading and trailing dots and collapse runs of dots, the host
/// pre-pass shared by the Safe Browsing and semantic profiles.
fn collapse_host_dots(host: &str) -> String {
    let trimmed = host.trim_matches('.');
    let mut output = String::with_capacity(trimmed.len());
    let mut previous_was_dot = false;
    for c in trimmed.chars() {
        if c == '.' {
            if previous_was_dot {
                continue;
            }
            previous_was_dot = true;
        } else {
            previous_was_dot = false;
        }
        output.push(c);
    }
    output
}

/// The plain WHATWG profile: default parser, no post passes.
pub fn whatwg() -> &'static Canonicalizer {
    static PROFILE: LazyLock<Canonicalizer> =
        LazyLock::new(|| Canonicalizer::new(Parser::new()));
    &PROFILE
}

/// The WHATWG profile with query parameters sorted by name.
pub fn whatwg_sort_query() -> &'static Canonicalizer {
    static PROFILE: LazyLock<Canonicalizer> =
        LazyLock::new(|| Canonicalizer::new(Parser::new()).sort_query(QuerySort::Keys));
    &PROFILE
}

/// The Google Safe Browsing canonicalization profile.
pub fn google_safe_browsing() -> &'static Canonicalizer {
    static PROFILE: LazyLock<Canonicalizer> = LazyLock::new(|| {
        let parser = Parser::builder()
            .lax_host_parsing()
            .query_percent_encode_set(LAX_QUERY_PERCENT_ENCODE_SET)
            .collapse_consecutive_slashes()
            .accept_invalid_codepoints()
            .percent_encode_single_percent_sign()
            .skip_equals_for_empty_search_params_value()
            .encoding_override(ISO_8859_1)
            .pre_parse_host_fn(|_, host| collapse_host_dots(host))
            .build();
        Canonicalizer::new(parser)
            .remove_port()
            .remove_fragment()
            .repeated_percent_decoding()
            .default_scheme("http")
    });
    &PROFILE
}

/// A semantic-equivalence profile: aggressive normalization for URLs meant
/// to be compared, not fetched.
pub fn semantic() -> &'static Canonicalizer {
    static PROFILE: LazyLock<Canonicalizer> = LazyLock::new(|| {
        let mut special: HashMap<String, Option<u16>> = HashMap::from([
            ("ftp".to_string(), Some(21)),
            ("file".to_string(), None),
            ("http".to_string(), Some(80)),
            ("https".to_string(), Some(443)),
            ("ws".to_string(), Some(80)),
            ("wss".to_string(), Some(443)),
        ]);
        special.insert("gopher".to_string(), Some(70));
        let parser = Parser::builder()
            .lax_host_parsing()
            .path_percent_encode_set(LAX_PATH_PERCENT_ENCODE_SET)
            .query_percent_encode_set(LAX_QUERY_PERCENT_ENCODE_SET)
            .collapse_consecutive_slashes()
            .accept_invalid_codepoints()
            .percent_encode_single_percent_sign()
            .allow_setting_path_for_non_base_url()
            .encoding_override(ISO_8859_1)
            .special_schemes(special)
            .pre_parse_host_fn(|_, host| {
                if host.is_empty() {
                    return String::new();
                }
                let collapsed = collapse_host_dots(host);
                if collapsed.is_empty() {
                    "0.0.0.0".to_string()
                } else {
                    collapsed
                }
            })
            .build();
        Canonicalizer::new(parser)
            .remove_user_info()
            .remove_fragment()
            .repeated_percent_decoding()
            .sort_query(QuerySort::Keys)
            .default_scheme("http")
    });
    &PROFILE
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_host_dots() {
        assert_eq!(collapse_host_dots("www.google.com..."), "www.google.com");
        assert_eq!(collapse_host_dots("a...b..c"), "a.b.c");
        assert_eq!(collapse_host_dots("..."), "");
        assert_eq!(collapse_host_dots("plain"), "plain");
    }

    #[test]
    fn test_decode_encode() {
        assert_eq!(decode_encode("%25%32%35"), "%25");
        assert_eq!(decode_encode("abc"), "abc");
        assert_eq!(decode_encode("a b#c"), "a%20b%23c");
    }

    #[test]
    fn test_whatwg_profile_is_plain() {
        let url = whatwg().parse("http://example.com:80/a?b#c").unwrap();
        assert_eq!(url.href(false), "http://example.com/a?b#c");
    }

    #[test]
    fn test_default_scheme_retry() {
        let url = google_safe_browsing().parse("www.google.com").unwrap();
        assert_eq!(url.href(false), "http://www.google.com/");
    }
}
