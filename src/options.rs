use crate::character_sets::{
    FRAGMENT_PERCENT_ENCODE_SET, PATH_PERCENT_ENCODE_SET, PercentEncodeSet,
    QUERY_PERCENT_ENCODE_SET, SPECIAL_QUERY_PERCENT_ENCODE_SET,
};
use crate::parser::Parser;
use crate::unicode::percent_encode::EncodingOverride;
use crate::url::Url;
use std::collections::HashMap;
use std::sync::Arc;

/// A host manipulation hook, run before or after host parsing.
pub type HostHookFn = dyn Fn(&Url, &str) -> String + Send + Sync;

/// Parser configuration. Values are built through [`ParserBuilder`] and are
/// immutable once the [`Parser`] exists.
pub(crate) struct ParserOptions {
    pub report_validation_errors: bool,
    pub fail_on_validation_error: bool,
    pub lax_host_parsing: bool,
    pub collapse_consecutive_slashes: bool,
    pub accept_invalid_codepoints: bool,
    pub percent_encode_single_percent_sign: bool,
    pub allow_setting_path_for_non_base_url: bool,
    pub skip_windows_drive_letter_normalization: bool,
    pub skip_trailing_slash_normalization: bool,
    pub skip_equals_for_empty_search_params_value: bool,
    pub special_schemes: HashMap<String, Option<u16>>,
    pub encoding_override: Option<EncodingOverride>,
    pub path_percent_encode_set: PercentEncodeSet,
    pub query_percent_encode_set: PercentEncodeSet,
    pub special_query_percent_encode_set: PercentEncodeSet,
    pub fragment_percent_encode_set: PercentEncodeSet,
    pub special_fragment_percent_encode_set: PercentEncodeSet,
    pub pre_parse_host_fn: Option<Arc<HostHookFn>>,
    pub post_parse_host_fn: Option<Arc<HostHookFn>>,
}

/// The default special schemes and their default ports; `file` has none.
fn default_special_schemes() -> HashMap<String, Option<u16>> {
    HashMap::from([
        ("ftp".to_string(), Some(21)),
        ("file".to_string(), None),
        ("http".to_string(), Some(80)),
        ("https".to_string(), Some(443)),
        ("ws".to_string(), Some(80)),
        ("wss".to_string(), Some(443)),
    ])
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            report_validation_errors: false,
            fail_on_validation_error: false,
            lax_host_parsing: false,
            collapse_consecutive_slashes: false,
            accept_invalid_codepoints: false,
            percent_encode_single_percent_sign: false,
            allow_setting_path_for_non_base_url: false,
            skip_windows_drive_letter_normalization: false,
            skip_trailing_slash_normalization: false,
            skip_equals_for_empty_search_params_value: false,
            special_schemes: default_special_schemes(),
            encoding_override: None,
            path_percent_encode_set: PATH_PERCENT_ENCODE_SET,
            query_percent_encode_set: QUERY_PERCENT_ENCODE_SET,
            special_query_percent_encode_set: SPECIAL_QUERY_PERCENT_ENCODE_SET,
            fragment_percent_encode_set: FRAGMENT_PERCENT_ENCODE_SET,
            special_fragment_percent_encode_set: FRAGMENT_PERCENT_ENCODE_SET,
            pre_parse_host_fn: None,
            post_parse_host_fn: None,
        }
    }
}

impl ParserOptions {
    pub(crate) fn is_special(&self, scheme: &str) -> bool {
        self.special_schemes.contains_key(scheme)
    }

    pub(crate) fn default_port(&self, scheme: &str) -> Option<u16> {
        self.special_schemes.get(scheme).copied().flatten()
    }
}

/// Builds a [`Parser`] with non-default options.
///
/// # Examples
///
/// ```
/// use wurl::Parser;
///
/// let parser = Parser::builder()
///     .report_validation_errors()
///     .collapse_consecutive_slashes()
///     .build();
/// let url = parser.parse("http://example.com/a//b").unwrap();
/// assert_eq!(url.pathname(), "/a/b");
/// ```
#[derive(Default)]
pub struct ParserBuilder {
    opts: ParserOptions,
}

impl ParserBuilder {
    /// Record non-fatal validation errors on the parsed record.
    #[must_use]
    pub fn report_validation_errors(mut self) -> Self {
        self.opts.report_validation_errors = true;
        self
    }

    /// Promote every validation error to a parse failure.
    #[must_use]
    pub fn fail_on_validation_error(mut self) -> Self {
        self.opts.fail_on_validation_error = true;
        self
    }

    /// On IDNA, UTF-8, forbidden-domain or IPv4-range errors, fall back to
    /// the percent-encoded input instead of failing.
    #[must_use]
    pub fn lax_host_parsing(mut self) -> Self {
        self.opts.lax_host_parsing = true;
        self
    }

    /// Collapse consecutive slashes in special-scheme paths into one
    /// (`http://example.com//foo///bar` becomes `http://example.com/foo/bar`).
    #[must_use]
    pub fn collapse_consecutive_slashes(mut self) -> Self {
        self.opts.collapse_consecutive_slashes = true;
        self
    }

    /// Pass code points the host validation would reject through the host
    /// buffer instead of failing.
    #[must_use]
    pub fn accept_invalid_codepoints(mut self) -> Self {
        self.opts.accept_invalid_codepoints = true;
        self
    }

    /// Percent-encode a `%` that is not followed by two hexadecimal digits
    /// instead of flagging invalid percent encoding.
    #[must_use]
    pub fn percent_encode_single_percent_sign(mut self) -> Self {
        self.opts.percent_encode_single_percent_sign = true;
        self
    }

    /// Allow the pathname setter to re-parse an opaque path. The living
    /// standard forbids this.
    #[must_use]
    pub fn allow_setting_path_for_non_base_url(mut self) -> Self {
        self.opts.allow_setting_path_for_non_base_url = true;
        self
    }

    /// Skip the rewrite of `C|` to `C:` in `file:` paths.
    #[must_use]
    pub fn skip_windows_drive_letter_normalization(mut self) -> Self {
        self.opts.skip_windows_drive_letter_normalization = true;
        self
    }

    /// Skip normalizing an empty special-scheme path to `/`.
    #[must_use]
    pub fn skip_trailing_slash_normalization(mut self) -> Self {
        self.opts.skip_trailing_slash_normalization = true;
        self
    }

    /// Serialize empty search-parameter values as `name` instead of `name=`.
    #[must_use]
    pub fn skip_equals_for_empty_search_params_value(mut self) -> Self {
        self.opts.skip_equals_for_empty_search_params_value = true;
        self
    }

    /// Override the notion of special schemes: a map from scheme to its
    /// default port (`None` for schemes without one, like `file`).
    #[must_use]
    pub fn special_schemes(mut self, special: HashMap<String, Option<u16>>) -> Self {
        self.opts.special_schemes = special;
        self
    }

    /// Encode query scalars through a single-byte character map instead of
    /// UTF-8.
    #[must_use]
    pub fn encoding_override(mut self, encoding: EncodingOverride) -> Self {
        self.opts.encoding_override = Some(encoding);
        self
    }

    /// Replace the percent-encode set for path segments.
    #[must_use]
    pub fn path_percent_encode_set(mut self, set: PercentEncodeSet) -> Self {
        self.opts.path_percent_encode_set = set;
        self
    }

    /// Replace the percent-encode set for queries of non-special schemes.
    #[must_use]
    pub fn query_percent_encode_set(mut self, set: PercentEncodeSet) -> Self {
        self.opts.query_percent_encode_set = set;
        self
    }

    /// Replace the percent-encode set for queries of special schemes.
    #[must_use]
    pub fn special_query_percent_encode_set(mut self, set: PercentEncodeSet) -> Self {
        self.opts.special_query_percent_encode_set = set;
        self
    }

    /// Replace the percent-encode set for fragments of non-special schemes.
    #[must_use]
    pub fn fragment_percent_encode_set(mut self, set: PercentEncodeSet) -> Self {
        self.opts.fragment_percent_encode_set = set;
        self
    }

    /// Replace the percent-encode set for fragments of special schemes.
    #[must_use]
    pub fn special_fragment_percent_encode_set(mut self, set: PercentEncodeSet) -> Self {
        self.opts.special_fragment_percent_encode_set = set;
        self
    }

    /// Manipulate the host string before it is parsed.
    #[must_use]
    pub fn pre_parse_host_fn(
        mut self,
        f: impl Fn(&Url, &str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.opts.pre_parse_host_fn = Some(Arc::new(f));
        self
    }

    /// Manipulate the host string after parsing. Only called when the result
    /// is not an IP address literal.
    #[must_use]
    pub fn post_parse_host_fn(
        mut self,
        f: impl Fn(&Url, &str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.opts.post_parse_host_fn = Some(Arc::new(f));
        self
    }

    /// Finish the builder.
    pub fn build(self) -> Parser {
        Parser::from_options(self.opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_special_schemes() {
        let opts = ParserOptions::default();
        assert!(opts.is_special("http"));
        assert!(opts.is_special("file"));
        assert!(!opts.is_special("gopher"));
        assert_eq!(opts.default_port("http"), Some(80));
        assert_eq!(opts.default_port("wss"), Some(443));
        assert_eq!(opts.default_port("file"), None);
        assert_eq!(opts.default_port("mailto"), None);
    }

    #[test]
    fn test_special_schemes_override() {
        let mut special = default_special_schemes();
        special.insert("gopher".to_string(), Some(70));
        let parser = Parser::builder().special_schemes(special).build();
        let url = parser.parse("gopher://example.com:70/x").unwrap();
        assert_eq!(url.port(), "");
        assert_eq!(url.href(false), "gopher://example.com/x");
    }
}
