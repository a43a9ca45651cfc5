use crate::character_sets::USERINFO_PERCENT_ENCODE_SET;
use crate::error::{ParseError, Result};
use crate::host::{HostKind, ParsedHost};
use crate::parser::{Parser, State, default_parser};
use crate::path::Path;
use crate::search_params::SearchParams;
use crate::unicode::percent_encode::percent_encode_str;

/// A parsed URL record.
///
/// Records are created by [`Parser::parse`](crate::Parser::parse) (or the
/// top-level [`parse`](crate::parse)/[`parse_ref`](crate::parse_ref)) and
/// mutated only through the setters, which re-enter the basic parser with an
/// override start state. Setters never return errors: invalid input is
/// silently ignored, or recorded as a validation error when reporting is on.
#[derive(Debug, Clone)]
pub struct Url {
    pub(crate) parser: Parser,
    pub(crate) input_url: String,
    pub(crate) scheme: String,
    pub(crate) username: String,
    pub(crate) password: String,
    pub(crate) host: Option<String>,
    pub(crate) is_ipv4: bool,
    pub(crate) is_ipv6: bool,
    pub(crate) port: Option<u16>,
    pub(crate) path: Path,
    pub(crate) query: Option<String>,
    pub(crate) fragment: Option<String>,
    pub(crate) validation_errors: Vec<ParseError>,
}

impl Url {
    pub(crate) fn empty(parser: Parser) -> Self {
        Self {
            parser,
            input_url: String::new(),
            scheme: String::new(),
            username: String::new(),
            password: String::new(),
            host: None,
            is_ipv4: false,
            is_ipv6: false,
            port: None,
            path: Path::default(),
            query: None,
            fragment: None,
            validation_errors: Vec::new(),
        }
    }

    /// Parse `input` against this URL as base, with the parser this record
    /// came from.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`](crate::ParseError) when the reference cannot
    /// be parsed.
    ///
    /// # Examples
    ///
    /// ```
    /// let base = wurl::parse("http://example.com/a/b").unwrap();
    /// let url = base.join("../c").unwrap();
    /// assert_eq!(url.href(false), "http://example.com/c");
    /// ```
    pub fn join(&self, input: &str) -> Result<Url> {
        self.parser.parse_with_base(input, Some(self))
    }

    /// Serialize the record. With `exclude_fragment` the fragment (and its
    /// `#`) is left out.
    pub fn href(&self, exclude_fragment: bool) -> String {
        let mut output = String::new();
        output.push_str(&self.scheme);
        output.push(':');
        if self.host.is_some() {
            output.push_str("//");
            if !self.username.is_empty() || !self.password.is_empty() {
                output.push_str(&self.username);
                if !self.password.is_empty() {
                    output.push(':');
                    output.push_str(&self.password);
                }
                output.push('@');
            }
            output.push_str(&self.host_and_port());
        } else if let [first, _, ..] = self.path.segments()
            && first.is_empty()
        {
            // A path starting with an empty segment would read as an
            // authority; `/.` keeps the serialization unambiguous.
            output.push_str("/.");
        }
        output.push_str(&self.path.serialize());
        if let Some(query) = &self.query {
            output.push('?');
            output.push_str(query);
        }
        if !exclude_fragment && let Some(fragment) = &self.fragment {
            output.push('#');
            output.push_str(fragment);
        }
        output
    }

    /// The scheme followed by `:`.
    pub fn protocol(&self) -> String {
        format!("{}:", self.scheme)
    }

    /// The scheme.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// The percent-encoded username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The percent-encoded password.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// The host, with the port when one is set: `hostname[:port]`.
    pub fn host(&self) -> String {
        self.host_and_port()
    }

    fn host_and_port(&self) -> String {
        let Some(host) = &self.host else {
            return String::new();
        };
        match self.port {
            Some(port) => format!("{host}:{port}"),
            None => host.clone(),
        }
    }

    /// The host without the port; empty when the host is null.
    pub fn hostname(&self) -> &str {
        self.host.as_deref().unwrap_or("")
    }

    /// The port in canonical decimal form, or empty when it equals the
    /// scheme's default (or none is set).
    pub fn port(&self) -> String {
        match self.port {
            Some(port) => port.to_string(),
            None => String::new(),
        }
    }

    /// The port as a number, falling back to the scheme's default port.
    pub fn decoded_port(&self) -> Option<u16> {
        self.port.or_else(|| self.parser.opts.default_port(&self.scheme))
    }

    /// The serialized path.
    pub fn pathname(&self) -> String {
        self.path.serialize()
    }

    /// The query prefixed with `?`, or empty when the query is null or empty.
    pub fn search(&self) -> String {
        match self.query.as_deref() {
            None | Some("") => String::new(),
            Some(query) => format!("?{query}"),
        }
    }

    /// The raw query; `None` is distinct from an empty query.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// The fragment prefixed with `#`, or empty when the fragment is null or
    /// empty.
    pub fn hash(&self) -> String {
        match self.fragment.as_deref() {
            None | Some("") => String::new(),
            Some(fragment) => format!("#{fragment}"),
        }
    }

    /// The raw fragment; `None` is distinct from an empty fragment.
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Whether the host is an IPv4 address.
    pub fn is_ipv4(&self) -> bool {
        self.is_ipv4
    }

    /// Whether the host is an IPv6 address literal.
    pub fn is_ipv6(&self) -> bool {
        self.is_ipv6
    }

    /// Validation errors recorded during parsing, in order. Only populated
    /// when the parser reports validation errors.
    pub fn validation_errors(&self) -> &[ParseError] {
        &self.validation_errors
    }

    /// The trimmed input this record was parsed from.
    pub fn input_url(&self) -> &str {
        &self.input_url
    }

    /// A search-parameter view over the query string. Mutations write the
    /// serialized form back to this record's query.
    pub fn search_params(&mut self) -> SearchParams<'_> {
        SearchParams::new(self)
    }

    // Setters. Each re-enters the basic parser with an override start state;
    // errors are swallowed, leaving the record as the partial mutation left
    // it, exactly like the parser-driven setters of the standard.

    /// Set the scheme. Ignored when the new scheme would cross the special /
    /// non-special boundary or break `file` invariants.
    pub fn set_protocol(&mut self, scheme: &str) {
        let parser = self.parser.clone();
        let input = format!("{}:", scheme.trim_end_matches(':'));
        let _ = parser.basic_parse(&input, None, self, Some(State::SchemeStart));
    }

    /// Set the username. Ignored for hostless, empty-host, opaque-path and
    /// `file` URLs.
    pub fn set_username(&mut self, username: &str) {
        if !self.can_have_credentials() {
            return;
        }
        self.username = percent_encode_str(username, USERINFO_PERCENT_ENCODE_SET);
    }

    /// Set the password. Ignored for hostless, empty-host, opaque-path and
    /// `file` URLs.
    pub fn set_password(&mut self, password: &str) {
        if !self.can_have_credentials() {
            return;
        }
        self.password = percent_encode_str(password, USERINFO_PERCENT_ENCODE_SET);
    }

    fn can_have_credentials(&self) -> bool {
        !matches!(self.host.as_deref(), None | Some(""))
            && !self.path.is_opaque()
            && self.scheme != "file"
    }

    /// Set host and, optionally, port (`example.com:8080`). Ignored for
    /// opaque-path URLs.
    pub fn set_host(&mut self, host: &str) {
        if self.path.is_opaque() {
            return;
        }
        let parser = self.parser.clone();
        let _ = parser.basic_parse(host, None, self, Some(State::Host));
    }

    /// Set the host without touching the port. Ignored for opaque-path URLs.
    pub fn set_hostname(&mut self, hostname: &str) {
        if self.path.is_opaque() {
            return;
        }
        let parser = self.parser.clone();
        let _ = parser.basic_parse(hostname, None, self, Some(State::Hostname));
    }

    /// Set the port from its decimal string; an empty string clears it.
    /// Ignored for hostless, empty-host, opaque-path and `file` URLs.
    pub fn set_port(&mut self, port: &str) {
        if matches!(self.host.as_deref(), None | Some(""))
            || self.path.is_opaque()
            || self.scheme == "file"
        {
            return;
        }
        if port.is_empty() {
            self.port = None;
            return;
        }
        let parser = self.parser.clone();
        let _ = parser.basic_parse(port, None, self, Some(State::Port));
    }

    /// Set the path. Ignored for opaque-path URLs unless the parser allows
    /// re-parsing them.
    pub fn set_pathname(&mut self, path: &str) {
        if self.path.is_opaque() && !self.parser.opts.allow_setting_path_for_non_base_url {
            return;
        }
        self.path = Path::List(Vec::new());
        let parser = self.parser.clone();
        let _ = parser.basic_parse(path, None, self, Some(State::PathStart));
    }

    /// Set the query; a leading `?` is allowed. An empty string clears the
    /// query to null.
    pub fn set_search(&mut self, query: &str) {
        if query.is_empty() {
            self.query = None;
            self.path.strip_trailing_spaces_if_opaque();
            return;
        }
        let query = query.strip_prefix('?').unwrap_or(query);
        self.query = Some(String::new());
        let parser = self.parser.clone();
        let _ = parser.basic_parse(query, None, self, Some(State::Query));
    }

    /// Set the fragment; a leading `#` is allowed. An empty string clears the
    /// fragment to null.
    pub fn set_hash(&mut self, fragment: &str) {
        if fragment.is_empty() {
            self.fragment = None;
            self.path.strip_trailing_spaces_if_opaque();
            return;
        }
        let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
        self.fragment = Some(String::new());
        let parser = self.parser.clone();
        let _ = parser.basic_parse(fragment, None, self, Some(State::Fragment));
    }

    // Internal mutation helpers for the state machine.

    pub(crate) fn set_parsed_host(&mut self, host: ParsedHost) {
        self.is_ipv4 = host.kind == HostKind::Ipv4;
        self.is_ipv6 = host.kind == HostKind::Ipv6;
        self.host = Some(host.serialized);
    }

    pub(crate) fn set_empty_host(&mut self) {
        self.host = Some(String::new());
        self.is_ipv4 = false;
        self.is_ipv6 = false;
    }

    pub(crate) fn copy_host_from(&mut self, base: &Url) {
        self.host = base.host.clone();
        self.is_ipv4 = base.is_ipv4;
        self.is_ipv6 = base.is_ipv6;
    }

    pub(crate) fn copy_credentials_from(&mut self, base: &Url) {
        self.username = base.username.clone();
        self.password = base.password.clone();
    }

    /// Drop the port when it matches the scheme's default.
    pub(crate) fn clean_default_port(&mut self) {
        if self.port.is_some() && self.port == self.parser.opts.default_port(&self.scheme) {
            self.port = None;
        }
    }
}

impl core::fmt::Display for Url {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.href(false))
    }
}

/// Equality over the URL value: every algorithmic component, ignoring the
/// recorded validation errors and the source input.
impl PartialEq for Url {
    fn eq(&self, other: &Self) -> bool {
        self.scheme == other.scheme
            && self.username == other.username
            && self.password == other.password
            && self.host == other.host
            && self.is_ipv4 == other.is_ipv4
            && self.is_ipv6 == other.is_ipv6
            && self.port == other.port
            && self.path == other.path
            && self.query == other.query
            && self.fragment == other.fragment
    }
}

impl Eq for Url {}

impl core::str::FromStr for Url {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self> {
        default_parser().parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::parse;

    #[test]
    fn test_default_port_stripped() {
        let url = parse("http://example.com:80/a?b#c").unwrap();
        assert_eq!(url.href(false), "http://example.com/a?b#c");
        assert_eq!(url.port(), "");
        assert_eq!(url.decoded_port(), Some(80));

        let url = parse("http://example.com:8080/").unwrap();
        assert_eq!(url.port(), "8080");
        assert_eq!(url.decoded_port(), Some(8080));
    }

    #[test]
    fn test_href_excludes_fragment_on_request() {
        let url = parse("http://example.com/a?b#c").unwrap();
        assert_eq!(url.href(true), "http://example.com/a?b");
        assert_eq!(url.to_string(), "http://example.com/a?b#c");
    }

    #[test]
    fn test_opaque_path() {
        let url = parse("mailto:user@example.com").unwrap();
        assert_eq!(url.pathname(), "user@example.com");
        assert_eq!(url.hostname(), "");
        assert_eq!(url.href(false), "mailto:user@example.com");
    }

    #[test]
    fn test_path_starting_with_empty_segment_gets_marker() {
        let url = parse("web+demo:/.//not-a-host/").unwrap();
        assert_eq!(url.pathname(), "//not-a-host/");
        assert_eq!(url.href(false), "web+demo:/.//not-a-host/");
    }

    #[test]
    fn test_join() {
        let base = parse("http://example.com/a/b/c?q#f").unwrap();
        assert_eq!(base.join("d").unwrap().href(false), "http://example.com/a/b/d");
        assert_eq!(base.join("../d").unwrap().href(false), "http://example.com/a/d");
        assert_eq!(base.join("/d").unwrap().href(false), "http://example.com/d");
        assert_eq!(base.join("//other.example/x").unwrap().href(false), "http://other.example/x");
        assert_eq!(base.join("?z").unwrap().href(false), "http://example.com/a/b/c?z");
        assert_eq!(base.join("#z").unwrap().href(false), "http://example.com/a/b/c?q#z");
        assert_eq!(base.join("").unwrap().href(false), "http://example.com/a/b/c?q");
    }

    #[test]
    fn test_query_and_fragment_null_vs_empty() {
        let url = parse("http://example.com/p").unwrap();
        assert_eq!(url.query(), None);
        assert_eq!(url.search(), "");

        let url = parse("http://example.com/p?").unwrap();
        assert_eq!(url.query(), Some(""));
        assert_eq!(url.search(), "");
        assert_eq!(url.href(false), "http://example.com/p?");

        let url = parse("http://example.com/p#").unwrap();
        assert_eq!(url.fragment(), Some(""));
        assert_eq!(url.hash(), "");
        assert_eq!(url.href(false), "http://example.com/p#");
    }

    #[test]
    fn test_value_equality_ignores_diagnostics() {
        let a = parse("http://example.com/a").unwrap();
        let b = parse("  http://example.com/a  ").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, parse("http://example.com/b").unwrap());
    }

    #[test]
    fn test_from_str() {
        let url: crate::Url = "http://example.com/".parse().unwrap();
        assert_eq!(url.hostname(), "example.com");
    }
}
