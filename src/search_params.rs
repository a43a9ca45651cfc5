use crate::url::Url;
use percent_encoding::percent_encode_byte;

/// An `application/x-www-form-urlencoded` view over a URL's query string.
///
/// The pair list is materialized from the query when the view is created;
/// every mutating operation serializes it back onto the owning record's
/// query, so the view and the record never drift apart. The borrow ties the
/// view's lifetime to the record.
///
/// # Examples
///
/// ```
/// let mut url = wurl::parse("http://example.com?xyz=aaa&foo=bar2&xyz=aaa&foo=bar").unwrap();
/// url.search_params().sort();
/// assert_eq!(url.search(), "?foo=bar2&foo=bar&xyz=aaa&xyz=aaa");
/// ```
pub struct SearchParams<'a> {
    url: &'a mut Url,
    pairs: Vec<(String, String)>,
}

impl<'a> SearchParams<'a> {
    pub(crate) fn new(url: &'a mut Url) -> Self {
        let pairs = parse_pairs(url.query().unwrap_or(""));
        Self { url, pairs }
    }

    /// Append a name/value pair.
    pub fn append(&mut self, name: &str, value: &str) {
        self.pairs.push((name.to_string(), value.to_string()));
        self.write_through();
    }

    /// Remove every pair with the given name.
    pub fn delete(&mut self, name: &str) {
        self.pairs.retain(|(n, _)| n != name);
        self.write_through();
    }

    /// The first value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Every value for `name`, in order.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Whether a pair with the given name exists.
    pub fn has(&self, name: &str) -> bool {
        self.pairs.iter().any(|(n, _)| n == name)
    }

    /// Replace the value of the first pair named `name` and drop the later
    /// ones; appends when no pair matches.
    pub fn set(&mut self, name: &str, value: &str) {
        let mut replaced = false;
        self.pairs.retain_mut(|(n, v)| {
            if n != name {
                return true;
            }
            if replaced {
                return false;
            }
            replaced = true;
            *v = value.to_string();
            true
        });
        if !replaced {
            self.pairs.push((name.to_string(), value.to_string()));
        }
        self.write_through();
    }

    /// Stable sort by name.
    pub fn sort(&mut self) {
        self.pairs.sort_by(|a, b| a.0.cmp(&b.0));
        self.write_through();
    }

    /// Stable sort by name and value.
    pub fn sort_absolute(&mut self) {
        self.pairs.sort();
        self.write_through();
    }

    /// Apply `f` to each pair, then write the result back.
    pub fn iterate(&mut self, mut f: impl FnMut(&mut String, &mut String)) {
        for (name, value) in &mut self.pairs {
            f(name, value);
        }
        self.write_through();
    }

    /// Iterate over the pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// The number of pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether the list has no pairs.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Serialize the pair list without a leading `?`, using the
    /// `application/x-www-form-urlencoded` serializer.
    pub fn serialize(&self) -> String {
        let skip_equals = self
            .url
            .parser
            .opts
            .skip_equals_for_empty_search_params_value;

        let mut output = String::new();
        for (i, (name, value)) in self.pairs.iter().enumerate() {
            if i > 0 {
                output.push('&');
            }
            encode_component(&mut output, name);
            if !value.is_empty() || !skip_equals {
                output.push('=');
                encode_component(&mut output, value);
            }
        }
        output
    }

    /// Serialize the pair list and write it back onto the record's query.
    /// The query stays non-null when it was non-null before, so an emptied
    /// list keeps an explicit empty query.
    fn write_through(&mut self) {
        let serialized = self.serialize();
        self.url.query = if serialized.is_empty() && self.url.query.is_none() {
            None
        } else {
            Some(serialized)
        };
    }
}

impl core::fmt::Display for SearchParams<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.serialize())
    }
}

/// Split a query string into decoded name/value pairs: pairs on `&`, name
/// from value on the first `=`, `+` as space, percent-escapes decoded.
fn parse_pairs(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((name, value)) => (decode_component(name), decode_component(value)),
            None => (decode_component(pair), String::new()),
        })
        .collect()
}

/// Form-urlencode one component: ASCII alphanumerics and `*-._` stay
/// literal, space becomes `+`, every other byte (including `&`, `=` and a
/// literal `+`) is percent-encoded so pairs survive re-parsing.
fn encode_component(output: &mut String, s: &str) {
    for &byte in s.as_bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'*' | b'-' | b'.' | b'_' => {
                output.push(byte as char);
            }
            b' ' => output.push('+'),
            _ => output.push_str(percent_encode_byte(byte)),
        }
    }
}

/// Decode one component: `+` becomes space, `%HH` decodes, malformed
/// escapes stay literal.
fn decode_component(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => decoded.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                let hi = (bytes[i + 1] as char).to_digit(16);
                let lo = (bytes[i + 2] as char).to_digit(16);
                if let (Some(hi), Some(lo)) = (hi, lo) {
                    decoded.push((hi * 16 + lo) as u8);
                    i += 2;
                } else {
                    decoded.push(b'%');
                }
            }
            b => decoded.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&decoded).into_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::{Parser, parse};

    #[test]
    fn test_get_and_has() {
        let mut url = parse("http://example.com?foo=bar2&foo=bar&foo2").unwrap();
        let params = url.search_params();
        assert_eq!(params.get("foo"), Some("bar2"));
        assert_eq!(params.get("foo2"), Some(""));
        assert_eq!(params.get("missing"), None);
        assert!(params.has("foo2"));
        assert!(!params.has("missing"));
    }

    #[test]
    fn test_get_all() {
        let mut url = parse("http://example.com?foo=bar2&xyz=aaa&foo=bar").unwrap();
        assert_eq!(url.search_params().get_all("foo"), vec!["bar2", "bar"]);
    }

    #[test]
    fn test_append_writes_through() {
        let mut url = parse("http://example.com?foo=bar").unwrap();
        url.search_params().append("abc", "xyz");
        assert_eq!(url.query(), Some("foo=bar&abc=xyz"));
        assert_eq!(url.href(false), "http://example.com/?foo=bar&abc=xyz");
    }

    #[test]
    fn test_plus_and_percent_round_trip() {
        let mut url = parse("http://example.com?foo=bar&foo+2=bar+2").unwrap();
        {
            let params = url.search_params();
            assert_eq!(params.get("foo 2"), Some("bar 2"));
        }
        url.search_params().append("abc", "xyz");
        assert_eq!(url.query(), Some("foo=bar&foo+2=bar+2&abc=xyz"));
    }

    #[test]
    fn test_set() {
        let mut url = parse("http://example.com?xyz=aaa&foo=bar2&xyz=aaa&foo=bar").unwrap();
        url.search_params().set("foo", "xyz");
        assert_eq!(url.query(), Some("xyz=aaa&foo=xyz&xyz=aaa"));

        let mut url = parse("http://example.com").unwrap();
        url.search_params().set("foo", "");
        assert_eq!(url.query(), Some("foo="));
    }

    #[test]
    fn test_delete() {
        let mut url = parse("http://example.com?xyz=aaa&foo=bar2&xyz=aaa&foo=bar").unwrap();
        url.search_params().delete("foo");
        assert_eq!(url.query(), Some("xyz=aaa&xyz=aaa"));

        // Deleting the last pair keeps the previously non-null query.
        let mut url = parse("http://example.com?foo=bar").unwrap();
        url.search_params().delete("foo");
        assert_eq!(url.query(), Some(""));
        assert_eq!(url.search(), "");
    }

    #[test]
    fn test_sort_is_stable() {
        let mut url = parse("http://example.com?xyz=aaa&foo=bar2&xyz=aaa&foo=bar").unwrap();
        url.search_params().sort();
        assert_eq!(url.query(), Some("foo=bar2&foo=bar&xyz=aaa&xyz=aaa"));
    }

    #[test]
    fn test_sort_absolute() {
        let mut url = parse("http://example.com?xyz=aaa&foo=bar2&xyz=aaa&foo=bar").unwrap();
        url.search_params().sort_absolute();
        assert_eq!(url.query(), Some("foo=bar&foo=bar2&xyz=aaa&xyz=aaa"));
    }

    #[test]
    fn test_iterate() {
        let mut url = parse("http://example.com?a=1&b=2").unwrap();
        url.search_params().iterate(|name, value| {
            name.make_ascii_uppercase();
            value.push('0');
        });
        assert_eq!(url.query(), Some("A=10&B=20"));
    }

    #[test]
    fn test_reserved_characters_are_encoded() {
        let mut url = parse("http://example.com/").unwrap();
        url.search_params().append("a&b", "1");
        assert_eq!(url.query(), Some("a%26b=1"));
        assert_eq!(url.search_params().get("a&b"), Some("1"));

        let mut url = parse("http://example.com/").unwrap();
        url.search_params().append("math", "1+1");
        assert_eq!(url.query(), Some("math=1%2B1"));
        assert_eq!(url.search_params().get("math"), Some("1+1"));

        let mut url = parse("http://example.com/").unwrap();
        url.search_params().append("eq", "a=b");
        assert_eq!(url.query(), Some("eq=a%3Db"));
        assert_eq!(url.search_params().get("eq"), Some("a=b"));
    }

    #[test]
    fn test_serialization_matches_query_for_parsed_urls() {
        let mut url = parse("http://example.com?foo=bar2&foo=bar&xyz=aaa").unwrap();
        let serialized = url.search_params().serialize();
        assert_eq!(Some(serialized.as_str()), url.query());
    }

    #[test]
    fn test_skip_equals_for_empty_values() {
        let parser = Parser::builder()
            .skip_equals_for_empty_search_params_value()
            .build();
        let mut url = parser.parse("http://example.com?foo&bar=baz").unwrap();
        url.search_params().append("q", "");
        assert_eq!(url.query(), Some("foo&bar=baz&q"));

        // The default keeps the equals sign.
        let mut url = parse("http://example.com?foo").unwrap();
        url.search_params().append("q", "");
        assert_eq!(url.query(), Some("foo=&q="));
    }

    #[test]
    fn test_empty_query_view() {
        let mut url = parse("http://example.com/").unwrap();
        assert!(url.search_params().is_empty());
        assert_eq!(url.search_params().len(), 0);
        // A read-only view leaves the null query untouched.
        assert_eq!(url.query(), None);
    }
}
