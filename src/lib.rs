//! A WHATWG-conformant URL parser and serializer.
//!
//! Implements the basic URL parser state machine, the host parser (IDNA,
//! IPv4, IPv6 and opaque hosts), percent-encoding with configurable encode
//! sets, and the `application/x-www-form-urlencoded` search-parameter view —
//! following the living [URL Standard](https://url.spec.whatwg.org/).
//!
//! ```
//! let url = wurl::parse("http://example.com:80/a?b#c").unwrap();
//! assert_eq!(url.href(false), "http://example.com/a?b#c");
//! assert_eq!(url.hostname(), "example.com");
//! ```
//!
//! Parsing is configurable through [`Parser::builder`]; the [`canon`] module
//! layers canonicalization profiles (WHATWG, Google Safe Browsing, semantic
//! equivalence) on top of configured parsers.

// Internal modules
mod character_sets;
mod checkers;
mod error;
mod helpers;
mod host;
mod input_string;
mod ipv4;
mod ipv6;
mod options;
mod parser;
mod path;
mod search_params;
mod unicode;
mod url;

// Canonicalization profiles
pub mod canon;

// Public API
pub use character_sets::{
    C0_OR_SPACE_PERCENT_ENCODE_SET, C0_PERCENT_ENCODE_SET, FRAGMENT_PERCENT_ENCODE_SET,
    HOST_PERCENT_ENCODE_SET, PATH_PERCENT_ENCODE_SET, PercentEncodeSet,
    QUERY_PERCENT_ENCODE_SET, SPECIAL_QUERY_PERCENT_ENCODE_SET, USERINFO_PERCENT_ENCODE_SET,
};
pub use error::{ErrorKind, ParseError, Result};
pub use options::{HostHookFn, ParserBuilder};
pub use parser::{Parser, parse, parse_ref};
pub use search_params::SearchParams;
pub use unicode::percent_encode::{
    EncodingOverride, ISO_8859_1, percent_decode_string, repeated_percent_decode,
};
pub use url::Url;
