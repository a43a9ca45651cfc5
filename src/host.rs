//! The host parser: dispatches between IPv6 literals, opaque hosts, domains
//! (via IDNA) and IPv4 addresses, with the lax fallbacks and manipulation
//! hooks applied around the core algorithm.

use crate::character_sets::{
    C0_PERCENT_ENCODE_SET, HOST_PERCENT_ENCODE_SET, is_forbidden_domain_code_point,
    is_forbidden_host_code_point, is_url_code_point,
};
use crate::error::{ErrorKind, Result};
use crate::ipv4::{ends_in_a_number, parse_ipv4_number, serialize_ipv4};
use crate::ipv6::{parse_ipv6, serialize_ipv6};
use crate::parser::Parser;
use crate::unicode::idna::{contains_only_ascii_or_misc_and_no_punycode, domain_to_ascii};
use crate::unicode::percent_encode::{
    percent_decode_to_bytes, percent_encode_char, percent_encode_str,
};
use crate::url::Url;

/// How a parsed host serializes, with the address-kind flags the record
/// exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParsedHost {
    pub serialized: String,
    pub kind: HostKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HostKind {
    /// A domain, an opaque host, or the empty host.
    Domain,
    Ipv4,
    Ipv6,
}

impl ParsedHost {
    fn domain(serialized: String) -> Self {
        Self {
            serialized,
            kind: HostKind::Domain,
        }
    }
}

impl Parser {
    /// Parse a host buffer. `is_opaque` is true for non-special schemes.
    pub(crate) fn parse_host(
        &self,
        url: &mut Url,
        input: &str,
        is_opaque: bool,
    ) -> Result<ParsedHost> {
        let hooked;
        let input = match &self.opts.pre_parse_host_fn {
            Some(hook) => {
                hooked = hook(url, input);
                hooked.as_str()
            }
            None => input,
        };

        if input.is_empty() {
            return Ok(ParsedHost::domain(String::new()));
        }

        if input.starts_with('[') {
            if !input.ends_with(']') {
                return Err(self.failure(url, ErrorKind::Ipv6Unclosed));
            }
            let pieces = parse_ipv6(&input[1..input.len() - 1])
                .map_err(|kind| self.failure(url, kind))?;
            return Ok(ParsedHost {
                serialized: serialize_ipv6(&pieces),
                kind: HostKind::Ipv6,
            });
        }

        if is_opaque {
            return self.parse_opaque_host(url, input);
        }

        // Domain branch: percent-decode, require UTF-8, map through IDNA.
        let lax = self.opts.lax_host_parsing;
        let domain = match String::from_utf8(percent_decode_to_bytes(input.as_bytes())) {
            Ok(domain) => domain,
            Err(_) => {
                if lax || self.opts.accept_invalid_codepoints {
                    return Ok(ParsedHost::domain(percent_encode_str(
                        input,
                        HOST_PERCENT_ENCODE_SET,
                    )));
                }
                return Err(self.failure(url, ErrorKind::CouldNotDecodeHost));
            }
        };

        let ascii_domain = match domain_to_ascii(&domain) {
            Ok(ascii_domain) => ascii_domain,
            Err(_) if contains_only_ascii_or_misc_and_no_punycode(&domain) => {
                domain.to_lowercase()
            }
            Err(e) => {
                if lax {
                    return Ok(ParsedHost::domain(percent_encode_str(
                        input,
                        HOST_PERCENT_ENCODE_SET,
                    )));
                }
                return Err(self.failure(url, ErrorKind::DomainToAscii).with_cause(e));
            }
        };

        if let Some(c) = ascii_domain.chars().find(|&c| is_forbidden_domain_code_point(c)) {
            if lax {
                return Ok(ParsedHost::domain(percent_encode_str(
                    input,
                    HOST_PERCENT_ENCODE_SET,
                )));
            }
            return Err(self
                .failure(url, ErrorKind::DomainInvalidCodePoint)
                .with_description(format!("forbidden code point {c:?}")));
        }

        if ends_in_a_number(&ascii_domain) {
            return match self.parse_ipv4(url, &ascii_domain) {
                Ok(address) => Ok(ParsedHost {
                    serialized: serialize_ipv4(address),
                    kind: HostKind::Ipv4,
                }),
                Err(e) if e.failure() && lax => Ok(ParsedHost::domain(percent_encode_str(
                    input,
                    HOST_PERCENT_ENCODE_SET,
                ))),
                Err(e) => Err(e),
            };
        }

        let host = match &self.opts.post_parse_host_fn {
            Some(hook) => hook(url, &ascii_domain),
            None => ascii_domain,
        };
        Ok(ParsedHost::domain(host))
    }

    /// Parse an opaque host: forbidden host code points are rejected, the
    /// rest is emitted through the C0 control percent-encode set.
    fn parse_opaque_host(&self, url: &mut Url, input: &str) -> Result<ParsedHost> {
        let chars: Vec<char> = input.chars().collect();
        let mut output = String::with_capacity(input.len());
        for (i, &c) in chars.iter().enumerate() {
            if is_forbidden_host_code_point(c) && !self.opts.accept_invalid_codepoints {
                return Err(self
                    .failure(url, ErrorKind::HostInvalidCodePoint)
                    .with_description(format!("forbidden code point {c:?}")));
            }
            if !self.opts.accept_invalid_codepoints {
                if !is_url_code_point(c) && c != '%' {
                    self.validation_error(url, ErrorKind::InvalidUrlUnit)?;
                }
                let invalid_escape = c == '%'
                    && !matches!(
                        (chars.get(i + 1), chars.get(i + 2)),
                        (Some(a), Some(b)) if a.is_ascii_hexdigit() && b.is_ascii_hexdigit()
                    );
                if invalid_escape {
                    self.validation_error(url, ErrorKind::InvalidUrlUnit)?;
                }
            }
            percent_encode_char(&mut output, c, C0_PERCENT_ENCODE_SET);
        }
        Ok(ParsedHost::domain(output))
    }

    /// Parse an IPv4 address out of a domain that ends in a number.
    fn parse_ipv4(&self, url: &mut Url, input: &str) -> Result<u32> {
        let mut parts: Vec<&str> = input.split('.').collect();
        if parts.last().is_some_and(|last| last.is_empty()) {
            self.validation_error(url, ErrorKind::Ipv4EmptyPart)?;
            if parts.len() > 1 {
                parts.pop();
            }
        }
        if parts.len() > 4 {
            return Err(self.failure(url, ErrorKind::Ipv4TooManyParts));
        }

        let mut numbers: Vec<u64> = Vec::with_capacity(parts.len());
        for part in &parts {
            let Some((value, seen_non_decimal)) = parse_ipv4_number(part) else {
                return Err(self.failure(url, ErrorKind::Ipv4NonNumericPart));
            };
            if seen_non_decimal {
                self.validation_error(url, ErrorKind::Ipv4NonDecimalPart)?;
            }
            if value > 255 {
                self.validation_error(url, ErrorKind::Ipv4OutOfRangePart)?;
            }
            numbers.push(value);
        }

        let count = numbers.len();
        if numbers[..count - 1].iter().any(|&n| n > 255) {
            return Err(self.failure(url, ErrorKind::Ipv4OutOfRangePart));
        }
        let last = numbers[count - 1];
        if last >= 256u64.pow(5 - count as u32) {
            return Err(self.failure(url, ErrorKind::Ipv4OutOfRangePart));
        }

        let mut address = last as u32;
        for (i, &n) in numbers[..count - 1].iter().enumerate() {
            address |= (n as u32) << ((3 - i) * 8);
        }
        Ok(address)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(input: &str, is_opaque: bool) -> Result<String> {
        let parser = Parser::new();
        let mut url = Url::empty(parser.clone());
        parser
            .parse_host(&mut url, input, is_opaque)
            .map(|h| h.serialized)
    }

    fn parse_lax(input: &str, is_opaque: bool) -> Result<String> {
        let parser = Parser::builder().lax_host_parsing().build();
        let mut url = Url::empty(parser.clone());
        parser
            .parse_host(&mut url, input, is_opaque)
            .map(|h| h.serialized)
    }

    #[test]
    fn test_domain_vs_opaque() {
        assert_eq!(parse("EXAMPLE.COM", false).unwrap(), "example.com");
        assert_eq!(parse("EXAMPLE.COM", true).unwrap(), "EXAMPLE.COM");
        assert_eq!(parse("example%2Ecom", false).unwrap(), "example.com");
        assert_eq!(parse("example%2Ecom", true).unwrap(), "example%2Ecom");
        assert_eq!(parse("faß.example", false).unwrap(), "xn--fa-hia.example");
        assert_eq!(parse("faß.example", true).unwrap(), "fa%C3%9F.example");
    }

    #[test]
    fn test_ipv4_detection() {
        assert_eq!(parse("0", false).unwrap(), "0.0.0.0");
        assert_eq!(parse("0", true).unwrap(), "0");
        assert_eq!(parse("%30", false).unwrap(), "0.0.0.0");
        assert_eq!(parse("0x", false).unwrap(), "0.0.0.0");
        assert_eq!(parse("0xffffffff", false).unwrap(), "255.255.255.255");
        assert_eq!(parse("3279880203", false).unwrap(), "195.127.0.11");
        assert_eq!(parse("192.0x00A80001", false).unwrap(), "192.168.0.1");
        assert_eq!(parse("0300.0250.01.01", false).unwrap(), "192.168.1.1");
    }

    #[test]
    fn test_ipv4_failures() {
        // Not a valid octal part, but the label is numeric-shaped.
        assert!(parse("09", false).is_err());
        assert!(parse("example.255", false).is_err());
        assert!(parse("1.2.3.4.5", false).is_err());
        assert!(parse("256.256.256.256", false).is_err());
        // Opaque hosts are not routed into the IPv4 parser.
        assert_eq!(parse("09", true).unwrap(), "09");
        assert_eq!(parse("example.255", true).unwrap(), "example.255");
    }

    #[test]
    fn test_ipv6() {
        assert_eq!(parse("[0:0::1]", false).unwrap(), "[::1]");
        assert_eq!(parse("[0:0::1]", true).unwrap(), "[::1]");
        assert!(parse("[0:0::1", false).is_err());
        assert!(parse("[0:0::1%5d]", false).is_err());
        assert!(parse("[0:0::1%31]", true).is_err());
    }

    #[test]
    fn test_forbidden_code_points() {
        assert!(parse("example^example", false).is_err());
        assert!(parse("example^example", true).is_err());
        assert!(parse("bad\\:hostname", false).is_err());
        assert!(parse("bad\\:hostname", true).is_err());
    }

    #[test]
    fn test_lax_fallbacks() {
        assert_eq!(parse_lax(" leadingspace.com", false).unwrap(), "%20leadingspace.com");
        assert_eq!(parse_lax("host%23.com", false).unwrap(), "host%23.com");
        assert_eq!(parse_lax("\u{1}.com", false).unwrap(), "%01.com");
        // IPv6 errors stay hard even under lax parsing.
        assert!(parse_lax("[0:0::1", false).is_err());
    }

    #[test]
    fn test_empty_host() {
        assert_eq!(parse("", false).unwrap(), "");
        assert_eq!(parse("", true).unwrap(), "");
    }
}
