use std::sync::Arc;

/// The kind of a parse diagnostic, named after the validation errors of the
/// WHATWG URL Standard.
///
/// Whether a kind surfaces as a recoverable validation error or aborts the
/// parse depends on where it is raised; see [`ParseError::failure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A code point is not a URL unit, or a `%` is not followed by two hex
    /// digits, or forbidden leading/trailing/interior characters were removed.
    InvalidUrlUnit,
    /// A special scheme is not followed by `//`.
    SpecialSchemeMissingFollowingSolidus,
    /// A `\` was used where the standard expects `/`.
    InvalidReverseSolidus,
    /// Credentials were seen in a context where they are unusable.
    InvalidCredentials,
    /// The host is missing where the scheme requires one.
    HostMissing,
    /// The port does not fit in 16 bits.
    PortOutOfRange,
    /// The port contains a non-digit.
    PortInvalid,
    /// A `file:` URL holds an unexpected Windows drive letter.
    FileInvalidWindowsDriveLetter,
    /// A `file:` URL uses a Windows drive letter as its host.
    FileInvalidWindowsDriveLetterHost,
    /// The scheme is malformed or cannot be changed to.
    InvalidScheme,
    /// The input is relative but no usable base URL was supplied.
    MissingSchemeNonRelativeUrl,
    /// The host could not be percent-decoded into valid UTF-8.
    CouldNotDecodeHost,
    /// IDNA ToASCII rejected the domain.
    DomainToAscii,
    /// The domain contains a forbidden domain code point.
    DomainInvalidCodePoint,
    /// An opaque host contains a forbidden host code point.
    HostInvalidCodePoint,
    /// An IPv4 address has an empty dot-separated part.
    Ipv4EmptyPart,
    /// An IPv4 address has more than four parts.
    Ipv4TooManyParts,
    /// An IPv4 part is not a number.
    Ipv4NonNumericPart,
    /// An IPv4 part uses octal or hexadecimal notation.
    Ipv4NonDecimalPart,
    /// An IPv4 part exceeds 255.
    Ipv4OutOfRangePart,
    /// An IPv6 literal is missing its closing `]`.
    Ipv6Unclosed,
    /// An IPv6 address begins with a lone `:`.
    Ipv6InvalidCompression,
    /// An IPv6 address has more than eight pieces.
    Ipv6TooManyPieces,
    /// An IPv6 address contains `::` more than once.
    Ipv6MultipleCompression,
    /// An IPv6 address contains an unexpected code point.
    Ipv6InvalidCodePoint,
    /// An IPv6 address has too few pieces and no compression.
    Ipv6TooFewPieces,
    /// An IPv4-in-IPv6 address would exceed eight pieces.
    Ipv4InIpv6TooManyPieces,
    /// An IPv4-in-IPv6 part contains an unexpected code point.
    Ipv4InIpv6InvalidCodePoint,
    /// An IPv4-in-IPv6 part exceeds 255.
    Ipv4InIpv6OutOfRangePart,
    /// An IPv4-in-IPv6 address has fewer than four parts.
    Ipv4InIpv6TooFewParts,
}

impl ErrorKind {
    /// The WHATWG name of this validation error.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidUrlUnit => "invalid-URL-unit",
            Self::SpecialSchemeMissingFollowingSolidus => {
                "special-scheme-missing-following-solidus"
            }
            Self::InvalidReverseSolidus => "invalid-reverse-solidus",
            Self::InvalidCredentials => "invalid-credentials",
            Self::HostMissing => "host-missing",
            Self::PortOutOfRange => "port-out-of-range",
            Self::PortInvalid => "port-invalid",
            Self::FileInvalidWindowsDriveLetter => "file-invalid-Windows-drive-letter",
            Self::FileInvalidWindowsDriveLetterHost => "file-invalid-Windows-drive-letter-host",
            Self::InvalidScheme => "invalid-scheme",
            Self::MissingSchemeNonRelativeUrl => "missing-scheme-non-relative-URL",
            Self::CouldNotDecodeHost => "could-not-decode-host",
            Self::DomainToAscii => "domain-to-ASCII",
            Self::DomainInvalidCodePoint => "domain-invalid-code-point",
            Self::HostInvalidCodePoint => "host-invalid-code-point",
            Self::Ipv4EmptyPart => "IPv4-empty-part",
            Self::Ipv4TooManyParts => "IPv4-too-many-parts",
            Self::Ipv4NonNumericPart => "IPv4-non-numeric-part",
            Self::Ipv4NonDecimalPart => "IPv4-non-decimal-part",
            Self::Ipv4OutOfRangePart => "IPv4-out-of-range-part",
            Self::Ipv6Unclosed => "IPv6-unclosed",
            Self::Ipv6InvalidCompression => "IPv6-invalid-compression",
            Self::Ipv6TooManyPieces => "IPv6-too-many-pieces",
            Self::Ipv6MultipleCompression => "IPv6-multiple-compression",
            Self::Ipv6InvalidCodePoint => "IPv6-invalid-code-point",
            Self::Ipv6TooFewPieces => "IPv6-too-few-pieces",
            Self::Ipv4InIpv6TooManyPieces => "IPv4-in-IPv6-too-many-pieces",
            Self::Ipv4InIpv6InvalidCodePoint => "IPv4-in-IPv6-invalid-code-point",
            Self::Ipv4InIpv6OutOfRangePart => "IPv4-in-IPv6-out-of-range-part",
            Self::Ipv4InIpv6TooFewParts => "IPv4-in-IPv6-too-few-parts",
        }
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error raised while parsing a URL.
///
/// Carries the error kind, an optional description, the URL that was being
/// parsed, whether the error aborted the parse ([`failure`](Self::failure)),
/// and an optional underlying cause (e.g. an IDNA error).
#[derive(Debug, Clone)]
pub struct ParseError {
    kind: ErrorKind,
    description: Option<String>,
    url: String,
    failure: bool,
    cause: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl ParseError {
    pub(crate) fn new(kind: ErrorKind, url: String, failure: bool) -> Self {
        Self {
            kind,
            description: None,
            url,
            failure,
            cause: None,
        }
    }

    pub(crate) fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub(crate) fn with_cause(
        mut self,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        self.cause = Some(Arc::new(cause));
        self
    }

    /// The kind of the error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// A human readable description; falls back to the WHATWG error name.
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or(self.kind.as_str())
    }

    /// The URL that was being parsed when the error was raised.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// True for errors that aborted the parse; false for validation errors,
    /// including validation errors promoted by
    /// [`fail_on_validation_error`](crate::ParserBuilder::fail_on_validation_error).
    pub fn failure(&self) -> bool {
        self.failure
    }
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(descr) = &self.description {
            write!(f, " ({descr})")?;
        }
        write!(f, " in {:?}", self.url)?;
        if let Some(cause) = &self.cause {
            write!(f, ": {cause}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|c| c as &(dyn std::error::Error + 'static))
    }
}

/// Result type for URL parsing operations.
pub type Result<T> = core::result::Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = ParseError::new(ErrorKind::HostMissing, "http://".into(), true);
        assert_eq!(e.to_string(), "host-missing in \"http://\"");
        assert_eq!(e.kind(), ErrorKind::HostMissing);
        assert!(e.failure());
    }

    #[test]
    fn test_error_description_fallback() {
        let e = ParseError::new(ErrorKind::PortInvalid, "x".into(), true);
        assert_eq!(e.description(), "port-invalid");
        let e = e.with_description("letters in port");
        assert_eq!(e.description(), "letters in port");
    }
}
