use crate::checkers::is_normalized_windows_drive_letter;

/// A URL path: either a single opaque string (non-special schemes without an
/// authority) or an ordered list of segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Path {
    Opaque(String),
    List(Vec<String>),
}

impl Default for Path {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl Path {
    pub(crate) fn is_opaque(&self) -> bool {
        matches!(self, Self::Opaque(_))
    }

    /// True for an empty segment list. An opaque path is never empty in this
    /// sense.
    pub(crate) fn is_empty_list(&self) -> bool {
        matches!(self, Self::List(segments) if segments.is_empty())
    }

    pub(crate) fn segments(&self) -> &[String] {
        match self {
            Self::Opaque(_) => &[],
            Self::List(segments) => segments,
        }
    }

    /// Append a segment. With `collapse` set, an empty trailing segment of a
    /// non-empty list is overwritten in place instead.
    pub(crate) fn append_segment(&mut self, segment: String, collapse: bool) {
        if let Self::List(segments) = self {
            if collapse && let Some(last) = segments.last_mut() && last.is_empty() {
                *last = segment;
            } else {
                segments.push(segment);
            }
        }
    }

    /// Append to the opaque path string.
    pub(crate) fn opaque_push_str(&mut self, s: &str) {
        if let Self::Opaque(opaque) = self {
            opaque.push_str(s);
        }
    }

    /// Shorten the path: pop the last segment, except for a `file:` path
    /// whose only segment is a normalized Windows drive letter.
    pub(crate) fn shorten(&mut self, scheme: &str) {
        let Self::List(segments) = self else {
            return;
        };
        if scheme == "file"
            && segments.len() == 1
            && is_normalized_windows_drive_letter(&segments[0])
        {
            return;
        }
        segments.pop();
    }

    /// Opaque paths keep no trailing spaces once the query or fragment is
    /// dropped.
    pub(crate) fn strip_trailing_spaces_if_opaque(&mut self) {
        if let Self::Opaque(opaque) = self {
            while opaque.ends_with(' ') {
                opaque.pop();
            }
        }
    }

    /// Serialize: the opaque string as-is, or each segment prefixed by `/`.
    pub(crate) fn serialize(&self) -> String {
        match self {
            Self::Opaque(opaque) => opaque.clone(),
            Self::List(segments) => {
                let mut output = String::new();
                for segment in segments {
                    output.push('/');
                    output.push_str(segment);
                }
                output
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(segments: &[&str]) -> Path {
        Path::List(segments.iter().map(|s| (*s).to_string()).collect())
    }

    #[test]
    fn test_serialize() {
        assert_eq!(list(&[]).serialize(), "");
        assert_eq!(list(&["a", "b"]).serialize(), "/a/b");
        assert_eq!(list(&[""]).serialize(), "/");
        assert_eq!(Path::Opaque("mailto:x".into()).serialize(), "mailto:x");
    }

    #[test]
    fn test_shorten() {
        let mut p = list(&["a", "b"]);
        p.shorten("http");
        assert_eq!(p.serialize(), "/a");
        p.shorten("http");
        p.shorten("http");
        assert_eq!(p.serialize(), "");

        // A lone normalized drive letter survives shortening under file:.
        let mut p = list(&["C:"]);
        p.shorten("file");
        assert_eq!(p.serialize(), "/C:");
        let mut p = list(&["C:"]);
        p.shorten("http");
        assert_eq!(p.serialize(), "");
    }

    #[test]
    fn test_append_collapse() {
        let mut p = list(&["a", ""]);
        p.append_segment("b".into(), true);
        assert_eq!(p.serialize(), "/a/b");

        let mut p = list(&["a"]);
        p.append_segment("b".into(), true);
        assert_eq!(p.serialize(), "/a/b");

        let mut p = list(&["a", ""]);
        p.append_segment("b".into(), false);
        assert_eq!(p.serialize(), "/a//b");
    }

    #[test]
    fn test_strip_trailing_spaces() {
        let mut p = Path::Opaque("x  ".into());
        p.strip_trailing_spaces_if_opaque();
        assert_eq!(p.serialize(), "x");

        let mut p = list(&["x  "]);
        p.strip_trailing_spaces_if_opaque();
        assert_eq!(p.serialize(), "/x  ");
    }
}
