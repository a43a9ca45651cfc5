/// Indexed scalar-value stream over the parser input.
///
/// The pointer starts one position before the first scalar;
/// [`next_code_point`](Self::next_code_point) advances it, and the rewind
/// operations move it back so the same scalar is dispatched again, possibly
/// in another state. Reading past the end sets the EOF flag, which rewinding
/// clears.
pub(crate) struct InputString {
    chars: Vec<char>,
    pointer: isize,
    eof: bool,
}

impl InputString {
    pub(crate) fn new(s: &str) -> Self {
        Self {
            chars: s.chars().collect(),
            pointer: -1,
            eof: false,
        }
    }

    /// Advance the pointer and return the scalar under it, or `None` at EOF.
    pub(crate) fn next_code_point(&mut self) -> Option<char> {
        self.pointer += 1;
        if self.pointer as usize >= self.chars.len() {
            self.eof = true;
            return None;
        }
        Some(self.chars[self.pointer as usize])
    }

    pub(crate) fn eof(&self) -> bool {
        self.eof
    }

    /// Step one scalar back so the current one is read again.
    pub(crate) fn rewind_last(&mut self) {
        self.pointer -= 1;
        self.eof = false;
    }

    /// Step `n` scalars back.
    pub(crate) fn rewind(&mut self, n: usize) {
        self.pointer -= n as isize;
        self.eof = false;
    }

    /// Move the pointer back to before the first scalar.
    pub(crate) fn reset(&mut self) {
        self.pointer = -1;
        self.eof = false;
    }

    /// The remaining input including the scalar under the pointer.
    pub(crate) fn remaining(&self) -> &[char] {
        if self.eof || self.pointer < 0 {
            return &[];
        }
        &self.chars[self.pointer as usize..]
    }

    /// Whether the input after the scalar under the pointer starts with `s`.
    pub(crate) fn remaining_starts_with(&self, s: &str) -> bool {
        if self.eof {
            return false;
        }
        let rest = &self.chars[(self.pointer + 1) as usize..];
        let mut it = rest.iter();
        s.chars().all(|c| it.next() == Some(&c))
    }

    /// Whether the scalar under the pointer is a `%` that is not followed by
    /// two ASCII hex digits.
    pub(crate) fn remaining_is_invalid_percent_encoded(&self) -> bool {
        if self.eof || self.pointer < 0 {
            return false;
        }
        let pos = self.pointer as usize;
        if self.chars[pos] != '%' {
            return false;
        }
        match (self.chars.get(pos + 1), self.chars.get(pos + 2)) {
            (Some(a), Some(b)) => !a.is_ascii_hexdigit() || !b.is_ascii_hexdigit(),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_and_eof() {
        let mut input = InputString::new("ab");
        assert_eq!(input.next_code_point(), Some('a'));
        assert_eq!(input.next_code_point(), Some('b'));
        assert_eq!(input.next_code_point(), None);
        assert!(input.eof());

        // Rewinding at EOF makes the last scalar readable again.
        input.rewind_last();
        assert!(!input.eof());
        assert_eq!(input.next_code_point(), None);
    }

    #[test]
    fn test_remaining() {
        let mut input = InputString::new("xyz");
        input.next_code_point();
        assert_eq!(input.remaining(), &['x', 'y', 'z']);
        assert!(input.remaining_starts_with("yz"));
        assert!(!input.remaining_starts_with("xz"));
    }

    #[test]
    fn test_invalid_percent_lookahead() {
        let mut input = InputString::new("%2f%zz%1");
        input.next_code_point();
        assert!(!input.remaining_is_invalid_percent_encoded());
        input.rewind_last();
        for _ in 0..4 {
            input.next_code_point();
        }
        assert!(input.remaining_is_invalid_percent_encoded());
        for _ in 0..3 {
            input.next_code_point();
        }
        assert!(input.remaining_is_invalid_percent_encoded());
    }

    #[test]
    fn test_reset() {
        let mut input = InputString::new("ab");
        input.next_code_point();
        input.next_code_point();
        input.reset();
        assert_eq!(input.next_code_point(), Some('a'));
    }
}
