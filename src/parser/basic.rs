//! The basic URL parser: a state machine consuming the input one scalar at a
//! time, mutating a [`Url`] record.
//! Follows <https://url.spec.whatwg.org/#url-parsing>.

use super::State;
use crate::character_sets::{USERINFO_PERCENT_ENCODE_SET, is_url_code_point};
use crate::checkers::{
    is_double_dot_path_segment, is_normalized_windows_drive_letter, is_single_dot_path_segment,
    is_windows_drive_letter, starts_with_windows_drive_letter,
};
use crate::error::{ErrorKind, Result};
use crate::helpers::{remove_tab_or_newline, trim_c0_or_space};
use crate::input_string::InputString;
use crate::parser::Parser;
use crate::path::Path;
use crate::unicode::percent_encode::{percent_encode_char, percent_encode_char_with};
use crate::url::Url;

impl Parser {
    /// Run the state machine over `input`, mutating `url`.
    ///
    /// With no `state_override` this is a fresh parse: the input is trimmed,
    /// recorded on the record, and the machine starts in `SchemeStart`. With
    /// an override (the setters), only tab/newline stripping applies and the
    /// machine starts in the given state over the existing record.
    pub(crate) fn basic_parse(
        &self,
        input: &str,
        base: Option<&Url>,
        url: &mut Url,
        state_override: Option<State>,
    ) -> Result<()> {
        let overridden = state_override.is_some();

        let input = if overridden {
            let (cleaned, changed) = remove_tab_or_newline(input);
            if changed {
                self.validation_error(url, ErrorKind::InvalidUrlUnit)?;
            }
            cleaned.into_owned()
        } else {
            url.input_url = input.to_string();
            let (trimmed, trimmed_some) = trim_c0_or_space(input);
            if trimmed_some {
                self.validation_error(url, ErrorKind::InvalidUrlUnit)?;
                url.input_url = trimmed.to_string();
            }
            let (cleaned, removed_some) = remove_tab_or_newline(trimmed);
            if removed_some {
                self.validation_error(url, ErrorKind::InvalidUrlUnit)?;
                url.input_url = cleaned.to_string();
            }
            url.input_url.clone()
        };

        let mut input = InputString::new(&input);
        let mut state = state_override.unwrap_or(State::SchemeStart);
        let mut buffer = String::new();
        let mut at_flag = false;
        let mut bracket_flag = false;
        let mut password_token_seen = false;

        loop {
            let c = input.next_code_point();

            match state {
                State::SchemeStart => {
                    if let Some(ch) = c
                        && ch.is_ascii_alphabetic()
                    {
                        buffer.push(ch.to_ascii_lowercase());
                        state = State::Scheme;
                    } else if !overridden {
                        state = State::NoScheme;
                        input.rewind_last();
                    } else {
                        return Err(self.failure(url, ErrorKind::InvalidScheme));
                    }
                }

                State::Scheme => {
                    if let Some(ch) = c
                        && (ch.is_ascii_alphanumeric() || matches!(ch, '+' | '-' | '.'))
                    {
                        buffer.push(ch.to_ascii_lowercase());
                    } else if c == Some(':') {
                        if overridden {
                            let special = self.is_special(&url.scheme);
                            let buffer_special = self.is_special(&buffer);
                            if special != buffer_special {
                                return Ok(());
                            }
                            if buffer == "file"
                                && (!url.username.is_empty()
                                    || !url.password.is_empty()
                                    || url.port.is_some())
                            {
                                return Ok(());
                            }
                            if url.scheme == "file" && url.host.as_deref().unwrap_or("").is_empty()
                            {
                                return Ok(());
                            }
                        }
                        url.scheme = std::mem::take(&mut buffer);
                        if overridden {
                            url.clean_default_port();
                            return Ok(());
                        }
                        if url.scheme == "file" {
                            if !input.remaining_starts_with("//") {
                                self.validation_error(
                                    url,
                                    ErrorKind::SpecialSchemeMissingFollowingSolidus,
                                )?;
                            }
                            state = State::File;
                        } else if self.is_special(&url.scheme) {
                            if base.is_some_and(|b| b.scheme == url.scheme) {
                                state = State::SpecialRelativeOrAuthority;
                            } else {
                                state = State::SpecialAuthoritySlashes;
                            }
                        } else if input.remaining_starts_with("/") {
                            state = State::PathOrAuthority;
                            input.next_code_point();
                        } else {
                            url.path = Path::Opaque(String::new());
                            state = State::OpaquePath;
                        }
                    } else if !overridden {
                        buffer.clear();
                        state = State::NoScheme;
                        input.reset();
                    } else {
                        return Err(self.failure(url, ErrorKind::InvalidScheme));
                    }
                }

                State::NoScheme => {
                    let base_opaque = base.is_some_and(|b| b.path.is_opaque());
                    match base {
                        None => {
                            return Err(self.failure(url, ErrorKind::MissingSchemeNonRelativeUrl));
                        }
                        Some(_) if base_opaque && c != Some('#') => {
                            return Err(self.failure(url, ErrorKind::MissingSchemeNonRelativeUrl));
                        }
                        Some(b) if base_opaque => {
                            url.scheme = b.scheme.clone();
                            url.path = b.path.clone();
                            url.query = b.query.clone();
                            url.fragment = Some(String::new());
                            state = State::Fragment;
                        }
                        Some(b) if b.scheme != "file" => {
                            state = State::Relative;
                            input.rewind_last();
                        }
                        Some(_) => {
                            state = State::File;
                            input.rewind_last();
                        }
                    }
                }

                State::SpecialRelativeOrAuthority => {
                    if c == Some('/') && input.remaining_starts_with("/") {
                        state = State::SpecialAuthorityIgnoreSlashes;
                        input.next_code_point();
                    } else {
                        self.validation_error(
                            url,
                            ErrorKind::SpecialSchemeMissingFollowingSolidus,
                        )?;
                        state = State::Relative;
                        input.rewind_last();
                    }
                }

                State::PathOrAuthority => {
                    if c == Some('/') {
                        state = State::Authority;
                    } else {
                        state = State::Path;
                        input.rewind_last();
                    }
                }

                State::Relative => {
                    // NoScheme only routes here with a usable base.
                    let Some(b) = base else {
                        return Err(self.failure(url, ErrorKind::MissingSchemeNonRelativeUrl));
                    };
                    url.scheme = b.scheme.clone();
                    match c {
                        None => {
                            url.copy_credentials_from(b);
                            url.copy_host_from(b);
                            url.port = b.port;
                            url.path = b.path.clone();
                            url.query = b.query.clone();
                        }
                        Some('/') => state = State::RelativeSlash,
                        Some('?') => {
                            url.copy_credentials_from(b);
                            url.copy_host_from(b);
                            url.port = b.port;
                            url.path = b.path.clone();
                            url.query = Some(String::new());
                            state = State::Query;
                        }
                        Some('#') => {
                            url.copy_credentials_from(b);
                            url.copy_host_from(b);
                            url.port = b.port;
                            url.path = b.path.clone();
                            url.query = b.query.clone();
                            url.fragment = Some(String::new());
                            state = State::Fragment;
                        }
                        Some('\\') if self.is_special(&url.scheme) => {
                            self.validation_error(url, ErrorKind::InvalidReverseSolidus)?;
                            state = State::RelativeSlash;
                        }
                        Some(_) => {
                            url.copy_credentials_from(b);
                            url.copy_host_from(b);
                            url.port = b.port;
                            url.path = b.path.clone();
                            url.query = None;
                            url.path.shorten(&url.scheme);
                            state = State::Path;
                            input.rewind_last();
                        }
                    }
                }

                State::RelativeSlash => {
                    let special = self.is_special(&url.scheme);
                    if special && matches!(c, Some('/') | Some('\\')) {
                        if c == Some('\\') {
                            self.validation_error(url, ErrorKind::InvalidReverseSolidus)?;
                        }
                        state = State::SpecialAuthorityIgnoreSlashes;
                    } else if c == Some('/') {
                        state = State::Authority;
                    } else {
                        if let Some(b) = base {
                            url.copy_credentials_from(b);
                            url.copy_host_from(b);
                            url.port = b.port;
                        }
                        state = State::Path;
                        input.rewind_last();
                    }
                }

                State::SpecialAuthoritySlashes => {
                    if c == Some('/') && input.remaining_starts_with("/") {
                        state = State::SpecialAuthorityIgnoreSlashes;
                        input.next_code_point();
                    } else {
                        self.validation_error(
                            url,
                            ErrorKind::SpecialSchemeMissingFollowingSolidus,
                        )?;
                        state = State::SpecialAuthorityIgnoreSlashes;
                        input.rewind_last();
                    }
                }

                State::SpecialAuthorityIgnoreSlashes => {
                    if matches!(c, Some('/') | Some('\\')) {
                        self.validation_error(
                            url,
                            ErrorKind::SpecialSchemeMissingFollowingSolidus,
                        )?;
                    } else {
                        state = State::Authority;
                        input.rewind_last();
                    }
                }

                State::Authority => {
                    if c == Some('@') {
                        self.validation_error(url, ErrorKind::InvalidCredentials)?;
                        if at_flag {
                            buffer.insert_str(0, "%40");
                        }
                        at_flag = true;
                        for ch in buffer.chars() {
                            if ch == ':' && !password_token_seen {
                                password_token_seen = true;
                                continue;
                            }
                            let target = if password_token_seen {
                                &mut url.password
                            } else {
                                &mut url.username
                            };
                            percent_encode_char(target, ch, USERINFO_PERCENT_ENCODE_SET);
                        }
                        buffer.clear();
                    } else if c.is_none()
                        || matches!(c, Some('/') | Some('?') | Some('#'))
                        || (c == Some('\\') && self.is_special(&url.scheme))
                    {
                        if at_flag && buffer.is_empty() {
                            return Err(self.failure(url, ErrorKind::InvalidCredentials));
                        }
                        input.rewind(buffer.chars().count() + 1);
                        buffer.clear();
                        state = State::Host;
                    } else if let Some(ch) = c {
                        buffer.push(ch);
                    }
                }

                State::Host | State::Hostname => {
                    if overridden && url.scheme == "file" {
                        input.rewind_last();
                        state = State::FileHost;
                    } else if c == Some(':') && !bracket_flag {
                        if buffer.is_empty() {
                            return Err(self.failure(url, ErrorKind::HostMissing));
                        }
                        let is_opaque = !self.is_special(&url.scheme);
                        let host = self.parse_host(url, &buffer, is_opaque)?;
                        url.set_parsed_host(host);
                        buffer.clear();
                        state = State::Port;
                        if state_override == Some(State::Hostname) {
                            return Ok(());
                        }
                    } else if c.is_none()
                        || matches!(c, Some('/') | Some('?') | Some('#'))
                        || (c == Some('\\') && self.is_special(&url.scheme))
                    {
                        input.rewind_last();
                        if self.is_special(&url.scheme) && buffer.is_empty() {
                            return Err(self.failure(url, ErrorKind::HostMissing));
                        }
                        if overridden
                            && buffer.is_empty()
                            && (!url.username.is_empty()
                                || !url.password.is_empty()
                                || url.port.is_some())
                        {
                            return Err(self.failure(url, ErrorKind::HostMissing));
                        }
                        let is_opaque = !self.is_special(&url.scheme);
                        let host = self.parse_host(url, &buffer, is_opaque)?;
                        url.set_parsed_host(host);
                        buffer.clear();
                        state = State::PathStart;
                        if overridden {
                            return Ok(());
                        }
                    } else if let Some(ch) = c {
                        if ch == '[' {
                            bracket_flag = true;
                        } else if ch == ']' {
                            bracket_flag = false;
                        }
                        buffer.push(ch);
                    }
                }

                State::Port => {
                    if let Some(ch) = c
                        && ch.is_ascii_digit()
                    {
                        buffer.push(ch);
                    } else if c.is_none()
                        || matches!(c, Some('/') | Some('?') | Some('#'))
                        || (c == Some('\\') && self.is_special(&url.scheme))
                        || overridden
                    {
                        if !buffer.is_empty() {
                            let port = match buffer.parse::<u32>() {
                                Ok(port) if port <= 65535 => port as u16,
                                _ => return Err(self.failure(url, ErrorKind::PortOutOfRange)),
                            };
                            url.port = Some(port);
                            url.clean_default_port();
                            buffer.clear();
                        }
                        if overridden {
                            return Ok(());
                        }
                        state = State::PathStart;
                        input.rewind_last();
                    } else {
                        return Err(self.failure(url, ErrorKind::PortInvalid));
                    }
                }

                State::File => {
                    url.scheme = "file".to_string();
                    url.set_empty_host();
                    if matches!(c, Some('/') | Some('\\')) {
                        if c == Some('\\') {
                            self.validation_error(url, ErrorKind::InvalidReverseSolidus)?;
                        }
                        state = State::FileSlash;
                    } else if let Some(b) = base.filter(|b| b.scheme == "file") {
                        url.copy_host_from(b);
                        url.path = b.path.clone();
                        url.query = b.query.clone();
                        match c {
                            None => {}
                            Some('?') => {
                                url.query = Some(String::new());
                                state = State::Query;
                            }
                            Some('#') => {
                                url.fragment = Some(String::new());
                                state = State::Fragment;
                            }
                            Some(_) => {
                                url.query = None;
                                if !starts_with_windows_drive_letter(input.remaining()) {
                                    url.path.shorten(&url.scheme);
                                } else {
                                    self.validation_error(
                                        url,
                                        ErrorKind::FileInvalidWindowsDriveLetter,
                                    )?;
                                    url.path = Path::List(Vec::new());
                                }
                                state = State::Path;
                                input.rewind_last();
                            }
                        }
                    } else {
                        state = State::Path;
                        input.rewind_last();
                    }
                }

                State::FileSlash => {
                    if matches!(c, Some('/') | Some('\\')) {
                        if c == Some('\\') {
                            self.validation_error(url, ErrorKind::InvalidReverseSolidus)?;
                        }
                        state = State::FileHost;
                    } else {
                        if let Some(b) = base.filter(|b| b.scheme == "file") {
                            url.copy_host_from(b);
                            if !starts_with_windows_drive_letter(input.remaining())
                                && let Some(first) = b.path.segments().first()
                                && is_normalized_windows_drive_letter(first)
                            {
                                // Windows drive letter quirk: the drive is
                                // inherited even though the path is not.
                                url.path.append_segment(first.clone(), false);
                            }
                        }
                        state = State::Path;
                        input.rewind_last();
                    }
                }

                State::FileHost => {
                    if c.is_none() || matches!(c, Some('/') | Some('\\') | Some('?') | Some('#')) {
                        input.rewind_last();
                        if !overridden && is_windows_drive_letter(&buffer) {
                            self.validation_error(
                                url,
                                ErrorKind::FileInvalidWindowsDriveLetterHost,
                            )?;
                            // The buffer is kept: it becomes the first path
                            // segment rather than a host.
                            state = State::Path;
                        } else if buffer.is_empty() {
                            url.set_empty_host();
                            if overridden {
                                return Ok(());
                            }
                            state = State::PathStart;
                        } else {
                            let is_opaque = !self.is_special(&url.scheme);
                            let mut host = self.parse_host(url, &buffer, is_opaque)?;
                            if host.serialized == "localhost" {
                                host.serialized.clear();
                            }
                            url.set_parsed_host(host);
                            if overridden {
                                return Ok(());
                            }
                            buffer.clear();
                            state = State::PathStart;
                        }
                    } else if let Some(ch) = c {
                        buffer.push(ch);
                    }
                }

                State::PathStart => {
                    if self.is_special(&url.scheme) && !self.opts.skip_trailing_slash_normalization
                    {
                        if c == Some('\\') {
                            self.validation_error(url, ErrorKind::InvalidReverseSolidus)?;
                        }
                        state = State::Path;
                        if !matches!(c, Some('/') | Some('\\')) {
                            input.rewind_last();
                        }
                    } else if !overridden && c == Some('?') {
                        url.query = Some(String::new());
                        state = State::Query;
                    } else if !overridden && c == Some('#') {
                        url.fragment = Some(String::new());
                        state = State::Fragment;
                    } else if c.is_some() {
                        state = State::Path;
                        if c != Some('/') {
                            input.rewind_last();
                        }
                    }
                }

                State::Path => {
                    let special_backslash =
                        c == Some('\\') && self.is_special(&url.scheme);
                    if c.is_none()
                        || c == Some('/')
                        || special_backslash
                        || (!overridden && matches!(c, Some('?') | Some('#')))
                    {
                        if special_backslash {
                            self.validation_error(url, ErrorKind::InvalidReverseSolidus)?;
                        }
                        let slash_terminated = c == Some('/') || special_backslash;
                        if is_double_dot_path_segment(&buffer) {
                            url.path.shorten(&url.scheme);
                            if !slash_terminated {
                                url.path.append_segment(String::new(), false);
                            }
                        } else if is_single_dot_path_segment(&buffer) {
                            if !slash_terminated {
                                url.path.append_segment(String::new(), false);
                            }
                        } else {
                            if url.scheme == "file"
                                && url.path.is_empty_list()
                                && is_windows_drive_letter(&buffer)
                                && !self.opts.skip_windows_drive_letter_normalization
                            {
                                buffer.replace_range(1..2, ":");
                            }
                            let collapse = self.opts.collapse_consecutive_slashes
                                && self.is_special(&url.scheme);
                            url.path.append_segment(buffer.clone(), collapse);
                        }
                        buffer.clear();
                        if c == Some('?') {
                            url.query = Some(String::new());
                            state = State::Query;
                        }
                        if c == Some('#') {
                            url.fragment = Some(String::new());
                            state = State::Fragment;
                        }
                    } else if let Some(ch) = c {
                        if !is_url_code_point(ch) && ch != '%' {
                            self.validation_error(url, ErrorKind::InvalidUrlUnit)?;
                        }
                        if ch == '%' && input.remaining_is_invalid_percent_encoded() {
                            if self.opts.percent_encode_single_percent_sign {
                                buffer.push_str("%25");
                                continue;
                            }
                            self.validation_error(url, ErrorKind::InvalidUrlUnit)?;
                        }
                        percent_encode_char(&mut buffer, ch, self.opts.path_percent_encode_set);
                    }
                }

                State::OpaquePath => match c {
                    Some('?') => {
                        url.query = Some(String::new());
                        state = State::Query;
                    }
                    Some('#') => {
                        url.fragment = Some(String::new());
                        state = State::Fragment;
                    }
                    Some(ch) => {
                        if !is_url_code_point(ch) && ch != '%' {
                            self.validation_error(url, ErrorKind::InvalidUrlUnit)?;
                        }
                        if ch == '%' && input.remaining_is_invalid_percent_encoded() {
                            if self.opts.percent_encode_single_percent_sign {
                                url.path.opaque_push_str("%25");
                                continue;
                            }
                            self.validation_error(url, ErrorKind::InvalidUrlUnit)?;
                        }
                        let mut encoded = String::new();
                        percent_encode_char(
                            &mut encoded,
                            ch,
                            crate::character_sets::C0_PERCENT_ENCODE_SET,
                        );
                        url.path.opaque_push_str(&encoded);
                    }
                    None => {}
                },

                State::Query => {
                    if !overridden && c == Some('#') {
                        url.fragment = Some(String::new());
                        state = State::Fragment;
                    } else if let Some(ch) = c {
                        if !is_url_code_point(ch) && ch != '%' {
                            self.validation_error(url, ErrorKind::InvalidUrlUnit)?;
                        }
                        if ch == '%' && input.remaining_is_invalid_percent_encoded() {
                            if self.opts.percent_encode_single_percent_sign {
                                url.query.get_or_insert_default().push_str("%25");
                                continue;
                            }
                            self.validation_error(url, ErrorKind::InvalidUrlUnit)?;
                        }
                        let set = if self.is_special(&url.scheme) {
                            self.opts.special_query_percent_encode_set
                        } else {
                            self.opts.query_percent_encode_set
                        };
                        percent_encode_char_with(
                            url.query.get_or_insert_default(),
                            ch,
                            set,
                            self.opts.encoding_override,
                        );
                    }
                }

                State::Fragment => {
                    if let Some(ch) = c {
                        if !is_url_code_point(ch) && ch != '%' {
                            self.validation_error(url, ErrorKind::InvalidUrlUnit)?;
                        }
                        if ch == '%' && input.remaining_is_invalid_percent_encoded() {
                            if self.opts.percent_encode_single_percent_sign {
                                url.fragment.get_or_insert_default().push_str("%25");
                                continue;
                            }
                            self.validation_error(url, ErrorKind::InvalidUrlUnit)?;
                        }
                        let set = if self.is_special(&url.scheme) {
                            self.opts.special_fragment_percent_encode_set
                        } else {
                            self.opts.fragment_percent_encode_set
                        };
                        percent_encode_char(url.fragment.get_or_insert_default(), ch, set);
                    }
                }
            }

            if input.eof() {
                break;
            }
        }

        Ok(())
    }
}
