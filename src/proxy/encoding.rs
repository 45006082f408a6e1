//! Percent-encoding for proxy paths.
//!
//! Target URLs travel as a single path segment, encoded with the
//! URI-component set: everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )` is
//! escaped, so `/`, `:` and `?` inside the target never split the segment.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use thiserror::Error;

/// Characters escaped when embedding a URL in a path segment.
pub const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("invalid percent escape at byte {0}")]
    InvalidEscape(usize),
    #[error("decoded bytes are not valid UTF-8")]
    InvalidUtf8,
}

/// Encode `input` as a single URI component.
pub fn encode_component(input: &str) -> String {
    utf8_percent_encode(input, COMPONENT).to_string()
}

/// Decode a URI component, rejecting malformed escapes.
///
/// `percent_decode_str` passes a stray `%` through untouched; a target with
/// one is treated as malformed instead.
pub fn decode_component(input: &str) -> Result<String, DecodeError> {
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes
                .get(i + 1..i + 3)
                .is_some_and(|pair| pair.iter().all(u8::is_ascii_hexdigit));
            if !valid {
                return Err(DecodeError::InvalidEscape(i));
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    percent_decode_str(input)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|_| DecodeError::InvalidUtf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_like_uri_component() {
        assert_eq!(
            encode_component("https://example.com/new"),
            "https%3A%2F%2Fexample.com%2Fnew"
        );
        assert_eq!(encode_component("a b?c=d&e"), "a%20b%3Fc%3Dd%26e");
        assert_eq!(encode_component("-_.!~*'()"), "-_.!~*'()");
        assert_eq!(encode_component("é"), "%C3%A9");
    }

    #[test]
    fn decodes_escapes() {
        assert_eq!(
            decode_component("https%3A%2F%2Fexample.com%2F").unwrap(),
            "https://example.com/"
        );
        assert_eq!(decode_component("plain+text").unwrap(), "plain+text");
        assert_eq!(decode_component("%C3%A9").unwrap(), "é");
    }

    #[test]
    fn rejects_malformed_escapes() {
        assert_eq!(decode_component("100%"), Err(DecodeError::InvalidEscape(3)));
        assert_eq!(decode_component("%zz"), Err(DecodeError::InvalidEscape(0)));
        assert_eq!(decode_component("a%2"), Err(DecodeError::InvalidEscape(1)));
        assert_eq!(decode_component("%FF"), Err(DecodeError::InvalidUtf8));
    }
}
