//! Strict percent-decoding for URI components.

use percent_encoding::percent_decode_str;

use crate::error::DecodeError;

/// Query-style decoding of `input`: `%XX` escapes are decoded and a literal
/// `+` becomes a space. Malformed escapes are rejected.
///
/// `percent_decode_str` passes a stray `%` through untouched, so every `%`
/// is checked for two trailing hex digits first.
pub(crate) fn percent_decode(input: &str) -> Result<String, DecodeError> {
    let bytes = input.as_bytes();
    for (position, _) in input.match_indices('%') {
        let well_formed = bytes
            .get(position + 1..position + 3)
            .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
        if !well_formed {
            return Err(DecodeError::MalformedEscape { position });
        }
    }

    let spaced = input.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .map_err(|_| DecodeError::InvalidUtf8)
}
