//! URL path segment decoding.

/// Decodes `%XX` escapes and `+` (as space) in a single path segment.
///
/// Escapes that are not followed by two hex digits are kept literally. The decoded
/// bytes are interpreted as UTF-8, replacing malformed sequences.
#[must_use]
pub fn percent_decode(segment: &str) -> String {
    let plus_as_space = segment.replace('+', " ");
    String::from_utf8_lossy(&urlencoding::decode_binary(plus_as_space.as_bytes())).into_owned()
}
