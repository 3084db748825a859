//! Byte decoding for [`parse_bytes`](crate::parser::parse_bytes).
//!
//! The scanner works on `&str`. Raw bytes are first turned into UTF-8:
//!
//! 1. A byte order mark (UTF-8, UTF-16LE, UTF-16BE) decides the encoding
//!    and is stripped.
//! 2. Otherwise the `encoding="..."` of a leading `<?xml ...?>` declaration
//!    is looked up through `encoding_rs` labels.
//! 3. Otherwise the input is UTF-8.

use encoding_rs::{Encoding, UTF_8};
use memchr::memmem;
use thiserror::Error;

/// How far into the input a declaration's `?>` is searched for.
const DECLARATION_WINDOW: usize = 256;

/// An error from decoding raw markup bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    /// The declared encoding label is not known to `encoding_rs`.
    #[error("encoding error: unsupported encoding '{0}'")]
    Unsupported(String),
    /// The bytes are not valid in the detected encoding.
    #[error("encoding error: malformed {0} byte sequence")]
    Malformed(&'static str),
}

/// Detects the encoding of `bytes`.
///
/// Returns the encoding and the length of the byte order mark to skip.
///
/// # Errors
///
/// Returns `EncodingError::Unsupported` if a declaration names an unknown
/// encoding.
///
/// # Examples
///
/// ```
/// use quasixml::encoding::detect_encoding;
///
/// let (enc, skip) = detect_encoding(b"\xEF\xBB\xBF<root/>").unwrap();
/// assert_eq!((enc.name(), skip), ("UTF-8", 3));
///
/// let (enc, skip) = detect_encoding(b"<root/>").unwrap();
/// assert_eq!((enc.name(), skip), ("UTF-8", 0));
/// ```
pub fn detect_encoding(bytes: &[u8]) -> Result<(&'static Encoding, usize), EncodingError> {
    if let Some(found) = Encoding::for_bom(bytes) {
        return Ok(found);
    }
    match declared_label(bytes) {
        Some(label) => Encoding::for_label(label.as_bytes())
            .map(|encoding| (encoding, 0))
            .ok_or_else(|| EncodingError::Unsupported(label.to_string())),
        None => Ok((UTF_8, 0)),
    }
}

/// Decodes markup bytes into a UTF-8 `String`.
///
/// # Errors
///
/// Returns `EncodingError` if the declared encoding is unknown or the bytes
/// are malformed for the detected encoding.
pub fn decode_to_utf8(bytes: &[u8]) -> Result<String, EncodingError> {
    let (encoding, bom_len) = detect_encoding(bytes)?;
    let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
    if had_errors {
        return Err(EncodingError::Malformed(encoding.name()));
    }
    tracing::trace!(encoding = encoding.name(), "decoded input");
    Ok(text.into_owned())
}

/// The `encoding` pseudo-attribute of a leading ASCII `<?xml ...?>`.
fn declared_label(bytes: &[u8]) -> Option<&str> {
    if !bytes.starts_with(b"<?xml") {
        return None;
    }
    let window = &bytes[..bytes.len().min(DECLARATION_WINDOW)];
    let decl = &window[..memmem::find(window, b"?>")?];
    let after_key = &decl[memmem::find(decl, b"encoding")? + "encoding".len()..];

    let after_eq = trim_ascii_start(after_key).strip_prefix(b"=")?;
    let quoted = trim_ascii_start(after_eq);
    let (&quote, rest) = quoted.split_first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let end = memchr::memchr(quote, rest)?;
    std::str::from_utf8(&rest[..end]).ok()
}

fn trim_ascii_start(bytes: &[u8]) -> &[u8] {
    let skip = bytes
        .iter()
        .take_while(|b| b.is_ascii_whitespace())
        .count();
    &bytes[skip..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn detected(bytes: &[u8]) -> (&'static str, usize) {
        match detect_encoding(bytes) {
            Ok((encoding, skip)) => (encoding.name(), skip),
            Err(e) => panic!("detection failed: {e}"),
        }
    }

    #[test]
    fn test_detect_boms() {
        assert_eq!(detected(b"\xEF\xBB\xBF<r/>"), ("UTF-8", 3));
        assert_eq!(detected(b"\xFF\xFE<\x00"), ("UTF-16LE", 2));
        assert_eq!(detected(b"\xFE\xFF\x00<"), ("UTF-16BE", 2));
        assert_eq!(detected(b""), ("UTF-8", 0));
    }

    #[test]
    fn test_detect_declared_label() {
        assert_eq!(
            detected(b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><r/>"),
            ("windows-1252", 0)
        );
        assert_eq!(
            detected(b"<?xml version='1.0' encoding = 'Shift_JIS'?><r/>"),
            ("Shift_JIS", 0)
        );
        assert_eq!(detected(b"<?xml version=\"1.0\"?><r/>"), ("UTF-8", 0));
    }

    #[test]
    fn test_unknown_label() {
        let result = detect_encoding(b"<?xml encoding=\"no-such-thing\"?><r/>");
        assert_eq!(
            result.map(|(e, _)| e.name()),
            Err(EncodingError::Unsupported("no-such-thing".to_string()))
        );
    }

    #[test]
    fn test_decode_latin1() {
        let bytes = b"<?xml version=\"1.0\" encoding=\"latin1\"?><r>\xE9</r>";
        assert_eq!(
            decode_to_utf8(bytes),
            Ok("<?xml version=\"1.0\" encoding=\"latin1\"?><r>é</r>".to_string())
        );
    }

    #[test]
    fn test_decode_strips_bom() {
        assert_eq!(decode_to_utf8(b"\xEF\xBB\xBF<r/>"), Ok("<r/>".to_string()));
    }

    #[test]
    fn test_decode_invalid_utf8() {
        assert_eq!(
            decode_to_utf8(b"<r>\xFF\xFE\xFD</r>"),
            Err(EncodingError::Malformed("UTF-8"))
        );
        let message = EncodingError::Malformed("UTF-8").to_string();
        assert_eq!(message, "encoding error: malformed UTF-8 byte sequence");
    }
}
