//! Content-transfer-encoding decoders (base64, quoted-printable)

use crate::error::Result;
use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

// Mail producers are inconsistent about padding; accept either form.
const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Decodes base64 text, ignoring embedded whitespace and line breaks.
pub fn decode_base64(text: &str) -> Result<Vec<u8>> {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    Ok(BASE64.decode(cleaned)?)
}

/// Decodes quoted-printable text to raw bytes.
///
/// `=XX` hex pairs become bytes and soft line breaks (`=` before a newline)
/// are removed. With `underscore_is_space` (the RFC 2047 `Q` form) `_` maps
/// to a space. A `=` that starts no valid escape is kept literally.
#[must_use]
pub fn decode_quoted_printable(text: &str, underscore_is_space: bool) -> Vec<u8> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'=' => {
                let rest = &bytes[i + 1..];
                if rest.starts_with(b"\r\n") {
                    i += 3;
                } else if rest.starts_with(b"\n") {
                    i += 2;
                } else if let [hi, lo, ..] = rest
                    && let (Some(hi), Some(lo)) = (hex_value(*hi), hex_value(*lo))
                {
                    out.push((hi << 4) | lo);
                    i += 3;
                } else {
                    out.push(b'=');
                    i += 1;
                }
            }
            b'_' if underscore_is_space => {
                out.push(b' ');
                i += 1;
            }
            byte => {
                out.push(byte);
                i += 1;
            }
        }
    }

    out
}

const fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_printable_soft_breaks_and_escapes() {
        assert_eq!(decode_quoted_printable("H=C3=A9llo=\r\nWorld", false), "HélloWorld".as_bytes());
        assert_eq!(decode_quoted_printable("a=\nb", false), b"ab");
        assert_eq!(decode_quoted_printable("a_b", false), b"a_b");
        assert_eq!(decode_quoted_printable("a_b", true), b"a b");
        assert_eq!(decode_quoted_printable("50%=", false), b"50%=");
        assert_eq!(decode_quoted_printable("=ZZ", false), b"=ZZ");
    }

    #[test]
    fn base64_ignores_whitespace_and_padding() {
        assert_eq!(decode_base64("SGVs\r\nbG8=").unwrap(), b"Hello");
        assert_eq!(decode_base64("SGVsbG8").unwrap(), b"Hello");
        assert!(decode_base64("S$Vs").is_err());
    }
}
