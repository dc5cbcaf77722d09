//! Charset lookup and incremental text decoding on top of `encoding_rs`

use crate::error::{ParseError, Result};
use encoding_rs::{CoderResult, Decoder, DecoderResult, Encoding, UTF_8};

/// Resolve a charset label (`utf-8`, `ISO-2022-JP`, `gb2312`, ...)
pub fn lookup(label: &str) -> Result<&'static Encoding> {
    let label = label.trim();
    if label.eq_ignore_ascii_case("utf8") {
        return Ok(UTF_8);
    }
    Encoding::for_label(label.as_bytes())
        .ok_or_else(|| ParseError::UnsupportedCharset(label.to_string()))
}

/// Decode a complete byte string in the given charset
pub fn decode(label: &str, bytes: &[u8], strict: bool) -> Result<String> {
    TextDecoder::new(lookup(label)?, strict).decode(bytes, true)
}

/// Streaming decoder; multi-byte sequences split across chunks are carried
/// over to the next call until `last` is set.
pub struct TextDecoder {
    decoder: Decoder,
    strict: bool,
}

impl std::fmt::Debug for TextDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextDecoder")
            .field("encoding", &self.encoding().name())
            .field("strict", &self.strict)
            .finish()
    }
}

impl TextDecoder {
    #[must_use]
    pub fn new(encoding: &'static Encoding, strict: bool) -> Self {
        Self {
            decoder: encoding.new_decoder_with_bom_removal(),
            strict,
        }
    }

    #[must_use]
    pub fn encoding(&self) -> &'static Encoding {
        self.decoder.encoding()
    }

    pub fn decode(&mut self, mut src: &[u8], last: bool) -> Result<String> {
        let mut out = String::new();
        loop {
            if self.strict {
                let needed = self
                    .decoder
                    .max_utf8_buffer_length_without_replacement(src.len())
                    .unwrap_or(src.len() * 3 + 16);
                out.reserve(needed);
                let (result, read) =
                    self.decoder
                        .decode_to_string_without_replacement(src, &mut out, last);
                src = &src[read..];
                match result {
                    DecoderResult::InputEmpty => return Ok(out),
                    DecoderResult::OutputFull => {}
                    DecoderResult::Malformed(_, _) => {
                        return Err(ParseError::Decode(format!(
                            "invalid byte sequence for charset {}",
                            self.encoding().name()
                        )));
                    }
                }
            } else {
                let needed = self
                    .decoder
                    .max_utf8_buffer_length(src.len())
                    .unwrap_or(src.len() * 3 + 16);
                out.reserve(needed);
                let (result, read, _) = self.decoder.decode_to_string(src, &mut out, last);
                src = &src[read..];
                if result == CoderResult::InputEmpty {
                    return Ok(out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_multibyte_sequence_is_carried_over() {
        let mut decoder = TextDecoder::new(UTF_8, true);
        let bytes = "文字".as_bytes();
        let first = decoder.decode(&bytes[..2], false).unwrap();
        let second = decoder.decode(&bytes[2..], true).unwrap();
        assert_eq!(first, "");
        assert_eq!(second, "文字");
    }

    #[test]
    fn strict_rejects_invalid_bytes() {
        assert!(decode("utf-8", &[0xff, 0xfe, 0x41], true).is_err());
        assert_eq!(decode("utf-8", &[0x41, 0xff], false).unwrap(), "A\u{fffd}");
    }

    #[test]
    fn unknown_label() {
        assert!(matches!(
            lookup("x-no-such-charset"),
            Err(ParseError::UnsupportedCharset(_))
        ));
        assert_eq!(lookup("UTF8").unwrap(), UTF_8);
    }
}
