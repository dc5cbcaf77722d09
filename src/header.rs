//! Header block parsing: folding, key/value split and derived metadata

use crate::error::Result;
use crate::params::{decode_encoded_words, extended_parameter, parameter};
use crate::types::{Headers, Meta};
use tracing::trace;

/// A parsed header block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderBlock {
    pub headers: Headers,
    pub meta: Meta,
    /// `boundary` parameter of `Content-Type`, kept undecoded
    pub boundary: Option<String>,
}

/// Splits a header block into logical lines.
///
/// A line ends at a newline that is not followed by horizontal or vertical
/// whitespace; continuation lines stay attached verbatim. The first character
/// of a line never terminates it.
#[must_use]
pub fn logical_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut start = 0;
    std::iter::from_fn(move || {
        if start >= text.len() {
            return None;
        }
        let bytes = text.as_bytes();
        let mut i = start + 1;
        while i < bytes.len() {
            if bytes[i] == b'\n' && !text[i + 1..].starts_with(char::is_whitespace) {
                let line = &text[start..=i];
                start = i + 1;
                return Some(line);
            }
            i += 1;
        }
        let line = &text[start..];
        start = text.len();
        Some(line)
    })
}

/// Parses the raw text of one header block (without the blank line that
/// ends it).
pub fn parse_header_block(text: &str, strict: bool) -> Result<HeaderBlock> {
    let mut headers = Headers::new();
    for line in logical_lines(text) {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        headers.insert(key.trim().to_lowercase(), value.trim().to_string());
    }

    let content_type = headers.get("content-type").map(String::as_str);
    let disposition = headers.get("content-disposition").map(String::as_str);

    let mut meta = Meta {
        content_type: content_type
            .map(|v| decode_leading_value(v, strict))
            .transpose()?,
        disposition: disposition
            .map(|v| decode_leading_value(v, strict))
            .transpose()?,
        encoding: headers
            .get("content-transfer-encoding")
            .map(|v| decode_encoded_words(first_segment(v), strict).map(|e| e.trim().to_string()))
            .transpose()?,
        ..Meta::default()
    };

    meta.charset = content_type
        .and_then(|v| parameter(v, "charset"))
        .map(|v| decode_encoded_words(&v, strict))
        .transpose()?
        .map(|charset| normalize_charset(&charset));

    let filename = match disposition {
        Some(v) => extended_parameter(v, "filename", strict)?,
        None => None,
    };
    let filename = match (filename, content_type) {
        (Some(found), _) => Some(found),
        (None, Some(v)) => extended_parameter(v, "name", strict)?,
        (None, None) => None,
    };
    if let Some(filename) = filename {
        meta.filename = Some(filename.value);
        meta.filename_is_rfc5987 = filename.rfc5987;
    }

    let boundary = content_type.and_then(|v| parameter(v, "boundary"));

    trace!(
        headers = headers.len(),
        content_type = meta.content_type.as_deref(),
        boundary = boundary.as_deref(),
        "parsed header block"
    );

    Ok(HeaderBlock {
        headers,
        meta,
        boundary,
    })
}

fn first_segment(value: &str) -> &str {
    value.split(';').next().unwrap_or_default()
}

fn decode_leading_value(value: &str, strict: bool) -> Result<String> {
    Ok(decode_encoded_words(first_segment(value), strict)?
        .trim()
        .to_lowercase())
}

fn normalize_charset(charset: &str) -> String {
    let charset = charset.trim().to_lowercase();
    if charset == "utf8" {
        "utf-8".to_string()
    } else {
        charset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folded_lines_stay_together() {
        let lines: Vec<_> =
            logical_lines("A: 1\nB: 2;\n\tc=3\nD: 4").collect();
        assert_eq!(lines, vec!["A: 1\n", "B: 2;\n\tc=3\n", "D: 4"]);
    }

    #[test]
    fn leading_newline_is_part_of_first_line() {
        let lines: Vec<_> = logical_lines("\nContent-Type: text/plain").collect();
        assert_eq!(lines, vec!["\nContent-Type: text/plain"]);
    }

    #[test]
    fn crlf_lines() {
        let lines: Vec<_> = logical_lines("A: 1\r\nB: 2\r\n x").collect();
        assert_eq!(lines, vec!["A: 1\r\n", "B: 2\r\n x"]);
    }
}
