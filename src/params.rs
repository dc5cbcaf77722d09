//! Header parameter decoding
//!
//! Two independent decoders live here:
//!
//! - RFC 2047 encoded-words (`=?charset?B|Q?data?=`) embedded anywhere in a
//!   header value.
//! - RFC 2231 / RFC 5987 extended parameters (`key*=charset'lang'%XX`, and
//!   the `key*0`, `key*1`, ... continuations) as found in
//!   `Content-Disposition: attachment; filename*=...`.

use crate::charset;
use crate::error::Result;
use crate::transfer::{decode_base64, decode_quoted_printable};
use percent_encoding::percent_decode_str;
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;
use tracing::debug;

static ENCODED_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"=\?([^?\s*]+)(?:\*[^?\s]*)?\?([BbQq])\?([^?]*)\?=").unwrap()
});

static PARAMETER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?:^|[;\s])([^\s;=*"]+)(?:\*(\d+))?(\*)?\s*=\s*(?:"((?:[^"\\]|\\.)*)"|([^";]+))"#,
    )
    .unwrap()
});

static QUOTED_PAIR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\(.)").unwrap());

/// A resolved parameter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamValue {
    pub value: String,
    /// The value came from an extended (`key*`) form and was percent-decoded
    pub rfc5987: bool,
}

/// Decodes every RFC 2047 encoded-word in `input`.
///
/// Raw line breaks are removed first, so folded values decode as one line.
/// Encoded-words separated only by whitespace are joined without the
/// whitespace; consecutive words in the same charset have their bytes joined
/// before charset decoding, so a character split across two words survives.
/// Text that does not form a well-shaped encoded-word is copied through.
pub fn decode_encoded_words(input: &str, strict: bool) -> Result<String> {
    let text: String = input.chars().filter(|c| !matches!(c, '\r' | '\n')).collect();
    if !text.contains("=?") {
        return Ok(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut pending: Option<(String, Vec<u8>)> = None;
    let mut last_end = 0;

    for caps in ENCODED_WORD.captures_iter(&text) {
        let Some(word) = caps.get(0) else { continue };
        let gap = &text[last_end..word.start()];
        let label = &caps[1];
        let data = &caps[3];

        let bytes = if caps[2].eq_ignore_ascii_case("b") {
            decode_base64(data)?
        } else {
            decode_quoted_printable(data, true)
        };

        let adjacent = pending.is_some() && gap.chars().all(char::is_whitespace);
        if !adjacent {
            flush_word(&mut out, pending.take(), strict)?;
            out.push_str(gap);
        }

        let same_charset =
            matches!(&pending, Some((pending_label, _)) if pending_label.eq_ignore_ascii_case(label));
        if same_charset {
            if let Some((_, buf)) = pending.as_mut() {
                buf.extend_from_slice(&bytes);
            }
        } else {
            flush_word(&mut out, pending.take(), strict)?;
            pending = Some((label.to_string(), bytes));
        }

        last_end = word.end();
    }

    flush_word(&mut out, pending, strict)?;
    out.push_str(&text[last_end..]);
    Ok(out)
}

fn flush_word(out: &mut String, word: Option<(String, Vec<u8>)>, strict: bool) -> Result<()> {
    if let Some((label, bytes)) = word {
        out.push_str(&charset::decode(&label, &bytes, strict)?);
    }
    Ok(())
}

/// Decodes an RFC 5987 value: `charset'language'percent-encoded-bytes`.
///
/// The language tag is ignored. A value without the two `'` delimiters is
/// returned as-is.
pub fn decode_rfc5987(value: &str, strict: bool) -> Result<String> {
    let Some((label, rest)) = value.split_once('\'') else {
        return Ok(value.to_string());
    };
    let Some((_language, data)) = rest.split_once('\'') else {
        return Ok(value.to_string());
    };

    let bytes: Vec<u8> = percent_decode_str(data).collect();
    charset::decode(non_empty_label(label), &bytes, strict)
}

const fn non_empty_label(label: &str) -> &str {
    if label.is_empty() { "utf-8" } else { label }
}

#[derive(Debug)]
struct RawParam<'a> {
    name: &'a str,
    index: Option<u32>,
    extended: bool,
    value: Cow<'a, str>,
}

fn raw_params(header: &str) -> impl Iterator<Item = RawParam<'_>> {
    PARAMETER.captures_iter(header).filter_map(|caps| {
        let name = caps.get(1)?.as_str();
        let index = match caps.get(2) {
            Some(idx) => Some(idx.as_str().parse().ok()?),
            None => None,
        };
        let value = match (caps.get(4), caps.get(5)) {
            (Some(quoted), _) => QUOTED_PAIR.replace_all(quoted.as_str(), "$1"),
            (None, Some(bare)) => Cow::Borrowed(bare.as_str().trim_end()),
            (None, None) => return None,
        };
        Some(RawParam {
            name,
            index,
            extended: caps.get(3).is_some(),
            value,
        })
    })
}

/// Returns the raw (undecoded, unquoted) value of a simple `key=value`
/// parameter, such as `boundary` or `charset`.
#[must_use]
pub fn parameter(header: &str, key: &str) -> Option<String> {
    let mut fallback = None;
    for param in raw_params(header).filter(|p| p.name.eq_ignore_ascii_case(key)) {
        if param.index.is_none() && !param.extended {
            return Some(param.value.into_owned());
        }
        if fallback.is_none() {
            fallback = Some(param.value.into_owned());
        }
    }
    fallback
}

/// Resolves a possibly-extended parameter such as `filename`.
///
/// Precedence:
/// 1. a single `key*=` form (RFC 5987 decoded);
/// 2. a single plain `key=` form (encoded-word decoded);
/// 3. the `key*0`, `key*1`, ... continuations joined in index order.
///
/// Continuations whose indices do not run `0..n` after sorting make the
/// parameter absent. Starred continuations (`key*0*=`) are percent-decoded
/// and joined as bytes before decoding in the charset named by part 0.
pub fn extended_parameter(header: &str, key: &str, strict: bool) -> Result<Option<ParamValue>> {
    let matches: Vec<RawParam<'_>> = raw_params(header)
        .filter(|p| p.name.eq_ignore_ascii_case(key))
        .collect();
    if matches.is_empty() {
        return Ok(None);
    }

    let bare: Vec<&RawParam<'_>> = matches
        .iter()
        .filter(|p| p.extended && p.index.is_none())
        .collect();
    if let [single] = bare.as_slice() {
        let value = decode_rfc5987(&single.value, strict)?;
        return Ok(Some(ParamValue {
            value,
            rfc5987: true,
        }));
    }

    let plain: Vec<&RawParam<'_>> = matches
        .iter()
        .filter(|p| !p.extended && p.index.is_none())
        .collect();
    if let [single] = plain.as_slice() {
        let value = decode_encoded_words(&single.value, strict)?;
        return Ok(Some(ParamValue {
            value,
            rfc5987: false,
        }));
    }

    let mut parts: Vec<&RawParam<'_>> = matches.iter().filter(|p| p.index.is_some()).collect();
    if parts.is_empty() {
        return Ok(None);
    }
    parts.sort_by_key(|p| p.index);

    let in_sequence = parts
        .iter()
        .enumerate()
        .all(|(pos, p)| p.index == u32::try_from(pos).ok());
    if !in_sequence {
        debug!(key, "ignoring parameter with non-contiguous continuation indices");
        return Ok(None);
    }

    if parts.iter().any(|p| p.extended) {
        let value = join_extended_continuations(&parts, strict)?;
        return Ok(Some(ParamValue {
            value,
            rfc5987: true,
        }));
    }

    let joined: String = parts.iter().map(|p| &*p.value).collect();
    Ok(Some(ParamValue {
        value: decode_encoded_words(&joined, strict)?,
        rfc5987: false,
    }))
}

fn join_extended_continuations(parts: &[&RawParam<'_>], strict: bool) -> Result<String> {
    let mut label = "utf-8";
    let mut bytes = Vec::new();

    for (pos, part) in parts.iter().enumerate() {
        if !part.extended {
            bytes.extend_from_slice(part.value.as_bytes());
            continue;
        }

        let mut data: &str = &part.value;
        if pos == 0
            && let Some((charset, rest)) = data.split_once('\'')
            && let Some((_language, encoded)) = rest.split_once('\'')
        {
            label = non_empty_label(charset);
            data = encoded;
        }
        bytes.extend(percent_decode_str(data));
    }

    charset::decode(label, &bytes, strict)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_params_handle_quoting_and_separators() {
        let params: Vec<_> = raw_params(r#"attachment; filename="a; b\".txt";size=12"#).collect();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].name, "filename");
        assert_eq!(params[0].value, "a; b\".txt");
        assert_eq!(params[1].name, "size");
        assert_eq!(params[1].value, "12");
    }

    #[test]
    fn raw_params_read_indices_and_stars() {
        let params: Vec<_> = raw_params("x; name*0*=utf-8''a; name*1=b").collect();
        assert_eq!(params[0].index, Some(0));
        assert!(params[0].extended);
        assert_eq!(params[1].index, Some(1));
        assert!(!params[1].extended);
    }

    #[test]
    fn key_does_not_match_inside_longer_name() {
        assert_eq!(parameter("attachment; filename=a.txt", "name"), None);
    }
}
