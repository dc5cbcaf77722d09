//! Terminator scanners shared by the tokenizer (text) and the streaming
//! driver (raw bytes)

/// Kind of delimiter that ended a body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// `--boundary--`
    Final,
    /// `--boundary`
    Medial,
    /// Empty match at end of input
    EndOfInput,
}

/// A located delimiter; `start..end` is the delimiter text itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Found {
    pub start: usize,
    pub end: usize,
    pub kind: Delimiter,
}

/// Outcome of a delimiter search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Search {
    Found(Found),
    /// Nothing conclusive yet; a later search may restart at `resume`
    Pending { resume: usize },
}

const fn is_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

/// Index just past the first non-whitespace byte
#[must_use]
pub fn content_start_bytes(bytes: &[u8]) -> Option<usize> {
    bytes.iter().position(|&b| !is_space(b)).map(|i| i + 1)
}

/// Index just past the first non-whitespace character.
///
/// Only ASCII whitespace is skipped, so the result agrees with
/// [`content_start_bytes`] on the encoded form of the same text.
#[must_use]
pub fn content_start_text(text: &str) -> Option<usize> {
    text.char_indices()
        .find(|&(_, c)| !u8::try_from(c).is_ok_and(is_space))
        .map(|(i, c)| i + c.len_utf8())
}

fn blank_line_at(bytes: &[u8]) -> Option<usize> {
    let mut n = 0;
    for _ in 0..2 {
        if bytes.get(n) == Some(&b'\r') {
            n += 1;
        }
        if bytes.get(n) != Some(&b'\n') {
            return None;
        }
        n += 1;
    }
    Some(n)
}

/// Finds the first `(\r?\n){2}` starting at or after `from`.
///
/// Returns `(start, end)` of the blank-line terminator.
#[must_use]
pub fn find_blank_line(bytes: &[u8], from: usize) -> Option<(usize, usize)> {
    (from..bytes.len()).find_map(|i| blank_line_at(&bytes[i..]).map(|len| (i, i + len)))
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Searches `text` from `from` for `marker` (`--boundary`).
///
/// A marker followed by nothing or by a lone `-` is still arriving and is
/// skipped, so a partial `--boundary--` is never read as medial. With
/// `flush_guard`, a final marker that ends exactly at the end of non-final
/// input is also left for a later search. With no marker only end of input
/// terminates.
#[must_use]
pub fn find_delimiter(
    text: &str,
    from: usize,
    marker: Option<&str>,
    eof: bool,
    flush_guard: bool,
) -> Search {
    if let Some(marker) = marker {
        let mut at = from;
        while let Some(offset) = text[at..].find(marker) {
            let start = at + offset;
            let after = start + marker.len();
            let rest = &text[after..];

            if rest.is_empty() || rest == "-" {
                at = start + 1;
                continue;
            }

            if rest.starts_with("--") {
                let end = after + 2;
                if flush_guard && !eof && end == text.len() {
                    return Search::Pending { resume: start };
                }
                return Search::Found(Found {
                    start,
                    end,
                    kind: Delimiter::Final,
                });
            }

            return Search::Found(Found {
                start,
                end: after,
                kind: Delimiter::Medial,
            });
        }

        if !eof {
            let resume = text.len().saturating_sub(marker.len() + 2);
            return Search::Pending {
                resume: floor_char_boundary(text, resume),
            };
        }
    } else if !eof {
        return Search::Pending { resume: text.len() };
    }

    Search::Found(Found {
        start: text.len(),
        end: text.len(),
        kind: Delimiter::EndOfInput,
    })
}
