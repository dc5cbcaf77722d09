//! Full-buffer entry points

use crate::config::ParseOptions;
use crate::error::{ParseError, Result};
use crate::stream::StreamParser;
use crate::tokenizer::Tokenizer;
use crate::types::Node;
use tracing::debug;

/// Parse a message that is already text
pub fn parse_str(text: &str) -> Result<Node> {
    parse_str_with(text, &ParseOptions::default())
}

/// Parse text with explicit options.
///
/// Fails with [`ParseError::CharsetRedecode`] when the root part declares a
/// foreign charset for an unencoded body: the original bytes are needed and
/// the caller should use [`parse_bytes`] instead.
pub fn parse_str_with(text: &str, options: &ParseOptions) -> Result<Node> {
    let mut tokenizer = Tokenizer::with_options(options);
    tokenizer.push_str(text)?;
    let root = tokenizer.finish()?;

    let meta = root.meta();
    if meta.needs_charset_redecode()
        && let Some(charset) = &meta.charset
    {
        debug!(charset = %charset, "text input needs charset re-decode");
        return Err(ParseError::CharsetRedecode {
            charset: charset.clone(),
        });
    }

    debug!(
        compound = root.is_compound(),
        parts = root.walk().count(),
        "parsed message"
    );
    Ok(root)
}

/// Parse raw message bytes
pub fn parse_bytes(raw: &[u8]) -> Result<Node> {
    parse_bytes_with(raw, &ParseOptions::default())
}

/// Parse raw bytes with explicit options.
///
/// Bodies in a declared foreign charset are decoded with that charset, the
/// same way the streaming entry points do it.
pub fn parse_bytes_with(raw: &[u8], options: &ParseOptions) -> Result<Node> {
    let mut parser = StreamParser::with_options(options)?;
    parser.push(raw)?;
    parser.finish()
}
