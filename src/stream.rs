//! Streaming driver: raw byte chunks in, part tree out
//!
//! Bytes are queued until the root header block is complete. That block is
//! decoded with the default charset; once its metadata is known the rest of
//! the message goes through a decoder chosen from the declared charset.

use crate::charset::{self, TextDecoder};
use crate::config::ParseOptions;
use crate::error::{ParseError, Result};
use crate::scan::{content_start_bytes, find_blank_line};
use crate::tokenizer::Tokenizer;
use crate::types::Node;
use std::io::{ErrorKind, Read};
use tracing::debug;

/// Push-based parser for a message arriving in byte chunks
#[derive(Debug)]
pub struct StreamParser {
    tokenizer: Tokenizer,
    decoder: TextDecoder,
    queued: Vec<u8>,
    scan_from: usize,
    options: ParseOptions,
}

impl StreamParser {
    pub fn new() -> Result<Self> {
        Self::with_options(&ParseOptions::default())
    }

    pub fn with_options(options: &ParseOptions) -> Result<Self> {
        let encoding = charset::lookup(&options.default_charset)?;
        Ok(Self {
            tokenizer: Tokenizer::with_options(options),
            decoder: TextDecoder::new(encoding, false),
            queued: Vec::new(),
            scan_from: 0,
            options: options.clone(),
        })
    }

    /// Feeds the next chunk of the message.
    pub fn push(&mut self, chunk: &[u8]) -> Result<()> {
        if self.tokenizer.root_header_done() {
            let text = self.decoder.decode(chunk, false)?;
            return self.tokenizer.push_str(&text);
        }

        self.queued.extend_from_slice(chunk);
        let Some(end) = self.root_header_end() else {
            self.scan_from = self.queued.len().saturating_sub(3);
            return Ok(());
        };

        let queued = std::mem::take(&mut self.queued);
        let (head, rest) = queued.split_at(end);
        let header = self.decoder.decode(head, true)?;
        self.tokenizer.push_str(&header)?;
        if !self.tokenizer.root_header_done() {
            return Err(ParseError::Internal("root header end not found in decoded text"));
        }

        self.decoder = self.body_decoder()?;
        let text = self.decoder.decode(rest, false)?;
        self.tokenizer.push_str(&text)
    }

    /// Signals end of input and returns the finished tree.
    pub fn finish(mut self) -> Result<Node> {
        let queued = std::mem::take(&mut self.queued);
        let tail = self.decoder.decode(&queued, true)?;
        if !tail.is_empty() {
            self.tokenizer.push_str(&tail)?;
        }
        self.tokenizer.finish()
    }

    fn root_header_end(&self) -> Option<usize> {
        let content = content_start_bytes(&self.queued)?;
        find_blank_line(&self.queued, self.scan_from.max(content)).map(|(_, end)| end)
    }

    fn body_decoder(&self) -> Result<TextDecoder> {
        let meta = self.tokenizer.root_meta();
        match meta.charset.as_deref() {
            Some(label) if meta.needs_charset_redecode() => {
                debug!(charset = label, "decoding body with declared charset");
                Ok(TextDecoder::new(charset::lookup(label)?, self.options.strict))
            }
            _ => Ok(TextDecoder::new(
                charset::lookup(&self.options.default_charset)?,
                false,
            )),
        }
    }
}

/// Parses a message from a blocking reader.
pub fn parse_reader<R: Read>(mut reader: R, options: &ParseOptions) -> Result<Node> {
    let mut parser = StreamParser::with_options(options)?;
    let mut buf = vec![0; options.read_buffer_size.max(1)];

    loop {
        let read = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(read) => read,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        };
        parser.push(&buf[..read])?;
    }

    parser.finish()
}

/// Parses a message from any source of byte chunks. An error from the source
/// aborts the parse.
pub fn parse_chunks<I, B, E>(chunks: I, options: &ParseOptions) -> Result<Node>
where
    I: IntoIterator<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let mut parser = StreamParser::with_options(options)?;
    for chunk in chunks {
        let chunk = chunk.map_err(|err| ParseError::Source(err.into()))?;
        parser.push(chunk.as_ref())?;
    }
    parser.finish()
}

/// Parses a message from an async reader. Reading is the only await point.
#[cfg(feature = "tokio")]
pub async fn parse_async_reader<R>(mut reader: R, options: &ParseOptions) -> Result<Node>
where
    R: tokio::io::AsyncRead + Unpin,
{
    use tokio::io::AsyncReadExt;

    let mut parser = StreamParser::with_options(options)?;
    let mut buf = vec![0; options.read_buffer_size.max(1)];

    loop {
        let read = reader.read(&mut buf).await?;
        if read == 0 {
            break;
        }
        parser.push(&buf[..read])?;
    }

    parser.finish()
}
