//! Error types for message parsing

use thiserror::Error;

/// Errors that can occur while parsing a message
#[derive(Error, Debug)]
pub enum ParseError {
    /// A declared charset label is not known to the decoder registry
    #[error("Unsupported charset: {0}")]
    UnsupportedCharset(String),

    /// Failed to decode content (invalid base64, invalid bytes for a charset)
    #[error("Failed to decode content: {0}")]
    Decode(String),

    /// Text input declares a foreign binary charset; the raw bytes are needed
    #[error("Charset {charset} requires re-decoding the raw bytes; text input cannot be re-decoded")]
    CharsetRedecode { charset: String },

    /// The tokenizer reached a state that no input should produce
    #[error("Internal parser invariant violated: {0}")]
    Internal(&'static str),

    /// Failed to read from the input source
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    /// The chunk source yielded an error
    #[error("Input source failed: {0}")]
    Source(Box<dyn std::error::Error + Send + Sync>),

    /// Missing required header
    #[error("Missing required header: {0}")]
    MissingHeader(String),
}

impl From<base64::DecodeError> for ParseError {
    fn from(err: base64::DecodeError) -> Self {
        Self::Decode(format!("invalid base64: {err}"))
    }
}

/// Result type for parsing operations
pub type Result<T> = std::result::Result<T, ParseError>;
