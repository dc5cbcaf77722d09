// Enforce at crate level
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! Incremental MIME Message Parser
//!
//! Turns an RFC 822 / MIME message into a tree of parts, either from a full
//! buffer or from byte chunks as they arrive.
//!
//! # Features
//!
//! - Header folding, RFC 2047 encoded-words and RFC 2231 / 5987 parameters
//! - Nested multipart bodies resolved with a non-recursive state machine
//! - Identical trees however the input is chunked
//! - Bodies in a declared foreign charset decoded from the raw bytes
//! - A message façade with addresses, subject, date, body and attachments
//!
//! # Example
//!
//! ```rust
//! use eml_parse::{Eml, parse_bytes};
//!
//! let raw = b"From: sender@example.com\r\nSubject: Hello\r\n\r\nBody";
//! let root = parse_bytes(raw).unwrap();
//! assert_eq!(root.body(), Some("Body"));
//!
//! let eml = Eml::from_node(root).unwrap();
//! println!("From: {}", eml.from[0].address);
//! println!("Plain: {}", eml.body.plain());
//! ```

mod charset;
mod config;
mod error;
mod header;
mod html;
mod message;
mod params;
mod parser;
mod scan;
mod stream;
mod tokenizer;
mod transfer;
mod types;

pub use config::ParseOptions;
pub use error::{ParseError, Result};
pub use header::{HeaderBlock, parse_header_block};
pub use html::{html_to_plain_text, plain_text_to_html};
pub use message::{Attachment, Body, Eml, Mailbox, decode_body_text, parse_mailbox_list};
pub use params::{ParamValue, decode_encoded_words, decode_rfc5987, extended_parameter, parameter};
pub use parser::{parse_bytes, parse_bytes_with, parse_str, parse_str_with};
#[cfg(feature = "tokio")]
pub use stream::parse_async_reader;
pub use stream::{StreamParser, parse_chunks, parse_reader};
pub use tokenizer::Tokenizer;
pub use transfer::{decode_base64, decode_quoted_printable};
pub use types::*;
