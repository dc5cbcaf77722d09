//! Message façade over the part tree: addresses, subject, date, body text
//! and attachments

use crate::charset;
use crate::config::ParseOptions;
use crate::error::{ParseError, Result};
use crate::html::{html_to_plain_text, plain_text_to_html};
use crate::params::decode_encoded_words;
use crate::parser::parse_bytes_with;
use crate::stream::parse_reader;
use crate::transfer::{decode_base64, decode_quoted_printable};
use crate::types::{Node, SimpleNode};
use chrono::{DateTime, FixedOffset};
use regex::Regex;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::cell::OnceCell;
use std::io::Read;
use std::sync::LazyLock;
use tracing::debug;

static MAILBOX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^"?(?<name>[^"]*)"?\s*<(?<address>.*)>$"#).unwrap());

/// One entry of an address list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mailbox {
    /// Display name (e.g., "John Doe")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Email address (e.g., "john@example.com")
    pub address: String,
}

impl Mailbox {
    /// Parse a single `"Name" <address>` or bare-address entry
    pub fn parse(entry: &str, strict: bool) -> Result<Self> {
        let decoded = decode_encoded_words(entry.trim(), strict)?;

        if let Some(caps) = MAILBOX.captures(&decoded) {
            let name = caps["name"].trim();
            return Ok(Self {
                name: (!name.is_empty()).then(|| name.to_string()),
                address: caps["address"].trim().to_string(),
            });
        }

        Ok(Self {
            name: None,
            address: decoded,
        })
    }
}

/// Parse a comma-separated address list; a missing header gives an empty list.
pub fn parse_mailbox_list(value: Option<&str>, strict: bool) -> Result<Vec<Mailbox>> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| Mailbox::parse(entry, strict))
        .collect()
}

/// A part with `Content-Disposition: attachment`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    /// Transfer-decoded content
    pub content: Vec<u8>,
}

/// Message body with lazily derived plain and HTML renderings.
///
/// Whichever form the message lacks is computed from the other on first
/// access and cached.
#[derive(Debug, Clone, Default)]
pub struct Body {
    plain: OnceCell<String>,
    html: OnceCell<String>,
}

impl Body {
    #[must_use]
    pub fn new(plain: Option<String>, html: Option<String>) -> Self {
        Self {
            plain: plain.map(OnceCell::from).unwrap_or_default(),
            html: html.map(OnceCell::from).unwrap_or_default(),
        }
    }

    #[must_use]
    pub fn plain(&self) -> &str {
        self.plain
            .get_or_init(|| html_to_plain_text(self.html.get().map_or("", String::as_str)))
    }

    #[must_use]
    pub fn html(&self) -> &str {
        self.html
            .get_or_init(|| plain_text_to_html(self.plain.get().map_or("", String::as_str)))
    }
}

impl Serialize for Body {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Body", 2)?;
        state.serialize_field("plain", self.plain())?;
        state.serialize_field("html", self.html())?;
        state.end()
    }
}

/// A parsed message
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Eml {
    pub from: Vec<Mailbox>,
    pub reply_to: Vec<Mailbox>,
    pub to: Vec<Mailbox>,
    pub cc: Vec<Mailbox>,
    pub bcc: Vec<Mailbox>,
    pub subject: String,
    /// `None` when the header is missing or not valid RFC 2822
    pub date: Option<DateTime<FixedOffset>>,
    pub body: Body,
    pub attachments: Vec<Attachment>,
    #[serde(skip)]
    root: Node,
}

impl Eml {
    /// Parse raw message bytes
    pub fn parse(raw: &[u8]) -> Result<Self> {
        Self::parse_with(raw, &ParseOptions::default())
    }

    pub fn parse_with(raw: &[u8], options: &ParseOptions) -> Result<Self> {
        Self::from_node_with(parse_bytes_with(raw, options)?, options)
    }

    /// Parse a message from a blocking reader
    pub fn read<R: Read>(reader: R) -> Result<Self> {
        let options = ParseOptions::default();
        Self::from_node_with(parse_reader(reader, &options)?, &options)
    }

    /// Build the façade from an already parsed tree
    pub fn from_node(root: Node) -> Result<Self> {
        Self::from_node_with(root, &ParseOptions::default())
    }

    pub fn from_node_with(root: Node, options: &ParseOptions) -> Result<Self> {
        let strict = options.strict;
        let list = |name: &str| parse_mailbox_list(root.header(name), strict);

        let from = list("from")?;
        if from.is_empty() {
            return Err(ParseError::MissingHeader("From".into()));
        }

        let subject = decode_encoded_words(root.header("subject").unwrap_or_default(), strict)?;
        let date = root
            .header("date")
            .and_then(|value| DateTime::parse_from_rfc2822(value).ok());

        let reply_to = list("reply-to")?;
        let to = list("to")?;
        let cc = list("cc")?;
        let bcc = list("bcc")?;
        let body = extract_body(&root, strict)?;
        let attachments = extract_attachments(&root)?;

        debug!(
            subject = %subject,
            from = %from[0].address,
            attachments = attachments.len(),
            "parsed message"
        );

        Ok(Self {
            from,
            reply_to,
            to,
            cc,
            bcc,
            subject,
            date,
            body,
            attachments,
            root,
        })
    }

    /// The underlying part tree
    #[must_use]
    pub const fn root(&self) -> &Node {
        &self.root
    }
}

fn extract_body(root: &Node, strict: bool) -> Result<Body> {
    let compound = match root {
        Node::Compound(compound) => compound,
        Node::Simple(simple) => {
            let text = decode_body_text(simple, strict)?;
            return Ok(if simple.meta.content_type.as_deref() == Some("text/html") {
                Body::new(None, Some(text))
            } else {
                Body::new(Some(text), None)
            });
        }
    };

    let container = compound
        .children
        .iter()
        .find(|child| {
            child.is_compound()
                && child.meta().content_type.as_deref() == Some("multipart/alternative")
        })
        .unwrap_or(root);

    let first_simple = |content_type: &str| {
        container.children().iter().find_map(|child| match child {
            Node::Simple(simple) if simple.meta.content_type.as_deref() == Some(content_type) => {
                Some(simple)
            }
            _ => None,
        })
    };

    let plain = first_simple("text/plain")
        .map(|node| decode_body_text(node, strict))
        .transpose()?;
    let html = first_simple("text/html")
        .map(|node| decode_body_text(node, strict))
        .transpose()?;

    Ok(Body::new(plain, html))
}

/// Decode a part's body text: transfer encoding first, then charset.
pub fn decode_body_text(node: &SimpleNode, strict: bool) -> Result<String> {
    let Some(bytes) = transfer_decode(node)? else {
        return Ok(node.body.clone());
    };
    let label = node.meta.charset.as_deref().unwrap_or("utf-8");
    charset::decode(label, &bytes, strict)
}

fn transfer_decode(node: &SimpleNode) -> Result<Option<Vec<u8>>> {
    let body = node.body.trim_end();
    match node.meta.encoding.as_deref() {
        Some(enc) if enc.eq_ignore_ascii_case("base64") => Ok(Some(decode_base64(body)?)),
        Some(enc) if enc.eq_ignore_ascii_case("quoted-printable") => {
            Ok(Some(decode_quoted_printable(body, false)))
        }
        _ => Ok(None),
    }
}

fn extract_attachments(root: &Node) -> Result<Vec<Attachment>> {
    root.walk()
        .filter_map(|node| match node {
            Node::Simple(simple) if simple.meta.disposition.as_deref() == Some("attachment") => {
                Some(simple)
            }
            _ => None,
        })
        .map(|simple| -> Result<Attachment> {
            let content = match simple.meta.encoding.as_deref() {
                Some(enc) if enc.eq_ignore_ascii_case("base64") => decode_base64(&simple.body)?,
                Some(enc) if enc.eq_ignore_ascii_case("quoted-printable") => {
                    decode_quoted_printable(&simple.body, false)
                }
                _ => simple.body.clone().into_bytes(),
            };
            Ok(Attachment {
                filename: simple.meta.filename.clone().unwrap_or_default(),
                content_type: simple.meta.content_type.clone().unwrap_or_default(),
                content,
            })
        })
        .collect()
}
