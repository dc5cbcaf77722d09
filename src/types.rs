//! Core types of the parsed part tree

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Header fields of one part: lower-cased keys, last occurrence wins
pub type Headers = BTreeMap<String, String>;

/// Metadata derived from a part's header block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    /// `Content-Type` without parameters, lower-cased (`text/plain`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// `charset` parameter of `Content-Type`, lower-cased
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,

    /// `Content-Disposition` without parameters, lower-cased
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disposition: Option<String>,

    /// `Content-Transfer-Encoding`, trimmed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,

    /// Attachment filename from `filename` or `name` parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    /// The filename was decoded from an RFC 5987 / RFC 2231 extended form
    #[serde(
        default,
        rename = "fileNameIsRfc5987",
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub filename_is_rfc5987: bool,
}

impl Meta {
    /// The transfer encoding is `quoted-printable` or `base64`
    #[must_use]
    pub fn is_ascii_armored(&self) -> bool {
        self.encoding.as_deref().is_some_and(|enc| {
            enc.eq_ignore_ascii_case("quoted-printable") || enc.eq_ignore_ascii_case("base64")
        })
    }

    /// The declared charset is not UTF-8 and the body is not transfer-encoded,
    /// so the raw bytes themselves are in that charset.
    #[must_use]
    pub fn needs_charset_redecode(&self) -> bool {
        self.charset
            .as_deref()
            .is_some_and(|charset| charset != "utf-8" && !self.is_ascii_armored())
    }
}

/// A leaf part
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleNode {
    pub headers: Headers,
    pub meta: Meta,
    /// Raw body text, still transfer-encoded
    pub body: String,
}

/// A multipart container
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompoundNode {
    pub headers: Headers,
    pub meta: Meta,
    /// Delimiter declared by the `boundary` parameter
    pub boundary: String,
    /// Parts in document order
    pub children: Vec<Node>,
}

/// One MIME part of a parsed message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Node {
    Simple(SimpleNode),
    Compound(CompoundNode),
}

impl Default for Node {
    fn default() -> Self {
        Self::Simple(SimpleNode::default())
    }
}

impl Node {
    #[must_use]
    pub const fn is_simple(&self) -> bool {
        matches!(self, Self::Simple(_))
    }

    #[must_use]
    pub const fn is_compound(&self) -> bool {
        matches!(self, Self::Compound(_))
    }

    #[must_use]
    pub const fn headers(&self) -> &Headers {
        match self {
            Self::Simple(node) => &node.headers,
            Self::Compound(node) => &node.headers,
        }
    }

    #[must_use]
    pub const fn meta(&self) -> &Meta {
        match self {
            Self::Simple(node) => &node.meta,
            Self::Compound(node) => &node.meta,
        }
    }

    /// Header value by case-insensitive name
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers()
            .get(&name.to_lowercase())
            .map(String::as_str)
    }

    /// Body of a leaf part; `None` for containers
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Simple(node) => Some(&node.body),
            Self::Compound(_) => None,
        }
    }

    /// Boundary of a container; `None` for leaves
    #[must_use]
    pub fn boundary(&self) -> Option<&str> {
        match self {
            Self::Simple(_) => None,
            Self::Compound(node) => Some(&node.boundary),
        }
    }

    /// Children of a container; empty for leaves
    #[must_use]
    pub fn children(&self) -> &[Self] {
        match self {
            Self::Simple(_) => &[],
            Self::Compound(node) => &node.children,
        }
    }

    /// Iterates over this node and all descendants in document order
    #[must_use]
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }

    /// Plain-data JSON form of the tree
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

/// Depth-first, pre-order iterator returned by [`Node::walk`]
#[derive(Debug)]
pub struct Walk<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}
