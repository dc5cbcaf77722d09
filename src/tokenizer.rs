//! Boundary-aware tokenizer
//!
//! Text arrives in arbitrary chunks through [`Tokenizer::push_str`]. Nodes
//! live in an arena addressed by index; a part turns from simple into a
//! container by replacing the shape stored in its slot, and parent links are
//! plain indices. Each push runs a loop of single transitions until a pass
//! makes no progress, so deep nesting never grows the call stack.

use crate::config::ParseOptions;
use crate::error::{ParseError, Result};
use crate::header::parse_header_block;
use crate::scan::{Delimiter, Found, Search, content_start_text, find_blank_line, find_delimiter};
use crate::types::{CompoundNode, Headers, Meta, Node, SimpleNode};
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Header,
    Body,
}

#[derive(Debug)]
enum Shape {
    Simple { body: String },
    Compound { boundary: String, children: Vec<usize> },
}

#[derive(Debug)]
struct Slot {
    parent: Option<usize>,
    status: Status,
    headers: Headers,
    meta: Meta,
    shape: Shape,
}

impl Slot {
    fn new(parent: Option<usize>) -> Self {
        Self {
            parent,
            status: Status::Header,
            headers: Headers::new(),
            meta: Meta::default(),
            shape: Shape::Simple {
                body: String::new(),
            },
        }
    }
}

const ROOT: usize = 0;

/// Incremental MIME tokenizer over decoded text
#[derive(Debug)]
pub struct Tokenizer {
    slots: Vec<Slot>,
    current: usize,
    buf: String,
    /// Start of unconsumed text in `buf`
    pos: usize,
    /// Where the next terminator search may start; always `>= pos`
    scan_from: usize,
    eof: bool,
    strict: bool,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(&ParseOptions::default())
    }

    #[must_use]
    pub fn with_options(options: &ParseOptions) -> Self {
        Self {
            slots: vec![Slot::new(None)],
            current: ROOT,
            buf: String::new(),
            pos: 0,
            scan_from: 0,
            eof: false,
            strict: options.strict,
        }
    }

    /// Feeds the next piece of text and resolves as much as it allows.
    pub fn push_str(&mut self, chunk: &str) -> Result<()> {
        self.buf.push_str(chunk);
        self.run()?;
        self.compact();
        Ok(())
    }

    /// Signals end of input and returns the finished tree.
    pub fn finish(mut self) -> Result<Node> {
        self.eof = true;
        self.run()?;
        Ok(self.into_tree())
    }

    /// The root header block has been parsed
    #[must_use]
    pub fn root_header_done(&self) -> bool {
        self.slots[ROOT].status == Status::Body
    }

    /// Metadata of the root part; empty until its header block is parsed
    #[must_use]
    pub fn root_meta(&self) -> &Meta {
        &self.slots[ROOT].meta
    }

    fn run(&mut self) -> Result<()> {
        loop {
            let progressed = match self.slots[self.current].status {
                Status::Header => self.step_header()?,
                Status::Body => self.step_body()?,
            };
            if !progressed {
                return Ok(());
            }
        }
    }

    fn step_header(&mut self) -> Result<bool> {
        let found = content_start_text(&self.buf[self.pos..]).and_then(|offset| {
            let from = self.scan_from.max(self.pos + offset);
            find_blank_line(self.buf.as_bytes(), from)
        });

        let (block_end, rest) = match found {
            Some(found) => found,
            None if self.eof => (self.buf.len(), self.buf.len()),
            None => {
                self.scan_from = self.buf.len().saturating_sub(3).max(self.pos);
                return Ok(false);
            }
        };

        let block = parse_header_block(&self.buf[self.pos..block_end], self.strict)?;
        let index = self.current;
        let slot = &mut self.slots[index];
        slot.headers = block.headers;
        slot.meta = block.meta;
        slot.status = Status::Body;
        if let Some(boundary) = block.boundary {
            debug!(node = index, boundary = %boundary, "part is multipart");
            slot.shape = Shape::Compound {
                boundary,
                children: Vec::new(),
            };
        }

        self.advance(rest);
        Ok(true)
    }

    fn step_body(&mut self) -> Result<bool> {
        let index = self.current;
        let parent = self.slots[index].parent;

        match &self.slots[index].shape {
            Shape::Simple { .. } => {
                let marker = parent.map(|p| self.marker_of(p)).transpose()?;
                let search = find_delimiter(
                    &self.buf,
                    self.search_from(),
                    marker.as_deref(),
                    self.eof,
                    false,
                );
                let Some(found) = self.resolve(search) else {
                    return Ok(false);
                };
                if found.kind == Delimiter::EndOfInput && found.start == self.pos {
                    return Ok(false);
                }

                let text = self.buf[self.pos..found.start].to_string();
                if let Shape::Simple { body } = &mut self.slots[index].shape {
                    *body = text;
                }
                self.advance(found.end);

                match (found.kind, parent) {
                    (Delimiter::EndOfInput, _) => Ok(false),
                    (Delimiter::Final, Some(parent)) => {
                        trace!(node = index, "final delimiter");
                        self.current = self.slots[parent].parent.unwrap_or(parent);
                        Ok(true)
                    }
                    (Delimiter::Medial, Some(parent)) => {
                        trace!(node = index, "medial delimiter");
                        self.current = self.append_child(parent)?;
                        Ok(true)
                    }
                    (_, None) => Err(ParseError::Internal(
                        "delimiter matched for a part outside any multipart container",
                    )),
                }
            }
            Shape::Compound { boundary, .. } => {
                let marker = format!("--{boundary}");
                let search =
                    find_delimiter(&self.buf, self.search_from(), Some(&marker), self.eof, true);
                let Some(found) = self.resolve(search) else {
                    return Ok(false);
                };

                match found.kind {
                    Delimiter::EndOfInput => Ok(false),
                    Delimiter::Final => {
                        self.advance(found.end);
                        if let Some(parent) = parent {
                            self.current = parent;
                        }
                        Ok(true)
                    }
                    Delimiter::Medial => {
                        self.advance(found.end);
                        self.current = self.append_child(index)?;
                        Ok(true)
                    }
                }
            }
        }
    }

    fn resolve(&mut self, search: Search) -> Option<Found> {
        match search {
            Search::Found(found) => Some(found),
            Search::Pending { resume } => {
                self.scan_from = resume.max(self.pos);
                None
            }
        }
    }

    fn marker_of(&self, index: usize) -> Result<String> {
        match &self.slots[index].shape {
            Shape::Compound { boundary, .. } => Ok(format!("--{boundary}")),
            Shape::Simple { .. } => Err(ParseError::Internal(
                "parent of a part is not a multipart container",
            )),
        }
    }

    fn append_child(&mut self, parent: usize) -> Result<usize> {
        let index = self.slots.len();
        match &mut self.slots[parent].shape {
            Shape::Compound { children, .. } => children.push(index),
            Shape::Simple { .. } => {
                return Err(ParseError::Internal(
                    "cannot append a part to a non-multipart node",
                ));
            }
        }
        self.slots.push(Slot::new(Some(parent)));
        Ok(index)
    }

    fn search_from(&self) -> usize {
        self.scan_from.max(self.pos)
    }

    fn advance(&mut self, to: usize) {
        self.pos = to;
        self.scan_from = to;
    }

    fn compact(&mut self) {
        if self.pos == 0 {
            return;
        }
        self.buf.drain(..self.pos);
        self.scan_from = self.scan_from.saturating_sub(self.pos);
        self.pos = 0;
    }

    // Children always sit at higher indices than their parent, so building in
    // reverse order finds every child finished before its container.
    fn into_tree(self) -> Node {
        let mut built: Vec<Option<Node>> = Vec::with_capacity(self.slots.len());
        built.resize_with(self.slots.len(), || None);

        for (index, slot) in self.slots.into_iter().enumerate().rev() {
            let node = match slot.shape {
                Shape::Simple { body } => Node::Simple(SimpleNode {
                    headers: slot.headers,
                    meta: slot.meta,
                    body,
                }),
                Shape::Compound { boundary, children } => Node::Compound(CompoundNode {
                    headers: slot.headers,
                    meta: slot.meta,
                    boundary,
                    children: children
                        .into_iter()
                        .filter_map(|child| built[child].take())
                        .collect(),
                }),
            };
            built[index] = Some(node);
        }

        built.into_iter().next().flatten().unwrap_or_default()
    }
}
