//! Parser configuration

use serde::{Deserialize, Serialize};

/// Options shared by every entry point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Charset used before a header block is known, and for bodies that are
    /// not in a foreign binary charset
    pub default_charset: String,

    /// Fail on byte sequences that are invalid for a declared charset instead
    /// of substituting U+FFFD
    pub strict: bool,

    /// Read size used by the reader-based entry points
    pub read_buffer_size: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            default_charset: "utf-8".into(),
            strict: true,
            read_buffer_size: 8192,
        }
    }
}

impl ParseOptions {
    #[must_use]
    pub fn with_default_charset(mut self, label: impl Into<String>) -> Self {
        self.default_charset = label.into();
        self
    }

    #[must_use]
    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    #[must_use]
    pub const fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = if size == 0 { 1 } else { size };
        self
    }
}
