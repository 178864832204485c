//! Source file spans and offsets carried from the typed tree onto IR nodes

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A unique identifier for a source file
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[display("file#{_0}")]
pub struct FileId(pub u32);

/// A byte offset span in a source file
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Offsets used by compiler-synthesized nodes that have no source text
    pub const UNDEFINED: Span = Span {
        start: u32::MAX,
        end: u32::MAX,
    };

    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn range(&self) -> Range<usize> {
        self.start as usize..self.end as usize
    }

    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn is_undefined(&self) -> bool {
        *self == Self::UNDEFINED
    }
}

/// A span with associated file
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[display("{file}:{}..{}", span.start, span.end)]
pub struct FileSpan {
    pub file: FileId,
    pub span: Span,
}

impl FileSpan {
    /// Span attached to synthesized declarations and expressions
    pub const SYNTHETIC: FileSpan = FileSpan {
        file: FileId(0),
        span: Span::UNDEFINED,
    };

    pub fn new(file: FileId, span: Span) -> Self {
        Self { file, span }
    }

    pub fn range(&self) -> Range<usize> {
        self.span.range()
    }

    pub fn is_synthetic(&self) -> bool {
        self.span.is_undefined()
    }
}

impl Default for FileSpan {
    fn default() -> Self {
        Self::SYNTHETIC
    }
}
