//! `__marker__` blocks
//!
//! A marker is a tag-style comment whose first line reads `__name__`. It
//! labels a point in the script (between statements) instead of naming a
//! statement:
//!
//! ```text
//! /*-
//! __appendix__
//! __description: statements below only run in dev
//! -*/
//! ```
//!
//! Attributes declared under `[markers.appendix]` in `sqlscript.toml` are
//! defaults; the block's own arguments win.

use serde::Serialize;

use crate::parser::{AttributeValue, Attributes};

/// A marker and where it sits among the statements
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub name: String,
    /// Number of statements before the marker
    pub position: usize,
    pub attributes: Attributes,
    /// Comment text as written
    pub raw: String,
    /// Byte offset of the comment in the script
    pub offset: usize,
    /// 1-based line of the comment
    pub line: usize,
}

impl Marker {
    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }
}
