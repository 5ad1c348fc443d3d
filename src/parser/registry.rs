//! Per-script tag uniqueness
//!
//! The first occurrence of a `(kind, name)` pair keeps its tag; later
//! occurrences get ` (2)`, ` (3)`, ... appended to the name. Ordinals skip
//! over any tag that was already issued, so an explicit `name (2)` tag
//! written in the script is never shadowed.

use std::collections::{HashMap, HashSet};

use super::tag_parser::Tag;
use crate::error::ScriptError;

/// Running occurrence counts for one parse invocation
#[derive(Debug, Default)]
pub struct TagRegistry {
    occurrences: HashMap<Tag, usize>,
    /// Next ordinal to try per provisional tag
    next_ordinal: HashMap<Tag, usize>,
    issued: HashSet<Tag>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provisional tag and return the unique tag to use
    pub fn register(&mut self, tag: Tag) -> Tag {
        let count = self.occurrences.entry(tag.clone()).or_insert(0);
        *count += 1;

        if *count == 1 && !self.issued.contains(&tag) {
            self.issued.insert(tag.clone());
            return tag;
        }

        let mut ordinal = self.next_ordinal.get(&tag).copied().unwrap_or(2);
        let mut candidate = tag.with_ordinal(ordinal);
        while self.issued.contains(&candidate) {
            ordinal += 1;
            candidate = tag.with_ordinal(ordinal);
        }

        tracing::trace!(provisional = %tag, tag = %candidate, "disambiguated duplicate tag");
        self.next_ordinal.insert(tag, ordinal + 1);
        self.issued.insert(candidate.clone());
        candidate
    }

    /// Number of times a provisional tag has been registered
    pub fn occurrences(&self, tag: &Tag) -> usize {
        self.occurrences.get(tag).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.issued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issued.is_empty()
    }
}

/// Check that a finished tag list is free of duplicates
pub fn verify_unique<'a>(tags: impl IntoIterator<Item = &'a Tag>) -> Result<(), ScriptError> {
    let mut seen = HashSet::new();
    for tag in tags {
        if !seen.insert(tag) {
            return Err(ScriptError::DuplicateKindNameAfterDisambiguation {
                kind: tag.kind.clone(),
                name: tag.name.clone().unwrap_or_default(),
            });
        }
    }
    Ok(())
}
