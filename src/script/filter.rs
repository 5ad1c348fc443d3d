//! Include/exclude filtering of statements by kind, name or full tag

use regex::Regex;

use crate::error::ScriptError;
use crate::parser::Statement;

/// Part of a tag a pattern is matched against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Kind,
    Name,
    Tag,
}

#[derive(Debug, Clone, Default)]
struct PatternSet {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl PatternSet {
    fn accepts(&self, value: &str) -> bool {
        (self.include.is_empty() || self.include.iter().any(|re| re.is_match(value)))
            && !self.exclude.iter().any(|re| re.is_match(value))
    }
}

/// Regex filter over statement tags.
///
/// A statement is kept when every non-empty include list has a match and no
/// exclude list matches. Patterns are unanchored.
#[derive(Debug, Clone, Default)]
pub struct ScriptFilter {
    kind: PatternSet,
    name: PatternSet,
    tag: PatternSet,
}

fn compile(pattern: &str) -> Result<Regex, ScriptError> {
    Regex::new(pattern).map_err(|source| ScriptError::InvalidFilterPattern {
        pattern: pattern.to_string(),
        source,
    })
}

impl ScriptFilter {
    pub fn new() -> Self {
        Self::default()
    }

    fn set_mut(&mut self, field: FilterField) -> &mut PatternSet {
        match field {
            FilterField::Kind => &mut self.kind,
            FilterField::Name => &mut self.name,
            FilterField::Tag => &mut self.tag,
        }
    }

    pub fn include(mut self, field: FilterField, pattern: &str) -> Result<Self, ScriptError> {
        let re = compile(pattern)?;
        self.set_mut(field).include.push(re);
        Ok(self)
    }

    pub fn exclude(mut self, field: FilterField, pattern: &str) -> Result<Self, ScriptError> {
        let re = compile(pattern)?;
        self.set_mut(field).exclude.push(re);
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        [&self.kind, &self.name, &self.tag]
            .iter()
            .all(|set| set.include.is_empty() && set.exclude.is_empty())
    }

    /// Whether `statement` passes; `delimiter` renders the full tag
    pub fn matches(&self, statement: &Statement, delimiter: &str) -> bool {
        let tag = &statement.tag;
        self.kind.accepts(&tag.kind)
            && self.name.accepts(tag.name.as_deref().unwrap_or(""))
            && self.tag.accepts(&tag.render(delimiter))
    }
}
