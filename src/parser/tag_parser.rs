//! Tag comments: `/*-kind~name-*/`
//!
//! A tag comment sits directly above the statement it names. Multi-line tag
//! comments carry an attribute block whose `name` attribute holds the tag
//! text, and a tag comment whose first line reads `__something__` is a
//! marker rather than a tag. Markers start from the `[markers.<name>]`
//! defaults in config.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::attributes::{parse_attributes, Attributes, AttributeValue, NAME_ATTRIBUTE};
use crate::config::{PatternConfig, ScriptConfig};
use crate::error::ScriptError;
use crate::util::line_of;

/// Matches a marker header line such as `__appendix__`
static MARKER_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^__([^_\s:][^:]*?)__$").expect("Invalid marker regex"));

/// The `(kind, name)` pair identifying a statement
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Tag {
    pub kind: String,
    pub name: Option<String>,
}

impl Tag {
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: Some(name.into()),
        }
    }

    /// A tag with a kind only
    pub fn kind_only(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: None,
        }
    }

    /// Copy of this tag with an ordinal marker appended to the name
    pub fn with_ordinal(&self, ordinal: usize) -> Self {
        let name = match &self.name {
            Some(name) => format!("{} ({})", name, ordinal),
            None => format!("({})", ordinal),
        };
        Self {
            kind: self.kind.clone(),
            name: Some(name),
        }
    }

    /// Render as `kind<delimiter>name`, or just `kind` without a name
    pub fn render(&self, delimiter: &str) -> String {
        match &self.name {
            Some(name) => format!("{}{}{}", self.kind, delimiter, name),
            None => self.kind.clone(),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render("~"))
    }
}

/// An explicit tag taken from a comment
#[derive(Debug, Clone, PartialEq)]
pub struct ExplicitTag {
    pub tag: Tag,
    pub attributes: Attributes,
}

/// What a block comment turned out to be
#[derive(Debug, Clone, PartialEq)]
pub enum TagComment {
    Tag(ExplicitTag),
    Marker { name: String, attributes: Attributes },
}

/// Split tag text on the first delimiter into kind and name
pub fn split_tag_text(text: &str, delimiter: &str) -> Tag {
    match text.split_once(delimiter) {
        Some((kind, name)) if !name.is_empty() => Tag::new(kind, name),
        Some((kind, _)) => Tag::kind_only(kind),
        None => Tag::kind_only(text),
    }
}

/// Interior of a tag-style comment, or `None` for any other comment
fn interior<'a>(comment: &'a str, patterns: &PatternConfig) -> Option<Result<&'a str, String>> {
    let body = comment.strip_prefix(&patterns.open_tag)?;
    if comment.len() < patterns.open_tag.len() + patterns.close_tag.len() {
        return Some(Err(format!("missing closing '{}'", patterns.close_tag)));
    }
    Some(
        body.strip_suffix(&patterns.close_tag)
            .ok_or_else(|| format!("missing closing '{}'", patterns.close_tag)),
    )
}

/// Interpret one block comment.
///
/// Returns `Ok(None)` for plain comments and dash banners such as
/// `/*------*/`. `offset` is the comment's position in `source` and is only
/// used for error reporting.
pub fn parse_tag_comment(
    comment: &str,
    offset: usize,
    source: &str,
    config: &ScriptConfig,
) -> Result<Option<TagComment>, ScriptError> {
    let malformed = |message: String| ScriptError::MalformedTag {
        offset,
        line: line_of(source, offset),
        raw: comment.to_string(),
        message,
    };

    let body = match interior(comment, &config.patterns) {
        None => return Ok(None),
        Some(body) => body.map_err(malformed)?,
    };
    let trimmed = body.trim();

    // Banners such as `/*------*/`, `/*--- Section ---*/` or a multi-line
    // box of dashes. A real tag never starts with `-`.
    if trimmed.starts_with('-') {
        return Ok(None);
    }

    let first_line = trimmed.lines().next().unwrap_or("").trim();
    if let Some(caps) = MARKER_HEADER.captures(first_line) {
        let name = caps[1].to_string();
        let mut attributes = config.marker_defaults(&name).map_err(malformed)?;
        attributes.extend(parse_attributes(trimmed, &config.attributes).map_err(malformed)?);
        return Ok(Some(TagComment::Marker { name, attributes }));
    }

    let (text, attributes) = if trimmed.contains('\n') {
        let mut attributes =
            parse_attributes(trimmed, &config.attributes).map_err(malformed)?;
        match attributes.remove(NAME_ATTRIBUTE) {
            Some(AttributeValue::Text(name)) => (name, attributes),
            _ => {
                return Err(malformed(format!(
                    "attribute block has no '{}{}' line",
                    super::attributes::ARGUMENT_PREFIX,
                    NAME_ATTRIBUTE
                )))
            }
        }
    } else {
        (trimmed.to_string(), Attributes::new())
    };

    let tag = split_tag_text(&text, &config.patterns.name_delimiter);
    if tag.kind.is_empty() {
        return Err(malformed("empty kind".to_string()));
    }

    Ok(Some(TagComment::Tag(ExplicitTag { tag, attributes })))
}
