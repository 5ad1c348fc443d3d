//! Tagged statements: splitter, tag extraction and registry wired together
//!
//! [`TaggedStatements`] yields one [`Statement`] per span as the splitter
//! advances. Each yielded statement is final; dropping the iterator early
//! leaves everything already yielded valid.

use serde::Serialize;

use super::attributes::Attributes;
use super::comments::comments_in;
use super::kind_rules::KindRules;
use super::registry::TagRegistry;
use super::splitter::{split_statements, StatementSpan, StatementSplitter};
use super::tag_parser::{parse_tag_comment, ExplicitTag, Tag, TagComment};
use crate::config::ScriptConfig;
use crate::error::ScriptError;
use crate::script::Marker;
use crate::util::{line_of, starts_with_ci};

/// Quality-assurance statement classes recognized by kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum QaKind {
    Empty,
    Diff,
}

/// One parsed statement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    /// 1-based position in the script
    pub index: usize,
    /// Statement text without the tag comment or terminator
    pub text: String,
    /// Final, unique tag
    pub tag: Tag,
    /// Tag comment as written, when the tag is explicit
    pub raw_tag_comment: Option<String>,
    pub attributes: Attributes,
    /// Byte offset of the first character of `text`
    pub offset: usize,
    /// 1-based line of the first character of `text`
    pub line: usize,
    /// Tag before disambiguation
    #[serde(skip)]
    pub provisional_tag: Tag,
}

impl Statement {
    pub fn is_explicit(&self) -> bool {
        self.raw_tag_comment.is_some()
    }

    pub fn first_line(&self) -> &str {
        self.text.lines().next().unwrap_or("")
    }

    pub fn line_count(&self) -> usize {
        self.text.lines().count()
    }

    pub fn qa_kind(&self) -> Option<QaKind> {
        let kind = self.tag.kind.as_str();
        if !starts_with_ci(kind, "qa-") {
            return None;
        }
        match &kind[3..] {
            k if k.eq_ignore_ascii_case("empty") => Some(QaKind::Empty),
            k if k.eq_ignore_ascii_case("diff") => Some(QaKind::Diff),
            _ => None,
        }
    }
}

/// Lazy iterator of tagged statements over one script
pub struct TaggedStatements<'a> {
    source: &'a str,
    config: &'a ScriptConfig,
    splitter: StatementSplitter<'a>,
    rules: KindRules,
    registry: TagRegistry,
    index: usize,
    markers: Vec<Marker>,
    /// Last `(offset, line)` pair handed out, so line numbers are counted
    /// incrementally
    line_cursor: (usize, usize),
    failed: bool,
}

impl<'a> TaggedStatements<'a> {
    pub fn new(source: &'a str, config: &'a ScriptConfig) -> Self {
        Self {
            source,
            config,
            splitter: split_statements(source, config.lexer),
            rules: KindRules::from_config(&config.derive),
            registry: TagRegistry::new(),
            index: 0,
            markers: Vec::new(),
            line_cursor: (0, 1),
            failed: false,
        }
    }

    /// Markers seen so far
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Consume any remaining statements and return all markers, including
    /// those after the last statement.
    pub fn finish(mut self) -> Result<Vec<Marker>, ScriptError> {
        for statement in self.by_ref() {
            statement?;
        }
        if !self.failed {
            let start = self.splitter.region_start();
            self.scan_region(start, self.source.len())?;
        }
        Ok(self.markers)
    }

    /// 1-based line of `offset`. Offsets are requested in increasing order,
    /// so only the bytes since the previous request are scanned.
    fn line_at(&mut self, offset: usize) -> usize {
        let (last_offset, last_line) = self.line_cursor;
        if offset < last_offset {
            return line_of(self.source, offset);
        }
        let end = offset.min(self.source.len());
        let newlines = self.source.as_bytes()[last_offset.min(end)..end]
            .iter()
            .filter(|&&b| b == b'\n')
            .count();
        self.line_cursor = (end, last_line + newlines);
        last_line + newlines
    }

    /// Record markers in `source[start..end]` and return the explicit tag
    /// directly attached to the end of the region, if any.
    fn scan_region(
        &mut self,
        start: usize,
        end: usize,
    ) -> Result<Option<(ExplicitTag, String)>, ScriptError> {
        let source = self.source;
        let region = &source[start..end];
        let comments = comments_in(region);
        let mut attached = None;

        for (i, comment) in comments.iter().enumerate() {
            if !comment.block {
                continue;
            }
            let raw = comment.text(region);
            let offset = start + comment.start;
            match parse_tag_comment(raw, offset, source, self.config)? {
                None => {}
                Some(TagComment::Marker { name, attributes }) => {
                    tracing::trace!(marker = %name, position = self.index, "marker");
                    let line = self.line_at(offset);
                    self.markers.push(Marker {
                        name,
                        position: self.index,
                        attributes,
                        raw: raw.to_string(),
                        offset,
                        line,
                    });
                }
                Some(TagComment::Tag(explicit)) => {
                    let is_last = i + 1 == comments.len();
                    if is_last && directly_above(&region[comment.end..]) {
                        attached = Some((explicit, raw.to_string()));
                    } else {
                        tracing::trace!(
                            tag = %explicit.tag,
                            line = self.line_at(offset),
                            "ignoring tag comment not attached to a statement"
                        );
                    }
                }
            }
        }

        Ok(attached)
    }

    fn tag_statement(&mut self, span: StatementSpan) -> Result<Statement, ScriptError> {
        let explicit = self.scan_region(span.region_start, span.start)?;

        self.index += 1;
        let text = span.text(self.source);
        let (provisional_tag, attributes, raw_tag_comment) = match explicit {
            Some((explicit, raw)) => (explicit.tag, explicit.attributes, Some(raw)),
            None => (
                self.rules.derive(text, self.index),
                Attributes::new(),
                None,
            ),
        };
        let tag = self.registry.register(provisional_tag.clone());

        tracing::trace!(
            index = self.index,
            tag = %tag,
            explicit = raw_tag_comment.is_some(),
            "tagged statement"
        );

        Ok(Statement {
            index: self.index,
            text: text.to_string(),
            tag,
            raw_tag_comment,
            attributes,
            offset: span.start,
            line: self.line_at(span.start),
            provisional_tag,
        })
    }
}

/// A tag comment names the statement only when nothing but whitespace, with
/// at most one line break, separates the two.
fn directly_above(gap: &str) -> bool {
    gap.trim().is_empty() && gap.matches('\n').count() <= 1
}

impl Iterator for TaggedStatements<'_> {
    type Item = Result<Statement, ScriptError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let result = match self.splitter.next()? {
            Ok(span) => self.tag_statement(span),
            Err(e) => Err(e),
        };
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}

/// Lazily split and tag a script
pub fn parse_statements<'a>(source: &'a str, config: &'a ScriptConfig) -> TaggedStatements<'a> {
    TaggedStatements::new(source, config)
}
