//! Statement splitting on top-level `;` terminators
//!
//! The splitter is purely lexical: it tracks string literals, quoted
//! identifiers, comments and parenthesis depth, and nothing else. Spans are
//! produced incrementally, so callers can stop consuming early.
//!
//! All delimiters are ASCII, so scanning works on bytes and every reported
//! offset falls on a UTF-8 character boundary.

use crate::config::LexerConfig;
use crate::error::{LiteralKind, ScriptError};
use crate::util::{line_of, snippet_at};

/// Offsets of one statement within a script buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatementSpan {
    /// Start of the region between the previous statement's terminator and
    /// this statement (whitespace, comments and tag comments live here)
    pub region_start: usize,
    /// First significant character of the statement
    pub start: usize,
    /// End of the statement text (exclusive), before any trailing comments,
    /// whitespace and the terminator
    pub end: usize,
    /// Offset just past the terminator, or end of input
    pub next: usize,
    /// Whether the statement was closed by `;`
    pub terminated: bool,
}

impl StatementSpan {
    /// Text between the previous statement and this one
    pub fn prelude<'a>(&self, source: &'a str) -> &'a str {
        &source[self.region_start..self.start]
    }

    /// Statement text without terminator
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

/// Incremental scanner yielding one [`StatementSpan`] per statement.
///
/// Cloning the splitter (or creating a new one over the same input) restarts
/// the scan; the sequence of spans is always identical for identical input.
#[derive(Debug, Clone)]
pub struct StatementSplitter<'a> {
    source: &'a str,
    options: LexerConfig,
    pos: usize,
    region_start: usize,
    finished: bool,
}

impl<'a> StatementSplitter<'a> {
    pub fn new(source: &'a str, options: LexerConfig) -> Self {
        Self {
            source,
            options,
            pos: 0,
            region_start: 0,
            finished: false,
        }
    }

    /// Start of the region that has not yet been assigned to a statement.
    ///
    /// After the splitter is exhausted this is the start of the trailing
    /// text (comments and whitespace after the last statement).
    pub fn region_start(&self) -> usize {
        self.region_start
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn unterminated(&self, literal: LiteralKind, offset: usize) -> ScriptError {
        ScriptError::UnterminatedLiteral {
            literal,
            offset,
            line: line_of(self.source, offset),
            snippet: snippet_at(self.source, offset),
        }
    }

    /// Offset of the newline ending a `--` comment (or end of input)
    fn line_comment_end(&self, from: usize) -> usize {
        self.source.as_bytes()[from..]
            .iter()
            .position(|&b| b == b'\n')
            .map(|p| from + p)
            .unwrap_or(self.source.len())
    }

    /// Offset just past the `*/` closing a block comment opened at `open`
    fn block_comment_end(&self, open: usize) -> Result<usize, ScriptError> {
        self.source[open + 2..]
            .find("*/")
            .map(|p| open + 2 + p + 2)
            .ok_or_else(|| self.unterminated(LiteralKind::BlockComment, open))
    }

    /// Offset just past the quote closing a literal opened at `open`.
    ///
    /// Doubled quotes are escapes; backslash escapes apply to single-quoted
    /// strings when enabled.
    fn quoted_end(&self, open: usize, quote: u8) -> Result<usize, ScriptError> {
        let bytes = self.source.as_bytes();
        let backslash = quote == b'\'' && self.options.backslash_escapes;
        let mut i = open + 1;
        while i < bytes.len() {
            match bytes[i] {
                b'\\' if backslash => i += 2,
                b if b == quote => {
                    if bytes.get(i + 1) == Some(&quote) {
                        i += 2;
                    } else {
                        return Ok(i + 1);
                    }
                }
                _ => i += 1,
            }
        }
        let literal = if quote == b'\'' {
            LiteralKind::SingleQuoted
        } else {
            LiteralKind::DoubleQuoted
        };
        Err(self.unterminated(literal, open))
    }

    /// Offset just past the `$$` closing a body opened at `open`
    fn dollar_quoted_end(&self, open: usize) -> Result<usize, ScriptError> {
        self.source[open + 2..]
            .find("$$")
            .map(|p| open + 2 + p + 2)
            .ok_or_else(|| self.unterminated(LiteralKind::DollarQuoted, open))
    }

    fn scan(&mut self) -> Result<Option<StatementSpan>, ScriptError> {
        let bytes = self.source.as_bytes();
        let len = bytes.len();
        let mut pos = self.pos;
        let mut start: Option<usize> = None;
        let mut end = pos;
        let mut depth = 0usize;

        while pos < len {
            let next = bytes.get(pos + 1).copied();
            match bytes[pos] {
                b'-' if next == Some(b'-') => {
                    pos = self.line_comment_end(pos);
                }
                b'/' if next == Some(b'*') => {
                    pos = self.block_comment_end(pos)?;
                }
                b'\'' | b'"' => {
                    start.get_or_insert(pos);
                    pos = self.quoted_end(pos, bytes[pos])?;
                    end = pos;
                }
                b'$' if next == Some(b'$') && self.options.dollar_quotes => {
                    start.get_or_insert(pos);
                    pos = self.dollar_quoted_end(pos)?;
                    end = pos;
                }
                b'(' => {
                    start.get_or_insert(pos);
                    depth += 1;
                    pos += 1;
                    end = pos;
                }
                b')' => {
                    start.get_or_insert(pos);
                    depth = depth.saturating_sub(1);
                    pos += 1;
                    end = pos;
                }
                b';' if depth == 0 => {
                    pos += 1;
                    if let Some(start) = start {
                        let span = StatementSpan {
                            region_start: self.region_start,
                            start,
                            end,
                            next: pos,
                            terminated: true,
                        };
                        self.pos = pos;
                        self.region_start = pos;
                        return Ok(Some(span));
                    }
                    // Empty statement: its text stays part of the region.
                }
                b if b.is_ascii_whitespace() => pos += 1,
                _ => {
                    start.get_or_insert(pos);
                    pos += 1;
                    end = pos;
                }
            }
        }

        self.pos = len;
        self.finished = true;
        match start {
            Some(start) => {
                let span = StatementSpan {
                    region_start: self.region_start,
                    start,
                    end,
                    next: len,
                    terminated: false,
                };
                self.region_start = len;
                Ok(Some(span))
            }
            None => Ok(None),
        }
    }
}

impl Iterator for StatementSplitter<'_> {
    type Item = Result<StatementSpan, ScriptError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.scan() {
            Ok(span) => span.map(Ok),
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// Split a script into statement spans using the given lexer options
pub fn split_statements(source: &str, options: LexerConfig) -> StatementSplitter<'_> {
    StatementSplitter::new(source, options)
}
