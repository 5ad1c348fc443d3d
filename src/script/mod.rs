//! A parsed `.sql` script: tagged statements plus markers
//!
//! [`Script`] is the collection the rest of the tooling works with. It owns
//! the finished statement list, resolves statements by index or tag, filters
//! them, and renders them back to SQL.

mod filter;
mod marker;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use encoding_rs::WINDOWS_1252;
use serde::Serialize;

pub use filter::{FilterField, ScriptFilter};
pub use marker::Marker;

use crate::config::ScriptConfig;
use crate::error::ScriptError;
use crate::parser::{parse_statements, verify_unique, Statement, Tag};

/// Read a script, trying UTF-8 first and falling back to Windows-1252
/// (common for SQL files created on Windows). A UTF-8 BOM is stripped.
fn read_file_with_encoding_fallback(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;

    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, had_errors) = WINDOWS_1252.decode(&bytes);
            if had_errors {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "File contains invalid characters",
                ));
            }
            tracing::warn!(path = %path.display(), "script is not UTF-8, decoded as Windows-1252");
            decoded.into_owned()
        }
    };

    Ok(match text.strip_prefix('\u{FEFF}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

/// Identifies a statement within a script
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementId {
    /// 1-based index; negative values count from the end (`-1` is the last)
    Index(isize),
    /// Full tag text, `kind~name`
    Tag(String),
}

impl StatementId {
    /// Integers become indexes, anything else a tag
    pub fn parse(text: &str) -> Self {
        match text.trim().parse::<isize>() {
            Ok(index) => StatementId::Index(index),
            Err(_) => StatementId::Tag(text.to_string()),
        }
    }
}

impl fmt::Display for StatementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementId::Index(index) => write!(f, "{}", index),
            StatementId::Tag(tag) => f.write_str(tag),
        }
    }
}

/// A marker or statement, in document order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScriptItem<'a> {
    Marker(&'a Marker),
    Statement(&'a Statement),
}

/// The `{index, tag, text}` record handed to runners and exporters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementRecord<'a> {
    pub index: usize,
    pub tag: &'a Tag,
    pub text: &'a str,
}

/// A parsed SQL script
#[derive(Debug, Clone)]
pub struct Script {
    name: String,
    path: Option<PathBuf>,
    delimiter: String,
    statements: Vec<Statement>,
    markers: Vec<Marker>,
}

impl Script {
    /// Parse script text. `name` must end in `.sql`.
    pub fn from_source(name: &str, sql: &str, config: &ScriptConfig) -> Result<Self, ScriptError> {
        let is_sql = Path::new(name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("sql"));
        if !is_sql {
            return Err(ScriptError::InvalidScriptName {
                name: name.to_string(),
            });
        }

        let mut parsed = parse_statements(sql, config);
        let statements: Vec<Statement> = parsed.by_ref().collect::<Result<_, _>>()?;
        let markers = parsed.finish()?;
        verify_unique(statements.iter().map(|s| &s.tag))?;

        tracing::debug!(
            script = name,
            statements = statements.len(),
            markers = markers.len(),
            "parsed script"
        );

        Ok(Self {
            name: name.to_string(),
            path: None,
            delimiter: config.patterns.name_delimiter.clone(),
            statements,
            markers,
        })
    }

    /// Read and parse a script file
    pub fn read(path: &Path, config: &ScriptConfig) -> Result<Self, ScriptError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !name.to_ascii_lowercase().ends_with(".sql") {
            return Err(ScriptError::InvalidScriptName { name });
        }

        let sql =
            read_file_with_encoding_fallback(path).map_err(|e| ScriptError::ScriptReadError {
                path: path.to_path_buf(),
                source: e,
            })?;

        let mut script = Self::from_source(&name, &sql, config)?;
        script.path = Some(path.to_path_buf());
        Ok(script)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of statements
    pub fn depth(&self) -> usize {
        self.statements.len()
    }

    /// Total line count of all statements
    pub fn lines(&self) -> usize {
        self.statements.iter().map(Statement::line_count).sum()
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Markers and statements interleaved in document order
    pub fn contents(&self) -> Vec<ScriptItem<'_>> {
        let mut items = Vec::with_capacity(self.statements.len() + self.markers.len());
        let mut markers = self.markers.iter().peekable();

        for (i, statement) in self.statements.iter().enumerate() {
            while let Some(marker) = markers.next_if(|m| m.position <= i) {
                items.push(ScriptItem::Marker(marker));
            }
            items.push(ScriptItem::Statement(statement));
        }
        items.extend(markers.map(ScriptItem::Marker));

        items
    }

    /// Look up one statement.
    ///
    /// A tag matches the final (disambiguated) tag first; failing that, a
    /// tag written once in the script but renamed on collision is still
    /// found by its original text.
    pub fn statement(&self, id: &StatementId) -> Result<&Statement, ScriptError> {
        let not_found = || ScriptError::StatementNotFound { id: id.to_string() };

        match id {
            StatementId::Index(index) => {
                let len = self.statements.len() as isize;
                let position = match *index {
                    0 => return Err(not_found()),
                    i if i > 0 => i - 1,
                    i => len + i,
                };
                if position < 0 {
                    return Err(not_found());
                }
                self.statements.get(position as usize).ok_or_else(not_found)
            }
            StatementId::Tag(text) => {
                if let Some(statement) = self
                    .statements
                    .iter()
                    .find(|s| s.tag.render(&self.delimiter) == *text)
                {
                    return Ok(statement);
                }

                let candidates: Vec<&Statement> = self
                    .statements
                    .iter()
                    .filter(|s| s.provisional_tag.render(&self.delimiter) == *text)
                    .collect();
                match candidates.as_slice() {
                    [] => Err(not_found()),
                    [statement] => Ok(*statement),
                    _ => Err(ScriptError::AmbiguousTag {
                        tag: text.clone(),
                        count: candidates.len(),
                    }),
                }
            }
        }
    }

    /// Tags that occurred more than once before disambiguation
    pub fn duplicates(&self) -> BTreeMap<Tag, usize> {
        let mut counts: BTreeMap<Tag, usize> = BTreeMap::new();
        for statement in &self.statements {
            *counts.entry(statement.provisional_tag.clone()).or_insert(0) += 1;
        }
        counts.retain(|_, count| *count > 1);
        counts
    }

    pub fn has_duplicates(&self) -> bool {
        !self.duplicates().is_empty()
    }

    /// Statements passing `filter`, in order
    pub fn filter(&self, filter: &ScriptFilter) -> Vec<&Statement> {
        self.statements
            .iter()
            .filter(|s| filter.matches(s, &self.delimiter))
            .collect()
    }

    pub fn records(&self) -> Vec<StatementRecord<'_>> {
        self.statements
            .iter()
            .map(|s| StatementRecord {
                index: s.index,
                tag: &s.tag,
                text: &s.text,
            })
            .collect()
    }

    /// Script text that parses back to the same records.
    ///
    /// Explicit tag comments and markers are written as they appeared;
    /// derived tags are left for the parser to derive again.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for item in self.contents() {
            match item {
                ScriptItem::Marker(marker) => {
                    out.push_str(&marker.raw);
                    out.push_str("\n\n");
                }
                ScriptItem::Statement(statement) => {
                    if let Some(raw) = &statement.raw_tag_comment {
                        out.push_str(raw);
                        out.push('\n');
                    }
                    out.push_str(&statement.text);
                    out.push_str(";\n\n");
                }
            }
        }
        out
    }
}
