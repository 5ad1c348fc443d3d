//! Error types for rust-sqlscript

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Lexical class of a literal or comment that was left open at end of input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    SingleQuoted,
    DoubleQuoted,
    DollarQuoted,
    BlockComment,
}

impl fmt::Display for LiteralKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LiteralKind::SingleQuoted => "single-quoted string",
            LiteralKind::DoubleQuoted => "double-quoted identifier",
            LiteralKind::DollarQuoted => "dollar-quoted body",
            LiteralKind::BlockComment => "block comment",
        };
        f.write_str(label)
    }
}

/// Errors that can occur while reading, splitting and tagging SQL scripts
#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("Unterminated {literal} starting at line {line} (offset {offset}): {snippet}")]
    UnterminatedLiteral {
        literal: LiteralKind,
        offset: usize,
        line: usize,
        snippet: String,
    },

    #[error("Malformed tag at line {line} (offset {offset}): {message}: {raw}")]
    MalformedTag {
        offset: usize,
        line: usize,
        raw: String,
        message: String,
    },

    #[error("Tag '{kind}~{name}' is still duplicated after disambiguation")]
    DuplicateKindNameAfterDisambiguation { kind: String, name: String },

    #[error("Failed to read SQL script: {path}")]
    ScriptReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read config file: {path}")]
    ConfigReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {message}")]
    ConfigParseError { message: String },

    #[error("Script name must end in .sql: '{name}'")]
    InvalidScriptName { name: String },

    #[error("No statement matches '{id}'")]
    StatementNotFound { id: String },

    #[error("Tag '{tag}' is ambiguous ({count} statements)")]
    AmbiguousTag { tag: String, count: usize },

    #[error("Invalid filter pattern '{pattern}'")]
    InvalidFilterPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl From<toml::de::Error> for ScriptError {
    fn from(err: toml::de::Error) -> Self {
        ScriptError::ConfigParseError {
            message: err.to_string(),
        }
    }
}
