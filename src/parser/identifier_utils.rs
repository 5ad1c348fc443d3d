//! Identifier reconstruction from sqlparser tokens.
//!
//! Object names in derived tags are kept as written: quoting and schema
//! qualifiers are preserved, case is never normalized.
//!
//! # Examples
//!
//! ```ignore
//! use crate::parser::identifier_utils::*;
//!
//! assert_eq!(join_qualified(&["analytics", "\"Sample\""]), "analytics.\"Sample\"");
//! ```

use sqlparser::tokenizer::Word;

/// Converts a sqlparser-rs Word token back to its written form.
///
/// - `Some('"')` -> `"identifier"`
/// - `Some('[')` -> `[identifier]`
/// - `Some('`')` -> `` `identifier` ``
/// - `None` -> `identifier` (unquoted)
///
/// Embedded double quotes are re-doubled so the result is valid SQL again.
pub fn format_word(word: &Word) -> String {
    match word.quote_style {
        Some('"') => format!("\"{}\"", word.value.replace('"', "\"\"")),
        Some('[') => format!("[{}]", word.value),
        Some('`') => format!("`{}`", word.value),
        Some(q) => format!("{q}{}{q}", word.value),
        None => word.value.clone(),
    }
}

/// Joins identifier parts with `.`
pub fn join_qualified<S: AsRef<str>>(parts: &[S]) -> String {
    parts
        .iter()
        .map(|p| p.as_ref())
        .collect::<Vec<_>>()
        .join(".")
}
