//! Attribute blocks inside multi-line tag comments
//!
//! ```text
//! /*-
//! __name: qa-empty~verify sample_table is distinct
//! __description: no duplicate keys
//! __tags: [nightly, smoke]
//! -*/
//! ```
//!
//! A line starting with `__` opens a new argument; following lines without
//! the prefix continue the previous value.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::config::AttributeTypes;

/// Prefix opening an argument line
pub const ARGUMENT_PREFIX: &str = "__";

/// Attribute holding the tag text in an attribute block
pub const NAME_ATTRIBUTE: &str = "name";

/// A typed attribute value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Text(String),
    List(Vec<String>),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Text(s) => f.write_str(s),
            AttributeValue::List(items) => write!(f, "[{}]", items.join(", ")),
            AttributeValue::Float(v) => write!(f, "{}", v),
            AttributeValue::Bool(v) => write!(f, "{}", v),
        }
    }
}

pub type Attributes = BTreeMap<String, AttributeValue>;

/// Strip surrounding whitespace and one layer of quotes
fn arg_to_string(raw: &str) -> String {
    raw.trim()
        .trim_matches('"')
        .trim()
        .trim_matches('\'')
        .trim()
        .to_string()
}

fn arg_to_list(raw: &str) -> Vec<String> {
    let inner = raw.trim().trim_start_matches('[').trim_end_matches(']').trim();
    if inner.is_empty() {
        return Vec::new();
    }
    inner.split(',').map(arg_to_string).collect()
}

/// Coerce one raw value by the type configured for `key`
pub fn coerce_attribute(
    key: &str,
    raw: &str,
    types: &AttributeTypes,
) -> Result<AttributeValue, String> {
    let is = |names: &[String]| names.iter().any(|n| n == key);

    if is(&types.list) {
        Ok(AttributeValue::List(arg_to_list(raw)))
    } else if is(&types.float) {
        let value = arg_to_string(raw);
        value
            .parse::<f64>()
            .map(AttributeValue::Float)
            .map_err(|_| format!("attribute '{}' expects a number, got '{}'", key, value))
    } else if is(&types.bool) {
        let value = arg_to_string(raw);
        if value.eq_ignore_ascii_case("true") {
            Ok(AttributeValue::Bool(true))
        } else if value.eq_ignore_ascii_case("false") {
            Ok(AttributeValue::Bool(false))
        } else {
            Err(format!(
                "attribute '{}' expects true or false, got '{}'",
                key, value
            ))
        }
    } else {
        Ok(AttributeValue::Text(arg_to_string(raw)))
    }
}

/// Split a block into raw `key: value` arguments.
///
/// Lines are trimmed and blank lines dropped before splitting. Arguments
/// without a `:` (such as a marker's `__name__` line) are skipped.
pub fn split_arguments(block: &str) -> Vec<(String, String)> {
    let mut pieces: Vec<String> = Vec::new();
    for line in block.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match line.strip_prefix(ARGUMENT_PREFIX) {
            Some(rest) => pieces.push(rest.to_string()),
            None => match pieces.last_mut() {
                Some(last) => {
                    last.push('\n');
                    last.push_str(line);
                }
                None => pieces.push(line.to_string()),
            },
        }
    }

    pieces
        .iter()
        .filter_map(|piece| {
            let (key, value) = piece.split_once(':')?;
            let (key, value) = (key.trim(), value.trim());
            if key.is_empty() || value.is_empty() {
                None
            } else {
                Some((key.to_string(), value.to_string()))
            }
        })
        .collect()
}

/// Parse an attribute block, coercing values per the configured types.
///
/// Errors carry a human-readable message; callers attach location.
pub fn parse_attributes(block: &str, types: &AttributeTypes) -> Result<Attributes, String> {
    let mut attributes = Attributes::new();
    for (key, value) in split_arguments(block) {
        let parsed = if key == NAME_ATTRIBUTE {
            AttributeValue::Text(arg_to_string(&value))
        } else {
            coerce_attribute(&key, &value, types)?
        };
        attributes.insert(key, parsed);
    }
    Ok(attributes)
}
