//! Derived tags for statements without a tag comment
//!
//! Rules are an ordered table of leading-keyword sequences, evaluated top to
//! bottom with the first match winning. Configured rules come first, then the
//! built-in table:
//!
//! | Leading keywords                        | Kind                      | Name        |
//! |-----------------------------------------|---------------------------|-------------|
//! | `select`, `with`                        | `select-data`             | fallback    |
//! | `set` / `unset`                         | `set-param` / `unset-param` | fallback  |
//! | `insert [overwrite] into`               | `insert-into`             | object      |
//! | `merge into`, `copy into`               | `merge-into`, `copy-into` | object      |
//! | `update`, `delete`                      | `update-unknown`, ...     | fallback    |
//! | `<verb> [or replace] <object>`          | `<verb>-<object>`         | object      |
//! | `<verb>` with an unrecognized object    | `<verb>-unknown`          | fallback    |
//! | anything else                           | `unknown`                 | fallback    |
//!
//! The fallback name is `statement #<index>` (configurable).

use once_cell::sync::Lazy;

use super::tag_parser::Tag;
use super::token_parser_base::TokenParser;
use crate::config::DeriveConfig;

/// Kind assigned when no rule matches
pub const UNKNOWN_KIND: &str = "unknown";

/// Verbs combined with every entry of [`OBJECTS`]
static VERBS: &[&str] = &[
    "create", "drop", "alter", "undrop", "describe", "desc", "use", "truncate", "show",
];

/// Verbs that only ever produce `<verb>-unknown`
static BARE_VERBS: &[&str] = &["grant", "revoke", "call", "comment", "commit", "rollback"];

/// Object types, multi-word entries before their suffixes
static OBJECTS: &[&str] = &[
    "transient table",
    "temporary table",
    "temp table",
    "external table",
    "dynamic table",
    "table",
    "secure view",
    "materialized view",
    "view",
    "schema",
    "database",
    "warehouse",
    "stage",
    "file format",
    "sequence",
    "stream",
    "task",
    "pipe",
    "function",
    "procedure",
    "role",
    "user",
];

/// Statement shapes that are not `<verb> <object>`
static GENERIC: &[(&str, &str, bool)] = &[
    ("select", "select-data", false),
    ("with", "select-data", false),
    ("set", "set-param", false),
    ("unset", "unset-param", false),
    ("insert overwrite into", "insert-into", true),
    ("insert into", "insert-into", true),
    ("merge into", "merge-into", true),
    ("copy into", "copy-into", true),
    ("update", "update-unknown", false),
    ("delete", "delete-unknown", false),
];

static BUILTIN_RULES: Lazy<Vec<KindRule>> = Lazy::new(|| {
    let mut rules: Vec<KindRule> = GENERIC
        .iter()
        .map(|(keywords, kind, names_object)| KindRule::new(keywords, *kind, *names_object))
        .collect();

    for verb in VERBS {
        for object in OBJECTS {
            rules.push(KindRule::new(
                &format!("{} {}", verb, object),
                format!("{}-{}", verb, object),
                true,
            ));
        }
    }
    for verb in VERBS.iter().chain(BARE_VERBS) {
        rules.push(KindRule::new(verb, format!("{}-unknown", verb), false));
    }

    rules
});

/// One `keywords -> kind` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindRule {
    keywords: Vec<String>,
    kind: String,
    names_object: bool,
}

impl KindRule {
    /// `keywords` is split on whitespace, so `"insert into"` and
    /// `["insert", "into"]` describe the same rule.
    pub fn new(keywords: &str, kind: impl Into<String>, names_object: bool) -> Self {
        Self {
            keywords: keywords.split_whitespace().map(str::to_lowercase).collect(),
            kind: kind.into(),
            names_object,
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Match the leading keywords, leaving the parser just past them.
    ///
    /// `or replace` is accepted after the first keyword.
    fn matches(&self, parser: &mut TokenParser) -> bool {
        parser.set_pos(0);
        for (i, keyword) in self.keywords.iter().enumerate() {
            parser.skip_whitespace();
            if parser.expect_word_ci(keyword).is_none() {
                return false;
            }
            if i == 0 {
                let _ = parser.expect_words_ci(&["or", "replace"]);
            }
        }
        true
    }
}

/// Rule table used to derive tags
#[derive(Debug, Clone)]
pub struct KindRules {
    custom: Vec<KindRule>,
    default_name: String,
    include_index: bool,
}

impl KindRules {
    pub fn from_config(config: &DeriveConfig) -> Self {
        let custom = config
            .rules
            .iter()
            .map(|rule| KindRule::new(&rule.keywords.join(" "), rule.kind.clone(), rule.names_object))
            .collect();

        Self {
            custom,
            default_name: config.default_name.clone(),
            include_index: config.include_index,
        }
    }

    /// All rules in evaluation order
    pub fn rules(&self) -> impl Iterator<Item = &KindRule> {
        self.custom.iter().chain(BUILTIN_RULES.iter())
    }

    /// Positional name used when no object name is available
    pub fn fallback_name(&self, index: usize) -> String {
        if self.include_index {
            format!("{} #{}", self.default_name, index)
        } else {
            self.default_name.clone()
        }
    }

    /// Derive a tag from statement text. Never fails: unrecognized shapes
    /// get the `unknown` kind.
    pub fn derive(&self, text: &str, index: usize) -> Tag {
        let Some(mut parser) = TokenParser::new(text) else {
            tracing::warn!(index, "could not tokenize statement, deriving unknown kind");
            return Tag::new(UNKNOWN_KIND, self.fallback_name(index));
        };

        for rule in self.rules() {
            if !rule.matches(&mut parser) {
                continue;
            }
            let name = if rule.names_object {
                object_name(&mut parser)
            } else {
                None
            };
            return Tag::new(
                rule.kind.clone(),
                name.unwrap_or_else(|| self.fallback_name(index)),
            );
        }

        Tag::new(UNKNOWN_KIND, self.fallback_name(index))
    }
}

/// Object name following the matched keywords, skipping `if [not] exists`
fn object_name(parser: &mut TokenParser) -> Option<String> {
    if parser.expect_words_ci(&["if", "not", "exists"]).is_none() {
        let _ = parser.expect_words_ci(&["if", "exists"]);
    }
    parser.skip_whitespace();
    parser.parse_object_name()
}
