//! SQL script segmentation and tagging

mod attributes;
mod comments;
mod identifier_utils;
mod kind_rules;
mod registry;
mod splitter;
mod statements;
mod tag_parser;
mod token_parser_base;

pub use attributes::{
    coerce_attribute, parse_attributes, split_arguments, AttributeValue, Attributes,
};
pub use kind_rules::{KindRule, KindRules, UNKNOWN_KIND};
pub use registry::{verify_unique, TagRegistry};
pub use splitter::{split_statements, StatementSpan, StatementSplitter};
pub use statements::{parse_statements, QaKind, Statement, TaggedStatements};
pub use tag_parser::{parse_tag_comment, split_tag_text, ExplicitTag, Tag, TagComment};
