//! Statement splitter tests

use rust_sqlscript::config::LexerConfig;
use rust_sqlscript::error::LiteralKind;
use rust_sqlscript::parser::{split_statements, StatementSpan};
use rust_sqlscript::ScriptError;

fn spans(sql: &str) -> Vec<StatementSpan> {
    split_statements(sql, LexerConfig::default())
        .collect::<Result<_, _>>()
        .unwrap()
}

fn texts(sql: &str) -> Vec<&str> {
    spans(sql).iter().map(|s| s.text(sql)).collect()
}

// ============================================================================
// Terminators
// ============================================================================

#[test]
fn test_statements_in_document_order() {
    let sql = "create table t (a int);\ninsert into t values (1);\nselect * from t;";
    assert_eq!(
        texts(sql),
        vec![
            "create table t (a int)",
            "insert into t values (1)",
            "select * from t"
        ]
    );
}

#[test]
fn test_offsets_are_increasing() {
    let sql = "select 1;\n\n-- x\nselect 2;\nselect 3";
    let spans = spans(sql);
    for pair in spans.windows(2) {
        assert!(pair[0].next <= pair[1].region_start);
        assert!(pair[0].end < pair[1].start);
    }
}

#[test]
fn test_multiline_statement_keeps_internal_whitespace() {
    let sql = "create schema sample_schema\ncomment = 'Sample Comment';";
    assert_eq!(
        texts(sql),
        vec!["create schema sample_schema\ncomment = 'Sample Comment'"]
    );
}

#[test]
fn test_trailing_comment_not_part_of_text() {
    let sql = "select 1 -- trailing note\n;";
    assert_eq!(texts(sql), vec!["select 1"]);
}

#[test]
fn test_cte_with_parentheses() {
    let sql = "with a as (\n  select 1 as x\n)\nselect * from a;\nselect 2;";
    assert_eq!(texts(sql).len(), 2);
}

// ============================================================================
// Literal and comment immunity
// ============================================================================

#[test]
fn test_semicolon_in_single_quoted_string() {
    assert_eq!(texts("set x = 'a;b';"), vec!["set x = 'a;b'"]);
}

#[test]
fn test_semicolon_in_block_comment() {
    assert_eq!(
        texts("select /* ; ; */ 1;select 2;"),
        vec!["select /* ; ; */ 1", "select 2"]
    );
}

#[test]
fn test_sql_like_text_in_comments() {
    let sql = "/* drop table x; select 1; */\n-- delete from y;\nselect 3;";
    assert_eq!(texts(sql), vec!["select 3"]);
}

#[test]
fn test_dollar_quotes_disabled() {
    let options = LexerConfig {
        dollar_quotes: false,
        ..LexerConfig::default()
    };
    let sql = "select $$a;b$$;";
    let count = split_statements(sql, options).count();
    assert_eq!(count, 2);
}

// ============================================================================
// Discarded and final statements
// ============================================================================

#[test]
fn test_header_and_banner_comments_discarded() {
    let sql = "-- noinspection SqlResolveForFile\n/*----------*/\n;\nselect 1;";
    assert_eq!(texts(sql), vec!["select 1"]);
}

#[test]
fn test_final_statement_without_terminator() {
    let sql = "select 1;\ndrop schema if exists s";
    let spans = spans(sql);
    assert_eq!(spans.len(), 2);
    assert!(!spans[1].terminated);
    assert_eq!(spans[1].text(sql), "drop schema if exists s");
}

#[test]
fn test_empty_and_comment_only_input() {
    assert!(texts("").is_empty());
    assert!(texts("-- nothing here\n/* at all */").is_empty());
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_unterminated_string_reports_start() {
    let sql = "select 1;\nselect 'oops;";
    let err = split_statements(sql, LexerConfig::default())
        .collect::<Result<Vec<_>, _>>()
        .unwrap_err();
    match err {
        ScriptError::UnterminatedLiteral {
            literal,
            offset,
            line,
            snippet,
        } => {
            assert_eq!(literal, LiteralKind::SingleQuoted);
            assert_eq!(offset, 17);
            assert_eq!(line, 2);
            assert_eq!(snippet, "'oops;");
        }
        other => panic!("Expected UnterminatedLiteral, got {:?}", other),
    }
}

#[test]
fn test_unterminated_quoted_identifier() {
    let err = split_statements("select \"col", LexerConfig::default())
        .find_map(Result::err)
        .unwrap();
    assert!(matches!(
        err,
        ScriptError::UnterminatedLiteral {
            literal: LiteralKind::DoubleQuoted,
            ..
        }
    ));
}

#[test]
fn test_statements_before_error_are_yielded() {
    let mut splitter = split_statements("select 1;\n/* open", LexerConfig::default());
    assert!(matches!(splitter.next(), Some(Ok(_))));
    assert!(matches!(splitter.next(), Some(Err(_))));
    assert!(splitter.next().is_none());
}
