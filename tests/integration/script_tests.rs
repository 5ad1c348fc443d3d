//! Script-level tests over the fixture scripts

use pretty_assertions::assert_eq;
use rust_sqlscript::parser::AttributeValue;
use rust_sqlscript::{
    FilterField, QaKind, Script, ScriptConfig, ScriptFilter, ScriptItem, StatementId, Tag,
};

use crate::common::{fixture_path, parse_fixture, parse_fixture_with, tags};

fn qa_config() -> ScriptConfig {
    ScriptConfig::from_toml(
        r#"
        [attributes]
        list = ["tags"]
        float = ["tolerance"]
        "#,
    )
    .unwrap()
}

// ============================================================================
// Fixture parsing
// ============================================================================

#[test]
fn test_generic_script_tags() {
    let script = parse_fixture("generic_script.sql");

    assert_eq!(
        tags(&script),
        vec![
            "create-schema~sample_schema",
            "create-transient table~snowmobile_testing.sample_table",
            "insert-into~snowmobile_testing.sample_table",
            "select-data~statement #4",
            "select-data~statement #5",
            "set-param~statement #6",
            "unset-param~statement #7",
            "drop-table~snowmobile_testing.sample_table",
            "drop-schema~sample_schema",
        ]
    );
    assert_eq!(script.name(), "generic_script.sql");
    assert_eq!(script.path(), Some(fixture_path("generic_script.sql").as_path()));
}

#[test]
fn test_generic_script_texts() {
    let script = parse_fixture("generic_script.sql");
    let statements = script.statements();

    assert_eq!(
        statements[0].text,
        "create schema sample_schema\ncomment = 'Sample Comment'"
    );
    assert_eq!(statements[0].line, 4);
    assert_eq!(
        statements[2].text,
        "insert into snowmobile_testing.sample_table (col1, col2)\nvalues (2, 'it''s')"
    );
    assert_eq!(statements[8].text, "drop schema if exists sample_schema");
    assert_eq!(
        statements[1].first_line(),
        "create or replace transient table snowmobile_testing.sample_table as"
    );
    assert_eq!(script.lines(), 12);
}

#[test]
fn test_qa_script() {
    let script = parse_fixture_with("qa_script.sql", &qa_config());
    let statements = script.statements();

    assert_eq!(script.depth(), 4);
    assert_eq!(
        statements[1].tag,
        Tag::new("qa-empty", "verify dummy_dim is distinct on id")
    );
    assert_eq!(
        statements[2].tag,
        Tag::new("qa-empty", "verify dummy_dim is distinct on id (2)")
    );
    assert_eq!(statements[1].qa_kind(), Some(QaKind::Empty));
    assert_eq!(statements[3].qa_kind(), Some(QaKind::Diff));
    assert_eq!(statements[0].qa_kind(), None);

    let attributes = &statements[1].attributes;
    assert_eq!(
        attributes.get("tags"),
        Some(&AttributeValue::List(vec![
            "nightly".to_string(),
            "smoke".to_string()
        ]))
    );
    assert_eq!(attributes.get("tolerance"), Some(&AttributeValue::Float(0.0)));
    assert_eq!(
        attributes.get("description"),
        Some(&AttributeValue::Text("no duplicate ids".to_string()))
    );

    let duplicates = script.duplicates();
    assert_eq!(duplicates.len(), 1);
}

#[test]
fn test_markers_script() {
    let script = parse_fixture("markers_script.sql");

    let names: Vec<(&str, usize)> = script
        .markers()
        .iter()
        .map(|m| (m.name.as_str(), m.position))
        .collect();
    assert_eq!(names, vec![("intro", 0), ("checks", 1), ("appendix", 2)]);
    assert_eq!(
        script.markers()[0].attribute("description"),
        Some(&AttributeValue::Text("setup statements".to_string()))
    );
    assert_eq!(
        tags(&script),
        vec!["create-table~t1", "qa-empty~t1 has rows"]
    );

    let order: Vec<String> = script
        .contents()
        .into_iter()
        .map(|item| match item {
            ScriptItem::Marker(m) => format!("marker:{}", m.name),
            ScriptItem::Statement(s) => format!("statement:{}", s.index),
        })
        .collect();
    assert_eq!(
        order,
        vec![
            "marker:intro",
            "statement:1",
            "marker:checks",
            "statement:2",
            "marker:appendix"
        ]
    );
}

#[test]
fn test_marker_defaults_from_config() {
    let config = ScriptConfig::from_toml(
        r#"
        [markers.intro]
        description = "configured description"
        owner = "data team"

        [markers.checks]
        severity = "high"
        "#,
    )
    .unwrap();
    let script = parse_fixture_with("markers_script.sql", &config);
    let markers = script.markers();

    assert_eq!(
        markers[0].attribute("description"),
        Some(&AttributeValue::Text("setup statements".to_string()))
    );
    assert_eq!(
        markers[0].attribute("owner"),
        Some(&AttributeValue::Text("data team".to_string()))
    );
    assert_eq!(
        markers[1].attribute("severity"),
        Some(&AttributeValue::Text("high".to_string()))
    );
    assert_eq!(markers[2].attribute("severity"), None);
}

// ============================================================================
// Lookup and filtering
// ============================================================================

#[test]
fn test_lookup_by_tag_and_index() {
    let script = parse_fixture("generic_script.sql");

    let by_tag = script
        .statement(&StatementId::parse("drop-schema~sample_schema"))
        .unwrap();
    let by_index = script.statement(&StatementId::parse("-1")).unwrap();
    assert_eq!(by_tag.index, 9);
    assert_eq!(by_tag, by_index);
}

#[test]
fn test_filter_by_kind() {
    let script = parse_fixture_with("qa_script.sql", &qa_config());

    let filter = ScriptFilter::new()
        .include(FilterField::Kind, "^qa-")
        .unwrap()
        .exclude(FilterField::Kind, "diff")
        .unwrap();
    let indexes: Vec<usize> = script.filter(&filter).iter().map(|s| s.index).collect();
    assert_eq!(indexes, vec![2, 3]);
}

// ============================================================================
// Records and reconstruction
// ============================================================================

#[test]
fn test_records_serialize() {
    let script = Script::from_source(
        "records.sql",
        "/*-drop-table~t-*/\ndrop table t;\nselect 1;",
        &ScriptConfig::default(),
    )
    .unwrap();

    let json = serde_json::to_value(script.records()).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            {"index": 1, "tag": {"kind": "drop-table", "name": "t"}, "text": "drop table t"},
            {"index": 2, "tag": {"kind": "select-data", "name": "statement #2"}, "text": "select 1"}
        ])
    );
}

#[test]
fn test_render_reparses_to_identical_records() {
    for (name, config) in [
        ("generic_script.sql", ScriptConfig::default()),
        ("qa_script.sql", qa_config()),
        ("markers_script.sql", ScriptConfig::default()),
    ] {
        let script = parse_fixture_with(name, &config);
        let rendered = script.render();
        let reparsed = Script::from_source(name, &rendered, &config)
            .unwrap_or_else(|e| panic!("Rendered {} failed to parse: {}", name, e));

        assert_eq!(script.records(), reparsed.records(), "records of {}", name);
        assert_eq!(script.markers().len(), reparsed.markers().len());
        assert_eq!(reparsed.render(), rendered);
    }
}

#[test]
fn test_concatenated_texts_reparse() {
    let script = parse_fixture("generic_script.sql");
    let joined: String = script
        .statements()
        .iter()
        .map(|s| format!("{};\n", s.text))
        .collect();
    let reparsed = Script::from_source("joined.sql", &joined, &ScriptConfig::default()).unwrap();

    let texts = |s: &Script| s.statements().iter().map(|st| st.text.clone()).collect::<Vec<_>>();
    assert_eq!(texts(&script), texts(&reparsed));
}
