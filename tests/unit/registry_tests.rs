//! Tag uniqueness tests

use std::collections::HashSet;

use pretty_assertions::assert_eq;
use rust_sqlscript::parser::TagRegistry;
use rust_sqlscript::{Script, ScriptConfig, Tag};

fn parse(sql: &str) -> Script {
    Script::from_source("registry.sql", sql, &ScriptConfig::default()).unwrap()
}

#[test]
fn test_qa_empty_duplicates_disambiguated() {
    let sql = r#"
/*-qa-empty~verify sample_table is distinct on dummy_dim-*/
select dummy_dim, count(*) from sample_table group by 1 having count(*) > 1;

/*-qa-empty~verify sample_table is distinct on dummy_dim-*/
select dummy_dim, count(*) from sample_table group by 1 having count(*) > 1;
"#;
    let script = parse(sql);
    let statements = script.statements();

    assert_eq!(statements.len(), 2);
    assert_eq!(
        statements[0].tag,
        Tag::new("qa-empty", "verify sample_table is distinct on dummy_dim")
    );
    assert_eq!(
        statements[1].tag,
        Tag::new("qa-empty", "verify sample_table is distinct on dummy_dim (2)")
    );
}

#[test]
fn test_tags_unique_across_mixed_script() {
    let sql = "
create table t (a int);
create table t (a int);
/*-create-table~t-*/ create table t (a int);
/*-create-table~t (2)-*/ create table t (a int);
select 1;
/*-select-data~statement #5-*/ select 1;
/*-k-*/ select 1;
/*-k-*/ select 1;
";
    let script = parse(sql);
    let tags: HashSet<&Tag> = script.statements().iter().map(|s| &s.tag).collect();
    assert_eq!(tags.len(), script.depth());
}

#[test]
fn test_indexes_strictly_increasing_from_one() {
    let script = parse("select 1;\n;\n-- c\nselect 2;\n/*-x-*/ select 3;\nselect 4");
    let indexes: Vec<usize> = script.statements().iter().map(|s| s.index).collect();
    assert_eq!(indexes, vec![1, 2, 3, 4]);
}

#[test]
fn test_registries_are_independent() {
    let mut first = TagRegistry::new();
    let mut second = TagRegistry::new();
    let tag = Tag::new("qa-empty", "check");

    assert_eq!(first.register(tag.clone()), tag);
    assert_eq!(first.register(tag.clone()), tag.with_ordinal(2));
    assert_eq!(second.register(tag.clone()), tag);
    assert!(!second.is_empty());
}

#[test]
fn test_many_duplicates() {
    let sql = "/*-k~n-*/ select 1;\n".repeat(12);
    let script = parse(&sql);
    let last = script.statements().last().unwrap();
    assert_eq!(last.tag, Tag::new("k", "n (12)"));
    assert_eq!(script.duplicates().get(&Tag::new("k", "n")), Some(&12));
}
