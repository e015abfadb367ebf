//! Unit tests for build-file parsing.

use anyhow::{Context, Result, ensure};
use rstest::rstest;
use tsugite::ast::{RuleInvocation, Value};
use tsugite::manifest;

/// Convenience wrapper around the library parser for tests.
fn parse(src: &str) -> Result<Vec<RuleInvocation>> {
    manifest::from_str("BUILD", src).map_err(Into::into)
}

#[rstest]
fn parses_minimal_rule_call() -> Result<()> {
    let src = r#"
cc_library(
    name = "picopb",
    srcs = ["decode.c", "encode.c"],
    hdrs = ["decode.h"],
)
"#;
    let rules = parse(src)?;
    ensure!(rules.len() == 1, "expected one invocation, got {}", rules.len());
    let rule = rules.first().context("first invocation")?;
    ensure!(rule.rule == "cc_library", "unexpected rule: {}", rule.rule);
    ensure!(rule.name() == Some("picopb"), "unexpected name: {:?}", rule.name());
    ensure!(
        rule.strings("srcs") == vec!["decode.c".to_owned(), "encode.c".to_owned()],
        "unexpected srcs: {:?}",
        rule.strings("srcs")
    );
    Ok(())
}

#[rstest]
fn preserves_file_order_and_attribute_order() -> Result<()> {
    let src = r#"
cc_library(name = "a")
cc_library(name = "b")
cc_binary(name = "c", srcs = ["c.c"], deps = [":a"])
"#;
    let rules = parse(src)?;
    let names: Vec<_> = rules.iter().filter_map(RuleInvocation::name).collect();
    ensure!(names == vec!["a", "b", "c"], "unexpected order: {names:?}");
    let last = rules.last().context("last invocation")?;
    let keys: Vec<_> = last.attrs.keys().cloned().collect();
    ensure!(
        keys == vec!["name".to_owned(), "srcs".to_owned(), "deps".to_owned()],
        "attribute order not preserved: {keys:?}"
    );
    Ok(())
}

#[rstest]
fn concatenates_lists_and_strings() -> Result<()> {
    let src = r#"
cc_library(
    name = "core" + "_impl",
    srcs = ["a.c"] + ["b.c"],
)
"#;
    let rules = parse(src)?;
    let rule = rules.first().context("first invocation")?;
    ensure!(rule.name() == Some("core_impl"), "unexpected name: {:?}", rule.name());
    ensure!(
        rule.strings("srcs") == vec!["a.c".to_owned(), "b.c".to_owned()],
        "unexpected srcs: {:?}",
        rule.strings("srcs")
    );
    Ok(())
}

#[rstest]
#[case::glob(r#"cc_library(name = "x", srcs = glob(["*.c"]))"#)]
#[case::select(
    r#"cc_library(name = "x", srcs = select({":fast": ["f.c"], "//conditions:default": []}))"#
)]
#[case::variable(r#"cc_library(name = "x", srcs = COPTS)"#)]
fn dropped_constructs_evaluate_empty(#[case] src: &str) -> Result<()> {
    let rules = parse(src)?;
    let rule = rules.first().context("first invocation")?;
    ensure!(
        rule.strings("srcs").is_empty(),
        "expected empty srcs, got {:?}",
        rule.strings("srcs")
    );
    Ok(())
}

#[rstest]
fn glob_concatenated_with_list_keeps_literals() -> Result<()> {
    let src = r#"cc_library(name = "x", srcs = glob(["*.c"]) + ["keep.c"])"#;
    let rules = parse(src)?;
    let rule = rules.first().context("first invocation")?;
    ensure!(
        rule.strings("srcs") == vec!["keep.c".to_owned()],
        "unexpected srcs: {:?}",
        rule.strings("srcs")
    );
    Ok(())
}

#[rstest]
fn parses_booleans_and_positional_arguments() -> Result<()> {
    let src = r#"
maybe(
    http_archive,
    name = "utf8_range",
    testonly = True,
)
"#;
    let rules = parse(src)?;
    let rule = rules.first().context("first invocation")?;
    ensure!(rule.args.len() == 1, "expected one positional argument");
    ensure!(rule.flag("testonly"), "testonly should be truthy");
    ensure!(
        rule.attrs.get("testonly") == Some(&Value::Bool(true)),
        "testonly should parse as a boolean"
    );
    Ok(())
}

#[rstest]
fn discards_module_level_assignments() -> Result<()> {
    let src = r#"
COPTS = ["-Wall"]
cc_library(name = "x")
"#;
    let rules = parse(src)?;
    ensure!(rules.len() == 1, "assignment should not become an invocation");
    Ok(())
}

#[rstest]
fn accepts_single_quoted_strings_and_comments() -> Result<()> {
    let src = "cc_library(name = 'x')  # trailing comment\n";
    let rules = parse(src)?;
    let rule = rules.first().context("first invocation")?;
    ensure!(rule.name() == Some("x"), "unexpected name: {:?}", rule.name());
    Ok(())
}

#[rstest]
#[case::unclosed_call("cc_library(name = \"x\"")]
#[case::stray_token("cc_library(name = \"x\") )")]
#[case::missing_value("cc_library(name = )")]
#[case::bad_character("cc_library(name = \"x\") ;")]
fn rejects_malformed_syntax(#[case] src: &str) {
    assert!(parse(src).is_err(), "expected parse failure for {src:?}");
}

#[test]
fn empty_file_parses_to_no_invocations() -> Result<()> {
    let rules = parse("")?;
    ensure!(rules.is_empty(), "empty file should yield no invocations");
    Ok(())
}
