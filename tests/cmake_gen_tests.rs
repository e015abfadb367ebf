//! Unit tests for CMake script generation.

use anyhow::{Context, Result, ensure};
use rstest::rstest;
use tsugite::cmake_gen::generate;
use tsugite::ir::{BuildGraph, GenStep, SourceFile, Stmt, TargetDecl, TargetForm};
use tsugite::manifest;
use tsugite::registry::FileContext;

#[rstest]
fn renders_a_header_only_library() {
    let decl = TargetDecl::new("util".to_owned(), TargetForm::HeaderOnly);
    let expected = concat!(
        "\n",
        "add_library(util INTERFACE)\n",
        "target_include_directories(util INTERFACE\n",
        "    $<BUILD_INTERFACE:${CMAKE_CURRENT_SOURCE_DIR}/..>\n",
        "    $<BUILD_INTERFACE:${CMAKE_CURRENT_BINARY_DIR}>\n",
        ")\n",
        "if(NOT PICOPB_ENABLE_CODEGEN)\n",
        "  target_include_directories(util INTERFACE\n",
        "      $<BUILD_INTERFACE:${CMAKE_CURRENT_SOURCE_DIR}/../cmake>\n",
        "  )\n",
        "endif()\n",
    );
    assert_eq!(decl.to_string(), expected);
}

#[rstest]
fn renders_a_compiled_library_with_link_deps() {
    let mut decl = TargetDecl::new("core".to_owned(), TargetForm::Compiled);
    decl.sources = vec!["../core.c".to_owned()];
    decl.link_deps = vec!["util".to_owned(), "utf8_range".to_owned()];
    let expected = concat!(
        "\n",
        "add_library(core\n",
        "    ../core.c\n",
        ")\n",
        "target_include_directories(core PUBLIC\n",
        "    $<BUILD_INTERFACE:${CMAKE_CURRENT_SOURCE_DIR}/..>\n",
        "    $<BUILD_INTERFACE:${CMAKE_CURRENT_BINARY_DIR}>\n",
        ")\n",
        "if(NOT PICOPB_ENABLE_CODEGEN)\n",
        "  target_include_directories(core PUBLIC\n",
        "      $<BUILD_INTERFACE:${CMAKE_CURRENT_SOURCE_DIR}/../cmake>\n",
        "  )\n",
        "endif()\n",
        "target_link_libraries(core PUBLIC\n",
        "  util\n",
        "  utf8_range)\n",
    );
    assert_eq!(decl.to_string(), expected);
}

#[rstest]
fn renders_a_generation_step() {
    let step = GenStep {
        outputs: vec!["out/a.picopb.h".to_owned(), "out/a.picopb.c".to_owned()],
        inputs: vec!["${PICOPB_HOST_INCLUDE_DIR}/a.proto".to_owned()],
        tool_deps: vec!["protoc-gen-picopb_stage0".to_owned()],
        plugins: vec![(
            "picopb".to_owned(),
            "protoc-gen-picopb_stage0".to_owned(),
        )],
        out_dirs: vec![("picopb".to_owned(), "out".to_owned())],
    };
    let expected = concat!(
        "\n",
        "add_custom_command(\n",
        "  OUTPUT\n",
        "    out/a.picopb.h\n",
        "    out/a.picopb.c\n",
        "  DEPENDS\n",
        "    ${PICOPB_HOST_INCLUDE_DIR}/a.proto\n",
        "    protoc-gen-picopb_stage0\n",
        "  COMMAND\n",
        "    \"${PROTOC_PROGRAM}\"\n",
        "    \"-I${PICOPB_HOST_INCLUDE_DIR}\"\n",
        "    \"--plugin=protoc-gen-picopb=\\$<TARGET_FILE:protoc-gen-picopb_stage0>\"\n",
        "    \"--picopb_out=out\"\n",
        "    ${PICOPB_HOST_INCLUDE_DIR}/a.proto\n",
        ")\n",
    );
    assert_eq!(step.to_string(), expected);
}

#[rstest]
fn guard_wraps_inner_statements() {
    let decl = TargetDecl::new("gen".to_owned(), TargetForm::HeaderOnly);
    let guarded = Stmt::Guarded(vec![Stmt::Target(decl)]);
    let text = guarded.to_string();
    assert!(text.starts_with("\nif (PICOPB_ENABLE_CODEGEN)\n"));
    assert!(text.ends_with("\nendif()\n"));
    assert!(text.contains("add_library(gen INTERFACE)"));
}

/// Lower the canonical two-library scenario plus a workspace file.
fn scenario_graph() -> Result<BuildGraph> {
    let workspace = r#"
workspace(name = "picopb")
maybe(
    http_archive,
    name = "utf8_range",
    commit = "de0b4a8ff9b5d4c98108bdfe723291a33c52c54f",
)
"#;
    let build = r#"
cc_library(name = "util", hdrs = ["util.h"])
cc_library(name = "core", srcs = ["core.c"], deps = [":util"])
"#;
    let sources = vec![
        SourceFile {
            context: FileContext::Workspace,
            subdir: String::new(),
            invocations: manifest::from_str("WORKSPACE", workspace)?,
        },
        SourceFile {
            context: FileContext::Build,
            subdir: String::new(),
            invocations: manifest::from_str("BUILD", build)?,
        },
    ];
    BuildGraph::from_sources(&sources).map_err(Into::into)
}

#[rstest]
fn end_to_end_scenario_orders_and_exports_both_libraries() -> Result<()> {
    let graph = scenario_graph()?;
    let script = generate(&graph);

    let util_at = script
        .find("add_library(util INTERFACE)")
        .context("util declaration missing")?;
    let core_at = script
        .find("add_library(core\n")
        .context("core declaration missing")?;
    ensure!(
        util_at < core_at,
        "the interface library must precede the compiled one"
    );
    ensure!(
        script.contains("target_link_libraries(core PUBLIC\n  util)\n"),
        "core must link against util"
    );
    ensure!(
        script.contains("install(TARGETS\n  util core\n  EXPORT picopb-config\n)"),
        "both names must appear in the installable export list"
    );
    Ok(())
}

#[rstest]
fn prelude_and_dependency_pin_are_spliced_in() -> Result<()> {
    let graph = scenario_graph()?;
    let script = generate(&graph);
    ensure!(script.contains("project(picopb)\nset(CMAKE_C_STANDARD 99)"));
    ensure!(script.contains("GIT_TAG \"de0b4a8ff9b5d4c98108bdfe723291a33c52c54f\""));
    ensure!(
        script.starts_with("# This file was generated from BUILD files by tsugite"),
        "missing generated-file banner"
    );
    Ok(())
}

#[rstest]
fn generation_is_deterministic() -> Result<()> {
    let graph = scenario_graph()?;
    let first = generate(&graph);
    let second = generate(&graph);
    ensure!(first == second, "two renders of one graph must be identical");

    let again = generate(&scenario_graph()?);
    ensure!(
        first == again,
        "re-parsing the same input must yield byte-identical output"
    );
    Ok(())
}

#[rstest]
fn missing_pin_renders_an_empty_tag() {
    let graph = BuildGraph::default();
    let script = generate(&graph);
    assert!(script.contains("GIT_TAG \"\""));
}
