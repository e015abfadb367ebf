//! CLI execution logic.
//!
//! This module keeps the entry point minimal: it reads the fixed set of
//! input
//! files, lowers them into the build graph, renders the CMake script, and
//! writes it to the requested path. The input set and its order are fixed
//! by the source project's layout; a missing file aborts the whole run,
//! since a half-translated build graph is unsafe to consume.

use anyhow::{Context, Result};
use camino::Utf8Path;
use std::fs;
use tracing::info;

use crate::cli::Cli;
use crate::cmake_gen;
use crate::ir::{BuildGraph, SourceFile};
use crate::manifest;
use crate::registry::FileContext;

/// Workspace-context input files, in processing order.
const WORKSPACE_FILES: &[&str] = &["bazel/workspace_deps.bzl", "WORKSPACE"];

/// Build-context input files with their source-tree prefixes, in
/// processing order: root build file first, then the named subdirectory
/// build files, so later rules may reference any earlier target.
const BUILD_FILES: &[(&str, &str)] = &[
    ("BUILD", ""),
    ("picopb/util/BUILD", "picopb/util/"),
    ("picopbc/BUILD", "picopbc/"),
];

/// Execute the parsed [`Cli`]: translate the tree rooted at the current
/// directory and write the result.
///
/// # Errors
///
/// Returns an error if any input file is missing or malformed, or if the
/// output cannot be written.
pub fn run(cli: &Cli) -> Result<()> {
    let script = translate(Utf8Path::new("."))?;
    fs::write(&cli.output, script)
        .with_context(|| format!("failed to write {}", cli.output))?;
    info!("generated CMake script at {}", cli.output);
    Ok(())
}

/// Translate the source tree rooted at `root` into the CMake script text.
///
/// No output is produced unless every input file parses; rendering runs
/// only after all input has been fully processed.
///
/// # Errors
///
/// Returns an error if an input file cannot be read, fails to parse, or a
/// rule is missing a required attribute.
pub fn translate(root: &Utf8Path) -> Result<String> {
    let mut sources = Vec::new();
    for path in WORKSPACE_FILES {
        sources.push(load(root, path, FileContext::Workspace, "")?);
    }
    for (path, subdir) in BUILD_FILES {
        sources.push(load(root, path, FileContext::Build, subdir)?);
    }
    let graph = BuildGraph::from_sources(&sources).context("lowering rules to the build graph")?;
    Ok(cmake_gen::generate(&graph))
}

fn load(
    root: &Utf8Path,
    path: &str,
    context: FileContext,
    subdir: &str,
) -> Result<SourceFile> {
    let invocations = manifest::from_path(root.join(path))
        .with_context(|| format!("loading build file {path}"))?;
    Ok(SourceFile {
        context,
        subdir: subdir.to_owned(),
        invocations,
    })
}
