//! Build-file loading helpers.
//!
//! The source project describes its build graph in Bazel-style `BUILD` and
//! `WORKSPACE` files. This module reads one file at a time and parses it
//! into an ordered sequence of [`RuleInvocation`]s; interpretation of the
//! rules is left to the dispatch layer. Files are read fully before parsing
//! and a missing or unreadable file is always fatal.

use anyhow::{Context, Result};
use camino::Utf8Path;
use std::fs;

use crate::ast::RuleInvocation;

mod diagnostics;
mod lexer;
mod parser;

pub use diagnostics::ParseError;
pub use lexer::Token;

/// Parse a build-file string into its rule invocations.
///
/// `name` is the display name used in diagnostics.
///
/// # Errors
///
/// Returns a [`ParseError`] if the text is not well-formed rule-call
/// syntax.
pub fn from_str(name: &str, src: &str) -> Result<Vec<RuleInvocation>, ParseError> {
    parser::parse(name, src)
}

/// Load and parse the build file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or fails to parse.
pub fn from_path(path: impl AsRef<Utf8Path>) -> Result<Vec<RuleInvocation>> {
    let path_ref = path.as_ref();
    let data = fs::read_to_string(path_ref)
        .with_context(|| format!("failed to read {path_ref}"))?;
    from_str(path_ref.as_str(), &data).map_err(Into::into)
}
