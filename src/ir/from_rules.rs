//! Rule dispatch and target emission.
//!
//! Lowers parsed [`RuleInvocation`]s into [`BuildGraph`] statements.
//! Invocations are processed strictly in file order, and files in their
//! declared order, so a later target may link against any earlier one. The
//! input data is trusted: acyclicity is enforced by tests, not here.

use tracing::{debug, warn};

use crate::ast::RuleInvocation;
use crate::depmap::map_dependency;
use crate::registry::{self, FileContext, RuleKind};

use super::graph::{BuildGraph, IrGenError, Stmt, TargetDecl, TargetForm};

/// Output target names that must never be declared; they collide with
/// artifacts the packaging layer produces by other means.
pub(super) const BLOCKED_TARGETS: &[&str] = &[
    "libpicopb.so",
    "libpicopbc.so",
    "picopbdev",
    "protoc-gen-picopbdev",
];

/// Checked-in fallback artifacts that live under the pre-generated
/// directory rather than the normal source tree, so the project builds even
/// without code-generation support.
const PREGENERATED_FILES: &[&str] = &["CMakeLists.txt", "descriptor.picopb.h", "descriptor.picopb.c"];

/// One parsed input file together with its dispatch context.
#[derive(Debug)]
pub struct SourceFile {
    /// Which rule vocabulary applies.
    pub context: FileContext,
    /// Source-tree prefix for paths in this file, empty or `/`-terminated.
    pub subdir: String,
    /// The file's rule calls, in file order.
    pub invocations: Vec<RuleInvocation>,
}

impl BuildGraph {
    /// Lower every invocation in `files` into a build graph.
    ///
    /// # Errors
    ///
    /// Returns [`IrGenError`] when a graph-contributing rule lacks a
    /// required attribute. Unknown rule kinds are logged and skipped.
    pub fn from_sources(files: &[SourceFile]) -> Result<Self, IrGenError> {
        let mut graph = Self::default();
        for file in files {
            let mut dispatcher = Dispatcher {
                graph: &mut graph,
                subdir: &file.subdir,
            };
            for invocation in &file.invocations {
                dispatcher.dispatch(file.context, invocation)?;
            }
        }
        Ok(graph)
    }
}

/// Whether `file` names a compiled translation unit.
pub(super) fn is_source_file(file: &str) -> bool {
    file.ends_with(".c") || file.ends_with(".cc")
}

fn basename(file: &str) -> &str {
    file.rsplit_once('/').map_or(file, |(_, base)| base)
}

/// The `name` attribute, or the error every graph-contributing rule raises
/// without one.
pub(super) fn require_name(invocation: &RuleInvocation) -> Result<&str, IrGenError> {
    invocation.name().ok_or_else(|| IrGenError::MissingAttribute {
        rule: invocation.rule.clone(),
        attr: "name".to_owned(),
    })
}

/// Per-file dispatch state: the accumulator plus the file's source prefix.
pub(super) struct Dispatcher<'g> {
    /// The run's accumulator.
    pub(super) graph: &'g mut BuildGraph,
    /// Source-tree prefix of the file being dispatched.
    pub(super) subdir: &'g str,
}

impl Dispatcher<'_> {
    /// Route one invocation to its handler.
    fn dispatch(
        &mut self,
        context: FileContext,
        invocation: &RuleInvocation,
    ) -> Result<(), IrGenError> {
        let Some(kind) = registry::kind_of(context, &invocation.rule) else {
            warn!(rule = %invocation.rule, "unknown rule kind; skipping invocation");
            return Ok(());
        };
        match kind {
            RuleKind::Library => self.library(invocation),
            RuleKind::Binary => self.binary(invocation),
            RuleKind::Test => {
                // Native test integration is out of scope for the
                // translated output.
                debug!(rule = %invocation.rule, "test rule contributes nothing");
                Ok(())
            }
            RuleKind::BootstrapLibrary => self.staged_library(invocation),
            RuleKind::BootstrapBinary => self.staged_binary(invocation),
            RuleKind::CodegenBundle => self.codegen_bundle(invocation),
            RuleKind::Workspace => self.workspace(invocation),
            RuleKind::DependencyPin => {
                self.dependency_pin(invocation);
                Ok(())
            }
            RuleKind::Ignored => {
                debug!(rule = %invocation.rule, "rule has no build-graph effect");
                Ok(())
            }
        }
    }

    /// `cc_library`: one compiled or header-only target.
    fn library(&mut self, invocation: &RuleInvocation) -> Result<(), IrGenError> {
        let name = require_name(invocation)?;
        if name.ends_with("amalgamation") {
            debug!(%name, "amalgamation library is not translated");
            return Ok(());
        }
        if BLOCKED_TARGETS.contains(&name) {
            debug!(%name, "target is deny-listed");
            return Ok(());
        }
        if invocation.flag("testonly") {
            debug!(%name, "test-only library is not translated");
            return Ok(());
        }

        let mut files = invocation.strings("srcs");
        files.extend(invocation.strings("hdrs"));
        let form = if files.iter().any(|f| is_source_file(f)) {
            TargetForm::Compiled
        } else {
            TargetForm::HeaderOnly
        };

        let mut target = TargetDecl::new(name.to_owned(), form);
        if form == TargetForm::Compiled {
            target.sources = files.iter().map(|f| self.source_path(f)).collect();
        }
        target.link_deps = mapped_deps(invocation, "deps");
        self.graph.stmts.push(Stmt::Target(target));
        self.graph.export_targets.push(name.to_owned());
        Ok(())
    }

    /// `cc_binary`: an executable, only built when codegen is enabled.
    fn binary(&mut self, invocation: &RuleInvocation) -> Result<(), IrGenError> {
        let name = require_name(invocation)?;
        if BLOCKED_TARGETS.contains(&name) {
            debug!(%name, "target is deny-listed");
            return Ok(());
        }

        let mut files = invocation.strings("srcs");
        files.extend(invocation.strings("hdrs"));
        let mut target = TargetDecl::new(name.to_owned(), TargetForm::Executable);
        target.sources = files
            .iter()
            .map(|f| format!("../{}{f}", self.subdir))
            .collect();
        target.link_deps = mapped_deps(invocation, "deps");
        self.graph.stmts.push(Stmt::Guarded(vec![Stmt::Target(target)]));
        self.graph.export_codegen_targets.push(name.to_owned());
        Ok(())
    }

    /// `workspace`: contributes the project prelude.
    fn workspace(&mut self, invocation: &RuleInvocation) -> Result<(), IrGenError> {
        let name = require_name(invocation)?;
        self.graph.prelude.push(format!("project({name})"));
        self.graph.prelude.push("set(CMAKE_C_STANDARD 99)".to_owned());
        Ok(())
    }

    /// `maybe`: captures the `utf8_range` commit pin; all other
    /// repositories are handled by the renderer's fixed preamble.
    fn dependency_pin(&mut self, invocation: &RuleInvocation) {
        if invocation.name() != Some("utf8_range") {
            return;
        }
        if let Some(commit) = invocation.string("commit") {
            self.graph.utf8_range_commit = Some(commit.to_owned());
        }
    }

    /// Rewrite a declared file path relative to the output directory,
    /// redirecting checked-in fallback artifacts to the pre-generated tree.
    pub(super) fn source_path(&self, file: &str) -> String {
        if PREGENERATED_FILES.contains(&basename(file)) {
            format!("../cmake/{}{file}", self.subdir)
        } else {
            format!("../{}{file}", self.subdir)
        }
    }
}

/// The invocation's `key` dependency list, mapped into output target names.
pub(super) fn mapped_deps(invocation: &RuleInvocation, key: &str) -> Vec<String> {
    invocation
        .strings(key)
        .iter()
        .map(|dep| map_dependency(dep))
        .collect()
}
