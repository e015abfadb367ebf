//! Build-graph accumulator and statement types.

use thiserror::Error;

/// How a target is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetForm {
    /// A library with at least one compiled translation unit.
    Compiled,
    /// An interface library exposing only headers and transitive deps.
    HeaderOnly,
    /// An executable.
    Executable,
}

impl TargetForm {
    /// The usage-requirement keyword this form propagates with.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Compiled => "PUBLIC",
            Self::HeaderOnly => "INTERFACE",
            Self::Executable => "PRIVATE",
        }
    }
}

/// One target declaration in the output graph.
///
/// Every `link_deps` entry must name either a target declared earlier in
/// the same graph or an externally pre-existing third-party target; the
/// input data is trusted, so this is enforced by tests rather than at
/// runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDecl {
    /// Unique target name within the output graph.
    pub name: String,
    /// Build form; decides declaration syntax and link keyword.
    pub form: TargetForm,
    /// Source paths, already rewritten relative to the output directory.
    /// Empty for header-only targets.
    pub sources: Vec<String>,
    /// Include roots prepended ahead of the defaults, one directory per
    /// bootstrap stage output.
    pub include_before: Vec<String>,
    /// Link dependencies, in declaration order.
    pub link_deps: Vec<String>,
}

impl TargetDecl {
    /// A declaration with no sources, extra includes, or dependencies.
    #[must_use]
    pub const fn new(name: String, form: TargetForm) -> Self {
        Self {
            name,
            form,
            sources: Vec::new(),
            include_before: Vec::new(),
            link_deps: Vec::new(),
        }
    }
}

/// A custom generation step: one schema-compiler invocation producing
/// source files consumed by a later target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenStep {
    /// Files the step produces, in order.
    pub outputs: Vec<String>,
    /// Schema files consumed, addressed under the host include root.
    pub inputs: Vec<String>,
    /// Generator tool targets the step invokes; listed as build
    /// dependencies so the target system serialises the bootstrap chain.
    pub tool_deps: Vec<String>,
    /// Plugin bindings, as (plugin name, tool target) pairs.
    pub plugins: Vec<(String, String)>,
    /// Output flags, as (plugin name, output directory) pairs.
    pub out_dirs: Vec<(String, String)>,
}

/// An install rule for generated artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallFiles {
    /// Files to install, in order.
    pub files: Vec<String>,
    /// Destination path below the install prefix.
    pub destination: String,
}

/// One accumulated output statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// Declare a target.
    Target(TargetDecl),
    /// Create an output directory at configure time.
    MakeDirectory(String),
    /// Run a generation step.
    GenStep(GenStep),
    /// Install generated files.
    InstallFiles(InstallFiles),
    /// Statements only active when code-generation support is enabled.
    Guarded(Vec<Stmt>),
}

/// Process-wide state for one translation run.
///
/// Append-only and insertion-ordered: the output text must be byte-stable
/// across runs, so nothing here may depend on unordered iteration.
/// Created empty, filled by dispatch, consumed once by the renderer.
#[derive(Debug, Default)]
pub struct BuildGraph {
    /// Accumulated statements, in first-emission order.
    pub stmts: Vec<Stmt>,
    /// Prelude lines supplied by the workspace file.
    pub prelude: Vec<String>,
    /// Installable library targets, in emission order.
    pub export_targets: Vec<String>,
    /// Installable codegen-dependent targets, in emission order.
    pub export_codegen_targets: Vec<String>,
    /// Commit pin for the `utf8_range` dependency, consumed verbatim by the
    /// renderer.
    pub utf8_range_commit: Option<String>,
}

/// Errors raised while lowering rule invocations into the graph.
#[derive(Debug, Error)]
pub enum IrGenError {
    /// A rule that contributes to the graph is missing a required
    /// attribute.
    #[error("rule '{rule}' is missing required attribute '{attr}'")]
    MissingAttribute {
        /// The offending rule name.
        rule: String,
        /// The absent attribute.
        attr: String,
    },
}
