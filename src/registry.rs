//! The catalogue of known rule kinds.
//!
//! Each build-language rule name maps to one [`RuleKind`]; the dispatch
//! layer binds a handler to each kind. The enumeration is closed on
//! purpose: this tool supports exactly the rule vocabulary of its one
//! source project. Names outside the tables are reported by the caller and
//! skipped, matching the source system's tolerance of unrecognised
//! declarative constructs.

/// Which file class an invocation was read from.
///
/// Workspace files and build files have disjoint rule vocabularies, so the
/// lookup is context-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileContext {
    /// `WORKSPACE` and the workspace dependency macros file.
    Workspace,
    /// A `BUILD` file.
    Build,
}

/// The kind of a recognised rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// `cc_library`: a compiled or header-only library target.
    Library,
    /// `cc_binary`: an executable target, only built with codegen enabled.
    Binary,
    /// Test rules; deliberately contribute nothing to the graph.
    Test,
    /// `bootstrap_cc_library`: a library declared once per bootstrap stage.
    BootstrapLibrary,
    /// `bootstrap_cc_binary`: an executable declared once per bootstrap
    /// stage.
    BootstrapBinary,
    /// `bootstrap_picopb_proto_library`: the three-stage self-hosting
    /// code-generation bundle.
    CodegenBundle,
    /// `workspace`: supplies the project name for the output prelude.
    Workspace,
    /// `maybe`: an external-repository pin; only `utf8_range` is consumed.
    DependencyPin,
    /// Known rules with no build-graph effect in the target system.
    Ignored,
}

/// Build-file rules with no translation target: packaging metadata, file
/// globs, config flags, and the python/lua/proto helper rules.
const IGNORED_BUILD_RULES: &[&str] = &[
    "load",
    "licenses",
    "exports_files",
    "filegroup",
    "package_group",
    "config_setting",
    "bool_flag",
    "genrule",
    "proto_library",
    "cc_proto_library",
    "py_library",
    "py_binary",
    "pkg_files",
    "make_shell_script",
    "lua_proto_library",
    "picopb_amalgamation",
    "picopb_proto_library",
    "picopb_proto_library_copts",
    "picopb_proto_reflection_library",
    "picopb_proto_srcs",
    "picopb_fasttable_enabled",
];

/// Workspace rules with no translation target: repository fetches and
/// toolchain registration handled entirely by the target system's preamble.
const IGNORED_WORKSPACE_RULES: &[&str] = &[
    "load",
    "http_archive",
    "git_repository",
    "new_git_repository",
    "bazel_version_repository",
    "protobuf_deps",
    "utf8_range_deps",
    "googletest_deps",
    "rules_fuzzing_dependencies",
    "rules_fuzzing_init",
    "rules_pkg_dependencies",
    "pip_parse",
    "install_deps",
    "fuzzing_py_install_deps",
    "system_python",
    "register_system_python",
    "register_toolchains",
    "python_source_archive",
    "python_nuget_package",
];

/// Look up the kind bound to `rule` within `context`.
///
/// Returns `None` for names outside the catalogue; the caller records the
/// omission and skips the invocation.
#[must_use]
pub fn kind_of(context: FileContext, rule: &str) -> Option<RuleKind> {
    match context {
        FileContext::Build => match rule {
            "cc_library" => Some(RuleKind::Library),
            "cc_binary" => Some(RuleKind::Binary),
            "cc_test" | "cc_fuzz_test" | "sh_test" | "staleness_test" => Some(RuleKind::Test),
            "bootstrap_cc_library" => Some(RuleKind::BootstrapLibrary),
            "bootstrap_cc_binary" => Some(RuleKind::BootstrapBinary),
            "bootstrap_picopb_proto_library" => Some(RuleKind::CodegenBundle),
            name if IGNORED_BUILD_RULES.contains(&name) => Some(RuleKind::Ignored),
            _ => None,
        },
        FileContext::Workspace => match rule {
            "workspace" => Some(RuleKind::Workspace),
            "maybe" => Some(RuleKind::DependencyPin),
            name if IGNORED_WORKSPACE_RULES.contains(&name) => Some(RuleKind::Ignored),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_context_sensitive() {
        assert_eq!(
            kind_of(FileContext::Build, "cc_library"),
            Some(RuleKind::Library)
        );
        assert_eq!(kind_of(FileContext::Workspace, "cc_library"), None);
        assert_eq!(
            kind_of(FileContext::Workspace, "maybe"),
            Some(RuleKind::DependencyPin)
        );
        assert_eq!(kind_of(FileContext::Build, "maybe"), None);
    }

    #[test]
    fn unknown_rules_are_not_invented() {
        assert_eq!(kind_of(FileContext::Build, "objc_library"), None);
    }
}
