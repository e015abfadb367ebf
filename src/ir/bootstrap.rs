//! Three-stage self-hosting bootstrap expansion.
//!
//! The code generator's own input schemas are written in the format the
//! generator emits, so the generator must be built from checked-in seed
//! output (stage 0), used to regenerate its inputs (stage 1), and the
//! regenerated generator used once more (stage 2) before the final targets
//! exist. A single bundle rule expands here into that full chain; the
//! simpler staged library/binary rules declare one target per stage with
//! the same dependency-suffix discipline.

use tracing::debug;

use crate::ast::RuleInvocation;
use crate::depmap::map_dependency;

use super::from_rules::{
    is_source_file, mapped_deps, require_name, Dispatcher, BLOCKED_TARGETS,
};
use super::graph::{GenStep, InstallFiles, IrGenError, Stmt, TargetDecl, TargetForm};

/// Stage name suffixes: seed, first self-generation, final.
const STAGES: [&str; 3] = ["_stage0", "_stage1", ""];

/// The primary generator plugin name; also the generated-file infix.
const PRIMARY_PLUGIN: &str = "picopb";

/// Extensions of the primary plugin's output pair per logical input.
const GENERATED_EXTS: [&str; 2] = [".picopb.h", ".picopb.c"];

/// The reflection/definitions generator plugin name.
const DEFS_PLUGIN: &str = "picopbdefs";

/// Extensions of the definitions plugin's output pair per logical input.
const DEFS_EXTS: [&str; 2] = [".picopbdefs.h", ".picopbdefs.c"];

/// The auxiliary scripting-binding generator plugin name.
const LUA_PLUGIN: &str = "lua";

/// Minimal runtime-support library every stage links.
const GENERATED_CODE_SUPPORT: &str = "generated_code_support";

/// Minimal in-memory schema-table library; only the stage-0 seed needs its
/// compatibility shim.
const MINI_TABLE: &str = "mini_table";

/// The full, non-bootstrap runtime library.
const RUNTIME: &str = "picopb";

/// Include root the reference schema compiler resolves inputs under.
const HOST_INCLUDE: &str = "${PICOPB_HOST_INCLUDE_DIR}";

/// The tool target implementing `plugin`, staged by `suffix`.
fn plugin_tool(plugin: &str, suffix: &str) -> String {
    format!("protoc-gen-{plugin}{suffix}")
}

/// `prefix` without its final extension, per the source system's
/// `"a/b.proto" -> "a/b"` convention.
fn strip_extension(path: &str) -> &str {
    path.rsplit_once('.').map_or(path, |(stem, _)| stem)
}

fn dirname(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(dir, _)| dir)
}

/// One `<dir>/<prefix><ext>` path per prefix/extension pair, in input
/// order with extensions paired per input.
fn paired_outputs(dir: &str, prefixes: &[String], exts: [&str; 2]) -> Vec<String> {
    prefixes
        .iter()
        .flat_map(|p| exts.iter().map(move |ext| format!("{dir}/{p}{ext}")))
        .collect()
}

/// The bundle's `deps`, mapped and stage-suffixed.
fn staged_deps(invocation: &RuleInvocation, key: &str, suffix: &str) -> Vec<String> {
    invocation
        .strings(key)
        .iter()
        .map(|dep| format!("{}{suffix}", map_dependency(dep)))
        .collect()
}

impl Dispatcher<'_> {
    /// `bootstrap_picopb_proto_library`: expand one bundle rule into the
    /// explicit three-stage chain.
    pub(super) fn codegen_bundle(
        &mut self,
        invocation: &RuleInvocation,
    ) -> Result<(), IrGenError> {
        let name = require_name(invocation)?;
        if BLOCKED_TARGETS.contains(&name) {
            debug!(%name, "target is deny-listed");
            return Ok(());
        }
        let protos = invocation.strings("protos");
        if protos.is_empty() {
            // Nothing to bootstrap; a valid case, not an error.
            debug!(%name, "bundle has no schema inputs; skipping chain");
            return Ok(());
        }

        let mut base_dir = invocation.string("base_dir").map_or_else(
            || self.subdir.to_owned(),
            |dir| format!("{}{dir}", self.subdir),
        );
        while base_dir.ends_with('/') || base_dir.ends_with('\\') {
            base_dir.pop();
        }

        let prefixes: Vec<String> = protos
            .iter()
            .map(|p| strip_extension(p).to_owned())
            .collect();
        let schema_inputs: Vec<String> =
            protos.iter().map(|f| format!("{HOST_INCLUDE}/{f}")).collect();

        let mut body = Vec::new();

        // Stage 0: seed generator output checked into the tree.
        let stage0_dir = format!("${{CMAKE_CURRENT_SOURCE_DIR}}/../{base_dir}/stage0");
        let mut stage0 = TargetDecl::new(format!("{name}_stage0"), TargetForm::Compiled);
        stage0.sources =
            paired_outputs(&format!("../{base_dir}/stage0"), &prefixes, GENERATED_EXTS);
        stage0.include_before = vec![stage0_dir];
        stage0.link_deps = vec![GENERATED_CODE_SUPPORT.to_owned(), MINI_TABLE.to_owned()];
        stage0.link_deps.extend(staged_deps(invocation, "deps", "_stage0"));
        body.push(Stmt::Target(stage0));

        // Stage 1: regenerate with the stage-0 plugin.
        let stage1_dir = format!("${{CMAKE_CURRENT_BINARY_DIR}}/_stage1/{name}");
        let stage1_tool = plugin_tool(PRIMARY_PLUGIN, "_stage0");
        body.push(Stmt::MakeDirectory(stage1_dir.clone()));
        body.push(Stmt::GenStep(GenStep {
            outputs: paired_outputs(&stage1_dir, &prefixes, GENERATED_EXTS),
            inputs: schema_inputs.clone(),
            tool_deps: vec![stage1_tool.clone()],
            plugins: vec![(PRIMARY_PLUGIN.to_owned(), stage1_tool)],
            out_dirs: vec![(PRIMARY_PLUGIN.to_owned(), stage1_dir.clone())],
        }));
        let mut stage1 = TargetDecl::new(format!("{name}_stage1"), TargetForm::Compiled);
        stage1.sources = paired_outputs(&stage1_dir, &prefixes, GENERATED_EXTS);
        stage1.include_before = vec![stage1_dir];
        // Stage 1 output no longer needs the seed's table shim.
        stage1.link_deps = vec![GENERATED_CODE_SUPPORT.to_owned()];
        stage1.link_deps.extend(staged_deps(invocation, "deps", "_stage1"));
        body.push(Stmt::Target(stage1));

        // Stage 2: final generation with the stage-1 plugin, plus the
        // definitions and scripting-binding output kinds.
        let stage2_dir = format!("${{CMAKE_CURRENT_BINARY_DIR}}/stage2/{name}");
        let stage2_tool = plugin_tool(PRIMARY_PLUGIN, "_stage1");
        let defs_tool = plugin_tool(DEFS_PLUGIN, "");
        let lua_tool = plugin_tool(LUA_PLUGIN, "");
        body.push(Stmt::MakeDirectory(stage2_dir.clone()));
        body.push(Stmt::GenStep(GenStep {
            outputs: paired_outputs(&stage2_dir, &prefixes, GENERATED_EXTS),
            inputs: schema_inputs.clone(),
            tool_deps: vec![stage2_tool.clone()],
            plugins: vec![(PRIMARY_PLUGIN.to_owned(), stage2_tool)],
            out_dirs: vec![(PRIMARY_PLUGIN.to_owned(), stage2_dir.clone())],
        }));
        let mut aux_outputs = paired_outputs(&stage2_dir, &prefixes, DEFS_EXTS);
        aux_outputs.extend(prefixes.iter().map(|p| format!("{stage2_dir}/{p}_pb.lua")));
        body.push(Stmt::GenStep(GenStep {
            outputs: aux_outputs.clone(),
            inputs: schema_inputs,
            tool_deps: vec![defs_tool.clone(), lua_tool.clone()],
            plugins: vec![
                (DEFS_PLUGIN.to_owned(), defs_tool),
                (LUA_PLUGIN.to_owned(), lua_tool),
            ],
            out_dirs: vec![
                (DEFS_PLUGIN.to_owned(), stage2_dir.clone()),
                (LUA_PLUGIN.to_owned(), stage2_dir.clone()),
            ],
        }));

        let mut final_target = TargetDecl::new(name.to_owned(), TargetForm::Compiled);
        final_target.sources = paired_outputs(&stage2_dir, &prefixes, GENERATED_EXTS);
        final_target.include_before = vec![stage2_dir.clone()];
        final_target.link_deps = vec![RUNTIME.to_owned()];
        final_target.link_deps.extend(staged_deps(invocation, "deps", ""));
        body.push(Stmt::Target(final_target));

        let defs_name = format!("{name}_defs");
        let mut defs_target = TargetDecl::new(defs_name.clone(), TargetForm::Compiled);
        defs_target.sources = paired_outputs(&stage2_dir, &prefixes, DEFS_EXTS);
        defs_target.include_before = vec![stage2_dir.clone()];
        defs_target.link_deps = vec![name.to_owned()];
        body.push(Stmt::Target(defs_target));

        let mut install_files = paired_outputs(&stage2_dir, &prefixes, GENERATED_EXTS);
        install_files.extend(aux_outputs);
        let destination = prefixes
            .first()
            .map_or_else(|| "include".to_owned(), |p| format!("include/{}", dirname(p)));
        body.push(Stmt::InstallFiles(InstallFiles {
            files: install_files,
            destination,
        }));

        self.graph.stmts.push(Stmt::Guarded(body));
        self.graph.export_codegen_targets.push(name.to_owned());
        self.graph.export_codegen_targets.push(defs_name);
        Ok(())
    }

    /// `bootstrap_cc_library`: one library per stage from the same fixed
    /// sources, with `bootstrap_deps` following the stage suffix.
    pub(super) fn staged_library(
        &mut self,
        invocation: &RuleInvocation,
    ) -> Result<(), IrGenError> {
        self.staged_targets(invocation, None)
    }

    /// `bootstrap_cc_binary`: as [`Self::staged_library`], but executable
    /// at every stage.
    pub(super) fn staged_binary(
        &mut self,
        invocation: &RuleInvocation,
    ) -> Result<(), IrGenError> {
        self.staged_targets(invocation, Some(TargetForm::Executable))
    }

    fn staged_targets(
        &mut self,
        invocation: &RuleInvocation,
        forced_form: Option<TargetForm>,
    ) -> Result<(), IrGenError> {
        let name = require_name(invocation)?;
        if BLOCKED_TARGETS.contains(&name) {
            debug!(%name, "target is deny-listed");
            return Ok(());
        }

        let mut files = invocation.strings("srcs");
        files.extend(invocation.strings("hdrs"));
        let sources: Vec<String> = files
            .iter()
            .map(|f| format!("../{}{f}", self.subdir))
            .collect();
        let form = forced_form.unwrap_or_else(|| {
            if files.iter().any(|f| is_source_file(f)) {
                TargetForm::Compiled
            } else {
                TargetForm::HeaderOnly
            }
        });

        let mut body = Vec::new();
        for stage in STAGES {
            let mut target = TargetDecl::new(format!("{name}{stage}"), form);
            if form != TargetForm::HeaderOnly {
                target.sources = sources.clone();
            }
            target.link_deps = mapped_deps(invocation, "deps");
            target
                .link_deps
                .extend(staged_deps(invocation, "bootstrap_deps", stage));
            body.push(Stmt::Target(target));
        }
        self.graph.stmts.push(Stmt::Guarded(body));
        self.graph.export_codegen_targets.push(name.to_owned());
        Ok(())
    }
}
