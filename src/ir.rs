//! Intermediate representation of the output build graph.
//!
//! The dispatch layer lowers parsed rule invocations into a
//! [`BuildGraph`]: an append-only, insertion-ordered sequence of target
//! declarations, generation steps, and install rules, plus the export lists
//! and prelude the renderer splices into its document skeleton. The IR
//! carries no CMake syntax; rendering lives in [`crate::cmake_gen`].

mod bootstrap;
mod from_rules;
mod graph;

pub use from_rules::SourceFile;
pub use graph::{
    BuildGraph, GenStep, InstallFiles, IrGenError, Stmt, TargetDecl, TargetForm,
};
