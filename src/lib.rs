//! Tsugite core library.
//!
//! This library parses the picopb project's Bazel-style `BUILD` and
//! `WORKSPACE` files and regenerates an equivalent `CMakeLists.txt`,
//! including the three-stage self-hosting code-generator bootstrap that
//! CMake cannot express natively.

pub mod ast;
pub mod cli;
pub mod cmake_gen;
pub mod depmap;
pub mod ir;
pub mod manifest;
pub mod registry;
pub mod runner;
