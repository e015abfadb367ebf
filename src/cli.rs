//! Command line interface definition using clap.
//!
//! The surface is deliberately minimal: the tool takes exactly one
//! argument, the path the rendered CMake script is written to, and reads
//! its input files from the current directory.

use camino::Utf8PathBuf;
use clap::Parser;

/// Translate the picopb Bazel build graph into a CMake build script.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path the generated CMakeLists.txt is written to.
    #[arg(value_name = "OUTPUT")]
    pub output: Utf8PathBuf,
}
