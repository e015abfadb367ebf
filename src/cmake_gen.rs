//! CMake script generator.
//!
//! This module converts a [`crate::ir::BuildGraph`] into the textual
//! `CMakeLists.txt` the packaging layer consumes. Rendering is a single
//! substitution pass over a fixed document skeleton; the accumulated body
//! is spliced in verbatim and never re-validated. All sequences render in
//! insertion order so the output is byte-stable across runs.

use std::fmt::{self, Display, Formatter, Write};

use itertools::Itertools;

use crate::ir::{BuildGraph, GenStep, InstallFiles, Stmt, TargetDecl, TargetForm};

/// The conditional guard around everything that requires code-generation
/// support.
const CODEGEN_GUARD: &str = "PICOPB_ENABLE_CODEGEN";

/// Generate the complete CMake script for `graph`.
///
/// # Panics
///
/// Panics if writing to the output string fails, which is unexpected under
/// normal conditions.
#[must_use]
pub fn generate(graph: &BuildGraph) -> String {
    let mut body = String::new();
    for stmt in &graph.stmts {
        write!(body, "{stmt}").expect("write CMake body");
    }
    TEMPLATE
        .replace("@PRELUDE@", &graph.prelude.join("\n"))
        .replace("@BODY@", &body)
        .replace(
            "@UTF8_RANGE_COMMIT@",
            graph.utf8_range_commit.as_deref().unwrap_or(""),
        )
        .replace("@EXPORT_TARGETS@", &graph.export_targets.join(" "))
        .replace(
            "@EXPORT_CODEGEN_TARGETS@",
            &graph.export_codegen_targets.join(" "),
        )
}

impl Display for Stmt {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Target(target) => write!(f, "{target}"),
            Self::MakeDirectory(dir) => write!(f, "\nfile(MAKE_DIRECTORY \"{dir}\")\n"),
            Self::GenStep(step) => write!(f, "{step}"),
            Self::InstallFiles(install) => write!(f, "{install}"),
            Self::Guarded(body) => {
                writeln!(f, "\nif ({CODEGEN_GUARD})")?;
                for stmt in body {
                    write!(f, "{stmt}")?;
                }
                writeln!(f, "\nendif()")
            }
        }
    }
}

impl Display for TargetDecl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let keyword = self.form.keyword();
        match self.form {
            TargetForm::Compiled => {
                writeln!(f, "\nadd_library({}", self.name)?;
                writeln!(f, "    {}", self.sources.iter().join("\n    "))?;
                writeln!(f, ")")?;
            }
            TargetForm::HeaderOnly => {
                writeln!(f, "\nadd_library({} INTERFACE)", self.name)?;
            }
            TargetForm::Executable => {
                writeln!(f, "\nadd_executable({}", self.name)?;
                writeln!(f, "    {}", self.sources.iter().join("\n    "))?;
                writeln!(f, ")")?;
            }
        }
        writeln!(f, "target_include_directories({} {keyword}", self.name)?;
        writeln!(
            f,
            "    $<BUILD_INTERFACE:${{CMAKE_CURRENT_SOURCE_DIR}}/..>"
        )?;
        writeln!(f, "    $<BUILD_INTERFACE:${{CMAKE_CURRENT_BINARY_DIR}}>")?;
        writeln!(f, ")")?;
        writeln!(f, "if(NOT {CODEGEN_GUARD})")?;
        writeln!(f, "  target_include_directories({} {keyword}", self.name)?;
        writeln!(
            f,
            "      $<BUILD_INTERFACE:${{CMAKE_CURRENT_SOURCE_DIR}}/../cmake>"
        )?;
        writeln!(f, "  )")?;
        writeln!(f, "endif()")?;
        for dir in &self.include_before {
            writeln!(f, "target_include_directories({}", self.name)?;
            writeln!(f, "  BEFORE {keyword} \"$<BUILD_INTERFACE:{dir}>\")")?;
        }
        if !self.link_deps.is_empty() {
            writeln!(f, "target_link_libraries({} {keyword}", self.name)?;
            writeln!(f, "  {})", self.link_deps.iter().join("\n  "))?;
        }
        Ok(())
    }
}

impl Display for GenStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "\nadd_custom_command(")?;
        writeln!(f, "  OUTPUT")?;
        writeln!(f, "    {}", self.outputs.iter().join("\n    "))?;
        writeln!(f, "  DEPENDS")?;
        writeln!(f, "    {}", self.inputs.iter().join("\n    "))?;
        writeln!(f, "    {}", self.tool_deps.iter().join("\n    "))?;
        writeln!(f, "  COMMAND")?;
        writeln!(f, "    \"${{PROTOC_PROGRAM}}\"")?;
        writeln!(f, "    \"-I${{PICOPB_HOST_INCLUDE_DIR}}\"")?;
        for (plugin, tool) in &self.plugins {
            writeln!(
                f,
                "    \"--plugin=protoc-gen-{plugin}=\\$<TARGET_FILE:{tool}>\""
            )?;
        }
        for (plugin, dir) in &self.out_dirs {
            writeln!(f, "    \"--{plugin}_out={dir}\"")?;
        }
        writeln!(f, "    {}", self.inputs.iter().join("\n    "))?;
        writeln!(f, ")")
    }
}

impl Display for InstallFiles {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "\ninstall(")?;
        writeln!(f, "  FILES")?;
        writeln!(f, "    {}", self.files.iter().join("\n    "))?;
        writeln!(f, "  DESTINATION \"{}\"", self.destination)?;
        writeln!(f, ")")
    }
}

/// The fixed document skeleton.
///
/// `@PRELUDE@`, `@BODY@`, `@UTF8_RANGE_COMMIT@`, `@EXPORT_TARGETS@`, and
/// `@EXPORT_CODEGEN_TARGETS@` are the renderer's only substitution points.
const TEMPLATE: &str = r##"# This file was generated from BUILD files by tsugite; do not edit.

cmake_minimum_required(VERSION 3.10...3.24)

@PRELUDE@

set(CMAKE_FIND_PACKAGE_PREFER_CONFIG TRUE)
if(CMAKE_SOURCE_DIR STREQUAL picopb_SOURCE_DIR)
  if(CMAKE_VERSION VERSION_GREATER_EQUAL 3.20)
    set(CMAKE_CXX_STANDARD 23)
  elseif(CMAKE_VERSION VERSION_GREATER_EQUAL 3.12)
    set(CMAKE_CXX_STANDARD 20)
  else()
    set(CMAKE_CXX_STANDARD 17)
  endif()
  set(CMAKE_CXX_STANDARD_REQUIRED ON)
endif()

# Prevent CMake from setting -rdynamic on Linux.
SET(CMAKE_SHARED_LIBRARY_LINK_C_FLAGS "")
SET(CMAKE_SHARED_LIBRARY_LINK_CXX_FLAGS "")

# Set default build type.
if(NOT CMAKE_BUILD_TYPE)
  message(STATUS "Setting build type to 'RelWithDebInfo' as none was specified.")
  set(CMAKE_BUILD_TYPE "RelWithDebInfo" CACHE STRING
      "Choose the type of build, options are: Debug Release RelWithDebInfo MinSizeRel."
      FORCE)
endif()

# When using Ninja, compiler output won't be colorized without this.
include(CheckCXXCompilerFlag)
CHECK_CXX_COMPILER_FLAG(-fdiagnostics-color=always SUPPORTS_COLOR_ALWAYS)
if(SUPPORTS_COLOR_ALWAYS)
  set(CMAKE_CXX_FLAGS "${CMAKE_CXX_FLAGS} -fdiagnostics-color=always")
endif()

# Implement ASAN/UBSAN options
if(PICOPB_ENABLE_ASAN)
  set(CMAKE_CXX_FLAGS "${CMAKE_CXX_FLAGS} -fsanitize=address")
  set(CMAKE_C_FLAGS "${CMAKE_C_FLAGS} -fsanitize=address")
  set(CMAKE_EXE_LINKER_FLAGS "${CMAKE_EXE_LINKER_FLAGS} -fsanitize=address")
  set(CMAKE_SHARED_LINKER_FLAGS "${CMAKE_SHARED_LINKER_FLAGS} -fsanitize=address")
endif()

if(PICOPB_ENABLE_UBSAN)
  set(CMAKE_CXX_FLAGS "${CMAKE_CXX_FLAGS} -fsanitize=undefined")
  set(CMAKE_C_FLAGS "${CMAKE_C_FLAGS} -fsanitize=undefined")
  set(CMAKE_EXE_LINKER_FLAGS "${CMAKE_EXE_LINKER_FLAGS} -fsanitize=undefined")
  set(CMAKE_SHARED_LINKER_FLAGS "${CMAKE_SHARED_LINKER_FLAGS} -fsanitize=undefined")
endif()

find_package(utf8_range QUIET)
if(TARGET utf8_range::utf8_range)
  add_library(utf8_range ALIAS utf8_range::utf8_range)
  if(EXISTS "${utf8_range_DIR}/../../include/utf8_range.h")
    include_directories("${utf8_range_DIR}/../../include/")
  elseif(EXISTS "${utf8_range_DIR}/../../../include/utf8_range.h")
    include_directories("${utf8_range_DIR}/../../../include/")
  endif()
elseif(EXISTS ../external/utf8_range)
  # utf8_range is vendored alongside the tree
  set(utf8_range_ENABLE_TESTS FALSE CACHE BOOL "")
  set(utf8_range_ENABLE_INSTALL TRUE CACHE BOOL "")
  file(MAKE_DIRECTORY "${CMAKE_CURRENT_BINARY_DIR}/picopb-utf8_range")
  add_subdirectory(../external/utf8_range "${CMAKE_CURRENT_BINARY_DIR}/picopb-utf8_range")
  target_include_directories(utf8_range PUBLIC "\$<BUILD_INTERFACE:${CMAKE_CURRENT_SOURCE_DIR}/../external/utf8_range>")
else()
  include(FetchContent)
  FetchContent_Declare(
    utf8_range
    GIT_REPOSITORY "https://github.com/protocolbuffers/utf8_range.git"
    GIT_TAG "@UTF8_RANGE_COMMIT@"
  )
  FetchContent_GetProperties(utf8_range)
  if(NOT utf8_range_POPULATED)
    FetchContent_Populate(utf8_range)
    set(utf8_range_ENABLE_TESTS FALSE CACHE BOOL "")
    set(utf8_range_ENABLE_INSTALL TRUE CACHE BOOL "")
    file(MAKE_DIRECTORY "${CMAKE_CURRENT_BINARY_DIR}/picopb-utf8_range")
    add_subdirectory("${utf8_range_SOURCE_DIR}" "${CMAKE_CURRENT_BINARY_DIR}/picopb-utf8_range")
    target_include_directories(utf8_range PUBLIC "\$<BUILD_INTERFACE:${utf8_range_SOURCE_DIR}>")
  endif()
endif()

if(APPLE)
  set(CMAKE_SHARED_LINKER_FLAGS "${CMAKE_SHARED_LINKER_FLAGS} -undefined dynamic_lookup -flat_namespace")
elseif(UNIX)
  set(CMAKE_EXE_LINKER_FLAGS "${CMAKE_EXE_LINKER_FLAGS} -Wl,--build-id")
endif()

if (MSVC)
  add_compile_options(/wd4146 /wd4703 -D_CRT_SECURE_NO_WARNINGS)
endif()

enable_testing()

if (PICOPB_ENABLE_CODEGEN)
  find_package(absl CONFIG REQUIRED)
  find_package(protobuf CONFIG REQUIRED)
  if(NOT PICOPB_HOST_INCLUDE_DIR)
    if(TARGET protobuf::libprotobuf)
      get_target_property(PICOPB_HOST_INCLUDE_DIR protobuf::libprotobuf INTERFACE_INCLUDE_DIRECTORIES)
    elseif(Protobuf_INCLUDE_DIR)
      set(PICOPB_HOST_INCLUDE_DIR "${Protobuf_INCLUDE_DIR}")
    else()
      set(PICOPB_HOST_INCLUDE_DIR "${PROTOBUF_INCLUDE_DIR}")
    endif()
  endif()
endif()

@BODY@

if (PICOPB_ENABLE_CODEGEN)
  set(PICOPB_CODEGEN_TARGETS protoc-gen-lua)
  add_executable(protoc-gen-lua
    ../lua/picopbc.cc
  )
  target_link_libraries(protoc-gen-lua PRIVATE
    absl::strings
    protobuf::libprotobuf
    protobuf::libprotoc
  )

  set(PROTOC_PROGRAM "\$<TARGET_FILE:protobuf::protoc>")
  set(PROTOC_GEN_PICOPB_PROGRAM "\$<TARGET_FILE:protoc-gen-picopb>")
  set(PROTOC_GEN_PICOPBDEFS_PROGRAM "\$<TARGET_FILE:protoc-gen-picopbdefs>")
  set(PROTOC_GEN_LUA_PROGRAM "\$<TARGET_FILE:protoc-gen-lua>")

  set(PICOPB_COMPILER_PLUGIN_SOURCES
    "${CMAKE_CURRENT_BINARY_DIR}/google/protobuf/compiler/plugin.picopb.h"
    "${CMAKE_CURRENT_BINARY_DIR}/google/protobuf/compiler/plugin.picopb.c"
    "${CMAKE_CURRENT_BINARY_DIR}/google/protobuf/compiler/plugin.picopbdefs.h"
    "${CMAKE_CURRENT_BINARY_DIR}/google/protobuf/compiler/plugin.picopbdefs.c"
  )

  unset(PICOPB_WELL_KNOWN_TYPES_LUAS)
  unset(PICOPB_WELL_KNOWN_TYPES_HEADERS)
  unset(PICOPB_WELL_KNOWN_TYPES_SOURCES)
  unset(PICOPB_WELL_KNOWN_TYPES_PROTO_FILES)
  set(PICOPB_WELL_KNOWN_TYPES_PROTO_NAMES any api duration empty
      field_mask source_context struct timestamp type wrappers)
  foreach(PROTO_NAME IN LISTS PICOPB_WELL_KNOWN_TYPES_PROTO_NAMES)
    list(APPEND PICOPB_WELL_KNOWN_TYPES_PROTO_FILES
          "${PICOPB_HOST_INCLUDE_DIR}/google/protobuf/${PROTO_NAME}.proto")
    list(APPEND PICOPB_WELL_KNOWN_TYPES_LUAS
          "${CMAKE_CURRENT_BINARY_DIR}/stage2/well_known_types/google/protobuf/${PROTO_NAME}_pb.lua")
    list(APPEND PICOPB_WELL_KNOWN_TYPES_HEADERS
          "${CMAKE_CURRENT_BINARY_DIR}/stage2/well_known_types/google/protobuf/${PROTO_NAME}.picopb.h"
          "${CMAKE_CURRENT_BINARY_DIR}/stage2/well_known_types/google/protobuf/${PROTO_NAME}.picopbdefs.h")
    list(APPEND PICOPB_WELL_KNOWN_TYPES_SOURCES
          "${CMAKE_CURRENT_BINARY_DIR}/stage2/well_known_types/google/protobuf/${PROTO_NAME}.picopb.c"
          "${CMAKE_CURRENT_BINARY_DIR}/stage2/well_known_types/google/protobuf/${PROTO_NAME}.picopbdefs.c")
  endforeach()

  file(MAKE_DIRECTORY "${CMAKE_CURRENT_BINARY_DIR}/stage2")
  add_custom_command(
    OUTPUT ${PICOPB_WELL_KNOWN_TYPES_LUAS}
          ${PICOPB_WELL_KNOWN_TYPES_HEADERS}
          ${PICOPB_WELL_KNOWN_TYPES_SOURCES}
    DEPENDS ${PICOPB_WELL_KNOWN_TYPES_PROTO_FILES}
    COMMAND
      "${PROTOC_PROGRAM}"
      "-I${PICOPB_HOST_INCLUDE_DIR}"
      "--plugin=protoc-gen-picopb=${PROTOC_GEN_PICOPB_PROGRAM}"
      "--plugin=protoc-gen-picopbdefs=${PROTOC_GEN_PICOPBDEFS_PROGRAM}"
      "--plugin=protoc-gen-lua=${PROTOC_GEN_LUA_PROGRAM}"
      "--picopb_out=${CMAKE_CURRENT_BINARY_DIR}/stage2/well_known_types"
      "--picopbdefs_out=${CMAKE_CURRENT_BINARY_DIR}/stage2/well_known_types"
      "--lua_out=${CMAKE_CURRENT_BINARY_DIR}/stage2/well_known_types"
      ${PICOPB_WELL_KNOWN_TYPES_PROTO_FILES}
  )

  add_library(well_known_types ${PICOPB_WELL_KNOWN_TYPES_HEADERS}
    ${PICOPB_WELL_KNOWN_TYPES_SOURCES})
  target_include_directories(well_known_types PUBLIC "\$<BUILD_INTERFACE:${CMAKE_CURRENT_BINARY_DIR}/stage2/well_known_types>")
  set_target_properties(well_known_types PROPERTIES OUTPUT_NAME "picopb-well_known_types")
  target_link_libraries(well_known_types PUBLIC picopb descriptor_proto)
endif()

include(GNUInstallDirs)
install(
  DIRECTORY ../picopb
  DESTINATION include
  FILES_MATCHING
  PATTERN "*.h"
  PATTERN "*.hpp"
  PATTERN "*.inc"
)
target_include_directories(picopb INTERFACE $<INSTALL_INTERFACE:include>)
install(TARGETS
  @EXPORT_TARGETS@
  EXPORT picopb-config
)
if (PICOPB_ENABLE_CODEGEN)
  install(
    FILES
      ${PICOPB_WELL_KNOWN_TYPES_LUAS}
      ${PICOPB_WELL_KNOWN_TYPES_HEADERS}
    DESTINATION include/google/protobuf
  )
  install(
    DIRECTORY ../lua/
    DESTINATION share/picopb/lua
  )
  install(TARGETS
    well_known_types
    @EXPORT_CODEGEN_TARGETS@
    ${PICOPB_CODEGEN_TARGETS}
    EXPORT picopb-config
  )
endif()
install(EXPORT picopb-config NAMESPACE picopb:: DESTINATION "${CMAKE_INSTALL_LIBDIR}/cmake/picopb")
"##;
