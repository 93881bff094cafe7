//! # smake - simple C/C++ build orchestrator
//!
//! smake turns a declarative project description into built executables and
//! static libraries. It only recompiles what changed, following local
//! `#include "..."` chains, and runs compiler processes in parallel up to a
//! fixed limit.
//!
//! ## Quick Start
//!
//! ```toml
//! # smake.toml
//! [project]
//! run = "main"
//!
//! [library.add]
//! sources = ["lib"]
//!
//! [executable.app]
//! sources = ["src"]
//! deps = ["add", "m"]
//!
//! [dynamic]
//! names = ["m"]
//!
//! [alias]
//! main = "app"
//! ```
//!
//! ```bash
//! smake           # build `main`
//! smake run       # build, then execute
//! smake clean
//! ```
//!
//! ## Module Organization
//!
//! - [`build`] - Target graph, incremental checks and the job dispatcher
//! - [`config`] - Project description parsing (`smake.toml`)
//! - [`toolchain`] - Source language and compiler selection
//! - [`error`] - Build failure taxonomy

/// Target resolution, incremental rebuild checks and parallel dispatch.
pub mod build;

/// Project description parsing (`smake.toml`).
pub mod config;

/// Error types shared across the crate.
pub mod error;

/// Language classification and compiler/flag selection.
pub mod toolchain;
