//! `cody_sync`: renders a Beads JSONL issue store into Cody build artifacts.
//!
//! The pipeline, leaves first:
//! - [`storage`] reads `.beads/issues.jsonl` into typed [`model::Issue`]s
//! - [`graph`] resolves dependencies, cycles, and topological order
//! - [`classify`] assigns each issue a version and a phase
//! - [`format`] renders `feature-backlog.md` and per-version `tasklist.md`
//! - [`sync`] runs the whole pass against a build directory

pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod graph;
pub mod logging;
pub mod model;
pub mod storage;
pub mod sync;

pub use error::{ErrorCode, Result, StructuredError, SyncError};
