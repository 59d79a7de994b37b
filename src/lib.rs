#![deny(unsafe_code)]
//! goldrun: golden-output conformance harness
//!
//! goldrun drives an external compiler/interpreter toolchain over a directory of source fixtures. Each fixture is fed
//! to the compiler on stdin, the generated assembly is handed to the interpreter through a scoped temporary file, and
//! the interpreter's stdout is compared (trimmed) against a golden `.out` file.
//!
//! ## Layout
//!
//! - [`harness`] - the orchestration core: discovery, stages, verdicts, and the run loop
//! - [`cli`] - argument parsing, reporters, and the process exit policy
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` and `harness` modules
//!   enforce `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **Unsafe code**: denied crate-wide; the only exception is the process-group `kill(2)` in `harness::process`.
//!
//! - **Stage failures never panic**: anything that goes wrong while compiling or interpreting a fixture becomes that
//!   fixture's verdict; only discovery I/O errors end a run early.

pub mod cli;
pub mod harness;
pub mod version;

pub use harness::{
    CompileStage, Discovery, ExecuteStage, Fixture, FixturePair, HarnessConfig, HarnessError, Pipeline, Reporter,
    RunOptions, RunSummary, Stage, StageFailure, StageResult, Verdict, discover, judge,
};
