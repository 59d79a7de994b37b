//! Test orchestration core
//!
//! Data flows strictly downstream, one fixture at a time:
//!
//! ```text
//! discovery -> CompileStage -> ExecuteStage -> judge -> Reporter
//! ```
//!
//! ## Modules
//!
//! - `config` - `HarnessConfig`, the read-only settings threaded through a run
//! - `discovery` - fixture/golden pairing in natural order
//! - `natural` - human ordering of file names
//! - `process` - bounded subprocess execution (timeout + kill)
//! - `stages` - compiler and interpreter stages behind the `CompileStage` / `ExecuteStage` traits
//! - `verdict` - the trim-only comparison
//! - `pipeline` - the sequential run loop and the `Reporter` interface it feeds
//!
//! Nothing in here prints; rendering belongs to `cli::reporter`.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod config;
pub mod discovery;
pub mod error;
pub mod natural;
pub mod pipeline;
pub mod process;
pub mod stages;
pub mod verdict;

pub use config::HarnessConfig;
pub use discovery::{Discovery, Fixture, FixturePair, discover, locate};
pub use error::HarnessError;
pub use pipeline::{FixtureOutcome, Pipeline, Reporter, RunOptions, RunSummary};
pub use stages::{CompileStage, ExecuteStage, ProcessCompiler, ProcessInterpreter, Stage, StageFailure, StageResult};
pub use verdict::{Verdict, judge};
