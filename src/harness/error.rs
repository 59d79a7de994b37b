//! Fatal harness errors
//!
//! Only discovery can fail a whole run: a directory that cannot be listed, or a fixture/golden file that was listed
//! but cannot be read back. Everything that goes wrong inside a stage is a `StageFailure` instead.

use std::io;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum HarnessError {
    #[error("cannot list {kind} directory '{}'", .path.display())]
    #[diagnostic(
        code(goldrun::discovery::read_dir),
        help("pass --tests / --expected (or GOLDRUN_TESTS / GOLDRUN_EXPECTED) to point at the suite")
    )]
    ReadDir {
        kind: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot read '{}'", .path.display())]
    #[diagnostic(code(goldrun::discovery::read_file))]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
