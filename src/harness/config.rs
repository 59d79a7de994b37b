//! Harness configuration
//!
//! Defaults follow the layout the suite was written against: the harness runs from `tests/tests_generator`, with the
//! compiler built two levels up and the reference interpreter under `utils/`.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Wall-clock budget for each stage of each fixture
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub const DEFAULT_COMPILER: &str = "./../../ifjcompiler";
pub const DEFAULT_INTERPRETER: &str = "./../../utils/ic23int";
pub const DEFAULT_FIXTURE_DIR: &str = "./test_all";
pub const DEFAULT_EXPECTED_DIR: &str = "./expected_out";
pub const DEFAULT_SOURCE_EXTENSION: &str = "swift";
pub const DEFAULT_EXPECTED_EXTENSION: &str = "out";

/// Read-only settings shared by every fixture in a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Compiler executable (reads source on stdin, writes assembly on stdout)
    pub compiler: PathBuf,
    /// Interpreter executable (takes the assembly file path as its only argument)
    pub interpreter: PathBuf,
    /// Directory holding the source fixtures
    pub fixture_dir: PathBuf,
    /// Directory holding the golden outputs
    pub expected_dir: PathBuf,
    /// Fixture extension, without the leading dot
    pub source_extension: String,
    /// Golden output extension, without the leading dot
    pub expected_extension: String,
    /// Per-stage wall-clock timeout
    pub timeout: Duration,
    /// Treat a non-zero exit status as a stage failure
    pub check_exit_status: bool,
    /// Where assembly files are created (system temp dir when `None`)
    pub scratch_dir: Option<PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            compiler: PathBuf::from(DEFAULT_COMPILER),
            interpreter: PathBuf::from(DEFAULT_INTERPRETER),
            fixture_dir: PathBuf::from(DEFAULT_FIXTURE_DIR),
            expected_dir: PathBuf::from(DEFAULT_EXPECTED_DIR),
            source_extension: DEFAULT_SOURCE_EXTENSION.to_string(),
            expected_extension: DEFAULT_EXPECTED_EXTENSION.to_string(),
            timeout: DEFAULT_TIMEOUT,
            check_exit_status: false,
            scratch_dir: None,
        }
    }
}

impl HarnessConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the compiler executable
    pub fn with_compiler(mut self, path: impl Into<PathBuf>) -> Self {
        self.compiler = path.into();
        self
    }

    /// Set the interpreter executable
    pub fn with_interpreter(mut self, path: impl Into<PathBuf>) -> Self {
        self.interpreter = path.into();
        self
    }

    /// Set the fixture and golden output directories
    pub fn with_dirs(mut self, fixture_dir: impl Into<PathBuf>, expected_dir: impl Into<PathBuf>) -> Self {
        self.fixture_dir = fixture_dir.into();
        self.expected_dir = expected_dir.into();
        self
    }

    /// Set the fixture and golden output extensions (leading dots are ignored)
    pub fn with_extensions(mut self, source: &str, expected: &str) -> Self {
        self.source_extension = source.trim_start_matches('.').to_string();
        self.expected_extension = expected.trim_start_matches('.').to_string();
        self
    }

    /// Set the per-stage timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_check_exit_status(mut self, check: bool) -> Self {
        self.check_exit_status = check;
        self
    }

    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    /// Directory assembly files are written to
    pub fn scratch_dir(&self) -> Option<&Path> {
        self.scratch_dir.as_deref()
    }
}
