//! CLI module for goldrun
//!
//! ## Commands
//!
//! - `goldrun [OPTIONS]` / `goldrun run [OPTIONS]` - run the suite
//! - `goldrun list [OPTIONS]` - show which fixtures would run, without invoking any binary
//!
//! ## Modules
//!
//! - `commands` - Command implementations
//! - `reporter` - Console and JSON-lines reporters
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros. Every configuration flag can also come from a
//! `GOLDRUN_*` environment variable. Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;
pub mod reporter;

use std::fmt;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::harness::HarnessConfig;
use crate::harness::config::{
    DEFAULT_COMPILER, DEFAULT_EXPECTED_DIR, DEFAULT_EXPECTED_EXTENSION, DEFAULT_FIXTURE_DIR, DEFAULT_INTERPRETER,
    DEFAULT_SOURCE_EXTENSION,
};
use crate::version::GOLDRUN_VERSION;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    /// At least one fixture failed
    pub const FAILURE: ExitCode = ExitCode(1);
    /// The harness itself could not run (discovery I/O)
    pub const FATAL: ExitCode = ExitCode(2);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }

    /// Render a fatal harness error through miette (exit code 2).
    pub fn fatal(err: crate::harness::HarnessError) -> Self {
        let report = miette::Report::new(err);
        Self::new(format!("{:?}", report), ExitCode::FATAL)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Golden-output conformance harness for compiler/interpreter toolchains
#[derive(Parser, Debug)]
#[command(name = "goldrun")]
#[command(version = GOLDRUN_VERSION)]
#[command(about = "Run source fixtures through a compiler and interpreter and compare against golden output", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Options for the default `run` action
    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the suite (default)
    Run(RunArgs),

    /// List paired fixtures in run order without running them
    List(ConfigArgs),
}

/// Where the toolchain and the suite live
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Compiler executable (source on stdin, assembly on stdout)
    #[arg(long, value_name = "PATH", env = "GOLDRUN_COMPILER", default_value = DEFAULT_COMPILER)]
    pub compiler: PathBuf,

    /// Interpreter executable (assembly file as its only argument)
    #[arg(long, value_name = "PATH", env = "GOLDRUN_INTERPRETER", default_value = DEFAULT_INTERPRETER)]
    pub interpreter: PathBuf,

    /// Directory of source fixtures
    #[arg(long = "tests", value_name = "DIR", env = "GOLDRUN_TESTS", default_value = DEFAULT_FIXTURE_DIR)]
    pub fixture_dir: PathBuf,

    /// Directory of golden outputs
    #[arg(long = "expected", value_name = "DIR", env = "GOLDRUN_EXPECTED", default_value = DEFAULT_EXPECTED_DIR)]
    pub expected_dir: PathBuf,

    /// Fixture file extension
    #[arg(long, value_name = "EXT", default_value = DEFAULT_SOURCE_EXTENSION)]
    pub source_ext: String,

    /// Golden output file extension
    #[arg(long, value_name = "EXT", default_value = DEFAULT_EXPECTED_EXTENSION)]
    pub expected_ext: String,

    /// Per-stage timeout in seconds
    #[arg(long, value_name = "SECS", env = "GOLDRUN_TIMEOUT", default_value = "10", value_parser = parse_timeout)]
    pub timeout: Duration,

    /// Treat a non-zero exit status from either binary as a failure
    #[arg(long)]
    pub check_exit_status: bool,

    /// Directory for generated assembly files (default: system temp dir)
    #[arg(long, value_name = "DIR")]
    pub scratch_dir: Option<PathBuf>,
}

impl ConfigArgs {
    pub fn to_config(&self) -> HarnessConfig {
        let config = HarnessConfig::new()
            .with_compiler(&self.compiler)
            .with_interpreter(&self.interpreter)
            .with_dirs(&self.fixture_dir, &self.expected_dir)
            .with_extensions(&self.source_ext, &self.expected_ext)
            .with_timeout(self.timeout)
            .with_check_exit_status(self.check_exit_status);
        match &self.scratch_dir {
            Some(dir) => config.with_scratch_dir(dir),
            None => config,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Verbose output (stage timings)
    #[arg(short, long)]
    pub verbose: bool,

    /// Stop on first failure
    #[arg(short = 'x', long = "exitfirst")]
    pub exit_first: bool,

    /// Only run fixtures whose name contains EXPR
    #[arg(short = 'k', value_name = "EXPR")]
    pub filter: Option<String>,

    /// Report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    pub format: ReportFormat,

    /// Disable ANSI colors (also honoured: NO_COLOR)
    #[arg(long)]
    pub no_color: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Console,
    Json,
}

fn parse_timeout(raw: &str) -> Result<Duration, String> {
    let secs: f64 = raw.parse().map_err(|e| format!("invalid timeout '{}': {}", raw, e))?;
    if secs <= 0.0 {
        return Err(format!("timeout must be positive, got {}", raw));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| format!("invalid timeout '{}': {}", raw, e))
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Some(Command::Run(args)) => commands::run_suite(&args),
        Some(Command::List(args)) => commands::list_fixtures(&args),
        None => commands::run_suite(&cli.run),
    }
}

// ============================================================================
// Tests
// ============================================================================
