//! Compilation and execution stages
//!
//! ## Stage Traits
//!
//! The run loop only sees [`CompileStage`] and [`ExecuteStage`]. The process-backed implementations below drive the
//! real binaries; tests substitute in-memory stages to exercise the pipeline without spawning anything.
//!
//! ## Failure Containment
//!
//! A stage never returns an error type the caller has to propagate: a missing binary, a timeout, a spawn failure or
//! an uncapturable stdout all become a [`StageFailure`] whose `Display` is the diagnostic shown to the user.

use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use tempfile::TempPath;
use thiserror::Error;

use super::config::HarnessConfig;
use super::process::{CapturedOutput, RunError, run_bounded};

/// Which external binary a stage drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Compiler,
    Interpreter,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Compiler => write!(f, "Compiler"),
            Stage::Interpreter => write!(f, "Interpreter"),
        }
    }
}

/// Why a stage could not produce output
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageFailure {
    #[error("{stage} \"{}\" not found", .path.display())]
    MissingBinary { stage: Stage, path: PathBuf },

    #[error("{stage} timeout")]
    Timeout { stage: Stage, limit: Duration },

    #[error("{stage} error: {message}")]
    Spawn { stage: Stage, message: String },

    #[error("{stage} returned no output")]
    MissingOutput { stage: Stage },

    #[error("{stage} failed ({status})")]
    ExitStatus { stage: Stage, status: String, stderr: String },
}

impl StageFailure {
    pub fn stage(&self) -> Stage {
        match self {
            StageFailure::MissingBinary { stage, .. }
            | StageFailure::Timeout { stage, .. }
            | StageFailure::Spawn { stage, .. }
            | StageFailure::MissingOutput { stage }
            | StageFailure::ExitStatus { stage, .. } => *stage,
        }
    }

    /// Short machine-readable label (used by the JSON reporter)
    pub fn kind(&self) -> &'static str {
        match self {
            StageFailure::MissingBinary { .. } => "missing_binary",
            StageFailure::Timeout { .. } => "timeout",
            StageFailure::Spawn { .. } => "spawn_error",
            StageFailure::MissingOutput { .. } => "missing_output",
            StageFailure::ExitStatus { .. } => "exit_status",
        }
    }
}

/// Captured stdout on success, a diagnostic otherwise
pub type StageResult = Result<String, StageFailure>;

/// Translate a fixture into assembly.
pub trait CompileStage {
    /// Compile the fixture at `source` (fed on stdin), returning the generated assembly unmodified.
    fn compile(&self, source: &Path) -> StageResult;
}

/// Run generated assembly.
pub trait ExecuteStage {
    /// Interpret `assembly`, returning the program's stdout unmodified.
    fn execute(&self, assembly: &str) -> StageResult;
}

// ============================================================================
// Process-backed stages
// ============================================================================

/// Shared invocation policy for both binaries
#[derive(Debug, Clone)]
struct Invoker {
    stage: Stage,
    binary: PathBuf,
    timeout: Duration,
    check_exit_status: bool,
}

impl Invoker {
    fn ensure_binary(&self) -> Result<(), StageFailure> {
        if self.binary.is_file() {
            Ok(())
        } else {
            Err(StageFailure::MissingBinary {
                stage: self.stage,
                path: self.binary.clone(),
            })
        }
    }

    fn spawn_failure(&self, e: impl fmt::Display) -> StageFailure {
        StageFailure::Spawn {
            stage: self.stage,
            message: e.to_string(),
        }
    }

    fn invoke(&self, command: Command, stdin: Stdio) -> StageResult {
        tracing::debug!(stage = %self.stage, ?command, "spawning");
        let output = match run_bounded(command, stdin, self.timeout) {
            Ok(output) => output,
            Err(RunError::TimedOut(limit)) => {
                tracing::warn!(stage = %self.stage, ?limit, "stage timed out, child killed");
                return Err(StageFailure::Timeout {
                    stage: self.stage,
                    limit,
                });
            }
            Err(RunError::Io(e)) => return Err(self.spawn_failure(e)),
        };
        tracing::debug!(stage = %self.stage, elapsed = ?output.elapsed, status = %output.status, "child exited");
        self.accept(output)
    }

    fn accept(&self, output: CapturedOutput) -> StageResult {
        if self.check_exit_status && !output.status.success() {
            return Err(StageFailure::ExitStatus {
                stage: self.stage,
                status: output.status.to_string(),
                stderr: output.stderr,
            });
        }
        output.stdout.ok_or(StageFailure::MissingOutput { stage: self.stage })
    }
}

/// Runs the compiler binary with the fixture file as stdin.
#[derive(Debug, Clone)]
pub struct ProcessCompiler {
    invoker: Invoker,
}

impl ProcessCompiler {
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            invoker: Invoker {
                stage: Stage::Compiler,
                binary: binary.into(),
                timeout,
                check_exit_status: false,
            },
        }
    }

    pub fn from_config(config: &HarnessConfig) -> Self {
        Self::new(&config.compiler, config.timeout).with_check_exit_status(config.check_exit_status)
    }

    pub fn with_check_exit_status(mut self, check: bool) -> Self {
        self.invoker.check_exit_status = check;
        self
    }
}

impl CompileStage for ProcessCompiler {
    #[tracing::instrument(skip_all, fields(fixture = %source.display()))]
    fn compile(&self, source: &Path) -> StageResult {
        self.invoker.ensure_binary()?;
        let input = File::open(source).map_err(|e| self.invoker.spawn_failure(e))?;
        self.invoker.invoke(Command::new(&self.invoker.binary), Stdio::from(input))
    }
}

/// Writes assembly to a scoped `.asm` file and runs the interpreter on it.
#[derive(Debug, Clone)]
pub struct ProcessInterpreter {
    invoker: Invoker,
    scratch_dir: Option<PathBuf>,
}

impl ProcessInterpreter {
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            invoker: Invoker {
                stage: Stage::Interpreter,
                binary: binary.into(),
                timeout,
                check_exit_status: false,
            },
            scratch_dir: None,
        }
    }

    pub fn from_config(config: &HarnessConfig) -> Self {
        let interpreter =
            Self::new(&config.interpreter, config.timeout).with_check_exit_status(config.check_exit_status);
        match config.scratch_dir() {
            Some(dir) => interpreter.with_scratch_dir(dir),
            None => interpreter,
        }
    }

    pub fn with_check_exit_status(mut self, check: bool) -> Self {
        self.invoker.check_exit_status = check;
        self
    }

    /// Create assembly files in `dir` instead of the system temp dir
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    /// Write `assembly` to a fresh `.asm` file. The handle is closed on return; the path is removed when the
    /// returned guard drops.
    fn write_assembly(&self, assembly: &str) -> io::Result<TempPath> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("goldrun-").suffix(".asm");
        let mut file = match &self.scratch_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        file.write_all(assembly.as_bytes())?;
        file.flush()?;
        Ok(file.into_temp_path())
    }
}

impl ExecuteStage for ProcessInterpreter {
    #[tracing::instrument(skip_all, fields(assembly_len = assembly.len()))]
    fn execute(&self, assembly: &str) -> StageResult {
        let asm_path = self
            .write_assembly(assembly)
            .map_err(|e| self.invoker.spawn_failure(format!("cannot write assembly file: {e}")))?;
        // `asm_path` is removed on every return below, including the missing-binary check
        self.invoker.ensure_binary()?;

        let mut command = Command::new(&self.invoker.binary);
        command.arg(&*asm_path);
        self.invoker.invoke(command, Stdio::null())
    }
}
