//! Bounded subprocess execution
//!
//! The child runs in its own process group. Its stdout and stderr are drained on helper threads while the calling
//! thread polls for exit against a wall-clock deadline, and the drained bytes are collected against the same
//! deadline: a background process that inherited the pipes cannot stretch a stage past its budget. On expiry the
//! whole group is killed and the child is reaped before returning, so a timed-out stage leaves neither a zombie nor
//! an orphan behind.

use std::io::{self, Read};
#[cfg(unix)]
use std::os::unix::process::CommandExt;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(5);

type Reader = Receiver<io::Result<Vec<u8>>>;

/// Output of a child that exited within its budget
#[derive(Debug)]
pub struct CapturedOutput {
    pub status: ExitStatus,
    /// `None` when stdout could not be captured at all (as opposed to an empty capture)
    pub stdout: Option<String>,
    pub stderr: String,
    pub elapsed: Duration,
}

#[derive(Debug)]
pub enum RunError {
    /// The child (or something it started) outlived the budget and was killed
    TimedOut(Duration),
    /// Spawning or waiting on the child failed
    Io(io::Error),
}

impl From<io::Error> for RunError {
    fn from(e: io::Error) -> Self {
        RunError::Io(e)
    }
}

/// A pipe was still open when the deadline passed
struct PipeHeld;

/// Run `command` to completion with `stdin`, capturing stdout/stderr, killing its process group after `timeout`.
pub fn run_bounded(mut command: Command, stdin: Stdio, timeout: Duration) -> Result<CapturedOutput, RunError> {
    let start = Instant::now();
    let deadline = start.checked_add(timeout);

    command.stdin(stdin).stdout(Stdio::piped()).stderr(Stdio::piped());
    #[cfg(unix)]
    command.process_group(0);
    let mut child = command.spawn()?;

    let stdout_reader = child.stdout.take().map(spawn_reader);
    let stderr_reader = child.stderr.take().map(spawn_reader);

    let status = match wait_with_deadline(&mut child, deadline) {
        Ok(Some(status)) => status,
        // Readers are detached; the group is dead so the pipes close shortly
        Ok(None) => return Err(RunError::TimedOut(timeout)),
        Err(e) => {
            kill_group(&mut child);
            let _ = child.wait();
            return Err(RunError::Io(e));
        }
    };

    let collected = collect(stdout_reader, deadline)
        .and_then(|stdout| Ok((stdout, collect(stderr_reader, deadline)?)));
    let (stdout, stderr) = match collected {
        Ok(output) => output,
        Err(PipeHeld) => {
            tracing::warn!(pid = child.id(), "child exited but its output pipes are still held open");
            kill_group(&mut child);
            return Err(RunError::TimedOut(timeout));
        }
    };

    Ok(CapturedOutput {
        status,
        stdout,
        stderr: stderr.unwrap_or_default(),
        elapsed: start.elapsed(),
    })
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> Reader {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let read = pipe.read_to_end(&mut buf).map(|_| buf);
        // The receiver is gone once the stage has timed out
        let _ = tx.send(read);
    });
    rx
}

/// Receive everything a reader drained, giving up at `deadline`.
fn collect(reader: Option<Reader>, deadline: Option<Instant>) -> Result<Option<String>, PipeHeld> {
    let Some(reader) = reader else {
        return Ok(None);
    };
    let received = match deadline {
        Some(deadline) => reader.recv_timeout(deadline.saturating_duration_since(Instant::now())),
        None => reader.recv().map_err(|_| RecvTimeoutError::Disconnected),
    };
    match received {
        Ok(Ok(bytes)) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "failed to read child output");
            Ok(None)
        }
        Err(RecvTimeoutError::Timeout) => Err(PipeHeld),
        Err(RecvTimeoutError::Disconnected) => Ok(None),
    }
}

/// Poll `child` until it exits (`Some`) or the deadline passes (`None`, group killed and child reaped).
fn wait_with_deadline(child: &mut Child, deadline: Option<Instant>) -> io::Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            kill_group(child);
            child.wait()?;
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// SIGKILL the process group led by `child`, falling back to the child alone.
#[cfg(unix)]
#[allow(unsafe_code)]
fn kill_group(child: &mut Child) {
    let Ok(pgid) = i32::try_from(child.id()) else {
        let _ = child.kill();
        return;
    };
    // SAFETY: kill(2) takes plain integers and touches no memory of ours
    let rc = unsafe { libc::kill(-pgid, libc::SIGKILL) };
    if rc == -1 {
        let err = io::Error::last_os_error();
        if err.raw_os_error() != Some(libc::ESRCH) {
            tracing::warn!(pgid, error = %err, "failed to kill process group");
        }
        let _ = child.kill();
    }
}

#[cfg(not(unix))]
fn kill_group(child: &mut Child) {
    if let Err(e) = child.kill() {
        tracing::warn!(pid = child.id(), error = %e, "failed to kill timed out child");
    }
}
