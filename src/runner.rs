//! External interpreter process runner.
//!
//! One call to [`run`] owns exactly one child process: it is spawned with
//! stdin closed and both output streams piped, both pipes are drained
//! concurrently, and the exit status is collected once they close.

use std::ffi::OsString;
use std::process::Stdio;
use std::time::Duration;

use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

/// Read size for draining child pipes.
const CHUNK_BYTES: usize = 8 * 1024;

/// The interpreter command a snippet is handed to.
///
/// The process is started as `program args... <snippet>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpreter {
    pub program: OsString,
    pub args: Vec<OsString>,
}

impl Interpreter {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// `python3 -c <snippet>`
    pub fn python3() -> Self {
        Self::new("python3").arg("-c")
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::python3()
    }
}

/// Optional resource ceilings for one invocation. `None` means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunLimits {
    /// Per-stream byte ceiling for captured stdout and stderr.
    pub max_output_bytes: Option<usize>,
    /// Wall-clock ceiling for the whole invocation.
    pub timeout: Option<Duration>,
}

impl RunLimits {
    pub fn unbounded() -> Self {
        Self::default()
    }
}

/// Result of running the interpreter once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvocationOutcome {
    /// `None` when the process was ended by a signal.
    #[serde(rename = "exitCode")]
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl InvocationOutcome {
    fn from_capture(exit_code: Option<i32>, stdout: &[u8], stderr: &[u8]) -> Self {
        Self {
            exit_code,
            stdout: String::from_utf8_lossy(stdout).into_owned(),
            stderr: String::from_utf8_lossy(stderr).into_owned(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// The interpreter could not be started at all.
    #[error("{0}")]
    Spawn(#[source] std::io::Error),
    #[error("Process timed out after {}ms", .after.as_millis())]
    Timeout {
        after: Duration,
        partial: InvocationOutcome,
    },
    #[error("Process output exceeded {limit} bytes")]
    OutputLimit {
        limit: usize,
        partial: InvocationOutcome,
    },
    /// Reading a pipe or waiting on the process failed after a successful spawn.
    #[error("Process I/O error: {0}")]
    Io(#[source] std::io::Error),
}

impl RunError {
    /// Output captured before a ceiling stopped the process, if any.
    pub fn partial(&self) -> Option<&InvocationOutcome> {
        match self {
            Self::Timeout { partial, .. } | Self::OutputLimit { partial, .. } => Some(partial),
            Self::Spawn(_) | Self::Io(_) => None,
        }
    }
}

/// Why draining stopped before the process exited on its own.
enum Halt {
    Timeout,
    OutputLimit(usize),
    Io(std::io::Error),
}

/// Run `code` through `interpreter` and capture its output.
///
/// Nonzero exit codes and stderr output are returned as a normal outcome;
/// only failure to start, a tripped ceiling, or pipe I/O failure is an error.
pub async fn run(
    interpreter: &Interpreter,
    code: &str,
    limits: RunLimits,
) -> Result<InvocationOutcome, RunError> {
    let mut child = Command::new(&interpreter.program)
        .args(&interpreter.args)
        .arg(code)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(RunError::Spawn)?;

    tracing::debug!(
        program = ?interpreter.program,
        pid = child.id(),
        "spawned interpreter"
    );

    let stdout = child.stdout.take().ok_or_else(|| missing_pipe("stdout"))?;
    let stderr = child.stderr.take().ok_or_else(|| missing_pipe("stderr"))?;

    let mut out = Vec::new();
    let mut err = Vec::new();

    let drained = {
        let drain = async {
            tokio::try_join!(
                pump(stdout, &mut out, limits.max_output_bytes),
                pump(stderr, &mut err, limits.max_output_bytes),
            )?;
            child.wait().await.map_err(Halt::Io)
        };
        match limits.timeout {
            Some(after) => match tokio::time::timeout(after, drain).await {
                Ok(result) => result,
                Err(_) => Err(Halt::Timeout),
            },
            None => drain.await,
        }
    };

    match drained {
        Ok(status) => {
            tracing::debug!(exit_code = ?status.code(), "interpreter exited");
            Ok(InvocationOutcome::from_capture(status.code(), &out, &err))
        }
        Err(halt) => {
            // Ceiling tripped or a pipe failed: the process must not outlive the call.
            if let Err(e) = child.kill().await {
                tracing::warn!("Failed to kill interpreter: {e}");
            }
            let partial = InvocationOutcome::from_capture(None, &out, &err);
            Err(match halt {
                Halt::Timeout => RunError::Timeout {
                    after: limits.timeout.unwrap_or_default(),
                    partial,
                },
                Halt::OutputLimit(limit) => RunError::OutputLimit { limit, partial },
                Halt::Io(e) => RunError::Io(e),
            })
        }
    }
}

/// Copy `src` into `buf` until EOF, stopping once `buf` would exceed `limit`.
async fn pump<R: AsyncRead + Unpin>(
    mut src: R,
    buf: &mut Vec<u8>,
    limit: Option<usize>,
) -> Result<(), Halt> {
    let mut chunk = [0u8; CHUNK_BYTES];
    loop {
        let n = src.read(&mut chunk).await.map_err(Halt::Io)?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(limit) = limit {
            if buf.len() > limit {
                buf.truncate(limit);
                return Err(Halt::OutputLimit(limit));
            }
        }
    }
}

fn missing_pipe(name: &str) -> RunError {
    RunError::Io(std::io::Error::new(
        std::io::ErrorKind::BrokenPipe,
        format!("child {name} was not captured"),
    ))
}
