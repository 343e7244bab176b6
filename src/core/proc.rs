//! The l process runner.
//!
//! Every external tool is described by an [Invocation]: a program name, a list of literal
//! arguments and a [TimeoutClass]. Arguments are handed to the OS as separate `OsStr`
//! values and never joined into a shell string, so file names can contain anything.
//!
//! Three ways of running a tool are provided:
//! - [capture]: stdout and stderr are collected, the wait is bounded by the timeout class.
//! - [forward]: stdout goes straight to the terminal, stderr is collected, bounded wait.
//! - [interactive]: a pager owning the terminal. Not bounded, the user decides when it ends.
//!
//! [page] feeds already captured output into a pager.
//!
//! Failures come back as [ToolError]: missing tool, timeout, non-zero exit or an OS error.

use crate::core::limits::{
    DRAIN_GRACE, POLL_INTERVAL, STDERR_SNIPPET_BYTES, TIMEOUT_PROCESSING, TIMEOUT_QUICK,
    TIMEOUT_RENDERING,
};
use crate::utils::truncate_lossy;

use crossbeam_channel::{Receiver, bounded};
use thiserror::Error;

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io::{self, Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Timeout class of an external tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutClass {
    /// Fast metadata tools: validators, formatters of small files, type detectors.
    Quick,
    /// Tools that extract or analyze substantial content.
    Processing,
    /// Tools producing formatted terminal output.
    Rendering,
}

/// Timeout bound for each [TimeoutClass].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub quick: Duration,
    pub processing: Duration,
    pub rendering: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Timeouts {
            quick: TIMEOUT_QUICK,
            processing: TIMEOUT_PROCESSING,
            rendering: TIMEOUT_RENDERING,
        }
    }
}

impl Timeouts {
    /// The same bound for every class.
    pub fn uniform(bound: Duration) -> Self {
        Timeouts {
            quick: bound,
            processing: bound,
            rendering: bound,
        }
    }

    pub fn bound(&self, class: TimeoutClass) -> Duration {
        match class {
            TimeoutClass::Quick => self.quick,
            TimeoutClass::Processing => self.processing,
            TimeoutClass::Rendering => self.rendering,
        }
    }
}

/// A single external command: program, literal arguments and timeout class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: String,
    args: Vec<OsString>,
    class: TimeoutClass,
}

impl Invocation {
    pub fn new(program: impl Into<String>, class: TimeoutClass) -> Self {
        Invocation {
            program: program.into(),
            args: Vec::new(),
            class,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Appends `arg` only when `cond` holds.
    pub fn arg_if(self, cond: bool, arg: impl AsRef<OsStr>) -> Self {
        if cond { self.arg(arg) } else { self }
    }

    #[inline]
    pub fn program(&self) -> &str {
        &self.program
    }

    #[inline]
    pub fn class(&self) -> TimeoutClass {
        self.class
    }

    /// Program followed by its arguments, exactly as handed to the OS.
    pub fn argv(&self) -> Vec<OsString> {
        std::iter::once(OsString::from(&self.program))
            .chain(self.args.iter().cloned())
            .collect()
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Output collected from a finished tool.
#[derive(Debug, Default, Clone)]
pub struct Captured {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Why an external tool could not produce its output.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("'{tool}' was not found in PATH")]
    Missing { tool: String },

    #[error("'{tool}' timed out after {bound:?}")]
    Timeout { tool: String, bound: Duration },

    #[error("'{tool}' exited with {}{}", describe_code(*.code), describe_stderr(.stderr))]
    Failed {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("failed to run '{tool}'")]
    Io {
        tool: String,
        #[source]
        source: io::Error,
    },
}

impl ToolError {
    pub fn missing(tool: &str) -> Self {
        ToolError::Missing {
            tool: tool.to_owned(),
        }
    }

    pub fn tool(&self) -> &str {
        match self {
            ToolError::Missing { tool }
            | ToolError::Timeout { tool, .. }
            | ToolError::Failed { tool, .. }
            | ToolError::Io { tool, .. } => tool,
        }
    }

    /// Exit code reported when this error ends the program.
    ///
    /// The tool's own status when it has one, otherwise the shell conventions
    /// (127 command not found, 124 timed out).
    pub fn exit_code(&self) -> i32 {
        match self {
            ToolError::Missing { .. } => 127,
            ToolError::Timeout { .. } => 124,
            ToolError::Failed {
                code: Some(code), ..
            } if *code != 0 => *code,
            _ => 1,
        }
    }
}

/// Runs `inv` with stdout and stderr captured, bounded by its timeout class.
///
/// A non-zero exit is reported as [ToolError::Failed] carrying the truncated stderr.
pub fn capture(inv: &Invocation, timeouts: &Timeouts) -> Result<Captured, ToolError> {
    let mut cmd = inv.command();
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let bound = timeouts.bound(inv.class());
    let start = Instant::now();
    let mut child = spawn(&mut cmd, inv.program())?;
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = wait_bounded(&mut child, inv.program(), bound)?;
    let deadline = drain_deadline(start, bound);

    // a leftover grandchild can keep stdout open after the tool itself exited
    let Some(stdout) = collect(stdout, deadline) else {
        return Err(ToolError::Timeout {
            tool: inv.program().to_owned(),
            bound,
        });
    };
    let captured = Captured {
        stdout,
        stderr: collect(stderr, deadline).unwrap_or_default(),
    };

    if !status.success() {
        return Err(failed(inv.program(), status, &captured.stderr));
    }
    Ok(captured)
}

/// Runs `inv` with stdout going straight to ours, bounded by its timeout class.
///
/// Stderr is collected so a failure can be reported with it.
pub fn forward(inv: &Invocation, timeouts: &Timeouts) -> Result<i32, ToolError> {
    let mut cmd = inv.command();
    cmd.stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::piped());

    let bound = timeouts.bound(inv.class());
    let start = Instant::now();
    let mut child = spawn(&mut cmd, inv.program())?;
    let stderr = drain(child.stderr.take());

    let status = wait_bounded(&mut child, inv.program(), bound)?;
    if !status.success() {
        let stderr = collect(stderr, drain_deadline(start, bound)).unwrap_or_default();
        return Err(failed(inv.program(), status, &stderr));
    }
    Ok(0)
}

/// Runs `inv` with all standard streams inherited and no timeout.
///
/// Meant for pagers, which run for as long as the user keeps reading.
pub fn interactive(inv: &Invocation) -> Result<i32, ToolError> {
    let mut cmd = inv.command();
    let mut child = spawn(&mut cmd, inv.program())?;
    let status = child.wait().map_err(|source| ToolError::Io {
        tool: inv.program().to_owned(),
        source,
    })?;
    if !status.success() {
        return Err(failed(inv.program(), status, &[]));
    }
    Ok(0)
}

/// Feeds `content` to a pager on its stdin and waits for the user to leave it.
///
/// A pager quitting before it read everything is not an error.
pub fn page(content: &[u8], pager: &Invocation) -> Result<i32, ToolError> {
    let mut cmd = pager.command();
    cmd.stdin(Stdio::piped());

    let mut child = spawn(&mut cmd, pager.program())?;
    if let Some(mut stdin) = child.stdin.take() {
        match stdin.write_all(content) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {}
            Err(source) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ToolError::Io {
                    tool: pager.program().to_owned(),
                    source,
                });
            }
        }
        // stdin is dropped here, the pager sees EOF
    }

    let status = child.wait().map_err(|source| ToolError::Io {
        tool: pager.program().to_owned(),
        source,
    })?;
    if !status.success() {
        return Err(failed(pager.program(), status, &[]));
    }
    Ok(0)
}

/// Helpers:
///
/// Spawns the command, mapping a missing executable to [ToolError::Missing].
fn spawn(cmd: &mut Command, tool: &str) -> Result<Child, ToolError> {
    cmd.spawn().map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ToolError::missing(tool)
        } else {
            ToolError::Io {
                tool: tool.to_owned(),
                source,
            }
        }
    })
}

/// Polls the child until it exits or `bound` elapses. On expiry the child is killed and
/// reaped before the timeout is reported.
fn wait_bounded(child: &mut Child, tool: &str, bound: Duration) -> Result<ExitStatus, ToolError> {
    let start = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {}
            Err(source) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ToolError::Io {
                    tool: tool.to_owned(),
                    source,
                });
            }
        }

        if start.elapsed() >= bound {
            let _ = child.kill();
            let _ = child.wait();
            return Err(ToolError::Timeout {
                tool: tool.to_owned(),
                bound,
            });
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Reads a child pipe to the end on its own thread so the child never blocks on a full pipe.
///
/// The bytes arrive on the returned channel once the pipe is closed.
fn drain<R>(pipe: Option<R>) -> Option<Receiver<Vec<u8>>>
where
    R: Read + Send + 'static,
{
    pipe.map(|mut pipe| {
        let (tx, rx) = bounded(1);
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            let _ = tx.send(buf);
        });
        rx
    })
}

/// The end of the class bound, or [DRAIN_GRACE] from now when that is later.
fn drain_deadline(start: Instant, bound: Duration) -> Instant {
    (start + bound).max(Instant::now() + DRAIN_GRACE)
}

/// Waits for a drained pipe until `deadline`.
///
/// `None` when the pipe is still open by then. The reader thread is left behind, it ends
/// with whatever process holds the pipe.
fn collect(rx: Option<Receiver<Vec<u8>>>, deadline: Instant) -> Option<Vec<u8>> {
    let Some(rx) = rx else {
        return Some(Vec::new());
    };
    match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
        Ok(buf) => Some(buf),
        Err(e) => {
            tracing::debug!(error = %e, "pipe still open after the tool exited");
            None
        }
    }
}

fn failed(tool: &str, status: ExitStatus, stderr: &[u8]) -> ToolError {
    ToolError::Failed {
        tool: tool.to_owned(),
        code: status.code(),
        stderr: truncate_lossy(stderr, STDERR_SNIPPET_BYTES),
    }
}

fn describe_code(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "a signal".to_string(),
    }
}

fn describe_stderr(stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {}", stderr)
    }
}
