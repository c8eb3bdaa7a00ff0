//! Runs external commands with captured output and a hard deadline.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::error::RunError;

// NOTE: How long to keep reading pipes once the child is gone. Background
// descendants can hold them open indefinitely; whatever arrived by then is kept.
const DRAIN_GRACE: Duration = Duration::from_secs(1);

type Captured = Arc<Mutex<Vec<u8>>>;

/// One external command execution, fixed at construction.
#[derive(Debug, Clone)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
    dir: PathBuf,
    deadline: Instant,
}

impl Invocation {
    pub fn new(program: impl Into<String>, dir: impl Into<PathBuf>, deadline: Instant) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            dir: dir.into(),
            deadline,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Space-joined program and arguments, for diagnostics only.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Captured streams plus the outcome of one invocation.
#[derive(Debug)]
pub struct InvocationResult {
    pub stdout: String,
    pub stderr: String,
    pub outcome: Result<(), RunError>,
}

impl InvocationResult {
    pub fn success(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            outcome: Ok(()),
        }
    }

    pub fn failure(stdout: impl Into<String>, stderr: impl Into<String>, cause: RunError) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            outcome: Err(cause),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation) -> InvocationResult;
}

/// Spawns real processes through tokio.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation) -> InvocationResult {
        run(invocation).await
    }
}

/// Executes `invocation` and traces the command with both captured streams
/// before handing the result back, whatever the outcome.
pub async fn run(invocation: &Invocation) -> InvocationResult {
    let result = execute(invocation).await;

    match &result.outcome {
        Ok(()) => tracing::info!(
            command = %invocation.program,
            args = ?invocation.args,
            dir = %invocation.dir.display(),
            stdout = %result.stdout,
            stderr = %result.stderr,
            "command succeeded"
        ),
        Err(cause) => tracing::info!(
            command = %invocation.program,
            args = ?invocation.args,
            dir = %invocation.dir.display(),
            stdout = %result.stdout,
            stderr = %result.stderr,
            error = %cause,
            "command failed"
        ),
    }

    result
}

async fn execute(invocation: &Invocation) -> InvocationResult {
    let spawned = Command::new(&invocation.program)
        .args(&invocation.args)
        .current_dir(&invocation.dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn();

    let mut child = match spawned {
        Ok(child) => child,
        Err(e) => return InvocationResult::failure("", "", RunError::Spawn(e)),
    };

    let (stdout, stdout_reader) = capture(child.stdout.take());
    let (stderr, stderr_reader) = capture(child.stderr.take());

    let waited = tokio::time::timeout_at(invocation.deadline, child.wait()).await;
    let outcome = match waited {
        Ok(Ok(status)) if status.success() => Ok(()),
        Ok(Ok(status)) => Err(RunError::Exit {
            code: status.code(),
        }),
        Ok(Err(e)) => Err(RunError::Wait(e)),
        Err(_) => {
            if let Err(e) = child.kill().await {
                tracing::warn!(command = %invocation.program, error = %e, "failed to kill timed-out process");
            }
            Err(RunError::DeadlineExceeded)
        }
    };

    let read_until = match outcome {
        Err(RunError::DeadlineExceeded) => Instant::now() + DRAIN_GRACE,
        _ => (Instant::now() + DRAIN_GRACE).min(invocation.deadline),
    };

    InvocationResult {
        stdout: collect(stdout, stdout_reader, read_until).await,
        stderr: collect(stderr, stderr_reader, read_until).await,
        outcome,
    }
}

fn capture<R>(pipe: Option<R>) -> (Captured, Option<JoinHandle<()>>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let buf = Captured::default();
    let reader = pipe.map(|pipe| tokio::spawn(drain(pipe, Arc::clone(&buf))));
    (buf, reader)
}

async fn drain<R>(mut pipe: R, buf: Captured)
where
    R: AsyncRead + Unpin,
{
    let mut chunk = [0u8; 8192];
    loop {
        match pipe.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => lock(&buf).extend_from_slice(&chunk[..n]),
        }
    }
}

/// Waits for the reader until `until`, then returns everything captured so
/// far, whether or not the pipe reached EOF.
async fn collect(buf: Captured, reader: Option<JoinHandle<()>>, until: Instant) -> String {
    if let Some(mut handle) = reader {
        match tokio::time::timeout_at(until, &mut handle).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "output reader task failed"),
            Err(_) => handle.abort(),
        }
    }

    let text = String::from_utf8_lossy(&lock(&buf)).into_owned();
    text
}

fn lock(buf: &Captured) -> MutexGuard<'_, Vec<u8>> {
    buf.lock().unwrap_or_else(PoisonError::into_inner)
}
