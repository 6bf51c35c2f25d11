//! # ProcessSession: launch, capture, wait, tear down.
//!
//! A session binds one external process to three stream captures with a
//! bounded lifetime:
//!
//! ```text
//! ProcessSession::start()
//!   ├─ spawn child (piped stdio)          launch error ──► Err(Launch), no captures
//!   ├─ capture_write(stdin,  stdin executor,  stdin_fn)  ──► AsyncHandle<()>
//!   ├─ capture_read(stdout,  stdout executor, stdout_fn) ──► AsyncHandle<()>
//!   └─ capture_read(stderr,  stderr executor, stderr_fn) ──► AsyncHandle<()>
//!
//! RunningSession::wait()
//!   ├─ wait for exit (bounded by the configured deadline, if any)
//!   ├─ teardown — unconditional, on every path:
//!   │    ├─ kill the child if still alive (best-effort, never masks the result)
//!   │    ├─ cancel every capture handle not yet terminal
//!   │    └─ await all three handles' terminal states
//!   └─ Ok(exit status as text) | Err(Timeout) | Err(Wait)
//! ```
//!
//! ## Rules
//! - When `wait` returns, the child is not alive and all three capture
//!   handles are terminal — no background activity survives the session.
//! - Capture outcomes are **not** folded into the session result; a stdout
//!   handler failure leaves the session's own result untouched. Callers
//!   inspect the capture handles for finer-grained diagnosis.
//! - Canceling an already-completed capture during teardown is a no-op;
//!   settled captures are never resurrected as canceled.
//! - Each child stream is owned exclusively by its capture body; only the
//!   session kills the process or cancels captures.

use std::future::Future;
use std::io;
use std::time::Duration;

use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout};
use tokio::time;

use crate::capture::{capture_read, capture_write};
use crate::error::{SessionError, TaskError};
use crate::executor::Executor;
use crate::handles::AsyncHandle;
use crate::session::command::SessionCommand;

/// Configured launcher: command, per-stream executors, optional deadline.
///
/// The three captures can be isolated onto separate worker pools so a
/// blocking one cannot starve the other two; by default all three run on the
/// executor given to [`ProcessSession::new`].
///
/// # Example
/// ```no_run
/// use procap::{Executor, ProcessSession, SessionCommand};
/// use tokio::io::AsyncWriteExt;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), procap::SessionError> {
/// let exec = Executor::current();
/// let status = ProcessSession::new(SessionCommand::new("cat"), &exec)
///     .run(
///         |mut stdin| async move {
///             stdin.write_all(b"hello\n").await?;
///             stdin.shutdown().await?;
///             Ok(())
///         },
///         |stdout| async move {
///             let _ = stdout;
///             Ok(())
///         },
///         |stderr| async move {
///             let _ = stderr;
///             Ok(())
///         },
///     )
///     .await?;
/// assert_eq!(status, "0");
/// # Ok(())
/// # }
/// ```
pub struct ProcessSession {
    command: SessionCommand,
    timeout: Option<Duration>,
    stdin_executor: Executor,
    stdout_executor: Executor,
    stderr_executor: Executor,
}

impl ProcessSession {
    /// Creates a session running all three captures on `executor`.
    pub fn new(command: SessionCommand, executor: &Executor) -> Self {
        Self {
            command,
            timeout: None,
            stdin_executor: executor.clone(),
            stdout_executor: executor.clone(),
            stderr_executor: executor.clone(),
        }
    }

    /// Bounds the exit wait. A zero duration means unbounded, matching an
    /// unset deadline.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Runs the stdin capture on its own executor.
    pub fn stdin_executor(mut self, executor: &Executor) -> Self {
        self.stdin_executor = executor.clone();
        self
    }

    /// Runs the stdout capture on its own executor.
    pub fn stdout_executor(mut self, executor: &Executor) -> Self {
        self.stdout_executor = executor.clone();
        self
    }

    /// Runs the stderr capture on its own executor.
    pub fn stderr_executor(mut self, executor: &Executor) -> Self {
        self.stderr_executor = executor.clone();
        self
    }

    /// Launches the process and starts the three captures.
    ///
    /// On launch failure no capture task is ever created and the error is
    /// returned directly.
    pub fn start<InF, InFut, OutF, OutFut, ErrF, ErrFut>(
        &self,
        stdin_fn: InF,
        stdout_fn: OutF,
        stderr_fn: ErrF,
    ) -> Result<RunningSession, SessionError>
    where
        InF: FnOnce(ChildStdin) -> InFut + Send + 'static,
        InFut: Future<Output = Result<(), TaskError>> + Send + 'static,
        OutF: FnOnce(ChildStdout) -> OutFut + Send + 'static,
        OutFut: Future<Output = Result<(), TaskError>> + Send + 'static,
        ErrF: FnOnce(ChildStderr) -> ErrFut + Send + 'static,
        ErrFut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        let program = self.command.program_name();
        let mut child = self
            .command
            .build()
            .spawn()
            .map_err(|e| SessionError::Launch {
                program: program.clone(),
                source: e,
            })?;

        let stdin = take_stream(&mut child, |c| c.stdin.take(), &program, "stdin")?;
        let stdout = take_stream(&mut child, |c| c.stdout.take(), &program, "stdout")?;
        let stderr = take_stream(&mut child, |c| c.stderr.take(), &program, "stderr")?;

        Ok(RunningSession {
            child,
            timeout: self.timeout,
            stdin: capture_write(stdin, &self.stdin_executor, stdin_fn),
            stdout: capture_read(stdout, &self.stdout_executor, stdout_fn),
            stderr: capture_read(stderr, &self.stderr_executor, stderr_fn),
        })
    }

    /// Convenience composition of [`start`](Self::start) and
    /// [`RunningSession::wait`].
    pub async fn run<InF, InFut, OutF, OutFut, ErrF, ErrFut>(
        &self,
        stdin_fn: InF,
        stdout_fn: OutF,
        stderr_fn: ErrF,
    ) -> Result<String, SessionError>
    where
        InF: FnOnce(ChildStdin) -> InFut + Send + 'static,
        InFut: Future<Output = Result<(), TaskError>> + Send + 'static,
        OutF: FnOnce(ChildStdout) -> OutFut + Send + 'static,
        OutFut: Future<Output = Result<(), TaskError>> + Send + 'static,
        ErrF: FnOnce(ChildStderr) -> ErrFut + Send + 'static,
        ErrFut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        self.start(stdin_fn, stdout_fn, stderr_fn)?.wait().await
    }
}

/// A launched child process plus its three capture handles.
///
/// Clone the handles before calling [`wait`](Self::wait) to observe each
/// capture's individual outcome afterwards.
pub struct RunningSession {
    child: Child,
    timeout: Option<Duration>,
    stdin: AsyncHandle<()>,
    stdout: AsyncHandle<()>,
    stderr: AsyncHandle<()>,
}

impl std::fmt::Debug for RunningSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunningSession")
            .field("id", &self.child.id())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl RunningSession {
    /// Handle of the stdin capture.
    pub fn stdin_capture(&self) -> AsyncHandle<()> {
        self.stdin.clone()
    }

    /// Handle of the stdout capture.
    pub fn stdout_capture(&self) -> AsyncHandle<()> {
        self.stdout.clone()
    }

    /// Handle of the stderr capture.
    pub fn stderr_capture(&self) -> AsyncHandle<()> {
        self.stderr.clone()
    }

    /// OS process id, while the child has not been reaped.
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Waits for process exit, then tears the session down unconditionally.
    ///
    /// On return the child is not alive and all three capture handles are
    /// terminal. The result classifies only the session itself: exit status
    /// as text on success, [`SessionError::Timeout`] when the deadline
    /// passed, [`SessionError::Wait`] for other wait failures.
    pub async fn wait(mut self) -> Result<String, SessionError> {
        let result = self.wait_for_exit().await;
        self.teardown().await;
        result
    }

    async fn wait_for_exit(&mut self) -> Result<String, SessionError> {
        match self.timeout.filter(|d| *d > Duration::ZERO) {
            Some(deadline) => match time::timeout(deadline, self.child.wait()).await {
                Ok(Ok(status)) => Ok(render_status(status)),
                Ok(Err(e)) => Err(SessionError::Wait { source: e }),
                Err(_elapsed) => Err(SessionError::Timeout { timeout: deadline }),
            },
            None => match self.child.wait().await {
                Ok(status) => Ok(render_status(status)),
                Err(e) => Err(SessionError::Wait { source: e }),
            },
        }
    }

    /// Best-effort teardown; errors here never replace the primary result.
    async fn teardown(&mut self) {
        if matches!(self.child.try_wait(), Ok(None) | Err(_)) {
            let _ = self.child.kill().await;
        }
        for handle in [&self.stdin, &self.stdout, &self.stderr] {
            if !handle.is_terminal() {
                handle.cancel();
            }
        }
        self.stdin.wait().await;
        self.stdout.wait().await;
        self.stderr.wait().await;
    }
}

/// Renders an exit status as text: the exit code when present, otherwise the
/// platform's own description (signal deaths on unix).
fn render_status(status: std::process::ExitStatus) -> String {
    match status.code() {
        Some(code) => code.to_string(),
        None => status.to_string(),
    }
}

fn take_stream<T>(
    child: &mut Child,
    take: impl FnOnce(&mut Child) -> Option<T>,
    program: &str,
    name: &str,
) -> Result<T, SessionError> {
    match take(child) {
        Some(stream) => Ok(stream),
        None => {
            // Should not happen with piped stdio; fail the launch rather
            // than run a session missing a stream.
            let _ = child.start_kill();
            Err(SessionError::Launch {
                program: program.to_string(),
                source: io::Error::other(format!("child {name} was not captured")),
            })
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

    fn sh(script: &str) -> SessionCommand {
        SessionCommand::new("/bin/sh").arg("-c").arg(script)
    }

    type BoxCaptureFut = std::pin::Pin<Box<dyn Future<Output = Result<(), TaskError>> + Send>>;

    fn line_sink() -> (
        Arc<Mutex<Vec<String>>>,
        impl FnOnce(ChildStdout) -> BoxCaptureFut + Send + 'static,
    ) {
        let lines: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = lines.clone();
        let f = move |stdout: ChildStdout| -> BoxCaptureFut {
            Box::pin(async move {
                let mut reader = BufReader::new(stdout).lines();
                while let Some(line) = reader.next_line().await? {
                    sink.lock().unwrap().push(line);
                }
                Ok(())
            })
        };
        (lines, f)
    }

    async fn drain_stderr(stderr: ChildStderr) -> Result<(), TaskError> {
        let mut reader = BufReader::new(stderr).lines();
        while reader.next_line().await?.is_some() {}
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_exit_zero_with_stdin_closed_immediately() {
        let exec = Executor::current();
        let session = ProcessSession::new(sh("exit 0"), &exec);
        let running = session
            .start(
                |stdin| async move {
                    drop(stdin);
                    Ok(())
                },
                |_stdout| async move { Ok(()) },
                drain_stderr,
            )
            .unwrap();

        let stdin = running.stdin_capture();
        let stdout = running.stdout_capture();
        let stderr = running.stderr_capture();

        let status = running.wait().await.unwrap();
        assert_eq!(status, "0");
        for h in [&stdin, &stdout, &stderr] {
            assert!(h.is_terminal());
            assert!(!h.is_failed());
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_stdout_lines_are_captured() {
        let exec = Executor::current();
        let (lines, stdout_fn) = line_sink();
        let running = ProcessSession::new(sh("printf 'alpha\\nbeta\\n'"), &exec)
            .start(
                |stdin| async move {
                    drop(stdin);
                    Ok(())
                },
                stdout_fn,
                drain_stderr,
            )
            .unwrap();

        // Let the reader drain to EOF before teardown may cancel it.
        let stdout = running.stdout_capture();
        stdout.wait().await;

        let status = running.wait().await.unwrap();
        assert_eq!(status, "0");
        assert!(stdout.is_succeeded());
        assert_eq!(*lines.lock().unwrap(), vec!["alpha", "beta"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_stderr_and_nonzero_exit() {
        let exec = Executor::current();
        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let running = ProcessSession::new(sh("echo oops >&2; exit 3"), &exec)
            .start(
                |stdin| async move {
                    drop(stdin);
                    Ok(())
                },
                |_stdout| async move { Ok(()) },
                move |stderr| async move {
                    let mut reader = BufReader::new(stderr).lines();
                    while let Some(line) = reader.next_line().await? {
                        sink.lock().unwrap().push(line);
                    }
                    Ok(())
                },
            )
            .unwrap();

        running.stderr_capture().wait().await;
        let status = running.wait().await.unwrap();

        // A non-zero exit is still a session success; the code is the payload.
        assert_eq!(status, "3");
        assert_eq!(*seen.lock().unwrap(), vec!["oops"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_timeout_kills_process_and_settles_captures() {
        let exec = Executor::current();
        let session = ProcessSession::new(sh("sleep 30"), &exec).timeout(Duration::from_millis(100));
        let running = session
            .start(
                |stdin| async move {
                    // Keep stdin open so nothing ends early on its own.
                    let mut stdin = stdin;
                    stdin.flush().await?;
                    std::future::pending::<()>().await;
                    Ok(())
                },
                |_stdout| async move {
                    std::future::pending::<()>().await;
                    Ok(())
                },
                drain_stderr,
            )
            .unwrap();

        let stdin = running.stdin_capture();
        let stdout = running.stdout_capture();
        let stderr = running.stderr_capture();
        assert!(running.id().is_some(), "child is alive, so it has a pid");
        assert!(format!("{running:?}").contains("RunningSession"));

        let err = running.wait().await.unwrap_err();
        assert!(err.is_timeout(), "expected timeout, got {err:?}");
        for h in [&stdin, &stdout, &stderr] {
            assert!(h.is_terminal(), "all captures must settle before wait returns");
        }
        assert!(stdin.is_canceled());
        assert!(stdout.is_canceled());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_launch_failure_creates_no_captures() {
        let exec = Executor::current();
        let session = ProcessSession::new(SessionCommand::new("no-such-binary-for-procap"), &exec);
        let err = session
            .start(
                |stdin| async move {
                    drop(stdin);
                    Ok(())
                },
                |_stdout| async move { Ok(()) },
                drain_stderr,
            )
            .unwrap_err();

        match err {
            SessionError::Launch { program, .. } => {
                assert_eq!(program, "no-such-binary-for-procap");
            }
            other => panic!("expected Launch, got {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_capture_failure_does_not_fail_session() {
        let exec = Executor::current();
        let session = ProcessSession::new(sh("exit 0"), &exec);
        let running = session
            .start(
                |stdin| async move {
                    drop(stdin);
                    Ok(())
                },
                |_stdout| async move { Err(TaskError::fail("stdout handler broke")) },
                drain_stderr,
            )
            .unwrap();

        let stdout = running.stdout_capture();
        let status = running.wait().await.unwrap();

        assert_eq!(status, "0");
        assert!(stdout.is_failed(), "failure stays contained in the capture");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_captures_on_separate_executors() {
        let stdout_rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let stderr_rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();

        let exec = Executor::current();
        let (lines, stdout_fn) = line_sink();
        let running = ProcessSession::new(sh("printf 'isolated\\n'"), &exec)
            .stdout_executor(&Executor::from_handle(stdout_rt.handle().clone()))
            .stderr_executor(&Executor::from_handle(stderr_rt.handle().clone()))
            .start(
                |stdin| async move {
                    drop(stdin);
                    Ok(())
                },
                stdout_fn,
                drain_stderr,
            )
            .unwrap();

        running.stdout_capture().wait().await;
        let status = running.wait().await.unwrap();

        assert_eq!(status, "0");
        assert_eq!(*lines.lock().unwrap(), vec!["isolated"]);
        stdout_rt.shutdown_background();
        stderr_rt.shutdown_background();
    }
}
