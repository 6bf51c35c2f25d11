//! # Raw stream capture.
//!
//! Each capture is a [`TaskOnce`] scheduled [`ScheduleSpec::Immediate`] on the
//! caller's executor: the stream endpoint is moved into the body exactly once,
//! and the returned [`AsyncHandle`] carries the body's completion or failure.
//!
//! ## Rules
//! - The stream is owned by the body for the capture's lifetime; closing or
//!   flushing it is the body's responsibility.
//! - Canceling the handle interrupts a body blocked on tokio I/O promptly
//!   (the activation is aborted at its next await point).
//! - A body failure stays contained in this capture's handle; it never
//!   affects sibling captures or their worker pools.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::executor::Executor;
use crate::handles::AsyncHandle;
use crate::scheduling::{ScheduleSpec, schedule};
use crate::tasks::TaskOnce;

/// Hands a writable byte sink to `f` on `executor`.
///
/// The returned handle settles when `f` returns: `Succeeded(())` on `Ok`,
/// `Failed` on `Err`, `Canceled` if the handle was canceled first.
///
/// # Example
/// ```
/// use tokio::io::AsyncWriteExt;
/// use procap::{capture_write, Executor};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let sink = Vec::new();
/// let handle = capture_write(sink, &Executor::current(), |mut w| async move {
///     w.write_all(b"hello").await?;
///     w.shutdown().await?;
///     Ok(())
/// });
/// assert!(handle.wait().await.value().is_some());
/// # }
/// ```
pub fn capture_write<W, F, Fut>(writer: W, executor: &Executor, f: F) -> AsyncHandle<()>
where
    W: Send + 'static,
    F: FnOnce(W) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    capture_endpoint("capture-write", writer, executor, f)
}

/// Hands a readable byte source to `f` on `executor`.
///
/// Symmetric to [`capture_write`]; see there for settlement rules.
pub fn capture_read<R, F, Fut>(reader: R, executor: &Executor, f: F) -> AsyncHandle<()>
where
    R: Send + 'static,
    F: FnOnce(R) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    capture_endpoint("capture-read", reader, executor, f)
}

fn capture_endpoint<S, F, Fut>(
    name: &'static str,
    stream: S,
    executor: &Executor,
    f: F,
) -> AsyncHandle<()>
where
    S: Send + 'static,
    F: FnOnce(S) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    let task = TaskOnce::arc(name, move |_ctx: CancellationToken| f(stream));
    schedule(task, ScheduleSpec::Immediate, executor)
}
