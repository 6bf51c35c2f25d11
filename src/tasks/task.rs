//! # Task abstraction.
//!
//! This module defines the [`Task`] trait (async, cancelable, typed output).
//! The common handle type is [`TaskRef`], an `Arc<dyn Task>` suitable for
//! sharing between a scheduler driver and its callers.
//!
//! A task receives a [`CancellationToken`] and should periodically check it to
//! stop cooperatively when its handle is canceled. The scheduler additionally
//! drops the activation future when cancellation fires, so an activation
//! blocked on tokio I/O is interrupted promptly even if it never looks at the
//! token.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// Shared handle to a task with output `T`.
pub type TaskRef<T> = Arc<dyn Task<Output = T>>;

/// # Asynchronous, cancelable unit of work.
///
/// A `Task` has a stable [`name`](Task::name) and an async [`run`](Task::run)
/// method that receives a [`CancellationToken`] and produces a typed output.
/// Repeating schedules activate the same task again after the previous
/// activation returned; implementations that must not run twice should be
/// wrapped in [`TaskOnce`](crate::TaskOnce).
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use async_trait::async_trait;
/// use procap::{Task, TaskError};
///
/// struct Demo;
///
/// #[async_trait]
/// impl Task for Demo {
///     type Output = u32;
///
///     fn name(&self) -> &str { "demo" }
///
///     async fn run(&self, ctx: CancellationToken) -> Result<u32, TaskError> {
///         if ctx.is_cancelled() {
///             return Err(TaskError::Canceled);
///         }
///         Ok(42)
///     }
/// }
/// ```
#[async_trait]
pub trait Task: Send + Sync + 'static {
    /// Value produced by a successful activation.
    type Output: Send + 'static;

    /// Returns a stable, human-readable task name.
    fn name(&self) -> &str;

    /// Executes one activation until completion or cancellation.
    ///
    /// Implementations should check `ctx.is_cancelled()` at natural pause
    /// points and return [`TaskError::Canceled`] to exit gracefully.
    async fn run(&self, ctx: CancellationToken) -> Result<Self::Output, TaskError>;
}
