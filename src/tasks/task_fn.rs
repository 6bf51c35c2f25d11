//! # Function-backed task (`TaskFn`)
//!
//! [`TaskFn`] wraps a closure `F: Fn(CancellationToken) -> Fut`, producing a
//! fresh future per activation. This avoids shared mutable state: repeating
//! schedules call the closure again instead of reusing a half-consumed future.
//! If shared state is needed, move an `Arc<...>` into the closure explicitly.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use procap::{TaskFn, TaskRef, TaskError};
//!
//! let t: TaskRef<u32> = TaskFn::arc("worker", |ctx: CancellationToken| async move {
//!     if ctx.is_cancelled() {
//!         return Err(TaskError::Canceled);
//!     }
//!     Ok(7)
//! });
//!
//! assert_eq!(t.name(), "worker");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::tasks::task::Task;

/// Function-backed task implementation.
///
/// Wraps a closure that *creates* a new future per activation.
#[derive(Debug)]
pub struct TaskFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> TaskFn<F> {
    /// Creates a new function-backed task.
    ///
    /// Prefer [`TaskFn::arc`] when you immediately need a [`TaskRef`](crate::TaskRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self { name: name.into(), f }
    }

    /// Creates the task and returns it as a shared handle (`Arc<Self>`).
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut, T> Task for TaskFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
    T: Send + 'static,
{
    type Output = T;

    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: CancellationToken) -> Result<T, TaskError> {
        (self.f)(ctx).await
    }
}
