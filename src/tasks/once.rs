//! # One-shot task (`TaskOnce`)
//!
//! [`TaskOnce`] wraps an `FnOnce` body and guarantees at most one activation.
//! The first activation consumes the closure; any later activation fails with
//! [`TaskError::AlreadyStarted`] instead of silently re-running. Stream
//! captures are built on this: a child-process stream endpoint can only be
//! handed to caller logic once.

use std::borrow::Cow;
use std::future::Future;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::tasks::task::Task;

/// `FnOnce`-backed task: the body is consumed by the first activation.
pub struct TaskOnce<F> {
    name: Cow<'static, str>,
    f: Mutex<Option<F>>,
}

impl<F> TaskOnce<F> {
    /// Creates a new one-shot task.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f: Mutex::new(Some(f)),
        }
    }

    /// Creates the task and returns it as a shared handle (`Arc<Self>`).
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut, T> Task for TaskOnce<F>
where
    F: FnOnce(CancellationToken) -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
    T: Send + 'static,
{
    type Output = T;

    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: CancellationToken) -> Result<T, TaskError> {
        // Take the body outside of any await so the lock is never held across one.
        let f = {
            let mut slot = self.f.lock().unwrap_or_else(|p| p.into_inner());
            slot.take()
        };
        match f {
            Some(f) => f(ctx).await,
            None => Err(TaskError::AlreadyStarted),
        }
    }
}
