//! # Explicit execution context.
//!
//! [`Executor`] is a thin, clonable wrapper over a [`tokio::runtime::Handle`].
//! Every scheduling and capture call takes one explicitly — there is no hidden
//! process-wide pool. Callers that want the three stdio captures of a session
//! isolated from each other hand each capture an executor backed by a
//! different runtime.

use std::future::Future;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Execution context on which task activations and scheduler drivers run.
///
/// Cheap to clone (internally an `Arc`-backed runtime handle).
#[derive(Clone, Debug)]
pub struct Executor {
    handle: Handle,
}

impl Executor {
    /// Captures the runtime the caller is currently on.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime, same as
    /// [`Handle::current`].
    pub fn current() -> Self {
        Self {
            handle: Handle::current(),
        }
    }

    /// Wraps an explicit runtime handle.
    pub fn from_handle(handle: Handle) -> Self {
        Self { handle }
    }

    /// Spawns a future onto this execution context.
    pub fn spawn<F>(&self, fut: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.handle.spawn(fut)
    }
}

impl From<Handle> for Executor {
    fn from(handle: Handle) -> Self {
        Self::from_handle(handle)
    }
}
