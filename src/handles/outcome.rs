//! # Settled outcomes and handle lifecycle states.
//!
//! [`Outcome`] is the terminal value stored in an [`AsyncHandle`](crate::AsyncHandle)
//! once it settles. [`HandleState`] is the observable lifecycle:
//!
//! ```text
//! Pending ──► Running ──► Succeeded
//!    │           │    ──► Failed
//!    │           └──────► Canceled
//!    └──────────────────► Canceled   (canceled before the task ever started)
//! ```
//!
//! Transitions are monotonic; once a terminal state is reached no further
//! transition is observable.

use crate::error::TaskError;

/// Terminal result of a task bound to a handle.
#[derive(Debug)]
pub enum Outcome<T> {
    /// The task produced a value.
    Succeeded(T),
    /// The task failed; the original error message is preserved.
    Failed(TaskError),
    /// The handle was canceled before a result was accepted.
    Canceled,
}

impl<T> Outcome<T> {
    /// Returns the produced value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Succeeded(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the failure, if any.
    pub fn error(&self) -> Option<&TaskError> {
        match self {
            Outcome::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Returns `true` for [`Outcome::Canceled`].
    pub fn is_canceled(&self) -> bool {
        matches!(self, Outcome::Canceled)
    }

    /// Returns the corresponding terminal [`HandleState`].
    pub fn state(&self) -> HandleState {
        match self {
            Outcome::Succeeded(_) => HandleState::Succeeded,
            Outcome::Failed(_) => HandleState::Failed,
            Outcome::Canceled => HandleState::Canceled,
        }
    }
}

/// Observable lifecycle state of an [`AsyncHandle`](crate::AsyncHandle).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    /// Scheduled, no activation has started yet.
    Pending,
    /// At least one activation has started and the handle has not settled.
    Running,
    /// Settled with a value.
    Succeeded,
    /// Settled with a failure.
    Failed,
    /// Settled by cancellation.
    Canceled,
}

impl HandleState {
    /// Returns `true` for the three settled states.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            HandleState::Succeeded | HandleState::Failed | HandleState::Canceled
        )
    }
}
