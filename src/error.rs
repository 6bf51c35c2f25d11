//! Error types used by task execution and process sessions.
//!
//! This module defines two main error enums:
//!
//! - [`TaskError`] — errors raised by individual task activations.
//! - [`SessionError`] — errors raised by a [`ProcessSession`](crate::ProcessSession) itself.
//!
//! Both types provide `as_label` helpers for logging/metrics. A failure inside
//! a capture function stays contained in that capture's handle as a
//! [`TaskError`]; only launch/wait/timeout problems surface as a
//! [`SessionError`] from the session.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by task execution.
///
/// These represent failures of individual activations of a task body.
/// Cancellation is its own variant so callers can tell "stopped on purpose"
/// from "broke".
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// Task body failed. The message is carried verbatim.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Task was canceled through its handle before producing a result.
    #[error("task canceled")]
    Canceled,

    /// A one-shot task body was activated a second time.
    #[error("task body already consumed")]
    AlreadyStarted,
}

impl TaskError {
    /// Creates a [`TaskError::Fail`] from any displayable error, preserving
    /// its message verbatim.
    pub fn fail(error: impl std::fmt::Display) -> Self {
        TaskError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use procap::TaskError;
    ///
    /// assert_eq!(TaskError::Canceled.as_label(), "task_canceled");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Canceled => "task_canceled",
            TaskError::AlreadyStarted => "task_already_started",
        }
    }

    /// Returns `true` for [`TaskError::Canceled`].
    pub fn is_canceled(&self) -> bool {
        matches!(self, TaskError::Canceled)
    }
}

impl From<std::io::Error> for TaskError {
    fn from(e: std::io::Error) -> Self {
        TaskError::fail(e)
    }
}

/// # Errors produced by a process session.
///
/// These classify why a session could not report an exit status:
/// the process never launched, it outlived the caller's deadline, or waiting
/// for it failed for another reason.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SessionError {
    /// The process could not be started (executable missing, permissions, ...).
    /// No captures are created when this is returned.
    #[error("failed to launch {program:?}: {source}")]
    Launch {
        /// The program that was asked to run.
        program: String,
        /// The underlying launch error.
        #[source]
        source: std::io::Error,
    },

    /// The process did not exit within the caller's deadline.
    /// The session still tears down: the process is killed and captures canceled.
    #[error("process did not exit within {timeout:?}")]
    Timeout {
        /// The deadline that was exceeded.
        timeout: Duration,
    },

    /// Waiting for process exit failed for a reason other than the deadline.
    #[error("failed waiting for process exit: {source}")]
    Wait {
        /// The underlying wait error.
        #[source]
        source: std::io::Error,
    },
}

impl SessionError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use procap::SessionError;
    ///
    /// let err = SessionError::Timeout { timeout: Duration::from_secs(1) };
    /// assert_eq!(err.as_label(), "session_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SessionError::Launch { .. } => "session_launch_failed",
            SessionError::Timeout { .. } => "session_timeout",
            SessionError::Wait { .. } => "session_wait_failed",
        }
    }

    /// Returns `true` if the session failed because the deadline passed.
    pub fn is_timeout(&self) -> bool {
        matches!(self, SessionError::Timeout { .. })
    }
}
