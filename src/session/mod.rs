//! # Process sessions: one child process, three captured streams.
//!
//! - [`SessionCommand`] — program, arguments, working directory, environment.
//! - [`ProcessSession`] — configured launcher with per-stream executors and
//!   an optional exit deadline.
//! - [`RunningSession`] — a launched child plus its three capture handles.

mod command;
mod session;

pub use command::SessionCommand;
pub use session::{ProcessSession, RunningSession};
