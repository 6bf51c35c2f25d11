//! # Task abstractions.
//!
//! - [`Task`] — async, cancelable unit of work with a typed output.
//! - [`TaskRef`] — shared handle (`Arc<dyn Task>`) used across the runtime.
//! - [`TaskFn`] — closure-backed task, fresh future per activation.
//! - [`TaskOnce`] — `FnOnce`-backed task, at most one activation.

mod once;
mod task;
mod task_fn;

pub use once::TaskOnce;
pub use task::{Task, TaskRef};
pub use task_fn::TaskFn;
