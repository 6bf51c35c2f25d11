//! # Scheduling: binds a task to an execution strategy.
//!
//! - [`ScheduleSpec`] — declarative description of when/how often a task runs.
//! - [`schedule`] — produces an [`AsyncHandle`](crate::AsyncHandle) and wires
//!   handle cancellation back into the running task.

mod scheduler;
mod spec;

pub use scheduler::schedule;
pub use spec::ScheduleSpec;
