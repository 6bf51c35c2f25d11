//! # Observable, cancellable result handles.
//!
//! - [`AsyncHandle`] — placeholder for a task's eventual outcome.
//! - [`Outcome`] — the settled result: succeeded, failed, or canceled.
//! - [`HandleState`] — observable lifecycle state of a handle.

mod handle;
mod outcome;

pub use handle::AsyncHandle;
pub use outcome::{HandleState, Outcome};
