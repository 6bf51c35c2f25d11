//! # In-process message bus for simple fan-out notification.
//!
//! Independent of the task/session core: a bounded queue feeding one dispatch
//! worker, with listener registration behind a lock. No cancellation
//! semantics beyond worker shutdown when the last bus clone is dropped.

mod bus;
mod subscriber;

pub use bus::Bus;
pub use subscriber::Subscribe;

#[cfg(feature = "logging")]
mod log;
#[cfg(feature = "logging")]
pub use log::LogWriter;
