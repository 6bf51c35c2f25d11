//! # Stream capture: hand a raw stream endpoint to caller logic.
//!
//! - [`capture_write`] — hands a writable byte sink to an async `FnOnce`.
//! - [`capture_read`] — hands a readable byte source to an async `FnOnce`.
//! - [`capture_lines`] — line-oriented variant with early stop.

mod lines;
mod stream;

pub use lines::capture_lines;
pub use stream::{capture_read, capture_write};
