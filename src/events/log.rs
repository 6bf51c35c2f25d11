//! # Simple logging listener for debugging and demos.
//!
//! [`LogWriter`] prints every event to stdout in a human-readable format.
//! Enabled via the `logging` feature; implement a custom
//! [`Subscribe`](crate::Subscribe) for structured logging or metrics.

use async_trait::async_trait;

use crate::events::subscriber::Subscribe;

/// Stdout logging listener.
///
/// ## Output format
/// ```text
/// [event] <Debug rendering of the event>
/// ```
pub struct LogWriter;

#[async_trait]
impl<E> Subscribe<E> for LogWriter
where
    E: std::fmt::Debug + Send + Sync + 'static,
{
    async fn on_event(&self, event: &E) {
        println!("[event] {event:?}");
    }
}
