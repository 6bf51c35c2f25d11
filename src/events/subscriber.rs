//! # Listener trait for the bus.

use async_trait::async_trait;

/// # Listener receiving events from a [`Bus`](crate::Bus).
///
/// Implementations should return promptly; the bus dispatches with a single
/// worker, so one slow listener delays delivery to the ones after it.
#[async_trait]
pub trait Subscribe<E>: Send + Sync + 'static {
    /// Called once per published event, in publish order.
    async fn on_event(&self, event: &E);
}
