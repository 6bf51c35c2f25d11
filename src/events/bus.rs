//! # Bounded fan-out bus.
//!
//! [`Bus`] pairs a bounded [`tokio::sync::mpsc`] queue with a single dispatch
//! worker that delivers each event to every registered [`Subscribe`] listener
//! in registration order.
//!
//! ## Rules
//! - **Non-blocking publish**: [`Bus::publish`] never blocks; when the queue
//!   is full the event is dropped and `false` is returned.
//! - **In-order delivery**: one worker dispatches sequentially, so listeners
//!   observe events in publish order.
//! - **Listener registration lock**: subscribe/unsubscribe take a mutex; a
//!   listener added mid-stream sees only later events.
//! - **Shutdown**: when every bus clone is dropped the queue closes, the
//!   worker drains what was already enqueued and exits.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;

use crate::executor::Executor;
use crate::events::subscriber::Subscribe;

type Listeners<E> = Arc<Mutex<Vec<Arc<dyn Subscribe<E>>>>>;

/// Bounded-queue fan-out bus with one dispatch worker.
///
/// Cheap to clone; all clones feed the same worker.
///
/// # Example
/// ```
/// use std::sync::{Arc, Mutex};
/// use async_trait::async_trait;
/// use procap::{Bus, Executor, Subscribe};
///
/// struct Recorder(Mutex<Vec<String>>);
///
/// #[async_trait]
/// impl Subscribe<String> for Recorder {
///     async fn on_event(&self, event: &String) {
///         self.0.lock().unwrap().push(event.clone());
///     }
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let bus: Bus<String> = Bus::new(16, &Executor::current());
/// bus.subscribe(Arc::new(Recorder(Mutex::new(Vec::new()))));
/// assert!(bus.publish("hello".to_string()));
/// # }
/// ```
#[derive(Clone)]
pub struct Bus<E> {
    tx: mpsc::Sender<E>,
    listeners: Listeners<E>,
}

impl<E: Send + Sync + 'static> Bus<E> {
    /// Creates a bus with the given queue capacity (clamped to at least 1)
    /// and spawns its dispatch worker on `executor`.
    pub fn new(capacity: usize, executor: &Executor) -> Self {
        let (tx, mut rx) = mpsc::channel::<E>(capacity.max(1));
        let listeners: Listeners<E> = Arc::new(Mutex::new(Vec::new()));

        let worker_listeners = listeners.clone();
        executor.spawn(async move {
            while let Some(event) = rx.recv().await {
                let snapshot: Vec<Arc<dyn Subscribe<E>>> = worker_listeners
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clone();
                for listener in snapshot {
                    listener.on_event(&event).await;
                }
            }
        });

        Self { tx, listeners }
    }

    /// Enqueues an event without blocking.
    ///
    /// Returns `false` when the event was dropped (queue full or worker gone).
    pub fn publish(&self, event: E) -> bool {
        self.tx.try_send(event).is_ok()
    }

    /// Registers a listener. Re-registering the same `Arc` is a no-op.
    pub fn subscribe(&self, listener: Arc<dyn Subscribe<E>>) {
        let mut listeners = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let present = listeners.iter().any(|l| Arc::ptr_eq(l, &listener));
        if !present {
            listeners.push(listener);
        }
    }

    /// Removes a listener previously passed to [`subscribe`](Self::subscribe).
    pub fn unsubscribe(&self, listener: &Arc<dyn Subscribe<E>>) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|l| !Arc::ptr_eq(l, listener));
    }

    /// Number of currently registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;

    struct Recorder {
        seen: Mutex<Vec<u32>>,
    }

    impl Recorder {
        fn arc() -> Arc<Self> {
            Arc::new(Self {
                seen: Mutex::new(Vec::new()),
            })
        }

        fn snapshot(&self) -> Vec<u32> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Subscribe<u32> for Recorder {
        async fn on_event(&self, event: &u32) {
            self.seen.lock().unwrap().push(*event);
        }
    }

    async fn settle(recorder: &Recorder, expected: usize) {
        for _ in 0..200 {
            if recorder.snapshot().len() >= expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    #[tokio::test]
    async fn test_fan_out_preserves_publish_order() {
        let bus: Bus<u32> = Bus::new(16, &Executor::current());
        let recorder = Recorder::arc();
        bus.subscribe(recorder.clone());

        for n in 1..=5 {
            assert!(bus.publish(n));
        }
        settle(&recorder, 5).await;
        assert_eq!(recorder.snapshot(), vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_unsubscribed_listener_receives_nothing_further() {
        let bus: Bus<u32> = Bus::new(16, &Executor::current());
        let recorder = Recorder::arc();
        let listener: Arc<dyn Subscribe<u32>> = recorder.clone();
        bus.subscribe(listener.clone());

        bus.publish(1);
        settle(&recorder, 1).await;
        bus.unsubscribe(&listener);

        bus.publish(2);
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(recorder.snapshot(), vec![1]);
    }

    #[tokio::test]
    async fn test_duplicate_subscribe_is_noop() {
        let bus: Bus<u32> = Bus::new(16, &Executor::current());
        let recorder = Recorder::arc();
        bus.subscribe(recorder.clone());
        bus.subscribe(recorder.clone());
        assert_eq!(bus.listener_count(), 1);

        bus.publish(7);
        settle(&recorder, 1).await;
        assert_eq!(recorder.snapshot(), vec![7], "delivered once, not twice");
    }

    #[tokio::test]
    async fn test_publish_overflow_drops_event() {
        // Capacity 1 and no worker progress guaranteed yet: fill then overflow.
        let bus: Bus<u32> = Bus::new(1, &Executor::current());
        // No listener; the worker still drains, so race a burst.
        let mut dropped = false;
        for n in 0..1000 {
            if !bus.publish(n) {
                dropped = true;
                break;
            }
        }
        assert!(dropped, "a bounded queue must eventually refuse a burst");
    }
}
