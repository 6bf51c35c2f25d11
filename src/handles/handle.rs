//! # AsyncHandle: observable, cancellable placeholder for a task's outcome.
//!
//! The handle and the scheduler driver share one mutex-guarded cell holding
//! the settled [`Outcome`] plus the pending completion callbacks. All
//! settlement goes through a single compare-and-set point
//! ([`AsyncHandle::finalize`]), which is what makes the cancellation race
//! well-defined:
//!
//! ## Rules
//! - Exactly one settlement wins; later attempts are no-ops.
//! - A cancellation request issued before settlement has priority: a result
//!   that arrives after `cancel()` settles the handle as `Canceled`, not as
//!   `Succeeded`/`Failed`.
//! - Canceling a handle whose task has not started settles it immediately and
//!   the task never starts.
//! - Canceling an already-settled handle is a no-op; terminal states never
//!   change.
//! - Completion callbacks fire exactly once, on whichever side settles the
//!   handle; callbacks registered after settlement fire immediately with the
//!   already-determined outcome.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::executor::Executor;
use crate::handles::outcome::{HandleState, Outcome};

type Callback<T> = Box<dyn FnOnce(Arc<Outcome<T>>) + Send + 'static>;

struct Inner<T> {
    started: bool,
    cancel_requested: bool,
    outcome: Option<Arc<Outcome<T>>>,
    callbacks: Vec<Callback<T>>,
}

struct Shared<T> {
    inner: Mutex<Inner<T>>,
    token: CancellationToken,
    settled: Notify,
}

/// Observable, cancellable placeholder for a task's eventual [`Outcome`].
///
/// Cheap to clone; all clones observe the same underlying activity. Produced
/// by [`schedule`](crate::schedule) and the capture functions.
pub struct AsyncHandle<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for AsyncHandle<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Send + Sync + 'static> AsyncHandle<T> {
    pub(crate) fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    started: false,
                    cancel_requested: false,
                    outcome: None,
                    callbacks: Vec::new(),
                }),
                token: CancellationToken::new(),
                settled: Notify::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.shared
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> HandleState {
        let g = self.lock();
        match &g.outcome {
            Some(o) => o.state(),
            None if g.started => HandleState::Running,
            None => HandleState::Pending,
        }
    }

    /// Returns `true` once the handle has settled.
    pub fn is_terminal(&self) -> bool {
        self.state().is_terminal()
    }

    /// Returns `true` if the handle settled as canceled.
    pub fn is_canceled(&self) -> bool {
        self.state() == HandleState::Canceled
    }

    /// Returns `true` if the handle settled with a failure.
    pub fn is_failed(&self) -> bool {
        self.state() == HandleState::Failed
    }

    /// Returns `true` if the handle settled with a value.
    pub fn is_succeeded(&self) -> bool {
        self.state() == HandleState::Succeeded
    }

    /// Requests cancellation. One-way and idempotent.
    ///
    /// - Not started yet: the task never starts and the handle settles
    ///   `Canceled` before this call returns.
    /// - Running: the cancellation token fires; the driver interrupts the
    ///   activation and settles the handle `Canceled`. A result racing with
    ///   the request loses (the settled state is still `Canceled`).
    /// - Already settled: no-op.
    pub fn cancel(&self) {
        let fired = {
            let mut g = self.lock();
            if g.outcome.is_some() {
                return;
            }
            g.cancel_requested = true;
            if g.started {
                None
            } else {
                let outcome = Arc::new(Outcome::Canceled);
                g.outcome = Some(outcome.clone());
                Some((outcome, std::mem::take(&mut g.callbacks)))
            }
        };
        self.shared.token.cancel();
        if let Some((outcome, callbacks)) = fired {
            self.dispatch(outcome, callbacks);
        }
    }

    /// Registers completion callbacks, invoked exactly once.
    ///
    /// `on_success` receives the produced value; `on_failure` receives the
    /// task error, with cancellation delivered as [`TaskError::Canceled`].
    /// Callbacks run synchronously on whichever thread settles the handle;
    /// registering after settlement invokes the matching callback immediately.
    pub fn on_complete<F, S>(&self, on_failure: F, on_success: S)
    where
        F: FnOnce(&TaskError) + Send + 'static,
        S: FnOnce(&T) + Send + 'static,
    {
        self.push_callback(Box::new(move |outcome| match &*outcome {
            Outcome::Succeeded(v) => on_success(v),
            Outcome::Failed(e) => on_failure(e),
            Outcome::Canceled => on_failure(&TaskError::Canceled),
        }));
    }

    /// Like [`on_complete`](Self::on_complete), but runs the callbacks on the
    /// given executor instead of the settling thread.
    pub fn on_complete_via<F, S>(&self, executor: &Executor, on_failure: F, on_success: S)
    where
        F: FnOnce(&TaskError) + Send + 'static,
        S: FnOnce(&T) + Send + 'static,
    {
        let executor = executor.clone();
        self.push_callback(Box::new(move |outcome| {
            executor.spawn(async move {
                match &*outcome {
                    Outcome::Succeeded(v) => on_success(v),
                    Outcome::Failed(e) => on_failure(e),
                    Outcome::Canceled => on_failure(&TaskError::Canceled),
                }
            });
        }));
    }

    /// Waits for the handle to settle and returns the shared outcome.
    ///
    /// Never blocks a worker; purely event-driven. Returns immediately if the
    /// handle already settled.
    pub async fn wait(&self) -> Arc<Outcome<T>> {
        loop {
            // Arm the notification before checking, so a settlement between
            // the check and the await is not missed.
            let settled = self.shared.settled.notified();
            if let Some(outcome) = self.peek() {
                return outcome;
            }
            settled.await;
        }
    }

    /// Returns the settled outcome without waiting, if any.
    pub fn peek(&self) -> Option<Arc<Outcome<T>>> {
        self.lock().outcome.clone()
    }

    /// Cancellation token wired to this handle; fires on [`cancel`](Self::cancel).
    pub(crate) fn token(&self) -> &CancellationToken {
        &self.shared.token
    }

    /// Marks an activation as starting. Fails if the handle already settled
    /// or cancellation was requested, in which case the task must not run.
    pub(crate) fn try_start(&self) -> bool {
        let mut g = self.lock();
        if g.outcome.is_some() || g.cancel_requested {
            return false;
        }
        g.started = true;
        true
    }

    /// Settles the handle. Returns `false` if it was already settled.
    ///
    /// If cancellation was requested before this call, the stored outcome is
    /// `Canceled` regardless of `outcome` — the cancellation window closes
    /// only when settlement succeeds.
    pub(crate) fn finalize(&self, outcome: Outcome<T>) -> bool {
        let (outcome, callbacks) = {
            let mut g = self.lock();
            if g.outcome.is_some() {
                return false;
            }
            let outcome = if g.cancel_requested {
                Arc::new(Outcome::Canceled)
            } else {
                Arc::new(outcome)
            };
            g.outcome = Some(outcome.clone());
            (outcome, std::mem::take(&mut g.callbacks))
        };
        self.dispatch(outcome, callbacks);
        true
    }

    fn push_callback(&self, callback: Callback<T>) {
        let immediate = {
            let mut g = self.lock();
            match &g.outcome {
                Some(outcome) => Some((outcome.clone(), callback)),
                None => {
                    g.callbacks.push(callback);
                    None
                }
            }
        };
        if let Some((outcome, callback)) = immediate {
            callback(outcome);
        }
    }

    fn dispatch(&self, outcome: Arc<Outcome<T>>, callbacks: Vec<Callback<T>>) {
        for cb in callbacks {
            cb(outcome.clone());
        }
        self.shared.settled.notify_waiters();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cancel_before_start_settles_immediately() {
        let h = AsyncHandle::<u32>::new();
        assert_eq!(h.state(), HandleState::Pending);

        h.cancel();
        assert_eq!(h.state(), HandleState::Canceled);
        assert!(!h.try_start(), "task must not start after cancel");
    }

    #[tokio::test]
    async fn test_finalize_prefers_canceled_over_late_result() {
        let h = AsyncHandle::<u32>::new();
        assert!(h.try_start());

        h.cancel();
        // The "task" produced a value after the cancellation request.
        assert!(h.finalize(Outcome::Succeeded(9)));
        assert_eq!(h.state(), HandleState::Canceled);
        assert!(h.peek().unwrap().is_canceled());
    }

    #[tokio::test]
    async fn test_terminal_state_is_immutable() {
        let h = AsyncHandle::<u32>::new();
        assert!(h.try_start());
        assert!(h.finalize(Outcome::Succeeded(1)));

        // Neither a second result nor a cancel may resurrect the handle.
        assert!(!h.finalize(Outcome::Failed(TaskError::fail("late"))));
        h.cancel();
        assert_eq!(h.state(), HandleState::Succeeded);
    }

    #[tokio::test]
    async fn test_callback_after_settlement_fires_immediately() {
        let h = AsyncHandle::<u32>::new();
        assert!(h.try_start());
        assert!(h.finalize(Outcome::Succeeded(5)));

        let (tx, rx) = std::sync::mpsc::channel::<u32>();
        h.on_complete(
            move |_e| panic!("must not fail"),
            move |v| {
                let _ = tx.send(*v);
            },
        );
        assert_eq!(rx.try_recv().unwrap(), 5);
    }

    #[tokio::test]
    async fn test_exactly_one_callback_fires() {
        let h = AsyncHandle::<u32>::new();
        let (tx, rx) = std::sync::mpsc::channel::<&'static str>();
        let tx2 = tx.clone();
        h.on_complete(
            move |_e| {
                let _ = tx.send("failure");
            },
            move |_v| {
                let _ = tx2.send("success");
            },
        );

        assert!(h.try_start());
        assert!(h.finalize(Outcome::Failed(TaskError::fail("boom"))));
        assert_eq!(rx.recv().unwrap(), "failure");
        assert!(rx.try_recv().is_err(), "only one callback may fire");
    }

    #[tokio::test]
    async fn test_wait_returns_settled_outcome() {
        let h = AsyncHandle::<u32>::new();
        let waiter = {
            let h = h.clone();
            tokio::spawn(async move { h.wait().await })
        };
        assert!(h.try_start());
        assert!(h.finalize(Outcome::Succeeded(3)));

        let outcome = waiter.await.unwrap();
        assert_eq!(*outcome.value().unwrap(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_on_complete_via_runs_callback_on_executor() {
        let h = AsyncHandle::<u32>::new();
        let (tx, rx) = std::sync::mpsc::channel::<u32>();
        h.on_complete_via(
            &Executor::current(),
            move |_e| panic!("must not fail"),
            move |v| {
                let _ = tx.send(*v);
            },
        );

        assert!(h.try_start());
        assert!(h.finalize(Outcome::Succeeded(11)));
        let got = rx
            .recv_timeout(std::time::Duration::from_secs(5))
            .expect("callback must run");
        assert_eq!(got, 11);
    }

    #[tokio::test]
    async fn test_canceled_delivered_as_failure_callback() {
        let h = AsyncHandle::<u32>::new();
        let (tx, rx) = std::sync::mpsc::channel::<&'static str>();
        h.on_complete(
            move |e| {
                let _ = tx.send(e.as_label());
            },
            move |_v| panic!("must not succeed"),
        );
        h.cancel();
        assert_eq!(rx.recv().unwrap(), "task_canceled");
    }
}
