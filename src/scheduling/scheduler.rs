//! # Scheduler driver: runs activations and settles the handle.
//!
//! [`schedule`] spawns one driver future per handle on the caller's
//! [`Executor`]. The driver owns all settlement of the handle and enforces:
//!
//! ## Rules
//! - The handle settles **exactly once**: `Succeeded`, `Failed`, or `Canceled`.
//! - A cancellation request before an activation starts means the task body
//!   never runs ([`AsyncHandle::try_start`] is checked under the handle lock).
//! - A cancellation request during an activation aborts the activation's
//!   spawned body, which interrupts a blocked tokio read/write at its next
//!   await point; the cooperative path (the body observing its token) is also
//!   honored.
//! - A panic inside the body surfaces as `Failed` carrying the panic payload
//!   itself, unwrapped from the join machinery.
//! - Repeating schedules stay pending across successful activations; the
//!   first failure or cancellation settles the handle and stops the schedule.
//!
//! ## Flow
//! ```text
//! Immediate / DelayedOnce:
//!   [sleep] → activation → Succeeded(value) | Failed(err) | Canceled
//!
//! FixedRate / FixedDelay:
//!   [sleep] → activation ─ Ok ──► next tick / delay ──► activation ...
//!                        └ Err ──► Failed, schedule stops
//!   cancel() at any point ──► Canceled, no further activation
//! ```

use std::any::Any;
use std::time::Duration;

use tokio::time::{self, Instant};

use crate::error::TaskError;
use crate::executor::Executor;
use crate::handles::{AsyncHandle, Outcome};
use crate::scheduling::spec::ScheduleSpec;
use crate::tasks::TaskRef;

/// Binds `task` to `spec` on `executor` and returns its handle.
///
/// Non-blocking: the handle is returned immediately; activations run
/// asynchronously on `executor`.
///
/// # Example
/// ```
/// use procap::{schedule, Executor, ScheduleSpec, TaskFn, TaskRef};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let task: TaskRef<u32> = TaskFn::arc("answer", |_ctx| async { Ok(42) });
/// let handle = schedule(task, ScheduleSpec::Immediate, &Executor::current());
/// let outcome = handle.wait().await;
/// assert_eq!(*outcome.value().unwrap(), 42);
/// # }
/// ```
pub fn schedule<T: Send + Sync + 'static>(
    task: TaskRef<T>,
    spec: ScheduleSpec,
    executor: &Executor,
) -> AsyncHandle<T> {
    let handle = AsyncHandle::new();
    let driver = Driver {
        task,
        executor: executor.clone(),
        handle: handle.clone(),
    };
    executor.spawn(async move { driver.drive(spec).await });
    handle
}

/// Result of one activation as seen by the driver.
enum Attempt<T> {
    Completed(Result<T, TaskError>),
    Canceled,
}

struct Driver<T> {
    task: TaskRef<T>,
    executor: Executor,
    handle: AsyncHandle<T>,
}

impl<T: Send + Sync + 'static> Driver<T> {
    async fn drive(self, spec: ScheduleSpec) {
        match spec {
            ScheduleSpec::Immediate => {
                self.run_one_shot().await;
            }
            ScheduleSpec::DelayedOnce(delay) => {
                if !self.sleep_cancellable(delay).await {
                    self.handle.finalize(Outcome::Canceled);
                    return;
                }
                self.run_one_shot().await;
            }
            ScheduleSpec::FixedRate { initial, period } => {
                // tokio intervals reject a zero period.
                let period = period.max(Duration::from_millis(1));
                let mut ticks = time::interval_at(Instant::now() + initial, period);
                loop {
                    tokio::select! {
                        biased;
                        _ = self.handle.token().cancelled() => {
                            self.handle.finalize(Outcome::Canceled);
                            return;
                        }
                        _ = ticks.tick() => {}
                    }
                    if !self.run_repeating().await {
                        return;
                    }
                }
            }
            ScheduleSpec::FixedDelay { initial, delay } => {
                if !self.sleep_cancellable(initial).await {
                    self.handle.finalize(Outcome::Canceled);
                    return;
                }
                loop {
                    if !self.run_repeating().await {
                        return;
                    }
                    if !self.sleep_cancellable(delay).await {
                        self.handle.finalize(Outcome::Canceled);
                        return;
                    }
                }
            }
        }
    }

    /// Runs the single activation of a one-shot schedule and settles the handle.
    async fn run_one_shot(&self) {
        if !self.handle.try_start() {
            self.handle.finalize(Outcome::Canceled);
            return;
        }
        match self.run_attempt().await {
            Attempt::Completed(Ok(value)) => {
                self.handle.finalize(Outcome::Succeeded(value));
            }
            Attempt::Completed(Err(TaskError::Canceled)) | Attempt::Canceled => {
                self.handle.finalize(Outcome::Canceled);
            }
            Attempt::Completed(Err(e)) => {
                self.handle.finalize(Outcome::Failed(e));
            }
        }
    }

    /// Runs one activation of a repeating schedule.
    ///
    /// Returns `true` when the schedule should continue. On success the
    /// handle stays pending — the periodic activity is still alive.
    async fn run_repeating(&self) -> bool {
        if !self.handle.try_start() {
            self.handle.finalize(Outcome::Canceled);
            return false;
        }
        match self.run_attempt().await {
            Attempt::Completed(Ok(_)) => true,
            Attempt::Completed(Err(TaskError::Canceled)) | Attempt::Canceled => {
                self.handle.finalize(Outcome::Canceled);
                false
            }
            Attempt::Completed(Err(e)) => {
                self.handle.finalize(Outcome::Failed(e));
                false
            }
        }
    }

    /// Executes one activation of the task body on the executor.
    ///
    /// The body runs as its own spawned task so a panic is contained by the
    /// join machinery and cancellation can abort a body blocked on I/O.
    async fn run_attempt(&self) -> Attempt<T> {
        let token = self.handle.token().clone();
        let mut body = {
            let task = self.task.clone();
            let token = token.clone();
            self.executor.spawn(async move { task.run(token).await })
        };
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                body.abort();
                let _ = body.await;
                Attempt::Canceled
            }
            res = &mut body => match res {
                Ok(result) => Attempt::Completed(result),
                Err(join_err) if join_err.is_panic() => {
                    let msg = panic_message(join_err.into_panic());
                    Attempt::Completed(Err(TaskError::Fail { error: msg }))
                }
                Err(_) => Attempt::Canceled,
            },
        }
    }

    /// Sleeps for `d`, returning `false` if cancellation fired first.
    async fn sleep_cancellable(&self, d: Duration) -> bool {
        if d.is_zero() {
            return !self.handle.token().is_cancelled();
        }
        tokio::select! {
            biased;
            _ = self.handle.token().cancelled() => false,
            _ = time::sleep(d) => true,
        }
    }
}

/// Extracts the original panic payload so the failure carries the inner
/// message, not a join-error wrapper.
fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "task panicked".to_string()
    }
}
