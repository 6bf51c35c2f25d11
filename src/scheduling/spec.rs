//! # Execution strategies for scheduled tasks.
//!
//! [`ScheduleSpec`] governs how many times a bound task is activated and the
//! spacing between activations. For the repeating variants the produced handle
//! still represents a single logical activity: canceling it stops all future
//! activations, and activation N+1 never overlaps activation N.

use std::time::Duration;

/// Declarative description of when/how often a task runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleSpec {
    /// Run once, as soon as the executor picks the task up.
    Immediate,

    /// Run once, no earlier than the given delay after scheduling.
    DelayedOnce(Duration),

    /// Re-run every `period`, measured from the previous *scheduled* start,
    /// independent of how long each activation took. Missed periods are
    /// caught up back-to-back (tokio's default burst behavior), matching
    /// classic fixed-rate scheduling.
    FixedRate {
        /// Delay before the first activation.
        initial: Duration,
        /// Spacing between scheduled starts.
        period: Duration,
    },

    /// Next activation starts `delay` after the previous one *completed*.
    FixedDelay {
        /// Delay before the first activation.
        initial: Duration,
        /// Pause between an activation's completion and the next start.
        delay: Duration,
    },
}

impl ScheduleSpec {
    /// Returns `true` for the repeating variants.
    pub fn is_repeating(&self) -> bool {
        matches!(
            self,
            ScheduleSpec::FixedRate { .. } | ScheduleSpec::FixedDelay { .. }
        )
    }
}
