#![forbid(unsafe_code)]

//! One-shot timers over a virtual clock.
//!
//! [`TimerService`] is the seam to whatever schedules callbacks in the host
//! (a browser `setTimeout`, a runtime tick subscription). [`TimerQueue`] is
//! the deterministic implementation: time only moves when
//! [`advance`](TimerQueue::advance) is called, so every stage boundary and
//! hold threshold is reproducible in tests.
//!
//! # Invariants
//!
//! 1. A cancelled timer never fires.
//! 2. Each timer fires at most once.
//! 3. Timers fire in deadline order; ties fire in scheduling order.

use std::collections::BTreeSet;
use std::time::Duration;

/// Identifier of a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    /// Raw numeric value, for logs.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Schedules cancellable one-shot callbacks.
pub trait TimerService {
    /// Schedule a timer that fires `after` from now.
    fn schedule(&mut self, after: Duration) -> TimerId;

    /// Cancel a pending timer. Returns `false` if it already fired or was
    /// never scheduled.
    fn cancel(&mut self, id: TimerId) -> bool;

    /// Current time on this service's clock.
    fn now(&self) -> Duration;
}

/// Virtual-time timer queue.
#[derive(Debug, Default)]
pub struct TimerQueue {
    now: Duration,
    next_id: u64,
    /// Keyed by (deadline, id) so iteration order is firing order.
    pending: BTreeSet<(Duration, TimerId)>,
}

impl TimerQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward by `dt` and return every timer that came due,
    /// in firing order.
    pub fn advance(&mut self, dt: Duration) -> Vec<TimerId> {
        self.now = self.now.saturating_add(dt);
        let mut fired = Vec::new();
        while let Some(&(deadline, id)) = self.pending.first() {
            if deadline > self.now {
                break;
            }
            self.pending.pop_first();
            fired.push(id);
        }
        fired
    }

    /// Whether `id` is still waiting to fire.
    #[must_use]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|(_, pending)| *pending == id)
    }

    /// Number of timers waiting to fire.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl TimerService for TimerQueue {
    fn schedule(&mut self, after: Duration) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.insert((self.now.saturating_add(after), id));
        id
    }

    fn cancel(&mut self, id: TimerId) -> bool {
        let key = self.pending.iter().find(|(_, pending)| *pending == id).copied();
        key.is_some_and(|key| self.pending.remove(&key))
    }

    fn now(&self) -> Duration {
        self.now
    }
}
