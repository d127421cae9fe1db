//! Deterministic virtual timers.
//!
//! Every delayed action on the page (staggered reveals, notification
//! dismissal, ripple cleanup, debounced scroll work) is a task in a
//! `TimerQueue`. The host advances the queue's clock; nothing here reads a
//! wall clock, so tests replay timer interleavings exactly.

use std::collections::{BTreeMap, HashMap};

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Disposable handle to one scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerHandle(u64);

type TimerKey = (OrderedFloat<f64>, u64);

#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    now_ms: f64,
    next_sequence: u64,
    pending: BTreeMap<TimerKey, T>,
    deadlines: HashMap<u64, OrderedFloat<f64>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(0.0)
    }

    /// Queue whose clock starts at `now_ms` (for hosts whose clock does not
    /// start at zero, such as `performance.now()`).
    #[must_use]
    pub fn starting_at(now_ms: f64) -> Self {
        Self {
            now_ms: if now_ms.is_finite() { now_ms } else { 0.0 },
            next_sequence: 0,
            pending: BTreeMap::new(),
            deadlines: HashMap::new(),
        }
    }

    #[must_use]
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<f64> {
        self.pending.keys().next().map(|(deadline, _)| deadline.0)
    }

    #[must_use]
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.deadlines.contains_key(&handle.0)
    }

    /// Schedules `task` to fire `delay_ms` after the current clock.
    ///
    /// Negative and non-finite delays fire at the current instant, after any
    /// task already due at that instant.
    pub fn schedule(&mut self, delay_ms: f64, task: T) -> TimerHandle {
        let delay = if delay_ms.is_finite() {
            delay_ms.max(0.0)
        } else {
            0.0
        };
        let deadline = OrderedFloat(self.now_ms + delay);
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        self.pending.insert((deadline, sequence), task);
        self.deadlines.insert(sequence, deadline);
        TimerHandle(sequence)
    }

    /// Cancels a pending task. Returns `false` if it already fired or was
    /// cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.deadlines.remove(&handle.0) {
            Some(deadline) => self.pending.remove(&(deadline, handle.0)).is_some(),
            None => false,
        }
    }

    /// Pops the earliest task due at or before `until_ms`, moving the clock
    /// to its deadline.
    ///
    /// Tasks scheduled while handling a popped task are visible to the next
    /// call, so a loop over `pop_due` drains chains of short timers in the
    /// same order a browser event loop would.
    pub fn pop_due(&mut self, until_ms: f64) -> Option<T> {
        let (&(deadline, sequence), _) = self.pending.first_key_value()?;
        if deadline.0 > until_ms {
            return None;
        }
        self.deadlines.remove(&sequence);
        let task = self.pending.remove(&(deadline, sequence))?;
        self.now_ms = self.now_ms.max(deadline.0);
        Some(task)
    }

    /// Moves the clock forward to `until_ms` without firing anything.
    ///
    /// Callers drain `pop_due(until_ms)` first; the clock never goes back.
    pub fn advance_clock(&mut self, until_ms: f64) {
        if until_ms.is_finite() && until_ms > self.now_ms {
            self.now_ms = until_ms;
        }
    }

    /// Fires every task due at or before `until_ms` through `handler`, then
    /// moves the clock to `until_ms`. Returns the number of fired tasks.
    pub fn advance_to(&mut self, until_ms: f64, mut handler: impl FnMut(&mut Self, T)) -> usize {
        let mut fired = 0;
        while let Some(task) = self.pop_due(until_ms) {
            handler(self, task);
            fired += 1;
        }
        self.advance_clock(until_ms);
        fired
    }

    /// Drops every pending task.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.deadlines.clear();
    }
}
