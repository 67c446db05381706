//! Timers and rate limiting on a single logical thread.
//!
//! All time is expressed in milliseconds on a clock owned by the host.
//! Nothing here sleeps: the host advances the clock and pops whatever
//! became due, one timer at a time, so a reaction can cancel timers that
//! would otherwise have fired in the same pass.

use std::collections::BTreeMap;

use crate::domain::{ElementId, NotificationId, TimerId};

/// Work attached to a timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerTask {
    CounterTick(ElementId),
    RemoveNotification(NotificationId),
    InputSettled(ElementId),
    ScrollSettled,
}

#[derive(Debug, Clone)]
struct Timer {
    due: u64,
    period: Option<u64>,
    task: TimerTask,
}

/// A timer that came due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiredTimer {
    pub id: TimerId,
    pub due: u64,
    pub task: TimerTask,
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    next_id: u64,
    timers: BTreeMap<TimerId, Timer>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule_once(&mut self, now: u64, delay: u64, task: TimerTask) -> TimerId {
        self.insert(now + delay, None, task)
    }

    /// Schedules a repeating timer. The first firing is one period after `now`.
    pub fn schedule_interval(&mut self, now: u64, period: u64, task: TimerTask) -> TimerId {
        let period = period.max(1);
        self.insert(now + period, Some(period), task)
    }

    fn insert(&mut self, due: u64, period: Option<u64>, task: TimerTask) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.timers.insert(id, Timer { due, period, task });
        id
    }

    /// Cancels a timer. Cancelling an unknown or already fired timer is a no-op.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.timers.remove(&id).is_some()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn next_due(&self) -> Option<u64> {
        self.timers.values().map(|timer| timer.due).min()
    }

    /// Pops the earliest timer due at or before `now`.
    ///
    /// Ties are broken by creation order. Interval timers are rescheduled
    /// one period later and stay in the queue until cancelled.
    pub fn pop_due(&mut self, now: u64) -> Option<FiredTimer> {
        let id = self
            .timers
            .iter()
            .filter(|(_, timer)| timer.due <= now)
            .min_by_key(|(id, timer)| (timer.due, **id))
            .map(|(id, _)| *id)?;

        let timer = self.timers.get_mut(&id)?;
        let fired = FiredTimer {
            id,
            due: timer.due,
            task: timer.task.clone(),
        };
        match timer.period {
            Some(period) => timer.due += period,
            None => {
                self.timers.remove(&id);
            }
        }
        Some(fired)
    }
}

/// Runs only the last call of a burst, once the source has been quiet for `wait_ms`.
#[derive(Debug, Clone)]
pub struct Debouncer {
    wait_ms: u64,
    pending: Option<TimerId>,
}

impl Debouncer {
    pub fn new(wait_ms: u64) -> Self {
        Self {
            wait_ms,
            pending: None,
        }
    }

    /// Restarts the quiet window with `task` as the work to run when it closes.
    pub fn call(&mut self, queue: &mut TimerQueue, now: u64, task: TimerTask) -> TimerId {
        if let Some(previous) = self.pending.take() {
            queue.cancel(previous);
        }
        let id = queue.schedule_once(now, self.wait_ms, task);
        self.pending = Some(id);
        id
    }

    /// Acknowledges that `id` fired. Returns false for a timer this debouncer no longer owns.
    pub fn settle(&mut self, id: TimerId) -> bool {
        if self.pending == Some(id) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn cancel(&mut self, queue: &mut TimerQueue) {
        if let Some(id) = self.pending.take() {
            queue.cancel(id);
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Admits at most one call per window, on the leading edge.
#[derive(Debug, Clone)]
pub struct Throttle {
    window_ms: u64,
    window_end: Option<u64>,
}

impl Throttle {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            window_end: None,
        }
    }

    pub fn admit(&mut self, now: u64) -> bool {
        match self.window_end {
            Some(end) if now < end => false,
            _ => {
                self.window_end = Some(now + self.window_ms);
                true
            }
        }
    }
}
