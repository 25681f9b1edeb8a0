//! Deferred task queue for the single-threaded carousel executor.
//!
//! Tasks are ordered by deadline and, for equal deadlines, by the order in
//! which they were scheduled. Nothing here sleeps: callers ask for the next
//! deadline, wait however their runtime waits, then drain due tasks with
//! [`TimerQueue::pop_due`]. A repeating task that fell behind fires once and
//! resumes its cadence, like tokio's `MissedTickBehavior::Skip`.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use tokio::time::Instant;

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Handle returned for every scheduled task; used to cancel it later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Pending<T> {
    id: TimerId,
    period: Option<Duration>,
    task: T,
}

#[derive(Debug)]
pub struct TimerQueue<T> {
    pending: BTreeMap<(Instant, u64), Pending<T>>,
    slots: HashMap<TimerId, (Instant, u64)>,
    next_seq: u64,
    next_id: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            pending: BTreeMap::new(),
            slots: HashMap::new(),
            next_seq: 0,
            next_id: 0,
        }
    }

    /// Run `task` once, no earlier than `now + delay`.
    pub fn schedule_once(&mut self, now: Instant, delay: Duration, task: T) -> TimerId {
        let id = self.allocate_id();
        self.insert(now + delay, id, None, task);
        id
    }

    /// Run `task` every `interval`, first at `now + interval`.
    pub fn schedule_repeating(&mut self, now: Instant, interval: Duration, task: T) -> TimerId {
        let period = interval.max(MIN_PERIOD);
        let id = self.allocate_id();
        self.insert(now + period, id, Some(period), task);
        id
    }

    /// Drop a pending task. Returns false if `id` already fired (one-shot) or
    /// was cancelled before.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.slots.remove(&id) {
            Some(key) => self.pending.remove(&key).is_some(),
            None => false,
        }
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.slots.contains_key(&id)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.keys().next().map(|(deadline, _)| *deadline)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<T: Clone> TimerQueue<T> {
    /// Remove and return the earliest task whose deadline is at or before
    /// `now`. Repeating tasks are re-armed at the first slot of their cadence
    /// that lies after `now`; slots a late caller missed are skipped, not
    /// replayed.
    pub fn pop_due(&mut self, now: Instant) -> Option<(TimerId, Instant, T)> {
        let (&(deadline, seq), _) = self.pending.first_key_value()?;
        if deadline > now {
            return None;
        }
        let entry = self.pending.remove(&(deadline, seq))?;
        self.slots.remove(&entry.id);
        let fired = (entry.id, deadline, entry.task.clone());
        if let Some(period) = entry.period {
            let next = next_slot_after(deadline, period, now);
            self.insert(next, entry.id, Some(period), entry.task);
        }
        Some(fired)
    }
}

fn next_slot_after(deadline: Instant, period: Duration, now: Instant) -> Instant {
    let next = deadline + period;
    if next > now {
        return next;
    }
    let periods = now.duration_since(deadline).as_nanos() / period.as_nanos() + 1;
    u64::try_from(periods * period.as_nanos())
        .ok()
        .and_then(|nanos| deadline.checked_add(Duration::from_nanos(nanos)))
        .unwrap_or(now + period)
}

impl<T> TimerQueue<T> {
    fn allocate_id(&mut self) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        id
    }

    fn insert(&mut self, deadline: Instant, id: TimerId, period: Option<Duration>, task: T) {
        let key = (deadline, self.next_seq);
        self.next_seq += 1;
        self.pending.insert(key, Pending { id, period, task });
        self.slots.insert(id, key);
    }
}
