//! Virtual-clock timer queue.
//!
//! Stands in for `setTimeout`/`setInterval`: tasks are plain values handed
//! back to the owner when due, so the owner decides how to dispatch them.
//! Timers run one at a time in `(due_at, order)` order and the clock jumps
//! to each timer's due time before it is handed out, so anything the owner
//! schedules while handling it is based on the right time.

/// Handle of a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct ScheduledTask<T> {
    id: TimerId,
    due_at: u64,
    order: u64,
    interval_ms: Option<u64>,
    task: T,
}

/// Snapshot of a queued timer, for inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTimer {
    pub id: TimerId,
    pub due_at: u64,
    pub interval_ms: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    tasks: Vec<ScheduledTask<T>>,
    now_ms: u64,
    next_id: u64,
    next_order: u64,
}

impl<T: Clone> TimerQueue<T> {
    pub fn new(now_ms: u64) -> Self {
        Self {
            tasks: Vec::new(),
            now_ms,
            next_id: 1,
            next_order: 0,
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Run `task` once, `delay_ms` from now.
    pub fn set_timeout(&mut self, delay_ms: u64, task: T) -> TimerId {
        self.schedule(delay_ms, None, task)
    }

    /// Run `task` every `period_ms`, first time one period from now.
    pub fn set_interval(&mut self, period_ms: u64, task: T) -> TimerId {
        let period = period_ms.max(1);
        self.schedule(period, Some(period), task)
    }

    fn schedule(&mut self, delay_ms: u64, interval_ms: Option<u64>, task: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let order = self.bump_order();
        self.tasks.push(ScheduledTask {
            id,
            due_at: self.now_ms.saturating_add(delay_ms),
            order,
            interval_ms,
            task,
        });
        id
    }

    fn bump_order(&mut self) -> u64 {
        let order = self.next_order;
        self.next_order += 1;
        order
    }

    /// Remove a timer. Once cleared it can never be handed out again.
    pub fn clear(&mut self, id: TimerId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        before != self.tasks.len()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.tasks.iter().any(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn pending(&self) -> Vec<PendingTimer> {
        let mut timers: Vec<_> = self
            .tasks
            .iter()
            .map(|t| (t.order, PendingTimer {
                id: t.id,
                due_at: t.due_at,
                interval_ms: t.interval_ms,
            }))
            .collect();
        timers.sort_by_key(|(order, t)| (t.due_at, *order));
        timers.into_iter().map(|(_, t)| t).collect()
    }

    /// Hand out the earliest timer due at or before `limit`, moving the
    /// clock to its due time. Intervals are re-armed before returning.
    pub fn pop_due(&mut self, limit: u64) -> Option<(TimerId, T)> {
        let idx = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_at <= limit)
            .min_by_key(|(_, t)| (t.due_at, t.order))
            .map(|(idx, _)| idx)?;

        let due_at = self.tasks[idx].due_at;
        if due_at > self.now_ms {
            self.now_ms = due_at;
        }

        match self.tasks[idx].interval_ms {
            Some(period) => {
                let order = self.bump_order();
                let entry = &mut self.tasks[idx];
                entry.due_at = due_at.saturating_add(period);
                entry.order = order;
                Some((entry.id, entry.task.clone()))
            }
            None => {
                let entry = self.tasks.remove(idx);
                Some((entry.id, entry.task))
            }
        }
    }

    /// Move the clock forward to `now_ms` once every due timer was handled.
    pub fn settle(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }
}
