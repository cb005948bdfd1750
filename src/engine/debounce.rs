use crate::engine::timers::{TimerId, TimerQueue};

/// Trailing-edge debounce on top of a [`TimerQueue`].
///
/// Every signal cancels the pending timer and schedules a new one, so the
/// task fires once, `quiet_ms` after the last signal of a burst.
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet_ms: u64,
    pending: Option<TimerId>,
}

impl Debouncer {
    pub fn new(quiet_ms: u64) -> Self {
        Self {
            quiet_ms,
            pending: None,
        }
    }

    pub fn signal<T: Clone>(&mut self, timers: &mut TimerQueue<T>, task: T) -> TimerId {
        self.cancel(timers);
        let id = timers.set_timeout(self.quiet_ms, task);
        self.pending = Some(id);
        id
    }

    /// Called by the owner when a timer fired. True when it was this
    /// debouncer's current timer, i.e. the burst has gone quiet.
    pub fn settle(&mut self, fired: TimerId) -> bool {
        if self.pending == Some(fired) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn cancel<T: Clone>(&mut self, timers: &mut TimerQueue<T>) {
        if let Some(id) = self.pending.take() {
            timers.clear(id);
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
