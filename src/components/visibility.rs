//! Pause-on-exit for user-started videos.
//!
//! Videos that scroll completely out of view are paused; coming back into
//! view never restarts them. Only an explicit toggle plays media again.

use crate::components::media::{MediaRegistry, Playback};
use crate::engine::debounce::Debouncer;
use crate::engine::timers::{TimerId, TimerQueue};
use crate::viewport::{is_partially_visible, Geometry};

#[derive(Debug, Clone)]
pub struct VisibilityTracker {
    debounce: Debouncer,
}

impl VisibilityTracker {
    pub fn new(quiet_ms: u64) -> Self {
        Self {
            debounce: Debouncer::new(quiet_ms),
        }
    }

    /// Raw scroll/resize signal. Only the last one of a burst leads to a
    /// check, `quiet_ms` later, when the queue hands `task` back.
    pub fn signal<T: Clone>(&mut self, timers: &mut TimerQueue<T>, task: T) -> TimerId {
        self.debounce.signal(timers, task)
    }

    /// True when `fired` is the timer of the current burst.
    pub fn settle(&mut self, fired: TimerId) -> bool {
        self.debounce.settle(fired)
    }

    /// Pause every playing media whose element left the viewport. Returns
    /// how many were paused.
    pub fn on_scroll_signal(
        &self,
        registry: &mut MediaRegistry,
        geometry: &dyn Geometry,
        playback: &mut dyn Playback,
    ) -> usize {
        let viewport = geometry.viewport();
        let mut paused = 0;
        for media in registry.iter_mut() {
            let Some(rect) = geometry.bounding_box(media.element) else {
                continue;
            };
            if is_partially_visible(&rect, viewport) {
                // back in view: stays paused until the user asks again
                continue;
            }
            if !playback.is_paused(media.element) {
                playback.pause(media.element);
                media.suspended = true;
                paused += 1;
                log::debug!("paused off-screen video '{}'", media.id);
            }
        }
        paused
    }
}
