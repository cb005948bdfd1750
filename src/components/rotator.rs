//! Hero carousel.
//!
//! A `Rotator` owns an ordered, fixed set of slide elements and their
//! indicator dots. Exactly one slide carries the `active` class once the
//! rotator is shown; the auto-advance timer lives in the page's
//! [`TimerQueue`] and is always cancelled before a new one is scheduled.

use crate::dom::{DomTree, NodeId};
use crate::engine::timers::{TimerId, TimerQueue};

pub const ACTIVE_CLASS: &str = "active";

#[derive(Debug, Clone)]
pub struct Rotator {
    slides: Vec<NodeId>,
    indicators: Vec<NodeId>,
    current: usize,
    period_ms: u64,
    timer: Option<TimerId>,
}

impl Rotator {
    /// `None` when there are no slides: an empty carousel is never set up.
    pub fn new(slides: Vec<NodeId>, indicators: Vec<NodeId>, period_ms: u64) -> Option<Self> {
        if slides.is_empty() {
            return None;
        }
        Some(Self {
            slides,
            indicators,
            current: 0,
            period_ms,
            timer: None,
        })
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn slides(&self) -> &[NodeId] {
        &self.slides
    }

    pub fn indicators(&self) -> &[NodeId] {
        &self.indicators
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    pub fn owns_timer(&self, id: TimerId) -> bool {
        self.timer == Some(id)
    }

    /// Show slide `index` wrapped into `0..len` and mirror it to the
    /// indicators. Returns the index actually shown.
    pub fn show(&mut self, index: i64, tree: &mut DomTree) -> usize {
        let n = self.slides.len() as i64;
        self.current = index.rem_euclid(n) as usize;

        for (i, slide) in self.slides.iter().enumerate() {
            tree.set_class(*slide, ACTIVE_CLASS, i == self.current);
        }
        for (i, dot) in self.indicators.iter().enumerate() {
            tree.set_class(*dot, ACTIVE_CLASS, i == self.current);
        }
        self.current
    }

    pub fn next(&mut self, tree: &mut DomTree) -> usize {
        self.show(self.current as i64 + 1, tree)
    }

    pub fn prev(&mut self, tree: &mut DomTree) -> usize {
        self.show(self.current as i64 - 1, tree)
    }

    /// Begin auto-advancing; `tick` is handed back by the queue every period.
    pub fn start<T: Clone>(&mut self, timers: &mut TimerQueue<T>, tick: T) {
        self.stop(timers);
        self.timer = Some(timers.set_interval(self.period_ms, tick));
    }

    pub fn stop<T: Clone>(&mut self, timers: &mut TimerQueue<T>) {
        if let Some(id) = self.timer.take() {
            timers.clear(id);
        }
    }

    /// Stop and start again so the next automatic advance is a full period
    /// after a manual navigation.
    pub fn restart<T: Clone>(&mut self, timers: &mut TimerQueue<T>, tick: T) {
        self.stop(timers);
        self.start(timers, tick);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parser::parse_html;

    fn hero(n: usize) -> (DomTree, Rotator) {
        let mut markup = String::from(r#"<div class="hero">"#);
        for _ in 0..n {
            markup.push_str(r#"<div class="hero-slide"></div>"#);
        }
        for _ in 0..n {
            markup.push_str(r#"<span class="indicator"></span>"#);
        }
        markup.push_str("</div>");
        let mut tree = parse_html(&markup, "about:blank");
        let slides = tree.select(".hero-slide").unwrap();
        let dots = tree.select(".indicator").unwrap();
        let mut rotator = Rotator::new(slides, dots, 5000).unwrap();
        rotator.show(0, &mut tree);
        (tree, rotator)
    }

    fn active_positions(tree: &DomTree, ids: &[NodeId]) -> Vec<usize> {
        ids.iter()
            .enumerate()
            .filter(|(_, id)| tree.has_class(**id, ACTIVE_CLASS))
            .map(|(i, _)| i)
            .collect()
    }

    /// Advance a queue of rotator ticks, applying each one.
    fn run_until(rotator: &mut Rotator, tree: &mut DomTree, timers: &mut TimerQueue<()>, until: u64) {
        while let Some((id, ())) = timers.pop_due(until) {
            assert!(rotator.owns_timer(id));
            rotator.next(tree);
        }
        timers.settle(until);
    }

    #[test]
    fn show_wraps_any_integer() {
        let (mut tree, mut r) = hero(6);
        assert_eq!(r.show(-1, &mut tree), 5);
        assert_eq!(r.show(6, &mut tree), 0);
        assert_eq!(r.show(7, &mut tree), 1);
        assert_eq!(r.show(-7, &mut tree), 5);
        for i in -20i64..20 {
            assert_eq!(r.show(i, &mut tree) as i64, i.rem_euclid(6));
        }
    }

    #[test]
    fn exactly_one_slide_and_indicator_active() {
        let (mut tree, mut r) = hero(4);
        let ops: [fn(&mut Rotator, &mut DomTree) -> usize; 3] =
            [Rotator::next, Rotator::prev, |r, t| r.show(9, t)];
        for step in 0..25 {
            ops[step % 3](&mut r, &mut tree);
            let slides = active_positions(&tree, r.slides());
            let dots = active_positions(&tree, r.indicators());
            assert_eq!(slides, vec![r.current()]);
            assert_eq!(dots, slides);
        }
    }

    #[test]
    fn empty_carousel_is_not_created() {
        assert!(Rotator::new(Vec::new(), Vec::new(), 5000).is_none());
    }

    #[test]
    fn double_start_keeps_single_timer() {
        let (_tree, mut r) = hero(3);
        let mut timers = TimerQueue::new(0);
        r.start(&mut timers, ());
        r.start(&mut timers, ());
        assert_eq!(timers.len(), 1);
        assert!(r.is_running());
        r.stop(&mut timers);
        r.stop(&mut timers);
        assert!(timers.is_empty());
        assert!(!r.is_running());
    }

    #[test]
    fn auto_advance_after_12500ms_lands_on_third_slide() {
        let (mut tree, mut r) = hero(6);
        let mut timers = TimerQueue::new(0);
        r.start(&mut timers, ());
        run_until(&mut r, &mut tree, &mut timers, 12_500);
        assert_eq!(r.current(), 2);
    }

    #[test]
    fn manual_next_resets_timer_phase() {
        let (mut tree, mut r) = hero(6);
        let mut timers = TimerQueue::new(0);
        r.start(&mut timers, ());

        run_until(&mut r, &mut tree, &mut timers, 1000);
        r.next(&mut tree);
        r.restart(&mut timers, ());
        assert_eq!(r.current(), 1);
        assert_eq!(timers.len(), 1);

        run_until(&mut r, &mut tree, &mut timers, 5999);
        assert_eq!(r.current(), 1);
        run_until(&mut r, &mut tree, &mut timers, 6000);
        assert_eq!(r.current(), 2);
    }
}
