//! Copy-phone-number button with a timed confirmation.

use crate::dom::{DomTree, NodeId};
use crate::engine::timers::{TimerId, TimerQueue};
use crate::error::ClipboardError;

pub const FEEDBACK_CLASS: &str = "show";

pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// Clipboard kept in memory. `unavailable()` builds one that refuses every
/// write, like a browser without clipboard permission.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Option<String>,
    unavailable: bool,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable() -> Self {
        Self {
            contents: None,
            unavailable: true,
        }
    }

    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if self.unavailable {
            return Err(ClipboardError("clipboard access denied".into()));
        }
        self.contents = Some(text.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CopyPhone {
    pub button: NodeId,
    pub number: NodeId,
    pub feedback: Option<NodeId>,
    feedback_ms: u64,
    hide_timer: Option<TimerId>,
}

impl CopyPhone {
    pub fn new(button: NodeId, number: NodeId, feedback: Option<NodeId>, feedback_ms: u64) -> Self {
        Self {
            button,
            number,
            feedback,
            feedback_ms,
            hide_timer: None,
        }
    }

    pub fn phone_text(&self, tree: &DomTree) -> String {
        tree.text_content(self.number).trim().to_string()
    }

    /// Copy the number. On success the confirmation is shown and its hide
    /// timer (re)scheduled with `hide` as the task. On failure the text that
    /// should have been copied comes back in the error.
    pub fn copy<T: Clone>(
        &mut self,
        tree: &mut DomTree,
        clipboard: &mut dyn Clipboard,
        timers: &mut TimerQueue<T>,
        hide: T,
    ) -> Result<(), (String, ClipboardError)> {
        let text = self.phone_text(tree);
        if let Err(e) = clipboard.write_text(&text) {
            return Err((text, e));
        }

        if let Some(feedback) = self.feedback {
            tree.set_class(feedback, FEEDBACK_CLASS, true);
            if let Some(old) = self.hide_timer.take() {
                timers.clear(old);
            }
            self.hide_timer = Some(timers.set_timeout(self.feedback_ms, hide));
        }
        Ok(())
    }

    /// Hide the confirmation if `fired` is the current hide timer.
    pub fn hide_feedback(&mut self, fired: TimerId, tree: &mut DomTree) -> bool {
        if self.hide_timer != Some(fired) {
            return false;
        }
        self.hide_timer = None;
        if let Some(feedback) = self.feedback {
            tree.set_class(feedback, FEEDBACK_CLASS, false);
        }
        true
    }
}

pub fn copy_failure_notice(number: &str) -> String {
    format!("Failed to copy phone number. Please copy manually: {}", number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parser::parse_html;

    const CONTACT: &str = r#"
        <span id="phoneNumber"> +91 98765 43210 </span>
        <button id="copyBtn">Copy</button>
        <span id="copyFeedback">Copied!</span>
    "#;

    fn setup(with_feedback: bool) -> (DomTree, CopyPhone) {
        let tree = parse_html(CONTACT, "about:blank");
        let copy = CopyPhone::new(
            tree.element_by_id("copyBtn").unwrap(),
            tree.element_by_id("phoneNumber").unwrap(),
            if with_feedback { tree.element_by_id("copyFeedback") } else { None },
            2000,
        );
        (tree, copy)
    }

    #[test]
    fn copy_shows_feedback_for_two_seconds() {
        let (mut tree, mut copy) = setup(true);
        let mut clipboard = MemoryClipboard::new();
        let mut timers = TimerQueue::new(0);
        let feedback = copy.feedback.unwrap();

        copy.copy(&mut tree, &mut clipboard, &mut timers, ()).unwrap();
        assert_eq!(clipboard.contents(), Some("+91 98765 43210"));
        assert!(tree.has_class(feedback, FEEDBACK_CLASS));

        assert!(timers.pop_due(1999).is_none());
        let (id, ()) = timers.pop_due(2000).unwrap();
        assert!(copy.hide_feedback(id, &mut tree));
        assert!(!tree.has_class(feedback, FEEDBACK_CLASS));
    }

    #[test]
    fn second_copy_reschedules_hide() {
        let (mut tree, mut copy) = setup(true);
        let mut clipboard = MemoryClipboard::new();
        let mut timers = TimerQueue::new(0);
        let feedback = copy.feedback.unwrap();

        copy.copy(&mut tree, &mut clipboard, &mut timers, ()).unwrap();
        timers.settle(1500);
        copy.copy(&mut tree, &mut clipboard, &mut timers, ()).unwrap();
        assert_eq!(timers.len(), 1);

        assert!(timers.pop_due(3499).is_none());
        assert!(tree.has_class(feedback, FEEDBACK_CLASS));
        let (id, ()) = timers.pop_due(3500).unwrap();
        assert!(copy.hide_feedback(id, &mut tree));
    }

    #[test]
    fn failure_returns_the_number() {
        let (mut tree, mut copy) = setup(true);
        let mut clipboard = MemoryClipboard::unavailable();
        let mut timers: TimerQueue<()> = TimerQueue::new(0);
        let (text, _) = copy
            .copy(&mut tree, &mut clipboard, &mut timers, ())
            .unwrap_err();
        assert!(copy_failure_notice(&text).ends_with("+91 98765 43210"));
        assert!(timers.is_empty());
        assert!(!tree.has_class(copy.feedback.unwrap(), FEEDBACK_CLASS));
    }

    #[test]
    fn missing_feedback_still_copies() {
        let (mut tree, mut copy) = setup(false);
        let mut clipboard = MemoryClipboard::new();
        let mut timers: TimerQueue<()> = TimerQueue::new(0);
        copy.copy(&mut tree, &mut clipboard, &mut timers, ()).unwrap();
        assert_eq!(clipboard.contents(), Some("+91 98765 43210"));
        assert!(timers.is_empty());
    }
}
