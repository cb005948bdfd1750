//! Tunables for the page runtime.
//!
//! Every timing and threshold the page uses lives here so the viewer (and
//! tests) can change them without touching the components.

use crate::error::SiteError;

/// Auto-advance period of the hero carousel.
pub const SLIDE_INTERVAL_MS: u64 = 5000;
/// Quiet period after the last scroll signal before video visibility is checked.
pub const SCROLL_DEBOUNCE_MS: u64 = 150;
/// Fraction of an element that must be on screen before it fades in.
pub const REVEAL_THRESHOLD: f32 = 0.1;
/// Extra room below the viewport bottom that already counts for reveals.
pub const REVEAL_MARGIN_PX: f32 = 50.0;
/// How long the "copied" confirmation stays visible.
pub const COPY_FEEDBACK_MS: u64 = 2000;
/// Height of the fixed navbar; anchor scrolling stops this far above the target.
pub const HEADER_OFFSET_PX: f32 = 80.0;
/// Scroll distance after which the header gets its stronger shadow.
pub const HEADER_SHADOW_AFTER_PX: f32 = 50.0;
pub const PLACEHOLDER_IMAGE: &str = "assets/images/placeholder.jpg";

#[derive(Debug, Clone, PartialEq)]
pub struct SiteConfig {
    pub slide_interval_ms: u64,
    pub scroll_debounce_ms: u64,
    pub reveal_threshold: f32,
    pub reveal_margin_px: f32,
    pub copy_feedback_ms: u64,
    pub header_offset_px: f32,
    pub header_shadow_after_px: f32,
    pub placeholder_image: String,
    /// Swap `data-src` into `src` once an image approaches the viewport.
    pub lazy_images: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            slide_interval_ms: SLIDE_INTERVAL_MS,
            scroll_debounce_ms: SCROLL_DEBOUNCE_MS,
            reveal_threshold: REVEAL_THRESHOLD,
            reveal_margin_px: REVEAL_MARGIN_PX,
            copy_feedback_ms: COPY_FEEDBACK_MS,
            header_offset_px: HEADER_OFFSET_PX,
            header_shadow_after_px: HEADER_SHADOW_AFTER_PX,
            placeholder_image: PLACEHOLDER_IMAGE.to_string(),
            lazy_images: false,
        }
    }
}

impl SiteConfig {
    pub fn with_slide_interval(mut self, ms: u64) -> Self {
        self.slide_interval_ms = ms;
        self
    }

    pub fn with_scroll_debounce(mut self, ms: u64) -> Self {
        self.scroll_debounce_ms = ms;
        self
    }

    pub fn with_reveal(mut self, threshold: f32, margin_px: f32) -> Self {
        self.reveal_threshold = threshold;
        self.reveal_margin_px = margin_px;
        self
    }

    pub fn with_copy_feedback(mut self, ms: u64) -> Self {
        self.copy_feedback_ms = ms;
        self
    }

    pub fn with_placeholder(mut self, path: impl Into<String>) -> Self {
        self.placeholder_image = path.into();
        self
    }

    pub fn with_lazy_images(mut self, enabled: bool) -> Self {
        self.lazy_images = enabled;
        self
    }

    /// Reject values that would make a component misbehave (zero periods
    /// spin the timer queue, thresholds outside [0, 1] never trigger).
    pub fn validate(&self) -> Result<(), SiteError> {
        if self.slide_interval_ms == 0 {
            return Err(SiteError::Config("slide interval must be positive".into()));
        }
        if self.copy_feedback_ms == 0 {
            return Err(SiteError::Config("copy feedback duration must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.reveal_threshold) {
            return Err(SiteError::Config(format!(
                "reveal threshold {} is outside [0, 1]",
                self.reveal_threshold
            )));
        }
        if self.placeholder_image.trim().is_empty() {
            return Err(SiteError::Config("placeholder image path is empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_page_timings() {
        let cfg = SiteConfig::default();
        assert_eq!(cfg.slide_interval_ms, 5000);
        assert_eq!(cfg.scroll_debounce_ms, 150);
        assert_eq!(cfg.copy_feedback_ms, 2000);
        assert!(!cfg.lazy_images);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_zero_interval_and_bad_threshold() {
        assert!(SiteConfig::default().with_slide_interval(0).validate().is_err());
        assert!(SiteConfig::default().with_reveal(1.5, 0.0).validate().is_err());
        assert!(SiteConfig::default().with_placeholder(" ").validate().is_err());
    }
}
