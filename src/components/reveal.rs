//! One-shot fade-in of content blocks as they scroll into view, plus the
//! optional lazy image loader that shares its intersection test.

use std::collections::HashSet;

use crate::dom::{DomTree, NodeId};
use crate::viewport::{intersection_ratio, Geometry, Rect};

pub const REVEAL_SELECTOR: &str = ".package-card, .review-card, .gallery-item, .feature";

const HIDDEN_OPACITY: &str = "0";
const HIDDEN_TRANSFORM: &str = "translateY(20px)";
const TRANSITION: &str = "opacity 0.6s ease, transform 0.6s ease";

#[derive(Debug, Clone)]
pub struct RevealOnScroll {
    threshold: f32,
    margin_px: f32,
    watching: Vec<NodeId>,
    revealed: HashSet<NodeId>,
}

impl RevealOnScroll {
    pub fn new(threshold: f32, margin_px: f32) -> Self {
        Self {
            threshold,
            margin_px,
            watching: Vec::new(),
            revealed: HashSet::new(),
        }
    }

    /// Put `element` in its hidden state and start watching it.
    pub fn register(&mut self, element: NodeId, tree: &mut DomTree) {
        if self.watching.contains(&element) || self.revealed.contains(&element) {
            return;
        }
        tree.set_style(element, "opacity", HIDDEN_OPACITY);
        tree.set_style(element, "transform", HIDDEN_TRANSFORM);
        tree.set_style(element, "transition", TRANSITION);
        self.watching.push(element);
    }

    /// Viewport grown downward by the margin, so blocks start fading in
    /// slightly before they reach the bottom edge.
    fn root(&self, geometry: &dyn Geometry) -> Rect {
        let vp = geometry.viewport();
        Rect::from_xywh(0.0, 0.0, vp.width, vp.height + self.margin_px)
    }

    /// Reveal every watched element that now meets the threshold. Returns
    /// the newly revealed elements.
    pub fn observe(&mut self, geometry: &dyn Geometry, tree: &mut DomTree) -> Vec<NodeId> {
        let root = self.root(geometry);
        let threshold = self.threshold;
        let mut newly = Vec::new();

        self.watching.retain(|&id| {
            let hit = geometry
                .bounding_box(id)
                .and_then(|rect| intersection_ratio(&rect, &root))
                .is_some_and(|ratio| ratio >= threshold);
            if hit {
                tree.set_style(id, "opacity", "1");
                tree.set_style(id, "transform", "translateY(0)");
                newly.push(id);
            }
            !hit
        });

        self.revealed.extend(newly.iter().copied());
        newly
    }

    pub fn is_revealed(&self, element: NodeId) -> bool {
        self.revealed.contains(&element)
    }

    pub fn watching(&self) -> usize {
        self.watching.len()
    }
}

/// `img[data-src]` elements that get their real source on first sight.
#[derive(Debug, Clone, Default)]
pub struct LazyImages {
    waiting: Vec<NodeId>,
}

impl LazyImages {
    pub fn new(images: Vec<NodeId>) -> Self {
        Self { waiting: images }
    }

    /// Swap in `data-src` for images touching the viewport. Returns how many
    /// were loaded.
    pub fn observe(&mut self, geometry: &dyn Geometry, tree: &mut DomTree) -> usize {
        let root = geometry.viewport().rect();
        let before = self.waiting.len();
        self.waiting.retain(|&id| {
            let visible = geometry
                .bounding_box(id)
                .and_then(|rect| intersection_ratio(&rect, &root))
                .is_some_and(|ratio| ratio > 0.0);
            if !visible {
                return true;
            }
            if let Some(src) = tree.remove_attr(id, "data-src") {
                tree.set_attr(id, "src", src);
            }
            false
        });
        before - self.waiting.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parser::parse_html;
    use crate::render::layout::LayoutGeometry;
    use crate::viewport::Viewport;

    const PAGE: &str = r#"
        <html><body>
          <div style="height: 1000px"></div>
          <div class="feature" style="height: 100px">Local guides</div>
          <img data-src="assets/images/gallery1.jpg" height="100">
          <div style="height: 3000px"></div>
        </body></html>
    "#;

    fn setup() -> (DomTree, LayoutGeometry, NodeId) {
        let tree = parse_html(PAGE, "about:blank");
        let feature = tree.select_one(".feature").unwrap().unwrap();
        let geo = LayoutGeometry::new(&tree, Viewport::new(1280.0, 800.0));
        (tree, geo, feature)
    }

    #[test]
    fn register_applies_hidden_style() {
        let (mut tree, _geo, feature) = setup();
        let mut reveal = RevealOnScroll::new(0.1, 50.0);
        reveal.register(feature, &mut tree);
        let style = tree.style(feature);
        assert_eq!(style.opacity(), 0.0);
        assert_eq!(style.translate_y(), 20.0);
        assert_eq!(style.get("transition"), Some(TRANSITION));
    }

    #[test]
    fn reveals_once_across_enter_exit_enter() {
        let (mut tree, mut geo, feature) = setup();
        let mut reveal = RevealOnScroll::new(0.1, 50.0);
        reveal.register(feature, &mut tree);

        assert!(reveal.observe(&geo, &mut tree).is_empty());
        assert!(!reveal.is_revealed(feature));

        geo.scroll_to(600.0);
        assert_eq!(reveal.observe(&geo, &mut tree), vec![feature]);
        assert!(reveal.is_revealed(feature));
        assert_eq!(tree.style(feature).opacity(), 1.0);
        assert_eq!(tree.style(feature).translate_y(), 0.0);

        geo.scroll_to(0.0);
        assert!(reveal.observe(&geo, &mut tree).is_empty());
        assert_eq!(tree.style(feature).opacity(), 1.0);
        geo.scroll_to(600.0);
        assert!(reveal.observe(&geo, &mut tree).is_empty());
        assert_eq!(reveal.watching(), 0);
    }

    #[test]
    fn margin_triggers_before_the_viewport_edge() {
        let (mut tree, mut geo, feature) = setup();
        let top = geo.document_top(feature).unwrap();
        // element sits 20px below the visible area: only the margin reaches it
        geo.scroll_to(top - 820.0);

        let mut without = RevealOnScroll::new(0.1, 0.0);
        without.register(feature, &mut tree);
        assert!(without.observe(&geo, &mut tree).is_empty());

        let mut with = RevealOnScroll::new(0.1, 50.0);
        with.register(feature, &mut tree);
        assert_eq!(with.observe(&geo, &mut tree), vec![feature]);
    }

    #[test]
    fn lazy_image_swaps_source_on_first_sight() {
        let (mut tree, mut geo, _) = setup();
        let img = tree.select_one("img").unwrap().unwrap();
        let mut lazy = LazyImages::new(vec![img]);

        assert_eq!(lazy.observe(&geo, &mut tree), 0);
        assert_eq!(tree.attr(img, "src"), None);

        geo.scroll_to(600.0);
        assert_eq!(lazy.observe(&geo, &mut tree), 1);
        assert_eq!(tree.attr(img, "src"), Some("assets/images/gallery1.jpg"));
        assert_eq!(tree.attr(img, "data-src"), None);
        assert!(lazy.is_empty());
    }
}
