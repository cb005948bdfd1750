//! Responsive menu, in-page anchor scrolling and the sticky header shadow.

use crate::dom::{DomTree, NodeId};
use crate::viewport::Geometry;

pub const MENU_OPEN_CLASS: &str = "active";
pub const SHADOW_SCROLLED: &str = "0 4px 12px rgba(0, 0, 0, 0.15)";
pub const SHADOW_AT_TOP: &str = "0 4px 6px rgba(0, 0, 0, 0.1)";

/// Hamburger button and the menu it opens.
#[derive(Debug, Clone, Copy)]
pub struct NavMenu {
    pub hamburger: NodeId,
    pub menu: NodeId,
}

impl NavMenu {
    pub fn new(hamburger: NodeId, menu: NodeId) -> Self {
        Self { hamburger, menu }
    }

    /// Returns whether the menu is now open.
    pub fn toggle(&self, tree: &mut DomTree) -> bool {
        tree.toggle_class(self.hamburger, MENU_OPEN_CLASS);
        tree.toggle_class(self.menu, MENU_OPEN_CLASS)
    }

    pub fn close(&self, tree: &mut DomTree) {
        tree.set_class(self.hamburger, MENU_OPEN_CLASS, false);
        tree.set_class(self.menu, MENU_OPEN_CLASS, false);
    }

    pub fn is_open(&self, tree: &DomTree) -> bool {
        tree.has_class(self.menu, MENU_OPEN_CLASS)
    }
}

/// Document offset to scroll to for an in-page link, leaving room for the
/// fixed header. `None` for a bare `#` or a missing target.
pub fn anchor_scroll_top(
    tree: &DomTree,
    geometry: &dyn Geometry,
    href: &str,
    header_offset_px: f32,
) -> Option<f32> {
    let fragment = href.strip_prefix('#')?;
    if fragment.is_empty() {
        return None;
    }
    let target = tree.element_by_id(fragment)?;
    let top = geometry.document_top(target)?;
    Some((top - header_offset_px).max(0.0))
}

#[derive(Debug, Clone, Copy)]
pub struct HeaderShadow {
    header: NodeId,
    after_px: f32,
}

impl HeaderShadow {
    pub fn new(header: NodeId, after_px: f32) -> Self {
        Self { header, after_px }
    }

    pub fn apply(&self, scroll_y: f32, tree: &mut DomTree) {
        let shadow = if scroll_y > self.after_px {
            SHADOW_SCROLLED
        } else {
            SHADOW_AT_TOP
        };
        tree.set_style(self.header, "box-shadow", shadow);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parser::parse_html;
    use crate::render::layout::LayoutGeometry;
    use crate::viewport::Viewport;

    const PAGE: &str = r##"
        <html><body>
          <header id="header">
            <div class="hamburger"></div>
            <ul class="nav-menu"><li><a class="nav-link" href="#packages">Packages</a></li></ul>
          </header>
          <div style="height: 1200px"></div>
          <section id="packages" style="height: 400px"></section>
          <div style="height: 30px"></div>
          <section id="top" style="height: 10px"></section>
          <div style="height: 2000px"></div>
        </body></html>
    "##;

    #[test]
    fn hamburger_toggles_and_link_closes() {
        let mut tree = parse_html(PAGE, "about:blank");
        let nav = NavMenu::new(
            tree.select_one(".hamburger").unwrap().unwrap(),
            tree.select_one(".nav-menu").unwrap().unwrap(),
        );
        assert!(nav.toggle(&mut tree));
        assert!(tree.has_class(nav.hamburger, MENU_OPEN_CLASS));
        assert!(!nav.toggle(&mut tree));
        nav.toggle(&mut tree);
        nav.close(&mut tree);
        assert!(!nav.is_open(&tree));
        assert!(!tree.has_class(nav.hamburger, MENU_OPEN_CLASS));
    }

    #[test]
    fn anchor_target_leaves_room_for_header() {
        let tree = parse_html(PAGE, "about:blank");
        let geo = LayoutGeometry::new(&tree, Viewport::new(1280.0, 800.0));
        let section = tree.element_by_id("packages").unwrap();
        let top = geo.document_top(section).unwrap();

        assert_eq!(anchor_scroll_top(&tree, &geo, "#packages", 80.0), Some(top - 80.0));
        assert_eq!(anchor_scroll_top(&tree, &geo, "#", 80.0), None);
        assert_eq!(anchor_scroll_top(&tree, &geo, "#nowhere", 80.0), None);
        assert_eq!(anchor_scroll_top(&tree, &geo, "#packages", 10_000.0), Some(0.0));
    }

    #[test]
    fn header_shadow_follows_scroll() {
        let mut tree = parse_html(PAGE, "about:blank");
        let header = tree.element_by_id("header").unwrap();
        let shadow = HeaderShadow::new(header, 50.0);
        shadow.apply(51.0, &mut tree);
        assert_eq!(tree.style(header).get("box-shadow"), Some(SHADOW_SCROLLED));
        shadow.apply(50.0, &mut tree);
        assert_eq!(tree.style(header).get("box-shadow"), Some(SHADOW_AT_TOP));
    }
}
