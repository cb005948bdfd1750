use std::collections::HashMap;

use crate::dom::css::parse_css_size;
use crate::dom::{DomTree, NodeId, NodeType};
use crate::viewport::{Geometry, Rect, Viewport};

/// Bounding box for a laid-out element, in document coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Document boxes for every laid-out element of a page
#[derive(Debug, Clone, Default)]
pub struct PageLayout {
    boxes: HashMap<NodeId, LayoutBox>,
    pub document_height: f32,
}

impl PageLayout {
    pub fn get(&self, id: NodeId) -> Option<&LayoutBox> {
        self.boxes.get(&id)
    }
}

const BLOCK_TAGS: &[&str] = &[
    "html",
    "body",
    "div",
    "p",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "ul",
    "ol",
    "li",
    "form",
    "section",
    "article",
    "aside",
    "main",
    "header",
    "footer",
    "nav",
    "blockquote",
    "figure",
    "figcaption",
    "img",
    "video",
    "button",
];

/// Per-tag vertical margins (top, bottom) in pixels.
fn tag_margins(tag: &str) -> (f32, f32) {
    match tag {
        "h1" => (24.0, 16.0),
        "h2" => (20.0, 12.0),
        "h3" | "h4" => (16.0, 10.0),
        "h5" | "h6" => (12.0, 8.0),
        "p" => (4.0, 10.0),
        "ul" | "ol" => (8.0, 8.0),
        "li" => (2.0, 2.0),
        "section" | "article" | "main" => (16.0, 16.0),
        "nav" | "header" | "footer" => (12.0, 12.0),
        "blockquote" => (12.0, 12.0),
        _ => (0.0, 0.0),
    }
}

/// Per-tag padding in pixels.
fn tag_padding(tag: &str, is_block: bool) -> f32 {
    match tag {
        "section" | "article" | "main" | "aside" => 16.0,
        "nav" | "header" | "footer" => 12.0,
        "blockquote" => 20.0,
        "img" | "video" | "button" => 0.0,
        _ if is_block => 4.0,
        _ => 0.0,
    }
}

/// Height of replaced elements that have no text to measure.
fn intrinsic_height(tree: &DomTree, id: NodeId, tag: &str) -> f32 {
    let from_attr = tree.attr(id, "height").and_then(parse_css_size);
    match tag {
        "img" => from_attr.unwrap_or(200.0),
        "video" => from_attr.unwrap_or(240.0),
        "button" => 36.0,
        _ => 0.0,
    }
}

/// Compute layout for a page (simple top-to-bottom block model).
///
/// An inline `height: Npx` style pins an element's height; `display: none`
/// removes it from the flow.
pub fn compute_layout(tree: &DomTree, viewport_width: f32) -> PageLayout {
    let mut layout = PageLayout::default();
    let mut cursor_y = 0.0;
    let root = tree.root();
    if let Some(node) = tree.node(root) {
        for child in &node.children {
            layout_node(tree, *child, 0.0, &mut cursor_y, viewport_width, 16.0, &mut layout);
        }
    }
    layout.document_height = cursor_y;
    layout
}

fn layout_node(
    tree: &DomTree,
    id: NodeId,
    x: f32,
    cursor_y: &mut f32,
    available_width: f32,
    parent_font_size: f32,
    layout: &mut PageLayout,
) {
    let Some(node) = tree.node(id) else {
        return;
    };

    if node.node_type == NodeType::Text {
        let line_height = parent_font_size * 1.4;
        let chars_per_line = (available_width / (parent_font_size * 0.6)).max(1.0) as usize;
        let lines = (node.text.trim().len() as f32 / chars_per_line as f32).ceil().max(1.0);
        *cursor_y += lines * line_height;
        return;
    }

    if node.tag == "head" {
        return;
    }

    let style = tree.style(id);
    if style.get("display") == Some("none") {
        layout.boxes.insert(
            id,
            LayoutBox {
                x,
                y: *cursor_y,
                width: 0.0,
                height: 0.0,
            },
        );
        return;
    }

    let tag = node.tag.as_str();
    let is_block = BLOCK_TAGS.contains(&tag);

    let font_size = match tag {
        "h1" => 32.0,
        "h2" => 24.0,
        "h3" => 20.0,
        "h4" => 18.0,
        "h5" | "h6" => 16.0,
        "small" => 12.0,
        _ => parent_font_size,
    };

    let (margin_top, margin_bottom) = tag_margins(tag);
    let padding = tag_padding(tag, is_block);

    if is_block {
        *cursor_y += margin_top;
    }

    let start_y = *cursor_y;
    *cursor_y += padding;

    // Layout children
    let child_x = x + padding;
    let child_width = (available_width - padding * 2.0).max(0.0);
    for child in &node.children {
        layout_node(tree, *child, child_x, cursor_y, child_width, font_size, layout);
    }

    *cursor_y += padding;
    *cursor_y = cursor_y.max(start_y + intrinsic_height(tree, id, tag));

    if let Some(fixed) = style.get("height").and_then(parse_css_size) {
        *cursor_y = start_y + fixed;
    }

    let height = *cursor_y - start_y;

    if is_block {
        *cursor_y += margin_bottom;
    }

    layout.boxes.insert(
        id,
        LayoutBox {
            x,
            y: start_y,
            width: available_width,
            height,
        },
    );
}

/// Headless [`Geometry`]: the block layout of a page seen through a
/// scrolled viewport.
#[derive(Debug, Clone)]
pub struct LayoutGeometry {
    layout: PageLayout,
    viewport: Viewport,
    scroll_y: f32,
}

impl LayoutGeometry {
    pub fn new(tree: &DomTree, viewport: Viewport) -> Self {
        Self {
            layout: compute_layout(tree, viewport.width),
            viewport,
            scroll_y: 0.0,
        }
    }

    /// Recompute boxes after the tree changed shape (display toggles,
    /// appended content) or the viewport was resized.
    pub fn relayout(&mut self, tree: &DomTree, viewport: Viewport) {
        self.layout = compute_layout(tree, viewport.width);
        self.viewport = viewport;
    }

    /// Scroll to `y`, clamped to the scrollable range.
    pub fn scroll_to(&mut self, y: f32) {
        let max = (self.layout.document_height - self.viewport.height).max(0.0);
        self.scroll_y = y.clamp(0.0, max);
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }
}

impl Geometry for LayoutGeometry {
    fn bounding_box(&self, id: NodeId) -> Option<Rect> {
        self.layout
            .get(id)
            .map(|b| Rect::from_xywh(b.x, b.y - self.scroll_y, b.width, b.height))
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn scroll_y(&self) -> f32 {
        self.scroll_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parser::parse_html;

    const PAGE: &str = r#"
        <html><body style="height: 3000px">
          <div id="a" style="height: 500px"></div>
          <div id="b" style="height: 300px"><p>nested text</p></div>
          <div id="c" style="display: none; height: 900px"></div>
          <video id="v"></video>
        </body></html>
    "#;

    #[test]
    fn fixed_heights_stack_in_order() {
        let tree = parse_html(PAGE, "about:blank");
        let layout = compute_layout(&tree, 1280.0);
        let a = layout.get(tree.element_by_id("a").unwrap()).unwrap();
        let b = layout.get(tree.element_by_id("b").unwrap()).unwrap();
        let c = layout.get(tree.element_by_id("c").unwrap()).unwrap();
        let v = layout.get(tree.element_by_id("v").unwrap()).unwrap();
        assert_eq!(a.height, 500.0);
        assert!(b.y >= a.y + a.height);
        assert_eq!(b.height, 300.0);
        assert_eq!(c.height, 0.0);
        assert_eq!(v.height, 240.0);
        assert!(v.y >= b.y + b.height);
        assert!(layout.document_height >= 3000.0);
    }

    #[test]
    fn geometry_follows_scroll() {
        let tree = parse_html(PAGE, "about:blank");
        let mut geo = LayoutGeometry::new(&tree, Viewport::new(1280.0, 800.0));
        let b = tree.element_by_id("b").unwrap();
        let before = geo.bounding_box(b).unwrap();
        geo.scroll_to(200.0);
        let after = geo.bounding_box(b).unwrap();
        assert!((before.top - after.top - 200.0).abs() < 1e-3);
        assert_eq!(geo.document_top(b), Some(before.top));

        geo.scroll_to(1.0e9);
        assert_eq!(geo.scroll_y(), geo.layout().document_height - 800.0);
        geo.scroll_to(-50.0);
        assert_eq!(geo.scroll_y(), 0.0);
    }
}
