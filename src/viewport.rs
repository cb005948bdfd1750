//! Viewport geometry: element rectangles, visibility policies and the
//! `Geometry` collaborator the components query.

use crate::dom::NodeId;

/// Element bounding box in viewport coordinates (px, y grows downward).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub fn from_xywh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            left: x,
            top: y,
            right: x + width,
            bottom: y + height,
        }
    }

    pub fn width(&self) -> f32 {
        (self.right - self.left).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.bottom - self.top).max(0.0)
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let r = Rect {
            left: self.left.max(other.left),
            top: self.top.max(other.top),
            right: self.right.min(other.right),
            bottom: self.bottom.min(other.bottom),
        };
        (r.left <= r.right && r.top <= r.bottom).then_some(r)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_xywh(0.0, 0.0, self.width, self.height)
    }
}

/// Layout queries the page needs from whatever renders it.
pub trait Geometry {
    /// Bounding box of `id` relative to the viewport, if it is laid out.
    fn bounding_box(&self, id: NodeId) -> Option<Rect>;
    fn viewport(&self) -> Viewport;
    /// Current vertical scroll offset of the document.
    fn scroll_y(&self) -> f32;

    /// Position of `id` in document coordinates.
    fn document_top(&self, id: NodeId) -> Option<f32> {
        self.bounding_box(id).map(|r| r.top + self.scroll_y())
    }
}

/// Entirely inside the viewport on all four edges.
pub fn is_fully_visible(rect: &Rect, viewport: Viewport) -> bool {
    rect.top >= 0.0
        && rect.left >= 0.0
        && rect.bottom <= viewport.height
        && rect.right <= viewport.width
}

/// Vertical extent overlaps the viewport; horizontal overlap is not required.
pub fn is_partially_visible(rect: &Rect, viewport: Viewport) -> bool {
    rect.top < viewport.height && rect.bottom > 0.0
}

/// Fraction of `rect` inside `root`, following IntersectionObserver rules:
/// `None` when the two do not touch at all, `Some(1.0)` for an empty
/// element sitting inside the root.
pub fn intersection_ratio(rect: &Rect, root: &Rect) -> Option<f32> {
    let hit = rect.intersection(root)?;
    let area = rect.area();
    if area <= 0.0 {
        return Some(1.0);
    }
    Some((hit.area() / area).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    const VP: Viewport = Viewport {
        width: 1280.0,
        height: 800.0,
    };

    #[test]
    fn full_visibility_checks_all_edges() {
        assert!(is_fully_visible(&Rect::from_xywh(10.0, 10.0, 100.0, 100.0), VP));
        assert!(!is_fully_visible(&Rect::from_xywh(-1.0, 10.0, 100.0, 100.0), VP));
        assert!(!is_fully_visible(&Rect::from_xywh(10.0, 750.0, 100.0, 100.0), VP));
        assert!(!is_fully_visible(&Rect::from_xywh(1200.0, 10.0, 100.0, 100.0), VP));
    }

    #[test]
    fn partial_visibility_ignores_horizontal_axis() {
        assert!(is_partially_visible(&Rect::from_xywh(5000.0, 790.0, 10.0, 100.0), VP));
        assert!(is_partially_visible(&Rect::from_xywh(0.0, -90.0, 10.0, 100.0), VP));
        assert!(!is_partially_visible(&Rect::from_xywh(0.0, 800.0, 10.0, 100.0), VP));
        assert!(!is_partially_visible(&Rect::from_xywh(0.0, -100.0, 10.0, 100.0), VP));
    }

    #[test]
    fn ratio_of_half_visible_element() {
        let rect = Rect::from_xywh(0.0, 750.0, 100.0, 100.0);
        let ratio = intersection_ratio(&rect, &VP.rect()).unwrap();
        assert!((ratio - 0.5).abs() < 1e-4);
        assert!(intersection_ratio(&Rect::from_xywh(0.0, 900.0, 10.0, 10.0), &VP.rect()).is_none());
        assert_eq!(intersection_ratio(&Rect::from_xywh(5.0, 5.0, 0.0, 0.0), &VP.rect()), Some(1.0));
    }
}
