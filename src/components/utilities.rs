//! Small page conveniences: "view all" placeholders and broken image
//! fallback.

use crate::dom::{DomTree, NodeId};

pub const REVIEWS_NOTICE: &str = "All reviews page will be shown here. You can implement a modal or separate page with all customer reviews.";
pub const VIDEOS_NOTICE: &str = "All video testimonials will be shown here. You can implement a modal or separate page with all video reviews.";

/// Notice for a `.view-all-btn` based on its label.
pub fn view_all_notice(label: &str) -> Option<&'static str> {
    if label.contains("Reviews") {
        Some(REVIEWS_NOTICE)
    } else if label.contains("Videos") {
        Some(VIDEOS_NOTICE)
    } else {
        None
    }
}

/// Point a failed image at the placeholder. An image already showing the
/// placeholder is left as is so a missing placeholder cannot loop.
pub fn apply_image_fallback(tree: &mut DomTree, img: NodeId, placeholder: &str) -> bool {
    let src = tree.attr(img, "src").unwrap_or_default().to_string();
    if src.contains("placeholder") {
        log::warn!("placeholder image failed to load: {}", src);
        return false;
    }
    log::warn!("failed to load image: {}", src);
    let fallback = tree
        .attr(img, "data-fallback")
        .map(str::to_string)
        .unwrap_or_else(|| placeholder.to_string());
    tree.set_attr(img, "src", fallback);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parser::parse_html;

    #[test]
    fn view_all_labels() {
        assert_eq!(view_all_notice("View All Reviews"), Some(REVIEWS_NOTICE));
        assert_eq!(view_all_notice("View All Videos"), Some(VIDEOS_NOTICE));
        assert_eq!(view_all_notice("View All"), None);
    }

    #[test]
    fn broken_image_falls_back_once() {
        let mut tree = parse_html(r#"<img src="assets/images/hero1.jpg">"#, "about:blank");
        let img = tree.select_one("img").unwrap().unwrap();
        assert!(apply_image_fallback(&mut tree, img, "assets/images/placeholder.jpg"));
        assert_eq!(tree.attr(img, "src"), Some("assets/images/placeholder.jpg"));
        assert!(!apply_image_fallback(&mut tree, img, "assets/images/placeholder.jpg"));
        assert_eq!(tree.attr(img, "src"), Some("assets/images/placeholder.jpg"));
    }

    #[test]
    fn card_fallback_attribute_wins() {
        let mut tree = parse_html(
            r#"<img src="a.jpg" data-fallback="assets/images/placeholder-card.jpg">"#,
            "about:blank",
        );
        let img = tree.select_one("img").unwrap().unwrap();
        apply_image_fallback(&mut tree, img, "assets/images/placeholder.jpg");
        assert_eq!(tree.attr(img, "src"), Some("assets/images/placeholder-card.jpg"));
    }
}
