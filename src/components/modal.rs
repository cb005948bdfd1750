//! Logo lightbox.

use crate::dom::{DomTree, NodeId};

#[derive(Debug, Clone, Copy)]
pub struct LogoModal {
    pub logo: NodeId,
    pub modal: NodeId,
    pub image: NodeId,
    pub close_button: Option<NodeId>,
}

impl LogoModal {
    pub fn open(&self, tree: &mut DomTree) {
        if let Some(src) = tree.attr(self.logo, "src").map(str::to_string) {
            tree.set_attr(self.image, "src", src);
        }
        tree.set_style(self.modal, "display", "block");
    }

    pub fn close(&self, tree: &mut DomTree) {
        tree.set_style(self.modal, "display", "none");
    }

    pub fn is_open(&self, tree: &DomTree) -> bool {
        tree.style(self.modal).get("display") == Some("block")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parser::parse_html;

    #[test]
    fn opens_with_logo_source_and_closes() {
        let mut tree = parse_html(
            r#"
            <img id="logoImage" src="assets/images/logo.png">
            <div id="logoModal" style="display: none">
              <span id="logoModalClose">x</span>
              <img id="logoModalImage">
            </div>
            "#,
            "about:blank",
        );
        let modal = LogoModal {
            logo: tree.element_by_id("logoImage").unwrap(),
            modal: tree.element_by_id("logoModal").unwrap(),
            image: tree.element_by_id("logoModalImage").unwrap(),
            close_button: tree.element_by_id("logoModalClose"),
        };
        assert!(!modal.is_open(&tree));
        modal.open(&mut tree);
        assert!(modal.is_open(&tree));
        assert_eq!(tree.attr(modal.image, "src"), Some("assets/images/logo.png"));
        modal.close(&mut tree);
        assert!(!modal.is_open(&tree));
        assert!(tree.is_hidden(modal.image));
    }
}
