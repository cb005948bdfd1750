use crate::dom::{DomTree, NodeId};
use scraper::{ElementRef, Html, Node};
use std::collections::HashMap;

/// Tags whose children should be stripped (the runtime replaces their logic)
const SKIP_CHILDREN: &[&str] = &["script", "style", "noscript"];

/// Parse a full page into a DomTree
pub fn parse_html(html: &str, url: &str) -> DomTree {
    let document = Html::parse_document(html);

    // Extract <title>
    let title = scraper::Selector::parse("title")
        .ok()
        .and_then(|sel| document.select(&sel).next())
        .map(|el| el.text().collect::<String>())
        .unwrap_or_default();

    let mut tree = DomTree::new(url);
    let root = tree.root();
    convert_element(&mut tree, root, document.root_element());
    tree.title = title.trim().to_string();
    tree
}

impl DomTree {
    /// Parse a markup fragment and append its top-level nodes to `parent`.
    /// Returns the ids of the appended elements.
    pub fn append_html(&mut self, parent: NodeId, markup: &str) -> Vec<NodeId> {
        let fragment = Html::parse_fragment(markup);
        let mut added = Vec::new();
        // parse_fragment wraps the content in an <html> element
        for child_ref in fragment.root_element().children() {
            match child_ref.value() {
                Node::Element(_) => {
                    if let Some(el) = ElementRef::wrap(child_ref) {
                        added.push(convert_element(self, parent, el));
                    }
                }
                Node::Text(t) => {
                    if !t.text.trim().is_empty() {
                        self.push_text(parent, t.text.to_string());
                    }
                }
                _ => {}
            }
        }
        added
    }
}

fn convert_element(tree: &mut DomTree, parent: NodeId, el: ElementRef<'_>) -> NodeId {
    let tag = el.value().name.local.as_ref().to_string();
    let attributes: HashMap<String, String> = el
        .value()
        .attrs()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    let id = tree.push_element(parent, tag.clone(), attributes);

    if SKIP_CHILDREN.contains(&tag.as_str()) {
        return id;
    }

    for child_ref in el.children() {
        match child_ref.value() {
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child_ref) {
                    convert_element(tree, id, child_el);
                }
            }
            Node::Text(t) => {
                let s = t.text.to_string();
                if !s.trim().is_empty() {
                    tree.push_text(id, s);
                }
            }
            _ => {}
        }
    }

    id
}
