pub mod parser;
pub mod selector;
pub mod css;

use std::collections::HashMap;

use crate::dom::css::StyleProps;

/// Stable identity of a node inside a [`DomTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Document,
    Element,
    Text,
}

/// One node of the page arena. Children are referenced by id so the
/// components can hold on to element identities while the tree mutates.
#[derive(Debug, Clone)]
pub struct DomNode {
    pub tag: String,
    pub attributes: HashMap<String, String>,
    pub text: String,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    pub node_type: NodeType,
}

impl DomNode {
    fn document() -> Self {
        Self {
            tag: "#document".into(),
            attributes: HashMap::new(),
            text: String::new(),
            children: Vec::new(),
            parent: None,
            node_type: NodeType::Document,
        }
    }

    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|list| list.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }
}

/// Parsed page with metadata. Node 0 is always the document node.
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<DomNode>,
    pub url: String,
    pub title: String,
}

impl DomTree {
    pub fn new(url: &str) -> Self {
        Self {
            nodes: vec![DomNode::document()],
            url: url.to_string(),
            title: String::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> Option<&DomNode> {
        self.nodes.get(id.0)
    }

    /// Recursively count all nodes reachable from the document.
    pub fn node_count(&self) -> usize {
        1 + self.descendants(self.root()).len()
    }

    pub fn push_element(
        &mut self,
        parent: NodeId,
        tag: impl Into<String>,
        attributes: HashMap<String, String>,
    ) -> NodeId {
        self.push(
            parent,
            DomNode {
                tag: tag.into(),
                attributes,
                text: String::new(),
                children: Vec::new(),
                parent: Some(parent),
                node_type: NodeType::Element,
            },
        )
    }

    pub fn push_text(&mut self, parent: NodeId, content: impl Into<String>) -> NodeId {
        self.push(
            parent,
            DomNode {
                tag: String::new(),
                attributes: HashMap::new(),
                text: content.into(),
                children: Vec::new(),
                parent: Some(parent),
                node_type: NodeType::Text,
            },
        )
    }

    fn push(&mut self, parent: NodeId, node: DomNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        if let Some(p) = self.nodes.get_mut(parent.0) {
            p.children.push(id);
        }
        id
    }

    /// Element descendants of `id` in document order (excluding `id`).
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = match self.node(id) {
            Some(n) => n.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(next) = stack.pop() {
            if let Some(node) = self.node(next) {
                if node.is_element() {
                    out.push(next);
                }
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    pub fn is_descendant_of(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut cur = self.node(id).and_then(|n| n.parent);
        while let Some(p) = cur {
            if p == ancestor {
                return true;
            }
            cur = self.node(p).and_then(|n| n.parent);
        }
        false
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id).and_then(|n| n.attr(name))
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.attributes.insert(name.to_string(), value.into());
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> Option<String> {
        self.nodes.get_mut(id.0)?.attributes.remove(name)
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.node(id).map(|n| n.has_class(class)).unwrap_or(false)
    }

    /// Add or remove one class, leaving the rest of the list untouched.
    pub fn set_class(&mut self, id: NodeId, class: &str, on: bool) {
        let Some(node) = self.nodes.get_mut(id.0) else {
            return;
        };
        let mut classes: Vec<String> = node
            .attr("class")
            .map(|list| list.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        let present = classes.iter().any(|c| c == class);
        match (on, present) {
            (true, false) => classes.push(class.to_string()),
            (false, true) => classes.retain(|c| c != class),
            _ => return,
        }
        node.attributes.insert("class".into(), classes.join(" "));
    }

    /// Flip a class; returns whether it is now present.
    pub fn toggle_class(&mut self, id: NodeId, class: &str) -> bool {
        let on = !self.has_class(id, class);
        self.set_class(id, class, on);
        on
    }

    /// Concatenated text of every text node below `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut buf = String::new();
        self.collect_text(id, &mut buf);
        buf
    }

    fn collect_text(&self, id: NodeId, buf: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };
        if node.node_type == NodeType::Text {
            buf.push_str(&node.text);
        }
        for child in &node.children {
            self.collect_text(*child, buf);
        }
    }

    /// Replace all children of `id` with a single text node. A lone text
    /// child is rewritten in place so repeated updates don't grow the arena.
    pub fn set_text(&mut self, id: NodeId, content: &str) {
        let Some(node) = self.nodes.get(id.0) else {
            return;
        };
        if let [only] = node.children[..] {
            if let Some(text) = self
                .nodes
                .get_mut(only.0)
                .filter(|n| n.node_type == NodeType::Text)
            {
                text.text.clear();
                text.text.push_str(content);
                return;
            }
        }
        let Some(node) = self.nodes.get_mut(id.0) else {
            return;
        };
        let old = std::mem::take(&mut node.children);
        for child in old {
            if let Some(c) = self.nodes.get_mut(child.0) {
                c.parent = None;
            }
        }
        self.push_text(id, content);
    }

    pub fn style(&self, id: NodeId) -> StyleProps {
        self.attr(id, "style")
            .map(css::parse_inline_style)
            .unwrap_or_default()
    }

    /// Set a single inline style property, keeping the others.
    pub fn set_style(&mut self, id: NodeId, property: &str, value: &str) {
        let mut style = self.style(id);
        style.set(property, value);
        self.set_attr(id, "style", style.to_inline());
    }

    /// `display: none` on the element or any ancestor.
    pub fn is_hidden(&self, id: NodeId) -> bool {
        let mut cur = Some(id);
        while let Some(n) = cur {
            if self.style(n).get("display") == Some("none") {
                return true;
            }
            cur = self.node(n).and_then(|node| node.parent);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_tree() -> (DomTree, NodeId, NodeId) {
        let mut tree = DomTree::new("about:blank");
        let root = tree.root();
        let mut attrs = HashMap::new();
        attrs.insert("class".to_string(), "hero-slide".to_string());
        let div = tree.push_element(root, "div", attrs);
        let span = tree.push_element(div, "span", HashMap::new());
        tree.push_text(span, "+91 98765 43210");
        (tree, div, span)
    }

    #[test]
    fn class_toggles_keep_other_classes() {
        let (mut tree, div, _) = small_tree();
        tree.set_class(div, "active", true);
        assert_eq!(tree.attr(div, "class"), Some("hero-slide active"));
        tree.set_class(div, "active", true);
        assert_eq!(tree.attr(div, "class"), Some("hero-slide active"));
        assert!(!tree.toggle_class(div, "active"));
        assert_eq!(tree.attr(div, "class"), Some("hero-slide"));
    }

    #[test]
    fn text_content_and_replace() {
        let (mut tree, div, span) = small_tree();
        assert_eq!(tree.text_content(div), "+91 98765 43210");
        tree.set_text(span, "▶");
        assert_eq!(tree.text_content(div), "▶");
        assert!(tree.is_descendant_of(span, div));
    }

    #[test]
    fn repeated_set_text_reuses_text_node() {
        let (mut tree, div, span) = small_tree();
        tree.set_text(span, "Copied!");
        let arena = tree.nodes.len();
        let text = tree.node(span).unwrap().children[0];
        for label in ["Copy", "Copied!", "▶", "⏸"] {
            tree.set_text(span, label);
            assert_eq!(tree.text_content(span), label);
        }
        assert_eq!(tree.nodes.len(), arena);
        assert_eq!(tree.node(span).unwrap().children, vec![text]);

        // an element child is replaced, not rewritten
        tree.set_text(div, "done");
        assert_eq!(tree.text_content(div), "done");
        assert!(!tree.is_descendant_of(span, div));
        assert_eq!(tree.nodes.len(), arena + 1);
    }

    #[test]
    fn style_properties_are_merged() {
        let (mut tree, div, span) = small_tree();
        tree.set_style(div, "opacity", "0");
        tree.set_style(div, "transform", "translateY(20px)");
        tree.set_style(div, "opacity", "1");
        let style = tree.style(div);
        assert_eq!(style.get("opacity"), Some("1"));
        assert_eq!(style.get("transform"), Some("translateY(20px)"));

        assert!(!tree.is_hidden(span));
        tree.set_style(div, "display", "none");
        assert!(tree.is_hidden(span));
    }
}
