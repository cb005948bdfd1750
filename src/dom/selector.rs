//! CSS selector queries over the page arena.
//!
//! Selectors are parsed with scraper's selector grammar and matched by the
//! `selectors` engine against the live arena, so class changes made by the
//! components are visible to later queries.

use scraper::selector::{CssLocalName, CssString, NonTSPseudoClass, Parser, PseudoElement, Simple};
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::matching::{
    self, ElementSelectorFlags, IgnoreNthChildForInvalidation, MatchingContext, MatchingMode,
    NeedsSelectorFlags, QuirksMode,
};
use selectors::parser::{ParseRelative, SelectorImpl};
use selectors::{Element, NthIndexCache, OpaqueElement, SelectorList};

use crate::dom::{DomNode, DomTree, NodeId, NodeType};
use crate::error::SiteError;

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// A parsed selector list.
#[derive(Debug, Clone)]
pub struct Selector {
    list: SelectorList<Simple>,
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self, SiteError> {
        let mut parser_input = cssparser::ParserInput::new(input);
        let mut parser = cssparser::Parser::new(&mut parser_input);
        SelectorList::parse(&Parser, &mut parser, ParseRelative::No)
            .map(|list| Self { list })
            .map_err(|_| SiteError::Selector(input.to_string()))
    }

    /// Does element `id` match any selector of the list?
    pub fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        self.matches_in_scope(tree, id, None)
    }

    /// Like [`Selector::matches`], with `:scope` bound to `scope`.
    pub fn matches_in_scope(&self, tree: &DomTree, id: NodeId, scope: Option<NodeId>) -> bool {
        let Some(element) = ArenaElement::new(tree, id) else {
            return false;
        };
        let mut nth_cache = NthIndexCache::default();
        let mut context = MatchingContext::new(
            MatchingMode::Normal,
            None,
            &mut nth_cache,
            QuirksMode::NoQuirks,
            NeedsSelectorFlags::No,
            IgnoreNthChildForInvalidation::No,
        );
        context.scope_element = scope
            .and_then(|s| ArenaElement::new(tree, s))
            .map(|s| s.opaque());
        matching::matches_selector_list(&self.list, &element, &mut context)
    }
}

/// An element node of the arena as seen by the selector engine.
#[derive(Debug, Clone, Copy)]
struct ArenaElement<'a> {
    tree: &'a DomTree,
    id: NodeId,
    node: &'a DomNode,
}

impl<'a> ArenaElement<'a> {
    fn new(tree: &'a DomTree, id: NodeId) -> Option<Self> {
        let node = tree.node(id).filter(|n| n.is_element())?;
        Some(Self { tree, id, node })
    }

    /// Element siblings including self, and our position among them.
    fn element_siblings(&self) -> Option<(Vec<NodeId>, usize)> {
        let parent = self.tree.node(self.node.parent?)?;
        let siblings: Vec<NodeId> = parent
            .children
            .iter()
            .copied()
            .filter(|c| self.tree.node(*c).is_some_and(|n| n.is_element()))
            .collect();
        let pos = siblings.iter().position(|c| *c == self.id)?;
        Some((siblings, pos))
    }
}

impl<'a> Element for ArenaElement<'a> {
    type Impl = Simple;

    fn opaque(&self) -> OpaqueElement {
        OpaqueElement::new(self.node)
    }

    fn parent_element(&self) -> Option<Self> {
        ArenaElement::new(self.tree, self.node.parent?)
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        let (siblings, pos) = self.element_siblings()?;
        let prev = *siblings.get(pos.checked_sub(1)?)?;
        ArenaElement::new(self.tree, prev)
    }

    fn next_sibling_element(&self) -> Option<Self> {
        let (siblings, pos) = self.element_siblings()?;
        ArenaElement::new(self.tree, *siblings.get(pos + 1)?)
    }

    fn first_element_child(&self) -> Option<Self> {
        self.node
            .children
            .iter()
            .find_map(|c| ArenaElement::new(self.tree, *c))
    }

    fn is_html_element_in_html_document(&self) -> bool {
        true
    }

    fn has_local_name(&self, local_name: &<Simple as SelectorImpl>::BorrowedLocalName) -> bool {
        self.node.tag.as_str() == &*local_name.0
    }

    fn has_namespace(&self, ns: &<Simple as SelectorImpl>::BorrowedNamespaceUrl) -> bool {
        &**ns == HTML_NAMESPACE
    }

    fn is_same_type(&self, other: &Self) -> bool {
        self.node.tag == other.node.tag
    }

    fn attr_matches(
        &self,
        ns: &NamespaceConstraint<&<Simple as SelectorImpl>::NamespaceUrl>,
        local_name: &CssLocalName,
        operation: &AttrSelectorOperation<&CssString>,
    ) -> bool {
        // arena attributes carry no namespace
        if let NamespaceConstraint::Specific(url) = ns {
            if !url.is_empty() {
                return false;
            }
        }
        self.node
            .attributes
            .get(&*local_name.0)
            .is_some_and(|value| operation.eval_str(value))
    }

    fn match_non_ts_pseudo_class(
        &self,
        pc: &NonTSPseudoClass,
        _context: &mut MatchingContext<'_, Simple>,
    ) -> bool {
        match *pc {}
    }

    fn match_pseudo_element(
        &self,
        pe: &PseudoElement,
        _context: &mut MatchingContext<'_, Simple>,
    ) -> bool {
        match *pe {}
    }

    fn apply_selector_flags(&self, _flags: ElementSelectorFlags) {}

    fn is_link(&self) -> bool {
        matches!(self.node.tag.as_str(), "a" | "area") && self.node.attributes.contains_key("href")
    }

    fn is_html_slot_element(&self) -> bool {
        false
    }

    fn has_id(&self, id: &CssLocalName, case_sensitivity: CaseSensitivity) -> bool {
        self.node
            .attr("id")
            .is_some_and(|own| case_sensitivity.eq(id.0.as_bytes(), own.as_bytes()))
    }

    fn has_class(&self, name: &CssLocalName, case_sensitivity: CaseSensitivity) -> bool {
        self.node.attr("class").is_some_and(|list| {
            list.split_whitespace()
                .any(|c| case_sensitivity.eq(name.0.as_bytes(), c.as_bytes()))
        })
    }

    fn imported_part(&self, _name: &CssLocalName) -> Option<CssLocalName> {
        None
    }

    fn is_part(&self, _name: &CssLocalName) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        !self.node.children.iter().any(|c| {
            self.tree.node(*c).is_some_and(|n| match n.node_type {
                NodeType::Element => true,
                NodeType::Text => !n.text.is_empty(),
                NodeType::Document => false,
            })
        })
    }

    fn is_root(&self) -> bool {
        self.node
            .parent
            .and_then(|p| self.tree.node(p))
            .is_some_and(|p| p.node_type == NodeType::Document)
    }
}

impl DomTree {
    /// All elements matching `selector`, in document order.
    pub fn select(&self, selector: &str) -> Result<Vec<NodeId>, SiteError> {
        self.select_within(self.root(), selector)
    }

    /// Matching descendants of `scope`, in document order. `:scope` refers
    /// to `scope` itself.
    pub fn select_within(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>, SiteError> {
        let sel = Selector::parse(selector)?;
        Ok(self
            .descendants(scope)
            .into_iter()
            .filter(|id| sel.matches_in_scope(self, *id, Some(scope)))
            .collect())
    }

    pub fn select_one(&self, selector: &str) -> Result<Option<NodeId>, SiteError> {
        Ok(self.select(selector)?.into_iter().next())
    }

    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .find(|n| self.attr(*n, "id") == Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parser::parse_html;

    const PAGE: &str = r##"
        <html><body>
          <section class="hero" id="top">
            <div class="hero-slide active"></div>
            <div class="hero-slide"></div>
            <span class="indicator"></span>
          </section>
          <nav><a class="nav-link" href="#gallery">Gallery</a><a href="/about">About</a></nav>
          <video data-video-id="v1"></video>
          <button class="play-btn" data-video-id="v1">▶</button>
        </body></html>
    "##;

    #[test]
    fn class_id_and_tag_selectors() {
        let tree = parse_html(PAGE, "about:blank");
        assert_eq!(tree.select(".hero-slide").unwrap().len(), 2);
        assert_eq!(tree.select(".hero-slide.active").unwrap().len(), 1);
        assert!(tree.select_one("#top").unwrap().is_some());
        assert!(tree.select_one("section#top.hero").unwrap().is_some());
        assert_eq!(tree.select("nav a").unwrap().len(), 2);
    }

    #[test]
    fn attribute_operators() {
        let tree = parse_html(PAGE, "about:blank");
        assert_eq!(tree.select(r##"a[href^="#"]"##).unwrap().len(), 1);
        assert_eq!(tree.select(r#"video[data-video-id="v1"]"#).unwrap().len(), 1);
        assert_eq!(tree.select("[data-video-id]").unwrap().len(), 2);
        assert_eq!(tree.select("a[href*=bout]").unwrap().len(), 1);
        assert_eq!(tree.select(r#"a[href$="about"]"#).unwrap().len(), 1);
    }

    #[test]
    fn combinators_and_structural_pseudo_classes() {
        let tree = parse_html(PAGE, "about:blank");
        let slides = tree.select(".hero-slide").unwrap();
        assert_eq!(tree.select(".hero > .hero-slide").unwrap(), slides);
        assert_eq!(tree.select(".hero-slide:first-child").unwrap(), vec![slides[0]]);
        assert_eq!(tree.select(".hero-slide:not(.active)").unwrap(), vec![slides[1]]);
        assert_eq!(tree.select(".hero-slide + .hero-slide").unwrap(), vec![slides[1]]);
        assert_eq!(tree.select(".hero-slide ~ span").unwrap().len(), 1);
        assert!(tree.select("body > .hero-slide").unwrap().is_empty());
    }

    #[test]
    fn queries_follow_class_changes() {
        let mut tree = parse_html(PAGE, "about:blank");
        let slides = tree.select(".hero-slide").unwrap();
        tree.set_class(slides[0], "active", false);
        tree.set_class(slides[1], "active", true);
        assert_eq!(tree.select(".hero-slide.active").unwrap(), vec![slides[1]]);
    }

    #[test]
    fn lists_and_scoped_queries() {
        let tree = parse_html(PAGE, "about:blank");
        let all = tree.select(".indicator, .play-btn").unwrap();
        assert_eq!(all.len(), 2);

        let hero = tree.select_one(".hero").unwrap().unwrap();
        assert_eq!(tree.select_within(hero, ".hero-slide").unwrap().len(), 2);
        assert_eq!(tree.select_within(hero, ":scope > .indicator").unwrap().len(), 1);
        assert!(tree.select_within(hero, ".play-btn").unwrap().is_empty());
    }

    #[test]
    fn rejects_invalid_syntax() {
        assert!(matches!(Selector::parse(""), Err(SiteError::Selector(_))));
        assert!(Selector::parse("div >").is_err());
        assert!(Selector::parse(":hover").is_err());
        assert!(Selector::parse("..slide").is_err());
    }
}
