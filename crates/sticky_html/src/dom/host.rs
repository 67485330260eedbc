//! Observer and selector bindings for [`Document`].

use super::{Document, Placement};
use anyhow::{Result, bail};
use sticky_observer::{NodeKey, Position, StickyHost};
use sticky_selectors::{ElementAdapter, matches_selector_list, parse_selector_list};

/// Read-only view of a document used for selector matching.
#[derive(Clone, Copy)]
pub struct SelectorView<'doc>(pub &'doc Document);

impl ElementAdapter for SelectorView<'_> {
    type Handle = NodeKey;

    fn parent(&self, element: NodeKey) -> Option<NodeKey> {
        self.0.parent_element(element)
    }

    fn previous_sibling_element(&self, element: NodeKey) -> Option<NodeKey> {
        self.0.previous_element_sibling(element)
    }

    fn tag_name(&self, element: NodeKey) -> &str {
        self.0.tag(element).unwrap_or_default()
    }

    fn element_id(&self, element: NodeKey) -> Option<&str> {
        self.0.attribute(element, "id")
    }

    fn has_class(&self, element: NodeKey, class: &str) -> bool {
        self.0.has_class(element, class)
    }

    fn attr(&self, element: NodeKey, name: &str) -> Option<&str> {
        self.0.attribute(element, name)
    }
}

impl Document {
    /// Attached elements matching `selector`, in document order.
    pub fn select(&self, selector: &str) -> Vec<NodeKey> {
        let list = parse_selector_list(selector);
        if list.is_empty() {
            return Vec::new();
        }
        let view = SelectorView(self);
        self.elements()
            .into_iter()
            .filter(|element| matches_selector_list(&view, *element, &list))
            .collect()
    }

    /// First attached element matching `selector`.
    pub fn select_first(&self, selector: &str) -> Option<NodeKey> {
        self.select(selector).into_iter().next()
    }
}

impl StickyHost for Document {
    fn query_selector_all(&self, selector: &str) -> Vec<NodeKey> {
        self.select(selector)
    }

    fn parent(&self, node: NodeKey) -> Option<NodeKey> {
        self.parent_element(node)
    }

    fn contains(&self, node: NodeKey) -> bool {
        self.is_attached(node)
    }

    fn computed_position(&self, node: NodeKey) -> Position {
        self.position_of(node)
    }

    fn create_element(&mut self, tag: &str) -> NodeKey {
        self.new_element(tag)
    }

    fn prepend_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<()> {
        self.insert(parent, child, Placement::First)
    }

    fn append_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<()> {
        self.insert(parent, child, Placement::Last)
    }

    fn remove_node(&mut self, node: NodeKey) -> Result<()> {
        self.detach(node)
    }

    fn set_style(&mut self, node: NodeKey, property: &str, value: &str) -> Result<()> {
        self.write_style(node, property, value)
    }

    fn set_attribute(&mut self, node: NodeKey, name: &str, value: &str) -> Result<()> {
        self.write_attribute(node, name, value)
    }

    fn set_text_content(&mut self, node: NodeKey, text: &str) -> Result<()> {
        if node == NodeKey::ROOT {
            bail!("cannot replace the text of the document node");
        }
        self.replace_text(node, text)
    }

    fn add_class(&mut self, node: NodeKey, class: &str) -> Result<()> {
        self.set_class_present(node, class, true)
    }

    fn toggle_class(&mut self, node: NodeKey, class: &str, force: bool) -> Result<()> {
        self.set_class_present(node, class, force)
    }
}
