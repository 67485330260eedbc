use anyhow::{Result, anyhow, bail};
use indextree::{Arena, Node, NodeId};
use smallvec::SmallVec;
use std::collections::HashMap;
use sticky_observer::{NodeKey, Rect};

pub mod host;
pub mod layout;
pub mod printing;
pub mod style;

#[derive(Debug, Clone, Default)]
pub enum NodeKind {
    #[default]
    Document,
    Element { tag: String },
    Text { text: String },
}

#[derive(Debug, Clone, Default)]
pub struct DomNode {
    pub key: NodeKey,
    pub kind: NodeKind,
    pub attrs: SmallVec<[(String, String); 4]>,
}

/// Viewport size and scroll offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scroll_y: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            scroll_y: 0.0,
        }
    }
}

/// An in-memory document with externally supplied layout.
///
/// Nodes are addressed by [`NodeKey`]. Removing a node detaches it; its key
/// stays valid and the node can be re-inserted.
pub struct Document {
    dom: Arena<DomNode>,
    root: NodeId,
    ids: HashMap<NodeKey, NodeId>,
    next_key: u64,
    /// Boxes in document coordinates.
    boxes: HashMap<NodeKey, Rect>,
    viewport: Viewport,
    /// Vertical scroll offset of each scroll container.
    scroll_offsets: HashMap<NodeKey, f64>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut dom = Arena::new();
        let root = dom.new_node(DomNode {
            key: NodeKey::ROOT,
            ..DomNode::default()
        });
        let mut ids = HashMap::new();
        ids.insert(NodeKey::ROOT, root);
        Self {
            dom,
            root,
            ids,
            next_key: 1,
            boxes: HashMap::new(),
            viewport: Viewport::default(),
            scroll_offsets: HashMap::new(),
        }
    }

    /// The document node.
    #[inline]
    pub const fn root(&self) -> NodeKey {
        NodeKey::ROOT
    }

    fn id(&self, key: NodeKey) -> Result<NodeId> {
        self.ids
            .get(&key)
            .copied()
            .ok_or_else(|| anyhow!("unknown node {key}"))
    }

    fn node(&self, key: NodeKey) -> Option<&DomNode> {
        let id = self.ids.get(&key)?;
        self.dom.get(*id).map(|node| node.get())
    }

    fn node_mut(&mut self, key: NodeKey) -> Result<&mut DomNode> {
        let id = self.id(key)?;
        self.dom
            .get_mut(id)
            .map(|node| node.get_mut())
            .ok_or_else(|| anyhow!("node {key} was freed"))
    }

    fn element_mut(&mut self, key: NodeKey) -> Result<&mut DomNode> {
        let node = self.node_mut(key)?;
        if !matches!(node.kind, NodeKind::Element { .. }) {
            bail!("node {key} is not an element");
        }
        Ok(node)
    }

    fn key_of(&self, id: NodeId) -> Option<NodeKey> {
        self.dom.get(id).map(|node| node.get().key)
    }

    fn new_node(&mut self, kind: NodeKind) -> NodeKey {
        let key = NodeKey(self.next_key);
        self.next_key += 1;
        let id = self.dom.new_node(DomNode {
            key,
            kind,
            attrs: SmallVec::new(),
        });
        self.ids.insert(key, id);
        key
    }

    pub(crate) fn new_element(&mut self, tag: &str) -> NodeKey {
        self.new_node(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
        })
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeKey {
        self.new_node(NodeKind::Text {
            text: text.to_owned(),
        })
    }

    /// Create an element and append it to `parent`.
    ///
    /// # Errors
    ///
    /// Fails when `parent` is unknown or cannot have children.
    pub fn append_element(&mut self, parent: NodeKey, tag: &str) -> Result<NodeKey> {
        let element = self.new_element(tag);
        self.insert(parent, element, Placement::Last)?;
        Ok(element)
    }

    /// Insert `child` before `reference`, which must be attached to a parent.
    ///
    /// # Errors
    ///
    /// Fails when either node is unknown, or when `reference` has no parent.
    pub fn insert_before(&mut self, reference: NodeKey, child: NodeKey) -> Result<()> {
        let reference_id = self.id(reference)?;
        let parent = self
            .dom
            .get(reference_id)
            .and_then(Node::parent)
            .ok_or_else(|| anyhow!("node {reference} has no parent"))?;
        let child_id = self.id(child)?;
        self.check_insertable(parent, child_id)?;
        child_id.detach(&mut self.dom);
        reference_id
            .checked_insert_before(child_id, &mut self.dom)
            .map_err(|err| anyhow!("cannot insert {child} before {reference}: {err:?}"))
    }

    pub(crate) fn insert(
        &mut self,
        parent: NodeKey,
        child: NodeKey,
        placement: Placement,
    ) -> Result<()> {
        let parent_id = self.id(parent)?;
        let child_id = self.id(child)?;
        self.check_insertable(parent_id, child_id)?;
        child_id.detach(&mut self.dom);
        let inserted = match placement {
            Placement::First => parent_id.checked_prepend(child_id, &mut self.dom),
            Placement::Last => parent_id.checked_append(child_id, &mut self.dom),
        };
        inserted.map_err(|err| anyhow!("cannot insert {child} into {parent}: {err:?}"))
    }

    fn check_insertable(&self, parent: NodeId, child: NodeId) -> Result<()> {
        let parent_kind = self.dom.get(parent).map(|node| &node.get().kind);
        if matches!(parent_kind, Some(NodeKind::Text { .. })) {
            bail!("text nodes cannot have children");
        }
        if child == self.root {
            bail!("the document node cannot be inserted");
        }
        if parent.ancestors(&self.dom).any(|ancestor| ancestor == child) {
            bail!("cannot insert a node into its own subtree");
        }
        Ok(())
    }

    pub(crate) fn detach(&mut self, key: NodeKey) -> Result<()> {
        let id = self.id(key)?;
        if id == self.root {
            bail!("the document node cannot be removed");
        }
        id.detach(&mut self.dom);
        Ok(())
    }

    /// Parent node, including the document node.
    pub fn parent_node(&self, key: NodeKey) -> Option<NodeKey> {
        let id = self.ids.get(&key)?;
        let parent = self.dom.get(*id)?.parent()?;
        self.key_of(parent)
    }

    /// Parent, if it is an element.
    pub fn parent_element(&self, key: NodeKey) -> Option<NodeKey> {
        self.parent_node(key).filter(|parent| self.is_element(*parent))
    }

    /// Children in tree order, text included.
    pub fn children(&self, key: NodeKey) -> Vec<NodeKey> {
        let Some(id) = self.ids.get(&key) else {
            return Vec::new();
        };
        id.children(&self.dom)
            .filter_map(|child| self.key_of(child))
            .collect()
    }

    /// Element children in tree order.
    pub fn element_children(&self, key: NodeKey) -> Vec<NodeKey> {
        self.children(key)
            .into_iter()
            .filter(|child| self.is_element(*child))
            .collect()
    }

    /// Previous sibling that is an element.
    pub fn previous_element_sibling(&self, key: NodeKey) -> Option<NodeKey> {
        let id = self.ids.get(&key)?;
        id.preceding_siblings(&self.dom)
            .skip(1)
            .filter_map(|sibling| self.key_of(sibling))
            .find(|sibling| self.is_element(*sibling))
    }

    /// True when `key` is reachable from the document node.
    pub fn is_attached(&self, key: NodeKey) -> bool {
        self.ids
            .get(&key)
            .is_some_and(|id| id.ancestors(&self.dom).any(|ancestor| ancestor == self.root))
    }

    /// Attached elements in document order.
    pub fn elements(&self) -> Vec<NodeKey> {
        self.root
            .descendants(&self.dom)
            .filter_map(|id| self.key_of(id))
            .filter(|key| self.is_element(*key))
            .collect()
    }

    pub fn is_element(&self, key: NodeKey) -> bool {
        matches!(
            self.node(key).map(|node| &node.kind),
            Some(NodeKind::Element { .. })
        )
    }

    /// Lowercase tag name of an element.
    pub fn tag(&self, key: NodeKey) -> Option<&str> {
        match &self.node(key)?.kind {
            NodeKind::Element { tag } => Some(tag),
            NodeKind::Document | NodeKind::Text { .. } => None,
        }
    }

    pub fn attribute(&self, key: NodeKey, name: &str) -> Option<&str> {
        self.node(key)?
            .attrs
            .iter()
            .find(|(attr_name, _)| attr_name == name)
            .map(|(_, value)| value.as_str())
    }

    pub(crate) fn write_attribute(&mut self, key: NodeKey, name: &str, value: &str) -> Result<()> {
        let node = self.element_mut(key)?;
        let name = name.to_ascii_lowercase();
        if let Some(slot) = node.attrs.iter_mut().find(|(attr_name, _)| *attr_name == name) {
            value.clone_into(&mut slot.1);
        } else {
            node.attrs.push((name, value.to_owned()));
        }
        Ok(())
    }

    /// Remove an attribute. Returns whether it was present.
    ///
    /// # Errors
    ///
    /// Fails when `key` is not an element.
    pub fn remove_attribute(&mut self, key: NodeKey, name: &str) -> Result<bool> {
        let node = self.element_mut(key)?;
        let before = node.attrs.len();
        node.attrs.retain(|(attr_name, _)| attr_name != name);
        Ok(node.attrs.len() != before)
    }

    /// Class tokens in attribute order.
    pub fn class_list(&self, key: NodeKey) -> Vec<&str> {
        self.attribute(key, "class")
            .map(|classes| classes.split_ascii_whitespace().collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, key: NodeKey, class: &str) -> bool {
        self.class_list(key).contains(&class)
    }

    pub(crate) fn set_class_present(
        &mut self,
        key: NodeKey,
        class: &str,
        present: bool,
    ) -> Result<()> {
        if class.is_empty() || class.contains(|character: char| character.is_ascii_whitespace()) {
            bail!("invalid class token {class:?}");
        }
        let mut tokens: Vec<String> = self
            .class_list(key)
            .into_iter()
            .filter(|token| *token != class)
            .map(str::to_owned)
            .collect();
        if present {
            tokens.push(class.to_owned());
        }
        if tokens.is_empty() {
            self.remove_attribute(key, "class")?;
            return Ok(());
        }
        self.write_attribute(key, "class", &tokens.join(" "))
    }

    /// Remove a class token.
    ///
    /// # Errors
    ///
    /// Fails when `key` is not an element or `class` is not a single token.
    pub fn remove_class(&mut self, key: NodeKey, class: &str) -> Result<()> {
        self.set_class_present(key, class, false)
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, key: NodeKey) -> String {
        let Some(id) = self.ids.get(&key) else {
            return String::new();
        };
        id.descendants(&self.dom)
            .filter_map(|desc| match &self.dom.get(desc)?.get().kind {
                NodeKind::Text { text } => Some(text.as_str()),
                NodeKind::Document | NodeKind::Element { .. } => None,
            })
            .collect()
    }

    pub(crate) fn replace_text(&mut self, key: NodeKey, text: &str) -> Result<()> {
        let id = self.id(key)?;
        if let Some(NodeKind::Text { text: existing }) =
            self.dom.get_mut(id).map(|node| &mut node.get_mut().kind)
        {
            text.clone_into(existing);
            return Ok(());
        }
        let children: Vec<NodeId> = id.children(&self.dom).collect();
        for child in children {
            child.detach(&mut self.dom);
        }
        if !text.is_empty() {
            let text_node = self.create_text(text);
            self.insert(key, text_node, Placement::Last)?;
        }
        Ok(())
    }

    /// Value of one inline style property.
    pub fn style_property(&self, key: NodeKey, property: &str) -> Option<String> {
        style::property_value(self.attribute(key, "style")?, property)
    }

    pub(crate) fn write_style(&mut self, key: NodeKey, property: &str, value: &str) -> Result<()> {
        let current = self.attribute(key, "style").unwrap_or_default().to_owned();
        let updated = style::set_property(&current, property, value);
        self.write_attribute(key, "style", &updated)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement {
    First,
    Last,
}
