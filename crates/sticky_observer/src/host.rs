//! Contracts between the coordinator and the document that hosts it.
//!
//! The coordinator never owns page elements. It refers to them through
//! [`NodeKey`]s and asks the host to measure or mutate them.

use crate::geometry::Rect;
use anyhow::Result;
use core::fmt;
use serde::{Deserialize, Serialize};

/// A 64-bit stable key for document nodes.
///
/// Keys are plain identifiers: holding one does not keep the node alive.
#[derive(
    Copy, Clone, Eq, PartialEq, Hash, Debug, Default, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeKey(pub u64);

impl NodeKey {
    /// The document node key (always present).
    pub const ROOT: Self = Self(0);
}

impl fmt::Display for NodeKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "#{}", self.0)
    }
}

/// Used value of the CSS `position` property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    #[default]
    Static,
    Relative,
    Absolute,
    Fixed,
    Sticky,
}

impl Position {
    /// Parse a `position` keyword. Unknown values resolve to `Static`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "relative" => Self::Relative,
            "absolute" => Self::Absolute,
            "fixed" => Self::Fixed,
            "sticky" | "-webkit-sticky" => Self::Sticky,
            _ => Self::Static,
        }
    }

    /// Whether descendants with `position: absolute` anchor to this element.
    #[inline]
    pub fn establishes_containing_block(self) -> bool {
        !matches!(self, Self::Static)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Relative => "relative",
            Self::Absolute => "absolute",
            Self::Fixed => "fixed",
            Self::Sticky => "sticky",
        }
    }
}

/// Read-only geometry queries used by visibility watchers.
pub trait LayoutSource {
    /// Border box of `node` in client coordinates, or `None` when the node is
    /// detached or has no box.
    fn bounding_client_rect(&self, node: NodeKey) -> Option<Rect>;

    /// Bounds of the reference frame: the viewport when `root` is `None`,
    /// otherwise the container's box. `None` when it cannot be measured.
    fn root_bounds(&self, root: Option<NodeKey>) -> Option<Rect>;
}

/// Everything the coordinator needs from the document.
pub trait StickyHost: LayoutSource {
    /// Elements matching `selector`, in document order. Invalid selectors
    /// match nothing.
    fn query_selector_all(&self, selector: &str) -> Vec<NodeKey>;

    fn parent(&self, node: NodeKey) -> Option<NodeKey>;

    /// True while `node` is attached to the document.
    fn contains(&self, node: NodeKey) -> bool;

    fn computed_position(&self, node: NodeKey) -> Position;

    /// Create a detached element.
    fn create_element(&mut self, tag: &str) -> NodeKey;

    /// Insert `child` as the first child of `parent`.
    fn prepend_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<()>;

    /// Insert `child` as the last child of `parent`.
    fn append_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<()>;

    /// Detach `node` and its subtree from the document.
    fn remove_node(&mut self, node: NodeKey) -> Result<()>;

    /// Set one inline style property.
    fn set_style(&mut self, node: NodeKey, property: &str, value: &str) -> Result<()>;

    fn set_attribute(&mut self, node: NodeKey, name: &str, value: &str) -> Result<()>;

    fn set_text_content(&mut self, node: NodeKey, text: &str) -> Result<()>;

    fn add_class(&mut self, node: NodeKey, class: &str) -> Result<()>;

    /// Add `class` when `force` is true, remove it otherwise.
    fn toggle_class(&mut self, node: NodeKey, class: &str, force: bool) -> Result<()>;
}
