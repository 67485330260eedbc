//! Box geometry for the headless document.
//!
//! The page supplies boxes in document coordinates. Absolutely positioned
//! elements without a supplied box are placed against their containing
//! block from their inline offsets. Client rects subtract the scroll offset
//! of every enclosing scroll container and of the viewport.

use super::style::parse_px;
use super::{Document, Viewport};
use anyhow::{Result, bail};
use log::trace;
use sticky_observer::{LayoutSource, NodeKey, Position, Rect};

impl Document {
    /// Supply the border box of `node` in document coordinates.
    pub fn set_layout(&mut self, node: NodeKey, rect: Rect) {
        self.boxes.insert(node, rect);
    }

    /// Drop a supplied box.
    pub fn clear_layout(&mut self, node: NodeKey) {
        self.boxes.remove(&node);
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport.width = width;
        self.viewport.height = height;
    }

    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn scroll_viewport_to(&mut self, scroll_y: f64) {
        self.viewport.scroll_y = scroll_y;
    }

    /// Let `node` scroll its descendants. Starts at offset 0.
    pub fn make_scroll_container(&mut self, node: NodeKey) {
        self.scroll_offsets.entry(node).or_insert(0.0);
    }

    /// Scroll a container's content.
    ///
    /// # Errors
    ///
    /// Fails when `node` was not made a scroll container.
    pub fn scroll_to(&mut self, node: NodeKey, scroll_y: f64) -> Result<()> {
        let Some(offset) = self.scroll_offsets.get_mut(&node) else {
            bail!("node {node} is not a scroll container");
        };
        *offset = scroll_y;
        Ok(())
    }

    pub fn scroll_offset(&self, node: NodeKey) -> Option<f64> {
        self.scroll_offsets.get(&node).copied()
    }

    /// Used `position` from the inline style.
    pub fn position_of(&self, node: NodeKey) -> Position {
        self.style_property(node, "position")
            .map_or(Position::Static, |value| Position::parse(&value))
    }

    /// The initial containing block: a viewport-sized box at the origin.
    fn initial_containing_block(&self) -> Rect {
        Rect::new(0.0, 0.0, self.viewport.width, self.viewport.height)
    }

    /// Border box of an attached element in document coordinates.
    pub fn document_rect(&self, node: NodeKey) -> Option<Rect> {
        if !self.is_element(node) || !self.is_attached(node) {
            return None;
        }
        if let Some(rect) = self.boxes.get(&node) {
            return Some(*rect);
        }
        if self.position_of(node) != Position::Absolute {
            return None;
        }
        let containing = match self.containing_block_of(node) {
            Some(ancestor) => self.document_rect(ancestor)?,
            None => self.initial_containing_block(),
        };
        Some(self.resolve_absolute(node, containing))
    }

    /// Nearest ancestor element that positions absolute descendants.
    pub fn containing_block_of(&self, node: NodeKey) -> Option<NodeKey> {
        let mut current = self.parent_element(node);
        while let Some(ancestor) = current {
            if self.position_of(ancestor).establishes_containing_block() {
                return Some(ancestor);
            }
            current = self.parent_element(ancestor);
        }
        None
    }

    fn resolve_absolute(&self, node: NodeKey, containing: Rect) -> Rect {
        let px = |property: &str| {
            self.style_property(node, property)
                .and_then(|value| parse_px(&value))
        };
        let height = px("height").unwrap_or(0.0);
        let y = match (px("top"), px("bottom")) {
            (Some(top), _) => containing.top() + top,
            (None, Some(bottom)) => containing.bottom() - bottom - height,
            (None, None) => containing.top(),
        };
        let (x, width) = match (px("left"), px("right"), px("width")) {
            (Some(left), _, Some(width)) => (containing.left() + left, width),
            (Some(left), Some(right), None) => {
                (containing.left() + left, containing.width - left - right)
            }
            (Some(left), None, None) => (containing.left() + left, 0.0),
            (None, Some(right), width) => {
                let width = width.unwrap_or(0.0);
                (containing.right() - right - width, width)
            }
            (None, None, width) => (containing.left(), width.unwrap_or(0.0)),
        };
        trace!("resolved absolute {node} to ({x}, {y}) {width}x{height}");
        Rect::new(x, y, width, height)
    }

    /// Total scroll applied to `node`'s content position.
    fn scroll_above(&self, node: NodeKey) -> f64 {
        let mut total = self.viewport.scroll_y;
        let mut current = self.parent_element(node);
        while let Some(ancestor) = current {
            total += self.scroll_offsets.get(&ancestor).copied().unwrap_or(0.0);
            current = self.parent_element(ancestor);
        }
        total
    }
}

impl LayoutSource for Document {
    fn bounding_client_rect(&self, node: NodeKey) -> Option<Rect> {
        let rect = self.document_rect(node)?;
        Some(rect.translate(0.0, -self.scroll_above(node)))
    }

    fn root_bounds(&self, root: Option<NodeKey>) -> Option<Rect> {
        match root {
            None => Some(Rect::new(0.0, 0.0, self.viewport.width, self.viewport.height)),
            Some(container) => self.bounding_client_rect(container),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sticky_observer::StickyHost as _;

    fn page() -> Result<(Document, NodeKey)> {
        let mut doc = Document::new();
        let body = doc.append_element(NodeKey::ROOT, "body")?;
        let section = doc.append_element(body, "section")?;
        doc.set_layout(section, Rect::new(0.0, 1000.0, 800.0, 500.0));
        Ok((doc, section))
    }

    #[test]
    fn absolute_children_anchor_to_positioned_parent() -> Result<()> {
        let (mut doc, section) = page()?;
        doc.set_style(section, "position", "relative")?;
        let marker = doc.append_element(section, "div")?;
        for (property, value) in [
            ("position", "absolute"),
            ("bottom", "0"),
            ("left", "0"),
            ("right", "0"),
            ("height", "10px"),
        ] {
            doc.set_style(marker, property, value)?;
        }
        assert_eq!(
            doc.document_rect(marker),
            Some(Rect::new(0.0, 1490.0, 800.0, 10.0))
        );
        doc.scroll_viewport_to(1000.0);
        assert_eq!(
            doc.bounding_client_rect(marker),
            Some(Rect::new(0.0, 490.0, 800.0, 10.0))
        );
        Ok(())
    }

    #[test]
    fn static_parent_falls_back_to_initial_containing_block() -> Result<()> {
        let (mut doc, section) = page()?;
        let marker = doc.append_element(section, "div")?;
        doc.set_style(marker, "position", "absolute")?;
        doc.set_style(marker, "top", "0")?;
        doc.set_style(marker, "height", "10px")?;
        assert_eq!(doc.containing_block_of(marker), None);
        assert_eq!(doc.document_rect(marker).map(|rect| rect.y), Some(0.0));
        Ok(())
    }

    #[test]
    fn detached_and_boxless_nodes_are_unmeasurable() -> Result<()> {
        let (mut doc, section) = page()?;
        let plain = doc.append_element(section, "p")?;
        assert_eq!(doc.bounding_client_rect(plain), None);
        doc.remove_node(section)?;
        assert_eq!(doc.bounding_client_rect(section), None);
        Ok(())
    }

    #[test]
    fn container_scroll_moves_descendants_only() -> Result<()> {
        let mut doc = Document::new();
        let scroller = doc.append_element(NodeKey::ROOT, "div")?;
        let inner = doc.append_element(scroller, "div")?;
        doc.set_layout(scroller, Rect::new(0.0, 0.0, 800.0, 400.0));
        doc.set_layout(inner, Rect::new(0.0, 100.0, 800.0, 50.0));
        doc.make_scroll_container(scroller);
        doc.scroll_to(scroller, 80.0)?;
        assert_eq!(doc.bounding_client_rect(inner).map(|rect| rect.y), Some(20.0));
        assert_eq!(doc.root_bounds(Some(scroller)), Some(Rect::new(0.0, 0.0, 800.0, 400.0)));
        assert!(doc.scroll_to(inner, 1.0).is_err());
        Ok(())
    }
}
