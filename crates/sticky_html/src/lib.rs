//! A headless document that implements [`sticky_observer::StickyHost`].
//!
//! Layout is not computed: callers supply boxes in document coordinates and
//! drive scrolling explicitly. This is enough to exercise sticky observers
//! deterministically, in tests or in a terminal.

#![forbid(unsafe_code)]
#![allow(
    clippy::missing_docs_in_private_items,
    reason = "Internal implementation details don't need public documentation"
)]
#![allow(
    clippy::missing_inline_in_public_items,
    reason = "Inlining decisions left to compiler for this crate"
)]

pub mod dom;

pub use dom::host::SelectorView;
pub use dom::style::{Declaration, parse_style_attribute};
pub use dom::{Document, DomNode, NodeKind, Viewport};
