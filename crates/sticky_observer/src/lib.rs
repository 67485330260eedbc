//! Stuck/unstuck detection for `position: sticky` elements.
//!
//! A [`StickyObserver`] places two zero-interaction sentinels inside the
//! positioned ancestor of every matched subject and watches them through a
//! header and a footer [`VisibilityWatcher`]. Boundary crossings update a
//! per-subject [`StickyState`]; when the derived stuck flag flips, the
//! observer toggles [`STUCK_CLASS`] on the subject and dispatches a
//! [`StickyChange`] to registered listeners.
//!
//! The document is abstracted behind [`StickyHost`], so any tree that can
//! measure client rects and mutate inline styles can drive the observer.

#![forbid(unsafe_code)]
#![allow(
    clippy::missing_docs_in_private_items,
    reason = "Internal implementation details don't need public documentation"
)]
#![allow(
    clippy::missing_inline_in_public_items,
    reason = "Inlining decisions left to compiler for this crate"
)]

pub mod config;
pub mod events;
pub mod geometry;
pub mod host;
pub mod observer;
pub mod sentinel;
pub mod state;
pub mod watcher;

pub use config::StickyObserverOptions;
pub use events::{EventListeners, ListenerId, STUCK_CLASS, StickyChange, StickyEventKind};
pub use geometry::{Rect, intersection_ratio};
pub use host::{LayoutSource, NodeKey, Position, StickyHost};
pub use observer::{DEBUG_SUBJECT_ATTRIBUTE, SentinelPair, StickyObserver};
pub use sentinel::{SENTINEL_THICKNESS_PX, SentinelRole, create_sentinel, sentinel_declarations};
pub use state::{StickyState, bottom_boundary_update, derive_stuck, top_boundary_update};
pub use watcher::{
    IntersectionEntry, PollingWatcher, VisibilityWatcher, WatcherFactory, WatcherOptions,
    polling_factory,
};
