//! Per-subject sticky state and the boundary rules that drive it.
//!
//! Two boundary flags are written independently by the top and bottom
//! sentinel callbacks. The stuck flag is never written directly; it is
//! recomputed from the boundary flags after every update.

use crate::watcher::IntersectionEntry;

/// Boundary flags and the derived stuck flag for one subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StickyState {
    /// The subject has scrolled past the frame's top edge.
    pub top_stuck: bool,
    /// The subject has not yet been pushed out by its container's bottom edge.
    pub bottom_stuck: bool,
    /// Derived: `top_stuck && (remain || bottom_stuck)`.
    pub is_stuck: bool,
}

impl Default for StickyState {
    /// Subjects start in normal flow, not yet constrained by the lower edge.
    fn default() -> Self {
        Self {
            top_stuck: false,
            bottom_stuck: true,
            is_stuck: false,
        }
    }
}

impl StickyState {
    /// Recompute the stuck flag. Returns the new value only when it changed.
    pub fn reconcile(&mut self, remain_sticky_beyond_sticky_edge: bool) -> Option<bool> {
        let stuck = derive_stuck(
            self.top_stuck,
            self.bottom_stuck,
            remain_sticky_beyond_sticky_edge,
        );
        if stuck == self.is_stuck {
            return None;
        }
        self.is_stuck = stuck;
        Some(stuck)
    }
}

/// The reconciliation rule.
#[inline]
pub const fn derive_stuck(top_stuck: bool, bottom_stuck: bool, remain: bool) -> bool {
    top_stuck && (remain || bottom_stuck)
}

/// New `top_stuck` value for a top sentinel notification, or `None` to keep
/// the current value.
///
/// Sentinel above the frame means the subject has scrolled past the top edge.
/// Sentinel bottom inside the frame means the subject is back in flow. A
/// sentinel entirely below the frame changes nothing.
pub fn top_boundary_update(entry: &IntersectionEntry) -> Option<bool> {
    let root = entry.root_bounds?;
    let sentinel = entry.bounding_client_rect;
    if sentinel.bottom() < root.top() {
        Some(true)
    } else if sentinel.bottom() < root.bottom() {
        Some(false)
    } else {
        None
    }
}

/// New `bottom_stuck` value for a bottom sentinel notification, or `None` to
/// keep the current value.
///
/// A fully visible sentinel below the frame top means the subject has
/// reached its anchor. A sentinel leaving through the top means the subject
/// is no longer held by the container's bottom edge.
pub fn bottom_boundary_update(entry: &IntersectionEntry) -> Option<bool> {
    let root = entry.root_bounds?;
    let sentinel = entry.bounding_client_rect;
    if sentinel.bottom() > root.top() && entry.intersection_ratio >= 1.0 {
        Some(true)
    } else if sentinel.top() < root.top() && sentinel.bottom() < root.bottom() {
        Some(false)
    } else {
        None
    }
}
