//! Boundary visibility watchers.
//!
//! A watcher reports when observed targets cross visibility thresholds
//! relative to a reference frame. Hosts with a native notifier can push
//! entries straight into the coordinator; everything else uses
//! [`PollingWatcher`], which measures targets through a [`LayoutSource`]
//! whenever records are requested.

use crate::geometry::{Rect, intersection_ratio};
use crate::host::{LayoutSource, NodeKey};
use smallvec::SmallVec;

/// A geometry snapshot for one target at notification time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub target: NodeKey,
    pub bounding_client_rect: Rect,
    /// Reference frame bounds; `None` when the frame could not be measured.
    pub root_bounds: Option<Rect>,
    pub intersection_ratio: f64,
    pub is_intersecting: bool,
}

impl IntersectionEntry {
    /// Build an entry by measuring `target` against `root_bounds`.
    pub fn measure(target: NodeKey, bounding_client_rect: Rect, root_bounds: Option<Rect>) -> Self {
        let (intersection_ratio, is_intersecting) = root_bounds
            .map_or((0.0, false), |root| intersection_ratio(&bounding_client_rect, &root));
        Self {
            target,
            bounding_client_rect,
            root_bounds,
            intersection_ratio,
            is_intersecting,
        }
    }
}

/// Thresholds and reference frame for one watcher.
#[derive(Debug, Clone, PartialEq)]
pub struct WatcherOptions {
    /// Visibility ratios in `[0, 1]`, ascending.
    pub thresholds: SmallVec<[f64; 2]>,
    /// Scroll container used as the reference frame; `None` is the viewport.
    pub root: Option<NodeKey>,
}

impl WatcherOptions {
    /// Thresholds are clamped to `[0, 1]`, sorted and deduplicated. An empty
    /// list means `[0]`.
    pub fn new(thresholds: &[f64], root: Option<NodeKey>) -> Self {
        let mut sorted: SmallVec<[f64; 2]> = thresholds
            .iter()
            .filter(|value| value.is_finite())
            .map(|value| value.clamp(0.0, 1.0))
            .collect();
        sorted.sort_by(f64::total_cmp);
        sorted.dedup();
        if sorted.is_empty() {
            sorted.push(0.0);
        }
        Self {
            thresholds: sorted,
            root,
        }
    }

    /// Fires whenever a target starts or stops touching the frame.
    pub fn header(root: Option<NodeKey>) -> Self {
        Self::new(&[0.0], root)
    }

    /// Fires whenever a target becomes or stops being fully visible.
    pub fn footer(root: Option<NodeKey>) -> Self {
        Self::new(&[1.0], root)
    }

    /// Number of thresholds the entry has crossed.
    pub fn threshold_index(&self, entry: &IntersectionEntry) -> usize {
        self.thresholds
            .iter()
            .filter(|&&threshold| {
                if threshold == 0.0 {
                    entry.is_intersecting
                } else {
                    entry.is_intersecting && entry.intersection_ratio >= threshold
                }
            })
            .count()
    }
}

/// A source of boundary-crossing notifications.
pub trait VisibilityWatcher {
    /// Start watching `target`. The next batch includes an initial entry for it.
    fn observe(&mut self, target: NodeKey);

    /// Stop watching `target`.
    fn unobserve(&mut self, target: NodeKey);

    /// Stop watching every target. Idempotent.
    fn disconnect(&mut self);

    fn is_connected(&self) -> bool;

    /// Drain pending notifications, in observation order.
    fn take_records(&mut self, layout: &dyn LayoutSource) -> Vec<IntersectionEntry>;
}

/// Builds the watchers a coordinator registers its sentinels with.
pub type WatcherFactory = dyn Fn(WatcherOptions) -> Box<dyn VisibilityWatcher>;

/// The default [`WatcherFactory`].
pub fn polling_factory(options: WatcherOptions) -> Box<dyn VisibilityWatcher> {
    Box::new(PollingWatcher::new(options))
}

#[derive(Debug, Clone)]
struct Observation {
    target: NodeKey,
    /// Crossed-threshold index and intersecting flag at the last notification.
    last: Option<(usize, bool)>,
}

/// Geometry-polling watcher.
///
/// Each call to [`VisibilityWatcher::take_records`] measures every target and
/// reports the ones whose threshold state changed since their last report.
/// Only the latest geometry is seen, so several crossings between two polls
/// coalesce into at most one entry per target.
#[derive(Debug, Clone)]
pub struct PollingWatcher {
    options: WatcherOptions,
    observations: Vec<Observation>,
    connected: bool,
}

impl PollingWatcher {
    pub fn new(options: WatcherOptions) -> Self {
        Self {
            options,
            observations: Vec::new(),
            connected: true,
        }
    }

    pub fn options(&self) -> &WatcherOptions {
        &self.options
    }

    /// Targets currently observed, in observation order.
    pub fn targets(&self) -> impl Iterator<Item = NodeKey> + '_ {
        self.observations.iter().map(|obs| obs.target)
    }
}

impl VisibilityWatcher for PollingWatcher {
    fn observe(&mut self, target: NodeKey) {
        if !self.connected || self.observations.iter().any(|obs| obs.target == target) {
            return;
        }
        self.observations.push(Observation { target, last: None });
    }

    fn unobserve(&mut self, target: NodeKey) {
        self.observations.retain(|obs| obs.target != target);
    }

    fn disconnect(&mut self) {
        self.connected = false;
        self.observations.clear();
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn take_records(&mut self, layout: &dyn LayoutSource) -> Vec<IntersectionEntry> {
        if !self.connected {
            return Vec::new();
        }
        let root_bounds = layout.root_bounds(self.options.root);
        let mut records = Vec::new();
        for obs in &mut self.observations {
            // Unmeasurable targets keep their previous state.
            let Some(rect) = layout.bounding_client_rect(obs.target) else {
                continue;
            };
            let entry = IntersectionEntry::measure(obs.target, rect, root_bounds);
            let state = (self.options.threshold_index(&entry), entry.is_intersecting);
            if obs.last != Some(state) {
                obs.last = Some(state);
                records.push(entry);
            }
        }
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct FakeLayout {
        rects: HashMap<NodeKey, Rect>,
        viewport: Option<Rect>,
    }

    impl LayoutSource for FakeLayout {
        fn bounding_client_rect(&self, node: NodeKey) -> Option<Rect> {
            self.rects.get(&node).copied()
        }

        fn root_bounds(&self, _root: Option<NodeKey>) -> Option<Rect> {
            self.viewport
        }
    }

    fn layout_with(target: NodeKey, y: f64) -> FakeLayout {
        let mut layout = FakeLayout {
            viewport: Some(Rect::new(0.0, 0.0, 800.0, 600.0)),
            ..FakeLayout::default()
        };
        layout.rects.insert(target, Rect::new(0.0, y, 800.0, 10.0));
        layout
    }

    #[test]
    fn first_poll_reports_every_target_once() {
        let target = NodeKey(7);
        let mut watcher = PollingWatcher::new(WatcherOptions::header(None));
        watcher.observe(target);
        watcher.observe(target);
        let layout = layout_with(target, 1000.0);
        assert_eq!(watcher.take_records(&layout).len(), 1);
        assert!(watcher.take_records(&layout).is_empty());
    }

    #[test]
    fn header_reports_touch_transitions_only() {
        let target = NodeKey(7);
        let mut watcher = PollingWatcher::new(WatcherOptions::header(None));
        watcher.observe(target);
        watcher.take_records(&layout_with(target, 1000.0));

        let entering = watcher.take_records(&layout_with(target, 500.0));
        assert_eq!(entering.len(), 1);
        assert!(entering[0].is_intersecting);
        // Moving while still visible is not a crossing.
        assert!(watcher.take_records(&layout_with(target, 3.0)).is_empty());

        let leaving = watcher.take_records(&layout_with(target, -11.0));
        assert_eq!(leaving.len(), 1);
        assert!(!leaving[0].is_intersecting);
    }

    #[test]
    fn footer_reports_full_visibility_transitions() {
        let target = NodeKey(9);
        let mut watcher = PollingWatcher::new(WatcherOptions::footer(None));
        watcher.observe(target);
        watcher.take_records(&layout_with(target, 1000.0));

        // Partially visible: the intersecting flag flips, the threshold index does not.
        let touching = watcher.take_records(&layout_with(target, 595.0));
        assert_eq!(touching.len(), 1);
        assert!(touching[0].intersection_ratio < 1.0);
        let full = watcher.take_records(&layout_with(target, 590.0));
        assert_eq!(full.len(), 1);
        assert_eq!(full[0].intersection_ratio, 1.0);
        let partial = watcher.take_records(&layout_with(target, -5.0));
        assert_eq!(partial.len(), 1);
        assert!((partial[0].intersection_ratio - 0.5).abs() < 1e-9);
    }

    #[test]
    fn disconnected_watcher_is_silent() {
        let target = NodeKey(3);
        let mut watcher = PollingWatcher::new(WatcherOptions::header(None));
        watcher.observe(target);
        watcher.disconnect();
        watcher.disconnect();
        watcher.observe(target);
        assert!(!watcher.is_connected());
        assert!(watcher.take_records(&layout_with(target, 0.0)).is_empty());
    }

    #[test]
    fn unmeasurable_root_still_reports_without_bounds() {
        let target = NodeKey(4);
        let mut watcher = PollingWatcher::new(WatcherOptions::header(Some(NodeKey(99))));
        watcher.observe(target);
        let mut layout = layout_with(target, 0.0);
        layout.viewport = None;
        let records = watcher.take_records(&layout);
        assert_eq!(records.len(), 1);
        assert!(records[0].root_bounds.is_none());
    }

    #[test]
    fn thresholds_are_normalized() {
        let options = WatcherOptions::new(&[1.5, 0.5, f64::NAN, 0.5, -1.0], None);
        assert_eq!(options.thresholds.as_slice(), &[0.0, 0.5, 1.0]);
        assert_eq!(WatcherOptions::new(&[], None).thresholds.as_slice(), &[0.0]);
    }
}
