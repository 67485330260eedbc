//! Client-space rectangles and the overlap math visibility watchers need.

/// An axis-aligned rectangle in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[inline]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a rect from its edges. Inverted edges collapse to zero size.
    #[inline]
    pub fn from_edges(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            x: left,
            y: top,
            width: (right - left).max(0.0),
            height: (bottom - top).max(0.0),
        }
    }

    #[inline]
    pub fn top(&self) -> f64 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[inline]
    pub fn left(&self) -> f64 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Same size, moved by the given offsets.
    #[inline]
    #[must_use]
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Overlapping region, including edge-adjacent (zero-area) overlap.
    /// `None` when the rects are disjoint.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let left = self.left().max(other.left());
        let top = self.top().max(other.top());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if left > right || top > bottom {
            return None;
        }
        Some(Self::from_edges(left, top, right, bottom))
    }
}

/// Fraction of `target` visible inside `root`, and whether they intersect at all.
///
/// An intersecting zero-area target reports a ratio of 1, matching how
/// browsers treat collapsed targets.
pub fn intersection_ratio(target: &Rect, root: &Rect) -> (f64, bool) {
    let Some(overlap) = target.intersection(root) else {
        return (0.0, false);
    };
    let target_area = target.area();
    if target_area <= 0.0 {
        return (1.0, true);
    }
    ((overlap.area() / target_area).clamp(0.0, 1.0), true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_of_partially_visible_target() {
        let root = Rect::new(0.0, 0.0, 800.0, 600.0);
        let target = Rect::new(0.0, -5.0, 800.0, 10.0);
        let (ratio, intersecting) = intersection_ratio(&target, &root);
        assert!(intersecting);
        assert!((ratio - 0.5).abs() < 1e-9);
    }

    #[test]
    fn edge_adjacent_target_intersects_with_zero_ratio() {
        let root = Rect::new(0.0, 0.0, 800.0, 600.0);
        let above = Rect::new(0.0, -10.0, 800.0, 10.0);
        assert_eq!(intersection_ratio(&above, &root), (0.0, true));
        let far_above = above.translate(0.0, -1.0);
        assert_eq!(intersection_ratio(&far_above, &root), (0.0, false));
    }

    #[test]
    fn fully_contained_target_has_ratio_one() {
        let root = Rect::new(0.0, 0.0, 800.0, 600.0);
        let target = Rect::new(0.0, 590.0, 800.0, 10.0);
        assert_eq!(intersection_ratio(&target, &root), (1.0, true));
    }

    #[test]
    fn collapsed_target_inside_root_counts_as_fully_visible() {
        let root = Rect::new(0.0, 0.0, 800.0, 600.0);
        let line = Rect::new(0.0, 100.0, 800.0, 0.0);
        assert_eq!(intersection_ratio(&line, &root), (1.0, true));
    }
}
