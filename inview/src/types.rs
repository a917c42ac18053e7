use alloc::string::String;

use crate::{ObserveOptions, RootMargin};

/// An axis-aligned rectangle in layout coordinates (CSS pixels).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Returns the overlap of two rects.
    ///
    /// Edge-adjacent rects intersect with a zero-area result; disjoint rects return `None`.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right < left || bottom < top {
            return None;
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }

    /// Grows (or, for negative lengths, shrinks) this rect by a root margin.
    ///
    /// Percentages resolve against this rect's height (top/bottom) or width (left/right).
    /// A rect shrunk past zero collapses to an empty rect.
    pub fn expand_by(&self, margin: &RootMargin) -> Rect {
        let top = margin.top.resolve(self.height);
        let bottom = margin.bottom.resolve(self.height);
        let left = margin.left.resolve(self.width);
        let right = margin.right.resolve(self.width);
        Rect::new(
            self.x - left,
            self.y - top,
            (self.width + left + right).max(0.0),
            (self.height + top + bottom).max(0.0),
        )
    }
}

/// Whether an observed overlap counts as intersecting under `threshold`.
///
/// Platform observers set `is_intersecting` for any overlap regardless of the configured
/// threshold; a target only counts here once `ratio >= threshold`.
pub fn meets_threshold(overlaps: bool, ratio: f64, threshold: f64) -> bool {
    overlaps && ratio >= threshold
}

/// Computes `(is_intersecting, intersection_ratio)` for a target against a root.
///
/// The root is expanded by `options.root_margin` first. The ratio is the visible share of the
/// target's area; a zero-area target touching the root counts as fully visible.
pub fn compute_intersection(root: &Rect, target: &Rect, options: &ObserveOptions) -> (bool, f64) {
    let root = root.expand_by(&options.root_margin);
    let Some(overlap) = root.intersection(target) else {
        return (false, 0.0);
    };

    let target_area = target.area();
    let ratio = if target_area > 0.0 {
        (overlap.area() / target_area).clamp(0.0, 1.0)
    } else {
        1.0
    };

    (meets_threshold(true, ratio, options.threshold), ratio)
}

/// A snapshot emitted by a backend each time it recomputes intersection for a target.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObservationEvent {
    pub is_intersecting: bool,
    /// Visible share of the target, in `[0, 1]`.
    pub intersection_ratio: f64,
    pub bounding_rect: Rect,
    /// Diagnostic identity of the target (e.g. a class name).
    pub target_label: String,
}

impl ObservationEvent {
    pub fn new(target_label: impl Into<String>, is_intersecting: bool, ratio: f64) -> Self {
        Self {
            is_intersecting,
            intersection_ratio: ratio,
            bounding_rect: Rect::default(),
            target_label: target_label.into(),
        }
    }

    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.bounding_rect = rect;
        self
    }
}
