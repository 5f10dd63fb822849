//! One-dimensional integer spans, used for layer ranges and axis-aligned
//! rectangle sides.

use serde::{Deserialize, Serialize};
use std::cmp::{max, min};

/// A one-dimensional span `[start, stop]`, always normalized so that
/// `start <= stop`.
#[derive(Debug, Default, Clone, Copy, Hash, Ord, PartialOrd, Serialize, Deserialize, PartialEq, Eq)]
pub struct Span {
    start: i64,
    stop: i64,
}

impl Span {
    /// Creates a new [`Span`] between two integers, normalizing their order.
    pub fn new(start: i64, stop: i64) -> Self {
        Self {
            start: min(start, stop),
            stop: max(start, stop),
        }
    }

    /// Creates a zero-length span at `point`.
    #[inline]
    pub fn from_point(point: i64) -> Self {
        Self {
            start: point,
            stop: point,
        }
    }

    /// The start of the span.
    #[inline]
    pub fn start(&self) -> i64 {
        self.start
    }

    /// The stop of the span.
    #[inline]
    pub fn stop(&self) -> i64 {
        self.stop
    }

    /// The length of the span (`stop - start`).
    #[inline]
    pub fn length(&self) -> i64 {
        self.stop - self.start
    }

    /// The midpoint of the span, rounded down.
    #[inline]
    pub fn center(&self) -> i64 {
        (self.start + self.stop) / 2
    }

    /// Returns a new span expanded by `amount` on both ends.
    pub fn expand_all(self, amount: i64) -> Self {
        Self::new(self.start - amount, self.stop + amount)
    }

    /// Whether this span overlaps `other` (touching counts as overlapping).
    #[inline]
    pub fn intersects(&self, other: &Span) -> bool {
        !(other.stop < self.start || self.stop < other.start)
    }

    /// Whether this span contains `point`.
    #[inline]
    pub fn contains_point(&self, point: i64) -> bool {
        self.start <= point && point <= self.stop
    }

    /// The smallest span containing both `self` and `other`.
    pub fn union(self, other: Span) -> Span {
        Span::new(min(self.start, other.start), max(self.stop, other.stop))
    }

    /// The shortest distance from `point` to this span (zero if contained).
    pub fn distance_to(&self, point: i64) -> i64 {
        if self.contains_point(point) {
            0
        } else {
            min((point - self.start).abs(), (point - self.stop).abs())
        }
    }

    /// The shortest distance between two spans along the same axis (zero if
    /// they intersect).
    pub fn min_distance(self, other: Span) -> i64 {
        max(0, self.union(other).length() - self.length() - other.length())
    }
}

impl From<(i64, i64)> for Span {
    #[inline]
    fn from(tup: (i64, i64)) -> Self {
        Self::new(tup.0, tup.1)
    }
}

/// An inclusive, contiguous range of routing layers `[start, end]`.
///
/// Distinct from [`Span`] only in name, to keep layer-range call sites
/// self-documenting; a layer range is always `start <= end`.
#[derive(Debug, Default, Clone, Copy, Hash, Ord, PartialOrd, Serialize, Deserialize, PartialEq, Eq)]
pub struct LayerRange {
    inner: Span,
}

impl LayerRange {
    /// Creates a layer range spanning `[start, end]`.
    pub fn new(start: i32, end: i32) -> Self {
        Self {
            inner: Span::new(start as i64, end as i64),
        }
    }

    /// Creates a single-layer range.
    pub fn single(layer: i32) -> Self {
        Self::new(layer, layer)
    }

    /// The first (bottom-most) layer in the range.
    pub fn start(&self) -> i32 {
        self.inner.start() as i32
    }

    /// The last (top-most) layer in the range.
    pub fn end(&self) -> i32 {
        self.inner.stop() as i32
    }

    /// Whether this layer range overlaps `other`.
    pub fn overlaps(&self, other: &LayerRange) -> bool {
        self.inner.intersects(&other.inner)
    }

    /// The smallest range containing both `self` and `other`.
    pub fn union(&self, other: LayerRange) -> LayerRange {
        Self { inner: self.inner.union(other.inner) }
    }

    /// Whether this range contains a single layer index.
    pub fn contains_layer(&self, layer: i32) -> bool {
        self.inner.contains_point(layer as i64)
    }

    /// Whether this range is a single layer.
    pub fn is_single_layer(&self) -> bool {
        self.start() == self.end()
    }

    /// Iterates the individual layers in the range.
    pub fn iter(&self) -> impl Iterator<Item = i32> {
        self.start()..=self.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_normalizes_order() {
        let s = Span::new(10, 5);
        assert_eq!(s.start(), 5);
        assert_eq!(s.stop(), 10);
    }

    #[test]
    fn layer_range_overlap() {
        let a = LayerRange::new(0, 2);
        let b = LayerRange::new(2, 4);
        let c = LayerRange::new(3, 4);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn min_distance_is_zero_when_overlapping() {
        let a = Span::new(0, 10);
        let b = Span::new(5, 15);
        assert_eq!(a.min_distance(b), 0);
    }

    #[test]
    fn min_distance_positive_when_separated() {
        let a = Span::new(0, 10);
        let b = Span::new(20, 30);
        assert_eq!(a.min_distance(b), 10);
    }
}
