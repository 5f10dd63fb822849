//! Polylines ("line chains") with arc-aware vertices.
//!
//! A [`LineChain`] is an ordered sequence of vertices, optionally closed,
//! where any subrange of vertices may have originated from an [`Arc`]. The
//! chain keeps a per-vertex arc index so that arcs can be round-tripped
//! through clipping and splitting operations (ported from the original
//! router's `SHAPE_LINE_CHAIN`).

use serde::{Deserialize, Serialize};

use crate::arc::Arc;
use crate::point::Point;
use crate::seg::Seg;

/// A polyline, optionally closed, with optional per-vertex arc provenance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LineChain {
    points: Vec<Point>,
    /// `arc_indices[i]` is `Some(arc_id)` if `points[i]` was generated from
    /// `arcs[arc_id]`, or `None` if it is a genuine straight vertex.
    arc_indices: Vec<Option<usize>>,
    arcs: Vec<Arc>,
    closed: bool,
}

impl LineChain {
    /// Creates an empty, open chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a chain from plain points (no arcs), in the given open/closed
    /// state.
    pub fn from_points(points: Vec<Point>, closed: bool) -> Self {
        let arc_indices = vec![None; points.len()];
        Self {
            points,
            arc_indices,
            arcs: Vec::new(),
            closed,
        }
    }

    /// Appends an arc to the chain, converting it to a polyline at the
    /// given `accuracy` and recording arc provenance for the new vertices.
    ///
    /// The arc's own start point is assumed to coincide with the chain's
    /// current last point (or is inserted as the first vertex for an empty
    /// chain) and is therefore not duplicated.
    pub fn append_arc(&mut self, arc: Arc, accuracy: i64) {
        let arc_id = self.arcs.len();
        self.arcs.push(arc);
        let poly = arc.to_polyline(accuracy);

        let start_idx = if self.points.is_empty() { 0 } else { 1 };
        for p in &poly[start_idx..] {
            self.points.push(*p);
            self.arc_indices.push(Some(arc_id));
        }
    }

    /// Appends a plain straight vertex.
    pub fn append_point(&mut self, p: Point) {
        self.points.push(p);
        self.arc_indices.push(None);
    }

    /// The vertices of the chain.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Whether the chain is closed (its last point implicitly connects back
    /// to its first).
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Sets whether the chain is closed.
    pub fn set_closed(&mut self, closed: bool) {
        self.closed = closed;
    }

    /// The number of vertices.
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// The number of segments (accounting for closure).
    pub fn segment_count(&self) -> usize {
        if self.points.len() < 2 {
            0
        } else if self.closed {
            self.points.len()
        } else {
            self.points.len() - 1
        }
    }

    /// Returns segment `i`, wrapping around for closed chains.
    pub fn segment(&self, i: usize) -> Seg {
        let n = self.points.len();
        let a = self.points[i % n];
        let b = self.points[(i + 1) % n];
        Seg::new(a, b)
    }

    /// Iterates the chain's segments.
    pub fn segments(&self) -> impl Iterator<Item = Seg> + '_ {
        (0..self.segment_count()).map(move |i| self.segment(i))
    }

    /// The arc index of vertex `i`, if it was generated from an arc.
    pub fn arc_index_at(&self, i: usize) -> Option<usize> {
        self.arc_indices.get(i).copied().flatten()
    }

    /// The total length of the chain.
    pub fn length(&self) -> i64 {
        self.segments().map(|s| s.length()).sum()
    }

    /// The signed area enclosed by the chain, treated as closed regardless
    /// of [`LineChain::is_closed`] (the shoelace formula). Positive for
    /// counter-clockwise winding.
    pub fn area(&self) -> f64 {
        if self.points.len() < 3 {
            return 0.0;
        }
        let mut sum: i128 = 0;
        let n = self.points.len();
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            sum += a.x as i128 * b.y as i128 - b.x as i128 * a.y as i128;
        }
        sum as f64 / 2.0
    }

    /// Removes consecutive duplicate and collinear vertices.
    pub fn simplify(&mut self) {
        if self.points.len() < 3 {
            return;
        }
        let mut kept_points = Vec::with_capacity(self.points.len());
        let mut kept_arcs = Vec::with_capacity(self.arc_indices.len());

        for i in 0..self.points.len() {
            let p = self.points[i];
            if let Some(&last) = kept_points.last() {
                if last == p {
                    continue;
                }
            }
            kept_points.push(p);
            kept_arcs.push(self.arc_indices[i]);
        }

        // Drop interior vertices that are collinear with their neighbours
        // and not arc-derived (arc vertices are kept verbatim so the arc can
        // be round-tripped).
        let mut result_points = Vec::with_capacity(kept_points.len());
        let mut result_arcs = Vec::with_capacity(kept_arcs.len());
        let n = kept_points.len();
        for i in 0..n {
            if kept_arcs[i].is_none() && n >= 3 {
                let prev = kept_points[(i + n - 1) % n];
                let next = kept_points[(i + 1) % n];
                if !self.closed && (i == 0 || i == n - 1) {
                    // never drop the open chain's endpoints
                } else {
                    let cur = kept_points[i];
                    let cross = (next - prev).cross(cur - prev);
                    if cross == 0 {
                        continue;
                    }
                }
            }
            result_points.push(kept_points[i]);
            result_arcs.push(kept_arcs[i]);
        }

        self.points = result_points;
        self.arc_indices = result_arcs;
    }

    /// Reverses the direction of the chain.
    pub fn reverse(&self) -> LineChain {
        let points = self.points.iter().rev().copied().collect();
        let arc_indices = self.arc_indices.iter().rev().copied().collect();
        LineChain {
            points,
            arc_indices,
            arcs: self.arcs.clone(),
            closed: self.closed,
        }
    }

    /// Splits an open chain at the point on the chain closest to `p`,
    /// returning `(before, after)`, each containing the split point.
    ///
    /// Arc provenance is preserved: a split falling inside an arc-derived
    /// subrange duplicates that arc's index on both sides, so the two
    /// slices remain independently "arc round-trippable" even though
    /// neither carries the whole original arc.
    pub fn split(&self, p: Point) -> (LineChain, LineChain) {
        assert!(!self.closed, "split is only defined for open chains");

        let mut best_seg = 0;
        let mut best_dist = i128::MAX;
        let mut best_point = p;
        for i in 0..self.segment_count() {
            let seg = self.segment(i);
            let d = seg.distance_squared_to_point(p);
            if d < best_dist {
                best_dist = d;
                best_seg = i;
                best_point = seg.nearest_point(p);
            }
        }

        let mut before_points = self.points[..=best_seg].to_vec();
        let mut before_arcs = self.arc_indices[..=best_seg].to_vec();
        if *before_points.last().unwrap() != best_point {
            before_points.push(best_point);
            before_arcs.push(self.arc_index_at(best_seg));
        }

        let mut after_points = vec![best_point];
        let mut after_arcs = vec![self.arc_index_at(best_seg)];
        let rest_start = if self.points.get(best_seg + 1) == Some(&best_point) { best_seg + 2 } else { best_seg + 1 };
        after_points.extend_from_slice(&self.points[rest_start..]);
        after_arcs.extend_from_slice(&self.arc_indices[rest_start..]);

        (
            LineChain {
                points: before_points,
                arc_indices: before_arcs,
                arcs: self.arcs.clone(),
                closed: false,
            },
            LineChain {
                points: after_points,
                arc_indices: after_arcs,
                arcs: self.arcs.clone(),
                closed: false,
            },
        )
    }

    /// Joins this chain with `other`, assuming this chain's last point
    /// coincides with `other`'s first point (as produced by [`Self::split`]).
    pub fn join(&self, other: &LineChain) -> LineChain {
        let mut points = self.points.clone();
        let mut arc_indices = self.arc_indices.clone();

        let arc_offset = self.arcs.len();
        let mut arcs = self.arcs.clone();
        arcs.extend(other.arcs.iter().copied());

        let skip = if !other.points.is_empty() && *points.last().unwrap() == other.points[0] {
            1
        } else {
            0
        };
        for (i, p) in other.points.iter().enumerate().skip(skip) {
            points.push(*p);
            arc_indices.push(other.arc_index_at(i).map(|a| a + arc_offset));
        }

        LineChain {
            points,
            arc_indices,
            arcs,
            closed: false,
        }
    }

    /// Replaces every arc-derived vertex range with its defining arc's
    /// straight chord endpoints removed from tracking (the arcs vector is
    /// cleared and every vertex becomes a plain point), without altering the
    /// vertex sequence. For a closed chain this preserves area, since no
    /// point moves.
    pub fn clear_arcs(&mut self) {
        self.arcs.clear();
        for idx in self.arc_indices.iter_mut() {
            *idx = None;
        }
    }

    /// Whether `p` lies strictly inside the polygon described by treating
    /// this chain as closed (ray casting).
    pub fn contains_point_strict(&self, p: Point) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }
        let mut inside = false;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            let cond = (a.y > p.y) != (b.y > p.y);
            if cond {
                let x_intersect = a.x as f64
                    + (p.y - a.y) as f64 / (b.y - a.y) as f64 * (b.x - a.x) as f64;
                if (p.x as f64) < x_intersect {
                    inside = !inside;
                }
            }
        }
        inside
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_of_unit_square_is_one() {
        let chain = LineChain::from_points(
            vec![
                Point::new(0, 0),
                Point::new(1, 0),
                Point::new(1, 1),
                Point::new(0, 1),
            ],
            true,
        );
        assert_eq!(chain.area(), 1.0);
    }

    #[test]
    fn split_then_join_reproduces_original_sequence() {
        let chain = LineChain::from_points(
            vec![Point::new(0, 0), Point::new(10, 0), Point::new(20, 0)],
            false,
        );
        let (before, after) = chain.split(Point::new(10, 0));
        let joined = before.join(&after);
        assert_eq!(joined.points(), chain.points());
    }

    #[test]
    fn simplify_drops_collinear_interior_vertex() {
        let mut chain = LineChain::from_points(
            vec![Point::new(0, 0), Point::new(5, 0), Point::new(10, 0)],
            false,
        );
        chain.simplify();
        assert_eq!(chain.points(), &[Point::new(0, 0), Point::new(10, 0)]);
    }

    #[test]
    fn clear_arcs_preserves_closed_area() {
        let mut chain = LineChain::from_points(
            vec![
                Point::new(0, 0),
                Point::new(10, 0),
                Point::new(10, 10),
                Point::new(0, 10),
            ],
            true,
        );
        let before = chain.area();
        chain.clear_arcs();
        assert_eq!(chain.area(), before);
    }

    #[test]
    fn point_inside_square_is_detected() {
        let chain = LineChain::from_points(
            vec![
                Point::new(0, 0),
                Point::new(10, 0),
                Point::new(10, 10),
                Point::new(0, 10),
            ],
            true,
        );
        assert!(chain.contains_point_strict(Point::new(5, 5)));
        assert!(!chain.contains_point_strict(Point::new(15, 5)));
    }
}
