//! Line segments and the segment/segment, segment/point distance and
//! intersection math the collision engine and walkaround algorithm build on.

use serde::{Deserialize, Serialize};

use crate::point::Point;

/// A directed line segment between two points.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Seg {
    /// The start point.
    pub a: Point,
    /// The end point.
    pub b: Point,
}

impl Seg {
    /// Creates a new segment from `a` to `b`.
    #[inline]
    pub fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }

    /// The segment's direction vector, `b - a`.
    #[inline]
    pub fn vector(&self) -> Point {
        self.b - self.a
    }

    /// The segment's length, rounded to the nearest internal unit.
    #[inline]
    pub fn length(&self) -> i64 {
        self.a.distance(self.b)
    }

    /// Whether the segment has zero length.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.a == self.b
    }

    /// The squared distance from `p` to the closest point on the segment.
    pub fn distance_squared_to_point(&self, p: Point) -> i128 {
        let ab = self.vector();
        let ap = p - self.a;
        let len_sq = ab.dot(ab);
        if len_sq == 0 {
            return self.a.distance_squared(p);
        }
        let t = (ap.dot(ab) as f64 / len_sq as f64).clamp(0.0, 1.0);
        let closest = Point::new(
            self.a.x + (ab.x as f64 * t).round() as i64,
            self.a.y + (ab.y as f64 * t).round() as i64,
        );
        closest.distance_squared(p)
    }

    /// The distance from `p` to the closest point on the segment.
    pub fn distance_to_point(&self, p: Point) -> i64 {
        (self.distance_squared_to_point(p) as f64).sqrt().round() as i64
    }

    /// The closest point on the (infinite) line carrying this segment to `p`.
    pub fn nearest_point(&self, p: Point) -> Point {
        let ab = self.vector();
        let len_sq = ab.dot(ab);
        if len_sq == 0 {
            return self.a;
        }
        let ap = p - self.a;
        let t = (ap.dot(ab) as f64 / len_sq as f64).clamp(0.0, 1.0);
        Point::new(
            self.a.x + (ab.x as f64 * t).round() as i64,
            self.a.y + (ab.y as f64 * t).round() as i64,
        )
    }

    /// Returns the intersection point between `self` and `other`, if the two
    /// segments (treated as closed, i.e. including endpoints) cross.
    ///
    /// Collinear overlapping segments are not considered an intersection
    /// (callers needing that case should check [`Seg::collinear_with`]
    /// separately); this matches the original router's treatment, which
    /// relies on endpoint-snapping elsewhere to avoid degenerate overlaps.
    pub fn intersect(&self, other: &Seg) -> Option<Point> {
        let p = self.a;
        let r = self.vector();
        let q = other.a;
        let s = other.vector();

        let rxs = r.cross(s);
        let qmp = q - p;

        if rxs == 0 {
            return None;
        }

        let t = qmp.cross(s) as f64 / rxs as f64;
        let u = qmp.cross(r) as f64 / rxs as f64;

        if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
            Some(Point::new(
                p.x + (r.x as f64 * t).round() as i64,
                p.y + (r.y as f64 * t).round() as i64,
            ))
        } else {
            None
        }
    }

    /// The shortest distance between two segments.
    pub fn distance_to_seg(&self, other: &Seg) -> i64 {
        if self.intersect(other).is_some() {
            return 0;
        }
        let d1 = self.distance_to_point(other.a);
        let d2 = self.distance_to_point(other.b);
        let d3 = other.distance_to_point(self.a);
        let d4 = other.distance_to_point(self.b);
        d1.min(d2).min(d3).min(d4)
    }

    /// Which side of the (infinite) line through this segment `p` falls on:
    /// positive for left (counter-clockwise), negative for right, zero for
    /// collinear.
    pub fn side_of(&self, p: Point) -> i128 {
        self.vector().cross(p - self.a)
    }

    /// Returns the reversed segment.
    #[inline]
    pub fn reversed(&self) -> Seg {
        Seg::new(self.b, self.a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parallel_segments_do_not_intersect() {
        let a = Seg::new(Point::new(0, 0), Point::new(10, 0));
        let b = Seg::new(Point::new(0, 5), Point::new(10, 5));
        assert!(a.intersect(&b).is_none());
    }

    #[test]
    fn crossing_segments_intersect_at_midpoint() {
        let a = Seg::new(Point::new(0, 0), Point::new(10, 10));
        let b = Seg::new(Point::new(0, 10), Point::new(10, 0));
        assert_eq!(a.intersect(&b), Some(Point::new(5, 5)));
    }

    #[test]
    fn distance_to_point_perpendicular() {
        let s = Seg::new(Point::new(0, 0), Point::new(10, 0));
        assert_eq!(s.distance_to_point(Point::new(5, 5)), 5);
    }

    #[test]
    fn distance_to_point_beyond_endpoint() {
        let s = Seg::new(Point::new(0, 0), Point::new(10, 0));
        assert_eq!(s.distance_to_point(Point::new(15, 0)), 5);
    }

    #[test]
    fn side_of_detects_turn_direction() {
        let s = Seg::new(Point::new(0, 0), Point::new(10, 0));
        assert!(s.side_of(Point::new(5, 5)) > 0);
        assert!(s.side_of(Point::new(5, -5)) < 0);
    }
}
