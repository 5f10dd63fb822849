//! A closed set of primitive shapes, with a uniform bounding-box and
//! minimum-distance interface.
//!
//! Every collidable thing in the routing engine — a track segment, a via's
//! circular pad, a component's rectangular pad, a zone cutout — reduces to
//! one of these variants for the purposes of the hull and collision code.
//! Matches the original router's `SHAPE` hierarchy, but as a closed enum
//! rather than a class hierarchy: the collision engine never needs to add a
//! shape kind it doesn't already know about.

use serde::{Deserialize, Serialize};

use crate::line_chain::LineChain;
use crate::point::Point;
use crate::rect::Rect;
use crate::seg::Seg;

/// A single primitive shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Shape {
    /// A line segment with a width (a capsule, not an infinitely thin line).
    Segment(Seg, i64),
    /// A circle (used for round pads, via barrels and drill holes).
    Circle { center: Point, radius: i64 },
    /// An axis-aligned rectangle (used for rectangular pads).
    Rect(Rect),
    /// A closed polygon (used for custom pad shapes and zone outlines).
    Polygon(LineChain),
}

impl Shape {
    /// The axis-aligned bounding box of the shape.
    pub fn bbox(&self) -> Rect {
        match self {
            Shape::Segment(seg, width) => {
                let half = width / 2;
                Rect::new(seg.a, seg.b).expand_all(half)
            }
            Shape::Circle { center, radius } => {
                Rect::from_sides(
                    center.x - radius,
                    center.y - radius,
                    center.x + radius,
                    center.y + radius,
                )
            }
            Shape::Rect(r) => *r,
            Shape::Polygon(chain) => {
                let pts = chain.points();
                let mut iter = pts.iter();
                let first = *iter.next().expect("polygon shape must have at least one vertex");
                let mut rect = Rect::from_point(first);
                for p in iter {
                    rect = rect.union(&Rect::from_point(*p));
                }
                rect
            }
        }
    }

    /// The minimum distance between the boundaries of this shape and
    /// `other`, treating both as filled areas (zero if they overlap).
    pub fn min_distance(&self, other: &Shape) -> i64 {
        match (self, other) {
            // These five arms deliberately do NOT clamp to 0: a negative
            // result means the shapes overlap by that depth, which
            // `collides`'s `< clearance` test needs to tell "touching"
            // (distance 0) apart from "one fully inside the other" (very
            // negative) at a required clearance of exactly 0.
            (Shape::Circle { center: c1, radius: r1 }, Shape::Circle { center: c2, radius: r2 }) => {
                let d = c1.distance(*c2);
                d - r1 - r2
            }
            (Shape::Circle { center, radius }, Shape::Segment(seg, width))
            | (Shape::Segment(seg, width), Shape::Circle { center, radius }) => {
                let d = seg.distance_to_point(*center);
                d - radius - width / 2
            }
            (Shape::Segment(s1, w1), Shape::Segment(s2, w2)) => {
                let d = s1.distance_to_seg(s2);
                d - w1 / 2 - w2 / 2
            }
            (Shape::Rect(a), Shape::Rect(b)) => a.min_distance(b),
            (Shape::Circle { center, radius }, Shape::Rect(r))
            | (Shape::Rect(r), Shape::Circle { center, radius }) => {
                if r.contains_point(*center) {
                    return -radius;
                }
                let clamped = Point::new(
                    center.x.clamp(r.left(), r.right()),
                    center.y.clamp(r.bot(), r.top()),
                );
                center.distance(clamped) - radius
            }
            (Shape::Circle { center, radius }, solid) | (solid, Shape::Circle { center, radius }) => {
                solid.distance_to_point(*center) - radius
            }
            _ => {
                // General fallback: approximate any shape as its edge set
                // (segments) and take the closest pair. Exact for every
                // Polygon/Rect/Segment combination; Circle is handled above
                // since its boundary isn't a finite set of segments.
                let mut best = i64::MAX;
                for a in self.edges() {
                    for b in other.edges() {
                        best = best.min(a.distance_to_seg(&b));
                    }
                }
                best.max(0)
            }
        }
    }

    /// The distance from `p` to this shape's boundary, treating the shape
    /// as a filled area (zero if `p` is inside or on the boundary).
    fn distance_to_point(&self, p: Point) -> i64 {
        match self {
            Shape::Circle { center, radius } => (center.distance(p) - radius).max(0),
            Shape::Segment(seg, width) => (seg.distance_to_point(p) - width / 2).max(0),
            Shape::Rect(r) => {
                if r.contains_point(p) {
                    0
                } else {
                    let clamped = Point::new(p.x.clamp(r.left(), r.right()), p.y.clamp(r.bot(), r.top()));
                    p.distance(clamped)
                }
            }
            Shape::Polygon(chain) => {
                if chain.is_closed() && chain.contains_point_strict(p) {
                    0
                } else {
                    chain.segments().map(|s| s.distance_to_point(p)).min().unwrap_or(0)
                }
            }
        }
    }

    /// Whether this shape collides with `other` at the given `clearance`
    /// (true if their boundaries are closer than `clearance`; exactly at
    /// `clearance` does not count as a collision).
    pub fn collides(&self, other: &Shape, clearance: i64) -> bool {
        self.min_distance(other) < clearance
    }

    /// The point on this shape's boundary closest to `p` (treating the shape
    /// as a filled area; `p` itself if `p` is inside or on the boundary of a
    /// shape whose boundary can't be decomposed into segments, i.e. a
    /// circle, is instead the nearest point on the circle's rim).
    pub fn nearest_boundary_point(&self, p: Point) -> Point {
        match self {
            Shape::Circle { center, radius } => {
                let v = p - *center;
                if v.x == 0 && v.y == 0 {
                    Point::new(center.x + radius, center.y)
                } else {
                    *center + v.resized(*radius)
                }
            }
            _ => {
                let mut best = None;
                let mut best_dist = i128::MAX;
                for e in self.edges() {
                    let np = e.nearest_point(p);
                    let d = np.distance_squared(p);
                    if d < best_dist {
                        best_dist = d;
                        best = Some(np);
                    }
                }
                best.unwrap_or(p)
            }
        }
    }

    /// Decomposes the shape into its boundary edges, for shapes where that
    /// is a meaningful operation (segments and polygons contribute their own
    /// edges; rectangles contribute their four sides; circles contribute
    /// none, since a circle's boundary isn't a finite set of segments).
    fn edges(&self) -> Vec<Seg> {
        match self {
            Shape::Segment(seg, _) => vec![*seg],
            Shape::Rect(r) => {
                let c = r.corners();
                vec![
                    Seg::new(c[0], c[1]),
                    Seg::new(c[1], c[2]),
                    Seg::new(c[2], c[3]),
                    Seg::new(c[3], c[0]),
                ]
            }
            Shape::Polygon(chain) => chain.segments().collect(),
            Shape::Circle { .. } => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_circles_have_zero_distance() {
        let a = Shape::Circle { center: Point::new(0, 0), radius: 50 };
        let b = Shape::Circle { center: Point::new(90, 0), radius: 40 };
        assert_eq!(a.min_distance(&b), 0);
    }

    #[test]
    fn nearest_boundary_point_on_circle_is_on_rim() {
        let c = Shape::Circle { center: Point::new(0, 0), radius: 100 };
        let p = c.nearest_boundary_point(Point::new(200, 0));
        assert_eq!(p, Point::new(100, 0));
    }

    #[test]
    fn separated_circles_report_gap() {
        let a = Shape::Circle { center: Point::new(0, 0), radius: 50 };
        let b = Shape::Circle { center: Point::new(200, 0), radius: 40 };
        assert_eq!(a.min_distance(&b), 110);
    }

    #[test]
    fn exact_clearance_does_not_collide() {
        let a = Shape::Circle { center: Point::new(0, 0), radius: 50 };
        let b = Shape::Circle { center: Point::new(160, 0), radius: 50 };
        // gap is exactly 60
        assert!(!a.collides(&b, 60));
        assert!(a.collides(&b, 61));
    }

    #[test]
    fn rect_bbox_matches_polygon_bbox() {
        let rect = Rect::from_sides(0, 0, 100, 50);
        let chain = LineChain::from_points(rect.corners().to_vec(), true);
        assert_eq!(Shape::Rect(rect).bbox(), Shape::Polygon(chain).bbox());
    }
}
