//! Construction of the octagonal and convex hulls the collision engine and
//! the walkaround algorithm treat as obstacle boundaries.
//!
//! A hull is the boundary of an item's shape after it has been inflated by
//! a clearance and a walkaround width, clipped to 45-degree chamfers so the
//! result stays a cheap-to-walk convex polygon instead of a true rounded
//! offset curve.

use crate::arc::Arc;
use crate::line_chain::LineChain;
use crate::point::Point;
use crate::rect::Rect;

/// `1 - 1/sqrt(2)`, the fraction of `(2*clearance + side)` that the original
/// router chops off each corner of an inflated rectangle to turn it into an
/// octagon.
const CHAMFER_FRACTION: f64 = 1.0 - std::f64::consts::FRAC_1_SQRT_2;

/// Builds the octagonal hull around an axis-aligned rectangle (typically a
/// pad or via shape already expressed as a bounding rect), inflated by
/// `clearance` on all sides and chamfered at 45 degrees.
///
/// `clearance` must already include the caller's half-width contribution
/// (resolver clearance + walkaround width / 2); this function only builds
/// the geometric boundary.
pub fn octagonal_hull(rect: Rect, clearance: i64) -> LineChain {
    let inflated = rect.expand_all(clearance.max(0));
    let side = inflated.width().min(inflated.height());
    let chamfer = ((2 * clearance + side) as f64 * CHAMFER_FRACTION).round() as i64;
    let chamfer = chamfer.clamp(0, side / 2);

    let l = inflated.left();
    let r = inflated.right();
    let b = inflated.bot();
    let t = inflated.top();

    let points = vec![
        Point::new(l + chamfer, b),
        Point::new(r - chamfer, b),
        Point::new(r, b + chamfer),
        Point::new(r, t - chamfer),
        Point::new(r - chamfer, t),
        Point::new(l + chamfer, t),
        Point::new(l, t - chamfer),
        Point::new(l, b + chamfer),
    ];
    LineChain::from_points(points, true)
}

/// Builds the hull around a single point (zero-length segment / zero-radius
/// arc / single-point line chain boundary case): a small octagon of
/// "radius" `clearance` centred on the point.
pub fn point_hull(p: Point, clearance: i64) -> LineChain {
    octagonal_hull(Rect::from_point(p), clearance)
}

/// Builds the hull around a circular shape (a via barrel or round pad),
/// approximated as a regular octagon circumscribing the inflated circle —
/// consistent with [`octagonal_hull`]'s corner treatment of rectangles, so
/// the two compose cleanly when merged.
pub fn circular_hull(center: Point, radius: i64, clearance: i64) -> LineChain {
    let r = radius + clearance.max(0);
    octagonal_hull(
        Rect::from_sides(center.x - r, center.y - r, center.x + r, center.y + r),
        0,
    )
}

/// Builds a hull around an arc by offsetting a polyline approximation of the
/// arc outward by `width / 2 + clearance` on each side, then merging the two
/// offset rails and the two end caps into a single closed chain.
///
/// `accuracy` controls the polyline approximation fidelity, matching
/// [`Arc::to_polyline`].
pub fn arc_hull(arc: &Arc, clearance: i64, accuracy: i64) -> LineChain {
    let half_width = arc.width() / 2 + clearance.max(0);
    let poly = arc.to_polyline(accuracy);

    if poly.len() < 2 {
        return point_hull(arc.start(), half_width);
    }

    let mut outer = Vec::with_capacity(poly.len());
    let mut inner = Vec::with_capacity(poly.len());

    for i in 0..poly.len() {
        let prev = if i == 0 { poly[i] } else { poly[i - 1] };
        let next = if i + 1 == poly.len() { poly[i] } else { poly[i + 1] };
        let tangent = next - prev;
        let normal = tangent.perp_ccw().resized(half_width);
        outer.push(poly[i] + normal);
        inner.push(poly[i] - normal);
    }

    let mut hull_points = outer;
    inner.reverse();
    hull_points.extend(inner);
    LineChain::from_points(hull_points, true)
}

/// Merges a set of convex hulls belonging to the same compound shape into a
/// single boundary by taking their union's convex hull (the original
/// router uses true polygon union, but since every primitive hull this
/// engine builds is a convex octagon or near-circle, the convex hull of the
/// combined vertex set is equivalent whenever the inputs overlap or touch,
/// which is the only case this function is called for).
pub fn merge_hulls(hulls: &[LineChain]) -> LineChain {
    let mut points: Vec<Point> = hulls.iter().flat_map(|h| h.points().iter().copied()).collect();
    convex_hull(&mut points)
}

/// Computes the convex hull of a point set via the monotone chain algorithm,
/// returning a closed, counter-clockwise [`LineChain`].
pub fn convex_hull(points: &mut Vec<Point>) -> LineChain {
    points.sort_by(|a, b| (a.x, a.y).cmp(&(b.x, b.y)));
    points.dedup();

    if points.len() <= 2 {
        return LineChain::from_points(points.to_vec(), true);
    }

    let mut lower: Vec<Point> = Vec::new();
    for &p in points.iter() {
        while lower.len() >= 2 {
            let a = lower[lower.len() - 2];
            let b = lower[lower.len() - 1];
            if (b - a).cross(p - a) <= 0 {
                lower.pop();
            } else {
                break;
            }
        }
        lower.push(p);
    }

    let mut upper: Vec<Point> = Vec::new();
    for &p in points.iter().rev() {
        while upper.len() >= 2 {
            let a = upper[upper.len() - 2];
            let b = upper[upper.len() - 1];
            if (b - a).cross(p - a) <= 0 {
                upper.pop();
            } else {
                break;
            }
        }
        upper.push(p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);

    LineChain::from_points(lower, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn chamfer_fraction_matches_one_minus_one_over_root_two() {
        assert_relative_eq!(CHAMFER_FRACTION, 1.0 - 2.0_f64.sqrt().recip(), epsilon = 1e-12);
    }

    #[test]
    fn octagonal_hull_has_eight_vertices_when_chamfer_fits() {
        let rect = Rect::from_sides(0, 0, 1_000_000, 1_000_000);
        let hull = octagonal_hull(rect, 50_000);
        assert_eq!(hull.point_count(), 8);
        assert!(hull.is_closed());
    }

    #[test]
    fn octagonal_hull_strictly_contains_inflated_rect() {
        let rect = Rect::from_sides(0, 0, 200_000, 100_000);
        let clearance = 50_000;
        let hull = octagonal_hull(rect, clearance);
        let inflated = rect.expand_all(clearance);
        // chamfered corners cut inside the inflated rect's corners, but the
        // chamfer never reaches the inflated rect's own edge midpoints.
        assert!(hull.contains_point_strict(inflated.center()));
    }

    #[test]
    fn point_hull_is_a_small_octagon() {
        let hull = point_hull(Point::new(500, 500), 100);
        assert_eq!(hull.point_count(), 8);
    }

    #[test]
    fn convex_hull_of_square_plus_interior_point_ignores_interior_point() {
        let mut pts = vec![
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(10, 10),
            Point::new(0, 10),
            Point::new(5, 5),
        ];
        let hull = convex_hull(&mut pts);
        assert_eq!(hull.point_count(), 4);
    }

    #[test]
    fn merge_hulls_of_two_touching_octagons_is_convex() {
        let a = point_hull(Point::new(0, 0), 1000);
        let b = point_hull(Point::new(1500, 0), 1000);
        let merged = merge_hulls(&[a, b]);
        assert!(merged.point_count() >= 4);
    }
}
