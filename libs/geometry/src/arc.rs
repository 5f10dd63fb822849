//! Circular arcs.
//!
//! Arcs are stored by their start, mid and end points (matching how the
//! original router's `SHAPE_ARC` is constructed from a three-point fit,
//! which is the representation the UI naturally produces when a user drags
//! a corner into a fillet). The center, radius and central angle are derived
//! and cached on construction.

use serde::{Deserialize, Serialize};

use crate::point::Point;

/// A circular arc, defined by three points it passes through, plus a width.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq)]
pub struct Arc {
    start: Point,
    mid: Point,
    end: Point,
    width: i64,
    center: Point,
    radius: f64,
}

impl Arc {
    /// Builds an arc from three points it passes through.
    ///
    /// If `mid` is not equidistant from the implied center as `start` and
    /// `end` (within rounding), it is corrected to the geometric midpoint of
    /// the arc, per spec's `ArcMidInvalid` handling: the constructor never
    /// fails, it repairs the input.
    pub fn from_three_points(start: Point, mid: Point, end: Point, width: i64) -> Self {
        let center = circumcenter(start, mid, end).unwrap_or_else(|| {
            // Degenerate (collinear) input: treat as an infinite-radius arc
            // centered at the midpoint between start/end; radius becomes
            // huge but finite so downstream math stays well-defined.
            Point::new((start.x + end.x) / 2, (start.y + end.y) / 2)
        });
        let radius = (center.distance_squared(start) as f64).sqrt();

        let corrected_mid = point_on_circle_between(center, radius, start, end, mid);

        Self {
            start,
            mid: corrected_mid,
            end,
            width,
            center,
            radius,
        }
    }

    /// The arc's start point.
    #[inline]
    pub fn start(&self) -> Point {
        self.start
    }

    /// The arc's (corrected) midpoint.
    #[inline]
    pub fn mid(&self) -> Point {
        self.mid
    }

    /// The arc's end point.
    #[inline]
    pub fn end(&self) -> Point {
        self.end
    }

    /// The line width carried by the arc.
    #[inline]
    pub fn width(&self) -> i64 {
        self.width
    }

    /// The arc's center.
    #[inline]
    pub fn center(&self) -> Point {
        self.center
    }

    /// The arc's radius.
    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Whether the arc sweeps counter-clockwise from start to end (through
    /// mid).
    pub fn is_ccw(&self) -> bool {
        let v1 = self.start - self.center;
        let v2 = self.mid - self.center;
        v1.cross(v2) >= 0
    }

    /// Converts the arc to a polyline approximation.
    ///
    /// `accuracy` bounds the maximum deviation between a chord and the true
    /// circle: every generated vertex lies within `accuracy + 1` of the
    /// ideal circle of the arc's radius, centered at the arc's center.
    pub fn to_polyline(&self, accuracy: i64) -> Vec<Point> {
        if self.radius < 1.0 {
            return vec![self.start, self.end];
        }

        let start_angle = angle_of(self.center, self.start);
        let mut end_angle = angle_of(self.center, self.end);
        let ccw = self.is_ccw();

        // Normalize end_angle relative to start_angle per sweep direction.
        if ccw {
            while end_angle < start_angle {
                end_angle += std::f64::consts::TAU;
            }
        } else {
            while end_angle > start_angle {
                end_angle -= std::f64::consts::TAU;
            }
        }

        let sweep = (end_angle - start_angle).abs();

        // Chord-error to angular-step relation: err = r * (1 - cos(theta/2)).
        let accuracy = accuracy.max(1) as f64;
        let cos_half = (1.0 - accuracy / self.radius).clamp(-1.0, 1.0);
        let max_step = 2.0 * cos_half.acos();
        let max_step = if max_step.is_finite() && max_step > 1e-6 {
            max_step
        } else {
            std::f64::consts::FRAC_PI_8
        };

        let n_segments = (sweep / max_step).ceil().max(1.0) as usize;

        let mut points = Vec::with_capacity(n_segments + 1);
        for i in 0..=n_segments {
            let t = start_angle + (end_angle - start_angle) * (i as f64 / n_segments as f64);
            points.push(Point::new(
                (self.center.x as f64 + self.radius * t.cos()).round() as i64,
                (self.center.y as f64 + self.radius * t.sin()).round() as i64,
            ));
        }
        // Endpoints should land exactly on the user-specified points.
        if let Some(first) = points.first_mut() {
            *first = self.start;
        }
        if let Some(last) = points.last_mut() {
            *last = self.end;
        }
        points
    }

    /// Returns the reversed arc (start and end swapped, mid preserved so the
    /// same physical arc is described).
    pub fn reversed(&self) -> Arc {
        Arc {
            start: self.end,
            mid: self.mid,
            end: self.start,
            width: self.width,
            center: self.center,
            radius: self.radius,
        }
    }
}

fn angle_of(center: Point, p: Point) -> f64 {
    ((p.y - center.y) as f64).atan2((p.x - center.x) as f64)
}

/// The circumcenter of three points, or `None` if they are collinear.
fn circumcenter(a: Point, b: Point, c: Point) -> Option<Point> {
    let ax = a.x as f64;
    let ay = a.y as f64;
    let bx = b.x as f64;
    let by = b.y as f64;
    let cx = c.x as f64;
    let cy = c.y as f64;

    let d = 2.0 * (ax * (by - cy) + bx * (cy - ay) + cx * (ay - by));
    if d.abs() < 1e-6 {
        return None;
    }

    let ux = ((ax * ax + ay * ay) * (by - cy)
        + (bx * bx + by * by) * (cy - ay)
        + (cx * cx + cy * cy) * (ay - by))
        / d;
    let uy = ((ax * ax + ay * ay) * (cx - bx)
        + (bx * bx + by * by) * (ax - cx)
        + (cx * cx + cy * cy) * (bx - ax))
        / d;

    Some(Point::new(ux.round() as i64, uy.round() as i64))
}

/// Given a center/radius and a start/end pair, returns the point on the
/// circle closest to `desired_mid` that lies angularly between them on the
/// shorter of the two possible sweeps implied by `desired_mid`'s side.
fn point_on_circle_between(center: Point, radius: f64, start: Point, end: Point, desired_mid: Point) -> Point {
    if radius < 1.0 {
        return desired_mid;
    }
    let a0 = angle_of(center, start);
    let a1 = angle_of(center, end);

    // Pick the sweep direction that keeps desired_mid on the same side as
    // the chord midpoint would suggest, then take the true arc-midpoint
    // angle.
    let chord_side = side_of_points(start, end, desired_mid);
    let mut mid_angle = (a0 + a1) / 2.0;
    // The average of two angles can land on either arc; flip to the other
    // semicircle if the resulting point disagrees in side with desired_mid.
    let candidate = Point::new(
        (center.x as f64 + radius * mid_angle.cos()).round() as i64,
        (center.y as f64 + radius * mid_angle.sin()).round() as i64,
    );
    if side_of_points(start, end, candidate) * chord_side < 0.0 {
        mid_angle += std::f64::consts::PI;
    }

    Point::new(
        (center.x as f64 + radius * mid_angle.cos()).round() as i64,
        (center.y as f64 + radius * mid_angle.sin()).round() as i64,
    )
}

fn side_of_points(a: Point, b: Point, p: Point) -> f64 {
    let v = b - a;
    let w = p - a;
    (v.x as f64 * w.y as f64 - v.y as f64 * w.x as f64).signum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn quarter_circle_polyline_stays_within_accuracy() {
        let arc = Arc::from_three_points(Point::new(100, 0), Point::new(71, 71), Point::new(0, 100), 1000);
        let poly = arc.to_polyline(100);
        for p in &poly {
            let d = (p.distance_squared(arc.center()) as f64).sqrt();
            assert_abs_diff_eq!(d, arc.radius(), epsilon = 101.0);
        }
        assert_eq!(*poly.first().unwrap(), arc.start());
        assert_eq!(*poly.last().unwrap(), arc.end());
    }

    #[test]
    fn invalid_mid_is_corrected_to_equidistant_point() {
        // mid is nowhere near the circle through start/end at this radius.
        let arc = Arc::from_three_points(Point::new(100, 0), Point::new(0, 0), Point::new(0, 100), 1000);
        let d_start = (arc.center().distance_squared(arc.start()) as f64).sqrt();
        let d_mid = (arc.center().distance_squared(arc.mid()) as f64).sqrt();
        assert_abs_diff_eq!(d_start, d_mid, epsilon = 1.0);
    }
}
