//! The eight 45-degree-grid directions used by the posture solver and the
//! line placer to build initial traces, and the angle classification
//! between pairs of directions used to decide segment joints.
//!
//! Ported from the original router's `DIRECTION_45`.

use serde::{Deserialize, Serialize};

use crate::point::Point;

/// One of the eight directions on the 45-degree routing grid.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Direction45 {
    /// East.
    East,
    /// North-east.
    NorthEast,
    /// North.
    North,
    /// North-west.
    NorthWest,
    /// West.
    West,
    /// South-west.
    SouthWest,
    /// South.
    South,
    /// South-east.
    SouthEast,
}

/// The relative angle between two [`Direction45`] values.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AngleClass {
    /// Same direction (0 degrees).
    Same,
    /// 45 degrees.
    Acute,
    /// 90 degrees.
    Right,
    /// 135 degrees.
    Obtuse,
    /// 180 degrees.
    HalfFull,
}

const ORDER: [Direction45; 8] = [
    Direction45::East,
    Direction45::NorthEast,
    Direction45::North,
    Direction45::NorthWest,
    Direction45::West,
    Direction45::SouthWest,
    Direction45::South,
    Direction45::SouthEast,
];

impl Direction45 {
    fn index(self) -> i32 {
        ORDER.iter().position(|d| *d == self).unwrap() as i32
    }

    /// Whether this direction runs diagonally (45/135/225/315 degrees).
    pub fn is_diagonal(self) -> bool {
        matches!(
            self,
            Direction45::NorthEast | Direction45::NorthWest | Direction45::SouthWest | Direction45::SouthEast
        )
    }

    /// Rounds a diagonal direction to its nearest cardinal (N/E/S/W),
    /// breaking ties clockwise. Cardinal directions are returned unchanged.
    pub fn nearest_cardinal(self) -> Direction45 {
        if self.is_diagonal() {
            ORDER[((self.index() - 1).rem_euclid(8)) as usize]
        } else {
            self
        }
    }

    /// The unit vector (scaled to `length`) pointing in this direction.
    pub fn as_vector(self, length: i64) -> Point {
        let (x, y): (f64, f64) = match self {
            Direction45::East => (1.0, 0.0),
            Direction45::NorthEast => (1.0, 1.0),
            Direction45::North => (0.0, 1.0),
            Direction45::NorthWest => (-1.0, 1.0),
            Direction45::West => (-1.0, 0.0),
            Direction45::SouthWest => (-1.0, -1.0),
            Direction45::South => (0.0, -1.0),
            Direction45::SouthEast => (1.0, -1.0),
        };
        let norm = (x * x + y * y).sqrt();
        Point::new(
            (x / norm * length as f64).round() as i64,
            (y / norm * length as f64).round() as i64,
        )
    }

    /// Classifies the direction of the vector `from -> to` into the nearest
    /// of the eight grid directions.
    pub fn from_vector(from: Point, to: Point) -> Option<Direction45> {
        let v = to - from;
        if v.x == 0 && v.y == 0 {
            return None;
        }
        let angle = (v.y as f64).atan2(v.x as f64);
        let octant = ((angle / (std::f64::consts::PI / 4.0)).round() as i32).rem_euclid(8);
        Some(ORDER[octant as usize])
    }

    /// Rotates 90 degrees clockwise (used by [`FlipPosture`](crate)-style
    /// forced-direction toggling).
    pub fn right(self) -> Direction45 {
        ORDER[((self.index() - 2).rem_euclid(8)) as usize]
    }

    /// Rotates 90 degrees counter-clockwise.
    pub fn left(self) -> Direction45 {
        ORDER[((self.index() + 2).rem_euclid(8)) as usize]
    }

    /// Classifies the angle between `self` and `other`.
    pub fn angle(self, other: Direction45) -> AngleClass {
        let diff = (self.index() - other.index()).rem_euclid(8);
        let diff = diff.min(8 - diff);
        match diff {
            0 => AngleClass::Same,
            1 => AngleClass::Acute,
            2 => AngleClass::Right,
            3 => AngleClass::Obtuse,
            4 => AngleClass::HalfFull,
            _ => unreachable!(),
        }
    }

    /// Builds an initial two-segment (or one-segment, if already aligned)
    /// trace from `start` to `end`: a 45-degree-grid-respecting polyline.
    ///
    /// If `diagonal_first` is true, the trace begins with a diagonal run and
    /// finishes with an orthogonal run (or vice versa); this mirrors the
    /// original router's straight-vs-diagonal posture candidates.
    pub fn build_initial_trace(start: Point, end: Point, diagonal_first: bool) -> Vec<Point> {
        let dx = end.x - start.x;
        let dy = end.y - start.y;

        if dx == 0 || dy == 0 {
            return vec![start, end];
        }

        let diag = dx.abs().min(dy.abs());
        let (diag_dx, diag_dy) = (diag * dx.signum(), diag * dy.signum());

        if diagonal_first {
            let bend = Point::new(start.x + diag_dx, start.y + diag_dy);
            if bend == end {
                vec![start, end]
            } else {
                vec![start, bend, end]
            }
        } else {
            let rem_dx = dx - diag_dx;
            let rem_dy = dy - diag_dy;
            let bend = Point::new(start.x + rem_dx, start.y + rem_dy);
            if bend == end {
                vec![start, end]
            } else {
                vec![start, bend, end]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn right_is_orthogonal_to_original() {
        let d = Direction45::North;
        assert_eq!(d.right(), Direction45::East);
        assert_eq!(d.angle(d.right()), AngleClass::Right);
    }

    #[test]
    fn double_right_is_opposite() {
        let d = Direction45::North;
        assert_eq!(d.right().right(), Direction45::South);
        assert_eq!(d.angle(d.right().right()), AngleClass::HalfFull);
    }

    #[test]
    fn classifies_cardinal_vector() {
        let dir = Direction45::from_vector(Point::zero(), Point::new(10, 0));
        assert_eq!(dir, Some(Direction45::East));
    }

    #[test]
    fn classifies_diagonal_vector() {
        let dir = Direction45::from_vector(Point::zero(), Point::new(10, 10));
        assert_eq!(dir, Some(Direction45::NorthEast));
    }

    #[test]
    fn nearest_cardinal_rounds_diagonal_clockwise() {
        assert_eq!(Direction45::NorthEast.nearest_cardinal(), Direction45::East);
        assert_eq!(Direction45::NorthWest.nearest_cardinal(), Direction45::North);
        assert_eq!(Direction45::SouthWest.nearest_cardinal(), Direction45::West);
        assert_eq!(Direction45::SouthEast.nearest_cardinal(), Direction45::South);
    }

    #[test]
    fn nearest_cardinal_is_identity_on_cardinals() {
        assert_eq!(Direction45::North.nearest_cardinal(), Direction45::North);
        assert_eq!(Direction45::East.nearest_cardinal(), Direction45::East);
    }

    #[test]
    fn initial_trace_diagonal_first_bends_at_45() {
        let trace = Direction45::build_initial_trace(Point::zero(), Point::new(10, 4), true);
        assert_eq!(trace, vec![Point::zero(), Point::new(4, 4), Point::new(10, 4)]);
    }

    #[test]
    fn initial_trace_straight_first_bends_at_45() {
        let trace = Direction45::build_initial_trace(Point::zero(), Point::new(10, 4), false);
        assert_eq!(trace, vec![Point::zero(), Point::new(6, 0), Point::new(10, 4)]);
    }
}
