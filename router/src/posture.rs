//! The posture solver (spec §4.8): a short mouse-trail tracer that picks
//! the initial bend direction — orthogonal-first or diagonal-first — of a
//! new trace from the recent cursor path.
//!
//! Ported from the original router's `MOUSE_TRAIL_TRACER`
//! (`pns_mouse_trail_tracer.cpp`); the tuning constants below are carried
//! over verbatim since the spec only names the area-ratio threshold and
//! epsilon, not the lock/unlock/cutoff factors.

use geometry::prelude::{Direction45, LineChain, Point};

use crate::item::Uid;

/// Tuning factor for how good the candidate trace's "fit" to the mouse
/// trail must be before it is preferred over the currently held posture.
const AREA_RATIO_THRESHOLD: f64 = 1.3;

/// Tuning factor applied on top of [`AREA_RATIO_THRESHOLD`] to avoid
/// flutter right at the decision boundary.
const AREA_RATIO_EPSILON: f64 = 0.25;

/// Minimum distance (in tolerance units) the trail must span before the
/// area-ratio test is trusted to lock in a posture at all.
const MIN_AREA_CUTOFF_DISTANCE_FACTOR: f64 = 6.0;

/// Distance (in tolerance units) from the trail origin beyond which the
/// current posture choice is frozen to prevent flutter.
const LOCK_DISTANCE_FACTOR: f64 = 30.0;

/// Distance (in tolerance units) back toward the trail origin at which a
/// previously locked posture is released and the trail restarts.
const UNLOCK_DISTANCE_FACTOR: f64 = 10.0;

/// Heuristic that chooses the initial straight-vs-diagonal bend direction
/// of a new trace from a short recent history of cursor positions.
#[derive(Debug, Clone)]
pub struct MouseTrailTracer {
    trail: LineChain,
    tolerance: i64,
    direction: Direction45,
    last_seg_direction: Option<Direction45>,
    forced: bool,
    disable_mouse: bool,
    manually_forced: bool,
}

impl Default for MouseTrailTracer {
    fn default() -> Self {
        Self {
            trail: LineChain::new(),
            tolerance: 0,
            direction: Direction45::East,
            last_seg_direction: None,
            forced: false,
            disable_mouse: false,
            manually_forced: false,
        }
    }
}

impl MouseTrailTracer {
    /// Creates a tracer with an empty trail and default posture.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the trail and any forced/locked posture state, keeping the
    /// configured tolerance and mouse-disabled flag.
    pub fn clear(&mut self) {
        self.forced = false;
        self.manually_forced = false;
        self.trail = LineChain::new();
    }

    /// Sets the distance tolerance used to detect the trail doubling back
    /// on itself and to scale the lock/unlock/cutoff distance factors.
    pub fn set_tolerance(&mut self, tolerance: i64) {
        self.tolerance = tolerance;
    }

    /// Seeds the initial posture and the direction of the last already-laid
    /// segment (used to bias the solver toward an acute connection to
    /// existing copper).
    pub fn set_default_directions(&mut self, init_direction: Direction45, last_seg_direction: Option<Direction45>) {
        self.direction = init_direction;
        self.last_seg_direction = last_seg_direction;
    }

    /// Disables the mouse-trail area heuristic, leaving only the manual
    /// posture switch and the previous-segment correction active.
    pub fn set_mouse_disabled(&mut self, disabled: bool) {
        self.disable_mouse = disabled;
    }

    /// Whether [`Self::flip_posture`] was called since the trail was last
    /// cleared (and the automatic solver is therefore suppressed).
    pub fn is_manually_forced(&self) -> bool {
        self.manually_forced
    }

    /// Appends a new cursor position to the trail, truncating the trail at
    /// the earliest point where the new segment loops back near an older
    /// one (the user doubled back on themselves), then removes collinear
    /// redundancy.
    pub fn add_trail_point(&mut self, p: Point) {
        if self.trail.point_count() == 0 {
            self.trail.append_point(p);
            return;
        }

        let last = *self.trail.points().last().unwrap();
        let new_seg = geometry::prelude::Seg::new(last, p);

        if self.trail.segment_count() > 2 {
            let limit = self.tolerance;
            for i in 0..self.trail.segment_count() - 2 {
                let trail_seg = self.trail.segment(i);
                if trail_seg.distance_to_seg(&new_seg) <= limit {
                    let kept: Vec<Point> = self.trail.points()[..=i].to_vec();
                    self.trail = LineChain::from_points(kept, false);
                    break;
                }
            }
        }

        self.trail.append_point(p);
        self.trail.simplify();
    }

    /// Chooses the bend direction for a candidate trace ending at `p`,
    /// given the trail accumulated so far via [`Self::add_trail_point`].
    pub fn get_posture(&mut self, p: Point) -> Direction45 {
        if self.trail.point_count() < 2 || self.manually_forced {
            if !self.manually_forced {
                if let Some(last) = self.last_seg_direction {
                    self.direction = if self.disable_mouse { last.right() } else { last };
                }
            }
            return self.direction;
        }

        let p0 = self.trail.points()[0];
        let ref_length = (p0.distance_squared(p) as f64).sqrt();

        let (area_s, straight_direction) = Self::candidate(p0, p, self.trail.points(), false);
        let (area_diag, diag_direction) = Self::candidate(p0, p, self.trail.points(), true);
        let ratio = area_s / (area_diag + 1.0);

        if self.forced && ref_length < UNLOCK_DISTANCE_FACTOR * self.tolerance as f64 {
            self.forced = false;
            self.trail = LineChain::new();
            self.trail.append_point(p0);
        }

        let mut area_ok = false;
        if !self.forced && ref_length > MIN_AREA_CUTOFF_DISTANCE_FACTOR * self.tolerance as f64 {
            let area_cutoff = self.tolerance as f64 * ref_length;
            let mut trail_polygon = self.trail.clone();
            trail_polygon.set_closed(true);
            if trail_polygon.area().abs() > area_cutoff {
                area_ok = true;
            }
        }

        let mut new_direction = self.direction;
        if !self.forced && area_ok && ratio > AREA_RATIO_THRESHOLD + AREA_RATIO_EPSILON {
            new_direction = diag_direction;
        } else if !self.forced && area_ok && ratio < (1.0 / AREA_RATIO_THRESHOLD) - AREA_RATIO_EPSILON {
            new_direction = straight_direction;
        } else {
            new_direction = if self.direction.is_diagonal() { diag_direction } else { straight_direction };
        }

        if !self.disable_mouse && new_direction != self.direction {
            self.direction = new_direction;
        }

        if !self.manually_forced && !self.disable_mouse {
            if let Some(last) = self.last_seg_direction {
                if straight_direction == last {
                    self.direction = straight_direction;
                } else if diag_direction == last {
                    self.direction = diag_direction;
                } else {
                    use geometry::direction::AngleClass;
                    match self.direction.angle(last) {
                        AngleClass::HalfFull => {
                            self.direction = if self.direction.is_diagonal() { straight_direction } else { diag_direction };
                        }
                        AngleClass::Acute => {
                            let candidate = if self.direction.is_diagonal() { straight_direction } else { diag_direction };
                            if candidate.angle(last) == AngleClass::Right {
                                self.direction = candidate;
                            }
                        }
                        AngleClass::Right => {
                            let candidate = if self.direction.is_diagonal() { straight_direction } else { diag_direction };
                            if candidate.angle(last) == AngleClass::Obtuse {
                                self.direction = candidate;
                            }
                        }
                        _ => {}
                    }
                }
            }
        }

        if !self.forced && ref_length > LOCK_DISTANCE_FACTOR * self.tolerance as f64 {
            self.forced = true;
        }

        self.direction
    }

    /// Builds the candidate `(start -> bend -> p)` trace, closes it with
    /// the reversed trail, and returns its enclosed area together with the
    /// direction of its first (simplified) segment.
    fn candidate(p0: Point, p: Point, trail: &[Point], diagonal_first: bool) -> (f64, Direction45) {
        let mut points = Direction45::build_initial_trace(p0, p, diagonal_first);
        let mut rev_trail = trail.to_vec();
        rev_trail.reverse();
        points.extend(rev_trail);

        let mut chain = LineChain::from_points(points, true);
        chain.simplify();
        let area = chain.area();

        let dir = if chain.segment_count() > 0 {
            let seg0 = chain.segment(0);
            Direction45::from_vector(seg0.a, seg0.b).unwrap_or(Direction45::East)
        } else {
            Direction45::East
        };
        (area, dir)
    }

    /// Forces the opposite bend direction and locks it manually, until the
    /// next [`Self::clear`].
    pub fn flip_posture(&mut self) {
        self.direction = self.direction.right();
        self.forced = true;
        self.manually_forced = true;
    }

    /// The vector from the trail's first point to its last, `(0, 0)` if the
    /// trail has fewer than two points. Used by the dragger for an initial-
    /// direction hint.
    pub fn trail_lead_vector(&self) -> Point {
        if self.trail.point_count() < 2 {
            Point::zero()
        } else {
            *self.trail.points().last().unwrap() - self.trail.points()[0]
        }
    }
}

/// Derives the posture's starting direction hints from the last fixed
/// segment of a line, if any, so a placer can seed [`MouseTrailTracer`]
/// before the first `GetPosture` call of a new interaction. `seed` is the
/// UID of the item the new trace departs from, unused beyond documenting
/// the call site's intent (the direction itself is computed by the caller
/// from the item's own geometry).
pub fn seed_from_departing_item(_seed: Uid, last_segment_direction: Option<Direction45>) -> Direction45 {
    last_segment_direction.unwrap_or(Direction45::East)
}
