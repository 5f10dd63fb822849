//! The walkaround engine (spec §4.3): routes a path around an obstacle
//! hull on a requested side.
//!
//! No original-router source for this algorithm is present in the
//! reference pack (`pns_walkaround.cpp` only exists as a much higher-level
//! caller of this primitive); the vertex-classification/graph-walk design
//! below follows the prose algorithm directly, built in the style of this
//! crate's own [`crate::collision`] and `geometry::hull` modules.

use geometry::prelude::{LineChain, Point, Seg};

use crate::error::{Error, Result};

/// Which side of the obstacle hull the path should be routed around.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Side {
    /// Clockwise around the hull.
    Clockwise,
    /// Counter-clockwise around the hull (the hull's own winding order).
    CounterClockwise,
}

/// A vertex's position relative to the obstacle hull.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Classification {
    Inside,
    OnEdge,
    Outside,
}

/// The iteration budget for the path/hull graph walk. Exceeding this without
/// reaching the path's last vertex is treated as unroutable.
const MAX_ITERATIONS: usize = 1000;

/// One vertex of an augmented chain (original vertex or an inserted
/// path/hull intersection), carrying the index of its counterpart vertex
/// in the other chain when it is a shared intersection point.
#[derive(Debug, Clone, Copy)]
struct AugVertex {
    point: Point,
    linked: Option<usize>,
}

/// Computes a path that goes from `path`'s first vertex to its last vertex,
/// routed around `hull` on the given `side`, per spec.md §4.3.
///
/// `path` must not start inside `hull` (the caller is expected to back off
/// and retry from elsewhere). If `path`'s last vertex lies inside `hull`,
/// the result is projected onto the last hull edge the walk traversed.
pub fn walkaround(path: &LineChain, hull: &LineChain, side: Side) -> Result<LineChain> {
    let _span = tracing::trace_span!("walkaround", side = ?side).entered();
    let path = split_self_intersection(path);
    let path_points = path.points();

    if path_points.is_empty() {
        return Ok(LineChain::new());
    }
    if classify(hull, path_points[0]) == Classification::Inside {
        tracing::debug!("walkaround start point inside hull");
        return Err(Error::WalkaroundUnroutable);
    }

    let (path_aug, hull_aug) = augment(&path, hull);

    let mut output = vec![path_aug[0].point];
    let mut cursor = Cursor::Path(0);
    let mut last_hull_seg: Option<Seg> = None;

    for _ in 0..MAX_ITERATIONS {
        match cursor {
            Cursor::Path(i) => {
                if i + 1 >= path_aug.len() {
                    // Reached the path's declared last vertex.
                    let last = path_aug[i];
                    if classify(hull, last.point) == Classification::Inside {
                        if let Some(seg) = last_hull_seg {
                            let projected = seg.nearest_point(last.point);
                            output.push(projected);
                        } else {
                            output.push(last.point);
                        }
                    }
                    return Ok(LineChain::from_points(output, false));
                }

                let next = path_aug[i + 1];
                if classify(hull, next.point) != Classification::Inside {
                    output.push(next.point);
                    cursor = Cursor::Path(i + 1);
                } else if let Some(hull_idx) = path_aug[i].linked {
                    cursor = Cursor::Hull(hull_idx);
                } else {
                    return Err(Error::WalkaroundUnroutable);
                }
            }
            Cursor::Hull(j) => {
                let n = hull_aug.len();
                let next_j = match side {
                    Side::CounterClockwise => (j + 1) % n,
                    Side::Clockwise => (j + n - 1) % n,
                };
                last_hull_seg = Some(Seg::new(hull_aug[j].point, hull_aug[next_j].point));

                if let Some(path_idx) = hull_aug[next_j].linked {
                    output.push(hull_aug[next_j].point);
                    cursor = Cursor::Path(path_idx);
                } else {
                    output.push(hull_aug[next_j].point);
                    cursor = Cursor::Hull(next_j);
                }
            }
        }
    }

    tracing::debug!(iterations = MAX_ITERATIONS, "walkaround iteration budget exceeded");
    Err(Error::WalkaroundUnroutable)
}

#[derive(Debug, Copy, Clone)]
enum Cursor {
    Path(usize),
    Hull(usize),
}

fn classify(hull: &LineChain, p: Point) -> Classification {
    for seg in hull.segments() {
        if seg.distance_to_point(p) == 0 {
            return Classification::OnEdge;
        }
    }
    if hull.contains_point_strict(p) {
        Classification::Inside
    } else {
        Classification::Outside
    }
}

/// If `path` self-intersects at two non-adjacent segments, truncates it at
/// the first such crossing found (in segment order). Otherwise returns a
/// clone of `path`.
fn split_self_intersection(path: &LineChain) -> LineChain {
    let n = path.segment_count();
    for i in 0..n {
        for j in i + 2..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            let a = path.segment(i);
            let b = path.segment(j);
            if let Some(p) = a.intersect(&b) {
                return path.split(p).0;
            }
        }
    }
    path.clone()
}

/// Inserts shared intersection vertices into both `path` and `hull`,
/// returning each as an augmented vertex list. A vertex's `linked` field
/// is `Some(index)` into the other list exactly when it is an inserted
/// intersection point.
fn augment(path: &LineChain, hull: &LineChain) -> (Vec<AugVertex>, Vec<AugVertex>) {
    // inserts[seg_index] = sorted list of (t, point, shared_id)
    let mut path_inserts: Vec<Vec<(f64, Point, usize)>> = vec![Vec::new(); path.segment_count()];
    let mut hull_inserts: Vec<Vec<(f64, Point, usize)>> = vec![Vec::new(); hull.segment_count()];
    let mut shared_id = 0usize;

    for pi in 0..path.segment_count() {
        let ps = path.segment(pi);
        for hi in 0..hull.segment_count() {
            let hs = hull.segment(hi);
            if let Some(p) = ps.intersect(&hs) {
                let t_path = param(&ps, p);
                let t_hull = param(&hs, p);
                path_inserts[pi].push((t_path, p, shared_id));
                hull_inserts[hi].push((t_hull, p, shared_id));
                shared_id += 1;
            }
        }
    }

    let path_aug = build_augmented(path.points(), false, &mut path_inserts);
    let hull_aug = build_augmented(hull.points(), true, &mut hull_inserts);

    let mut final_path: Vec<AugVertex> = path_aug.iter().map(|(pt, _)| AugVertex { point: *pt, linked: None }).collect();
    let mut final_hull: Vec<AugVertex> = hull_aug.iter().map(|(pt, _)| AugVertex { point: *pt, linked: None }).collect();

    let mut path_by_id = std::collections::HashMap::new();
    for (idx, (_, id)) in path_aug.iter().enumerate() {
        if let Some(id) = id {
            path_by_id.insert(*id, idx);
        }
    }
    for (idx, (_, id)) in hull_aug.iter().enumerate() {
        if let Some(id) = id {
            if let Some(&path_idx) = path_by_id.get(id) {
                final_hull[idx].linked = Some(path_idx);
                final_path[path_idx].linked = Some(idx);
            }
        }
    }

    (final_path, final_hull)
}

/// The parametric position of `p` (assumed to lie on `seg`) along `seg`,
/// clamped to `[0, 1]`.
fn param(seg: &Seg, p: Point) -> f64 {
    let v = seg.vector();
    let len_sq = v.dot(v);
    if len_sq == 0 {
        return 0.0;
    }
    ((p - seg.a).dot(v) as f64 / len_sq as f64).clamp(0.0, 1.0)
}

/// Interleaves a chain's own vertices with inserted intersection points,
/// in segment order, producing `(point, Some(shared_id))` for inserted
/// vertices and `(point, None)` for the chain's own vertices.
fn build_augmented(
    points: &[Point],
    closed: bool,
    inserts: &mut [Vec<(f64, Point, usize)>],
) -> Vec<(Point, Option<usize>)> {
    let mut out = Vec::new();
    let n = points.len();
    let seg_count = inserts.len();
    for i in 0..seg_count {
        out.push((points[i % n], None));
        inserts[i].sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
        for (_, pt, id) in inserts[i].iter() {
            out.push((*pt, Some(*id)));
        }
    }
    if !closed && seg_count > 0 {
        out.push((points[seg_count], None));
    } else if seg_count == 0 {
        out.extend(points.iter().map(|p| (*p, None)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_hull(cx: i64, cy: i64, half: i64) -> LineChain {
        LineChain::from_points(
            vec![
                Point::new(cx - half, cy - half),
                Point::new(cx + half, cy - half),
                Point::new(cx + half, cy + half),
                Point::new(cx - half, cy + half),
            ],
            true,
        )
    }

    #[test]
    fn path_not_crossing_hull_is_unchanged_in_endpoints() {
        let path = LineChain::from_points(vec![Point::new(-100, 0), Point::new(100, 0)], false);
        let hull = square_hull(0, 1000, 50);
        let result = walkaround(&path, &hull, Side::CounterClockwise).unwrap();
        assert_eq!(*result.points().first().unwrap(), Point::new(-100, 0));
    }

    #[test]
    fn starting_inside_hull_fails() {
        let path = LineChain::from_points(vec![Point::new(0, 0), Point::new(500, 0)], false);
        let hull = square_hull(0, 0, 100);
        let result = walkaround(&path, &hull, Side::CounterClockwise);
        assert!(result.is_err());
    }

    #[test_log::test]
    fn path_crossing_hull_detours_around_it() {
        let path = LineChain::from_points(vec![Point::new(-200, 0), Point::new(200, 0)], false);
        let hull = square_hull(0, 0, 100);
        let result = walkaround(&path, &hull, Side::CounterClockwise).unwrap();
        assert_eq!(*result.points().first().unwrap(), Point::new(-200, 0));
        assert_eq!(*result.points().last().unwrap(), Point::new(200, 0));
        // the detour must not pass strictly through the hull's interior.
        for seg in result.segments() {
            assert_ne!(hull.contains_point_strict(seg.a), true);
        }
    }
}
