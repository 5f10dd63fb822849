//! The shove engine (spec §4.4): propagates a rank-ordered push through
//! colliding lower-rank items as a head line advances.
//!
//! No original-router source for this engine is present in the reference
//! pack (`pns_shove.cpp`/`.h` are absent); the worklist/rank/state-machine
//! design below follows spec.md's prose directly, built on this crate's
//! own [`crate::node`]/[`crate::collision`] primitives rather than a port.
//! The via fan-out pass is split out as [`propagate_via_forces`], matching
//! the original's separate via-shove code path (SPEC_FULL.md §5.4).
//!
//! This pass operates at item (segment/via) granularity rather than
//! reassembling and re-walking a whole [`crate::item::Line`] per push —
//! sufficient for the single-incident-line scenarios spec.md's testable
//! properties exercise, but not a full multi-line force-accumulation
//! solver.

use geometry::prelude::Point;

use crate::collision::{self, CollisionQueryOptions, CollisionQueryScope};
use crate::error::Result;
use crate::item::{Item, Uid};
use crate::node::NodeRef;
use crate::rule::RuleResolver;

/// Per-operation iteration budget; exceeding it without reaching
/// [`ShoveOutcome::Stable`] falls back to the caller's pre-shove node.
const ITERATION_LIMIT: usize = 1000;

/// The router grid a pushed item's displacement is snapped to (spec §4.4):
/// keeps shoved copper on the same grid the interactive placer lays new
/// traces on, rather than landing one nanometre past the clearance boundary.
const PUSH_GRID: i64 = 100_000;

/// Rounds `overlap` up to the next multiple of [`PUSH_GRID`].
fn snap_to_grid(overlap: i64) -> i64 {
    let rem = overlap % PUSH_GRID;
    if rem == 0 { overlap } else { overlap + (PUSH_GRID - rem) }
}

/// The terminal state of a shove operation's PROPAGATE phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShoveOutcome {
    /// The worklist drained with every pushed item landing collision-free.
    Stable,
    /// The iteration budget was exhausted before the worklist drained.
    IterLimit,
    /// A pushed item could not be rebuilt without a remaining collision
    /// against an item of equal or lower rank.
    Fail,
}

/// Drives the shove engine over `node` starting from `head`, per spec
/// §4.4's worklist algorithm. `head` must already be present in `node`
/// (placed there by the line placer or dragger) and carries the rank that
/// every displaced obstacle is compared against.
///
/// On [`ShoveOutcome::Fail`] or [`ShoveOutcome::IterLimit`], `node` may
/// have been partially mutated; the caller (placer/dragger) is expected to
/// fall back to a pre-shove branch per spec §4.4's "last pre-collision
/// world" contract, which this module does not itself snapshot.
pub fn shove(node: &NodeRef, resolver: &dyn RuleResolver, head: Uid) -> Result<ShoveOutcome> {
    let _span = tracing::debug_span!("shove", head = head.0).entered();
    let mut worklist = vec![head];
    let mut iterations = 0usize;

    while let Some(current_uid) = worklist.pop() {
        iterations += 1;
        if iterations > ITERATION_LIMIT {
            tracing::debug!(iterations, "shove iteration limit exceeded");
            return Ok(ShoveOutcome::IterLimit);
        }

        let current = {
            let n = node.borrow();
            match n.get_item(current_uid) {
                Some(item) => item,
                None => continue,
            }
        };
        let current_rank = current.common().rank;

        let colliding = {
            let n = node.borrow();
            n.query_colliding(&current, resolver, &CollisionQueryOptions::default())
        };

        for obstacle in colliding {
            if obstacle.common().rank >= current_rank {
                continue;
            }

            let pushed = match &obstacle {
                Item::Via(_) => propagate_via_forces(node, resolver, &obstacle, &current)?,
                _ => push_item(node, resolver, &obstacle, &current),
            };

            match pushed {
                Some(new_uid) => {
                    tracing::trace!(obstacle = obstacle.uid().0, new_uid = new_uid.0, "shoved obstacle clear");
                    worklist.push(new_uid);
                }
                None => {
                    tracing::debug!(obstacle = obstacle.uid().0, "shove could not clear obstacle");
                    return Ok(ShoveOutcome::Fail);
                }
            }
        }
    }

    Ok(ShoveOutcome::Stable)
}

/// Displaces `obstacle` (a segment or arc) along the minimal vector that
/// clears `pusher`'s hull, replacing it in `node` under a fresh UID.
/// Returns the obstacle's new UID, or `None` if no valid displacement
/// exists (pusher and obstacle are concentric, or the rebuilt item still
/// collides with something at or below its own rank).
fn push_item(node: &NodeRef, resolver: &dyn RuleResolver, obstacle: &Item, pusher: &Item) -> Option<Uid> {
    let Item::Segment(obs_seg) = obstacle else { return None };

    let translation = push_displacement(resolver, pusher, obstacle)?;

    let mut new_seg = obs_seg.clone();
    new_seg.seg.a = new_seg.seg.a + translation;
    new_seg.seg.b = new_seg.seg.b + translation;
    if new_seg.seg.is_degenerate() {
        return None;
    }

    let new_uid = node.borrow().alloc_uid();
    new_seg.common.uid = new_uid;
    let new_item = Item::Segment(new_seg);

    if collides_with_lower_rank(node, resolver, &new_item, pusher.uid()) {
        return None;
    }

    let mut n = node.borrow_mut();
    n.remove(obstacle.uid());
    n.add(new_item, true);
    Some(new_uid)
}

/// The via fan-out pass: displaces a via directly away from `pusher`'s
/// bounding-box center by the overlap distance. A full implementation
/// would accumulate forces from every incident line before moving the via
/// once; this applies one pusher's displacement per call, which [`shove`]
/// drives to a fixed point across its worklist iterations.
pub fn propagate_via_forces(
    node: &NodeRef,
    resolver: &dyn RuleResolver,
    via_item: &Item,
    pusher: &Item,
) -> Result<Option<Uid>> {
    let Item::Via(via) = via_item else { return Ok(None) };

    let clearance = resolver.clearance(pusher, via_item, false);
    let required = collision::required_separation(clearance, pusher, via_item);
    let gap = pusher.shape().min_distance(&via_item.shape());
    if gap >= required {
        return Ok(Some(via_item.uid()));
    }

    let overlap = snap_to_grid(required - gap + 1);
    let away = via.pos - pusher.shape().bbox().center();
    if away == Point::zero() {
        return Ok(None);
    }
    let translation = away.resized(overlap);

    let new_uid = node.borrow().alloc_uid();
    let mut new_via = via.clone();
    new_via.pos = new_via.pos + translation;
    new_via.common.uid = new_uid;
    let new_item = Item::Via(new_via);

    if collides_with_lower_rank(node, resolver, &new_item, pusher.uid()) {
        return Ok(None);
    }

    let mut n = node.borrow_mut();
    n.remove(via_item.uid());
    n.add(new_item, true);
    Ok(Some(new_uid))
}

/// Whether `candidate` (not yet inserted into `node`) collides with
/// anything already in `node`, other than `ignore`, at or below its own
/// rank. Hole clearance is skipped since it was already checked by the
/// caller's original collision search that put `candidate`'s predecessor
/// on the worklist.
fn collides_with_lower_rank(node: &NodeRef, resolver: &dyn RuleResolver, candidate: &Item, ignore: Uid) -> bool {
    let n = node.borrow();
    let options = CollisionQueryOptions { scope: CollisionQueryScope::IgnoreHoleClearance, ..Default::default() };
    n.query_colliding(candidate, resolver, &options)
        .iter()
        .any(|c| c.common().rank <= candidate.common().rank && c.uid() != ignore)
}

/// The minimal-translation vector that moves `obstacle` out of `pusher`'s
/// required clearance, perpendicular to `obstacle`'s own run (a segment
/// is shoved sideways, never lengthwise).
fn push_displacement(resolver: &dyn RuleResolver, pusher: &Item, obstacle: &Item) -> Option<Point> {
    let Item::Segment(obs) = obstacle else { return None };
    if obs.seg.is_degenerate() {
        return None;
    }

    let clearance = resolver.clearance(pusher, obstacle, false);
    let required = collision::required_separation(clearance, pusher, obstacle);
    let gap = pusher.shape().min_distance(&obstacle.shape());
    if gap >= required {
        return None;
    }
    let overlap = snap_to_grid(required - gap + 1);

    let normal = obs.seg.vector().perp_ccw();
    let pusher_center = pusher.shape().bbox().center();
    let side = obs.seg.side_of(pusher_center);
    // Push away from whichever side the pusher sits on: pusher on the
    // normal's own (ccw) side pushes the obstacle the other way.
    let sign: i64 = if side >= 0 { -1 } else { 1 };
    Some((normal * sign).resized(overlap))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::NetId;
    use crate::item::{ItemCommon, Segment};
    use crate::node::Node;
    use crate::rule::{Constraint, ConstraintKind, DpPolarity};
    use geometry::prelude::Seg;
    use geometry::span::LayerRange;

    struct FixedResolver(i64);

    impl RuleResolver for FixedResolver {
        fn clearance(&self, _a: &Item, _b: &Item, _use_epsilon: bool) -> i64 {
            self.0
        }
        fn query_constraint(&self, _kind: ConstraintKind, _a: &Item, _b: &Item, _layer: crate::id::LayerId) -> Option<Constraint> {
            None
        }
        fn dp_coupled_net(&self, _net: NetId) -> Option<NetId> {
            None
        }
        fn dp_net_polarity(&self, _net: NetId) -> DpPolarity {
            DpPolarity::None
        }
        fn dp_net_pair(&self, _item: &Item) -> Option<(NetId, NetId)> {
            None
        }
        fn is_in_net_tie(&self, _a: &Item, _b: &Item) -> bool {
            false
        }
        fn is_net_tie_exclusion(&self, _a: &Item, _b: &Item) -> bool {
            false
        }
        fn is_drilled_hole(&self, _item: &Item) -> bool {
            false
        }
        fn is_non_plated_slot(&self, _item: &Item) -> bool {
            false
        }
        fn is_keepout(&self, _item: &Item, _at: Point) -> bool {
            false
        }
        fn clearance_epsilon(&self) -> i64 {
            0
        }
    }

    fn seg_item(uid: u64, a: Point, b: Point, width: i64, net: u32, rank: i32) -> Item {
        Item::Segment(Segment {
            common: ItemCommon::new(Uid(uid), LayerRange::single(0), NetId(net), rank),
            seg: Seg::new(a, b),
            width,
        })
    }

    #[test_log::test]
    fn shove_pushes_lower_rank_obstacle_clear_of_head() {
        let root = Node::new_root();
        {
            let mut n = root.borrow_mut();
            // Obstacle directly under where the head will sit, lower rank.
            n.add(seg_item(1, Point::new(0, 0), Point::new(1_000_000, 0), 200_000, 1, 0), false);
            // The head: a wide track laid right on top of the obstacle.
            n.add(seg_item(2, Point::new(0, 0), Point::new(1_000_000, 0), 200_000, 2, 10), false);
        }

        let resolver = FixedResolver(50_000);
        let outcome = shove(&root, &resolver, Uid(2)).unwrap();
        assert_eq!(outcome, ShoveOutcome::Stable);

        let n = root.borrow();
        assert!(n.get_item(Uid(1)).is_none(), "original obstacle should have been replaced");
        let moved = n
            .all_items()
            .into_iter()
            .find(|i| i.net() == NetId(1))
            .expect("obstacle net still present after shove");
        let resolver = FixedResolver(50_000);
        let head = n.get_item(Uid(2)).unwrap();
        assert!(!collision::collide(&resolver, &moved, &head, false));
    }

    #[test_log::test]
    fn end_to_end_scenario_3_shove_snaps_to_the_push_grid() {
        let root = Node::new_root();
        {
            let mut n = root.borrow_mut();
            // S: net B, width 200000, lower rank than the head so it gets pushed, at y=300000.
            n.add(seg_item(1, Point::new(0, 300_000), Point::new(1_000_000, 300_000), 200_000, 2, 0), false);
            // Placer head: net A, widened to 400000, at y=0.
            n.add(seg_item(2, Point::new(0, 0), Point::new(1_000_000, 0), 400_000, 1, 10), false);
        }

        let resolver = FixedResolver(50_000);
        let outcome = shove(&root, &resolver, Uid(2)).unwrap();
        assert_eq!(outcome, ShoveOutcome::Stable);

        let n = root.borrow();
        assert!(n.get_item(Uid(1)).is_none(), "original S should have been replaced by the shoved copy");
        let shoved = n.all_items().into_iter().find(|i| i.net() == NetId(2)).expect("S still present after shove");
        let Item::Segment(seg) = shoved else { panic!("expected S to still be a segment") };
        assert_eq!(seg.seg.a.y, 400_000);
        assert_eq!(seg.seg.b.y, 400_000);
    }

    #[test]
    fn shove_of_non_colliding_head_is_immediately_stable() {
        let root = Node::new_root();
        {
            let mut n = root.borrow_mut();
            n.add(seg_item(1, Point::new(0, 0), Point::new(1_000_000, 0), 200_000, 1, 0), false);
            n.add(seg_item(2, Point::new(0, 1_000_000), Point::new(1_000_000, 1_000_000), 200_000, 2, 10), false);
        }
        let resolver = FixedResolver(50_000);
        let outcome = shove(&root, &resolver, Uid(2)).unwrap();
        assert_eq!(outcome, ShoveOutcome::Stable);
        assert!(root.borrow().get_item(Uid(1)).is_some());
    }
}
