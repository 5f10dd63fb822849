//! The hull and collision engine (spec §4.2): builds per-item hulls
//! inflated by clearance + width/2, and answers "does X collide with Y" and
//! "what obstacles collide with X" queries that [`crate::node::Node`]
//! exposes to the placer, dragger and shove engine.

use std::collections::HashSet;
use std::rc::Rc;

use geometry::hull;
use geometry::prelude::{LineChain, Point, Shape};

use crate::id::LayerId;
use crate::item::{Item, ItemKind};
use crate::rule::{ConstraintKind, RuleResolver};

/// How thoroughly a collision query should check holes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CollisionQueryScope {
    /// Apply every rule, including the hole-to-hole/hole-to-copper slow
    /// path.
    AllRules,
    /// Skip hole clearance checks — used by shove's fast re-validation pass
    /// where a hole collision would already have been caught earlier.
    IgnoreHoleClearance,
}

/// Tuning knobs for [`crate::node::Node::query_colliding`] and
/// [`crate::node::Node::nearest_obstacle`].
pub struct CollisionQueryOptions {
    /// Only report obstacles on a different, non-null net than the query
    /// item.
    pub different_nets_only: bool,
    /// If set, use this clearance value directly instead of consulting the
    /// rule resolver (used by walkaround/shove re-checks against a known
    /// working clearance).
    pub override_clearance: Option<i64>,
    /// Stop after this many obstacles are found.
    pub limit_count: Option<usize>,
    /// If set, only consider candidates whose kind is in this set.
    pub kind_mask: Option<HashSet<ItemKind>>,
    /// Widen the resolver's clearance query for "at-clearance" boundary
    /// tolerance.
    pub use_clearance_epsilon: bool,
    /// Restrict the search to a specific layer (`None` = every layer the
    /// query item occupies).
    pub layer: Option<LayerId>,
    /// How thoroughly to check holes.
    pub scope: CollisionQueryScope,
    /// An arbitrary extra predicate a candidate must satisfy.
    pub filter: Option<Rc<dyn Fn(&Item) -> bool>>,
}

impl Default for CollisionQueryOptions {
    fn default() -> Self {
        Self {
            different_nets_only: false,
            override_clearance: None,
            limit_count: None,
            kind_mask: None,
            use_clearance_epsilon: false,
            layer: None,
            scope: CollisionQueryScope::AllRules,
            filter: None,
        }
    }
}

impl CollisionQueryOptions {
    /// Whether `candidate` passes this query's filters (kind/net/layer/
    /// custom predicate), independent of whether it geometrically collides.
    pub fn admits(&self, query: &Item, candidate: &Item) -> bool {
        if candidate.uid() == query.uid() {
            return false;
        }
        if let Some(mask) = &self.kind_mask {
            if !mask.contains(&candidate.kind()) {
                return false;
            }
        }
        if self.different_nets_only && candidate.net() == query.net() {
            return false;
        }
        if let Some(layer) = self.layer {
            if layer != LayerId::ALL && !candidate.common().layers.contains_layer(layer.0) {
                return false;
            }
        }
        if self.scope == CollisionQueryScope::IgnoreHoleClearance && matches!(candidate, Item::Hole(_)) {
            return false;
        }
        if let Some(filter) = &self.filter {
            if !filter(candidate) {
                return false;
            }
        }
        true
    }
}

/// Half of an item's effective copper width, for clearance math (spec
/// §4.1's `halfWidth(X)`).
pub fn half_width(item: &Item) -> i64 {
    match item {
        Item::Segment(s) => s.width / 2,
        Item::Arc(a) => a.arc.width() / 2,
        Item::Via(v) => {
            let top = v.common.layers.end();
            v.diameter.diameter_on(LayerId(v.common.layers.start()), top + 1) / 2
        }
        Item::Solid(_) => 0,
        Item::Hole(_) => 0,
    }
}

/// Whether [`geometry::shape::Shape::min_distance`] already subtracts
/// `shape`'s own width when paired with `other` (a `Circle`'s radius is
/// subtracted in every arm that touches it; a `Segment`'s width/2 only in
/// the arms built for a `Circle` or another `Segment` partner). `Rect` and
/// `Polygon` never carry width of their own in `min_distance` — a `Rect`
/// has none to begin with (`half_width` is always 0 for the `Item::Solid`
/// it represents), and a `Polygon` (an arc's chord approximation) is never
/// compensated by any match arm, not even the generic edge-distance
/// fallback that strips width from both operands regardless of kind.
fn width_handled_by(shape: &Shape, other: &Shape) -> bool {
    match shape {
        Shape::Circle { .. } => true,
        Shape::Segment(..) => matches!(other, Shape::Circle { .. } | Shape::Segment(..)),
        Shape::Rect(_) | Shape::Polygon(_) => false,
    }
}

/// The half-width `required_separation` must add back for `item`'s side of
/// a collision test, given the partner's shape — zero when `min_distance`
/// already folds `item`'s width into its boundary-to-boundary distance for
/// this pairing, `half_width(item)` when it doesn't (see
/// [`width_handled_by`]).
fn missing_width(item: &Item, item_shape: &Shape, other_shape: &Shape) -> i64 {
    if width_handled_by(item_shape, other_shape) {
        0
    } else {
        half_width(item)
    }
}

/// The separation `Shape::collides`/`Shape::min_distance` must clear for
/// `a` and `b` to be free of each other (spec §4.1's `clearance +
/// halfWidth(a) + halfWidth(b)`), restricted to whichever operands'
/// widths `min_distance` doesn't already carry in the shapes themselves —
/// a segment's capsule or a via's barrel is already inflated to its full
/// copper width for the shape pairings `min_distance` handles explicitly,
/// but an arc's shape is a zero-width chord polyline, so its width is
/// never already accounted for and must be added here.
pub fn required_separation(clearance: i64, a: &Item, b: &Item) -> i64 {
    let sa = a.shape();
    let sb = b.shape();
    clearance + missing_width(a, &sa, &sb) + missing_width(b, &sb, &sa)
}

/// Whether `a` and `b` collide, per spec §4.1's collision search algorithm.
pub fn collide(resolver: &dyn RuleResolver, a: &Item, b: &Item, use_epsilon: bool) -> bool {
    if matches!(a, Item::Hole(_)) || matches!(b, Item::Hole(_)) {
        return collide_hole(resolver, a, b);
    }
    if !a.common().layers.overlaps(&b.common().layers) {
        return false;
    }
    // Invariant 5: clearance between two items of the same non-null net is
    // unenforced.
    if !a.net().is_none() && a.net() == b.net() {
        return false;
    }
    let clearance = resolver.clearance(a, b, use_epsilon);
    if clearance < 0 {
        return false;
    }
    let required = required_separation(clearance, a, b);
    a.shape().collides(&b.shape(), required)
}

/// Like [`collide`], but using an already-known clearance value (the
/// walkaround/shove fast re-check path) instead of consulting the resolver.
pub fn collide_with_clearance(a: &Item, b: &Item, clearance: i64) -> bool {
    if !a.common().layers.overlaps(&b.common().layers) {
        return false;
    }
    let required = required_separation(clearance, a, b);
    a.shape().collides(&b.shape(), required)
}

fn collide_hole(resolver: &dyn RuleResolver, a: &Item, b: &Item) -> bool {
    if !a.common().layers.overlaps(&b.common().layers) {
        return false;
    }
    match (a, b) {
        (Item::Hole(h1), Item::Hole(h2)) => {
            let clearance = resolver
                .query_constraint(ConstraintKind::HoleToHole, a, b, LayerId::ALL)
                .map(|c| c.value)
                .unwrap_or(0);
            h1.shape.collides(&h2.shape, clearance)
        }
        (Item::Hole(h), other) | (other, Item::Hole(h)) => {
            let clearance = resolver
                .query_constraint(ConstraintKind::HoleClearance, a, b, LayerId::ALL)
                .map(|c| c.value)
                .unwrap_or(0);
            // A hole's own shape is never width-inflated (it has no
            // associated half_width), so only `other`'s side can need
            // compensation — e.g. an arc's zero-width chord polyline.
            let other_shape = other.shape();
            let required = clearance + missing_width(other, &other_shape, &h.shape);
            h.shape.collides(&other_shape, required)
        }
        _ => unreachable!("collide_hole is only called when a or b is Item::Hole"),
    }
}

/// The hull boundary an item presents to walkaround and shove: its shape
/// inflated by `clearance + walkaround_width / 2`, chamfered to an octagon
/// (or a merged arc/polygon offset for curved and compound shapes).
///
/// `clearance` must already be the resolver's output; this function only
/// builds the geometric boundary (spec §4.2's `Hull(clearance,
/// walkaroundWidth, layer)` contract — `layer` selects which of a
/// multi-layer item's shapes to hull and is threaded through by the caller
/// choosing which layer's copper the head line occupies).
pub fn item_hull(item: &Item, clearance: i64, walkaround_width: i64) -> LineChain {
    let half = walkaround_width / 2 + clearance.max(0);
    match item {
        Item::Segment(s) => {
            if s.seg.is_degenerate() {
                hull::point_hull(s.seg.a, half + s.width / 2)
            } else {
                segment_hull(s.seg, s.width, half)
            }
        }
        Item::Arc(a) => hull::arc_hull(&a.arc, half, 500),
        Item::Via(v) => hull::circular_hull(v.pos, half_width(item), half),
        Item::Solid(s) => shape_hull(&s.shape, half),
        Item::Hole(h) => shape_hull(&h.shape, half),
    }
}

fn segment_hull(seg: geometry::prelude::Seg, width: i64, clearance: i64) -> LineChain {
    let rect = geometry::rect::Rect::new(seg.a, seg.b);
    hull::octagonal_hull(rect, clearance + width / 2)
}

fn shape_hull(shape: &Shape, clearance: i64) -> LineChain {
    match shape {
        Shape::Circle { center, radius } => hull::circular_hull(*center, *radius, clearance),
        Shape::Rect(r) => hull::octagonal_hull(*r, clearance),
        Shape::Segment(seg, width) => segment_hull(*seg, *width, clearance),
        Shape::Polygon(chain) => {
            if chain.point_count() == 1 {
                return hull::point_hull(chain.points()[0], clearance);
            }
            let parts: Vec<LineChain> = chain
                .segments()
                .map(|s| segment_hull(s, 0, clearance))
                .collect();
            hull::merge_hulls(&parts)
        }
    }
}

/// The point on `obstacle`'s shape closest to `probe`'s nearest approach
/// along `seg`, used by [`crate::node::Node::nearest_obstacle`] to report a
/// contact point (and by the slow net-tie/castellation path so the rule
/// resolver can decide whether to exclude a collision by position).
pub fn contact_point(obstacle: &Item, seg: geometry::prelude::Seg) -> Point {
    let near_a = obstacle.shape().nearest_boundary_point(seg.a);
    let near_b = obstacle.shape().nearest_boundary_point(seg.b);
    if near_a.distance_squared(seg.a) <= near_b.distance_squared(seg.b) {
        near_a
    } else {
        near_b
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::NetId;
    use crate::item::{ItemCommon, Uid};
    use crate::rule::DpPolarity;
    use geometry::span::LayerRange;

    struct FixedResolver {
        clearance: i64,
    }

    impl RuleResolver for FixedResolver {
        fn clearance(&self, _a: &Item, _b: &Item, _use_epsilon: bool) -> i64 {
            self.clearance
        }
        fn query_constraint(
            &self,
            _kind: ConstraintKind,
            _a: &Item,
            _b: &Item,
            _layer: LayerId,
        ) -> Option<crate::rule::Constraint> {
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

    fn seg_item(uid: u64, a: Point, b: Point, width: i64, net: u32) -> Item {
        Item::Segment(crate::item::Segment {
            common: ItemCommon::new(Uid(uid), LayerRange::single(0), NetId(net), 0),
            seg: geometry::prelude::Seg::new(a, b),
            width,
        })
    }

    #[test]
    fn end_to_end_scenario_1_parallel_tracks_do_not_collide() {
        let resolver = FixedResolver { clearance: 50_000 };
        let a = seg_item(1, Point::new(0, 0), Point::new(1_000_000, 0), 200_000, 1);
        let b = seg_item(2, Point::new(0, 500_000), Point::new(1_000_000, 500_000), 200_000, 2);
        assert!(!collide(&resolver, &a, &b, false));
    }

    #[test]
    fn end_to_end_scenario_3_raising_width_causes_collision() {
        let resolver = FixedResolver { clearance: 50_000 };
        let a = seg_item(1, Point::new(0, 300_000), Point::new(1_000_000, 300_000), 200_000, 2);
        let b_thin = seg_item(2, Point::new(0, 0), Point::new(1_000_000, 0), 200_000, 1);
        assert!(!collide(&resolver, &a, &b_thin, false));
        let b_wide = seg_item(2, Point::new(0, 0), Point::new(1_000_000, 0), 400_000, 1);
        assert!(collide(&resolver, &a, &b_wide, false));
    }

    #[test]
    fn same_net_never_collides() {
        let resolver = FixedResolver { clearance: 50_000 };
        let a = seg_item(1, Point::new(0, 0), Point::new(1_000_000, 0), 200_000, 7);
        let b = seg_item(2, Point::new(0, 1), Point::new(1_000_000, 1), 200_000, 7);
        assert!(!collide(&resolver, &a, &b, false));
    }

    #[test]
    fn wide_arc_collides_with_nearby_segment_despite_zero_width_chord_shape() {
        // The arc's chord polyline (Item::Arc::shape()) carries no width of
        // its own, unlike a segment's or via's already-inflated shape, so
        // `required_separation` must add the arc's half-width back or this
        // would be missed as clear.
        let resolver = FixedResolver { clearance: 50_000 };
        let arc = Item::Arc(crate::item::ArcItem {
            common: ItemCommon::new(Uid(1), LayerRange::single(0), NetId(1), 0),
            arc: geometry::prelude::Arc::from_three_points(
                Point::new(0, 0),
                Point::new(500_000, 1),
                Point::new(1_000_000, 0),
                400_000,
            ),
        });
        let seg = seg_item(2, Point::new(0, 150_000), Point::new(1_000_000, 150_000), 200_000, 2);
        assert!(collide(&resolver, &arc, &seg, false));
    }

    #[test]
    fn coincident_holes_on_same_net_still_collide_by_hole() {
        // Two distinct holes at the same position and net are two distinct
        // physical drills (a line's own end-via hole never appears twice in
        // this comparison now that item::ViaRef makes ownership explicit),
        // so the hole-to-hole check applies its clearance like any other
        // pair and does not special-case identical shape/net.
        let resolver = FixedResolver { clearance: 10_000 };
        let hole = |uid: u64| {
            Item::Hole(crate::item::Hole {
                common: ItemCommon::new(Uid(uid), LayerRange::new(0, 3), NetId(1), 0),
                shape: Shape::Circle { center: Point::new(0, 0), radius: 125_000 },
            })
        };
        assert!(collide(&resolver, &hole(1), &hole(2), false));
    }
}
