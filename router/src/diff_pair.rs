//! The differential-pair placer (spec §4.6): two coupled line placers that
//! keep a P/N trace pair centered on a shared path and a fixed copper gap.
//!
//! Ported in spirit from the original router's `DIFF_PAIR_PLACER`
//! (`pns_diff_pair_placer.h`): `Start` anchors on a `DP_PRIMITIVE_PAIR` and
//! checks the gap tolerance, `Move` recomputes a centerline and offsets it
//! ±gap/2 before running the same shove/walkaround/mark-obstacles ladder
//! [`crate::placer::LinePlacer`] uses, and `FixRoute` commits both legs at
//! once. `attemptWalk`'s joint two-line walkaround (where P's detour can
//! force N to replan, and vice versa) is not reproduced; each leg is
//! resolved independently against the same candidate mode, which keeps both
//! legs parallel only as long as neither meets an obstacle the other
//! doesn't — a documented simplification, not the original's coupled
//! detour search.
//!
//! Corner offsetting uses the incident segments' averaged normal rather
//! than the original's explicit miter/arc corner construction
//! (`pns_dp_meander_placer`'s sibling code in `pns_meander.cpp`); fine for
//! the 0/45/90-degree turns [`geometry::direction::Direction45`] produces,
//! not a general polygon-offset algorithm.

use geometry::prelude::{Direction45, LineChain, Point};
use geometry::span::LayerRange;

use crate::collision::{self, CollisionQueryOptions};
use crate::error::{Error, Result};
use crate::iface::RouterIface;
use crate::id::{LayerId, NetId};
use crate::item::{Hole, Item, ItemCommon, Line, Segment, Uid, Via, ViaDiameter};
use crate::node::{Node, NodeRef};
use crate::rule::RuleResolver;
use crate::shove::{self, ShoveOutcome};
use crate::sizes::SizesSettings;
use crate::walkaround::{self, Side};

/// Maximum fractional deviation of measured anchor spacing from the
/// configured gap before `Start` refuses to begin (spec.md §4.6, scenario 4).
const GAP_TOLERANCE: f64 = 0.10;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum PlacerState {
    Idle,
    Active,
    Finished,
}

/// One fixed stage of a diff-pair interaction: both legs' committed item
/// UIDs, so `UnfixRoute` can remove exactly them.
#[derive(Debug, Clone)]
struct FixStage {
    point: Point,
    placing_via: bool,
    items: Vec<Uid>,
}

#[derive(Debug, Default)]
struct FixedTail {
    stages: Vec<FixStage>,
}

impl FixedTail {
    fn clear(&mut self) {
        self.stages.clear();
    }

    fn push(&mut self, stage: FixStage) {
        self.stages.push(stage);
    }

    fn pop(&mut self) -> Option<FixStage> {
        self.stages.pop()
    }
}

/// The interactive differential-pair placer.
pub struct DiffPairPlacer {
    state: PlacerState,
    world: NodeRef,
    interaction_node: NodeRef,
    head_p: Line,
    head_n: Line,
    tail_p: Line,
    tail_n: Line,
    p_start: Point,
    fix_start: Point,
    direction: Direction45,
    net_p: NetId,
    net_n: NetId,
    current_layer: LayerId,
    placing_via: bool,
    mode: crate::placer::RouteMode,
    sizes: SizesSettings,
    fixed_tail: FixedTail,
}

impl DiffPairPlacer {
    /// Creates an idle placer anchored to `world`.
    pub fn new(world: &NodeRef) -> Self {
        let sizes = SizesSettings::default();
        Self {
            state: PlacerState::Idle,
            world: world.clone(),
            interaction_node: Node::branch(world),
            head_p: Line::new(NetId::NONE, sizes.diff_pair_width, LayerRange::single(0)),
            head_n: Line::new(NetId::NONE, sizes.diff_pair_width, LayerRange::single(0)),
            tail_p: Line::new(NetId::NONE, sizes.diff_pair_width, LayerRange::single(0)),
            tail_n: Line::new(NetId::NONE, sizes.diff_pair_width, LayerRange::single(0)),
            p_start: Point::zero(),
            fix_start: Point::zero(),
            direction: Direction45::East,
            net_p: NetId::NONE,
            net_n: NetId::NONE,
            current_layer: LayerId(0),
            placing_via: false,
            mode: crate::placer::RouteMode::Shove,
            sizes,
            fixed_tail: FixedTail::default(),
        }
    }

    /// Begins a diff-pair interaction centered at `p` on `net_p`'s
    /// complementary pair. Fails with [`Error::NoDiffPairPartner`] if
    /// `net_p` has no coupled net, and with [`Error::DiffPairGapMismatch`]
    /// if an existing N-net anchor is found near `p` but its spacing from
    /// `p` is more than ±10% away from the configured gap.
    pub fn start(&mut self, resolver: &dyn RuleResolver, p: Point, net_p: NetId, layer: LayerId, sizes: SizesSettings) -> Result<()> {
        let net_n = resolver.dp_coupled_net(net_p).ok_or(Error::NoDiffPairPartner(net_p))?;

        self.interaction_node = Node::branch(&self.world);
        self.sizes = sizes;
        self.net_p = net_p;
        self.net_n = net_n;
        self.current_layer = layer;
        self.p_start = p;
        self.fix_start = p;
        self.placing_via = false;
        self.mode = crate::placer::RouteMode::Shove;
        self.fixed_tail.clear();
        self.direction = Direction45::East;

        let width = self.sizes.diff_pair_width;
        let expected = self.sizes.diff_pair_gap + width;

        let anchor_n = self
            .world
            .borrow()
            .items_in_net(net_n)
            .iter()
            .flat_map(|i| i.anchor_points())
            .min_by_key(|a| a.distance_squared(p));

        if let Some(anchor_n) = anchor_n {
            let actual = p.distance(anchor_n);
            let deviation = ((actual - expected).abs() as f64) / (expected.max(1) as f64);
            if deviation > GAP_TOLERANCE {
                return Err(Error::DiffPairGapMismatch { actual, expected });
            }
        }

        self.tail_p = Line::new(net_p, width, LayerRange::single(layer.0));
        self.tail_n = Line::new(net_n, width, LayerRange::single(layer.0));
        self.head_p = self.tail_p.clone();
        self.head_n = self.tail_n.clone();

        self.state = PlacerState::Active;
        Ok(())
    }

    /// Selects which collision-resolution mode subsequent `Move`s use.
    pub fn set_mode(&mut self, mode: crate::placer::RouteMode) {
        self.mode = mode;
    }

    /// Enables or disables appending terminating vias at both legs' ends.
    pub fn toggle_via(&mut self, enabled: bool) {
        self.placing_via = enabled;
    }

    /// Re-routes both legs' volatile heads toward `p`'s centerline,
    /// returning the achieved centerline endpoint.
    pub fn move_to(&mut self, resolver: &dyn RuleResolver, p: Point) -> Result<Point> {
        if self.state != PlacerState::Active {
            return Err(Error::PlacerNotActive);
        }

        if let Some(dir) = Direction45::from_vector(self.p_start, p) {
            self.direction = dir;
        }

        let half_spacing = (self.sizes.diff_pair_gap + self.sizes.diff_pair_width) / 2;
        let points = Direction45::build_initial_trace(self.p_start, p, self.direction.is_diagonal());
        let mut centerline = LineChain::from_points(points, false);
        centerline.simplify();

        let chain_p = offset_chain(&centerline, half_spacing);
        let chain_n = offset_chain(&centerline, -half_spacing);

        let probe = Node::branch(&self.interaction_node);
        let mut line_p = self.resolve_leg(&probe, resolver, chain_p, self.net_p)?;
        let mut line_n = self.resolve_leg(&probe, resolver, chain_n, self.net_n)?;

        if self.placing_via {
            append_via_preview(&mut line_p, self.net_p, LayerRange::single(self.current_layer.0), &self.sizes);
            append_via_preview(&mut line_n, self.net_n, LayerRange::single(self.current_layer.0), &self.sizes);
        }

        let end = *centerline.points().last().unwrap_or(&self.p_start);
        self.head_p = line_p;
        self.head_n = line_n;
        Ok(end)
    }

    fn resolve_leg(&self, node: &NodeRef, resolver: &dyn RuleResolver, mut chain: LineChain, net: NetId) -> Result<Line> {
        let width = self.sizes.diff_pair_width;
        let layers = LayerRange::single(self.current_layer.0);
        let head_uids = insert_chain_as_head(node, &chain, net, layers, width);

        match self.mode {
            crate::placer::RouteMode::MarkObstacles => {
                for uid in &head_uids {
                    let Some(head_item) = node.borrow().get_item(*uid) else { continue };
                    mark_colliding(node, resolver, &head_item);
                }
            }
            crate::placer::RouteMode::WalkaroundOnly => {
                chain = self.walk_around(node, resolver, &chain, net, width)?;
            }
            crate::placer::RouteMode::Shove => {
                let mut stable = true;
                for uid in &head_uids {
                    match shove::shove(node, resolver, *uid)? {
                        ShoveOutcome::Stable => {}
                        ShoveOutcome::Fail | ShoveOutcome::IterLimit => stable = false,
                    }
                }
                if !stable {
                    chain = self.walk_around(node, resolver, &chain, net, width)?;
                }
            }
        }

        let mut line = Line::new(net, width, layers);
        line.chain = chain;
        Ok(line)
    }

    fn walk_around(&self, node: &NodeRef, resolver: &dyn RuleResolver, chain: &LineChain, net: NetId, width: i64) -> Result<LineChain> {
        let mut chain = chain.clone();
        for _ in 0..8 {
            let Some((obstacle, probe)) = first_colliding_obstacle(node, resolver, &chain, self.current_layer, net, width) else {
                return Ok(chain);
            };
            let clearance = resolver.clearance(&probe, &obstacle, false);
            let hull = collision::item_hull(&obstacle, clearance, width);
            chain = walkaround::walkaround(&chain, &hull, Side::CounterClockwise)
                .or_else(|_| walkaround::walkaround(&chain, &hull, Side::Clockwise))?;
        }
        Ok(chain)
    }

    /// Commits both legs' current heads into the interaction's working node
    /// as real linked items, rebases the centerline start, and either
    /// continues the interaction or, if `force_finish`, ends it.
    pub fn fix_route(&mut self, resolver: &dyn RuleResolver, p: Point, force_finish: bool) -> Result<bool> {
        if self.state != PlacerState::Active {
            return Err(Error::PlacerNotActive);
        }
        let achieved_end = self.move_to(resolver, p)?;

        let mut stage_items = Vec::new();
        let width = self.sizes.diff_pair_width;
        let layers = LayerRange::single(self.current_layer.0);

        let mut last_p = *self.head_p.chain.points().first().unwrap_or(&self.p_start);
        for seg in self.head_p.chain.segments() {
            if seg.is_degenerate() {
                continue;
            }
            let uid = self.interaction_node.borrow().alloc_uid();
            let item = Item::Segment(Segment { common: ItemCommon::new(uid, layers, self.net_p, 0), seg, width });
            self.interaction_node.borrow_mut().add(item, false);
            stage_items.push(uid);
            last_p = seg.b;
        }
        let mut last_n = *self.head_n.chain.points().first().unwrap_or(&self.p_start);
        for seg in self.head_n.chain.segments() {
            if seg.is_degenerate() {
                continue;
            }
            let uid = self.interaction_node.borrow().alloc_uid();
            let item = Item::Segment(Segment { common: ItemCommon::new(uid, layers, self.net_n, 0), seg, width });
            self.interaction_node.borrow_mut().add(item, false);
            stage_items.push(uid);
            last_n = seg.b;
        }

        if self.placing_via {
            let via_gap = self.sizes.diff_pair_via_gap;
            let uid_p = self.interaction_node.borrow().alloc_uid();
            let via_p = make_via(uid_p, last_p, self.net_p, layers, &self.sizes);
            self.interaction_node.borrow_mut().add(Item::Via(via_p), false);
            stage_items.push(uid_p);

            let uid_n = self.interaction_node.borrow().alloc_uid();
            let mut via_n = make_via(uid_n, last_n, self.net_n, layers, &self.sizes);
            let spacing = last_p.distance(last_n);
            if spacing > 0 {
                let toward = (last_n - last_p).resized(via_gap - spacing);
                via_n.pos = last_n + toward;
            }
            self.interaction_node.borrow_mut().add(Item::Via(via_n), false);
            stage_items.push(uid_n);
        }

        if let Some(mut assembled) = assemble_leg(&self.interaction_node, &stage_items, self.net_p) {
            assembled.chain.simplify();
            self.tail_p = assembled;
        }
        if let Some(mut assembled) = assemble_leg(&self.interaction_node, &stage_items, self.net_n) {
            assembled.chain.simplify();
            self.tail_n = assembled;
        }

        self.fixed_tail.push(FixStage { point: achieved_end, placing_via: self.placing_via, items: stage_items });
        self.p_start = achieved_end;
        self.head_p = Line::new(self.net_p, width, layers);
        self.head_n = Line::new(self.net_n, width, layers);

        if force_finish {
            self.state = PlacerState::Finished;
        }
        Ok(force_finish)
    }

    /// Pops the last fixed stage, removing both legs' items it committed.
    pub fn unfix_route(&mut self) -> Option<Point> {
        let stage = self.fixed_tail.pop()?;
        {
            let mut n = self.interaction_node.borrow_mut();
            for uid in &stage.items {
                n.remove(*uid);
            }
        }
        let restored = self.fixed_tail.stages.last();
        self.p_start = restored.map(|s| s.point).unwrap_or(self.fix_start);
        self.placing_via = restored.map(|s| s.placing_via).unwrap_or(false);
        Some(self.p_start)
    }

    /// Whether any stage has been fixed this interaction.
    pub fn has_placed_anything(&self) -> bool {
        self.fixed_tail.stages.iter().any(|s| !s.items.is_empty())
    }

    /// Commits the entire interaction into the world through `iface`.
    pub fn commit_placement(&mut self, iface: &mut dyn RouterIface) -> Result<()> {
        crate::node::commit(iface, &self.interaction_node)?;
        self.state = PlacerState::Idle;
        Ok(())
    }

    /// Abandons the interaction without committing anything.
    pub fn abort_placement(&mut self) {
        self.state = PlacerState::Idle;
        let width = self.sizes.diff_pair_width;
        let layers = LayerRange::single(self.current_layer.0);
        self.head_p = Line::new(self.net_p, width, layers);
        self.head_n = Line::new(self.net_n, width, layers);
    }

    /// The P-leg's volatile head as of the last `move_to`/`fix_route`.
    pub fn head_p(&self) -> &Line {
        &self.head_p
    }

    /// The N-leg's volatile head as of the last `move_to`/`fix_route`.
    pub fn head_n(&self) -> &Line {
        &self.head_n
    }

    /// The two nets currently being routed, `(p, n)`.
    pub fn current_nets(&self) -> (NetId, NetId) {
        (self.net_p, self.net_n)
    }

    /// The point the current interaction started from.
    pub fn current_start(&self) -> Point {
        self.p_start
    }
}

/// Offsets `chain` sideways by `distance` (negative for the opposite side),
/// using each vertex's incident-segment averaged normal so 0/45/90-degree
/// corners stay roughly parallel rather than opening a gap or self-crossing.
fn offset_chain(chain: &LineChain, distance: i64) -> LineChain {
    let points = chain.points();
    if points.len() < 2 {
        return chain.clone();
    }
    let mut out = Vec::with_capacity(points.len());
    for i in 0..points.len() {
        let dir_in = if i > 0 { points[i] - points[i - 1] } else { points[1] - points[0] };
        let dir_out = if i + 1 < points.len() { points[i + 1] - points[i] } else { dir_in };
        let normal = (dir_in.resized(1_000_000).perp_ccw() + dir_out.resized(1_000_000).perp_ccw()).resized(distance);
        out.push(points[i] + normal);
    }
    let mut result = LineChain::from_points(out, false);
    result.simplify();
    result
}

fn insert_chain_as_head(node: &NodeRef, chain: &LineChain, net: NetId, layers: LayerRange, width: i64) -> Vec<Uid> {
    let mut uids = Vec::new();
    for seg in chain.segments() {
        if seg.is_degenerate() {
            continue;
        }
        let uid = node.borrow().alloc_uid();
        let mut common = ItemCommon::new(uid, layers, net, i32::MAX);
        common.markers.insert(crate::item::Markers::HEAD);
        common.is_virtual = true;
        let item = Item::Segment(Segment { common, seg, width });
        node.borrow_mut().add(item, true);
        uids.push(uid);
    }
    uids
}

fn mark_colliding(node: &NodeRef, resolver: &dyn RuleResolver, item: &Item) {
    let colliding = node.borrow().query_colliding(item, resolver, &CollisionQueryOptions::default());
    for obstacle in colliding {
        let mut marked = obstacle.clone();
        marked.common_mut().markers.insert(crate::item::Markers::VIOLATION);
        let mut n = node.borrow_mut();
        n.remove(marked.uid());
        n.add(marked, true);
    }
}

fn first_colliding_obstacle(
    node: &NodeRef,
    resolver: &dyn RuleResolver,
    chain: &LineChain,
    layer: LayerId,
    net: NetId,
    width: i64,
) -> Option<(Item, Item)> {
    for seg in chain.segments() {
        let probe = Item::Segment(Segment {
            common: ItemCommon::new(Uid(0), LayerRange::single(layer.0), net, i32::MAX),
            seg,
            width,
        });
        let options = CollisionQueryOptions { limit_count: Some(1), ..Default::default() };
        if let Some(obstacle) = node.borrow().query_colliding(&probe, resolver, &options).into_iter().next() {
            return Some((obstacle, probe));
        }
    }
    None
}

fn assemble_leg(node: &NodeRef, stage_items: &[Uid], net: NetId) -> Option<Line> {
    let n = node.borrow();
    let seed = stage_items.iter().find(|&&uid| n.get_item(uid).map(|i| i.net() == net).unwrap_or(false))?;
    n.assemble_line(*seed, true)
}

fn make_via(uid: Uid, pos: Point, net: NetId, layers: LayerRange, sizes: &SizesSettings) -> Via {
    let common = ItemCommon::new(uid, layers, net, 0);
    Via {
        common: common.clone(),
        pos,
        diameter: ViaDiameter::Uniform(sizes.via_diameter),
        drill: sizes.via_drill,
        via_type: sizes.via_type,
        hole: Hole { common, shape: geometry::prelude::Shape::Circle { center: pos, radius: sizes.via_drill / 2 } },
        unconnected_layer_removal: sizes.unconnected_layer_removal,
    }
}

fn append_via_preview(line: &mut Line, net: NetId, layers: LayerRange, sizes: &SizesSettings) {
    let pos = *line.chain.points().last().unwrap_or(&Point::zero());
    line.end_via = Some(crate::item::ViaRef::Owned(Box::new(make_via(Uid(0), pos, net, layers, sizes))));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{Constraint, ConstraintKind, DpPolarity};

    struct DpResolver {
        clearance: i64,
        p: NetId,
        n: NetId,
    }

    impl RuleResolver for DpResolver {
        fn clearance(&self, _a: &Item, _b: &Item, _use_epsilon: bool) -> i64 {
            self.clearance
        }
        fn query_constraint(&self, _kind: ConstraintKind, _a: &Item, _b: &Item, _layer: LayerId) -> Option<Constraint> {
            None
        }
        fn dp_coupled_net(&self, net: NetId) -> Option<NetId> {
            if net == self.p {
                Some(self.n)
            } else if net == self.n {
                Some(self.p)
            } else {
                None
            }
        }
        fn dp_net_polarity(&self, net: NetId) -> DpPolarity {
            if net == self.p {
                DpPolarity::Positive
            } else if net == self.n {
                DpPolarity::Negative
            } else {
                DpPolarity::None
            }
        }
        fn dp_net_pair(&self, _item: &Item) -> Option<(NetId, NetId)> {
            Some((self.p, self.n))
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

    #[test]
    fn start_fails_without_a_coupled_net() {
        let world = Node::new_root();
        struct NoPartner;
        impl RuleResolver for NoPartner {
            fn clearance(&self, _a: &Item, _b: &Item, _e: bool) -> i64 {
                50_000
            }
            fn query_constraint(&self, _k: ConstraintKind, _a: &Item, _b: &Item, _l: LayerId) -> Option<Constraint> {
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
        let resolver = NoPartner;
        let mut placer = DiffPairPlacer::new(&world);
        let err = placer.start(&resolver, Point::new(0, 0), NetId(1), LayerId(0), SizesSettings::default()).unwrap_err();
        assert_eq!(err, Error::NoDiffPairPartner(NetId(1)));
    }

    #[test]
    fn start_fails_when_anchor_spacing_is_outside_tolerance() {
        let world = Node::new_root();
        let mut sizes = SizesSettings::default();
        sizes.diff_pair_gap = 200_000;
        sizes.diff_pair_width = 125_000;
        world.borrow_mut().add(
            Item::Segment(Segment {
                common: ItemCommon::new(Uid(1), LayerRange::single(0), NetId(2), 0),
                seg: geometry::prelude::Seg::new(Point::new(0, 600_000), Point::new(1_000_000, 600_000)),
                width: 125_000,
            }),
            false,
        );
        let resolver = DpResolver { clearance: 50_000, p: NetId(1), n: NetId(2) };
        let mut placer = DiffPairPlacer::new(&world);
        let err = placer.start(&resolver, Point::new(0, 0), NetId(1), LayerId(0), sizes).unwrap_err();
        assert!(matches!(err, Error::DiffPairGapMismatch { .. }));
    }

    #[test]
    fn move_to_keeps_both_legs_offset_from_the_centerline() {
        let world = Node::new_root();
        let resolver = DpResolver { clearance: 50_000, p: NetId(1), n: NetId(2) };
        let mut placer = DiffPairPlacer::new(&world);
        placer.start(&resolver, Point::new(0, 0), NetId(1), LayerId(0), SizesSettings::default()).unwrap();
        placer.move_to(&resolver, Point::new(2_000_000, 0)).unwrap();

        let p_end = *placer.head_p().chain.points().last().unwrap();
        let n_end = *placer.head_n().chain.points().last().unwrap();
        let spacing = p_end.distance(n_end);
        let expected = placer.sizes.diff_pair_gap + placer.sizes.diff_pair_width;
        assert!((spacing - expected).abs() <= expected / 10);
    }

    #[test]
    fn fix_route_commits_both_legs() {
        let world = Node::new_root();
        let resolver = DpResolver { clearance: 50_000, p: NetId(1), n: NetId(2) };
        let mut placer = DiffPairPlacer::new(&world);
        placer.start(&resolver, Point::new(0, 0), NetId(1), LayerId(0), SizesSettings::default()).unwrap();
        placer.move_to(&resolver, Point::new(2_000_000, 0)).unwrap();
        let finished = placer.fix_route(&resolver, Point::new(2_000_000, 0), true).unwrap();
        assert!(finished);
        assert!(placer.has_placed_anything());

        struct NoopIface;
        impl RouterIface for NoopIface {
            fn sync_world(&self, _node: &mut crate::node::Node) {}
            fn add_item(&mut self, _item: &Item) {}
            fn remove_item(&mut self, _item: &Item) {}
            fn update_item(&mut self, _item: &Item) {}
            fn commit(&mut self) {}
            fn net_name(&self, _net: NetId) -> Option<arcstr::ArcStr> {
                None
            }
            fn net_from_name(&self, _name: &str) -> Option<NetId> {
                None
            }
            fn pns_layer_from_board_layer(&self, board_layer: i32) -> LayerId {
                LayerId(board_layer)
            }
            fn board_layer_from_pns_layer(&self, layer: LayerId) -> i32 {
                layer.0
            }
            fn is_flashed_on_layer(&self, _item: &Item, _layers: LayerId) -> bool {
                true
            }
            fn display_item(&mut self, _item: &Item) {}
            fn hide_item(&mut self, _item: &Item) {}
            fn update_net(&mut self, _net: NetId) {}
            fn set_commit_flags(&mut self, _flags: crate::iface::CommitFlags) {}
        }
        let mut iface = NoopIface;
        placer.commit_placement(&mut iface).unwrap();
        let n = world.borrow();
        assert!(n.all_items().iter().any(|i| i.net() == NetId(1)));
        assert!(n.all_items().iter().any(|i| i.net() == NetId(2)));
    }
}
