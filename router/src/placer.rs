//! The line placer (spec §4.5): the interactive push-and-shove trace
//! placement state machine that drives the head/tail split as the cursor
//! moves.
//!
//! Ported from the original router's `LINE_PLACER` (`pns_line_placer.h`):
//! the head/tail split, the `FIXED_TAIL` fix-stage stack (here
//! [`FixedTail`]/[`FixStage`]), and the walkaround/shove/mark-obstacles mode
//! dispatch (`rhWalkOnly`/`rhShoveOnly`/`rhMarkObstacles`) are all carried
//! over; `mergeHead`/`reduceTail`/`optimizeTailHeadTransition` are collapsed
//! into a single post-concatenation [`geometry::line_chain::LineChain::simplify`]
//! call in [`LinePlacer::fix_route`] rather than reproduced as three
//! separate passes, since this crate's `LineChain::simplify` already
//! discards the same redundant collinear vertices they exist to remove.
//!
//! Each `Move` re-derives the head by branching a throwaway probe node off
//! the interaction's running tail node rather than mutating a single
//! long-lived working branch; the probe is dropped at the end of the call.
//! This means a long interaction accumulates dead `Weak` entries in the
//! tail node's children list (see [`crate::node::Node::branch`]) — bounded
//! memory growth, not a correctness issue, and the same trade the dragger
//! makes for the same reason.

use geometry::prelude::{Direction45, LineChain, Point, Seg, Shape};
use geometry::span::LayerRange;

use crate::collision::{self, CollisionQueryOptions};
use crate::error::{Error, Result};
use crate::iface::RouterIface;
use crate::id::{LayerId, NetId};
use crate::item::{Hole, Item, ItemCommon, Line, Markers, Segment, Uid, Via, ViaDiameter, ViaRef};
use crate::node::{Node, NodeRef};
use crate::posture::MouseTrailTracer;
use crate::rule::RuleResolver;
use crate::shove::{self, ShoveOutcome};
use crate::sizes::SizesSettings;
use crate::walkaround::{self, Side};

/// How `route_step` resolves collisions between the candidate head and the
/// rest of the world (`rhWalkOnly`/`rhShoveOnly`/`rhMarkObstacles` in the
/// original).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RouteMode {
    /// Route the head around obstacles without moving them.
    WalkaroundOnly,
    /// Push lower-rank obstacles clear of the head.
    Shove,
    /// Lay the head straight through obstacles, flagging every collision.
    MarkObstacles,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum PlacerState {
    Idle,
    Active,
    Finished,
}

/// One previously-fixed stage of the current interaction: the cursor
/// position it was fixed at, the layer and via state in effect, and the
/// UIDs of the items it committed into the interaction's working node (so
/// [`LinePlacer::unfix_route`] can remove exactly them).
#[derive(Debug, Clone)]
struct FixStage {
    point: Point,
    layer: LayerId,
    placing_via: bool,
    direction: Direction45,
    items: Vec<Uid>,
}

/// The stack of fixed stages within one placer interaction, mirroring the
/// original's `FIXED_TAIL`.
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

/// The interactive line placer: `Start` begins an interaction at a point,
/// `Move` re-routes the volatile head to the cursor, `FixRoute` commits the
/// head into the tail (optionally finishing the interaction), and
/// `UnfixRoute` undoes the last `FixRoute` without leaving the interaction.
pub struct LinePlacer {
    state: PlacerState,
    world: NodeRef,
    interaction_node: NodeRef,
    head: Line,
    tail: Line,
    p_start: Point,
    fix_start: Point,
    current_net: NetId,
    current_layer: LayerId,
    placing_via: bool,
    ortho_mode: bool,
    mode: RouteMode,
    direction: Direction45,
    initial_direction: Direction45,
    sizes: SizesSettings,
    fixed_tail: FixedTail,
    mouse_tracer: MouseTrailTracer,
    start_item: Option<Uid>,
}

impl LinePlacer {
    /// Creates an idle placer anchored to `world` (the host's committed
    /// board state). `Start` must be called before `Move`/`FixRoute`.
    pub fn new(world: &NodeRef) -> Self {
        let sizes = SizesSettings::default();
        Self {
            state: PlacerState::Idle,
            world: world.clone(),
            interaction_node: Node::branch(world),
            head: Line::new(NetId::NONE, sizes.track_width, LayerRange::single(0)),
            tail: Line::new(NetId::NONE, sizes.track_width, LayerRange::single(0)),
            p_start: Point::zero(),
            fix_start: Point::zero(),
            current_net: NetId::NONE,
            current_layer: LayerId(0),
            placing_via: false,
            ortho_mode: false,
            mode: RouteMode::Shove,
            direction: Direction45::East,
            initial_direction: Direction45::East,
            sizes,
            fixed_tail: FixedTail::default(),
            mouse_tracer: MouseTrailTracer::new(),
            start_item: None,
        }
    }

    /// Begins a new interaction at `p`. `start_item`, if given, seeds the
    /// posture solver's "last segment direction" bias from the item the
    /// trace departs from. Fails with [`Error::StartViolatesDrc`] if even a
    /// zero-length probe at `p` collides at minimum track width.
    pub fn start(
        &mut self,
        resolver: &dyn RuleResolver,
        p: Point,
        start_item: Option<Uid>,
        net: NetId,
        layer: LayerId,
        sizes: SizesSettings,
    ) -> Result<()> {
        self.interaction_node = Node::branch(&self.world);
        self.sizes = sizes;
        self.current_net = net;
        self.current_layer = layer;
        self.start_item = start_item;
        self.p_start = p;
        self.fix_start = p;
        self.placing_via = false;
        self.ortho_mode = false;
        self.mode = RouteMode::Shove;
        self.fixed_tail.clear();
        self.tail = Line::new(net, self.sizes.track_width, LayerRange::single(layer.0));
        self.head = Line::new(net, self.sizes.track_width, LayerRange::single(layer.0));

        self.initial_direction = start_item
            .and_then(|uid| self.world.borrow().get_item(uid))
            .and_then(|item| last_item_direction(&item))
            .unwrap_or(Direction45::East);
        self.direction = self.initial_direction;

        self.mouse_tracer = MouseTrailTracer::new();
        self.mouse_tracer.set_tolerance((self.sizes.track_width / 10).max(1));
        self.mouse_tracer.set_default_directions(self.initial_direction, None);

        if self.start_violates_drc(resolver) {
            self.state = PlacerState::Idle;
            return Err(Error::StartViolatesDrc);
        }

        self.state = PlacerState::Active;
        Ok(())
    }

    fn start_violates_drc(&self, resolver: &dyn RuleResolver) -> bool {
        let probe = Item::Segment(Segment {
            common: ItemCommon::new(Uid(0), LayerRange::single(self.current_layer.0), self.current_net, i32::MIN),
            seg: Seg::new(self.p_start, self.p_start),
            width: self.sizes.board_min_track_width,
        });
        let options = CollisionQueryOptions { different_nets_only: true, ..Default::default() };
        !self.interaction_node.borrow().query_colliding(&probe, resolver, &options).is_empty()
    }

    /// Selects which collision-resolution mode subsequent `Move`s use.
    pub fn set_mode(&mut self, mode: RouteMode) {
        self.mode = mode;
    }

    /// Enables or disables the orthogonal-only cursor constraint (the head's
    /// final leg is forced onto the nearest cardinal direction rather than
    /// following the posture solver's diagonal choice).
    pub fn set_ortho_mode(&mut self, enabled: bool) {
        self.ortho_mode = enabled;
    }

    /// Whether a terminating via will be appended at the head's end.
    pub fn is_placing_via(&self) -> bool {
        self.placing_via
    }

    /// Enables or disables appending a terminating via at the head's end.
    pub fn toggle_via(&mut self, enabled: bool) {
        self.placing_via = enabled;
    }

    /// Forces the opposite initial bend direction, per spec §4.8.
    pub fn flip_posture(&mut self) {
        self.mouse_tracer.flip_posture();
    }

    /// Re-routes the volatile head to `p`, returning the point the head
    /// actually ended at (which may differ from `p` if a walkaround
    /// projected the endpoint onto an obstacle hull).
    pub fn move_to(&mut self, resolver: &dyn RuleResolver, p: Point) -> Result<Point> {
        if self.state != PlacerState::Active {
            return Err(Error::PlacerNotActive);
        }

        self.mouse_tracer.add_trail_point(p);
        self.mouse_tracer.set_default_directions(self.initial_direction, last_tail_direction(&self.tail));
        self.direction = if self.ortho_mode {
            self.mouse_tracer.get_posture(p).nearest_cardinal()
        } else {
            self.mouse_tracer.get_posture(p)
        };

        let mut line = self.route_candidate(resolver, p)?;
        line = handle_self_intersection(line);
        if self.placing_via {
            append_via_preview(&mut line, self.current_net, LayerRange::single(self.current_layer.0), &self.sizes);
        }

        let end = *line.chain.points().last().unwrap_or(&self.p_start);
        self.head = line;
        Ok(end)
    }

    fn route_candidate(&self, resolver: &dyn RuleResolver, p: Point) -> Result<Line> {
        let points = Direction45::build_initial_trace(self.p_start, p, self.direction.is_diagonal());
        let mut chain = LineChain::from_points(points, false);
        chain.simplify();

        let probe = Node::branch(&self.interaction_node);
        let head_uids = self.insert_chain_as_head(&probe, &chain);

        match self.mode {
            RouteMode::MarkObstacles => {
                self.mark_obstacles(&probe, resolver, &head_uids);
            }
            RouteMode::WalkaroundOnly => {
                chain = self.walk_around_obstacles(&probe, resolver, &chain)?;
            }
            RouteMode::Shove => {
                let mut stable = true;
                for uid in &head_uids {
                    match shove::shove(&probe, resolver, *uid)? {
                        ShoveOutcome::Stable => {}
                        ShoveOutcome::Fail | ShoveOutcome::IterLimit => stable = false,
                    }
                }
                if !stable {
                    chain = self.walk_around_obstacles(&probe, resolver, &chain)?;
                }
            }
        }

        let mut line = Line::new(self.current_net, self.sizes.track_width, LayerRange::single(self.current_layer.0));
        line.chain = chain;
        Ok(line)
    }

    fn insert_chain_as_head(&self, node: &NodeRef, chain: &LineChain) -> Vec<Uid> {
        let mut uids = Vec::new();
        for seg in chain.segments() {
            if seg.is_degenerate() {
                continue;
            }
            let uid = node.borrow().alloc_uid();
            let mut common = ItemCommon::new(uid, LayerRange::single(self.current_layer.0), self.current_net, i32::MAX);
            common.markers.insert(Markers::HEAD);
            common.is_virtual = true;
            let item = Item::Segment(Segment { common, seg, width: self.sizes.track_width });
            node.borrow_mut().add(item, true);
            uids.push(uid);
        }
        uids
    }

    fn mark_obstacles(&self, node: &NodeRef, resolver: &dyn RuleResolver, head_uids: &[Uid]) {
        for uid in head_uids {
            let Some(head_item) = node.borrow().get_item(*uid) else { continue };
            let colliding = node.borrow().query_colliding(&head_item, resolver, &CollisionQueryOptions::default());
            for obstacle in colliding {
                let mut marked = obstacle.clone();
                marked.common_mut().markers.insert(Markers::VIOLATION);
                let mut n = node.borrow_mut();
                n.remove(marked.uid());
                n.add(marked, true);
            }
        }
    }

    /// Finds the first non-head item the full `chain` collides with and
    /// reroutes around its hull, repeating (up to a small bound) in case the
    /// detour itself meets another obstacle. Tries the posture's preferred
    /// winding first, then the opposite one.
    fn walk_around_obstacles(&self, node: &NodeRef, resolver: &dyn RuleResolver, chain: &LineChain) -> Result<LineChain> {
        let mut chain = chain.clone();
        for _ in 0..8 {
            let Some((obstacle, probe)) = self.first_colliding_obstacle(node, resolver, &chain) else {
                return Ok(chain);
            };
            let clearance = resolver.clearance(&probe, &obstacle, false);
            let hull = collision::item_hull(&obstacle, clearance, self.sizes.track_width);
            let preferred = if self.direction.is_diagonal() { Side::CounterClockwise } else { Side::Clockwise };
            chain = walkaround::walkaround(&chain, &hull, preferred)
                .or_else(|_| walkaround::walkaround(&chain, &hull, opposite(preferred)))?;
        }
        Ok(chain)
    }

    fn first_colliding_obstacle(&self, node: &NodeRef, resolver: &dyn RuleResolver, chain: &LineChain) -> Option<(Item, Item)> {
        for seg in chain.segments() {
            let probe = Item::Segment(Segment {
                common: ItemCommon::new(Uid(0), LayerRange::single(self.current_layer.0), self.current_net, i32::MAX),
                seg,
                width: self.sizes.track_width,
            });
            let options = CollisionQueryOptions { limit_count: Some(1), ..Default::default() };
            if let Some(obstacle) = node.borrow().query_colliding(&probe, resolver, &options).into_iter().next() {
                return Some((obstacle, probe));
            }
        }
        None
    }

    /// Commits the current head into the interaction's working node as real
    /// linked items, then either rebases `p_start` onto the new endpoint for
    /// chained placement or, if `force_finish` is set, ends the interaction.
    /// Returns whether the interaction finished.
    pub fn fix_route(&mut self, resolver: &dyn RuleResolver, p: Point, force_finish: bool) -> Result<bool> {
        if self.state != PlacerState::Active {
            return Err(Error::PlacerNotActive);
        }
        let achieved_end = self.move_to(resolver, p)?;

        let mut stage_items = Vec::new();
        let mut last_point = *self.head.chain.points().first().unwrap_or(&self.p_start);
        for seg in self.head.chain.segments() {
            if seg.is_degenerate() {
                continue;
            }
            let uid = self.interaction_node.borrow().alloc_uid();
            let item = Item::Segment(Segment {
                common: ItemCommon::new(uid, LayerRange::single(self.current_layer.0), self.current_net, 0),
                seg,
                width: self.sizes.track_width,
            });
            self.interaction_node.borrow_mut().add(item, false);
            stage_items.push(uid);
            last_point = seg.b;
        }

        if self.placing_via {
            let uid = self.interaction_node.borrow().alloc_uid();
            let via = make_via(uid, last_point, self.current_net, LayerRange::single(self.current_layer.0), &self.sizes);
            self.interaction_node.borrow_mut().add(Item::Via(via), false);
            stage_items.push(uid);
        }

        if let Some(&seed) = stage_items.first() {
            if let Some(mut assembled) = self.interaction_node.borrow().assemble_line(seed, true) {
                assembled.chain.simplify();
                self.tail = assembled;
            }
        }

        self.fixed_tail.push(FixStage {
            point: achieved_end,
            layer: self.current_layer,
            placing_via: self.placing_via,
            direction: self.direction,
            items: stage_items,
        });

        self.p_start = achieved_end;
        self.head = Line::new(self.current_net, self.sizes.track_width, LayerRange::single(self.current_layer.0));

        if force_finish {
            self.state = PlacerState::Finished;
        }
        Ok(force_finish)
    }

    /// Pops the last fixed stage, removing the items it committed and
    /// restoring the placer's cursor and layer to the prior stage (or to the
    /// interaction's original start point if none remain). Returns the
    /// restored point, or `None` if nothing was fixed.
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
        self.current_layer = restored.map(|s| s.layer).unwrap_or(self.current_layer);
        self.placing_via = restored.map(|s| s.placing_via).unwrap_or(false);
        self.direction = restored.map(|s| s.direction).unwrap_or(self.initial_direction);
        Some(self.p_start)
    }

    /// Whether any stage has been fixed this interaction.
    pub fn has_placed_anything(&self) -> bool {
        self.fixed_tail.stages.iter().any(|s| !s.items.is_empty())
    }

    /// Commits the entire interaction (every fixed stage) into the world
    /// through `iface`, and returns the placer to idle.
    pub fn commit_placement(&mut self, iface: &mut dyn RouterIface) -> Result<()> {
        crate::node::commit(iface, &self.interaction_node)?;
        self.state = PlacerState::Idle;
        Ok(())
    }

    /// Abandons the interaction without committing anything.
    pub fn abort_placement(&mut self) {
        self.state = PlacerState::Idle;
        self.head = Line::new(self.current_net, self.sizes.track_width, LayerRange::single(self.current_layer.0));
    }

    /// The volatile head line as of the last `move_to`/`fix_route`.
    pub fn head(&self) -> &Line {
        &self.head
    }

    /// The tail assembled from this interaction's fixed stages so far.
    pub fn tail(&self) -> &Line {
        &self.tail
    }

    /// The point the current interaction started from.
    pub fn current_start(&self) -> Point {
        self.p_start
    }

    /// The layer the head is currently being routed on.
    pub fn current_layer(&self) -> LayerId {
        self.current_layer
    }

    /// The net being routed.
    pub fn current_net(&self) -> NetId {
        self.current_net
    }
}

fn last_item_direction(item: &Item) -> Option<Direction45> {
    match item {
        Item::Segment(s) => Direction45::from_vector(s.seg.a, s.seg.b),
        Item::Arc(a) => Direction45::from_vector(a.arc.start(), a.arc.end()),
        _ => None,
    }
}

fn last_tail_direction(tail: &Line) -> Option<Direction45> {
    let pts = tail.chain.points();
    if pts.len() < 2 {
        return None;
    }
    Direction45::from_vector(pts[pts.len() - 2], pts[pts.len() - 1])
}

fn opposite(side: Side) -> Side {
    match side {
        Side::Clockwise => Side::CounterClockwise,
        Side::CounterClockwise => Side::Clockwise,
    }
}

/// Truncates `line`'s chain at the first place it crosses itself at two
/// non-adjacent segments, matching the original's self-intersection
/// handling during `Move`.
fn handle_self_intersection(mut line: Line) -> Line {
    let n = line.chain.segment_count();
    'outer: for i in 0..n {
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            let a = line.chain.segment(i);
            let b = line.chain.segment(j);
            if let Some(p) = a.intersect(&b) {
                line.chain = line.chain.split(p).0;
                break 'outer;
            }
        }
    }
    line
}

fn make_via(uid: Uid, pos: Point, net: NetId, layers: LayerRange, sizes: &SizesSettings) -> Via {
    let common = ItemCommon::new(uid, layers, net, 0);
    Via {
        common: common.clone(),
        pos,
        diameter: ViaDiameter::Uniform(sizes.via_diameter),
        drill: sizes.via_drill,
        via_type: sizes.via_type,
        hole: Hole { common, shape: Shape::Circle { center: pos, radius: sizes.via_drill / 2 } },
        unconnected_layer_removal: sizes.unconnected_layer_removal,
    }
}

fn append_via_preview(line: &mut Line, net: NetId, layers: LayerRange, sizes: &SizesSettings) {
    let pos = *line.chain.points().last().unwrap_or(&Point::zero());
    line.end_via = Some(ViaRef::Owned(Box::new(make_via(Uid(0), pos, net, layers, sizes))));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{Constraint, ConstraintKind, DpPolarity};

    struct FixedResolver(i64);

    impl RuleResolver for FixedResolver {
        fn clearance(&self, _a: &Item, _b: &Item, _use_epsilon: bool) -> i64 {
            self.0
        }
        fn query_constraint(&self, _kind: ConstraintKind, _a: &Item, _b: &Item, _layer: LayerId) -> Option<Constraint> {
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

    #[test]
    fn start_then_move_builds_a_head_toward_the_cursor() {
        let world = Node::new_root();
        let resolver = FixedResolver(50_000);
        let mut placer = LinePlacer::new(&world);
        placer.start(&resolver, Point::new(0, 0), None, NetId(1), LayerId(0), SizesSettings::default()).unwrap();
        let end = placer.move_to(&resolver, Point::new(1_000_000, 0)).unwrap();
        assert_eq!(end, Point::new(1_000_000, 0));
        assert!(placer.head().chain.point_count() >= 2);
    }

    #[test]
    fn fix_route_moves_p_start_and_commit_adds_to_world() {
        let world = Node::new_root();
        let resolver = FixedResolver(50_000);
        let mut placer = LinePlacer::new(&world);
        placer.start(&resolver, Point::new(0, 0), None, NetId(1), LayerId(0), SizesSettings::default()).unwrap();
        placer.move_to(&resolver, Point::new(1_000_000, 0)).unwrap();
        let finished = placer.fix_route(&resolver, Point::new(1_000_000, 0), true).unwrap();
        assert!(finished);
        assert_eq!(placer.current_start(), Point::new(1_000_000, 0));
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
        assert!(world.borrow().all_items().iter().any(|i| i.net() == NetId(1)));
    }

    #[test]
    fn unfix_route_removes_the_last_fixed_stage() {
        let world = Node::new_root();
        let resolver = FixedResolver(50_000);
        let mut placer = LinePlacer::new(&world);
        placer.start(&resolver, Point::new(0, 0), None, NetId(1), LayerId(0), SizesSettings::default()).unwrap();
        placer.move_to(&resolver, Point::new(1_000_000, 0)).unwrap();
        placer.fix_route(&resolver, Point::new(1_000_000, 0), false).unwrap();
        assert!(placer.has_placed_anything());

        let restored = placer.unfix_route().unwrap();
        assert_eq!(restored, Point::new(0, 0));
        assert!(!placer.has_placed_anything());
    }

    #[test]
    fn move_before_start_is_rejected() {
        let world = Node::new_root();
        let resolver = FixedResolver(50_000);
        let mut placer = LinePlacer::new(&world);
        assert_eq!(placer.move_to(&resolver, Point::new(1, 1)), Err(Error::PlacerNotActive));
    }
}
