//! The dragger (spec §4.5's "Dragger" row): segment, corner and via dragging
//! with the same shove/walkaround/mark-obstacles fallback chain the line
//! placer uses for new traces.
//!
//! Ported in spirit from the original router's `DRAGGER`
//! (`pns_dragger.h`/`pns_multi_dragger.h`): a segment drag translates the
//! picked segment perpendicular to its own run and lets its two neighbors
//! stretch to follow (`dragSegment`/`optimizeAndUpdateDraggedLine`), a corner
//! drag moves a single chain vertex, and a via drag relocates the via and
//! carries every track endpoint that met it along (`propagateViaForces`).
//! Multi-item drags (`MULTI_DRAGGER`'s simultaneous via-fanout case) are not
//! implemented; this module drags exactly one segment, corner or via per
//! interaction, matching spec.md's single-target dragger contract.

use geometry::prelude::{LineChain, Point, Seg};
use geometry::span::LayerRange;

use crate::collision::{self, CollisionQueryOptions};
use crate::error::{Error, Result};
use crate::iface::RouterIface;
use crate::id::{LayerId, NetId};
use crate::item::{Item, ItemCommon, ItemKind, Line, Markers, Segment, Uid, Via};
use crate::node::{Node, NodeRef};
use crate::rule::RuleResolver;
use crate::shove::{self, ShoveOutcome};
use crate::sizes::SizesSettings;
use crate::walkaround::{self, Side};

/// How a drag resolves collisions between the moved geometry and the rest of
/// the world, mirroring [`crate::placer::RouteMode`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DragMode {
    /// Lay the dragged geometry through obstacles, flagging every collision.
    MarkObstacles,
    /// Route the dragged geometry around obstacles without moving them.
    Walkaround,
    /// Push lower-rank obstacles clear of the dragged geometry.
    Shove,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum DraggerState {
    Idle,
    Active,
}

/// What is being moved this interaction.
#[derive(Debug, Clone)]
enum DragTarget {
    /// A single chain vertex of the assembled line, identified by its index
    /// into `line.chain.points()`.
    Corner { line: Line, vertex_index: usize },
    /// One segment of the assembled line, identified by its index into
    /// `line.chain.segments()`.
    Segment { line: Line, seg_index: usize },
    /// A via, by its current position (used to compute the fanout
    /// translation once the new position is known).
    Via { uid: Uid, pos: Point },
}

/// The result of resolving one `Drag` call: either a reshaped line or a
/// relocated via.
#[derive(Debug, Clone)]
enum DragSolution {
    Line(Line),
    Via(Via),
}

fn solution_end_point(solution: &DragSolution) -> Point {
    match solution {
        DragSolution::Line(line) => *line.chain.points().last().unwrap_or(&Point::zero()),
        DragSolution::Via(via) => via.pos,
    }
}

/// Via, segment and corner dragging. `Start` picks the drag target from an
/// existing item UID; `Drag` re-resolves the candidate geometry against the
/// world on every cursor move; `FixRoute` commits the final shape into the
/// interaction's working node.
pub struct Dragger {
    state: DraggerState,
    world: NodeRef,
    drag_node: NodeRef,
    target: Option<DragTarget>,
    orig_items: Vec<Uid>,
    last_solution: Option<DragSolution>,
    mode: DragMode,
    free_angle: bool,
    sizes: SizesSettings,
    current_net: NetId,
    current_layer: LayerId,
}

impl Dragger {
    /// Creates an idle dragger anchored to `world`.
    pub fn new(world: &NodeRef) -> Self {
        Self {
            state: DraggerState::Idle,
            world: world.clone(),
            drag_node: Node::branch(world),
            target: None,
            orig_items: Vec::new(),
            last_solution: None,
            mode: DragMode::Shove,
            free_angle: false,
            sizes: SizesSettings::default(),
            current_net: NetId::NONE,
            current_layer: LayerId(0),
        }
    }

    /// Begins dragging the item at UID `item`, picked at cursor position
    /// `p` (used to decide corner-vs-segment for a track item; a via is
    /// always dragged as a whole). Fails with
    /// [`Error::DragTargetNotFound`] if `item` no longer resolves.
    pub fn start(&mut self, p: Point, item: Uid, sizes: SizesSettings) -> Result<()> {
        self.drag_node = Node::branch(&self.world);
        self.sizes = sizes;
        self.mode = DragMode::Shove;
        self.free_angle = false;
        self.last_solution = None;

        let picked = self.drag_node.borrow().get_item(item).ok_or(Error::DragTargetNotFound(item))?;

        self.target = Some(match picked {
            Item::Via(via) => {
                self.current_net = via.common.net;
                self.current_layer = LayerId(via.common.layers.start());
                DragTarget::Via { uid: via.common.uid, pos: via.pos }
            }
            _ => {
                let line = self
                    .drag_node
                    .borrow()
                    .assemble_line(item, true)
                    .ok_or(Error::DragTargetNotFound(item))?;
                self.current_net = line.net;
                self.current_layer = LayerId(line.layers.start());
                let seg_index = nearest_segment_index(&line.chain, p);
                if is_near_an_endpoint(&line.chain, seg_index, p, line.width) {
                    let vertex_index = nearest_vertex_index(&line.chain, p);
                    DragTarget::Corner { line, vertex_index }
                } else {
                    DragTarget::Segment { line, seg_index }
                }
            }
        });

        self.orig_items = match &self.target {
            Some(DragTarget::Via { uid, .. }) => vec![*uid],
            Some(DragTarget::Corner { line, .. }) | Some(DragTarget::Segment { line, .. }) => line.links.clone(),
            None => Vec::new(),
        };

        self.state = DraggerState::Active;
        Ok(())
    }

    /// Selects which collision-resolution mode subsequent `Drag`s use.
    pub fn set_mode(&mut self, mode: DragMode) {
        self.mode = mode;
    }

    /// Enables or disables free-angle dragging (segment drags translate
    /// straight toward the cursor rather than only perpendicular to the
    /// segment's own run).
    pub fn set_free_angle(&mut self, enabled: bool) {
        self.free_angle = enabled;
    }

    /// Re-resolves the dragged geometry against the world at cursor position
    /// `p`, returning the point the drag actually ended at.
    pub fn drag(&mut self, resolver: &dyn RuleResolver, p: Point) -> Result<Point> {
        if self.state != DraggerState::Active {
            return Err(Error::PlacerNotActive);
        }
        let Some(target) = self.target.clone() else {
            return Err(Error::PlacerNotActive);
        };

        let probe = Node::branch(&self.drag_node);
        for uid in &self.orig_items {
            probe.borrow_mut().remove(*uid);
        }

        let solution = match target {
            DragTarget::Via { uid, .. } => self.drag_via(&probe, resolver, uid, p)?,
            DragTarget::Corner { line, vertex_index } => self.drag_corner(&probe, resolver, &line, vertex_index, p)?,
            DragTarget::Segment { line, seg_index } => self.drag_segment(&probe, resolver, &line, seg_index, p)?,
        };

        let end = solution_end_point(&solution);
        self.last_solution = Some(solution);
        Ok(end)
    }

    fn drag_segment(&self, node: &NodeRef, resolver: &dyn RuleResolver, orig: &Line, seg_index: usize, p: Point) -> Result<DragSolution> {
        let seg = orig.chain.segment(seg_index);
        let translation = if self.free_angle {
            p - seg.a
        } else {
            perpendicular_translation(seg, p)
        };

        let mut points = orig.chain.points().to_vec();
        points[seg_index] = points[seg_index] + translation;
        points[seg_index + 1] = points[seg_index + 1] + translation;
        let mut chain = LineChain::from_points(points, false);
        chain.simplify();

        let mut candidate = orig.clone();
        candidate.chain = chain;
        candidate.links.clear();
        self.resolve_candidate(node, resolver, &mut candidate)?;
        Ok(DragSolution::Line(candidate))
    }

    fn drag_corner(&self, node: &NodeRef, resolver: &dyn RuleResolver, orig: &Line, vertex_index: usize, p: Point) -> Result<DragSolution> {
        let mut points = orig.chain.points().to_vec();
        if let Some(v) = points.get_mut(vertex_index) {
            *v = p;
        }
        let mut chain = LineChain::from_points(points, false);
        chain.simplify();

        let mut candidate = orig.clone();
        candidate.chain = chain;
        candidate.links.clear();
        self.resolve_candidate(node, resolver, &mut candidate)?;
        Ok(DragSolution::Line(candidate))
    }

    fn drag_via(&self, node: &NodeRef, resolver: &dyn RuleResolver, uid: Uid, p: Point) -> Result<DragSolution> {
        // `node` is the probe branch with `orig_items` (including this via's
        // own UID) already removed, so the original must come from
        // `drag_node`, the branch it was removed from.
        let Some(Item::Via(mut via)) = self.drag_node.borrow().get_item(uid) else {
            return Err(Error::DragTargetNotFound(uid));
        };
        let old_pos = via.pos;
        let new_uid = node.borrow().alloc_uid();

        let resolved_pos = match self.mode {
            DragMode::Walkaround => clamp_via_outside_obstacles(node, resolver, &via, p),
            _ => p,
        };
        via.pos = resolved_pos;
        via.common.uid = new_uid;
        node.borrow_mut().add(Item::Via(via.clone()), true);

        match self.mode {
            DragMode::MarkObstacles => mark_colliding(node, resolver, &Item::Via(via.clone())),
            DragMode::Shove => {
                shove::shove(node, resolver, new_uid)?;
            }
            DragMode::Walkaround => {}
        }

        propagate_via_move(node, old_pos, resolved_pos, via.common.net, via.common.layers);

        let placed = node.borrow().get_item(new_uid).unwrap_or(Item::Via(via));
        match placed {
            Item::Via(v) => Ok(DragSolution::Via(v)),
            _ => unreachable!("a via UID always resolves back to a via"),
        }
    }

    fn resolve_candidate(&self, node: &NodeRef, resolver: &dyn RuleResolver, candidate: &mut Line) -> Result<()> {
        let mut uids = Vec::new();
        for seg in candidate.chain.segments() {
            if seg.is_degenerate() {
                continue;
            }
            let uid = node.borrow().alloc_uid();
            let mut common = ItemCommon::new(uid, candidate.layers, candidate.net, i32::MAX);
            common.is_virtual = true;
            let item = Item::Segment(Segment { common, seg, width: candidate.width });
            node.borrow_mut().add(item, true);
            uids.push(uid);
        }

        match self.mode {
            DragMode::MarkObstacles => {
                for uid in &uids {
                    let Some(head) = node.borrow().get_item(*uid) else { continue };
                    mark_colliding(node, resolver, &head);
                }
            }
            DragMode::Walkaround => {
                candidate.chain = self.walk_around(node, resolver, &candidate.chain)?;
            }
            DragMode::Shove => {
                let mut stable = true;
                for uid in &uids {
                    match shove::shove(node, resolver, *uid)? {
                        ShoveOutcome::Stable => {}
                        ShoveOutcome::Fail | ShoveOutcome::IterLimit => stable = false,
                    }
                }
                if !stable {
                    candidate.chain = self.walk_around(node, resolver, &candidate.chain)?;
                }
            }
        }
        Ok(())
    }

    fn walk_around(&self, node: &NodeRef, resolver: &dyn RuleResolver, chain: &LineChain) -> Result<LineChain> {
        let mut chain = chain.clone();
        for _ in 0..8 {
            let Some((obstacle, probe)) = first_colliding_obstacle(node, resolver, &chain, self.current_layer, self.current_net, self.sizes.track_width) else {
                return Ok(chain);
            };
            let clearance = resolver.clearance(&probe, &obstacle, false);
            let hull = collision::item_hull(&obstacle, clearance, self.sizes.track_width);
            chain = walkaround::walkaround(&chain, &hull, Side::CounterClockwise)
                .or_else(|_| walkaround::walkaround(&chain, &hull, Side::Clockwise))?;
        }
        Ok(chain)
    }

    /// Re-resolves at `p`, then commits the result as real (non-virtual)
    /// items into the dragger's working node, replacing the original
    /// target. Returns whether the interaction finished.
    pub fn fix_route(&mut self, resolver: &dyn RuleResolver, p: Point, force_finish: bool) -> Result<bool> {
        if self.state != DraggerState::Active {
            return Err(Error::PlacerNotActive);
        }
        self.drag(resolver, p)?;
        let solution = self.last_solution.clone().ok_or(Error::PlacerNotActive)?;

        {
            let mut n = self.drag_node.borrow_mut();
            for uid in &self.orig_items {
                n.remove(*uid);
            }
        }

        match solution {
            DragSolution::Line(line) => {
                for seg in line.chain.segments() {
                    if seg.is_degenerate() {
                        continue;
                    }
                    let uid = self.drag_node.borrow().alloc_uid();
                    let item = Item::Segment(Segment {
                        common: ItemCommon::new(uid, line.layers, line.net, 0),
                        seg,
                        width: line.width,
                    });
                    self.drag_node.borrow_mut().add(item, false);
                }
            }
            DragSolution::Via(mut via) => {
                let uid = self.drag_node.borrow().alloc_uid();
                via.common.uid = uid;
                self.drag_node.borrow_mut().add(Item::Via(via), false);
            }
        }

        if force_finish {
            self.state = DraggerState::Idle;
        }
        Ok(force_finish)
    }

    /// Commits the working node into the world through `iface`.
    pub fn commit_placement(&mut self, iface: &mut dyn RouterIface) -> Result<()> {
        crate::node::commit(iface, &self.drag_node)?;
        self.state = DraggerState::Idle;
        Ok(())
    }

    /// Abandons the drag without committing anything.
    pub fn abort_placement(&mut self) {
        self.state = DraggerState::Idle;
        self.target = None;
        self.last_solution = None;
    }

    /// The net being dragged.
    pub fn current_net(&self) -> NetId {
        self.current_net
    }

    /// The layer being dragged on.
    pub fn current_layer(&self) -> LayerId {
        self.current_layer
    }
}

/// The translation of `seg`'s two endpoints that slides the whole segment
/// sideways so it passes through `p`, without changing its own direction.
fn perpendicular_translation(seg: Seg, p: Point) -> Point {
    let normal = seg.vector().perp_ccw();
    let len_sq = normal.dot(normal);
    if len_sq == 0 {
        return Point::zero();
    }
    let proj = (p - seg.a).dot(normal) as f64 / (len_sq as f64).sqrt();
    normal.resized(proj.round() as i64)
}

fn nearest_segment_index(chain: &LineChain, p: Point) -> usize {
    (0..chain.segment_count())
        .min_by_key(|&i| chain.segment(i).distance_squared_to_point(p))
        .unwrap_or(0)
}

fn nearest_vertex_index(chain: &LineChain, p: Point) -> usize {
    chain
        .points()
        .iter()
        .enumerate()
        .min_by_key(|(_, pt)| pt.distance_squared(p))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn is_near_an_endpoint(chain: &LineChain, seg_index: usize, p: Point, width: i64) -> bool {
    let tolerance_sq = (width.max(1) as i128).pow(2);
    let seg = chain.segment(seg_index);
    p.distance_squared(seg.a).min(p.distance_squared(seg.b)) <= tolerance_sq
}

fn mark_colliding(node: &NodeRef, resolver: &dyn RuleResolver, item: &Item) {
    let colliding = node.borrow().query_colliding(item, resolver, &CollisionQueryOptions::default());
    for obstacle in colliding {
        let mut marked = obstacle.clone();
        marked.common_mut().markers.insert(Markers::VIOLATION);
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

/// Relocates every segment/arc endpoint coincident with `old_pos` on `net`
/// over a layer overlapping `layers` to `new_pos`, so tracks follow a
/// dragged via the way they would a shoved one (spec's
/// `propagateViaForces`, applied directly rather than iteratively since the
/// translation is already fully determined by the caller).
///
/// Arc endpoints are left untouched: rebuilding a true arc's curved geometry
/// after an endpoint move needs a center/radius solve this module does not
/// perform, so an arc incident on a dragged via keeps its old endpoint and
/// is reported disconnected rather than silently misdrawn.
fn propagate_via_move(node: &NodeRef, old_pos: Point, new_pos: Point, net: NetId, layers: LayerRange) {
    if old_pos == new_pos {
        return;
    }
    let affected: Vec<Item> = node
        .borrow()
        .all_items()
        .into_iter()
        .filter(|i| {
            i.kind() == ItemKind::Segment
                && i.net() == net
                && i.common().layers.overlaps(&layers)
                && i.anchor_points().contains(&old_pos)
        })
        .collect();

    for item in affected {
        let Item::Segment(mut s) = item.clone() else { continue };
        if s.seg.a == old_pos {
            s.seg.a = new_pos;
        }
        if s.seg.b == old_pos {
            s.seg.b = new_pos;
        }
        let uid = node.borrow().alloc_uid();
        s.common.uid = uid;
        let mut n = node.borrow_mut();
        n.remove(item.uid());
        n.add(Item::Segment(s), true);
    }
}

/// Pushes a dragged via's candidate position directly away from whatever it
/// first collides with until clear, bounded to a handful of iterations — a
/// via has no "side" to detour around the way a track walkaround does.
fn clamp_via_outside_obstacles(node: &NodeRef, resolver: &dyn RuleResolver, via: &Via, p: Point) -> Point {
    let mut candidate = p;
    for _ in 0..8 {
        let probe = Item::Via(Via { pos: candidate, ..via.clone() });
        let options = CollisionQueryOptions { limit_count: Some(1), ..Default::default() };
        let Some(obstacle) = node.borrow().query_colliding(&probe, resolver, &options).into_iter().next() else {
            return candidate;
        };
        let clearance = resolver.clearance(&probe, &obstacle, false);
        let required = collision::required_separation(clearance, &probe, &obstacle);
        let gap = probe.shape().min_distance(&obstacle.shape());
        if gap >= required {
            return candidate;
        }
        let away = candidate - obstacle.shape().bbox().center();
        if away == Point::zero() {
            return candidate;
        }
        candidate = candidate + away.resized(required - gap + 1);
    }
    candidate
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

    fn seg_item(uid: u64, a: Point, b: Point, width: i64, net: u32) -> Item {
        Item::Segment(Segment {
            common: ItemCommon::new(Uid(uid), LayerRange::single(0), NetId(net), 0),
            seg: Seg::new(a, b),
            width,
        })
    }

    #[test]
    fn dragging_a_segment_translates_it_sideways_and_stretches_neighbors() {
        let world = Node::new_root();
        {
            let mut n = world.borrow_mut();
            n.add(seg_item(1, Point::new(0, 0), Point::new(1_000_000, 0), 200_000, 1), false);
            n.add(seg_item(2, Point::new(1_000_000, 0), Point::new(2_000_000, 0), 200_000, 1), false);
        }
        let resolver = FixedResolver(50_000);
        let mut dragger = Dragger::new(&world);
        dragger.start(Point::new(500_000, 0), Uid(1), SizesSettings::default()).unwrap();
        let end = dragger.drag(&resolver, Point::new(500_000, 300_000)).unwrap();
        assert_eq!(end.y, 300_000);
    }

    #[test]
    fn dragging_a_corner_moves_only_that_vertex() {
        let world = Node::new_root();
        {
            let mut n = world.borrow_mut();
            n.add(seg_item(1, Point::new(0, 0), Point::new(1_000_000, 0), 200_000, 1), false);
            n.add(seg_item(2, Point::new(1_000_000, 0), Point::new(2_000_000, 0), 200_000, 1), false);
        }
        let resolver = FixedResolver(50_000);
        let mut dragger = Dragger::new(&world);
        dragger.start(Point::new(1_000_000, 0), Uid(1), SizesSettings::default()).unwrap();
        let end = dragger.drag(&resolver, Point::new(1_000_000, 400_000)).unwrap();
        assert_eq!(end, Point::new(1_000_000, 400_000));
    }

    #[test]
    fn dragging_a_via_carries_its_incident_track_endpoint() {
        let world = Node::new_root();
        {
            let mut n = world.borrow_mut();
            let via = Via {
                common: ItemCommon::new(Uid(1), LayerRange::new(0, 1), NetId(1), 0),
                pos: Point::new(0, 0),
                diameter: crate::item::ViaDiameter::Uniform(600_000),
                drill: 250_000,
                via_type: crate::sizes::ViaType::Through,
                hole: crate::item::Hole {
                    common: ItemCommon::new(Uid(1), LayerRange::new(0, 1), NetId(1), 0),
                    shape: geometry::prelude::Shape::Circle { center: Point::new(0, 0), radius: 125_000 },
                },
                unconnected_layer_removal: crate::sizes::UnconnectedLayerRemoval::Never,
            };
            n.add(Item::Via(via), false);
            n.add(seg_item(2, Point::new(0, 0), Point::new(1_000_000, 0), 200_000, 1), false);
        }
        let resolver = FixedResolver(50_000);
        let mut dragger = Dragger::new(&world);
        dragger.start(Point::new(0, 0), Uid(1), SizesSettings::default()).unwrap();
        dragger.set_mode(DragMode::MarkObstacles);
        let end = dragger.drag(&resolver, Point::new(300_000, 0)).unwrap();
        assert_eq!(end, Point::new(300_000, 0));

        let n = dragger.drag_node.borrow();
        let moved_track = n
            .all_items()
            .into_iter()
            .find(|i| matches!(i, Item::Segment(_)) && i.net() == NetId(1))
            .expect("incident segment should still be present");
        if let Item::Segment(s) = moved_track {
            assert!(s.seg.a == Point::new(300_000, 0) || s.seg.b == Point::new(300_000, 0));
        }
    }

    #[test]
    fn drag_before_start_is_rejected() {
        let world = Node::new_root();
        let resolver = FixedResolver(50_000);
        let mut dragger = Dragger::new(&world);
        assert_eq!(dragger.drag(&resolver, Point::new(1, 1)), Err(Error::PlacerNotActive));
    }

    #[test]
    fn fix_route_replaces_the_original_segment() {
        let world = Node::new_root();
        world.borrow_mut().add(seg_item(1, Point::new(0, 0), Point::new(1_000_000, 0), 200_000, 1), false);
        let resolver = FixedResolver(50_000);
        let mut dragger = Dragger::new(&world);
        dragger.start(Point::new(500_000, 0), Uid(1), SizesSettings::default()).unwrap();
        let finished = dragger.fix_route(&resolver, Point::new(500_000, 300_000), true).unwrap();
        assert!(finished);

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
        dragger.commit_placement(&mut iface).unwrap();
        let moved = world
            .borrow()
            .all_items()
            .into_iter()
            .find(|i| i.net() == NetId(1))
            .expect("dragged segment committed");
        if let Item::Segment(s) = moved {
            assert!(s.seg.a.y == 300_000 || s.seg.b.y == 300_000);
        }
    }
}
