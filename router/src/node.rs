//! The world model: a spatially-queried, branchable snapshot of every
//! routable item (spec §4.1).
//!
//! Items are addressed by generational [`crate::id::ItemId`] handles local
//! to the node that stores them (the "arena + typed indices" redesign of
//! spec §9, replacing the original's owner-pointer scheme). A branch only
//! stores what it adds, removes or overrides relative to its parent — the
//! parent is kept alive by an `Rc` so the "parent must outlive child"
//! invariant is enforced by the type system rather than documented as a
//! caller obligation. The joint table, by contrast, is cheap to clone (spec
//! calls `NODE` itself "a persistent, lightweight-cloneable container") and
//! so each node carries a complete, self-consistent copy rather than an
//! overlay — see [`crate::joint`]'s module docs for why an exact-range
//! overlay can't express via-to-track connectivity anyway.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::{Rc, Weak};

use geometry::prelude::{Point, Shape};
use slotmap::SlotMap;

use crate::collision::{self, CollisionQueryOptions};
use crate::error::{Error, Result};
use crate::iface::RouterIface;
use crate::id::{HostRef, ItemId, LayerId, NetId};
use crate::item::{Item, ItemKind, Line, Uid};
use crate::joint::JointTable;
use crate::rule::RuleResolver;

/// A reference-counted handle to a [`Node`]. Every node in the branch tree
/// (root and children alike) is addressed this way so a child can hold a
/// strong reference keeping its parent alive.
pub type NodeRef = Rc<RefCell<Node>>;

/// A snapshot of the routable world (spec §3's `NODE`).
pub struct Node {
    local_items: SlotMap<ItemId, Item>,
    by_uid: HashMap<Uid, ItemId>,
    /// UIDs this branch has replaced or removed relative to its parent;
    /// masks them out of read-through queries even though the parent still
    /// physically holds them.
    overrides: HashSet<Uid>,
    /// Items removed in this branch, kept alive so an outstanding [`Line`]
    /// assembled before the removal can still dereference its links.
    garbage: Vec<Item>,
    joints: JointTable,
    /// Inflated keepout shapes for board-outline/edge exclusions, consulted
    /// by the line placer's start-point validation.
    edge_exclusions: Vec<Shape>,
    parent: Option<NodeRef>,
    children: RefCell<Vec<Weak<RefCell<Node>>>>,
    depth: u32,
    uid_gen: Rc<Cell<u64>>,
}

impl Node {
    /// Creates a new root node with no parent.
    pub fn new_root() -> NodeRef {
        Rc::new(RefCell::new(Node {
            local_items: SlotMap::with_key(),
            by_uid: HashMap::new(),
            overrides: HashSet::new(),
            garbage: Vec::new(),
            joints: JointTable::new(),
            edge_exclusions: Vec::new(),
            parent: None,
            children: RefCell::new(Vec::new()),
            depth: 0,
            uid_gen: Rc::new(Cell::new(1)),
        }))
    }

    /// Allocates a child node overlaying `parent`. The child's joint table
    /// starts as a full clone of the parent's (see module docs); its item
    /// set starts empty and is populated only by subsequent `add`/`remove`
    /// calls on the child.
    pub fn branch(parent: &NodeRef) -> NodeRef {
        let (depth, uid_gen, joints, edge_exclusions) = {
            let p = parent.borrow();
            (p.depth + 1, p.uid_gen.clone(), p.joints.clone(), p.edge_exclusions.clone())
        };
        let child = Rc::new(RefCell::new(Node {
            local_items: SlotMap::with_key(),
            by_uid: HashMap::new(),
            overrides: HashSet::new(),
            garbage: Vec::new(),
            joints,
            edge_exclusions,
            parent: Some(parent.clone()),
            children: RefCell::new(Vec::new()),
            depth,
            uid_gen,
        }));
        parent.borrow().children.borrow_mut().push(Rc::downgrade(&child));
        tracing::debug!(depth, "branched node");
        child
    }

    /// Whether this node is the root of its branch tree.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// This node's branch depth; the root is depth 0.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Allocates a fresh, globally-unique item UID.
    pub fn alloc_uid(&self) -> Uid {
        let v = self.uid_gen.get();
        self.uid_gen.set(v + 1);
        Uid(v)
    }

    /// Adds an edge-exclusion keepout shape (board outline, slot, etc.).
    pub fn add_edge_exclusion(&mut self, shape: Shape) {
        self.edge_exclusions.push(shape);
    }

    /// The edge exclusions in effect for this node.
    pub fn edge_exclusions(&self) -> &[Shape] {
        &self.edge_exclusions
    }

    /// Inserts `item`, rebuilding the joints at its anchor points.
    ///
    /// Returns `false` without inserting if a geometrically identical
    /// segment/arc already exists on the same net and layers and
    /// `allow_redundant` is `false`.
    pub fn add(&mut self, item: Item, allow_redundant: bool) -> bool {
        if !allow_redundant && matches!(item.kind(), ItemKind::Segment | ItemKind::Arc) && self.has_redundant(&item)
        {
            tracing::trace!(uid = item.uid().0, "rejected redundant add");
            return false;
        }
        tracing::trace!(uid = item.uid().0, kind = ?item.kind(), "add item");
        self.insert_and_link(item);
        true
    }

    fn has_redundant(&self, item: &Item) -> bool {
        self.all_items()
            .iter()
            .any(|other| other.uid() != item.uid() && geometrically_identical(other, item))
    }

    fn insert_and_link(&mut self, item: Item) {
        let uid = item.uid();
        let net = item.net();
        let layers = item.common().layers;
        let anchors = item.anchor_points();
        // Keep alloc_uid() from ever reissuing a UID a caller assigned by
        // hand (test fixtures, deserialized items): the generator must
        // stay ahead of every UID that has ever been inserted.
        if self.uid_gen.get() <= uid.0 {
            self.uid_gen.set(uid.0 + 1);
        }
        self.overrides.remove(&uid);
        let id = self.local_items.insert(item);
        self.by_uid.insert(uid, id);
        if !net.is_none() {
            for p in anchors {
                self.joints.link(p, net, layers, uid);
            }
        }
    }

    /// Removes the item with `uid`. On the root this frees it immediately;
    /// on a branch it is masked via the override set and kept in the
    /// garbage bin so outstanding line assemblies stay valid. Returns
    /// `false` if no such item is visible from this node.
    pub fn remove(&mut self, uid: Uid) -> bool {
        let Some(item) = self.get_item(uid) else { return false };
        tracing::trace!(uid = uid.0, root = self.is_root(), "remove item");
        let net = item.net();
        let layers = item.common().layers;
        for p in item.anchor_points() {
            self.joints.unlink(p, net, layers, uid);
        }
        if let Some(id) = self.by_uid.remove(&uid) {
            self.local_items.remove(id);
        }
        if self.is_root() {
            // Nothing further to do: the root has no ancestor to mask and
            // no outstanding branch needs the freed item kept alive.
        } else {
            // Only mask and garbage-bin the item if some ancestor still has
            // a version of it visible: an item added and removed within the
            // same branch never reached the host, so `commit` must not be
            // told to remove it (it has no `host_ref` to match against, and
            // would otherwise trigger a spurious `iface.remove_item` for an
            // item the host never received via `add_item`).
            let visible_in_ancestor =
                self.parent.as_ref().is_some_and(|p| p.borrow().get_item(uid).is_some());
            if visible_in_ancestor {
                self.overrides.insert(uid);
                self.garbage.push(item);
            }
        }
        true
    }

    /// Looks up an item by UID, following the override chain up through
    /// ancestors.
    pub fn get_item(&self, uid: Uid) -> Option<Item> {
        if let Some(&id) = self.by_uid.get(&uid) {
            return Some(self.local_items[id].clone());
        }
        if self.overrides.contains(&uid) {
            return None;
        }
        self.parent.as_ref().and_then(|p| p.borrow().get_item(uid))
    }

    /// The full logical item set visible from this node: its own additions
    /// plus every ancestor's items not locally overridden.
    pub fn all_items(&self) -> Vec<Item> {
        let mut seen = HashSet::new();
        let mut masked = HashSet::new();
        let mut out = Vec::new();
        for item in self.local_items.values() {
            out.push(item.clone());
            seen.insert(item.uid());
        }
        masked.extend(self.overrides.iter().copied());
        let mut parent = self.parent.clone();
        while let Some(p) = parent {
            let pb = p.borrow();
            for item in pb.local_items.values() {
                let uid = item.uid();
                if !seen.contains(&uid) && !masked.contains(&uid) {
                    out.push(item.clone());
                    seen.insert(uid);
                }
            }
            masked.extend(pb.overrides.iter().copied());
            parent = pb.parent.clone();
        }
        out
    }

    /// All items belonging to `net`.
    pub fn items_in_net(&self, net: NetId) -> Vec<Item> {
        self.all_items().into_iter().filter(|i| i.net() == net).collect()
    }

    /// Resets the shove rank of every item to `rank` (used by the dragger
    /// between drag operations and by test setup).
    pub fn clear_ranks(&mut self, rank: i32) {
        for item in self.local_items.values_mut() {
            item.common_mut().rank = rank;
        }
        if let Some(p) = self.parent.clone() {
            p.borrow_mut().clear_ranks(rank);
        }
    }

    /// Removes every item whose markers contain `marker` (used to clear
    /// stale violation flags between interactions).
    pub fn remove_by_marker(&mut self, marker: crate::item::Markers) -> Vec<Uid> {
        let victims: Vec<Uid> = self
            .all_items()
            .into_iter()
            .filter(|i| i.common().markers.contains(marker))
            .map(|i| i.uid())
            .collect();
        for uid in &victims {
            self.remove(*uid);
        }
        victims
    }

    /// Finds the currently-visible item carrying `host_ref`, if any.
    pub fn find_item_by_host_ref(&self, host_ref: HostRef) -> Option<Item> {
        self.all_items().into_iter().find(|i| i.common().host_ref == Some(host_ref))
    }

    /// Locks the joint at `pos` on `net` overlapping `layers` against
    /// shove/walkaround relocation.
    pub fn lock_joint(&mut self, pos: Point, net: NetId, layers: geometry::span::LayerRange) {
        self.joints.lock(pos, net, layers);
    }

    /// Read-only access to this node's joint table (a full, self-consistent
    /// snapshot, not an overlay).
    pub fn joints(&self) -> &JointTable {
        &self.joints
    }

    /// Items whose shape contains `point`.
    pub fn hit_test(&self, point: Point) -> Vec<Item> {
        let probe = Shape::Circle { center: point, radius: 0 };
        self.all_items().into_iter().filter(|i| i.shape().collides(&probe, 1)).collect()
    }

    /// Items colliding with `item` on overlapping layers, per spec §4.1's
    /// collision search.
    pub fn query_colliding(
        &self,
        item: &Item,
        resolver: &dyn RuleResolver,
        options: &CollisionQueryOptions,
    ) -> Vec<Item> {
        let mut out = Vec::new();
        for candidate in self.all_items() {
            if !options.admits(item, &candidate) {
                continue;
            }
            let hit = if let Some(c) = options.override_clearance {
                collision::collide_with_clearance(item, &candidate, c)
            } else {
                collision::collide(resolver, item, &candidate, options.use_clearance_epsilon)
            };
            if hit {
                out.push(candidate);
                if let Some(limit) = options.limit_count {
                    if out.len() >= limit {
                        break;
                    }
                }
            }
        }
        out
    }

    /// The obstacle whose first contact point is closest to `line`'s first
    /// vertex, walking the chain in order.
    pub fn nearest_obstacle(
        &self,
        line: &Line,
        resolver: &dyn RuleResolver,
        options: &CollisionQueryOptions,
    ) -> Option<(Item, Point)> {
        let first = *line.chain.points().first()?;
        let mut best: Option<(Item, Point, i128)> = None;
        for seg in line.chain.segments() {
            let probe = Item::Segment(crate::item::Segment {
                common: crate::item::ItemCommon::new(Uid(0), line.layers, line.net, i32::MIN),
                seg,
                width: line.width,
            });
            for obstacle in self.query_colliding(&probe, resolver, options) {
                let contact = collision::contact_point(&obstacle, seg);
                let d = first.distance_squared(contact);
                if best.as_ref().map_or(true, |(_, _, bd)| d < *bd) {
                    best = Some((obstacle, contact, d));
                }
            }
        }
        best.map(|(o, c, _)| (o, c))
    }

    /// Walks the joint graph bidirectionally from `seed` until it hits a
    /// non-trivial joint (more than 2 incident links, a locked joint, or a
    /// width/layer change when not allowed), assembling a [`Line`].
    ///
    /// A loop in the joint graph (a previously-visited link seen again)
    /// terminates the walk with whatever was accumulated so far, per spec
    /// §4.1's failure semantics.
    pub fn assemble_line(&self, seed: Uid, allow_width_mismatch: bool) -> Option<Line> {
        let seed_item = self.get_item(seed)?;
        let (seed_seg, width, layers, net) = linked_geometry(&seed_item)?;

        let mut forward = vec![seed_seg.b];
        let mut forward_links = vec![seed];
        let mut visited: HashSet<Uid> = HashSet::from([seed]);
        self.walk_direction(seed_seg.b, width, layers, net, allow_width_mismatch, &mut visited, &mut forward, &mut forward_links);

        let mut backward = vec![seed_seg.a];
        let mut backward_links = vec![seed];
        let mut visited_back: HashSet<Uid> = HashSet::from([seed]);
        self.walk_direction(seed_seg.a, width, layers, net, allow_width_mismatch, &mut visited_back, &mut backward, &mut backward_links);

        backward.reverse();
        backward_links.reverse();
        backward_links.pop(); // drop the duplicated seed
        let mut points = backward;
        points.extend(forward);
        let mut links = backward_links;
        links.extend(forward_links);

        let mut line = Line::new(net, width, layers);
        line.chain = geometry::line_chain::LineChain::from_points(points, false);
        line.links = links;
        Some(line)
    }

    #[allow(clippy::too_many_arguments)]
    fn walk_direction(
        &self,
        mut from: Point,
        width: i64,
        layers: geometry::span::LayerRange,
        net: NetId,
        allow_width_mismatch: bool,
        visited: &mut HashSet<Uid>,
        points: &mut Vec<Point>,
        links: &mut Vec<Uid>,
    ) {
        loop {
            let Some(joint) = self.joints.find(from, net, layers) else { break };
            if !joint.is_trivial() {
                break;
            }
            let next_uid = joint.links.iter().copied().find(|u| !visited.contains(u));
            let Some(next_uid) = next_uid else { break };
            let Some(next_item) = self.get_item(next_uid) else { break };
            let Some((seg, next_width, next_layers, next_net)) = linked_geometry(&next_item) else { break };
            if next_net != net {
                break;
            }
            if !allow_width_mismatch && (next_width != width || next_layers != layers) {
                break;
            }
            let next_point = if seg.a == from { seg.b } else if seg.b == from { seg.a } else { break };
            visited.insert(next_uid);
            links.push(next_uid);
            points.push(next_point);
            from = next_point;
        }
    }
}

/// Extracts `(chord_segment, width, layers, net)` for a segment or arc item
/// (arcs are represented by their start/end chord for joint-walk purposes;
/// the true curved geometry stays in the item itself and is recovered by
/// callers that need it via [`Item::shape`]).
fn linked_geometry(item: &Item) -> Option<(geometry::prelude::Seg, i64, geometry::span::LayerRange, NetId)> {
    match item {
        Item::Segment(s) => Some((s.seg, s.width, s.common.layers, s.common.net)),
        Item::Arc(a) => Some((
            geometry::prelude::Seg::new(a.arc.start(), a.arc.end()),
            a.arc.width(),
            a.common.layers,
            a.common.net,
        )),
        _ => None,
    }
}

fn geometrically_identical(a: &Item, b: &Item) -> bool {
    if a.kind() != b.kind() || a.net() != b.net() || a.common().layers != b.common().layers {
        return false;
    }
    match (a, b) {
        (Item::Segment(s1), Item::Segment(s2)) => {
            (s1.seg == s2.seg || s1.seg == s2.seg.reversed()) && s1.width == s2.width
        }
        (Item::Arc(a1), Item::Arc(a2)) => {
            a1.arc.start() == a2.arc.start() && a1.arc.end() == a2.arc.end() && a1.arc.center() == a2.arc.center()
        }
        _ => false,
    }
}

/// Commits `child`'s adds/removes/overrides back into its parent through
/// `iface`, then collapses the child into the parent and kills every other
/// child of the parent. Legal only when `child`'s parent is the root (spec
/// §4.1's commit contract).
pub fn commit(iface: &mut dyn RouterIface, child: &NodeRef) -> Result<()> {
    let _span = tracing::debug_span!("commit").entered();
    let parent = {
        let c = child.borrow();
        match &c.parent {
            Some(p) if p.borrow().is_root() => p.clone(),
            _ => return Err(Error::CommitDeniedNotRoot),
        }
    };

    let (removed, added, joints) = {
        let c = child.borrow();
        (c.garbage.clone(), c.local_items.values().cloned().collect::<Vec<_>>(), c.joints.clone())
    };

    let mut removed_by_host: HashMap<HostRef, usize> = HashMap::new();
    for (i, r) in removed.iter().enumerate() {
        if let Some(h) = r.common().host_ref {
            removed_by_host.insert(h, i);
        }
    }

    let mut consumed = HashSet::new();
    for a in &added {
        if let Some(h) = a.common().host_ref {
            if let Some(&i) = removed_by_host.get(&h) {
                iface.update_item(a);
                consumed.insert(i);
                continue;
            }
        }
        iface.add_item(a);
    }
    for (i, r) in removed.iter().enumerate() {
        if !consumed.contains(&i) {
            iface.remove_item(r);
        }
    }
    iface.commit();
    tracing::debug!(added = added.len(), removed = removed.len(), "committed node delta");

    {
        let c = child.borrow();
        let mut p = parent.borrow_mut();
        for uid in &c.overrides {
            if let Some(id) = p.by_uid.remove(uid) {
                p.local_items.remove(id);
            }
        }
        for item in c.local_items.values() {
            let uid = item.uid();
            let id = p.local_items.insert(item.clone());
            p.by_uid.insert(uid, id);
        }
        p.joints = joints;
    }

    parent.borrow().children.borrow_mut().clear();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::NetId;
    use crate::item::{ItemCommon, Segment};
    use geometry::prelude::Seg;
    use geometry::span::LayerRange;

    struct NoopIface {
        added: Vec<Item>,
        removed: Vec<Item>,
        updated: Vec<Item>,
        committed: u32,
    }

    impl NoopIface {
        fn new() -> Self {
            Self { added: vec![], removed: vec![], updated: vec![], committed: 0 }
        }
    }

    impl RouterIface for NoopIface {
        fn sync_world(&self, _node: &mut Node) {}
        fn add_item(&mut self, item: &Item) {
            self.added.push(item.clone());
        }
        fn remove_item(&mut self, item: &Item) {
            self.removed.push(item.clone());
        }
        fn update_item(&mut self, item: &Item) {
            self.updated.push(item.clone());
        }
        fn commit(&mut self) {
            self.committed += 1;
        }
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

    fn seg(uid: u64, a: Point, b: Point, net: u32) -> Item {
        Item::Segment(Segment {
            common: ItemCommon::new(Uid(uid), LayerRange::single(0), NetId(net), 0),
            seg: Seg::new(a, b),
            width: 200_000,
        })
    }

    #[test]
    fn adding_redundant_segment_is_rejected_without_allow_flag() {
        let root = Node::new_root();
        let mut n = root.borrow_mut();
        assert!(n.add(seg(1, Point::new(0, 0), Point::new(1000, 0), 1), false));
        assert!(!n.add(seg(2, Point::new(0, 0), Point::new(1000, 0), 1), false));
        assert!(n.add(seg(2, Point::new(0, 0), Point::new(1000, 0), 1), true));
    }

    #[test]
    fn remove_then_readd_on_root_restores_joint_state() {
        let root = Node::new_root();
        let item = seg(1, Point::new(0, 0), Point::new(1000, 0), 1);
        {
            let mut n = root.borrow_mut();
            n.add(item.clone(), false);
        }
        let joints_before = root.borrow().joints().iter().count();
        {
            let mut n = root.borrow_mut();
            assert!(n.remove(Uid(1)));
            assert!(n.joints().is_empty());
            n.add(item, false);
        }
        let joints_after = root.borrow().joints().iter().count();
        assert_eq!(joints_before, joints_after);
    }

    #[test]
    fn commit_does_not_remove_an_item_added_and_removed_within_the_same_branch() {
        let root = Node::new_root();
        let child = Node::branch(&root);
        {
            let mut c = child.borrow_mut();
            c.add(seg(1, Point::new(0, 0), Point::new(1000, 0), 1), false);
            assert!(c.remove(Uid(1)));
        }
        let mut iface = NoopIface::new();
        commit(&mut iface, &child).unwrap();
        assert!(iface.added.is_empty());
        assert!(iface.removed.is_empty());
        assert!(root.borrow().get_item(Uid(1)).is_none());
    }

    #[test]
    fn branch_then_commit_with_no_edits_is_observable_no_op() {
        let root = Node::new_root();
        root.borrow_mut().add(seg(1, Point::new(0, 0), Point::new(1000, 0), 1), false);
        let child = Node::branch(&root);
        let mut iface = NoopIface::new();
        commit(&mut iface, &child).unwrap();
        assert!(iface.added.is_empty());
        assert!(iface.removed.is_empty());
        assert_eq!(iface.committed, 1);
        assert!(root.borrow().get_item(Uid(1)).is_some());
    }

    #[test_log::test]
    fn scenario_6_branch_remove_add_commit() {
        let root = Node::new_root();
        let s1 = seg(1, Point::new(0, 0), Point::new(1000, 0), 1);
        root.borrow_mut().add(s1.clone(), false);

        let child = Node::branch(&root);
        {
            let mut c = child.borrow_mut();
            assert!(c.remove(Uid(1)));
            c.add(seg(2, Point::new(0, 0), Point::new(2000, 0), 1), false);
        }

        let mut iface = NoopIface::new();
        commit(&mut iface, &child).unwrap();

        assert_eq!(iface.removed.len(), 1);
        assert_eq!(iface.added.len(), 1);
        assert_eq!(iface.committed, 1);

        let r = root.borrow();
        assert!(r.get_item(Uid(1)).is_none());
        assert!(r.get_item(Uid(2)).is_some());
        assert!(r.children.borrow().is_empty());
        for (_, joint) in r.joints().iter() {
            assert!(joint.links.iter().all(|u| *u == Uid(2)));
        }
    }

    #[test]
    fn commit_on_non_child_of_root_is_denied() {
        let root = Node::new_root();
        let child = Node::branch(&root);
        let grandchild = Node::branch(&child);
        let mut iface = NoopIface::new();
        assert_eq!(commit(&mut iface, &grandchild), Err(Error::CommitDeniedNotRoot));
    }

    #[test]
    fn assemble_line_walks_through_trivial_joints() {
        let root = Node::new_root();
        {
            let mut n = root.borrow_mut();
            n.add(seg(1, Point::new(0, 0), Point::new(1000, 0), 1), false);
            n.add(seg(2, Point::new(1000, 0), Point::new(2000, 0), 1), false);
        }
        let n = root.borrow();
        let line = n.assemble_line(Uid(1), false).unwrap();
        assert_eq!(line.chain.points(), &[Point::new(0, 0), Point::new(1000, 0), Point::new(2000, 0)]);
        assert_eq!(line.links.len(), 2);
    }

    #[test]
    fn assemble_line_stops_at_branching_joint() {
        let root = Node::new_root();
        {
            let mut n = root.borrow_mut();
            n.add(seg(1, Point::new(0, 0), Point::new(1000, 0), 1), false);
            n.add(seg(2, Point::new(1000, 0), Point::new(2000, 0), 1), false);
            n.add(seg(3, Point::new(1000, 0), Point::new(1000, 1000), 1), false);
        }
        let n = root.borrow();
        let line = n.assemble_line(Uid(1), false).unwrap();
        // joint at (1000,0) now has 3 incident links -> non-trivial -> stop.
        assert_eq!(line.links, vec![Uid(1)]);
    }
}
