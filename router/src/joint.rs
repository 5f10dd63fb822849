//! The joint graph: for every point where one or more linked items meet on
//! a given net, a [`Joint`] record links them together so that
//! [`crate::node::Node::assemble_line`] can reconstruct logical lines.
//!
//! Design note (judgment call, not guessed): spec.md keys a joint by
//! `(position, layer range, net)` and separately requires that
//! [`crate::node::Node::assemble_line`] can walk from a single-layer segment
//! straight through a multi-layer via onto a segment on another layer. An
//! *exact* layer-range key cannot satisfy both: a via spanning layers 0..3
//! and a segment on layer 0 would never share a key. This implementation
//! instead buckets joints by `(position, net)` and, within a bucket, merges
//! any item whose layer range *overlaps* an existing joint's range into that
//! joint (extending its range to the union) rather than creating a second
//! one — which is exactly the "at most one joint per layer x net x point"
//! invariant read as "no two joints in the same bucket may claim the same
//! physical layer".
use geometry::prelude::Point;
use geometry::span::LayerRange;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::id::NetId;
use crate::item::Uid;

/// The bucket key identifying candidate joints at a point on a net.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JointKey {
    /// The shared anchor point.
    pub pos: Point,
    /// The net the joint applies to.
    pub net: NetId,
}

/// A topological meeting point of linked items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Joint {
    /// The union of the layer ranges of every linked item incident here.
    pub layers: LayerRange,
    /// The UIDs of items incident at this joint.
    pub links: Vec<Uid>,
    /// Whether this joint is locked against shove/walkaround relocation.
    pub locked: bool,
}

impl Joint {
    fn new(layers: LayerRange) -> Self {
        Self { layers, links: Vec::new(), locked: false }
    }

    /// Whether this joint is "trivial": exactly two incident items and
    /// unlocked, meaning a line assembly walk should pass straight through
    /// it rather than stopping.
    pub fn is_trivial(&self) -> bool {
        self.links.len() == 2 && !self.locked
    }

    /// Adds `uid` to this joint's incident set if not already present.
    pub fn link(&mut self, uid: Uid) {
        if !self.links.contains(&uid) {
            self.links.push(uid);
        }
    }

    /// Removes `uid` from this joint's incident set.
    pub fn unlink(&mut self, uid: Uid) {
        self.links.retain(|&u| u != uid);
    }
}

/// A bucketed joint table: `(position, net) -> joints at that point`,
/// merged by layer-range overlap. `IndexMap` gives deterministic-within-a-
/// run iteration order for reproducible logs without making that order part
/// of the contract (callers must not depend on it, per the crate's
/// concurrency notes).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JointTable {
    buckets: IndexMap<JointKey, Vec<Joint>>,
}

impl JointTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Links `uid` into the joint at `pos`/`net` whose layer range overlaps
    /// `layers`, creating one if none overlaps, and returns a reference to
    /// it.
    pub fn link(&mut self, pos: Point, net: NetId, layers: LayerRange, uid: Uid) -> &mut Joint {
        let bucket = self.buckets.entry(JointKey { pos, net }).or_default();
        let idx = bucket.iter().position(|j| j.layers.overlaps(&layers));
        let idx = match idx {
            Some(i) => {
                bucket[i].layers = bucket[i].layers.union(layers);
                i
            }
            None => {
                bucket.push(Joint::new(layers));
                bucket.len() - 1
            }
        };
        let joint = &mut bucket[idx];
        joint.link(uid);
        joint
    }

    /// Removes `uid` from every joint at `pos`/`net` overlapping `layers`,
    /// pruning any joint left with no links.
    pub fn unlink(&mut self, pos: Point, net: NetId, layers: LayerRange, uid: Uid) {
        let key = JointKey { pos, net };
        if let Some(bucket) = self.buckets.get_mut(&key) {
            for j in bucket.iter_mut() {
                if j.layers.overlaps(&layers) {
                    j.unlink(uid);
                }
            }
            bucket.retain(|j| !j.links.is_empty());
            if bucket.is_empty() {
                self.buckets.shift_remove(&key);
            }
        }
    }

    /// Finds the joint at `pos`/`net` whose layer range overlaps `layers`.
    pub fn find(&self, pos: Point, net: NetId, layers: LayerRange) -> Option<&Joint> {
        self.buckets.get(&JointKey { pos, net })?.iter().find(|j| j.layers.overlaps(&layers))
    }

    /// Finds the joint at `pos`/`net` whose layer range overlaps `layers`,
    /// mutably.
    pub fn find_mut(&mut self, pos: Point, net: NetId, layers: LayerRange) -> Option<&mut Joint> {
        self.buckets.get_mut(&JointKey { pos, net })?.iter_mut().find(|j| j.layers.overlaps(&layers))
    }

    /// Locks the joint at `pos`/`net` overlapping `layers`, if any exists.
    pub fn lock(&mut self, pos: Point, net: NetId, layers: LayerRange) {
        if let Some(j) = self.find_mut(pos, net, layers) {
            j.locked = true;
        }
    }

    /// Iterates every joint in the table along with its key.
    pub fn iter(&self) -> impl Iterator<Item = (JointKey, &Joint)> {
        self.buckets.iter().flat_map(|(k, v)| v.iter().map(move |j| (*k, j)))
    }

    /// Whether the table has no joints at all.
    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(|b| b.is_empty())
    }

    /// Merges `other` into `self`, used when collapsing a committed child's
    /// joint delta into its parent.
    pub fn merge_from(&mut self, other: JointTable) {
        for (key, joints) in other.buckets {
            for j in joints {
                for &uid in &j.links.clone() {
                    self.link(key.pos, key.net, j.layers, uid);
                }
                if j.locked {
                    self.lock(key.pos, key.net, j.layers);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trivial_joint_requires_exactly_two_unlocked_links() {
        let mut j = Joint::new(LayerRange::single(0));
        assert!(!j.is_trivial());
        j.link(Uid(1));
        assert!(!j.is_trivial());
        j.link(Uid(2));
        assert!(j.is_trivial());
        j.locked = true;
        assert!(!j.is_trivial());
    }

    #[test]
    fn linking_same_uid_twice_is_idempotent() {
        let mut j = Joint::new(LayerRange::single(0));
        j.link(Uid(5));
        j.link(Uid(5));
        assert_eq!(j.links, vec![Uid(5)]);
    }

    #[test]
    fn via_and_segment_merge_into_one_joint_by_layer_overlap() {
        let mut table = JointTable::new();
        let p = Point::new(0, 0);
        table.link(p, NetId(1), LayerRange::new(0, 3), Uid(1)); // via
        table.link(p, NetId(1), LayerRange::single(0), Uid(2)); // segment on layer 0
        let joint = table.find(p, NetId(1), LayerRange::single(0)).unwrap();
        assert_eq!(joint.links.len(), 2);
        assert_eq!(joint.layers, LayerRange::new(0, 3));
    }

    #[test]
    fn disjoint_layers_get_separate_joints() {
        let mut table = JointTable::new();
        let p = Point::new(0, 0);
        table.link(p, NetId(1), LayerRange::single(0), Uid(1));
        table.link(p, NetId(1), LayerRange::single(1), Uid(2));
        assert!(table.find(p, NetId(1), LayerRange::single(0)).unwrap().links == vec![Uid(1)]);
        assert!(table.find(p, NetId(1), LayerRange::single(1)).unwrap().links == vec![Uid(2)]);
    }

    #[test]
    fn unlink_prunes_empty_joint() {
        let mut table = JointTable::new();
        let p = Point::new(0, 0);
        table.link(p, NetId(1), LayerRange::single(0), Uid(1));
        table.unlink(p, NetId(1), LayerRange::single(0), Uid(1));
        assert!(table.find(p, NetId(1), LayerRange::single(0)).is_none());
        assert!(table.is_empty());
    }
}
