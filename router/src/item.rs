//! The item model: routable things a [`crate::node::Node`] can hold.
//!
//! The original router expresses `Segment`/`Arc`/`Via`/`Solid`/`Hole` as a
//! deep `ITEM -> LINKED_ITEM -> ...` class hierarchy reached only through a
//! `Kind()` tag and a handful of virtual calls. Polymorphism here is
//! exercised the same shallow way, so it is rewritten as a closed sum type:
//! one `Item` enum, matched wherever the original would have dispatched
//! virtually.

use geometry::prelude::{Arc, Point, Seg, Shape};
use geometry::span::LayerRange;
use serde::{Deserialize, Serialize};

use crate::id::NetId;
use crate::sizes::{UnconnectedLayerRemoval, ViaType};

/// A tiny hand-rolled bitflags macro, used instead of pulling in the
/// `bitflags` crate for a single four-bit set.
macro_rules! bitflags_lite {
    (
        $(#[$meta:meta])*
        pub struct $name:ident: $repr:ty {
            $(
                $(#[$fmeta:meta])*
                const $flag:ident = $value:expr;
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
        pub struct $name($repr);

        impl $name {
            $(
                $(#[$fmeta])*
                pub const $flag: $name = $name($value);
            )*

            /// The empty flag set.
            pub const fn empty() -> Self {
                Self(0)
            }

            /// Whether `other`'s bits are all set in `self`.
            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            /// Sets `other`'s bits.
            pub fn insert(&mut self, other: Self) {
                self.0 |= other.0;
            }

            /// Clears `other`'s bits.
            pub fn remove(&mut self, other: Self) {
                self.0 &= !other.0;
            }
        }

        impl std::ops::BitOr for $name {
            type Output = $name;
            fn bitor(self, rhs: Self) -> Self {
                $name(self.0 | rhs.0)
            }
        }
    };
}

/// A monotonic identifier assigned to every linked item when it is
/// constructed, stable across `Add`/`Remove`/branch/commit. Distinct from
/// [`crate::id::ItemId`], which is only a slot handle valid within one
/// node's arena; the UID survives a commit that moves the item into a new
/// arena slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Uid(pub u64);

/// The kind tag of an item, including the two transient kinds (`Line`,
/// `DiffPair`) that are assembled on demand rather than stored, and
/// `Joint`, which is a graph node rather than a shape-bearing item. Used
/// for classification (e.g. a collision query's `kind_mask`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// See [`Item::Segment`].
    Segment,
    /// See [`Item::Arc`].
    Arc,
    /// See [`Item::Via`].
    Via,
    /// See [`Item::Solid`].
    Solid,
    /// See [`Item::Hole`].
    Hole,
    /// See [`crate::joint::assemble_line`]'s [`Line`].
    Line,
    /// A coupled pair of [`Line`]s.
    DiffPair,
    /// A [`crate::joint::Joint`] graph node.
    Joint,
}

bitflags_lite! {
    /// Marker bits carried by every item.
    pub struct Markers: u8 {
        /// The item is the volatile "head" of an in-progress placement.
        const HEAD = 0b0001;
        /// The item currently reports a DRC violation.
        const VIOLATION = 0b0010;
        /// The item's joint is locked against further movement.
        const LOCKED = 0b0100;
        /// The item is coupled into a differential pair.
        const DP_COUPLED = 0b1000;
    }
}

/// Attributes shared by every linked item kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemCommon {
    /// The contiguous layer range the item occupies.
    pub layers: LayerRange,
    /// The net this item belongs to.
    pub net: NetId,
    /// Marker bits (head/violation/locked/dp-coupled).
    pub markers: Markers,
    /// Shove-ordering rank; lower is easier to push.
    pub rank: i32,
    /// Whether this item exists only for intermediate computation and
    /// should never be committed to the host board.
    pub is_virtual: bool,
    /// Whether this item is eligible to be used as a routing anchor
    /// (false for e.g. non-plated slots).
    pub is_routable: bool,
    /// The item's stable identity across arena moves.
    pub uid: Uid,
    /// An opaque reference to the item's counterpart in the host's board
    /// object model, used only by [`crate::node::Node::commit`] to pair a
    /// removed item with an added item that replaces it (a "changed" item,
    /// in spec terms) rather than reporting a remove+add pair. `None` for
    /// items that never existed on the host board (in-progress heads,
    /// meander previews).
    pub host_ref: Option<crate::id::HostRef>,
}

impl ItemCommon {
    /// Creates common attributes with the given net/rank/layer range and no
    /// markers set, routable and non-virtual by default.
    pub fn new(uid: Uid, layers: LayerRange, net: NetId, rank: i32) -> Self {
        Self {
            layers,
            net,
            markers: Markers::empty(),
            rank,
            is_virtual: false,
            is_routable: true,
            uid,
            host_ref: None,
        }
    }

    /// Returns `self` with [`Self::host_ref`] set, for items that mirror an
    /// existing host board item (as opposed to a brand new placement).
    pub fn with_host_ref(mut self, host_ref: crate::id::HostRef) -> Self {
        self.host_ref = Some(host_ref);
        self
    }
}

/// A straight track segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Shared item attributes.
    pub common: ItemCommon,
    /// The segment's geometry.
    pub seg: Seg,
    /// Copper width.
    pub width: i64,
}

/// A curved track segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcItem {
    /// Shared item attributes.
    pub common: ItemCommon,
    /// The arc's geometry (start/mid/end plus width).
    pub arc: Arc,
}

/// The per-layer diameter of a via's copper annulus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ViaDiameter {
    /// The same diameter on every layer.
    Uniform(i64),
    /// Distinct diameters for the front, inner, and back layers.
    FrontInnerBack {
        /// Diameter on the front (outermost top) layer.
        front: i64,
        /// Diameter on every inner layer.
        inner: i64,
        /// Diameter on the back (outermost bottom) layer.
        back: i64,
    },
    /// A fully custom per-layer map; layers absent from the map carry no
    /// copper for this via.
    PerLayer(Vec<(crate::id::LayerId, i64)>),
}

impl ViaDiameter {
    /// The copper diameter on a specific layer, given the total layer
    /// count (needed to classify front/back for [`Self::FrontInnerBack`]).
    pub fn diameter_on(&self, layer: crate::id::LayerId, total_layers: i32) -> i64 {
        match self {
            ViaDiameter::Uniform(d) => *d,
            ViaDiameter::FrontInnerBack { front, inner, back } => {
                if layer.0 == 0 {
                    *front
                } else if layer.0 == total_layers - 1 {
                    *back
                } else {
                    *inner
                }
            }
            ViaDiameter::PerLayer(map) => map
                .iter()
                .find(|(l, _)| *l == layer)
                .map(|(_, d)| *d)
                .unwrap_or(0),
        }
    }
}

/// A hole, owned by a via or pad.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hole {
    /// Shared item attributes (net is forwarded from the owner).
    pub common: ItemCommon,
    /// The hole's own shape, tested independently of its owner's copper
    /// shape for hole-to-hole and hole-to-copper clearance.
    pub shape: Shape,
}

/// A plated via, possibly transiently owned by an in-progress [`Line`]
/// rather than a node.
///
/// The original router represents a line's end-via as a raw pointer that
/// may or may not belong to the node, disambiguated at runtime by a
/// `BelongsTo` check. This makes the ownership explicit in the type instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ViaRef {
    /// The via is stored in a node and referenced by its stable UID.
    Borrowed(Uid),
    /// The via was created transiently during the current interaction and
    /// is not yet, and may never be, part of any node.
    Owned(Box<Via>),
}

/// A plated through/blind/buried/micro via.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Via {
    /// Shared item attributes.
    pub common: ItemCommon,
    /// The via's center.
    pub pos: Point,
    /// Per-layer copper diameter.
    pub diameter: ViaDiameter,
    /// Drill diameter.
    pub drill: i64,
    /// Via type (through/blind/buried/micro).
    pub via_type: ViaType,
    /// The via's drilled hole.
    pub hole: Hole,
    /// What to do with copper on layers the via no longer connects to.
    pub unconnected_layer_removal: UnconnectedLayerRemoval,
}

/// A component pad or other fixed copper shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solid {
    /// Shared item attributes.
    pub common: ItemCommon,
    /// The pad's shape.
    pub shape: Shape,
}

/// A linked (node-stored) routable item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Item {
    /// See [`Segment`].
    Segment(Segment),
    /// See [`ArcItem`].
    Arc(ArcItem),
    /// See [`Via`].
    Via(Via),
    /// See [`Solid`].
    Solid(Solid),
    /// See [`Hole`].
    Hole(Hole),
}

impl Item {
    /// This item's kind tag.
    pub fn kind(&self) -> ItemKind {
        match self {
            Item::Segment(_) => ItemKind::Segment,
            Item::Arc(_) => ItemKind::Arc,
            Item::Via(_) => ItemKind::Via,
            Item::Solid(_) => ItemKind::Solid,
            Item::Hole(_) => ItemKind::Hole,
        }
    }

    /// Shared attributes, by reference.
    pub fn common(&self) -> &ItemCommon {
        match self {
            Item::Segment(s) => &s.common,
            Item::Arc(a) => &a.common,
            Item::Via(v) => &v.common,
            Item::Solid(s) => &s.common,
            Item::Hole(h) => &h.common,
        }
    }

    /// Shared attributes, mutably.
    pub fn common_mut(&mut self) -> &mut ItemCommon {
        match self {
            Item::Segment(s) => &mut s.common,
            Item::Arc(a) => &mut a.common,
            Item::Via(v) => &mut v.common,
            Item::Solid(s) => &mut s.common,
            Item::Hole(h) => &mut h.common,
        }
    }

    /// The net this item belongs to. A hole forwards to its owner's net
    /// (invariant 4 of the data model: hole items share net with their
    /// parent via/pad).
    pub fn net(&self) -> NetId {
        self.common().net
    }

    /// The item's copper/drill shape, for collision purposes.
    pub fn shape(&self) -> Shape {
        match self {
            Item::Segment(s) => Shape::Segment(s.seg, s.width),
            Item::Arc(a) => {
                // Approximate the arc by its chord polyline for collision;
                // callers needing the true curved hull use
                // `geometry::hull::arc_hull` directly via `crate::collision`.
                const ARC_COLLISION_ACCURACY: i64 = 500;
                let poly = a.arc.to_polyline(ARC_COLLISION_ACCURACY);
                Shape::Polygon(geometry::line_chain::LineChain::from_points(poly, false))
            }
            Item::Via(v) => Shape::Circle {
                center: v.pos,
                radius: v.diameter.diameter_on(crate::id::LayerId(v.common.layers.start()), v.common.layers.end() + 1) / 2,
            },
            Item::Solid(s) => s.shape.clone(),
            Item::Hole(h) => h.shape.clone(),
        }
    }

    /// The endpoints this item contributes to the joint graph. Vias and
    /// solids contribute a single point (their center); segments and arcs
    /// contribute their two ends.
    pub fn anchor_points(&self) -> Vec<Point> {
        match self {
            Item::Segment(s) => vec![s.seg.a, s.seg.b],
            Item::Arc(a) => vec![a.arc.start(), a.arc.end()],
            Item::Via(v) => vec![v.pos],
            Item::Solid(s) => vec![s.shape.bbox().center()],
            Item::Hole(_) => Vec::new(),
        }
    }

    /// The item's stable UID.
    pub fn uid(&self) -> Uid {
        self.common().uid
    }
}

/// A transient, on-demand-assembled logical track: a line chain, a width,
/// an optional end via, and the set of linked items it was built from.
///
/// Never stored in a node; clearing `links` detaches a `Line` from the node
/// it was assembled from without affecting that node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// The assembled geometry.
    pub chain: geometry::line_chain::LineChain,
    /// Copper width.
    pub width: i64,
    /// The layer range the line occupies (shared by every segment/arc link;
    /// a line never spans a layer change without an intervening via, so a
    /// single range suffices).
    pub layers: LayerRange,
    /// The via terminating this line, if any.
    pub end_via: Option<ViaRef>,
    /// Back-references to the underlying linked items concatenated to
    /// build this line, in chain order.
    pub links: Vec<Uid>,
    /// The net this line belongs to.
    pub net: NetId,
}

impl Line {
    /// Creates an empty line with no links, for incremental assembly.
    pub fn new(net: NetId, width: i64, layers: LayerRange) -> Self {
        Self {
            chain: geometry::line_chain::LineChain::new(),
            width,
            layers,
            end_via: None,
            links: Vec::new(),
            net,
        }
    }

    /// Detaches this line from whatever node it was assembled from, without
    /// mutating that node.
    pub fn clear_links(&mut self) {
        self.links.clear();
    }
}

/// A coupled pair of differential-pair lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffPair {
    /// The positive leg.
    pub p: Line,
    /// The negative leg.
    pub n: Line,
    /// The configured copper-to-copper gap between the two legs.
    pub gap: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hole_forwards_net_to_owner_by_construction() {
        let common = ItemCommon::new(Uid(1), LayerRange::single(0), NetId(7), 0);
        let hole = Hole {
            common: common.clone(),
            shape: Shape::Circle { center: Point::zero(), radius: 125_000 },
        };
        assert_eq!(hole.common.net, NetId(7));
    }

    #[test]
    fn markers_round_trip() {
        let mut m = Markers::empty();
        assert!(!m.contains(Markers::HEAD));
        m.insert(Markers::HEAD | Markers::LOCKED);
        assert!(m.contains(Markers::HEAD));
        assert!(m.contains(Markers::LOCKED));
        assert!(!m.contains(Markers::VIOLATION));
        m.remove(Markers::HEAD);
        assert!(!m.contains(Markers::HEAD));
    }

    #[test]
    fn via_diameter_front_inner_back_selects_by_layer() {
        let d = ViaDiameter::FrontInnerBack { front: 700_000, inner: 600_000, back: 650_000 };
        assert_eq!(d.diameter_on(crate::id::LayerId(0), 4), 700_000);
        assert_eq!(d.diameter_on(crate::id::LayerId(1), 4), 600_000);
        assert_eq!(d.diameter_on(crate::id::LayerId(3), 4), 650_000);
    }
}
