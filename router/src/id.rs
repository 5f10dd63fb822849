//! Opaque handles used throughout the router.
//!
//! Items are addressed by generational [`ItemId`] handles rather than raw
//! pointers into a node's arena, so a dangling reference to a freed item is
//! a detectable error (stale generation) instead of undefined behavior —
//! the arena-plus-typed-index redesign called for in place of the original
//! owner-pointer scheme.

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// A handle to a single linked item (segment, arc, via, solid or hole)
    /// stored in a [`crate::node::Node`]'s arena.
    pub struct ItemId;
}

/// An opaque net handle. The router never interprets net identity beyond
/// equality and the rule resolver's diff-pair queries; human-readable names
/// are resolved only through [`crate::iface::RouterIface::net_name`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NetId(pub u32);

impl NetId {
    /// The reserved "no net" handle.
    pub const NONE: NetId = NetId(0);

    /// Whether this handle represents "no net" (e.g. unrouted copper on a
    /// zone keepout island).
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

/// An internal routing layer index. The host's board-layer stackup is
/// mapped to a contiguous `0..n` range by
/// [`crate::iface::RouterIface::pns_layer_from_board_layer`]; the router
/// core never interprets layer semantics beyond ordering and range overlap.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(pub i32);

impl LayerId {
    /// The sentinel meaning "all layers" / "unspecified", used by
    /// `Hull(clearance, walkaroundWidth, layer = -1)`.
    pub const ALL: LayerId = LayerId(-1);
}

/// An opaque handle to an item's counterpart in the host's board object
/// model. The router core never dereferences it; it only compares handles
/// for equality when [`crate::node::Node::commit`] pairs a removed item
/// with an added item that replaces it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostRef(pub u64);
