//! The rule resolver contract: the externally supplied authority for
//! clearance, width, gap and keepout decisions.
//!
//! The router core never hard-codes a design rule; every clearance or
//! constraint query is forwarded to a host-supplied [`RuleResolver`]
//! implementation so the same routing algorithms serve boards with wildly
//! different rule databases.

use geometry::prelude::Point;

use crate::id::{LayerId, NetId};
use crate::item::Item;

/// The kinds of constraint a [`RuleResolver`] can be asked to resolve.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    /// Copper-to-copper clearance.
    Clearance,
    /// Differential-pair gap.
    DiffPairGap,
    /// Differential-pair skew (length mismatch) tolerance.
    DiffPairSkew,
    /// Net/class length tuning target.
    Length,
    /// Track width.
    Width,
    /// Via diameter.
    ViaDiameter,
    /// Via hole diameter.
    ViaHole,
    /// Hole-to-copper clearance.
    HoleClearance,
    /// Board-edge clearance.
    EdgeClearance,
    /// Hole-to-hole clearance.
    HoleToHole,
    /// Maximum uncoupled length for a differential pair.
    MaxUncoupled,
    /// A physical (manufacturing) clearance floor, independent of
    /// electrical rules.
    PhysicalClearance,
}

/// A resolved constraint: a numeric value plus the rule kind it answers.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Constraint {
    /// Which kind of constraint this is.
    pub kind: ConstraintKind,
    /// The resolved value, in internal units (or an abstract tolerance unit
    /// for skew/length constraints).
    pub value: i64,
}

/// Differential pair polarity.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DpPolarity {
    /// The positive leg.
    Positive,
    /// The negative leg.
    Negative,
    /// Not part of a differential pair.
    None,
}

/// The externally supplied design-rule authority.
///
/// Implementations are assumed thread-unsafe and are only ever called from
/// the router's single cooperative thread (see the crate-level concurrency
/// notes); the core holds a borrowed reference for the lifetime of the
/// world it is resolving rules for.
pub trait RuleResolver {
    /// The clearance required between `a` and `b`. `use_epsilon` requests a
    /// tolerance-widened value suitable for "is this exactly at clearance"
    /// checks rather than strict collision tests.
    fn clearance(&self, a: &Item, b: &Item, use_epsilon: bool) -> i64;

    /// Resolves an arbitrary constraint kind between two items on a given
    /// layer, if the rule database has an opinion.
    fn query_constraint(
        &self,
        kind: ConstraintKind,
        a: &Item,
        b: &Item,
        layer: LayerId,
    ) -> Option<Constraint>;

    /// The net coupled to `net` as its differential-pair partner, if any.
    fn dp_coupled_net(&self, net: NetId) -> Option<NetId>;

    /// The polarity of `net` within its differential pair, if any.
    fn dp_net_polarity(&self, net: NetId) -> DpPolarity;

    /// The `(netP, netN)` pair an item belongs to, if it is diff-pair
    /// coupled.
    fn dp_net_pair(&self, item: &Item) -> Option<(NetId, NetId)>;

    /// Whether `a` and `b` are tied together by an explicit net-tie.
    fn is_in_net_tie(&self, a: &Item, b: &Item) -> bool;

    /// Whether a net-tie between `a` and `b` is explicitly excluded from
    /// clearance checks.
    fn is_net_tie_exclusion(&self, a: &Item, b: &Item) -> bool;

    /// Whether `item` is (or owns) a drilled, plated hole.
    fn is_drilled_hole(&self, item: &Item) -> bool;

    /// Whether `item` is a non-plated slot (never collides with copper).
    fn is_non_plated_slot(&self, item: &Item) -> bool;

    /// Whether `item` sits inside a keepout area forbidding routing of the
    /// given kind.
    fn is_keepout(&self, item: &Item, at: Point) -> bool;

    /// The tolerance used to decide "exactly at clearance" boundary cases.
    fn clearance_epsilon(&self) -> i64;
}
