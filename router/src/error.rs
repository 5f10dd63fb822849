//! The router's error taxonomy.
//!
//! Internal algorithm failures that are locally recoverable (a shove
//! iteration limit, a failed walkaround) are represented as plain
//! [`Result`]/[`Option`] returns deeper in the call stack and are only
//! wrapped into an [`Error`] once a placer decides no fallback mode is left.

use thiserror::Error as ThisError;

use crate::id::{ItemId, NetId};

/// Every way a router-level operation can fail.
#[derive(Debug, ThisError, Clone, PartialEq, Eq)]
pub enum Error {
    /// The cursor landed on a non-plated hole, a keepout, text, or a zone
    /// forbidding tracks.
    #[error("cannot start a route here: {0}")]
    NonRoutableStartPoint(String),

    /// Starting a trace at the cursor would immediately collide even at
    /// minimum track width.
    #[error("starting here would violate clearance rules")]
    StartViolatesDrc,

    /// A differential-pair start cannot find the complementary net.
    #[error("no differential pair partner net for {0:?}")]
    NoDiffPairPartner(NetId),

    /// The diff-pair starting anchors are more than ±10% from the
    /// configured gap.
    #[error("diff pair anchors are {actual} apart, expected {expected} (±10%)")]
    DiffPairGapMismatch {
        /// The measured anchor-to-anchor distance.
        actual: i64,
        /// The configured gap-implied anchor distance.
        expected: i64,
    },

    /// A via was requested with identical top and bottom layer.
    #[error("via requires two distinct layers")]
    NeedTwoLayers,

    /// The shove engine failed to stabilize within its iteration budget.
    #[error("shove did not stabilize within the iteration budget")]
    ShoveIterationLimit,

    /// The walkaround graph walk failed, or the path started inside the
    /// obstacle hull.
    #[error("walkaround could not route around the obstacle")]
    WalkaroundUnroutable,

    /// The line placer received `Move`/`FixRoute`/`UnfixRoute` while not
    /// mid-interaction (no prior `Start`, or after `CommitPlacement`).
    #[error("line placer is not active")]
    PlacerNotActive,

    /// An arc's mid point was not equidistant from the implied center; the
    /// constructor corrected it rather than failing, but this is recorded
    /// for callers that want to know it happened.
    #[error("arc mid point was not equidistant from the center; corrected")]
    ArcMidInvalid,

    /// [`crate::node::Node::commit`] was called on a node that is not a
    /// direct child of its root. Programmer error.
    #[error("commit is only legal on a child of the root node")]
    CommitDeniedNotRoot,

    /// A referenced item does not exist in the node (already removed, or
    /// never added).
    #[error("item {0:?} not found")]
    ItemNotFound(ItemId),

    /// The dragger was started on a UID that does not resolve to an item in
    /// the world (stale selection).
    #[error("drag target {0:?} not found")]
    DragTargetNotFound(crate::item::Uid),
}

/// The router's `Result` alias.
pub type Result<T> = std::result::Result<T, Error>;
