use thiserror::Error;

use crate::NodeId;
use crate::record::Key;

/// Convenient `Result` alias for this crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Everything that can go wrong in this crate.
///
/// Ordinary outcomes are not errors: a missing key makes [`search`] return `None` and
/// [`remove`] return `false`. The variants below cover rejected configuration and the
/// structural defects reported by [`validate`].
///
/// [`search`]: crate::BPlusTree::search
/// [`remove`]: crate::BPlusTree::remove
/// [`validate`]: crate::BPlusTree::validate
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum Error {
    /// The occupancy bounds can not keep split halves above the minimum.
    #[error("invalid thresholds: need max >= 2 and 1 <= min <= max / 2, got min {min} and max {max}")]
    InvalidThresholds { min: usize, max: usize },

    /// A node holds more records or links than the maximum allows.
    #[error("node {node} holds {len} entries, more than the maximum of {max}")]
    Overfull { node: NodeId, len: usize, max: usize },

    /// Records inside a leaf are out of key order.
    #[error("records of leaf {node} are not sorted by key")]
    UnsortedRecords { node: NodeId },

    /// Links inside an inner node are out of key order.
    #[error("links of inner node {node} are not sorted by key")]
    UnsortedLinks { node: NodeId },

    /// A link key differs from the smallest key reachable below it.
    #[error("link to {child} carries key {key} but its subtree starts at {minimum}")]
    StaleRoutingKey { child: NodeId, key: Key, minimum: Key },

    /// A child does not point back at the inner node that owns it.
    #[error("node {node} does not point back at its parent {parent}")]
    ParentMismatch { node: NodeId, parent: NodeId },

    /// The root still points at a parent.
    #[error("root {root} points at parent {parent}")]
    RootHasParent { root: NodeId, parent: NodeId },

    /// The horizontal chain of a level skips, repeats or reorders nodes.
    #[error("sibling chain is broken at node {node}")]
    BrokenChain { node: NodeId },

    /// Leaves were found at different depths.
    #[error("leaf {node} sits at depth {depth}, expected {expected}")]
    UnevenDepth { node: NodeId, depth: usize, expected: usize },

    /// Keys read along the leaf chain went backwards.
    #[error("key {key} follows the larger key {previous} in leaf order")]
    OutOfOrder { previous: Key, key: Key },

    /// The tracked record count disagrees with the leaves.
    #[error("tree reports {expected} records but its leaves hold {counted}")]
    LengthMismatch { expected: usize, counted: usize },
}
