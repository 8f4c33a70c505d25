//! Error types for document mutation, queries and markup loading.

use thiserror::Error;

use crate::NodeId;

/// Errors reported by the retained document tree.
///
/// Plain lookup misses are not errors: identity and selector lookups return
/// `None` when nothing matches. These variants cover structural contract
/// violations and parse failures, which must fail loudly instead of silently
/// corrupting tree order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// A mutation referenced a node that does not exist (or was removed).
    #[error("node {0} does not exist in the document")]
    NodeNotFound(NodeId),

    /// `insert` was called with an anchor that is not currently a child of
    /// the stated parent.
    #[error("anchor {anchor} is not a child of parent {parent}")]
    InvalidAnchor {
        /// The parent the caller named.
        parent: NodeId,
        /// The anchor that was not found among the parent's children.
        anchor: NodeId,
    },

    /// `insert` would have made a node an ancestor of itself.
    #[error("node {0} cannot be inserted into its own subtree")]
    CircularInsertion(NodeId),

    /// An element-only operation was applied to a non-element node.
    #[error("node {0} is not an element")]
    NotAnElement(NodeId),

    /// A text-content operation was applied to a node without literal text.
    #[error("node {0} does not hold literal text")]
    NotATextNode(NodeId),

    /// A selector string could not be parsed.
    #[error("invalid selector `{selector}`: {message}")]
    Selector {
        /// The offending selector text.
        selector: String,
        /// What went wrong.
        message: String,
    },

    /// Seed markup could not be parsed.
    #[error("malformed markup at byte {position}: {message}")]
    Markup {
        /// Byte offset into the markup source.
        position: usize,
        /// What went wrong.
        message: String,
    },
}
