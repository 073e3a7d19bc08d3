//! Structural scene errors

use crate::foundation::collections::NodeId;

/// Reasons a structural scene mutation is refused
///
/// A refused mutation leaves the hierarchy exactly as it was.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneError {
    /// The handle does not resolve to a live node
    #[error("node {0:?} does not exist")]
    NodeNotFound(NodeId),

    /// Attaching would make a node its own ancestor
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    CyclicHierarchy {
        /// Requested parent
        parent: NodeId,
        /// Requested child
        child: NodeId,
    },

    /// A node cannot be its own parent
    #[error("node {0:?} cannot be attached to itself")]
    SelfParent(NodeId),
}
