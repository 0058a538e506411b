//! Scene graph errors
//!
//! Only recoverable editing errors are reported here. Broken traversal
//! invariants (unbalanced push/pop, disabled element access) panic instead.

use thiserror::Error;

use crate::nodes::NodeId;

/// Errors returned by scene graph edits
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// Adding the child would make a node its own descendant
    #[error("adding node {child} under {parent} would create a cycle")]
    CycleDetected {
        /// Node receiving the child
        parent: NodeId,
        /// Node being attached
        child: NodeId,
    },
    
    /// Child index past the end of the children list
    #[error("child index {index} out of range (node has {len} children)")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of children
        len: usize,
    },
    
    /// Node is not a child of the group
    #[error("node {0} is not a child")]
    NotAChild(NodeId),
}

/// Result alias for scene graph edits
pub type SceneResult<T> = Result<T, SceneError>;
