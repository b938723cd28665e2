//! Scene error types
//!
//! Everything here is a programming error: the caller broke an invariant of
//! the tree or of one of the indices. None of these are expected at runtime.

use thiserror::Error;

use crate::foundation::collections::NodeId;

use super::Dimension;

/// Misuse of a [`CameraGroupIndex`](super::CameraGroupIndex) or
/// [`CameraRegistry`](super::CameraRegistry)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    /// Element registered twice
    #[error("{0} is already registered")]
    AlreadyRegistered(String),

    /// Element was never registered (or already unregistered)
    #[error("{0} is not registered")]
    NotRegistered(String),

    /// Keys supplied by the caller differ from the keys the index filed the element under
    #[error(
        "{element} is filed under z-order {recorded_z_order} / group {recorded_group:#x}, \
         caller supplied z-order {z_order} / group {group:#x}"
    )]
    KeyMismatch {
        /// Element description
        element: String,
        /// Z-order the index recorded
        recorded_z_order: i32,
        /// Group mask the index recorded
        recorded_group: u64,
        /// Z-order the caller supplied
        z_order: i32,
        /// Group mask the caller supplied
        group: u64,
    },

    /// The camera mask supplied by the caller differs from the recorded one
    #[error("{element} is filed under group {recorded:#x}, caller supplied group {supplied:#x}")]
    GroupMismatch {
        /// Element description
        element: String,
        /// Group mask the registry recorded
        recorded: u64,
        /// Group mask the caller supplied
        supplied: u64,
    },
}

/// Tree-level errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    /// Handle does not refer to a live node
    #[error("node {0:?} does not exist")]
    UnknownNode(NodeId),

    /// Child already has a parent or a pending attach
    #[error("node {child:?} already has a parent")]
    AlreadyHasParent {
        /// Offending child
        child: NodeId,
    },

    /// `remove_child` on a node that is not a child of `parent`
    #[error("node {child:?} is not a child of {parent:?}")]
    NotAChild {
        /// Supposed parent
        parent: NodeId,
        /// Supposed child
        child: NodeId,
    },

    /// Attaching would make a node its own ancestor
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    WouldCreateCycle {
        /// Requested parent
        parent: NodeId,
        /// Requested child
        child: NodeId,
    },

    /// The root node cannot be re-parented, removed or destroyed
    #[error("the root node cannot be moved or destroyed")]
    RootImmutable,

    /// Node lacks the drawable capability
    #[error("node {0:?} is not drawable")]
    NotDrawn(NodeId),

    /// Node lacks the camera capability
    #[error("node {0:?} is not a camera")]
    NotCamera(NodeId),

    /// Node has no transform of the requested dimension
    #[error("node {node:?} has no {dimension:?} transform")]
    MissingTransform {
        /// Offending node
        node: NodeId,
        /// Requested dimension
        dimension: Dimension,
    },

    /// Node is still attached (or has a pending attach/detach)
    #[error("node {0:?} is still attached to the tree")]
    StillAttached(NodeId),

    /// Detach of this node is already queued
    #[error("node {0:?} is already being removed")]
    PendingRemoval(NodeId),

    /// Index invariant violation
    #[error(transparent)]
    Index(#[from] IndexError),
}
