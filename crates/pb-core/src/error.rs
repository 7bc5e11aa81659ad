//! Error types for tree mutations.
//!
//! Every variant is recoverable: the rejected call left the tree exactly as
//! it was. Invariant violations (dangling children, shared ownership) are
//! not errors: see [`crate::integrity`].

use crate::id::NodeId;
use crate::model::ComponentType;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("node not found: {0}")]
    NotFound(NodeId),

    #[error("{0} cannot hold children")]
    InvalidParent(NodeId),

    #[error("{0} is not a container type")]
    NotContainer(ComponentType),

    #[error("moving {id} under {target} would create a cycle")]
    Cycle { id: NodeId, target: NodeId },

    #[error("the root node cannot be deleted")]
    RootDeletion,

    #[error("the root node cannot be moved")]
    RootReparent,

    #[error("the root node cannot be duplicated")]
    RootDuplicate,

    #[error("only the page body may be a root node")]
    RootInsertion,

    #[error("index {index} out of range for {parent} with {len} children")]
    InvalidIndex {
        parent: NodeId,
        index: usize,
        len: usize,
    },

    #[error("node id already in use: {0}")]
    DuplicateId(NodeId),

    #[error("nodes do not share a parent")]
    NotSiblings,

    #[error("document decode error: {0}")]
    Decode(String),
}

pub type TreeResult<T> = Result<T, TreeError>;
