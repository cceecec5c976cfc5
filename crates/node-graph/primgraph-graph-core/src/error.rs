//! Error types for graph mutations.
//!
//! Every variant is recoverable: a rejected operation leaves the graph
//! untouched and is safe to re-issue once the caller fixes the request.

use crate::ids::{ConnectionId, NodeId, PortId};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GraphError {
    /// Connect-by-name lookup failed.
    #[error("port not found on node {node}: {name}")]
    PortNotFound { node: String, name: String },

    /// A port id no longer resolves in the arena.
    #[error("unknown port: {id:?}")]
    UnknownPort { id: PortId },

    /// Both endpoints carry the same data direction.
    #[error("cannot connect two {direction}-direction ports ({a:?}, {b:?})")]
    SameDirection {
        a: PortId,
        b: PortId,
        direction: &'static str,
    },

    /// Both endpoints sit on the same node.
    #[error("cannot connect two ports of the same node ({a:?}, {b:?})")]
    SameNode { a: PortId, b: PortId },

    #[error("unknown connection: {id:?}")]
    UnknownConnection { id: ConnectionId },

    #[error("unknown node: {id:?}")]
    UnknownNode { id: NodeId },

    /// Port name already used for this direction on the node.
    #[error("node {node} already has a {direction} port named {name}")]
    DuplicatePort {
        node: String,
        name: String,
        direction: &'static str,
    },

    #[error("parameter not found on node {node}: {name}")]
    ParameterNotFound { node: String, name: String },

    #[error("node {node} already has a parameter named {name}")]
    DuplicateParameter { node: String, name: String },
}
