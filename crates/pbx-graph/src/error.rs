//! Error types for the object-graph substrate.

use crate::node::NodeId;

/// Errors from graph storage and traversal.
///
/// Every variant marks a loader-contract violation: a well-formed graph
/// never produces one of these during traversal or archival.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// A reachable value references a node the graph does not own.
    #[error("dangling reference to {0}")]
    DanglingReference(NodeId),

    /// An attribute holds a value of a shape its schema does not allow
    /// (e.g. a scalar where a children sequence is expected).
    #[error("unexpected shape for attribute `{attribute}` on {node}")]
    UnexpectedShape {
        /// The node carrying the malformed attribute.
        node: NodeId,
        /// The attribute name.
        attribute: String,
    },
}

/// Result alias for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;
