//! Error types for cross-reference matching.

use pbx_graph::{GraphError, NodeId};

/// Errors from identity-key computation and matching.
#[derive(Debug, thiserror::Error)]
pub enum XrefError {
    /// The identifying attributes of a node form a reference cycle, so no
    /// finite identity key exists. Only a malformed graph can produce this.
    #[error("identity attributes of {0} form a reference cycle")]
    CyclicIdentity(NodeId),

    /// An identifying attribute holds a value no identity key can be built
    /// from (a sequence).
    #[error("identity attribute `{attribute}` on {node} has an unusable shape")]
    InvalidKeyAttribute {
        /// The node whose key was requested.
        node: NodeId,
        /// The offending attribute.
        attribute: String,
    },

    /// Underlying graph-structure violation.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Result alias for cross-reference operations.
pub type XrefResult<T> = Result<T, XrefError>;
