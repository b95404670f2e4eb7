//! Error types for the merge engine.

use pbx_graph::{GraphError, Kind};
use pbx_xref::XrefError;

/// Errors from a merge pass.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// Matched attributes disagree on shape (scalar vs. reference vs.
    /// sequence). The loader's contract has been violated and no safe
    /// merge decision exists.
    #[error("attribute `{attribute}` on a {kind} node has irreconcilable shapes")]
    AttributeShape {
        /// The kind of the node being merged.
        kind: Kind,
        /// The attribute whose shapes disagree.
        attribute: String,
    },

    /// Underlying graph-structure violation.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Identity-key or matching failure.
    #[error(transparent)]
    Xref(#[from] XrefError),
}

/// Result alias for merge operations.
pub type MergeResult<T> = Result<T, MergeError>;
