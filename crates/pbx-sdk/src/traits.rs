//! Boundary contracts for the out-of-scope collaborators.
//!
//! Parsing the on-disk project format and writing it back are not part of
//! this engine; callers supply implementations of these traits. The
//! contracts below are what the merge core assumes about them.

use std::path::Path;

use pbx_graph::ProjectGraph;

use crate::error::SdkResult;

/// Produces a fully linked project graph from an on-disk location.
///
/// Implementations must return a graph that is rooted at a `Project`
/// node, has every reference resolved (no dangling ids), and carries the
/// location as its `base_dir`. Shared sub-structure and cycles are
/// allowed; unresolved keys are not. The merge core treats them as
/// fatal contract violations rather than guessing.
pub trait ProjectLoader {
    /// Load the project description at `location`.
    fn load(&self, location: &Path) -> SdkResult<ProjectGraph>;
}

/// Persists a project graph back to the external description format.
///
/// The inverse of [`ProjectLoader`]. Implementations may serialize the
/// graph directly or go through the canonical form from
/// [`pbx_graph::archive_to_map`] (which is why the graph is taken
/// mutably: canonical archival assigns stable archive ids).
pub trait ProjectWriter {
    /// Write `graph` to its persisted representation.
    fn write(&self, graph: &mut ProjectGraph) -> SdkResult<()>;
}
