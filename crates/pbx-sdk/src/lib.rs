//! High-level SDK for pbxmerge.
//!
//! Provides the [`Importer`] capability facade over the merge engine's
//! four entry points and the boundary contracts ([`ProjectLoader`],
//! [`ProjectWriter`]) that out-of-scope collaborators implement. This is
//! the main entry point for applications embedding the engine.

pub mod error;
pub mod importer;
pub mod traits;

pub use error::{SdkError, SdkResult};
pub use importer::Importer;
pub use traits::{ProjectLoader, ProjectWriter};

// Re-export key types
pub use pbx_fileops::{ExecutionReport, FileOp, FileSystem, InMemoryFileSystem, StdFileSystem};
pub use pbx_graph::{archive_to_map, Kind, Node, NodeId, ProjectGraph, Value};
pub use pbx_xref::{Bins, MergePolicy, XrefKey, XrefMap};
