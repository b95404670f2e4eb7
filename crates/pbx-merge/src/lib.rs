//! Merge engine for pbxmerge.
//!
//! Unions a donor project graph into a receiver in place and plans the
//! file operations that keep the receiver's directory consistent with the
//! merged description. Matched nodes are reconciled per their policy bin;
//! unmatched donor subtrees are deep-copied into receiver-owned nodes;
//! group containment adopts the donor's layout.
//!
//! # Key Types
//!
//! - [`import_project`] -- the merge entry point
//! - [`plan_file_ops`] / [`FileIndex`] -- the file-operation planner
//! - [`MergeError`] -- fatal structural violations

pub mod engine;
pub mod error;
pub mod planner;

pub use engine::import_project;
pub use error::{MergeError, MergeResult};
pub use planner::{plan_file_ops, FileIndex};
