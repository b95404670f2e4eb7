//! Object-graph substrate for pbxmerge.
//!
//! Provides the node model for project description graphs (targets, file
//! references, groups, build settings), cycle-safe traversal over graphs
//! with shared sub-structure, derived file placement, identity-stripped
//! structural cloning, and the canonical archive used for structural
//! equivalence checks.
//!
//! # Key Types
//!
//! - [`ProjectGraph`] -- owns every node, rooted at one `Project` node
//! - [`Node`] / [`Kind`] / [`Value`] -- the attribute-bag node model
//! - [`archive_to_map`] -- deterministic canonical serialization

pub mod archive;
pub mod error;
pub mod graph;
pub mod node;
pub mod traverse;

pub use archive::archive_to_map;
pub use error::{GraphError, GraphResult};
pub use graph::ProjectGraph;
pub use node::{Kind, Node, NodeId, Value};
