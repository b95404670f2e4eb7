//! File-operation layer for pbxmerge.
//!
//! Carries the planned-operation records shared between the merge planner
//! and the executor, the [`FileSystem`] abstraction over OS primitives,
//! and the executor that applies a batch with skip-and-report resilience.
//!
//! # Key Types
//!
//! - [`FileOp`] -- the planner/executor wire contract
//! - [`FileSystem`] / [`StdFileSystem`] / [`InMemoryFileSystem`] -- OS boundary
//! - [`execute_file_ops`] / [`ExecutionReport`] -- sequential application

pub mod executor;
pub mod fs;
pub mod ops;

pub use executor::{execute_file_ops, ExecutionReport};
pub use fs::{FileSystem, InMemoryFileSystem, StdFileSystem};
pub use ops::FileOp;
