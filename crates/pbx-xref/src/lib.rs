//! Cross-reference matching for pbxmerge.
//!
//! Decides which nodes of two independently-loaded project graphs describe
//! the same logical entity, and how the merge engine should treat each
//! match. Identity is structural (kind plus a fixed per-kind subset of
//! identifying attributes), never instance identity or serialization
//! metadata.
//!
//! # Key Types
//!
//! - [`XrefKey`] / [`xref_key`] -- structural identity keys
//! - [`cross_reference`] / [`XrefMap`] -- the key-index matcher
//! - [`bin_mappings`] / [`Bins`] / [`MergePolicy`] -- the policy classifier

pub mod error;
pub mod key;
pub mod matcher;
pub mod policy;

pub use error::{XrefError, XrefResult};
pub use key::{identifying_attrs, xref_key, KeyPart, XrefKey};
pub use matcher::{cross_reference, XrefMap};
pub use policy::{bin_mappings, merge_policy, Bins, MergePolicy};
