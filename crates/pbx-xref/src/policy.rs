//! Merge-policy classification.
//!
//! Matched nodes fall into one of two bins. Container kinds whose children
//! are independently identifiable get their children reconciled one by one
//! (**merge**); atomic leaf kinds carry no independently meaningful
//! sub-structure, so the donor's values simply win (**overwrite**). The
//! project root belongs to neither bin: the merge engine handles it
//! specially and never merges or overwrites it wholesale.

use std::collections::HashSet;

use pbx_graph::{Kind, NodeId, ProjectGraph};

use crate::error::XrefResult;
use crate::matcher::XrefMap;

/// How the merge engine treats a matched node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergePolicy {
    /// Reconcile children individually; receiver-only content survives.
    Merge,
    /// Replace the node's non-reference attributes wholesale.
    Overwrite,
}

/// The per-kind policy table. `None` marks the project root, which is
/// excluded from both bins.
pub fn merge_policy(kind: Kind) -> Option<MergePolicy> {
    match kind {
        Kind::Project => None,
        Kind::Group | Kind::Target | Kind::BuildPhase | Kind::ConfigurationList => {
            Some(MergePolicy::Merge)
        }
        Kind::FileReference | Kind::BuildFile | Kind::Configuration => {
            Some(MergePolicy::Overwrite)
        }
    }
}

/// The two disjoint policy bins over matched receiver nodes.
#[derive(Clone, Debug, Default)]
pub struct Bins {
    /// Nodes whose children are reconciled one by one.
    pub merge: HashSet<NodeId>,
    /// Nodes whose attributes the donor replaces wholesale.
    pub overwrite: HashSet<NodeId>,
}

impl Bins {
    /// The policy recorded for a node, if it was binned at all.
    pub fn policy(&self, id: NodeId) -> Option<MergePolicy> {
        if self.merge.contains(&id) {
            Some(MergePolicy::Merge)
        } else if self.overwrite.contains(&id) {
            Some(MergePolicy::Overwrite)
        } else {
            None
        }
    }
}

/// Partition every node of `a` appearing as a value in `map` into the two
/// policy bins, excluding the project root.
pub fn bin_mappings(map: &XrefMap, a: &ProjectGraph) -> XrefResult<Bins> {
    let mut bins = Bins::default();
    for target in map.values() {
        if *target == a.root() {
            continue;
        }
        match merge_policy(a.expect_node(*target)?.kind) {
            Some(MergePolicy::Merge) => {
                bins.merge.insert(*target);
            }
            Some(MergePolicy::Overwrite) => {
                bins.overwrite.insert(*target);
            }
            None => {}
        }
    }
    Ok(bins)
}
