//! Cross-reference matching between two project graphs.
//!
//! Matching is a pure function of content: an identity-key index is built
//! over every node reachable in `a`, and every node reachable in `b` is
//! looked up in it. Instance identity, `archive_id`, and `version` play no
//! part, so a structurally-cloned graph with identity metadata stripped
//! cross-references one-to-one onto its source.

use std::collections::HashMap;

use tracing::debug;

use pbx_graph::{NodeId, ProjectGraph};

use crate::error::XrefResult;
use crate::key::{xref_key, XrefKey};

/// Node mapping produced by [`cross_reference`]: each matched node of `b`
/// maps to its counterpart in `a`.
pub type XrefMap = HashMap<NodeId, NodeId>;

/// Match every node reachable in `b` against `a`.
///
/// Total over `b`'s reachable nodes: each is either mapped to the node of
/// `a` with an equal identity key, or left unmapped when none exists.
///
/// When several nodes of `a` share an identity key, the first one
/// encountered in `a`'s fixed deterministic traversal order wins, and
/// several nodes of `b` may then map onto that same winner. This is a
/// documented tie-break, not an error.
pub fn cross_reference(a: &ProjectGraph, b: &ProjectGraph) -> XrefResult<XrefMap> {
    let mut index: HashMap<XrefKey, NodeId> = HashMap::new();
    for id in a.reachable_ids()? {
        index.entry(xref_key(a, id)?).or_insert(id);
    }

    let mut map = XrefMap::new();
    let mut unmatched = 0usize;
    for id in b.reachable_ids()? {
        match index.get(&xref_key(b, id)?) {
            Some(counterpart) => {
                map.insert(id, *counterpart);
            }
            None => unmatched += 1,
        }
    }

    debug!(matched = map.len(), unmatched, "cross-reference complete");
    Ok(map)
}
