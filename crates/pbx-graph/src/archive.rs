//! Canonical archival: deterministic serialization for equivalence checks.
//!
//! The archive mirrors the persisted project format: a flat `objects` table
//! keyed by archive id, with node references rendered as archive-id lookups
//! and a `rootObject` entry pointing at the project root. Two graphs are
//! structurally identical exactly when their archives are equal. This is a
//! verification/testing surface, not the persistence path.

use std::collections::{HashMap, HashSet};

use serde_json::{json, Map, Value as Json};
use tracing::debug;

use crate::error::GraphResult;
use crate::graph::ProjectGraph;
use crate::node::{NodeId, Value};

/// Archive-format version tag emitted at the top level.
const ARCHIVE_VERSION: u32 = 1;

/// Serialize the graph to its canonical nested mapping.
///
/// Assigns a stable `archive_id` to every reachable node in a fixed
/// traversal order, reusing an existing id when one is already set and
/// generating collision-free ids otherwise. Side-effecting (ids are written
/// back onto the nodes) but idempotent: repeated calls on an unchanged
/// graph produce identical output.
pub fn archive_to_map(graph: &mut ProjectGraph) -> GraphResult<Json> {
    let order = graph.reachable_ids()?;

    // Ids already present anywhere in the graph are reserved so generated
    // ids can never collide with them.
    let mut reserved: HashSet<String> = order
        .iter()
        .filter_map(|id| graph.node(*id).and_then(|node| node.archive_id.clone()))
        .collect();

    let mut assigned: HashMap<NodeId, String> = HashMap::new();
    let mut counter: u64 = 0;
    for id in &order {
        let node = graph.expect_node_mut(*id)?;
        let archive_id = match &node.archive_id {
            Some(existing) => existing.clone(),
            None => {
                let fresh = next_free_id(&mut counter, &reserved);
                reserved.insert(fresh.clone());
                node.archive_id = Some(fresh.clone());
                debug!(node = %id, archive_id = %fresh, "assigned archive id");
                fresh
            }
        };
        assigned.insert(*id, archive_id);
    }

    let mut objects = Map::new();
    for id in &order {
        let node = graph.expect_node(*id)?;
        let mut entry = Map::new();
        entry.insert("isa".into(), Json::String(node.kind.isa().to_string()));
        if let Some(version) = node.version {
            entry.insert("version".into(), json!(version));
        }
        for (key, value) in &node.attributes {
            entry.insert(key.clone(), value_to_json(value, &assigned)?);
        }
        objects.insert(assigned[id].clone(), Json::Object(entry));
    }

    Ok(json!({
        "archiveVersion": ARCHIVE_VERSION,
        "rootObject": assigned[&graph.root()],
        "objects": objects,
    }))
}

fn next_free_id(counter: &mut u64, reserved: &HashSet<String>) -> String {
    loop {
        let candidate = format!("{:024X}", *counter);
        *counter += 1;
        if !reserved.contains(&candidate) {
            return candidate;
        }
    }
}

fn value_to_json(value: &Value, assigned: &HashMap<NodeId, String>) -> GraphResult<Json> {
    Ok(match value {
        Value::Text(s) => Json::String(s.clone()),
        Value::Int(n) => json!(n),
        Value::Bool(b) => json!(b),
        Value::Ref(target) => Json::String(
            assigned
                .get(target)
                .cloned()
                .ok_or(crate::error::GraphError::DanglingReference(*target))?,
        ),
        Value::List(items) => Json::Array(
            items
                .iter()
                .map(|item| value_to_json(item, assigned))
                .collect::<GraphResult<Vec<_>>>()?,
        ),
    })
}
