//! The merge engine: union two project graphs and plan the file moves.
//!
//! `import_project` walks the donor once in deterministic traversal order
//! and reconciles every matched pair according to its policy bin. Sequence
//! attributes union by cross-reference; group containment adopts the
//! donor's layout (matched children move where the donor places them,
//! receiver-only children stay); unmatched donor subtrees are deep-copied
//! into receiver-owned nodes with their internal references rewritten
//! through the match map, so the union never duplicates a matched entity.

use std::collections::{HashSet, VecDeque};

use tracing::debug;

use pbx_fileops::FileOp;
use pbx_graph::{Kind, Node, NodeId, ProjectGraph, Value};
use pbx_xref::{bin_mappings, cross_reference, merge_policy, xref_key, MergePolicy, XrefMap};

use crate::error::{MergeError, MergeResult};
use crate::planner::{plan_file_ops, FileIndex};

/// Mutable matching state threaded through one merge pass.
struct MergeState {
    /// Donor node -> receiver counterpart (grows as subtrees are cloned).
    map: XrefMap,
    /// Receiver nodes the donor dictates a placement for. A claimed node
    /// is dropped from a receiver children list unless the donor's
    /// corresponding list carries it.
    claimed: HashSet<NodeId>,
}

/// Broad value shape used for merge compatibility checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Shape {
    Scalar,
    Reference,
    Sequence,
}

fn shape_of(value: &Value) -> Shape {
    match value {
        Value::Ref(_) => Shape::Reference,
        Value::List(_) => Shape::Sequence,
        _ => Shape::Scalar,
    }
}

/// Merge the donor's logical content into the receiver and return the
/// file operations that keep the receiver's directory consistent.
///
/// The receiver is mutated in place into the union of both graphs; the
/// donor is read-only. The returned batch always makes a full pass: one
/// copy per donor-known file even when no path changed.
pub fn import_project(
    donor: &ProjectGraph,
    receiver: &mut ProjectGraph,
) -> MergeResult<Vec<FileOp>> {
    let before = file_index(receiver)?;
    let donor_files = file_index(donor)?;

    let map = cross_reference(receiver, donor)?;
    let bins = bin_mappings(&map, receiver)?;
    let mut state = MergeState {
        claimed: map.values().copied().collect(),
        map,
    };

    for d in donor.reachable_ids()? {
        let Some(&r) = state.map.get(&d) else {
            // Unmatched donor nodes are cloned when the attribute that
            // carries them is merged; nothing to do standalone.
            continue;
        };
        let is_root = r == receiver.root();
        let policy = if is_root {
            MergePolicy::Merge
        } else if let Some(policy) = bins.policy(r) {
            policy
        } else if let Some(policy) = merge_policy(receiver.expect_node(r)?.kind) {
            // Counterpart cloned during this pass.
            policy
        } else {
            continue;
        };

        match policy {
            MergePolicy::Merge => merge_into(donor, receiver, d, r, is_root, &mut state)?,
            MergePolicy::Overwrite => overwrite_onto(donor, receiver, d, r)?,
        }
    }

    let after = file_index(receiver)?;
    let ops = plan_file_ops(
        &before,
        &after,
        &donor_files,
        receiver.base_dir(),
        donor.base_dir(),
    );
    debug!(operations = ops.len(), "merge complete");
    Ok(ops)
}

fn file_index(graph: &ProjectGraph) -> MergeResult<FileIndex> {
    let mut index = Vec::new();
    for (path, id) in graph.all_files()? {
        index.push((xref_key(graph, id)?, path));
    }
    Ok(index)
}

/// Reconcile a matched merge-bin pair attribute by attribute.
fn merge_into(
    donor: &ProjectGraph,
    receiver: &mut ProjectGraph,
    d: NodeId,
    r: NodeId,
    is_root: bool,
    state: &mut MergeState,
) -> MergeResult<()> {
    let d_node = donor.expect_node(d)?;
    let kind = d_node.kind;

    for (key, d_value) in &d_node.attributes {
        if let Some(r_value) = receiver.attr(r, key) {
            if shape_of(r_value) != shape_of(d_value) {
                return Err(MergeError::AttributeShape {
                    kind,
                    attribute: key.clone(),
                });
            }
        }
        match d_value {
            Value::Ref(target) => {
                if let Some(current) = receiver.attr(r, key).and_then(Value::as_reference) {
                    if xref_key(receiver, current)? == xref_key(donor, *target)? {
                        // The receiver's wiring already names the same
                        // logical entity; keep its instance.
                        continue;
                    }
                }
                let counterpart = resolve_target(donor, receiver, *target, state)?;
                receiver.set_attr(r, key.clone(), Value::Ref(counterpart))?;
            }
            Value::List(d_items) => {
                let r_items = match receiver.attr(r, key) {
                    Some(Value::List(items)) => items.clone(),
                    _ => Vec::new(),
                };
                // Group containment is placement: the donor's layout wins.
                // Every other sequence is an association: pure union.
                let placement = kind == Kind::Group && key == "children";
                let merged = union_sequence(
                    donor, receiver, d_items, &r_items, placement, kind, key, state,
                )?;
                receiver.set_attr(r, key.clone(), Value::List(merged))?;
            }
            scalar => {
                // The root is only a carrier for its containers; its own
                // scalars are never adopted.
                if !is_root {
                    receiver.set_attr(r, key.clone(), scalar.clone())?;
                }
            }
        }
    }
    Ok(())
}

/// Replace a matched overwrite-bin node's non-reference attributes with
/// the donor's, wholesale. Reference-valued attributes and the node's
/// instance identity are preserved, so other receiver nodes' references
/// to it remain valid.
fn overwrite_onto(
    donor: &ProjectGraph,
    receiver: &mut ProjectGraph,
    d: NodeId,
    r: NodeId,
) -> MergeResult<()> {
    let d_node = donor.expect_node(d)?;
    let kind = d_node.kind;

    for (key, d_value) in &d_node.attributes {
        if let Some(r_value) = receiver.attr(r, key) {
            if shape_of(r_value) != shape_of(d_value) {
                return Err(MergeError::AttributeShape {
                    kind,
                    attribute: key.clone(),
                });
            }
        }
    }

    let r_node = receiver.expect_node_mut(r)?;
    r_node
        .attributes
        .retain(|key, value| value.contains_reference() || d_node.attributes.contains_key(key));
    for (key, d_value) in &d_node.attributes {
        if !d_value.contains_reference() {
            r_node.attributes.insert(key.clone(), d_value.clone());
        }
    }
    Ok(())
}

/// Union a donor sequence with the receiver's.
#[allow(clippy::too_many_arguments)]
fn union_sequence(
    donor: &ProjectGraph,
    receiver: &mut ProjectGraph,
    d_items: &[Value],
    r_items: &[Value],
    placement: bool,
    kind: Kind,
    key: &str,
    state: &mut MergeState,
) -> MergeResult<Vec<Value>> {
    let shape_err = || MergeError::AttributeShape {
        kind,
        attribute: key.to_string(),
    };
    let mut merged: Vec<Value> = Vec::new();
    let mut seen_refs: HashSet<NodeId> = HashSet::new();

    if placement {
        // Donor elements first, in donor-relative order.
        for item in d_items {
            match item {
                Value::Ref(target) => {
                    let counterpart = resolve_target(donor, receiver, *target, state)?;
                    if seen_refs.insert(counterpart) {
                        merged.push(Value::Ref(counterpart));
                    }
                }
                Value::List(_) => return Err(shape_err()),
                scalar => {
                    if !merged.contains(scalar) {
                        merged.push(scalar.clone());
                    }
                }
            }
        }
        // Receiver leftovers: anything the donor has no placement for.
        for item in r_items {
            match item {
                Value::Ref(id) => {
                    if !state.claimed.contains(id) && seen_refs.insert(*id) {
                        merged.push(Value::Ref(*id));
                    }
                }
                Value::List(_) => return Err(shape_err()),
                scalar => {
                    if !merged.contains(scalar) {
                        merged.push(scalar.clone());
                    }
                }
            }
        }
    } else {
        // Associations: receiver entries survive untouched, donor-only
        // entries append after them in donor-relative order.
        for item in r_items {
            match item {
                Value::Ref(id) => {
                    seen_refs.insert(*id);
                    merged.push(item.clone());
                }
                Value::List(_) => return Err(shape_err()),
                scalar => merged.push(scalar.clone()),
            }
        }
        for item in d_items {
            match item {
                Value::Ref(target) => {
                    let counterpart = resolve_target(donor, receiver, *target, state)?;
                    if seen_refs.insert(counterpart) {
                        merged.push(Value::Ref(counterpart));
                    }
                }
                Value::List(_) => return Err(shape_err()),
                scalar => {
                    if !merged.contains(scalar) {
                        merged.push(scalar.clone());
                    }
                }
            }
        }
    }

    Ok(merged)
}

/// The receiver counterpart of a donor node: its match when one exists,
/// otherwise a fresh deep copy of its subtree.
fn resolve_target(
    donor: &ProjectGraph,
    receiver: &mut ProjectGraph,
    target: NodeId,
    state: &mut MergeState,
) -> MergeResult<NodeId> {
    if let Some(&mapped) = state.map.get(&target) {
        return Ok(mapped);
    }
    clone_subtree(donor, receiver, target, state)
}

/// Deep-copy an unmatched donor subtree into the receiver.
///
/// Leaf entities (overwrite-bin kinds) that already have a receiver
/// counterpart are reused, so a copied reference to a matched file lands
/// on the existing receiver node instead of a duplicate. Container kinds
/// inside the subtree are always copied fresh: a donor-only target must
/// own its own build phases and configuration lists even when their weak
/// identity keys collide with another target's elsewhere in the graph.
/// Every copy is recorded in the match map (and claimed), and starts with
/// `archive_id`/`version` cleared like any freshly-created node.
fn clone_subtree(
    donor: &ProjectGraph,
    receiver: &mut ProjectGraph,
    root: NodeId,
    state: &mut MergeState,
) -> MergeResult<NodeId> {
    let mut discovered = Vec::new();
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(root);
    queue.push_back(root);

    while let Some(id) = queue.pop_front() {
        discovered.push(id);
        let node = donor.expect_node(id)?;
        let mut targets = Vec::new();
        for value in node.attributes.values() {
            collect_refs(value, &mut targets);
        }
        for target in targets {
            let is_leaf =
                merge_policy(donor.expect_node(target)?.kind) == Some(MergePolicy::Overwrite);
            if is_leaf && state.map.contains_key(&target) {
                continue; // reuse the matched receiver counterpart
            }
            if visited.insert(target) {
                queue.push_back(target);
            }
        }
    }

    for id in &discovered {
        let copy = receiver.insert(Node::new(donor.expect_node(*id)?.kind));
        // Overwrites any weak-key match a copied container had elsewhere.
        state.map.insert(*id, copy);
        state.claimed.insert(copy);
    }

    for id in &discovered {
        let source = donor.expect_node(*id)?;
        let mut attributes = source.attributes.clone();
        for value in attributes.values_mut() {
            remap_value(value, &state.map)?;
        }
        receiver.expect_node_mut(state.map[id])?.attributes = attributes;
    }

    debug!(nodes = discovered.len(), "cloned donor subtree");
    Ok(state.map[&root])
}

fn collect_refs(value: &Value, targets: &mut Vec<NodeId>) {
    match value {
        Value::Ref(target) => targets.push(*target),
        Value::List(items) => {
            for item in items {
                collect_refs(item, targets);
            }
        }
        _ => {}
    }
}

fn remap_value(value: &mut Value, map: &XrefMap) -> MergeResult<()> {
    match value {
        Value::Ref(target) => {
            *target = *map
                .get(target)
                .ok_or(pbx_graph::GraphError::DanglingReference(*target))?;
        }
        Value::List(items) => {
            for item in items {
                remap_value(item, map)?;
            }
        }
        _ => {}
    }
    Ok(())
}
