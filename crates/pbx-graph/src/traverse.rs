//! Cycle-safe traversal and derived file placement.
//!
//! All traversal entry points use an explicit visited set and an explicit
//! FIFO work queue, never recursion, so cycles and shared sub-structure
//! cannot overflow the stack, every reachable node is handled exactly once,
//! and pruning decisions apply deterministically. Attribute edges iterate
//! in sorted key order.

use std::collections::{HashSet, VecDeque};

use crate::error::{GraphError, GraphResult};
use crate::graph::ProjectGraph;
use crate::node::{Kind, NodeId, Value};

impl ProjectGraph {
    /// Every node reachable from the root, in deterministic traversal
    /// order (FIFO over sorted attribute keys, then sequence order).
    pub fn reachable_ids(&self) -> GraphResult<Vec<NodeId>> {
        let mut order = Vec::new();
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();

        visited.insert(self.root());
        queue.push_back(self.root());

        while let Some(id) = queue.pop_front() {
            order.push(id);
            let node = self.expect_node(id)?;
            for value in node.attributes.values() {
                enqueue_references(value, &mut visited, &mut queue);
            }
        }

        Ok(order)
    }

    /// Visit every distinct reachable node at most once, invoking
    /// `callback` for each attribute edge (node -> scalar, node ->
    /// reference, node -> sequence element).
    ///
    /// The callback receives the graph (free to mutate it in place: the
    /// visited node's attributes are snapshotted before dispatch), the node
    /// owning the edge, the node's discovering parent, the attribute key,
    /// and the edge value. Returning `true` continues descent into that
    /// value's children; `false` prunes the subtree. Deduplication is by
    /// node id, not by structural key.
    pub fn visit_once<F>(&mut self, mut callback: F) -> GraphResult<()>
    where
        F: FnMut(&mut ProjectGraph, NodeId, Option<NodeId>, &str, &Value) -> bool,
    {
        let mut visited = HashSet::new();
        let mut queue: VecDeque<(NodeId, Option<NodeId>)> = VecDeque::new();

        visited.insert(self.root());
        queue.push_back((self.root(), None));

        while let Some((id, parent)) = queue.pop_front() {
            // Snapshot the attribute edges so the callback may mutate the
            // node without invalidating this iteration.
            let edges: Vec<(String, Value)> = self
                .expect_node(id)?
                .attributes
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect();

            for (key, value) in &edges {
                match value {
                    Value::List(items) => {
                        for item in items {
                            let descend = callback(self, id, parent, key, item);
                            if descend {
                                if let Value::Ref(target) = item {
                                    if visited.insert(*target) {
                                        queue.push_back((*target, Some(id)));
                                    }
                                }
                            }
                        }
                    }
                    Value::Ref(target) => {
                        let descend = callback(self, id, parent, key, value);
                        if descend && visited.insert(*target) {
                            queue.push_back((*target, Some(id)));
                        }
                    }
                    scalar => {
                        callback(self, id, parent, key, scalar);
                    }
                }
            }
        }

        Ok(())
    }

    /// Resolve the project-relative placement of every file reference
    /// reachable through the group tree, in traversal order.
    ///
    /// A file's path is the concatenation of path-contributing ancestor
    /// group segments with the leaf's own `path` attribute. Placement is
    /// recomputed fresh on every call: merge mutates the graph in place,
    /// so cached placements would go stale. When shared structure makes a
    /// node reachable via two group paths, the first traversal path wins.
    pub fn all_files(&self) -> GraphResult<Vec<(String, NodeId)>> {
        let Some(main_group) = self.attr(self.root(), "mainGroup").and_then(Value::as_reference)
        else {
            return Ok(Vec::new());
        };

        let mut files = Vec::new();
        let mut visited = HashSet::new();
        let mut queue: VecDeque<(NodeId, String)> = VecDeque::new();

        let seed_prefix = self
            .expect_node(main_group)?
            .text_attr("path")
            .unwrap_or_default()
            .to_string();
        visited.insert(main_group);
        queue.push_back((main_group, seed_prefix));

        while let Some((group_id, prefix)) = queue.pop_front() {
            let group = self.expect_node(group_id)?;
            let Some(children) = group.attr("children") else {
                continue;
            };
            let Value::List(children) = children else {
                return Err(GraphError::UnexpectedShape {
                    node: group_id,
                    attribute: "children".into(),
                });
            };

            for child in children {
                let Value::Ref(child_id) = child else {
                    return Err(GraphError::UnexpectedShape {
                        node: group_id,
                        attribute: "children".into(),
                    });
                };
                if !visited.insert(*child_id) {
                    continue;
                }
                let child_node = self.expect_node(*child_id)?;
                match child_node.kind {
                    Kind::Group => {
                        let child_prefix = match child_node.text_attr("path") {
                            Some(segment) => join_segments(&prefix, segment),
                            None => prefix.clone(),
                        };
                        queue.push_back((*child_id, child_prefix));
                    }
                    Kind::FileReference => {
                        if let Some(leaf) = child_node.text_attr("path") {
                            files.push((join_segments(&prefix, leaf), *child_id));
                        }
                    }
                    // Only groups and file references carry placement.
                    _ => {}
                }
            }
        }

        Ok(files)
    }
}

fn enqueue_references(value: &Value, visited: &mut HashSet<NodeId>, queue: &mut VecDeque<NodeId>) {
    match value {
        Value::Ref(target) => {
            if visited.insert(*target) {
                queue.push_back(*target);
            }
        }
        Value::List(items) => {
            for item in items {
                enqueue_references(item, visited, queue);
            }
        }
        _ => {}
    }
}

fn join_segments(prefix: &str, leaf: &str) -> String {
    if prefix.is_empty() {
        leaf.to_string()
    } else {
        format!("{prefix}/{leaf}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    /// TestApp-shaped fixture: two files under `Classes/`, one at top level,
    /// and a target whose build phase references one of them.
    fn sample_project() -> ProjectGraph {
        let mut graph = ProjectGraph::new("fixtures/TestApp");

        let delegate_h = graph.insert(Node::new(Kind::FileReference).with_attr("path", "AppDelegate.h"));
        let delegate_m = graph.insert(Node::new(Kind::FileReference).with_attr("path", "AppDelegate.m"));
        let main_m = graph.insert(Node::new(Kind::FileReference).with_attr("path", "main.m"));

        let classes = graph.insert(
            Node::new(Kind::Group)
                .with_attr("name", "Classes")
                .with_attr("path", "Classes")
                .with_attr(
                    "children",
                    Value::List(vec![Value::Ref(delegate_h), Value::Ref(delegate_m)]),
                ),
        );
        let main_group = graph.insert(Node::new(Kind::Group).with_attr(
            "children",
            Value::List(vec![Value::Ref(classes), Value::Ref(main_m)]),
        ));

        let build_file = graph.insert(Node::new(Kind::BuildFile).with_attr("fileRef", delegate_m));
        let phase = graph.insert(
            Node::new(Kind::BuildPhase)
                .with_attr("name", "Sources")
                .with_attr("files", Value::List(vec![Value::Ref(build_file)])),
        );
        let target = graph.insert(
            Node::new(Kind::Target)
                .with_attr("name", "TestApp")
                .with_attr("buildPhases", Value::List(vec![Value::Ref(phase)])),
        );

        let root = graph.root();
        graph.set_attr(root, "mainGroup", main_group).unwrap();
        graph
            .set_attr(root, "targets", Value::List(vec![Value::Ref(target)]))
            .unwrap();
        graph
    }

    #[test]
    fn reachable_ids_visits_each_node_once() {
        let graph = sample_project();
        let order = graph.reachable_ids().unwrap();
        assert_eq!(order.len(), graph.len());
        let distinct: HashSet<NodeId> = order.iter().copied().collect();
        assert_eq!(distinct.len(), order.len());
        assert_eq!(order[0], graph.root());
    }

    #[test]
    fn reachable_ids_is_deterministic() {
        let graph = sample_project();
        assert_eq!(graph.reachable_ids().unwrap(), graph.reachable_ids().unwrap());
    }

    #[test]
    fn visit_once_handles_cycles() {
        let mut graph = ProjectGraph::new("fixtures/App");
        let group = graph.insert(Node::new(Kind::Group).with_attr("name", "Loop"));
        let root = graph.root();
        graph.set_attr(root, "mainGroup", group).unwrap();
        graph.set_attr(group, "project", root).unwrap();

        let mut seen = Vec::new();
        graph
            .visit_once(|_, node, _, _, _| {
                seen.push(node);
                true
            })
            .unwrap();

        // Both nodes dispatch edges; neither repeats.
        let distinct: HashSet<NodeId> = seen.iter().copied().collect();
        assert_eq!(distinct.len(), 2);
    }

    #[test]
    fn visit_once_dispatches_every_edge_kind() {
        let mut graph = sample_project();
        let mut scalar_edges = 0usize;
        let mut reference_edges = 0usize;
        graph
            .visit_once(|_, _, _, _, value| {
                match value {
                    Value::Ref(_) => reference_edges += 1,
                    _ if value.is_scalar() => scalar_edges += 1,
                    _ => {}
                }
                true
            })
            .unwrap();

        // Scalars: 3 file paths, group name+path, phase name, target name.
        assert_eq!(scalar_edges, 7);
        // References: mainGroup + targets entry, 2 main-group children,
        // 2 classes children, 1 phase, 1 build file, 1 fileRef.
        assert_eq!(reference_edges, 9);
    }

    #[test]
    fn visit_once_honors_pruning() {
        let mut graph = sample_project();
        let mut saw_build_file = false;
        graph
            .visit_once(|g, _, _, key, value| {
                if let Value::Ref(target) = value {
                    if g.node(*target).map(|n| n.kind) == Some(Kind::BuildPhase) {
                        return false; // prune the phase subtree
                    }
                    if g.node(*target).map(|n| n.kind) == Some(Kind::BuildFile) {
                        saw_build_file = true;
                    }
                }
                let _ = key;
                true
            })
            .unwrap();
        assert!(!saw_build_file, "pruned subtree was descended into");
    }

    #[test]
    fn visit_once_allows_in_place_mutation() {
        let mut graph = sample_project();
        graph
            .visit_once(|g, node, _, _, _| {
                if let Some(n) = g.node_mut(node) {
                    n.version = None;
                    n.archive_id = None;
                }
                true
            })
            .unwrap();
    }

    #[test]
    fn all_files_resolves_nested_paths() {
        let graph = sample_project();
        let files: Vec<String> = graph
            .all_files()
            .unwrap()
            .into_iter()
            .map(|(path, _)| path)
            .collect();
        assert_eq!(
            files,
            vec![
                "main.m".to_string(),
                "Classes/AppDelegate.h".to_string(),
                "Classes/AppDelegate.m".to_string(),
            ]
        );
    }

    #[test]
    fn all_files_reflects_mutation_without_caching() {
        let mut graph = sample_project();
        let (_, delegate_h) = graph.all_files().unwrap()[1].clone();
        graph.set_attr(delegate_h, "path", "Delegate.h").unwrap();

        let files: Vec<String> = graph
            .all_files()
            .unwrap()
            .into_iter()
            .map(|(path, _)| path)
            .collect();
        assert!(files.contains(&"Classes/Delegate.h".to_string()));
    }

    #[test]
    fn all_files_ignores_non_group_membership() {
        let mut graph = sample_project();
        // A file referenced only by a build phase has no placement.
        let orphan = graph.insert(Node::new(Kind::FileReference).with_attr("path", "Orphan.m"));
        let build_file = graph.insert(Node::new(Kind::BuildFile).with_attr("fileRef", orphan));
        let root = graph.root();
        graph
            .set_attr(root, "looseFiles", Value::List(vec![Value::Ref(build_file)]))
            .unwrap();

        let files: Vec<String> = graph
            .all_files()
            .unwrap()
            .into_iter()
            .map(|(path, _)| path)
            .collect();
        assert!(!files.iter().any(|p| p.contains("Orphan")));
    }

    #[test]
    fn all_files_first_path_wins_for_shared_nodes() {
        let mut graph = ProjectGraph::new("fixtures/App");
        let shared = graph.insert(Node::new(Kind::FileReference).with_attr("path", "Shared.m"));
        let nested = graph.insert(
            Node::new(Kind::Group)
                .with_attr("path", "Deep")
                .with_attr("children", Value::List(vec![Value::Ref(shared)])),
        );
        let main_group = graph.insert(Node::new(Kind::Group).with_attr(
            "children",
            Value::List(vec![Value::Ref(shared), Value::Ref(nested)]),
        ));
        let root = graph.root();
        graph.set_attr(root, "mainGroup", main_group).unwrap();

        let files = graph.all_files().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].0, "Shared.m");
    }

    #[test]
    fn all_files_empty_without_main_group() {
        let graph = ProjectGraph::new("fixtures/App");
        assert!(graph.all_files().unwrap().is_empty());
    }

    #[test]
    fn malformed_children_is_fatal() {
        let mut graph = ProjectGraph::new("fixtures/App");
        let group = graph.insert(Node::new(Kind::Group).with_attr("children", "not-a-list"));
        let root = graph.root();
        graph.set_attr(root, "mainGroup", group).unwrap();

        assert!(matches!(
            graph.all_files(),
            Err(GraphError::UnexpectedShape { .. })
        ));
    }
}
