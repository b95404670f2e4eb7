//! Graph storage: node ownership, attribute access, structural cloning.
//!
//! A [`ProjectGraph`] owns every node reachable from its single
//! `Project`-kind root. The graph is directed and may contain cycles and
//! shared sub-structure; all traversal entry points deduplicate by
//! [`NodeId`] so each reachable node is handled exactly once.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{GraphError, GraphResult};
use crate::node::{Kind, Node, NodeId, Value};

/// A project description graph rooted at exactly one `Project` node.
///
/// Owns all of its nodes; a [`Value::Ref`] inside an attribute is a
/// non-owning relation into this same graph. The graph also remembers the
/// on-disk directory it was loaded from, which the file-operation planner
/// uses to build absolute paths.
#[derive(Clone, Debug)]
pub struct ProjectGraph {
    nodes: HashMap<NodeId, Node>,
    root: NodeId,
    base_dir: PathBuf,
    next_id: u64,
}

impl ProjectGraph {
    /// Create a graph containing only a fresh `Project` root, anchored at
    /// the given on-disk directory.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let root = NodeId(0);
        let mut nodes = HashMap::new();
        nodes.insert(root, Node::new(Kind::Project));
        Self {
            nodes,
            root,
            base_dir: base_dir.into(),
            next_id: 1,
        }
    }

    /// The root node's id.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The on-disk directory this project was loaded from.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Number of nodes owned by the graph (including unreachable ones).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the graph owns no nodes. A freshly-created graph
    /// always owns its root, so this is only true for corrupted state.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns `true` if `id` belongs to this graph.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    // ---------------------------------------------------------------
    // Node access
    // ---------------------------------------------------------------

    /// Insert a node, returning its freshly-allocated id.
    pub fn insert(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        debug!(node = %id, kind = %node.kind, "inserted node");
        self.nodes.insert(id, node);
        id
    }

    /// Look up a node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Look up a node mutably by id.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Look up a node, treating absence as a dangling reference.
    pub fn expect_node(&self, id: NodeId) -> GraphResult<&Node> {
        self.nodes.get(&id).ok_or(GraphError::DanglingReference(id))
    }

    /// Look up a node mutably, treating absence as a dangling reference.
    pub fn expect_node_mut(&mut self, id: NodeId) -> GraphResult<&mut Node> {
        self.nodes
            .get_mut(&id)
            .ok_or(GraphError::DanglingReference(id))
    }

    /// Look up an attribute value on a node.
    pub fn attr(&self, id: NodeId, key: &str) -> Option<&Value> {
        self.nodes.get(&id).and_then(|node| node.attr(key))
    }

    /// Set an attribute on a node.
    pub fn set_attr(
        &mut self,
        id: NodeId,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> GraphResult<()> {
        self.expect_node_mut(id)?.set_attr(key, value);
        Ok(())
    }

    // ---------------------------------------------------------------
    // Structural clone
    // ---------------------------------------------------------------

    /// Build an identity-stripped copy of this graph.
    ///
    /// The clone owns fresh nodes with fresh ids, copied attribute
    /// structure and values, preserved sharing and cycles, and
    /// `archive_id`/`version` nulled on every node. Nodes unreachable from
    /// the root are not carried over. This is a factory for self-merge
    /// equivalence testing; the production merge path never calls it.
    pub fn structural_clone(&self) -> GraphResult<ProjectGraph> {
        let order = self.reachable_ids()?;

        // First pass: allocate fresh ids in traversal order.
        let mut remap: HashMap<NodeId, NodeId> = HashMap::new();
        for (index, old_id) in order.iter().enumerate() {
            remap.insert(*old_id, NodeId(index as u64));
        }

        // Second pass: copy nodes, rewriting references through the map.
        let mut nodes = HashMap::new();
        for old_id in &order {
            let source = self.expect_node(*old_id)?;
            let mut copy = Node::new(source.kind);
            for (key, value) in &source.attributes {
                copy.attributes
                    .insert(key.clone(), remap_value(value, &remap)?);
            }
            nodes.insert(remap[old_id], copy);
        }

        Ok(ProjectGraph {
            nodes,
            root: remap[&self.root],
            base_dir: self.base_dir.clone(),
            next_id: order.len() as u64,
        })
    }
}

fn remap_value(value: &Value, remap: &HashMap<NodeId, NodeId>) -> GraphResult<Value> {
    match value {
        Value::Ref(target) => remap
            .get(target)
            .map(|mapped| Value::Ref(*mapped))
            .ok_or(GraphError::DanglingReference(*target)),
        Value::List(items) => {
            let mapped = items
                .iter()
                .map(|item| remap_value(item, remap))
                .collect::<GraphResult<Vec<_>>>()?;
            Ok(Value::List(mapped))
        }
        scalar => Ok(scalar.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Project with a main group holding one file and one subgroup that
    /// both reference the same shared file node.
    fn shared_file_graph() -> ProjectGraph {
        let mut graph = ProjectGraph::new("fixtures/App");
        let shared = graph.insert(Node::new(Kind::FileReference).with_attr("path", "Shared.m"));
        let sub = graph.insert(
            Node::new(Kind::Group)
                .with_attr("name", "Sub")
                .with_attr("children", Value::List(vec![Value::Ref(shared)])),
        );
        let main_group = graph.insert(Node::new(Kind::Group).with_attr(
            "children",
            Value::List(vec![Value::Ref(shared), Value::Ref(sub)]),
        ));
        let root = graph.root();
        graph.set_attr(root, "mainGroup", main_group).unwrap();
        graph
    }

    #[test]
    fn new_graph_owns_a_project_root() {
        let graph = ProjectGraph::new("fixtures/App");
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.node(graph.root()).unwrap().kind, Kind::Project);
        assert_eq!(graph.base_dir(), Path::new("fixtures/App"));
    }

    #[test]
    fn insert_allocates_distinct_ids() {
        let mut graph = ProjectGraph::new("fixtures/App");
        let a = graph.insert(Node::new(Kind::Group));
        let b = graph.insert(Node::new(Kind::Group));
        assert_ne!(a, b);
        assert!(graph.contains(a));
        assert!(graph.contains(b));
    }

    #[test]
    fn expect_node_reports_dangling_ids() {
        let graph = ProjectGraph::new("fixtures/App");
        let missing = NodeId(99);
        assert!(matches!(
            graph.expect_node(missing),
            Err(GraphError::DanglingReference(id)) if id == missing
        ));
    }

    #[test]
    fn set_attr_mutates_in_place() {
        let mut graph = ProjectGraph::new("fixtures/App");
        let root = graph.root();
        graph.set_attr(root, "name", "App").unwrap();
        assert_eq!(graph.node(root).unwrap().text_attr("name"), Some("App"));
    }

    #[test]
    fn clone_copies_structure_with_fresh_identity() {
        let graph = shared_file_graph();
        let clone = graph.structural_clone().unwrap();

        assert_eq!(clone.len(), 4);
        assert_eq!(clone.node(clone.root()).unwrap().kind, Kind::Project);
        assert_eq!(clone.base_dir(), graph.base_dir());
    }

    #[test]
    fn clone_preserves_shared_substructure() {
        let graph = shared_file_graph();
        let clone = graph.structural_clone().unwrap();

        let main_group = clone
            .attr(clone.root(), "mainGroup")
            .and_then(Value::as_reference)
            .unwrap();
        let children = clone.attr(main_group, "children").unwrap().as_list().unwrap();
        let direct_file = children[0].as_reference().unwrap();
        let sub = children[1].as_reference().unwrap();
        let sub_children = clone.attr(sub, "children").unwrap().as_list().unwrap();
        let nested_file = sub_children[0].as_reference().unwrap();

        // Both paths still land on the one shared node.
        assert_eq!(direct_file, nested_file);
    }

    #[test]
    fn clone_nulls_identity_metadata() {
        let mut graph = shared_file_graph();
        let root = graph.root();
        graph.node_mut(root).unwrap().archive_id = Some("AAAA".into());
        graph.node_mut(root).unwrap().version = Some(3);

        let clone = graph.structural_clone().unwrap();
        let cloned_root = clone.node(clone.root()).unwrap();
        assert!(cloned_root.archive_id.is_none());
        assert!(cloned_root.version.is_none());
    }

    #[test]
    fn clone_survives_cycles() {
        let mut graph = ProjectGraph::new("fixtures/App");
        let group = graph.insert(Node::new(Kind::Group).with_attr("name", "Loop"));
        let root = graph.root();
        graph.set_attr(root, "mainGroup", group).unwrap();
        // Back-edge from the group to the root.
        graph.set_attr(group, "project", root).unwrap();

        let clone = graph.structural_clone().unwrap();
        assert_eq!(clone.len(), 2);
        let cloned_group = clone
            .attr(clone.root(), "mainGroup")
            .and_then(Value::as_reference)
            .unwrap();
        assert_eq!(
            clone.attr(cloned_group, "project").and_then(Value::as_reference),
            Some(clone.root())
        );
    }

    #[test]
    fn clone_drops_unreachable_nodes() {
        let mut graph = shared_file_graph();
        graph.insert(Node::new(Kind::Configuration).with_attr("name", "Orphan"));
        assert_eq!(graph.len(), 5);

        let clone = graph.structural_clone().unwrap();
        assert_eq!(clone.len(), 4);
    }
}
