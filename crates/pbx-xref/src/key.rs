//! Structural identity keys.
//!
//! Two nodes with equal keys describe the same logical entity (same file,
//! same target) regardless of instance identity or graph membership. Keys
//! are built from a node's kind plus a fixed per-kind subset of identifying
//! attributes, deliberately excluding `archive_id`, `version`, and anything
//! that would drag the whole subtree into the key.

use pbx_graph::{Kind, NodeId, ProjectGraph, Value};

use crate::error::{XrefError, XrefResult};

/// The fixed set of identifying attributes for each kind.
///
/// The only reference-valued entry is `BuildFile.fileRef`: a build-file
/// membership record has no identity of its own beyond the file it pulls
/// in, so its key nests the referenced node's key (one bounded hop).
pub fn identifying_attrs(kind: Kind) -> &'static [&'static str] {
    match kind {
        Kind::Project => &[],
        Kind::Group => &["name", "path"],
        Kind::Target => &["name"],
        Kind::FileReference => &["path"],
        Kind::BuildPhase => &["name"],
        Kind::BuildFile => &["fileRef"],
        // Disambiguated purely by container position; see the matcher.
        Kind::ConfigurationList => &[],
        Kind::Configuration => &["name"],
    }
}

/// One component of an identity key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyPart {
    /// String identifying attribute.
    Text(String),
    /// Integer identifying attribute.
    Int(i64),
    /// Boolean identifying attribute.
    Bool(bool),
    /// The attribute is not defined on the node.
    Missing,
    /// The key of a referenced node (`BuildFile.fileRef`).
    Nested(Box<XrefKey>),
}

/// Structural identity key: kind plus identifying attribute values in
/// table order.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct XrefKey {
    /// The node's kind.
    pub kind: Kind,
    /// Identifying attribute values, ordered as in [`identifying_attrs`].
    pub parts: Vec<KeyPart>,
}

/// Compute the identity key of a node.
pub fn xref_key(graph: &ProjectGraph, id: NodeId) -> XrefResult<XrefKey> {
    key_with_trail(graph, id, &mut Vec::new())
}

fn key_with_trail(
    graph: &ProjectGraph,
    id: NodeId,
    trail: &mut Vec<NodeId>,
) -> XrefResult<XrefKey> {
    if trail.contains(&id) {
        return Err(XrefError::CyclicIdentity(id));
    }
    trail.push(id);

    let node = graph.expect_node(id)?;
    let mut parts = Vec::new();
    for attribute in identifying_attrs(node.kind) {
        let part = match node.attr(attribute) {
            None => KeyPart::Missing,
            Some(Value::Text(s)) => KeyPart::Text(s.clone()),
            Some(Value::Int(n)) => KeyPart::Int(*n),
            Some(Value::Bool(b)) => KeyPart::Bool(*b),
            Some(Value::Ref(target)) => {
                KeyPart::Nested(Box::new(key_with_trail(graph, *target, trail)?))
            }
            Some(Value::List(_)) => {
                return Err(XrefError::InvalidKeyAttribute {
                    node: id,
                    attribute: (*attribute).to_string(),
                })
            }
        };
        parts.push(part);
    }

    trail.pop();
    Ok(XrefKey {
        kind: node.kind,
        parts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pbx_graph::Node;

    #[test]
    fn file_reference_keyed_by_path() {
        let mut graph = ProjectGraph::new("fixtures/App");
        let a = graph.insert(Node::new(Kind::FileReference).with_attr("path", "main.m"));
        let b = graph.insert(Node::new(Kind::FileReference).with_attr("path", "main.m"));
        let c = graph.insert(Node::new(Kind::FileReference).with_attr("path", "other.m"));

        assert_eq!(xref_key(&graph, a).unwrap(), xref_key(&graph, b).unwrap());
        assert_ne!(xref_key(&graph, a).unwrap(), xref_key(&graph, c).unwrap());
    }

    #[test]
    fn kind_participates_in_the_key() {
        let mut graph = ProjectGraph::new("fixtures/App");
        let group = graph.insert(Node::new(Kind::Group).with_attr("name", "Sources"));
        let phase = graph.insert(Node::new(Kind::BuildPhase).with_attr("name", "Sources"));

        assert_ne!(
            xref_key(&graph, group).unwrap(),
            xref_key(&graph, phase).unwrap()
        );
    }

    #[test]
    fn missing_attributes_key_as_missing() {
        let mut graph = ProjectGraph::new("fixtures/App");
        let named = graph.insert(Node::new(Kind::Group).with_attr("name", "Classes"));
        let pathed = graph.insert(
            Node::new(Kind::Group)
                .with_attr("name", "Classes")
                .with_attr("path", "Classes"),
        );

        let named_key = xref_key(&graph, named).unwrap();
        assert_eq!(named_key.parts[1], KeyPart::Missing);
        assert_ne!(named_key, xref_key(&graph, pathed).unwrap());
    }

    #[test]
    fn build_file_key_nests_the_referenced_file() {
        let mut graph = ProjectGraph::new("fixtures/App");
        let file = graph.insert(Node::new(Kind::FileReference).with_attr("path", "main.m"));
        let other = graph.insert(Node::new(Kind::FileReference).with_attr("path", "other.m"));
        let bf_main = graph.insert(Node::new(Kind::BuildFile).with_attr("fileRef", file));
        let bf_main_again = graph.insert(Node::new(Kind::BuildFile).with_attr("fileRef", file));
        let bf_other = graph.insert(Node::new(Kind::BuildFile).with_attr("fileRef", other));

        assert_eq!(
            xref_key(&graph, bf_main).unwrap(),
            xref_key(&graph, bf_main_again).unwrap()
        );
        assert_ne!(
            xref_key(&graph, bf_main).unwrap(),
            xref_key(&graph, bf_other).unwrap()
        );
    }

    #[test]
    fn identity_metadata_is_excluded() {
        let mut graph = ProjectGraph::new("fixtures/App");
        let plain = graph.insert(Node::new(Kind::Target).with_attr("name", "App"));
        let decorated = graph.insert(Node::new(Kind::Target).with_attr("name", "App"));
        graph.node_mut(decorated).unwrap().archive_id = Some("ABCD".into());
        graph.node_mut(decorated).unwrap().version = Some(46);

        assert_eq!(
            xref_key(&graph, plain).unwrap(),
            xref_key(&graph, decorated).unwrap()
        );
    }

    #[test]
    fn cyclic_identity_attributes_are_fatal() {
        let mut graph = ProjectGraph::new("fixtures/App");
        let a = graph.insert(Node::new(Kind::BuildFile));
        let b = graph.insert(Node::new(Kind::BuildFile).with_attr("fileRef", a));
        graph.set_attr(a, "fileRef", b).unwrap();

        assert!(matches!(
            xref_key(&graph, a),
            Err(XrefError::CyclicIdentity(_))
        ));
    }

    #[test]
    fn sequence_valued_identity_attribute_is_fatal() {
        let mut graph = ProjectGraph::new("fixtures/App");
        let node = graph.insert(
            Node::new(Kind::Target).with_attr("name", Value::List(vec![Value::from("App")])),
        );

        assert!(matches!(
            xref_key(&graph, node),
            Err(XrefError::InvalidKeyAttribute { .. })
        ));
    }
}
