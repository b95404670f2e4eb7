use std::collections::BTreeMap;
use std::fmt;

/// Handle identifying one node within its owning [`ProjectGraph`].
///
/// A `NodeId` is only meaningful relative to the graph that allocated it.
/// Instance identity for traversal and deduplication purposes is the
/// `(graph, NodeId)` pair; ids are never shared between graphs.
///
/// [`ProjectGraph`]: crate::ProjectGraph
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u64);

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// The closed set of node kinds mirroring the project schema.
///
/// Keeping this a closed enum makes an unrecognized kind unrepresentable
/// after loading and gives exhaustiveness checks on every per-kind dispatch
/// (identity keys, merge-policy classification).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    /// The graph root: one per project.
    Project,
    /// A folder in the project's logical file hierarchy.
    Group,
    /// A buildable target (app, library, test bundle).
    Target,
    /// A reference to a file on disk.
    FileReference,
    /// One phase of a target's build (sources, frameworks, resources).
    BuildPhase,
    /// The membership record tying a file reference into a build phase.
    BuildFile,
    /// The list of build configurations attached to a project or target.
    ConfigurationList,
    /// A named bag of build settings.
    Configuration,
}

impl Kind {
    /// The persisted-format type tag for this kind.
    pub fn isa(&self) -> &'static str {
        match self {
            Kind::Project => "PBXProject",
            Kind::Group => "PBXGroup",
            Kind::Target => "PBXNativeTarget",
            Kind::FileReference => "PBXFileReference",
            Kind::BuildPhase => "PBXBuildPhase",
            Kind::BuildFile => "PBXBuildFile",
            Kind::ConfigurationList => "XCConfigurationList",
            Kind::Configuration => "XCBuildConfiguration",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.isa())
    }
}

/// One attribute value: a scalar, a reference to another node in the same
/// graph, or an ordered sequence of values.
///
/// A node exclusively owns the values in its own attribute map. A `Ref` is
/// a non-owning relation; the graph owns the target node.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// String scalar.
    Text(String),
    /// Integer scalar.
    Int(i64),
    /// Boolean scalar.
    Bool(bool),
    /// Reference to another node in the same graph.
    Ref(NodeId),
    /// Ordered sequence of values.
    List(Vec<Value>),
}

impl Value {
    /// The string content, if this is a `Text` scalar.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The referenced node, if this is a `Ref`.
    pub fn as_reference(&self) -> Option<NodeId> {
        match self {
            Value::Ref(id) => Some(*id),
            _ => None,
        }
    }

    /// The elements, if this is a `List`.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns `true` for `Text`, `Int`, and `Bool`.
    pub fn is_scalar(&self) -> bool {
        matches!(self, Value::Text(_) | Value::Int(_) | Value::Bool(_))
    }

    /// Returns `true` if this value is a reference or a sequence holding
    /// one anywhere inside it.
    pub fn contains_reference(&self) -> bool {
        match self {
            Value::Ref(_) => true,
            Value::List(items) => items.iter().any(Value::contains_reference),
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<NodeId> for Value {
    fn from(id: NodeId) -> Self {
        Value::Ref(id)
    }
}

/// One object in a project description graph.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    /// The node's schema kind.
    pub kind: Kind,
    /// Attribute bag, keyed by attribute name. Sorted keys give every
    /// traversal a deterministic edge order.
    pub attributes: BTreeMap<String, Value>,
    /// Stable serialization-time id. Assigned only during canonical
    /// archival; absent on freshly-loaded or freshly-cloned nodes.
    pub archive_id: Option<String>,
    /// Schema-version marker, independent of `archive_id`.
    pub version: Option<u32>,
}

impl Node {
    /// Create a node of the given kind with an empty attribute bag.
    pub fn new(kind: Kind) -> Self {
        Self {
            kind,
            attributes: BTreeMap::new(),
            archive_id: None,
            version: None,
        }
    }

    /// Builder-style attribute assignment.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Look up an attribute value.
    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Look up a `Text` attribute's content.
    pub fn text_attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_text)
    }

    /// Set an attribute value, replacing any previous one.
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attr(&mut self, key: &str) -> Option<Value> {
        self.attributes.remove(key)
    }
}
