//! Schema Graph
//!
//! Primary data structure: shapes (records, unions, enums, collections,
//! primitives, operations, services) keyed by [`ShapeId`], with a petgraph
//! edge index for structural queries. Edges are derived from the shapes
//! themselves, so the index can never disagree with the node data.
//!
//! The graph arrives already validated. Construction still rejects duplicate
//! identifiers and dangling references because every later pass assumes
//! neither exists.

pub mod analysis;
pub mod closure;
pub mod normalize;
pub mod tags;

pub use analysis::{compute_scc_analysis, SccAnalysis, SccGroup};
pub use closure::{compute_equality_closure, ClosureReport};
pub use normalize::{normalize, NormalizeOptions, NormalizeReport};
pub use tags::{ErrorFault, Tag, TagSet};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, EdgeRef};
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::error::{CodegenError, Result};

// =============================================================================
// Shape Identifier
// =============================================================================

/// Stable shape identifier: `namespace#Name`, or `namespace#Name$member`
/// for a member edge.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShapeId {
    namespace: String,
    name: String,
    member: Option<String>,
}

impl ShapeId {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            member: None,
        }
    }

    /// Identifier of a member edge of this shape
    pub fn with_member(&self, member: impl Into<String>) -> Self {
        Self {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
            member: Some(member.into()),
        }
    }

    /// The containing shape of a member identifier (or itself)
    pub fn root(&self) -> Self {
        Self::new(self.namespace.clone(), self.name.clone())
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn member(&self) -> Option<&str> {
        self.member.as_deref()
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.namespace, self.name)?;
        if let Some(member) = &self.member {
            write!(f, "${}", member)?;
        }
        Ok(())
    }
}

impl FromStr for ShapeId {
    type Err = CodegenError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || CodegenError::InvalidShapeId(s.to_string());
        let (namespace, rest) = s.split_once('#').ok_or_else(invalid)?;
        let (name, member) = match rest.split_once('$') {
            Some((name, member)) => (name, Some(member)),
            None => (rest, None),
        };
        if namespace.is_empty() || name.is_empty() || member.is_some_and(str::is_empty) {
            return Err(invalid());
        }
        Ok(Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            member: member.map(str::to_string),
        })
    }
}

impl TryFrom<String> for ShapeId {
    type Error = CodegenError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ShapeId> for String {
    fn from(id: ShapeId) -> Self {
        id.to_string()
    }
}

// =============================================================================
// Shapes
// =============================================================================

/// Primitive shape kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrimitiveKind {
    String,
    Boolean,
    Byte,
    Short,
    Integer,
    Long,
    Float,
    Double,
    BigInteger,
    BigDecimal,
    Blob,
    Timestamp,
    Document,
}

impl PrimitiveKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Integer => "integer",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::BigInteger => "big-integer",
            Self::BigDecimal => "big-decimal",
            Self::Blob => "blob",
            Self::Timestamp => "timestamp",
            Self::Document => "document",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named edge from a record, union or collection to its target
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberShape {
    pub name: String,
    pub target: ShapeId,
    #[serde(default, skip_serializing_if = "TagSet::is_empty")]
    pub tags: TagSet,
}

impl MemberShape {
    pub fn new(name: impl Into<String>, target: ShapeId) -> Self {
        Self {
            name: name.into(),
            target,
            tags: TagSet::new(),
        }
    }

    pub fn tagged(mut self, tag: Tag) -> Self {
        self.tags.insert(tag);
        self
    }
}

/// One value of a closed enum
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumValue {
    /// Symbolic name
    pub name: String,
    /// Value on the wire
    pub value: String,
}

/// Shape kinds
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Shape {
    Primitive {
        kind: PrimitiveKind,
    },
    Record {
        #[serde(default)]
        members: Vec<MemberShape>,
    },
    Union {
        #[serde(default)]
        members: Vec<MemberShape>,
    },
    Enum {
        values: Vec<EnumValue>,
    },
    List {
        member: MemberShape,
    },
    Set {
        member: MemberShape,
    },
    Map {
        key: MemberShape,
        value: MemberShape,
    },
    Operation {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        input: Option<ShapeId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        output: Option<ShapeId>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        errors: Vec<ShapeId>,
    },
    Service {
        #[serde(default)]
        operations: Vec<ShapeId>,
    },
}

impl Shape {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Primitive { .. } => "primitive",
            Self::Record { .. } => "record",
            Self::Union { .. } => "union",
            Self::Enum { .. } => "enum",
            Self::List { .. } => "list",
            Self::Set { .. } => "set",
            Self::Map { .. } => "map",
            Self::Operation { .. } => "operation",
            Self::Service { .. } => "service",
        }
    }

    pub fn is_record(&self) -> bool {
        matches!(self, Self::Record { .. })
    }

    /// Record or union: shapes whose members are stored inline
    pub fn is_aggregate(&self) -> bool {
        matches!(self, Self::Record { .. } | Self::Union { .. })
    }

    /// Named members of a record or union
    pub fn members(&self) -> &[MemberShape] {
        match self {
            Self::Record { members } | Self::Union { members } => members,
            _ => &[],
        }
    }

    /// Every outgoing reference with its edge kind, in declaration order
    pub fn edges(&self) -> Vec<(EdgeKind, &ShapeId)> {
        match self {
            Self::Primitive { .. } | Self::Enum { .. } => Vec::new(),
            Self::Record { members } | Self::Union { members } => members
                .iter()
                .map(|m| (EdgeKind::Member, &m.target))
                .collect(),
            Self::List { member } | Self::Set { member } => vec![(EdgeKind::Element, &member.target)],
            Self::Map { key, value } => vec![
                (EdgeKind::MapKey, &key.target),
                (EdgeKind::MapValue, &value.target),
            ],
            Self::Operation { input, output, errors } => input
                .iter()
                .map(|t| (EdgeKind::Input, t))
                .chain(output.iter().map(|t| (EdgeKind::Output, t)))
                .chain(errors.iter().map(|t| (EdgeKind::Error, t)))
                .collect(),
            Self::Service { operations } => operations
                .iter()
                .map(|t| (EdgeKind::Operation, t))
                .collect(),
        }
    }
}

/// Types of edges in the schema graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Service → operation
    Operation,
    /// Operation → input record
    Input,
    /// Operation → output record
    Output,
    /// Operation → error record
    Error,
    /// Record/union → member target
    Member,
    /// List/set → element target
    Element,
    /// Map → key target
    MapKey,
    /// Map → value target
    MapValue,
}

/// A shape together with its identifier and node-level tags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaNode {
    pub id: ShapeId,
    #[serde(flatten)]
    pub shape: Shape,
    #[serde(default, skip_serializing_if = "TagSet::is_empty")]
    pub tags: TagSet,
}

impl SchemaNode {
    pub fn new(id: ShapeId, shape: Shape) -> Self {
        Self {
            id,
            shape,
            tags: TagSet::new(),
        }
    }

    pub fn tagged(mut self, tag: Tag) -> Self {
        self.tags.insert(tag);
        self
    }

    pub fn member(&self, name: &str) -> Option<&MemberShape> {
        self.shape.members().iter().find(|m| m.name == name)
    }
}

/// On-disk snapshot of a graph
#[derive(Debug, Serialize, Deserialize)]
struct GraphSnapshot {
    shapes: Vec<SchemaNode>,
}

// =============================================================================
// Schema Graph
// =============================================================================

/// The schema graph
#[derive(Debug, Clone, Default)]
pub struct SchemaGraph {
    /// Edge index over shape ids
    pub(crate) graph: DiGraph<ShapeId, EdgeKind>,

    /// Node data, ordered by id so every traversal is deterministic
    pub(crate) nodes: BTreeMap<ShapeId, SchemaNode>,

    /// Node index lookup: id -> NodeIndex
    pub(crate) node_indices: HashMap<ShapeId, NodeIndex>,
}

impl SchemaGraph {
    /// Build a graph from a complete set of nodes
    pub fn from_nodes(nodes: impl IntoIterator<Item = SchemaNode>) -> Result<Self> {
        let mut graph = Self::default();
        for node in nodes {
            graph.add_unlinked(node)?;
        }

        let ids: Vec<ShapeId> = graph.nodes.keys().cloned().collect();
        for id in &ids {
            graph.link(id)?;
        }
        Ok(graph)
    }

    /// Load a graph snapshot from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: GraphSnapshot = serde_json::from_str(json)?;
        Self::from_nodes(snapshot.shapes)
    }

    /// Save a graph snapshot as JSON (shapes in id order)
    pub fn to_json(&self) -> Result<String> {
        let snapshot = GraphSnapshot {
            shapes: self.nodes.values().cloned().collect(),
        };
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }

    /// SHA-256 over the canonical snapshot; equal graphs have equal fingerprints
    pub fn fingerprint(&self) -> Result<String> {
        let snapshot = GraphSnapshot {
            shapes: self.nodes.values().cloned().collect(),
        };
        let bytes = serde_json::to_vec(&snapshot)?;
        let digest = Sha256::digest(&bytes);
        Ok(digest.iter().map(|b| format!("{:02x}", b)).collect())
    }

    /// Append a node whose targets are already present
    pub fn insert(&mut self, node: SchemaNode) -> Result<()> {
        let id = node.id.clone();
        for (_, target) in node.shape.edges() {
            if !self.nodes.contains_key(target) && *target != id {
                return Err(CodegenError::DanglingReference {
                    from: id.clone(),
                    to: target.clone(),
                });
            }
        }
        self.add_unlinked(node)?;
        self.link(&id)
    }

    fn add_unlinked(&mut self, node: SchemaNode) -> Result<()> {
        if self.nodes.contains_key(&node.id) {
            return Err(CodegenError::DuplicateShape(node.id));
        }
        let idx = self.graph.add_node(node.id.clone());
        self.node_indices.insert(node.id.clone(), idx);
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    fn link(&mut self, id: &ShapeId) -> Result<()> {
        let node = self.get_required(id)?;
        let from = self.node_indices[id];
        let mut edges = Vec::new();
        for (kind, target) in node.shape.edges() {
            let to = *self
                .node_indices
                .get(target)
                .ok_or_else(|| CodegenError::DanglingReference {
                    from: id.clone(),
                    to: target.clone(),
                })?;
            edges.push((to, kind));
        }
        for (to, kind) in edges {
            self.graph.add_edge(from, to, kind);
        }
        Ok(())
    }

    // ========== Queries ==========

    /// Get shape count
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get edge count
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, id: &ShapeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get(&self, id: &ShapeId) -> Option<&SchemaNode> {
        self.nodes.get(id)
    }

    /// Get a node that must exist
    pub fn get_required(&self, id: &ShapeId) -> Result<&SchemaNode> {
        self.nodes
            .get(id)
            .ok_or_else(|| CodegenError::MissingShape(id.clone()))
    }

    /// Look up a member edge by its member identifier
    pub fn member(&self, member_id: &ShapeId) -> Option<(&SchemaNode, &MemberShape)> {
        let owner = self.nodes.get(&member_id.root())?;
        let member = owner.member(member_id.member()?)?;
        Some((owner, member))
    }

    /// All nodes in id order
    pub fn nodes(&self) -> impl Iterator<Item = &SchemaNode> {
        self.nodes.values()
    }

    pub fn operations(&self) -> impl Iterator<Item = &SchemaNode> {
        self.nodes()
            .filter(|n| matches!(n.shape, Shape::Operation { .. }))
    }

    pub fn services(&self) -> impl Iterator<Item = &SchemaNode> {
        self.nodes()
            .filter(|n| matches!(n.shape, Shape::Service { .. }))
    }

    /// Shapes directly reachable from `id` via edges of `kind` (sorted, deduplicated)
    pub fn targets(&self, id: &ShapeId, kind: EdgeKind) -> Vec<&ShapeId> {
        self.neighbors(id, kind, Direction::Outgoing)
    }

    /// Shapes with an edge of `kind` into `id` (sorted, deduplicated)
    pub fn sources(&self, id: &ShapeId, kind: EdgeKind) -> Vec<&ShapeId> {
        self.neighbors(id, kind, Direction::Incoming)
    }

    fn neighbors(&self, id: &ShapeId, kind: EdgeKind, direction: Direction) -> Vec<&ShapeId> {
        let Some(&idx) = self.node_indices.get(id) else {
            return Vec::new();
        };

        let found: BTreeSet<&ShapeId> = self
            .graph
            .edges_directed(idx, direction)
            .filter(|e| *e.weight() == kind)
            .filter_map(|e| {
                let other = match direction {
                    Direction::Outgoing => e.target(),
                    Direction::Incoming => e.source(),
                };
                self.graph.node_weight(other)
            })
            .collect();
        found.into_iter().collect()
    }

    /// Every shape reachable from any service, services included
    pub fn reachable_from_services(&self) -> BTreeSet<ShapeId> {
        let mut reachable = BTreeSet::new();
        for service in self.services() {
            let start = self.node_indices[&service.id];
            let mut dfs = Dfs::new(&self.graph, start);
            while let Some(idx) = dfs.next(&self.graph) {
                reachable.insert(self.graph[idx].clone());
            }
        }
        reachable
    }

    // ========== Mutation ==========

    /// Add a tag to a node; returns false if it was already present
    pub fn add_tag(&mut self, id: &ShapeId, tag: Tag) -> Result<bool> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| CodegenError::MissingShape(id.clone()))?;
        Ok(node.tags.insert(tag))
    }

    /// Point an operation at new input and output records
    pub(crate) fn set_operation_io(
        &mut self,
        operation: &ShapeId,
        new_input: ShapeId,
        new_output: ShapeId,
    ) -> Result<()> {
        for target in [&new_input, &new_output] {
            if !self.nodes.contains_key(target) {
                return Err(CodegenError::DanglingReference {
                    from: operation.clone(),
                    to: target.clone(),
                });
            }
        }

        let node = self
            .nodes
            .get_mut(operation)
            .ok_or_else(|| CodegenError::MissingShape(operation.clone()))?;
        let Shape::Operation { input, output, .. } = &mut node.shape else {
            return Err(CodegenError::MissingShape(operation.clone()));
        };
        *input = Some(new_input.clone());
        *output = Some(new_output.clone());

        let from = self.node_indices[operation];
        let mut stale: Vec<_> = self
            .graph
            .edges_directed(from, Direction::Outgoing)
            .filter(|e| matches!(e.weight(), EdgeKind::Input | EdgeKind::Output))
            .map(|e| e.id())
            .collect();
        // remove_edge swaps the last edge into the hole, so go high to low
        stale.sort_unstable_by(|a, b| b.cmp(a));
        for edge in stale {
            self.graph.remove_edge(edge);
        }

        self.graph
            .add_edge(from, self.node_indices[&new_input], EdgeKind::Input);
        self.graph
            .add_edge(from, self.node_indices[&new_output], EdgeKind::Output);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Small graph-building helpers shared by the unit tests

    use super::*;

    pub const NS: &str = "example.weather";

    pub fn id(name: &str) -> ShapeId {
        ShapeId::new(NS, name)
    }

    pub fn string() -> SchemaNode {
        SchemaNode::new(
            ShapeId::new("smithy.api", "String"),
            Shape::Primitive { kind: PrimitiveKind::String },
        )
    }

    pub fn string_id() -> ShapeId {
        ShapeId::new("smithy.api", "String")
    }

    pub fn record(name: &str, members: &[(&str, ShapeId)]) -> SchemaNode {
        SchemaNode::new(
            id(name),
            Shape::Record {
                members: members
                    .iter()
                    .map(|(n, t)| MemberShape::new(*n, t.clone()))
                    .collect(),
            },
        )
    }

    pub fn set_of(name: &str, element: ShapeId) -> SchemaNode {
        SchemaNode::new(
            id(name),
            Shape::Set {
                member: MemberShape::new("member", element),
            },
        )
    }

    pub fn list_of(name: &str, element: ShapeId) -> SchemaNode {
        SchemaNode::new(
            id(name),
            Shape::List {
                member: MemberShape::new("member", element),
            },
        )
    }

    pub fn operation(name: &str, input: Option<&str>, output: Option<&str>) -> SchemaNode {
        SchemaNode::new(
            id(name),
            Shape::Operation {
                input: input.map(id),
                output: output.map(id),
                errors: Vec::new(),
            },
        )
    }

    pub fn service(name: &str, operations: &[&str]) -> SchemaNode {
        SchemaNode::new(
            id(name),
            Shape::Service {
                operations: operations.iter().map(|o| id(o)).collect(),
            },
        )
    }
}
