//! Schema Graph Analysis
//!
//! Computes strongly connected components (SCCs) over inline member edges,
//! i.e. record/union members that target another record or union. A cycle
//! made only of such edges describes a value of infinite size unless one of
//! its edges is boxed. Collection edges are heap-allocated already and never
//! take part.

use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{SchemaGraph, ShapeId};

// =============================================================================
// SCC Group
// =============================================================================

/// A strongly connected component (cycle group) of inline edges
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SccGroup {
    /// Unique identifier for this SCC
    pub id: usize,
    /// All records/unions in this SCC, sorted
    pub members: Vec<ShapeId>,
    /// Member edges (by member id) that stay inside the SCC
    pub internal_edges: Vec<ShapeId>,
    /// Whether this is a single shape referencing itself
    pub is_self_referential: bool,
}

// =============================================================================
// Analysis Result
// =============================================================================

/// Complete SCC analysis result for the graph
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SccAnalysis {
    /// Cyclic SCCs only (more than one member, or a self reference)
    pub groups: Vec<SccGroup>,
    /// Shape -> group id
    membership: HashMap<ShapeId, usize>,
}

impl SccAnalysis {
    /// Check if a shape is part of an inline cycle
    pub fn is_cyclic(&self, id: &ShapeId) -> bool {
        self.membership.contains_key(id)
    }

    /// Get the SCC group for a shape
    pub fn get_scc(&self, id: &ShapeId) -> Option<&SccGroup> {
        self.groups.get(*self.membership.get(id)?)
    }
}

// =============================================================================
// Analysis Functions
// =============================================================================

/// Compute inline-cycle SCCs for a schema graph
pub fn compute_scc_analysis(graph: &SchemaGraph) -> SccAnalysis {
    analyze(graph, |_| true)
}

/// Cycles that remain once every boxed member edge is removed.
///
/// Empty when every inline cycle has been broken.
pub fn unbroken_cycles(graph: &SchemaGraph, is_boxed: impl Fn(&ShapeId) -> bool) -> Vec<SccGroup> {
    analyze(graph, |member| !is_boxed(member)).groups
}

fn analyze(graph: &SchemaGraph, keep_edge: impl Fn(&ShapeId) -> bool) -> SccAnalysis {
    let mut inline: DiGraph<ShapeId, ShapeId> = DiGraph::new();
    let mut indices: HashMap<&ShapeId, NodeIndex> = HashMap::new();

    for node in graph.nodes().filter(|n| n.shape.is_aggregate()) {
        indices.insert(&node.id, inline.add_node(node.id.clone()));
    }

    for node in graph.nodes().filter(|n| n.shape.is_aggregate()) {
        for member in node.shape.members() {
            let Some(&to) = indices.get(&member.target) else {
                continue;
            };
            let member_id = node.id.with_member(&member.name);
            if keep_edge(&member_id) {
                inline.add_edge(indices[&node.id], to, member_id);
            }
        }
    }

    let mut groups = Vec::new();

    for scc in kosaraju_scc(&inline) {
        let has_self_ref = scc.len() == 1
            && inline
                .edges_directed(scc[0], Direction::Outgoing)
                .any(|e| e.target() == scc[0]);
        if scc.len() == 1 && !has_self_ref {
            continue;
        }

        let mut members: Vec<ShapeId> = scc.iter().map(|idx| inline[*idx].clone()).collect();
        members.sort();

        let mut internal_edges: Vec<ShapeId> = scc
            .iter()
            .flat_map(|idx| inline.edges_directed(*idx, Direction::Outgoing))
            .filter(|e| scc.contains(&e.target()))
            .map(|e| e.weight().clone())
            .collect();
        internal_edges.sort();

        groups.push(SccGroup {
            id: 0,
            members,
            internal_edges,
            is_self_referential: has_self_ref,
        });
    }

    // kosaraju order depends on node insertion; make it stable by first member
    groups.sort_by(|a, b| a.members.cmp(&b.members));
    let mut membership = HashMap::new();
    for (i, group) in groups.iter_mut().enumerate() {
        group.id = i;
        for member in &group.members {
            membership.insert(member.clone(), i);
        }
    }

    SccAnalysis { groups, membership }
}
