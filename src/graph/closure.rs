//! Equality Closure
//!
//! Marks every record that can end up as an element of a set, directly or
//! nested inside such a record, with [`Tag::DerivedEqualityRequired`].
//!
//! Work-list fixpoint: seed with the records that are set elements, then
//! repeatedly follow record member edges (never collection wrapper edges)
//! until a round discovers nothing new. Only tags are added.
//!
//! Unions are neither seeds nor traversed, so a record that only appears
//! as a variant of a set-element union stays untagged.

use std::collections::BTreeSet;
use tracing::{debug, info};

use super::{EdgeKind, SchemaGraph, Shape, ShapeId, Tag};
use crate::error::Result;

/// What the closure pass did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClosureReport {
    /// Every record carrying the tag after the pass
    pub tagged: BTreeSet<ShapeId>,
    /// Records that received the tag during this pass
    pub newly_tagged: BTreeSet<ShapeId>,
    /// Fixpoint rounds, seed round included
    pub rounds: usize,
}

/// Propagate the derived-equality requirement through the graph in place
pub fn compute_equality_closure(graph: &mut SchemaGraph) -> Result<ClosureReport> {
    let mut report = ClosureReport::default();

    let mut frontier: BTreeSet<ShapeId> = graph
        .nodes()
        .filter(|n| matches!(n.shape, Shape::Set { .. }))
        .flat_map(|set| graph.targets(&set.id, EdgeKind::Element))
        .filter(|target| is_record(graph, target))
        .cloned()
        .collect();
    let mut visited: BTreeSet<ShapeId> = frontier.clone();

    while !frontier.is_empty() {
        report.rounds += 1;
        for id in &frontier {
            if graph.add_tag(id, Tag::DerivedEqualityRequired)? {
                report.newly_tagged.insert(id.clone());
            }
        }

        let next: BTreeSet<ShapeId> = frontier
            .iter()
            .flat_map(|id| graph.targets(id, EdgeKind::Member))
            .filter(|target| is_record(graph, target) && !visited.contains(*target))
            .cloned()
            .collect();

        debug!(
            round = report.rounds,
            frontier = frontier.len(),
            discovered = next.len(),
            "equality closure round"
        );
        visited.extend(next.iter().cloned());
        frontier = next;
    }

    report.tagged = graph
        .nodes()
        .filter(|n| n.shape.is_record() && n.tags.requires_equality())
        .map(|n| n.id.clone())
        .collect();

    info!(
        tagged = report.tagged.len(),
        new = report.newly_tagged.len(),
        rounds = report.rounds,
        "computed equality closure"
    );
    Ok(report)
}

fn is_record(graph: &SchemaGraph, id: &ShapeId) -> bool {
    graph.get(id).is_some_and(|n| n.shape.is_record())
}
