//! Operation Normalization
//!
//! Gives every operation its own input and output record so the two sides can
//! evolve without touching other operations. Shared records are cloned into a
//! reserved synthetic namespace; missing ones are synthesized empty.
//!
//! The pass plans every rewrite first and only then mutates a copy of the
//! graph, so an invalid operation aborts before anything changes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

use super::{SchemaGraph, SchemaNode, Shape, ShapeId, Tag};
use crate::error::{CodegenError, Result};

/// Naming of synthetic operation records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeOptions {
    /// Namespace reserved for synthesized shapes
    pub synthetic_namespace: String,
    pub input_suffix: String,
    pub output_suffix: String,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            synthetic_namespace: "familiar.synthetic".to_string(),
            input_suffix: "Input".to_string(),
            output_suffix: "Output".to_string(),
        }
    }
}

/// What normalization did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    /// Records copied from a declared input/output
    pub cloned: Vec<ShapeId>,
    /// Empty records created for a missing input/output
    pub synthesized: Vec<ShapeId>,
    /// Operations already owning their records
    pub untouched: Vec<ShapeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Input,
    Output,
}

impl Side {
    fn role(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
        }
    }

    fn marker(self) -> Tag {
        match self {
            Self::Input => Tag::Input,
            Self::Output => Tag::Output,
        }
    }
}

/// One planned rewrite of one side of one operation
struct Rewrite {
    operation: ShapeId,
    side: Side,
    synthetic: ShapeId,
    /// None when the side is already normalized
    node: Option<SchemaNode>,
    cloned: bool,
}

/// Normalize every operation in `graph`, returning the rewritten graph
pub fn normalize(
    graph: &SchemaGraph,
    options: &NormalizeOptions,
) -> Result<(SchemaGraph, NormalizeReport)> {
    for node in graph.nodes() {
        if node.id.namespace() == options.synthetic_namespace && !node.tags.contains(&Tag::Synthetic) {
            return Err(CodegenError::ReservedNamespace(node.id.clone()));
        }
    }

    let mut rewrites = Vec::new();
    let mut planned: BTreeSet<ShapeId> = BTreeSet::new();

    for op in graph.operations() {
        let Shape::Operation { input, output, .. } = &op.shape else {
            continue;
        };
        for (side, declared) in [(Side::Input, input), (Side::Output, output)] {
            let rewrite = plan_side(graph, options, op, side, declared.as_ref())?;
            if !planned.insert(rewrite.synthetic.clone()) {
                return Err(CodegenError::SyntheticCollision {
                    operation: op.id.clone(),
                    synthetic: rewrite.synthetic,
                });
            }
            rewrites.push(rewrite);
        }
    }

    let mut normalized = graph.clone();
    let mut report = NormalizeReport::default();

    for rewrite in &rewrites {
        if let Some(node) = &rewrite.node {
            normalized.insert(node.clone())?;
            debug!(
                operation = %rewrite.operation,
                synthetic = %rewrite.synthetic,
                role = rewrite.side.role(),
                cloned = rewrite.cloned,
                "synthesized operation record"
            );
            if rewrite.cloned {
                report.cloned.push(rewrite.synthetic.clone());
            } else {
                report.synthesized.push(rewrite.synthetic.clone());
            }
        }
    }

    // rewrites come in (input, output) pairs per operation
    for pair in rewrites.chunks(2) {
        let [input, output] = pair else { continue };
        if input.node.is_none() && output.node.is_none() {
            report.untouched.push(input.operation.clone());
            continue;
        }
        normalized.set_operation_io(
            &input.operation,
            input.synthetic.clone(),
            output.synthetic.clone(),
        )?;
    }

    info!(
        operations = rewrites.len() / 2,
        cloned = report.cloned.len(),
        synthesized = report.synthesized.len(),
        "normalized operation records"
    );
    Ok((normalized, report))
}

/// Identifier of the synthetic record for one side of an operation
pub fn synthetic_id(operation: &ShapeId, suffix: &str, options: &NormalizeOptions) -> ShapeId {
    let mut chars = operation.name().chars();
    let base: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    ShapeId::new(options.synthetic_namespace.clone(), format!("{}{}", base, suffix))
}

fn plan_side(
    graph: &SchemaGraph,
    options: &NormalizeOptions,
    op: &SchemaNode,
    side: Side,
    declared: Option<&ShapeId>,
) -> Result<Rewrite> {
    let suffix = match side {
        Side::Input => &options.input_suffix,
        Side::Output => &options.output_suffix,
    };
    let synthetic = synthetic_id(&op.id, suffix, options);

    if declared == Some(&synthetic) {
        let existing = graph.get_required(&synthetic)?;
        if existing.shape.is_record() && existing.tags.contains(&Tag::Synthetic) {
            return Ok(Rewrite {
                operation: op.id.clone(),
                side,
                synthetic,
                node: None,
                cloned: false,
            });
        }
    }

    if graph.contains(&synthetic) {
        return Err(CodegenError::SyntheticCollision {
            operation: op.id.clone(),
            synthetic,
        });
    }

    let (node, cloned) = match declared {
        Some(target) => {
            let source = graph.get_required(target)?;
            let Shape::Record { members } = &source.shape else {
                return Err(CodegenError::OperationTargetNotRecord {
                    operation: op.id.clone(),
                    target: target.clone(),
                    role: side.role(),
                    found: source.shape.kind_name(),
                });
            };
            let mut node = SchemaNode::new(
                synthetic.clone(),
                Shape::Record {
                    members: members.clone(),
                },
            );
            node.tags = source.tags.clone();
            node.tags.insert(Tag::CloneOf(target.clone()));
            (node, true)
        }
        None => (
            SchemaNode::new(synthetic.clone(), Shape::Record { members: Vec::new() }),
            false,
        ),
    };

    let node = node.tagged(Tag::Synthetic).tagged(side.marker());
    Ok(Rewrite {
        operation: op.id.clone(),
        side,
        synthetic,
        node: Some(node),
        cloned,
    })
}
