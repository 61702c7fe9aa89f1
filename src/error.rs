//! Error types for the codegen pipeline
//!
//! Every variant is fatal: the pipeline either succeeds over the whole graph
//! or aborts with the offending shape identifier.

use thiserror::Error;

use crate::graph::ShapeId;

/// Result type for codegen operations
pub type Result<T> = std::result::Result<T, CodegenError>;

/// Codegen pipeline errors
#[derive(Error, Debug)]
pub enum CodegenError {
    // === Schema consistency ===
    #[error("Dangling reference: {from} points at missing shape {to}")]
    DanglingReference { from: ShapeId, to: ShapeId },

    #[error("Duplicate shape identifier: {0}")]
    DuplicateShape(ShapeId),

    #[error("Shape not found: {0}")]
    MissingShape(ShapeId),

    #[error("Operation {operation} uses {target} as {role}, but it is a {found}, not a record")]
    OperationTargetNotRecord {
        operation: ShapeId,
        target: ShapeId,
        role: &'static str,
        found: &'static str,
    },

    #[error("Synthetic shape {synthetic} for operation {operation} collides with an existing shape")]
    SyntheticCollision { operation: ShapeId, synthetic: ShapeId },

    #[error("Shape {0} is declared in the reserved synthetic namespace")]
    ReservedNamespace(ShapeId),

    // === Resolution ===
    #[error("Member {member} targets {target}, a {found}, which cannot be used as a value")]
    UnsupportedMemberTarget {
        member: ShapeId,
        target: ShapeId,
        found: &'static str,
    },

    #[error("No {language} type mapping for {kind} primitive {shape}")]
    UnmappedPrimitive {
        shape: ShapeId,
        kind: String,
        language: String,
    },

    #[error("Collection {0} contains itself without an intervening record or union")]
    ContainerCycle(ShapeId),

    #[error("Declared types {first} and {second} both resolve to {name}")]
    DeclarationCollision {
        name: String,
        first: ShapeId,
        second: ShapeId,
    },

    #[error("Recursive shapes {members:?} have no boxed member to break the cycle")]
    MissingIndirection { members: Vec<ShapeId> },

    // === Ambient ===
    #[error("Invalid shape identifier: {0}")]
    InvalidShapeId(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodegenError {
    /// The shape this error is about, when there is one
    pub fn shape(&self) -> Option<&ShapeId> {
        match self {
            Self::DanglingReference { from, .. } => Some(from),
            Self::DuplicateShape(id)
            | Self::MissingShape(id)
            | Self::ReservedNamespace(id)
            | Self::ContainerCycle(id) => Some(id),
            Self::OperationTargetNotRecord { operation, .. }
            | Self::SyntheticCollision { operation, .. } => Some(operation),
            Self::UnsupportedMemberTarget { member, .. } => Some(member),
            Self::UnmappedPrimitive { shape, .. } => Some(shape),
            Self::DeclarationCollision { first, .. } => Some(first),
            Self::MissingIndirection { members } => members.first(),
            Self::InvalidShapeId(_) | Self::Config(_) | Self::Json(_) | Self::Io(_) => None,
        }
    }
}
