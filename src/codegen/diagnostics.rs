//! Diagnostics
//!
//! Non-fatal findings collected while the pipeline runs. Anything that
//! would make generated code wrong is a [`crate::CodegenError`] instead;
//! diagnostics only explain where generated names differ from the schema.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::graph::ShapeId;

// =============================================================================
// Diagnostic Codes
// =============================================================================

/// Diagnostic code for categorizing findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    // === Naming ===
    /// A type, member or variant name was a reserved word
    EscapedIdentifier,
    /// Two names collided after casing; the later one got a suffix
    NameCollision,
    /// The fallback variant clashed with a declared variant
    FallbackRenamed,

    // === Normalization ===
    /// A record shared by operations was cloned per operation
    SharedRecordCloned,
    /// An operation had no input or output; an empty record was created
    RecordSynthesized,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EscapedIdentifier => "I001",
            Self::NameCollision => "W001",
            Self::FallbackRenamed => "W002",
            Self::SharedRecordCloned => "I002",
            Self::RecordSynthesized => "I003",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::NameCollision | Self::FallbackRenamed => Severity::Warning,
            Self::EscapedIdentifier | Self::SharedRecordCloned | Self::RecordSynthesized => {
                Severity::Info
            }
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

// =============================================================================
// Diagnostic Item
// =============================================================================

/// A single diagnostic item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticItem {
    /// Shape (or member) the finding is about
    pub shape: ShapeId,
    pub code: DiagnosticCode,
    pub message: String,
    /// Additional context (e.g., original names)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,
}

impl DiagnosticItem {
    pub fn new(shape: ShapeId, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            shape,
            code,
            message: message.into(),
            context: Vec::new(),
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }
}

impl fmt::Display for DiagnosticItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} ({})",
            self.code,
            self.code.severity(),
            self.message,
            self.shape
        )?;

        for ctx in &self.context {
            write!(f, "\n  - {}", ctx)?;
        }

        Ok(())
    }
}

// =============================================================================
// Diagnostics Collection
// =============================================================================

/// Collection of diagnostics from the pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    items: Vec<DiagnosticItem>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic item
    pub fn push(&mut self, item: DiagnosticItem) {
        self.items.push(item);
    }

    /// Record an escaped identifier
    pub fn escaped(&mut self, shape: &ShapeId, original: &str, escaped: &str) {
        self.push(
            DiagnosticItem::new(
                shape.clone(),
                DiagnosticCode::EscapedIdentifier,
                format!("'{}' is reserved, emitted as '{}'", original, escaped),
            ),
        );
    }

    /// Record a name that collided after casing
    pub fn name_collision(&mut self, shape: &ShapeId, wanted: &str, used: &str) {
        self.push(DiagnosticItem::new(
            shape.clone(),
            DiagnosticCode::NameCollision,
            format!("'{}' is already taken, emitted as '{}'", wanted, used),
        ));
    }

    /// Record a renamed fallback variant
    pub fn fallback_renamed(&mut self, shape: &ShapeId, wanted: &str, used: &str) {
        self.push(
            DiagnosticItem::new(
                shape.clone(),
                DiagnosticCode::FallbackRenamed,
                format!("Fallback variant '{}' clashes with a declared variant", wanted),
            )
            .with_context(format!("Renamed to '{}'", used)),
        );
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        self.items.iter().any(|i| i.severity() == Severity::Warning)
    }

    /// Get all warnings
    pub fn warnings(&self) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(|i| i.severity() == Severity::Warning)
    }

    /// Items with a given code
    pub fn with_code(&self, code: DiagnosticCode) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(move |i| i.code == code)
    }

    /// Get all items
    pub fn all(&self) -> &[DiagnosticItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Merge another Diagnostics into this one
    pub fn merge(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in &self.items {
            writeln!(f, "{}", item)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a DiagnosticItem;
    type IntoIter = std::slice::Iter<'a, DiagnosticItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
