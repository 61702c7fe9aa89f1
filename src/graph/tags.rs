//! Metadata Tags
//!
//! Opaque annotations attached to shapes and member edges. Tags carry no
//! behavior; the passes read them to decide what to generate.
//!
//! Serialized form (inside a shape or member `tags` array):
//!
//! ```json
//! ["required", "sensitive", {"default": "0"}, {"clone-of": "ns#Thing"}]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::ShapeId;

/// Fault side recorded by an error marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorFault {
    Client,
    Server,
}

/// A single metadata tag
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tag {
    /// Record must support value equality/hashing (set by the closure pass)
    DerivedEqualityRequired,
    /// Record is an operation error
    ErrorMarker(ErrorFault),
    /// Value must be redacted from logs
    Sensitive,
    /// Collection elements may be null
    ElementNullable,
    /// Member closes a recursive cycle and must always be boxed
    StructurallyRecursive,
    /// Member must be present on the wire
    Required,
    /// Member default value, as a target-language literal
    Default(String),
    /// Shape is nested under a service's namespace
    NestedUnder(ShapeId),
    /// Synthetic shape copied from another record
    CloneOf(ShapeId),
    /// Shape was created by the normalizer
    Synthetic,
    /// Record is an operation input
    Input,
    /// Record is an operation output
    Output,
    /// Anything else; carried through untouched
    Custom {
        key: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },
}

/// Ordered, duplicate-free set of tags
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(BTreeSet<Tag>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag; returns false if it was already present
    pub fn insert(&mut self, tag: Tag) -> bool {
        self.0.insert(tag)
    }

    pub fn contains(&self, tag: &Tag) -> bool {
        self.0.contains(tag)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.0.iter()
    }

    pub fn is_required(&self) -> bool {
        self.contains(&Tag::Required)
    }

    pub fn is_sparse(&self) -> bool {
        self.contains(&Tag::ElementNullable)
    }

    pub fn requires_equality(&self) -> bool {
        self.contains(&Tag::DerivedEqualityRequired)
    }

    pub fn default_value(&self) -> Option<&str> {
        self.0.iter().find_map(|t| match t {
            Tag::Default(v) => Some(v.as_str()),
            _ => None,
        })
    }

    pub fn error_fault(&self) -> Option<ErrorFault> {
        self.0.iter().find_map(|t| match t {
            Tag::ErrorMarker(fault) => Some(*fault),
            _ => None,
        })
    }

    pub fn clone_of(&self) -> Option<&ShapeId> {
        self.0.iter().find_map(|t| match t {
            Tag::CloneOf(id) => Some(id),
            _ => None,
        })
    }

    pub fn nested_under(&self) -> Option<&ShapeId> {
        self.0.iter().find_map(|t| match t {
            Tag::NestedUnder(id) => Some(id),
            _ => None,
        })
    }
}

impl FromIterator<Tag> for TagSet {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[Tag; N]> for TagSet {
    fn from(tags: [Tag; N]) -> Self {
        tags.into_iter().collect()
    }
}
