//! Member Nullability
//!
//! A member is nullable when the schema does not require it and gives it
//! no default. On top of that rule an injected [`NullabilityPolicy`] may
//! make further members nullable; it can never make a member non-nullable.

use serde::{Deserialize, Serialize};

use crate::graph::{MemberShape, SchemaNode};

/// Extra nullability rule supplied by the caller
pub trait NullabilityPolicy {
    fn is_member_nullable(&self, owner: &SchemaNode, member: &MemberShape) -> bool;
}

impl<F> NullabilityPolicy for F
where
    F: Fn(&SchemaNode, &MemberShape) -> bool,
{
    fn is_member_nullable(&self, owner: &SchemaNode, member: &MemberShape) -> bool {
        self(owner, member)
    }
}

/// Adds nothing to the built-in rule
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralNullability;

impl NullabilityPolicy for StructuralNullability {
    fn is_member_nullable(&self, _owner: &SchemaNode, _member: &MemberShape) -> bool {
        false
    }
}

/// Every member without a default is nullable, required or not.
///
/// Lets clients decode responses from servers that stopped sending a
/// formerly required member.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientOptionalNullability;

impl NullabilityPolicy for ClientOptionalNullability {
    fn is_member_nullable(&self, _owner: &SchemaNode, member: &MemberShape) -> bool {
        member.tags.default_value().is_none()
    }
}

/// Configurable choice of built-in policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NullabilityMode {
    #[default]
    Structural,
    ClientOptional,
}

impl NullabilityMode {
    pub fn policy(self) -> Box<dyn NullabilityPolicy> {
        match self {
            Self::Structural => Box::new(StructuralNullability),
            Self::ClientOptional => Box::new(ClientOptionalNullability),
        }
    }
}

/// Built-in rule: not required and no default
pub fn is_structurally_nullable(member: &MemberShape) -> bool {
    !member.tags.is_required() && member.tags.default_value().is_none()
}

/// Built-in rule or policy
pub fn is_member_nullable(
    policy: &dyn NullabilityPolicy,
    owner: &SchemaNode,
    member: &MemberShape,
) -> bool {
    is_structurally_nullable(member) || policy.is_member_nullable(owner, member)
}
