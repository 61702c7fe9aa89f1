//! Symbol Resolution
//!
//! Maps every shape to a [`Symbol`]: the target-language view of a type
//! (display name, namespace, nullability, default, boxing, declaration
//! file and declaration dependencies).
//!
//! Resolution runs in two layers:
//! - a *shallow* symbol for every shape, computed from the graph alone and
//!   cached by shape id. Record and union symbols never embed their members,
//!   so a shallow symbol is finite even for recursive shapes.
//! - *member bindings* for records and unions, computed by a depth-first
//!   walk over inline member edges. A member whose target is still on the
//!   walk's frame stack closes a cycle and is boxed.
//!
//! Collection edges never box: lists, sets and maps are heap-allocated
//! already. Shapes reached through a collection, an operation or a service
//! are queued and walked as fresh roots once the current walk finishes.
//! Both walks keep explicit stacks and never recurse.
//!
//! All mutable state lives in an explicit [`ResolutionContext`], so
//! independent resolutions never share a cache.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use tracing::{debug, info, trace};

use super::config::{Casing, NamingConfig, RenderProfile};
use super::diagnostics::Diagnostics;
use super::escape::IdentifierEscaper;
use super::names::NameResolver;
use super::nullability::{is_member_nullable, NullabilityPolicy};
use crate::error::{CodegenError, Result};
use crate::graph::{EnumValue, MemberShape, PrimitiveKind, SchemaGraph, SchemaNode, Shape, ShapeId, Tag};

// =============================================================================
// Symbols
// =============================================================================

/// Capability a declared type must implement
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Conformance {
    Equatable,
    Hashable,
    Error,
}

/// Reference to another symbol by shape and qualified name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SymbolRef {
    pub shape: ShapeId,
    pub namespace: Vec<String>,
    pub name: String,
}

/// One named value of an enum symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumVariant {
    pub name: String,
    pub value: String,
}

/// What a symbol stands for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SymbolKind {
    Builtin {
        primitive: PrimitiveKind,
    },
    Record,
    /// Variants are the member bindings; `fallback` always comes last
    Union {
        fallback: String,
    },
    Enum {
        variants: Vec<EnumVariant>,
        fallback: String,
    },
    List {
        element: Box<Symbol>,
        sparse: bool,
    },
    Set {
        element: Box<Symbol>,
        sparse: bool,
    },
    Map {
        key: Box<Symbol>,
        value: Box<Symbol>,
        sparse: bool,
    },
    Operation {
        input: Option<SymbolRef>,
        output: Option<SymbolRef>,
        errors: Vec<SymbolRef>,
    },
    Service {
        operations: Vec<SymbolRef>,
    },
}

/// Resolved target-language type.
///
/// A symbol stored under a shape id describes the shape itself: `nullable`
/// means "no value by default". Member and element symbols are copies
/// adjusted for their use site: `nullable`, `default_value` and `boxed`
/// then describe that one member or element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Symbol {
    pub shape: ShapeId,
    pub display_name: String,
    pub namespace: Vec<String>,
    pub nullable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// Needs a heap indirection to break a recursive value type
    pub boxed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declared_in_file: Option<String>,
    /// Types that must be declared before or alongside this one
    pub dependencies: BTreeSet<SymbolRef>,
    pub conformances: BTreeSet<Conformance>,
    pub kind: SymbolKind,
}

impl Symbol {
    pub fn reference(&self) -> SymbolRef {
        SymbolRef {
            shape: self.shape.clone(),
            namespace: self.namespace.clone(),
            name: self.display_name.clone(),
        }
    }

    /// Whether this symbol gets its own declaration
    pub fn is_declared(&self) -> bool {
        self.declared_in_file.is_some()
    }

    /// Full type expression: containers, boxing and optionality
    pub fn type_expr(&self, profile: &RenderProfile) -> String {
        let mut expr = self.display_name.clone();
        if self.boxed {
            expr = profile.wrap_box(&expr);
        }
        if self.nullable {
            expr = profile.wrap_optional(&expr);
        }
        expr
    }

    fn at_use_site(&self, nullable: bool, default_value: Option<String>, boxed: bool) -> Self {
        Self {
            nullable,
            default_value,
            boxed,
            ..self.clone()
        }
    }
}

/// A record member or union variant bound to its target symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberSymbol {
    /// `namespace#Owner$member`
    pub id: ShapeId,
    /// Cased and escaped name
    pub name: String,
    /// Name as declared in the schema
    pub wire_name: String,
    pub sensitive: bool,
    pub symbol: Symbol,
}

// =============================================================================
// Symbol Table
// =============================================================================

/// Shape id -> symbol, plus member bindings of records and unions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    symbols: BTreeMap<ShapeId, Symbol>,
    members: BTreeMap<ShapeId, Vec<MemberSymbol>>,
}

impl SymbolTable {
    pub fn get(&self, id: &ShapeId) -> Option<&Symbol> {
        self.symbols.get(id)
    }

    pub fn contains(&self, id: &ShapeId) -> bool {
        self.symbols.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// All symbols in shape id order
    pub fn iter(&self) -> impl Iterator<Item = (&ShapeId, &Symbol)> {
        self.symbols.iter()
    }

    /// Member bindings of a record or union, in declaration order
    pub fn members(&self, id: &ShapeId) -> Option<&[MemberSymbol]> {
        self.members.get(id).map(Vec::as_slice)
    }

    /// Binding for a member id (`namespace#Owner$member`)
    pub fn member(&self, member_id: &ShapeId) -> Option<&MemberSymbol> {
        let wire_name = member_id.member()?;
        self.members
            .get(&member_id.root())?
            .iter()
            .find(|m| m.wire_name == wire_name)
    }

    /// Emitted name of a member
    pub fn member_name(&self, member_id: &ShapeId) -> Option<&str> {
        self.member(member_id).map(|m| m.name.as_str())
    }

    /// Depth-bounded direct references of a record or union
    pub fn declaration_dependencies(&self, id: &ShapeId) -> Option<&BTreeSet<SymbolRef>> {
        let symbol = self.symbols.get(id)?;
        match symbol.kind {
            SymbolKind::Record | SymbolKind::Union { .. } => Some(&symbol.dependencies),
            _ => None,
        }
    }

    pub fn is_boxed(&self, member_id: &ShapeId) -> bool {
        self.member(member_id).is_some_and(|m| m.symbol.boxed)
    }

    /// Every boxed member id
    pub fn boxed_members(&self) -> BTreeSet<ShapeId> {
        self.members
            .values()
            .flatten()
            .filter(|m| m.symbol.boxed)
            .map(|m| m.id.clone())
            .collect()
    }
}

// =============================================================================
// Resolution Context
// =============================================================================

/// A record or union whose members are being bound
#[derive(Debug)]
struct Frame {
    id: ShapeId,
    names: Vec<String>,
    /// Index of the next member to bind
    next: usize,
    bound: Vec<MemberSymbol>,
}

/// Mutable state of one resolution run
#[derive(Debug, Default)]
pub struct ResolutionContext {
    table: SymbolTable,
    /// Member-binding walk, innermost last
    resolving: Vec<Frame>,
    /// Ids in `resolving`
    on_stack: HashSet<ShapeId>,
    /// Collections whose element symbol is being computed, innermost last
    containers: Vec<ShapeId>,
    /// Shapes to walk once the current walk returns
    pending: VecDeque<ShapeId>,
    max_depth: usize,
    diagnostics: Diagnostics,
}

impl ResolutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self) -> &SymbolTable {
        &self.table
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Deepest inline member chain walked so far
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn is_resolving(&self, id: &ShapeId) -> bool {
        self.on_stack.contains(id)
    }

    pub fn into_parts(self) -> (SymbolTable, Diagnostics) {
        (self.table, self.diagnostics)
    }

    fn push_frame(&mut self, id: ShapeId, names: Vec<String>) {
        self.on_stack.insert(id.clone());
        let capacity = names.len();
        self.resolving.push(Frame {
            id,
            names,
            next: 0,
            bound: Vec::with_capacity(capacity),
        });
        self.max_depth = self.max_depth.max(self.resolving.len());
    }

    /// Drop a walk that failed part way
    fn abandon_walks(&mut self) {
        self.resolving.clear();
        self.on_stack.clear();
        self.containers.clear();
    }
}

// =============================================================================
// Symbol Resolver
// =============================================================================

/// Resolver settings taken from configuration
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    /// Dot-separated namespace every symbol lives under
    pub root_namespace: String,
    /// Directory declared types are placed in
    pub models_dir: String,
    /// Reserved words on top of the language's own
    pub reserved_words: Vec<String>,
    /// Overrides the profile's fallback variant name
    pub fallback_variant: Option<String>,
    pub naming: NamingConfig,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            root_namespace: "Models".to_string(),
            models_dir: "Sources/Models".to_string(),
            reserved_words: Vec::new(),
            fallback_variant: None,
            naming: NamingConfig::default(),
        }
    }
}

/// Resolves shapes of one graph for one target language
pub struct SymbolResolver<'a> {
    graph: &'a SchemaGraph,
    profile: &'a RenderProfile,
    policy: &'a dyn NullabilityPolicy,
    escaper: IdentifierEscaper,
    names: NameResolver,
    root_namespace: Vec<String>,
    models_dir: String,
    fallback_variant: String,
}

impl<'a> SymbolResolver<'a> {
    pub fn new(
        graph: &'a SchemaGraph,
        profile: &'a RenderProfile,
        policy: &'a dyn NullabilityPolicy,
        options: &ResolverOptions,
    ) -> Self {
        Self {
            graph,
            profile,
            policy,
            escaper: IdentifierEscaper::for_profile(profile, &options.reserved_words),
            names: NameResolver::new(options.naming.clone()),
            root_namespace: options
                .root_namespace
                .split('.')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            models_dir: options.models_dir.trim_end_matches('/').to_string(),
            fallback_variant: options
                .fallback_variant
                .clone()
                .unwrap_or_else(|| profile.fallback_variant.clone()),
        }
    }

    /// Resolve one shape and everything it needs
    pub fn resolve(&self, id: &ShapeId, ctx: &mut ResolutionContext) -> Result<Symbol> {
        let symbol = self.visit(id, ctx)?;
        while let Some(next) = ctx.pending.pop_front() {
            self.visit(&next, ctx)?;
        }
        Ok(symbol)
    }

    /// Resolve every shape reachable from a service
    pub fn resolve_all(&self, ctx: &mut ResolutionContext) -> Result<()> {
        for id in self.roots() {
            self.resolve(&id, ctx)?;
        }
        check_declaration_names(&ctx.table)?;

        info!(
            symbols = ctx.table.len(),
            boxed = ctx.table.boxed_members().len(),
            max_depth = ctx.max_depth,
            language = %self.profile.language,
            "resolved symbols"
        );
        Ok(())
    }

    /// Resolution order: services, then what they reach, in id order.
    /// A graph without services resolves every shape.
    pub fn roots(&self) -> Vec<ShapeId> {
        let services: Vec<ShapeId> = self.graph.services().map(|s| s.id.clone()).collect();
        if services.is_empty() {
            return self.graph.nodes().map(|n| n.id.clone()).collect();
        }
        let rest: Vec<ShapeId> = self
            .graph
            .reachable_from_services()
            .into_iter()
            .filter(|id| !services.contains(id))
            .collect();
        services.into_iter().chain(rest).collect()
    }

    fn visit(&self, id: &ShapeId, ctx: &mut ResolutionContext) -> Result<Symbol> {
        let symbol = self.symbol(id, ctx)?;
        let node = self.graph.get_required(id)?;
        if node.shape.is_aggregate() {
            self.resolve_aggregate(node, ctx)?;
        }
        Ok(symbol)
    }

    // ========== Member binding ==========

    /// Bind the members of `node` and of every aggregate reached inline from it.
    ///
    /// Depth-first over an explicit frame stack. A member whose target is
    /// still on the stack closes a cycle and is boxed.
    fn resolve_aggregate(&self, node: &SchemaNode, ctx: &mut ResolutionContext) -> Result<()> {
        if ctx.table.members.contains_key(&node.id) || ctx.is_resolving(&node.id) {
            return Ok(());
        }
        let walked = self.walk_members(node, ctx);
        if walked.is_err() {
            ctx.abandon_walks();
        }
        walked
    }

    fn walk_members(&self, root: &SchemaNode, ctx: &mut ResolutionContext) -> Result<()> {
        self.enter(root, ctx);

        loop {
            let Some(frame) = ctx.resolving.last_mut() else {
                return Ok(());
            };
            let owner = self.graph.get_required(&frame.id)?;
            let members = owner.shape.members();
            let Some(member) = members.get(frame.next) else {
                if let Some(done) = ctx.resolving.pop() {
                    ctx.on_stack.remove(&done.id);
                    ctx.table.members.insert(done.id, done.bound);
                }
                continue;
            };
            let name = frame.names.get(frame.next).cloned().unwrap_or_default();
            frame.next += 1;

            let member_id = owner.id.with_member(&member.name);
            let target = self.value_target(&member_id, &member.target)?;
            let target_symbol = self.symbol(&target.id, ctx)?;

            let closes_cycle = ctx.is_resolving(&target.id);
            if closes_cycle {
                debug!(
                    member = %member_id,
                    target = %target.id,
                    depth = ctx.resolving.len(),
                    "member closes a cycle, boxing"
                );
            }
            trace!(member = %member_id, depth = ctx.resolving.len(), "bound member");

            let boxed = closes_cycle || member.tags.contains(&Tag::StructurallyRecursive);
            let symbol = if matches!(owner.shape, Shape::Union { .. }) {
                target_symbol.at_use_site(false, None, boxed)
            } else {
                self.member_symbol(owner, member, &target_symbol, boxed)
            };
            let bound = MemberSymbol {
                id: member_id,
                name,
                wire_name: member.name.clone(),
                sensitive: member.tags.contains(&Tag::Sensitive),
                symbol,
            };
            if let Some(frame) = ctx.resolving.last_mut() {
                frame.bound.push(bound);
            }

            if !closes_cycle
                && target.shape.is_aggregate()
                && !ctx.table.members.contains_key(&target.id)
            {
                self.enter(target, ctx);
            }
        }
    }

    /// Push a frame for an aggregate, naming its members up front
    fn enter(&self, node: &SchemaNode, ctx: &mut ResolutionContext) {
        let casing = if matches!(node.shape, Shape::Union { .. }) {
            self.profile.variant_casing
        } else {
            self.profile.member_casing
        };
        let names = self.assign_names(
            &node.id,
            node.shape.members().iter().map(|m| m.name.as_str()),
            casing,
            Some(&mut ctx.diagnostics),
        );
        ctx.push_frame(node.id.clone(), names);
    }

    fn member_symbol(
        &self,
        owner: &SchemaNode,
        member: &MemberShape,
        target: &Symbol,
        boxed: bool,
    ) -> Symbol {
        let nullable = is_member_nullable(self.policy, owner, member);
        let default_value = match member.tags.default_value() {
            Some(value) => Some(value.to_string()),
            None if nullable => None,
            None => target.default_value.clone(),
        };
        target.at_use_site(nullable, default_value, boxed)
    }

    // ========== Shallow symbols ==========

    fn symbol(&self, id: &ShapeId, ctx: &mut ResolutionContext) -> Result<Symbol> {
        if let Some(symbol) = ctx.table.symbols.get(id) {
            return Ok(symbol.clone());
        }

        let node = self.graph.get_required(id)?;
        if is_container(&node.shape) {
            ctx.containers.push(id.clone());
            let built = self.build_containers(ctx);
            if built.is_err() {
                ctx.abandon_walks();
            }
            built?;
        } else {
            let symbol = self.leaf_symbol(node, ctx)?;
            ctx.table.symbols.insert(id.clone(), symbol);
        }
        ctx.table
            .symbols
            .get(id)
            .cloned()
            .ok_or_else(|| CodegenError::MissingShape(id.clone()))
    }

    /// Symbols of every shape that is not a collection. None of them looks
    /// at another shape's symbol.
    fn leaf_symbol(&self, node: &SchemaNode, ctx: &mut ResolutionContext) -> Result<Symbol> {
        let symbol = match &node.shape {
            Shape::Primitive { kind } => self.primitive_symbol(node, *kind)?,
            Shape::Record { .. } | Shape::Union { .. } => self.aggregate_symbol(node, ctx),
            Shape::Enum { values } => self.enum_symbol(node, values, ctx),
            Shape::Operation {
                input,
                output,
                errors,
            } => {
                let kind = SymbolKind::Operation {
                    input: input.as_ref().map(|i| self.linked(i, ctx)).transpose()?,
                    output: output.as_ref().map(|o| self.linked(o, ctx)).transpose()?,
                    errors: errors
                        .iter()
                        .map(|e| self.linked(e, ctx))
                        .collect::<Result<_>>()?,
                };
                self.plain_symbol(node, self.symbol_name(node), kind)
            }
            Shape::Service { operations } => {
                let kind = SymbolKind::Service {
                    operations: operations
                        .iter()
                        .map(|o| self.linked(o, ctx))
                        .collect::<Result<_>>()?,
                };
                self.plain_symbol(node, self.declared_name(node, ctx), kind)
            }
            Shape::List { .. } | Shape::Set { .. } | Shape::Map { .. } => {
                return Err(CodegenError::UnsupportedMemberTarget {
                    member: node.id.clone(),
                    target: node.id.clone(),
                    found: node.shape.kind_name(),
                })
            }
        };
        Ok(symbol)
    }

    fn primitive_symbol(&self, node: &SchemaNode, kind: PrimitiveKind) -> Result<Symbol> {
        let type_name = self
            .profile
            .primitive_type(kind)
            .ok_or_else(|| CodegenError::UnmappedPrimitive {
                shape: node.id.clone(),
                kind: kind.to_string(),
                language: self.profile.language.to_string(),
            })?;
        let default_value = self.profile.zero_default(kind).map(str::to_string);

        Ok(Symbol {
            shape: node.id.clone(),
            display_name: type_name.to_string(),
            namespace: Vec::new(),
            nullable: default_value.is_none(),
            default_value,
            boxed: false,
            declared_in_file: None,
            dependencies: BTreeSet::new(),
            conformances: BTreeSet::new(),
            kind: SymbolKind::Builtin { primitive: kind },
        })
    }

    fn aggregate_symbol(&self, node: &SchemaNode, ctx: &mut ResolutionContext) -> Symbol {
        let kind = match &node.shape {
            Shape::Union { members } => {
                let variants = self.assign_names(
                    &node.id,
                    members.iter().map(|m| m.name.as_str()),
                    self.profile.variant_casing,
                    None,
                );
                SymbolKind::Union {
                    fallback: self.fallback_for(&node.id, &variants, ctx),
                }
            }
            _ => SymbolKind::Record,
        };
        self.declared_symbol(node, kind, ctx)
    }

    fn enum_symbol(&self, node: &SchemaNode, values: &[EnumValue], ctx: &mut ResolutionContext) -> Symbol {
        let names = self.assign_names(
            &node.id,
            values.iter().map(|v| v.name.as_str()),
            self.profile.variant_casing,
            Some(&mut ctx.diagnostics),
        );
        let fallback = self.fallback_for(&node.id, &names, ctx);
        let variants = names
            .into_iter()
            .zip(values)
            .map(|(name, v)| EnumVariant {
                name,
                value: v.value.clone(),
            })
            .collect();
        self.declared_symbol(node, SymbolKind::Enum { variants, fallback }, ctx)
    }

    /// Symbol for a record, union or enum: its own declaration and file
    fn declared_symbol(&self, node: &SchemaNode, kind: SymbolKind, ctx: &mut ResolutionContext) -> Symbol {
        let display_name = self.declared_name(node, ctx);
        let namespace = self.namespace_for(node);
        let declared_in_file = self.file_for(&namespace, &display_name);

        Symbol {
            shape: node.id.clone(),
            display_name,
            namespace,
            nullable: true,
            default_value: None,
            boxed: false,
            declared_in_file: Some(declared_in_file),
            dependencies: self.declaration_dependencies(node),
            conformances: conformances(node),
            kind,
        }
    }

    fn plain_symbol(&self, node: &SchemaNode, display_name: String, kind: SymbolKind) -> Symbol {
        Symbol {
            shape: node.id.clone(),
            display_name,
            namespace: self.namespace_for(node),
            nullable: false,
            default_value: None,
            boxed: false,
            declared_in_file: None,
            dependencies: BTreeSet::new(),
            conformances: BTreeSet::new(),
            kind,
        }
    }

    /// Build the collections on `ctx.containers`, innermost first.
    ///
    /// A collection is built once every element, key and value target has
    /// a symbol. A target already on the stack is a cycle with no record or
    /// union in between.
    fn build_containers(&self, ctx: &mut ResolutionContext) -> Result<()> {
        while let Some(top) = ctx.containers.last().cloned() {
            let node = self.graph.get_required(&top)?;

            let mut nested = None;
            for member in container_members(&node.shape) {
                let member_id = node.id.with_member(&member.name);
                let target = self.value_target(&member_id, &member.target)?;
                if ctx.table.symbols.contains_key(&target.id) {
                    continue;
                }
                if !is_container(&target.shape) {
                    let symbol = self.leaf_symbol(target, ctx)?;
                    ctx.table.symbols.insert(target.id.clone(), symbol);
                    continue;
                }
                if ctx.containers.contains(&target.id) {
                    return Err(CodegenError::ContainerCycle(target.id.clone()));
                }
                nested = Some(target.id.clone());
                break;
            }

            match nested {
                Some(next) => ctx.containers.push(next),
                None => {
                    let symbol = self.collection_symbol(node, ctx)?;
                    ctx.table.symbols.insert(top, symbol);
                    ctx.containers.pop();
                }
            }
        }
        Ok(())
    }

    /// Symbol of a list, set or map whose targets are all resolved
    fn collection_symbol(&self, node: &SchemaNode, ctx: &mut ResolutionContext) -> Result<Symbol> {
        let (display_name, kind) = match &node.shape {
            Shape::List { member } | Shape::Set { member } => {
                let sparse = member.tags.is_sparse() || node.tags.is_sparse();
                let element = self.element_symbol(node, member, sparse, ctx)?;
                let expr = element.type_expr(self.profile);
                let element = Box::new(element);
                if matches!(node.shape, Shape::Set { .. }) {
                    (self.profile.wrap_set(&expr), SymbolKind::Set { element, sparse })
                } else {
                    (self.profile.wrap_list(&expr), SymbolKind::List { element, sparse })
                }
            }
            Shape::Map { key, value } => {
                let sparse = value.tags.is_sparse() || node.tags.is_sparse();
                let key = self.element_symbol(node, key, false, ctx)?;
                let value = self.element_symbol(node, value, sparse, ctx)?;
                let display_name = self
                    .profile
                    .wrap_map(&key.type_expr(self.profile), &value.type_expr(self.profile));
                let kind = SymbolKind::Map {
                    key: Box::new(key),
                    value: Box::new(value),
                    sparse,
                };
                (display_name, kind)
            }
            _ => return self.leaf_symbol(node, ctx),
        };
        Ok(self.container_symbol(node, display_name, kind))
    }

    fn container_symbol(&self, node: &SchemaNode, display_name: String, kind: SymbolKind) -> Symbol {
        Symbol {
            shape: node.id.clone(),
            display_name,
            namespace: Vec::new(),
            nullable: true,
            default_value: None,
            boxed: false,
            declared_in_file: None,
            dependencies: BTreeSet::new(),
            conformances: BTreeSet::new(),
            kind,
        }
    }

    fn element_symbol(
        &self,
        container: &SchemaNode,
        member: &MemberShape,
        nullable: bool,
        ctx: &mut ResolutionContext,
    ) -> Result<Symbol> {
        let member_id = container.id.with_member(&member.name);
        let target = self.value_target(&member_id, &member.target)?;
        let symbol = ctx
            .table
            .symbols
            .get(&target.id)
            .ok_or_else(|| CodegenError::MissingShape(target.id.clone()))?;
        if target.shape.is_aggregate() {
            ctx.pending.push_back(target.id.clone());
        }
        Ok(symbol.at_use_site(nullable, None, false))
    }

    /// Reference to a shape an operation or service points at
    fn linked(&self, id: &ShapeId, ctx: &mut ResolutionContext) -> Result<SymbolRef> {
        let node = self.graph.get_required(id)?;
        ctx.pending.push_back(id.clone());
        Ok(self.reference_for(node))
    }

    /// Member targets must be values
    fn value_target(&self, member_id: &ShapeId, target: &ShapeId) -> Result<&'a SchemaNode> {
        let node = self.graph.get_required(target)?;
        match node.shape {
            Shape::Operation { .. } | Shape::Service { .. } => {
                Err(CodegenError::UnsupportedMemberTarget {
                    member: member_id.clone(),
                    target: target.clone(),
                    found: node.shape.kind_name(),
                })
            }
            _ => Ok(node),
        }
    }

    // ========== Names and placement ==========

    fn symbol_name(&self, node: &SchemaNode) -> String {
        match node.shape {
            Shape::Operation { .. } => self
                .escaper
                .escape(&self.names.apply(self.profile.operation_casing, node.id.name())),
            _ => self.escaper.escape(&self.names.type_name(&node.id)),
        }
    }

    /// Type name, with a diagnostic when it had to be escaped
    fn declared_name(&self, node: &SchemaNode, ctx: &mut ResolutionContext) -> String {
        let raw = self.names.type_name(&node.id);
        let escaped = self.escaper.escape(&raw);
        if escaped != raw {
            ctx.diagnostics.escaped(&node.id, &raw, &escaped);
        }
        escaped
    }

    fn reference_for(&self, node: &SchemaNode) -> SymbolRef {
        SymbolRef {
            shape: node.id.clone(),
            namespace: self.namespace_for(node),
            name: self.symbol_name(node),
        }
    }

    /// Root namespace, or a path under the owning service
    fn namespace_for(&self, node: &SchemaNode) -> Vec<String> {
        let mut namespace = self.root_namespace.clone();
        if let Some(service) = node.tags.nested_under() {
            namespace.push(self.escaper.escape(&self.names.type_name(service)));
        }
        namespace
    }

    fn file_for(&self, namespace: &[String], display_name: &str) -> String {
        let nested = namespace.get(self.root_namespace.len()..).unwrap_or_default();
        let mut parts: Vec<&str> = Vec::with_capacity(nested.len() + 2);
        if !self.models_dir.is_empty() {
            parts.push(&self.models_dir);
        }
        parts.extend(nested.iter().map(|s| s.trim_matches('`')));
        let file = format!(
            "{}.{}",
            display_name.trim_matches('`').trim_start_matches("r#"),
            self.profile.file_extension
        );
        parts.push(&file);
        parts.join("/")
    }

    /// Cased, escaped, collision-free names for members or variants
    fn assign_names<'n>(
        &self,
        owner: &ShapeId,
        wire_names: impl IntoIterator<Item = &'n str>,
        casing: Casing,
        mut diagnostics: Option<&mut Diagnostics>,
    ) -> Vec<String> {
        let mut taken: BTreeSet<String> = BTreeSet::new();
        let mut names = Vec::new();

        for wire in wire_names {
            let cased = match self.names.apply(casing, wire) {
                name if name.is_empty() => "value".to_string(),
                name => name,
            };
            let mut candidate = cased.clone();
            let mut n = 2;
            while taken.contains(&self.escaper.escape(&candidate)) {
                candidate = format!("{}{}", cased, n);
                n += 1;
            }
            let escaped = self.escaper.escape(&candidate);

            if let Some(diags) = diagnostics.as_deref_mut() {
                let member_id = owner.with_member(wire);
                if candidate != cased {
                    diags.name_collision(&member_id, &cased, &candidate);
                }
                if escaped != candidate {
                    diags.escaped(&member_id, &candidate, &escaped);
                }
            }
            taken.insert(escaped.clone());
            names.push(escaped);
        }
        names
    }

    /// Fallback variant name that differs from every declared variant
    fn fallback_for(&self, owner: &ShapeId, variants: &[String], ctx: &mut ResolutionContext) -> String {
        let wanted = self.escaper.escape(&self.fallback_variant);
        let mut candidate = self.fallback_variant.clone();
        let mut name = wanted.clone();
        while variants.contains(&name) {
            candidate.push('_');
            name = self.escaper.escape(&candidate);
        }
        if name != wanted {
            ctx.diagnostics.fallback_renamed(owner, &wanted, &name);
        }
        name
    }

    // ========== Declaration dependencies ==========

    /// Direct member references, looking through collections down to the
    /// first declared type. Self references are left out.
    fn declaration_dependencies(&self, node: &SchemaNode) -> BTreeSet<SymbolRef> {
        let mut deps = BTreeSet::new();
        let mut seen: HashSet<&ShapeId> = HashSet::new();
        let mut stack: Vec<&ShapeId> = node.shape.members().iter().map(|m| &m.target).rev().collect();

        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            let Some(target) = self.graph.get(id) else {
                continue;
            };
            match &target.shape {
                Shape::Record { .. } | Shape::Union { .. } | Shape::Enum { .. } => {
                    if target.id != node.id {
                        deps.insert(self.reference_for(target));
                    }
                }
                Shape::List { .. } | Shape::Set { .. } | Shape::Map { .. } => {
                    stack.extend(container_members(&target.shape).map(|m| &m.target));
                }
                Shape::Primitive { .. } | Shape::Operation { .. } | Shape::Service { .. } => {}
            }
        }
        deps
    }
}

fn is_container(shape: &Shape) -> bool {
    matches!(shape, Shape::List { .. } | Shape::Set { .. } | Shape::Map { .. })
}

/// Element, or key then value
fn container_members(shape: &Shape) -> impl Iterator<Item = &MemberShape> {
    let (first, second) = match shape {
        Shape::List { member } | Shape::Set { member } => (Some(member), None),
        Shape::Map { key, value } => (Some(key), Some(value)),
        _ => (None, None),
    };
    first.into_iter().chain(second)
}

/// Two declared types may not share a qualified name, or one file would
/// overwrite the other
fn check_declaration_names(table: &SymbolTable) -> Result<()> {
    let mut seen: HashMap<(&[String], &str), &ShapeId> = HashMap::new();
    for (id, symbol) in table.iter().filter(|(_, s)| s.is_declared()) {
        let key = (symbol.namespace.as_slice(), symbol.display_name.as_str());
        if let Some(first) = seen.insert(key, id) {
            return Err(CodegenError::DeclarationCollision {
                name: symbol.display_name.clone(),
                first: first.clone(),
                second: id.clone(),
            });
        }
    }
    Ok(())
}

fn conformances(node: &SchemaNode) -> BTreeSet<Conformance> {
    let mut set = BTreeSet::new();
    if node.tags.requires_equality() || matches!(node.shape, Shape::Enum { .. }) {
        set.insert(Conformance::Equatable);
        set.insert(Conformance::Hashable);
    }
    if node.tags.error_fault().is_some() {
        set.insert(Conformance::Error);
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::diagnostics::DiagnosticCode;
    use crate::codegen::nullability::StructuralNullability;
    use crate::graph::test_support::*;
    use crate::graph::ErrorFault;

    fn primitive(name: &str, kind: PrimitiveKind) -> SchemaNode {
        SchemaNode::new(ShapeId::new("smithy.api", name), Shape::Primitive { kind })
    }

    fn prim_id(name: &str) -> ShapeId {
        ShapeId::new("smithy.api", name)
    }

    fn enum_of(name: &str, values: &[&str]) -> SchemaNode {
        SchemaNode::new(
            id(name),
            Shape::Enum {
                values: values
                    .iter()
                    .map(|v| EnumValue {
                        name: v.to_string(),
                        value: v.to_lowercase(),
                    })
                    .collect(),
            },
        )
    }

    fn resolve_with(graph: &SchemaGraph, profile: &RenderProfile) -> Result<ResolutionContext> {
        let policy = StructuralNullability;
        let resolver = SymbolResolver::new(graph, profile, &policy, &ResolverOptions::default());
        let mut ctx = ResolutionContext::new();
        resolver.resolve_all(&mut ctx)?;
        Ok(ctx)
    }

    fn resolve_swift(graph: &SchemaGraph) -> ResolutionContext {
        resolve_with(graph, &RenderProfile::swift()).unwrap()
    }

    #[test]
    fn test_self_reference_boxes_one_edge() {
        let graph = SchemaGraph::from_nodes([record("Node", &[("next", id("Node"))])]).unwrap();
        let ctx = resolve_swift(&graph);

        let boxed = ctx.table().boxed_members();
        assert_eq!(boxed, BTreeSet::from([id("Node").with_member("next")]));
        let next = ctx.table().member(&id("Node").with_member("next")).unwrap();
        assert_eq!(next.symbol.type_expr(&RenderProfile::swift()), "Box<Node>?");
    }

    #[test]
    fn test_three_cycle_boxes_one_edge() {
        let graph = SchemaGraph::from_nodes([
            record("A", &[("b", id("B"))]),
            record("B", &[("c", id("C"))]),
            record("C", &[("a", id("A"))]),
        ])
        .unwrap();
        let ctx = resolve_swift(&graph);

        assert_eq!(ctx.table().boxed_members(), BTreeSet::from([id("C").with_member("a")]));
    }

    #[test]
    fn test_collection_recursion_is_not_boxed() {
        let graph = SchemaGraph::from_nodes([
            record("Tree", &[("children", id("Trees"))]),
            list_of("Trees", id("Tree")),
        ])
        .unwrap();
        let ctx = resolve_swift(&graph);

        assert!(ctx.table().boxed_members().is_empty());
        let children = ctx.table().member(&id("Tree").with_member("children")).unwrap();
        assert_eq!(children.symbol.type_expr(&RenderProfile::swift()), "[Tree]?");
    }

    #[test]
    fn test_structurally_recursive_tag_forces_box() {
        let graph = SchemaGraph::from_nodes([
            SchemaNode::new(
                id("Wrapper"),
                Shape::Record {
                    members: vec![MemberShape::new("inner", id("Leaf")).tagged(Tag::StructurallyRecursive)],
                },
            ),
            record("Leaf", &[]),
        ])
        .unwrap();
        let ctx = resolve_swift(&graph);
        assert!(ctx.table().is_boxed(&id("Wrapper").with_member("inner")));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let graph = SchemaGraph::from_nodes([
            record("A", &[("b", id("B")), ("me", id("A"))]),
            record("B", &[("a", id("A"))]),
        ])
        .unwrap();
        let profile = RenderProfile::swift();
        let policy = StructuralNullability;
        let resolver = SymbolResolver::new(&graph, &profile, &policy, &ResolverOptions::default());

        let mut ctx = ResolutionContext::new();
        let first = resolver.resolve(&id("A"), &mut ctx).unwrap();
        let second = resolver.resolve(&id("A"), &mut ctx).unwrap();
        assert_eq!(first, second);

        // a fresh context, entered through the other record
        let mut fresh = ResolutionContext::new();
        resolver.resolve(&id("B"), &mut fresh).unwrap();
        assert_eq!(resolver.resolve(&id("A"), &mut fresh).unwrap(), first);
    }

    #[test]
    fn test_nullability_and_zero_defaults() {
        let graph = SchemaGraph::from_nodes([
            primitive("Integer", PrimitiveKind::Integer),
            primitive("Timestamp", PrimitiveKind::Timestamp),
            SchemaNode::new(
                id("City"),
                Shape::Record {
                    members: vec![
                        MemberShape::new("population", prim_id("Integer")).tagged(Tag::Required),
                        MemberShape::new("rank", prim_id("Integer")),
                        MemberShape::new("founded", prim_id("Timestamp")).tagged(Tag::Required),
                        MemberShape::new("zone", prim_id("Integer")).tagged(Tag::Default("7".to_string())),
                    ],
                },
            ),
        ])
        .unwrap();
        let ctx = resolve_swift(&graph);
        let table = ctx.table();
        let member = |name: &str| &table.member(&id("City").with_member(name)).unwrap().symbol;

        assert!(!member("population").nullable);
        assert_eq!(member("population").default_value.as_deref(), Some("0"));
        assert!(member("rank").nullable);
        assert!(member("rank").default_value.is_none());
        assert!(!member("founded").nullable);
        assert!(member("founded").default_value.is_none());
        assert_eq!(member("zone").default_value.as_deref(), Some("7"));

        let integer = table.get(&prim_id("Integer")).unwrap();
        assert!(!integer.nullable);
        assert!(table.get(&prim_id("Timestamp")).unwrap().nullable);
        assert!(table.get(&id("City")).unwrap().nullable);
    }

    #[test]
    fn test_enum_fallback_is_last_and_renamed_on_collision() {
        let graph = SchemaGraph::from_nodes([enum_of("Sky", &["SUNNY", "SDK_UNKNOWN"])]).unwrap();
        let ctx = resolve_swift(&graph);

        let SymbolKind::Enum { variants, fallback } = &ctx.table().get(&id("Sky")).unwrap().kind else {
            panic!("Expected enum symbol");
        };
        let names: Vec<&str> = variants.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["sunny", "sdkUnknown"]);
        assert_eq!(fallback, "sdkUnknown_");
        assert_eq!(
            ctx.diagnostics().with_code(DiagnosticCode::FallbackRenamed).count(),
            1
        );
    }

    #[test]
    fn test_union_variants_and_fallback() {
        let graph = SchemaGraph::from_nodes([
            string(),
            SchemaNode::new(
                id("Precipitation"),
                Shape::Union {
                    members: vec![
                        MemberShape::new("rain", string_id()),
                        MemberShape::new("snow", string_id()),
                    ],
                },
            ),
        ])
        .unwrap();
        let ctx = resolve_with(&graph, &RenderProfile::rust()).unwrap();

        let symbol = ctx.table().get(&id("Precipitation")).unwrap();
        assert_eq!(symbol.kind, SymbolKind::Union { fallback: "Unknown".to_string() });
        let variants: Vec<&str> = ctx
            .table()
            .members(&id("Precipitation"))
            .unwrap()
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(variants, vec!["Rain", "Snow"]);
        assert!(ctx.table().members(&id("Precipitation")).unwrap().iter().all(|m| !m.symbol.nullable));
    }

    #[test]
    fn test_nested_under_service_namespace() {
        let graph = SchemaGraph::from_nodes([
            record("Forecast", &[]).tagged(Tag::NestedUnder(id("Weather"))),
            record("City", &[]),
            service("Weather", &[]),
        ])
        .unwrap();
        let profile = RenderProfile::swift();
        let policy = StructuralNullability;
        let resolver = SymbolResolver::new(&graph, &profile, &policy, &ResolverOptions::default());
        let mut ctx = ResolutionContext::new();
        let forecast = resolver.resolve(&id("Forecast"), &mut ctx).unwrap();
        let city = resolver.resolve(&id("City"), &mut ctx).unwrap();

        assert_eq!(forecast.namespace, vec!["Models", "Weather"]);
        assert_eq!(forecast.declared_in_file.as_deref(), Some("Sources/Models/Weather/Forecast.swift"));
        assert_eq!(city.namespace, vec!["Models"]);
        assert_eq!(city.declared_in_file.as_deref(), Some("Sources/Models/City.swift"));
    }

    #[test]
    fn test_dependencies_stop_at_first_declared_type() {
        let graph = SchemaGraph::from_nodes([
            record("Report", &[("cities", id("CityGrid")), ("region", id("Region")), ("me", id("Report"))]),
            list_of("CityGrid", id("CityRow")),
            list_of("CityRow", id("City")),
            record("City", &[("region", id("Region"))]),
            record("Region", &[("tz", id("Zone"))]),
            record("Zone", &[]),
        ])
        .unwrap();
        let ctx = resolve_swift(&graph);

        let deps: Vec<&ShapeId> = ctx
            .table()
            .declaration_dependencies(&id("Report"))
            .unwrap()
            .iter()
            .map(|d| &d.shape)
            .collect();
        assert_eq!(deps, vec![&id("City"), &id("Region")]);
        assert!(ctx.table().declaration_dependencies(&id("CityGrid")).is_none());
    }

    #[test]
    fn test_operation_as_member_target_is_rejected() {
        let graph = SchemaGraph::from_nodes([
            operation("GetCity", None, None),
            record("Bad", &[("op", id("GetCity"))]),
        ])
        .unwrap();
        match resolve_with(&graph, &RenderProfile::swift()) {
            Err(CodegenError::UnsupportedMemberTarget { member, found, .. }) => {
                assert_eq!(member, id("Bad").with_member("op"));
                assert_eq!(found, "operation");
            }
            other => panic!("Expected UnsupportedMemberTarget, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_container_cycle_is_rejected() {
        let graph = SchemaGraph::from_nodes([list_of("Loop", id("Loop"))]).unwrap();
        assert!(matches!(
            resolve_with(&graph, &RenderProfile::swift()),
            Err(CodegenError::ContainerCycle(_))
        ));
    }

    #[test]
    fn test_container_cycle_through_two_lists_is_rejected() {
        let graph = SchemaGraph::from_nodes([list_of("A", id("B")), list_of("B", id("A"))]).unwrap();
        match resolve_with(&graph, &RenderProfile::swift()) {
            Err(CodegenError::ContainerCycle(at)) => assert_eq!(at, id("A")),
            other => panic!("Expected ContainerCycle, got {:?}", other.map(|_| ())),
        }
    }

    fn chain(depth: usize, back_to_start: bool) -> SchemaGraph {
        let link = |i: usize| id(&format!("Link{}", i));
        SchemaGraph::from_nodes((0..depth).map(|i| {
            let next = match i + 1 {
                n if n < depth => Some(link(n)),
                _ if back_to_start => Some(link(0)),
                _ => None,
            };
            SchemaNode::new(
                link(i),
                Shape::Record {
                    members: next.into_iter().map(|t| MemberShape::new("next", t)).collect(),
                },
            )
        }))
        .unwrap()
    }

    #[test]
    fn test_deep_record_chain_resolves() {
        const DEPTH: usize = 10_000;
        let graph = chain(DEPTH, false);
        let profile = RenderProfile::swift();
        let policy = StructuralNullability;
        let resolver = SymbolResolver::new(&graph, &profile, &policy, &ResolverOptions::default());
        let mut ctx = ResolutionContext::new();

        resolver.resolve(&id("Link0"), &mut ctx).unwrap();

        assert_eq!(ctx.max_depth(), DEPTH);
        assert!(ctx.table().boxed_members().is_empty());
        for i in 0..DEPTH {
            let owner = id(&format!("Link{}", i));
            assert!(ctx.table().members(&owner).is_some(), "{} is unbound", owner);
        }
        let last = ctx.table().member(&id("Link9998").with_member("next")).unwrap();
        assert_eq!(last.symbol.type_expr(&profile), "Link9999?");
    }

    #[test]
    fn test_deep_cycle_boxes_only_the_closing_edge() {
        let ctx = resolve_swift(&chain(10_000, true));
        assert_eq!(
            ctx.table().boxed_members(),
            BTreeSet::from([id("Link9999").with_member("next")])
        );
    }

    #[test]
    fn test_nested_collections_resolve_inside_out() {
        const DEPTH: usize = 300;
        let level = |i: usize| id(&format!("Level{}", i));
        let lists = (0..DEPTH).map(|i| {
            let element = if i + 1 < DEPTH { level(i + 1) } else { id("Leaf") };
            SchemaNode::new(
                level(i),
                Shape::List {
                    member: MemberShape::new("member", element),
                },
            )
        });
        let graph = SchemaGraph::from_nodes(lists.chain([record("Leaf", &[])])).unwrap();
        let ctx = resolve_swift(&graph);

        let outer = ctx.table().get(&level(0)).unwrap();
        let expected = format!("{}Leaf{}", "[".repeat(DEPTH), "]".repeat(DEPTH));
        assert_eq!(outer.display_name, expected);
        // the record at the bottom is still bound
        assert!(ctx.table().members(&id("Leaf")).is_some());
    }

    #[test]
    fn test_declared_names_must_be_unique() {
        let graph = SchemaGraph::from_nodes([
            SchemaNode::new(ShapeId::new("a.b", "Thing"), Shape::Record { members: vec![] }),
            SchemaNode::new(ShapeId::new("c.d", "Thing"), Shape::Record { members: vec![] }),
        ])
        .unwrap();

        match resolve_with(&graph, &RenderProfile::swift()) {
            Err(CodegenError::DeclarationCollision { name, first, second }) => {
                assert_eq!(name, "Thing");
                assert_eq!(first, ShapeId::new("a.b", "Thing"));
                assert_eq!(second, ShapeId::new("c.d", "Thing"));
            }
            other => panic!("Expected DeclarationCollision, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_unmapped_primitive_is_fatal() {
        let graph = SchemaGraph::from_nodes([
            primitive("BigDecimal", PrimitiveKind::BigDecimal),
            record("Price", &[("amount", prim_id("BigDecimal"))]),
        ])
        .unwrap();
        assert!(matches!(
            resolve_with(&graph, &RenderProfile::swift()),
            Err(CodegenError::UnmappedPrimitive { .. })
        ));
        assert!(resolve_with(&graph, &RenderProfile::rust()).is_ok());
    }

    #[test]
    fn test_conformances_from_tags() {
        let graph = SchemaGraph::from_nodes([
            record("Key", &[]).tagged(Tag::DerivedEqualityRequired),
            record("NotFound", &[]).tagged(Tag::ErrorMarker(ErrorFault::Client)),
            enum_of("Sky", &["SUNNY"]),
        ])
        .unwrap();
        let ctx = resolve_swift(&graph);
        let conf = |name: &str| ctx.table().get(&id(name)).unwrap().conformances.clone();

        assert_eq!(conf("Key"), BTreeSet::from([Conformance::Equatable, Conformance::Hashable]));
        assert_eq!(conf("NotFound"), BTreeSet::from([Conformance::Error]));
        assert!(conf("Sky").contains(&Conformance::Hashable));
    }

    #[test]
    fn test_sparse_list_elements_are_nullable() {
        let graph = SchemaGraph::from_nodes([
            string(),
            list_of("Names", string_id()).tagged(Tag::ElementNullable),
        ])
        .unwrap();
        let ctx = resolve_swift(&graph);

        let names = ctx.table().get(&id("Names")).unwrap();
        assert_eq!(names.display_name, "[String?]");
        assert!(matches!(names.kind, SymbolKind::List { sparse: true, .. }));
    }

    #[test]
    fn test_reserved_member_names_are_escaped() {
        let graph = SchemaGraph::from_nodes([
            string(),
            record("Settings", &[("protocol", string_id()), ("Protocol", string_id())]),
        ])
        .unwrap();
        let ctx = resolve_swift(&graph);
        let table = ctx.table();

        assert_eq!(
            table.member_name(&id("Settings").with_member("protocol")),
            Some("`protocol`")
        );
        // both case to `protocol`; the second one gets a suffix
        assert_eq!(
            table.member_name(&id("Settings").with_member("Protocol")),
            Some("protocol2")
        );
        assert!(ctx.diagnostics().with_code(DiagnosticCode::EscapedIdentifier).count() >= 1);
        assert_eq!(ctx.diagnostics().with_code(DiagnosticCode::NameCollision).count(), 1);
    }

    #[test]
    fn test_operation_symbol_links_records() {
        let graph = SchemaGraph::from_nodes([
            record("GetCityInput", &[]),
            record("GetCityOutput", &[]),
            operation("GetCity", Some("GetCityInput"), Some("GetCityOutput")),
            service("Weather", &["GetCity"]),
        ])
        .unwrap();
        let ctx = resolve_swift(&graph);

        let op = ctx.table().get(&id("GetCity")).unwrap();
        assert_eq!(op.display_name, "getCity");
        let SymbolKind::Operation { input, output, .. } = &op.kind else {
            panic!("Expected operation symbol");
        };
        assert_eq!(input.as_ref().unwrap().name, "GetCityInput");
        assert_eq!(output.as_ref().unwrap().shape, id("GetCityOutput"));
        // reached through the operation, so bound as well
        assert!(ctx.table().members(&id("GetCityInput")).is_some());
    }
}
