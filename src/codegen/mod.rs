//! Code Generation
//!
//! Runs the generation pipeline over a schema graph and exposes the result
//! to emitters.
//!
//! Architecture:
//! - CodegenContext: Immutable after build() - holds all pipeline results
//! - Declaration: Pure projection of one declared type (record, union, enum)
//! - Emitters (outside this crate) consume Declarations and the symbol table
//!
//! Pipeline order is fixed: normalize, then equality closure, then symbol
//! resolution, then a check that every inline cycle got a boxed member.

pub mod config;
pub mod diagnostics;
pub mod escape;
pub mod names;
pub mod nullability;
pub mod symbols;

pub use config::{Casing, Language, NamingConfig, RenderProfile};
pub use diagnostics::{DiagnosticCode, DiagnosticItem, Diagnostics, Severity};
pub use escape::{reserved_words, EscapeStyle, IdentifierEscaper};
pub use names::NameResolver;
pub use nullability::{
    ClientOptionalNullability, NullabilityMode, NullabilityPolicy, StructuralNullability,
};
pub use symbols::{
    Conformance, EnumVariant, MemberSymbol, ResolutionContext, ResolverOptions, Symbol, SymbolKind,
    SymbolRef, SymbolResolver, SymbolTable,
};

use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeSet, HashMap};
use tracing::info;

use crate::config::GeneratorConfig;
use crate::error::{CodegenError, Result};
use crate::graph::analysis::unbroken_cycles;
use crate::graph::{
    compute_equality_closure, compute_scc_analysis, normalize, ClosureReport, EdgeKind,
    NormalizeReport, SchemaGraph, SccAnalysis, ShapeId,
};

// =============================================================================
// Declaration
// =============================================================================

/// A Declaration is a pure projection of pipeline results for one declared type.
///
/// It contains ONLY what an emitter needs - no graph access.
#[derive(Debug, Clone)]
pub struct Declaration {
    pub symbol: Symbol,

    /// Member bindings (records) or variants (unions), in schema order
    pub members: Vec<MemberSymbol>,

    /// Declared types this one refers to directly
    pub dependencies: Vec<SymbolRef>,

    /// Inline-cycle group, if this type is recursive
    pub scc_group: Option<usize>,
}

impl Declaration {
    /// Check if a member needs boxing
    pub fn needs_boxing(&self, wire_name: &str) -> bool {
        self.members
            .iter()
            .any(|m| m.wire_name == wire_name && m.symbol.boxed)
    }

    pub fn file(&self) -> Option<&str> {
        self.symbol.declared_in_file.as_deref()
    }
}

// =============================================================================
// CodegenContext
// =============================================================================

/// Immutable codegen context - frozen after build().
pub struct CodegenContext {
    /// The normalized, closure-tagged graph
    graph: SchemaGraph,

    profile: RenderProfile,

    symbols: SymbolTable,

    /// Inline-cycle analysis of the final graph
    scc_analysis: SccAnalysis,

    normalize_report: NormalizeReport,

    closure_report: ClosureReport,

    /// Diagnostics collected during the pipeline
    diagnostics: Diagnostics,
}

impl CodegenContext {
    /// Run the whole pipeline over `graph`.
    ///
    /// Returns the first fatal fault; nothing partial is ever returned.
    pub fn build(graph: SchemaGraph, config: &GeneratorConfig) -> Result<Self> {
        let mut diagnostics = Diagnostics::new();

        // Phase 1: give every operation its own input/output records
        let (mut normalized, normalize_report) = normalize(&graph, &config.normalize)?;
        report_normalization(&graph, &normalized, &normalize_report, &mut diagnostics);

        // Phase 2: propagate the equality requirement
        let closure_report = compute_equality_closure(&mut normalized)?;

        // Phase 3: resolve symbols
        let profile = config.profile();
        let policy = config.symbols.nullability.policy();
        let options = config.resolver_options();
        let mut ctx = ResolutionContext::new();
        SymbolResolver::new(&normalized, &profile, policy.as_ref(), &options)
            .resolve_all(&mut ctx)?;
        let (symbols, resolve_diagnostics) = ctx.into_parts();
        diagnostics.merge(resolve_diagnostics);

        // Phase 4: every emitted inline cycle must contain a boxed member
        let unbroken = unbroken_cycles(&normalized, |member| {
            symbols.is_boxed(member) || symbols.members(&member.root()).is_none()
        });
        if let Some(group) = unbroken.into_iter().next() {
            return Err(CodegenError::MissingIndirection {
                members: group.members,
            });
        }
        let scc_analysis = compute_scc_analysis(&normalized);

        info!(
            shapes = normalized.len(),
            symbols = symbols.len(),
            equality_tagged = closure_report.tagged.len(),
            recursive_groups = scc_analysis.groups.len(),
            diagnostics = diagnostics.len(),
            "built codegen context"
        );

        Ok(Self {
            graph: normalized,
            profile,
            symbols,
            scc_analysis,
            normalize_report,
            closure_report,
            diagnostics,
        })
    }

    /// Extract the Declaration for a shape, if it is a declared type
    pub fn declaration(&self, id: &ShapeId) -> Option<Declaration> {
        let symbol = self.symbols.get(id).filter(|s| s.is_declared())?;
        Some(Declaration {
            symbol: symbol.clone(),
            members: self
                .symbols
                .members(id)
                .map(<[MemberSymbol]>::to_vec)
                .unwrap_or_default(),
            dependencies: symbol.dependencies.iter().cloned().collect(),
            scc_group: self.scc_analysis.get_scc(id).map(|g| g.id),
        })
    }

    /// All declarations, dependencies first.
    ///
    /// Mutually dependent declarations come out adjacent, in id order.
    pub fn declarations(&self) -> Vec<Declaration> {
        self.declaration_order()
            .iter()
            .filter_map(|id| self.declaration(id))
            .collect()
    }

    /// Declared shape ids in dependency order
    pub fn declaration_order(&self) -> Vec<ShapeId> {
        let declared: Vec<&Symbol> = self
            .symbols
            .iter()
            .map(|(_, s)| s)
            .filter(|s| s.is_declared())
            .collect();

        let mut deps: DiGraph<&ShapeId, ()> = DiGraph::new();
        let mut indices: HashMap<&ShapeId, NodeIndex> = HashMap::new();
        for symbol in &declared {
            indices.insert(&symbol.shape, deps.add_node(&symbol.shape));
        }
        for symbol in &declared {
            for dep in &symbol.dependencies {
                if let Some(&to) = indices.get(&dep.shape) {
                    deps.add_edge(indices[&symbol.shape], to, ());
                }
            }
        }

        // kosaraju yields SCCs in postorder: dependencies first
        kosaraju_scc(&deps)
            .into_iter()
            .flat_map(|scc| {
                let mut group: Vec<ShapeId> = scc.into_iter().map(|idx| deps[idx].clone()).collect();
                group.sort();
                group
            })
            .collect()
    }

    /// Operation records that share a source record
    pub fn clones_of(&self, source: &ShapeId) -> BTreeSet<&ShapeId> {
        self.graph
            .nodes()
            .filter(|n| n.tags.clone_of() == Some(source))
            .map(|n| &n.id)
            .collect()
    }

    /// Get the normalized graph
    pub fn graph(&self) -> &SchemaGraph {
        &self.graph
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn profile(&self) -> &RenderProfile {
        &self.profile
    }

    /// Get diagnostics
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn normalize_report(&self) -> &NormalizeReport {
        &self.normalize_report
    }

    pub fn closure_report(&self) -> &ClosureReport {
        &self.closure_report
    }

    pub fn scc_analysis(&self) -> &SccAnalysis {
        &self.scc_analysis
    }

    /// Get SCC count
    pub fn scc_count(&self) -> usize {
        self.scc_analysis.groups.len()
    }
}

/// Diagnostics for records that normalization cloned or created
fn report_normalization(
    original: &SchemaGraph,
    normalized: &SchemaGraph,
    report: &NormalizeReport,
    diagnostics: &mut Diagnostics,
) {
    for id in &report.cloned {
        let Some(source) = normalized.get(id).and_then(|n| n.tags.clone_of()) else {
            continue;
        };
        let users: BTreeSet<&ShapeId> = original
            .sources(source, EdgeKind::Input)
            .into_iter()
            .chain(original.sources(source, EdgeKind::Output))
            .collect();
        if users.len() > 1 {
            diagnostics.push(
                DiagnosticItem::new(
                    id.clone(),
                    DiagnosticCode::SharedRecordCloned,
                    format!("{} is shared by {} operations, cloned", source, users.len()),
                )
                .with_context(format!("Clone of {}", source)),
            );
        }
    }
    for id in &report.synthesized {
        diagnostics.push(DiagnosticItem::new(
            id.clone(),
            DiagnosticCode::RecordSynthesized,
            "operation declared no record, created an empty one",
        ));
    }
}
