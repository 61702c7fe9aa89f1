//! Familiar Codegen
//!
//! The language-independent core of the Familiar client generator. It takes
//! an already validated schema graph and prepares it for emission into
//! Swift, Rust, TypeScript or Python.
//!
//! ## Pipeline
//!
//! ```text
//! SchemaGraph
//!   └─ normalize          every operation owns its input/output records
//!       └─ closure        records reachable from set elements need equality
//!           └─ resolve    one Symbol per shape, recursive members boxed
//!               └─ verify every inline cycle has a boxed member
//!                   └─ CodegenContext  (declarations in dependency order)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use familiar_codegen::{CodegenContext, GeneratorConfig, SchemaGraph};
//!
//! # fn main() -> familiar_codegen::Result<()> {
//! let graph = SchemaGraph::from_json(&std::fs::read_to_string("weather.json")?)?;
//! let ctx = CodegenContext::build(graph, &GeneratorConfig::load()?)?;
//! for decl in ctx.declarations() {
//!     println!("{} -> {:?}", decl.symbol.display_name, decl.file());
//! }
//! # Ok(())
//! # }
//! ```

pub mod codegen;
pub mod config;
pub mod error;
pub mod graph;

pub use codegen::{
    CodegenContext, Declaration, Diagnostics, IdentifierEscaper, Language, NullabilityMode,
    NullabilityPolicy, RenderProfile, Symbol, SymbolKind, SymbolRef, SymbolResolver, SymbolTable,
};
pub use config::GeneratorConfig;
pub use error::{CodegenError, Result};
pub use graph::{SchemaGraph, SchemaNode, Shape, ShapeId, Tag};
