//! Pipeline Tests
//!
//! Runs the whole pipeline over graph snapshots in tests/fixtures and checks
//! what emitters would see.

use std::collections::{BTreeMap, BTreeSet};

use familiar_codegen::codegen::{Conformance, DiagnosticCode, Language, SymbolKind};
use familiar_codegen::graph::{
    compute_equality_closure, normalize, EdgeKind, NormalizeOptions, Shape,
};
use familiar_codegen::{CodegenContext, GeneratorConfig, SchemaGraph, ShapeId, Tag};

fn load(name: &str) -> SchemaGraph {
    let path = format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name);
    let json = std::fs::read_to_string(&path).unwrap();
    SchemaGraph::from_json(&json).unwrap()
}

fn weather(name: &str) -> ShapeId {
    ShapeId::new("example.weather", name)
}

fn synthetic(name: &str) -> ShapeId {
    ShapeId::new("familiar.synthetic", name)
}

fn build(name: &str, config: &GeneratorConfig) -> CodegenContext {
    CodegenContext::build(load(name), config).unwrap()
}

// =============================================================================
// Normalization
// =============================================================================

#[test]
fn test_every_operation_owns_its_records() {
    let ctx = build("weather_service.json", &GeneratorConfig::default());
    let graph = ctx.graph();

    let mut owners: BTreeMap<ShapeId, Vec<ShapeId>> = BTreeMap::new();
    for op in graph.operations() {
        let Shape::Operation { input, output, .. } = &op.shape else {
            panic!("operations() yielded {}", op.shape.kind_name());
        };
        // totality
        let input = input.clone().unwrap();
        let output = output.clone().unwrap();
        owners.entry(input).or_default().push(op.id.clone());
        owners.entry(output).or_default().push(op.id.clone());
    }

    assert_eq!(owners.len(), 6);
    for (record, ops) in &owners {
        assert_eq!(ops.len(), 1, "{} is shared by {:?}", record, ops);
        assert_eq!(record.namespace(), "familiar.synthetic");
    }
}

#[test]
fn test_shared_output_example() {
    let original = load("shared_output.json");
    let (graph, report) = normalize(&original, &NormalizeOptions::default()).unwrap();

    let op1_input = graph.get(&synthetic("Op1Input")).unwrap();
    assert!(op1_input.shape.members().is_empty());
    assert!(op1_input.tags.contains(&Tag::Synthetic));
    assert!(report.synthesized.contains(&synthetic("Op1Input")));

    let record_x = ShapeId::new("example.shared", "RecordX");
    let op1_output = graph.get(&synthetic("Op1Output")).unwrap();
    assert!(op1_output.shape.members().is_empty());
    assert_eq!(op1_output.tags.clone_of(), Some(&record_x));

    // every normalized operation gets its own clone, never a shared one
    let op2 = ShapeId::new("example.shared", "Op2");
    assert_eq!(
        graph.targets(&op2, EdgeKind::Output),
        vec![&synthetic("Op2Output")]
    );
    assert!(graph.sources(&record_x, EdgeKind::Output).is_empty());
}

#[test]
fn test_normalizing_twice_is_a_no_op() {
    let options = NormalizeOptions::default();
    let (once, _) = normalize(&load("weather_service.json"), &options).unwrap();
    let (twice, report) = normalize(&once, &options).unwrap();

    assert_eq!(once.fingerprint().unwrap(), twice.fingerprint().unwrap());
    assert!(report.cloned.is_empty());
    assert!(report.synthesized.is_empty());
    assert_eq!(report.untouched.len(), 3);
}

#[test]
fn test_snapshot_survives_save_and_load() {
    let graph = load("weather_service.json");
    let reloaded = SchemaGraph::from_json(&graph.to_json().unwrap()).unwrap();
    assert_eq!(graph.fingerprint().unwrap(), reloaded.fingerprint().unwrap());
    assert_eq!(graph.edge_count(), reloaded.edge_count());
}

// =============================================================================
// Closure
// =============================================================================

#[test]
fn test_set_element_closure_example() {
    let mut graph = load("set_closure.json");
    let report = compute_equality_closure(&mut graph).unwrap();

    let id = |name: &str| ShapeId::new("example.closure", name);
    assert_eq!(report.tagged, BTreeSet::from([id("RecordY"), id("RecordZ")]));
    assert!(!graph.get(&id("RecordW")).unwrap().tags.requires_equality());
}

#[test]
fn test_closure_reaches_resolved_conformances() {
    let ctx = build("weather_service.json", &GeneratorConfig::default());
    let symbols = ctx.symbols();

    let hashable = BTreeSet::from([Conformance::Equatable, Conformance::Hashable]);
    assert_eq!(symbols.get(&weather("Condition")).unwrap().conformances, hashable);
    assert_eq!(symbols.get(&weather("Detail")).unwrap().conformances, hashable);
    assert!(symbols.get(&synthetic("GetForecastOutput")).unwrap().conformances.is_empty());
    assert!(symbols
        .get(&weather("NoSuchCity"))
        .unwrap()
        .conformances
        .contains(&Conformance::Error));
}

// =============================================================================
// Resolution
// =============================================================================

#[test]
fn test_every_reachable_shape_has_a_symbol() {
    let ctx = build("weather_service.json", &GeneratorConfig::default());

    for id in ctx.graph().reachable_from_services() {
        assert!(ctx.symbols().contains(&id), "no symbol for {}", id);
    }
    assert!(!ctx.symbols().contains(&weather("Orphan")));
}

#[test]
fn test_cycle_safety() {
    let ctx = build("cycles.json", &GeneratorConfig::default());
    let id = |name: &str| ShapeId::new("example.cycles", name);

    assert_eq!(
        ctx.symbols().boxed_members(),
        BTreeSet::from([id("Node").with_member("next"), id("C").with_member("a")])
    );
    assert_eq!(ctx.scc_count(), 2);
}

#[test]
fn test_weather_members_in_swift() {
    let ctx = build("weather_service.json", &GeneratorConfig::default());
    let symbols = ctx.symbols();
    let profile = ctx.profile();

    let parent = symbols.member(&weather("City").with_member("parent")).unwrap();
    assert_eq!(parent.symbol.type_expr(profile), "Box<City>?");

    let city = symbols.member(&synthetic("GetCityOutput").with_member("city")).unwrap();
    assert_eq!(city.symbol.type_expr(profile), "City");

    let protocol = synthetic("GetCityOutput").with_member("protocol");
    assert_eq!(symbols.member_name(&protocol), Some("`protocol`"));

    let days = symbols.member(&synthetic("GetForecastOutput").with_member("days")).unwrap();
    assert_eq!(days.symbol.type_expr(profile), "[Int]?");

    let sky = symbols.get(&weather("Sky")).unwrap();
    let SymbolKind::Enum { variants, fallback } = &sky.kind else {
        panic!("Sky resolved to {:?}", sky.kind);
    };
    let names: Vec<&str> = variants.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["clear", "cloudy"]);
    assert_eq!(fallback, "sdkUnknown");
}

#[test]
fn test_weather_members_in_rust() {
    let mut config = GeneratorConfig::default();
    config.target.language = Language::Rust;
    config.target.models_dir = "src/models".to_string();
    let ctx = build("weather_service.json", &config);
    let symbols = ctx.symbols();

    let parent = symbols.member(&weather("City").with_member("parent")).unwrap();
    assert_eq!(parent.symbol.type_expr(ctx.profile()), "Option<Box<City>>");

    let request = synthetic("GetCityInput").with_member("cityId");
    assert_eq!(symbols.member_name(&request), Some("city_id"));

    let city = ctx.declaration(&weather("City")).unwrap();
    assert_eq!(city.file(), Some("src/models/City.rs"));
}

// =============================================================================
// Emitter projection
// =============================================================================

#[test]
fn test_declarations_are_ordered_dependencies_first() {
    let ctx = build("weather_service.json", &GeneratorConfig::default());
    let order = ctx.declaration_order();
    let position = |id: &ShapeId| {
        order
            .iter()
            .position(|o| o == id)
            .unwrap_or_else(|| panic!("{} is not declared", id))
    };

    assert!(position(&weather("City")) < position(&synthetic("GetCityOutput")));
    assert!(position(&weather("City")) < position(&synthetic("ListCitiesOutput")));
    assert!(position(&weather("Detail")) < position(&weather("Condition")));
    assert!(position(&weather("Precipitation")) < position(&weather("Condition")));
    assert!(position(&weather("Condition")) < position(&synthetic("GetForecastOutput")));
    assert!(position(&weather("Sky")) < position(&synthetic("GetForecastOutput")));

    // collections and primitives are never declared
    assert!(!order.contains(&weather("Conditions")));
    assert!(!order.contains(&ShapeId::new("smithy.api", "String")));

    let forecast = ctx.declaration(&synthetic("GetForecastOutput")).unwrap();
    let deps: BTreeSet<ShapeId> = forecast.dependencies.iter().map(|d| d.shape.clone()).collect();
    assert_eq!(deps, BTreeSet::from([weather("Condition"), weather("Sky")]));
}

#[test]
fn test_pipeline_diagnostics() {
    let ctx = build("weather_service.json", &GeneratorConfig::default());
    let diagnostics = ctx.diagnostics();

    let cloned: BTreeSet<&ShapeId> = diagnostics
        .with_code(DiagnosticCode::SharedRecordCloned)
        .map(|d| &d.shape)
        .collect();
    assert_eq!(
        cloned,
        BTreeSet::from([
            &synthetic("GetCityInput"),
            &synthetic("GetForecastInput"),
            &synthetic("GetCityOutput"),
            &synthetic("ListCitiesOutput"),
        ])
    );
    assert_eq!(diagnostics.with_code(DiagnosticCode::RecordSynthesized).count(), 1);
    assert!(diagnostics.with_code(DiagnosticCode::EscapedIdentifier).count() >= 2);
    assert!(!diagnostics.has_warnings());
}
