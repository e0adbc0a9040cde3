//! End-to-end runs over the sample artifacts in `tests/samples`.

use std::path::PathBuf;

use refscope::prelude::*;

fn sample(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/samples")
        .join(name)
}

fn analyze_modules() -> AnalysisResult {
    ModuleAnalysis::new()
        .with_dump(sample("Lib.il"))
        .unwrap()
        .with_dump(sample("App.il"))
        .unwrap()
        .with_redirect_config(sample("App.exe.config"))
        .unwrap()
        .with_root("App")
        .build()
        .unwrap()
}

fn edge<'a>(graph: &'a DependencyGraph, from: &str, to: &str) -> Option<&'a GraphEdge> {
    graph
        .edges()
        .iter()
        .find(|edge| edge.from == from && edge.to == to)
}

#[test]
fn modules_end_to_end() {
    let result = analyze_modules();
    assert!(result.is_complete_success());
    assert_eq!(result.merged_count, 2);

    let table = result.table();
    assert_eq!(table.len(), 4);

    let json = table.get("Newtonsoft.Json").unwrap();
    assert_eq!(json.identity.version, AssemblyVersion::new(13, 0, 0, 0));
    assert_eq!(
        json.identity.public_key_token.as_ref().unwrap().as_str(),
        "30ad4fe6b2a6aeed"
    );
    assert!(json.has_version_spread());

    let lib = table.get("Lib").unwrap();
    assert!(lib.declared);
    assert_eq!(lib.refs.len(), 1);
    assert_eq!(lib.refs[0].name, "App");

    // Lib is redirected to 1.2.0.0 but only 1.0.0.0 exists
    let conflicts: Vec<ReferenceCheck> = result
        .checks()
        .into_iter()
        .filter(|check| check.is_conflict)
        .collect();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].referrer, "App");
    assert_eq!(conflicts[0].target, "Lib");
    assert_eq!(conflicts[0].effective, AssemblyVersion::new(1, 2, 0, 0));

    let graph = result.graph();
    assert_eq!(graph.node_count(), 4);
    assert_eq!(graph.edge_count(), 5);
    assert!(graph.node("Lib").unwrap().is_conflict);
    assert_eq!(edge(&graph, "App", "Lib").unwrap().kind, EdgeKind::Primary);
    assert_eq!(
        edge(&graph, "Lib", "Newtonsoft.Json").unwrap().label.as_deref(),
        Some("6.0.0.0 → 13.0.0.0")
    );

    let simplified = result.simplified(&SimplifyOptions::default());
    assert!(simplified.node("mscorlib").is_none());
    assert_eq!(simplified.node_count(), 3);
    assert_eq!(simplified.edge_count(), 3);
    assert_eq!(simplified.root().unwrap().name, "App");
    assert_eq!(simplify(&simplified, &SimplifyOptions::default()), simplified);

    let dot = simplified.to_dot(Some("App"));
    assert!(dot.starts_with("digraph"));
    assert!(dot.contains("fillcolor=salmon"));
    assert!(dot.contains("fillcolor=aquamarine"));
    assert!(!dot.contains("mscorlib"));
}

#[test]
fn merge_order_does_not_matter() {
    let forward = ModuleAnalysis::new()
        .with_dump(sample("Lib.il"))
        .unwrap()
        .with_dump(sample("App.il"))
        .unwrap()
        .build()
        .unwrap();
    let backward = ModuleAnalysis::new()
        .with_dump(sample("App.il"))
        .unwrap()
        .with_dump(sample("Lib.il"))
        .unwrap()
        .build()
        .unwrap();

    for record in forward.table() {
        let other = backward.table().get(record.name()).unwrap();
        assert_eq!(record.identity.version, other.identity.version);
        assert_eq!(
            record.identity.public_key_token,
            other.identity.public_key_token
        );
        assert_eq!(record.observed_versions, other.observed_versions);
    }
}

#[test]
fn cache_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join("assemblies.json");

    let original = analyze_modules();
    original.table().save(&cache).unwrap();

    let reloaded = ModuleAnalysis::new()
        .with_table(AssemblyTable::load(&cache).unwrap())
        .with_redirect_config(sample("App.exe.config"))
        .unwrap()
        .with_root("App")
        .build()
        .unwrap();

    assert_eq!(reloaded.merged_count, 0);
    assert_eq!(reloaded.table().len(), original.table().len());
    assert_eq!(reloaded.graph(), original.graph());
    assert_eq!(reloaded.checks(), original.checks());
}

#[test]
fn corrupt_cache_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join("assemblies.json");
    std::fs::write(&cache, "{ not json").unwrap();

    assert!(matches!(AssemblyTable::load(&cache), Err(Error::Cache(_))));
}

#[test]
fn conflicts_end_to_end() {
    let conflicts = ConflictAnalysis::new()
        .parse_file(sample("build.log"))
        .unwrap();

    assert_eq!(conflicts.root().unwrap().name, "App");
    assert!(conflicts.is_conflict("Foo"));
    assert!(!conflicts.is_conflict("Bar"));

    let graph = DependencyGraph::from_conflicts(&conflicts);
    let primary = edge(&graph, "Bar", "Foo").unwrap();
    assert_eq!(primary.kind, EdgeKind::Primary);
    assert_eq!(primary.label.as_deref(), Some("3.0.0.0"));
    assert_eq!(edge(&graph, "Baz", "Foo").unwrap().kind, EdgeKind::Secondary);
    assert_eq!(edge(&graph, "Lib", "Bar").unwrap().kind, EdgeKind::Structural);

    let dot = simplify(&graph, &SimplifyOptions::default()).to_dot(None);
    assert!(dot.contains("color=blue"));
}

#[test]
fn combined_graph_shares_nodes() {
    let modules = analyze_modules().graph();
    let conflicts = DependencyGraph::from_conflicts(
        &ConflictAnalysis::new()
            .parse_file(sample("build.log"))
            .unwrap(),
    );

    let combined = modules.union(&conflicts);
    assert_eq!(
        combined.nodes().iter().filter(|node| node.name == "Lib").count(),
        1
    );
    assert!(combined.node("Foo").unwrap().is_conflict);
    assert!(combined.node("App").unwrap().is_root);
    assert_eq!(
        combined.edge_count(),
        modules.edge_count() + conflicts.edge_count()
    );
}

#[test]
fn missing_inputs_are_reported() {
    assert!(matches!(
        ModuleAnalysis::new().with_dump(sample("Missing.il")),
        Err(Error::NoInput(_))
    ));
    assert!(matches!(
        ConflictAnalysis::new().parse("Build started.\nBuild succeeded.\n"),
        Err(Error::MissingRootProject)
    ));
}
