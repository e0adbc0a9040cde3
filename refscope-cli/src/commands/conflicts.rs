use std::path::Path;

use anyhow::{bail, Context};
use refscope::{conflicts::ConflictGraph, graph::DependencyGraph, project::ConflictAnalysis};
use serde::Serialize;

use crate::{
    app::GlobalOptions,
    commands::common::{has_project_descriptor, run_build},
    output::{emit_dot, print_output, prepare_graph, Align, TabWriter},
};

#[derive(Debug, Serialize)]
struct CauseEntry {
    via: String,
    version: String,
    primary: bool,
}

#[derive(Debug, Serialize)]
struct ConflictEntry {
    name: String,
    causes: Vec<CauseEntry>,
}

#[derive(Debug, Serialize)]
struct ConflictsOutput {
    project: Option<String>,
    conflicts: Vec<ConflictEntry>,
    nodes: usize,
    edges: usize,
    graph_file: Option<String>,
}

pub fn run(
    path: &Path,
    max_reports: Option<usize>,
    msbuild: &str,
    output: Option<&Path>,
    raw: bool,
    opts: &GlobalOptions,
) -> anyhow::Result<()> {
    let mut analysis = ConflictAnalysis::new();
    if let Some(max) = max_reports {
        analysis = analysis.with_max_reports(max);
    }

    let conflicts = if path.is_dir() {
        if !has_project_descriptor(path)? {
            bail!(
                "no .csproj or .sln file found in {}, nothing to build",
                path.display()
            );
        }
        log::info!("Building {}", path.display());
        let log = run_build(msbuild, path)?;
        analysis.parse(&log)?
    } else {
        analysis
            .parse_file(path)
            .with_context(|| format!("failed to parse build log: {}", path.display()))?
    };

    let project = conflicts.root().map(|root| root.name.clone());
    let graph = prepare_graph(DependencyGraph::from_conflicts(&conflicts), raw);
    let graph_file = emit_dot(&graph.to_dot(project.as_deref()), output, opts)?;

    let summary = ConflictsOutput {
        project,
        conflicts: summarize(&conflicts),
        nodes: graph.node_count(),
        edges: graph.edge_count(),
        graph_file,
    };
    // DOT already went to stdout; the human summary only accompanies a graph file
    if opts.json || output.is_some() {
        print_output(&summary, opts, print_summary)?;
    }
    Ok(())
}

/// For each conflicting assembly, the assemblies whose references caused it.
fn summarize(conflicts: &ConflictGraph) -> Vec<ConflictEntry> {
    conflicts
        .nodes()
        .filter(|node| node.is_conflict)
        .map(|node| ConflictEntry {
            name: node.name.clone(),
            causes: node
                .references
                .iter()
                .map(|edge| CauseEntry {
                    via: edge.target.clone(),
                    version: edge
                        .version
                        .map_or_else(|| "-".to_string(), |version| version.to_string()),
                    primary: edge.is_primary,
                })
                .collect(),
        })
        .collect()
}

fn print_summary(output: &ConflictsOutput) {
    if let Some(project) = &output.project {
        println!("Project: {project}");
    }
    println!("Conflicting assemblies: {}", output.conflicts.len());
    println!();

    let mut tw = TabWriter::new(vec![
        ("Assembly", Align::Left),
        ("Requested By", Align::Left),
        ("Version", Align::Left),
        ("Primary", Align::Left),
    ]);
    for conflict in &output.conflicts {
        for cause in &conflict.causes {
            tw.row(vec![
                conflict.name.clone(),
                cause.via.clone(),
                cause.version.clone(),
                if cause.primary { "yes" } else { "" }.to_string(),
            ]);
        }
    }
    tw.print();

    println!();
    match &output.graph_file {
        Some(file) => println!(
            "Graph: {} nodes, {} edges -> {file}",
            output.nodes, output.edges
        ),
        None => println!("Graph: {} nodes, {} edges", output.nodes, output.edges),
    }
}
