use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use refscope::{
    dependencies::AssemblyTable,
    project::{AnalysisResult, ModuleAnalysis},
};
use serde::Serialize;

use crate::{
    app::GlobalOptions,
    commands::common::{collect_inputs, disassemble, file_display_name, file_stem, is_dump_file},
    output::{emit_dot, print_output, prepare_graph, Align, TabWriter},
};

pub struct ModulesOptions<'a> {
    pub cache: Option<&'a Path>,
    pub configs: &'a [PathBuf],
    pub root: Option<&'a str>,
    pub ildasm: &'a str,
    pub output: Option<&'a Path>,
    pub raw: bool,
}

#[derive(Debug, Serialize)]
struct AssemblyEntry {
    name: String,
    version: String,
    public_key_token: Option<String>,
    referenced_by: usize,
    versions_seen: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ConflictEntry {
    referrer: String,
    target: String,
    observed: String,
    effective: String,
    resolved: String,
}

#[derive(Debug, Serialize)]
struct ModulesOutput {
    assemblies: Vec<AssemblyEntry>,
    conflicts: Vec<ConflictEntry>,
    failed: Vec<(String, String)>,
    nodes: usize,
    edges: usize,
    graph_file: Option<String>,
}

pub fn run(path: &Path, options: &ModulesOptions<'_>, opts: &GlobalOptions) -> anyhow::Result<()> {
    let mut analysis = ModuleAnalysis::new();

    match options.cache.filter(|cache| cache.exists()) {
        Some(cache) => {
            let table = AssemblyTable::load(cache)
                .with_context(|| format!("failed to load cache: {}", cache.display()))?;
            analysis = analysis.with_table(table);
        }
        None => analysis = add_inputs(analysis, path, options.ildasm)?,
    }

    for config in options.configs {
        analysis = analysis.with_redirect_config(config)?;
    }
    if let Some(root) = options.root {
        analysis = analysis.with_root(root);
    }

    let result = analysis.build()?;

    if let Some(cache) = options.cache.filter(|cache| !cache.exists()) {
        result
            .table()
            .save(cache)
            .with_context(|| format!("failed to write cache: {}", cache.display()))?;
    }

    let graph = prepare_graph(result.graph(), options.raw);
    let graph_file = emit_dot(&graph.to_dot(options.root), options.output, opts)?;

    let summary = summarize(&result, graph.node_count(), graph.edge_count(), graph_file);
    // DOT already went to stdout; the human summary only accompanies a graph file
    if opts.json || options.output.is_some() {
        print_output(&summary, opts, print_summary)?;
    }
    Ok(())
}

/// Queue every dump under `path`, disassembling `.dll`/`.exe` modules on the way.
fn add_inputs(
    mut analysis: ModuleAnalysis,
    path: &Path,
    ildasm: &str,
) -> anyhow::Result<ModuleAnalysis> {
    let inputs = collect_inputs(path)?;
    if inputs.is_empty() {
        bail!(
            "no ildasm dumps or .NET modules found in {}",
            path.display()
        );
    }

    for input in inputs {
        if is_dump_file(&input) {
            analysis = analysis.with_dump(&input)?;
        } else {
            log::debug!("Disassembling {}", file_display_name(&input));
            analysis = analysis.with_dump_text(file_stem(&input), disassemble(ildasm, &input)?);
        }
    }
    Ok(analysis)
}

fn summarize(
    result: &AnalysisResult,
    nodes: usize,
    edges: usize,
    graph_file: Option<String>,
) -> ModulesOutput {
    let assemblies = result
        .table()
        .iter()
        .map(|record| AssemblyEntry {
            name: record.name().to_string(),
            version: record.identity.version.to_string(),
            public_key_token: record
                .identity
                .public_key_token
                .as_ref()
                .map(|token| token.as_str().to_string()),
            referenced_by: record.refs.len(),
            versions_seen: record
                .observed_versions
                .iter()
                .map(ToString::to_string)
                .collect(),
        })
        .collect();

    let conflicts = result
        .checks()
        .into_iter()
        .filter(|check| check.is_conflict)
        .map(|check| ConflictEntry {
            referrer: check.referrer,
            target: check.target,
            observed: check.observed.to_string(),
            effective: check.effective.to_string(),
            resolved: check.resolved.to_string(),
        })
        .collect();

    ModulesOutput {
        assemblies,
        conflicts,
        failed: result.failed.clone(),
        nodes,
        edges,
        graph_file,
    }
}

fn print_summary(output: &ModulesOutput) {
    println!("Assemblies: {}", output.assemblies.len());
    println!();

    let mut tw = TabWriter::new(vec![
        ("Name", Align::Left),
        ("Version", Align::Left),
        ("Token", Align::Left),
        ("Refs", Align::Right),
        ("Versions Seen", Align::Left),
    ]);
    for entry in &output.assemblies {
        tw.row(vec![
            entry.name.clone(),
            entry.version.clone(),
            entry.public_key_token.clone().unwrap_or_else(|| "-".to_string()),
            entry.referenced_by.to_string(),
            entry.versions_seen.join(", "),
        ]);
    }
    tw.print();

    if !output.conflicts.is_empty() {
        println!();
        println!("Version conflicts: {}", output.conflicts.len());
        let mut tw = TabWriter::new(vec![
            ("Referrer", Align::Left),
            ("Target", Align::Left),
            ("Observed", Align::Left),
            ("Effective", Align::Left),
            ("Resolved", Align::Left),
        ]);
        for conflict in &output.conflicts {
            tw.row(vec![
                conflict.referrer.clone(),
                conflict.target.clone(),
                conflict.observed.clone(),
                conflict.effective.clone(),
                conflict.resolved.clone(),
            ]);
        }
        tw.print();
    }

    for (name, error) in &output.failed {
        println!("Failed: {name}: {error}");
    }

    println!();
    match &output.graph_file {
        Some(file) => println!(
            "Graph: {} nodes, {} edges -> {file}",
            output.nodes, output.edges
        ),
        None => println!("Graph: {} nodes, {} edges", output.nodes, output.edges),
    }
}
