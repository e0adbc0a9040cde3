use std::path::Path;

use anyhow::Context;
use comfy_table::{presets, CellAlignment, ContentArrangement, Table};
use refscope::graph::{simplify, DependencyGraph, SimplifyOptions};
use serde::Serialize;

use crate::app::GlobalOptions;

/// Print `data` as JSON (if `--json`) or call `display_fn` for human-readable output.
pub fn print_output<T: Serialize>(
    data: &T,
    opts: &GlobalOptions,
    display_fn: impl FnOnce(&T),
) -> anyhow::Result<()> {
    if opts.json {
        let json = serde_json::to_string_pretty(data)?;
        println!("{json}");
    } else {
        display_fn(data);
    }
    Ok(())
}

/// The graph that gets rendered: `graph` itself with `--raw`, its simplification otherwise.
pub fn prepare_graph(graph: DependencyGraph, raw: bool) -> DependencyGraph {
    if raw {
        graph
    } else {
        simplify(&graph, &SimplifyOptions::default())
    }
}

/// Write DOT text to `output`, or to stdout when no file was given and `--json` is off.
///
/// Returns the path written to, if any.
pub fn emit_dot(
    dot: &str,
    output: Option<&Path>,
    opts: &GlobalOptions,
) -> anyhow::Result<Option<String>> {
    match output {
        Some(path) => {
            std::fs::write(path, dot)
                .with_context(|| format!("failed to write graph: {}", path.display()))?;
            Ok(Some(path.display().to_string()))
        }
        None => {
            if !opts.json {
                print!("{dot}");
            }
            Ok(None)
        }
    }
}

/// Column alignment for tabular output.
#[derive(Clone, Copy)]
pub enum Align {
    Left,
    Right,
}

/// Whitespace-aligned table for terminal output, backed by `comfy-table`.
pub struct TabWriter {
    table: Table,
}

impl TabWriter {
    /// Create a new `TabWriter` from `(header, alignment)` column pairs.
    pub fn new(columns: Vec<(&str, Align)>) -> Self {
        let mut table = Table::new();
        table
            .load_preset(presets::NOTHING)
            .set_content_arrangement(ContentArrangement::Dynamic);

        let headers: Vec<&str> = columns.iter().map(|(name, _)| *name).collect();
        table.set_header(headers);

        // First column has no left padding, last column no right padding
        let last = columns.len().saturating_sub(1);
        for (i, (_, align)) in columns.iter().enumerate() {
            let cell_align = match align {
                Align::Left => CellAlignment::Left,
                Align::Right => CellAlignment::Right,
            };
            if let Some(col) = table.column_mut(i) {
                col.set_cell_alignment(cell_align);
                let pad_left = if i == 0 { 0 } else { 1 };
                let pad_right = if i == last { 0 } else { 1 };
                col.set_padding((pad_left, pad_right));
            }
        }

        Self { table }
    }

    /// Add a row. Values are given in column order.
    pub fn row(&mut self, values: Vec<String>) {
        self.table.add_row(values);
    }

    /// Print the table to stdout.
    pub fn print(&self) {
        for line in self.table.to_string().lines() {
            println!("{}", line.trim_end());
        }
    }
}
