//! Per-run state of a module analysis.

use crate::{
    dependencies::AssemblyTable,
    graph::DependencyGraph,
    ildasm::ModuleMetadata,
    redirect::{BindingRedirect, BindingRedirects, RedirectResolver, ReferenceCheck},
};

/// Everything one analysis run owns: the merged table, the redirect rules and the root.
///
/// There is no shared or global state; each run builds its own context and passes it from stage
/// to stage. The table is written through [`merge_module`](Self::merge_module) only, from one
/// thread.
#[derive(Debug, Clone, Default)]
pub struct AnalysisContext {
    table: AssemblyTable,
    redirects: BindingRedirects,
    root: Option<String>,
}

impl AnalysisContext {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context around a table loaded from a cache.
    #[must_use]
    pub fn with_table(table: AssemblyTable) -> Self {
        Self {
            table,
            ..Self::default()
        }
    }

    /// Merge one module's extraction result into the table.
    pub fn merge_module(&mut self, metadata: &ModuleMetadata) {
        self.table.merge(metadata);
    }

    /// Add redirect rules; later rules replace earlier ones for the same name.
    pub fn add_redirects(&mut self, rules: impl IntoIterator<Item = BindingRedirect>) {
        self.redirects.extend(rules);
    }

    /// Set the name rendered as root.
    pub fn set_root(&mut self, name: impl Into<String>) {
        self.root = Some(name.into());
    }

    /// The merged table.
    #[must_use]
    pub fn table(&self) -> &AssemblyTable {
        &self.table
    }

    /// The redirect rules.
    #[must_use]
    pub fn redirects(&self) -> &BindingRedirects {
        &self.redirects
    }

    /// The root name, if one was set.
    #[must_use]
    pub fn root(&self) -> Option<&str> {
        self.root.as_deref()
    }

    /// Check every reference against the redirect rules.
    #[must_use]
    pub fn checks(&self) -> Vec<ReferenceCheck> {
        RedirectResolver::new(&self.redirects).check(&self.table)
    }

    /// Build the unsimplified graph of the table, with redirects applied and the root marked.
    #[must_use]
    pub fn graph(&self) -> DependencyGraph {
        let mut graph = DependencyGraph::from_table(&self.table, Some(&self.redirects));

        if let Some(root) = self.root.as_deref() {
            if !graph.set_root(root) {
                log::warn!("Root '{}' is not an assembly of the analysis", root);
            }
        }
        if graph.is_empty() {
            log::warn!("Assembly table produced an empty graph");
        } else if graph.edge_count() == 0 {
            log::warn!("Assembly table produced a graph without edges");
        }

        graph
    }
}
