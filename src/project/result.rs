//! Module analysis result types and statistics.

use crate::{
    dependencies::AssemblyTable,
    graph::{simplify, DependencyGraph, SimplifyOptions},
    project::AnalysisContext,
    redirect::ReferenceCheck,
};

/// Result of [`crate::project::ModuleAnalysis::build`].
///
/// Holds the run's [`AnalysisContext`] together with statistics about the ingestion.
///
/// # Usage
///
/// ```rust
/// use refscope::{graph::SimplifyOptions, project::ModuleAnalysis};
///
/// let result = ModuleAnalysis::new()
///     .with_dump_text("App.il", ".assembly extern Lib\n{\n  .ver 1:0:0:0\n}\n.module App.exe\n")
///     .build()?;
///
/// if result.is_complete_success() {
///     let dot = result.simplified(&SimplifyOptions::default()).to_dot(None);
///     println!("{dot}");
/// }
/// # Ok::<(), refscope::Error>(())
/// ```
#[derive(Debug)]
pub struct AnalysisResult {
    /// State of the run: table, redirects and root
    pub context: AnalysisContext,
    /// Number of dumps merged
    pub merged_count: usize,
    /// Inputs that could not be used (source name -> error message)
    pub failed: Vec<(String, String)>,
    /// Directives skipped as malformed, over all dumps
    pub skipped_records: usize,
}

impl AnalysisResult {
    /// Create an empty result around a context.
    #[must_use]
    pub fn new(context: AnalysisContext) -> Self {
        Self {
            context,
            merged_count: 0,
            failed: Vec::new(),
            skipped_records: 0,
        }
    }

    /// The merged table.
    #[must_use]
    pub fn table(&self) -> &AssemblyTable {
        self.context.table()
    }

    /// Number of inputs that could not be used.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    /// Returns true if every input was used.
    #[must_use]
    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Every reference checked against the redirect rules.
    #[must_use]
    pub fn checks(&self) -> Vec<ReferenceCheck> {
        self.context.checks()
    }

    /// The graph of every observation.
    #[must_use]
    pub fn graph(&self) -> DependencyGraph {
        self.context.graph()
    }

    /// The reduced graph for rendering.
    #[must_use]
    pub fn simplified(&self, options: &SimplifyOptions) -> DependencyGraph {
        simplify(&self.graph(), options)
    }
}
