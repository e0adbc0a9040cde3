//! Builder APIs for module and conflict analyses.
//!
//! [`ModuleAnalysis`] gathers ildasm dumps and redirect configurations, extracts the dumps in
//! parallel and merges them into an [`AnalysisContext`] on the calling thread.
//! [`ConflictAnalysis`] runs the build-log parser with a set of options.

use std::{
    fs,
    path::{Path, PathBuf},
};

use rayon::prelude::*;

use crate::{
    conflicts::{parse_build_output, ConflictGraph, ConflictParseOptions},
    dependencies::AssemblyTable,
    ildasm::{extract_module, ModuleMetadata},
    project::{AnalysisContext, AnalysisResult},
    redirect::parse_binding_redirects,
    Error, Result,
};

/// Where a piece of text comes from.
#[derive(Debug, Clone)]
enum Source {
    File(PathBuf),
    Text { name: String, text: String },
}

impl Source {
    fn name(&self) -> String {
        match self {
            Source::File(path) => path.display().to_string(),
            Source::Text { name, .. } => name.clone(),
        }
    }

    /// File stem, or the given name, used when a dump has no `.module` line.
    fn stem(&self) -> String {
        match self {
            Source::File(path) => path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default(),
            Source::Text { name, .. } => name.clone(),
        }
    }

    fn read(&self) -> Result<String> {
        match self {
            Source::File(path) => Ok(fs::read_to_string(path)?),
            Source::Text { text, .. } => Ok(text.clone()),
        }
    }
}

fn existing_file(path: &Path, what: &str) -> Result<PathBuf> {
    if !path.exists() {
        return Err(Error::NoInput(format!(
            "{} does not exist: {}",
            what,
            path.display()
        )));
    }
    Ok(path.to_path_buf())
}

/// Builder for an analysis over ildasm dumps.
///
/// # Usage Examples
///
/// ```rust,no_run
/// use refscope::project::ModuleAnalysis;
///
/// let result = ModuleAnalysis::new()
///     .with_dump("dumps/App.il")?
///     .with_dump("dumps/Lib.il")?
///     .with_redirect_config("App.exe.config")?
///     .with_root("App")
///     .build()?;
///
/// println!("{} assemblies", result.table().len());
/// # Ok::<(), refscope::Error>(())
/// ```
///
/// ## Reusing a Cached Table
///
/// ```rust,no_run
/// use refscope::{dependencies::AssemblyTable, project::ModuleAnalysis};
///
/// let result = ModuleAnalysis::new()
///     .with_table(AssemblyTable::load("assemblies.json")?)
///     .build()?;
/// # Ok::<(), refscope::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct ModuleAnalysis {
    /// Dumps to extract, merged in this order
    dumps: Vec<Source>,
    /// Redirect configurations, applied in this order
    configs: Vec<Source>,
    /// Root to mark in the rendered graph
    root: Option<String>,
    /// Table to start from instead of an empty one
    table: Option<AssemblyTable>,
}

impl ModuleAnalysis {
    /// Create a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an ildasm dump file.
    ///
    /// # Arguments
    /// * `path` - Path to the `ildasm /text` output of one module
    ///
    /// # Errors
    /// Returns [`Error::NoInput`] if the path does not exist.
    pub fn with_dump<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        self.dumps
            .push(Source::File(existing_file(path.as_ref(), "Module dump")?));
        Ok(self)
    }

    /// Add dump text that is already in memory.
    ///
    /// # Arguments
    /// * `name` - Used in diagnostics and as module name fallback
    /// * `text` - The dump
    #[must_use]
    pub fn with_dump_text(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.dumps.push(Source::Text {
            name: name.into(),
            text: text.into(),
        });
        self
    }

    /// Add a configuration file with binding redirects.
    ///
    /// # Errors
    /// Returns [`Error::NoInput`] if the path does not exist.
    pub fn with_redirect_config<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        self.configs.push(Source::File(existing_file(
            path.as_ref(),
            "Redirect configuration",
        )?));
        Ok(self)
    }

    /// Add binding-redirect XML that is already in memory.
    #[must_use]
    pub fn with_redirect_xml(mut self, name: impl Into<String>, xml: impl Into<String>) -> Self {
        self.configs.push(Source::Text {
            name: name.into(),
            text: xml.into(),
        });
        self
    }

    /// Mark an assembly as the root of the rendered graph.
    #[must_use]
    pub fn with_root(mut self, name: impl Into<String>) -> Self {
        self.root = Some(name.into());
        self
    }

    /// Start from a previously merged table, typically loaded from a cache.
    #[must_use]
    pub fn with_table(mut self, table: AssemblyTable) -> Self {
        self.table = Some(table);
        self
    }

    /// Run the analysis.
    ///
    /// Dumps are read and extracted in parallel, then merged one at a time in the order they were
    /// added. A dump or configuration that cannot be read or parsed is recorded in
    /// [`AnalysisResult::failed`] and the run continues without it.
    ///
    /// # Errors
    /// Returns [`Error::NoInput`] if neither dumps nor a table were given.
    pub fn build(self) -> Result<AnalysisResult> {
        if self.dumps.is_empty() && self.table.is_none() {
            return Err(Error::NoInput("No module dumps to analyze".to_string()));
        }

        let mut result = AnalysisResult::new(match self.table {
            Some(table) => AnalysisContext::with_table(table),
            None => AnalysisContext::new(),
        });

        let extracted: Vec<(String, Result<ModuleMetadata>)> = self
            .dumps
            .par_iter()
            .map(|source| {
                let metadata = source
                    .read()
                    .map(|text| extract_module(&text).or_module_name(source.stem()));
                (source.name(), metadata)
            })
            .collect();

        for (name, metadata) in extracted {
            match metadata {
                Ok(metadata) => {
                    result.skipped_records += metadata.skipped;
                    result.context.merge_module(&metadata);
                    result.merged_count += 1;
                }
                Err(error) => {
                    log::warn!("Failed to read dump {}: {}", name, error);
                    result.failed.push((name, error.to_string()));
                }
            }
        }

        for source in &self.configs {
            match source.read().and_then(|xml| parse_binding_redirects(&xml)) {
                Ok(rules) => {
                    log::info!("{} binding redirects from {}", rules.len(), source.name());
                    result.context.add_redirects(rules);
                }
                Err(error) => {
                    log::warn!("Skipping configuration {}: {}", source.name(), error);
                    result.failed.push((source.name(), error.to_string()));
                }
            }
        }

        if let Some(root) = self.root {
            result.context.set_root(root);
        }

        log::info!(
            "Merged {} dumps into {} assembly records ({} failed)",
            result.merged_count,
            result.table().len(),
            result.failure_count()
        );
        if result.table().is_empty() {
            log::warn!("No assembly records were produced");
        }

        Ok(result)
    }
}

/// Builder for a build-log analysis.
///
/// ```rust
/// use refscope::project::ConflictAnalysis;
///
/// let analysis = ConflictAnalysis::new().with_max_reports(5);
/// let graph = analysis.parse("Project \"C:\\src\\App\\App.csproj\" on node 1.\n")?;
/// assert_eq!(graph.len(), 1);
/// # Ok::<(), refscope::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConflictAnalysis {
    options: ConflictParseOptions,
}

impl ConflictAnalysis {
    /// Create a new builder with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all parser options.
    #[must_use]
    pub fn with_options(mut self, options: ConflictParseOptions) -> Self {
        self.options = options;
        self
    }

    /// Stop after `max` conflict reports.
    #[must_use]
    pub fn with_max_reports(mut self, max: usize) -> Self {
        self.options.max_reports = Some(max);
        self
    }

    /// The options the parser will run with.
    #[must_use]
    pub fn options(&self) -> &ConflictParseOptions {
        &self.options
    }

    /// Parse build output held in memory.
    ///
    /// # Errors
    /// Returns [`Error::MissingRootProject`] if the log never announces a project.
    pub fn parse(&self, log: &str) -> Result<ConflictGraph> {
        parse_build_output(log, &self.options)
    }

    /// Parse build output saved to a file.
    ///
    /// # Errors
    /// Returns [`Error::NoInput`] if the file does not exist, [`Error::FileError`] if it cannot
    /// be read, or [`Error::MissingRootProject`] if the log never announces a project.
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<ConflictGraph> {
        let path = existing_file(path.as_ref(), "Build log")?;
        self.parse(&fs::read_to_string(path)?)
    }
}
