//! State machine over detailed build output.

use crate::{
    conflicts::{
        line::{self, Directive},
        ConflictGraph,
    },
    identity::{AssemblyIdentity, AssemblyVersion},
    Error, Result,
};

/// Options of [`parse_build_output`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictParseOptions {
    /// Diagnostic code whose lines are parsed, `MSB3277` by default
    pub diagnostic_code: String,
    /// Stop before this many conflict reports have been read, `None` for all
    pub max_reports: Option<usize>,
}

impl Default for ConflictParseOptions {
    fn default() -> Self {
        Self {
            diagnostic_code: "MSB3277".to_string(),
            max_reports: None,
        }
    }
}

impl ConflictParseOptions {
    /// Parse lines of another diagnostic code.
    #[must_use]
    pub fn with_diagnostic_code(mut self, code: impl Into<String>) -> Self {
        self.diagnostic_code = code.into();
        self
    }

    /// Read at most `max` conflict reports.
    #[must_use]
    pub fn with_max_reports(mut self, max: usize) -> Self {
        self.max_reports = Some(max);
        self
    }
}

/// Where the parser is within the nesting of a conflict report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseState {
    /// Outside any report
    Idle,
    /// After `Found conflicts ...`, before the first group
    InReport,
    /// Inside a `References which depend on` group
    InGroup {
        /// The conflicting assembly of the group
        conflict: String,
        /// Version quoted by the group line
        version: Option<AssemblyVersion>,
    },
    /// Below a direct reference of a group
    InDirectRef {
        /// The conflicting assembly of the group
        conflict: String,
        /// Version quoted by the group line
        version: Option<AssemblyVersion>,
        /// The direct reference transitive lines hang off
        direct: String,
    },
}

struct ConflictParser<'a> {
    marker: String,
    options: &'a ConflictParseOptions,
    graph: ConflictGraph,
    state: ParseState,
    root: Option<String>,
    group_index: usize,
    reports: usize,
    skipped: usize,
}

impl<'a> ConflictParser<'a> {
    fn new(options: &'a ConflictParseOptions) -> Self {
        Self {
            marker: format!("{}:", options.diagnostic_code),
            options,
            graph: ConflictGraph::new(),
            state: ParseState::Idle,
            root: None,
            group_index: 0,
            reports: 0,
            skipped: 0,
        }
    }

    /// Feed one line. Returns false once the report limit is reached.
    fn feed(&mut self, number: usize, text: &str) -> bool {
        let Some(coded) = line::split_coded(text, &self.marker) else {
            if self.root.is_none() {
                if let Some(project) = line::announced_project(text) {
                    log::debug!("Root project '{}' announced on line {}", project, number);
                    self.graph.get_or_create(project).is_root_project = true;
                    self.root = Some(project.to_string());
                }
            }
            self.state = ParseState::Idle;
            return true;
        };

        match line::classify(coded.message) {
            Directive::ReportStart => {
                if self.options.max_reports.is_some_and(|max| self.reports >= max) {
                    log::info!("Stopping after {} conflict reports", self.reports);
                    return false;
                }
                self.reports += 1;
                self.group_index = 0;
                self.state = ParseState::InReport;
            }
            Directive::GroupStart(fusion) => {
                let identity = AssemblyIdentity::from_fusion_name(fusion);
                if identity.name.is_empty() {
                    self.skip(number, "group without an assembly name");
                    return true;
                }

                self.group_index += 1;
                self.graph.get_or_create(&identity.name).is_conflict = true;
                self.state = ParseState::InGroup {
                    conflict: identity.name,
                    version: Some(identity.version).filter(|version| !version.is_unknown()),
                };
            }
            Directive::DirectRef(text) => {
                let (conflict, version) = match &self.state {
                    ParseState::InGroup { conflict, version }
                    | ParseState::InDirectRef {
                        conflict, version, ..
                    } => (conflict.clone(), *version),
                    ParseState::Idle | ParseState::InReport => return true,
                };

                let direct = line::assembly_name(text);
                if direct.is_empty() {
                    self.skip(number, "direct reference without a name");
                    return true;
                }

                let primary = self.group_index == 1;
                self.graph.add_edge(&conflict, &direct, version, primary);
                self.state = ParseState::InDirectRef {
                    conflict,
                    version,
                    direct,
                };
            }
            Directive::TransitiveRef(text) => {
                let ParseState::InDirectRef {
                    version, direct, ..
                } = &self.state
                else {
                    return true;
                };

                let transitive = line::assembly_name(text);
                if transitive.is_empty() {
                    self.skip(number, "transitive reference without a name");
                    return true;
                }

                let primary = self.group_index == 1;
                let version = if self.graph.is_conflict(&transitive) {
                    *version
                } else {
                    None
                };
                let direct = direct.clone();

                self.graph.add_edge(&direct, &transitive, version, primary);
                match coded.project {
                    Some(project) => {
                        self.graph.add_edge(&transitive, project, version, primary);
                    }
                    None => log::debug!("Line {} has no project context", number),
                }
            }
            Directive::Malformed(reason) => self.skip(number, reason),
            Directive::Continuation => {}
        }

        true
    }

    fn skip(&mut self, number: usize, reason: &str) {
        log::debug!("Skipping build log line {}: {}", number, reason);
        self.skipped += 1;
    }

    fn finish(mut self) -> Result<ConflictGraph> {
        let Some(root) = self.root.take() else {
            return Err(Error::MissingRootProject);
        };

        let referencing: Vec<String> = self
            .graph
            .nodes()
            .filter(|node| node.name != root && !node.references.is_empty())
            .map(|node| node.name.clone())
            .collect();
        for name in &referencing {
            self.graph.add_edge(name, &root, None, false);
        }

        log::info!(
            "Parsed {} conflict reports into {} nodes and {} edges ({} lines skipped)",
            self.reports,
            self.graph.len(),
            self.graph.edge_count(),
            self.skipped
        );
        if self.graph.edge_count() == 0 {
            log::warn!("Build output under '{}' yielded no conflict edges", root);
        }

        Ok(self.graph)
    }
}

/// Reconstruct conflict chains from detailed build output.
///
/// # Arguments
/// * `log` - Complete output of a detailed build
/// * `options` - Diagnostic code and report limit
///
/// # Returns
/// A [`ConflictGraph`] in which every node that references anything also references the root
/// project.
///
/// # Errors
/// Returns [`Error::MissingRootProject`] if the log never announces a `.csproj` project.
///
/// # Examples
///
/// ```rust
/// use refscope::conflicts::{parse_build_output, ConflictParseOptions};
///
/// let log = concat!(
///     "Project \"C:\\src\\App\\App.csproj\" on node 1.\n",
///     "warning MSB3277:     References which depend on \"Foo, Version=1.0.0.0\" []. [C:\\src\\App\\App.csproj]\n",
///     "warning MSB3277:         C:\\src\\Bar\\bin\\Bar.dll [C:\\src\\App\\App.csproj]\n",
/// );
///
/// let graph = parse_build_output(log, &ConflictParseOptions::default())?;
/// assert!(graph.node("Foo").unwrap().is_conflict);
/// # Ok::<(), refscope::Error>(())
/// ```
pub fn parse_build_output(log: &str, options: &ConflictParseOptions) -> Result<ConflictGraph> {
    let mut parser = ConflictParser::new(options);

    for (index, text) in log.lines().enumerate() {
        if !parser.feed(index + 1, text) {
            break;
        }
    }

    parser.finish()
}
