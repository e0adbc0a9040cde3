//! The render model shared by both evidence paths.

use std::collections::HashMap;

use serde::Serialize;
use strum::AsRefStr;

use crate::{
    conflicts::ConflictGraph,
    dependencies::AssemblyTable,
    redirect::BindingRedirects,
};

/// Why an edge is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum EdgeKind {
    /// Direct cause of a version conflict
    Primary,
    /// Versioned reference that is not a direct conflict cause
    Secondary,
    /// Reference without version information
    Structural,
}

/// A node of a [`DependencyGraph`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    /// Assembly or project name, the node key
    pub name: String,
    /// Display text, initially the name
    pub label: String,
    /// Subject of a version conflict
    pub is_conflict: bool,
    /// Anchor of the graph
    pub is_root: bool,
}

impl GraphNode {
    /// Create a plain node labelled with its name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            is_conflict: false,
            is_root: false,
        }
    }
}

/// A directed edge: `from` depends on `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    /// Depending node
    pub from: String,
    /// Node depended upon
    pub to: String,
    /// Version text, if any
    pub label: Option<String>,
    /// Display class
    pub kind: EdgeKind,
}

impl GraphEdge {
    /// Create an edge.
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        label: Option<String>,
        kind: EdgeKind,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            label,
            kind,
        }
    }

    /// Returns true if both edges link the same two nodes, in either direction.
    #[must_use]
    pub fn links_same_pair(&self, other: &GraphEdge) -> bool {
        (self.from == other.from && self.to == other.to)
            || (self.from == other.to && self.to == other.from)
    }
}

/// Name-keyed graph of assemblies with display attributes.
///
/// Nodes and edges keep insertion order, so rendering is deterministic. The graph built from
/// evidence keeps every observation as its own edge; [`crate::graph::simplify`] produces the
/// reduced copy meant for rendering.
///
/// # Examples
///
/// ```rust
/// use refscope::{
///     conflicts::{parse_build_output, ConflictParseOptions},
///     graph::DependencyGraph,
/// };
///
/// let log = "Project \"C:\\src\\App\\App.csproj\" on node 1.\n";
/// let conflicts = parse_build_output(log, &ConflictParseOptions::default())?;
/// let graph = DependencyGraph::from_conflicts(&conflicts);
/// assert_eq!(graph.root().unwrap().name, "App");
/// # Ok::<(), refscope::Error>(())
/// ```
#[derive(Debug, Clone, Default, Serialize)]
pub struct DependencyGraph {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl PartialEq for DependencyGraph {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes && self.edges == other.edges
    }
}

impl Eq for DependencyGraph {}

impl DependencyGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from nodes and edges; edges with unknown endpoints are kept as given.
    pub(crate) fn from_parts(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> Self {
        let index = nodes
            .iter()
            .enumerate()
            .map(|(position, node)| (node.name.clone(), position))
            .collect();
        Self {
            nodes,
            edges,
            index,
        }
    }

    pub(crate) fn into_parts(self) -> (Vec<GraphNode>, Vec<GraphEdge>) {
        (self.nodes, self.edges)
    }

    /// Build the graph of a parsed build log.
    ///
    /// A conflict-graph edge `X -> Y` (Y referenced from X's report) becomes `Y -> X`: Y depends
    /// on X. Versioned edges are [`EdgeKind::Primary`] or [`EdgeKind::Secondary`] by their
    /// primary flag; unversioned edges are [`EdgeKind::Structural`].
    #[must_use]
    pub fn from_conflicts(conflicts: &ConflictGraph) -> Self {
        let mut graph = Self::new();

        for node in conflicts.nodes() {
            let added = graph.ensure_node(&node.name);
            added.is_conflict = node.is_conflict;
            added.is_root = node.is_root_project;
        }

        for node in conflicts.nodes() {
            for edge in &node.references {
                let kind = match (edge.version, edge.is_primary) {
                    (None, _) => EdgeKind::Structural,
                    (Some(_), true) => EdgeKind::Primary,
                    (Some(_), false) => EdgeKind::Secondary,
                };
                graph.add_edge(GraphEdge::new(
                    edge.target.clone(),
                    node.name.clone(),
                    edge.version.map(|version| version.to_string()),
                    kind,
                ));
            }
        }

        graph
    }

    /// Build the graph of a merged assembly table.
    ///
    /// Every incoming observation becomes an edge `module -> assembly` labelled with the observed
    /// version, or `observed → effective` when a redirect rewrites it. A reference that binds to
    /// a version other than the assembly's resolved one is [`EdgeKind::Primary`] and marks the
    /// assembly as a conflict. Observations without a version are [`EdgeKind::Structural`].
    #[must_use]
    pub fn from_table(table: &AssemblyTable, redirects: Option<&BindingRedirects>) -> Self {
        let empty = BindingRedirects::new();
        let redirects = redirects.unwrap_or(&empty);
        let mut graph = Self::new();

        for record in table {
            graph.ensure_node(record.name());
        }

        for record in table {
            let resolved = record.identity.version;
            for observation in &record.refs {
                graph.ensure_node(&observation.name);

                if observation.version.is_unknown() {
                    graph.add_edge(GraphEdge::new(
                        observation.name.clone(),
                        record.name(),
                        None,
                        EdgeKind::Structural,
                    ));
                    continue;
                }

                let effective = redirects.effective_version(record.name(), observation.version);
                let label = if effective == observation.version {
                    observation.version.to_string()
                } else {
                    format!("{} → {}", observation.version, effective)
                };

                let kind = if redirects.is_version_conflict(
                    record.name(),
                    observation.version,
                    resolved,
                ) {
                    graph.ensure_node(record.name()).is_conflict = true;
                    EdgeKind::Primary
                } else {
                    EdgeKind::Secondary
                };

                graph.add_edge(GraphEdge::new(
                    observation.name.clone(),
                    record.name(),
                    Some(label),
                    kind,
                ));
            }
        }

        graph
    }

    /// Merge two graphs over the same names.
    ///
    /// Nodes are matched by name; conflict and root flags are combined and the label of the first
    /// occurrence is kept. Edges of `self` come first, then those of `other`.
    #[must_use]
    pub fn union(&self, other: &DependencyGraph) -> DependencyGraph {
        let mut graph = self.clone();

        for node in &other.nodes {
            let merged = graph.ensure_node(&node.name);
            merged.is_conflict |= node.is_conflict;
            merged.is_root |= node.is_root;
        }
        graph.edges.extend(other.edges.iter().cloned());

        graph
    }

    /// Get the node for a name, creating it if needed.
    pub fn ensure_node(&mut self, name: &str) -> &mut GraphNode {
        let position = match self.index.get(name) {
            Some(&position) => position,
            None => {
                self.nodes.push(GraphNode::new(name));
                self.index.insert(name.to_string(), self.nodes.len() - 1);
                self.nodes.len() - 1
            }
        };
        &mut self.nodes[position]
    }

    /// Append an edge as given.
    pub fn add_edge(&mut self, edge: GraphEdge) {
        self.edges.push(edge);
    }

    /// Mark a node as the root.
    ///
    /// Returns false if no node has that name.
    pub fn set_root(&mut self, name: &str) -> bool {
        match self.index.get(name) {
            Some(&position) => {
                self.nodes[position].is_root = true;
                true
            }
            None => false,
        }
    }

    /// Look up a node by name.
    #[must_use]
    pub fn node(&self, name: &str) -> Option<&GraphNode> {
        self.index.get(name).map(|&position| &self.nodes[position])
    }

    /// The first root node, if any.
    #[must_use]
    pub fn root(&self) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.is_root)
    }

    /// Nodes in insertion order.
    #[must_use]
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// Edges in insertion order.
    #[must_use]
    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns true if the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
