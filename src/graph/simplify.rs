//! Reduction of a [`DependencyGraph`] for rendering.

use std::collections::{BTreeSet, HashMap, HashSet};

use strum::{AsRefStr, EnumIter, IntoEnumIterator};

use crate::graph::{DependencyGraph, GraphEdge, GraphNode};

/// Base-platform assemblies removed by default.
///
/// Nearly every module references them, so they add edges without adding information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, AsRefStr)]
pub enum PlatformAssembly {
    /// .NET Framework core library
    #[strum(serialize = "mscorlib")]
    Mscorlib,
    /// .NET Standard facade
    #[strum(serialize = "netstandard")]
    Netstandard,
    /// `System`
    #[strum(serialize = "System")]
    System,
    /// `System.Core`
    #[strum(serialize = "System.Core")]
    SystemCore,
    /// `System.Runtime`
    #[strum(serialize = "System.Runtime")]
    SystemRuntime,
    /// .NET core library
    #[strum(serialize = "System.Private.CoreLib")]
    SystemPrivateCoreLib,
    /// `System.Data`
    #[strum(serialize = "System.Data")]
    SystemData,
    /// `System.Xml`
    #[strum(serialize = "System.Xml")]
    SystemXml,
    /// `System.Xml.Linq`
    #[strum(serialize = "System.Xml.Linq")]
    SystemXmlLinq,
    /// `System.Configuration`
    #[strum(serialize = "System.Configuration")]
    SystemConfiguration,
    /// `System.Net.Http`
    #[strum(serialize = "System.Net.Http")]
    SystemNetHttp,
    /// `Microsoft.CSharp`
    #[strum(serialize = "Microsoft.CSharp")]
    MicrosoftCSharp,
}

/// Options of [`simplify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimplifyOptions {
    /// Names removed before anything else
    pub noise: BTreeSet<String>,
    /// Fold single-referrer leaves into their referrer
    pub collapse_leaves: bool,
}

impl Default for SimplifyOptions {
    fn default() -> Self {
        Self {
            noise: PlatformAssembly::iter()
                .map(|assembly| assembly.as_ref().to_string())
                .collect(),
            collapse_leaves: true,
        }
    }
}

impl SimplifyOptions {
    /// Keep platform assemblies.
    #[must_use]
    pub fn without_noise_filter(mut self) -> Self {
        self.noise.clear();
        self
    }

    /// Remove one more name.
    #[must_use]
    pub fn with_noise(mut self, name: impl Into<String>) -> Self {
        self.noise.insert(name.into());
        self
    }

    /// Enable or disable leaf collapsing.
    #[must_use]
    pub fn with_collapse_leaves(mut self, collapse: bool) -> Self {
        self.collapse_leaves = collapse;
        self
    }
}

/// Produce the reduced copy of a graph for rendering.
///
/// Steps, in order:
///
/// 1. Remove noise nodes (never a root).
/// 2. Drop edges whose endpoints no longer exist, and self edges.
/// 3. Keep only the first edge linking any pair of nodes, in either direction.
/// 4. Drop non-root nodes without any edge.
/// 5. Until nothing changes, fold every non-root, non-conflict node with exactly one incoming
///    and no outgoing edge into its referrer, appending its label on a new line. A leaf is only
///    folded when its referrer keeps another edge or is a root, so folding never strands a node.
///
/// The input is not modified, and `simplify(&simplify(g, o), o) == simplify(g, o)`.
///
/// # Arguments
/// * `graph` - The graph built from evidence
/// * `options` - Noise list and collapsing switch
///
/// # Examples
///
/// ```rust
/// use refscope::graph::{simplify, DependencyGraph, EdgeKind, GraphEdge, SimplifyOptions};
///
/// let mut graph = DependencyGraph::new();
/// graph.ensure_node("App").is_root = true;
/// graph.ensure_node("Lib");
/// graph.ensure_node("mscorlib");
/// graph.add_edge(GraphEdge::new("App", "Lib", None, EdgeKind::Structural));
/// graph.add_edge(GraphEdge::new("Lib", "mscorlib", None, EdgeKind::Structural));
///
/// let simple = simplify(&graph, &SimplifyOptions::default());
/// assert!(simple.node("mscorlib").is_none());
/// assert_eq!(simple.node("App").unwrap().label, "App\nLib");
/// ```
#[must_use]
pub fn simplify(graph: &DependencyGraph, options: &SimplifyOptions) -> DependencyGraph {
    let (nodes, edges) = graph.clone().into_parts();

    let mut nodes: Vec<GraphNode> = nodes
        .into_iter()
        .filter(|node| node.is_root || !options.noise.contains(&node.name))
        .collect();

    let present: HashSet<&str> = nodes.iter().map(|node| node.name.as_str()).collect();
    let mut linked: HashSet<(String, String)> = HashSet::new();
    let mut edges: Vec<GraphEdge> = edges
        .into_iter()
        .filter(|edge| {
            edge.from != edge.to
                && present.contains(edge.from.as_str())
                && present.contains(edge.to.as_str())
        })
        .filter(|edge| {
            let pair = if edge.from <= edge.to {
                (edge.from.clone(), edge.to.clone())
            } else {
                (edge.to.clone(), edge.from.clone())
            };
            linked.insert(pair)
        })
        .collect();

    let connected: HashSet<&str> = edges
        .iter()
        .flat_map(|edge| [edge.from.as_str(), edge.to.as_str()])
        .collect();
    let dropped = nodes.len();
    nodes.retain(|node| node.is_root || connected.contains(node.name.as_str()));
    log::debug!("Dropped {} unconnected nodes", dropped - nodes.len());

    if options.collapse_leaves {
        collapse_leaves(&mut nodes, &mut edges);
    }

    let simplified = DependencyGraph::from_parts(nodes, edges);
    if simplified.is_empty() {
        log::warn!("Simplified graph has no nodes");
    } else if simplified.edge_count() == 0 {
        log::warn!("Simplified graph has no edges");
    }
    simplified
}

fn collapse_leaves(nodes: &mut Vec<GraphNode>, edges: &mut Vec<GraphEdge>) {
    let mut collapsed = 0usize;

    while let Some((leaf, edge)) = next_leaf(nodes, edges) {
        let referrer = edges.remove(edge).from;
        let Some(position) = nodes.iter().position(|node| node.name == leaf) else {
            break;
        };
        let label = nodes.remove(position).label;

        if let Some(node) = nodes.iter_mut().find(|node| node.name == referrer) {
            node.label.push('\n');
            node.label.push_str(&label);
        }
        collapsed += 1;
    }

    log::debug!("Collapsed {} leaf nodes", collapsed);
}

/// The first foldable leaf and the index of its incoming edge.
fn next_leaf(nodes: &[GraphNode], edges: &[GraphEdge]) -> Option<(String, usize)> {
    let mut incoming: HashMap<&str, Vec<usize>> = HashMap::new();
    let mut degree: HashMap<&str, usize> = HashMap::new();
    let mut outgoing: HashSet<&str> = HashSet::new();

    for (index, edge) in edges.iter().enumerate() {
        incoming.entry(edge.to.as_str()).or_default().push(index);
        outgoing.insert(edge.from.as_str());
        *degree.entry(edge.from.as_str()).or_default() += 1;
        *degree.entry(edge.to.as_str()).or_default() += 1;
    }

    let roots: HashSet<&str> = nodes
        .iter()
        .filter(|node| node.is_root)
        .map(|node| node.name.as_str())
        .collect();

    nodes
        .iter()
        .filter(|node| !node.is_root && !node.is_conflict)
        .filter(|node| !outgoing.contains(node.name.as_str()))
        .find_map(|node| {
            let [edge] = incoming.get(node.name.as_str())?.as_slice() else {
                return None;
            };
            let referrer = edges[*edge].from.as_str();
            let keeps_edge = degree.get(referrer).copied().unwrap_or_default() > 1;

            (roots.contains(referrer) || keeps_edge).then(|| (node.name.clone(), *edge))
        })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::{
        conflicts::{parse_build_output, ConflictParseOptions},
        graph::EdgeKind,
        test::{sample_table, BUILD_LOG},
    };

    fn structural(from: &str, to: &str) -> GraphEdge {
        GraphEdge::new(from, to, None, EdgeKind::Structural)
    }

    fn graph_of(root: Option<&str>, names: &[&str], edges: &[(&str, &str)]) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for name in names {
            graph.ensure_node(name);
        }
        if let Some(root) = root {
            graph.ensure_node(root).is_root = true;
        }
        for (from, to) in edges {
            graph.add_edge(structural(from, to));
        }
        graph
    }

    #[test]
    fn test_default_noise_list() {
        let options = SimplifyOptions::default();
        assert!(options.noise.contains("mscorlib"));
        assert!(options.noise.contains("System.Core"));
        assert!(SimplifyOptions::default()
            .without_noise_filter()
            .noise
            .is_empty());
        assert!(SimplifyOptions::default()
            .with_noise("Serilog")
            .noise
            .contains("Serilog"));
    }

    #[test]
    fn test_node_isolated_after_noise_removal_is_dropped() {
        let graph = graph_of(
            Some("App"),
            &["App", "Lonely", "Lib", "Other"],
            &[("Lonely", "mscorlib"), ("App", "Lib"), ("App", "Other")],
        );

        let simple = simplify(&graph, &SimplifyOptions::default().with_collapse_leaves(false));
        assert!(simple.node("Lonely").is_none());
        assert!(simple.node("Lib").is_some());
        assert!(simple.node("App").is_some());
    }

    #[test]
    fn test_isolated_root_is_kept() {
        let graph = graph_of(Some("App"), &["App"], &[]);
        let simple = simplify(&graph, &SimplifyOptions::default());
        assert!(simple.node("App").is_some());
    }

    #[test]
    fn test_bidirectional_pairs_are_deduplicated() {
        let graph = graph_of(
            None,
            &["A", "B"],
            &[("A", "B"), ("B", "A"), ("A", "B"), ("A", "A")],
        );

        let simple = simplify(&graph, &SimplifyOptions::default().with_collapse_leaves(false));
        assert_eq!(simple.edges(), &[structural("A", "B")]);
    }

    #[test]
    fn test_leaves_collapse_into_referrer() {
        let graph = graph_of(
            Some("App"),
            &["App", "Lib", "Leaf1", "Leaf2"],
            &[("App", "Lib"), ("Lib", "Leaf1"), ("Lib", "Leaf2")],
        );

        let simple = simplify(&graph, &SimplifyOptions::default());
        assert_eq!(simple.node_count(), 1);
        assert_eq!(simple.node("App").unwrap().label, "App\nLib\nLeaf1\nLeaf2");
        assert_eq!(simple.edge_count(), 0);
    }

    #[test]
    fn test_conflict_nodes_are_not_collapsed() {
        let conflicts = parse_build_output(BUILD_LOG, &ConflictParseOptions::default()).unwrap();
        let graph = DependencyGraph::from_conflicts(&conflicts);

        let simple = simplify(&graph, &SimplifyOptions::default());
        let foo = simple.node("Foo").unwrap();
        assert!(foo.is_conflict);
        assert_eq!(foo.label, "Foo");
        assert!(simple.node("App").unwrap().is_root);
    }

    #[test]
    fn test_collapse_never_strands_referrer() {
        let graph = graph_of(None, &["A", "B"], &[("A", "B")]);
        let simple = simplify(&graph, &SimplifyOptions::default());
        assert_eq!(simple, simplify(&simple, &SimplifyOptions::default()));
        assert_eq!(simple.node_count(), 2);
    }

    #[test]
    fn test_simplify_table_graph_is_idempotent() {
        let mut graph = DependencyGraph::from_table(&sample_table(), None);
        graph.set_root("App");

        let options = SimplifyOptions::default();
        let once = simplify(&graph, &options);
        assert!(once.node("mscorlib").is_none());
        assert_eq!(once, simplify(&once, &options));
    }

    fn arb_graph() -> impl Strategy<Value = DependencyGraph> {
        let names = vec!["A", "B", "C", "D", "E", "mscorlib"];
        (
            prop::collection::vec(
                (
                    prop::sample::select(names.clone()),
                    prop::sample::select(names.clone()),
                ),
                0..12,
            ),
            prop::option::of(prop::sample::select(names.clone())),
            prop::collection::vec(prop::sample::select(names.clone()), 0..3),
        )
            .prop_map(move |(edges, root, conflicts)| {
                let mut graph = graph_of(None, &names, &edges);
                if let Some(root) = root {
                    graph.ensure_node(root).is_root = true;
                }
                for name in conflicts {
                    graph.ensure_node(name).is_conflict = true;
                }
                graph
            })
    }

    proptest! {
        #[test]
        fn prop_simplify_is_idempotent(graph in arb_graph(), collapse in any::<bool>()) {
            let options = SimplifyOptions::default().with_collapse_leaves(collapse);
            let once = simplify(&graph, &options);
            let twice = simplify(&once, &options);
            prop_assert_eq!(once, twice);
        }
    }
}
