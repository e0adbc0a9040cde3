//! Node and edge model of the conflict parser.

use std::collections::HashMap;

use serde::Serialize;

use crate::identity::AssemblyVersion;

/// A reference from one conflict node to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictEdge {
    /// Name of the referenced node
    pub target: String,
    /// Version the edge was reported at, `None` for structural edges
    pub version: Option<AssemblyVersion>,
    /// True if found in the first group of a conflict report
    pub is_primary: bool,
}

/// An assembly or project mentioned by the build log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictNode {
    /// Assembly or project name
    pub name: String,
    /// True if the node was ever the subject of a `References which depend on` group
    pub is_conflict: bool,
    /// True for the project under build
    pub is_root_project: bool,
    /// Outgoing edges, at most one per target
    pub references: Vec<ConflictEdge>,
}

impl ConflictNode {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_conflict: false,
            is_root_project: false,
            references: Vec::new(),
        }
    }

    /// Returns true if the node already has an edge to `target`.
    #[must_use]
    pub fn references_target(&self, target: &str) -> bool {
        self.references.iter().any(|edge| edge.target == target)
    }
}

/// Nodes recovered from a build log, in first-mention order.
///
/// Edges are keyed by their target only: once a node has an edge to a target, further edges to
/// the same target are ignored even if they carry another version. The first reported version is
/// the one that survives.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConflictGraph {
    nodes: Vec<ConflictNode>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl ConflictGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the node for a name, creating it if needed.
    pub fn get_or_create(&mut self, name: &str) -> &mut ConflictNode {
        let position = match self.index.get(name) {
            Some(&position) => position,
            None => {
                self.nodes.push(ConflictNode::new(name));
                self.index.insert(name.to_string(), self.nodes.len() - 1);
                self.nodes.len() - 1
            }
        };
        &mut self.nodes[position]
    }

    /// Add an edge `from -> to`, creating both nodes as needed.
    ///
    /// Returns false without changing any edge when `from == to` or `from` already references
    /// `to`.
    pub fn add_edge(
        &mut self,
        from: &str,
        to: &str,
        version: Option<AssemblyVersion>,
        is_primary: bool,
    ) -> bool {
        self.get_or_create(to);
        let node = self.get_or_create(from);

        if from == to || node.references_target(to) {
            return false;
        }

        node.references.push(ConflictEdge {
            target: to.to_string(),
            version,
            is_primary,
        });
        true
    }

    /// Look up a node by name.
    #[must_use]
    pub fn node(&self, name: &str) -> Option<&ConflictNode> {
        self.index.get(name).map(|&position| &self.nodes[position])
    }

    /// Returns true if the named node exists and is a conflict node.
    #[must_use]
    pub fn is_conflict(&self, name: &str) -> bool {
        self.node(name).is_some_and(|node| node.is_conflict)
    }

    /// The root project node, if one was announced.
    #[must_use]
    pub fn root(&self) -> Option<&ConflictNode> {
        self.nodes.iter().find(|node| node.is_root_project)
    }

    /// Iterate nodes in first-mention order.
    pub fn nodes(&self) -> impl Iterator<Item = &ConflictNode> {
        self.nodes.iter()
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|node| node.references.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_edge_is_ignored() {
        let mut graph = ConflictGraph::new();
        let v1 = Some(AssemblyVersion::new(1, 0, 0, 0));
        let v2 = Some(AssemblyVersion::new(2, 0, 0, 0));

        assert!(graph.add_edge("Foo", "Bar", v1, true));
        assert!(!graph.add_edge("Foo", "Bar", v2, false));

        let foo = graph.node("Foo").unwrap();
        assert_eq!(foo.references.len(), 1);
        assert_eq!(foo.references[0].version, v1);
        assert!(foo.references[0].is_primary);
    }

    #[test]
    fn test_self_edge_is_ignored() {
        let mut graph = ConflictGraph::new();
        assert!(!graph.add_edge("Foo", "Foo", None, false));
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_nodes_keep_first_mention_order() {
        let mut graph = ConflictGraph::new();
        graph.get_or_create("B").is_conflict = true;
        graph.add_edge("A", "C", None, false);
        graph.get_or_create("B");

        let names: Vec<&str> = graph.nodes().map(|node| node.name.as_str()).collect();
        assert_eq!(names, vec!["B", "C", "A"]);
        assert!(graph.is_conflict("B"));
        assert!(!graph.is_conflict("A"));
        assert!(!graph.is_conflict("Missing"));
    }
}
