//! DOT rendering of a [`DependencyGraph`].

use std::fmt::Write;

use crate::{
    graph::{DependencyGraph, EdgeKind},
    utils::escape_dot,
};

impl DependencyGraph {
    /// Generates a DOT format representation of this graph.
    ///
    /// Conflict nodes are filled salmon, root nodes aquamarine. Primary edges are blue, all
    /// others black, and versioned edges carry their version as label.
    ///
    /// # Arguments
    ///
    /// * `title` - Optional title for the graph
    ///
    /// # Returns
    ///
    /// A string containing the DOT representation of the graph.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use refscope::graph::{DependencyGraph, EdgeKind, GraphEdge};
    ///
    /// let mut graph = DependencyGraph::new();
    /// graph.ensure_node("App").is_root = true;
    /// graph.ensure_node("Lib");
    /// graph.add_edge(GraphEdge::new("App", "Lib", Some("1.0.0.0".into()), EdgeKind::Primary));
    ///
    /// let dot = graph.to_dot(Some("App"));
    /// assert!(dot.contains("\"App\" -> \"Lib\""));
    /// ```
    #[must_use]
    pub fn to_dot(&self, title: Option<&str>) -> String {
        let mut dot = String::new();

        dot.push_str("digraph Dependencies {\n");
        if let Some(name) = title {
            let _ = writeln!(dot, "    label=\"{}\";", escape_dot(name));
            dot.push_str("    labelloc=t;\n");
        }
        dot.push_str("    overlap=false;\n");
        dot.push_str("    splines=true;\n");
        dot.push_str("    node [shape=box, fontname=\"Helvetica\", fontsize=10];\n");
        dot.push_str("    edge [fontname=\"Helvetica\", fontsize=9];\n\n");

        for node in self.nodes() {
            let style = if node.is_conflict {
                ", style=filled, fillcolor=salmon"
            } else if node.is_root {
                ", style=filled, fillcolor=aquamarine"
            } else {
                ""
            };

            let _ = writeln!(
                dot,
                "    \"{}\" [label=\"{}\"{style}];",
                escape_dot(&node.name),
                escape_dot(&node.label),
            );
        }

        dot.push('\n');

        for edge in self.edges() {
            let color = match edge.kind {
                EdgeKind::Primary => "blue",
                EdgeKind::Secondary | EdgeKind::Structural => "black",
            };
            let label = edge
                .label
                .as_deref()
                .map(|label| format!(", label=\"{}\"", escape_dot(label)))
                .unwrap_or_default();

            let _ = writeln!(
                dot,
                "    \"{}\" -> \"{}\" [color={color}, class={}{label}];",
                escape_dot(&edge.from),
                escape_dot(&edge.to),
                edge.kind.as_ref(),
            );
        }

        dot.push_str("}\n");
        dot
    }
}
