//! Render model and graph simplification.
//!
//! Both evidence paths end in a [`DependencyGraph`]: [`DependencyGraph::from_table`] for merged
//! ildasm dumps, [`DependencyGraph::from_conflicts`] for a parsed build log. The two can be
//! rendered separately or joined with [`DependencyGraph::union`].
//!
//! The graph built from evidence keeps every observation. Before rendering, [`simplify`] removes
//! base-platform noise, unconnected nodes and duplicate linkages, and folds single-referrer
//! leaves into their parent. [`DependencyGraph::to_dot`] then writes Graphviz DOT.
//!
//! # Key Components
//!
//! - [`DependencyGraph`] - Ordered nodes and edges with display attributes
//! - [`simplify`] / [`SimplifyOptions`] - Pure, idempotent reduction
//! - [`PlatformAssembly`] - The default noise list

mod dot;
mod model;
mod simplify;

pub use model::{DependencyGraph, EdgeKind, GraphEdge, GraphNode};
pub use simplify::{simplify, PlatformAssembly, SimplifyOptions};
