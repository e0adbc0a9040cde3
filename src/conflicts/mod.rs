//! Diagnostic-log conflict parser.
//!
//! When MSBuild cannot reconcile two versions of one assembly it emits an `MSB3277` warning and,
//! at detailed verbosity, explains which references asked for which version. This module turns
//! that explanation back into a graph:
//!
//! ```text
//! conflicting assembly ──▶ direct referencer ──▶ transitive referencer ──▶ owning project
//! ```
//!
//! # Grammar
//!
//! Only lines carrying the diagnostic code are parsed. Their nesting is encoded by the column the
//! text after the code starts at, which [`parse_build_output`] tracks with an explicit
//! [`ParseState`]. Any line without the code ends the current group; coded lines the parser does
//! not recognize are treated as continuations and change nothing.
//!
//! # Key Components
//!
//! - [`parse_build_output`] - One forward pass over a log
//! - [`ConflictGraph`] - Nodes in first-mention order with target-keyed edges
//! - [`ConflictParseOptions`] - Diagnostic code and report limit

mod graph;
mod line;
mod parser;

pub use graph::{ConflictEdge, ConflictGraph, ConflictNode};
pub use parser::{parse_build_output, ConflictParseOptions, ParseState};
