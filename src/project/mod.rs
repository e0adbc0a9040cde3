//! Analysis pipeline over one set of artifacts.
//!
//! This module ties the engine together. A [`ModuleAnalysis`] reads ildasm dumps and redirect
//! configurations and produces an [`AnalysisResult`] holding the run's [`AnalysisContext`]; a
//! [`ConflictAnalysis`] parses build output. Both lead to a
//! [`crate::graph::DependencyGraph`] ready for simplification and rendering.
//!
//! # Architecture
//!
//! - **Extraction** runs on the `rayon` pool, one dump per task
//! - **Merging** happens on the calling thread, in the order dumps were added
//! - **State** lives in the [`AnalysisContext`] of the run, never in globals
//!
//! # Usage Examples
//!
//! ```rust,no_run
//! use refscope::{
//!     graph::{simplify, DependencyGraph, SimplifyOptions},
//!     project::{ConflictAnalysis, ModuleAnalysis},
//! };
//!
//! let modules = ModuleAnalysis::new()
//!     .with_dump("dumps/App.il")?
//!     .with_dump("dumps/Lib.il")?
//!     .with_root("App")
//!     .build()?;
//!
//! let log = std::fs::read_to_string("build.log")?;
//! let conflicts = ConflictAnalysis::new().parse(&log)?;
//!
//! let combined = modules.graph().union(&DependencyGraph::from_conflicts(&conflicts));
//! std::fs::write("deps.dot", simplify(&combined, &SimplifyOptions::default()).to_dot(None))?;
//! # Ok::<(), refscope::Error>(())
//! ```

mod context;
mod loader;
mod result;

pub use context::AnalysisContext;
pub use loader::{ConflictAnalysis, ModuleAnalysis};
pub use result::AnalysisResult;
