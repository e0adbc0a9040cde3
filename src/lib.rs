// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]

//! # refscope
//!
//! Reconstructs the assembly dependency graph of a compiled .NET project from two independent,
//! imperfect sources of evidence:
//!
//! - the `ildasm /text` dumps of its modules (identity, version, strong-name token and the
//!   list of referenced assemblies of each module), and
//! - the detailed output of an MSBuild run, whose `MSB3277` warnings explain which references
//!   conflict in version and through which chain they were pulled in.
//!
//! The result is one deduplicated graph annotated with versions and conflict markers, rendered
//! as Graphviz DOT text.
//!
//! ## Features
//!
//! - **Lenient ingestion** - malformed dump lines and log lines are skipped, never fatal
//! - **Order-independent merge** - partial identity evidence from many modules converges to the
//!   same record regardless of input order
//! - **Binding redirects** - `app.config` rules are applied to observed versions and real
//!   mismatches are flagged
//! - **Conflict chains** - the log parser recovers the three-level chain behind every conflict
//! - **Readable output** - platform noise is removed and single-use leaves are folded into their
//!   referrer before rendering
//!
//! ## Quick Start
//!
//! ### Using the Prelude
//!
//! ```rust,no_run
//! use refscope::prelude::*;
//!
//! let result = ModuleAnalysis::new()
//!     .with_dump("dumps/App.il")?
//!     .with_dump("dumps/Lib.il")?
//!     .with_redirect_config("App.exe.config")?
//!     .with_root("App")
//!     .build()?;
//!
//! let graph = simplify(&result.graph(), &SimplifyOptions::default());
//! std::fs::write("modules.dot", graph.to_dot(Some("App")))?;
//! # Ok::<(), refscope::Error>(())
//! ```
//!
//! ### Conflict Analysis
//!
//! ```rust,no_run
//! use refscope::prelude::*;
//!
//! let conflicts = ConflictAnalysis::new().parse_file("build.log")?;
//! for node in conflicts.nodes().filter(|node| node.is_conflict) {
//!     println!("{} is requested in more than one version", node.name);
//! }
//!
//! let graph = simplify(
//!     &DependencyGraph::from_conflicts(&conflicts),
//!     &SimplifyOptions::default(),
//! );
//! println!("{}", graph.to_dot(None));
//! # Ok::<(), refscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! The crate is organized in layers, leaves first:
//!
//! - [`identity`] - Assembly names, versions and strong-name tokens
//! - [`ildasm`] - Extraction of module metadata from disassembly dumps
//! - [`dependencies`] - The merged [`dependencies::AssemblyTable`] and its JSON persistence
//! - [`redirect`] - Binding-redirect rules and version-conflict checks
//! - [`conflicts`] - The build-log state machine and its [`conflicts::ConflictGraph`]
//! - [`graph`] - The renderable [`graph::DependencyGraph`], simplification and DOT output
//! - [`project`] - Builders that run a whole analysis over one set of artifacts
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T>`] with [`Error`]. Evidence problems are recovered
//! where they are found and logged through the `log` facade; only failures that make a whole
//! input unusable are returned.
//!
//! ## Development and Testing
//!
//! ```bash
//! cargo test
//! cargo bench
//! ```
#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit- and integration-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types.
///
/// ```rust,no_run
/// use refscope::prelude::*;
///
/// let table = AssemblyTable::load("assemblies.json")?;
/// println!("{} assemblies", table.len());
/// # Ok::<(), refscope::Error>(())
/// ```
pub mod prelude;

/// Assembly identities as they appear in dumps, logs and configuration files.
pub mod identity;

/// Module metadata extraction from `ildasm /text` output.
pub mod ildasm;

/// Merging of per-module evidence into one assembly table.
pub mod dependencies;

/// Binding-redirect rules and their application to observed references.
pub mod redirect;

/// Reconstruction of version-conflict chains from MSBuild output.
pub mod conflicts;

/// The renderable dependency graph.
pub mod graph;

/// Analysis pipelines over one set of artifacts.
pub mod project;

/// Small helpers shared by the rendering code.
pub mod utils;

/// `refscope` Result type
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always [`Error`].
///
/// ```rust
/// use refscope::{identity::AssemblyVersion, Result};
///
/// fn parse(text: &str) -> Result<AssemblyVersion> {
///     AssemblyVersion::parse(text)
/// }
///
/// assert!(parse("1.2.3.4").is_ok());
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// `refscope` Error type
///
/// The main error type for all operations in this crate.
///
/// # Examples
///
/// ```rust,no_run
/// use refscope::{project::ConflictAnalysis, Error};
///
/// match ConflictAnalysis::new().parse_file("build.log") {
///     Ok(graph) => println!("{} nodes", graph.len()),
///     Err(Error::MissingRootProject) => println!("Not an MSBuild log"),
///     Err(Error::NoInput(message)) => println!("Nothing to read: {}", message),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
pub use error::Error;
