//! Reference merge engine.
//!
//! This module folds the [`crate::ildasm::ModuleMetadata`] of many dumps into one
//! [`AssemblyTable`]. Partial and contradicting evidence is reconciled with a monotonic
//! "strong beats weak" refinement: an own declaration beats a reference, a known value beats an
//! unknown one, and nothing ever moves back from known to unknown.
//!
//! # Key Components
//!
//! - [`AssemblyTable`] - Name-keyed table of records, the merge entry point and its JSON cache
//! - [`AssemblyRecord`] - Refined identity plus incoming and outgoing observations
//! - [`Observation`] - One reference seen at a referencing site, with the version written there
//!
//! # Concurrency
//!
//! Extraction is pure and can run on many threads, but the table has a single writer: merge
//! results one at a time, on one thread. [`crate::project::ModuleAnalysis`] does exactly that.

mod table;
mod types;

pub use table::AssemblyTable;
pub use types::{AssemblyRecord, IdentityEvidence, Observation};
