//! Shared test fixtures: ildasm dumps, MSBuild log excerpts and configuration documents.

mod fixtures;

pub use fixtures::*;
