//! # refscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types from the refscope
//! library. Import it to get quick access to everything a typical analysis run needs.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all refscope operations
pub use crate::Error;

/// The result type used throughout refscope
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Builders for complete analysis runs
pub use crate::project::{AnalysisContext, AnalysisResult, ConflictAnalysis, ModuleAnalysis};

// ================================================================================================
// Assembly Identity
// ================================================================================================

/// Name, version, culture and strong-name token of an assembly
pub use crate::identity::{AssemblyIdentity, AssemblyVersion, PublicKeyToken};

// ================================================================================================
// Module Evidence
// ================================================================================================

/// Extraction of one `ildasm /text` dump
pub use crate::ildasm::{extract_module, Declaration, ModuleMetadata, ModuleReference};

/// The merged, persistable table of assembly records
pub use crate::dependencies::{AssemblyRecord, AssemblyTable, Observation};

// ================================================================================================
// Binding Redirects
// ================================================================================================

/// Rule parsing and version resolution
pub use crate::redirect::{
    parse_binding_redirects, BindingRedirect, BindingRedirects, OldVersion, RedirectResolver,
    ReferenceCheck,
};

// ================================================================================================
// Build-Log Conflicts
// ================================================================================================

/// The conflict-chain parser and its output
pub use crate::conflicts::{
    parse_build_output, ConflictEdge, ConflictGraph, ConflictNode, ConflictParseOptions,
};

// ================================================================================================
// Rendering
// ================================================================================================

/// The renderable graph and its simplification
pub use crate::graph::{
    simplify, DependencyGraph, EdgeKind, GraphEdge, GraphNode, PlatformAssembly, SimplifyOptions,
};
