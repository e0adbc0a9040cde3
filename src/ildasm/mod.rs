//! Module metadata extraction from `ildasm /text` dumps.
//!
//! A dump is the disassembler's textual rendering of one compiled module. This module reads the
//! assembly manifest part of it (the module's own `.assembly` declaration and its
//! `.assembly extern` references) and hands the result to
//! [`crate::dependencies::AssemblyTable::merge`].
//!
//! Extraction is a pure function of the text, so dumps can be processed in parallel.

mod extractor;

pub use extractor::{extract_module, Declaration, ModuleMetadata, ModuleReference};
