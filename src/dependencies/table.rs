//! The merged assembly table.
//!
//! [`AssemblyTable`] is the single writer's view of every module merged so far. It maps assembly
//! names to [`AssemblyRecord`]s in a `BTreeMap`, so iteration (and therefore every graph and
//! JSON document derived from it) is deterministic.

use std::{collections::BTreeMap, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    dependencies::{AssemblyRecord, Observation},
    identity::AssemblyIdentity,
    ildasm::{Declaration, ModuleMetadata},
    Result,
};

/// Name-keyed table of assembly records.
///
/// # Merge Semantics
///
/// [`merge`](Self::merge) runs in two passes per module:
///
/// 1. Every identity the module mentions refines (or creates) its record. See
///    [`AssemblyRecord::refine`] for the join rules.
/// 2. For every extern reference other than the module itself, an incoming observation
///    `{module, version}` is appended to the referenced record, and an outgoing observation
///    `{referenced, version}` to the module's own record, if the module has one.
///
/// Because the refinement is a join, the resolved identities do not depend on the order modules
/// are merged in. Observation lists keep merge order.
///
/// # Persistence
///
/// The table serializes to a JSON object keyed by assembly name, which can be reloaded to skip
/// re-ingestion.
///
/// # Examples
///
/// ```rust
/// use refscope::{dependencies::AssemblyTable, ildasm::extract_module};
///
/// let mut table = AssemblyTable::new();
/// table.merge(&extract_module(".assembly extern Lib\n{\n  .ver 1:0:0:0\n}\n.module App.exe\n"));
///
/// let lib = table.get("Lib").unwrap();
/// assert_eq!(lib.refs[0].name, "App");
/// # Ok::<(), refscope::Error>(())
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssemblyTable {
    records: BTreeMap<String, AssemblyRecord>,
}

impl AssemblyTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge the extraction result of one module.
    ///
    /// # Arguments
    /// * `metadata` - What one dump declared and referenced
    pub fn merge(&mut self, metadata: &ModuleMetadata) {
        for reference in &metadata.references {
            self.refine(
                &reference.identity,
                reference.declaration == Declaration::Own,
            );
        }

        let Some(module) = metadata.module.as_deref() else {
            if !metadata.is_empty() {
                log::warn!(
                    "Dump with {} assembly blocks names no module, references not recorded",
                    metadata.references.len()
                );
            }
            return;
        };

        let module_has_record = self.records.contains_key(module);

        for identity in metadata.externs() {
            if identity.name == module {
                continue;
            }

            if let Some(record) = self.records.get_mut(&identity.name) {
                record
                    .refs
                    .push(Observation::new(module, identity.version));
            }

            if module_has_record {
                if let Some(record) = self.records.get_mut(module) {
                    record
                        .deps
                        .push(Observation::new(identity.name.clone(), identity.version));
                }
            }
        }
    }

    /// Refine the record for an identity, creating it if absent.
    ///
    /// # Arguments
    /// * `identity` - The identity as observed
    /// * `declared` - Whether the observation is the assembly's own declaration
    pub fn refine(&mut self, identity: &AssemblyIdentity, declared: bool) {
        self.records
            .entry(identity.name.clone())
            .or_insert_with(|| AssemblyRecord::new(identity.name.clone()))
            .refine(identity, declared);
    }

    /// Look up a record by assembly name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AssemblyRecord> {
        self.records.get(name)
    }

    /// Returns true if a record exists for the name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the table holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate records in name order.
    pub fn iter(&self) -> impl Iterator<Item = &AssemblyRecord> {
        self.records.values()
    }

    /// Total number of incoming observations over all records.
    #[must_use]
    pub fn observation_count(&self) -> usize {
        self.records.values().map(|record| record.refs.len()).sum()
    }

    /// Serialize the table as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns [`crate::Error::Cache`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize a table from JSON produced by [`to_json`](Self::to_json).
    ///
    /// # Errors
    /// Returns [`crate::Error::Cache`] if the document is not a valid table.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the table to a file as JSON.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] on I/O failure or [`crate::Error::Cache`] if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path.as_ref(), self.to_json()?)?;
        log::info!(
            "Saved {} assembly records to {}",
            self.len(),
            path.as_ref().display()
        );
        Ok(())
    }

    /// Load a table previously written by [`save`](Self::save).
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] on I/O failure or [`crate::Error::Cache`] if the file
    /// is not a valid table.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let table = Self::from_json(&fs::read_to_string(path.as_ref())?)?;
        log::info!(
            "Loaded {} assembly records from {}",
            table.len(),
            path.as_ref().display()
        );
        Ok(table)
    }
}

impl<'a> IntoIterator for &'a AssemblyTable {
    type Item = &'a AssemblyRecord;
    type IntoIter = std::collections::btree_map::Values<'a, String, AssemblyRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.values()
    }
}
