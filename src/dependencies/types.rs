//! Record and observation types of the assembly table.
//!
//! This module provides the data structures the merge engine folds ildasm extractions into:
//! one [`AssemblyRecord`] per assembly name, holding the refined identity and the reference
//! observations in both directions.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::identity::{AssemblyIdentity, AssemblyVersion, PublicKeyToken};

/// One reference seen at a referencing site.
///
/// In [`AssemblyRecord::refs`] the name is the referencing module, in [`AssemblyRecord::deps`]
/// it is the referenced assembly. The version is always the one written at the referencing site,
/// which may differ from the referenced assembly's own declared version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Observation {
    /// Name of the other end of the reference
    pub name: String,
    /// Version as observed at the referencing site
    pub version: AssemblyVersion,
}

impl Observation {
    /// Create an observation.
    pub fn new(name: impl Into<String>, version: AssemblyVersion) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }
}

/// Accumulated identity attributes from one class of evidence.
///
/// Every field only grows: versions by ordering, token and culture from `None` to the
/// lexicographically greatest value seen. Joining is commutative, associative and idempotent,
/// which is what makes merging independent of dump order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityEvidence {
    /// Highest known version seen, [`AssemblyVersion::UNKNOWN`] if none
    pub version: AssemblyVersion,
    /// Greatest token seen
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key_token: Option<PublicKeyToken>,
    /// Greatest culture seen
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub culture: Option<String>,
}

impl IdentityEvidence {
    /// Join an identity into this evidence.
    pub fn join(&mut self, identity: &AssemblyIdentity) {
        self.version = self.version.max(identity.version);
        if identity.public_key_token > self.public_key_token {
            self.public_key_token.clone_from(&identity.public_key_token);
        }
        if identity.culture > self.culture {
            self.culture.clone_from(&identity.culture);
        }
    }
}

/// Everything the table knows about one assembly.
///
/// # Refinement
///
/// The resolved [`identity`](Self::identity) is derived from two evidence classes: what the
/// assembly's own `.assembly` declaration says (`own`) and what references to it say
/// (`referenced`). An attribute from the own declaration always wins over the same attribute from
/// a reference. Within one class a known value beats an unknown one, and the greater value wins.
/// Attributes therefore only move from unknown to known, or to a stronger value, never back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyRecord {
    /// Resolved identity
    pub identity: AssemblyIdentity,

    /// True once the assembly's own declaration has been merged
    #[serde(default)]
    pub declared: bool,

    /// Incoming observations: which module referenced this assembly, at which version
    #[serde(default)]
    pub refs: Vec<Observation>,

    /// Outgoing observations: which assemblies this one references, at which version
    #[serde(default)]
    pub deps: Vec<Observation>,

    /// Every known version any evidence carried for this name
    #[serde(default)]
    pub observed_versions: BTreeSet<AssemblyVersion>,

    /// Evidence from the own declaration
    #[serde(default)]
    pub own: IdentityEvidence,

    /// Evidence from references
    #[serde(default)]
    pub referenced: IdentityEvidence,
}

impl AssemblyRecord {
    /// Create an empty record for a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            identity: AssemblyIdentity::name_only(name),
            declared: false,
            refs: Vec::new(),
            deps: Vec::new(),
            observed_versions: BTreeSet::new(),
            own: IdentityEvidence::default(),
            referenced: IdentityEvidence::default(),
        }
    }

    /// Refine the record with one more piece of evidence.
    ///
    /// ## Arguments
    /// * 'identity' - The identity as written in the evidence
    /// * 'declared' - Whether the evidence is the assembly's own declaration
    pub fn refine(&mut self, identity: &AssemblyIdentity, declared: bool) {
        if declared {
            self.declared = true;
            self.own.join(identity);
        } else {
            self.referenced.join(identity);
        }

        if !identity.version.is_unknown() {
            self.observed_versions.insert(identity.version);
        }

        self.resolve();
    }

    fn resolve(&mut self) {
        self.identity.version = if self.own.version.is_unknown() {
            self.referenced.version
        } else {
            self.own.version
        };
        self.identity.public_key_token = self
            .own
            .public_key_token
            .clone()
            .or_else(|| self.referenced.public_key_token.clone());
        self.identity.culture = self
            .own
            .culture
            .clone()
            .or_else(|| self.referenced.culture.clone());
    }

    /// Assembly name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.identity.name
    }

    /// Returns true if references disagree about the version of this assembly.
    #[must_use]
    pub fn has_version_spread(&self) -> bool {
        self.observed_versions.len() > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(hex: &str) -> PublicKeyToken {
        PublicKeyToken::parse(hex).unwrap()
    }

    #[test]
    fn test_known_version_beats_unknown() {
        let mut record = AssemblyRecord::new("Foo");
        record.refine(&AssemblyIdentity::new("Foo", AssemblyVersion::new(1, 0, 0, 0)), false);
        record.refine(&AssemblyIdentity::name_only("Foo"), false);

        assert_eq!(record.identity.version, AssemblyVersion::new(1, 0, 0, 0));
        assert_eq!(record.observed_versions.len(), 1);
    }

    #[test]
    fn test_declaration_beats_higher_reference() {
        let mut record = AssemblyRecord::new("Foo");
        record.refine(&AssemblyIdentity::new("Foo", AssemblyVersion::new(3, 0, 0, 0)), false);
        record.refine(&AssemblyIdentity::new("Foo", AssemblyVersion::new(2, 0, 0, 0)), true);

        assert!(record.declared);
        assert_eq!(record.identity.version, AssemblyVersion::new(2, 0, 0, 0));
        assert!(record.has_version_spread());
    }

    #[test]
    fn test_declaration_without_version_keeps_referenced_version() {
        let mut record = AssemblyRecord::new("Foo");
        record.refine(&AssemblyIdentity::name_only("Foo"), true);
        record.refine(&AssemblyIdentity::new("Foo", AssemblyVersion::new(1, 2, 0, 0)), false);

        assert_eq!(record.identity.version, AssemblyVersion::new(1, 2, 0, 0));
    }

    #[test]
    fn test_token_is_never_lost() {
        let mut record = AssemblyRecord::new("Foo");
        record.refine(
            &AssemblyIdentity::name_only("Foo").with_token(token("b77a5c561934e089")),
            false,
        );
        record.refine(&AssemblyIdentity::name_only("Foo"), false);
        record.refine(&AssemblyIdentity::name_only("Foo"), true);

        assert_eq!(
            record.identity.public_key_token.as_ref().map(PublicKeyToken::as_str),
            Some("b77a5c561934e089")
        );
    }

    #[test]
    fn test_competing_tokens_join_to_greatest() {
        let mut forward = AssemblyRecord::new("Foo");
        let mut backward = AssemblyRecord::new("Foo");
        let low = AssemblyIdentity::name_only("Foo").with_token(token("0000000000000001"));
        let high = AssemblyIdentity::name_only("Foo").with_token(token("ffffffffffffffff"));

        forward.refine(&low, false);
        forward.refine(&high, false);
        backward.refine(&high, false);
        backward.refine(&low, false);

        assert_eq!(forward.identity.public_key_token, backward.identity.public_key_token);
    }
}
