//! Effective-version computation and conflict checks.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    dependencies::AssemblyTable,
    identity::AssemblyVersion,
    redirect::BindingRedirect,
};

/// Binding redirects of one run, keyed by assembly name.
///
/// When several rules name the same assembly, the rule inserted last replaces the earlier ones.
/// Names are matched exactly.
///
/// # Examples
///
/// ```rust
/// use refscope::{
///     identity::AssemblyVersion,
///     redirect::{BindingRedirect, BindingRedirects, OldVersion},
/// };
///
/// let v1 = AssemblyVersion::new(1, 0, 0, 0);
/// let v2 = AssemblyVersion::new(2, 0, 0, 0);
///
/// let mut redirects = BindingRedirects::new();
/// redirects.insert(BindingRedirect::new("X", OldVersion::Exact(v1), v2));
///
/// assert_eq!(redirects.effective_version("X", v1), v2);
/// assert_eq!(redirects.effective_version("Y", v1), v1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BindingRedirects {
    rules: BTreeMap<String, BindingRedirect>,
}

impl BindingRedirects {
    /// Create an empty rule set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule, replacing any earlier rule for the same name.
    pub fn insert(&mut self, rule: BindingRedirect) {
        if let Some(previous) = self.rules.insert(rule.name.clone(), rule) {
            log::debug!(
                "Binding redirect for '{}' ({} -> {}) replaced by a later rule",
                previous.name,
                previous.old_version,
                previous.new_version
            );
        }
    }

    /// Look up the rule for an assembly name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BindingRedirect> {
        self.rules.get(name)
    }

    /// Number of distinct redirected names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if no rule is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterate rules in name order.
    pub fn iter(&self) -> impl Iterator<Item = &BindingRedirect> {
        self.rules.values()
    }

    /// The version a reference actually binds to.
    ///
    /// Returns the rule's new version when a rule for `name` covers `observed`, and `observed`
    /// unchanged otherwise. An unknown observed version is never redirected.
    ///
    /// # Arguments
    /// * `name` - Referenced assembly name
    /// * `observed` - Version written at the referencing site
    #[must_use]
    pub fn effective_version(&self, name: &str, observed: AssemblyVersion) -> AssemblyVersion {
        if observed.is_unknown() {
            return observed;
        }

        match self.rules.get(name) {
            Some(rule) if rule.old_version.contains(observed) => rule.new_version,
            _ => observed,
        }
    }

    /// Returns true if a reference binds to a version other than the one resolved.
    ///
    /// Unknown versions on either side never count as a conflict.
    ///
    /// # Arguments
    /// * `name` - Referenced assembly name
    /// * `observed` - Version written at the referencing site
    /// * `resolved` - Version the referenced assembly actually has
    #[must_use]
    pub fn is_version_conflict(
        &self,
        name: &str,
        observed: AssemblyVersion,
        resolved: AssemblyVersion,
    ) -> bool {
        if observed.is_unknown() || resolved.is_unknown() {
            return false;
        }
        self.effective_version(name, observed) != resolved
    }
}

impl Extend<BindingRedirect> for BindingRedirects {
    fn extend<T: IntoIterator<Item = BindingRedirect>>(&mut self, iter: T) {
        for rule in iter {
            self.insert(rule);
        }
    }
}

impl FromIterator<BindingRedirect> for BindingRedirects {
    fn from_iter<T: IntoIterator<Item = BindingRedirect>>(iter: T) -> Self {
        let mut redirects = Self::new();
        redirects.extend(iter);
        redirects
    }
}

/// Outcome of checking one reference observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceCheck {
    /// Referencing module
    pub referrer: String,
    /// Referenced assembly
    pub target: String,
    /// Version written at the referencing site
    pub observed: AssemblyVersion,
    /// Version after redirection
    pub effective: AssemblyVersion,
    /// Version the referenced assembly resolved to in the table
    pub resolved: AssemblyVersion,
    /// True if a redirect changed the version
    pub redirected: bool,
    /// True if the reference does not bind to the resolved version
    pub is_conflict: bool,
}

/// Evaluates every reference of an [`AssemblyTable`] against a set of redirects.
pub struct RedirectResolver<'a> {
    redirects: &'a BindingRedirects,
}

impl<'a> RedirectResolver<'a> {
    /// Create a resolver over a rule set.
    #[must_use]
    pub fn new(redirects: &'a BindingRedirects) -> Self {
        Self { redirects }
    }

    /// Check one observation of `target` made by `referrer`.
    #[must_use]
    pub fn check_reference(
        &self,
        referrer: &str,
        target: &str,
        observed: AssemblyVersion,
        resolved: AssemblyVersion,
    ) -> ReferenceCheck {
        let effective = self.redirects.effective_version(target, observed);
        ReferenceCheck {
            referrer: referrer.to_string(),
            target: target.to_string(),
            observed,
            effective,
            resolved,
            redirected: effective != observed,
            is_conflict: self.redirects.is_version_conflict(target, observed, resolved),
        }
    }

    /// Check every incoming observation of every record.
    ///
    /// The resolved version of a reference is the referenced record's identity version, which
    /// prefers the assembly's own declaration.
    #[must_use]
    pub fn check(&self, table: &AssemblyTable) -> Vec<ReferenceCheck> {
        let checks: Vec<ReferenceCheck> = table
            .iter()
            .flat_map(|record| {
                record.refs.iter().map(move |observation| {
                    self.check_reference(
                        &observation.name,
                        record.name(),
                        observation.version,
                        record.identity.version,
                    )
                })
            })
            .collect();

        let conflicts = checks.iter().filter(|check| check.is_conflict).count();
        if conflicts > 0 {
            log::info!(
                "{} of {} references bind to a version other than the resolved one",
                conflicts,
                checks.len()
            );
        }

        checks
    }
}
