//! Binding-redirect configuration parsing.
//!
//! Reads the `assemblyBinding` section of an application configuration file:
//!
//! ```xml
//! <dependentAssembly>
//!   <assemblyIdentity name="Newtonsoft.Json" publicKeyToken="30ad4fe6b2a6aeed" culture="neutral" />
//!   <bindingRedirect oldVersion="0.0.0.0-13.0.0.0" newVersion="13.0.0.0" />
//! </dependentAssembly>
//! ```
//!
//! Element and attribute names are matched by local name, so the `urn:schemas-microsoft-com:asm.v1`
//! namespace (or any prefix bound to it) makes no difference.

use std::fmt;

use quick_xml::{
    events::{BytesStart, Event},
    Reader,
};
use serde::{Deserialize, Serialize};

use crate::{
    identity::{AssemblyVersion, PublicKeyToken},
    Result,
};

/// The versions a redirect applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OldVersion {
    /// Exactly one version
    Exact(AssemblyVersion),
    /// Every version in `[low, high]`, bounds included
    Range {
        /// Lowest redirected version
        low: AssemblyVersion,
        /// Highest redirected version
        high: AssemblyVersion,
    },
}

impl OldVersion {
    /// Parse `a.b.c.d` or `a.b.c.d-e.f.g.h`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if either bound is not a valid version.
    pub fn parse(text: &str) -> Result<Self> {
        match text.split_once('-') {
            Some((low, high)) => Ok(OldVersion::Range {
                low: AssemblyVersion::parse(low)?,
                high: AssemblyVersion::parse(high)?,
            }),
            None => Ok(OldVersion::Exact(AssemblyVersion::parse(text)?)),
        }
    }

    /// Returns true if the version is covered.
    ///
    /// Ranges compare component-wise, major first.
    #[must_use]
    pub fn contains(&self, version: AssemblyVersion) -> bool {
        match *self {
            OldVersion::Exact(exact) => exact == version,
            OldVersion::Range { low, high } => low <= version && version <= high,
        }
    }
}

impl fmt::Display for OldVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OldVersion::Exact(version) => write!(f, "{}", version),
            OldVersion::Range { low, high } => write!(f, "{}-{}", low, high),
        }
    }
}

/// One `bindingRedirect` rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingRedirect {
    /// Simple name of the redirected assembly
    pub name: String,
    /// Versions the rule applies to
    pub old_version: OldVersion,
    /// Version references are redirected to
    pub new_version: AssemblyVersion,
    /// Token from `assemblyIdentity`, if given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key_token: Option<PublicKeyToken>,
    /// Culture from `assemblyIdentity`, `None` for neutral
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub culture: Option<String>,
}

impl BindingRedirect {
    /// Create a rule without token or culture.
    pub fn new(
        name: impl Into<String>,
        old_version: OldVersion,
        new_version: AssemblyVersion,
    ) -> Self {
        Self {
            name: name.into(),
            old_version,
            new_version,
            public_key_token: None,
            culture: None,
        }
    }
}

#[derive(Default)]
struct PendingAssembly {
    name: Option<String>,
    public_key_token: Option<PublicKeyToken>,
    culture: Option<String>,
    redirects: Vec<(Option<String>, Option<String>)>,
}

impl PendingAssembly {
    fn finish(self, rules: &mut Vec<BindingRedirect>) {
        let Some(name) = self.name.filter(|name| !name.is_empty()) else {
            log::warn!("Skipping dependentAssembly without an assemblyIdentity name");
            return;
        };

        if self.redirects.is_empty() {
            log::warn!("Skipping dependentAssembly '{}' without a bindingRedirect", name);
        }

        for (old, new) in self.redirects {
            let (Some(old), Some(new)) = (old, new) else {
                log::warn!(
                    "Skipping bindingRedirect for '{}' lacking oldVersion or newVersion",
                    name
                );
                continue;
            };

            match (OldVersion::parse(&old), AssemblyVersion::parse(&new)) {
                (Ok(old_version), Ok(new_version)) => rules.push(BindingRedirect {
                    name: name.clone(),
                    old_version,
                    new_version,
                    public_key_token: self.public_key_token.clone(),
                    culture: self.culture.clone(),
                }),
                (Err(e), _) | (_, Err(e)) => {
                    log::warn!("Skipping bindingRedirect for '{}': {}", name, e);
                }
            }
        }
    }
}

/// Parse every binding redirect in a configuration document.
///
/// Rules are returned in document order. A `dependentAssembly` lacking a name, an `oldVersion` or
/// a `newVersion`, or carrying an unparseable version is skipped with a warning.
///
/// # Arguments
/// * `xml` - The configuration document
///
/// # Errors
/// Returns [`crate::Error::ConfigParse`] if the document is not well-formed XML.
///
/// # Examples
///
/// ```rust
/// use refscope::redirect::parse_binding_redirects;
///
/// let xml = r#"<configuration><runtime><assemblyBinding>
///   <dependentAssembly>
///     <assemblyIdentity name="Lib" />
///     <bindingRedirect oldVersion="1.0.0.0-1.9.9.9" newVersion="2.0.0.0" />
///   </dependentAssembly>
/// </assemblyBinding></runtime></configuration>"#;
///
/// let rules = parse_binding_redirects(xml)?;
/// assert_eq!(rules[0].name, "Lib");
/// # Ok::<(), refscope::Error>(())
/// ```
pub fn parse_binding_redirects(xml: &str) -> Result<Vec<BindingRedirect>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut rules = Vec::new();
    let mut pending: Option<PendingAssembly> = None;

    loop {
        match reader.read_event()? {
            Event::Start(element) => {
                if element.local_name().as_ref() == b"dependentAssembly" {
                    pending = Some(PendingAssembly::default());
                } else if let Some(assembly) = pending.as_mut() {
                    read_child(&element, assembly)?;
                }
            }
            Event::Empty(element) => {
                if element.local_name().as_ref() == b"dependentAssembly" {
                    log::warn!("Skipping empty dependentAssembly element");
                } else if let Some(assembly) = pending.as_mut() {
                    read_child(&element, assembly)?;
                }
            }
            Event::End(element) => {
                if element.local_name().as_ref() == b"dependentAssembly" {
                    if let Some(assembly) = pending.take() {
                        assembly.finish(&mut rules);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(rules)
}

fn read_child(element: &BytesStart<'_>, assembly: &mut PendingAssembly) -> Result<()> {
    match element.local_name().as_ref() {
        b"assemblyIdentity" => {
            for attribute in element.attributes() {
                let attribute = attribute?;
                let value = attribute.unescape_value()?;
                match attribute.key.local_name().as_ref() {
                    b"name" => assembly.name = Some(value.trim().to_string()),
                    b"publicKeyToken" => match PublicKeyToken::parse(&value) {
                        Ok(token) => assembly.public_key_token = Some(token),
                        Err(e) => log::debug!("Ignoring assemblyIdentity token: {}", e),
                    },
                    b"culture" if !value.eq_ignore_ascii_case("neutral") && !value.is_empty() => {
                        assembly.culture = Some(value.to_string());
                    }
                    _ => {}
                }
            }
        }
        b"bindingRedirect" => {
            let mut old = None;
            let mut new = None;
            for attribute in element.attributes() {
                let attribute = attribute?;
                match attribute.key.local_name().as_ref() {
                    b"oldVersion" => old = Some(attribute.unescape_value()?.trim().to_string()),
                    b"newVersion" => new = Some(attribute.unescape_value()?.trim().to_string()),
                    _ => {}
                }
            }
            assembly.redirects.push((old, new));
        }
        _ => {}
    }
    Ok(())
}
