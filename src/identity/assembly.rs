//! Assembly identity, version and strong-name token.
//!
//! This module provides the identity types shared by both evidence paths: the ildasm dump
//! extractor and the build-log conflict parser both reduce what they read to an
//! [`AssemblyIdentity`]. It also implements the lenient *fusion name* parser used on free-form
//! text, next to a strict parser for well-formed display names.
//!
//! # Key Components
//!
//! - [`AssemblyIdentity`] - Name, version, culture and public key token of one assembly
//! - [`AssemblyVersion`] - Four-part version numbering (major.minor.build.revision)
//! - [`PublicKeyToken`] - Normalized, lower-case hex strong-name token
//!
//! # Unknown Values
//!
//! Evidence is often partial. A reference may name an assembly without a version, or a dump may
//! omit the token of an assembly that is not strong-named. Missing information is represented by
//! [`AssemblyVersion::UNKNOWN`] and `None` respectively, and callers must never treat those as
//! real values.
//!
//! # Examples
//!
//! ```rust
//! use refscope::identity::{AssemblyIdentity, AssemblyVersion};
//!
//! let identity = AssemblyIdentity::from_fusion_name(
//!     "'Newtonsoft.Json, Version=6.0.0.0, Culture=neutral, PublicKeyToken=30ad4fe6b2a6aeed'",
//! );
//! assert_eq!(identity.name, "Newtonsoft.Json");
//! assert_eq!(identity.version, AssemblyVersion::new(6, 0, 0, 0));
//! assert!(identity.is_strong_named());
//!
//! // A bare path degrades to its final segment
//! let bare = AssemblyIdentity::from_fusion_name(r"C:\src\Lib\bin\Debug\Lib.dll");
//! assert_eq!(bare.name, "Lib");
//! assert!(bare.version.is_unknown());
//! ```

use std::{fmt, fmt::Write as _, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

/// Identity of a .NET assembly as observed in the evidence.
///
/// # Equality Semantics
///
/// Two identities are equal if and only if their names are equal. Version, culture and token
/// are attributes that get refined as more evidence is merged, so they take no part in
/// [`PartialEq`] or [`Hash`](std::hash::Hash). This makes the name the explicit key of every
/// table and graph in this crate.
///
/// # Examples
///
/// ```rust
/// use refscope::identity::{AssemblyIdentity, AssemblyVersion};
///
/// let old = AssemblyIdentity::new("Foo", AssemblyVersion::new(1, 0, 0, 0));
/// let new = AssemblyIdentity::new("Foo", AssemblyVersion::new(2, 0, 0, 0));
/// assert_eq!(old, new);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyIdentity {
    /// Simple assembly name (e.g., "mscorlib", "Newtonsoft.Json").
    ///
    /// Module extensions (`.dll`, `.exe`) are never part of the name.
    pub name: String,

    /// Four-part version, [`AssemblyVersion::UNKNOWN`] when not observed.
    pub version: AssemblyVersion,

    /// Culture of a satellite assembly, `None` for culture-neutral or not observed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub culture: Option<String>,

    /// Strong-name token, `None` when the assembly is not strong-named or no token was observed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key_token: Option<PublicKeyToken>,
}

impl PartialEq for AssemblyIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for AssemblyIdentity {}

impl std::hash::Hash for AssemblyIdentity {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

/// Four-part version numbering for .NET assemblies.
///
/// Versions are compared component-wise in order: major, minor, build, revision. This is the
/// ordering binding-redirect ranges are evaluated with.
///
/// Serialized as its dotted string form (`"1.2.3.4"`).
///
/// # Examples
///
/// ```rust
/// use refscope::identity::AssemblyVersion;
///
/// let version = AssemblyVersion::parse("1.2.3.4")?;
/// assert_eq!(version.to_string(), "1.2.3.4");
/// assert!(version < AssemblyVersion::new(2, 0, 0, 0));
///
/// // ildasm writes versions colon-delimited
/// assert_eq!(AssemblyVersion::parse_ildasm("1:2:3:4")?, version);
/// # Ok::<(), refscope::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AssemblyVersion {
    /// Major version component.
    pub major: u16,

    /// Minor version component.
    pub minor: u16,

    /// Build version component.
    pub build: u16,

    /// Revision version component.
    pub revision: u16,
}

/// Strong-name public key token in normalized form.
///
/// Holds the eight token bytes as a lower-case hex string without separators, the form used in
/// fusion names (`PublicKeyToken=b77a5c561934e089`). Construction through [`PublicKeyToken::parse`]
/// accepts the spaced, upper-case byte lists ildasm prints.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicKeyToken(String);

impl PublicKeyToken {
    /// Number of bytes in a public key token.
    pub const LEN: usize = 8;

    /// Parse and normalize a public key token.
    ///
    /// Whitespace is removed and the hex digits are lower-cased, so both `B7 7A 5C 56 19 34 E0 89`
    /// and `b77a5c561934e089` yield the same token.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if the text is not hex or does not hold exactly
    /// [`PublicKeyToken::LEN`] bytes.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use refscope::identity::PublicKeyToken;
    ///
    /// let token = PublicKeyToken::parse("B7 7A 5C 56 19 34 E0 89")?;
    /// assert_eq!(token.as_str(), "b77a5c561934e089");
    /// # Ok::<(), refscope::Error>(())
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        let normalized: String = text
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        let bytes = hex::decode(&normalized)
            .map_err(|e| malformed_error!("Invalid hex in PublicKeyToken '{}': {}", text, e))?;

        if bytes.len() != Self::LEN {
            return Err(malformed_error!(
                "PublicKeyToken must be exactly {} bytes, got {} bytes from '{}'",
                Self::LEN,
                bytes.len(),
                text
            ));
        }

        Ok(Self(normalized))
    }

    /// The token as lower-case hex.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AssemblyIdentity {
    /// Create an identity with a name and version, no culture and no token.
    pub fn new(name: impl Into<String>, version: AssemblyVersion) -> Self {
        Self {
            name: name.into(),
            version,
            culture: None,
            public_key_token: None,
        }
    }

    /// Create an identity that only carries a name.
    ///
    /// Version and token are unknown.
    pub fn name_only(name: impl Into<String>) -> Self {
        Self::new(name, AssemblyVersion::UNKNOWN)
    }

    /// Attach a public key token.
    #[must_use]
    pub fn with_token(mut self, token: PublicKeyToken) -> Self {
        self.public_key_token = Some(token);
        self
    }

    /// Leniently parse a fusion name as found in build logs and tool output.
    ///
    /// Accepts `Name, Version=a.b.c.d, Culture=..., PublicKeyToken=...` with any subset of the
    /// optional segments. Quote characters are stripped, a `namespace:` prefix is dropped and
    /// `.dll`/`.exe` suffixes are removed from the name. Input without comma-separated fields that
    /// looks like a file path is reduced to its final path segment.
    ///
    /// This never fails: a missing or malformed version leaves [`AssemblyVersion::UNKNOWN`], and a
    /// missing, `null` or malformed token leaves `None`.
    #[must_use]
    pub fn from_fusion_name(fusion: &str) -> Self {
        let cleaned: String = fusion.chars().filter(|c| *c != '\'' && *c != '"').collect();
        let mut parts = cleaned.split(',').map(str::trim);

        let head = parts.next().unwrap_or_default();
        let mut identity = Self::name_only(simple_name_of(head));

        for part in parts {
            if let Some(value) = part.strip_prefix("Version=") {
                match AssemblyVersion::parse(value) {
                    Ok(version) => identity.version = version,
                    Err(e) => log::debug!("Ignoring version of '{}': {}", identity.name, e),
                }
            } else if let Some(value) = part.strip_prefix("Culture=") {
                if !value.eq_ignore_ascii_case("neutral") && !value.is_empty() {
                    identity.culture = Some(value.to_string());
                }
            } else if let Some(value) = part.strip_prefix("PublicKeyToken=") {
                if value != "null" && !value.is_empty() {
                    match PublicKeyToken::parse(value) {
                        Ok(token) => identity.public_key_token = Some(token),
                        Err(e) => log::debug!("Ignoring token of '{}': {}", identity.name, e),
                    }
                }
            }
        }

        identity
    }

    /// Strictly parse an assembly display name.
    ///
    /// # Format
    ///
    /// ```text
    /// AssemblyName[, Version=Major.Minor.Build.Revision][, Culture=culture][, PublicKeyToken=token]
    /// ```
    ///
    /// Unknown segments are ignored.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if the name is empty, or the version or token is malformed.
    pub fn parse(display_name: &str) -> Result<Self> {
        let mut parts = display_name.split(',').map(str::trim);

        let name = parts.next().unwrap_or_default();
        if name.is_empty() {
            return Err(malformed_error!("Assembly name cannot be empty"));
        }

        let mut identity = Self::name_only(name);
        for part in parts {
            if let Some(value) = part.strip_prefix("Version=") {
                identity.version = AssemblyVersion::parse(value)?;
            } else if let Some(value) = part.strip_prefix("Culture=") {
                if value != "neutral" {
                    identity.culture = Some(value.to_string());
                }
            } else if let Some(value) = part.strip_prefix("PublicKeyToken=") {
                if value != "null" && !value.is_empty() {
                    identity.public_key_token = Some(PublicKeyToken::parse(value)?);
                }
            }
        }

        Ok(identity)
    }

    /// Generate the display name of this identity.
    ///
    /// Unknown components are written the way .NET tools write them: `Culture=neutral` and
    /// `PublicKeyToken=null`. An unknown version is omitted altogether.
    #[must_use]
    pub fn display_name(&self) -> String {
        let mut result = String::with_capacity(self.name.len() + 80);
        result.push_str(&self.name);

        if !self.version.is_unknown() {
            let _ = write!(result, ", Version={}", self.version);
        }

        let culture = self.culture.as_deref().unwrap_or("neutral");
        let _ = write!(result, ", Culture={}", culture);

        let token = self
            .public_key_token
            .as_ref()
            .map_or("null", PublicKeyToken::as_str);
        let _ = write!(result, ", PublicKeyToken={}", token);

        result
    }

    /// Check if a public key token has been observed for this assembly.
    #[must_use]
    pub fn is_strong_named(&self) -> bool {
        self.public_key_token.is_some()
    }
}

impl AssemblyVersion {
    /// Sentinel value representing an unknown or unspecified version (0.0.0.0).
    ///
    /// Use [`is_unknown()`](Self::is_unknown) to check for it. The sentinel is never evidence of
    /// anything: it does not win refinements and never triggers a conflict.
    pub const UNKNOWN: Self = Self {
        major: 0,
        minor: 0,
        build: 0,
        revision: 0,
    };

    /// Create a new assembly version with the specified components.
    #[must_use]
    pub const fn new(major: u16, minor: u16, build: u16, revision: u16) -> Self {
        Self {
            major,
            minor,
            build,
            revision,
        }
    }

    /// Check if this version is the [`UNKNOWN`](Self::UNKNOWN) sentinel.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use refscope::identity::AssemblyVersion;
    ///
    /// assert!(AssemblyVersion::UNKNOWN.is_unknown());
    /// assert!(!AssemblyVersion::new(1, 0, 0, 0).is_unknown());
    /// ```
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        self.major == 0 && self.minor == 0 && self.build == 0 && self.revision == 0
    }

    /// Parse assembly version from its dotted string representation.
    ///
    /// Supports one to four components; missing trailing components default to 0.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if the string has more than four components or a component is
    /// not a `u16`.
    pub fn parse(version_str: &str) -> Result<Self> {
        let parts: Vec<&str> = version_str.trim().split('.').collect();

        if parts.is_empty() || parts.len() > 4 {
            return Err(malformed_error!("Invalid version format: {}", version_str));
        }

        let mut components = [0u16; 4];

        for (i, part) in parts.iter().enumerate() {
            components[i] = part
                .parse::<u16>()
                .map_err(|_| malformed_error!("Invalid version component: {}", part))?;
        }

        Ok(Self::new(
            components[0],
            components[1],
            components[2],
            components[3],
        ))
    }

    /// Parse the colon-delimited form ildasm writes in `.ver` directives (`4:0:0:0`).
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] under the same conditions as [`AssemblyVersion::parse`].
    pub fn parse_ildasm(version_str: &str) -> Result<Self> {
        Self::parse(&version_str.replace(':', "."))
    }
}

/// Reduce a reference to its simple assembly name.
///
/// Takes the final segment of a path, drops a `namespace:` prefix and strips a module extension.
pub(crate) fn simple_name_of(reference: &str) -> &str {
    let segment = reference
        .rsplit(['\\', '/'])
        .next()
        .unwrap_or(reference)
        .trim();

    let segment = match segment.find(':') {
        Some(index) => &segment[index + 1..],
        None => segment,
    };

    strip_module_extension(segment.trim())
}

/// Strip a trailing `.dll` or `.exe`, ignoring case.
pub(crate) fn strip_module_extension(name: &str) -> &str {
    [".dll", ".exe"]
        .iter()
        .find_map(|ext| {
            let stem_len = name.len().checked_sub(ext.len())?;
            let suffix = name.get(stem_len..)?;
            (stem_len > 0 && suffix.eq_ignore_ascii_case(ext)).then(|| &name[..stem_len])
        })
        .unwrap_or(name)
}

impl fmt::Display for AssemblyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

impl fmt::Display for PublicKeyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for AssemblyIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for AssemblyVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl FromStr for AssemblyIdentity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl FromStr for PublicKeyToken {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for AssemblyVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AssemblyVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assembly_version_parse_full() {
        let version = AssemblyVersion::parse("4.0.0.0").unwrap();
        assert_eq!(version, AssemblyVersion::new(4, 0, 0, 0));
    }

    #[test]
    fn test_assembly_version_parse_partial() {
        assert_eq!(
            AssemblyVersion::parse("1.2.3").unwrap(),
            AssemblyVersion::new(1, 2, 3, 0)
        );
        assert_eq!(
            AssemblyVersion::parse("1").unwrap(),
            AssemblyVersion::new(1, 0, 0, 0)
        );
    }

    #[test]
    fn test_assembly_version_parse_invalid() {
        assert!(AssemblyVersion::parse("").is_err());
        assert!(AssemblyVersion::parse("1.2.3.4.5").is_err());
        assert!(AssemblyVersion::parse("1.2.abc.4").is_err());
        assert!(AssemblyVersion::parse("1.2.99999.4").is_err());
    }

    #[test]
    fn test_assembly_version_parse_ildasm() {
        assert_eq!(
            AssemblyVersion::parse_ildasm("13:0:0:0").unwrap(),
            AssemblyVersion::new(13, 0, 0, 0)
        );
        assert!(AssemblyVersion::parse_ildasm("13:x:0:0").is_err());
    }

    #[test]
    fn test_assembly_version_ordering_is_component_wise() {
        let v1 = AssemblyVersion::new(1, 0, 0, 0);
        let v1_9 = AssemblyVersion::new(1, 9, 9, 9);
        let v1_10 = AssemblyVersion::new(1, 10, 0, 0);
        let v2 = AssemblyVersion::new(2, 0, 0, 0);

        assert!(v1 < v1_9);
        assert!(v1_9 < v1_10);
        assert!(v1_10 < v2);
    }

    #[test]
    fn test_assembly_version_serde_as_string() {
        let version = AssemblyVersion::new(4, 5, 0, 1);
        let json = serde_json::to_string(&version).unwrap();
        assert_eq!(json, "\"4.5.0.1\"");

        let back: AssemblyVersion = serde_json::from_str(&json).unwrap();
        assert_eq!(back, version);

        assert!(serde_json::from_str::<AssemblyVersion>("\"four\"").is_err());
    }

    #[test]
    fn test_public_key_token_normalizes_ildasm_bytes() {
        let token = PublicKeyToken::parse("30 AD 4F E6 B2 A6 AE ED ").unwrap();
        assert_eq!(token.as_str(), "30ad4fe6b2a6aeed");
    }

    #[test]
    fn test_public_key_token_rejects_bad_input() {
        assert!(PublicKeyToken::parse("xyz_not_hex_1234").is_err());
        assert!(PublicKeyToken::parse("b77a5c56").is_err());
        assert!(PublicKeyToken::parse("").is_err());
    }

    #[test]
    fn test_fusion_name_full() {
        let identity = AssemblyIdentity::from_fusion_name(
            "'Foo, Version=1.2.3.4, Culture=neutral, PublicKeyToken=abcd1234ef567890'",
        );
        assert_eq!(identity.name, "Foo");
        assert_eq!(identity.version, AssemblyVersion::new(1, 2, 3, 4));
        assert!(identity.culture.is_none());
        assert_eq!(
            identity.public_key_token.unwrap().as_str(),
            "abcd1234ef567890"
        );
    }

    #[test]
    fn test_fusion_name_strips_namespace_and_extension() {
        let identity = AssemblyIdentity::from_fusion_name("ns:Foo.Bar.dll, Version=2.0.0.0");
        assert_eq!(identity.name, "Foo.Bar");
        assert_eq!(identity.version, AssemblyVersion::new(2, 0, 0, 0));

        let exe = AssemblyIdentity::from_fusion_name("\"Tool.EXE\"");
        assert_eq!(exe.name, "Tool");
    }

    #[test]
    fn test_fusion_name_missing_fields_are_unknown() {
        let identity = AssemblyIdentity::from_fusion_name("Foo");
        assert_eq!(identity.name, "Foo");
        assert!(identity.version.is_unknown());
        assert!(identity.public_key_token.is_none());

        let null_token = AssemblyIdentity::from_fusion_name("Foo, PublicKeyToken=null");
        assert!(null_token.public_key_token.is_none());
    }

    #[test]
    fn test_fusion_name_malformed_fields_degrade() {
        let identity =
            AssemblyIdentity::from_fusion_name("Foo, Version=one, PublicKeyToken=zz, Culture=de");
        assert_eq!(identity.name, "Foo");
        assert!(identity.version.is_unknown());
        assert!(identity.public_key_token.is_none());
        assert_eq!(identity.culture.as_deref(), Some("de"));
    }

    #[test]
    fn test_fusion_name_bare_path() {
        let windows = AssemblyIdentity::from_fusion_name(r"C:\packages\Bar.1.0\lib\net45\Bar.dll");
        assert_eq!(windows.name, "Bar");

        let unix = AssemblyIdentity::from_fusion_name("/opt/app/bin/Baz.exe");
        assert_eq!(unix.name, "Baz");
    }

    #[test]
    fn test_strip_module_extension_edge_cases() {
        assert_eq!(strip_module_extension(".dll"), ".dll");
        assert_eq!(strip_module_extension("Foo.Dll"), "Foo");
        assert_eq!(strip_module_extension("Foo.dllx"), "Foo.dllx");
        assert_eq!(strip_module_extension("ünï"), "ünï");
    }

    #[test]
    fn test_strict_parse() {
        let identity = AssemblyIdentity::parse(
            "mscorlib, Version=4.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089",
        )
        .unwrap();
        assert_eq!(identity.name, "mscorlib");
        assert_eq!(identity.version, AssemblyVersion::new(4, 0, 0, 0));
        assert!(identity.is_strong_named());

        assert!(AssemblyIdentity::parse("").is_err());
        assert!(AssemblyIdentity::parse("Foo, Version=x").is_err());
        assert!(AssemblyIdentity::parse("Foo, PublicKeyToken=abc").is_err());
    }

    #[test]
    fn test_display_name_roundtrip() {
        let identity = AssemblyIdentity::new("Foo", AssemblyVersion::new(1, 2, 3, 4))
            .with_token(PublicKeyToken::parse("b77a5c561934e089").unwrap());
        let display = identity.display_name();
        assert_eq!(
            display,
            "Foo, Version=1.2.3.4, Culture=neutral, PublicKeyToken=b77a5c561934e089"
        );

        let parsed: AssemblyIdentity = display.parse().unwrap();
        assert_eq!(parsed.version, identity.version);
        assert_eq!(parsed.public_key_token, identity.public_key_token);
    }

    #[test]
    fn test_identity_equality_is_by_name() {
        let a = AssemblyIdentity::new("Foo", AssemblyVersion::new(1, 0, 0, 0));
        let b = AssemblyIdentity::name_only("Foo")
            .with_token(PublicKeyToken::parse("b77a5c561934e089").unwrap());
        let c = AssemblyIdentity::name_only("Bar");

        assert_eq!(a, b);
        assert_ne!(a, c);

        let mut set = std::collections::HashSet::new();
        set.insert(a);
        assert!(!set.insert(b));
    }
}
