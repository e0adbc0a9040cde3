//! Line-oriented extraction of assembly records from ildasm text dumps.
//!
//! The extractor understands the handful of directives that carry identity information:
//!
//! ```text
//! .assembly extern Newtonsoft.Json        <- opens an extern block
//! {
//!   .publickeytoken = (30 AD 4F E6 B2 A6 AE ED )
//!   .ver 13:0:0:0
//! }                                       <- closes the block
//! .assembly App                           <- opens the module's own declaration
//! { .ver 1:0:0:0 }
//! .module App.exe                         <- names the module, anywhere in the dump
//! ```
//!
//! Everything else (custom attributes, hash algorithms, IL bodies) is ignored. A directive that
//! is recognized by its leading marker but cannot be parsed is skipped and counted in
//! [`ModuleMetadata::skipped`]; extraction never fails as a whole.

use serde::{Deserialize, Serialize};

use crate::identity::{strip_module_extension, AssemblyIdentity, AssemblyVersion, PublicKeyToken};

/// How a module mentions an assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Declaration {
    /// `.assembly extern Name`, a reference to another assembly.
    Extern,
    /// `.assembly Name`, the module's own assembly manifest.
    Own,
}

/// One assembly block of a dump.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleReference {
    /// Identity as written in the block; unknown attributes stay unknown.
    pub identity: AssemblyIdentity,
    /// Whether the block is a reference or the module's own declaration.
    pub declaration: Declaration,
}

/// Everything one dump says about assembly identities.
///
/// `references` keeps blocks in first-seen order. A second block for the same name replaces the
/// first one in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleMetadata {
    /// Name from the `.module` directive, extension stripped.
    pub module: Option<String>,
    /// Assembly blocks, own declaration included.
    pub references: Vec<ModuleReference>,
    /// Number of directives that matched a marker but could not be parsed.
    pub skipped: usize,
}

impl ModuleMetadata {
    /// Supply a module name when the dump did not declare one.
    ///
    /// ## Arguments
    /// * 'fallback' - Usually the file stem of the dump
    #[must_use]
    pub fn or_module_name(mut self, fallback: impl Into<String>) -> Self {
        if self.module.is_none() {
            let fallback = fallback.into();
            self.module = Some(strip_module_extension(&fallback).to_string());
        }
        self
    }

    /// The module's own assembly declaration, if the dump has one.
    #[must_use]
    pub fn own_identity(&self) -> Option<&AssemblyIdentity> {
        self.references
            .iter()
            .find(|reference| reference.declaration == Declaration::Own)
            .map(|reference| &reference.identity)
    }

    /// Iterate the `.assembly extern` blocks only.
    pub fn externs(&self) -> impl Iterator<Item = &AssemblyIdentity> {
        self.references
            .iter()
            .filter(|reference| reference.declaration == Declaration::Extern)
            .map(|reference| &reference.identity)
    }

    /// Returns true if the dump contained no assembly blocks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }
}

/// Extract the module name and assembly blocks from one ildasm text dump.
///
/// # Arguments
/// * `text` - The complete output of `ildasm /text` for one module
///
/// # Returns
/// The [`ModuleMetadata`] for the dump. Never fails; unparseable directives are counted in
/// [`ModuleMetadata::skipped`].
///
/// # Examples
///
/// ```rust
/// use refscope::ildasm::extract_module;
///
/// let dump = ".assembly extern Lib\n{\n  .ver 2:1:0:0\n}\n.module App.exe\n";
/// let metadata = extract_module(dump);
///
/// assert_eq!(metadata.module.as_deref(), Some("App"));
/// assert_eq!(metadata.references[0].identity.name, "Lib");
/// assert_eq!(metadata.references[0].identity.version.to_string(), "2.1.0.0");
/// ```
#[must_use]
pub fn extract_module(text: &str) -> ModuleMetadata {
    let mut metadata = ModuleMetadata::default();
    let mut open: Option<usize> = None;

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();

        if let Some(rest) = line.strip_prefix(".module ") {
            if metadata.module.is_none() && !rest.trim_start().starts_with("extern ") {
                match rest.split_whitespace().last() {
                    Some(file) => metadata.module = Some(strip_module_extension(file).to_string()),
                    None => skip(&mut metadata, index, line, "module without a file name"),
                }
            }
            continue;
        }

        if let Some(rest) = line
            .strip_prefix(".assembly")
            .filter(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
        {
            open = open_block(&mut metadata, rest);
            if open.is_none() {
                skip(&mut metadata, index, line, "assembly block without a name");
            }
            continue;
        }

        let Some(current) = open else {
            continue;
        };
        let identity = &mut metadata.references[current].identity;

        if line.starts_with('}') {
            open = None;
        } else if let Some(rest) = line.strip_prefix(".ver ") {
            let version = rest.split_whitespace().next().unwrap_or_default();
            match AssemblyVersion::parse_ildasm(version) {
                Ok(version) => identity.version = version,
                Err(_) => skip(&mut metadata, index, line, "unparseable version"),
            }
        } else if line.starts_with(".publickeytoken") {
            match parenthesized(line).map(PublicKeyToken::parse) {
                Some(Ok(token)) => identity.public_key_token = Some(token),
                _ => skip(&mut metadata, index, line, "unparseable public key token"),
            }
        } else if line.starts_with(".locale") || line.starts_with(".culture") {
            match quoted(line) {
                Some(culture) if !culture.is_empty() => {
                    identity.culture = Some(culture.to_string());
                }
                _ => skip(&mut metadata, index, line, "unparseable culture"),
            }
        }
    }

    metadata
}

/// Open (or reopen) the block for the assembly named on an `.assembly` line.
///
/// Returns the index of the block in `references`, or `None` if the line holds no name.
fn open_block(metadata: &mut ModuleMetadata, rest: &str) -> Option<usize> {
    let mut tokens: Vec<&str> = rest
        .split_whitespace()
        .filter(|token| !token.starts_with("/*") && !token.ends_with("*/"))
        .collect();
    if tokens.last() == Some(&"{") {
        tokens.pop();
    }

    let declaration = if tokens.first() == Some(&"extern") {
        Declaration::Extern
    } else {
        Declaration::Own
    };

    let name = tokens.last().copied().filter(|name| *name != "extern")?;
    let name = name.trim_matches('\'');
    if name.is_empty() {
        return None;
    }

    let reference = ModuleReference {
        identity: AssemblyIdentity::name_only(name),
        declaration,
    };

    match metadata
        .references
        .iter()
        .position(|existing| existing.identity.name == name)
    {
        Some(position) => {
            metadata.references[position] = reference;
            Some(position)
        }
        None => {
            metadata.references.push(reference);
            Some(metadata.references.len() - 1)
        }
    }
}

fn skip(metadata: &mut ModuleMetadata, index: usize, line: &str, reason: &str) {
    log::debug!("Skipping ildasm line {}: {} ({})", index + 1, reason, line);
    metadata.skipped += 1;
}

/// Text between the first `(` and the `)` that follows it.
fn parenthesized(line: &str) -> Option<&str> {
    let start = line.find('(')? + 1;
    let end = line[start..].find(')')? + start;
    Some(&line[start..end])
}

/// Text between the first pair of single quotes.
fn quoted(line: &str) -> Option<&str> {
    let start = line.find('\'')? + 1;
    let end = line[start..].find('\'')? + start;
    Some(&line[start..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{APP_DUMP, LIB_DUMP};

    #[test]
    fn test_extract_sample_dump() {
        let metadata = extract_module(LIB_DUMP);

        assert_eq!(metadata.module.as_deref(), Some("Lib"));
        assert_eq!(metadata.references.len(), 3);
        assert_eq!(metadata.skipped, 0);

        let mscorlib = &metadata.references[0];
        assert_eq!(mscorlib.identity.name, "mscorlib");
        assert_eq!(mscorlib.declaration, Declaration::Extern);
        assert_eq!(mscorlib.identity.version, AssemblyVersion::new(4, 0, 0, 0));
        assert_eq!(
            mscorlib.identity.public_key_token.as_ref().unwrap().as_str(),
            "b77a5c561934e089"
        );

        let own = metadata.own_identity().unwrap();
        assert_eq!(own.name, "Lib");
        assert_eq!(own.version, AssemblyVersion::new(1, 0, 0, 0));
        assert!(own.public_key_token.is_none());
        assert_eq!(metadata.externs().count(), 2);
    }

    #[test]
    fn test_block_without_attributes_is_unknown() {
        let metadata = extract_module(".assembly extern Empty\n{\n}\n");
        let identity = &metadata.references[0].identity;
        assert!(identity.version.is_unknown());
        assert!(identity.public_key_token.is_none());
        assert!(metadata.module.is_none());
    }

    #[test]
    fn test_attributes_outside_block_are_ignored() {
        let dump = ".assembly extern A\n{\n}\n.ver 9:9:9:9\n.module A.dll\n";
        let metadata = extract_module(dump);
        assert!(metadata.references[0].identity.version.is_unknown());
    }

    #[test]
    fn test_duplicate_blocks_last_wins_first_position() {
        let dump = "\
.assembly extern A
{
  .ver 1:0:0:0
}
.assembly extern B
{
}
.assembly extern A
{
  .ver 2:0:0:0
}
";
        let metadata = extract_module(dump);
        assert_eq!(metadata.references.len(), 2);
        assert_eq!(metadata.references[0].identity.name, "A");
        assert_eq!(
            metadata.references[0].identity.version,
            AssemblyVersion::new(2, 0, 0, 0)
        );
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let dump = "\
.assembly extern A
{
  .ver 1:x:0:0
  .publickeytoken = (ZZ )
}
.assembly
.assembly extern B
{
  .ver 3:0:0:0
}
";
        let metadata = extract_module(dump);
        assert_eq!(metadata.skipped, 3);
        assert!(metadata.references[0].identity.version.is_unknown());
        assert!(metadata.references[0].identity.public_key_token.is_none());
        assert_eq!(
            metadata.references[1].identity.version,
            AssemblyVersion::new(3, 0, 0, 0)
        );
    }

    #[test]
    fn test_retargetable_and_token_comments() {
        let dump = "\
.assembly extern retargetable /*23000002*/ System.Runtime
{
  .locale 'de-DE'
  .ver 4:2:0:0
}
";
        let metadata = extract_module(dump);
        let identity = &metadata.references[0].identity;
        assert_eq!(identity.name, "System.Runtime");
        assert_eq!(identity.culture.as_deref(), Some("de-DE"));
    }

    #[test]
    fn test_module_extern_is_not_the_module_name() {
        let dump = ".module extern KERNEL32.dll\n.module Native.dll\n";
        let metadata = extract_module(dump);
        assert_eq!(metadata.module.as_deref(), Some("Native"));
    }

    #[test]
    fn test_or_module_name_fallback() {
        let metadata = extract_module(".assembly extern A\n{\n}\n").or_module_name("Tool.exe");
        assert_eq!(metadata.module.as_deref(), Some("Tool"));

        let named = extract_module(APP_DUMP).or_module_name("Other");
        assert_eq!(named.module.as_deref(), Some("App"));
    }
}
