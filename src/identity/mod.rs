//! Assembly identity for .NET assemblies.
//!
//! Every piece of evidence this crate reads, whether an ildasm `.assembly extern` block, a
//! fusion name quoted in a build warning or an `assemblyIdentity` element in a configuration
//! file, is reduced to an [`AssemblyIdentity`]. The name is the identity; version, culture and
//! public key token are attributes that are refined as more evidence arrives.
//!
//! # Module Structure
//!
//! - [`assembly`] - Identity, version and token types with their parsers
//!
//! # Key Components
//!
//! - [`AssemblyIdentity`] - Name-keyed identity with optional attributes
//! - [`AssemblyVersion`] - Four-part version with the [`AssemblyVersion::UNKNOWN`] sentinel
//! - [`PublicKeyToken`] - Normalized strong-name token
//!
//! # Usage Examples
//!
//! ```rust
//! use refscope::identity::AssemblyIdentity;
//!
//! // Strict parsing of a well-formed display name
//! let mscorlib = AssemblyIdentity::parse(
//!     "mscorlib, Version=4.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089"
//! )?;
//! assert!(mscorlib.is_strong_named());
//!
//! // Lenient parsing of text lifted from a build log
//! let lib = AssemblyIdentity::from_fusion_name("'Lib, Version=abc'");
//! assert!(lib.version.is_unknown());
//! # Ok::<(), refscope::Error>(())
//! ```

pub mod assembly;

pub use assembly::{AssemblyIdentity, AssemblyVersion, PublicKeyToken};
pub(crate) use assembly::strip_module_extension;
