//! Binding-redirect semantics.
//!
//! A binding redirect remaps the version a reference asks for to a version that is actually
//! deployed. This module parses the rules out of configuration XML ([`parse_binding_redirects`]),
//! holds one run's rules ([`BindingRedirects`]) and evaluates the references of an
//! [`crate::dependencies::AssemblyTable`] against them ([`RedirectResolver`]).
//!
//! Locating configuration files is left to the caller.

mod config;
mod resolver;

pub use config::{parse_binding_redirects, BindingRedirect, OldVersion};
pub use resolver::{BindingRedirects, RedirectResolver, ReferenceCheck};
