pub mod common;
pub mod conflicts;
pub mod modules;
pub mod redirects;
