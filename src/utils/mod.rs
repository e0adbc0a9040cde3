//! Small helpers shared across modules.

mod dot;

pub use dot::escape_dot;
