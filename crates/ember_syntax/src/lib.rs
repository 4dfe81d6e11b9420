//! ember_syntax: The syntax tree consumed by the binder.
//!
//! The tree is produced by the parser (or deserialized from JSON) and is
//! never mutated afterwards. Nodes own their children; every node keeps the
//! [`TextSpan`](ember_core::TextSpan) it was parsed from.

pub mod build;
pub mod node;
pub mod operators;

pub use node::*;
pub use operators::{BinaryOperatorKind, UnaryOperatorKind};
