//! ember_core: Shared primitives for the Ember front-end crates.
//!
//! Only source location tracking lives here; everything that knows about
//! syntax, symbols or diagnostics sits in its own crate.

pub mod text;

pub use text::{TextPos, TextSpan};
