//! ember_binder: Semantic binding of Ember syntax trees.
//!
//! The binder resolves names against lexically nested scopes, assigns a
//! type to every expression, checks conversions, operators, calls and
//! access rules, and produces a bound tree. User errors are collected as
//! diagnostics and never stop binding.

pub mod binder;
pub mod bound;
pub mod builtins;
pub mod conversion;
pub mod lowering;
pub mod operators;
pub mod packages;
pub mod program;
pub mod scope;
pub mod session;
pub mod symbol;
pub mod types;

pub use binder::{Binder, ClassBinding};
pub use bound::{BoundBlockStatement, BoundExpression, BoundExpressionKind, BoundLabel, BoundProgram, BoundStatement};
pub use conversion::{classify_conversion, Conversion};
pub use lowering::{IdentityLowerer, Lowerer};
pub use packages::{PackageError, PackageManifest, PackageRegistry, PackageResolver};
pub use program::bind_program;
pub use scope::{ScopeArena, ScopeId};
pub use session::BindSession;
pub use symbol::{Symbol, SymbolKind};
pub use types::{TypeFlags, TypeSymbol};
