//! Interface to the lowering phase.
//!
//! The binder lowers lambda bodies as soon as they are bound; every other
//! body is lowered later by whoever consumes the [`BoundProgram`](crate::BoundProgram).

use crate::bound::BoundBlockStatement;
use crate::symbol::FunctionSymbol;

pub trait Lowerer {
    /// Rewrite `body`, the bound body of `function`, into its lowered form.
    fn lower(&mut self, function: &FunctionSymbol, body: BoundBlockStatement) -> BoundBlockStatement;
}

/// Returns bodies unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityLowerer;

impl Lowerer for IdentityLowerer {
    fn lower(&mut self, _function: &FunctionSymbol, body: BoundBlockStatement) -> BoundBlockStatement {
        body
    }
}
