//! The binder implementation.
//!
//! A [`Binder`] resolves one lexical unit (a function body, a lambda body,
//! a class or struct body, or the program's global statements) against the
//! scopes of a shared [`BindSession`]. Handles:
//! - Type clause resolution
//! - Member declarations (functions, classes, structs, enums, packages)
//! - Statements, including loop label bookkeeping
//! - Expressions, including casts, calls and access rules
//!
//! User errors never abort binding. They are reported to the session and
//! replaced by error-typed sentinel nodes.

mod expressions;
mod lookup;
mod members;
mod statements;

pub use members::ClassBinding;

use crate::bound::BoundLabel;
use crate::scope::ScopeId;
use crate::session::BindSession;
use crate::symbol::{ClassSymbol, FunctionSymbol, Symbol};
use crate::types::TypeSymbol;
use ember_core::text::TextSpan;
use ember_diagnostics::{DiagnosticMessage, Stage};
use std::sync::Arc;

pub struct Binder<'s> {
    session: &'s mut BindSession,
    /// Innermost scope; declarations go here.
    active_scope: ScopeId,
    /// Enclosing function, if any.
    function: Option<Arc<FunctionSymbol>>,
    /// Enclosing class, if binding a method body.
    class: Option<Arc<ClassSymbol>>,
    label_counter: usize,
    break_labels: Vec<BoundLabel>,
    continue_labels: Vec<BoundLabel>,
    /// Class and struct types visible before their symbols are declared.
    pre_initial_typeset: Option<Vec<TypeSymbol>>,
}

impl<'s> Binder<'s> {
    /// Create a binder with a fresh member scope below `parent`. The
    /// parameters of `function` are declared into it.
    pub fn new(session: &'s mut BindSession, parent: ScopeId, function: Option<Arc<FunctionSymbol>>) -> Self {
        let scope = session.scopes.create(Some(parent));
        if let Some(function) = &function {
            for parameter in &function.parameters {
                session.scopes.try_declare_symbol(scope, Symbol::Variable(Arc::clone(parameter)));
            }
        }
        Self::in_scope(session, scope, function)
    }

    /// Create a binder that declares directly into `scope`.
    pub fn in_scope(session: &'s mut BindSession, scope: ScopeId, function: Option<Arc<FunctionSymbol>>) -> Self {
        Self {
            session,
            active_scope: scope,
            function,
            class: None,
            label_counter: 0,
            break_labels: Vec::new(),
            continue_labels: Vec::new(),
            pre_initial_typeset: None,
        }
    }

    pub fn with_class(mut self, class: Arc<ClassSymbol>) -> Self {
        self.class = Some(class);
        self
    }

    pub fn with_pre_initial_typeset(mut self, typeset: Vec<TypeSymbol>) -> Self {
        self.pre_initial_typeset = Some(typeset);
        self
    }

    pub fn active_scope(&self) -> ScopeId {
        self.active_scope
    }

    pub fn function(&self) -> Option<&Arc<FunctionSymbol>> {
        self.function.as_ref()
    }

    pub fn session(&self) -> &BindSession {
        &*self.session
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn report(&mut self, span: TextSpan, message: &DiagnosticMessage, args: &[&str]) {
        tracing::trace!(kind = %message.kind, %span, "binder error");
        self.session.diagnostics.error(Stage::Binder, span, message, args);
    }

    fn push_scope(&mut self) {
        self.active_scope = self.session.scopes.create(Some(self.active_scope));
        tracing::trace!(scope = self.active_scope.index(), "push scope");
    }

    fn pop_scope(&mut self) {
        if let Some(parent) = self.session.scopes.parent(self.active_scope) {
            tracing::trace!(scope = self.active_scope.index(), "pop scope");
            self.active_scope = parent;
        }
    }

    /// Generate and push the `break{n}` / `continue{n}` pair of a new loop.
    pub fn push_labels(&mut self) -> (BoundLabel, BoundLabel) {
        self.label_counter += 1;
        let break_label = BoundLabel::new(format!("break{}", self.label_counter));
        let continue_label = BoundLabel::new(format!("continue{}", self.label_counter));
        tracing::trace!(%break_label, %continue_label, "push labels");
        self.break_labels.push(break_label.clone());
        self.continue_labels.push(continue_label.clone());
        (break_label, continue_label)
    }

    pub fn pop_labels(&mut self) {
        self.break_labels.pop();
        self.continue_labels.pop();
    }

    /// Declare into the active scope.
    fn declare(&mut self, symbol: Symbol) -> bool {
        self.session.scopes.try_declare_symbol(self.active_scope, symbol)
    }

    fn is_binding_class(&self, class: &ClassSymbol) -> bool {
        self.class.as_ref().is_some_and(|c| c.id == class.id)
    }

    /// Whether `function` is the `Constructor` of the class being bound.
    fn is_own_constructor(&self, function: &FunctionSymbol) -> bool {
        function.name == ClassSymbol::CONSTRUCTOR && self.class.as_ref().is_some_and(|c| c.owns(function))
    }
}
