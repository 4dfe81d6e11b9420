//! State shared by every binder working on one program.

use crate::bound::BoundBlockStatement;
use crate::lowering::{IdentityLowerer, Lowerer};
use crate::packages::{PackageRegistry, PackageResolver};
use crate::scope::{ScopeArena, ScopeId};
use crate::symbol::{FunctionSymbol, PackageSymbol};
use ember_core::text::TextSpan;
use ember_diagnostics::DiagnosticCollection;
use std::sync::Arc;

/// Owns the scope arena, the root and entry scopes, the open-package list
/// and the diagnostics of a binding run. Binders borrow it mutably one at a
/// time.
pub struct BindSession {
    pub scopes: ScopeArena,
    pub diagnostics: DiagnosticCollection,
    root_scope: ScopeId,
    main_scope: ScopeId,
    used_packages: Vec<Arc<PackageSymbol>>,
    resolver: Box<dyn PackageResolver>,
    lowerer: Box<dyn Lowerer>,
    temporary_counter: usize,
    lambda_counter: usize,
}

impl BindSession {
    pub fn new() -> Self {
        let mut scopes = ScopeArena::new();
        let root_scope = scopes.create_root();
        let main_scope = scopes.create(Some(root_scope));
        Self {
            scopes,
            diagnostics: DiagnosticCollection::new(),
            root_scope,
            main_scope,
            used_packages: Vec::new(),
            resolver: Box::new(PackageRegistry::new()),
            lowerer: Box::new(IdentityLowerer),
            temporary_counter: 0,
            lambda_counter: 0,
        }
    }

    pub fn with_resolver(mut self, resolver: impl PackageResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn with_lowerer(mut self, lowerer: impl Lowerer + 'static) -> Self {
        self.lowerer = Box::new(lowerer);
        self
    }

    pub fn root_scope(&self) -> ScopeId {
        self.root_scope
    }

    /// The entry unit's scope. Program-level declarations live here.
    pub fn main_scope(&self) -> ScopeId {
        self.main_scope
    }

    /// Packages opened with `use`, in the order they were opened.
    pub fn used_packages(&self) -> &[Arc<PackageSymbol>] {
        &self.used_packages
    }

    pub fn use_package(&mut self, package: Arc<PackageSymbol>) {
        if !self.used_packages.iter().any(|p| p.id == package.id) {
            self.used_packages.push(package);
        }
    }

    pub fn resolve_package(&mut self, name: &str, span: TextSpan) -> Option<Arc<PackageSymbol>> {
        self.resolver.resolve(name, span, &mut self.diagnostics)
    }

    pub fn lower(&mut self, function: &FunctionSymbol, body: BoundBlockStatement) -> BoundBlockStatement {
        self.lowerer.lower(function, body)
    }

    /// Name for a compiler-generated temporary. Never a valid identifier.
    pub fn next_temporary_name(&mut self) -> String {
        let name = format!("$tmp{}", self.temporary_counter);
        self.temporary_counter += 1;
        name
    }

    pub fn next_lambda_name(&mut self) -> String {
        let name = format!("$lambda{}", self.lambda_counter);
        self.lambda_counter += 1;
        name
    }

    /// Take diagnostics from the session.
    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        std::mem::take(&mut self.diagnostics)
    }
}

impl Default for BindSession {
    fn default() -> Self {
        Self::new()
    }
}
