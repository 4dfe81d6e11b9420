//! Scope management for the binder.
//!
//! Scopes live in an arena and refer to their parent by [`ScopeId`]. A scope
//! is append-only: symbols are never removed, and a name can be declared at
//! most once per scope. Lookups walk outward, so inner declarations shadow
//! outer ones.

use crate::builtins;
use crate::symbol::{FunctionSymbol, PackageSymbol, Symbol, VariableSymbol};
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use std::sync::Arc;

/// Index of a scope in a [`ScopeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

impl ScopeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single frame of declarations.
#[derive(Debug, Default)]
pub struct Scope {
    symbols: IndexMap<String, Symbol, FxBuildHasher>,
    parent: Option<ScopeId>,
}

impl Scope {
    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }
}

#[derive(Debug, Default)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
}

impl ScopeArena {
    /// Maximum scope chain traversal depth to guard against cycles.
    const MAX_SCOPE_DEPTH: u32 = 10_000;

    pub fn new() -> Self {
        Self { scopes: Vec::new() }
    }

    /// Create an empty scope.
    pub fn create(&mut self, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            symbols: IndexMap::default(),
            parent,
        });
        id
    }

    /// Create a parentless scope seeded with the builtin functions.
    pub fn create_root(&mut self) -> ScopeId {
        let root = self.create(None);
        for function in builtins::functions() {
            self.try_declare_symbol(root, Symbol::Function(function));
        }
        root
    }

    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    pub fn parent(&self, id: ScopeId) -> Option<ScopeId> {
        self.get(id).parent
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Declare `symbol` in `scope` itself. Returns false, leaving the existing
    /// declaration in place, when the name is already taken there.
    pub fn try_declare_symbol(&mut self, scope: ScopeId, symbol: Symbol) -> bool {
        let symbols = &mut self.scopes[scope.index()].symbols;
        if symbols.contains_key(symbol.name()) {
            return false;
        }
        symbols.insert(symbol.name().to_string(), symbol);
        true
    }

    /// Resolve `name` starting at `scope` and walking outward.
    pub fn try_lookup_symbol(&self, scope: ScopeId, name: &str) -> Option<Symbol> {
        let mut current = Some(scope);
        let mut depth = 0;
        while let Some(id) = current {
            if depth > Self::MAX_SCOPE_DEPTH {
                break;
            }
            let frame = self.get(id);
            if let Some(symbol) = frame.symbols.get(name) {
                return Some(symbol.clone());
            }
            current = frame.parent;
            depth += 1;
        }
        None
    }

    /// Resolve `name` in `scope` only.
    pub fn lookup_local(&self, scope: ScopeId, name: &str) -> Option<Symbol> {
        self.get(scope).symbols.get(name).cloned()
    }

    /// Variables declared directly in `scope`, in declaration order.
    pub fn all_variables(&self, scope: ScopeId) -> Vec<Arc<VariableSymbol>> {
        self.get(scope)
            .iter()
            .filter_map(|s| match s {
                Symbol::Variable(v) => Some(Arc::clone(v)),
                _ => None,
            })
            .collect()
    }

    /// Functions declared directly in `scope`, in declaration order.
    pub fn all_functions(&self, scope: ScopeId) -> Vec<Arc<FunctionSymbol>> {
        self.get(scope)
            .iter()
            .filter_map(|s| match s {
                Symbol::Function(f) => Some(Arc::clone(f)),
                _ => None,
            })
            .collect()
    }

    /// Packages declared directly in `scope`, in declaration order.
    pub fn all_packages(&self, scope: ScopeId) -> Vec<Arc<PackageSymbol>> {
        self.get(scope)
            .iter()
            .filter_map(|s| match s {
                Symbol::Package(p) => Some(Arc::clone(p)),
                _ => None,
            })
            .collect()
    }
}
