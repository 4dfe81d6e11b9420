//! Scope arena tests.

use ember_binder::symbol::{FunctionKind, FunctionSymbol, VariableSymbol};
use ember_binder::{ScopeArena, Symbol, SymbolKind, TypeSymbol};
use ember_core::text::TextSpan;
use std::sync::Arc;

/// Helper: a local variable symbol.
fn local(name: &str, ty: TypeSymbol) -> Symbol {
    Symbol::Variable(Arc::new(VariableSymbol::local(name, ty)))
}

fn function(name: &str) -> Symbol {
    Symbol::Function(Arc::new(FunctionSymbol::new(
        name,
        Vec::new(),
        TypeSymbol::VOID,
        FunctionKind::User,
        TextSpan::default(),
    )))
}

// ============================================================================
// Declaration
// ============================================================================

#[test]
fn test_declare_rejects_duplicate_names() {
    let mut scopes = ScopeArena::new();
    let scope = scopes.create(None);
    assert!(scopes.try_declare_symbol(scope, local("x", TypeSymbol::INT)));
    assert!(!scopes.try_declare_symbol(scope, local("x", TypeSymbol::STRING)));
    assert!(!scopes.try_declare_symbol(scope, function("x")));

    let Some(Symbol::Variable(x)) = scopes.lookup_local(scope, "x") else {
        panic!("Expected variable x");
    };
    assert_eq!(x.ty, TypeSymbol::INT, "Expected first declaration to survive, got {}", x.ty);
}

#[test]
fn test_root_scope_holds_builtins() {
    let mut scopes = ScopeArena::new();
    let root = scopes.create_root();
    let print = scopes.lookup_local(root, "Print").expect("Print builtin");
    assert_eq!(print.kind(), SymbolKind::Function);
    assert!(scopes.all_functions(root).len() >= 10);
}

// ============================================================================
// Lookup
// ============================================================================

#[test]
fn test_lookup_walks_outward_and_shadows() {
    let mut scopes = ScopeArena::new();
    let outer = scopes.create(None);
    let inner = scopes.create(Some(outer));
    scopes.try_declare_symbol(outer, local("x", TypeSymbol::INT));
    scopes.try_declare_symbol(outer, local("y", TypeSymbol::BOOL));
    scopes.try_declare_symbol(inner, local("x", TypeSymbol::STRING));

    let Some(Symbol::Variable(x)) = scopes.try_lookup_symbol(inner, "x") else {
        panic!("Expected variable x");
    };
    assert_eq!(x.ty, TypeSymbol::STRING);
    assert!(scopes.try_lookup_symbol(inner, "y").is_some());
    assert!(scopes.lookup_local(inner, "y").is_none());
    assert!(scopes.try_lookup_symbol(outer, "z").is_none());
}

#[test]
fn test_sibling_scopes_are_isolated() {
    let mut scopes = ScopeArena::new();
    let parent = scopes.create(None);
    let a = scopes.create(Some(parent));
    let b = scopes.create(Some(parent));
    scopes.try_declare_symbol(a, local("only_a", TypeSymbol::INT));
    assert!(scopes.try_lookup_symbol(b, "only_a").is_none());
    assert_eq!(scopes.parent(b), Some(parent));
}

// ============================================================================
// Enumeration
// ============================================================================

#[test]
fn test_all_variables_and_functions_keep_declaration_order() {
    let mut scopes = ScopeArena::new();
    let scope = scopes.create(None);
    scopes.try_declare_symbol(scope, local("b", TypeSymbol::INT));
    scopes.try_declare_symbol(scope, function("f"));
    scopes.try_declare_symbol(scope, local("a", TypeSymbol::INT));
    scopes.try_declare_symbol(scope, function("e"));

    let variables: Vec<_> = scopes.all_variables(scope).iter().map(|v| v.name.clone()).collect();
    let functions: Vec<_> = scopes.all_functions(scope).iter().map(|f| f.name.clone()).collect();
    assert_eq!(variables, ["b", "a"]);
    assert_eq!(functions, ["f", "e"]);
    assert!(scopes.all_packages(scope).is_empty());
}
