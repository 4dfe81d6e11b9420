//! Whole-program binding.

use crate::binder::{Binder, ClassBinding};
use crate::bound::{BoundBlockStatement, BoundClass, BoundFunction, BoundProgram};
use crate::session::BindSession;
use crate::symbol::{FunctionKind, FunctionSymbol, Symbol};
use crate::types::TypeSymbol;
use ember_syntax::{BlockStatement, CompilationUnit, Member};
use std::sync::Arc;

/// Bind a compilation unit.
///
/// Declarations are bound in dependency order: packages, then user types,
/// then function signatures, so every body sees every program-level name
/// regardless of where it was declared. Global statements form the body of
/// a synthesized public `main`. Errors are collected in the session; the
/// returned program is always complete, with error nodes where binding
/// failed.
#[tracing::instrument(level = "debug", skip_all)]
pub fn bind_program(session: &mut BindSession, unit: &CompilationUnit) -> BoundProgram {
    let main_scope = session.main_scope();
    let span = unit
        .members
        .iter()
        .map(Member::span)
        .reduce(|a, b| a.union(&b))
        .unwrap_or_default();

    let mut structs = Vec::new();
    let mut enums = Vec::new();
    let mut class_bindings: Vec<ClassBinding<'_>> = Vec::new();
    let mut declared: Vec<(Arc<FunctionSymbol>, &BlockStatement)> = Vec::new();
    let mut external_functions = Vec::new();

    let mut main = FunctionSymbol::new("main", Vec::new(), TypeSymbol::VOID, FunctionKind::User, span);
    main.is_public = true;
    let main = Arc::new(main);

    let main_body = {
        let mut binder = Binder::in_scope(session, main_scope, None);

        for member in &unit.members {
            match member {
                Member::PackageReference(reference) => {
                    binder.bind_package_reference(reference);
                }
                Member::PackageAlias(alias) => {
                    binder.bind_package_alias(alias);
                }
                Member::PackageUse(directive) => {
                    binder.bind_package_use(directive);
                }
                _ => {}
            }
        }

        let typeset: Vec<TypeSymbol> = unit
            .members
            .iter()
            .filter_map(|member| match member {
                Member::ClassDeclaration(class) => Some(TypeSymbol::class(&class.name.text, None)),
                Member::StructDeclaration(structure) => Some(TypeSymbol::structure(&structure.name.text)),
                _ => None,
            })
            .collect();

        for member in &unit.members {
            if let Member::EnumDeclaration(decl) = member {
                enums.extend(binder.bind_enum_declaration(decl));
            }
        }
        for member in &unit.members {
            if let Member::StructDeclaration(decl) = member {
                structs.extend(binder.bind_struct_declaration(decl, &typeset));
            }
        }
        for member in &unit.members {
            if let Member::ClassDeclaration(decl) = member {
                class_bindings.extend(binder.bind_class_declaration(decl, &typeset));
            }
        }

        for member in &unit.members {
            match member {
                Member::FunctionDeclaration(decl) => {
                    if let Some(symbol) = binder.bind_function_declaration(decl, false) {
                        declared.push((symbol, &decl.body));
                    }
                }
                Member::ExternalFunctionDeclaration(decl) => {
                    external_functions.extend(binder.bind_external_function_declaration(decl, false));
                }
                _ => {}
            }
        }

        let statements = unit
            .members
            .iter()
            .filter_map(|member| match member {
                Member::GlobalStatement(global) => Some(binder.bind_statement(&global.statement)),
                _ => None,
            })
            .collect();
        BoundBlockStatement {
            statements,
            span,
        }
    };

    let functions = declared
        .into_iter()
        .map(|(symbol, body)| {
            let body = Binder::new(session, main_scope, Some(Arc::clone(&symbol))).bind_block_statement(body);
            BoundFunction { symbol, body }
        })
        .collect();

    let classes = class_bindings
        .into_iter()
        .map(|binding| bind_class_bodies(session, binding))
        .collect();

    let packages = session.scopes.all_packages(main_scope);
    let program = BoundProgram {
        main: BoundFunction {
            symbol: main,
            body: main_body,
        },
        functions,
        external_functions,
        classes,
        structs,
        enums,
        packages,
    };
    tracing::debug!(
        functions = program.functions.len(),
        classes = program.classes.len(),
        errors = session.diagnostics.error_count(),
        "bound program"
    );
    program
}

/// Bind every method of a class. Methods see the class's fields and
/// functions through a scope between the entry scope and their own.
fn bind_class_bodies(session: &mut BindSession, binding: ClassBinding<'_>) -> BoundClass {
    let ClassBinding {
        symbol: class,
        field_initializers,
        methods,
    } = binding;

    let main_scope = session.main_scope();
    let method_scope = session.scopes.create(Some(main_scope));
    for field in &class.fields {
        session.scopes.try_declare_symbol(method_scope, Symbol::Variable(Arc::clone(field)));
    }
    for function in &class.functions {
        session.scopes.try_declare_symbol(method_scope, Symbol::Function(Arc::clone(function)));
    }

    let methods = methods
        .into_iter()
        .map(|(symbol, body)| {
            let _span = tracing::debug_span!("method", class = %class.name, name = %symbol.name).entered();
            let body = Binder::new(session, method_scope, Some(Arc::clone(&symbol)))
                .with_class(Arc::clone(&class))
                .bind_block_statement(&body);
            BoundFunction { symbol, body }
        })
        .collect();

    BoundClass {
        symbol: class,
        field_initializers,
        methods,
    }
}
