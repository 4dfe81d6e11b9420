//! Member declarations: functions, classes, structs, enums and packages.

use super::Binder;
use crate::bound::BoundStatement;
use crate::symbol::{
    ClassSymbol, EnumSymbol, FunctionKind, FunctionSymbol, PackageSymbol, StructSymbol, Symbol, SymbolId,
    VariableSymbol,
};
use crate::types::TypeSymbol;
use ember_diagnostics::messages;
use ember_syntax::{
    BlockStatement, ClassDeclaration, DeclarationKeyword, EnumDeclaration, ExternalFunctionDeclaration,
    FunctionDeclaration, LiteralValue, Member, PackageAlias, PackageReference, PackageUse, Parameter, Statement,
    StructDeclaration,
};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use std::borrow::Cow;
use std::sync::Arc;

/// A declared class plus the pieces still to be bound: its field
/// initializers (already bound) and its method bodies (not yet bound).
#[derive(Debug)]
pub struct ClassBinding<'a> {
    pub symbol: Arc<ClassSymbol>,
    pub field_initializers: Vec<BoundStatement>,
    /// Method symbols paired with their syntax bodies. The synthesized
    /// constructor owns its empty body.
    pub methods: Vec<(Arc<FunctionSymbol>, Cow<'a, BlockStatement>)>,
}

impl Binder<'_> {
    /// Bind a parameter list. Every duplicate name is reported and replaced
    /// by an error-typed placeholder, so positions match the syntax.
    pub(crate) fn bind_parameters(&mut self, owner: &str, parameters: &[Parameter]) -> Vec<Arc<VariableSymbol>> {
        let mut seen = FxHashSet::default();
        let mut bound = Vec::with_capacity(parameters.len());
        for (ordinal, parameter) in parameters.iter().enumerate() {
            let ty = self.lookup_type(&parameter.type_clause);
            let name = parameter.name.text.as_str();
            if !seen.insert(name) {
                self.report(parameter.span, &messages::DUPLICATE_PARAMETER, &[name, owner]);
                bound.push(Arc::new(VariableSymbol::parameter(format!("$P{ordinal}"), ordinal, TypeSymbol::ERROR)));
                continue;
            }
            bound.push(Arc::new(VariableSymbol::parameter(name, ordinal, ty)));
        }
        bound
    }

    /// Declare a function into the active scope. Bodies are bound later.
    #[tracing::instrument(level = "debug", skip_all, fields(name = %decl.name.text))]
    pub fn bind_function_declaration(
        &mut self,
        decl: &FunctionDeclaration,
        in_class: bool,
    ) -> Option<Arc<FunctionSymbol>> {
        let name = decl.name.text.as_str();
        let parameters = self.bind_parameters(name, &decl.parameters);
        let return_type = self.bind_type_clause(decl.return_type.as_ref()).unwrap_or(TypeSymbol::VOID);

        if in_class && name == ClassSymbol::CONSTRUCTOR && decl.is_public {
            self.report(decl.name.span, &messages::ILLEGAL_CONSTRUCTOR_SIGNATURE, &[]);
            return None;
        }
        if !in_class && name == "main" {
            self.report(decl.name.span, &messages::ILLEGAL_MAIN_SIGNATURE, &[]);
            return None;
        }

        let mut symbol = FunctionSymbol::new(name, parameters, return_type, FunctionKind::User, decl.span);
        symbol.is_public = decl.is_public;
        let symbol = Arc::new(symbol);
        if !self.declare(Symbol::Function(Arc::clone(&symbol))) {
            self.report(decl.name.span, &messages::DUPLICATE_FUNCTION, &[name]);
            return None;
        }
        Some(symbol)
    }

    #[tracing::instrument(level = "debug", skip_all, fields(name = %decl.name.text))]
    pub fn bind_external_function_declaration(
        &mut self,
        decl: &ExternalFunctionDeclaration,
        in_class: bool,
    ) -> Option<Arc<FunctionSymbol>> {
        if in_class {
            self.report(decl.span, &messages::INVALID_EXTERNAL_FUNCTION_PLACEMENT, &[]);
            return None;
        }

        let name = decl.name.text.as_str();
        let parameters = self.bind_parameters(name, &decl.parameters);
        let return_type = self.bind_type_clause(decl.return_type.as_ref()).unwrap_or(TypeSymbol::VOID);

        let mut symbol = FunctionSymbol::new(name, parameters, return_type, FunctionKind::External, decl.span);
        symbol.is_public = true;
        symbol.is_variadic = decl.is_variadic;
        symbol.is_adapted = decl.is_adapted;
        let symbol = Arc::new(symbol);
        if !self.declare(Symbol::Function(Arc::clone(&symbol))) {
            self.report(decl.name.span, &messages::DUPLICATE_FUNCTION, &[name]);
            return None;
        }
        Some(symbol)
    }

    // ========================================================================
    // Classes and structs
    // ========================================================================

    /// Bind a class in isolation and declare it into the active scope.
    ///
    /// The class body gets its own scope chained to a fresh root, so it sees
    /// nothing of the enclosing unit except program-level types. `typeset`
    /// holds every class and struct type of the program, so members may refer
    /// to types (including this class) that are not declared yet.
    #[tracing::instrument(level = "debug", skip_all, fields(name = %decl.name.text))]
    pub fn bind_class_declaration<'a>(
        &mut self,
        decl: &'a ClassDeclaration,
        typeset: &[TypeSymbol],
    ) -> Option<ClassBinding<'a>> {
        let name = decl.name.text.as_str();
        let root = self.session.scopes.create_root();
        let class_scope = self.session.scopes.create(Some(root));

        let mut functions = Vec::new();
        let mut statements = Vec::new();
        let mut methods = Vec::new();
        let mut field_initializers = Vec::new();

        {
            let mut binder =
                Binder::in_scope(&mut *self.session, class_scope, None).with_pre_initial_typeset(typeset.to_vec());

            for member in &decl.members {
                match member {
                    Member::FunctionDeclaration(function) => functions.push(function),
                    Member::GlobalStatement(global) => statements.push(&global.statement),
                    Member::ExternalFunctionDeclaration(external) => {
                        binder.bind_external_function_declaration(external, true);
                    }
                    Member::ClassDeclaration(nested) => {
                        binder.report(nested.span, &messages::ILLEGAL_NESTED_CLASSES, &[]);
                    }
                    other => binder.report(other.span(), &messages::ONLY_VARIABLES_IN_CLASS, &[]),
                }
            }

            for function in functions {
                if let Some(symbol) = binder.bind_function_declaration(function, true) {
                    methods.push((symbol, Cow::Borrowed(&function.body)));
                }
            }

            let has_constructor = matches!(
                binder.session.scopes.lookup_local(class_scope, ClassSymbol::CONSTRUCTOR),
                Some(Symbol::Function(_))
            );
            if !has_constructor {
                let constructor = Arc::new(FunctionSymbol::new(
                    ClassSymbol::CONSTRUCTOR,
                    Vec::new(),
                    TypeSymbol::VOID,
                    FunctionKind::User,
                    decl.span,
                ));
                binder.declare(Symbol::Function(Arc::clone(&constructor)));
                methods.push((constructor, Cow::Owned(BlockStatement::default())));
            }

            for statement in statements {
                match statement {
                    Statement::VariableDeclaration(variable) if variable.keyword == DeclarationKeyword::Set => {
                        field_initializers.push(binder.bind_variable_declaration(variable));
                    }
                    Statement::VariableDeclaration(variable) => {
                        binder.report(variable.span, &messages::ONLY_GLOBALS_IN_CLASS, &[]);
                    }
                    other => binder.report(other.span(), &messages::ONLY_VARIABLES_IN_CLASS, &[]),
                }
            }
        }

        let symbol = Arc::new(ClassSymbol {
            id: SymbolId::fresh(),
            name: name.to_string(),
            ty: TypeSymbol::class(name, None),
            functions: self.session.scopes.all_functions(class_scope),
            fields: self.session.scopes.all_variables(class_scope),
            span: decl.span,
        });
        if !self.declare(Symbol::Class(Arc::clone(&symbol))) {
            self.report(decl.name.span, &messages::DUPLICATE_FUNCTION, &[name]);
            return None;
        }

        Some(ClassBinding {
            symbol,
            field_initializers,
            methods,
        })
    }

    #[tracing::instrument(level = "debug", skip_all, fields(name = %decl.name.text))]
    pub fn bind_struct_declaration(
        &mut self,
        decl: &StructDeclaration,
        typeset: &[TypeSymbol],
    ) -> Option<Arc<StructSymbol>> {
        let name = decl.name.text.as_str();
        let root = self.session.scopes.create_root();
        let struct_scope = self.session.scopes.create(Some(root));

        let mut fields: Vec<Arc<VariableSymbol>> = Vec::with_capacity(decl.fields.len());
        {
            let mut binder =
                Binder::in_scope(&mut *self.session, struct_scope, None).with_pre_initial_typeset(typeset.to_vec());
            for field in &decl.fields {
                let field_name = field.name.text.as_str();
                if fields.iter().any(|f| f.name == field_name) {
                    binder.report(field.span, &messages::DUPLICATE_FIELD, &[field_name, name]);
                    continue;
                }
                let ty = binder.lookup_type(&field.type_clause);
                let variable = Arc::new(VariableSymbol::global(field_name, ty));
                binder.declare(Symbol::Variable(Arc::clone(&variable)));
                fields.push(variable);
            }
        }

        let symbol = Arc::new(StructSymbol {
            id: SymbolId::fresh(),
            name: name.to_string(),
            ty: TypeSymbol::structure(name),
            fields,
            span: decl.span,
        });
        if !self.declare(Symbol::Struct(Arc::clone(&symbol))) {
            self.report(decl.name.span, &messages::DUPLICATE_FUNCTION, &[name]);
            return None;
        }
        Some(symbol)
    }

    /// Fields count up from 0. An explicit value restarts the count at
    /// value + 1. Fields reusing a name or value are rejected one by one.
    #[tracing::instrument(level = "debug", skip_all, fields(name = %decl.name.text))]
    pub fn bind_enum_declaration(&mut self, decl: &EnumDeclaration) -> Option<Arc<EnumSymbol>> {
        let name = decl.name.text.as_str();
        let mut values: IndexMap<String, i32> = IndexMap::with_capacity(decl.fields.len());
        let mut next = 0i32;

        for field in &decl.fields {
            let field_name = field.name.text.as_str();
            let value = match &field.value {
                None => next,
                Some(literal) => match literal.value {
                    LiteralValue::Int(value) => value,
                    _ => {
                        self.report(literal.span, &messages::NON_INTEGER_ENUM_VALUE, &[]);
                        continue;
                    }
                },
            };
            next = value.wrapping_add(1);

            if values.contains_key(field_name) {
                self.report(field.span, &messages::DUPLICATE_FIELD, &[field_name, name]);
                continue;
            }
            if values.values().any(|&existing| existing == value) {
                self.report(field.span, &messages::DUPLICATE_ENUM_VALUE, &[field_name, &value.to_string()]);
                continue;
            }
            values.insert(field_name.to_string(), value);
        }

        let symbol = Arc::new(EnumSymbol {
            id: SymbolId::fresh(),
            name: name.to_string(),
            ty: TypeSymbol::enumeration(name),
            values,
            span: decl.span,
        });
        if !self.declare(Symbol::Enum(Arc::clone(&symbol))) {
            self.report(decl.name.span, &messages::DUPLICATE_FUNCTION, &[name]);
            return None;
        }
        Some(symbol)
    }

    // ========================================================================
    // Packages
    // ========================================================================

    /// Load a package through the session's resolver and declare it.
    pub fn bind_package_reference(&mut self, reference: &PackageReference) -> Option<Arc<PackageSymbol>> {
        let name = &reference.package;
        if self.session.scopes.lookup_local(self.active_scope, &name.text).is_some() {
            self.report(reference.span, &messages::DUPLICATE_PACKAGE_IMPORT, &[&name.text]);
            return None;
        }
        let package = self.session.resolve_package(&name.text, name.span)?;
        tracing::debug!(package = %package.name, "package referenced");
        self.declare(Symbol::Package(Arc::clone(&package)));
        Some(package)
    }

    /// Declare `alias` as another name for an already referenced package.
    pub fn bind_package_alias(&mut self, alias: &PackageAlias) -> Option<Arc<PackageSymbol>> {
        let original = self.lookup_package(&alias.package)?;
        if original.is_alias {
            self.report(alias.span, &messages::ALIAS_OF_ALIAS, &[&original.name]);
            return None;
        }

        let symbol = Arc::new(PackageSymbol {
            id: SymbolId::fresh(),
            name: alias.alias.text.clone(),
            classes: original.classes.clone(),
            functions: original.functions.clone(),
            is_alias: true,
            original: Some(original),
        });
        if !self.declare(Symbol::Package(Arc::clone(&symbol))) {
            self.report(alias.span, &messages::DUPLICATE_PACKAGE_IMPORT, &[&alias.alias.text]);
            return None;
        }
        Some(symbol)
    }

    /// Open a referenced package for unqualified lookups.
    pub fn bind_package_use(&mut self, directive: &PackageUse) -> Option<Arc<PackageSymbol>> {
        let package = self.lookup_package(&directive.package)?;
        if self.session.used_packages().iter().any(|p| p.id == package.id) {
            self.report(directive.span, &messages::DUPLICATE_PACKAGE_IMPORT, &[&package.name]);
            return None;
        }
        self.session.use_package(Arc::clone(&package));
        Some(package)
    }
}
