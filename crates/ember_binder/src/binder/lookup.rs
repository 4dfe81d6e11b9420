//! Name and type resolution.

use super::Binder;
use crate::symbol::{ClassSymbol, EnumSymbol, FunctionSymbol, PackageSymbol, StructSymbol, Symbol, VariableSymbol};
use crate::types::TypeSymbol;
use ember_diagnostics::messages;
use ember_syntax::{Identifier, TypeClause};
use std::sync::Arc;

impl Binder<'_> {
    /// Resolve `name` through the active scope chain, falling back to the
    /// program's entry scope. Class and struct bodies are bound off a fresh
    /// root, so program-level types are only reachable through the fallback.
    pub fn resolve(&self, name: &str) -> Option<Symbol> {
        self.session
            .scopes
            .try_lookup_symbol(self.active_scope, name)
            .or_else(|| self.session.scopes.try_lookup_symbol(self.session.main_scope(), name))
    }

    /// Resolve `name` in the entry scope only (`main::name`).
    pub(super) fn resolve_in_main(&self, name: &str) -> Option<Symbol> {
        self.session.scopes.try_lookup_symbol(self.session.main_scope(), name)
    }

    pub(super) fn lookup_class(&self, name: &str) -> Option<Arc<ClassSymbol>> {
        match self.resolve(name) {
            Some(Symbol::Class(class)) => Some(class),
            _ => None,
        }
    }

    pub(super) fn lookup_struct(&self, name: &str) -> Option<Arc<StructSymbol>> {
        match self.resolve(name) {
            Some(Symbol::Struct(structure)) => Some(structure),
            _ => None,
        }
    }

    pub(super) fn lookup_enum(&self, name: &str) -> Option<Arc<EnumSymbol>> {
        match self.resolve(name) {
            Some(Symbol::Enum(enumeration)) => Some(enumeration),
            _ => None,
        }
    }

    /// Resolve a package by name, reporting `UnknownPackage` if absent.
    pub(super) fn lookup_package(&mut self, name: &Identifier) -> Option<Arc<PackageSymbol>> {
        match self.resolve(&name.text) {
            Some(Symbol::Package(package)) => Some(package),
            _ => {
                self.report(name.span, &messages::UNKNOWN_PACKAGE, &[&name.text]);
                None
            }
        }
    }

    pub(super) fn find_class_in_used_packages(&self, name: &str) -> Option<Arc<ClassSymbol>> {
        self.session.used_packages().iter().find_map(|p| p.class(name).cloned())
    }

    /// The first used package exporting a function called `name`.
    pub(super) fn find_function_in_used_packages(
        &self,
        name: &str,
    ) -> Option<(Arc<PackageSymbol>, Arc<FunctionSymbol>)> {
        self.session
            .used_packages()
            .iter()
            .find_map(|p| p.function(name).map(|f| (Arc::clone(p), Arc::clone(f))))
    }

    /// The class whose type is `ty`: the class being bound, a class in scope,
    /// or a class exported by a used or referenced package.
    pub(super) fn class_for_type(&self, ty: &TypeSymbol) -> Option<Arc<ClassSymbol>> {
        if let Some(class) = self.class.as_ref().filter(|c| c.ty == *ty) {
            return Some(Arc::clone(class));
        }
        if ty.package.is_none() {
            return self.lookup_class(&ty.name).filter(|c| c.ty == *ty);
        }
        let referenced = self.session.scopes.all_packages(self.session.main_scope());
        self.session
            .used_packages()
            .iter()
            .chain(referenced.iter())
            .find_map(|p| p.class(&ty.name).filter(|c| c.ty == *ty).cloned())
    }

    /// Field `name` of the class or struct `ty`.
    pub(super) fn lookup_member_field(&self, ty: &TypeSymbol, name: &str) -> Option<Arc<VariableSymbol>> {
        if let Some(class) = self.class_for_type(ty) {
            return class.field(name).cloned();
        }
        self.lookup_struct(&ty.name)
            .filter(|s| s.ty == *ty)
            .and_then(|s| s.field(name).cloned())
    }

    // ========================================================================
    // Type clauses
    // ========================================================================

    /// Bind an optional type clause. An absent clause stays absent.
    pub fn bind_type_clause(&mut self, clause: Option<&TypeClause>) -> Option<TypeSymbol> {
        clause.map(|clause| self.lookup_type(clause))
    }

    /// Resolve a type clause, reporting failures and yielding the error type.
    pub fn lookup_type(&mut self, clause: &TypeClause) -> TypeSymbol {
        self.resolve_type(clause, true).unwrap_or(TypeSymbol::ERROR)
    }

    /// Resolve a type clause without reporting anything.
    pub fn try_lookup_type(&mut self, clause: &TypeClause) -> Option<TypeSymbol> {
        self.resolve_type(clause, false)
    }

    fn resolve_type(&mut self, clause: &TypeClause, report: bool) -> Option<TypeSymbol> {
        let name = clause.name.text.as_str();

        if let Some(package_name) = &clause.package {
            let package = if report {
                self.lookup_package(package_name)?
            } else {
                match self.resolve(&package_name.text) {
                    Some(Symbol::Package(package)) => package,
                    _ => return None,
                }
            };
            let class = package.class(name).map(|c| c.ty.clone());
            if class.is_none() && report {
                self.report(clause.span, &messages::UNKNOWN_CLASS_IN_PACKAGE, &[&package.name, name]);
            }
            return class;
        }

        if let Some(primitive) = TypeSymbol::primitive(name) {
            return Some(primitive);
        }

        match name {
            TypeSymbol::ARRAY_NAME | TypeSymbol::POINTER_NAME => {
                let [element] = clause.sub_clauses.as_slice() else {
                    if report {
                        let got = clause.sub_clauses.len().to_string();
                        self.report(clause.span, &messages::INVALID_NUMBER_OF_SUBTYPES, &[name, "1", &got]);
                    }
                    return None;
                };
                let element = self.resolve_type(element, report)?;
                return Some(if name == TypeSymbol::ARRAY_NAME {
                    TypeSymbol::array_of(element)
                } else {
                    TypeSymbol::pointer_to(element)
                });
            }
            TypeSymbol::ACTION_NAME => {
                let Some((return_clause, parameter_clauses)) = clause.sub_clauses.split_last() else {
                    if report {
                        self.report(clause.span, &messages::INVALID_NUMBER_OF_SUBTYPES, &[name, "at least 1", "0"]);
                    }
                    return None;
                };
                let mut parameters = Vec::with_capacity(parameter_clauses.len());
                for parameter in parameter_clauses {
                    parameters.push(self.resolve_type(parameter, report)?);
                }
                let return_type = self.resolve_type(return_clause, report)?;
                return Some(TypeSymbol::action(parameters, return_type));
            }
            _ => {}
        }

        match self.resolve(name) {
            Some(Symbol::Class(class)) => return Some(class.ty.clone()),
            Some(Symbol::Struct(structure)) => return Some(structure.ty.clone()),
            Some(Symbol::Enum(enumeration)) => return Some(enumeration.ty.clone()),
            _ => {}
        }

        if let Some(ty) = self
            .pre_initial_typeset
            .as_ref()
            .and_then(|typeset| typeset.iter().find(|t| t.name == name))
        {
            return Some(ty.clone());
        }

        if let Some(class) = self.find_class_in_used_packages(name) {
            return Some(class.ty.clone());
        }

        if report {
            self.report(clause.span, &messages::UNKNOWN_DATA_TYPE, &[name]);
        }
        None
    }
}
