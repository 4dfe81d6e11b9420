//! Expression binding.

use super::Binder;
use crate::bound::{BoundArrayContents, BoundExpression, BoundExpressionKind as Kind};
use crate::builtins::{lookup_type_function, TypeFunctionLookup};
use crate::conversion::classify_conversion;
use crate::operators::{BoundBinaryOperator, BoundUnaryOperator};
use crate::symbol::{ClassSymbol, FunctionKind, FunctionSymbol, PackageSymbol, Symbol, VariableSymbol};
use crate::types::TypeSymbol;
use ember_core::text::TextSpan;
use ember_diagnostics::{messages, DiagnosticMessage};
use ember_syntax::{
    ArrayAccessExpression, ArrayAssignmentExpression, AssignmentExpression, BinaryExpression, BinaryOperatorKind,
    CallExpression, DereferenceExpression, Expression, FieldAccessExpression, FieldAssignmentExpression, Identifier,
    LambdaExpression, LiteralValue, MakeArrayContents, MakeArrayExpression, MakeExpression, MakeStructExpression,
    NameExpression, PackageCallExpression, ReferenceExpression, TernaryExpression, TypeCallExpression,
    UnaryExpression, VariableEditorExpression,
};
use std::sync::Arc;

fn literal_type(value: &LiteralValue) -> TypeSymbol {
    match value {
        LiteralValue::Bool(_) => TypeSymbol::BOOL,
        LiteralValue::Byte(_) => TypeSymbol::BYTE,
        LiteralValue::Int(_) => TypeSymbol::INT,
        LiteralValue::Long(_) => TypeSymbol::LONG,
        LiteralValue::UInt(_) => TypeSymbol::UINT,
        LiteralValue::ULong(_) => TypeSymbol::ULONG,
        LiteralValue::Float(_) => TypeSymbol::FLOAT,
        LiteralValue::Double(_) => TypeSymbol::DOUBLE,
        LiteralValue::String(_) => TypeSymbol::STRING,
    }
}

/// Type names for a diagnostic. Types that share a name are told apart by
/// their fingerprints.
fn type_names(a: &TypeSymbol, b: &TypeSymbol) -> (String, String) {
    if a.name == b.name {
        (a.fingerprint(), b.fingerprint())
    } else {
        (a.name.to_string(), b.name.to_string())
    }
}

/// Whether a type function defined on `origin` can be called on `ty`.
fn type_function_applies(origin: &str, ty: &TypeSymbol) -> bool {
    match origin {
        "string" => *ty == TypeSymbol::STRING,
        "array" => ty.is_array(),
        "thread" => *ty == TypeSymbol::THREAD,
        "action" => ty.is_action(),
        _ => false,
    }
}

impl Binder<'_> {
    pub fn bind_expression(&mut self, expression: &Expression) -> BoundExpression {
        match expression {
            Expression::Literal(literal) => {
                BoundExpression::new(Kind::Literal(literal.value.clone()), literal_type(&literal.value), literal.span)
            }
            Expression::Parenthesized(paren) => self.bind_expression(&paren.expression),
            Expression::Name(name) => self.bind_name_expression(name),
            Expression::Assignment(assignment) => self.bind_assignment_expression(assignment),
            Expression::VariableEditor(editor) => self.bind_variable_editor_expression(editor),
            Expression::ArrayAccess(access) => self.bind_array_access_expression(access),
            Expression::ArrayAssignment(assignment) => self.bind_array_assignment_expression(assignment),
            Expression::Make(make) => self.bind_make_expression(make),
            Expression::MakeArray(make) => self.bind_make_array_expression(make),
            Expression::MakeStruct(make) => self.bind_make_struct_expression(make),
            Expression::Call(call) => self.bind_call_expression(call),
            Expression::PackageCall(call) => self.bind_package_call_expression(call),
            Expression::TypeCall(call) => self.bind_type_call_expression(call),
            Expression::Unary(unary) => self.bind_unary_expression(unary),
            Expression::Binary(binary) => self.bind_binary_expression(binary),
            Expression::FieldAccess(access) => self.bind_field_access_expression(access),
            Expression::FieldAssignment(assignment) => self.bind_field_assignment_expression(assignment),
            Expression::Ternary(ternary) => self.bind_ternary_expression(ternary),
            Expression::Reference(reference) => self.bind_reference_expression(reference),
            Expression::Dereference(dereference) => self.bind_dereference_expression(dereference),
            Expression::Lambda(lambda) => self.bind_lambda_expression(lambda),
            Expression::This(this) => match self.class.clone() {
                Some(class) => {
                    let ty = class.ty.clone();
                    BoundExpression::new(Kind::This { class }, ty, this.span)
                }
                None => self.report_error(this.span, &messages::OUTSIDE_THIS, &[]),
            },
        }
    }

    /// Bind `expression` and implicitly convert it to `ty`.
    pub fn bind_expression_to(&mut self, expression: &Expression, ty: &TypeSymbol) -> BoundExpression {
        let bound = self.bind_expression(expression);
        self.bind_conversion(bound, ty, false, expression.span())
    }

    /// Convert `expression` to `to`. Identity conversions return the
    /// expression itself; impossible conversions, and explicit ones when
    /// `allow_explicit` is false, are reported and yield an error expression.
    pub fn bind_conversion(
        &mut self,
        expression: BoundExpression,
        to: &TypeSymbol,
        allow_explicit: bool,
        span: TextSpan,
    ) -> BoundExpression {
        if expression.ty.contains_error() || to.contains_error() {
            return BoundExpression::error(span);
        }

        let conversion = classify_conversion(&expression.ty, to);
        if !conversion.exists {
            let (from, to) = type_names(&expression.ty, to);
            return self.report_error(span, &messages::CONVERSION_ERROR, &[&from, &to]);
        }
        if conversion.is_explicit && !allow_explicit {
            let (from, to) = type_names(&expression.ty, to);
            return self.report_error(span, &messages::EXPLICIT_CONVERSION_ERROR, &[&from, &to]);
        }
        if conversion.is_identity {
            return expression;
        }
        BoundExpression::new(
            Kind::Conversion {
                expression: Box::new(expression),
            },
            to.clone(),
            span,
        )
    }

    /// Bind an expression that must be exactly `int`.
    pub(super) fn bind_integer_expression(&mut self, expression: &Expression) -> BoundExpression {
        let bound = self.bind_expression(expression);
        if bound.ty.contains_error() || bound.ty == TypeSymbol::INT {
            return bound;
        }
        let ty = bound.ty.to_string();
        self.report_error(bound.span, &messages::UNEXPECTED_NON_INTEGER_VALUE, &[&ty])
    }

    fn report_error(&mut self, span: TextSpan, message: &DiagnosticMessage, args: &[&str]) -> BoundExpression {
        self.report(span, message, args);
        BoundExpression::error(span)
    }

    /// Check the argument count of a call and convert every argument to its
    /// parameter type. Variadic functions take any number of extra
    /// arguments, which are bound unconverted. On a count mismatch the
    /// arguments are bound anyway and `None` is returned.
    fn bind_arguments(
        &mut self,
        callee: &str,
        parameters: &[Arc<VariableSymbol>],
        is_variadic: bool,
        arguments: &[Expression],
        span: TextSpan,
    ) -> Option<Vec<BoundExpression>> {
        let arity_matches = if is_variadic {
            arguments.len() >= parameters.len()
        } else {
            arguments.len() == parameters.len()
        };
        if !arity_matches {
            for argument in arguments {
                self.bind_expression(argument);
            }
            let expected = parameters.len().to_string();
            let got = arguments.len().to_string();
            self.report(span, &messages::BAD_NUMBER_OF_PARAMETERS, &[callee, &expected, &got]);
            return None;
        }

        let bound = arguments
            .iter()
            .enumerate()
            .map(|(i, argument)| match parameters.get(i) {
                Some(parameter) => self.bind_expression_to(argument, &parameter.ty),
                None => self.bind_expression(argument),
            })
            .collect();
        Some(bound)
    }

    // ========================================================================
    // Names and variables
    // ========================================================================

    fn bind_name_expression(&mut self, name: &NameExpression) -> BoundExpression {
        let symbol = if name.in_main {
            self.resolve_in_main(&name.name.text)
        } else {
            self.resolve(&name.name.text)
        };
        if let Some(Symbol::Function(function)) = symbol {
            return self.bind_function_reference(function, name);
        }

        match self.lookup_variable(&name.name, name.in_main) {
            Some(variable) => {
                let ty = variable.ty.clone();
                BoundExpression::new(Kind::Variable(variable), ty, name.span)
            }
            None => BoundExpression::error(name.span),
        }
    }

    /// A function used as a value. From the entry unit it must be public;
    /// inside a class, its own methods become class-bound references.
    fn bind_function_reference(&mut self, function: Arc<FunctionSymbol>, name: &NameExpression) -> BoundExpression {
        let ty = function.action_type();
        if name.in_main {
            if !function.is_public {
                return self.report_error(name.span, &messages::FUNCTION_ACCESS_VIOLATION, &[&function.name]);
            }
            return BoundExpression::new(Kind::Function(function), ty, name.span);
        }

        if let Some(class) = self.class.clone().filter(|c| c.owns(&function)) {
            if function.name == ClassSymbol::CONSTRUCTOR {
                return self.report_error(name.span, &messages::ILLEGAL_CONSTRUCTOR_REFERENCE, &[]);
            }
            return BoundExpression::new(Kind::FunctionInClass { function, class }, ty, name.span);
        }

        BoundExpression::new(Kind::Function(function), ty, name.span)
    }

    /// Resolve a variable. Lookups from the entry unit only see globals.
    fn lookup_variable(&mut self, name: &Identifier, in_main: bool) -> Option<Arc<VariableSymbol>> {
        let symbol = if in_main {
            self.resolve_in_main(&name.text)
        } else {
            self.resolve(&name.text)
        };
        match symbol {
            Some(Symbol::Variable(variable)) if in_main && !variable.is_global() => {
                self.report(name.span, &messages::VARIABLE_ACCESS_VIOLATION, &[&name.text]);
                None
            }
            Some(Symbol::Variable(variable)) => Some(variable),
            _ => {
                self.report(name.span, &messages::UNDEFINED_VARIABLE_REFERENCE, &[&name.text]);
                None
            }
        }
    }

    fn bind_assignment_expression(&mut self, assignment: &AssignmentExpression) -> BoundExpression {
        let Some(variable) = self.lookup_variable(&assignment.name, assignment.in_main) else {
            self.bind_expression(&assignment.value);
            return BoundExpression::error(assignment.span);
        };
        let value = self.bind_expression_to(&assignment.value, &variable.ty);
        let ty = variable.ty.clone();
        BoundExpression::new(
            Kind::Assignment {
                variable,
                value: Box::new(value),
            },
            ty,
            assignment.span,
        )
    }

    /// `x++`, `x--`, `x += e`: an assignment of `x <op> e`, where a missing
    /// operand is the integer literal 1.
    fn bind_variable_editor_expression(&mut self, editor: &VariableEditorExpression) -> BoundExpression {
        let span = editor.span;
        let Some(variable) = self.lookup_variable(&editor.name, false) else {
            return BoundExpression::error(span);
        };

        let operand = match &editor.value {
            Some(value) => self.bind_expression(value),
            None => BoundExpression::new(Kind::Literal(LiteralValue::Int(1)), TypeSymbol::INT, span),
        };
        let current = BoundExpression::new(Kind::Variable(Arc::clone(&variable)), variable.ty.clone(), editor.name.span);
        let combined = self.bind_binary_internal(current, editor.operator, operand, span);
        let value = self.bind_conversion(combined, &variable.ty, false, span);

        let ty = variable.ty.clone();
        BoundExpression::new(
            Kind::Assignment {
                variable,
                value: Box::new(value),
            },
            ty,
            span,
        )
    }

    fn bind_reference_expression(&mut self, reference: &ReferenceExpression) -> BoundExpression {
        let name = &reference.expression;
        match self.lookup_variable(&name.name, name.in_main) {
            Some(variable) => {
                let ty = TypeSymbol::pointer_to(variable.ty.clone());
                BoundExpression::new(Kind::Reference { variable }, ty, reference.span)
            }
            None => BoundExpression::error(reference.span),
        }
    }

    fn bind_dereference_expression(&mut self, dereference: &DereferenceExpression) -> BoundExpression {
        let expression = self.bind_expression(&dereference.expression);
        if expression.ty.contains_error() {
            return BoundExpression::error(dereference.span);
        }
        let target = match expression.ty.element_type() {
            Some(target) if expression.ty.is_pointer() => target.clone(),
            _ => {
                let ty = expression.ty.to_string();
                return self.report_error(dereference.span, &messages::UNEXPECTED_NON_POINTER_VALUE, &[&ty]);
            }
        };
        BoundExpression::new(
            Kind::Dereference {
                expression: Box::new(expression),
            },
            target,
            dereference.span,
        )
    }

    // ========================================================================
    // Arrays
    // ========================================================================

    /// Bind the base of an index expression. Returns the element type and
    /// whether the base is a pointer.
    fn bind_indexable(&mut self, base: &Expression) -> Result<(BoundExpression, TypeSymbol, bool), TextSpan> {
        let bound = self.bind_expression(base);
        if bound.ty.contains_error() {
            return Err(bound.span);
        }
        match bound.ty.element_type() {
            Some(element) => {
                let element = element.clone();
                let is_pointer = bound.ty.is_pointer();
                Ok((bound, element, is_pointer))
            }
            None => {
                let ty = bound.ty.to_string();
                self.report(bound.span, &messages::UNEXPECTED_NON_ARRAY_VALUE, &[&ty]);
                Err(bound.span)
            }
        }
    }

    fn bind_array_access_expression(&mut self, access: &ArrayAccessExpression) -> BoundExpression {
        let Ok((base, element, is_pointer)) = self.bind_indexable(&access.base) else {
            return BoundExpression::error(access.span);
        };
        let index = self.bind_expression_to(&access.index, &TypeSymbol::INT);
        BoundExpression::new(
            Kind::ArrayAccess {
                base: Box::new(base),
                index: Box::new(index),
                is_pointer,
            },
            element,
            access.span,
        )
    }

    /// The stored value must have exactly the element type.
    fn bind_array_assignment_expression(&mut self, assignment: &ArrayAssignmentExpression) -> BoundExpression {
        let Ok((base, element, is_pointer)) = self.bind_indexable(&assignment.base) else {
            return BoundExpression::error(assignment.span);
        };
        let index = self.bind_expression_to(&assignment.index, &TypeSymbol::INT);
        let value = self.bind_expression(&assignment.value);
        if value.ty.contains_error() {
            return BoundExpression::error(assignment.span);
        }
        if value.ty != element {
            let (expected, got) = type_names(&element, &value.ty);
            return self.report_error(value.span, &messages::ARRAY_ASSIGNMENT_MISMATCH, &[&expected, &got]);
        }
        BoundExpression::new(
            Kind::ArrayAssignment {
                base: Box::new(base),
                index: Box::new(index),
                value: Box::new(value),
                is_pointer,
            },
            element,
            assignment.span,
        )
    }

    // ========================================================================
    // Construction
    // ========================================================================

    fn bind_make_expression(&mut self, make: &MakeExpression) -> BoundExpression {
        if self.pre_initial_typeset.is_some() {
            return self.report_error(make.span, &messages::OUTSIDE_CONSTRUCTOR_CALL, &[]);
        }

        let name = make.class_name.text.as_str();
        let class = match &make.package {
            Some(package_name) => {
                let Some(package) = self.lookup_package(package_name) else {
                    return BoundExpression::error(make.span);
                };
                match package.class(name) {
                    Some(class) => Arc::clone(class),
                    None => {
                        return self.report_error(
                            make.class_name.span,
                            &messages::UNKNOWN_CLASS_IN_PACKAGE,
                            &[&package.name, name],
                        )
                    }
                }
            }
            None => match self.lookup_class(name).or_else(|| self.find_class_in_used_packages(name)) {
                Some(class) => class,
                None => return self.report_error(make.class_name.span, &messages::UNKNOWN_CLASS, &[name]),
            },
        };

        let constructor = class.constructor().cloned();
        let parameters = constructor.as_ref().map(|c| c.parameters.clone()).unwrap_or_default();
        if make.arguments.len() != parameters.len() {
            let expected = parameters.len().to_string();
            let got = make.arguments.len().to_string();
            return self.report_error(
                make.span,
                &messages::BAD_NUMBER_OF_CONSTRUCTOR_ARGUMENTS,
                &[&class.name, &expected, &got],
            );
        }

        let arguments = make
            .arguments
            .iter()
            .zip(&parameters)
            .map(|(argument, parameter)| self.bind_expression_to(argument, &parameter.ty))
            .collect();
        let ty = class.ty.clone();
        BoundExpression::new(
            Kind::Make {
                class,
                constructor,
                arguments,
            },
            ty,
            make.span,
        )
    }

    fn bind_make_array_expression(&mut self, make: &MakeArrayExpression) -> BoundExpression {
        let element_type = self.lookup_type(&make.element_type);
        if element_type.contains_error() {
            return BoundExpression::error(make.span);
        }
        let contents = match &make.contents {
            MakeArrayContents::Length(length) => {
                BoundArrayContents::Length(Box::new(self.bind_expression_to(length, &TypeSymbol::INT)))
            }
            MakeArrayContents::Literals(literals) => BoundArrayContents::Literals(
                literals.iter().map(|literal| self.bind_expression_to(literal, &element_type)).collect(),
            ),
        };
        let ty = TypeSymbol::array_of(element_type.clone());
        BoundExpression::new(Kind::MakeArray { element_type, contents }, ty, make.span)
    }

    fn bind_make_struct_expression(&mut self, make: &MakeStructExpression) -> BoundExpression {
        let name = make.struct_name.text.as_str();
        let Some(structure) = self.lookup_struct(name) else {
            return self.report_error(make.struct_name.span, &messages::UNKNOWN_STRUCT, &[name]);
        };
        if make.values.len() > structure.fields.len() {
            let fields = structure.fields.len().to_string();
            let values = make.values.len().to_string();
            return self.report_error(make.span, &messages::TOO_MANY_STRUCT_PARAMETERS, &[name, &fields, &values]);
        }

        let values = make
            .values
            .iter()
            .zip(&structure.fields)
            .map(|(value, field)| self.bind_expression_to(value, &field.ty))
            .collect();
        let ty = structure.ty.clone();
        BoundExpression::new(Kind::MakeStruct { structure, values }, ty, make.span)
    }

    // ========================================================================
    // Calls
    // ========================================================================

    /// The type a one-argument call casts to, if its callee names a type:
    /// a primitive, a class, an enum, the call's type clause, or a class of
    /// a used package.
    fn resolve_cast_type(&mut self, call: &CallExpression) -> Option<TypeSymbol> {
        let name = call.name.text.as_str();
        if let Some(primitive) = TypeSymbol::primitive(name).filter(|t| !t.is_void()) {
            return Some(primitive);
        }
        if let Some(class) = self.lookup_class(name) {
            return Some(class.ty.clone());
        }
        if let Some(enumeration) = self.lookup_enum(name) {
            return Some(enumeration.ty.clone());
        }
        if let Some(clause) = &call.casting_type {
            if let Some(ty) = self.try_lookup_type(clause).filter(|t| !t.is_void()) {
                return Some(ty);
            }
        }
        self.find_class_in_used_packages(name).map(|class| class.ty.clone())
    }

    fn bind_cast(&mut self, argument: &Expression, ty: &TypeSymbol, span: TextSpan) -> BoundExpression {
        let bound = self.bind_expression(argument);
        self.bind_conversion(bound, ty, true, span)
    }

    fn bind_call_expression(&mut self, call: &CallExpression) -> BoundExpression {
        if let [argument] = call.arguments.as_slice() {
            if let Some(ty) = self.resolve_cast_type(call) {
                return self.bind_cast(argument, &ty, call.span);
            }
        }

        let name = call.name.text.as_str();
        let symbol = if call.in_main {
            self.resolve_in_main(name)
        } else {
            self.resolve(name)
        };
        let function = match symbol {
            Some(Symbol::Function(function)) => function,
            _ if call.in_main => return self.report_unresolved_call(call),
            _ => match self.find_function_in_used_packages(name) {
                Some((package, function)) => return self.bind_used_package_call(call, package, function),
                None => return self.report_unresolved_call(call),
            },
        };

        if call.in_main && !function.is_public {
            return self.report_error(call.name.span, &messages::FUNCTION_ACCESS_VIOLATION, &[name]);
        }
        if self.is_own_constructor(&function) {
            return self.report_error(call.name.span, &messages::ILLEGAL_CONSTRUCTOR_CALL, &[]);
        }

        let Some(arguments) =
            self.bind_arguments(name, &function.parameters, function.is_variadic, &call.arguments, call.span)
        else {
            return BoundExpression::error(call.span);
        };
        let ty = function.return_type.clone();
        BoundExpression::new(Kind::Call { function, arguments }, ty, call.span)
    }

    /// An unqualified call that only a used package can answer.
    fn bind_used_package_call(
        &mut self,
        call: &CallExpression,
        package: Arc<PackageSymbol>,
        function: Arc<FunctionSymbol>,
    ) -> BoundExpression {
        let name = call.name.text.as_str();
        if !function.is_public {
            return self.report_error(call.name.span, &messages::FUNCTION_ACCESS_VIOLATION, &[name]);
        }
        let Some(arguments) =
            self.bind_arguments(name, &function.parameters, function.is_variadic, &call.arguments, call.span)
        else {
            return BoundExpression::error(call.span);
        };
        let ty = function.return_type.clone();
        BoundExpression::new(
            Kind::PackageCall {
                package,
                function,
                arguments,
            },
            ty,
            call.span,
        )
    }

    /// Arguments of an unknown callee are still bound for their own errors.
    fn report_unresolved_call(&mut self, call: &CallExpression) -> BoundExpression {
        for argument in &call.arguments {
            self.bind_expression(argument);
        }
        self.report_error(call.name.span, &messages::UNDEFINED_FUNCTION_CALL, &[&call.name.text])
    }

    /// `package::name(args)`: a cast to a package class, or a call of a
    /// public package function.
    fn bind_package_call_expression(&mut self, call: &PackageCallExpression) -> BoundExpression {
        let Some(package) = self.lookup_package(&call.package) else {
            return BoundExpression::error(call.span);
        };
        let name = call.name.text.as_str();

        if let [argument] = call.arguments.as_slice() {
            if let Some(class) = package.class(name) {
                let ty = class.ty.clone();
                return self.bind_cast(argument, &ty, call.span);
            }
        }

        let Some(function) = package.function(name).cloned() else {
            return self.report_error(call.name.span, &messages::UNDEFINED_PACKAGE_FUNCTION, &[&package.name, name]);
        };
        if !function.is_public {
            return self.report_error(call.name.span, &messages::FUNCTION_ACCESS_VIOLATION, &[name]);
        }

        let Some(arguments) =
            self.bind_arguments(name, &function.parameters, function.is_variadic, &call.arguments, call.span)
        else {
            return BoundExpression::error(call.span);
        };
        let ty = function.return_type.clone();
        BoundExpression::new(
            Kind::PackageCall {
                package,
                function,
                arguments,
            },
            ty,
            call.span,
        )
    }

    /// `base->name(args)`. Class receivers call methods; every other receiver
    /// calls a builtin type function.
    fn bind_type_call_expression(&mut self, call: &TypeCallExpression) -> BoundExpression {
        let base = self.bind_expression(&call.base);
        if base.ty.contains_error() {
            return BoundExpression::error(call.span);
        }
        if base.ty.is_object() && base.ty.is_user_defined() {
            return self.bind_class_call(base, call);
        }

        let name = call.name.text.as_str();
        let function = match lookup_type_function(name, &base.ty) {
            TypeFunctionLookup::Found(function) if type_function_applies(function.origin, &base.ty) => function,
            TypeFunctionLookup::Found(_) | TypeFunctionLookup::NotApplicable => {
                let ty = base.ty.to_string();
                return self.report_error(call.name.span, &messages::INCORRECT_TYPE_FUNCTION_CALL, &[name, &ty]);
            }
            TypeFunctionLookup::Unknown => {
                let ty = base.ty.to_string();
                return self.report_error(call.name.span, &messages::TYPE_FUNCTION_DOES_NOT_EXIST, &[&ty, name]);
            }
        };

        let Some(arguments) = self.bind_arguments(name, &function.parameters, false, &call.arguments, call.span)
        else {
            return BoundExpression::error(call.span);
        };
        let ty = function.return_type.clone();
        BoundExpression::new(
            Kind::TypeCall {
                base: Box::new(base),
                function: Arc::new(function),
                arguments,
            },
            ty,
            call.span,
        )
    }

    /// A method call. Private methods are only callable from inside their
    /// own class, and a class never calls its own `Constructor`.
    fn bind_class_call(&mut self, base: BoundExpression, call: &TypeCallExpression) -> BoundExpression {
        let Some(class) = self.class_for_type(&base.ty) else {
            let ty = base.ty.to_string();
            return self.report_error(base.span, &messages::INVALID_CLASS_ACCESS, &[&ty]);
        };
        let name = call.name.text.as_str();
        let Some(function) = class.function(name).cloned() else {
            return self.report_error(call.name.span, &messages::TYPE_FUNCTION_DOES_NOT_EXIST, &[&class.name, name]);
        };

        if self.is_own_constructor(&function) {
            return self.report_error(call.name.span, &messages::ILLEGAL_CONSTRUCTOR_CALL, &[]);
        }
        if !function.is_public && !self.is_binding_class(&class) {
            return self.report_error(call.name.span, &messages::FUNCTION_ACCESS_VIOLATION, &[name]);
        }

        let Some(arguments) =
            self.bind_arguments(name, &function.parameters, function.is_variadic, &call.arguments, call.span)
        else {
            return BoundExpression::error(call.span);
        };
        let ty = function.return_type.clone();
        BoundExpression::new(
            Kind::ClassCall {
                base: Box::new(base),
                class,
                function,
                arguments,
            },
            ty,
            call.span,
        )
    }

    // ========================================================================
    // Fields
    // ========================================================================

    /// `Enum.Field` resolves straight to the field's value. Anything else
    /// reads a field of a class or struct value.
    fn bind_field_access_expression(&mut self, access: &FieldAccessExpression) -> BoundExpression {
        if let Expression::Name(name) = access.base.as_ref() {
            if let Some(enumeration) = self.lookup_enum(&name.name.text) {
                let field = access.field.text.as_str();
                let Some(&value) = enumeration.values.get(field) else {
                    return self.report_error(
                        access.field.span,
                        &messages::UNKNOWN_ENUM_FIELD,
                        &[&enumeration.name, field],
                    );
                };
                let ty = enumeration.ty.clone();
                return BoundExpression::new(
                    Kind::Enum {
                        enumeration,
                        field: field.to_string(),
                        value,
                    },
                    ty,
                    access.span,
                );
            }
        }

        let base = self.bind_expression(&access.base);
        let Some(field) = self.bind_member_field(&base, &access.field) else {
            return BoundExpression::error(access.span);
        };
        let ty = field.ty.clone();
        BoundExpression::new(
            Kind::FieldAccess {
                base: Box::new(base),
                field,
            },
            ty,
            access.span,
        )
    }

    fn bind_field_assignment_expression(&mut self, assignment: &FieldAssignmentExpression) -> BoundExpression {
        let base = self.bind_expression(&assignment.base);
        let Some(field) = self.bind_member_field(&base, &assignment.field) else {
            return BoundExpression::error(assignment.span);
        };
        let value = self.bind_expression_to(&assignment.value, &field.ty);
        let ty = field.ty.clone();
        BoundExpression::new(
            Kind::FieldAssignment {
                base: Box::new(base),
                field,
                value: Box::new(value),
            },
            ty,
            assignment.span,
        )
    }

    fn bind_member_field(&mut self, base: &BoundExpression, field: &Identifier) -> Option<Arc<VariableSymbol>> {
        if base.ty.contains_error() {
            return None;
        }
        if !base.ty.is_user_defined() {
            let ty = base.ty.to_string();
            self.report(base.span, &messages::INVALID_CLASS_ACCESS, &[&ty]);
            return None;
        }
        let found = self.lookup_member_field(&base.ty, &field.text);
        if found.is_none() {
            let ty = base.ty.to_string();
            self.report(field.span, &messages::UNKNOWN_FIELD, &[&ty, &field.text]);
        }
        found
    }

    // ========================================================================
    // Operators
    // ========================================================================

    fn bind_unary_expression(&mut self, unary: &UnaryExpression) -> BoundExpression {
        let operand = self.bind_expression(&unary.operand);
        if operand.ty.contains_error() {
            return BoundExpression::error(unary.span);
        }
        let Some(operator) = BoundUnaryOperator::bind(unary.operator, &operand.ty) else {
            let ty = operand.ty.to_string();
            return self.report_error(unary.span, &messages::UNARY_OPERATOR_TYPE_ERROR, &[unary.operator.as_str(), &ty]);
        };
        let ty = operator.result_type.clone();
        BoundExpression::new(
            Kind::Unary {
                operator,
                operand: Box::new(operand),
            },
            ty,
            unary.span,
        )
    }

    fn bind_binary_expression(&mut self, binary: &BinaryExpression) -> BoundExpression {
        let left = self.bind_expression(&binary.left);
        let right = self.bind_expression(&binary.right);
        self.bind_binary_internal(left, binary.operator, right, binary.span)
    }

    /// Look up the operator for the operand types. Without a direct match,
    /// the right operand is converted to the left type, explicitly if need
    /// be, and the lookup is retried once.
    fn bind_binary_internal(
        &mut self,
        left: BoundExpression,
        syntax: BinaryOperatorKind,
        right: BoundExpression,
        span: TextSpan,
    ) -> BoundExpression {
        if left.ty.contains_error() || right.ty.contains_error() {
            return BoundExpression::error(span);
        }

        let (operator, right) = match BoundBinaryOperator::bind(syntax, &left.ty, &right.ty) {
            Some(operator) => (operator, right),
            None => {
                let conversion = classify_conversion(&right.ty, &left.ty);
                let retried = if conversion.exists && !conversion.is_identity {
                    BoundBinaryOperator::bind(syntax, &left.ty, &left.ty)
                } else {
                    None
                };
                let Some(operator) = retried else {
                    let (l, r) = type_names(&left.ty, &right.ty);
                    return self.report_error(span, &messages::BINARY_OPERATOR_TYPE_ERROR, &[syntax.as_str(), &l, &r]);
                };
                let right_span = right.span;
                let converted = self.bind_conversion(right, &left.ty, true, right_span);
                (operator, converted)
            }
        };

        let ty = operator.result_type.clone();
        BoundExpression::new(
            Kind::Binary {
                left: Box::new(left),
                operator,
                right: Box::new(right),
            },
            ty,
            span,
        )
    }

    /// The condition must be `bool` and both branches must have the same
    /// type. A fresh temporary carries the selected value.
    fn bind_ternary_expression(&mut self, ternary: &TernaryExpression) -> BoundExpression {
        let condition = self.bind_expression(&ternary.condition);
        let when_true = self.bind_expression(&ternary.when_true);
        let when_false = self.bind_expression(&ternary.when_false);
        if condition.ty.contains_error() || when_true.ty.contains_error() || when_false.ty.contains_error() {
            return BoundExpression::error(ternary.span);
        }

        if condition.ty != TypeSymbol::BOOL {
            let ty = condition.ty.to_string();
            return self.report_error(condition.span, &messages::TERNARY_CONDITION_TYPE_ERROR, &[&ty]);
        }
        if when_true.ty != when_false.ty {
            let (a, b) = type_names(&when_true.ty, &when_false.ty);
            return self.report_error(ternary.span, &messages::TERNARY_BRANCH_TYPE_ERROR, &[&a, &b]);
        }

        let ty = when_true.ty.clone();
        let temporary = Arc::new(VariableSymbol::local(self.session.next_temporary_name(), ty.clone()));
        BoundExpression::new(
            Kind::Ternary {
                condition: Box::new(condition),
                when_true: Box::new(when_true),
                when_false: Box::new(when_false),
                temporary,
            },
            ty,
            ternary.span,
        )
    }

    // ========================================================================
    // Lambdas
    // ========================================================================

    /// Lambdas capture nothing: the body is bound by its own binder over the
    /// entry scope, then lowered right away.
    fn bind_lambda_expression(&mut self, lambda: &LambdaExpression) -> BoundExpression {
        let name = self.session.next_lambda_name();
        let parameters = self.bind_parameters(&name, &lambda.parameters);
        let return_type = self.bind_type_clause(lambda.return_type.as_ref()).unwrap_or(TypeSymbol::VOID);
        let function = Arc::new(FunctionSymbol::new(name, parameters, return_type, FunctionKind::Lambda, lambda.span));
        tracing::debug!(name = %function.name, "binding lambda");

        let main_scope = self.session.main_scope();
        let body = Binder::new(&mut *self.session, main_scope, Some(Arc::clone(&function))).bind_block_statement(&lambda.body);
        let body = self.session.lower(&function, body);

        let ty = function.action_type();
        BoundExpression::new(Kind::Lambda { function, body }, ty, lambda.span)
    }
}
