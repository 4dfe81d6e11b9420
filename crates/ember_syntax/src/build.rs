//! Constructors for building syntax trees in code.
//!
//! Used by tests, benchmarks and tooling that synthesize programs without
//! going through the parser. Every node gets an empty span.

use crate::node::*;
use crate::operators::{BinaryOperatorKind, UnaryOperatorKind};
use ember_core::text::TextSpan;

fn span() -> TextSpan {
    TextSpan::default()
}

pub fn ident(text: &str) -> Identifier {
    Identifier::new(text, span())
}

// ============================================================================
// Types and parameters
// ============================================================================

pub fn ty(name: &str) -> TypeClause {
    TypeClause::simple(ident(name))
}

pub fn ty_of(name: &str, sub_clauses: Vec<TypeClause>) -> TypeClause {
    TypeClause {
        package: None,
        name: ident(name),
        sub_clauses,
        span: span(),
    }
}

pub fn package_ty(package: &str, name: &str) -> TypeClause {
    TypeClause {
        package: Some(ident(package)),
        name: ident(name),
        sub_clauses: Vec::new(),
        span: span(),
    }
}

pub fn param(name: &str, type_clause: TypeClause) -> Parameter {
    Parameter {
        name: ident(name),
        type_clause,
        span: span(),
    }
}

// ============================================================================
// Members
// ============================================================================

pub fn unit(members: Vec<Member>) -> CompilationUnit {
    CompilationUnit { members }
}

pub fn function(
    name: &str,
    parameters: Vec<Parameter>,
    return_type: Option<TypeClause>,
    body: Vec<Statement>,
) -> FunctionDeclaration {
    FunctionDeclaration {
        name: ident(name),
        parameters,
        return_type,
        body: block_of(body),
        is_public: false,
        span: span(),
    }
}

pub fn public_function(
    name: &str,
    parameters: Vec<Parameter>,
    return_type: Option<TypeClause>,
    body: Vec<Statement>,
) -> FunctionDeclaration {
    FunctionDeclaration {
        is_public: true,
        ..function(name, parameters, return_type, body)
    }
}

pub fn external(name: &str, parameters: Vec<Parameter>, return_type: Option<TypeClause>) -> ExternalFunctionDeclaration {
    ExternalFunctionDeclaration {
        name: ident(name),
        parameters,
        return_type,
        is_variadic: false,
        is_adapted: false,
        span: span(),
    }
}

pub fn class(name: &str, members: Vec<Member>) -> ClassDeclaration {
    ClassDeclaration {
        name: ident(name),
        members,
        span: span(),
    }
}

pub fn structure(name: &str, fields: Vec<Parameter>) -> StructDeclaration {
    StructDeclaration {
        name: ident(name),
        fields,
        span: span(),
    }
}

/// An enum whose fields optionally carry an explicit integer value.
pub fn enumeration(name: &str, fields: &[(&str, Option<i32>)]) -> EnumDeclaration {
    let fields = fields
        .iter()
        .map(|(field, value)| EnumField {
            name: ident(field),
            value: value.map(|v| LiteralExpression {
                value: LiteralValue::Int(v),
                span: span(),
            }),
            span: span(),
        })
        .collect();
    EnumDeclaration {
        name: ident(name),
        fields,
        span: span(),
    }
}

pub fn package_reference(name: &str) -> PackageReference {
    PackageReference {
        package: ident(name),
        span: span(),
    }
}

pub fn package_alias(name: &str, alias: &str) -> PackageAlias {
    PackageAlias {
        package: ident(name),
        alias: ident(alias),
        span: span(),
    }
}

pub fn package_use(name: &str) -> PackageUse {
    PackageUse {
        package: ident(name),
        span: span(),
    }
}

pub fn global(statement: Statement) -> Member {
    Member::GlobalStatement(GlobalStatement { statement })
}

impl From<FunctionDeclaration> for Member {
    fn from(node: FunctionDeclaration) -> Self {
        Member::FunctionDeclaration(node)
    }
}

impl From<ExternalFunctionDeclaration> for Member {
    fn from(node: ExternalFunctionDeclaration) -> Self {
        Member::ExternalFunctionDeclaration(node)
    }
}

impl From<ClassDeclaration> for Member {
    fn from(node: ClassDeclaration) -> Self {
        Member::ClassDeclaration(node)
    }
}

impl From<StructDeclaration> for Member {
    fn from(node: StructDeclaration) -> Self {
        Member::StructDeclaration(node)
    }
}

impl From<EnumDeclaration> for Member {
    fn from(node: EnumDeclaration) -> Self {
        Member::EnumDeclaration(node)
    }
}

impl From<PackageReference> for Member {
    fn from(node: PackageReference) -> Self {
        Member::PackageReference(node)
    }
}

impl From<PackageAlias> for Member {
    fn from(node: PackageAlias) -> Self {
        Member::PackageAlias(node)
    }
}

impl From<PackageUse> for Member {
    fn from(node: PackageUse) -> Self {
        Member::PackageUse(node)
    }
}

// ============================================================================
// Statements
// ============================================================================

pub fn block_of(statements: Vec<Statement>) -> BlockStatement {
    BlockStatement {
        statements,
        span: span(),
    }
}

pub fn block(statements: Vec<Statement>) -> Statement {
    Statement::Block(block_of(statements))
}

pub fn declaration(
    keyword: DeclarationKeyword,
    name: &str,
    type_clause: Option<TypeClause>,
    initializer: Option<Expression>,
) -> VariableDeclaration {
    VariableDeclaration {
        keyword,
        name: ident(name),
        type_clause,
        initializer,
        span: span(),
    }
}

/// `var name <- initializer;`
pub fn var(name: &str, initializer: Expression) -> Statement {
    Statement::VariableDeclaration(declaration(DeclarationKeyword::Var, name, None, Some(initializer)))
}

/// `var name type [<- initializer];`
pub fn var_typed(name: &str, type_clause: TypeClause, initializer: Option<Expression>) -> Statement {
    Statement::VariableDeclaration(declaration(DeclarationKeyword::Var, name, Some(type_clause), initializer))
}

/// `set name <- initializer;`
pub fn set(name: &str, initializer: Expression) -> Statement {
    Statement::VariableDeclaration(declaration(DeclarationKeyword::Set, name, None, Some(initializer)))
}

pub fn set_typed(name: &str, type_clause: TypeClause, initializer: Option<Expression>) -> Statement {
    Statement::VariableDeclaration(declaration(DeclarationKeyword::Set, name, Some(type_clause), initializer))
}

pub fn if_stmt(condition: Expression, then_statement: Statement, else_statement: Option<Statement>) -> Statement {
    Statement::If(IfStatement {
        condition,
        then_statement: Box::new(then_statement),
        else_statement: else_statement.map(Box::new),
        span: span(),
    })
}

pub fn while_stmt(condition: Expression, body: Statement) -> Statement {
    Statement::While(WhileStatement {
        condition,
        body: Box::new(body),
        span: span(),
    })
}

pub fn for_stmt(initializer: Statement, condition: Expression, update: Statement, body: Statement) -> Statement {
    Statement::For(ForStatement {
        initializer: Box::new(initializer),
        condition,
        update: Box::new(update),
        body: Box::new(body),
        span: span(),
    })
}

pub fn from_to(variable: &str, lower_bound: Expression, upper_bound: Expression, body: Statement) -> Statement {
    Statement::FromTo(FromToStatement {
        variable: ident(variable),
        lower_bound,
        upper_bound,
        body: Box::new(body),
        span: span(),
    })
}

pub fn return_stmt(expression: Option<Expression>) -> Statement {
    Statement::Return(ReturnStatement {
        expression,
        span: span(),
    })
}

pub fn break_stmt() -> Statement {
    Statement::Break(BreakStatement { span: span() })
}

pub fn continue_stmt() -> Statement {
    Statement::Continue(ContinueStatement { span: span() })
}

pub fn expr_stmt(expression: Expression) -> Statement {
    Statement::Expression(ExpressionStatement {
        expression,
        span: span(),
    })
}

// ============================================================================
// Expressions
// ============================================================================

pub fn literal(value: LiteralValue) -> Expression {
    Expression::Literal(LiteralExpression { value, span: span() })
}

pub fn int(value: i32) -> Expression {
    literal(LiteralValue::Int(value))
}

pub fn long(value: i64) -> Expression {
    literal(LiteralValue::Long(value))
}

pub fn float(value: f32) -> Expression {
    literal(LiteralValue::Float(value))
}

pub fn double(value: f64) -> Expression {
    literal(LiteralValue::Double(value))
}

pub fn string(value: &str) -> Expression {
    literal(LiteralValue::String(value.to_string()))
}

pub fn boolean(value: bool) -> Expression {
    literal(LiteralValue::Bool(value))
}

pub fn paren(expression: Expression) -> Expression {
    Expression::Parenthesized(ParenthesizedExpression {
        expression: Box::new(expression),
        span: span(),
    })
}

pub fn name_expr(name: &str) -> NameExpression {
    NameExpression {
        name: ident(name),
        in_main: false,
        span: span(),
    }
}

pub fn name(name: &str) -> Expression {
    Expression::Name(name_expr(name))
}

/// `main::name`
pub fn main_name(name: &str) -> Expression {
    Expression::Name(NameExpression {
        in_main: true,
        ..name_expr(name)
    })
}

pub fn assign(name: &str, value: Expression) -> Expression {
    Expression::Assignment(AssignmentExpression {
        name: ident(name),
        value: Box::new(value),
        in_main: false,
        span: span(),
    })
}

pub fn edit(name: &str, operator: BinaryOperatorKind, value: Option<Expression>) -> Expression {
    Expression::VariableEditor(VariableEditorExpression {
        name: ident(name),
        operator,
        value: value.map(Box::new),
        span: span(),
    })
}

pub fn index(base: Expression, index: Expression) -> Expression {
    Expression::ArrayAccess(ArrayAccessExpression {
        base: Box::new(base),
        index: Box::new(index),
        span: span(),
    })
}

pub fn index_assign(base: Expression, index: Expression, value: Expression) -> Expression {
    Expression::ArrayAssignment(ArrayAssignmentExpression {
        base: Box::new(base),
        index: Box::new(index),
        value: Box::new(value),
        span: span(),
    })
}

pub fn make(class_name: &str, arguments: Vec<Expression>) -> Expression {
    Expression::Make(MakeExpression {
        package: None,
        class_name: ident(class_name),
        arguments,
        span: span(),
    })
}

pub fn make_from(package: &str, class_name: &str, arguments: Vec<Expression>) -> Expression {
    Expression::Make(MakeExpression {
        package: Some(ident(package)),
        class_name: ident(class_name),
        arguments,
        span: span(),
    })
}

pub fn make_array(element_type: TypeClause, length: Expression) -> Expression {
    Expression::MakeArray(MakeArrayExpression {
        element_type,
        contents: MakeArrayContents::Length(Box::new(length)),
        span: span(),
    })
}

pub fn make_array_of(element_type: TypeClause, literals: Vec<Expression>) -> Expression {
    Expression::MakeArray(MakeArrayExpression {
        element_type,
        contents: MakeArrayContents::Literals(literals),
        span: span(),
    })
}

pub fn make_struct(struct_name: &str, values: Vec<Expression>) -> Expression {
    Expression::MakeStruct(MakeStructExpression {
        struct_name: ident(struct_name),
        values,
        span: span(),
    })
}

pub fn call(name: &str, arguments: Vec<Expression>) -> Expression {
    Expression::Call(CallExpression {
        name: ident(name),
        arguments,
        casting_type: None,
        in_main: false,
        span: span(),
    })
}

/// `main::name(args)`
pub fn main_call(name: &str, arguments: Vec<Expression>) -> Expression {
    Expression::Call(CallExpression {
        name: ident(name),
        arguments,
        casting_type: None,
        in_main: true,
        span: span(),
    })
}

/// A call whose callee is a composite type, e.g. `array<int>(x)`.
pub fn cast(type_clause: TypeClause, argument: Expression) -> Expression {
    Expression::Call(CallExpression {
        name: type_clause.name.clone(),
        arguments: vec![argument],
        casting_type: Some(type_clause),
        in_main: false,
        span: span(),
    })
}

pub fn package_call(package: &str, name: &str, arguments: Vec<Expression>) -> Expression {
    Expression::PackageCall(PackageCallExpression {
        package: ident(package),
        name: ident(name),
        arguments,
        span: span(),
    })
}

pub fn type_call(base: Expression, name: &str, arguments: Vec<Expression>) -> Expression {
    Expression::TypeCall(TypeCallExpression {
        base: Box::new(base),
        name: ident(name),
        arguments,
        span: span(),
    })
}

pub fn unary(operator: UnaryOperatorKind, operand: Expression) -> Expression {
    Expression::Unary(UnaryExpression {
        operator,
        operand: Box::new(operand),
        span: span(),
    })
}

pub fn binary(left: Expression, operator: BinaryOperatorKind, right: Expression) -> Expression {
    Expression::Binary(BinaryExpression {
        left: Box::new(left),
        operator,
        right: Box::new(right),
        span: span(),
    })
}

pub fn field(base: Expression, field: &str) -> Expression {
    Expression::FieldAccess(FieldAccessExpression {
        base: Box::new(base),
        field: ident(field),
        span: span(),
    })
}

pub fn field_assign(base: Expression, field: &str, value: Expression) -> Expression {
    Expression::FieldAssignment(FieldAssignmentExpression {
        base: Box::new(base),
        field: ident(field),
        value: Box::new(value),
        span: span(),
    })
}

pub fn ternary(condition: Expression, when_true: Expression, when_false: Expression) -> Expression {
    Expression::Ternary(TernaryExpression {
        condition: Box::new(condition),
        when_true: Box::new(when_true),
        when_false: Box::new(when_false),
        span: span(),
    })
}

pub fn reference(name: &str) -> Expression {
    Expression::Reference(ReferenceExpression {
        expression: name_expr(name),
        span: span(),
    })
}

pub fn deref(expression: Expression) -> Expression {
    Expression::Dereference(DereferenceExpression {
        expression: Box::new(expression),
        span: span(),
    })
}

pub fn lambda(parameters: Vec<Parameter>, return_type: Option<TypeClause>, body: Vec<Statement>) -> Expression {
    Expression::Lambda(LambdaExpression {
        parameters,
        return_type,
        body: block_of(body),
        span: span(),
    })
}

pub fn this() -> Expression {
    Expression::This(ThisExpression { span: span() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_built_unit_deserializes_back() {
        let unit = unit(vec![
            global(var("x", int(1))),
            function("f", vec![param("a", ty("int"))], Some(ty("int")), vec![return_stmt(Some(name("a")))]).into(),
        ]);
        let json = serde_json::to_string(&unit).unwrap();
        let parsed: CompilationUnit = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, unit);
    }

    #[test]
    fn test_hand_written_json_defaults_spans_and_flags() {
        let json = r#"{
            "members": [
                { "kind": "GlobalStatement", "statement": {
                    "kind": "Expression",
                    "expression": { "kind": "Call", "name": { "text": "Print" },
                        "arguments": [ { "kind": "Literal", "value": { "String": "hi" } } ] }
                } }
            ]
        }"#;
        let parsed: CompilationUnit = serde_json::from_str(json).unwrap();
        let expected = unit(vec![global(expr_stmt(call("Print", vec![string("hi")])))]);
        assert_eq!(parsed, expected);
    }
}
