//! Syntax node definitions.
//!
//! Members, statements and expressions are closed enums whose variants wrap a
//! dedicated node struct, so every consumer matches them exhaustively. All
//! types derive serde so a parsed tree can be handed over as JSON; spans
//! default to empty when omitted.

use crate::operators::{BinaryOperatorKind, UnaryOperatorKind};
use ember_core::text::TextSpan;
use serde::{Deserialize, Serialize};

// ============================================================================
// Leaves
// ============================================================================

/// An identifier token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identifier {
    pub text: String,
    #[serde(default)]
    pub span: TextSpan,
}

impl Identifier {
    pub fn new(text: impl Into<String>, span: TextSpan) -> Self {
        Self {
            text: text.into(),
            span,
        }
    }
}

/// A type annotation such as `int`, `array<string>` or `sys::Socket`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeClause {
    /// Package qualifier for `package::Type` clauses.
    #[serde(default)]
    pub package: Option<Identifier>,
    pub name: Identifier,
    #[serde(default)]
    pub sub_clauses: Vec<TypeClause>,
    #[serde(default)]
    pub span: TextSpan,
}

impl TypeClause {
    /// A bare clause with no subtypes and no package.
    pub fn simple(name: Identifier) -> Self {
        let span = name.span;
        Self {
            package: None,
            name,
            sub_clauses: Vec::new(),
            span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: Identifier,
    pub type_clause: TypeClause,
    #[serde(default)]
    pub span: TextSpan,
}

// ============================================================================
// Compilation unit and members
// ============================================================================

/// A whole program: the ordered list of top-level members.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompilationUnit {
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Member {
    GlobalStatement(GlobalStatement),
    FunctionDeclaration(FunctionDeclaration),
    ExternalFunctionDeclaration(ExternalFunctionDeclaration),
    ClassDeclaration(ClassDeclaration),
    StructDeclaration(StructDeclaration),
    EnumDeclaration(EnumDeclaration),
    PackageReference(PackageReference),
    PackageAlias(PackageAlias),
    PackageUse(PackageUse),
}

impl Member {
    pub fn span(&self) -> TextSpan {
        match self {
            Member::GlobalStatement(n) => n.statement.span(),
            Member::FunctionDeclaration(n) => n.span,
            Member::ExternalFunctionDeclaration(n) => n.span,
            Member::ClassDeclaration(n) => n.span,
            Member::StructDeclaration(n) => n.span,
            Member::EnumDeclaration(n) => n.span,
            Member::PackageReference(n) => n.span,
            Member::PackageAlias(n) => n.span,
            Member::PackageUse(n) => n.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalStatement {
    pub statement: Statement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDeclaration {
    pub name: Identifier,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub return_type: Option<TypeClause>,
    pub body: BlockStatement,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub span: TextSpan,
}

/// A function implemented outside the program (`external` in source).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalFunctionDeclaration {
    pub name: Identifier,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub return_type: Option<TypeClause>,
    /// Accepts any number of trailing arguments.
    #[serde(default)]
    pub is_variadic: bool,
    /// Arguments are adapted to the native calling convention.
    #[serde(default)]
    pub is_adapted: bool,
    #[serde(default)]
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDeclaration {
    pub name: Identifier,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructDeclaration {
    pub name: Identifier,
    #[serde(default)]
    pub fields: Vec<Parameter>,
    #[serde(default)]
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumDeclaration {
    pub name: Identifier,
    #[serde(default)]
    pub fields: Vec<EnumField>,
    #[serde(default)]
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumField {
    pub name: Identifier,
    /// Explicit value (`A = 5`).
    #[serde(default)]
    pub value: Option<LiteralExpression>,
    #[serde(default)]
    pub span: TextSpan,
}

/// `package name;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageReference {
    pub package: Identifier,
    #[serde(default)]
    pub span: TextSpan,
}

/// `alias name as other;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageAlias {
    pub package: Identifier,
    pub alias: Identifier,
    #[serde(default)]
    pub span: TextSpan,
}

/// `use name;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageUse {
    pub package: Identifier,
    #[serde(default)]
    pub span: TextSpan,
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Statement {
    Block(BlockStatement),
    VariableDeclaration(VariableDeclaration),
    If(IfStatement),
    Return(ReturnStatement),
    For(ForStatement),
    While(WhileStatement),
    FromTo(FromToStatement),
    Break(BreakStatement),
    Continue(ContinueStatement),
    Expression(ExpressionStatement),
}

impl Statement {
    pub fn span(&self) -> TextSpan {
        match self {
            Statement::Block(n) => n.span,
            Statement::VariableDeclaration(n) => n.span,
            Statement::If(n) => n.span,
            Statement::Return(n) => n.span,
            Statement::For(n) => n.span,
            Statement::While(n) => n.span,
            Statement::FromTo(n) => n.span,
            Statement::Break(n) => n.span,
            Statement::Continue(n) => n.span,
            Statement::Expression(n) => n.span,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockStatement {
    #[serde(default)]
    pub statements: Vec<Statement>,
    #[serde(default)]
    pub span: TextSpan,
}

/// `var` declares a local, `set` declares a global.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclarationKeyword {
    Var,
    Set,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableDeclaration {
    pub keyword: DeclarationKeyword,
    pub name: Identifier,
    #[serde(default)]
    pub type_clause: Option<TypeClause>,
    #[serde(default)]
    pub initializer: Option<Expression>,
    #[serde(default)]
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IfStatement {
    pub condition: Expression,
    pub then_statement: Box<Statement>,
    #[serde(default)]
    pub else_statement: Option<Box<Statement>>,
    #[serde(default)]
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnStatement {
    #[serde(default)]
    pub expression: Option<Expression>,
    #[serde(default)]
    pub span: TextSpan,
}

/// `for (var i <- 0; i < n; i++) body`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForStatement {
    pub initializer: Box<Statement>,
    pub condition: Expression,
    pub update: Box<Statement>,
    pub body: Box<Statement>,
    #[serde(default)]
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhileStatement {
    pub condition: Expression,
    pub body: Box<Statement>,
    #[serde(default)]
    pub span: TextSpan,
}

/// `from (i <- lower) to upper body`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FromToStatement {
    pub variable: Identifier,
    pub lower_bound: Expression,
    pub upper_bound: Expression,
    pub body: Box<Statement>,
    #[serde(default)]
    pub span: TextSpan,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BreakStatement {
    #[serde(default)]
    pub span: TextSpan,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContinueStatement {
    #[serde(default)]
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionStatement {
    pub expression: Expression,
    #[serde(default)]
    pub span: TextSpan,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Expression {
    Literal(LiteralExpression),
    Parenthesized(ParenthesizedExpression),
    Name(NameExpression),
    Assignment(AssignmentExpression),
    VariableEditor(VariableEditorExpression),
    ArrayAccess(ArrayAccessExpression),
    ArrayAssignment(ArrayAssignmentExpression),
    Make(MakeExpression),
    MakeArray(MakeArrayExpression),
    MakeStruct(MakeStructExpression),
    Call(CallExpression),
    PackageCall(PackageCallExpression),
    TypeCall(TypeCallExpression),
    Unary(UnaryExpression),
    Binary(BinaryExpression),
    FieldAccess(FieldAccessExpression),
    FieldAssignment(FieldAssignmentExpression),
    Ternary(TernaryExpression),
    Reference(ReferenceExpression),
    Dereference(DereferenceExpression),
    Lambda(LambdaExpression),
    This(ThisExpression),
}

impl Expression {
    pub fn span(&self) -> TextSpan {
        match self {
            Expression::Literal(n) => n.span,
            Expression::Parenthesized(n) => n.span,
            Expression::Name(n) => n.span,
            Expression::Assignment(n) => n.span,
            Expression::VariableEditor(n) => n.span,
            Expression::ArrayAccess(n) => n.span,
            Expression::ArrayAssignment(n) => n.span,
            Expression::Make(n) => n.span,
            Expression::MakeArray(n) => n.span,
            Expression::MakeStruct(n) => n.span,
            Expression::Call(n) => n.span,
            Expression::PackageCall(n) => n.span,
            Expression::TypeCall(n) => n.span,
            Expression::Unary(n) => n.span,
            Expression::Binary(n) => n.span,
            Expression::FieldAccess(n) => n.span,
            Expression::FieldAssignment(n) => n.span,
            Expression::Ternary(n) => n.span,
            Expression::Reference(n) => n.span,
            Expression::Dereference(n) => n.span,
            Expression::Lambda(n) => n.span,
            Expression::This(n) => n.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LiteralValue {
    Bool(bool),
    Byte(u8),
    Int(i32),
    Long(i64),
    UInt(u32),
    ULong(u64),
    Float(f32),
    Double(f64),
    String(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralExpression {
    pub value: LiteralValue,
    #[serde(default)]
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParenthesizedExpression {
    pub expression: Box<Expression>,
    #[serde(default)]
    pub span: TextSpan,
}

/// A bare identifier. `in_main` marks references written as `main::name`,
/// which resolve against the entry unit's scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameExpression {
    pub name: Identifier,
    #[serde(default)]
    pub in_main: bool,
    #[serde(default)]
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentExpression {
    pub name: Identifier,
    pub value: Box<Expression>,
    #[serde(default)]
    pub in_main: bool,
    #[serde(default)]
    pub span: TextSpan,
}

/// `x++`, `x--`, `x += e` and friends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableEditorExpression {
    pub name: Identifier,
    pub operator: BinaryOperatorKind,
    /// Missing for `++` / `--`.
    #[serde(default)]
    pub value: Option<Box<Expression>>,
    #[serde(default)]
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayAccessExpression {
    pub base: Box<Expression>,
    pub index: Box<Expression>,
    #[serde(default)]
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayAssignmentExpression {
    pub base: Box<Expression>,
    pub index: Box<Expression>,
    pub value: Box<Expression>,
    #[serde(default)]
    pub span: TextSpan,
}

/// `make Class(args)` or `make package::Class(args)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MakeExpression {
    #[serde(default)]
    pub package: Option<Identifier>,
    pub class_name: Identifier,
    #[serde(default)]
    pub arguments: Vec<Expression>,
    #[serde(default)]
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MakeArrayContents {
    /// `make int array(10)`
    Length(Box<Expression>),
    /// `make int array { 1, 2, 3 }`
    Literals(Vec<Expression>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MakeArrayExpression {
    pub element_type: TypeClause,
    pub contents: MakeArrayContents,
    #[serde(default)]
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MakeStructExpression {
    pub struct_name: Identifier,
    #[serde(default)]
    pub values: Vec<Expression>,
    #[serde(default)]
    pub span: TextSpan,
}

/// `name(args)`. The parser also hands over the callee re-read as a type
/// clause so casts like `array<int>(x)` can be resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallExpression {
    pub name: Identifier,
    #[serde(default)]
    pub arguments: Vec<Expression>,
    #[serde(default)]
    pub casting_type: Option<TypeClause>,
    #[serde(default)]
    pub in_main: bool,
    #[serde(default)]
    pub span: TextSpan,
}

/// `package::function(args)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageCallExpression {
    pub package: Identifier,
    pub name: Identifier,
    #[serde(default)]
    pub arguments: Vec<Expression>,
    #[serde(default)]
    pub span: TextSpan,
}

/// `base->Function(args)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeCallExpression {
    pub base: Box<Expression>,
    pub name: Identifier,
    #[serde(default)]
    pub arguments: Vec<Expression>,
    #[serde(default)]
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnaryExpression {
    pub operator: UnaryOperatorKind,
    pub operand: Box<Expression>,
    #[serde(default)]
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryExpression {
    pub left: Box<Expression>,
    pub operator: BinaryOperatorKind,
    pub right: Box<Expression>,
    #[serde(default)]
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldAccessExpression {
    pub base: Box<Expression>,
    pub field: Identifier,
    #[serde(default)]
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldAssignmentExpression {
    pub base: Box<Expression>,
    pub field: Identifier,
    pub value: Box<Expression>,
    #[serde(default)]
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TernaryExpression {
    pub condition: Box<Expression>,
    pub when_true: Box<Expression>,
    pub when_false: Box<Expression>,
    #[serde(default)]
    pub span: TextSpan,
}

/// `ref name`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceExpression {
    pub expression: NameExpression,
    #[serde(default)]
    pub span: TextSpan,
}

/// `deref expr`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DereferenceExpression {
    pub expression: Box<Expression>,
    #[serde(default)]
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LambdaExpression {
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub return_type: Option<TypeClause>,
    pub body: BlockStatement,
    #[serde(default)]
    pub span: TextSpan,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThisExpression {
    #[serde(default)]
    pub span: TextSpan,
}
