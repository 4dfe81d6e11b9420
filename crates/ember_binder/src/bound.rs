//! The bound tree.
//!
//! Bound nodes are the binder's output: names are replaced by symbols, every
//! expression carries its [`TypeSymbol`], and every node keeps the span of
//! the syntax it came from.

use crate::operators::{BoundBinaryOperator, BoundUnaryOperator};
use crate::symbol::{
    ClassSymbol, EnumSymbol, FunctionSymbol, PackageSymbol, StructSymbol, TypeFunctionSymbol, VariableSymbol,
};
use crate::types::TypeSymbol;
use ember_core::text::TextSpan;
use ember_syntax::LiteralValue;
use std::fmt;
use std::sync::Arc;

/// A jump target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoundLabel(pub String);

impl BoundLabel {
    pub fn new(name: impl Into<String>) -> Self {
        BoundLabel(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BoundLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone)]
pub struct BoundExpression {
    pub kind: BoundExpressionKind,
    pub ty: TypeSymbol,
    pub span: TextSpan,
}

#[derive(Debug, Clone)]
pub enum BoundArrayContents {
    Length(Box<BoundExpression>),
    Literals(Vec<BoundExpression>),
}

#[derive(Debug, Clone)]
pub enum BoundExpressionKind {
    /// Placeholder for an expression that failed to bind.
    Error,
    Literal(LiteralValue),
    Variable(Arc<VariableSymbol>),
    Assignment {
        variable: Arc<VariableSymbol>,
        value: Box<BoundExpression>,
    },
    Unary {
        operator: BoundUnaryOperator,
        operand: Box<BoundExpression>,
    },
    Binary {
        left: Box<BoundExpression>,
        operator: BoundBinaryOperator,
        right: Box<BoundExpression>,
    },
    Call {
        function: Arc<FunctionSymbol>,
        arguments: Vec<BoundExpression>,
    },
    PackageCall {
        package: Arc<PackageSymbol>,
        function: Arc<FunctionSymbol>,
        arguments: Vec<BoundExpression>,
    },
    TypeCall {
        base: Box<BoundExpression>,
        function: Arc<TypeFunctionSymbol>,
        arguments: Vec<BoundExpression>,
    },
    ClassCall {
        base: Box<BoundExpression>,
        class: Arc<ClassSymbol>,
        function: Arc<FunctionSymbol>,
        arguments: Vec<BoundExpression>,
    },
    Conversion {
        expression: Box<BoundExpression>,
    },
    ArrayAccess {
        base: Box<BoundExpression>,
        index: Box<BoundExpression>,
        is_pointer: bool,
    },
    ArrayAssignment {
        base: Box<BoundExpression>,
        index: Box<BoundExpression>,
        value: Box<BoundExpression>,
        is_pointer: bool,
    },
    Make {
        class: Arc<ClassSymbol>,
        constructor: Option<Arc<FunctionSymbol>>,
        arguments: Vec<BoundExpression>,
    },
    MakeArray {
        element_type: TypeSymbol,
        contents: BoundArrayContents,
    },
    MakeStruct {
        structure: Arc<StructSymbol>,
        values: Vec<BoundExpression>,
    },
    FieldAccess {
        base: Box<BoundExpression>,
        field: Arc<VariableSymbol>,
    },
    FieldAssignment {
        base: Box<BoundExpression>,
        field: Arc<VariableSymbol>,
        value: Box<BoundExpression>,
    },
    Ternary {
        condition: Box<BoundExpression>,
        when_true: Box<BoundExpression>,
        when_false: Box<BoundExpression>,
        /// Holds the selected branch's value.
        temporary: Arc<VariableSymbol>,
    },
    Reference {
        variable: Arc<VariableSymbol>,
    },
    Dereference {
        expression: Box<BoundExpression>,
    },
    /// A reference to a free function.
    Function(Arc<FunctionSymbol>),
    /// A reference to a method of the enclosing class.
    FunctionInClass {
        function: Arc<FunctionSymbol>,
        class: Arc<ClassSymbol>,
    },
    Lambda {
        function: Arc<FunctionSymbol>,
        body: BoundBlockStatement,
    },
    Enum {
        enumeration: Arc<EnumSymbol>,
        field: String,
        value: i32,
    },
    This {
        class: Arc<ClassSymbol>,
    },
}

impl BoundExpression {
    pub fn new(kind: BoundExpressionKind, ty: TypeSymbol, span: TextSpan) -> Self {
        Self { kind, ty, span }
    }

    pub fn error(span: TextSpan) -> Self {
        Self::new(BoundExpressionKind::Error, TypeSymbol::ERROR, span)
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, BoundExpressionKind::Error)
    }

    pub fn ty(&self) -> &TypeSymbol {
        &self.ty
    }

    /// Direct sub-expressions, in evaluation order. Lambda bodies are not
    /// included.
    pub fn children(&self) -> Vec<&BoundExpression> {
        use BoundExpressionKind as K;
        match &self.kind {
            K::Error
            | K::Literal(_)
            | K::Variable(_)
            | K::Reference { .. }
            | K::Function(_)
            | K::FunctionInClass { .. }
            | K::Lambda { .. }
            | K::Enum { .. }
            | K::This { .. } => Vec::new(),
            K::Assignment { value, .. } => vec![&**value],
            K::Unary { operand, .. } => vec![&**operand],
            K::Binary { left, right, .. } => vec![&**left, &**right],
            K::Call { arguments, .. } | K::PackageCall { arguments, .. } | K::Make { arguments, .. } => {
                arguments.iter().collect()
            }
            K::TypeCall { base, arguments, .. } | K::ClassCall { base, arguments, .. } => {
                std::iter::once(&**base).chain(arguments.iter()).collect()
            }
            K::Conversion { expression } | K::Dereference { expression } => vec![&**expression],
            K::ArrayAccess { base, index, .. } => vec![&**base, &**index],
            K::ArrayAssignment { base, index, value, .. } => vec![&**base, &**index, &**value],
            K::MakeArray { contents, .. } => match contents {
                BoundArrayContents::Length(length) => vec![&**length],
                BoundArrayContents::Literals(literals) => literals.iter().collect(),
            },
            K::MakeStruct { values, .. } => values.iter().collect(),
            K::FieldAccess { base, .. } => vec![&**base],
            K::FieldAssignment { base, value, .. } => vec![&**base, &**value],
            K::Ternary { condition, when_true, when_false, .. } => {
                vec![&**condition, &**when_true, &**when_false]
            }
        }
    }
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct BoundBlockStatement {
    pub statements: Vec<BoundStatement>,
    pub span: TextSpan,
}

#[derive(Debug, Clone)]
pub enum BoundStatement {
    Block(BoundBlockStatement),
    VariableDeclaration {
        variable: Arc<VariableSymbol>,
        initializer: Option<BoundExpression>,
        span: TextSpan,
    },
    If {
        condition: BoundExpression,
        then_statement: Box<BoundStatement>,
        else_statement: Option<Box<BoundStatement>>,
        span: TextSpan,
    },
    While {
        condition: BoundExpression,
        body: Box<BoundStatement>,
        break_label: BoundLabel,
        continue_label: BoundLabel,
        span: TextSpan,
    },
    For {
        initializer: Box<BoundStatement>,
        condition: BoundExpression,
        update: Box<BoundStatement>,
        body: Box<BoundStatement>,
        break_label: BoundLabel,
        continue_label: BoundLabel,
        span: TextSpan,
    },
    FromTo {
        variable: Arc<VariableSymbol>,
        lower_bound: BoundExpression,
        upper_bound: BoundExpression,
        body: Box<BoundStatement>,
        break_label: BoundLabel,
        continue_label: BoundLabel,
        span: TextSpan,
    },
    Return {
        expression: Option<BoundExpression>,
        span: TextSpan,
    },
    Expression {
        expression: BoundExpression,
        span: TextSpan,
    },
    Label {
        label: BoundLabel,
        span: TextSpan,
    },
    Goto {
        label: BoundLabel,
        span: TextSpan,
    },
    ConditionalGoto {
        label: BoundLabel,
        condition: BoundExpression,
        jump_if_true: bool,
        span: TextSpan,
    },
}

impl BoundStatement {
    /// An expression statement wrapping an error expression.
    pub fn error(span: TextSpan) -> Self {
        BoundStatement::Expression {
            expression: BoundExpression::error(span),
            span,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, BoundStatement::Expression { expression, .. } if expression.is_error())
    }

    pub fn span(&self) -> TextSpan {
        match self {
            BoundStatement::Block(block) => block.span,
            BoundStatement::VariableDeclaration { span, .. }
            | BoundStatement::If { span, .. }
            | BoundStatement::While { span, .. }
            | BoundStatement::For { span, .. }
            | BoundStatement::FromTo { span, .. }
            | BoundStatement::Return { span, .. }
            | BoundStatement::Expression { span, .. }
            | BoundStatement::Label { span, .. }
            | BoundStatement::Goto { span, .. }
            | BoundStatement::ConditionalGoto { span, .. } => *span,
        }
    }

    /// Visit every expression in this statement, including nested statements
    /// and lambda bodies.
    pub fn for_each_expression<'a>(&'a self, f: &mut dyn FnMut(&'a BoundExpression)) {
        match self {
            BoundStatement::Block(block) => {
                for statement in &block.statements {
                    statement.for_each_expression(f);
                }
            }
            BoundStatement::VariableDeclaration { initializer, .. } => {
                if let Some(initializer) = initializer {
                    visit_expression(initializer, f);
                }
            }
            BoundStatement::If { condition, then_statement, else_statement, .. } => {
                visit_expression(condition, f);
                then_statement.for_each_expression(f);
                if let Some(else_statement) = else_statement {
                    else_statement.for_each_expression(f);
                }
            }
            BoundStatement::While { condition, body, .. } => {
                visit_expression(condition, f);
                body.for_each_expression(f);
            }
            BoundStatement::For { initializer, condition, update, body, .. } => {
                initializer.for_each_expression(f);
                visit_expression(condition, f);
                update.for_each_expression(f);
                body.for_each_expression(f);
            }
            BoundStatement::FromTo { lower_bound, upper_bound, body, .. } => {
                visit_expression(lower_bound, f);
                visit_expression(upper_bound, f);
                body.for_each_expression(f);
            }
            BoundStatement::Return { expression, .. } => {
                if let Some(expression) = expression {
                    visit_expression(expression, f);
                }
            }
            BoundStatement::Expression { expression, .. } => visit_expression(expression, f),
            BoundStatement::ConditionalGoto { condition, .. } => visit_expression(condition, f),
            BoundStatement::Label { .. } | BoundStatement::Goto { .. } => {}
        }
    }
}

fn visit_expression<'a>(expression: &'a BoundExpression, f: &mut dyn FnMut(&'a BoundExpression)) {
    f(expression);
    if let BoundExpressionKind::Lambda { body, .. } = &expression.kind {
        for statement in &body.statements {
            statement.for_each_expression(f);
        }
    }
    for child in expression.children() {
        visit_expression(child, f);
    }
}

// ============================================================================
// Program
// ============================================================================

#[derive(Debug, Clone)]
pub struct BoundFunction {
    pub symbol: Arc<FunctionSymbol>,
    pub body: BoundBlockStatement,
}

#[derive(Debug, Clone)]
pub struct BoundClass {
    pub symbol: Arc<ClassSymbol>,
    /// `set` declarations from the class body, in source order.
    pub field_initializers: Vec<BoundStatement>,
    pub methods: Vec<BoundFunction>,
}

/// Everything the binder produced for one compilation unit.
#[derive(Debug, Clone)]
pub struct BoundProgram {
    /// Synthesized entry point holding the global statements.
    pub main: BoundFunction,
    pub functions: Vec<BoundFunction>,
    pub external_functions: Vec<Arc<FunctionSymbol>>,
    pub classes: Vec<BoundClass>,
    pub structs: Vec<Arc<StructSymbol>>,
    pub enums: Vec<Arc<EnumSymbol>>,
    pub packages: Vec<Arc<PackageSymbol>>,
}

impl BoundProgram {
    /// Every function body in the program: main, free functions, then methods.
    pub fn bodies(&self) -> impl Iterator<Item = &BoundFunction> {
        std::iter::once(&self.main)
            .chain(self.functions.iter())
            .chain(self.classes.iter().flat_map(|c| c.methods.iter()))
    }

    pub fn bodies_mut(&mut self) -> impl Iterator<Item = &mut BoundFunction> {
        std::iter::once(&mut self.main)
            .chain(self.functions.iter_mut())
            .chain(self.classes.iter_mut().flat_map(|c| c.methods.iter_mut()))
    }

    /// Visit every bound expression in the program.
    pub fn for_each_expression<'a>(&'a self, f: &mut dyn FnMut(&'a BoundExpression)) {
        for function in self.bodies() {
            for statement in &function.body.statements {
                statement.for_each_expression(f);
            }
        }
        for class in &self.classes {
            for statement in &class.field_initializers {
                statement.for_each_expression(f);
            }
        }
    }
}
