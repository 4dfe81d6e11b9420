//! Statement binding.

use super::Binder;
use crate::bound::{BoundBlockStatement, BoundExpressionKind, BoundLabel, BoundStatement};
use crate::symbol::{Symbol, VariableKind, VariableSymbol};
use crate::types::TypeSymbol;
use ember_diagnostics::messages;
use ember_syntax::{
    BlockStatement, BreakStatement, ContinueStatement, DeclarationKeyword, ExpressionStatement, ForStatement,
    FromToStatement, Identifier, IfStatement, ReturnStatement, Statement, VariableDeclaration, WhileStatement,
};
use std::sync::Arc;

impl Binder<'_> {
    pub fn bind_statement(&mut self, statement: &Statement) -> BoundStatement {
        match statement {
            Statement::Block(block) => {
                self.push_scope();
                let bound = self.bind_block_statement(block);
                self.pop_scope();
                BoundStatement::Block(bound)
            }
            Statement::VariableDeclaration(decl) => self.bind_variable_declaration(decl),
            Statement::If(statement) => self.bind_if_statement(statement),
            Statement::Return(statement) => self.bind_return_statement(statement),
            Statement::For(statement) => self.bind_for_statement(statement),
            Statement::While(statement) => self.bind_while_statement(statement),
            Statement::FromTo(statement) => self.bind_from_to_statement(statement),
            Statement::Break(statement) => self.bind_break_statement(statement),
            Statement::Continue(statement) => self.bind_continue_statement(statement),
            Statement::Expression(statement) => self.bind_expression_statement(statement),
        }
    }

    /// Bind the statements of `block` into the active scope. Callers that
    /// need a nested scope push it themselves.
    pub fn bind_block_statement(&mut self, block: &BlockStatement) -> BoundBlockStatement {
        let statements = block.statements.iter().map(|s| self.bind_statement(s)).collect();
        BoundBlockStatement {
            statements,
            span: block.span,
        }
    }

    /// `var` declares a local, `set` a global. A declaration needs a type,
    /// an initializer, or both; with both the initializer is converted.
    pub fn bind_variable_declaration(&mut self, decl: &VariableDeclaration) -> BoundStatement {
        let declared = self.bind_type_clause(decl.type_clause.as_ref());
        let initializer = decl.initializer.as_ref().map(|e| self.bind_expression(e));

        let (ty, initializer) = match (declared, initializer) {
            (None, None) => {
                self.report(decl.span, &messages::ILLEGAL_VARIABLE_DECLARATION, &[&decl.name.text]);
                return BoundStatement::error(decl.span);
            }
            (Some(ty), Some(initializer)) => {
                let span = initializer.span;
                let converted = self.bind_conversion(initializer, &ty, false, span);
                (ty, Some(converted))
            }
            (Some(ty), None) => (ty, None),
            (None, Some(initializer)) => (initializer.ty.clone(), Some(initializer)),
        };

        let variable = self.bind_variable_creation(&decl.name, decl.keyword == DeclarationKeyword::Set, false, ty);
        BoundStatement::VariableDeclaration {
            variable,
            initializer,
            span: decl.span,
        }
    }

    /// Create a variable and declare it into the active scope. A name that
    /// is already taken is reported; the new symbol is still returned.
    pub(crate) fn bind_variable_creation(
        &mut self,
        name: &Identifier,
        is_global: bool,
        read_only: bool,
        ty: TypeSymbol,
    ) -> Arc<VariableSymbol> {
        let kind = if is_global { VariableKind::Global } else { VariableKind::Local };
        let variable = Arc::new(VariableSymbol::new(name.text.as_str(), kind, read_only, ty));
        if !self.declare(Symbol::Variable(Arc::clone(&variable))) {
            self.report(name.span, &messages::DUPLICATE_VARIABLE_DECLARATION, &[&name.text]);
        }
        variable
    }

    fn bind_if_statement(&mut self, statement: &IfStatement) -> BoundStatement {
        let condition = self.bind_expression_to(&statement.condition, &TypeSymbol::BOOL);
        let then_statement = self.bind_statement(&statement.then_statement);
        let else_statement = statement.else_statement.as_ref().map(|s| Box::new(self.bind_statement(s)));
        BoundStatement::If {
            condition,
            then_statement: Box::new(then_statement),
            else_statement,
            span: statement.span,
        }
    }

    fn bind_return_statement(&mut self, statement: &ReturnStatement) -> BoundStatement {
        let Some(function) = self.function.clone() else {
            self.report(statement.span, &messages::OUTSIDE_RETURN, &[]);
            return BoundStatement::error(statement.span);
        };

        let expression = match &statement.expression {
            Some(expression) if function.return_type.is_void() => {
                self.report(expression.span(), &messages::VOID_RETURN, &[&function.name]);
                None
            }
            Some(expression) => Some(self.bind_expression_to(expression, &function.return_type)),
            None => None,
        };
        BoundStatement::Return {
            expression,
            span: statement.span,
        }
    }

    // ========================================================================
    // Loops
    // ========================================================================

    fn bind_while_statement(&mut self, statement: &WhileStatement) -> BoundStatement {
        self.push_scope();
        let condition = self.bind_expression_to(&statement.condition, &TypeSymbol::BOOL);
        let (body, break_label, continue_label) = self.bind_loop_body(&statement.body);
        self.pop_scope();
        BoundStatement::While {
            condition,
            body: Box::new(body),
            break_label,
            continue_label,
            span: statement.span,
        }
    }

    fn bind_for_statement(&mut self, statement: &ForStatement) -> BoundStatement {
        self.push_scope();
        let Statement::VariableDeclaration(decl) = statement.initializer.as_ref() else {
            self.report(statement.initializer.span(), &messages::INVALID_FOR_INITIALIZER, &[]);
            self.pop_scope();
            return BoundStatement::error(statement.span);
        };

        let initializer = self.bind_variable_declaration(decl);
        let condition = self.bind_expression_to(&statement.condition, &TypeSymbol::BOOL);
        let update = self.bind_statement(&statement.update);
        let (body, break_label, continue_label) = self.bind_loop_body(&statement.body);
        self.pop_scope();
        BoundStatement::For {
            initializer: Box::new(initializer),
            condition,
            update: Box::new(update),
            body: Box::new(body),
            break_label,
            continue_label,
            span: statement.span,
        }
    }

    /// `from i = lower to upper`: `i` is a read-only int.
    fn bind_from_to_statement(&mut self, statement: &FromToStatement) -> BoundStatement {
        self.push_scope();
        let lower_bound = self.bind_integer_expression(&statement.lower_bound);
        let upper_bound = self.bind_integer_expression(&statement.upper_bound);
        let variable = self.bind_variable_creation(&statement.variable, false, true, TypeSymbol::INT);
        let (body, break_label, continue_label) = self.bind_loop_body(&statement.body);
        self.pop_scope();
        BoundStatement::FromTo {
            variable,
            lower_bound,
            upper_bound,
            body: Box::new(body),
            break_label,
            continue_label,
            span: statement.span,
        }
    }

    /// Bind a loop body with a fresh label pair pushed around it.
    fn bind_loop_body(&mut self, body: &Statement) -> (BoundStatement, BoundLabel, BoundLabel) {
        let (break_label, continue_label) = self.push_labels();
        let body = self.bind_statement(body);
        self.pop_labels();
        (body, break_label, continue_label)
    }

    fn bind_break_statement(&mut self, statement: &BreakStatement) -> BoundStatement {
        match self.break_labels.last() {
            Some(label) => BoundStatement::Goto {
                label: label.clone(),
                span: statement.span,
            },
            None => {
                self.report(statement.span, &messages::OUTSIDE_BREAK, &[]);
                BoundStatement::error(statement.span)
            }
        }
    }

    fn bind_continue_statement(&mut self, statement: &ContinueStatement) -> BoundStatement {
        match self.continue_labels.last() {
            Some(label) => BoundStatement::Goto {
                label: label.clone(),
                span: statement.span,
            },
            None => {
                self.report(statement.span, &messages::OUTSIDE_CONTINUE, &[]);
                BoundStatement::error(statement.span)
            }
        }
    }

    // ========================================================================
    // Expression statements
    // ========================================================================

    /// Only calls and assignments may stand alone. Error expressions pass so
    /// the original failure is not reported twice.
    fn bind_expression_statement(&mut self, statement: &ExpressionStatement) -> BoundStatement {
        let expression = self.bind_expression(&statement.expression);
        let allowed = matches!(
            expression.kind,
            BoundExpressionKind::Error
                | BoundExpressionKind::Call { .. }
                | BoundExpressionKind::TypeCall { .. }
                | BoundExpressionKind::ClassCall { .. }
                | BoundExpressionKind::PackageCall { .. }
                | BoundExpressionKind::Assignment { .. }
                | BoundExpressionKind::ArrayAssignment { .. }
                | BoundExpressionKind::FieldAssignment { .. }
        );
        if !allowed {
            self.report(statement.span, &messages::UNEXPECTED_EXPRESSION_STATEMENT, &[]);
            return BoundStatement::error(statement.span);
        }
        BoundStatement::Expression {
            expression,
            span: statement.span,
        }
    }
}
