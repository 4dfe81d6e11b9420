//! ember_lowerer: Control-flow lowering of bound function bodies.
//!
//! Rewrites structured statements into a flat list of labels, gotos and
//! conditional gotos:
//! - Nested blocks are flattened
//! - `if` / `else` become conditional jumps over each branch
//! - `while`, `for` and `from-to` become a body label, the loop's continue
//!   label and a conditional jump back to the body
//!
//! Loops keep the break/continue labels the binder generated, so the gotos
//! bound for `break` and `continue` need no rewriting. Ternaries stay
//! expressions.

use ember_binder::bound::BoundFunction;
use ember_binder::operators::BoundBinaryOperator;
use ember_binder::symbol::{FunctionSymbol, VariableSymbol};
use ember_binder::{
    BoundBlockStatement, BoundExpression, BoundExpressionKind, BoundLabel, BoundProgram, BoundStatement, Lowerer,
};
use ember_core::text::TextSpan;
use ember_syntax::{BinaryOperatorKind, LiteralValue};
use std::sync::Arc;

/// Lowers one function body at a time. Generated labels (`label{n}`) and
/// temporaries (`$upper{n}`) are numbered per body.
#[derive(Debug, Default)]
pub struct FlowLowerer {
    label_counter: usize,
    temporary_counter: usize,
}

impl FlowLowerer {
    pub fn new() -> Self {
        Self::default()
    }

    fn generate_label(&mut self) -> BoundLabel {
        self.label_counter += 1;
        BoundLabel::new(format!("label{}", self.label_counter))
    }

    fn lower_statement(&mut self, statement: BoundStatement, out: &mut Vec<BoundStatement>) {
        match statement {
            BoundStatement::Block(block) => {
                for statement in block.statements {
                    self.lower_statement(statement, out);
                }
            }
            BoundStatement::If {
                condition,
                then_statement,
                else_statement,
                span,
            } => self.lower_if(condition, *then_statement, else_statement.map(|s| *s), span, out),
            BoundStatement::While {
                condition,
                body,
                break_label,
                continue_label,
                span,
            } => {
                // goto continue; body: <body>; continue: if cond goto body; break:
                let body_label = self.generate_label();
                out.push(goto(continue_label.clone(), span));
                out.push(label(body_label.clone(), span));
                self.lower_statement(*body, out);
                out.push(label(continue_label, span));
                out.push(goto_if(body_label, condition, true, span));
                out.push(label(break_label, span));
            }
            BoundStatement::For {
                initializer,
                condition,
                update,
                body,
                break_label,
                continue_label,
                span,
            } => {
                let body_label = self.generate_label();
                let check_label = self.generate_label();
                self.lower_statement(*initializer, out);
                out.push(goto(check_label.clone(), span));
                out.push(label(body_label.clone(), span));
                self.lower_statement(*body, out);
                out.push(label(continue_label, span));
                self.lower_statement(*update, out);
                out.push(label(check_label, span));
                out.push(goto_if(body_label, condition, true, span));
                out.push(label(break_label, span));
            }
            BoundStatement::FromTo {
                variable,
                lower_bound,
                upper_bound,
                body,
                break_label,
                continue_label,
                span,
            } => {
                let operators = (
                    BoundBinaryOperator::bind(BinaryOperatorKind::Plus, &variable.ty, &variable.ty),
                    BoundBinaryOperator::bind(BinaryOperatorKind::LessEquals, &variable.ty, &upper_bound.ty),
                );
                let (Some(step), Some(check)) = operators else {
                    tracing::warn!(variable = %variable.name, ty = %variable.ty, "from-to over a non-numeric variable left unlowered");
                    out.push(BoundStatement::FromTo {
                        variable,
                        lower_bound,
                        upper_bound,
                        body,
                        break_label,
                        continue_label,
                        span,
                    });
                    return;
                };
                self.lower_from_to(
                    FromTo {
                        variable,
                        lower_bound,
                        upper_bound,
                        body: *body,
                        break_label,
                        continue_label,
                        span,
                    },
                    step,
                    check,
                    out,
                );
            }
            other => out.push(other),
        }
    }

    fn lower_if(
        &mut self,
        condition: BoundExpression,
        then_statement: BoundStatement,
        else_statement: Option<BoundStatement>,
        span: TextSpan,
        out: &mut Vec<BoundStatement>,
    ) {
        let end_label = self.generate_label();
        match else_statement {
            None => {
                out.push(goto_if(end_label.clone(), condition, false, span));
                self.lower_statement(then_statement, out);
                out.push(label(end_label, span));
            }
            Some(else_statement) => {
                let else_label = self.generate_label();
                out.push(goto_if(else_label.clone(), condition, false, span));
                self.lower_statement(then_statement, out);
                out.push(goto(end_label.clone(), span));
                out.push(label(else_label, span));
                self.lower_statement(else_statement, out);
                out.push(label(end_label, span));
            }
        }
    }

    /// Both bounds are inclusive. The upper bound is evaluated once, into a
    /// temporary, before the first iteration.
    fn lower_from_to(
        &mut self,
        from_to: FromTo,
        step: BoundBinaryOperator,
        check: BoundBinaryOperator,
        out: &mut Vec<BoundStatement>,
    ) {
        let FromTo {
            variable,
            lower_bound,
            upper_bound,
            body,
            break_label,
            continue_label,
            span,
        } = from_to;

        let upper = Arc::new(VariableSymbol::local(
            format!("$upper{}", self.temporary_counter),
            upper_bound.ty.clone(),
        ));
        self.temporary_counter += 1;

        out.push(BoundStatement::VariableDeclaration {
            variable: Arc::clone(&variable),
            initializer: Some(lower_bound),
            span,
        });
        out.push(BoundStatement::VariableDeclaration {
            variable: Arc::clone(&upper),
            initializer: Some(upper_bound),
            span,
        });

        let body_label = self.generate_label();
        let check_label = self.generate_label();
        out.push(goto(check_label.clone(), span));
        out.push(label(body_label.clone(), span));
        self.lower_statement(body, out);
        out.push(label(continue_label, span));

        let one = BoundExpression::new(
            BoundExpressionKind::Literal(LiteralValue::Int(1)),
            variable.ty.clone(),
            span,
        );
        let incremented = binary(variable_expression(&variable, span), step, one, span);
        out.push(BoundStatement::Expression {
            expression: BoundExpression::new(
                BoundExpressionKind::Assignment {
                    variable: Arc::clone(&variable),
                    value: Box::new(incremented),
                },
                variable.ty.clone(),
                span,
            ),
            span,
        });

        out.push(label(check_label, span));
        let condition = binary(variable_expression(&variable, span), check, variable_expression(&upper, span), span);
        out.push(goto_if(body_label, condition, true, span));
        out.push(label(break_label, span));
    }
}

impl Lowerer for FlowLowerer {
    #[tracing::instrument(level = "debug", skip_all, fields(function = %function.name))]
    fn lower(&mut self, function: &FunctionSymbol, body: BoundBlockStatement) -> BoundBlockStatement {
        self.label_counter = 0;
        self.temporary_counter = 0;

        let mut statements = Vec::with_capacity(body.statements.len());
        for statement in body.statements {
            self.lower_statement(statement, &mut statements);
        }
        tracing::debug!(statements = statements.len(), labels = self.label_counter, "lowered body");
        BoundBlockStatement {
            statements,
            span: body.span,
        }
    }
}

/// Lower every body of `program` that the binder left structured: `main`,
/// free functions and class methods. Lambda bodies are lowered while
/// binding and are not visited again.
pub fn lower_program(program: &mut BoundProgram) {
    let mut lowerer = FlowLowerer::new();
    for function in program.bodies_mut() {
        lower_function(&mut lowerer, function);
    }
}

fn lower_function(lowerer: &mut FlowLowerer, function: &mut BoundFunction) {
    let body = std::mem::take(&mut function.body);
    function.body = lowerer.lower(&function.symbol, body);
}

/// A from-to loop taken apart.
struct FromTo {
    variable: Arc<VariableSymbol>,
    lower_bound: BoundExpression,
    upper_bound: BoundExpression,
    body: BoundStatement,
    break_label: BoundLabel,
    continue_label: BoundLabel,
    span: TextSpan,
}

fn label(label: BoundLabel, span: TextSpan) -> BoundStatement {
    BoundStatement::Label { label, span }
}

fn goto(label: BoundLabel, span: TextSpan) -> BoundStatement {
    BoundStatement::Goto { label, span }
}

fn goto_if(label: BoundLabel, condition: BoundExpression, jump_if_true: bool, span: TextSpan) -> BoundStatement {
    BoundStatement::ConditionalGoto {
        label,
        condition,
        jump_if_true,
        span,
    }
}

fn variable_expression(variable: &Arc<VariableSymbol>, span: TextSpan) -> BoundExpression {
    BoundExpression::new(BoundExpressionKind::Variable(Arc::clone(variable)), variable.ty.clone(), span)
}

fn binary(
    left: BoundExpression,
    operator: BoundBinaryOperator,
    right: BoundExpression,
    span: TextSpan,
) -> BoundExpression {
    let ty = operator.result_type.clone();
    BoundExpression::new(
        BoundExpressionKind::Binary {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        },
        ty,
        span,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_binder::TypeSymbol;

    #[test]
    fn test_labels_restart_per_body() {
        let mut lowerer = FlowLowerer::new();
        lowerer.generate_label();
        lowerer.generate_label();
        let function = FunctionSymbol::new(
            "f",
            Vec::new(),
            TypeSymbol::VOID,
            ember_binder::symbol::FunctionKind::User,
            TextSpan::default(),
        );
        lowerer.lower(&function, BoundBlockStatement::default());
        assert_eq!(lowerer.generate_label().name(), "label1");
    }
}
