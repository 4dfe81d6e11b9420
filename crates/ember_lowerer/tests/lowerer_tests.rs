//! Control-flow lowering tests.

use ember_binder::{bind_program, BindSession, BoundExpressionKind, BoundProgram, BoundStatement};
use ember_lowerer::{lower_program, FlowLowerer};
use ember_syntax::build::*;
use ember_syntax::{BinaryOperatorKind, Member, Statement};
use std::collections::HashSet;

/// Helper: bind members, check they bound cleanly, and lower the program.
fn bind_and_lower(members: Vec<Member>) -> BoundProgram {
    let mut session = BindSession::new();
    let mut program = bind_program(&mut session, &unit(members));
    assert!(
        session.diagnostics.is_empty(),
        "Expected no diagnostics, got {:?}",
        session.diagnostics.kinds()
    );
    lower_program(&mut program);
    program
}

fn lower_function_body(body: Vec<Statement>) -> Vec<BoundStatement> {
    let mut program = bind_and_lower(vec![function("f", vec![], None, body).into()]);
    program.functions.remove(0).body.statements
}

fn is_structured(statement: &BoundStatement) -> bool {
    matches!(
        statement,
        BoundStatement::Block(_)
            | BoundStatement::If { .. }
            | BoundStatement::While { .. }
            | BoundStatement::For { .. }
            | BoundStatement::FromTo { .. }
    )
}

/// Compact rendering of the control-flow skeleton of a lowered body.
fn shape(statements: &[BoundStatement]) -> Vec<String> {
    statements
        .iter()
        .map(|statement| match statement {
            BoundStatement::Label { label, .. } => format!("{}:", label),
            BoundStatement::Goto { label, .. } => format!("goto {}", label),
            BoundStatement::ConditionalGoto {
                label, jump_if_true, ..
            } => format!("goto {} if {}", label, jump_if_true),
            BoundStatement::VariableDeclaration { variable, .. } => format!("var {}", variable.name),
            BoundStatement::Expression { .. } => "expr".to_string(),
            BoundStatement::Return { .. } => "return".to_string(),
            other => format!("{:?}", other),
        })
        .collect()
}

fn print(text: &str) -> Statement {
    expr_stmt(call("Print", vec![string(text)]))
}

// ============================================================================
// Statement shapes
// ============================================================================

#[test]
fn test_blocks_are_flattened() {
    let statements = lower_function_body(vec![block(vec![print("a"), block(vec![print("b")])]), print("c")]);
    assert_eq!(shape(&statements), ["expr", "expr", "expr"]);
}

#[test]
fn test_if_without_else() {
    let statements = lower_function_body(vec![if_stmt(boolean(true), block(vec![print("yes")]), None)]);
    assert_eq!(shape(&statements), ["goto label1 if false", "expr", "label1:"]);
}

#[test]
fn test_if_with_else() {
    let statements = lower_function_body(vec![if_stmt(
        boolean(true),
        block(vec![print("yes")]),
        Some(block(vec![print("no")])),
    )]);
    assert_eq!(
        shape(&statements),
        ["goto label2 if false", "expr", "goto label1", "label2:", "expr", "label1:"]
    );
}

#[test]
fn test_while_keeps_binder_labels() {
    let statements = lower_function_body(vec![while_stmt(boolean(true), block(vec![break_stmt()]))]);
    assert_eq!(
        shape(&statements),
        [
            "goto continue1",
            "label1:",
            "goto break1",
            "continue1:",
            "goto label1 if true",
            "break1:",
        ]
    );
}

#[test]
fn test_for_runs_update_after_continue() {
    let statements = lower_function_body(vec![for_stmt(
        var("i", int(0)),
        binary(name("i"), BinaryOperatorKind::Less, int(3)),
        expr_stmt(edit("i", BinaryOperatorKind::Plus, None)),
        block(vec![continue_stmt()]),
    )]);
    assert_eq!(
        shape(&statements),
        [
            "var i",
            "goto label2",
            "label1:",
            "goto continue1",
            "continue1:",
            "expr",
            "label2:",
            "goto label1 if true",
            "break1:",
        ]
    );
}

#[test]
fn test_from_to_evaluates_upper_bound_once() {
    let statements = lower_function_body(vec![from_to("i", int(1), int(5), block(vec![print("tick")]))]);
    assert_eq!(
        shape(&statements),
        [
            "var i",
            "var $upper0",
            "goto label2",
            "label1:",
            "expr",
            "continue1:",
            "expr",
            "label2:",
            "goto label1 if true",
            "break1:",
        ]
    );

    let BoundStatement::Expression { expression, .. } = &statements[6] else {
        panic!("Expected the increment, got {:?}", statements[6]);
    };
    let BoundExpressionKind::Assignment { variable, .. } = &expression.kind else {
        panic!("Expected an assignment, got {:?}", expression.kind);
    };
    assert_eq!(variable.name, "i");
}

#[test]
fn test_nested_loops_stay_distinct() {
    let statements = lower_function_body(vec![while_stmt(
        boolean(true),
        block(vec![while_stmt(boolean(false), block(vec![continue_stmt()])), break_stmt()]),
    )]);
    let rendered = shape(&statements);
    assert!(rendered.contains(&"continue2:".to_string()));
    assert!(rendered.contains(&"goto continue2".to_string()));
    assert!(rendered.contains(&"goto break1".to_string()));
}

// ============================================================================
// Programs
// ============================================================================

#[test]
fn test_every_body_is_lowered_and_every_jump_lands() {
    let program = bind_and_lower(vec![
        class(
            "Counter",
            vec![
                global(set("value", int(0))),
                public_function(
                    "Spin",
                    vec![param("n", ty("int"))],
                    None,
                    vec![from_to("k", int(0), name("n"), block(vec![expr_stmt(assign("value", name("k")))]))],
                )
                .into(),
            ],
        )
        .into(),
        function(
            "loop",
            vec![],
            None,
            vec![while_stmt(
                boolean(true),
                block(vec![if_stmt(boolean(false), block(vec![break_stmt()]), Some(block(vec![continue_stmt()])))]),
            )],
        )
        .into(),
        global(var("c", make("Counter", vec![]))),
        global(if_stmt(boolean(true), block(vec![print("main")]), None)),
    ]);

    for function in program.bodies() {
        let statements = &function.body.statements;
        assert!(
            !statements.iter().any(is_structured),
            "Expected {} to be flat, got {:?}",
            function.symbol.name,
            shape(statements)
        );

        let labels: HashSet<&str> = statements
            .iter()
            .filter_map(|s| match s {
                BoundStatement::Label { label, .. } => Some(label.name()),
                _ => None,
            })
            .collect();
        for statement in statements {
            if let BoundStatement::Goto { label, .. } | BoundStatement::ConditionalGoto { label, .. } = statement {
                assert!(
                    labels.contains(label.name()),
                    "Expected label {} in {}",
                    label,
                    function.symbol.name
                );
            }
        }
    }
}

#[test]
fn test_lambda_bodies_are_lowered_while_binding() {
    let mut session = BindSession::new().with_lowerer(FlowLowerer::new());
    let body = vec![
        while_stmt(boolean(true), block(vec![break_stmt()])),
        return_stmt(Some(name("x"))),
    ];
    let program = bind_program(
        &mut session,
        &unit(vec![global(var("f", lambda(vec![param("x", ty("int"))], Some(ty("int")), body)))]),
    );
    assert!(session.diagnostics.is_empty(), "got {:?}", session.diagnostics.kinds());

    let BoundStatement::VariableDeclaration {
        initializer: Some(initializer),
        ..
    } = &program.main.body.statements[0]
    else {
        panic!("Expected a declaration");
    };
    let BoundExpressionKind::Lambda { body, .. } = &initializer.kind else {
        panic!("Expected a lambda, got {:?}", initializer.kind);
    };
    assert!(!body.statements.iter().any(is_structured));
    assert_eq!(shape(&body.statements).last().map(String::as_str), Some("return"));
}
