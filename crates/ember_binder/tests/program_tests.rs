//! Whole-program binding tests.

use ember_binder::symbol::FunctionSymbol;
use ember_binder::{
    bind_program, BindSession, BoundBlockStatement, BoundExpressionKind, BoundLabel, BoundProgram, BoundStatement,
    Lowerer, TypeSymbol,
};
use ember_diagnostics::{DiagnosticCollection, ErrorKind};
use ember_syntax::build::*;
use ember_syntax::{BinaryOperatorKind, CompilationUnit, Member};
use std::cell::RefCell;
use std::rc::Rc;

/// Helper: bind a unit with a fresh session.
fn bind(unit: &CompilationUnit) -> (BoundProgram, DiagnosticCollection) {
    let mut session = BindSession::new();
    let program = bind_program(&mut session, unit);
    (program, session.take_diagnostics())
}

/// Records which functions were lowered and marks every lowered body with
/// a trailing `lowered` label.
struct RecordingLowerer {
    seen: Rc<RefCell<Vec<String>>>,
}

impl Lowerer for RecordingLowerer {
    fn lower(&mut self, function: &FunctionSymbol, mut body: BoundBlockStatement) -> BoundBlockStatement {
        self.seen.borrow_mut().push(function.name.clone());
        let span = body.span;
        body.statements.push(BoundStatement::Label {
            label: BoundLabel::new("lowered"),
            span,
        });
        body
    }
}

fn increment() -> ember_syntax::Expression {
    lambda(
        vec![param("x", ty("int"))],
        Some(ty("int")),
        vec![return_stmt(Some(binary(name("x"), BinaryOperatorKind::Plus, int(1))))],
    )
}

/// A small program touching every kind of member.
fn sample_program() -> CompilationUnit {
    let counter = class(
        "Counter",
        vec![
            global(set("value", int(0))),
            public_function(
                "Bump",
                vec![param("by", ty("int"))],
                Some(ty("int")),
                vec![
                    expr_stmt(assign("value", binary(name("value"), BinaryOperatorKind::Plus, name("by")))),
                    return_stmt(Some(name("value"))),
                ],
            )
            .into(),
        ],
    );
    let twice = function(
        "twice",
        vec![param("n", ty("int"))],
        Some(ty("int")),
        vec![return_stmt(Some(binary(name("n"), BinaryOperatorKind::Star, int(2))))],
    );

    let mut members: Vec<Member> = vec![
        global(var("c", make("Counter", vec![]))),
        global(var("total", call("twice", vec![type_call(name("c"), "Bump", vec![int(3)])]))),
        enumeration("Mode", &[("Off", None), ("On", None)]).into(),
        structure("Pair", vec![param("a", ty("int")), param("b", ty("string"))]).into(),
        counter.into(),
        twice.into(),
    ];
    members.extend(
        vec![
            var("p", make_struct("Pair", vec![int(1), string("x")])),
            var("m", field(name("Mode"), "On")),
            var("step", increment()),
            if_stmt(
                binary(name("total"), BinaryOperatorKind::Greater, int(2)),
                block(vec![expr_stmt(call("Print", vec![string("big")]))]),
                Some(block(vec![expr_stmt(call("Print", vec![call("string", vec![name("total")])]))])),
            ),
            from_to(
                "i",
                int(0),
                int(3),
                block(vec![expr_stmt(assign(
                    "total",
                    binary(name("total"), BinaryOperatorKind::Plus, name("i")),
                ))]),
            ),
        ]
        .into_iter()
        .map(global),
    );
    unit(members)
}

// ============================================================================
// Whole programs
// ============================================================================

#[test]
fn test_well_formed_program_has_no_error_types() {
    let (program, diagnostics) = bind(&sample_program());
    assert!(diagnostics.is_empty(), "Expected no diagnostics, got {:?}", diagnostics.kinds());

    let mut visited = 0;
    program.for_each_expression(&mut |expression| {
        visited += 1;
        assert!(
            !expression.ty.contains_error(),
            "Expected no error types, got {:?}",
            expression.kind
        );
    });
    assert!(visited > 20, "Expected to visit every expression, got {}", visited);

    assert_eq!(program.functions.len(), 1);
    assert_eq!(program.classes.len(), 1);
    assert_eq!(program.structs.len(), 1);
    assert_eq!(program.enums.len(), 1);
    assert_eq!(program.main.body.statements.len(), 7);
}

#[test]
fn test_main_is_public_and_void() {
    let (program, _) = bind(&sample_program());
    let main = &program.main.symbol;
    assert_eq!(main.name, "main");
    assert!(main.is_public);
    assert_eq!(main.return_type, TypeSymbol::VOID);
    assert!(main.parameters.is_empty());
}

#[test]
fn test_errors_do_not_stop_binding() {
    let unit = unit(vec![
        global(var("a", name("missing"))),
        function("f", vec![param("x", ty("Nope"))], None, vec![break_stmt()]).into(),
        global(var("b", int(1))),
        class("C", vec![global(var("local", int(1)))]).into(),
    ]);
    let (program, diagnostics) = bind(&unit);
    assert_eq!(diagnostics.error_count(), 4, "Expected 4 errors, got {:?}", diagnostics.kinds());
    assert!(diagnostics.contains(ErrorKind::UnknownDataType));
    assert!(diagnostics.contains(ErrorKind::OutsideBreak));

    assert_eq!(program.main.body.statements.len(), 2);
    assert_eq!(program.functions.len(), 1);
    assert_eq!(program.classes.len(), 1);
    assert!(program.functions[0].symbol.parameters[0].ty.is_error());
}

#[test]
fn test_labels_restart_in_every_function() {
    let looping = || vec![while_stmt(boolean(true), block(vec![break_stmt()]))];
    let (program, diagnostics) = bind(&unit(vec![
        function("a", vec![], None, looping()).into(),
        function("b", vec![], None, looping()).into(),
    ]));
    assert!(diagnostics.is_empty());
    for function in &program.functions {
        let BoundStatement::While { break_label, .. } = &function.body.statements[0] else {
            panic!("Expected a while loop in {}", function.symbol.name);
        };
        assert_eq!(break_label.name(), "break1");
    }
}

// ============================================================================
// Lowering
// ============================================================================

#[test]
fn test_only_lambdas_are_lowered_while_binding() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut session = BindSession::new().with_lowerer(RecordingLowerer { seen: Rc::clone(&seen) });
    let unit = unit(vec![
        function("f", vec![], None, vec![var("inner", increment())]).into(),
        global(var("outer", increment())),
    ]);
    let program = bind_program(&mut session, &unit);
    assert!(session.diagnostics.is_empty(), "got {:?}", session.diagnostics.kinds());

    assert_eq!(*seen.borrow(), ["$lambda0", "$lambda1"]);

    let BoundStatement::VariableDeclaration {
        initializer: Some(outer),
        ..
    } = &program.main.body.statements[0]
    else {
        panic!("Expected a declaration");
    };
    let BoundExpressionKind::Lambda { function, body } = &outer.kind else {
        panic!("Expected a lambda, got {:?}", outer.kind);
    };
    assert_eq!(function.name, "$lambda0");
    assert!(matches!(body.statements.last(), Some(BoundStatement::Label { label, .. }) if label.name() == "lowered"));

    // Function bodies are left for the lowering pass.
    let f_body = &program.functions[0].body.statements;
    assert!(!f_body.iter().any(|s| matches!(s, BoundStatement::Label { .. })));
}

#[test]
fn test_lambda_type_is_an_action() {
    let (program, diagnostics) = bind(&unit(vec![global(var("step", increment()))]));
    assert!(diagnostics.is_empty());
    let BoundStatement::VariableDeclaration { variable, .. } = &program.main.body.statements[0] else {
        panic!("Expected a declaration");
    };
    assert_eq!(variable.ty, TypeSymbol::action(vec![TypeSymbol::INT], TypeSymbol::INT));
}
