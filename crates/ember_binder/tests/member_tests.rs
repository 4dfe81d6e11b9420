//! Member binding tests: functions, classes, structs, enums and packages.

use ember_binder::symbol::Symbol;
use ember_binder::{
    bind_program, BindSession, BoundExpressionKind, BoundProgram, BoundStatement, PackageRegistry, TypeSymbol,
};
use ember_diagnostics::{DiagnosticCollection, ErrorKind, Stage};
use ember_syntax::build::*;
use ember_syntax::{Member, Statement};

const NET: &str = r#"{
    "name": "net",
    "classes": [
        {
            "name": "Socket",
            "fields": [ { "name": "Port", "type": "int" } ],
            "functions": [
                { "name": "Send", "parameters": [ { "name": "data", "type": "string" } ], "returnType": "bool" },
                { "name": "Reset", "isPublic": false }
            ]
        }
    ],
    "functions": [
        { "name": "Connect", "parameters": [ { "name": "host", "type": "string" } ], "returnType": "Socket" },
        { "name": "Secret", "isPublic": false }
    ]
}"#;

/// Helper: bind top-level members and return the program plus diagnostics.
fn bind_members(members: Vec<Member>) -> (BoundProgram, DiagnosticCollection) {
    bind_with_session(BindSession::new(), members)
}

fn bind_with_session(mut session: BindSession, members: Vec<Member>) -> (BoundProgram, DiagnosticCollection) {
    let program = bind_program(&mut session, &unit(members));
    (program, session.take_diagnostics())
}

/// A session that can load the `net` package.
fn net_session() -> BindSession {
    let mut registry = PackageRegistry::new();
    registry.register_manifest(NET).expect("valid manifest");
    BindSession::new().with_resolver(registry)
}

fn assert_clean(diagnostics: &DiagnosticCollection) {
    assert!(diagnostics.is_empty(), "Expected no diagnostics, got {:?}", diagnostics.kinds());
}

fn assert_only(diagnostics: &DiagnosticCollection, kind: ErrorKind) {
    assert_eq!(diagnostics.kinds(), vec![kind], "Expected exactly one {}, got {:?}", kind, diagnostics.kinds());
}

fn globals(statements: Vec<Statement>) -> impl Iterator<Item = Member> {
    statements.into_iter().map(global)
}

// ============================================================================
// Functions
// ============================================================================

#[test]
fn test_duplicate_parameters_keep_positions() {
    let (program, diagnostics) = bind_members(vec![function(
        "f",
        vec![param("a", ty("int")), param("a", ty("string")), param("b", ty("bool"))],
        None,
        vec![],
    )
    .into()]);
    assert_only(&diagnostics, ErrorKind::DuplicateParameter);

    let parameters = &program.functions[0].symbol.parameters;
    assert_eq!(parameters.len(), 3, "Expected 3 parameters, got {}", parameters.len());
    assert_eq!(parameters[1].name, "$P1");
    assert!(parameters[1].ty.is_error());
    assert_eq!(parameters[2].name, "b");
    assert_eq!(parameters[2].ordinal, 2);
}

#[test]
fn test_duplicate_function_keeps_first() {
    let mut members: Vec<Member> = vec![
        function("f", vec![], Some(ty("int")), vec![return_stmt(Some(int(1)))]).into(),
        function("f", vec![], Some(ty("string")), vec![return_stmt(Some(string("x")))]).into(),
    ];
    members.extend(globals(vec![var("r", call("f", vec![]))]));
    let (program, diagnostics) = bind_members(members);
    assert_only(&diagnostics, ErrorKind::DuplicateFunction);
    assert_eq!(program.functions.len(), 1);
    assert_eq!(program.functions[0].symbol.return_type, TypeSymbol::INT);
}

#[test]
fn test_main_is_reserved() {
    let (program, diagnostics) = bind_members(vec![function("main", vec![], None, vec![]).into()]);
    assert_only(&diagnostics, ErrorKind::IllegalFunctionSignature);
    assert!(program.functions.is_empty());
}

#[test]
fn test_functions_are_visible_before_declaration() {
    let (_, diagnostics) = bind_members(vec![
        function("first", vec![], None, vec![expr_stmt(call("second", vec![int(1)]))]).into(),
        function("second", vec![param("n", ty("int"))], None, vec![]).into(),
    ]);
    assert_clean(&diagnostics);
}

#[test]
fn test_unknown_parameter_type() {
    let (_, diagnostics) = bind_members(vec![function("f", vec![param("w", ty("Widget"))], None, vec![]).into()]);
    assert_only(&diagnostics, ErrorKind::UnknownDataType);
}

#[test]
fn test_array_type_needs_one_subtype() {
    let (_, diagnostics) = bind_members(vec![function(
        "f",
        vec![param("m", ty_of("array", vec![ty("int"), ty("int")]))],
        None,
        vec![],
    )
    .into()]);
    assert_only(&diagnostics, ErrorKind::InvalidNumberOfSubtypes);
}

// ============================================================================
// Classes
// ============================================================================

#[test]
fn test_class_gets_synthesized_constructor() {
    let (program, diagnostics) = bind_members(vec![
        class("C", vec![global(set("count", int(0)))]).into(),
        global(var("ok", make("C", vec![]))),
        global(var("bad", make("C", vec![int(1)]))),
    ]);
    assert_only(&diagnostics, ErrorKind::BadNumberOfParameters);

    let class = &program.classes[0];
    assert!(class.symbol.constructor().is_some());
    assert_eq!(class.methods.len(), 1);
    assert_eq!(class.field_initializers.len(), 1);
    assert_eq!(class.symbol.fields[0].name, "count");
}

#[test]
fn test_explicit_constructor_arguments() {
    let (_, diagnostics) = bind_members(vec![
        class(
            "Point",
            vec![
                global(set_typed("x", ty("int"), None)),
                function("Constructor", vec![param("v", ty("int"))], None, vec![expr_stmt(assign("x", name("v")))])
                    .into(),
            ],
        )
        .into(),
        global(var("p", make("Point", vec![int(3)]))),
    ]);
    assert_clean(&diagnostics);
}

#[test]
fn test_public_constructor_is_rejected() {
    let (_, diagnostics) = bind_members(vec![class(
        "C",
        vec![public_function("Constructor", vec![], None, vec![]).into()],
    )
    .into()]);
    assert_only(&diagnostics, ErrorKind::IllegalFunctionSignature);
}

#[test]
fn test_class_body_placement_rules() {
    let mut printf = external("printf", vec![], None);
    printf.is_variadic = true;
    let (_, diagnostics) = bind_members(vec![class(
        "C",
        vec![
            global(var("local", int(1))),
            global(expr_stmt(call("Print", vec![string("x")]))),
            class("Inner", vec![]).into(),
            printf.into(),
        ],
    )
    .into()]);
    assert_eq!(
        diagnostics.kinds(),
        vec![
            ErrorKind::IllegalNestedClasses,
            ErrorKind::InvalidExternalFunctionPlacement,
            ErrorKind::InvalidStatementPlacement,
            ErrorKind::InvalidStatementPlacement,
        ]
    );
}

#[test]
fn test_objects_cannot_be_made_while_declaring_a_class() {
    let (_, diagnostics) = bind_members(vec![
        class("A", vec![]).into(),
        class("B", vec![global(set("a", make("A", vec![])))]).into(),
    ]);
    assert_only(&diagnostics, ErrorKind::OutsideConstructorCall);
}

#[test]
fn test_class_can_refer_to_itself_and_later_types() {
    let (program, diagnostics) = bind_members(vec![
        class(
            "Node",
            vec![
                global(set_typed("next", ty("Node"), None)),
                global(set_typed("tag", ty("Tag"), None)),
            ],
        )
        .into(),
        structure("Tag", vec![param("id", ty("int"))]).into(),
    ]);
    assert_clean(&diagnostics);
    let fields = &program.classes[0].symbol.fields;
    assert_eq!(fields[0].ty, TypeSymbol::class("Node", None));
    assert_eq!(fields[1].ty, TypeSymbol::structure("Tag"));
}

#[test]
fn test_methods_see_fields_functions_and_this() {
    let (_, diagnostics) = bind_members(vec![
        class(
            "Counter",
            vec![
                global(set("value", int(0))),
                public_function(
                    "Bump",
                    vec![],
                    Some(ty("int")),
                    vec![
                        expr_stmt(call("Touch", vec![])),
                        expr_stmt(field_assign(this(), "value", int(1))),
                        return_stmt(Some(name("value"))),
                    ],
                )
                .into(),
                function("Touch", vec![], None, vec![]).into(),
            ],
        )
        .into(),
        global(var("c", make("Counter", vec![]))),
        global(var("n", type_call(name("c"), "Bump", vec![]))),
        global(var("v", field(name("c"), "value"))),
    ]);
    assert_clean(&diagnostics);
}

#[test]
fn test_private_methods_are_private_to_their_class() {
    let (_, diagnostics) = bind_members(vec![
        class(
            "Vault",
            vec![
                function("Open", vec![], None, vec![]).into(),
                public_function(
                    "Check",
                    vec![param("other", ty("Vault"))],
                    None,
                    vec![expr_stmt(type_call(name("other"), "Open", vec![]))],
                )
                .into(),
            ],
        )
        .into(),
        global(var("v", make("Vault", vec![]))),
        global(expr_stmt(type_call(name("v"), "Open", vec![]))),
    ]);
    assert_only(&diagnostics, ErrorKind::FunctionAccessViolation);
}

#[test]
fn test_class_cannot_call_its_own_constructor() {
    let (_, diagnostics) = bind_members(vec![class(
        "Loop",
        vec![
            function("Constructor", vec![], None, vec![]).into(),
            public_function("Again", vec![], None, vec![expr_stmt(call("Constructor", vec![]))]).into(),
            public_function("Ref", vec![], None, vec![var("f", name("Constructor"))]).into(),
        ],
    )
    .into()]);
    assert_eq!(diagnostics.count_of(ErrorKind::IllegalConstructorCall), 2, "got {:?}", diagnostics.kinds());
    assert_eq!(diagnostics.len(), 2);
}

#[test]
fn test_method_reference_is_class_bound() {
    let (program, diagnostics) = bind_members(vec![class(
        "Button",
        vec![
            function("OnClick", vec![], None, vec![]).into(),
            function("Wire", vec![], None, vec![var("handler", name("OnClick"))]).into(),
        ],
    )
    .into()]);
    assert_clean(&diagnostics);
    let wire = program.classes[0]
        .methods
        .iter()
        .find(|m| m.symbol.name == "Wire")
        .expect("Wire method");
    let BoundStatement::VariableDeclaration {
        initializer: Some(handler),
        ..
    } = &wire.body.statements[0]
    else {
        panic!("Expected a declaration");
    };
    assert!(matches!(handler.kind, BoundExpressionKind::FunctionInClass { .. }));
}

#[test]
fn test_unknown_class_and_field() {
    let (_, diagnostics) = bind_members(vec![global(var("x", make("Ghost", vec![])))]);
    assert_only(&diagnostics, ErrorKind::UnknownClass);

    let (_, diagnostics) = bind_members(vec![
        class("C", vec![]).into(),
        global(var("c", make("C", vec![]))),
        global(var("y", field(name("c"), "missing"))),
    ]);
    assert_only(&diagnostics, ErrorKind::UnknownField);
}

#[test]
fn test_type_name_collision() {
    let (_, diagnostics) = bind_members(vec![
        structure("Thing", vec![]).into(),
        class("Thing", vec![]).into(),
    ]);
    assert_only(&diagnostics, ErrorKind::DuplicateFunction);
}

// ============================================================================
// Structs
// ============================================================================

#[test]
fn test_struct_creation_and_fields() {
    let (program, diagnostics) = bind_members(vec![
        structure("Pair", vec![param("a", ty("int")), param("b", ty("string"))]).into(),
        global(var("p", make_struct("Pair", vec![int(1)]))),
        global(var("b", field(name("p"), "b"))),
        global(expr_stmt(field_assign(name("p"), "a", int(2)))),
    ]);
    assert_clean(&diagnostics);
    assert_eq!(program.structs[0].fields.len(), 2);
    assert!(program.structs[0].fields.iter().all(|f| f.is_global()));
}

#[test]
fn test_struct_errors() {
    let (_, diagnostics) = bind_members(vec![structure("S", vec![param("a", ty("int")), param("a", ty("int"))]).into()]);
    assert_only(&diagnostics, ErrorKind::DuplicateField);

    let (_, diagnostics) = bind_members(vec![
        structure("S", vec![param("a", ty("int"))]).into(),
        global(var("s", make_struct("S", vec![int(1), int(2)]))),
    ]);
    assert_only(&diagnostics, ErrorKind::TooManyStructParameters);

    let (_, diagnostics) = bind_members(vec![global(var("s", make_struct("Nope", vec![])))]);
    assert_only(&diagnostics, ErrorKind::UnknownStruct);
}

// ============================================================================
// Enums
// ============================================================================

#[test]
fn test_enum_values_count_from_last_explicit() {
    let (program, diagnostics) =
        bind_members(vec![enumeration("Color", &[("Red", None), ("Green", Some(5)), ("Blue", None)]).into()]);
    assert_clean(&diagnostics);
    let values: Vec<i32> = program.enums[0].values.values().copied().collect();
    assert_eq!(values, [0, 5, 6]);
}

#[test]
fn test_enum_duplicate_value_is_skipped() {
    let (program, diagnostics) =
        bind_members(vec![enumeration("E", &[("A", None), ("B", Some(0)), ("C", None)]).into()]);
    assert_only(&diagnostics, ErrorKind::DuplicateEnumValue);
    let values: Vec<(&str, i32)> = program.enums[0].values.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    assert_eq!(values, [("A", 0), ("C", 1)]);
}

#[test]
fn test_enum_field_access() {
    let (program, diagnostics) = bind_members(vec![
        enumeration("Color", &[("Red", None), ("Green", None)]).into(),
        global(var("g", field(name("Color"), "Green"))),
        global(var_typed("i", ty("int"), Some(field(name("Color"), "Green")))),
        global(var("bad", field(name("Color"), "Purple"))),
    ]);
    assert_only(&diagnostics, ErrorKind::InvalidClassAccess);

    let g = program
        .main
        .body
        .statements
        .iter()
        .find_map(|s| match s {
            BoundStatement::VariableDeclaration {
                variable,
                initializer: Some(init),
                ..
            } if variable.name == "g" => Some(init),
            _ => None,
        })
        .expect("g");
    let BoundExpressionKind::Enum { value, .. } = &g.kind else {
        panic!("Expected an enum value, got {:?}", g.kind);
    };
    assert_eq!(*value, 1);
    assert_eq!(g.ty, TypeSymbol::enumeration("Color"));
}

#[test]
fn test_int_casts_to_enum() {
    let (program, diagnostics) = bind_members(vec![
        enumeration("Color", &[("Red", None), ("Green", None)]).into(),
        global(var_typed("c", ty("Color"), Some(call("Color", vec![int(1)])))),
        global(var("d", cast(ty("Color"), int(0)))),
        global(var_typed("bad", ty("Color"), Some(int(1)))),
    ]);
    assert_only(&diagnostics, ErrorKind::ExplicitConversionError);

    let color = TypeSymbol::enumeration("Color");
    for statement in &program.main.body.statements[..2] {
        let BoundStatement::VariableDeclaration {
            variable,
            initializer: Some(init),
            ..
        } = statement
        else {
            panic!("Expected an initialized variable, got {:?}", statement);
        };
        assert_eq!(variable.ty, color, "Expected {} to be Color, got {}", variable.name, variable.ty);
        assert!(
            matches!(init.kind, BoundExpressionKind::Conversion { .. }),
            "Expected a conversion, got {:?}",
            init.kind
        );
    }
}

// ============================================================================
// Packages
// ============================================================================

#[test]
fn test_package_reference_and_calls() {
    let (program, diagnostics) = bind_with_session(
        net_session(),
        vec![
            package_reference("net").into(),
            global(var("s", package_call("net", "Connect", vec![string("localhost")]))),
            global(var("sent", type_call(name("s"), "Send", vec![string("ping")]))),
            global(var("port", field(name("s"), "Port"))),
            global(var("made", make_from("net", "Socket", vec![]))),
        ],
    );
    assert_clean(&diagnostics);
    assert_eq!(program.packages.len(), 1);
}

#[test]
fn test_package_access_rules() {
    let (_, diagnostics) = bind_with_session(
        net_session(),
        vec![
            package_reference("net").into(),
            global(expr_stmt(package_call("net", "Secret", vec![]))),
            global(var("s", package_call("net", "Connect", vec![string("h")]))),
            global(expr_stmt(type_call(name("s"), "Reset", vec![]))),
            global(expr_stmt(package_call("net", "Missing", vec![]))),
        ],
    );
    assert_eq!(
        diagnostics.kinds(),
        vec![
            ErrorKind::FunctionAccessViolation,
            ErrorKind::FunctionAccessViolation,
            ErrorKind::UndefinedFunctionCall,
        ]
    );
}

#[test]
fn test_unavailable_package_is_a_packager_error() {
    let (_, diagnostics) = bind_members(vec![package_reference("gfx").into()]);
    assert_only(&diagnostics, ErrorKind::UnknownPackage);
    assert_eq!(diagnostics.diagnostics()[0].stage, Stage::Packager);
}

#[test]
fn test_duplicate_reference_and_alias_of_alias() {
    let (program, diagnostics) = bind_with_session(
        net_session(),
        vec![
            package_reference("net").into(),
            package_reference("net").into(),
            package_alias("net", "n").into(),
            package_alias("n", "m").into(),
            global(var("s", package_call("n", "Connect", vec![string("h")]))),
        ],
    );
    assert_eq!(
        diagnostics.kinds(),
        vec![ErrorKind::DuplicatePackageImport, ErrorKind::DuplicatePackageImport]
    );
    let alias = program.packages.iter().find(|p| p.name == "n").expect("alias n");
    assert!(alias.is_alias);
    assert_eq!(alias.original.as_ref().map(|p| p.name.as_str()), Some("net"));
}

#[test]
fn test_use_opens_package_for_unqualified_names() {
    let (program, diagnostics) = bind_with_session(
        net_session(),
        vec![
            package_reference("net").into(),
            package_use("net").into(),
            package_use("net").into(),
            global(var("s", call("Connect", vec![string("h")]))),
            global(var_typed("t", ty("Socket"), None)),
            global(var("u", make("Socket", vec![]))),
        ],
    );
    assert_only(&diagnostics, ErrorKind::DuplicatePackageImport);
    let socket = TypeSymbol::class("Socket", Some("net"));
    for statement in &program.main.body.statements {
        if let BoundStatement::VariableDeclaration { variable, .. } = statement {
            assert_eq!(variable.ty, socket, "Expected {} to be Socket@net, got {}", variable.name, variable.ty.fingerprint());
        }
    }

    let BoundStatement::VariableDeclaration {
        initializer: Some(connect),
        ..
    } = &program.main.body.statements[0]
    else {
        panic!("Expected the declaration of s first");
    };
    let BoundExpressionKind::PackageCall { package, function, .. } = &connect.kind else {
        panic!("Expected a package call, got {:?}", connect.kind);
    };
    assert_eq!(package.name, "net");
    assert_eq!(function.name, "Connect");
}

#[test]
fn test_main_qualified_call_skips_used_packages() {
    let (_, diagnostics) = bind_with_session(
        net_session(),
        vec![
            package_reference("net").into(),
            package_use("net").into(),
            global(expr_stmt(main_call("Connect", vec![string("h")]))),
            global(expr_stmt(call("Secret", vec![]))),
        ],
    );
    assert_eq!(
        diagnostics.kinds(),
        vec![ErrorKind::UndefinedFunctionCall, ErrorKind::FunctionAccessViolation]
    );
}

#[test]
fn test_use_of_unreferenced_package() {
    let (_, diagnostics) = bind_with_session(net_session(), vec![package_use("net").into()]);
    assert_only(&diagnostics, ErrorKind::UnknownPackage);
}

#[test]
fn test_package_symbol_is_declared_in_entry_scope() {
    let mut session = net_session();
    let _ = bind_program(&mut session, &unit(vec![package_reference("net").into()]));
    let symbol = session.scopes.lookup_local(session.main_scope(), "net");
    assert!(matches!(symbol, Some(Symbol::Package(_))));
}
