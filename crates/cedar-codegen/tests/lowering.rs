//! Integration tests for the lowering pass.
//!
//! Each test builds a small program tree, runs the full generation
//! pipeline (lowering plus whole-module verification), and asserts over
//! the emitted IR text or the typed error.

use cedar_ast::{
    BinOp, Decl, Expr, ForInit, Param, Primitive, Program, Stmt, StructField, SwitchCase, Type,
    UnaryOp,
};
use cedar_codegen::{generate_ir, CodegenError};

// ── Tree construction helpers ────────────────────────────────────────

fn int() -> Type {
    Type::Primitive(Primitive::Int)
}

fn void() -> Type {
    Type::Primitive(Primitive::Void)
}

fn double() -> Type {
    Type::Primitive(Primitive::Double)
}

fn ptr(base: Type) -> Type {
    Type::Pointer(Box::new(base))
}

fn named(name: &str) -> Type {
    Type::Named(name.to_string())
}

fn ident(name: &str) -> Expr {
    Expr::Identifier(name.to_string())
}

fn lit(value: i64) -> Expr {
    Expr::IntLiteral(value)
}

fn bin(op: BinOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn assign(left: Expr, right: Expr) -> Expr {
    bin(BinOp::Assign, left, right)
}

fn unary(op: UnaryOp, operand: Expr, prefix: bool) -> Expr {
    Expr::Unary {
        op,
        operand: Box::new(operand),
        prefix,
    }
}

fn deref(operand: Expr) -> Expr {
    unary(UnaryOp::Deref, operand, true)
}

fn member(object: Expr, name: &str, arrow: bool) -> Expr {
    Expr::Member {
        object: Box::new(object),
        member: name.to_string(),
        arrow,
    }
}

fn index(array: Expr, idx: Expr) -> Expr {
    Expr::Index {
        array: Box::new(array),
        index: Box::new(idx),
    }
}

fn call(name: &str, arguments: Vec<Expr>) -> Expr {
    Expr::Call {
        callee: Box::new(ident(name)),
        arguments,
    }
}

fn param(name: &str, ty: Type) -> Param {
    Param {
        identifier: name.to_string(),
        ty,
    }
}

fn func(name: &str, return_type: Type, parameters: Vec<Param>, body: Vec<Stmt>) -> Decl {
    Decl::Function {
        identifier: name.to_string(),
        return_type,
        parameters,
        body: Some(body),
    }
}

fn forward(name: &str, return_type: Type, parameters: Vec<Param>) -> Decl {
    Decl::Function {
        identifier: name.to_string(),
        return_type,
        parameters,
        body: None,
    }
}

fn local(name: &str, ty: Type) -> Stmt {
    Stmt::Decl(Box::new(Decl::Variable {
        identifier: name.to_string(),
        ty,
        array_size: None,
        initializer: None,
    }))
}

fn local_array(name: &str, ty: Type, size: i64) -> Stmt {
    Stmt::Decl(Box::new(Decl::Variable {
        identifier: name.to_string(),
        ty,
        array_size: Some(lit(size)),
        initializer: None,
    }))
}

fn strukt(name: &str, fields: Vec<(&str, Type)>) -> Decl {
    Decl::Struct {
        identifier: name.to_string(),
        fields: fields
            .into_iter()
            .map(|(identifier, ty)| StructField {
                identifier: identifier.to_string(),
                ty,
            })
            .collect(),
    }
}

fn expr_stmt(expr: Expr) -> Stmt {
    Stmt::Expr(expr)
}

fn ret(value: Expr) -> Stmt {
    Stmt::Return(Some(value))
}

fn program(declarations: Vec<Decl>) -> Program {
    Program { declarations }
}

// ── Straight-line lowering ───────────────────────────────────────────

/// `int add(int a, int b) { return a + b; }` lowers to one basic block
/// ending in a return of the sum of the bound parameters.
#[test]
fn add_is_a_single_block() {
    let tree = program(vec![func(
        "add",
        int(),
        vec![param("a", int()), param("b", int())],
        vec![ret(bin(BinOp::Add, ident("a"), ident("b")))],
    )]);

    let ir = generate_ir(&tree).unwrap();
    assert!(ir.contains("define i32 @add("));
    assert!(ir.contains("ret i32 %addtmp"));
    // A single block: no branches anywhere in the module.
    assert_eq!(ir.matches("br i1").count(), 0);
    assert_eq!(ir.matches("br label").count(), 0);
}

/// `int x; x = 5; return x;` allocates storage, stores the constant, and
/// returns the loaded value — not the literal directly.
#[test]
fn locals_round_trip_through_storage() {
    let tree = program(vec![func(
        "five",
        int(),
        vec![],
        vec![
            local("x", int()),
            expr_stmt(assign(ident("x"), lit(5))),
            ret(ident("x")),
        ],
    )]);

    let ir = generate_ir(&tree).unwrap();
    assert!(ir.contains("alloca i32"));
    assert!(ir.contains("store i32 5"));
    assert!(ir.contains("ret i32 %loadtmp"));
}

#[test]
fn assignment_yields_the_stored_value() {
    // a = b = 3 nests: the inner assignment's result feeds the outer one.
    let tree = program(vec![func(
        "chain",
        int(),
        vec![],
        vec![
            local("a", int()),
            local("b", int()),
            expr_stmt(assign(ident("a"), assign(ident("b"), lit(3)))),
            ret(ident("a")),
        ],
    )]);
    assert!(generate_ir(&tree).is_ok());
}

#[test]
fn comma_yields_the_last_operand() {
    let tree = program(vec![func(
        "comma",
        int(),
        vec![],
        vec![
            local("x", int()),
            ret(Expr::Comma(vec![
                assign(ident("x"), lit(1)),
                bin(BinOp::Add, ident("x"), lit(1)),
            ])),
        ],
    )]);
    assert!(generate_ir(&tree).unwrap().contains("ret i32 %addtmp"));
}

#[test]
fn double_arithmetic_uses_float_instructions() {
    let tree = program(vec![func(
        "scale",
        double(),
        vec![param("x", double())],
        vec![ret(bin(BinOp::Mul, ident("x"), Expr::DoubleLiteral(2.0)))],
    )]);
    assert!(generate_ir(&tree).unwrap().contains("fmul double"));
}

// ── Control flow and the termination tie-break ───────────────────────

/// `if (x) { return 1; } return 0;`: the then-block keeps its own return
/// (no branch to merge), and the merge block carries the trailing return.
#[test]
fn terminated_then_block_gets_no_merge_branch() {
    let tree = program(vec![func(
        "check",
        int(),
        vec![param("x", int())],
        vec![
            Stmt::If {
                condition: ident("x"),
                then_branch: Box::new(Stmt::Block(vec![ret(lit(1))])),
                else_branch: None,
            },
            ret(lit(0)),
        ],
    )]);

    let ir = generate_ir(&tree).unwrap();
    // One conditional branch, and no unconditional branch into the merge.
    assert_eq!(ir.matches("br i1").count(), 1);
    assert_eq!(ir.matches("br label").count(), 0);
    assert_eq!(ir.matches("ret i32").count(), 2);
}

#[test]
fn if_else_wires_both_edges_to_merge() {
    let tree = program(vec![func(
        "pick",
        int(),
        vec![param("x", int())],
        vec![
            local("r", int()),
            Stmt::If {
                condition: ident("x"),
                then_branch: Box::new(expr_stmt(assign(ident("r"), lit(1)))),
                else_branch: Some(Box::new(expr_stmt(assign(ident("r"), lit(2))))),
            },
            ret(ident("r")),
        ],
    )]);

    let ir = generate_ir(&tree).unwrap();
    assert!(ir.contains("then:"));
    assert!(ir.contains("else:"));
    assert!(ir.contains("if_merge:"));
    // Both branches fall through to the merge.
    assert_eq!(ir.matches("br label %if_merge").count(), 2);
}

#[test]
fn while_loops_through_a_condition_block() {
    let tree = program(vec![func(
        "count",
        int(),
        vec![param("n", int())],
        vec![
            local("i", int()),
            expr_stmt(assign(ident("i"), lit(0))),
            Stmt::While {
                condition: bin(BinOp::Lt, ident("i"), ident("n")),
                body: Box::new(expr_stmt(unary(UnaryOp::Inc, ident("i"), false))),
            },
            ret(ident("i")),
        ],
    )]);

    let ir = generate_ir(&tree).unwrap();
    assert!(ir.contains("while_cond:"));
    assert!(ir.contains("while_body:"));
    assert!(ir.contains("while_merge:"));
    // Body falls back to the condition block.
    assert!(ir.contains("br label %while_cond"));
}

#[test]
fn returning_loop_body_skips_the_back_edge() {
    let tree = program(vec![func(
        "first",
        int(),
        vec![param("x", int())],
        vec![
            Stmt::While {
                condition: ident("x"),
                body: Box::new(ret(lit(5))),
            },
            ret(lit(0)),
        ],
    )]);

    let ir = generate_ir(&tree).unwrap();
    // The terminated body never branches back to while_cond; only the
    // entry block does.
    assert_eq!(ir.matches("br label %while_cond").count(), 1);
}

#[test]
fn do_while_runs_the_body_first() {
    let tree = program(vec![func(
        "at_least_once",
        int(),
        vec![],
        vec![
            local("i", int()),
            expr_stmt(assign(ident("i"), lit(0))),
            Stmt::DoWhile {
                condition: bin(BinOp::Lt, ident("i"), lit(3)),
                body: Box::new(expr_stmt(unary(UnaryOp::Inc, ident("i"), true))),
            },
            ret(ident("i")),
        ],
    )]);

    let ir = generate_ir(&tree).unwrap();
    assert!(ir.contains("do_body:"));
    assert!(ir.contains("do_cond:"));
    // Entry branches straight into the body, not the condition.
    assert!(ir.contains("br label %do_body"));
}

#[test]
fn for_inserts_an_update_block() {
    let tree = program(vec![func(
        "sum_to",
        int(),
        vec![param("n", int())],
        vec![
            local("s", int()),
            expr_stmt(assign(ident("s"), lit(0))),
            Stmt::For {
                init: Some(ForInit::Decl(Box::new(Decl::Variable {
                    identifier: "i".to_string(),
                    ty: int(),
                    array_size: None,
                    initializer: Some(lit(0)),
                }))),
                condition: Some(bin(BinOp::Lt, ident("i"), ident("n"))),
                update: Some(unary(UnaryOp::Inc, ident("i"), false)),
                body: Box::new(expr_stmt(assign(
                    ident("s"),
                    bin(BinOp::Add, ident("s"), ident("i")),
                ))),
            },
            ret(ident("s")),
        ],
    )]);

    let ir = generate_ir(&tree).unwrap();
    assert!(ir.contains("for_init:"));
    assert!(ir.contains("for_cond:"));
    assert!(ir.contains("for_update:"));
    // The update block always branches back to the condition.
    assert!(ir.contains("br label %for_cond"));
}

#[test]
fn switch_dispatches_and_falls_through() {
    let tree = program(vec![func(
        "classify",
        int(),
        vec![param("c", int())],
        vec![
            local("x", int()),
            expr_stmt(assign(ident("x"), lit(0))),
            Stmt::Switch {
                condition: ident("c"),
                cases: vec![
                    SwitchCase {
                        value: 1,
                        // No terminator: falls through into case 2.
                        body: Box::new(expr_stmt(assign(ident("x"), lit(1)))),
                    },
                    SwitchCase {
                        value: 2,
                        body: Box::new(ret(bin(BinOp::Add, ident("x"), lit(10)))),
                    },
                ],
                default: Some(Box::new(ret(lit(-1)))),
            },
            ret(ident("x")),
        ],
    )]);

    let ir = generate_ir(&tree).unwrap();
    assert!(ir.contains("switch i32"));
    assert!(ir.contains("switch_default:"));
}

// ── Boolean coercion ─────────────────────────────────────────────────

#[test]
fn int_condition_compares_against_zero() {
    let tree = program(vec![func(
        "truthy",
        int(),
        vec![param("x", int())],
        vec![
            Stmt::If {
                condition: ident("x"),
                then_branch: Box::new(ret(lit(1))),
                else_branch: None,
            },
            ret(lit(0)),
        ],
    )]);
    assert!(generate_ir(&tree).unwrap().contains("icmp ne i32"));
}

#[test]
fn double_condition_compares_against_zero() {
    let tree = program(vec![func(
        "truthy",
        int(),
        vec![param("x", double())],
        vec![
            Stmt::If {
                condition: ident("x"),
                then_branch: Box::new(ret(lit(1))),
                else_branch: None,
            },
            ret(lit(0)),
        ],
    )]);
    assert!(generate_ir(&tree).unwrap().contains("fcmp one double"));
}

#[test]
fn pointer_condition_compares_against_null() {
    let tree = program(vec![func(
        "present",
        int(),
        vec![param("p", ptr(int()))],
        vec![
            Stmt::If {
                condition: ident("p"),
                then_branch: Box::new(ret(lit(1))),
                else_branch: None,
            },
            ret(lit(0)),
        ],
    )]);
    assert!(generate_ir(&tree).unwrap().contains("null"));
}

#[test]
fn comparison_result_passes_through_unchanged() {
    let tree = program(vec![func(
        "less",
        int(),
        vec![param("a", int()), param("b", int())],
        vec![
            Stmt::If {
                condition: bin(BinOp::Lt, ident("a"), ident("b")),
                then_branch: Box::new(ret(lit(1))),
                else_branch: None,
            },
            ret(lit(0)),
        ],
    )]);

    let ir = generate_ir(&tree).unwrap();
    // The slt result is already i1; no second comparison is inserted.
    assert_eq!(ir.matches("icmp").count(), 1);
}

// ── Storage forms: pointers, members, indexing ───────────────────────

#[test]
fn store_then_load_through_a_dereference() {
    let tree = program(vec![func(
        "through",
        int(),
        vec![param("p", ptr(int()))],
        vec![
            expr_stmt(assign(deref(ident("p")), lit(7))),
            ret(deref(ident("p"))),
        ],
    )]);

    let ir = generate_ir(&tree).unwrap();
    assert!(ir.contains("store i32 7"));
    assert!(ir.contains("ret i32 %loadtmp"));
}

/// Field indices follow declaration order from zero: `p.y` addresses
/// field 1.
#[test]
fn struct_member_store_addresses_the_right_field() {
    let tree = program(vec![
        strukt("P", vec![("x", int()), ("y", int())]),
        func(
            "use_p",
            int(),
            vec![],
            vec![
                local("p", named("P")),
                expr_stmt(assign(member(ident("p"), "x", false), lit(1))),
                expr_stmt(assign(member(ident("p"), "y", false), lit(2))),
                ret(member(ident("p"), "x", false)),
            ],
        ),
    ]);

    let ir = generate_ir(&tree).unwrap();
    assert!(ir.contains("%P = type { i32, i32 }"));
    // The field-address computation precedes the store.
    assert!(ir.contains("getelementptr"));
    assert!(ir.contains("i32 0, i32 1"));
}

#[test]
fn arrow_access_loads_the_object_pointer_first() {
    let tree = program(vec![
        strukt("Point", vec![("x", int()), ("y", int())]),
        func(
            "get_y",
            int(),
            vec![param("p", ptr(named("Point")))],
            vec![ret(member(ident("p"), "y", true))],
        ),
    ]);

    let ir = generate_ir(&tree).unwrap();
    assert!(ir.contains("load ptr"));
    assert!(ir.contains("i32 0, i32 1"));
}

#[test]
fn array_index_store_then_load() {
    let tree = program(vec![func(
        "third",
        int(),
        vec![],
        vec![
            local_array("a", int(), 4),
            expr_stmt(assign(index(ident("a"), lit(2)), lit(9))),
            ret(index(ident("a"), lit(2))),
        ],
    )]);

    let ir = generate_ir(&tree).unwrap();
    assert!(ir.contains("alloca [4 x i32]"));
    assert!(ir.contains("store i32 9"));
    assert!(ir.contains("ret i32 %loadtmp"));
}

#[test]
fn pointer_index_scales_by_the_recorded_element_type() {
    let tree = program(vec![func(
        "second",
        int(),
        vec![param("p", ptr(int()))],
        vec![ret(index(ident("p"), lit(1)))],
    )]);

    let ir = generate_ir(&tree).unwrap();
    assert!(ir.contains("getelementptr inbounds i32"));
}

#[test]
fn array_argument_decays_to_a_pointer() {
    let tree = program(vec![
        forward("fill", void(), vec![param("p", ptr(int()))]),
        func(
            "caller",
            int(),
            vec![],
            vec![
                local_array("a", int(), 3),
                expr_stmt(call("fill", vec![ident("a")])),
                ret(lit(0)),
            ],
        ),
    ]);

    let ir = generate_ir(&tree).unwrap();
    assert!(ir.contains("call void @fill(ptr"));
}

#[test]
fn address_of_then_dereference() {
    let tree = program(vec![func(
        "roundabout",
        int(),
        vec![],
        vec![
            local("x", int()),
            local("p", ptr(int())),
            expr_stmt(assign(ident("x"), lit(11))),
            expr_stmt(assign(ident("p"), unary(UnaryOp::AddrOf, ident("x"), true))),
            ret(deref(ident("p"))),
        ],
    )]);
    assert!(generate_ir(&tree).is_ok());
}

// ── Declarations ─────────────────────────────────────────────────────

#[test]
fn definition_reuses_a_forward_declaration() {
    let tree = program(vec![
        forward("add", int(), vec![param("a", int()), param("b", int())]),
        func(
            "add",
            int(),
            vec![param("a", int()), param("b", int())],
            vec![ret(bin(BinOp::Add, ident("a"), ident("b")))],
        ),
    ]);

    let ir = generate_ir(&tree).unwrap();
    // One function object: a define, and no leftover declare.
    assert_eq!(ir.matches("@add(").count(), 1);
    assert!(ir.contains("define i32 @add("));
}

#[test]
fn forward_declared_callee_lowers_to_a_direct_call() {
    let tree = program(vec![
        forward("print_int", void(), vec![param("x", int())]),
        func(
            "main",
            int(),
            vec![],
            vec![expr_stmt(call("print_int", vec![lit(42)])), ret(lit(0))],
        ),
    ]);

    let ir = generate_ir(&tree).unwrap();
    assert!(ir.contains("declare void @print_int(i32"));
    assert!(ir.contains("call void @print_int(i32 42)"));
}

/// Forward-declaring then defining a struct preserves a single type
/// identity, and self-reference through a pointer field works.
#[test]
fn two_phase_struct_definition_supports_self_reference() {
    let tree = program(vec![
        strukt("Node", vec![]),
        strukt("Node", vec![("value", int()), ("next", ptr(named("Node")))]),
        func(
            "head_value",
            int(),
            vec![param("n", ptr(named("Node")))],
            vec![ret(member(ident("n"), "value", true))],
        ),
    ]);

    let ir = generate_ir(&tree).unwrap();
    assert!(ir.contains("%Node = type { i32, ptr }"));
    assert_eq!(ir.matches("%Node = type").count(), 1);
}

#[test]
fn mutually_recursive_structs_declare_then_define() {
    let tree = program(vec![
        strukt("A", vec![]),
        strukt("B", vec![]),
        strukt("A", vec![("b", ptr(named("B")))]),
        strukt("B", vec![("a", ptr(named("A")))]),
    ]);
    assert!(generate_ir(&tree).is_ok());
}

#[test]
fn by_value_field_of_an_undefined_struct_is_an_error() {
    // Pointer fields never consult the pointee, but a by-value field of a
    // never-declared struct must fail.
    let tree = program(vec![strukt("Holder", vec![("inner", named("Ghost"))])]);
    assert_eq!(
        generate_ir(&tree),
        Err(CodegenError::UnknownType {
            name: "Ghost".to_string()
        })
    );
}

#[test]
fn indirect_call_through_a_function_pointer_parameter() {
    let tree = program(vec![
        Decl::FunctionPointer {
            identifier: "BinFn".to_string(),
            return_type: int(),
            parameters: vec![param("a", int()), param("b", int())],
        },
        func(
            "apply",
            int(),
            vec![param("f", named("BinFn")), param("x", int())],
            vec![ret(call("f", vec![ident("x"), ident("x")]))],
        ),
    ]);

    let ir = generate_ir(&tree).unwrap();
    // The pointer value is loaded and called indirectly.
    assert!(ir.contains("%fnptr = load ptr"));
    assert!(ir.contains("call i32 %fnptr("));
}

#[test]
fn string_literal_becomes_a_terminated_global() {
    let tree = program(vec![
        forward(
            "print_string",
            void(),
            vec![param("s", ptr(Type::Primitive(Primitive::Char)))],
        ),
        func(
            "main",
            int(),
            vec![],
            vec![
                expr_stmt(Expr::Call {
                    callee: Box::new(ident("print_string")),
                    arguments: vec![Expr::StringLiteral("hi".to_string())],
                }),
                ret(lit(0)),
            ],
        ),
    ]);

    let ir = generate_ir(&tree).unwrap();
    assert!(ir.contains("c\"hi\\00\""));
}

// ── Scope discipline ─────────────────────────────────────────────────

#[test]
fn sibling_function_scopes_are_invisible() {
    let tree = program(vec![
        func(
            "one",
            int(),
            vec![],
            vec![
                local("secret", int()),
                expr_stmt(assign(ident("secret"), lit(1))),
                ret(ident("secret")),
            ],
        ),
        func("two", int(), vec![], vec![ret(ident("secret"))]),
    ]);

    assert_eq!(
        generate_ir(&tree),
        Err(CodegenError::UnknownIdentifier {
            name: "secret".to_string()
        })
    );
}

#[test]
fn same_scope_redefinition_overwrites() {
    let tree = program(vec![func(
        "shadowed",
        int(),
        vec![],
        vec![
            local("x", int()),
            expr_stmt(assign(ident("x"), lit(1))),
            local("x", int()),
            expr_stmt(assign(ident("x"), lit(2))),
            ret(ident("x")),
        ],
    )]);
    assert!(generate_ir(&tree).is_ok());
}

/// Per-function (not per-block) scoping: a variable declared inside an
/// `if` body stays visible after the block ends.
#[test]
fn block_locals_stay_visible_after_the_block() {
    let tree = program(vec![func(
        "leaky",
        int(),
        vec![param("c", int())],
        vec![
            Stmt::If {
                condition: ident("c"),
                then_branch: Box::new(Stmt::Block(vec![
                    local("inner", int()),
                    expr_stmt(assign(ident("inner"), lit(1))),
                ])),
                else_branch: None,
            },
            ret(ident("inner")),
        ],
    )]);
    assert!(generate_ir(&tree).is_ok());
}

// ── Error taxonomy ───────────────────────────────────────────────────

/// Calling a name that is neither a declared function nor a bound
/// variable raises an error, never a silent no-op.
#[test]
fn unknown_callee_is_an_error() {
    let tree = program(vec![func(
        "caller",
        int(),
        vec![],
        vec![ret(call("missing", vec![]))],
    )]);

    assert_eq!(
        generate_ir(&tree),
        Err(CodegenError::UnknownIdentifier {
            name: "missing".to_string()
        })
    );
}

#[test]
fn unknown_type_names_the_offender() {
    let tree = program(vec![func(
        "bad",
        int(),
        vec![],
        vec![local("g", named("Ghost")), ret(lit(0))],
    )]);

    assert_eq!(
        generate_ir(&tree),
        Err(CodegenError::UnknownType {
            name: "Ghost".to_string()
        })
    );
}

#[test]
fn address_of_a_literal_is_not_an_lvalue() {
    let tree = program(vec![func(
        "bad",
        int(),
        vec![],
        vec![expr_stmt(assign(lit(1), lit(2))), ret(lit(0))],
    )]);

    assert!(matches!(
        generate_ir(&tree),
        Err(CodegenError::InvalidLValue { .. })
    ));
}

#[test]
fn missing_return_is_an_error_not_a_default() {
    let tree = program(vec![func("bad", int(), vec![], vec![local("x", int())])]);

    assert_eq!(
        generate_ir(&tree),
        Err(CodegenError::MissingReturn {
            function: "bad".to_string()
        })
    );
}

#[test]
fn void_function_gets_an_implicit_return() {
    let tree = program(vec![func("quiet", void(), vec![], vec![local("x", int())])]);

    let ir = generate_ir(&tree).unwrap();
    assert!(ir.contains("ret void"));
}

#[test]
fn explicitly_unfinished_surface_is_rejected() {
    // Casts.
    let cast = program(vec![func(
        "c",
        int(),
        vec![],
        vec![ret(Expr::Cast {
            target: int(),
            operand: Box::new(lit(1)),
        })],
    )]);
    assert!(matches!(
        generate_ir(&cast),
        Err(CodegenError::UnsupportedFeature { .. })
    ));

    // Global variables.
    let global = program(vec![Decl::Variable {
        identifier: "g".to_string(),
        ty: int(),
        array_size: None,
        initializer: None,
    }]);
    assert!(matches!(
        generate_ir(&global),
        Err(CodegenError::UnsupportedFeature { .. })
    ));

    // Array initializers.
    let array_init = program(vec![func(
        "a",
        int(),
        vec![],
        vec![
            Stmt::Decl(Box::new(Decl::Variable {
                identifier: "xs".to_string(),
                ty: int(),
                array_size: Some(lit(2)),
                initializer: Some(lit(0)),
            })),
            ret(lit(0)),
        ],
    )]);
    assert!(matches!(
        generate_ir(&array_init),
        Err(CodegenError::UnsupportedFeature { .. })
    ));
}

// ── End to end through the JSON front-end ────────────────────────────

#[test]
fn json_document_lowers_end_to_end() {
    let doc = serde_json::json!({
        "declarations": [{
            "nodeType": "FunctionDefinition",
            "identifier": "add",
            "returnType": { "nodeType": "PrimitiveType", "kind": "int" },
            "parameters": [
                { "nodeType": "Parameter", "identifier": "a",
                  "type": { "nodeType": "PrimitiveType", "kind": "int" } },
                { "nodeType": "Parameter", "identifier": "b",
                  "type": { "nodeType": "PrimitiveType", "kind": "int" } }
            ],
            "body": {
                "nodeType": "BlockStatement",
                "statements": [{
                    "nodeType": "ReturnStatement",
                    "expression": {
                        "nodeType": "BinaryExpression",
                        "operator": "+",
                        "left": { "nodeType": "Identifier", "identifier": "a" },
                        "right": { "nodeType": "Identifier", "identifier": "b" }
                    }
                }]
            }
        }]
    });

    let tree = cedar_ast::json::program_from_value(&doc).unwrap();
    let ir = generate_ir(&tree).unwrap();
    assert!(ir.contains("define i32 @add("));
}
