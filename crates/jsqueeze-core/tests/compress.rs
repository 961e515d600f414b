//! End-to-end squeezing of whole programs, through the library entry points.

use jsqueeze_core::ast::build::*;
use jsqueeze_core::ast::{from_json, BinaryOp, DeclKind, UnaryOp, VarDef};
use jsqueeze_core::output::print_to_string;
use jsqueeze_core::{
    compress, compress_json, CompressError, CompressOptions, Node, NodeKind, NullSink, Span, Warning,
};
use serde_json::{json, Value};

fn squeeze(root: Node) -> (String, Vec<String>) {
    let mut warnings: Vec<Warning> = Vec::new();
    let out = compress(root, &CompressOptions::default(), &mut warnings)
        .expect("compress failed");
    let messages = warnings.iter().map(|w| w.to_string()).collect();
    (print_to_string(&out), messages)
}

fn program(body: Vec<Node>) -> String {
    squeeze(toplevel(body)).0
}

#[test]
fn adjacent_statements_fuse() {
    assert_eq!(
        program(vec![call_stat("a", vec![]), call_stat("b", vec![])]),
        "a(),b();"
    );
}

#[test]
fn statement_before_return_fuses_into_it() {
    let out = program(vec![defun(
        "f",
        &[],
        vec![call_stat("a", vec![]), ret(Some(call("b", vec![])))],
    )]);
    assert_eq!(out, "function f(){return a(),b();}");
}

#[test]
fn code_after_return_is_dropped() {
    let (out, warnings) = squeeze(toplevel(vec![defun(
        "f",
        &[],
        vec![
            ret(Some(num(1.0))),
            call_stat("g", vec![]),
            if_(ident("c"), var(vec![("x", Some(num(2.0)))]).at(3, 8), None),
        ],
    )]));
    // `x` became a parameter, so nothing declarative follows the return.
    assert_eq!(out, "function f(x){return 1;}");
    assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
}

#[test]
fn unreachable_declarations_are_kept_and_reported() {
    let (out, warnings) = squeeze(toplevel(vec![while_(
        ident("x"),
        block(vec![
            brk(None),
            call_stat("g", vec![]),
            Node::new(
                NodeKind::Definitions {
                    kind: DeclKind::Const,
                    definitions: vec![VarDef {
                        name: "k".into(),
                        value: Some(Box::new(num(1.0))),
                        span: Span::default(),
                    }],
                    hoisted: false,
                },
                Span::default(),
            )
            .at(4, 2),
        ]),
    )]));
    // A bare `const k` does not parse; dead code drops the initializer of
    // every declaration kind alike, `const` included.
    assert_eq!(out, "while(x){break;const k;}");
    assert_eq!(warnings, vec!["Declarations in unreachable code! [4,2]"]);
}

#[test]
fn constant_branches_and_loops() {
    let (out, warnings) = squeeze(toplevel(vec![
        if_(num(1.0).at(1, 4), call_stat("a", vec![]), Some(call_stat("b", vec![]))),
        if_(num(0.0).at(2, 4), call_stat("c", vec![]), None),
        while_(num(1.0), call_stat("d", vec![])),
        while_(num(0.0), call_stat("e", vec![])).at(4, 0),
    ]));
    assert_eq!(out, "a();for(;;)d();");
    assert_eq!(
        warnings,
        vec![
            "Condition always true [1,4]",
            "Condition always false [2,4]",
            "Unreachable code [4,0]",
        ]
    );
}

#[test]
fn double_negated_guard_becomes_and() {
    assert_eq!(
        program(vec![if_(not(not(ident("x"))), call_stat("foo", vec![]), None)]),
        "x&&foo();"
    );
}

/// `!a && !b ? x : y` prints shorter as `a || b ? y : x`.
#[test]
fn conditional_uses_de_morgan_when_shorter() {
    let cond = binary(BinaryOp::And, not(ident("a")), not(ident("b")));
    assert_eq!(
        program(vec![stat(conditional(cond, ident("x"), ident("y")))]),
        "a||b?y:x;"
    );
}

/// `x/-0` is -Infinity for positive `x`; the folded zero must keep its sign.
#[test]
fn folded_negative_zero_keeps_its_sign() {
    let neg_zero = unary(UnaryOp::Neg, num(0.0));
    assert_eq!(
        program(vec![stat(binary(BinaryOp::Div, ident("x"), neg_zero))]),
        "x/-0;"
    );
}

#[test]
fn subscripts_and_literals() {
    let out = program(vec![
        stat(assign(sub(ident("o"), string("key")), boolean(false))),
        stat(binary(BinaryOp::Mul, num(6.0), num(7.0))),
    ]);
    assert_eq!(out, "o.key=!1,42;");
}

#[test]
fn hoisting_through_a_whole_program() {
    let out = program(vec![
        call_stat("main", vec![]),
        defun(
            "main",
            &[],
            vec![
                call_stat("log", vec![ident("n")]),
                var(vec![("n", Some(num(1.0)))]),
            ],
        ),
        var(vec![("total", Some(num(0.0)))]),
    ]);
    assert_eq!(out, "var total;function main(n){log(n),n=1;}main(),total=0;");
}

#[test]
fn squeezing_twice_changes_nothing() {
    let input = toplevel(vec![
        call_stat("a", vec![]),
        if_(not(ident("c")), call_stat("b", vec![]), Some(call_stat("d", vec![]))),
        while_(boolean(true), block(vec![call_stat("e", vec![]), brk(None)])),
        if_(ident("q"), ret(Some(num(1.0))), Some(ret(Some(num(2.0))))),
    ]);
    let mut sink = NullSink;
    let options = CompressOptions::default();
    let once = compress(input, &options, &mut sink).unwrap();
    let twice = compress(once.clone(), &options, &mut sink).unwrap();
    assert_eq!(print_to_string(&once), print_to_string(&twice));
}

#[test]
fn conservative_options_change_nothing_but_structure() {
    let input = toplevel(vec![
        if_(num(1.0), call_stat("a", vec![]), None),
        while_(num(1.0), call_stat("b", vec![])),
        stat(binary(BinaryOp::Add, num(1.0), num(2.0))),
    ]);
    let mut warnings: Vec<Warning> = Vec::new();
    let out = compress(input, &CompressOptions::conservative(), &mut warnings).unwrap();
    assert_eq!(print_to_string(&out), "if(1)a();while(1)b();1+2;");
    assert!(warnings.is_empty());
}

#[test]
fn malformed_tree_is_a_fault() {
    let bad = toplevel(vec![stat(binary(BinaryOp::Add, empty().at(7, 1), num(1.0)))]);
    let err = compress(bad, &CompressOptions::default(), &mut NullSink).unwrap_err();
    assert_eq!(err.to_string(), "cannot evaluate statement Empty [7,1]");
}

fn at(kind: Value, line: u32, col: u32) -> Value {
    let pos = json!({ "line": line, "col": col, "offset": 0 });
    json!({ "kind": kind, "span": { "start": pos, "end": pos } })
}

#[test]
fn json_contract() {
    let call_f = at(
        json!({ "Call": { "expression": at(json!({ "Ident": "f" }), 1, 7), "args": [] } }),
        1,
        7,
    );
    let tree = at(
        json!({ "Toplevel": [
            at(json!({ "If": {
                "condition": at(json!({ "Num": 1.0 }), 1, 4),
                "body": at(json!({ "SimpleStatement": call_f }), 1, 7),
                "alternative": null
            } }), 1, 0),
            at(json!("Debugger"), 2, 0),
        ] }),
        1,
        0,
    );

    let mut warnings: Vec<Warning> = Vec::new();
    let out = compress_json(&tree.to_string(), &CompressOptions::default(), &mut warnings).unwrap();
    let node = from_json(&out).unwrap();
    assert_eq!(print_to_string(&node), "f();");
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].to_string(), "Condition always true [1,4]");
}

#[test]
fn json_errors_are_reported() {
    let err = compress_json("{\"kind\":", &CompressOptions::default(), &mut NullSink).unwrap_err();
    assert!(matches!(err, CompressError::Json(_)));
}

#[test]
fn options_deserialize_with_defaults() {
    let options: CompressOptions =
        serde_json::from_value(json!({ "unsafe": false, "dead_code": false })).unwrap();
    assert!(!options.unsafe_);
    assert!(!options.dead_code);
    assert!(options.sequences);
}
