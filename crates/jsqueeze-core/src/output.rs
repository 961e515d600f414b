//! Compact code printer.
//!
//! Prints without optional whitespace. It is what "keep the shorter form"
//! decisions measure, so it must parenthesize exactly where the language
//! needs it and nowhere else.

use std::fmt::Write;

use crate::ast::{
    BinaryOp, DeclKind, DwLoopKind, ExitKind, Lambda, LoopControlKind, Node, NodeKind,
    PropertyKind, UnaryOp, VarDef,
};
use crate::value::number_to_string;

// Binding strength of expression forms, higher binds tighter. Binary
// operators use `BinaryOp::precedence` (4..=13) in between.
const SEQ: u8 = 1;
const ASSIGN: u8 = 2;
const CONDITIONAL: u8 = 3;
const LOGICAL_OR: u8 = 4;
const UNARY: u8 = 14;
const POSTFIX: u8 = 15;
const CALL: u8 = 16;
const PRIMARY: u8 = 17;

/// Print any node (statement, program or expression) in compact form.
pub fn print_to_string(node: &Node) -> String {
    let mut out = String::new();
    if node.is_statement() {
        print_stmt(node, &mut out);
    } else {
        print_expr(node, SEQ, &mut out);
    }
    out
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

fn print_stmts(stmts: &[Node], out: &mut String) {
    for stmt in stmts {
        print_stmt(stmt, out);
    }
}

fn print_block(stmts: &[Node], out: &mut String) {
    out.push('{');
    print_stmts(stmts, out);
    out.push('}');
}

fn print_stmt(stmt: &Node, out: &mut String) {
    match &stmt.kind {
        NodeKind::SimpleStatement(body) => {
            let text = expr_to_string(body, SEQ);
            if text.starts_with("function") || text.starts_with('{') {
                let _ = write!(out, "({text});");
            } else {
                let _ = write!(out, "{text};");
            }
        }
        NodeKind::Block(body) => print_block(body, out),
        NodeKind::Toplevel(body) => print_stmts(body, out),
        NodeKind::Empty => out.push(';'),
        NodeKind::Debugger => out.push_str("debugger;"),
        NodeKind::Labeled { label, body } => {
            let _ = write!(out, "{}:", label.name);
            print_stmt(body, out);
        }
        NodeKind::Exit { kind, value } => {
            let word = match kind {
                ExitKind::Return => "return",
                ExitKind::Throw => "throw",
            };
            out.push_str(word);
            if let Some(value) = value {
                push_after_word(out, &expr_to_string(value, SEQ));
            }
            out.push(';');
        }
        NodeKind::LoopControl { kind, label } => {
            out.push_str(match kind {
                LoopControlKind::Break => "break",
                LoopControlKind::Continue => "continue",
            });
            if let Some(label) = label {
                let _ = write!(out, " {label}");
            }
            out.push(';');
        }
        NodeKind::If {
            condition,
            body,
            alternative,
        } => {
            let _ = write!(out, "if({})", expr_to_string(condition, SEQ));
            match alternative {
                Some(alt) => {
                    if ends_with_open_if(body) {
                        print_block(std::slice::from_ref(body), out);
                    } else {
                        print_stmt(body, out);
                    }
                    out.push_str("else");
                    push_after_word(out, &stmt_to_string(alt));
                }
                None => print_stmt(body, out),
            }
        }
        NodeKind::DwLoop {
            kind: DwLoopKind::While,
            condition,
            body,
        } => {
            let _ = write!(out, "while({})", expr_to_string(condition, SEQ));
            print_stmt(body, out);
        }
        NodeKind::DwLoop {
            kind: DwLoopKind::DoWhile,
            condition,
            body,
        } => {
            out.push_str("do");
            push_after_word(out, &stmt_to_string(body));
            let _ = write!(out, "while({});", expr_to_string(condition, SEQ));
        }
        NodeKind::For {
            init,
            condition,
            step,
            body,
        } => {
            out.push_str("for(");
            if let Some(init) = init {
                out.push_str(&for_init_to_string(init));
            }
            out.push(';');
            if let Some(condition) = condition {
                out.push_str(&expr_to_string(condition, SEQ));
            }
            out.push(';');
            if let Some(step) = step {
                out.push_str(&expr_to_string(step, SEQ));
            }
            out.push(')');
            print_stmt(body, out);
        }
        NodeKind::ForIn { init, object, body } => {
            out.push_str("for(");
            out.push_str(&for_init_to_string(init));
            push_word(out, "in");
            push_after_word(out, &expr_to_string(object, SEQ));
            out.push(')');
            print_stmt(body, out);
        }
        NodeKind::Switch { expression, cases } => {
            let _ = write!(out, "switch({}){{", expr_to_string(expression, SEQ));
            print_stmts(cases, out);
            out.push('}');
        }
        NodeKind::Case { expression, body } => {
            match expression {
                Some(expr) => {
                    out.push_str("case");
                    push_after_word(out, &expr_to_string(expr, SEQ));
                    out.push(':');
                }
                None => out.push_str("default:"),
            }
            print_stmts(body, out);
        }
        NodeKind::Try {
            body,
            handler,
            finalizer,
        } => {
            out.push_str("try");
            print_block(body, out);
            for clause in [handler, finalizer].into_iter().flatten() {
                print_stmt(clause, out);
            }
        }
        NodeKind::Catch { param, body } => {
            let _ = write!(out, "catch({param})");
            print_block(body, out);
        }
        NodeKind::Finally(body) => {
            out.push_str("finally");
            print_block(body, out);
        }
        NodeKind::With { expression, body } => {
            let _ = write!(out, "with({})", expr_to_string(expression, SEQ));
            print_stmt(body, out);
        }
        NodeKind::Definitions {
            kind, definitions, ..
        } => {
            out.push_str(&definitions_to_string(*kind, definitions));
            out.push(';');
        }
        NodeKind::Defun(lambda) => print_lambda(lambda, out),
        // Expressions in statement position print as expression statements.
        _ => {
            out.push_str(&expr_to_string(stmt, SEQ));
            out.push(';');
        }
    }
}

fn stmt_to_string(stmt: &Node) -> String {
    let mut out = String::new();
    print_stmt(stmt, &mut out);
    out
}

/// An `if` body that would swallow a following `else`.
fn ends_with_open_if(stmt: &Node) -> bool {
    match &stmt.kind {
        NodeKind::If {
            alternative: None, ..
        } => true,
        NodeKind::If {
            alternative: Some(alt),
            ..
        } => ends_with_open_if(alt),
        NodeKind::DwLoop {
            kind: DwLoopKind::While,
            body,
            ..
        }
        | NodeKind::For { body, .. }
        | NodeKind::ForIn { body, .. }
        | NodeKind::With { body, .. }
        | NodeKind::Labeled { body, .. } => ends_with_open_if(body),
        _ => false,
    }
}

fn definitions_to_string(kind: DeclKind, definitions: &[VarDef]) -> String {
    let mut out = String::from(match kind {
        DeclKind::Var => "var ",
        DeclKind::Const => "const ",
    });
    for (i, def) in definitions.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&def.name);
        if let Some(value) = &def.value {
            out.push('=');
            out.push_str(&expr_to_string(value, ASSIGN));
        }
    }
    out
}

fn for_init_to_string(init: &Node) -> String {
    match &init.kind {
        NodeKind::Definitions {
            kind, definitions, ..
        } => definitions_to_string(*kind, definitions),
        // A top-level `in` would read as a for-in head.
        NodeKind::Binary {
            op: BinaryOp::In, ..
        } => format!("({})", expr_to_string(init, SEQ)),
        _ => expr_to_string(init, SEQ),
    }
}

fn print_lambda(lambda: &Lambda, out: &mut String) {
    out.push_str("function");
    if let Some(name) = &lambda.name {
        let _ = write!(out, " {name}");
    }
    let _ = write!(out, "({})", lambda.params.join(","));
    print_block(&lambda.body, out);
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

fn expr_to_string(expr: &Node, min: u8) -> String {
    let mut out = String::new();
    print_expr(expr, min, &mut out);
    out
}

/// Print `expr`, parenthesized when it binds looser than `min`.
fn print_expr(expr: &Node, min: u8, out: &mut String) {
    if precedence(expr) < min {
        out.push('(');
        print_expr_inner(expr, out);
        out.push(')');
    } else {
        print_expr_inner(expr, out);
    }
}

fn precedence(expr: &Node) -> u8 {
    match &expr.kind {
        NodeKind::Seq { .. } => SEQ,
        NodeKind::Assign { .. } => ASSIGN,
        NodeKind::Conditional { .. } => CONDITIONAL,
        NodeKind::Binary { op, .. } => op.precedence(),
        NodeKind::UnaryPrefix { .. } | NodeKind::Undefined => UNARY,
        NodeKind::UnaryPostfix { .. } => POSTFIX,
        NodeKind::Call { .. } | NodeKind::New { .. } | NodeKind::Dot { .. } | NodeKind::Sub { .. } => {
            CALL
        }
        NodeKind::Num(n) if !n.is_finite() => BinaryOp::Div.precedence(),
        NodeKind::Num(n) if n.is_sign_negative() => UNARY,
        _ => PRIMARY,
    }
}

fn print_expr_inner(expr: &Node, out: &mut String) {
    match &expr.kind {
        NodeKind::Str(s) => {
            let _ = write!(out, "\"{}\"", escape_js_string(s));
        }
        NodeKind::Num(n) => out.push_str(&format_number(*n)),
        NodeKind::True => out.push_str("true"),
        NodeKind::False => out.push_str("false"),
        NodeKind::Null => out.push_str("null"),
        NodeKind::Undefined => out.push_str("void 0"),
        NodeKind::This => out.push_str("this"),
        NodeKind::Ident(name) => out.push_str(name),
        NodeKind::Function(lambda) => print_lambda(lambda, out),
        NodeKind::UnaryPrefix { op, expression } => {
            out.push_str(op.as_str());
            let operand = expr_to_string(expression, UNARY);
            let clash = match op {
                UnaryOp::Neg | UnaryOp::Decr => operand.starts_with('-'),
                UnaryOp::Plus | UnaryOp::Incr => operand.starts_with('+'),
                _ => false,
            };
            if (op.is_keyword() && starts_with_ident_char(&operand)) || clash {
                out.push(' ');
            }
            out.push_str(&operand);
        }
        NodeKind::UnaryPostfix { op, expression } => {
            print_expr(expression, CALL, out);
            out.push_str(op.as_str());
        }
        NodeKind::Binary { op, left, right } => {
            let prec = op.precedence();
            print_expr(left, prec, out);
            let rhs = expr_to_string(right, prec + 1);
            if op.is_word() {
                push_word(out, op.as_str());
                push_after_word(out, &rhs);
            } else {
                out.push_str(op.as_str());
                let clash = match op {
                    BinaryOp::Sub => rhs.starts_with('-'),
                    BinaryOp::Add => rhs.starts_with('+'),
                    _ => false,
                };
                if clash {
                    out.push(' ');
                }
                out.push_str(&rhs);
            }
        }
        NodeKind::Assign { op, left, right } => {
            print_expr(left, CALL, out);
            out.push_str(op.as_str());
            print_expr(right, ASSIGN, out);
        }
        NodeKind::Conditional {
            condition,
            consequent,
            alternative,
        } => {
            print_expr(condition, LOGICAL_OR, out);
            out.push('?');
            print_expr(consequent, ASSIGN, out);
            out.push(':');
            print_expr(alternative, ASSIGN, out);
        }
        NodeKind::Seq { first, second } => {
            print_expr(first, SEQ, out);
            out.push(',');
            print_expr(second, SEQ, out);
        }
        NodeKind::Call { expression, args } => {
            print_expr(expression, CALL, out);
            print_args(args, out);
        }
        NodeKind::New { expression, args } => {
            out.push_str("new ");
            // `new f().x()` would construct `f` and call `.x` on the result.
            if has_call(expression) {
                let _ = write!(out, "({})", expr_to_string(expression, SEQ));
            } else {
                print_expr(expression, CALL, out);
            }
            print_args(args, out);
        }
        NodeKind::Dot {
            expression,
            property,
        } => {
            // `1.toString` would lex as a malformed number.
            if matches!(expression.kind, NodeKind::Num(_)) {
                let _ = write!(out, "({})", expr_to_string(expression, SEQ));
            } else {
                print_expr(expression, CALL, out);
            }
            let _ = write!(out, ".{property}");
        }
        NodeKind::Sub {
            expression,
            property,
        } => {
            print_expr(expression, CALL, out);
            let _ = write!(out, "[{}]", expr_to_string(property, SEQ));
        }
        NodeKind::Array(elements) => {
            out.push('[');
            print_list(elements, out);
            out.push(']');
        }
        NodeKind::Object(props) => {
            out.push('{');
            for (i, prop) in props.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                let key = if is_identifier_name(&prop.key) {
                    prop.key.clone()
                } else {
                    format!("\"{}\"", escape_js_string(&prop.key))
                };
                match (&prop.kind, &prop.value.kind) {
                    (PropertyKind::Getter | PropertyKind::Setter, NodeKind::Function(lambda)) => {
                        let word = if prop.kind == PropertyKind::Getter { "get" } else { "set" };
                        let _ = write!(out, "{word} {key}({})", lambda.params.join(","));
                        print_block(&lambda.body, out);
                    }
                    _ => {
                        let _ = write!(out, "{key}:");
                        print_expr(&prop.value, ASSIGN, out);
                    }
                }
            }
            out.push('}');
        }
        // Statements never appear in expression position.
        _ => print_stmt(expr, out),
    }
}

fn print_args(args: &[Node], out: &mut String) {
    out.push('(');
    print_list(args, out);
    out.push(')');
}

fn print_list(items: &[Node], out: &mut String) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        print_expr(item, ASSIGN, out);
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn starts_with_ident_char(text: &str) -> bool {
    text.starts_with(|c: char| c.is_alphanumeric() || c == '_' || c == '$' || c == '.')
}

/// Append `word`, separated from a preceding identifier character.
fn push_word(out: &mut String, word: &str) {
    if out.ends_with(|c: char| c.is_alphanumeric() || c == '_' || c == '$') {
        out.push(' ');
    }
    out.push_str(word);
}

/// Append `text` after a keyword, with a space only when the two would fuse.
fn push_after_word(out: &mut String, text: &str) {
    if starts_with_ident_char(text) {
        out.push(' ');
    }
    out.push_str(text);
}

/// Whether a `new` callee has a call anywhere along its member chain.
fn has_call(callee: &Node) -> bool {
    match &callee.kind {
        NodeKind::Call { .. } => true,
        NodeKind::Dot { expression, .. } | NodeKind::Sub { expression, .. } => has_call(expression),
        _ => false,
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "0/0".into()
    } else if n == f64::INFINITY {
        "1/0".into()
    } else if n == f64::NEG_INFINITY {
        "-1/0".into()
    } else if n == 0.0 && n.is_sign_negative() {
        "-0".into()
    } else {
        number_to_string(n)
    }
}

const RESERVED_WORDS: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete", "do",
    "else", "enum", "export", "extends", "false", "finally", "for", "function", "if", "import",
    "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw", "true",
    "try", "typeof", "var", "void", "while", "with",
];

/// Identifier syntax, reserved words included (valid as property names).
fn is_identifier_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Whether `name` can stand as a bare identifier (and so as `obj.name`).
pub fn is_identifier(name: &str) -> bool {
    is_identifier_name(name) && !RESERVED_WORDS.contains(&name)
}

pub fn escape_js_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' | '\u{2029}' => {
                let _ = write!(out, "\\u{:04x}", ch as u32);
            }
            c if c.is_control() => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            _ => out.push(ch),
        }
    }
    out
}
