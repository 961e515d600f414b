//! Conservative result-type checks. Both answer "provably yes" or "don't
//! know"; neither ever claims a type it cannot show.

use crate::ast::{AssignOp, BinaryOp, Node, NodeKind, UnaryOp};

/// Whether `node` always produces a boolean.
pub fn is_boolean(node: &Node) -> bool {
    match &node.kind {
        NodeKind::True | NodeKind::False => true,
        NodeKind::UnaryPrefix { op, .. } => matches!(op, UnaryOp::Not | UnaryOp::Delete),
        NodeKind::Binary { op, left, right } => match op {
            BinaryOp::In
            | BinaryOp::InstanceOf
            | BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::StrictEq
            | BinaryOp::StrictNe
            | BinaryOp::Lt
            | BinaryOp::Le
            | BinaryOp::Gt
            | BinaryOp::Ge => true,
            BinaryOp::And | BinaryOp::Or => is_boolean(left) && is_boolean(right),
            _ => false,
        },
        NodeKind::Conditional {
            consequent,
            alternative,
            ..
        } => is_boolean(consequent) && is_boolean(alternative),
        NodeKind::Assign {
            op: AssignOp::Assign,
            right,
            ..
        } => is_boolean(right),
        NodeKind::Seq { second, .. } => is_boolean(second),
        _ => false,
    }
}

/// Whether `node` always produces a string.
pub fn is_string(node: &Node) -> bool {
    match &node.kind {
        NodeKind::Str(_) => true,
        NodeKind::UnaryPrefix {
            op: UnaryOp::TypeOf,
            ..
        } => true,
        NodeKind::Binary {
            op: BinaryOp::Add,
            left,
            right,
        } => is_string(left) || is_string(right),
        NodeKind::Assign {
            op: AssignOp::Assign,
            right,
            ..
        } => is_string(right),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::build::*;

    #[test]
    fn boolean_forms() {
        assert!(is_boolean(&boolean(false)));
        assert!(is_boolean(&not(ident("x"))));
        assert!(is_boolean(&unary(UnaryOp::Delete, dot(ident("o"), "p"))));
        assert!(is_boolean(&binary(BinaryOp::In, string("a"), ident("o"))));
        assert!(is_boolean(&binary(BinaryOp::Le, ident("a"), ident("b"))));
        assert!(is_boolean(&assign(ident("x"), boolean(true))));
        assert!(is_boolean(&seq(call("f", vec![]), not(ident("y")))));
        assert!(is_boolean(&conditional(ident("c"), boolean(true), not(ident("d")))));
    }

    /// `a && b` is only boolean when both sides are.
    #[test]
    fn logical_needs_both_sides() {
        let both = binary(BinaryOp::And, not(ident("a")), boolean(true));
        let one = binary(BinaryOp::Or, not(ident("a")), ident("b"));
        assert!(is_boolean(&both));
        assert!(!is_boolean(&one));
    }

    #[test]
    fn unknowns_are_not_boolean() {
        assert!(!is_boolean(&ident("x")));
        assert!(!is_boolean(&call("f", vec![])));
        assert!(!is_boolean(&num(0.0)));
        assert!(!is_boolean(&binary(BinaryOp::Add, boolean(true), boolean(true))));
    }

    #[test]
    fn string_forms() {
        assert!(is_string(&string("")));
        assert!(is_string(&unary(UnaryOp::TypeOf, ident("x"))));
        assert!(is_string(&binary(BinaryOp::Add, num(1.0), string("px"))));
        assert!(is_string(&assign(ident("s"), string("v"))));
        assert!(!is_string(&binary(BinaryOp::Add, num(1.0), ident("x"))));
        assert!(!is_string(&binary(BinaryOp::Sub, string("3"), string("1"))));
    }
}
