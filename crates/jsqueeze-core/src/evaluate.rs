use crate::ast::{BinaryOp, Node, NodeKind, UnaryOp};
use crate::compressor::Compressor;
use crate::error::{CompressError, Result};
use crate::options::CompressOption;
use crate::value::Value;

/// Constant evaluation: reduce an expression subtree to a [`Value`].
///
/// `Ok(None)` means "not constant" and is the normal outcome for most
/// subtrees. Folding a statement is a fault.
pub fn fold(node: &Node) -> Result<Option<Value>> {
    if node.is_statement() {
        return Err(CompressError::evaluate_statement(node));
    }
    match &node.kind {
        NodeKind::Str(s) => Ok(Some(Value::String(s.clone()))),
        NodeKind::Num(n) => Ok(Some(Value::Number(*n))),
        NodeKind::True => Ok(Some(Value::Bool(true))),
        NodeKind::False => Ok(Some(Value::Bool(false))),
        NodeKind::Null => Ok(Some(Value::Null)),
        NodeKind::Undefined => Ok(Some(Value::Undefined)),
        NodeKind::UnaryPrefix { op, expression } => {
            if !matches!(
                op,
                UnaryOp::Not | UnaryOp::TypeOf | UnaryOp::BitNot | UnaryOp::Neg | UnaryOp::Plus
            ) {
                return Ok(None);
            }
            Ok(fold(expression)?.and_then(|v| apply_unary(*op, &v)))
        }
        NodeKind::Binary { op, left, right } => {
            // Both sides fold before `&&`/`||` pick one; callers only fold
            // subtrees without side effects.
            let (Some(l), Some(r)) = (fold(left)?, fold(right)?) else {
                return Ok(None);
            };
            Ok(apply_binary(*op, l, r))
        }
        NodeKind::Conditional {
            condition,
            consequent,
            alternative,
        } => match fold(condition)? {
            Some(c) if c.to_boolean() => fold(consequent),
            Some(_) => fold(alternative),
            None => Ok(None),
        },
        _ => Ok(None),
    }
}

/// Apply a prefix operator to a constant operand.
pub fn apply_unary(op: UnaryOp, v: &Value) -> Option<Value> {
    match op {
        UnaryOp::Not => Some(Value::Bool(!v.to_boolean())),
        UnaryOp::TypeOf => Some(Value::String(v.type_of().to_string())),
        UnaryOp::BitNot => Some(Value::Number(f64::from(!v.to_int32()))),
        UnaryOp::Neg => Some(Value::Number(-v.to_number())),
        UnaryOp::Plus => Some(Value::Number(v.to_number())),
        UnaryOp::Void | UnaryOp::Delete | UnaryOp::Incr | UnaryOp::Decr => None,
    }
}

/// Apply a binary operator to constant operands.
///
/// `in` and `instanceof` throw at runtime when the right side is a
/// primitive, and every constant is a primitive, so they never fold.
pub fn apply_binary(op: BinaryOp, l: Value, r: Value) -> Option<Value> {
    let num = |n: f64| Some(Value::Number(n));
    let int = |n: i32| Some(Value::Number(f64::from(n)));
    let shift = r.to_uint32() & 31;
    match op {
        BinaryOp::And => Some(if l.to_boolean() { r } else { l }),
        BinaryOp::Or => Some(if l.to_boolean() { l } else { r }),
        BinaryOp::BitOr => int(l.to_int32() | r.to_int32()),
        BinaryOp::BitAnd => int(l.to_int32() & r.to_int32()),
        BinaryOp::BitXor => int(l.to_int32() ^ r.to_int32()),
        BinaryOp::Add => match (&l, &r) {
            (Value::String(_), _) | (_, Value::String(_)) => {
                Some(Value::String(l.to_js_string() + &r.to_js_string()))
            }
            _ => num(l.to_number() + r.to_number()),
        },
        BinaryOp::Sub => num(l.to_number() - r.to_number()),
        BinaryOp::Mul => num(l.to_number() * r.to_number()),
        BinaryOp::Div => num(l.to_number() / r.to_number()),
        BinaryOp::Mod => num(l.to_number() % r.to_number()),
        BinaryOp::Shl => int(l.to_int32().wrapping_shl(shift)),
        BinaryOp::Shr => int(l.to_int32() >> shift),
        BinaryOp::UShr => num(f64::from(l.to_uint32() >> shift)),
        BinaryOp::Eq => Some(Value::Bool(l.loose_equals(&r))),
        BinaryOp::Ne => Some(Value::Bool(!l.loose_equals(&r))),
        BinaryOp::StrictEq => Some(Value::Bool(l.strict_equals(&r))),
        BinaryOp::StrictNe => Some(Value::Bool(!l.strict_equals(&r))),
        BinaryOp::Lt => Some(Value::Bool(l.less_than(&r).unwrap_or(false))),
        BinaryOp::Gt => Some(Value::Bool(r.less_than(&l).unwrap_or(false))),
        BinaryOp::Le => Some(Value::Bool(r.less_than(&l).is_some_and(|gt| !gt))),
        BinaryOp::Ge => Some(Value::Bool(l.less_than(&r).is_some_and(|lt| !lt))),
        BinaryOp::In | BinaryOp::InstanceOf => None,
    }
}

/// The literal node for `value`, positioned at `origin`.
pub fn literal(value: Value, origin: &Node) -> Node {
    let kind = match value {
        Value::Undefined => NodeKind::Undefined,
        Value::Null => NodeKind::Null,
        Value::Bool(true) => NodeKind::True,
        Value::Bool(false) => NodeKind::False,
        Value::Number(n) => NodeKind::Num(n),
        Value::String(s) => NodeKind::Str(s),
    };
    Node::derived(kind, origin)
}

impl Compressor<'_> {
    /// Replace `node` with a literal when it folds to a constant.
    ///
    /// Returns the (possibly replaced) node and the constant, if any. With
    /// `evaluate` off the node comes back untouched.
    pub fn evaluate(&self, node: Node) -> Result<(Node, Option<Value>)> {
        if !self.option(CompressOption::Evaluate) {
            return Ok((node, None));
        }
        match fold(&node)? {
            Some(value) => {
                let lit = literal(value.clone(), &node);
                Ok((lit, Some(value)))
            }
            None => Ok((node, None)),
        }
    }
}
