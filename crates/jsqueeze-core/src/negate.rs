use crate::ast::{BinaryOp, Node, NodeKind, UnaryOp};
use crate::compressor::Compressor;
use crate::error::{CompressError, Result};
use crate::options::CompressOption;

/// Logical negation of an expression, preferring algebraic rewrites over
/// wrapping in `!`.
///
/// With `comparations`, relational operators flip (`a < b` to `a >= b`).
/// That flip is wrong when an operand is NaN; the option exists so callers
/// can opt out.
pub fn negate(node: Node, comparations: bool) -> Result<Node> {
    if node.is_statement() {
        return Err(CompressError::negate_statement(&node));
    }
    let Node { kind, span } = node;
    let kind = match kind {
        NodeKind::UnaryPrefix {
            op: UnaryOp::Not,
            expression,
        } => return Ok(*expression),
        NodeKind::Seq { first, second } => NodeKind::Seq {
            first,
            second: Box::new(negate(*second, comparations)?),
        },
        NodeKind::Conditional {
            condition,
            consequent,
            alternative,
        } => NodeKind::Conditional {
            condition,
            consequent: Box::new(negate(*consequent, comparations)?),
            alternative: Box::new(negate(*alternative, comparations)?),
        },
        NodeKind::Binary { op, left, right } => match inverse(op, comparations) {
            Some(op) if op.is_logical() => NodeKind::Binary {
                op,
                left: Box::new(negate(*left, comparations)?),
                right: Box::new(negate(*right, comparations)?),
            },
            Some(op) => NodeKind::Binary { op, left, right },
            None => return Ok(not(Node::new(NodeKind::Binary { op, left, right }, span))),
        },
        kind => return Ok(not(Node::new(kind, span))),
    };
    Ok(Node::new(kind, span))
}

/// The operator whose result is the negation of `op`'s, if there is one.
/// `&&`/`||` map to each other and need their operands negated too.
fn inverse(op: BinaryOp, comparations: bool) -> Option<BinaryOp> {
    let flipped = match op {
        BinaryOp::Le if comparations => BinaryOp::Gt,
        BinaryOp::Lt if comparations => BinaryOp::Ge,
        BinaryOp::Ge if comparations => BinaryOp::Lt,
        BinaryOp::Gt if comparations => BinaryOp::Le,
        BinaryOp::Eq => BinaryOp::Ne,
        BinaryOp::Ne => BinaryOp::Eq,
        BinaryOp::StrictEq => BinaryOp::StrictNe,
        BinaryOp::StrictNe => BinaryOp::StrictEq,
        BinaryOp::And => BinaryOp::Or,
        BinaryOp::Or => BinaryOp::And,
        _ => return None,
    };
    Some(flipped)
}

fn not(node: Node) -> Node {
    let span = node.span;
    Node::new(
        NodeKind::UnaryPrefix {
            op: UnaryOp::Not,
            expression: Box::new(node),
        },
        span,
    )
}

impl Compressor<'_> {
    pub fn negate(&self, node: Node) -> Result<Node> {
        negate(node, self.option(CompressOption::Comparations))
    }
}
