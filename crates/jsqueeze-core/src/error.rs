use crate::ast::{Node, Pos};

/// Faults that abort a compression run.
///
/// A subtree that is merely not constant is not an error: the evaluator
/// reports that as `Ok(None)` and the rule that asked simply does not fire.
#[derive(Debug, thiserror::Error)]
pub enum CompressError {
    #[error("cannot evaluate statement {kind} [{pos}]")]
    EvaluateStatement { kind: &'static str, pos: Pos },

    #[error("cannot negate statement {kind} [{pos}]")]
    NegateStatement { kind: &'static str, pos: Pos },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CompressError {
    pub(crate) fn evaluate_statement(node: &Node) -> Self {
        CompressError::EvaluateStatement {
            kind: node.kind_name(),
            pos: node.span.start,
        }
    }

    pub(crate) fn negate_statement(node: &Node) -> Self {
        CompressError::NegateStatement {
            kind: node.kind_name(),
            pos: node.span.start,
        }
    }
}

pub type Result<T> = std::result::Result<T, CompressError>;
