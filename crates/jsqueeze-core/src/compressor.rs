//! Compressor context: options, the ancestor stack and warning forwarding.

use std::ops::{Deref, DerefMut};

use crate::ast::{Node, NodeKind, Pos, Span, UnaryOp};
use crate::error::Result;
use crate::options::{CompressOption, CompressOptions};
use crate::warnings::{Warning, WarningSink};

/// What an ancestor is, as far as context queries care.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    If,
    Conditional,
    /// `while` or `do ... while`.
    DwLoop,
    For,
    ForIn,
    /// Prefix `!`.
    Not,
    /// `&&` or `||`.
    Logical,
    Other,
}

impl FrameKind {
    fn of(node: &Node) -> Self {
        match &node.kind {
            NodeKind::If { .. } => FrameKind::If,
            NodeKind::Conditional { .. } => FrameKind::Conditional,
            NodeKind::DwLoop { .. } => FrameKind::DwLoop,
            NodeKind::For { .. } => FrameKind::For,
            NodeKind::ForIn { .. } => FrameKind::ForIn,
            NodeKind::UnaryPrefix {
                op: UnaryOp::Not, ..
            } => FrameKind::Not,
            NodeKind::Binary { op, .. } if op.is_logical() => FrameKind::Logical,
            _ => FrameKind::Other,
        }
    }
}

/// Which child of a frame is being squeezed right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Condition,
    Init,
    Other,
}

/// One entry of the ancestor stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub kind: FrameKind,
    pub slot: Slot,
}

/// State for one top-level compression run.
///
/// The ancestor stack is not shareable between concurrent runs; use one
/// `Compressor` per run.
pub struct Compressor<'s> {
    options: CompressOptions,
    stack: Vec<Frame>,
    sink: &'s mut dyn WarningSink,
}

/// Keeps a node's frame on the ancestor stack; pops it when dropped.
///
/// Derefs to the [`Compressor`], so a rule does all its work through the
/// guard and the stack is balanced on every exit path, `?` included.
pub struct Entered<'c, 's> {
    compressor: &'c mut Compressor<'s>,
}

impl<'s> Deref for Entered<'_, 's> {
    type Target = Compressor<'s>;

    fn deref(&self) -> &Self::Target {
        self.compressor
    }
}

impl DerefMut for Entered<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.compressor
    }
}

impl Drop for Entered<'_, '_> {
    fn drop(&mut self) {
        self.compressor.stack.pop();
    }
}

impl<'s> Compressor<'s> {
    pub fn new(options: CompressOptions, sink: &'s mut dyn WarningSink) -> Self {
        Self {
            options,
            stack: Vec::new(),
            sink,
        }
    }

    pub fn option(&self, option: CompressOption) -> bool {
        self.options.get(option)
    }

    /// Squeeze `root` once.
    pub fn compress(&mut self, root: Node) -> Result<Node> {
        tracing::debug!(kind = root.kind_name(), options = ?self.options, "compress start");
        let out = self.squeeze(root)?;
        tracing::debug!(kind = out.kind_name(), "compress done");
        Ok(out)
    }

    /// Push `node` onto the ancestor stack for the lifetime of the guard.
    pub fn enter(&mut self, node: &Node) -> Entered<'_, 's> {
        self.stack.push(Frame {
            kind: FrameKind::of(node),
            slot: Slot::Other,
        });
        Entered { compressor: self }
    }

    /// Squeeze `child` as the `slot` child of the innermost frame.
    pub fn squeeze_in(&mut self, slot: Slot, child: Node) -> Result<Node> {
        if let Some(top) = self.stack.last_mut() {
            top.slot = slot;
        }
        self.squeeze(child)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// The `n`-th ancestor of the node being squeezed; 0 is its parent.
    pub fn ancestor(&self, n: usize) -> Option<&Frame> {
        self.stack
            .len()
            .checked_sub(2 + n)
            .and_then(|i| self.stack.get(i))
    }

    /// Whether only the truthiness of the current node is observed.
    ///
    /// Walks outward through `&&`/`||` parents until it reaches a
    /// truthiness-testing position (a loop/branch condition or the operand of
    /// `!`) or anything else.
    pub fn in_boolean_context(&self) -> bool {
        let mut i = self.stack.len();
        while i > 1 {
            i -= 1;
            let parent = &self.stack[i - 1];
            match parent.kind {
                FrameKind::If | FrameKind::Conditional | FrameKind::DwLoop | FrameKind::For
                    if parent.slot == Slot::Condition =>
                {
                    return true;
                }
                FrameKind::Not => return true,
                FrameKind::Logical => continue,
                _ => return false,
            }
        }
        false
    }

    /// Forward a warning to the sink when warnings are enabled.
    pub fn warn(&mut self, template: &'static str, pos: Pos) {
        if self.options.warnings {
            self.sink.warn(Warning::new(template, pos));
        }
    }

    pub(crate) fn fired(&self, rule: &'static str, span: Span) {
        tracing::trace!(rule, pos = %span.start, "rewrite");
    }

    /// `true`/`false` literal, short-encoded when `booleans` is on.
    pub(crate) fn boolean_literal(&self, value: bool, span: Span) -> Node {
        let kind = if value { NodeKind::True } else { NodeKind::False };
        self.encode_boolean(Node::new(kind, span))
    }

    /// Re-encode `true` as `!0` and `false` as `!1`.
    pub(crate) fn encode_boolean(&self, node: Node) -> Node {
        if !self.options.booleans {
            return node;
        }
        let digit = match node.kind {
            NodeKind::True => 0.0,
            NodeKind::False => 1.0,
            _ => return node,
        };
        Node::new(
            NodeKind::UnaryPrefix {
                op: UnaryOp::Not,
                expression: Box::new(Node::new(NodeKind::Num(digit), node.span)),
            },
            node.span,
        )
    }
}
