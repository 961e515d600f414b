//! Syntax tree consumed from the parser and handed back to the printer.
//!
//! Every form of the source language is one variant of [`NodeKind`]; a [`Node`]
//! pairs the variant with the source [`Span`] it came from. Rewrite rules
//! never patch a node in place: they take ownership of the old node, rebuild
//! it from squeezed children and, when they synthesize something new, copy the
//! span of the node it was derived from (`Node::derived`) so diagnostics stay
//! traceable to the original source.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

/// A position in the source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pos {
    pub line: u32,
    pub col: u32,
    /// Byte offset from the start of the source.
    pub offset: usize,
}

impl Pos {
    pub fn new(line: u32, col: u32, offset: usize) -> Self {
        Self { line, col, offset }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.line, self.col)
    }
}

/// Start/end positions of a node in the source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Pos,
    pub end: Pos,
}

impl Span {
    pub fn new(start: Pos, end: Pos) -> Self {
        Self { start, end }
    }
}

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

/// Prefix and postfix unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    /// `!`
    Not,
    TypeOf,
    Void,
    Delete,
    /// `~`
    BitNot,
    /// `-`
    Neg,
    /// `+`
    Plus,
    /// `++`
    Incr,
    /// `--`
    Decr,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::TypeOf => "typeof",
            UnaryOp::Void => "void",
            UnaryOp::Delete => "delete",
            UnaryOp::BitNot => "~",
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Incr => "++",
            UnaryOp::Decr => "--",
        }
    }

    /// Keyword operators need a space before an identifier operand.
    pub fn is_keyword(self) -> bool {
        matches!(self, UnaryOp::TypeOf | UnaryOp::Void | UnaryOp::Delete)
    }
}

/// Binary operators, including the short-circuit logical ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Or,
    And,
    BitOr,
    BitXor,
    BitAnd,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `===`
    StrictEq,
    /// `!==`
    StrictNe,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    InstanceOf,
    Shl,
    Shr,
    /// `>>>`
    UShr,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::BitAnd => "&",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::StrictEq => "===",
            BinaryOp::StrictNe => "!==",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::In => "in",
            BinaryOp::InstanceOf => "instanceof",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::UShr => ">>>",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
        }
    }

    /// Binding strength, higher binds tighter. `||` is the loosest binary
    /// operator; the printer places assignment, ternary and comma below it.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 4,
            BinaryOp::And => 5,
            BinaryOp::BitOr => 6,
            BinaryOp::BitXor => 7,
            BinaryOp::BitAnd => 8,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::StrictEq | BinaryOp::StrictNe => 9,
            BinaryOp::Lt
            | BinaryOp::Le
            | BinaryOp::Gt
            | BinaryOp::Ge
            | BinaryOp::In
            | BinaryOp::InstanceOf => 10,
            BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr => 11,
            BinaryOp::Add | BinaryOp::Sub => 12,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 13,
        }
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    pub fn is_word(self) -> bool {
        matches!(self, BinaryOp::In | BinaryOp::InstanceOf)
    }
}

/// Plain and compound assignment operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Shl,
    Shr,
    UShr,
    BitAnd,
    BitOr,
    BitXor,
}

impl AssignOp {
    pub fn as_str(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
            AssignOp::Mod => "%=",
            AssignOp::Shl => "<<=",
            AssignOp::Shr => ">>=",
            AssignOp::UShr => ">>>=",
            AssignOp::BitAnd => "&=",
            AssignOp::BitOr => "|=",
            AssignOp::BitXor => "^=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitKind {
    Return,
    Throw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopControlKind {
    Break,
    Continue,
}

/// The two loops sharing the "condition + body" shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DwLoopKind {
    While,
    DoWhile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclKind {
    Var,
    Const,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyKind {
    KeyValue,
    Getter,
    Setter,
}

// ---------------------------------------------------------------------------
// Auxiliary records
// ---------------------------------------------------------------------------

/// Statement label with the number of `break`/`continue` statements that
/// name it, as counted by the parser's scope analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    pub references: usize,
}

/// One binding of a `var`/`const` declaration: `name [= value]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDef {
    pub name: String,
    pub value: Option<Box<Node>>,
    pub span: Span,
}

/// Function declaration or function expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lambda {
    pub name: Option<String>,
    pub params: Vec<String>,
    pub body: Vec<Node>,
    /// Whether the body refers to `arguments`.
    pub uses_arguments: bool,
    /// Transient mark set by declaration hoisting.
    #[serde(default)]
    pub hoisted: bool,
}

/// `key: value`, `get key() {}` or `set key(v) {}` inside an object literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectProperty {
    pub kind: PropertyKind,
    pub key: String,
    pub value: Node,
    pub span: Span,
}

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

/// A syntax tree node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
}

/// Every syntax form the compressor understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    // --- Statements ---
    /// Expression statement: `expr;`.
    SimpleStatement(Box<Node>),
    /// `{ ... }`.
    Block(Vec<Node>),
    /// `;`.
    Empty,
    Debugger,
    /// `label: body`.
    Labeled { label: Label, body: Box<Node> },
    /// `return [value]` / `throw value`.
    Exit {
        kind: ExitKind,
        value: Option<Box<Node>>,
    },
    /// `break [label]` / `continue [label]`.
    LoopControl {
        kind: LoopControlKind,
        label: Option<String>,
    },
    If {
        condition: Box<Node>,
        body: Box<Node>,
        alternative: Option<Box<Node>>,
    },
    /// `while (condition) body` / `do body while (condition)`.
    DwLoop {
        kind: DwLoopKind,
        condition: Box<Node>,
        body: Box<Node>,
    },
    /// Classic `for (init; condition; step) body`.
    For {
        init: Option<Box<Node>>,
        condition: Option<Box<Node>>,
        step: Option<Box<Node>>,
        body: Box<Node>,
    },
    /// `for (init in object) body`.
    ForIn {
        init: Box<Node>,
        object: Box<Node>,
        body: Box<Node>,
    },
    /// `switch (expression) { cases }`; every element of `cases` is a `Case`.
    Switch {
        expression: Box<Node>,
        cases: Vec<Node>,
    },
    /// `case expression:` or `default:` (no expression).
    Case {
        expression: Option<Box<Node>>,
        body: Vec<Node>,
    },
    Try {
        body: Vec<Node>,
        /// A `Catch` node.
        handler: Option<Box<Node>>,
        /// A `Finally` node.
        finalizer: Option<Box<Node>>,
    },
    Catch { param: String, body: Vec<Node> },
    Finally(Vec<Node>),
    With {
        expression: Box<Node>,
        body: Box<Node>,
    },
    /// `var a = 1, b;` / `const c = 2;`.
    Definitions {
        kind: DeclKind,
        definitions: Vec<VarDef>,
        /// Transient mark set by declaration hoisting.
        #[serde(default)]
        hoisted: bool,
    },
    /// Function declaration.
    Defun(Lambda),

    // --- Scopes ---
    /// The whole program.
    Toplevel(Vec<Node>),

    // --- Expressions ---
    /// Function expression.
    Function(Lambda),
    Str(String),
    Num(f64),
    True,
    False,
    Null,
    /// The `undefined` constant (distinct from an identifier named `undefined`).
    Undefined,
    Ident(String),
    This,
    UnaryPrefix { op: UnaryOp, expression: Box<Node> },
    UnaryPostfix { op: UnaryOp, expression: Box<Node> },
    Binary {
        op: BinaryOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    Assign {
        op: AssignOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    /// `condition ? consequent : alternative`.
    Conditional {
        condition: Box<Node>,
        consequent: Box<Node>,
        alternative: Box<Node>,
    },
    /// Comma operator: `first, second`.
    Seq { first: Box<Node>, second: Box<Node> },
    Call { expression: Box<Node>, args: Vec<Node> },
    New { expression: Box<Node>, args: Vec<Node> },
    /// `expression.property`.
    Dot {
        expression: Box<Node>,
        property: String,
    },
    /// `expression[property]`.
    Sub {
        expression: Box<Node>,
        property: Box<Node>,
    },
    Array(Vec<Node>),
    Object(Vec<ObjectProperty>),
}

/// Whether a walk should descend into the children of the visited node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    Descend,
    Skip,
}

impl Node {
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// A new node positioned at the node it was derived from.
    pub fn derived(kind: NodeKind, origin: &Node) -> Self {
        Self {
            kind,
            span: origin.span,
        }
    }

    pub fn empty(span: Span) -> Self {
        Self {
            kind: NodeKind::Empty,
            span,
        }
    }

    pub fn is_empty_statement(&self) -> bool {
        matches!(self.kind, NodeKind::Empty)
    }

    /// `return`/`throw`/`break`/`continue`.
    pub fn is_jump(&self) -> bool {
        matches!(self.kind, NodeKind::Exit { .. } | NodeKind::LoopControl { .. })
    }

    /// Statement, clause and program forms. Function expressions are
    /// expressions; function declarations are statements.
    pub fn is_statement(&self) -> bool {
        match self.kind {
            NodeKind::SimpleStatement(_)
            | NodeKind::Block(_)
            | NodeKind::Empty
            | NodeKind::Debugger
            | NodeKind::Labeled { .. }
            | NodeKind::Exit { .. }
            | NodeKind::LoopControl { .. }
            | NodeKind::If { .. }
            | NodeKind::DwLoop { .. }
            | NodeKind::For { .. }
            | NodeKind::ForIn { .. }
            | NodeKind::Switch { .. }
            | NodeKind::Case { .. }
            | NodeKind::Try { .. }
            | NodeKind::Catch { .. }
            | NodeKind::Finally(_)
            | NodeKind::With { .. }
            | NodeKind::Definitions { .. }
            | NodeKind::Defun(_)
            | NodeKind::Toplevel(_) => true,
            NodeKind::Function(_)
            | NodeKind::Str(_)
            | NodeKind::Num(_)
            | NodeKind::True
            | NodeKind::False
            | NodeKind::Null
            | NodeKind::Undefined
            | NodeKind::Ident(_)
            | NodeKind::This
            | NodeKind::UnaryPrefix { .. }
            | NodeKind::UnaryPostfix { .. }
            | NodeKind::Binary { .. }
            | NodeKind::Assign { .. }
            | NodeKind::Conditional { .. }
            | NodeKind::Seq { .. }
            | NodeKind::Call { .. }
            | NodeKind::New { .. }
            | NodeKind::Dot { .. }
            | NodeKind::Sub { .. }
            | NodeKind::Array(_)
            | NodeKind::Object(_) => false,
        }
    }

    /// Nodes that open a new declaration scope.
    pub fn is_scope(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Defun(_) | NodeKind::Function(_) | NodeKind::Toplevel(_)
        )
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            NodeKind::SimpleStatement(_) => "SimpleStatement",
            NodeKind::Block(_) => "Block",
            NodeKind::Empty => "Empty",
            NodeKind::Debugger => "Debugger",
            NodeKind::Labeled { .. } => "Labeled",
            NodeKind::Exit {
                kind: ExitKind::Return,
                ..
            } => "Return",
            NodeKind::Exit {
                kind: ExitKind::Throw,
                ..
            } => "Throw",
            NodeKind::LoopControl {
                kind: LoopControlKind::Break,
                ..
            } => "Break",
            NodeKind::LoopControl {
                kind: LoopControlKind::Continue,
                ..
            } => "Continue",
            NodeKind::If { .. } => "If",
            NodeKind::DwLoop {
                kind: DwLoopKind::While,
                ..
            } => "While",
            NodeKind::DwLoop {
                kind: DwLoopKind::DoWhile,
                ..
            } => "Do",
            NodeKind::For { .. } => "For",
            NodeKind::ForIn { .. } => "ForIn",
            NodeKind::Switch { .. } => "Switch",
            NodeKind::Case { .. } => "Case",
            NodeKind::Try { .. } => "Try",
            NodeKind::Catch { .. } => "Catch",
            NodeKind::Finally(_) => "Finally",
            NodeKind::With { .. } => "With",
            NodeKind::Definitions { .. } => "Definitions",
            NodeKind::Defun(_) => "Defun",
            NodeKind::Toplevel(_) => "Toplevel",
            NodeKind::Function(_) => "Function",
            NodeKind::Str(_) => "String",
            NodeKind::Num(_) => "Number",
            NodeKind::True => "True",
            NodeKind::False => "False",
            NodeKind::Null => "Null",
            NodeKind::Undefined => "Undefined",
            NodeKind::Ident(_) => "Ident",
            NodeKind::This => "This",
            NodeKind::UnaryPrefix { .. } => "UnaryPrefix",
            NodeKind::UnaryPostfix { .. } => "UnaryPostfix",
            NodeKind::Binary { .. } => "Binary",
            NodeKind::Assign { .. } => "Assign",
            NodeKind::Conditional { .. } => "Conditional",
            NodeKind::Seq { .. } => "Seq",
            NodeKind::Call { .. } => "Call",
            NodeKind::New { .. } => "New",
            NodeKind::Dot { .. } => "Dot",
            NodeKind::Sub { .. } => "Sub",
            NodeKind::Array(_) => "Array",
            NodeKind::Object(_) => "Object",
        }
    }

    /// Call `f` on each direct child, in source order.
    pub fn for_each_child(&self, f: &mut dyn FnMut(&Node)) {
        match &self.kind {
            NodeKind::SimpleStatement(body) => f(body),
            NodeKind::Block(body)
            | NodeKind::Toplevel(body)
            | NodeKind::Finally(body)
            | NodeKind::Catch { body, .. }
            | NodeKind::Array(body) => body.iter().for_each(f),
            NodeKind::Labeled { body, .. } => f(body),
            NodeKind::Exit { value, .. } => {
                if let Some(value) = value {
                    f(value);
                }
            }
            NodeKind::If {
                condition,
                body,
                alternative,
            } => {
                f(condition);
                f(body);
                if let Some(alt) = alternative {
                    f(alt);
                }
            }
            NodeKind::DwLoop {
                kind,
                condition,
                body,
            } => match kind {
                DwLoopKind::While => {
                    f(condition);
                    f(body);
                }
                DwLoopKind::DoWhile => {
                    f(body);
                    f(condition);
                }
            },
            NodeKind::For {
                init,
                condition,
                step,
                body,
            } => {
                for part in [init, condition, step].into_iter().flatten() {
                    f(part);
                }
                f(body);
            }
            NodeKind::ForIn { init, object, body } => {
                f(init);
                f(object);
                f(body);
            }
            NodeKind::Switch { expression, cases } => {
                f(expression);
                cases.iter().for_each(f);
            }
            NodeKind::Case { expression, body } => {
                if let Some(expr) = expression {
                    f(expr);
                }
                body.iter().for_each(f);
            }
            NodeKind::Try {
                body,
                handler,
                finalizer,
            } => {
                body.iter().for_each(&mut *f);
                for clause in [handler, finalizer].into_iter().flatten() {
                    f(clause);
                }
            }
            NodeKind::With { expression, body } => {
                f(expression);
                f(body);
            }
            NodeKind::Definitions { definitions, .. } => {
                for def in definitions {
                    if let Some(value) = &def.value {
                        f(value);
                    }
                }
            }
            NodeKind::Defun(lambda) | NodeKind::Function(lambda) => lambda.body.iter().for_each(f),
            NodeKind::UnaryPrefix { expression, .. }
            | NodeKind::UnaryPostfix { expression, .. }
            | NodeKind::Dot { expression, .. } => f(expression),
            NodeKind::Binary { left, right, .. } | NodeKind::Assign { left, right, .. } => {
                f(left);
                f(right);
            }
            NodeKind::Conditional {
                condition,
                consequent,
                alternative,
            } => {
                f(condition);
                f(consequent);
                f(alternative);
            }
            NodeKind::Seq { first, second } => {
                f(first);
                f(second);
            }
            NodeKind::Call { expression, args } | NodeKind::New { expression, args } => {
                f(expression);
                args.iter().for_each(f);
            }
            NodeKind::Sub {
                expression,
                property,
            } => {
                f(expression);
                f(property);
            }
            NodeKind::Object(props) => {
                for prop in props {
                    f(&prop.value);
                }
            }
            NodeKind::Empty
            | NodeKind::Debugger
            | NodeKind::LoopControl { .. }
            | NodeKind::Str(_)
            | NodeKind::Num(_)
            | NodeKind::True
            | NodeKind::False
            | NodeKind::Null
            | NodeKind::Undefined
            | NodeKind::Ident(_)
            | NodeKind::This => {}
        }
    }

    /// Mutable counterpart of [`Node::for_each_child`].
    pub fn for_each_child_mut(&mut self, f: &mut dyn FnMut(&mut Node)) {
        match &mut self.kind {
            NodeKind::SimpleStatement(body) => f(body),
            NodeKind::Block(body)
            | NodeKind::Toplevel(body)
            | NodeKind::Finally(body)
            | NodeKind::Catch { body, .. }
            | NodeKind::Array(body) => body.iter_mut().for_each(f),
            NodeKind::Labeled { body, .. } => f(body),
            NodeKind::Exit { value, .. } => {
                if let Some(value) = value {
                    f(value);
                }
            }
            NodeKind::If {
                condition,
                body,
                alternative,
            } => {
                f(condition);
                f(body);
                if let Some(alt) = alternative {
                    f(alt);
                }
            }
            NodeKind::DwLoop {
                kind,
                condition,
                body,
            } => match kind {
                DwLoopKind::While => {
                    f(condition);
                    f(body);
                }
                DwLoopKind::DoWhile => {
                    f(body);
                    f(condition);
                }
            },
            NodeKind::For {
                init,
                condition,
                step,
                body,
            } => {
                for part in [init, condition, step].into_iter().flatten() {
                    f(part);
                }
                f(body);
            }
            NodeKind::ForIn { init, object, body } => {
                f(init);
                f(object);
                f(body);
            }
            NodeKind::Switch { expression, cases } => {
                f(expression);
                cases.iter_mut().for_each(f);
            }
            NodeKind::Case { expression, body } => {
                if let Some(expr) = expression {
                    f(expr);
                }
                body.iter_mut().for_each(f);
            }
            NodeKind::Try {
                body,
                handler,
                finalizer,
            } => {
                body.iter_mut().for_each(&mut *f);
                for clause in [handler, finalizer].into_iter().flatten() {
                    f(clause);
                }
            }
            NodeKind::With { expression, body } => {
                f(expression);
                f(body);
            }
            NodeKind::Definitions { definitions, .. } => {
                for def in definitions {
                    if let Some(value) = &mut def.value {
                        f(value);
                    }
                }
            }
            NodeKind::Defun(lambda) | NodeKind::Function(lambda) => {
                lambda.body.iter_mut().for_each(f)
            }
            NodeKind::UnaryPrefix { expression, .. }
            | NodeKind::UnaryPostfix { expression, .. }
            | NodeKind::Dot { expression, .. } => f(expression),
            NodeKind::Binary { left, right, .. } | NodeKind::Assign { left, right, .. } => {
                f(left);
                f(right);
            }
            NodeKind::Conditional {
                condition,
                consequent,
                alternative,
            } => {
                f(condition);
                f(consequent);
                f(alternative);
            }
            NodeKind::Seq { first, second } => {
                f(first);
                f(second);
            }
            NodeKind::Call { expression, args } | NodeKind::New { expression, args } => {
                f(expression);
                args.iter_mut().for_each(f);
            }
            NodeKind::Sub {
                expression,
                property,
            } => {
                f(expression);
                f(property);
            }
            NodeKind::Object(props) => {
                for prop in props {
                    f(&mut prop.value);
                }
            }
            NodeKind::Empty
            | NodeKind::Debugger
            | NodeKind::LoopControl { .. }
            | NodeKind::Str(_)
            | NodeKind::Num(_)
            | NodeKind::True
            | NodeKind::False
            | NodeKind::Null
            | NodeKind::Undefined
            | NodeKind::Ident(_)
            | NodeKind::This => {}
        }
    }

    /// Pre-order walk. `visit` decides per node whether to descend.
    pub fn walk(&self, visit: &mut dyn FnMut(&Node) -> Walk) {
        if visit(self) == Walk::Descend {
            self.for_each_child(&mut |child| child.walk(visit));
        }
    }

    /// Pre-order walk with mutable access.
    pub fn walk_mut(&mut self, visit: &mut dyn FnMut(&mut Node) -> Walk) {
        if visit(self) == Walk::Descend {
            self.for_each_child_mut(&mut |child| child.walk_mut(visit));
        }
    }

    /// Builder helper: move the node to `line:col` (start and end).
    pub fn at(mut self, line: u32, col: u32) -> Self {
        let pos = Pos::new(line, col, 0);
        self.span = Span::new(pos, pos);
        self
    }
}

// ---------------------------------------------------------------------------
// Node contract (JSON)
// ---------------------------------------------------------------------------

/// Decode a tree handed over by the parser as JSON.
pub fn from_json(text: &str) -> Result<Node> {
    Ok(serde_json::from_str(text)?)
}

/// Encode a tree for the printer as JSON.
pub fn to_json(node: &Node) -> Result<String> {
    Ok(serde_json::to_string(node)?)
}

// ---------------------------------------------------------------------------
// Hand-built trees
// ---------------------------------------------------------------------------

/// Span-less constructors for trees built by hand (embedders, tests).
pub mod build {
    use super::*;

    fn node(kind: NodeKind) -> Node {
        Node::new(kind, Span::default())
    }

    pub fn num(value: f64) -> Node {
        node(NodeKind::Num(value))
    }

    pub fn string(value: &str) -> Node {
        node(NodeKind::Str(value.to_string()))
    }

    pub fn boolean(value: bool) -> Node {
        node(if value { NodeKind::True } else { NodeKind::False })
    }

    pub fn null() -> Node {
        node(NodeKind::Null)
    }

    pub fn undefined() -> Node {
        node(NodeKind::Undefined)
    }

    pub fn ident(name: &str) -> Node {
        node(NodeKind::Ident(name.to_string()))
    }

    pub fn unary(op: UnaryOp, expression: Node) -> Node {
        node(NodeKind::UnaryPrefix {
            op,
            expression: Box::new(expression),
        })
    }

    pub fn not(expression: Node) -> Node {
        unary(UnaryOp::Not, expression)
    }

    pub fn binary(op: BinaryOp, left: Node, right: Node) -> Node {
        node(NodeKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn assign(left: Node, right: Node) -> Node {
        node(NodeKind::Assign {
            op: AssignOp::Assign,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn conditional(condition: Node, consequent: Node, alternative: Node) -> Node {
        node(NodeKind::Conditional {
            condition: Box::new(condition),
            consequent: Box::new(consequent),
            alternative: Box::new(alternative),
        })
    }

    pub fn seq(first: Node, second: Node) -> Node {
        node(NodeKind::Seq {
            first: Box::new(first),
            second: Box::new(second),
        })
    }

    /// `name(args...)`.
    pub fn call(name: &str, args: Vec<Node>) -> Node {
        node(NodeKind::Call {
            expression: Box::new(ident(name)),
            args,
        })
    }

    pub fn dot(expression: Node, property: &str) -> Node {
        node(NodeKind::Dot {
            expression: Box::new(expression),
            property: property.to_string(),
        })
    }

    pub fn sub(expression: Node, property: Node) -> Node {
        node(NodeKind::Sub {
            expression: Box::new(expression),
            property: Box::new(property),
        })
    }

    /// `expression;`.
    pub fn stat(expression: Node) -> Node {
        node(NodeKind::SimpleStatement(Box::new(expression)))
    }

    /// `name(args...);`.
    pub fn call_stat(name: &str, args: Vec<Node>) -> Node {
        stat(call(name, args))
    }

    pub fn block(body: Vec<Node>) -> Node {
        node(NodeKind::Block(body))
    }

    pub fn empty() -> Node {
        node(NodeKind::Empty)
    }

    pub fn ret(value: Option<Node>) -> Node {
        node(NodeKind::Exit {
            kind: ExitKind::Return,
            value: value.map(Box::new),
        })
    }

    pub fn throw(value: Node) -> Node {
        node(NodeKind::Exit {
            kind: ExitKind::Throw,
            value: Some(Box::new(value)),
        })
    }

    pub fn brk(label: Option<&str>) -> Node {
        node(NodeKind::LoopControl {
            kind: LoopControlKind::Break,
            label: label.map(str::to_string),
        })
    }

    pub fn if_(condition: Node, body: Node, alternative: Option<Node>) -> Node {
        node(NodeKind::If {
            condition: Box::new(condition),
            body: Box::new(body),
            alternative: alternative.map(Box::new),
        })
    }

    pub fn while_(condition: Node, body: Node) -> Node {
        node(NodeKind::DwLoop {
            kind: DwLoopKind::While,
            condition: Box::new(condition),
            body: Box::new(body),
        })
    }

    pub fn do_while(body: Node, condition: Node) -> Node {
        node(NodeKind::DwLoop {
            kind: DwLoopKind::DoWhile,
            condition: Box::new(condition),
            body: Box::new(body),
        })
    }

    pub fn var(definitions: Vec<(&str, Option<Node>)>) -> Node {
        node(NodeKind::Definitions {
            kind: DeclKind::Var,
            definitions: definitions
                .into_iter()
                .map(|(name, value)| VarDef {
                    name: name.to_string(),
                    value: value.map(Box::new),
                    span: Span::default(),
                })
                .collect(),
            hoisted: false,
        })
    }

    fn lambda(name: Option<&str>, params: &[&str], body: Vec<Node>) -> Lambda {
        Lambda {
            name: name.map(str::to_string),
            params: params.iter().map(|p| p.to_string()).collect(),
            body,
            uses_arguments: false,
            hoisted: false,
        }
    }

    pub fn defun(name: &str, params: &[&str], body: Vec<Node>) -> Node {
        node(NodeKind::Defun(lambda(Some(name), params, body)))
    }

    pub fn function(params: &[&str], body: Vec<Node>) -> Node {
        node(NodeKind::Function(lambda(None, params, body)))
    }

    pub fn toplevel(body: Vec<Node>) -> Node {
        node(NodeKind::Toplevel(body))
    }
}

#[cfg(test)]
mod tests {
    use super::build::*;
    use super::*;

    #[test]
    fn derived_node_copies_origin_span() {
        let origin = num(1.0).at(3, 7);
        let derived = Node::derived(NodeKind::True, &origin);
        assert_eq!(derived.span, origin.span);
    }

    #[test]
    fn walk_visits_in_source_order() {
        let tree = stat(binary(BinaryOp::Add, ident("a"), call("f", vec![ident("b")])));
        let mut seen = Vec::new();
        tree.walk(&mut |node| {
            if let NodeKind::Ident(name) = &node.kind {
                seen.push(name.clone());
            }
            Walk::Descend
        });
        assert_eq!(seen, vec!["a", "f", "b"]);
    }

    #[test]
    fn walk_skip_prunes_subtree() {
        let tree = toplevel(vec![
            call_stat("a", vec![]),
            defun("g", &[], vec![call_stat("hidden", vec![])]),
        ]);
        let mut seen = Vec::new();
        tree.walk(&mut |node| {
            if let NodeKind::Ident(name) = &node.kind {
                seen.push(name.clone());
            }
            if matches!(node.kind, NodeKind::Defun(_)) {
                Walk::Skip
            } else {
                Walk::Descend
            }
        });
        assert_eq!(seen, vec!["a"]);
    }

    #[test]
    fn function_expression_is_not_a_statement() {
        assert!(!function(&[], vec![]).is_statement());
        assert!(defun("f", &[], vec![]).is_statement());
        assert!(toplevel(vec![]).is_statement());
    }

    #[test]
    fn json_contract_round_trips() {
        let tree = toplevel(vec![if_(ident("a"), call_stat("b", vec![]), None)]);
        let text = to_json(&tree).unwrap();
        assert_eq!(from_json(&text).unwrap(), tree);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(from_json("{\"kind\": 12}").is_err());
    }
}
