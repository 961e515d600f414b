//! Declaration hoisting.
//!
//! Function declarations and `var` bindings are visible throughout their
//! scope, so they can be surfaced to the top of it. Hoisted originals stay
//! in place with their `hoisted` mark set; the squeeze rules turn them into
//! nothing (functions) or plain assignments (vars) on their next visit.

use crate::ast::{AssignOp, DeclKind, Node, NodeKind, Span, VarDef, Walk};

/// What to hoist in one scope.
#[derive(Debug, Clone, Copy)]
pub struct HoistOptions {
    pub funs: bool,
    pub vars: bool,
}

/// Surface the declarations of one scope body.
///
/// `params` is the parameter list of a function scope that does not use
/// `arguments`; hoisted variable names are appended to it instead of
/// getting a fresh `var` statement. `span` positions that statement.
pub fn hoist_declarations(
    body: Vec<Node>,
    params: Option<&mut Vec<String>>,
    span: Span,
    opts: HoistOptions,
) -> Vec<Node> {
    if !opts.funs && !opts.vars {
        return body;
    }

    let mut body = body;
    let mut hoisted: Vec<Node> = Vec::new();
    let mut vars: Vec<VarDef> = Vec::new();
    for stmt in body.iter_mut() {
        stmt.walk_mut(&mut |node| match &mut node.kind {
            NodeKind::Defun(lambda) => {
                if opts.funs {
                    hoisted.push(Node::new(NodeKind::Defun(lambda.clone()), node.span));
                    lambda.hoisted = true;
                }
                Walk::Skip
            }
            NodeKind::Definitions {
                kind: DeclKind::Var,
                definitions,
                hoisted: mark,
            } if opts.vars => {
                for def in definitions.iter() {
                    match vars.iter_mut().find(|v| v.name == def.name) {
                        Some(slot) => *slot = def.clone(),
                        None => vars.push(def.clone()),
                    }
                }
                *mark = true;
                Walk::Descend
            }
            NodeKind::Function(_) => Walk::Skip,
            _ => Walk::Descend,
        });
    }

    if !vars.is_empty() {
        match params {
            Some(params) => {
                for def in &vars {
                    if !params.contains(&def.name) {
                        params.push(def.name.clone());
                    }
                }
            }
            None => {
                let decl = Node::new(
                    NodeKind::Definitions {
                        kind: DeclKind::Var,
                        definitions: strip_initializers(&vars),
                        hoisted: false,
                    },
                    span,
                );
                hoisted.insert(0, decl);
            }
        }
    }

    tracing::trace!(
        functions = hoisted.iter().filter(|n| matches!(n.kind, NodeKind::Defun(_))).count(),
        vars = vars.len(),
        "hoisted declarations"
    );
    hoisted.extend(body);
    hoisted
}

/// Copies of `definitions` without their initializers.
pub fn strip_initializers(definitions: &[VarDef]) -> Vec<VarDef> {
    definitions
        .iter()
        .map(|def| VarDef {
            value: None,
            ..def.clone()
        })
        .collect()
}

/// `a = 1, b = 2` for the initialized bindings of a declaration, in order.
/// `None` when no binding has an initializer.
pub fn to_assignments(definitions: Vec<VarDef>) -> Option<Node> {
    let mut assignments = definitions.into_iter().filter_map(|def| {
        let value = def.value?;
        Some(Node::new(
            NodeKind::Assign {
                op: AssignOp::Assign,
                left: Box::new(Node::new(NodeKind::Ident(def.name), def.span)),
                right: value,
            },
            def.span,
        ))
    });
    let first = assignments.next()?;
    let rest: Vec<Node> = assignments.collect();
    Some(chain(first, rest))
}

/// Right-nested comma chain: `a, (b, c)`.
fn chain(first: Node, rest: Vec<Node>) -> Node {
    let mut rest = rest.into_iter();
    match rest.next() {
        None => first,
        Some(second) => {
            let span = first.span;
            let tail = chain(second, rest.collect());
            Node::new(
                NodeKind::Seq {
                    first: Box::new(first),
                    second: Box::new(tail),
                },
                span,
            )
        }
    }
}
