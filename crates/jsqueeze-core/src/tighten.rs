//! Statement-list tightening: squeeze each statement, flatten nested blocks,
//! drop unreachable code and join adjacent expression statements.

use crate::ast::{Node, NodeKind, Span, Walk};
use crate::compressor::{Compressor, Slot};
use crate::error::Result;
use crate::hoist::strip_initializers;
use crate::options::CompressOption;
use crate::warnings::Warning;

impl Compressor<'_> {
    /// Run the whole pipeline over one statement list.
    pub fn tighten_body(&mut self, body: Vec<Node>) -> Result<Vec<Node>> {
        let body = body
            .into_iter()
            .map(|stmt| self.squeeze_in(Slot::Other, stmt))
            .collect::<Result<Vec<_>>>()?;
        let mut body = flatten_blocks(body);
        if self.option(CompressOption::DeadCode) {
            body = self.eliminate_dead_code(body);
        }
        if self.option(CompressOption::Sequences) {
            body = join_sequences(body);
        }
        Ok(body)
    }

    /// Drop statements that follow an unconditional jump.
    ///
    /// Declarations survive: function declarations verbatim, `var`s without
    /// their initializers (with a warning) so the binding still exists.
    pub fn eliminate_dead_code(&mut self, statements: Vec<Node>) -> Vec<Node> {
        let mut out = Vec::with_capacity(statements.len());
        let mut has_quit = false;
        for stmt in statements {
            if !has_quit {
                has_quit = stmt.is_jump();
                out.push(stmt);
                continue;
            }
            if matches!(stmt.kind, NodeKind::Defun(_)) {
                out.push(stmt);
                continue;
            }

            let mut kept = Vec::new();
            stmt.walk(&mut |node| match &node.kind {
                NodeKind::Definitions {
                    kind,
                    definitions,
                    hoisted,
                } => {
                    kept.push(Node::new(
                        NodeKind::Definitions {
                            kind: *kind,
                            definitions: strip_initializers(definitions),
                            hoisted: *hoisted,
                        },
                        node.span,
                    ));
                    Walk::Skip
                }
                NodeKind::Defun(_) => {
                    kept.push(node.clone());
                    Walk::Skip
                }
                _ if node.is_scope() => Walk::Skip,
                _ => Walk::Descend,
            });
            for decl in &kept {
                self.warn(Warning::DECLARATIONS_IN_UNREACHABLE_CODE, decl.span.start);
            }
            self.fired("dead_code", stmt.span);
            out.extend(kept);
        }
        out
    }
}

/// Splice nested blocks into the list and drop empty statements.
pub fn flatten_blocks(statements: Vec<Node>) -> Vec<Node> {
    let mut out = Vec::with_capacity(statements.len());
    for stmt in statements {
        match stmt.kind {
            NodeKind::Block(body) => out.extend(body),
            NodeKind::Empty => {}
            kind => out.push(Node::new(kind, stmt.span)),
        }
    }
    out
}

/// Join runs of expression statements with the comma operator.
///
/// When the list ends in a valued `return`/`throw` preceded by exactly one
/// expression statement, the two collapse into the exit: `a(); return b();`
/// becomes `return a(), b();`. The input is consumed and a new list built.
pub fn join_sequences(statements: Vec<Node>) -> Vec<Node> {
    if statements.len() < 2 {
        return statements;
    }
    let last = statements.len() - 1;
    let mut out: Vec<Node> = Vec::with_capacity(statements.len());
    for (i, cur) in statements.into_iter().enumerate() {
        let cur = match cur.kind {
            NodeKind::SimpleStatement(second) => match take_simple(&mut out) {
                Some((first, span)) => {
                    let body = seq(first, second, span);
                    out.push(Node::new(NodeKind::SimpleStatement(Box::new(body)), span));
                    continue;
                }
                None => Node::new(NodeKind::SimpleStatement(second), cur.span),
            },
            NodeKind::Exit {
                kind,
                value: Some(value),
            } if i == last && out.len() == 1 => match take_simple(&mut out) {
                Some((first, span)) => {
                    let value = seq(first, value, span);
                    return vec![Node::new(
                        NodeKind::Exit {
                            kind,
                            value: Some(Box::new(value)),
                        },
                        cur.span,
                    )];
                }
                None => Node::new(
                    NodeKind::Exit {
                        kind,
                        value: Some(value),
                    },
                    cur.span,
                ),
            },
            kind => Node::new(kind, cur.span),
        };
        out.push(cur);
    }
    out
}

/// Pop the last statement if it is an expression statement.
fn take_simple(out: &mut Vec<Node>) -> Option<(Box<Node>, Span)> {
    match out.pop() {
        Some(Node {
            kind: NodeKind::SimpleStatement(body),
            span,
        }) => Some((body, span)),
        Some(other) => {
            out.push(other);
            None
        }
        None => None,
    }
}

fn seq(first: Box<Node>, second: Box<Node>, span: Span) -> Node {
    Node::new(NodeKind::Seq { first, second }, span)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::build::*;
    use crate::options::CompressOptions;
    use crate::output::print_to_string;

    fn printed(body: &[Node]) -> String {
        body.iter().map(print_to_string).collect()
    }

    #[test]
    fn blocks_are_spliced_and_empties_dropped() {
        let body = vec![
            call_stat("a", vec![]),
            empty(),
            block(vec![call_stat("b", vec![]), call_stat("c", vec![])]),
        ];
        assert_eq!(printed(&flatten_blocks(body)), "a();b();c();");
    }

    #[test]
    fn adjacent_statements_join() {
        let body = vec![
            call_stat("a", vec![]),
            call_stat("b", vec![]),
            if_(ident("x"), call_stat("y", vec![]), None),
            call_stat("c", vec![]),
            call_stat("d", vec![]),
        ];
        assert_eq!(printed(&join_sequences(body)), "a(),b();if(x)y();c(),d();");
    }

    #[test]
    fn single_statement_then_exit_collapses() {
        let body = vec![call_stat("a", vec![]), ret(Some(call("b", vec![])))];
        assert_eq!(printed(&join_sequences(body)), "return a(),b();");
    }

    /// Two joined statements before the exit still collapse: the
    /// accumulator holds one (fused) statement.
    #[test]
    fn fused_run_then_exit_collapses() {
        let body = vec![
            call_stat("a", vec![]),
            call_stat("b", vec![]),
            ret(Some(ident("c"))),
        ];
        assert_eq!(printed(&join_sequences(body)), "return a(),b(),c;");
    }

    #[test]
    fn exit_without_value_is_kept() {
        let body = vec![call_stat("a", vec![]), ret(None)];
        assert_eq!(printed(&join_sequences(body)), "a();return;");
    }

    #[test]
    fn exit_after_other_statement_is_kept() {
        let body = vec![
            if_(ident("x"), call_stat("y", vec![]), None),
            call_stat("a", vec![]),
            ret(Some(ident("b"))),
        ];
        assert_eq!(printed(&join_sequences(body)), "if(x)y();a();return b;");
    }

    #[test]
    fn joining_is_a_fixed_point() {
        let body = vec![call_stat("a", vec![]), call_stat("b", vec![]), call_stat("c", vec![])];
        let once = join_sequences(body);
        let twice = join_sequences(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn fused_statement_keeps_first_span() {
        let body = vec![call_stat("a", vec![]).at(1, 0), call_stat("b", vec![]).at(2, 0)];
        let out = join_sequences(body);
        assert_eq!(out[0].span, call_stat("a", vec![]).at(1, 0).span);
    }

    #[test]
    fn dead_code_keeps_declarations() {
        let mut warnings: Vec<Warning> = Vec::new();
        let out = {
            let mut c = Compressor::new(CompressOptions::default(), &mut warnings);
            c.eliminate_dead_code(vec![
                ret(Some(num(1.0))),
                var(vec![("x", Some(call("f", vec![])))]).at(2, 0),
                call_stat("g", vec![]),
                defun("h", &[], vec![]),
            ])
        };
        assert_eq!(printed(&out), "return 1;var x;function h(){}");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].message(), "Declarations in unreachable code! [2,0]");
    }

    #[test]
    fn dead_code_digs_declarations_out_of_statements() {
        let mut warnings: Vec<Warning> = Vec::new();
        let out = {
            let mut c = Compressor::new(CompressOptions::default(), &mut warnings);
            c.eliminate_dead_code(vec![
                brk(None),
                if_(
                    ident("a"),
                    block(vec![var(vec![("y", Some(num(2.0)))]), defun("k", &[], vec![])]),
                    None,
                ),
                stat(function(&[], vec![var(vec![("hidden", None)])])),
            ])
        };
        assert_eq!(printed(&out), "break;var y;function k(){}");
        assert_eq!(warnings.len(), 2);
    }
}
