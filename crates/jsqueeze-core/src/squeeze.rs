//! Per-node rewrite rules.
//!
//! `squeeze` takes a node by value, squeezes its children first and then
//! applies the simplifications for its kind. Every rule runs under an
//! [`Entered`](crate::compressor::Entered) guard, so ancestor queries from
//! the children see this node as their parent.

use crate::ast::{BinaryOp, DwLoopKind, Lambda, Node, NodeKind, Span, UnaryOp, VarDef};
use crate::compressor::{Compressor, FrameKind, Slot};
use crate::error::Result;
use crate::hoist::{hoist_declarations, to_assignments, HoistOptions};
use crate::options::CompressOption;
use crate::output::{is_identifier, print_to_string};
use crate::predicates::{is_boolean, is_string};
use crate::warnings::Warning;

fn boxed(node: Node) -> Box<Node> {
    Box::new(node)
}

/// Keep `a` unless `b` prints strictly shorter.
fn best_of(a: Node, b: Node) -> Node {
    if print_to_string(&a).len() > print_to_string(&b).len() {
        b
    } else {
        a
    }
}

impl Compressor<'_> {
    /// Rewrite one node (and, recursively, its children).
    pub fn squeeze(&mut self, node: Node) -> Result<Node> {
        let mut cx = self.enter(&node);
        let Node { kind, span } = node;
        match kind {
            NodeKind::Debugger => {
                if cx.option(CompressOption::DropDebugger) {
                    cx.fired("drop_debugger", span);
                    return Ok(Node::empty(span));
                }
                Ok(Node::new(NodeKind::Debugger, span))
            }
            NodeKind::Labeled { label, body } => {
                let body = cx.squeeze_in(Slot::Other, *body)?;
                if label.references == 0 {
                    cx.fired("unused_label", span);
                    return Ok(body);
                }
                Ok(Node::new(
                    NodeKind::Labeled {
                        label,
                        body: boxed(body),
                    },
                    span,
                ))
            }
            NodeKind::SimpleStatement(body) => {
                let body = cx.squeeze_in(Slot::Other, *body)?;
                Ok(Node::new(NodeKind::SimpleStatement(boxed(body)), span))
            }
            NodeKind::Block(body) => {
                let body = cx.tighten_body(body)?;
                match <[Node; 1]>::try_from(body) {
                    Ok([only]) => Ok(only),
                    Err(body) => Ok(Node::new(NodeKind::Block(body), span)),
                }
            }
            NodeKind::Toplevel(body) => {
                let body = hoist_declarations(body, None, span, cx.hoist_options());
                let body = cx.tighten_body(body)?;
                Ok(Node::new(NodeKind::Toplevel(body), span))
            }
            NodeKind::Defun(lambda) => {
                if lambda.hoisted {
                    return Ok(Node::empty(span));
                }
                let lambda = cx.squeeze_lambda(lambda, span)?;
                Ok(Node::new(NodeKind::Defun(lambda), span))
            }
            NodeKind::Function(lambda) => {
                let lambda = cx.squeeze_lambda(lambda, span)?;
                Ok(Node::new(NodeKind::Function(lambda), span))
            }
            NodeKind::Empty => Ok(Node::empty(span)),
            NodeKind::Exit { kind, value } => {
                let value = match value {
                    Some(v) => Some(boxed(cx.squeeze_in(Slot::Other, *v)?)),
                    None => None,
                };
                Ok(Node::new(NodeKind::Exit { kind, value }, span))
            }
            NodeKind::LoopControl { .. } => Ok(Node::new(kind, span)),
            NodeKind::If {
                condition,
                body,
                alternative,
            } => {
                let condition = cx.squeeze_in(Slot::Condition, *condition)?;
                let body = cx.squeeze_in(Slot::Other, *body)?;
                let alternative = match alternative {
                    Some(alt) => Some(cx.squeeze_in(Slot::Other, *alt)?),
                    None => None,
                };
                cx.optimize_if(condition, body, alternative, span)
            }
            NodeKind::DwLoop {
                kind,
                condition,
                body,
            } => {
                let condition = cx.squeeze_in(Slot::Condition, *condition)?;
                let body = cx.squeeze_in(Slot::Other, *body)?;
                cx.optimize_dw_loop(kind, condition, body, span)
            }
            NodeKind::For {
                init,
                condition,
                step,
                body,
            } => {
                let init = match init {
                    Some(init) => Some(cx.squeeze_in(Slot::Init, *init)?),
                    None => None,
                }
                .filter(|init| !init.is_empty_statement());
                let condition = match condition {
                    Some(c) => Some(cx.squeeze_in(Slot::Condition, *c)?),
                    None => None,
                };
                let step = match step {
                    Some(s) => Some(cx.squeeze_in(Slot::Other, *s)?),
                    None => None,
                };
                let body = cx.squeeze_in(Slot::Other, *body)?;
                Ok(Node::new(
                    NodeKind::For {
                        init: init.map(boxed),
                        condition: condition.map(boxed),
                        step: step.map(boxed),
                        body: boxed(body),
                    },
                    span,
                ))
            }
            NodeKind::ForIn { init, object, body } => {
                let init = cx.squeeze_in(Slot::Init, *init)?;
                let object = cx.squeeze_in(Slot::Other, *object)?;
                let body = cx.squeeze_in(Slot::Other, *body)?;
                Ok(Node::new(
                    NodeKind::ForIn {
                        init: boxed(init),
                        object: boxed(object),
                        body: boxed(body),
                    },
                    span,
                ))
            }
            NodeKind::With { expression, body } => {
                let expression = cx.squeeze_in(Slot::Other, *expression)?;
                let body = cx.squeeze_in(Slot::Other, *body)?;
                Ok(Node::new(
                    NodeKind::With {
                        expression: boxed(expression),
                        body: boxed(body),
                    },
                    span,
                ))
            }
            NodeKind::Switch { expression, cases } => {
                let expression = cx.squeeze_in(Slot::Other, *expression)?;
                let cases = cx.squeeze_list(cases)?;
                Ok(Node::new(
                    NodeKind::Switch {
                        expression: boxed(expression),
                        cases,
                    },
                    span,
                ))
            }
            NodeKind::Case { expression, body } => {
                let expression = match expression {
                    Some(e) => Some(boxed(cx.squeeze_in(Slot::Other, *e)?)),
                    None => None,
                };
                let body = cx.tighten_body(body)?;
                Ok(Node::new(NodeKind::Case { expression, body }, span))
            }
            NodeKind::Try {
                body,
                handler,
                finalizer,
            } => {
                let body = cx.tighten_body(body)?;
                let handler = match handler {
                    Some(h) => Some(boxed(cx.squeeze_in(Slot::Other, *h)?)),
                    None => None,
                };
                let finalizer = match finalizer {
                    Some(f) => Some(boxed(cx.squeeze_in(Slot::Other, *f)?)),
                    None => None,
                };
                Ok(Node::new(
                    NodeKind::Try {
                        body,
                        handler,
                        finalizer,
                    },
                    span,
                ))
            }
            NodeKind::Catch { param, body } => {
                let body = cx.tighten_body(body)?;
                Ok(Node::new(NodeKind::Catch { param, body }, span))
            }
            NodeKind::Finally(body) => {
                let body = cx.tighten_body(body)?;
                Ok(Node::new(NodeKind::Finally(body), span))
            }
            NodeKind::Definitions {
                kind,
                definitions,
                hoisted,
            } => {
                if hoisted {
                    return cx.squeeze_hoisted_definitions(definitions, span);
                }
                let mut definitions = definitions;
                for def in definitions.iter_mut() {
                    if let Some(value) = def.value.take() {
                        def.value = Some(boxed(cx.squeeze_in(Slot::Other, *value)?));
                    }
                }
                Ok(Node::new(
                    NodeKind::Definitions {
                        kind,
                        definitions,
                        hoisted,
                    },
                    span,
                ))
            }
            NodeKind::True | NodeKind::False => Ok(cx.encode_boolean(Node::new(kind, span))),
            NodeKind::Str(_)
            | NodeKind::Num(_)
            | NodeKind::Null
            | NodeKind::Undefined
            | NodeKind::Ident(_)
            | NodeKind::This => Ok(Node::new(kind, span)),
            NodeKind::UnaryPrefix { op, expression } => {
                // Context belongs to this node, before its operand is entered.
                let in_boolean = cx.in_boolean_context();
                let expression = cx.squeeze_in(Slot::Other, *expression)?;
                cx.optimize_unary_prefix(op, expression, in_boolean, span)
            }
            NodeKind::UnaryPostfix { op, expression } => {
                let expression = cx.squeeze_in(Slot::Other, *expression)?;
                Ok(Node::new(
                    NodeKind::UnaryPostfix {
                        op,
                        expression: boxed(expression),
                    },
                    span,
                ))
            }
            NodeKind::Binary { op, left, right } => {
                let left = cx.squeeze_in(Slot::Other, *left)?;
                let right = cx.squeeze_in(Slot::Other, *right)?;
                cx.optimize_binary(op, left, right, span)
            }
            NodeKind::Assign { op, left, right } => {
                let left = cx.squeeze_in(Slot::Other, *left)?;
                let right = cx.squeeze_in(Slot::Other, *right)?;
                Ok(Node::new(
                    NodeKind::Assign {
                        op,
                        left: boxed(left),
                        right: boxed(right),
                    },
                    span,
                ))
            }
            NodeKind::Conditional {
                condition,
                consequent,
                alternative,
            } => {
                let condition = cx.squeeze_in(Slot::Condition, *condition)?;
                let consequent = cx.squeeze_in(Slot::Other, *consequent)?;
                let alternative = cx.squeeze_in(Slot::Other, *alternative)?;
                cx.optimize_conditional(condition, consequent, alternative, span)
            }
            NodeKind::Seq { first, second } => {
                let first = cx.squeeze_in(Slot::Other, *first)?;
                let second = cx.squeeze_in(Slot::Other, *second)?;
                Ok(Node::new(
                    NodeKind::Seq {
                        first: boxed(first),
                        second: boxed(second),
                    },
                    span,
                ))
            }
            NodeKind::Call { expression, args } => {
                let expression = cx.squeeze_in(Slot::Other, *expression)?;
                let args = cx.squeeze_list(args)?;
                Ok(Node::new(
                    NodeKind::Call {
                        expression: boxed(expression),
                        args,
                    },
                    span,
                ))
            }
            NodeKind::New { expression, args } => {
                let expression = cx.squeeze_in(Slot::Other, *expression)?;
                let args = cx.squeeze_list(args)?;
                Ok(Node::new(
                    NodeKind::New {
                        expression: boxed(expression),
                        args,
                    },
                    span,
                ))
            }
            NodeKind::Dot {
                expression,
                property,
            } => {
                let expression = cx.squeeze_in(Slot::Other, *expression)?;
                Ok(Node::new(
                    NodeKind::Dot {
                        expression: boxed(expression),
                        property,
                    },
                    span,
                ))
            }
            NodeKind::Sub {
                expression,
                property,
            } => {
                let expression = cx.squeeze_in(Slot::Other, *expression)?;
                let property = cx.squeeze_in(Slot::Other, *property)?;
                cx.optimize_sub(expression, property, span)
            }
            NodeKind::Array(elements) => {
                let elements = cx.squeeze_list(elements)?;
                Ok(Node::new(NodeKind::Array(elements), span))
            }
            NodeKind::Object(props) => {
                let mut props = props;
                for prop in props.iter_mut() {
                    let value = std::mem::replace(&mut prop.value, Node::empty(prop.span));
                    prop.value = cx.squeeze_in(Slot::Other, value)?;
                }
                Ok(Node::new(NodeKind::Object(props), span))
            }
        }
    }

    fn squeeze_list(&mut self, nodes: Vec<Node>) -> Result<Vec<Node>> {
        nodes
            .into_iter()
            .map(|node| self.squeeze_in(Slot::Other, node))
            .collect()
    }

    fn hoist_options(&self) -> HoistOptions {
        HoistOptions {
            funs: self.option(CompressOption::HoistFuns),
            vars: self.option(CompressOption::HoistVars),
        }
    }

    fn squeeze_lambda(&mut self, lambda: Lambda, span: Span) -> Result<Lambda> {
        let Lambda {
            name,
            mut params,
            body,
            uses_arguments,
            hoisted,
        } = lambda;
        let param_sink = (!uses_arguments).then_some(&mut params);
        let body = hoist_declarations(body, param_sink, span, self.hoist_options());
        let body = self.tighten_body(body)?;
        Ok(Lambda {
            name,
            params,
            body,
            uses_arguments,
            hoisted,
        })
    }

    /// A hoisted `var` becomes its assignments; where it ends up decides
    /// what an initializer-free declaration turns into.
    fn squeeze_hoisted_definitions(
        &mut self,
        definitions: Vec<VarDef>,
        span: Span,
    ) -> Result<Node> {
        let parent = self.ancestor(0).map(|f| (f.kind, f.slot));
        let first = definitions
            .first()
            .map(|def| Node::new(NodeKind::Ident(def.name.clone()), def.span));
        let seq = match to_assignments(definitions) {
            Some(seq) => Some(self.squeeze_in(Slot::Other, seq)?),
            None => None,
        };
        let node = match (parent, seq) {
            (Some((FrameKind::ForIn, Slot::Init)), Some(seq)) => seq,
            (Some((FrameKind::ForIn, Slot::Init)), None) => {
                first.unwrap_or_else(|| Node::empty(span))
            }
            (Some((FrameKind::For, Slot::Init)), seq) => {
                seq.unwrap_or_else(|| Node::empty(span))
            }
            (_, Some(seq)) => Node::new(NodeKind::SimpleStatement(boxed(seq)), span),
            (_, None) => Node::empty(span),
        };
        Ok(node)
    }

    fn optimize_dw_loop(
        &mut self,
        kind: DwLoopKind,
        condition: Node,
        body: Node,
        span: Span,
    ) -> Result<Node> {
        if self.option(CompressOption::Dwloops) {
            let (_, value) = self.evaluate(condition.clone())?;
            match value {
                Some(v) if v.to_boolean() => {
                    self.fired("dwloop_forever", span);
                    return Ok(Node::new(
                        NodeKind::For {
                            init: None,
                            condition: None,
                            step: None,
                            body: boxed(body),
                        },
                        span,
                    ));
                }
                Some(_) if kind == DwLoopKind::While => {
                    self.warn(Warning::UNREACHABLE_CODE, span.start);
                    return Ok(Node::empty(span));
                }
                _ => {}
            }
        }
        Ok(Node::new(
            NodeKind::DwLoop {
                kind,
                condition: boxed(condition),
                body: boxed(body),
            },
            span,
        ))
    }

    fn optimize_if(
        &mut self,
        condition: Node,
        body: Node,
        alternative: Option<Node>,
        span: Span,
    ) -> Result<Node> {
        if !self.option(CompressOption::Conditionals) {
            return Ok(Node::new(
                NodeKind::If {
                    condition: boxed(condition),
                    body: boxed(body),
                    alternative: alternative.map(boxed),
                },
                span,
            ));
        }

        let (condition, value) = self.evaluate(condition)?;
        if let Some(value) = value {
            if value.to_boolean() {
                self.warn(Warning::CONDITION_ALWAYS_TRUE, condition.span.start);
                return Ok(body);
            }
            self.warn(Warning::CONDITION_ALWAYS_FALSE, condition.span.start);
            return Ok(alternative.unwrap_or_else(|| Node::empty(span)));
        }

        let (condition, body, alternative) = match condition.kind {
            NodeKind::UnaryPrefix {
                op: UnaryOp::Not,
                expression,
            } => {
                self.fired("if_unnegate", span);
                (
                    *expression,
                    alternative.unwrap_or_else(|| Node::empty(span)),
                    Some(body),
                )
            }
            kind => (Node::new(kind, condition.span), body, alternative),
        };

        let alt_is_empty = alternative.as_ref().map_or(true, Node::is_empty_statement);
        match (body.kind, alternative) {
            (NodeKind::SimpleStatement(yes), Some(Node {
                kind: NodeKind::SimpleStatement(no),
                ..
            })) => {
                self.fired("if_to_conditional", span);
                let expr = self.optimize_conditional(condition, *yes, *no, span)?;
                Ok(Node::new(NodeKind::SimpleStatement(boxed(expr)), span))
            }
            (NodeKind::SimpleStatement(yes), _) if alt_is_empty => {
                self.fired("if_to_and", span);
                let expr = self.optimize_binary(BinaryOp::And, condition, *yes, span)?;
                Ok(Node::new(NodeKind::SimpleStatement(boxed(expr)), span))
            }
            (
                NodeKind::Empty,
                Some(Node {
                    kind: NodeKind::SimpleStatement(no),
                    ..
                }),
            ) => {
                self.fired("if_to_or", span);
                let expr = self.optimize_binary(BinaryOp::Or, condition, *no, span)?;
                Ok(Node::new(NodeKind::SimpleStatement(boxed(expr)), span))
            }
            (
                NodeKind::Exit {
                    kind,
                    value: Some(yes),
                },
                Some(Node {
                    kind:
                        NodeKind::Exit {
                            kind: alt_kind,
                            value: Some(no),
                        },
                    ..
                }),
            ) if kind == alt_kind => {
                self.fired("if_exits_to_conditional", span);
                let value = self.optimize_conditional(condition, *yes, *no, span)?;
                Ok(Node::new(
                    NodeKind::Exit {
                        kind,
                        value: Some(boxed(value)),
                    },
                    span,
                ))
            }
            (body_kind, alternative) => Ok(Node::new(
                NodeKind::If {
                    condition: boxed(condition),
                    body: boxed(Node::new(body_kind, body.span)),
                    alternative: alternative.map(boxed),
                },
                span,
            )),
        }
    }

    fn optimize_conditional(
        &mut self,
        condition: Node,
        consequent: Node,
        alternative: Node,
        span: Span,
    ) -> Result<Node> {
        if !self.option(CompressOption::Conditionals) {
            return Ok(conditional(condition, consequent, alternative, span));
        }
        let (condition, value) = self.evaluate(condition)?;
        if let Some(value) = value {
            if value.to_boolean() {
                self.warn(Warning::CONDITION_ALWAYS_TRUE, span.start);
                return Ok(consequent);
            }
            self.warn(Warning::CONDITION_ALWAYS_FALSE, span.start);
            return Ok(alternative);
        }
        let reversed = conditional(
            self.negate(condition.clone())?,
            alternative.clone(),
            consequent.clone(),
            span,
        );
        Ok(best_of(
            conditional(condition, consequent, alternative, span),
            reversed,
        ))
    }

    fn optimize_unary_prefix(
        &mut self,
        op: UnaryOp,
        expression: Node,
        in_boolean: bool,
        span: Span,
    ) -> Result<Node> {
        if in_boolean && self.option(CompressOption::Booleans) {
            match (op, expression.kind) {
                (
                    UnaryOp::Not,
                    NodeKind::UnaryPrefix {
                        op: UnaryOp::Not,
                        expression: inner,
                    },
                ) => {
                    self.fired("double_not", span);
                    return Ok(*inner);
                }
                (UnaryOp::TypeOf, _) => {
                    self.warn(Warning::BOOLEAN_ALWAYS_TRUE, span.start);
                    return Ok(self.boolean_literal(true, span));
                }
                (op, kind) => {
                    let expression = Node::new(kind, expression.span);
                    return self.evaluate_unary(op, expression, span);
                }
            }
        }
        self.evaluate_unary(op, expression, span)
    }

    fn evaluate_unary(&mut self, op: UnaryOp, expression: Node, span: Span) -> Result<Node> {
        let node = Node::new(
            NodeKind::UnaryPrefix {
                op,
                expression: boxed(expression),
            },
            span,
        );
        let (node, _) = self.evaluate(node)?;
        Ok(self.encode_boolean(node))
    }

    fn optimize_binary(
        &mut self,
        op: BinaryOp,
        left: Node,
        right: Node,
        span: Span,
    ) -> Result<Node> {
        let (left, right) = if self.option(CompressOption::Booleans) && self.in_boolean_context() {
            match self.optimize_boolean_binary(op, left, right, span)? {
                Ok(node) => return Ok(self.encode_boolean(node)),
                Err(operands) => operands,
            }
        } else {
            (left, right)
        };

        let op = match op {
            BinaryOp::StrictEq | BinaryOp::StrictNe
                if self.option(CompressOption::Comparations) && same_primitive_type(&left, &right) =>
            {
                self.fired("loosen_equality", span);
                if op == BinaryOp::StrictEq {
                    BinaryOp::Eq
                } else {
                    BinaryOp::Ne
                }
            }
            op => op,
        };

        let node = Node::new(
            NodeKind::Binary {
                op,
                left: boxed(left),
                right: boxed(right),
            },
            span,
        );
        let (node, _) = self.evaluate(node)?;
        Ok(self.encode_boolean(node))
    }

    /// Truthiness of `node` if it folds, and whether it folds to a string.
    fn truthiness(&self, node: &Node) -> Result<Option<(bool, bool)>> {
        let (folded, value) = self.evaluate(node.clone())?;
        Ok(value.map(|v| (v.to_boolean(), matches!(folded.kind, NodeKind::Str(_)))))
    }

    /// `&&`, `||` and `+` where only truthiness matters. `Err` hands the
    /// operands back untouched when nothing applies.
    fn optimize_boolean_binary(
        &mut self,
        op: BinaryOp,
        left: Node,
        right: Node,
        span: Span,
    ) -> Result<std::result::Result<Node, (Node, Node)>> {
        if !matches!(op, BinaryOp::And | BinaryOp::Or | BinaryOp::Add) {
            return Ok(Err((left, right)));
        }
        // Fold copies: whatever survives keeps its operands as written.
        let lv = self.truthiness(&left)?;
        let rv = self.truthiness(&right)?;
        match op {
            BinaryOp::And => {
                if matches!(lv, Some((false, _))) || matches!(rv, Some((false, _))) {
                    self.warn(Warning::AND_ALWAYS_FALSE, span.start);
                    return Ok(Ok(self.boolean_literal(false, span)));
                }
                if lv.is_some() {
                    return Ok(Ok(right));
                }
                if rv.is_some() {
                    return Ok(Ok(left));
                }
            }
            BinaryOp::Or => {
                if matches!(lv, Some((true, _))) || matches!(rv, Some((true, _))) {
                    self.warn(Warning::OR_ALWAYS_TRUE, span.start);
                    return Ok(Ok(self.boolean_literal(true, span)));
                }
                if lv.is_some() {
                    return Ok(Ok(right));
                }
                if rv.is_some() {
                    return Ok(Ok(left));
                }
            }
            _ => {
                if matches!(lv, Some((true, true))) || matches!(rv, Some((true, true))) {
                    self.warn(Warning::PLUS_ALWAYS_TRUE, span.start);
                    return Ok(Ok(self.boolean_literal(true, span)));
                }
            }
        }
        Ok(Err((left, right)))
    }

    fn optimize_sub(&mut self, expression: Node, property: Node, span: Span) -> Result<Node> {
        if self.option(CompressOption::Properties) {
            if let NodeKind::Str(name) = &property.kind {
                if is_identifier(name) {
                    self.fired("sub_to_dot", span);
                    return Ok(Node::new(
                        NodeKind::Dot {
                            expression: boxed(expression),
                            property: name.clone(),
                        },
                        span,
                    ));
                }
            }
        }
        Ok(Node::new(
            NodeKind::Sub {
                expression: boxed(expression),
                property: boxed(property),
            },
            span,
        ))
    }
}

fn conditional(condition: Node, consequent: Node, alternative: Node, span: Span) -> Node {
    Node::new(
        NodeKind::Conditional {
            condition: boxed(condition),
            consequent: boxed(consequent),
            alternative: boxed(alternative),
        },
        span,
    )
}

/// Both operands provably strings, or both provably booleans: `===` and
/// `==` agree.
fn same_primitive_type(left: &Node, right: &Node) -> bool {
    (is_string(left) && is_string(right)) || (is_boolean(left) && is_boolean(right))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::build::*;
    use crate::ast::build::{conditional, not};
    use crate::ast::Label;
    use crate::error::CompressError;
    use crate::options::CompressOptions;

    fn run(node: Node, options: CompressOptions) -> (String, Vec<String>) {
        let mut warnings: Vec<Warning> = Vec::new();
        let out = {
            let mut c = Compressor::new(options, &mut warnings);
            c.compress(node).unwrap()
        };
        let messages = warnings.iter().map(Warning::message).collect();
        (print_to_string(&out), messages)
    }

    fn squeezed(node: Node) -> String {
        run(node, CompressOptions::default()).0
    }

    fn program(body: Vec<Node>) -> String {
        squeezed(toplevel(body))
    }

    #[test]
    fn double_not_in_condition_unwraps() {
        let out = program(vec![if_(
            not(not(ident("x"))),
            call_stat("foo", vec![]),
            None,
        )]);
        assert_eq!(out, "x&&foo();");
    }

    #[test]
    fn negated_condition_swaps_branches() {
        let out = program(vec![if_(not(ident("c")), call_stat("a", vec![]), None)]);
        assert_eq!(out, "c||a();");

        let out = program(vec![if_(
            not(ident("c")),
            call_stat("a", vec![]),
            Some(call_stat("b", vec![])),
        )]);
        assert_eq!(out, "c?b():a();");
    }

    #[test]
    fn constant_if_keeps_one_branch() {
        let (out, warnings) = run(
            toplevel(vec![if_(
                num(1.0).at(1, 3),
                call_stat("a", vec![]),
                Some(call_stat("b", vec![])),
            )]),
            CompressOptions::default(),
        );
        assert_eq!(out, "a();");
        assert_eq!(warnings, vec!["Condition always true [1,3]"]);

        let (out, warnings) = run(
            toplevel(vec![if_(num(0.0).at(2, 3), call_stat("a", vec![]), None)]),
            CompressOptions::default(),
        );
        assert_eq!(out, "");
        assert_eq!(warnings, vec!["Condition always false [2,3]"]);
    }

    #[test]
    fn exits_with_values_merge() {
        let out = program(vec![defun(
            "f",
            &[],
            vec![if_(
                ident("c"),
                ret(Some(num(1.0))),
                Some(ret(Some(num(2.0)))),
            )],
        )]);
        assert_eq!(out, "function f(){return c?1:2;}");
    }

    #[test]
    fn exit_without_value_does_not_merge() {
        let out = squeezed(if_(ident("c"), ret(None), Some(ret(Some(num(2.0))))));
        assert_eq!(out, "if(c)return;else return 2;");
    }

    #[test]
    fn conditional_prefers_shorter_orientation() {
        let out = squeezed(stat(conditional(not(ident("x")), ident("a"), ident("b"))));
        assert_eq!(out, "x?b:a;");
        let out = squeezed(stat(conditional(ident("x"), ident("a"), ident("b"))));
        assert_eq!(out, "x?a:b;");
    }

    #[test]
    fn constant_conditional_warns_at_its_own_position() {
        let (out, warnings) = run(
            stat(conditional(num(0.0), ident("a"), ident("b")).at(4, 2)),
            CompressOptions::default(),
        );
        assert_eq!(out, "b;");
        assert_eq!(warnings, vec!["Condition always false [4,2]"]);
    }

    #[test]
    fn infinite_while_becomes_for() {
        assert_eq!(
            program(vec![while_(num(1.0), call_stat("a", vec![]))]),
            "for(;;)a();"
        );
        assert_eq!(
            program(vec![while_(boolean(true), call_stat("a", vec![]))]),
            "for(;;)a();"
        );
    }

    #[test]
    fn never_running_while_is_dropped() {
        let (out, warnings) = run(
            toplevel(vec![while_(num(0.0), call_stat("a", vec![])).at(3, 0)]),
            CompressOptions::default(),
        );
        assert_eq!(out, "");
        assert_eq!(warnings, vec!["Unreachable code [3,0]"]);
    }

    /// The body of a `do` loop runs once regardless of its condition.
    #[test]
    fn falsy_do_while_is_kept() {
        let out = program(vec![do_while(call_stat("a", vec![]), num(0.0))]);
        assert_eq!(out, "do a();while(0);");
    }

    #[test]
    fn debugger_is_dropped_unless_disabled() {
        assert_eq!(program(vec![Node::new(NodeKind::Debugger, Span::default())]), "");
        let (out, _) = run(
            toplevel(vec![Node::new(NodeKind::Debugger, Span::default())]),
            CompressOptions::from_skip_list(&["drop_debugger"]),
        );
        assert_eq!(out, "debugger;");
    }

    #[test]
    fn unreferenced_label_is_removed() {
        let labeled = |references| {
            Node::new(
                NodeKind::Labeled {
                    label: Label {
                        name: "outer".into(),
                        references,
                    },
                    body: Box::new(while_(ident("x"), brk(Some("outer")))),
                },
                Span::default(),
            )
        };
        assert_eq!(squeezed(labeled(0)), "while(x)break outer;");
        assert_eq!(squeezed(labeled(1)), "outer:while(x)break outer;");
    }

    #[test]
    fn single_statement_block_unwraps() {
        let out = program(vec![if_(
            ident("x"),
            block(vec![call_stat("a", vec![])]),
            None,
        )]);
        assert_eq!(out, "x&&a();");
    }

    #[test]
    fn string_subscript_becomes_dot() {
        assert_eq!(squeezed(stat(sub(ident("a"), string("foo")))), "a.foo;");
        assert_eq!(squeezed(stat(sub(ident("a"), string("1x")))), "a[\"1x\"];");
        assert_eq!(squeezed(stat(sub(ident("a"), string("class")))), "a[\"class\"];");
    }

    #[test]
    fn boolean_literals_are_shortened() {
        assert_eq!(squeezed(stat(boolean(true))), "!0;");
        assert_eq!(squeezed(stat(boolean(false))), "!1;");
        let (out, _) = run(
            stat(boolean(true)),
            CompressOptions::from_skip_list(&["booleans"]),
        );
        assert_eq!(out, "true;");
    }

    #[test]
    fn typeof_in_boolean_context_is_true() {
        let (out, warnings) = run(
            toplevel(vec![if_(
                unary(UnaryOp::TypeOf, ident("x")),
                call_stat("f", vec![]),
                None,
            )]),
            CompressOptions::default(),
        );
        assert_eq!(out, "f();");
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].starts_with("Boolean expression always true"));
    }

    #[test]
    fn logical_operators_in_boolean_context() {
        let guarded = |cond| program(vec![if_(cond, call_stat("f", vec![]), None)]);

        assert_eq!(guarded(binary(BinaryOp::And, num(1.0), ident("a"))), "a&&f();");
        assert_eq!(guarded(binary(BinaryOp::Or, ident("a"), num(0.0))), "a&&f();");
        assert_eq!(guarded(binary(BinaryOp::And, ident("a"), num(0.0))), "");
        assert_eq!(guarded(binary(BinaryOp::Or, ident("a"), num(1.0))), "f();");
        assert_eq!(guarded(binary(BinaryOp::Add, ident("a"), string("x"))), "f();");
        // Nothing folds, so the operands stay short-encoded.
        assert_eq!(guarded(binary(BinaryOp::Add, boolean(false), ident("x"))), "!1+x&&f();");
    }

    #[test]
    fn logical_warnings() {
        let (_, warnings) = run(
            toplevel(vec![if_(
                binary(BinaryOp::And, ident("a"), num(0.0)).at(5, 4),
                call_stat("f", vec![]),
                None,
            )]),
            CompressOptions::default(),
        );
        assert_eq!(warnings[0], "Boolean && always false [5,4]");
    }

    /// Outside a boolean context `&&` keeps its operands.
    #[test]
    fn logical_outside_boolean_context_is_kept() {
        let out = squeezed(stat(assign(
            ident("v"),
            binary(BinaryOp::And, num(1.0), ident("a")),
        )));
        assert_eq!(out, "v=1&&a;");
    }

    #[test]
    fn strict_equality_loosens_on_same_types() {
        let typeof_x = || unary(UnaryOp::TypeOf, ident("x"));
        assert_eq!(
            squeezed(stat(binary(BinaryOp::StrictEq, typeof_x(), string("y")))),
            "typeof x==\"y\";"
        );
        assert_eq!(
            squeezed(stat(binary(BinaryOp::StrictNe, not(ident("a")), not(ident("b"))))),
            "!a!=!b;"
        );
        assert_eq!(
            squeezed(stat(binary(BinaryOp::StrictEq, ident("a"), string("y")))),
            "a===\"y\";"
        );
    }

    #[test]
    fn constants_fold() {
        assert_eq!(
            squeezed(stat(binary(BinaryOp::Add, num(1.0), num(2.0)))),
            "3;"
        );
        assert_eq!(
            squeezed(stat(binary(BinaryOp::Lt, num(1.0), num(2.0)))),
            "!0;"
        );
    }

    #[test]
    fn toplevel_hoists_functions_and_vars() {
        let out = program(vec![
            call_stat("f", vec![]),
            var(vec![("a", Some(num(1.0)))]),
            defun("g", &[], vec![]),
        ]);
        assert_eq!(out, "var a;function g(){}f(),a=1;");
    }

    #[test]
    fn function_vars_become_parameters() {
        let out = squeezed(stat(function(
            &["x"],
            vec![var(vec![("y", Some(num(1.0)))]), ret(Some(ident("y")))],
        )));
        assert_eq!(out, "(function(x,y){return y=1,y;});");
    }

    #[test]
    fn functions_using_arguments_keep_their_vars() {
        let NodeKind::Function(mut lambda) = function(&["x"], vec![var(vec![("y", None)])]).kind
        else {
            panic!("Expected Function");
        };
        lambda.uses_arguments = true;
        let out = squeezed(stat(Node::new(NodeKind::Function(lambda), Span::default())));
        assert_eq!(out, "(function(x){var y;});");
    }

    #[test]
    fn hoisted_loop_heads() {
        let for_loop = |init| {
            Node::new(
                NodeKind::For {
                    init: Some(Box::new(init)),
                    condition: None,
                    step: None,
                    body: Box::new(call_stat("f", vec![])),
                },
                Span::default(),
            )
        };
        assert_eq!(
            program(vec![for_loop(var(vec![("i", Some(num(0.0)))]))]),
            "var i;for(i=0;;)f();"
        );
        assert_eq!(
            program(vec![for_loop(var(vec![("i", None)]))]),
            "var i;for(;;)f();"
        );

        let for_in = Node::new(
            NodeKind::ForIn {
                init: Box::new(var(vec![("k", None)])),
                object: Box::new(ident("o")),
                body: Box::new(call_stat("f", vec![])),
            },
            Span::default(),
        );
        assert_eq!(program(vec![for_in]), "var k;for(k in o)f();");
    }

    #[test]
    fn options_off_leave_if_alone() {
        let (out, _) = run(
            toplevel(vec![if_(ident("x"), call_stat("a", vec![]), None)]),
            CompressOptions::from_skip_list(&["conditionals"]),
        );
        assert_eq!(out, "if(x)a();");
    }

    #[test]
    fn fault_unwinds_the_stack() {
        let mut sink = crate::warnings::NullSink;
        let mut c = Compressor::new(CompressOptions::default(), &mut sink);
        let bad = toplevel(vec![stat(binary(BinaryOp::Add, empty(), num(1.0)))]);
        let err = c.compress(bad).unwrap_err();
        assert!(matches!(err, CompressError::EvaluateStatement { kind: "Empty", .. }));
        assert_eq!(c.depth(), 0);
    }

    #[test]
    fn squeeze_is_idempotent() {
        let input = toplevel(vec![
            call_stat("a", vec![]),
            if_(not(ident("c")), call_stat("b", vec![]), Some(call_stat("d", vec![]))),
            while_(boolean(true), block(vec![call_stat("e", vec![]), brk(None)])),
            stat(binary(BinaryOp::StrictEq, boolean(true), ident("z"))),
        ]);
        let mut sink = crate::warnings::NullSink;
        let mut c = Compressor::new(CompressOptions::default(), &mut sink);
        let once = c.compress(input).unwrap();
        let twice = c.compress(once.clone()).unwrap();
        assert_eq!(print_to_string(&once), print_to_string(&twice));
    }
}
