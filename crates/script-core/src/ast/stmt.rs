//! Constructors for statement node kinds.

use crate::arena::Arena;
use crate::span::Span;

use super::{Node, NodeData, NodeKind};

/// A `{ ... }` block. Children are the statements in order; owns a nested
/// symbol table (set separately via [`Node::set_scope`]).
pub fn compound_statement<'a>(arena: &'a Arena, span: Span) -> &'a Node<'a> {
    arena.alloc(Node::new(
        NodeKind::CompoundStatement,
        NodeData::CompoundStatement,
        span,
    ))
}

/// `jump <label>;`
pub fn jump_statement<'a>(arena: &'a Arena, label: &'a str, span: Span) -> &'a Node<'a> {
    arena.alloc(Node::new(
        NodeKind::JumpStatement,
        NodeData::JumpStatement { label },
        span,
    ))
}

/// `@<name>;`
pub fn label<'a>(arena: &'a Arena, name: &'a str, span: Span) -> &'a Node<'a> {
    arena.alloc(Node::new(NodeKind::Label, NodeData::Label { name }, span))
}

/// An expression evaluated for its side effect; its result is popped by the
/// bytecode compiler. Single child: the expression.
pub fn expression_statement<'a>(arena: &'a Arena, span: Span) -> &'a Node<'a> {
    arena.alloc(Node::new(
        NodeKind::ExpressionStatement,
        NodeData::ExpressionStatement,
        span,
    ))
}

/// `return <expr>?;` Single optional child: the return value.
pub fn return_statement<'a>(arena: &'a Arena, span: Span) -> &'a Node<'a> {
    arena.alloc(Node::new(
        NodeKind::ReturnStatement,
        NodeData::ReturnStatement,
        span,
    ))
}

/// `if (cond) then_branch [else else_branch]`. Children, in order:
/// condition, then-branch, optional else-branch.
pub fn if_stmt<'a>(arena: &'a Arena, span: Span) -> &'a Node<'a> {
    arena.alloc(Node::new(NodeKind::If, NodeData::If, span))
}

/// `for (init; cond; update) body`. Children, in order: init (a
/// `Declaration`, `ExpressionStatement`, or absent), condition (optional),
/// update (optional), body.
pub fn for_stmt<'a>(arena: &'a Arena, span: Span) -> &'a Node<'a> {
    arena.alloc(Node::new(NodeKind::For, NodeData::For, span))
}

/// `do body while (cond);`. Children, in order: body, condition.
pub fn do_stmt<'a>(arena: &'a Arena, span: Span) -> &'a Node<'a> {
    arena.alloc(Node::new(NodeKind::Do, NodeData::Do, span))
}

/// `while (cond) body`. Children, in order: condition, body.
pub fn while_stmt<'a>(arena: &'a Arena, span: Span) -> &'a Node<'a> {
    arena.alloc(Node::new(NodeKind::While, NodeData::While, span))
}
