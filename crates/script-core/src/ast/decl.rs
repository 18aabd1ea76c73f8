//! Constructors for script-level and declaration node kinds.

use crate::arena::Arena;
use crate::span::Span;

use super::{Node, NodeData, NodeKind};

/// The script root. Top-level children are `GlobalStorage` and `State`
/// nodes (the implicit `default` state included).
pub fn script<'a>(arena: &'a Arena, span: Span) -> &'a Node<'a> {
    arena.alloc(Node::new(NodeKind::Script, NodeData::Script, span))
}

/// A top-level slot holding exactly one `GlobalVariable` or
/// `GlobalFunction` child.
pub fn global_storage<'a>(arena: &'a Arena, span: Span) -> &'a Node<'a> {
    arena.alloc(Node::new(
        NodeKind::GlobalStorage,
        NodeData::GlobalStorage,
        span,
    ))
}

/// A global variable declaration. Its single optional child is the
/// initializer expression.
pub fn global_variable<'a>(arena: &'a Arena, name: &'a str, span: Span) -> &'a Node<'a> {
    arena.alloc(Node::new(
        NodeKind::GlobalVariable,
        NodeData::GlobalVariable { name },
        span,
    ))
}

/// A global function declaration. Children: parameter `Declaration` nodes
/// (no initializer) followed by the `CompoundStatement` body.
pub fn global_function<'a>(arena: &'a Arena, name: &'a str, span: Span) -> &'a Node<'a> {
    arena.alloc(Node::new(
        NodeKind::GlobalFunction,
        NodeData::GlobalFunction { name },
        span,
    ))
}

/// A named state (a collection of event handlers).
pub fn state<'a>(arena: &'a Arena, name: &'a str, span: Span) -> &'a Node<'a> {
    arena.alloc(Node::new(NodeKind::State, NodeData::State { name }, span))
}

/// An event handler inside a state. Children: parameter `Declaration`
/// nodes, then the `CompoundStatement` body.
pub fn event_handler<'a>(arena: &'a Arena, name: &'a str, span: Span) -> &'a Node<'a> {
    arena.alloc(Node::new(
        NodeKind::EventHandler,
        NodeData::EventHandler { name },
        span,
    ))
}

/// A local variable (or parameter) declaration. Its single optional child
/// is the initializer expression.
pub fn declaration<'a>(arena: &'a Arena, name: &'a str, span: Span) -> &'a Node<'a> {
    arena.alloc(Node::new(
        NodeKind::Declaration,
        NodeData::Declaration { name },
        span,
    ))
}
