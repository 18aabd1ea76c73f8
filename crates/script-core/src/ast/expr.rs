//! Constructors for expression node kinds.

use crate::arena::Arena;
use crate::ops::UnaryOp;
use crate::span::Span;
use crate::types::Type;

use super::{BinOpKind, Node, NodeData, NodeKind};

/// A binary/assignment expression. Children, in order: lhs, rhs (absent
/// only for [`BinOpKind::Empty`]).
pub fn binary_expr<'a>(arena: &'a Arena, op: BinOpKind, span: Span) -> &'a Node<'a> {
    arena.alloc(Node::new(
        NodeKind::BinaryExpression,
        NodeData::Binary { op },
        span,
    ))
}

/// A unary prefix expression. Single child: the operand.
pub fn unary_expr<'a>(arena: &'a Arena, op: UnaryOp, span: Span) -> &'a Node<'a> {
    arena.alloc(Node::new(NodeKind::UnaryExpression, NodeData::Unary { op }, span))
}

/// `( <expr> )`. Single child: the inner expression.
pub fn parenthesis_expr<'a>(arena: &'a Arena, span: Span) -> &'a Node<'a> {
    arena.alloc(Node::new(
        NodeKind::ParenthesisExpression,
        NodeData::Parenthesis,
        span,
    ))
}

/// `(<target>) <expr>`. Single child: the operand being cast.
pub fn typecast_expr<'a>(arena: &'a Arena, target: &'static Type, span: Span) -> &'a Node<'a> {
    arena.alloc(Node::new(
        NodeKind::TypecastExpression,
        NodeData::Typecast { target },
        span,
    ))
}

/// A reference to a storage location: an identifier, or an identifier plus
/// a single-character vector/quaternion member accessor. The referenced
/// [`Symbol`](crate::symbol::Symbol) is attached via [`Node::set_symbol`],
/// not carried as a child.
pub fn lvalue_expr<'a>(arena: &'a Arena, member: Option<char>, span: Span) -> &'a Node<'a> {
    arena.alloc(Node::new(
        NodeKind::LvalueExpression,
        NodeData::Lvalue { member },
        span,
    ))
}

/// A function call. Children: the argument expressions, in order.
pub fn function_expr<'a>(arena: &'a Arena, name: &'a str, span: Span) -> &'a Node<'a> {
    arena.alloc(Node::new(
        NodeKind::FunctionExpression,
        NodeData::Function { name },
        span,
    ))
}

/// `<x, y, z>`. Exactly 3 children.
pub fn vector_expr<'a>(arena: &'a Arena, span: Span) -> &'a Node<'a> {
    arena.alloc(Node::new(NodeKind::VectorExpression, NodeData::Vector, span))
}

/// `<x, y, z, s>`. Exactly 4 children.
pub fn quaternion_expr<'a>(arena: &'a Arena, span: Span) -> &'a Node<'a> {
    arena.alloc(Node::new(
        NodeKind::QuaternionExpression,
        NodeData::Quaternion,
        span,
    ))
}

/// `[a, b, c]`. Children: the element expressions, in order.
pub fn list_expr<'a>(arena: &'a Arena, span: Span) -> &'a Node<'a> {
    arena.alloc(Node::new(NodeKind::ListExpression, NodeData::List, span))
}

/// A leaf integer literal.
pub fn integer_constant<'a>(arena: &'a Arena, value: i32, span: Span) -> &'a Node<'a> {
    arena.alloc(Node::new(
        NodeKind::IntegerConstant,
        NodeData::IntegerConstant { value },
        span,
    ))
}

/// A leaf float literal.
pub fn float_constant<'a>(arena: &'a Arena, value: f32, span: Span) -> &'a Node<'a> {
    arena.alloc(Node::new(
        NodeKind::FloatConstant,
        NodeData::FloatConstant { value },
        span,
    ))
}

/// A leaf string literal (already unescaped; see `script-parser`'s string
/// literal parser for the source-to-bytes translation).
pub fn string_constant<'a>(arena: &'a Arena, value: &'a [u8], span: Span) -> &'a Node<'a> {
    arena.alloc(Node::new(
        NodeKind::StringConstant,
        NodeData::StringConstant { value },
        span,
    ))
}

/// A leaf vector literal (all-constant elements known at parse time).
pub fn vector_constant<'a>(arena: &'a Arena, x: f32, y: f32, z: f32, span: Span) -> &'a Node<'a> {
    arena.alloc(Node::new(
        NodeKind::VectorConstant,
        NodeData::VectorConstant { x, y, z },
        span,
    ))
}

/// A leaf quaternion literal.
pub fn quaternion_constant<'a>(
    arena: &'a Arena,
    x: f32,
    y: f32,
    z: f32,
    s: f32,
    span: Span,
) -> &'a Node<'a> {
    arena.alloc(Node::new(
        NodeKind::QuaternionConstant,
        NodeData::QuaternionConstant { x, y, z, s },
        span,
    ))
}

/// The simplifier's folded-constant wrapper.
pub fn constant_expr<'a>(
    arena: &'a Arena,
    value: &'a crate::constant::Constant<'a>,
    span: Span,
) -> &'a Node<'a> {
    arena.alloc(Node::new(
        NodeKind::ConstantExpression,
        NodeData::ConstantExpr { value },
        span,
    ))
}

/// A bare identifier token (used inside `Typecast`/`FunctionExpression`
/// headers before symbol resolution binds a full `LvalueExpression`).
pub fn identifier<'a>(arena: &'a Arena, name: &'a str, span: Span) -> &'a Node<'a> {
    arena.alloc(Node::new(
        NodeKind::Identifier,
        NodeData::Identifier { name },
        span,
    ))
}
