//! The AST node model.
//!
//! Nodes are allocated once into a compilation [`Arena`](crate::arena::Arena)
//! and form an intrusive tree: each node owns a `first_child` pointer, a
//! `next_sibling` pointer, and a weak `parent` back-pointer. All three are
//! `Cell`s so passes can splice the tree in place (see [`Node::replace_with`]
//! and [`Node::prune`]) without an owning `Vec<Node>` getting in the way —
//! exactly the shape the specification's visitor and simplifier require.
//!
//! The node-kind hierarchy the spec describes as a class hierarchy with
//! virtual dispatch is re-architected here as one flat [`NodeKind`] tag plus
//! a [`NodeData`] payload enum; the visitor framework in `script-compiler`
//! dispatches on `NodeKind` via pattern matching instead of vtables.

pub mod decl;
pub mod expr;
pub mod stmt;

use std::cell::Cell;
use std::fmt;

use crate::constant::Constant;
use crate::ops::{BinaryOp, UnaryOp};
use crate::span::Span;
use crate::symbol::{Symbol, SymbolTable};
use crate::types::Type;

pub use decl::*;
pub use expr::*;
pub use stmt::*;

/// The node-type tag. One variant per node kind named in the data model;
/// the visitor framework's per-kind dispatch switches on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Script,
    GlobalStorage,
    GlobalVariable,
    GlobalFunction,
    EventHandler,
    State,
    CompoundStatement,
    Declaration,
    JumpStatement,
    Label,
    ExpressionStatement,
    ReturnStatement,
    If,
    For,
    Do,
    While,
    /// The generic binary/assignment expression base (§4.3 "Expression
    /// (generic)"). Covers plain binary operators, the parenthesis-like
    /// empty-op wrapper, and assignment, distinguished by [`BinOpKind`].
    BinaryExpression,
    UnaryExpression,
    ParenthesisExpression,
    TypecastExpression,
    LvalueExpression,
    FunctionExpression,
    VectorExpression,
    QuaternionExpression,
    ListExpression,
    /// Wrapper the simplifier introduces around a folded constant value.
    ConstantExpression,
    IntegerConstant,
    FloatConstant,
    StringConstant,
    VectorConstant,
    QuaternionConstant,
    Identifier,
    Type,
}

/// The operator carried by a [`NodeKind::BinaryExpression`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOpKind {
    /// No operator: a bare pass-through wrapper (distinct from
    /// `ParenthesisExpression`, which the parser emits for explicit
    /// parentheses; `Empty` arises from grammar productions that wrap a
    /// single sub-expression without syntax of their own).
    Empty,
    /// `=` assignment (`rhs`'s value is stored into `lhs`).
    Assign,
    /// Compound assignment (`+=`, `-=`, ...): apply `op` to `lhs` and `rhs`,
    /// then store into `lhs`.
    CompoundAssign(BinaryOp),
    /// A plain binary operator with no assignment.
    Op(BinaryOp),
}

/// Kind-specific payload. Tree structure (parent/sibling/child) lives on
/// [`Node`] itself, not here.
pub enum NodeData<'a> {
    Script,
    /// Wraps exactly one child: a `GlobalVariable` or `GlobalFunction` node.
    GlobalStorage,
    GlobalVariable { name: &'a str },
    GlobalFunction { name: &'a str },
    EventHandler { name: &'a str },
    State { name: &'a str },
    CompoundStatement,
    Declaration { name: &'a str },
    JumpStatement { label: &'a str },
    Label { name: &'a str },
    ExpressionStatement,
    ReturnStatement,
    If,
    For,
    Do,
    While,
    Binary { op: BinOpKind },
    Unary { op: UnaryOp },
    Parenthesis,
    Typecast { target: &'static Type },
    /// Optional single-character member accessor on a vector/quaternion
    /// lvalue (`x`, `y`, `z`, `s`).
    Lvalue { member: Option<char> },
    Function { name: &'a str },
    Vector,
    Quaternion,
    List,
    ConstantExpr { value: &'a Constant<'a> },
    IntegerConstant { value: i32 },
    FloatConstant { value: f32 },
    StringConstant { value: &'a [u8] },
    VectorConstant { x: f32, y: f32, z: f32 },
    QuaternionConstant { x: f32, y: f32, z: f32, s: f32 },
    Identifier { name: &'a str },
    TypeRef { ty: &'static Type },
}

/// A node in the AST. See the module docs for the tree-mutation model.
pub struct Node<'a> {
    pub kind: NodeKind,
    pub data: NodeData<'a>,
    pub span: Span,

    parent: Cell<Option<&'a Node<'a>>>,
    next_sibling: Cell<Option<&'a Node<'a>>>,
    first_child: Cell<Option<&'a Node<'a>>>,

    ty: Cell<Option<&'static Type>>,
    symbol: Cell<Option<&'a Symbol<'a>>>,
    constant_value: Cell<Option<&'a Constant<'a>>>,
    constant_precluded: Cell<bool>,
    is_static: Cell<bool>,
    scope: Cell<Option<&'a SymbolTable<'a>>>,
}

impl<'a> Node<'a> {
    /// Construct a detached node (no parent, no children, no siblings).
    /// Callers attach it into the tree with [`Node::append_child`].
    pub fn new(kind: NodeKind, data: NodeData<'a>, span: Span) -> Node<'a> {
        Node {
            kind,
            data,
            span,
            parent: Cell::new(None),
            next_sibling: Cell::new(None),
            first_child: Cell::new(None),
            ty: Cell::new(None),
            symbol: Cell::new(None),
            constant_value: Cell::new(None),
            constant_precluded: Cell::new(false),
            is_static: Cell::new(false),
            scope: Cell::new(None),
        }
    }

    pub fn parent(&self) -> Option<&'a Node<'a>> {
        self.parent.get()
    }

    pub fn next_sibling(&self) -> Option<&'a Node<'a>> {
        self.next_sibling.get()
    }

    pub fn first_child(&self) -> Option<&'a Node<'a>> {
        self.first_child.get()
    }

    pub fn ty(&self) -> Option<&'static Type> {
        self.ty.get()
    }

    pub fn set_ty(&self, ty: &'static Type) {
        self.ty.set(Some(ty));
    }

    pub fn symbol(&self) -> Option<&'a Symbol<'a>> {
        self.symbol.get()
    }

    pub fn set_symbol(&self, symbol: &'a Symbol<'a>) {
        self.symbol.set(Some(symbol));
    }

    pub fn constant_value(&self) -> Option<&'a Constant<'a>> {
        self.constant_value.get()
    }

    pub fn set_constant_value(&self, value: Option<&'a Constant<'a>>) {
        self.constant_value.set(value);
    }

    pub fn constant_precluded(&self) -> bool {
        self.constant_precluded.get()
    }

    pub fn set_constant_precluded(&self, precluded: bool) {
        self.constant_precluded.set(precluded);
    }

    pub fn is_static(&self) -> bool {
        self.is_static.get()
    }

    pub fn set_static(&self, is_static: bool) {
        self.is_static.set(is_static);
    }

    pub fn scope(&self) -> Option<&'a SymbolTable<'a>> {
        self.scope.get()
    }

    pub fn set_scope(&self, scope: &'a SymbolTable<'a>) {
        self.scope.set(Some(scope));
    }

    /// Append `child` as the last of this node's children, setting its
    /// parent pointer. O(children so far) — the tree is built once by the
    /// parser with small sibling counts, so the linear scan is not a
    /// bottleneck in practice.
    pub fn append_child(&'a self, child: &'a Node<'a>) {
        child.parent.set(Some(self));
        child.next_sibling.set(None);
        match self.last_child() {
            Some(last) => last.next_sibling.set(Some(child)),
            None => self.first_child.set(Some(child)),
        }
    }

    fn last_child(&self) -> Option<&'a Node<'a>> {
        let mut current = self.first_child.get()?;
        while let Some(next) = current.next_sibling.get() {
            current = next;
        }
        Some(current)
    }

    /// Iterate this node's children left to right.
    pub fn children(&self) -> ChildIter<'a> {
        ChildIter {
            next: self.first_child.get(),
        }
    }

    /// Walk parents to the unique script root.
    pub fn get_root(&'a self) -> &'a Node<'a> {
        let mut current = self;
        while let Some(parent) = current.parent.get() {
            current = parent;
        }
        current
    }

    /// Splice `new_node` into `old_node`'s position in the tree: same
    /// parent, same next-sibling, and the previous sibling (or parent's
    /// `first_child`) repointed at `new_node` instead. `old_node` becomes
    /// detached (its own parent/sibling pointers are left as-is, but nothing
    /// in the tree still points to it).
    pub fn replace_with(old_node: &'a Node<'a>, new_node: &'a Node<'a>) {
        let parent = old_node
            .parent
            .get()
            .expect("replace_with requires old_node to be attached to a tree");

        new_node.parent.set(Some(parent));
        new_node.next_sibling.set(old_node.next_sibling.get());

        match parent.first_child.get() {
            Some(first) if std::ptr::eq(first, old_node) => {
                parent.first_child.set(Some(new_node));
            }
            Some(first) => {
                let mut prev = first;
                while let Some(next) = prev.next_sibling.get() {
                    if std::ptr::eq(next, old_node) {
                        prev.next_sibling.set(Some(new_node));
                        break;
                    }
                    prev = next;
                }
            }
            None => unreachable!("old_node's parent has no children"),
        }
    }

    /// Detach `child` from its parent's child chain. The child's own
    /// `parent`/`next_sibling` pointers are left untouched (diagnostic code
    /// walking from a dangling reference would still see its old position),
    /// but nothing reachable from the root points to it afterward.
    pub fn prune_child(parent: &'a Node<'a>, child: &'a Node<'a>) {
        match parent.first_child.get() {
            Some(first) if std::ptr::eq(first, child) => {
                parent.first_child.set(child.next_sibling.get());
            }
            Some(first) => {
                let mut prev = first;
                while let Some(next) = prev.next_sibling.get() {
                    if std::ptr::eq(next, child) {
                        prev.next_sibling.set(child.next_sibling.get());
                        break;
                    }
                    prev = next;
                }
            }
            None => {}
        }
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?}", self.kind, self.span)
    }
}

/// Iterator over a node's children, left to right.
pub struct ChildIter<'a> {
    next: Option<&'a Node<'a>>,
}

impl<'a> Iterator for ChildIter<'a> {
    type Item = &'a Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.next_sibling();
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;

    fn leaf<'a>(arena: &'a Arena, v: i32) -> &'a Node<'a> {
        arena.alloc(Node::new(
            NodeKind::IntegerConstant,
            NodeData::IntegerConstant { value: v },
            Span::default(),
        ))
    }

    #[test]
    fn append_and_iterate_children() {
        let arena = Arena::new();
        let root = arena.alloc(Node::new(NodeKind::ListExpression, NodeData::List, Span::default()));
        let a = leaf(&arena, 1);
        let b = leaf(&arena, 2);
        root.append_child(a);
        root.append_child(b);

        let kinds: Vec<NodeKind> = root.children().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![NodeKind::IntegerConstant, NodeKind::IntegerConstant]);
        assert!(std::ptr::eq(a.parent().unwrap(), root));
        assert!(std::ptr::eq(b.parent().unwrap(), root));
    }

    #[test]
    fn get_root_walks_to_script() {
        let arena = Arena::new();
        let script = arena.alloc(Node::new(NodeKind::Script, NodeData::Script, Span::default()));
        let child = leaf(&arena, 1);
        script.append_child(child);
        assert!(std::ptr::eq(child.get_root(), script));
    }

    #[test]
    fn replace_with_splices_in_place() {
        let arena = Arena::new();
        let root = arena.alloc(Node::new(NodeKind::ListExpression, NodeData::List, Span::default()));
        let a = leaf(&arena, 1);
        let b = leaf(&arena, 2);
        let c = leaf(&arena, 3);
        root.append_child(a);
        root.append_child(b);
        root.append_child(c);

        let replacement = leaf(&arena, 99);
        Node::replace_with(b, replacement);

        let values: Vec<i32> = root
            .children()
            .map(|c| match c.data {
                NodeData::IntegerConstant { value } => value,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(values, vec![1, 99, 3]);
    }

    #[test]
    fn prune_child_removes_from_chain() {
        let arena = Arena::new();
        let root = arena.alloc(Node::new(NodeKind::ListExpression, NodeData::List, Span::default()));
        let a = leaf(&arena, 1);
        let b = leaf(&arena, 2);
        root.append_child(a);
        root.append_child(b);

        Node::prune_child(root, a);
        let kinds: Vec<NodeKind> = root.children().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![NodeKind::IntegerConstant]);
    }
}
