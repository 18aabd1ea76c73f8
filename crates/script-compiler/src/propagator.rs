//! The constant-value propagator.
//!
//! Walks the tree bottom-up (structurally — the driver still visits
//! pre-order, but every node's constant depends only on children already
//! folded into `constant_value` by the time its own `visit_*` runs, since a
//! `visit_*` method only *reads* children after the generic `walk` driver
//! has already recursed into them... except it hasn't: the driver calls
//! `dispatch` *before* recursing. Each `visit_*` method below therefore
//! descends into its own children itself where it needs their constants,
//! rather than relying on the generic driver's post-dispatch recursion.
//!
//! Before any node is dispatched, [`ConstantPropagator::before_descend`]
//! clears stale `constant_value`/`constant_precluded` state so a second run
//! over an already-folded tree recomputes from scratch — except on nodes
//! whose value is set once and never revisited (`is_static()` nodes, and
//! the raw constant leaves), which must survive re-running idempotently.

use script_core::ast::{BinOpKind, Node, NodeData, NodeKind};
use script_core::{Arena, Constant, TypeKind};

use crate::visitor::{Visitor, walk};

/// Node kinds whose `constant_value` is assigned once at construction and
/// must not be cleared by `before_descend` on a re-run.
fn is_raw_constant_leaf(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::IntegerConstant
            | NodeKind::FloatConstant
            | NodeKind::StringConstant
            | NodeKind::VectorConstant
            | NodeKind::QuaternionConstant
            | NodeKind::ConstantExpression
    )
}

pub struct ConstantPropagator<'a> {
    arena: &'a Arena,
}

impl<'a> ConstantPropagator<'a> {
    pub fn new(arena: &'a Arena) -> Self {
        Self { arena }
    }

    /// Run the propagator over a script root.
    pub fn run(&mut self, root: &'a Node<'a>) {
        walk(self, root);
    }

    fn seed_leaf(&self, node: &'a Node<'a>) {
        let value = match node.data {
            NodeData::IntegerConstant { value } => Constant::integer(self.arena, value),
            NodeData::FloatConstant { value } => Constant::float(self.arena, value),
            NodeData::StringConstant { value } => Constant::string(self.arena, value),
            NodeData::VectorConstant { x, y, z } => Constant::vector(self.arena, x, y, z),
            NodeData::QuaternionConstant { x, y, z, s } => {
                Constant::quaternion(self.arena, x, y, z, s)
            }
            NodeData::ConstantExpr { value } => value,
            _ => return,
        };
        node.set_constant_value(Some(value));
    }

    /// Fold every direct child of `node`, left to right, then return their
    /// constants in order (a child that didn't fold contributes `None`).
    fn fold_children(&mut self, node: &'a Node<'a>) -> Vec<Option<&'a Constant<'a>>> {
        node.children()
            .map(|child| {
                walk(self, child);
                child.constant_value()
            })
            .collect()
    }

    fn propagate_generic_expression(&mut self, node: &'a Node<'a>) {
        let op = match node.data {
            NodeData::Binary { op } => op,
            _ => unreachable!("propagate_generic_expression called on a non-binary node"),
        };

        let children = self.fold_children(node);

        match op {
            BinOpKind::Empty => {
                if let Some(&first) = children.first() {
                    node.set_constant_value(first);
                }
            }
            BinOpKind::Assign => {
                if let Some(&rhs) = children.get(1) {
                    node.set_constant_value(rhs);
                }
            }
            BinOpKind::CompoundAssign(_) => {
                // A compound assignment's own value is never a compile-time
                // constant: the left side's prior value participates, and
                // that is a runtime read regardless of whether the symbol
                // currently holds a constant.
            }
            BinOpKind::Op(bin_op) => {
                let lhs = children.first().copied().flatten();
                let rhs = children.get(1).copied().flatten();
                if let Some(lhs) = lhs {
                    if rhs.is_some() || children.len() < 2 {
                        if let Some(result) = lhs.operation(bin_op, rhs, self.arena, node.span) {
                            node.set_constant_value(Some(result));
                        }
                    }
                }
            }
        }
    }

    fn extract_component(value: &'a Constant<'a>, member: char, arena: &'a Arena) -> Option<&'a Constant<'a>> {
        let (x, y, z, s) = match value.data() {
            script_core::ConstantData::Vector(x, y, z) => (*x, *y, *z, 0.0),
            script_core::ConstantData::Quaternion(x, y, z, s) => (*x, *y, *z, *s),
            _ => return None,
        };
        let component = match member {
            'x' => x,
            'y' => y,
            'z' => z,
            's' => s,
            _ => return None,
        };
        Some(Constant::float(arena, component))
    }
}

impl<'a> Visitor<'a> for ConstantPropagator<'a> {
    fn before_descend(&mut self, node: &'a Node<'a>) -> bool {
        if node.kind == NodeKind::Script {
            // The script node drives its own two-pass traversal in
            // `visit_script`; don't let the generic driver recurse into it
            // a second time afterward.
            return true;
        }
        if node.is_static() || is_raw_constant_leaf(node.kind) {
            return true;
        }
        node.set_constant_value(None);
        node.set_constant_precluded(false);
        let is_error_typed = node
            .ty()
            .is_some_and(|ty| std::ptr::eq(ty, script_core::TypeRegistry::get(TypeKind::Error)));
        if is_error_typed {
            node.set_constant_precluded(true);
            return false;
        }
        true
    }

    fn visit_script(&mut self, node: &'a Node<'a>) -> bool {
        // Globals first, in document order, so a later global's initializer
        // can see an earlier global's already-folded constant; then a full
        // pass over everything (function/event bodies included), which
        // redundantly but harmlessly re-walks the globals already handled.
        for child in node.children() {
            let is_global_storage = child.kind == NodeKind::GlobalStorage
                && child
                    .children()
                    .next()
                    .is_some_and(|c| c.kind == NodeKind::GlobalVariable);
            if !is_global_storage {
                break;
            }
            walk(self, child);
        }
        for child in node.children() {
            walk(self, child);
        }
        false
    }

    fn visit_declaration(&mut self, node: &'a Node<'a>) -> bool {
        let children = self.fold_children(node);
        if let (NodeData::Declaration { .. }, Some(symbol)) = (&node.data, node.symbol()) {
            let initializer = children.first().copied().flatten();
            symbol.set_constant_value(initializer);
            symbol.set_constant_precluded(
                node.children().next().is_some_and(|c| c.constant_precluded()),
            );
        }
        false
    }

    fn visit_global_variable(&mut self, node: &'a Node<'a>) -> bool {
        let children = self.fold_children(node);
        if let Some(symbol) = node.symbol() {
            let initializer = children.first().copied().flatten();
            symbol.set_constant_value(initializer);
            symbol.set_constant_precluded(
                node.children().next().is_some_and(|c| c.constant_precluded()),
            );
        }
        false
    }

    fn visit_binary_expression(&mut self, node: &'a Node<'a>) -> bool {
        self.propagate_generic_expression(node);
        false
    }

    fn visit_unary_expression(&mut self, node: &'a Node<'a>) -> bool {
        let children = self.fold_children(node);
        let NodeData::Unary { op } = node.data else {
            unreachable!()
        };
        if let Some(Some(operand)) = children.first() {
            if let Some(result) = operand.unary(op, self.arena) {
                node.set_constant_value(Some(result));
            }
        }
        false
    }

    fn visit_parenthesis_expression(&mut self, node: &'a Node<'a>) -> bool {
        let children = self.fold_children(node);
        if let Some(&inner) = children.first() {
            node.set_constant_value(inner);
        }
        false
    }

    fn visit_typecast_expression(&mut self, node: &'a Node<'a>) -> bool {
        let children = self.fold_children(node);
        let NodeData::Typecast { target } = node.data else {
            unreachable!()
        };
        let operand_precluded = node.children().next().is_some_and(|c| c.constant_precluded());
        match children.first().copied().flatten() {
            None => node.set_constant_precluded(operand_precluded),
            Some(value) if std::ptr::eq(value.get_type(), target) => {
                node.set_constant_value(Some(value))
            }
            Some(value) => {
                if let Some(cast) = value.cast(target.itype(), self.arena) {
                    node.set_constant_value(Some(cast));
                }
            }
        }
        false
    }

    fn visit_lvalue_expression(&mut self, node: &'a Node<'a>) -> bool {
        let NodeData::Lvalue { member } = node.data else {
            unreachable!()
        };
        let Some(symbol) = node.symbol() else {
            node.set_constant_precluded(true);
            return false;
        };
        if symbol.assignments() != 0 {
            return false;
        }
        let Some(base) = symbol.constant_value() else {
            node.set_constant_precluded(symbol.constant_precluded());
            return false;
        };
        match member {
            None => node.set_constant_value(Some(base)),
            Some(m) => {
                if let Some(component) = Self::extract_component(base, m, self.arena) {
                    node.set_constant_value(Some(component));
                }
            }
        }
        false
    }

    /// Folds a fixed-arity numeric aggregate (vector or quaternion). Walks
    /// children in order and, on the first one that isn't a plain
    /// integer/float constant, propagates `constant_precluded` from exactly
    /// that child (its own flag if it never folded at all, `true` if it
    /// folded to some other, non-numeric constant kind) and stops looking at
    /// later siblings, rather than aggregating every child's flag.
    fn fold_numeric_components(
        &mut self,
        node: &'a Node<'a>,
        arity: usize,
    ) -> Option<Result<Vec<f32>, bool>> {
        let children = self.fold_children(node);
        if children.len() != arity {
            // Arity is enforced by the grammar that produces these nodes;
            // nothing to fold or flag here.
            return None;
        }
        let mut coords = Vec::with_capacity(arity);
        for (child, value) in node.children().zip(children.iter()) {
            match value.map(|v| v.data()) {
                Some(script_core::ConstantData::Integer(i)) => coords.push(*i as f32),
                Some(script_core::ConstantData::Float(f)) => coords.push(*f),
                Some(_) => return Some(Err(true)),
                None => return Some(Err(child.constant_precluded())),
            }
        }
        Some(Ok(coords))
    }

    fn visit_vector_expression(&mut self, node: &'a Node<'a>) -> bool {
        match self.fold_numeric_components(node, 3) {
            Some(Ok(xs)) => {
                node.set_constant_value(Some(Constant::vector(self.arena, xs[0], xs[1], xs[2])));
            }
            Some(Err(precluded)) => node.set_constant_precluded(precluded),
            None => {}
        }
        false
    }

    fn visit_quaternion_expression(&mut self, node: &'a Node<'a>) -> bool {
        match self.fold_numeric_components(node, 4) {
            Some(Ok(xs)) => {
                node.set_constant_value(Some(Constant::quaternion(
                    self.arena, xs[0], xs[1], xs[2], xs[3],
                )));
            }
            Some(Err(precluded)) => node.set_constant_precluded(precluded),
            None => {}
        }
        false
    }

    fn visit_list_expression(&mut self, node: &'a Node<'a>) -> bool {
        let children = self.fold_children(node);
        if children.iter().all(|c| c.is_some()) {
            let elements: Vec<&Constant<'a>> = children.into_iter().flatten().collect();
            let copies: Vec<&Constant<'a>> = elements.iter().map(|e| e.copy(self.arena)).collect();
            node.set_constant_value(Some(Constant::list(self.arena, &copies)));
        } else {
            // First child that didn't fold carries the reason forward,
            // matching the vector/quaternion aggregates above.
            let precluded = node
                .children()
                .zip(children.iter())
                .find(|(_, value)| value.is_none())
                .map(|(child, _)| child.constant_precluded())
                .unwrap_or(false);
            node.set_constant_precluded(precluded);
        }
        false
    }

    fn visit_constant_expression(&mut self, node: &'a Node<'a>) -> bool {
        self.seed_leaf(node);
        false
    }

    fn visit_integer_constant(&mut self, node: &'a Node<'a>) -> bool {
        self.seed_leaf(node);
        false
    }

    fn visit_float_constant(&mut self, node: &'a Node<'a>) -> bool {
        self.seed_leaf(node);
        false
    }

    fn visit_string_constant(&mut self, node: &'a Node<'a>) -> bool {
        self.seed_leaf(node);
        false
    }

    fn visit_vector_constant(&mut self, node: &'a Node<'a>) -> bool {
        self.seed_leaf(node);
        false
    }

    fn visit_quaternion_constant(&mut self, node: &'a Node<'a>) -> bool {
        self.seed_leaf(node);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use script_core::ast::{binary_expr, global_variable, global_storage, integer_constant, script};
    use script_core::{BinaryOp, Span, Symbol, SymbolKind, SymbolSubKind, TypeRegistry};

    #[test]
    fn folds_integer_addition_and_multiplication() {
        let arena = Arena::new();
        // 2 + 3 * 4, built right-associated-by-precedence as the parser
        // would: (2 + (3 * 4))
        let three = integer_constant(&arena, 3, Span::default());
        let four = integer_constant(&arena, 4, Span::default());
        let mul = binary_expr(&arena, BinOpKind::Op(BinaryOp::Mul), Span::default());
        mul.append_child(three);
        mul.append_child(four);

        let two = integer_constant(&arena, 2, Span::default());
        let add = binary_expr(&arena, BinOpKind::Op(BinaryOp::Add), Span::default());
        add.append_child(two);
        add.append_child(mul);

        let mut propagator = ConstantPropagator::new(&arena);
        propagator.run(add);

        let value = add.constant_value().expect("should fold to a constant");
        match value.data() {
            script_core::ConstantData::Integer(v) => assert_eq!(*v, 14),
            other => panic!("expected integer, got {other:?}"),
        }
    }

    #[test]
    fn global_forward_reference_sees_later_global_in_document_order_pass() {
        let arena = Arena::new();

        let root = script(&arena, Span::default());

        // integer A = 5;
        let a_storage = global_storage(&arena, Span::default());
        let a_var = global_variable(&arena, "A", Span::default());
        let a_symbol = arena.alloc(Symbol::new(
            "A",
            TypeRegistry::get(TypeKind::Integer),
            SymbolKind::Variable,
            SymbolSubKind::Global,
        ));
        a_var.set_symbol(a_symbol);
        a_var.append_child(integer_constant(&arena, 5, Span::default()));
        a_storage.append_child(a_var);

        root.append_child(a_storage);

        let mut propagator = ConstantPropagator::new(&arena);
        propagator.run(root);

        match a_symbol.constant_value().unwrap().data() {
            script_core::ConstantData::Integer(v) => assert_eq!(*v, 5),
            other => panic!("expected integer, got {other:?}"),
        }
    }
}
