//! The tree simplifier.
//!
//! Folds expressions whose operands are already-known constants into a
//! single [`NodeKind::ConstantExpression`], and optionally prunes
//! never-referenced locals, globals, and functions. Each of these is
//! independently gated by a flag in [`SimplifierFlags`] so a caller can run
//! constant folding without dead-code elimination, or vice versa.

use script_core::ast::{constant_expr, Node, NodeData, NodeKind};
use script_core::{Arena, Constant, ConstantData};

use crate::visitor::{Visitor, walk};

/// Which simplifications to apply. All default to enabled; a caller that
/// only wants constant folding without touching dead code sets the prune
/// flags to `false`.
#[derive(Debug, Clone, Copy)]
pub struct SimplifierFlags {
    pub fold_constants: bool,
    pub prune_unused_locals: bool,
    pub prune_unused_globals: bool,
    pub prune_unused_functions: bool,
    /// Whether folding may introduce a new string constant (some host
    /// environments charge memory for every distinct string literal, so a
    /// caller compiling for one of those can disable this while still
    /// folding integers/floats/vectors).
    pub may_create_new_strs: bool,
}

impl Default for SimplifierFlags {
    fn default() -> Self {
        Self {
            fold_constants: true,
            prune_unused_locals: true,
            prune_unused_globals: true,
            prune_unused_functions: true,
            may_create_new_strs: true,
        }
    }
}

pub struct TreeSimplifier<'a> {
    arena: &'a Arena,
    flags: SimplifierFlags,
    pub folded_total: u32,
}

impl<'a> TreeSimplifier<'a> {
    pub fn new(arena: &'a Arena, flags: SimplifierFlags) -> Self {
        Self {
            arena,
            flags,
            folded_total: 0,
        }
    }

    pub fn run(&mut self, root: &'a Node<'a>) {
        walk(self, root);
    }

    /// Fold `node` into a `ConstantExpression` in place if it already holds
    /// a foldable constant value. Returns whether the fold happened.
    fn try_fold_expression(&mut self, node: &'a Node<'a>) -> bool {
        if !self.flags.fold_constants {
            return false;
        }
        if node.kind == NodeKind::ConstantExpression {
            return false;
        }
        let Some(value) = node.constant_value() else {
            return false;
        };
        if matches!(value.data(), ConstantData::List(_)) {
            return false;
        }
        if !value.is_finite() {
            return false;
        }
        if matches!(value.data(), ConstantData::String(_)) && !self.flags.may_create_new_strs {
            return false;
        }

        let replacement = constant_expr(self.arena, value, node.span);
        Node::replace_with(node, replacement);
        self.folded_total += 1;
        true
    }

    /// Walk up from `node` to the nearest ancestor owning a symbol table and
    /// remove `symbol` from it.
    fn remove_from_enclosing_scope(node: &'a Node<'a>, symbol: &script_core::Symbol<'a>) {
        let mut ancestor = Some(node);
        while let Some(current) = ancestor {
            if let Some(scope) = current.scope() {
                scope.remove(symbol);
                break;
            }
            ancestor = current.parent();
        }
    }
}

impl<'a> Visitor<'a> for TreeSimplifier<'a> {
    fn visit_declaration(&mut self, node: &'a Node<'a>) -> bool {
        for child in node.children() {
            walk(self, child);
        }

        if !self.flags.prune_unused_locals {
            return false;
        }
        let Some(symbol) = node.symbol() else {
            return false;
        };
        if symbol.references() != 1 || symbol.assignments() != 0 {
            return false;
        }
        let initializer = node.children().next();
        let initializer_is_pure = match initializer {
            None => true,
            Some(init) => {
                init.kind == NodeKind::ConstantExpression || init.constant_value().is_some()
            }
        };
        if !initializer_is_pure {
            return false;
        }

        Self::remove_from_enclosing_scope(node, symbol);
        if let Some(parent) = node.parent() {
            Node::prune_child(parent, node);
        }
        false
    }

    fn visit_global_storage(&mut self, node: &'a Node<'a>) -> bool {
        let Some(inner) = node.children().next() else {
            return false;
        };
        walk(self, inner);

        let (enabled, symbol) = match inner.kind {
            NodeKind::GlobalVariable => (self.flags.prune_unused_globals, inner.symbol()),
            NodeKind::GlobalFunction => (self.flags.prune_unused_functions, inner.symbol()),
            _ => (false, None),
        };
        let Some(symbol) = symbol else {
            return false;
        };
        if !enabled || symbol.references() != 1 {
            return false;
        }

        let root = node.get_root();
        if let Some(scope) = root.scope() {
            scope.remove(symbol);
        }
        if let Some(parent) = node.parent() {
            Node::prune_child(parent, node);
        }
        false
    }

    fn visit_binary_expression(&mut self, node: &'a Node<'a>) -> bool {
        for child in node.children() {
            walk(self, child);
        }
        !self.try_fold_expression(node)
    }

    fn visit_unary_expression(&mut self, node: &'a Node<'a>) -> bool {
        for child in node.children() {
            walk(self, child);
        }
        !self.try_fold_expression(node)
    }

    fn visit_parenthesis_expression(&mut self, node: &'a Node<'a>) -> bool {
        for child in node.children() {
            walk(self, child);
        }
        !self.try_fold_expression(node)
    }

    fn visit_typecast_expression(&mut self, node: &'a Node<'a>) -> bool {
        for child in node.children() {
            walk(self, child);
        }
        !self.try_fold_expression(node)
    }

    fn visit_vector_expression(&mut self, node: &'a Node<'a>) -> bool {
        for child in node.children() {
            walk(self, child);
        }
        !self.try_fold_expression(node)
    }

    fn visit_quaternion_expression(&mut self, node: &'a Node<'a>) -> bool {
        for child in node.children() {
            walk(self, child);
        }
        !self.try_fold_expression(node)
    }

    // Deliberately no override for `visit_list_expression`: list results are
    // never folded into a `ConstantExpression`, even when every element is
    // constant.

    fn visit_lvalue_expression(&mut self, node: &'a Node<'a>) -> bool {
        if !self.flags.fold_constants {
            return false;
        }
        let NodeData::Lvalue { .. } = node.data else {
            return false;
        };
        let Some(symbol) = node.symbol() else {
            return false;
        };
        if symbol.is_builtin() {
            return false;
        }
        if let Some(value) = node.constant_value() {
            if value.is_finite() && !matches!(value.data(), ConstantData::List(_)) {
                let replacement = constant_expr(self.arena, value, node.span);
                Node::replace_with(node, replacement);
                self.folded_total += 1;
            }
        }
        false
    }

    fn visit_constant_expression(&mut self, _node: &'a Node<'a>) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use script_core::ast::{binary_expr, declaration, integer_constant, BinOpKind};
    use script_core::{BinaryOp, Span, Symbol, SymbolKind, SymbolSubKind, TypeKind, TypeRegistry};

    #[test]
    fn folds_binary_expression_with_constant_operands() {
        let arena = Arena::new();
        let add = binary_expr(&arena, BinOpKind::Op(BinaryOp::Add), Span::default());
        let two = integer_constant(&arena, 2, Span::default());
        let three = integer_constant(&arena, 3, Span::default());
        two.set_constant_value(Some(Constant::integer(&arena, 2)));
        three.set_constant_value(Some(Constant::integer(&arena, 3)));
        add.append_child(two);
        add.append_child(three);
        add.set_constant_value(Some(Constant::integer(&arena, 5)));

        // Simulate: add has no parent in this unit test, so exercise
        // `try_fold_expression` through a synthetic parent.
        let holder = script_core::ast::list_expr(&arena, Span::default());
        holder.append_child(add);

        let mut simplifier = TreeSimplifier::new(&arena, SimplifierFlags::default());
        walk(&mut simplifier, add);

        let folded = holder.children().next().unwrap();
        assert_eq!(folded.kind, NodeKind::ConstantExpression);
        assert_eq!(simplifier.folded_total, 1);
    }

    #[test]
    fn prunes_unreferenced_local_with_pure_initializer() {
        let arena = Arena::new();
        let decl = declaration(&arena, "U", Span::default());
        let sym = arena.alloc(Symbol::new(
            "U",
            TypeRegistry::get(TypeKind::Integer),
            SymbolKind::Variable,
            SymbolSubKind::Local,
        ));
        decl.set_symbol(sym);
        let one = integer_constant(&arena, 1, Span::default());
        one.set_constant_value(Some(Constant::integer(&arena, 1)));
        decl.append_child(one);

        let block = script_core::ast::compound_statement(&arena, Span::default());
        let scope = arena.alloc(script_core::SymbolTable::new());
        scope.define(sym);
        block.set_scope(scope);
        block.append_child(decl);

        let mut simplifier = TreeSimplifier::new(&arena, SimplifierFlags::default());
        walk(&mut simplifier, block);

        assert!(block.children().next().is_none());
        assert!(scope.lookup("U", SymbolKind::Variable).is_none());
    }
}
