//! The global-expression validator.
//!
//! A global variable's initializer must be foldable to a compile-time
//! constant by the propagator, or — failing that — must at least be built
//! entirely from constructs the original language accepted without a
//! constant result: literals, vector/quaternion/list aggregates of such, and
//! a narrow "simple assignable" grammar for list elements that reference
//! other globals transitively initialized the same way.
//!
//! This unifies what the grounding source split into two visitor classes
//! (a general validator plus a separate "simple assignable" sub-validator
//! invoked only when checking list elements) into one recursive check,
//! since both walk the same kind of subtree and share almost every rule.

use script_core::ast::{Node, NodeData, NodeKind};
use script_core::{DiagnosticBuffer, DiagnosticCode, SymbolSubKind, TypeKind, UnaryOp};

use crate::visitor::{Visitor, walk};

pub struct GlobalExprValidator<'a> {
    diagnostics: &'a DiagnosticBuffer,
}

impl<'a> GlobalExprValidator<'a> {
    pub fn new(diagnostics: &'a DiagnosticBuffer) -> Self {
        Self { diagnostics }
    }

    pub fn run(&mut self, root: &'a Node<'a>) {
        walk(self, root);
    }

    /// Whether `node` is legal as a global initializer (or a nested part of
    /// one) when it did not fold to a plain constant. Mirrors the grounding
    /// source's `SimpleAssignableValidatingVisitor`.
    fn is_simple_assignable(node: &'a Node<'a>) -> bool {
        match node.kind {
            NodeKind::ConstantExpression
            | NodeKind::IntegerConstant
            | NodeKind::FloatConstant
            | NodeKind::StringConstant
            | NodeKind::VectorConstant
            | NodeKind::QuaternionConstant => true,
            NodeKind::VectorExpression | NodeKind::QuaternionExpression | NodeKind::ListExpression => {
                node.children().all(Self::is_simple_assignable)
            }
            NodeKind::ParenthesisExpression => {
                node.children().all(Self::is_simple_assignable)
            }
            NodeKind::UnaryExpression => Self::unary_is_simple_assignable(node),
            NodeKind::LvalueExpression => Self::lvalue_is_simple_assignable(node),
            _ => false,
        }
    }

    fn unary_is_simple_assignable(node: &'a Node<'a>) -> bool {
        let NodeData::Unary { op } = node.data else {
            return false;
        };
        if op != UnaryOp::Neg {
            return false;
        }
        let Some(operand) = node.children().next() else {
            return false;
        };
        if operand.kind != NodeKind::LvalueExpression {
            return false;
        }
        let Some(symbol) = operand.symbol() else {
            // Unresolved symbol: not this check's job to diagnose.
            return true;
        };
        let ty = symbol.ty.itype();
        if ty == TypeKind::Error {
            return true;
        }
        if symbol.sub_kind != SymbolSubKind::Builtin {
            return false;
        }
        if !matches!(ty, TypeKind::Integer | TypeKind::Float) {
            return false;
        }
        symbol.name != "TRUE" && symbol.name != "FALSE"
    }

    fn lvalue_is_simple_assignable(node: &'a Node<'a>) -> bool {
        let NodeData::Lvalue { member } = node.data else {
            return false;
        };
        if member.is_some() {
            return false;
        }
        let Some(symbol) = node.symbol() else {
            return false;
        };
        if symbol.is_builtin() {
            return true;
        }
        let Some(parent) = node.parent() else {
            return false;
        };
        if parent.kind != NodeKind::ListExpression {
            // A direct, non-list reference to a non-builtin global only
            // belongs here when the propagator failed to fold it — which
            // happens precisely when the referenced global is declared
            // later in the source (or is itself invalid). Either way there
            // is nothing left to accept: unlike list elements, a bare
            // initializer doesn't get a separate declaring-node chain walk.
            return false;
        }
        let mut symbol = symbol;
        loop {
            if symbol.is_builtin() {
                return true;
            }
            let Some(declaring) = symbol.declaring_node.get() else {
                return false;
            };
            let Some(initializer) = declaring.children().next() else {
                return false;
            };
            if initializer.kind != NodeKind::LvalueExpression {
                return true;
            }
            let Some(next_symbol) = initializer.symbol() else {
                return false;
            };
            symbol = next_symbol;
        }
    }
}

impl<'a> Visitor<'a> for GlobalExprValidator<'a> {
    fn visit_global_variable(&mut self, node: &'a Node<'a>) -> bool {
        let Some(initializer) = node.children().next() else {
            return false;
        };

        let mut valid = true;
        if initializer.constant_value().is_none() {
            if initializer.constant_precluded() {
                // An upstream error already precluded this value; don't
                // pile on with a second diagnostic.
                return false;
            }
            valid = Self::is_simple_assignable(initializer);
        }

        if !valid {
            self.diagnostics.push(script_core::Diagnostic::error(
                DiagnosticCode::GlobalInitializerNotConstant,
                node.span,
                format!(
                    "global variable `{}` initializer is not a compile-time constant",
                    match node.data {
                        NodeData::GlobalVariable { name } => name,
                        _ => "?",
                    }
                ),
            ));
        }

        false
    }

    fn visit_function_expression(&mut self, _node: &'a Node<'a>) -> bool {
        // Function calls are never legal in a global-scope context this
        // validator reaches; callers that got here did so from a global
        // initializer subtree, where a call can never be simple-assignable
        // and never folds to a constant. Nothing to flag here directly —
        // the enclosing `visit_global_variable`'s `is_simple_assignable`
        // walk already excludes it by returning `false` for any node kind
        // it doesn't explicitly whitelist.
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use script_core::ast::{
        function_expr, global_storage, global_variable, integer_constant, lvalue_expr, script,
        unary_expr,
    };
    use script_core::{Arena, Span, Symbol, SymbolKind, TypeRegistry};

    #[test]
    fn non_constant_global_initializer_is_flagged() {
        let arena = Arena::new();
        let diagnostics = DiagnosticBuffer::new();

        let root = script(&arena, Span::default());
        let storage = global_storage(&arena, Span::default());
        let var = global_variable(&arena, "N", Span::default());
        let call = function_expr(&arena, "someFunc", Span::default());
        var.append_child(call);
        storage.append_child(var);
        root.append_child(storage);

        let mut validator = GlobalExprValidator::new(&diagnostics);
        validator.run(root);

        assert!(!diagnostics.is_sane());
    }

    #[test]
    fn constant_global_initializer_is_not_flagged() {
        let arena = Arena::new();
        let diagnostics = DiagnosticBuffer::new();

        let root = script(&arena, Span::default());
        let storage = global_storage(&arena, Span::default());
        let var = global_variable(&arena, "N", Span::default());
        let lit = integer_constant(&arena, 5, Span::default());
        lit.set_constant_value(Some(script_core::Constant::integer(&arena, 5)));
        var.append_child(lit);
        storage.append_child(var);
        root.append_child(storage);

        let mut validator = GlobalExprValidator::new(&diagnostics);
        validator.run(root);

        assert!(diagnostics.is_sane());
    }

    #[test]
    fn unary_minus_on_builtin_constant_is_simple_assignable() {
        let arena = Arena::new();
        let pi = arena.alloc(Symbol::new(
            "PI",
            TypeRegistry::get(TypeKind::Float),
            SymbolKind::Variable,
            SymbolSubKind::Builtin,
        ));
        let lv = lvalue_expr(&arena, None, Span::default());
        lv.set_symbol(pi);
        let neg = unary_expr(&arena, UnaryOp::Neg, Span::default());
        neg.append_child(lv);

        assert!(GlobalExprValidator::unary_is_simple_assignable(neg));
    }

    #[test]
    fn unary_minus_on_true_is_rejected() {
        let arena = Arena::new();
        let truthy = arena.alloc(Symbol::new(
            "TRUE",
            TypeRegistry::get(TypeKind::Integer),
            SymbolKind::Variable,
            SymbolSubKind::Builtin,
        ));
        let lv = lvalue_expr(&arena, None, Span::default());
        lv.set_symbol(truthy);
        let neg = unary_expr(&arena, UnaryOp::Neg, Span::default());
        neg.append_child(lv);

        assert!(!GlobalExprValidator::unary_is_simple_assignable(neg));
    }
}
