//! Tokenizing and parsing: source text to a bound [`script_core::ast::Node`]
//! tree.
//!
//! [`parse_script`] is the crate's single entry point. It lexes the whole
//! source up front, pre-declares global names so forward references resolve,
//! then builds the tree bottom-up with a conventional recursive-descent
//! parser, resolving identifiers against the lexical scope stack and the
//! supplied builtin catalog as it goes.

pub mod error;
pub mod lexer;
pub mod parser;

pub use error::{ParseError, ParseErrorKind};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::parse_script;

#[cfg(test)]
mod tests {
    use script_core::{Arena, DiagnosticBuffer, SymbolKind, SymbolTable};

    use super::*;

    fn empty_builtins(arena: &Arena) -> &SymbolTable<'_> {
        arena.alloc(SymbolTable::new())
    }

    #[test]
    fn parses_global_variable_with_initializer() {
        let arena = Arena::new();
        let builtins = empty_builtins(&arena);
        let diagnostics = DiagnosticBuffer::new();

        let root = parse_script(&arena, "integer N = 2 + 3;", builtins, &diagnostics).unwrap();
        assert!(diagnostics.is_sane());

        let storage = root.children().next().unwrap();
        assert_eq!(storage.kind, script_core::ast::NodeKind::GlobalStorage);
        let var = storage.children().next().unwrap();
        assert_eq!(var.kind, script_core::ast::NodeKind::GlobalVariable);
        assert!(var.symbol().is_some());
    }

    #[test]
    fn forward_global_reference_resolves_to_predeclared_symbol() {
        let arena = Arena::new();
        let builtins = empty_builtins(&arena);
        let diagnostics = DiagnosticBuffer::new();

        let source = "integer B = A + 1;\ninteger A = 5;\n";
        let root = parse_script(&arena, source, builtins, &diagnostics).unwrap();
        assert!(diagnostics.is_sane());

        let b_storage = root.children().next().unwrap();
        let b = b_storage.children().next().unwrap();
        let initializer = b.children().next().unwrap();
        // `A + 1`: the lhs of the addition must have resolved to a symbol,
        // even though `A`'s own declaration appears later in the source.
        let lhs = initializer.children().next().unwrap();
        assert!(lhs.symbol().is_some());
    }

    #[test]
    fn unresolved_identifier_is_a_diagnostic_not_a_parse_error() {
        let arena = Arena::new();
        let builtins = empty_builtins(&arena);
        let diagnostics = DiagnosticBuffer::new();

        let root = parse_script(&arena, "integer N = missing_name;", builtins, &diagnostics);
        assert!(root.is_ok());
        assert!(!diagnostics.is_sane());
    }

    #[test]
    fn parses_function_with_params_and_body() {
        let arena = Arena::new();
        let builtins = empty_builtins(&arena);
        let diagnostics = DiagnosticBuffer::new();

        let source = "integer add(integer a, integer b) { return a + b; }";
        let root = parse_script(&arena, source, builtins, &diagnostics).unwrap();
        assert!(diagnostics.is_sane());

        let storage = root.children().next().unwrap();
        let func = storage.children().next().unwrap();
        assert_eq!(func.kind, script_core::ast::NodeKind::GlobalFunction);
        let mut children: Vec<_> = func.children().collect();
        let body = children.pop().unwrap();
        assert_eq!(body.kind, script_core::ast::NodeKind::CompoundStatement);
        assert_eq!(children.len(), 2);
    }

    #[test]
    fn parses_state_with_event_handler() {
        let arena = Arena::new();
        let builtins = empty_builtins(&arena);
        builtins.define(arena.alloc(script_core::Symbol::new(
            "state_entry",
            script_core::TypeRegistry::get(script_core::TypeKind::Null),
            SymbolKind::Event,
            script_core::SymbolSubKind::Builtin,
        )));
        let diagnostics = DiagnosticBuffer::new();

        let source = "default { state_entry() { } }";
        let root = parse_script(&arena, source, builtins, &diagnostics).unwrap();
        assert!(diagnostics.is_sane());

        let state = root.children().next().unwrap();
        assert_eq!(state.kind, script_core::ast::NodeKind::State);
        let handler = state.children().next().unwrap();
        assert_eq!(handler.kind, script_core::ast::NodeKind::EventHandler);
        assert!(handler.symbol().is_some());
    }

    #[test]
    fn parses_vector_member_access() {
        let arena = Arena::new();
        let builtins = empty_builtins(&arena);
        let diagnostics = DiagnosticBuffer::new();

        let source = "integer f() { vector v = <1.0, 2.0, 3.0>; return (integer) v.x; }";
        let root = parse_script(&arena, source, builtins, &diagnostics).unwrap();
        assert!(diagnostics.is_sane());
    }
}
