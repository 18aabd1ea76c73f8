//! The crate's driver surface: a single type that owns one compilation's
//! arena and diagnostic buffer, and walks a source string through parsing
//! and the full analysis/compile pipeline.
//!
//! Construction accepts an optional builtin-symbol table, defaulting to the
//! process-wide catalog (loaded from the compiled-in manifest on first
//! use). A [`Session`] speaks for a single script: `parse` then `compile`,
//! in that order, sharing the one arena and diagnostic buffer the whole
//! way through.

use script_builtins::{builtin_catalog, is_loaded, load_builtins};
use script_core::ast::Node;
use script_core::{Arena, Diagnostic, DiagnosticBuffer, SymbolTable};

pub use script_compiler::{
    BytecodeCompiler, CompileOutput, ConstantPropagator, FunctionBytecode, GlobalExprValidator,
    OpCode, SimplifierFlags, TreeSimplifier,
};
pub use script_parser::{ParseError, ParseErrorKind};

/// One compilation: the arena every parsed and analyzed node is allocated
/// into, the builtin catalog its identifiers resolve against, and the
/// diagnostic buffer every pass — parser included — collects into.
pub struct Session<'a> {
    arena: &'a Arena,
    builtins: &'a SymbolTable<'a>,
    diagnostics: DiagnosticBuffer,
}

impl<'a> Session<'a> {
    /// Build a session against `arena`, using the process-wide builtin
    /// catalog. Loads the compiled-in default manifest the first time any
    /// session in the process asks for it.
    pub fn new(arena: &'a Arena) -> Self {
        if !is_loaded() {
            load_builtins(None).expect("default builtin manifest must parse");
        }
        Self::with_builtins(arena, builtin_catalog())
    }

    /// Build a session against an explicit builtin table, e.g. one loaded
    /// from a host-specific manifest via [`script_builtins::parse_manifest`].
    pub fn with_builtins(arena: &'a Arena, builtins: &'a SymbolTable<'a>) -> Self {
        Self {
            arena,
            builtins,
            diagnostics: DiagnosticBuffer::new(),
        }
    }

    /// Parse `source` into a bound AST root. Unresolved identifiers and
    /// other recoverable problems land in the session's diagnostic buffer
    /// rather than failing the parse; only a lexical or syntactic error
    /// returns `Err`, in which case no root is produced at all.
    pub fn parse(&'a self, source: &str) -> Result<&'a Node<'a>, ParseError> {
        script_parser::parse_script(self.arena, source, self.builtins, &self.diagnostics)
    }

    /// Run constant propagation, global-initializer validation, tree
    /// simplification, and bytecode lowering over `root`, in that order.
    pub fn compile(&'a self, root: &'a Node<'a>, flags: SimplifierFlags) -> CompileOutput<'a> {
        script_compiler::compile(self.arena, root, &self.diagnostics, flags)
    }

    /// `true` iff no diagnostic at or above error severity has been
    /// collected so far, across both parsing and compiling.
    pub fn is_sane(&self) -> bool {
        self.diagnostics.is_sane()
    }

    /// Snapshot of every diagnostic collected so far, in the order it was
    /// pushed.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_compiles_a_constant_global_in_one_session() {
        let arena = Arena::new();
        let session = Session::new(&arena);

        let root = session.parse("integer N = 2 + 3 * 4;").unwrap();
        let output = session.compile(root, SimplifierFlags::default());

        assert!(session.is_sane());
        assert_eq!(output.folded_total, 2); // `3 * 4`, then `2 + (folded 12)`
    }

    #[test]
    fn unresolved_identifier_surfaces_in_session_diagnostics() {
        let arena = Arena::new();
        let session = Session::new(&arena);

        let root = session.parse("integer N = missing_name;").unwrap();
        session.compile(root, SimplifierFlags::default());

        assert!(!session.is_sane());
        assert!(!session.diagnostics().is_empty());
    }
}
