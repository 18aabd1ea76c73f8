//! Static analysis, constant folding, and bytecode lowering for a parsed
//! script.
//!
//! [`compile`] runs the full pipeline over an already-parsed, already
//! symbol-resolved [`Node`] tree: constant propagation, global-initializer
//! validation, tree simplification, and bytecode lowering, in that order.
//!
//! Symbol resolution itself is not this crate's concern — `script-parser`
//! resolves every identifier to a symbol (including forward references to
//! globals) while building the tree, so by the time a root reaches
//! [`compile`] every [`LvalueExpression`](script_core::ast::NodeKind::LvalueExpression)
//! already carries its symbol.

pub mod bytecode;
pub mod propagator;
pub mod simplifier;
pub mod validator;
pub mod visitor;

use script_core::ast::Node;
use script_core::{Arena, DiagnosticBuffer};

pub use bytecode::{BytecodeCompiler, FunctionBytecode, OpCode};
pub use propagator::ConstantPropagator;
pub use simplifier::{SimplifierFlags, TreeSimplifier};
pub use validator::GlobalExprValidator;
pub use visitor::{Visitor, walk};

/// The result of running the full pipeline.
pub struct CompileOutput<'a> {
    pub functions: Vec<FunctionBytecode<'a>>,
    pub folded_total: u32,
}

/// Run the full analysis-and-compile pipeline over a parsed script root.
///
/// Constant propagation runs before the global-expression validator despite
/// the two appearing in the opposite order in the component overview: the
/// validator only reads `constant_value`/`constant_precluded`, which the
/// propagator is what populates, so it must run first for the validator to
/// see anything but freshly-cleared state. See `DESIGN.md` for the longer
/// version of this note.
pub fn compile<'a>(
    arena: &'a Arena,
    root: &'a Node<'a>,
    diagnostics: &'a DiagnosticBuffer,
    flags: SimplifierFlags,
) -> CompileOutput<'a> {
    ConstantPropagator::new(arena).run(root);
    GlobalExprValidator::new(diagnostics).run(root);

    let mut simplifier = TreeSimplifier::new(arena, flags);
    simplifier.run(root);

    let mut bc = BytecodeCompiler::new(arena);
    bc.compile(root);

    CompileOutput {
        functions: bc.functions,
        folded_total: simplifier.folded_total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use script_core::ast::{
        binary_expr, compound_statement, global_function, global_storage, integer_constant,
        return_statement, script, BinOpKind,
    };
    use script_core::{BinaryOp, Span};

    #[test]
    fn end_to_end_folds_and_compiles_a_constant_return() {
        let arena = Arena::new();
        let diagnostics = DiagnosticBuffer::new();

        // integer f() { return 2 + 3 * 4; }
        let three = integer_constant(&arena, 3, Span::default());
        let four = integer_constant(&arena, 4, Span::default());
        let mul = binary_expr(&arena, BinOpKind::Op(BinaryOp::Mul), Span::default());
        mul.append_child(three);
        mul.append_child(four);
        let two = integer_constant(&arena, 2, Span::default());
        let add = binary_expr(&arena, BinOpKind::Op(BinaryOp::Add), Span::default());
        add.append_child(two);
        add.append_child(mul);

        let ret = return_statement(&arena, Span::default());
        ret.append_child(add);
        let body = compound_statement(&arena, Span::default());
        body.append_child(ret);
        let func = global_function(&arena, "f", Span::default());
        func.append_child(body);
        let storage = global_storage(&arena, Span::default());
        storage.append_child(func);
        let root = script(&arena, Span::default());
        root.append_child(storage);

        let output = compile(&arena, root, &diagnostics, SimplifierFlags::default());

        assert!(diagnostics.is_sane());
        assert_eq!(output.folded_total, 2); // mul, then add
        assert_eq!(output.functions.len(), 1);
        let code = &output.functions[0].code;
        assert_eq!(code[0], OpCode::PushInteger.as_u8());
        let payload = i32::from_be_bytes([code[1], code[2], code[3], code[4]]);
        assert_eq!(payload, 14);
    }
}
