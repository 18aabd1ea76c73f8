//! Core data model shared by the parser, builtin-symbol loader, and
//! compiler: the compilation arena, the AST, the singleton type system,
//! constant values, symbol tables, operators, source spans, and
//! diagnostics.

pub mod arena;
pub mod ast;
pub mod constant;
pub mod error;
pub mod ops;
pub mod span;
pub mod strings;
pub mod symbol;
pub mod types;

pub use arena::{Arena, ActiveArenaGuard, active_arena};
pub use constant::{Constant, ConstantData};
pub use error::{Diagnostic, DiagnosticBuffer, DiagnosticCode, FatalError, Severity};
pub use ops::{BinaryOp, UnaryOp};
pub use span::Span;
pub use strings::{escape_string, parse_string};
pub use symbol::{FunctionSignature, Param, Symbol, SymbolKind, SymbolSubKind, SymbolTable};
pub use types::{Type, TypeKind, TypeRegistry};
