//! Diagnostics and the fatal-error hierarchy.
//!
//! ## Error Hierarchy
//!
//! ```text
//! FatalError            - aborts the process (bad manifest, I/O failure, invariant violation)
//! Diagnostic             - collected into a DiagnosticBuffer, compilation continues
//!   ├── warning          - unused locals, dead code
//!   └── error            - type errors, unresolved symbols, illegal global initializers
//! ```
//!
//! Compilation errors never unwind: every pass that can fail pushes a
//! [`Diagnostic`] onto a [`DiagnosticBuffer`] and keeps walking, so a single
//! run surfaces as many problems as possible. Only [`FatalError`] — reserved
//! for conditions that make continuing meaningless, like a malformed builtin
//! manifest — terminates the process.

use std::cell::RefCell;
use std::fmt;

use thiserror::Error;

use crate::span::Span;

/// Conditions severe enough to abort the process rather than being
/// collected as a diagnostic: a malformed builtin manifest, an unreadable
/// user-supplied manifest path, or an internal invariant violation.
#[derive(Debug, Error)]
pub enum FatalError {
    #[error("{manifest}:{line}: malformed builtin manifest record: {detail}")]
    MalformedManifest {
        manifest: String,
        line: u32,
        detail: String,
    },

    #[error("cannot open builtin manifest {path}: {source}")]
    ManifestUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("internal invariant violated: {0}")]
    InvariantViolated(String),
}

/// A stable, short diagnostic code, e.g. `E_GLOBAL_INITIALIZER_NOT_CONSTANT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    GlobalInitializerNotConstant,
    IllegalSimpleAssignable,
    UnresolvedSymbol,
    TypeMismatch,
    CastFailure,
    UnusedLocal,
    DeadCode,
}

impl DiagnosticCode {
    /// The stable string form used in diagnostic output, e.g. by IDE
    /// integrations that key off of it.
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticCode::GlobalInitializerNotConstant => "E_GLOBAL_INITIALIZER_NOT_CONSTANT",
            DiagnosticCode::IllegalSimpleAssignable => "E_ILLEGAL_SIMPLE_ASSIGNABLE",
            DiagnosticCode::UnresolvedSymbol => "E_UNRESOLVED_SYMBOL",
            DiagnosticCode::TypeMismatch => "E_TYPE_MISMATCH",
            DiagnosticCode::CastFailure => "E_CAST_FAILURE",
            DiagnosticCode::UnusedLocal => "W_UNUSED_LOCAL",
            DiagnosticCode::DeadCode => "W_DEAD_CODE",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How serious a collected diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

/// One collected diagnostic: a code, a severity, a source span, and a
/// human-readable message.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub severity: Severity,
    pub span: Span,
    pub message: String,
}

impl Diagnostic {
    pub fn error(code: DiagnosticCode, span: Span, message: impl Into<String>) -> Diagnostic {
        Diagnostic {
            code,
            severity: Severity::Error,
            span,
            message: message.into(),
        }
    }

    pub fn warning(code: DiagnosticCode, span: Span, message: impl Into<String>) -> Diagnostic {
        Diagnostic {
            code,
            severity: Severity::Warning,
            span,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{level}[{}] at {}: {}", self.code, self.span, self.message)
    }
}

/// Collects diagnostics across an entire compilation. Passes push into it
/// and keep walking; the caller enumerates it once compilation finishes.
#[derive(Default)]
pub struct DiagnosticBuffer {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl DiagnosticBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, diagnostic: Diagnostic) {
        self.diagnostics.borrow_mut().push(diagnostic);
    }

    /// `true` iff no diagnostic at or above [`Severity::Error`] was
    /// collected. Mirrors the driver surface's `ast_sane` flag (§7).
    pub fn is_sane(&self) -> bool {
        !self
            .diagnostics
            .borrow()
            .iter()
            .any(|d| d.severity >= Severity::Error)
    }

    pub fn len(&self) -> usize {
        self.diagnostics.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.borrow().is_empty()
    }

    /// Consume the buffer, returning the collected diagnostics in push
    /// order.
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics.into_inner()
    }

    /// Snapshot the collected diagnostics without consuming the buffer.
    pub fn to_vec(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sane_until_an_error_is_pushed() {
        let buffer = DiagnosticBuffer::new();
        assert!(buffer.is_sane());

        buffer.push(Diagnostic::warning(
            DiagnosticCode::UnusedLocal,
            Span::default(),
            "local `x` is never used",
        ));
        assert!(buffer.is_sane());

        buffer.push(Diagnostic::error(
            DiagnosticCode::GlobalInitializerNotConstant,
            Span::default(),
            "global initializer is not constant",
        ));
        assert!(!buffer.is_sane());
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn code_display_matches_stable_string() {
        assert_eq!(
            DiagnosticCode::GlobalInitializerNotConstant.to_string(),
            "E_GLOBAL_INITIALIZER_NOT_CONSTANT"
        );
    }
}
