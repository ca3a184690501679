//! Runtime errors.
//!
//! `EvalErrorKind` carries the structured data; `EvalError` pairs it with
//! the span of the expression that failed and converts to a diagnostic in
//! the E6xxx range.

use tern_diagnostic::{Diagnostic, ErrorCode};
use tern_ir::Span;

/// Result of evaluating one expression.
pub type EvalResult<T = crate::Value> = Result<T, EvalError>;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EvalErrorKind {
    /// The call site has no entry for the runtime types. Only reachable for
    /// programs that did not type-check cleanly.
    #[error("no dispatch entry for `{method}` with types ({})", .types.join(", "))]
    NoDispatch { method: String, types: Vec<String> },

    #[error("call depth limit of {depth} exceeded")]
    StackOverflow { depth: usize },

    #[error("undefined constant `{name}`")]
    Unbound { name: String },

    #[error("integer overflow in `{op}`")]
    IntegerOverflow { op: &'static str },
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{kind}")]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub span: Span,
}

impl EvalError {
    pub fn new(kind: EvalErrorKind, span: Span) -> Self {
        EvalError { kind, span }
    }

    pub fn code(&self) -> ErrorCode {
        match self.kind {
            EvalErrorKind::NoDispatch { .. } => ErrorCode::E6001,
            EvalErrorKind::StackOverflow { .. } => ErrorCode::E6002,
            EvalErrorKind::Unbound { .. } => ErrorCode::E6003,
            EvalErrorKind::IntegerOverflow { .. } => ErrorCode::E6004,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let diagnostic = Diagnostic::error(self.code())
            .with_message(self.kind.to_string())
            .with_label(self.span, "evaluation failed here");
        match self.kind {
            EvalErrorKind::StackOverflow { .. } => {
                diagnostic.with_note("raise `EvalConfig::max_call_depth` for deeper recursion")
            }
            _ => diagnostic,
        }
    }
}
