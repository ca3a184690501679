//! Type-checking errors.
//!
//! Every error the engine reports is a [`TypeError`]: a [`TypeErrorKind`]
//! plus the span of the offending construct. Type names inside the kinds
//! are pre-rendered so errors outlive the pool they were produced from.

use tern_diagnostic::{Diagnostic, ErrorCode};
use tern_ir::Span;

/// What went wrong.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum TypeErrorKind {
    /// A restriction or constant names a class that does not exist.
    #[error("undefined type `{name}`")]
    UnknownType { name: String },

    /// Same owner, name and restriction vector as an earlier definition.
    #[error("method `{signature}` is already defined")]
    DuplicateDefinition { signature: String, previous: Span },

    /// No candidate accepts some combination of the call's argument types.
    #[error("{}", describe_no_overload(.method, .receiver, .arg_types, .signatures))]
    NoOverload {
        method: String,
        receiver: Option<String>,
        arg_types: Vec<String>,
        signatures: Vec<String>,
    },

    /// The single arity-compatible candidate rejects an argument's type.
    #[error("argument `{param}` of `{method}` must be `{expected}`, not `{found}`")]
    TypeRestrictionViolation {
        method: String,
        param: String,
        expected: String,
        found: String,
    },

    /// `def foo(x = 1, y)`: only trailing parameters may have defaults.
    #[error("parameter `{param}` of `{method}` needs a default, it follows a defaulted parameter")]
    RequiredAfterDefault { method: String, param: String },

    /// A return type or loop kept widening past the configured cap.
    #[error("type of `{name}` did not stabilize after {rounds} rounds")]
    InferenceDivergence { name: String, rounds: u32 },

    /// A class was reopened with a different superclass.
    #[error("superclass mismatch for class `{class}` (`{found}` vs `{previous}`)")]
    SuperclassMismatch {
        class: String,
        previous: String,
        found: String,
    },

    /// `class A < B` where `B` already inherits from `A`.
    #[error("class `{class}` cannot inherit from its own subclass `{superclass}`")]
    CyclicInheritance { class: String, superclass: String },
}

fn describe_no_overload(
    method: &str,
    receiver: &Option<String>,
    arg_types: &[String],
    signatures: &[String],
) -> String {
    if signatures.is_empty() {
        return match receiver {
            Some(receiver) => format!("undefined method `{method}` for {receiver}"),
            None => format!("undefined method `{method}`"),
        };
    }
    let target = match receiver {
        Some(receiver) => format!("{receiver}#{method}"),
        None => method.to_string(),
    };
    format!(
        "no overload matches `{target}` with types ({})",
        arg_types.join(", ")
    )
}

/// A type error with its location.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[error("{kind}")]
pub struct TypeError {
    pub kind: TypeErrorKind,
    pub span: Span,
}

impl TypeError {
    pub fn new(kind: TypeErrorKind, span: Span) -> Self {
        TypeError { kind, span }
    }

    pub fn code(&self) -> ErrorCode {
        match self.kind {
            TypeErrorKind::TypeRestrictionViolation { .. } => ErrorCode::E2001,
            TypeErrorKind::UnknownType { .. } => ErrorCode::E2002,
            TypeErrorKind::NoOverload { .. } => ErrorCode::E2003,
            TypeErrorKind::InferenceDivergence { .. } => ErrorCode::E2005,
            TypeErrorKind::DuplicateDefinition { .. } => ErrorCode::E2006,
            TypeErrorKind::RequiredAfterDefault { .. } => ErrorCode::E2007,
            TypeErrorKind::SuperclassMismatch { .. } | TypeErrorKind::CyclicInheritance { .. } => {
                ErrorCode::E2008
            }
        }
    }

    /// Convert to a renderable diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diagnostic = Diagnostic::error(self.code()).with_message(self.kind.to_string());
        match &self.kind {
            TypeErrorKind::NoOverload { signatures, .. } => {
                let diagnostic = diagnostic.with_label(self.span, "no matching overload");
                signatures.iter().fold(diagnostic, |d, sig| {
                    d.with_note(format!("overload is `{sig}`"))
                })
            }
            TypeErrorKind::DuplicateDefinition { previous, .. } => diagnostic
                .with_label(self.span, "redefined here")
                .with_secondary_label(*previous, "first defined here"),
            TypeErrorKind::TypeRestrictionViolation { expected, .. } => {
                diagnostic.with_label(self.span, format!("expected `{expected}`"))
            }
            TypeErrorKind::InferenceDivergence { .. } => diagnostic
                .with_label(self.span, "while inferring this")
                .with_note("raise the widening limit in `InferConfig` if this is intended"),
            TypeErrorKind::RequiredAfterDefault { .. } => {
                diagnostic.with_label(self.span, "required parameter after a default")
            }
            TypeErrorKind::UnknownType { .. }
            | TypeErrorKind::SuperclassMismatch { .. }
            | TypeErrorKind::CyclicInheritance { .. } => diagnostic.with_label(self.span, ""),
        }
    }
}
