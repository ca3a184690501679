//! Flat expression arena.
//!
//! Expressions are stored contiguously and referenced by [`ExprId`]. Child
//! lists (call arguments, block statements) live in a side table addressed by
//! [`ExprRange`].

use std::fmt;

use crate::{Name, Span};

/// Index into an [`ExprArena`].
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct ExprId(u32);

impl ExprId {
    /// Create a new `ExprId`.
    #[inline]
    pub const fn new(index: u32) -> Self {
        ExprId(index)
    }

    /// Index into the arena.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExprId({})", self.0)
    }
}

/// A contiguous run of expression ids in the arena's list table.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct ExprRange {
    pub start: u32,
    pub len: u32,
}

impl ExprRange {
    /// The empty range.
    pub const EMPTY: ExprRange = ExprRange { start: 0, len: 0 };

    #[inline]
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Primitive operations backing prelude method bodies.
///
/// Intrinsics never appear in user code; the prelude wraps each one in an
/// ordinary definition so it is resolved and specialized like any other
/// method.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Intrinsic {
    Add,
    Sub,
    Mul,
    Lt,
    Le,
    Gt,
    Ge,
    /// Numeric equality (`1 == 1.0`).
    NumEq,
    /// Reference/value identity for arbitrary objects.
    Identical,
    /// Truncating float to int conversion.
    ToInt,
    /// Int to float conversion.
    ToFloat,
}

impl Intrinsic {
    /// Operators whose result is a number of the widest operand kind.
    pub const fn is_arithmetic(self) -> bool {
        matches!(self, Intrinsic::Add | Intrinsic::Sub | Intrinsic::Mul)
    }

    /// Operators producing a `Bool`.
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Intrinsic::Lt
                | Intrinsic::Le
                | Intrinsic::Gt
                | Intrinsic::Ge
                | Intrinsic::NumEq
                | Intrinsic::Identical
        )
    }

    /// Source-level method name the prelude binds this intrinsic to.
    pub const fn method_name(self) -> &'static str {
        match self {
            Intrinsic::Add => "+",
            Intrinsic::Sub => "-",
            Intrinsic::Mul => "*",
            Intrinsic::Lt => "<",
            Intrinsic::Le => "<=",
            Intrinsic::Gt => ">",
            Intrinsic::Ge => ">=",
            Intrinsic::NumEq | Intrinsic::Identical => "==",
            Intrinsic::ToInt => "to_i",
            Intrinsic::ToFloat => "to_f",
        }
    }
}

/// Expression node kinds.
#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    /// `nil`
    Nil,
    /// `true` / `false`
    Bool(bool),
    /// Integer literal.
    Int(i64),
    /// Float literal.
    Float(f64),
    /// `self`
    SelfRef,
    /// Read of a local variable or parameter.
    Var(Name),
    /// `name = value`
    Assign { name: Name, value: ExprId },
    /// `@name`
    InstanceVar(Name),
    /// `@name = value`
    InstanceVarAssign { name: Name, value: ExprId },
    /// Reference to a class as a value (`Foo` in `Foo.new`).
    Const(Name),
    /// Method or free-function call. `receiver: None` is an implicit-self call.
    Call {
        receiver: Option<ExprId>,
        method: Name,
        args: ExprRange,
    },
    /// `if cond then ... else ... end`; a missing else yields `nil`.
    If {
        cond: ExprId,
        then_branch: ExprId,
        else_branch: Option<ExprId>,
    },
    /// `while cond ... end`, always `nil`.
    While { cond: ExprId, body: ExprId },
    /// `left && right`
    And { left: ExprId, right: ExprId },
    /// `left || right`
    Or { left: ExprId, right: ExprId },
    /// `return` / `return value`
    Return(Option<ExprId>),
    /// Statement sequence; its value is the last statement's (or `nil` if empty).
    Block(ExprRange),
    /// Prelude primitive applied to `args`.
    Intrinsic { op: Intrinsic, args: ExprRange },
}

/// An expression with its source location.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

/// Contiguous storage for all expressions of a module.
#[derive(Clone, Debug, Default)]
pub struct ExprArena {
    exprs: Vec<Expr>,
    lists: Vec<ExprId>,
}

impl ExprArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an expression.
    pub fn alloc(&mut self, kind: ExprKind, span: Span) -> ExprId {
        let id = u32::try_from(self.exprs.len())
            .unwrap_or_else(|_| panic!("expression arena exceeded u32::MAX entries"));
        self.exprs.push(Expr { kind, span });
        ExprId::new(id)
    }

    /// Allocate a child list.
    pub fn alloc_list(&mut self, ids: &[ExprId]) -> ExprRange {
        let start = u32::try_from(self.lists.len())
            .unwrap_or_else(|_| panic!("expression list table exceeded u32::MAX entries"));
        let len = u32::try_from(ids.len())
            .unwrap_or_else(|_| panic!("expression list exceeded u32::MAX entries"));
        self.lists.extend_from_slice(ids);
        ExprRange { start, len }
    }

    /// Get an expression.
    #[inline]
    pub fn get(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    /// Get an expression's kind.
    #[inline]
    pub fn kind(&self, id: ExprId) -> &ExprKind {
        &self.exprs[id.index()].kind
    }

    /// Get an expression's span.
    #[inline]
    pub fn span(&self, id: ExprId) -> Span {
        self.exprs[id.index()].span
    }

    /// Resolve a child list.
    #[inline]
    pub fn list(&self, range: ExprRange) -> &[ExprId] {
        let start = range.start as usize;
        &self.lists[start..start + range.len()]
    }

    /// Number of expressions.
    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    /// Whether no expression was allocated.
    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }
}
