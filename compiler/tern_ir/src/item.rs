//! Top-level items: class declarations and definitions.

use crate::{ExprArena, ExprId, Name, Span};

/// `class Name < Superclass`.
///
/// Reopening an existing class repeats its declaration, usually without a
/// superclass.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClassDecl {
    pub name: Name,
    pub superclass: Option<Name>,
    pub span: Span,
}

/// The type a definition is declared on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Owner {
    /// Instance method: `class Foo; def bar; end; end`.
    Instance(Name),
    /// Metatype method: `def Foo.bar; end`.
    Class(Name),
}

/// A parameter type restriction as written in source.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    /// `Int`, `Foo`
    Named(Name),
    /// `Foo?`
    Nilable(Box<TypeExpr>),
    /// `Int | Float`
    Union(Vec<TypeExpr>),
    /// `self`: the receiver's own type.
    SelfType,
}

/// A formal parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: Name,
    pub restriction: Option<TypeExpr>,
    /// Default value, evaluated in the callee's scope when the argument is omitted.
    pub default: Option<ExprId>,
    pub span: Span,
}

/// A named function or method body.
#[derive(Clone, Debug, PartialEq)]
pub struct Definition {
    pub name: Name,
    /// `None` for free functions.
    pub owner: Option<Owner>,
    pub params: Vec<Param>,
    pub body: ExprId,
    pub span: Span,
}

impl Definition {
    /// Number of leading parameters without a default value.
    pub fn required_params(&self) -> usize {
        self.params
            .iter()
            .take_while(|p| p.default.is_none())
            .count()
    }

    /// Whether a call supplying `count` arguments has a valid arity.
    pub fn accepts_arity(&self, count: usize) -> bool {
        count >= self.required_params() && count <= self.params.len()
    }
}

/// A parsed compilation unit.
#[derive(Clone, Debug, Default)]
pub struct Module {
    pub classes: Vec<ClassDecl>,
    pub definitions: Vec<Definition>,
    /// Top-level statements in program order.
    pub main: Vec<ExprId>,
    pub arena: ExprArena,
}
