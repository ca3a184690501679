//! Intermediate representation consumed by the Tern type engine.
//!
//! The parser is an external collaborator: it produces a [`Module`] made of
//! class declarations, definitions and top-level statements, all pointing
//! into one flat [`ExprArena`]. [`ModuleBuilder`] constructs the same
//! structure programmatically.
//!
//! # Design
//!
//! - `ExprId(u32)` indices instead of boxed expression trees
//! - `Name(u32)` interned identifiers, compared by index
//! - `Span` is 8 bytes and `Copy`

mod builder;
mod expr;
mod interner;
mod item;
mod name;
mod span;

pub use builder::ModuleBuilder;
pub use expr::{Expr, ExprArena, ExprId, ExprKind, ExprRange, Intrinsic};
pub use interner::StringInterner;
pub use item::{ClassDecl, Definition, Module, Owner, Param, TypeExpr};
pub use name::Name;
pub use span::Span;
