//! Method resolution and type specialization for Tern.
//!
//! Given a module's classes, definitions and top-level statements, this
//! crate decides which definition every call site dispatches to, infers the
//! types every expression can produce, and emits one specialized
//! instantiation per distinct (definition, receiver, argument types) key.
//!
//! # Architecture
//!
//! - [`Pool`]: interned types (`Idx`), unions normalized on construction
//! - [`ClassRegistry`]: single-inheritance hierarchy and instance variables
//! - [`OverloadRegistry`]: definitions grouped by (name, owner)
//! - [`CallResolver`]: union distribution and overload selection
//! - [`InferEngine`]: fixed-point inference over the call graph
//! - [`InstantiationManager`]: one node per specialization key
//!
//! [`check_module`] runs all of it and returns a [`TypeCheckResult`].

mod check;
mod config;
mod error;
mod infer;
pub mod instantiate;
mod names;
mod pool;
pub mod prelude;
mod registry;
pub mod resolve;

#[cfg(test)]
mod test_helpers;

pub use check::{check_module, check_module_with_config, TypeCheckResult, TypedProgram};
pub use config::InferConfig;
pub use error::{TypeError, TypeErrorKind};
pub use infer::InferEngine;
pub use instantiate::{
    CallTarget, DispatchTable, InstId, InstState, InstanceKey, Instantiation,
    InstantiationManager, SpecializedBody,
};
pub use names::WellKnownNames;
pub use pool::{ClassId, Idx, Members, Pool, TypeData, TypeFlags};
pub use registry::{ClassEntry, ClassRegistry, DefEntry, DefId, OverloadRegistry, OwnerKey};
pub use resolve::{CallResolver, DispatchEntry, DispatchTarget, Resolution};
