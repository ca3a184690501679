//! Class hierarchy and overload set registries.
//!
//! Both are built once from a module's items before inference starts. The
//! class registry keeps growing afterwards only through instance-variable
//! widening.

mod classes;
mod overloads;

pub use classes::{ClassEntry, ClassRegistry};
pub use overloads::{DefEntry, DefId, OverloadRegistry, OwnerKey};
