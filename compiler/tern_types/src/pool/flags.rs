//! Cached per-type properties.

use bitflags::bitflags;

bitflags! {
    /// Properties computed once at interning time.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct TypeFlags: u8 {
        /// The bottom type.
        const NEVER = 1;
        /// A union of two or more members.
        const UNION = 1 << 1;
        /// `Nil` or a union containing it.
        const NILABLE = 1 << 2;
        /// Contains a `Virtual` member.
        const VIRTUAL = 1 << 3;
        /// Contains a class-object (metaclass) member.
        const METACLASS = 1 << 4;
        /// Contains the `self` placeholder.
        const HAS_SELF = 1 << 5;
    }
}

impl TypeFlags {
    /// Flags a union inherits from its members.
    pub const PROPAGATE: Self = Self::NILABLE
        .union(Self::VIRTUAL)
        .union(Self::METACLASS)
        .union(Self::HAS_SELF);
}
