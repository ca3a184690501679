//! Type and class handles.

use std::fmt;

/// A 32-bit index into the type [`Pool`](crate::Pool).
///
/// Types are interned with unions normalized, so type equality is index
/// equality.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Idx(u32);

impl Idx {
    // === Pre-interned types (indices 0-6) ===

    /// Bottom: no value yet observed. Provisional return type of a node
    /// under evaluation and the type of unreachable code.
    pub const NEVER: Self = Self(0);
    /// Instances of `Object` exactly.
    pub const OBJECT: Self = Self(1);
    /// `Nil`.
    pub const NIL: Self = Self(2);
    /// `Bool`.
    pub const BOOL: Self = Self(3);
    /// `Int`.
    pub const INT: Self = Self(4);
    /// `Float`.
    pub const FLOAT: Self = Self(5);
    /// The `self` restriction placeholder, substituted per receiver.
    pub const SELF: Self = Self(6);

    /// Number of pre-interned types.
    pub const PREINTERNED: u32 = 7;

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_never(self) -> bool {
        self.0 == Self::NEVER.0
    }
}

impl fmt::Debug for Idx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::NEVER => write!(f, "Idx::NEVER"),
            Self::OBJECT => write!(f, "Idx::OBJECT"),
            Self::NIL => write!(f, "Idx::NIL"),
            Self::BOOL => write!(f, "Idx::BOOL"),
            Self::INT => write!(f, "Idx::INT"),
            Self::FLOAT => write!(f, "Idx::FLOAT"),
            Self::SELF => write!(f, "Idx::SELF"),
            _ => write!(f, "Idx({})", self.0),
        }
    }
}

/// Identity of a class in the [`ClassRegistry`](crate::ClassRegistry).
///
/// Prelude classes have fixed ids so their concrete types can be
/// pre-interned.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[repr(transparent)]
pub struct ClassId(u32);

impl ClassId {
    pub const OBJECT: Self = Self(0);
    pub const NIL: Self = Self(1);
    pub const BOOL: Self = Self(2);
    pub const INT: Self = Self(3);
    pub const FLOAT: Self = Self(4);

    /// Number of prelude classes.
    pub const BUILTIN_COUNT: u32 = 5;

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

const _: () = assert!(std::mem::size_of::<Idx>() == 4);
