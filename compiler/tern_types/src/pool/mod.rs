//! Interned type representation.
//!
//! Every type the engine manipulates lives in a [`Pool`] and is referred to
//! by [`Idx`]. Unions are normalized on construction (flattened, bottom
//! removed, members deduplicated and sorted) so two unions with the same
//! member set always intern to the same index.

mod flags;
mod format;
mod idx;

pub use flags::TypeFlags;
pub use idx::{ClassId, Idx};

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Structural description of a type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    /// Bottom: no value observed yet, or unreachable.
    Never,
    /// Exactly instances of one class.
    Concrete(ClassId),
    /// A class or any of its descendants.
    Virtual(ClassId),
    /// The class object of a class (the type of `Foo` in `Foo.new`).
    Metaclass(ClassId),
    /// The `self` restriction placeholder.
    SelfRef,
    /// Two or more members, sorted by index, no nested unions, no `Never`.
    Union(Box<[Idx]>),
}

/// Member list used when distributing over a union.
pub type Members = SmallVec<[Idx; 4]>;

/// Type interning pool.
pub struct Pool {
    items: Vec<TypeData>,
    flags: Vec<TypeFlags>,
    intern_map: FxHashMap<TypeData, Idx>,
}

impl Pool {
    /// Create a pool holding the pre-interned types.
    pub fn new() -> Self {
        let mut pool = Pool {
            items: Vec::with_capacity(64),
            flags: Vec::with_capacity(64),
            intern_map: FxHashMap::default(),
        };

        // Order must match the `Idx` constants.
        pool.intern(TypeData::Never);
        pool.intern(TypeData::Concrete(ClassId::OBJECT));
        pool.intern(TypeData::Concrete(ClassId::NIL));
        pool.intern(TypeData::Concrete(ClassId::BOOL));
        pool.intern(TypeData::Concrete(ClassId::INT));
        pool.intern(TypeData::Concrete(ClassId::FLOAT));
        pool.intern(TypeData::SelfRef);
        debug_assert_eq!(pool.items.len(), Idx::PREINTERNED as usize);

        pool
    }

    fn intern(&mut self, data: TypeData) -> Idx {
        if let Some(&idx) = self.intern_map.get(&data) {
            return idx;
        }
        let raw = u32::try_from(self.items.len())
            .unwrap_or_else(|_| panic!("type pool exceeded u32::MAX entries"));
        let idx = Idx::from_raw(raw);
        let flags = self.compute_flags(&data);
        self.items.push(data.clone());
        self.flags.push(flags);
        self.intern_map.insert(data, idx);
        idx
    }

    fn compute_flags(&self, data: &TypeData) -> TypeFlags {
        match data {
            TypeData::Never => TypeFlags::NEVER,
            TypeData::Concrete(class) if *class == ClassId::NIL => TypeFlags::NILABLE,
            TypeData::Concrete(_) => TypeFlags::empty(),
            TypeData::Virtual(_) => TypeFlags::VIRTUAL,
            TypeData::Metaclass(_) => TypeFlags::METACLASS,
            TypeData::SelfRef => TypeFlags::HAS_SELF,
            TypeData::Union(members) => members.iter().fold(TypeFlags::UNION, |acc, &m| {
                acc | (self.flags(m) & TypeFlags::PROPAGATE)
            }),
        }
    }

    // === Queries ===

    #[inline]
    pub fn data(&self, idx: Idx) -> &TypeData {
        &self.items[idx.raw() as usize]
    }

    #[inline]
    pub fn flags(&self, idx: Idx) -> TypeFlags {
        self.flags[idx.raw() as usize]
    }

    /// Number of interned types.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn is_nilable(&self, idx: Idx) -> bool {
        self.flags(idx).contains(TypeFlags::NILABLE)
    }

    #[inline]
    pub fn is_union(&self, idx: Idx) -> bool {
        self.flags(idx).contains(TypeFlags::UNION)
    }

    /// The class of a `Concrete` type.
    pub fn class_of(&self, idx: Idx) -> Option<ClassId> {
        match self.data(idx) {
            TypeData::Concrete(class) => Some(*class),
            _ => None,
        }
    }

    /// The class an instance-level type is rooted at (`Concrete` or `Virtual`).
    pub fn instance_class(&self, idx: Idx) -> Option<ClassId> {
        match self.data(idx) {
            TypeData::Concrete(class) | TypeData::Virtual(class) => Some(*class),
            _ => None,
        }
    }

    /// Members of a type: the union's members, nothing for `Never`, or the
    /// type itself.
    pub fn members(&self, idx: Idx) -> Members {
        match self.data(idx) {
            TypeData::Never => Members::new(),
            TypeData::Union(members) => members.iter().copied().collect(),
            _ => smallvec::smallvec![idx],
        }
    }

    /// Look up an already-interned concrete type without interning.
    pub fn lookup_concrete(&self, class: ClassId) -> Option<Idx> {
        self.intern_map.get(&TypeData::Concrete(class)).copied()
    }

    pub fn lookup_metaclass(&self, class: ClassId) -> Option<Idx> {
        self.intern_map.get(&TypeData::Metaclass(class)).copied()
    }

    // === Constructors ===

    pub fn concrete(&mut self, class: ClassId) -> Idx {
        self.intern(TypeData::Concrete(class))
    }

    pub fn virtual_of(&mut self, class: ClassId) -> Idx {
        self.intern(TypeData::Virtual(class))
    }

    pub fn metaclass(&mut self, class: ClassId) -> Idx {
        self.intern(TypeData::Metaclass(class))
    }

    /// Normalized union of two types.
    pub fn union(&mut self, a: Idx, b: Idx) -> Idx {
        if a == b || b.is_never() {
            return a;
        }
        if a.is_never() {
            return b;
        }
        self.union_all([a, b])
    }

    /// Normalized union of any number of types.
    ///
    /// Empty input yields `Never`; a single distinct member yields that
    /// member.
    pub fn union_all(&mut self, types: impl IntoIterator<Item = Idx>) -> Idx {
        let mut members = Members::new();
        for ty in types {
            match self.data(ty) {
                TypeData::Never => {}
                TypeData::Union(inner) => members.extend(inner.iter().copied()),
                _ => members.push(ty),
            }
        }
        members.sort_unstable();
        members.dedup();
        match members.len() {
            0 => Idx::NEVER,
            1 => members[0],
            _ => self.intern(TypeData::Union(members.into_vec().into_boxed_slice())),
        }
    }

    /// `t ∪ Nil`.
    pub fn nilable(&mut self, idx: Idx) -> Idx {
        self.union(idx, Idx::NIL)
    }

    /// `t` with `Nil` removed; `Nil` itself becomes `Never`.
    pub fn without_nil(&mut self, idx: Idx) -> Idx {
        if !self.is_nilable(idx) {
            return idx;
        }
        let members: Members = self
            .members(idx)
            .into_iter()
            .filter(|&m| m != Idx::NIL)
            .collect();
        self.union_all(members)
    }

    /// Replace the `self` placeholder with `receiver`.
    pub fn substitute_self(&mut self, idx: Idx, receiver: Idx) -> Idx {
        if !self.flags(idx).contains(TypeFlags::HAS_SELF) {
            return idx;
        }
        let members: Members = self
            .members(idx)
            .into_iter()
            .map(|m| if m == Idx::SELF { receiver } else { m })
            .collect();
        self.union_all(members)
    }
}

impl Default for Pool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
