//! The class hierarchy.

use std::collections::BTreeMap;

use rustc_hash::{FxHashMap, FxHashSet};
use tern_ir::{ClassDecl, Name, Span, StringInterner, TypeExpr};
use tracing::trace;

use crate::{ClassId, Idx, Pool, TypeData, TypeError, TypeErrorKind, WellKnownNames};

/// A registered class.
#[derive(Clone, Debug)]
pub struct ClassEntry {
    pub id: ClassId,
    pub name: Name,
    /// `None` only for `Object`.
    pub superclass: Option<ClassId>,
    pub span: Span,
    /// Accumulated instance-variable types, without the implicit `Nil`.
    ivars: BTreeMap<Name, Idx>,
}

/// Registry of every class in the program, prelude classes included.
///
/// The hierarchy is a tree rooted at `Object`. Prelude classes are
/// registered on construction with the fixed [`ClassId`] constants.
#[derive(Clone, Debug)]
pub struct ClassRegistry {
    classes: Vec<ClassEntry>,
    by_name: FxHashMap<Name, ClassId>,
    children: Vec<Vec<ClassId>>,
}

impl ClassRegistry {
    /// Create a registry holding the prelude classes.
    pub fn new(pool: &mut Pool, names: &WellKnownNames) -> Self {
        let mut registry = ClassRegistry {
            classes: Vec::new(),
            by_name: FxHashMap::default(),
            children: Vec::new(),
        };
        // Order must match the `ClassId` constants.
        registry.push(pool, names.object, None, Span::DUMMY);
        for name in [names.nil, names.bool, names.int, names.float] {
            registry.push(pool, name, Some(ClassId::OBJECT), Span::DUMMY);
        }
        registry
    }

    fn push(
        &mut self,
        pool: &mut Pool,
        name: Name,
        superclass: Option<ClassId>,
        span: Span,
    ) -> ClassId {
        let raw = u32::try_from(self.classes.len())
            .unwrap_or_else(|_| panic!("class registry exceeded u32::MAX entries"));
        let id = ClassId::from_raw(raw);
        self.classes.push(ClassEntry {
            id,
            name,
            superclass,
            span,
            ivars: BTreeMap::new(),
        });
        self.children.push(Vec::new());
        if let Some(parent) = superclass {
            self.children[parent.index()].push(id);
        }
        self.by_name.insert(name, id);
        pool.concrete(id);
        pool.metaclass(id);
        id
    }

    /// Register class declarations.
    ///
    /// Names are registered first so a superclass may be declared after its
    /// subclass. Reopening a class is allowed; naming a different
    /// superclass on reopen is an error. Declarations that fail are
    /// skipped and reported.
    #[tracing::instrument(level = "debug", skip_all, fields(count = decls.len()))]
    pub fn register_all(
        &mut self,
        pool: &mut Pool,
        decls: &[ClassDecl],
        interner: &StringInterner,
    ) -> Vec<TypeError> {
        let mut errors = Vec::new();
        let mut fresh = FxHashSet::default();

        // Phase 1: names.
        for decl in decls {
            if !self.by_name.contains_key(&decl.name) {
                let id = self.push(pool, decl.name, None, decl.span);
                fresh.insert(id);
                trace!(class = interner.lookup(decl.name), ?id, "registered class");
            }
        }

        // Phase 2: explicit superclasses.
        let mut explicit: FxHashSet<ClassId> = FxHashSet::default();
        for decl in decls {
            let Some(super_name) = decl.superclass else {
                continue;
            };
            let (Some(&id), Some(&parent)) =
                (self.by_name.get(&decl.name), self.by_name.get(&super_name))
            else {
                errors.push(TypeError::new(
                    TypeErrorKind::UnknownType {
                        name: interner.lookup(super_name).to_string(),
                    },
                    decl.span,
                ));
                continue;
            };

            let settable = fresh.contains(&id) && !explicit.contains(&id);
            if !settable {
                let previous = self.classes[id.index()].superclass;
                if previous != Some(parent) {
                    let previous = previous.map_or("<none>", |p| interner.lookup(self.name(p)));
                    errors.push(TypeError::new(
                        TypeErrorKind::SuperclassMismatch {
                            class: interner.lookup(decl.name).to_string(),
                            previous: previous.to_string(),
                            found: interner.lookup(super_name).to_string(),
                        },
                        decl.span,
                    ));
                }
                continue;
            }

            if self.is_subclass(parent, id) {
                errors.push(TypeError::new(
                    TypeErrorKind::CyclicInheritance {
                        class: interner.lookup(decl.name).to_string(),
                        superclass: interner.lookup(super_name).to_string(),
                    },
                    decl.span,
                ));
                continue;
            }

            self.set_superclass(id, parent);
            explicit.insert(id);
        }

        // Phase 3: everything else inherits from Object.
        let mut defaulted: Vec<ClassId> = fresh
            .into_iter()
            .filter(|id| !explicit.contains(id))
            .collect();
        defaulted.sort_unstable();
        for id in defaulted {
            self.set_superclass(id, ClassId::OBJECT);
        }

        errors
    }

    fn set_superclass(&mut self, id: ClassId, parent: ClassId) {
        self.classes[id.index()].superclass = Some(parent);
        self.children[parent.index()].push(id);
    }

    // === Lookup ===

    pub fn lookup(&self, name: Name) -> Option<ClassId> {
        self.by_name.get(&name).copied()
    }

    /// Look up a class by name, reporting `UnknownType` at `span`.
    pub fn resolve_name(
        &self,
        name: Name,
        span: Span,
        interner: &StringInterner,
    ) -> Result<ClassId, TypeError> {
        self.lookup(name).ok_or_else(|| {
            TypeError::new(
                TypeErrorKind::UnknownType {
                    name: interner.lookup(name).to_string(),
                },
                span,
            )
        })
    }

    #[inline]
    pub fn get(&self, id: ClassId) -> &ClassEntry {
        &self.classes[id.index()]
    }

    #[inline]
    pub fn name(&self, id: ClassId) -> Name {
        self.classes[id.index()].name
    }

    #[inline]
    pub fn superclass_of(&self, id: ClassId) -> Option<ClassId> {
        self.classes[id.index()].superclass
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassEntry> {
        self.classes.iter()
    }

    // === Hierarchy ===

    /// `id` followed by its superclass chain up to `Object`.
    pub fn ancestors(&self, id: ClassId) -> impl Iterator<Item = ClassId> + '_ {
        std::iter::successors(Some(id), move |&c| self.superclass_of(c))
    }

    /// Reflexive: a class is a subclass of itself.
    pub fn is_subclass(&self, sub: ClassId, sup: ClassId) -> bool {
        self.ancestors(sub).any(|c| c == sup)
    }

    /// `id` and every class below it, in declaration pre-order.
    pub fn descendants(&self, id: ClassId) -> Vec<ClassId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(class) = stack.pop() {
            out.push(class);
            stack.extend(self.children[class.index()].iter().rev().copied());
        }
        out
    }

    /// Subtyping between two pool types.
    ///
    /// `Never` is below everything. A union on the left must have every
    /// member below the right; a union on the right needs one member above
    /// the left. Instance types follow the class chain and class objects
    /// are below `Object`.
    pub fn is_subtype(&self, pool: &Pool, sub: Idx, sup: Idx) -> bool {
        if sub == sup {
            return true;
        }
        match (pool.data(sub), pool.data(sup)) {
            (TypeData::Never, _) => true,
            (TypeData::Union(members), _) => members.iter().all(|&m| self.is_subtype(pool, m, sup)),
            (_, TypeData::Union(members)) => members.iter().any(|&m| self.is_subtype(pool, sub, m)),
            (
                TypeData::Concrete(a) | TypeData::Virtual(a),
                TypeData::Concrete(b) | TypeData::Virtual(b),
            )
            | (TypeData::Metaclass(a), TypeData::Metaclass(b)) => self.is_subclass(*a, *b),
            (TypeData::Metaclass(_), TypeData::Concrete(b) | TypeData::Virtual(b)) => {
                *b == ClassId::OBJECT
            }
            _ => false,
        }
    }

    /// Resolve a written restriction to a pool type.
    pub fn resolve_type_expr(
        &self,
        pool: &mut Pool,
        expr: &TypeExpr,
        span: Span,
        interner: &StringInterner,
    ) -> Result<Idx, TypeError> {
        match expr {
            TypeExpr::Named(name) => {
                let class = self.resolve_name(*name, span, interner)?;
                Ok(pool.concrete(class))
            }
            TypeExpr::Nilable(inner) => {
                let inner = self.resolve_type_expr(pool, inner, span, interner)?;
                Ok(pool.nilable(inner))
            }
            TypeExpr::Union(parts) => {
                let mut members = Vec::with_capacity(parts.len());
                for part in parts {
                    members.push(self.resolve_type_expr(pool, part, span, interner)?);
                }
                Ok(pool.union_all(members))
            }
            TypeExpr::SelfType => Ok(Idx::SELF),
        }
    }

    // === Instance variables ===

    /// Accumulated type of `@name` on `class`, if ever assigned.
    pub fn ivar_type(&self, class: ClassId, name: Name) -> Option<Idx> {
        self.classes[class.index()].ivars.get(&name).copied()
    }

    /// Widen `@name` on `class` to include `ty`. Returns whether it changed.
    pub fn widen_ivar(&mut self, pool: &mut Pool, class: ClassId, name: Name, ty: Idx) -> bool {
        let ivars = &mut self.classes[class.index()].ivars;
        let old = ivars.get(&name).copied().unwrap_or(Idx::NEVER);
        let new = pool.union(old, ty);
        if new == old {
            return false;
        }
        ivars.insert(name, new);
        true
    }

    /// Instance variables of `class` in name order.
    pub fn ivars(&self, class: ClassId) -> impl Iterator<Item = (Name, Idx)> + '_ {
        self.classes[class.index()]
            .ivars
            .iter()
            .map(|(&n, &t)| (n, t))
    }

    /// Render a type with class names resolved.
    pub fn type_name(&self, pool: &Pool, idx: Idx, interner: &StringInterner) -> String {
        pool.format_type(idx, &|class| interner.lookup(self.name(class)))
    }
}
