//! Overload sets: every definition grouped by (name, owner).

use rustc_hash::FxHashMap;
use tern_ir::{Definition, Name, Owner, StringInterner};
use tracing::trace;

use crate::{ClassId, ClassRegistry, Idx, Pool, TypeData, TypeError, TypeErrorKind};

/// Index of a definition in the [`OverloadRegistry`].
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct DefId(u32);

impl DefId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        DefId(raw)
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

/// Resolved owner of a definition.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum OwnerKey {
    /// Free function.
    Free,
    /// Instance method of a class.
    Instance(ClassId),
    /// Method on a class object (`def Foo.bar`).
    Metaclass(ClassId),
}

/// A registered definition with its restrictions resolved.
#[derive(Clone, Debug)]
pub struct DefEntry {
    pub id: DefId,
    pub def: Definition,
    pub owner: OwnerKey,
    /// One entry per parameter; `None` means unrestricted.
    pub restrictions: Vec<Option<Idx>>,
}

impl DefEntry {
    /// The restriction of parameter `index` with `self` substituted.
    pub fn restriction(&self, pool: &mut Pool, index: usize, receiver: Option<Idx>) -> Option<Idx> {
        let restriction = self.restrictions.get(index).copied().flatten()?;
        Some(pool.substitute_self(restriction, receiver.unwrap_or(Idx::OBJECT)))
    }
}

/// All definitions of a program, grouped into overload sets.
#[derive(Clone, Debug, Default)]
pub struct OverloadRegistry {
    defs: Vec<DefEntry>,
    sets: FxHashMap<(Name, OwnerKey), Vec<DefId>>,
}

impl OverloadRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every definition of a module, skipping and reporting the
    /// ones that fail.
    #[tracing::instrument(level = "debug", skip_all, fields(count = defs.len()))]
    pub fn add_all(
        &mut self,
        pool: &mut Pool,
        classes: &ClassRegistry,
        defs: &[Definition],
        interner: &StringInterner,
    ) -> Vec<TypeError> {
        defs.iter()
            .filter_map(|def| self.add(pool, classes, def, interner).err())
            .collect()
    }

    /// Register one definition.
    ///
    /// Fails when the owner or a restriction names an unknown class, when a
    /// parameter without a default follows one with a default, or when the
    /// owner already has a definition with the same name, arity and
    /// restriction vector.
    pub fn add(
        &mut self,
        pool: &mut Pool,
        classes: &ClassRegistry,
        def: &Definition,
        interner: &StringInterner,
    ) -> Result<DefId, TypeError> {
        let owner = match def.owner {
            None => OwnerKey::Free,
            Some(Owner::Instance(name)) => {
                OwnerKey::Instance(classes.resolve_name(name, def.span, interner)?)
            }
            Some(Owner::Class(name)) => {
                OwnerKey::Metaclass(classes.resolve_name(name, def.span, interner)?)
            }
        };

        if let Some(param) = def
            .params
            .iter()
            .skip_while(|p| p.default.is_none())
            .find(|p| p.default.is_none())
        {
            return Err(TypeError::new(
                TypeErrorKind::RequiredAfterDefault {
                    method: interner.lookup(def.name).to_string(),
                    param: interner.lookup(param.name).to_string(),
                },
                param.span,
            ));
        }

        let mut restrictions = Vec::with_capacity(def.params.len());
        for param in &def.params {
            let restriction = match &param.restriction {
                Some(expr) => Some(classes.resolve_type_expr(pool, expr, param.span, interner)?),
                None => None,
            };
            restrictions.push(restriction);
        }

        let set = self.sets.entry((def.name, owner)).or_default();
        if let Some(&previous) = set.iter().find(|&&id| {
            let other = &self.defs[id.index()];
            other.restrictions == restrictions && other.def.params.len() == def.params.len()
        }) {
            let previous = self.defs[previous.index()].def.span;
            let id = DefId(u32::MAX);
            let entry = DefEntry {
                id,
                def: def.clone(),
                owner,
                restrictions,
            };
            let signature = render_signature(&entry, pool, classes, interner);
            return Err(TypeError::new(
                TypeErrorKind::DuplicateDefinition {
                    signature,
                    previous,
                },
                def.span,
            ));
        }

        let raw = u32::try_from(self.defs.len())
            .unwrap_or_else(|_| panic!("overload registry exceeded u32::MAX entries"));
        let id = DefId(raw);
        set.push(id);
        self.defs.push(DefEntry {
            id,
            def: def.clone(),
            owner,
            restrictions,
        });
        trace!(name = interner.lookup(def.name), ?owner, ?id, "registered definition");
        Ok(id)
    }

    #[inline]
    pub fn get(&self, id: DefId) -> &DefEntry {
        &self.defs[id.index()]
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DefEntry> {
        self.defs.iter()
    }

    /// The overload set for exactly `(name, owner)`, in registration order.
    pub fn set(&self, name: Name, owner: OwnerKey) -> &[DefId] {
        self.sets.get(&(name, owner)).map_or(&[], Vec::as_slice)
    }

    /// Candidates for a call on a single (non-union) receiver type.
    ///
    /// Walks from the receiver's class up its superclass chain; within each
    /// class, candidates keep registration order. Class objects continue
    /// with `Object`'s instance methods after their metaclass chain. `None`
    /// selects free functions.
    pub fn candidates_for(
        &self,
        pool: &Pool,
        classes: &ClassRegistry,
        name: Name,
        receiver: Option<Idx>,
    ) -> Vec<DefId> {
        let Some(receiver) = receiver else {
            return self.set(name, OwnerKey::Free).to_vec();
        };
        match pool.data(receiver) {
            TypeData::Concrete(class) | TypeData::Virtual(class) => classes
                .ancestors(*class)
                .flat_map(|c| self.set(name, OwnerKey::Instance(c)).iter().copied())
                .collect(),
            // A class object is also an `Object`.
            TypeData::Metaclass(class) => classes
                .ancestors(*class)
                .map(OwnerKey::Metaclass)
                .chain(std::iter::once(OwnerKey::Instance(ClassId::OBJECT)))
                .flat_map(|owner| self.set(name, owner).iter().copied())
                .collect(),
            TypeData::Never | TypeData::SelfRef | TypeData::Union(_) => Vec::new(),
        }
    }

    /// Whether any definition named `name` exists for `receiver`'s type or
    /// any member of it.
    pub fn has_candidates(
        &self,
        pool: &Pool,
        classes: &ClassRegistry,
        name: Name,
        receiver: Idx,
    ) -> bool {
        pool.members(receiver).into_iter().any(|member| {
            !self
                .candidates_for(pool, classes, name, Some(member))
                .is_empty()
        })
    }

    /// Rendered signature of a definition, e.g. `Foo#bar(x : Int, y = ...)`.
    pub fn signature(
        &self,
        id: DefId,
        pool: &Pool,
        classes: &ClassRegistry,
        interner: &StringInterner,
    ) -> String {
        render_signature(self.get(id), pool, classes, interner)
    }

    /// Rendered signatures of every definition `name` on every owner `receiver`
    /// could dispatch to.
    pub fn signatures(
        &self,
        pool: &Pool,
        classes: &ClassRegistry,
        name: Name,
        receiver: Option<Idx>,
        interner: &StringInterner,
    ) -> Vec<String> {
        let members = match receiver {
            Some(receiver) => pool.members(receiver).into_iter().map(Some).collect(),
            None => vec![None],
        };
        let mut ids: Vec<DefId> = members
            .into_iter()
            .flat_map(|member| self.candidates_for(pool, classes, name, member))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids.into_iter()
            .map(|id| self.signature(id, pool, classes, interner))
            .collect()
    }
}

fn render_signature(
    entry: &DefEntry,
    pool: &Pool,
    classes: &ClassRegistry,
    interner: &StringInterner,
) -> String {
    let owner = match entry.owner {
        OwnerKey::Free => String::new(),
        OwnerKey::Instance(class) => format!("{}#", interner.lookup(classes.name(class))),
        OwnerKey::Metaclass(class) => format!("{}.", interner.lookup(classes.name(class))),
    };
    let params: Vec<String> = entry
        .def
        .params
        .iter()
        .zip(&entry.restrictions)
        .map(|(param, restriction)| {
            let mut out = interner.lookup(param.name).to_string();
            if let Some(restriction) = restriction {
                out.push_str(" : ");
                out.push_str(&classes.type_name(pool, *restriction, interner));
            }
            if param.default.is_some() {
                out.push_str(" = ...");
            }
            out
        })
        .collect();
    format!(
        "{owner}{}({})",
        interner.lookup(entry.def.name),
        params.join(", ")
    )
}

#[cfg(test)]
mod tests;
