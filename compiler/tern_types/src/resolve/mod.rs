//! Call resolution.
//!
//! A call is resolved by distributing its receiver and argument types over
//! their members: every combination of concrete member types selects exactly
//! one target, and the combinations together form the call site's dispatch
//! table. `Virtual(c)` members are expanded to every concrete descendant of
//! `c` first, so the table only ever holds concrete keys.
//!
//! Within one combination the candidate list comes from
//! [`OverloadRegistry::candidates_for`] (subclass definitions before
//! inherited ones). Candidates are filtered by arity and restrictions, and
//! the most specific survivor wins; ties keep candidate order.

use smallvec::SmallVec;
use tern_ir::{Name, Span, StringInterner};
use tracing::trace;

use crate::pool::Members;
use crate::{
    ClassId, ClassRegistry, DefId, Idx, OverloadRegistry, Pool, TypeData, TypeError,
    TypeErrorKind, TypeFlags, WellKnownNames,
};

/// What one concrete combination dispatches to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DispatchTarget {
    /// A user or prelude definition.
    Definition(DefId),
    /// Built-in `Foo.allocate`: a fresh instance with unset instance variables.
    Allocate(ClassId),
    /// Built-in `Foo.new(args)`: allocate, then `initialize(args)`.
    New(ClassId),
}

/// One row of a dispatch table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchEntry {
    pub receiver: Option<Idx>,
    pub args: Members,
    pub target: DispatchTarget,
}

/// The full result of resolving one call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    /// One entry per concrete (receiver, arguments) combination, in
    /// member order.
    pub entries: Vec<DispatchEntry>,
}

impl Resolution {
    /// Distinct definitions selected by any entry, in first-use order.
    pub fn definitions(&self) -> Vec<DefId> {
        let mut out: Vec<DefId> = Vec::new();
        for entry in &self.entries {
            if let DispatchTarget::Definition(id) = entry.target {
                if !out.contains(&id) {
                    out.push(id);
                }
            }
        }
        out
    }

    /// An empty resolution: the call is unreachable.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Why one combination found no target.
struct Failure {
    /// Candidates whose arity accepts the call.
    arity_ok: Vec<DefId>,
}

/// Resolves calls against the registries.
///
/// Borrows the pool mutably because distributing `Virtual` members and
/// substituting `self` restrictions may intern new types.
pub struct CallResolver<'a> {
    pool: &'a mut Pool,
    classes: &'a ClassRegistry,
    overloads: &'a OverloadRegistry,
    names: &'a WellKnownNames,
    interner: &'a StringInterner,
}

impl<'a> CallResolver<'a> {
    pub fn new(
        pool: &'a mut Pool,
        classes: &'a ClassRegistry,
        overloads: &'a OverloadRegistry,
        names: &'a WellKnownNames,
        interner: &'a StringInterner,
    ) -> Self {
        CallResolver {
            pool,
            classes,
            overloads,
            names,
            interner,
        }
    }

    /// Resolve `receiver.name(args)` (`receiver: None` for free functions).
    ///
    /// Returns an empty resolution when the receiver or an argument is
    /// `Never`.
    pub fn resolve(
        &mut self,
        name: Name,
        receiver: Option<Idx>,
        args: &[Idx],
        span: Span,
    ) -> Result<Resolution, TypeError> {
        let receivers: SmallVec<[Option<Idx>; 4]> = match receiver {
            Some(receiver) => self.expand(receiver).into_iter().map(Some).collect(),
            None => smallvec::smallvec![None],
        };
        let arg_members: Vec<Members> = args.iter().map(|&arg| self.expand(arg)).collect();
        if receivers.is_empty() || arg_members.iter().any(SmallVec::is_empty) {
            return Ok(Resolution::default());
        }

        let mut entries = Vec::new();
        let mut cursor = vec![0usize; arg_members.len()];
        for &member in &receivers {
            loop {
                let combo: Members = cursor
                    .iter()
                    .zip(&arg_members)
                    .map(|(&i, members)| members[i])
                    .collect();
                match self.select(name, member, &combo) {
                    Ok(target) => entries.push(DispatchEntry {
                        receiver: member,
                        args: combo,
                        target,
                    }),
                    Err(failure) => {
                        return Err(self.failure_error(&failure, name, member, &combo, args, span));
                    }
                }
                if !advance(&mut cursor, &arg_members) {
                    break;
                }
            }
        }

        trace!(
            method = self.interner.lookup(name),
            entries = entries.len(),
            "resolved call"
        );
        Ok(Resolution { entries })
    }

    /// Resolve a call written without a receiver.
    ///
    /// Inside a method the receiver's own overload sets are searched first;
    /// if `name` is not defined there the call goes to free functions.
    pub fn resolve_implicit(
        &mut self,
        name: Name,
        self_type: Option<Idx>,
        args: &[Idx],
        span: Span,
    ) -> Result<Resolution, TypeError> {
        if let Some(self_type) = self_type {
            let builtin = self.pool.flags(self_type).contains(TypeFlags::METACLASS)
                && (name == self.names.new || name == self.names.allocate);
            if builtin
                || self
                    .overloads
                    .has_candidates(self.pool, self.classes, name, self_type)
            {
                return self.resolve(name, Some(self_type), args, span);
            }
        }
        self.resolve(name, None, args, span)
    }

    /// Members of `ty` with `Virtual` members replaced by their concrete
    /// descendants, sorted and deduplicated.
    pub fn expand(&mut self, ty: Idx) -> Members {
        let mut out = Members::new();
        for member in self.pool.members(ty) {
            let virtual_class = match self.pool.data(member) {
                TypeData::Virtual(class) => Some(*class),
                _ => None,
            };
            if let Some(class) = virtual_class {
                for descendant in self.classes.descendants(class) {
                    out.push(self.pool.concrete(descendant));
                }
            } else {
                out.push(member);
            }
        }
        out.sort_unstable();
        out.dedup();
        out
    }

    fn select(
        &mut self,
        name: Name,
        receiver: Option<Idx>,
        args: &[Idx],
    ) -> Result<DispatchTarget, Failure> {
        let candidates = self
            .overloads
            .candidates_for(self.pool, self.classes, name, receiver);
        let arity_ok: Vec<DefId> = candidates
            .iter()
            .copied()
            .filter(|&id| self.overloads.get(id).def.accepts_arity(args.len()))
            .collect();

        let mut best: Option<DefId> = None;
        for &id in &arity_ok {
            if !self.matches(id, receiver, args) {
                continue;
            }
            best = match best {
                Some(current) if !self.more_specific(id, current, receiver, args.len()) => {
                    Some(current)
                }
                _ => Some(id),
            };
        }
        if let Some(id) = best {
            return Ok(DispatchTarget::Definition(id));
        }

        if candidates.is_empty() {
            if let Some(target) = self.builtin(name, receiver, args) {
                return Ok(target);
            }
        }
        Err(Failure { arity_ok })
    }

    fn builtin(&self, name: Name, receiver: Option<Idx>, args: &[Idx]) -> Option<DispatchTarget> {
        let TypeData::Metaclass(class) = self.pool.data(receiver?) else {
            return None;
        };
        let class = *class;
        if name == self.names.new {
            Some(DispatchTarget::New(class))
        } else if name == self.names.allocate && args.is_empty() {
            Some(DispatchTarget::Allocate(class))
        } else {
            None
        }
    }

    /// Whether every supplied argument satisfies its parameter's restriction.
    fn matches(&mut self, id: DefId, receiver: Option<Idx>, args: &[Idx]) -> bool {
        let entry = self.overloads.get(id);
        args.iter().enumerate().all(|(i, &arg)| {
            entry
                .restriction(self.pool, i, receiver)
                .map_or(true, |r| self.classes.is_subtype(self.pool, arg, r))
        })
    }

    /// `a` is strictly more specific than `b` over the first `arity`
    /// parameters: every restriction of `a` fits inside `b`'s and at least
    /// one is narrower. A missing restriction is the widest.
    fn more_specific(&mut self, a: DefId, b: DefId, receiver: Option<Idx>, arity: usize) -> bool {
        let (a, b) = (self.overloads.get(a), self.overloads.get(b));
        let mut narrower = false;
        for i in 0..arity {
            let ra = a.restriction(self.pool, i, receiver);
            let rb = b.restriction(self.pool, i, receiver);
            match (ra, rb) {
                (_, None) if ra.is_some() => narrower = true,
                (None, Some(_)) => return false,
                (Some(ra), Some(rb)) => {
                    if !self.classes.is_subtype(self.pool, ra, rb) {
                        return false;
                    }
                    if ra != rb {
                        narrower = true;
                    }
                }
                _ => {}
            }
        }
        narrower
    }

    fn failure_error(
        &mut self,
        failure: &Failure,
        name: Name,
        receiver: Option<Idx>,
        combo: &[Idx],
        args: &[Idx],
        span: Span,
    ) -> TypeError {
        let method = self.interner.lookup(name).to_string();

        if let [only] = failure.arity_ok.as_slice() {
            let entry = self.overloads.get(*only);
            for (i, &arg) in combo.iter().enumerate() {
                let Some(restriction) = entry.restriction(self.pool, i, receiver) else {
                    continue;
                };
                if self.classes.is_subtype(self.pool, arg, restriction) {
                    continue;
                }
                let param = self.interner.lookup(entry.def.params[i].name).to_string();
                return TypeError::new(
                    TypeErrorKind::TypeRestrictionViolation {
                        method,
                        param,
                        expected: self.type_name(restriction),
                        found: self.type_name(args[i]),
                    },
                    span,
                );
            }
        }

        TypeError::new(
            TypeErrorKind::NoOverload {
                method,
                receiver: receiver.map(|r| self.type_name(r)),
                arg_types: args.iter().map(|&a| self.type_name(a)).collect(),
                signatures: self.overloads.signatures(
                    self.pool,
                    self.classes,
                    name,
                    receiver,
                    self.interner,
                ),
            },
            span,
        )
    }

    fn type_name(&self, ty: Idx) -> String {
        self.classes.type_name(self.pool, ty, self.interner)
    }
}

/// Step an odometer over member lists. Returns `false` after wrapping.
fn advance(cursor: &mut [usize], lists: &[Members]) -> bool {
    for (slot, list) in cursor.iter_mut().zip(lists).rev() {
        *slot += 1;
        if *slot < list.len() {
            return true;
        }
        *slot = 0;
    }
    false
}
