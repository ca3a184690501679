//! Instantiation manager: one specialized body per (definition, receiver,
//! argument types) key.
//!
//! Entries are created on the first resolved call with a given key and
//! live for the whole session. The engine mutates them in place while
//! widening and freezes them with [`InstantiationManager::finalize_all`]
//! once the global fixed point is reached.

use rustc_hash::FxHashMap;
use tern_ir::ExprId;
use tracing::debug;

use crate::pool::Members;
use crate::{ClassId, DefId, Idx};

/// Index of an [`Instantiation`].
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct InstId(u32);

impl InstId {
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identity of a specialization. Receiver and arguments are concrete
/// members, never unions.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct InstanceKey {
    pub def: DefId,
    pub receiver: Option<Idx>,
    pub args: Members,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InstState {
    /// Created or between evaluations.
    Pending,
    /// Its body is on the evaluation stack.
    InProgress,
    /// Immutable.
    Finalized,
}

/// Resolved target of one dispatch-table row.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CallTarget {
    Instance(InstId),
    Allocate(ClassId),
    /// `initialize` is `None` when no `initialize` is defined at all and the
    /// call passed no arguments.
    New {
        class: ClassId,
        initialize: Option<InstId>,
    },
}

/// One row of a per-call-site dispatch table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchSlot {
    pub receiver: Option<Idx>,
    pub args: Members,
    pub target: CallTarget,
}

/// Concrete (receiver, arguments) to target, for one call site.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchTable {
    slots: Vec<DispatchSlot>,
}

impl DispatchTable {
    /// Add a row, replacing any row with the same key.
    pub fn insert(&mut self, slot: DispatchSlot) {
        if let Some(existing) = self
            .slots
            .iter_mut()
            .find(|s| s.receiver == slot.receiver && s.args == slot.args)
        {
            *existing = slot;
        } else {
            self.slots.push(slot);
        }
    }

    /// Merge rows of `other` into `self`.
    pub fn merge(&mut self, other: DispatchTable) {
        for slot in other.slots {
            self.insert(slot);
        }
    }

    pub fn lookup(&self, receiver: Option<Idx>, args: &[Idx]) -> Option<CallTarget> {
        self.slots
            .iter()
            .find(|s| s.receiver == receiver && s.args.as_slice() == args)
            .map(|s| s.target)
    }

    pub fn slots(&self) -> &[DispatchSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// A body with every expression's type and every call's dispatch resolved.
#[derive(Clone, Debug, Default)]
pub struct SpecializedBody {
    pub expr_types: FxHashMap<ExprId, Idx>,
    pub dispatch: FxHashMap<ExprId, DispatchTable>,
    /// Final local type of each parameter, reassignments included.
    pub param_types: Vec<Idx>,
}

impl SpecializedBody {
    pub fn expr_type(&self, expr: ExprId) -> Option<Idx> {
        self.expr_types.get(&expr).copied()
    }

    pub fn dispatch(&self, call: ExprId) -> Option<&DispatchTable> {
        self.dispatch.get(&call)
    }
}

/// One specialization of a definition.
#[derive(Clone, Debug)]
pub struct Instantiation {
    pub key: InstanceKey,
    /// Provisional while inference runs, final afterwards.
    pub return_type: Idx,
    pub state: InstState,
    pub body: SpecializedBody,
    /// Set when a recursive call reached this entry while it was in progress.
    pub(crate) revisited: bool,
    /// Pass in which the body was last evaluated to completion.
    pub(crate) visited_pass: Option<u32>,
}

/// Arena of instantiations with key lookup.
#[derive(Debug, Default)]
pub struct InstantiationManager {
    entries: Vec<Instantiation>,
    by_key: FxHashMap<InstanceKey, InstId>,
}

impl InstantiationManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the entry for `key`, creating it if needed. The flag is
    /// `true` when this call created it.
    pub fn get_or_create(&mut self, key: InstanceKey) -> (InstId, bool) {
        if let Some(&id) = self.by_key.get(&key) {
            return (id, false);
        }
        let raw = u32::try_from(self.entries.len())
            .unwrap_or_else(|_| panic!("instantiation table exceeded u32::MAX entries"));
        let id = InstId(raw);
        self.by_key.insert(key.clone(), id);
        self.entries.push(Instantiation {
            key,
            return_type: Idx::NEVER,
            state: InstState::Pending,
            body: SpecializedBody::default(),
            revisited: false,
            visited_pass: None,
        });
        (id, true)
    }

    pub fn lookup(&self, key: &InstanceKey) -> Option<InstId> {
        self.by_key.get(key).copied()
    }

    #[inline]
    pub fn get(&self, id: InstId) -> &Instantiation {
        &self.entries[id.index()]
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: InstId) -> &mut Instantiation {
        &mut self.entries[id.index()]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "get_or_create bounds the table to u32"
    )]
    pub fn iter(&self) -> impl Iterator<Item = (InstId, &Instantiation)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, inst)| (InstId(i as u32), inst))
    }

    /// Instantiations of one definition, in creation order.
    pub fn of_definition(&self, def: DefId) -> impl Iterator<Item = (InstId, &Instantiation)> {
        self.iter().filter(move |(_, inst)| inst.key.def == def)
    }

    /// Freeze one entry. A return type still at `Never` means no path ever
    /// produced a value and becomes `Nil`.
    pub fn finalize(&mut self, id: InstId) {
        let inst = &mut self.entries[id.index()];
        if inst.state == InstState::Finalized {
            return;
        }
        if inst.return_type.is_never() {
            inst.return_type = Idx::NIL;
        }
        inst.state = InstState::Finalized;
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "get_or_create bounds the table to u32"
    )]
    pub fn finalize_all(&mut self) {
        for i in 0..self.entries.len() {
            self.finalize(InstId(i as u32));
        }
        debug!(count = self.entries.len(), "finalized instantiations");
    }
}

#[cfg(test)]
mod tests;
