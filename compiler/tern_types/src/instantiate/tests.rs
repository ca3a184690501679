use pretty_assertions::assert_eq;
use smallvec::smallvec;

use super::*;

fn key(def: u32, args: &[Idx]) -> InstanceKey {
    InstanceKey {
        def: DefId::from_raw(def),
        receiver: None,
        args: args.iter().copied().collect(),
    }
}

#[test]
fn one_entry_per_key() {
    let mut manager = InstantiationManager::new();
    let (a, created_a) = manager.get_or_create(key(0, &[Idx::INT]));
    let (b, created_b) = manager.get_or_create(key(0, &[Idx::INT]));
    let (c, created_c) = manager.get_or_create(key(0, &[Idx::FLOAT]));
    assert!(created_a);
    assert!(!created_b);
    assert!(created_c);
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(manager.len(), 2);
    assert_eq!(manager.lookup(&key(0, &[Idx::FLOAT])), Some(c));
}

#[test]
fn receiver_is_part_of_the_key() {
    let mut manager = InstantiationManager::new();
    let (a, _) = manager.get_or_create(key(0, &[]));
    let (b, _) = manager.get_or_create(InstanceKey {
        receiver: Some(Idx::INT),
        ..key(0, &[])
    });
    assert_ne!(a, b);
}

#[test]
fn new_entries_start_pending_at_never() {
    let mut manager = InstantiationManager::new();
    let (id, _) = manager.get_or_create(key(3, &[]));
    let inst = manager.get(id);
    assert_eq!(inst.return_type, Idx::NEVER);
    assert_eq!(inst.state, InstState::Pending);
}

#[test]
fn finalize_turns_never_into_nil() {
    let mut manager = InstantiationManager::new();
    let (never, _) = manager.get_or_create(key(0, &[]));
    let (int, _) = manager.get_or_create(key(1, &[]));
    manager.get_mut(int).return_type = Idx::INT;
    manager.finalize_all();
    assert_eq!(manager.get(never).return_type, Idx::NIL);
    assert_eq!(manager.get(int).return_type, Idx::INT);
    assert_eq!(manager.get(int).state, InstState::Finalized);
}

#[test]
fn of_definition_filters_by_def() {
    let mut manager = InstantiationManager::new();
    manager.get_or_create(key(0, &[Idx::INT]));
    manager.get_or_create(key(1, &[Idx::INT]));
    manager.get_or_create(key(0, &[Idx::FLOAT]));
    let ids: Vec<_> = manager
        .of_definition(DefId::from_raw(0))
        .map(|(_, inst)| inst.key.args[0])
        .collect();
    assert_eq!(ids, vec![Idx::INT, Idx::FLOAT]);
}

#[test]
fn dispatch_table_replaces_same_key() {
    let mut table = DispatchTable::default();
    table.insert(DispatchSlot {
        receiver: None,
        args: smallvec![Idx::INT],
        target: CallTarget::Allocate(ClassId::OBJECT),
    });
    table.insert(DispatchSlot {
        receiver: None,
        args: smallvec![Idx::INT],
        target: CallTarget::Allocate(ClassId::NIL),
    });
    table.insert(DispatchSlot {
        receiver: None,
        args: smallvec![Idx::FLOAT],
        target: CallTarget::Allocate(ClassId::BOOL),
    });
    assert_eq!(table.len(), 2);
    assert_eq!(
        table.lookup(None, &[Idx::INT]),
        Some(CallTarget::Allocate(ClassId::NIL))
    );
    assert_eq!(table.lookup(Some(Idx::INT), &[Idx::INT]), None);
}
