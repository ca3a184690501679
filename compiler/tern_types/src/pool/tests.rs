use pretty_assertions::assert_eq;

use super::*;

fn builtin_name(class: ClassId) -> &'static str {
    match class {
        ClassId::OBJECT => "Object",
        ClassId::NIL => "Nil",
        ClassId::BOOL => "Bool",
        ClassId::INT => "Int",
        ClassId::FLOAT => "Float",
        _ => "Foo",
    }
}

fn show(pool: &Pool, idx: Idx) -> String {
    pool.format_type(idx, &builtin_name)
}

#[test]
fn preinterned_types_match_constants() {
    let pool = Pool::new();
    assert_eq!(pool.data(Idx::NEVER), &TypeData::Never);
    assert_eq!(pool.data(Idx::INT), &TypeData::Concrete(ClassId::INT));
    assert_eq!(pool.data(Idx::FLOAT), &TypeData::Concrete(ClassId::FLOAT));
    assert_eq!(pool.data(Idx::SELF), &TypeData::SelfRef);
    assert_eq!(pool.len(), Idx::PREINTERNED as usize);
}

#[test]
fn concrete_is_interned_once() {
    let mut pool = Pool::new();
    let foo = ClassId::from_raw(7);
    let a = pool.concrete(foo);
    let b = pool.concrete(foo);
    assert_eq!(a, b);
    assert_eq!(pool.concrete(ClassId::INT), Idx::INT);
}

#[test]
fn union_with_never_is_identity() {
    let mut pool = Pool::new();
    assert_eq!(pool.union(Idx::NEVER, Idx::INT), Idx::INT);
    assert_eq!(pool.union(Idx::INT, Idx::NEVER), Idx::INT);
    assert_eq!(pool.union_all([]), Idx::NEVER);
}

#[test]
fn union_is_order_independent_and_flattened() {
    let mut pool = Pool::new();
    let a = pool.union(Idx::INT, Idx::FLOAT);
    let b = pool.union(Idx::FLOAT, Idx::INT);
    assert_eq!(a, b);

    let nested = pool.union(a, Idx::NIL);
    let flat = pool.union_all([Idx::NIL, Idx::FLOAT, Idx::INT]);
    assert_eq!(nested, flat);
    assert_eq!(pool.members(flat).as_slice(), &[Idx::NIL, Idx::INT, Idx::FLOAT]);
}

#[test]
fn union_of_duplicates_collapses() {
    let mut pool = Pool::new();
    assert_eq!(pool.union_all([Idx::INT, Idx::INT]), Idx::INT);
}

#[test]
fn flags_propagate_through_unions() {
    let mut pool = Pool::new();
    let foo = pool.virtual_of(ClassId::from_raw(6));
    let t = pool.union_all([Idx::NIL, foo]);
    let flags = pool.flags(t);
    assert!(flags.contains(TypeFlags::UNION));
    assert!(flags.contains(TypeFlags::NILABLE));
    assert!(flags.contains(TypeFlags::VIRTUAL));
    assert!(!flags.contains(TypeFlags::NEVER));
    assert!(pool.flags(Idx::NEVER).contains(TypeFlags::NEVER));
}

#[test]
fn without_nil_strips_only_nil() {
    let mut pool = Pool::new();
    let t = pool.union_all([Idx::NIL, Idx::INT, Idx::FLOAT]);
    let expected = pool.union(Idx::INT, Idx::FLOAT);
    assert_eq!(pool.without_nil(t), expected);
    assert_eq!(pool.without_nil(Idx::NIL), Idx::NEVER);
    assert_eq!(pool.without_nil(Idx::INT), Idx::INT);
}

#[test]
fn substitute_self_replaces_placeholder() {
    let mut pool = Pool::new();
    let restriction = pool.union(Idx::SELF, Idx::NIL);
    let result = pool.substitute_self(restriction, Idx::INT);
    let expected = pool.nilable(Idx::INT);
    assert_eq!(result, expected);
    assert_eq!(pool.substitute_self(Idx::FLOAT, Idx::INT), Idx::FLOAT);
}

#[test]
fn lookup_concrete_does_not_intern() {
    let pool = Pool::new();
    assert_eq!(pool.lookup_concrete(ClassId::BOOL), Some(Idx::BOOL));
    assert_eq!(pool.lookup_concrete(ClassId::from_raw(40)), None);
}

#[test]
fn formatting() {
    let mut pool = Pool::new();
    let nilable_int = pool.nilable(Idx::INT);
    let number = pool.union(Idx::INT, Idx::FLOAT);
    let nilable_number = pool.nilable(number);
    let foo = ClassId::from_raw(5);
    let meta = pool.metaclass(foo);
    let virt = pool.virtual_of(foo);

    assert_eq!(show(&pool, Idx::INT), "Int");
    assert_eq!(show(&pool, Idx::NEVER), "NoReturn");
    assert_eq!(show(&pool, nilable_int), "Int?");
    assert_eq!(show(&pool, number), "Int | Float");
    assert_eq!(show(&pool, nilable_number), "Nil | Int | Float");
    assert_eq!(show(&pool, meta), "Foo.class");
    assert_eq!(show(&pool, virt), "Foo+");
    assert_eq!(show(&pool, Idx::SELF), "self");
}
