use pretty_assertions::assert_eq;
use tern_ir::{ModuleBuilder, StringInterner};

use super::*;
use crate::WellKnownNames;

struct Fixture {
    interner: StringInterner,
    pool: Pool,
    classes: ClassRegistry,
    overloads: OverloadRegistry,
}

fn setup(build: impl FnOnce(&mut ModuleBuilder<'_>)) -> (Fixture, Vec<TypeError>) {
    let interner = StringInterner::new();
    let module = {
        let mut b = ModuleBuilder::new(&interner);
        build(&mut b);
        b.finish()
    };
    let names = WellKnownNames::new(&interner);
    let mut pool = Pool::new();
    let mut classes = ClassRegistry::new(&mut pool, &names);
    let mut errors = classes.register_all(&mut pool, &module.classes, &interner);
    let mut overloads = OverloadRegistry::new();
    errors.extend(overloads.add_all(&mut pool, &classes, &module.definitions, &interner));
    (
        Fixture {
            interner,
            pool,
            classes,
            overloads,
        },
        errors,
    )
}

impl Fixture {
    fn name(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    fn class_type(&mut self, s: &str) -> Idx {
        let id = self
            .classes
            .lookup(self.interner.intern(s))
            .unwrap_or_else(|| panic!("no class {s}"));
        self.pool.concrete(id)
    }
}

#[test]
fn candidates_walk_superclass_chain() {
    let (mut f, errors) = setup(|b| {
        b.class("Foo", None);
        b.class("Bar", Some("Foo"));
        let one = b.int(1);
        b.method("Foo", "foo", vec![], one);
        let two = b.int(2);
        let other = b.param_restricted("other", b.named_type("Int"));
        b.method("Bar", "foo", vec![other], two);
    });
    assert!(errors.is_empty());
    let bar = f.class_type("Bar");
    let foo = f.class_type("Foo");
    let name = f.name("foo");

    let on_bar = f.overloads.candidates_for(&f.pool, &f.classes, name, Some(bar));
    assert_eq!(on_bar, vec![DefId::from_raw(1), DefId::from_raw(0)]);
    let on_foo = f.overloads.candidates_for(&f.pool, &f.classes, name, Some(foo));
    assert_eq!(on_foo, vec![DefId::from_raw(0)]);
    assert!(f
        .overloads
        .candidates_for(&f.pool, &f.classes, name, None)
        .is_empty());
}

#[test]
fn restrictions_are_resolved_at_registration() {
    let (f, errors) = setup(|b| {
        let body = b.nil();
        let x = b.param_restricted("x", b.named_type("Int"));
        let y = b.param("y");
        b.def("foo", vec![x, y], body);
    });
    assert!(errors.is_empty());
    let entry = f.overloads.get(DefId::from_raw(0));
    assert_eq!(entry.owner, OwnerKey::Free);
    assert_eq!(entry.restrictions, vec![Some(Idx::INT), None]);
}

#[test]
fn self_restriction_substitutes_receiver() {
    let (mut f, errors) = setup(|b| {
        let body = b.nil();
        let other = b.param_restricted("other", tern_ir::TypeExpr::SelfType);
        b.method("Int", "same", vec![other], body);
    });
    assert!(errors.is_empty());
    let entry = f.overloads.get(DefId::from_raw(0)).clone();
    assert_eq!(entry.restriction(&mut f.pool, 0, Some(Idx::INT)), Some(Idx::INT));
    assert_eq!(entry.restriction(&mut f.pool, 1, Some(Idx::INT)), None);
}

#[test]
fn duplicate_definitions_are_rejected() {
    let (f, errors) = setup(|b| {
        let one = b.int(1);
        let x = b.param_restricted("x", b.named_type("Int"));
        b.def("foo", vec![x], one);
        let two = b.int(2);
        let y = b.param_restricted("y", b.named_type("Int"));
        b.def("foo", vec![y], two);
        let three = b.int(3);
        let z = b.param_restricted("z", b.named_type("Float"));
        b.def("foo", vec![z], three);
    });
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0].kind,
        TypeErrorKind::DuplicateDefinition { signature, .. } if signature == "foo(y : Int)"
    ));
    assert_eq!(f.overloads.len(), 2);
}

#[test]
fn same_name_on_different_owners_is_not_a_duplicate() {
    let (f, errors) = setup(|b| {
        b.class("Foo", None);
        let one = b.int(1);
        b.method("Foo", "foo", vec![], one);
        let two = b.int(2);
        b.class_method("Foo", "foo", vec![], two);
        let three = b.int(3);
        b.def("foo", vec![], three);
    });
    assert!(errors.is_empty());
    assert_eq!(f.overloads.len(), 3);
}

#[test]
fn unknown_owner_or_restriction_is_reported() {
    let (f, errors) = setup(|b| {
        let one = b.int(1);
        b.method("Nope", "foo", vec![], one);
        let two = b.int(2);
        let x = b.param_restricted("x", b.named_type("Missing"));
        b.def("bar", vec![x], two);
    });
    assert_eq!(errors.len(), 2);
    assert!(errors
        .iter()
        .all(|e| matches!(e.kind, TypeErrorKind::UnknownType { .. })));
    assert!(f.overloads.is_empty());
}

#[test]
fn signatures_render_owner_and_defaults() {
    let (mut f, errors) = setup(|b| {
        b.class("Foo", None);
        let body = b.nil();
        let one = b.int(1);
        let x = b.param_restricted("x", b.named_type("Int"));
        let y = b.param_default("y", one);
        b.method("Foo", "bar", vec![x, y], body);
    });
    assert!(errors.is_empty());
    let foo = f.class_type("Foo");
    let name = f.name("bar");
    assert_eq!(
        f.overloads
            .signatures(&f.pool, &f.classes, name, Some(foo), &f.interner),
        vec!["Foo#bar(x : Int, y = ...)".to_string()]
    );
}

#[test]
fn required_parameter_after_default_is_rejected() {
    // def foo(x = 1, y); end
    let (f, errors) = setup(|b| {
        let body = b.nil();
        let one = b.int(1);
        let x = b.param_default("x", one);
        let y = b.param("y");
        b.def("foo", vec![x, y], body);
    });
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0].kind,
        TypeErrorKind::RequiredAfterDefault { method, param } if method == "foo" && param == "y"
    ));
    assert_eq!(errors[0].code(), tern_diagnostic::ErrorCode::E2007);
    assert!(f.overloads.is_empty());
}

#[test]
fn class_objects_see_object_instance_methods() {
    let (mut f, errors) = setup(|b| {
        b.class("Foo", None);
        let one = b.int(1);
        b.class_method("Foo", "make", vec![], one);
        let no = b.bool(false);
        b.method("Object", "nil?", vec![], no);
    });
    assert!(errors.is_empty());
    let foo = f.classes.lookup(f.name("Foo")).unwrap_or_else(|| panic!("no Foo"));
    let meta = f.pool.metaclass(foo);
    let nil_p = f.name("nil?");
    let make = f.name("make");
    assert_eq!(
        f.overloads.candidates_for(&f.pool, &f.classes, nil_p, Some(meta)),
        vec![DefId::from_raw(1)]
    );
    assert_eq!(
        f.overloads.candidates_for(&f.pool, &f.classes, make, Some(meta)),
        vec![DefId::from_raw(0)]
    );
}
