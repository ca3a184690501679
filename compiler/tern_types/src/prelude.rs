//! Prelude definitions.
//!
//! The prelude is ordinary Tern code: numeric operators, conversions and
//! `nil?`, written with the module builder and resolved, specialized and
//! evaluated exactly like user definitions. Only their bodies bottom out in
//! [`Intrinsic`]s. The prelude classes themselves are pre-registered by
//! [`ClassRegistry::new`](crate::ClassRegistry::new).

use tern_ir::{Intrinsic, ModuleBuilder, StringInterner};

const NUMERIC: [&str; 2] = ["Int", "Float"];

const OPERATORS: [Intrinsic; 8] = [
    Intrinsic::Add,
    Intrinsic::Sub,
    Intrinsic::Mul,
    Intrinsic::Lt,
    Intrinsic::Le,
    Intrinsic::Gt,
    Intrinsic::Ge,
    Intrinsic::NumEq,
];

/// A module builder with the prelude already installed.
pub fn builder(interner: &StringInterner) -> ModuleBuilder<'_> {
    let mut b = ModuleBuilder::new(interner);
    install(&mut b);
    b
}

/// Add the prelude definitions to `b`.
pub fn install(b: &mut ModuleBuilder<'_>) {
    // Int#+(other : Int), Int#+(other : Float), Float#+(other : Int), ...
    for receiver in NUMERIC {
        for operand in NUMERIC {
            for op in OPERATORS {
                let this = b.self_ref();
                let other = b.var("other");
                let body = b.intrinsic(op, &[this, other]);
                let param = b.param_restricted("other", b.named_type(operand));
                b.method(receiver, op.method_name(), vec![param], body);
            }
        }
    }

    let this = b.self_ref();
    b.method("Int", "to_i", vec![], this);
    let this = b.self_ref();
    let body = b.intrinsic(Intrinsic::ToFloat, &[this]);
    b.method("Int", "to_f", vec![], body);
    let this = b.self_ref();
    let body = b.intrinsic(Intrinsic::ToInt, &[this]);
    b.method("Float", "to_i", vec![], body);
    let this = b.self_ref();
    b.method("Float", "to_f", vec![], this);

    let no = b.bool(false);
    b.method("Object", "nil?", vec![], no);
    let yes = b.bool(true);
    b.method("Nil", "nil?", vec![], yes);

    let this = b.self_ref();
    let other = b.var("other");
    let body = b.intrinsic(Intrinsic::Identical, &[this, other]);
    let param = b.param("other");
    b.method("Object", "==", vec![param], body);
}
