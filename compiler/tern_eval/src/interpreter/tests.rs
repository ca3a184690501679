use pretty_assertions::assert_eq;
use tern_diagnostic::ErrorCode;
use tern_ir::{ExprId, ModuleBuilder};

use crate::test_helpers::{eval, eval_with};
use crate::{EvalConfig, EvalErrorKind, Value};

#[test]
fn def_without_args() {
    // def foo; 1; end; 2; foo
    let value = eval(|b| {
        let one = b.int(1);
        b.def("foo", vec![], one);
        let two = b.int(2);
        let call = b.call_self("foo", &[]);
        b.stmt(two).stmt(call);
    });
    assert_eq!(value.unwrap(), Value::Int(1));
}

#[test]
fn def_with_arg() {
    // def foo(x); x; end; foo 1
    let value = eval(|b| {
        let x = b.var("x");
        let param = b.param("x");
        b.def("foo", vec![param], x);
        let one = b.int(1);
        let call = b.call_self("foo", &[one]);
        b.stmt(call);
    });
    assert_eq!(value.unwrap(), Value::Int(1));
}

#[test]
fn reassigned_parameter() {
    // def foo(x); x = 1; x; end; foo(2)
    let value = eval(|b| {
        let one = b.int(1);
        let assign = b.assign("x", one);
        let x = b.var("x");
        let body = b.block(&[assign, x]);
        let param = b.param("x");
        b.def("foo", vec![param], body);
        let two = b.int(2);
        let call = b.call_self("foo", &[two]);
        b.stmt(call);
    });
    assert_eq!(value.unwrap(), Value::Int(1));
}

#[test]
fn reopened_int() {
    // class Int; def foo; self + 1; end; end; 3.foo
    let value = eval(|b| {
        b.class("Int", None);
        let this = b.self_ref();
        let one = b.int(1);
        let body = b.call(this, "+", &[one]);
        b.method("Int", "foo", vec![], body);
        let three = b.int(3);
        let call = b.call(three, "foo", &[]);
        b.stmt(call);
    });
    assert_eq!(value.unwrap(), Value::Int(4));
}

#[test]
fn many_default_arguments() {
    // def foo(x = 1, y = 2, z = 3); x + y + z; end
    // foo + foo(9) + foo(3, 4) + foo(6, 3, 1)
    let value = eval(|b| {
        let x = b.var("x");
        let y = b.var("y");
        let z = b.var("z");
        let xy = b.call(x, "+", &[y]);
        let body = b.call(xy, "+", &[z]);
        let (one, two, three) = (b.int(1), b.int(2), b.int(3));
        let params = vec![
            b.param_default("x", one),
            b.param_default("y", two),
            b.param_default("z", three),
        ];
        b.def("foo", params, body);

        let arg_lists: [&[i64]; 4] = [&[], &[9], &[3, 4], &[6, 3, 1]];
        let mut calls = Vec::new();
        for args in arg_lists {
            let args: Vec<_> = args.iter().map(|&n| b.int(n)).collect();
            calls.push(b.call_self("foo", &args));
        }
        let sum = calls
            .into_iter()
            .reduce(|acc, call| b.call(acc, "+", &[call]))
            .unwrap();
        b.stmt(sum);
    });
    assert_eq!(value.unwrap(), Value::Int(40));
}

#[test]
fn default_calls_method_on_self() {
    // class Foo; def foo(x = self.bar); x + 1; end; def bar; 1; end; end
    // f = Foo.new; f.foo(2) + f.foo
    let value = eval(|b| {
        b.class("Foo", None);
        let this = b.self_ref();
        let default = b.call(this, "bar", &[]);
        let x = b.var("x");
        let one = b.int(1);
        let body = b.call(x, "+", &[one]);
        let param = b.param_default("x", default);
        b.method("Foo", "foo", vec![param], body);
        let one = b.int(1);
        b.method("Foo", "bar", vec![], one);

        let class = b.constant("Foo");
        let new = b.call(class, "new", &[]);
        let assign = b.assign("f", new);
        let f = b.var("f");
        let two = b.int(2);
        let explicit = b.call(f, "foo", &[two]);
        let f = b.var("f");
        let implicit = b.call(f, "foo", &[]);
        let sum = b.call(explicit, "+", &[implicit]);
        b.stmt(assign).stmt(sum);
    });
    assert_eq!(value.unwrap(), Value::Int(5));
}

#[test]
fn class_method_with_union_local() {
    // def Object.foo(x); 1; end; a = 1; a = 1.5; Object.foo(a)
    let value = eval(|b| {
        let one = b.int(1);
        let param = b.param("x");
        b.class_method("Object", "foo", vec![param], one);
        let one = b.int(1);
        let first = b.assign("a", one);
        let half = b.float(1.5);
        let second = b.assign("a", half);
        let object = b.constant("Object");
        let a = b.var("a");
        let call = b.call(object, "foo", &[a]);
        b.stmt(first).stmt(second).stmt(call);
    });
    assert_eq!(value.unwrap(), Value::Int(1));
}

#[test]
fn early_return_then_nil_check() {
    // def foo; if false; return 0; end; end; if foo.nil?; 1; else; 0; end
    let value = eval(|b| {
        let no = b.bool(false);
        let zero = b.int(0);
        let ret = b.ret(Some(zero));
        let body = b.if_(no, ret, None);
        b.def("foo", vec![], body);
        let call = b.call_self("foo", &[]);
        let check = b.call(call, "nil?", &[]);
        let (one, zero) = (b.int(1), b.int(0));
        let stmt = b.if_(check, one, Some(zero));
        b.stmt(stmt);
    });
    assert_eq!(value.unwrap(), Value::Int(1));
}

#[test]
fn subclass_override_selected_per_member() {
    // class Foo; def foo(other); 1; end; end
    // class Bar < Foo; def foo(other : Int); 2; end; end
    // bar1 = Bar.new; bar1.foo(1 || 1.5)
    let value = eval(|b| {
        b.class("Foo", None);
        b.class("Bar", Some("Foo"));
        let one = b.int(1);
        let param = b.param("other");
        b.method("Foo", "foo", vec![param], one);
        let two = b.int(2);
        let int = b.named_type("Int");
        let param = b.param_restricted("other", int);
        b.method("Bar", "foo", vec![param], two);

        let class = b.constant("Bar");
        let new = b.call(class, "new", &[]);
        let assign = b.assign("bar1", new);
        let recv = b.var("bar1");
        let one = b.int(1);
        let half = b.float(1.5);
        let arg = b.or(one, half);
        let call = b.call(recv, "foo", &[arg]);
        b.stmt(assign).stmt(call);
    });
    assert_eq!(value.unwrap(), Value::Int(2));
}

#[test]
fn parameter_changes_type_in_loop() {
    // def foo(x); while x >= 0; x = -0.5; end; x; end; foo(2).to_i
    let value = eval(|b| {
        let x = b.var("x");
        let zero = b.int(0);
        let cond = b.call(x, ">=", &[zero]);
        let half = b.float(-0.5);
        let assign = b.assign("x", half);
        let lp = b.while_(cond, assign);
        let x = b.var("x");
        let body = b.block(&[lp, x]);
        let param = b.param("x");
        b.def("foo", vec![param], body);
        let two = b.int(2);
        let call = b.call_self("foo", &[two]);
        let conv = b.call(call, "to_i", &[]);
        b.stmt(conv);
    });
    assert_eq!(value.unwrap(), Value::Int(0));
}

fn linked_class(b: &mut ModuleBuilder<'_>, class: &str) {
    b.class(class, None);
    let n = b.var("n");
    let body = b.ivar_assign("next", n);
    let param = b.param("n");
    b.method(class, "next=", vec![param], body);
    let body = b.ivar("next");
    b.method(class, "next", vec![], body);
}

fn allocate_into(b: &mut ModuleBuilder<'_>, var: &str) -> ExprId {
    let class = b.constant("A");
    let call = b.call(class, "allocate", &[]);
    b.assign(var, call)
}

#[test]
fn instance_variables_hold_objects() {
    // a = A.allocate; b = A.allocate; a.next = b; a.next == b
    let value = eval(|b| {
        linked_class(b, "A");
        let first = allocate_into(b, "a");
        let second = allocate_into(b, "b");
        let a = b.var("a");
        let other = b.var("b");
        let set = b.call(a, "next=", &[other]);
        let a = b.var("a");
        let next = b.call(a, "next", &[]);
        let other = b.var("b");
        let same = b.call(next, "==", &[other]);
        b.stmt(first).stmt(second).stmt(set).stmt(same);
    });
    assert_eq!(value.unwrap(), Value::Bool(true));
}

#[test]
fn initialize_runs_on_new() {
    // class Point; def initialize(x); @x = x; end; def x; @x; end; end
    // Point.new(7).x
    let value = eval(|b| {
        b.class("Point", None);
        let x = b.var("x");
        let body = b.ivar_assign("x", x);
        let param = b.param("x");
        b.method("Point", "initialize", vec![param], body);
        let body = b.ivar("x");
        b.method("Point", "x", vec![], body);
        let class = b.constant("Point");
        let seven = b.int(7);
        let new = b.call(class, "new", &[seven]);
        let read = b.call(new, "x", &[]);
        b.stmt(read);
    });
    assert_eq!(value.unwrap(), Value::Int(7));
}

#[test]
fn short_circuit_skips_recursion() {
    // def foo; sub = foo; sub || 1; end; false && foo
    let value = eval(|b| {
        let rec = b.call_self("foo", &[]);
        let sub = b.assign("sub", rec);
        let s = b.var("sub");
        let one = b.int(1);
        let tail = b.or(s, one);
        let body = b.block(&[sub, tail]);
        b.def("foo", vec![], body);
        let no = b.bool(false);
        let call = b.call_self("foo", &[]);
        let stmt = b.and(no, call);
        b.stmt(stmt);
    });
    assert_eq!(value.unwrap(), Value::Bool(false));
}

#[test]
fn top_level_return_ends_program() {
    // return 3; 4
    let value = eval(|b| {
        let three = b.int(3);
        let ret = b.ret(Some(three));
        let four = b.int(4);
        b.stmt(ret).stmt(four);
    });
    assert_eq!(value.unwrap(), Value::Int(3));
}

#[test]
fn deep_recursion_grows_the_stack() {
    // def down(n); if n > 0; down(n - 1); else; 0; end; end; down(5000)
    let value = eval(|b| {
        let n = b.var("n");
        let zero = b.int(0);
        let cond = b.call(n, ">", &[zero]);
        let n = b.var("n");
        let one = b.int(1);
        let pred = b.call(n, "-", &[one]);
        let rec = b.call_self("down", &[pred]);
        let zero = b.int(0);
        let body = b.if_(cond, rec, Some(zero));
        let param = b.param("n");
        b.def("down", vec![param], body);
        let start = b.int(5000);
        let call = b.call_self("down", &[start]);
        b.stmt(call);
    });
    assert_eq!(value.unwrap(), Value::Int(0));
}

#[test]
fn unbounded_recursion_hits_depth_limit() {
    // def foo; foo; end; foo
    let err = eval_with(EvalConfig::default().with_max_call_depth(64), |b| {
        let rec = b.call_self("foo", &[]);
        b.def("foo", vec![], rec);
        let call = b.call_self("foo", &[]);
        b.stmt(call);
    })
    .unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::StackOverflow { depth: 64 });
    assert_eq!(err.to_diagnostic().code, ErrorCode::E6002);
}

#[test]
fn integer_overflow_surfaces_as_error() {
    let err = eval(|b| {
        let max = b.int(i64::MAX);
        let one = b.int(1);
        let sum = b.call(max, "+", &[one]);
        b.stmt(sum);
    })
    .unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::IntegerOverflow { op: "+" });
}

#[test]
fn local_skipped_by_branch_reads_nil() {
    // if false; x = 1; end; x
    let value = eval(|b| {
        let no = b.bool(false);
        let one = b.int(1);
        let assign = b.assign("x", one);
        let stmt = b.if_(no, assign, None);
        let x = b.var("x");
        b.stmt(stmt).stmt(x);
    });
    assert_eq!(value.unwrap(), Value::Nil);
}

#[test]
fn local_skipped_by_loop_reads_nil() {
    // while false; y = 1.5; end; y.nil?
    let value = eval(|b| {
        let no = b.bool(false);
        let half = b.float(1.5);
        let body = b.assign("y", half);
        let lp = b.while_(no, body);
        let y = b.var("y");
        let check = b.call(y, "nil?", &[]);
        b.stmt(lp).stmt(check);
    });
    assert_eq!(value.unwrap(), Value::Bool(true));
}

#[test]
fn top_level_implicit_call_runs_object_method() {
    // class Object; def hello; 1; end; end; hello
    let value = eval(|b| {
        b.class("Object", None);
        let one = b.int(1);
        b.method("Object", "hello", vec![], one);
        let call = b.call_self("hello", &[]);
        b.stmt(call);
    });
    assert_eq!(value.unwrap(), Value::Int(1));
}

#[test]
fn class_object_answers_nil_query() {
    // class Foo; end; Foo.nil?
    let value = eval(|b| {
        b.class("Foo", None);
        let class = b.constant("Foo");
        let call = b.call(class, "nil?", &[]);
        b.stmt(call);
    });
    assert_eq!(value.unwrap(), Value::Bool(false));
}
