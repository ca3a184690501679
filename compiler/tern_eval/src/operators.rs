//! Primitive operations behind the prelude's numeric methods.
//!
//! Mixed `Int`/`Float` arithmetic promotes to `Float`. Integer arithmetic is
//! checked.

use tern_ir::Intrinsic;

use crate::errors::EvalErrorKind;
use crate::Value;

#[derive(Copy, Clone)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn of(value: &Value) -> Option<Num> {
        match value {
            Value::Int(n) => Some(Num::Int(*n)),
            Value::Float(f) => Some(Num::Float(*f)),
            _ => None,
        }
    }

    #[allow(clippy::cast_precision_loss, reason = "Int to Float promotion")]
    fn as_float(self) -> f64 {
        match self {
            Num::Int(n) => n as f64,
            Num::Float(f) => f,
        }
    }
}

/// Apply `op` to already evaluated operands.
pub(crate) fn apply(op: Intrinsic, args: &[Value]) -> Result<Value, EvalErrorKind> {
    match (op, args) {
        (Intrinsic::Identical, [a, b]) => Ok(Value::Bool(a.identical(b))),
        (Intrinsic::ToInt | Intrinsic::ToFloat, [value]) => match Num::of(value) {
            Some(num) => Ok(convert(op, num)),
            None => Err(invalid_operands(op, args)),
        },
        (_, [a, b]) => match (Num::of(a), Num::of(b)) {
            (Some(a), Some(b)) if op.is_arithmetic() => arithmetic(op, a, b),
            (Some(a), Some(b)) => Ok(Value::Bool(compare(op, a, b))),
            _ => Err(invalid_operands(op, args)),
        },
        _ => Err(invalid_operands(op, args)),
    }
}

#[allow(clippy::cast_possible_truncation, reason = "Float#to_i truncates")]
fn convert(op: Intrinsic, num: Num) -> Value {
    match (op, num) {
        (Intrinsic::ToInt, Num::Int(n)) => Value::Int(n),
        (Intrinsic::ToInt, Num::Float(f)) => Value::Int(f as i64),
        _ => Value::Float(num.as_float()),
    }
}

fn arithmetic(op: Intrinsic, a: Num, b: Num) -> Result<Value, EvalErrorKind> {
    if let (Num::Int(a), Num::Int(b)) = (a, b) {
        let result = match op {
            Intrinsic::Add => a.checked_add(b),
            Intrinsic::Sub => a.checked_sub(b),
            _ => a.checked_mul(b),
        };
        return result.map(Value::Int).ok_or(EvalErrorKind::IntegerOverflow {
            op: op.method_name(),
        });
    }
    let (a, b) = (a.as_float(), b.as_float());
    Ok(Value::Float(match op {
        Intrinsic::Add => a + b,
        Intrinsic::Sub => a - b,
        _ => a * b,
    }))
}

#[allow(clippy::float_cmp, reason = "numeric `==` compares exactly")]
fn compare(op: Intrinsic, a: Num, b: Num) -> bool {
    if let (Num::Int(a), Num::Int(b)) = (a, b) {
        return match op {
            Intrinsic::Lt => a < b,
            Intrinsic::Le => a <= b,
            Intrinsic::Gt => a > b,
            Intrinsic::Ge => a >= b,
            _ => a == b,
        };
    }
    let (a, b) = (a.as_float(), b.as_float());
    match op {
        Intrinsic::Lt => a < b,
        Intrinsic::Le => a <= b,
        Intrinsic::Gt => a > b,
        Intrinsic::Ge => a >= b,
        _ => a == b,
    }
}

fn invalid_operands(op: Intrinsic, args: &[Value]) -> EvalErrorKind {
    EvalErrorKind::NoDispatch {
        method: op.method_name().to_string(),
        types: args.iter().map(|v| kind_name(v).to_string()).collect(),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Nil => "Nil",
        Value::Bool(_) => "Bool",
        Value::Int(_) => "Int",
        Value::Float(_) => "Float",
        Value::Object(_) => "Object",
        Value::Class(_) => "Class",
    }
}
