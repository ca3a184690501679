//! Runtime values.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use tern_ir::Name;
use tern_types::{ClassId, Idx, Pool};

/// A runtime value.
///
/// Objects are shared by reference; everything else is copied.
#[derive(Clone, Debug)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Object(Rc<Object>),
    /// A class used as a value (`Foo` in `Foo.new`).
    Class(ClassId),
}

/// An instance of a user class, with its instance variables.
pub struct Object {
    pub class: ClassId,
    ivars: RefCell<FxHashMap<Name, Value>>,
}

impl Object {
    /// Unassigned instance variables read as `nil`.
    pub fn ivar(&self, name: Name) -> Value {
        self.ivars.borrow().get(&name).cloned().unwrap_or(Value::Nil)
    }

    pub fn set_ivar(&self, name: Name, value: Value) {
        self.ivars.borrow_mut().insert(name, value);
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("class", &self.class)
            .field("ivars", &self.ivars.borrow().len())
            .finish()
    }
}

impl Value {
    /// A fresh instance with no instance variables set.
    pub fn object(class: ClassId) -> Self {
        Value::Object(Rc::new(Object {
            class,
            ivars: RefCell::new(FxHashMap::default()),
        }))
    }

    /// `nil` and `false` are falsy.
    #[inline]
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    /// The exact concrete type of this value, as used for dispatch.
    ///
    /// `None` for an object whose class never appeared in an inferred type.
    pub fn type_idx(&self, pool: &Pool) -> Option<Idx> {
        match self {
            Value::Nil => Some(Idx::NIL),
            Value::Bool(_) => Some(Idx::BOOL),
            Value::Int(_) => Some(Idx::INT),
            Value::Float(_) => Some(Idx::FLOAT),
            Value::Object(obj) => pool.lookup_concrete(obj.class),
            Value::Class(class) => pool.lookup_metaclass(*class),
        }
    }

    /// Identity: objects compare by reference, everything else by value.
    pub fn identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            _ => self == other,
        }
    }
}

impl PartialEq for Value {
    #[allow(clippy::float_cmp, reason = "structural equality of literals")]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}
