//! Human-readable rendering of types.

use std::fmt::Write;

use super::{ClassId, Idx, Pool, TypeData};

impl Pool {
    /// Render a type using `class_name` for class names.
    ///
    /// `Nil`-including unions of one other member render as `T?`, virtual
    /// types as `T+` and class objects as `T.class`.
    pub fn format_type<'n>(&self, idx: Idx, class_name: &dyn Fn(ClassId) -> &'n str) -> String {
        let mut out = String::new();
        self.write_type(&mut out, idx, class_name);
        out
    }

    fn write_type<'n>(&self, out: &mut String, idx: Idx, class_name: &dyn Fn(ClassId) -> &'n str) {
        match self.data(idx) {
            TypeData::Never => out.push_str("NoReturn"),
            TypeData::Concrete(class) => out.push_str(class_name(*class)),
            TypeData::Virtual(class) => {
                let _ = write!(out, "{}+", class_name(*class));
            }
            TypeData::Metaclass(class) => {
                let _ = write!(out, "{}.class", class_name(*class));
            }
            TypeData::SelfRef => out.push_str("self"),
            TypeData::Union(members) => {
                if members.len() == 2 && members.contains(&Idx::NIL) {
                    let other = if members[0] == Idx::NIL {
                        members[1]
                    } else {
                        members[0]
                    };
                    if !self.is_union(other) {
                        self.write_type(out, other, class_name);
                        out.push('?');
                        return;
                    }
                }
                for (i, &member) in members.iter().enumerate() {
                    if i > 0 {
                        out.push_str(" | ");
                    }
                    self.write_type(out, member, class_name);
                }
            }
        }
    }
}
