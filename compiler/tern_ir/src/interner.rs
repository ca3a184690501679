//! String interner for identifiers.
//!
//! Interned strings are leaked for the lifetime of the process so lookups can
//! hand out `&'static str` without holding the lock.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::Name;

struct InternTable {
    map: FxHashMap<&'static str, u32>,
    strings: Vec<&'static str>,
}

/// Thread-safe string interner.
///
/// One interner is shared by the builder/parser, the type engine and the
/// evaluator of a compilation session.
pub struct StringInterner {
    table: RwLock<InternTable>,
}

impl StringInterner {
    /// Create a new interner with the empty string pre-interned as [`Name::EMPTY`].
    pub fn new() -> Self {
        let empty: &'static str = "";
        let mut map = FxHashMap::default();
        map.insert(empty, 0);
        StringInterner {
            table: RwLock::new(InternTable {
                map,
                strings: vec![empty],
            }),
        }
    }

    /// Intern a string, returning its `Name`.
    pub fn intern(&self, s: &str) -> Name {
        if let Some(&raw) = self.table.read().map.get(s) {
            return Name::from_raw(raw);
        }

        let mut table = self.table.write();
        // Another writer may have won the race between the two locks.
        if let Some(&raw) = table.map.get(s) {
            return Name::from_raw(raw);
        }

        let raw = u32::try_from(table.strings.len())
            .unwrap_or_else(|_| panic!("string interner exceeded u32::MAX entries"));
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        table.strings.push(leaked);
        table.map.insert(leaked, raw);
        Name::from_raw(raw)
    }

    /// Look up the string for a `Name`.
    ///
    /// Names not produced by this interner resolve to the empty string.
    pub fn lookup(&self, name: Name) -> &'static str {
        self.table
            .read()
            .strings
            .get(name.raw() as usize)
            .copied()
            .unwrap_or("")
    }

    /// Number of interned strings (including the empty string).
    pub fn len(&self) -> usize {
        self.table.read().strings.len()
    }

    /// Always false: the empty string is pre-interned.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}
