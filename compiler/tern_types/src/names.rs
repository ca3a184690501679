//! Pre-interned method and class names the engine treats specially.

use tern_ir::{Name, StringInterner};

#[derive(Copy, Clone, Debug)]
pub struct WellKnownNames {
    pub new: Name,
    pub allocate: Name,
    pub initialize: Name,
    pub object: Name,
    pub nil: Name,
    pub bool: Name,
    pub int: Name,
    pub float: Name,
}

impl WellKnownNames {
    pub fn new(interner: &StringInterner) -> Self {
        WellKnownNames {
            new: interner.intern("new"),
            allocate: interner.intern("allocate"),
            initialize: interner.intern("initialize"),
            object: interner.intern("Object"),
            nil: interner.intern("Nil"),
            bool: interner.intern("Bool"),
            int: interner.intern("Int"),
            float: interner.intern("Float"),
        }
    }
}
