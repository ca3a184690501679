//! Error codes for compiler diagnostics.

use std::fmt;

/// Error codes, `E####`, first digit is the phase:
/// - E2xxx: type resolution and inference
/// - E6xxx: evaluation
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    /// Argument type violates a parameter restriction
    E2001,
    /// Unknown type
    E2002,
    /// No overload matches the call
    E2003,
    /// Inference did not reach a fixed point
    E2005,
    /// Duplicate definition
    E2006,
    /// Required parameter after a defaulted one
    E2007,
    /// Class reopened with a different superclass
    E2008,

    /// No dispatch entry for runtime argument types
    E6001,
    /// Call depth limit exceeded
    E6002,
    /// Reference to an undefined constant
    E6003,
    /// Integer arithmetic overflowed
    E6004,
}

impl ErrorCode {
    /// The code as written in diagnostics, e.g. `"E2003"`.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E2008 => "E2008",
            ErrorCode::E6001 => "E6001",
            ErrorCode::E6002 => "E6002",
            ErrorCode::E6003 => "E6003",
            ErrorCode::E6004 => "E6004",
        }
    }

    /// Whether this code belongs to the type-checking phase.
    pub fn is_type_error(self) -> bool {
        self.as_str().starts_with("E2")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
