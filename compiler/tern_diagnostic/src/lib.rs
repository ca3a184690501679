//! Diagnostic system for error reporting.
//!
//! Every diagnostic carries:
//! - an error code for searchability
//! - a message (what went wrong)
//! - a primary span (where it went wrong)
//! - optional notes (context, declared alternatives)

mod diagnostic;
mod error_code;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
