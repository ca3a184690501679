//! Evaluator limits.

/// Limits applied while running a program.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EvalConfig {
    /// Nested calls allowed before evaluation fails with
    /// [`StackOverflow`](crate::EvalErrorKind::StackOverflow).
    pub max_call_depth: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            max_call_depth: 10_000,
        }
    }
}

impl EvalConfig {
    #[must_use]
    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }
}
