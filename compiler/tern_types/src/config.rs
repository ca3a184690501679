//! Inference limits.

/// Configuration for [`InferEngine`](crate::InferEngine).
///
/// Every limit bounds a loop that is guaranteed to terminate for
/// well-formed input; hitting one reports `InferenceDivergence` instead of
/// hanging on pathological programs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InferConfig {
    /// Re-evaluations of one instantiation within a single pass.
    pub max_widening_rounds: u32,
    /// Whole-program passes before giving up on a global fixed point.
    pub max_passes: u32,
    /// Iterations of a `while` body while its locals keep widening.
    pub max_loop_rounds: u32,
}

impl Default for InferConfig {
    fn default() -> Self {
        InferConfig {
            max_widening_rounds: 32,
            max_passes: 64,
            max_loop_rounds: 64,
        }
    }
}

impl InferConfig {
    #[must_use]
    pub fn with_max_widening_rounds(mut self, rounds: u32) -> Self {
        self.max_widening_rounds = rounds;
        self
    }

    #[must_use]
    pub fn with_max_passes(mut self, passes: u32) -> Self {
        self.max_passes = passes;
        self
    }
}
