//! Stack growth for deep recursion.
//!
//! Type inference recurses once per nested expression and once per call
//! chain link (an instantiation visiting its callees before it finishes), and
//! the evaluator recurses once per runtime call. Both wrap their recursive
//! entry points in [`ensure_sufficient_stack`] so long call chains in user
//! programs do not overflow the native stack.

/// Grow the stack when less than this remains (128KB).
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment (2MB).
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, first switching to a fresh stack segment if the current one is
/// nearly exhausted.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// WASM manages its own stack; call through.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::ensure_sufficient_stack;

    fn depth(n: u64) -> u64 {
        ensure_sufficient_stack(|| if n == 0 { 0 } else { 1 + depth(n - 1) })
    }

    #[test]
    fn deep_recursion_completes() {
        assert_eq!(depth(100_000), 100_000);
    }
}
