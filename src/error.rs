//! Allocator-internal error type.
//!
//! `AllocatorError` is never returned from the public `allocate`/`free`/
//! `reallocate` surface directly — those keep the null/`-1`-on-failure
//! contract the specification describes. It's used internally by
//! `extend_heap`/`init` so failure paths are `?`-propagated instead of
//! threaded through sentinel return values, and by [`crate::allocator::Allocator::check`]
//! to report invariant violations found during a heap walk.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AllocatorError {
  /// The memory provider could not satisfy a growth request (`sbrk`
  /// failure, or the fixed maximum heap size was reached).
  #[error("heap exhausted: provider could not grow by {requested} bytes")]
  HeapExhausted { requested: usize },

  /// `check()` found a violated invariant while walking the heap or a
  /// free list. These represent allocator bugs, not user errors.
  #[error("invariant violation: {0}")]
  InvariantViolation(String),
}
