//! Error taxonomy for the allocator's in-band, non-panicking failure modes.
//!
//! Out-of-memory is deliberately absent from this enum: the source treats it as
//! fatal (`exit(0)` after a failed `sbrk`), and this rewrite surfaces the same
//! "caller cannot recover" contract through [`std::alloc::handle_alloc_error`]
//! instead of a `Result` variant nobody is meant to handle.

use thiserror::Error;

/// Failure modes `Heap::allocate` and `Heap::release` can report without aborting.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AllocError {
  /// `allocate` was called with a size of zero.
  #[error("allocate() called with size 0")]
  InvalidSize,

  /// `release` was called on a block whose header is already tagged free.
  #[error("release() called on a block that is already free")]
  DoubleFree,

  /// `Heap::check` found a violated invariant.
  #[error("heap consistency check failed: {detail}")]
  HeapCorruption {
    /// Human-readable description of the violated invariant, including the
    /// offending address where one is available.
    detail: String,
  },
}
