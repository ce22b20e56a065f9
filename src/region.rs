//! The heap-growth primitive, abstracted behind a trait.
//!
//! The specification treats "an underlying segment-break primitive" as an external
//! collaborator, out of scope for the allocator's core design. This module draws the
//! boundary as a small trait so the core logic in [`crate::alloc`] never calls `sbrk`
//! (or anything else OS-specific) directly, and can be exercised against a
//! deterministic in-memory double instead of a real, process-wide program break.

use std::ptr::NonNull;

use libc::{c_void, intptr_t, sbrk};

/// A contiguous byte region that can only grow, never shrink.
///
/// Implementations are not required to be thread-safe; the allocator built on top of
/// this trait is itself single-threaded (see the crate's concurrency non-goals).
pub trait HeapRegion {
  /// Base address of the region. Must be stable for the lifetime of the region.
  fn low_address(&self) -> *mut u8;

  /// Number of bytes currently claimed from the region.
  fn current_size(&self) -> usize;

  /// Appends `n` bytes to the region, returning the address of the first new byte,
  /// or `None` if the region cannot grow by that much.
  fn extend(&mut self, n: usize) -> Option<NonNull<u8>>;
}

/// Production [`HeapRegion`] backed by the process break (`sbrk(2)`).
///
/// `sbrk` operates on process-wide state, so two `SbrkRegion`s in the same process
/// race each other exactly as two calls to C's `sbrk` would; callers are expected to
/// keep a single `Heap<SbrkRegion>` per process, matching the source's own design.
pub struct SbrkRegion {
  low_address: *mut u8,
}

impl SbrkRegion {
  /// Captures the current program break as the region's (fixed) low address.
  pub fn new() -> Self {
    let low_address = unsafe { sbrk(0) } as *mut u8;
    Self { low_address }
  }
}

impl Default for SbrkRegion {
  fn default() -> Self {
    Self::new()
  }
}

impl HeapRegion for SbrkRegion {
  fn low_address(&self) -> *mut u8 {
    self.low_address
  }

  fn current_size(&self) -> usize {
    let current_break = unsafe { sbrk(0) } as usize;
    current_break.saturating_sub(self.low_address as usize)
  }

  fn extend(&mut self, n: usize) -> Option<NonNull<u8>> {
    let ret = unsafe { sbrk(n as intptr_t) };
    if ret as usize == usize::MAX {
      return None;
    }
    NonNull::new(ret as *mut c_void as *mut u8)
  }
}

#[cfg(feature = "test-util")]
mod memory {
  use super::HeapRegion;
  use crate::block::FREE_INFO_SIZE;
  use std::alloc::{Layout, alloc_zeroed, dealloc, handle_alloc_error};
  use std::ptr::NonNull;

  /// A deterministic, heap-allocated [`HeapRegion`] double.
  ///
  /// Reserves `capacity` bytes up front and hands out prefixes of that buffer on
  /// `extend`, so tests get a private, fixed-address region instead of racing the
  /// process-wide program break across parallel test threads. Allocated with an
  /// explicit `FREE_INFO_SIZE` alignment so `low_address()` starts as aligned as a
  /// real `sbrk`-backed region does, matching the assumption §3's alignment
  /// invariant relies on.
  pub struct MemoryRegion {
    ptr: NonNull<u8>,
    capacity: usize,
    used: usize,
  }

  impl MemoryRegion {
    /// Reserves `capacity` bytes of backing storage. `extend` fails once that
    /// capacity is exhausted.
    pub fn with_capacity(capacity: usize) -> Self {
      let layout = Layout::from_size_align(capacity.max(FREE_INFO_SIZE), FREE_INFO_SIZE)
        .expect("capacity too large to form a valid Layout");
      let ptr = unsafe { alloc_zeroed(layout) };
      let ptr = NonNull::new(ptr).unwrap_or_else(|| handle_alloc_error(layout));
      Self { ptr, capacity: layout.size(), used: 0 }
    }

    fn layout(&self) -> Layout {
      Layout::from_size_align(self.capacity, FREE_INFO_SIZE).unwrap()
    }
  }

  impl HeapRegion for MemoryRegion {
    fn low_address(&self) -> *mut u8 {
      self.ptr.as_ptr()
    }

    fn current_size(&self) -> usize {
      self.used
    }

    fn extend(&mut self, n: usize) -> Option<NonNull<u8>> {
      if self.used + n > self.capacity {
        return None;
      }
      let ptr = unsafe { self.ptr.as_ptr().add(self.used) };
      self.used += n;
      NonNull::new(ptr)
    }
  }

  impl Drop for MemoryRegion {
    fn drop(&mut self) {
      unsafe { dealloc(self.ptr.as_ptr(), self.layout()) };
    }
  }
}

#[cfg(feature = "test-util")]
pub use memory::MemoryRegion;
