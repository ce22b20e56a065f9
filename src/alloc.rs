//! The allocator facade: `Heap::allocate` and `Heap::release`, composing the block
//! layout, free list, search, split, and coalesce into the two public operations.

use std::ptr::NonNull;

use tracing::{debug, instrument, warn};

use crate::block::{Block, BlockPtr, BlockState, INFO_SIZE};
use crate::coalesce::coalesce;
use crate::freelist::FreeList;
use crate::region::HeapRegion;
use crate::split::split;

/// A single-threaded, explicit-free-list allocator over a [`HeapRegion`].
///
/// Unlike the source material, which kept `heap_size`/`free_list_head`/`tail` as
/// module-scope globals, this is an ordinary owned instance (see `SPEC_FULL.md`
/// §9 Design Notes), so a process can run more than one independent heap and tests
/// can point a `Heap` at a private `MemoryRegion` instead of the real process break.
pub struct Heap<R: HeapRegion> {
  region: R,
  heap_size: usize,
  free_list: FreeList,
  tail: Option<BlockPtr>,
}

impl<R: HeapRegion> Heap<R> {
  /// Creates an empty heap over `region`. Does not itself extend the region —
  /// equivalent to the source's `mm_init`.
  pub fn new(region: R) -> Self {
    Self { region, heap_size: 0, free_list: FreeList::new(), tail: None }
  }

  pub(crate) fn free_list(&self) -> &FreeList {
    &self.free_list
  }

  pub(crate) fn tail(&self) -> Option<BlockPtr> {
    self.tail
  }

  pub(crate) fn heap_end(&self) -> *const u8 {
    unsafe { self.region.low_address().add(self.heap_size) }
  }

  /// The block at `low_address`, or `None` on an empty heap.
  pub(crate) fn first_block(&self) -> Option<BlockPtr> {
    if self.heap_size == 0 {
      return None;
    }
    let ptr = self.region.low_address() as *mut Block;
    Some(unsafe { BlockPtr::new(NonNull::new_unchecked(ptr)) })
  }

  /// Total bytes currently claimed from the underlying region.
  pub fn heap_size(&self) -> usize {
    self.heap_size
  }

  /// Requests `n` more bytes from the region provider, recording the old heap top
  /// as the address of the freshly-appended space.
  ///
  /// Out-of-memory is fatal: a failed extension is surfaced through
  /// [`std::alloc::handle_alloc_error`], matching the source's `exit(0)` with the
  /// idiomatic Rust mechanism for "the caller cannot recover from this".
  fn request_more_space(&mut self, n: usize) -> NonNull<u8> {
    let ret = self.region.low_address();
    let ret = unsafe { ret.add(self.heap_size) };

    match self.region.extend(n) {
      Some(addr) => {
        debug_assert_eq!(addr.as_ptr() as *const u8, ret as *const u8);
        self.heap_size += n;
        unsafe { NonNull::new_unchecked(ret) }
      }
      None => {
        warn!(requested = n, "region provider failed to extend the heap");
        std::alloc::handle_alloc_error(
          std::alloc::Layout::from_size_align(n, crate::block::FREE_INFO_SIZE)
            .unwrap_or_else(|_| std::alloc::Layout::new::<u8>()),
        )
      }
    }
  }

  /// Allocates a block of at least `size` bytes, returning the body pointer.
  ///
  /// Returns `None` if `size` is zero. Aborts the process (never returns) if the
  /// heap cannot be grown to satisfy the request.
  #[instrument(level = "debug", skip(self), fields(heap_size = self.heap_size))]
  pub fn allocate(&mut self, size: usize) -> Option<NonNull<u8>> {
    if size == 0 {
      debug!("allocate() called with size 0, returning None");
      return None;
    }

    let req_size = crate::align!(size, crate::block::FREE_INFO_SIZE);

    let block = match self.free_list.search(req_size) {
      Some(found) => {
        if let Some(remainder) = split(&mut self.free_list, &mut self.tail, found, req_size) {
          debug!(remainder_size = remainder.size(), "split free block");
        }
        self.free_list.remove(found);
        found
      }
      None => {
        let addr = self.request_more_space(INFO_SIZE + req_size);
        let block = unsafe { BlockPtr::new(NonNull::new_unchecked(addr.as_ptr() as *mut Block)) };
        block.set_size(req_size);
        block.set_state(BlockState::Free);
        block.set_prev_block(self.tail);
        self.tail = Some(block);
        block
      }
    };

    block.set_state(BlockState::Allocated);

    #[cfg(debug_assertions)]
    self.debug_check_after_mutation();

    Some(block.body_ptr())
  }

  /// Releases a block previously returned by [`Heap::allocate`].
  ///
  /// Calling this on an already-free block is a `DoubleFree`: logged via
  /// `tracing::warn!`, with no effect on allocator state.
  #[instrument(level = "debug", skip(self, ptr))]
  pub fn release(&mut self, ptr: NonNull<u8>) {
    let block = unsafe { BlockPtr::from_body_ptr(ptr) };

    if block.is_free() {
      warn!(addr = ?block.as_ptr(), "release() called on an already-free block");
      return;
    }

    block.set_state(BlockState::Free);
    self.free_list.push(block);
    let heap_end = self.heap_end();
    coalesce(&mut self.free_list, &mut self.tail, block, heap_end);

    #[cfg(debug_assertions)]
    self.debug_check_after_mutation();
  }

  #[cfg(debug_assertions)]
  fn debug_check_after_mutation(&self) {
    if let Err(err) = self.check(true) {
      tracing::error!(%err, "heap consistency check failed after mutation");
    }
  }
}

#[cfg(all(test, feature = "test-util"))]
mod tests {
  use super::*;
  use crate::block::FREE_INFO_SIZE;
  use crate::region::MemoryRegion;

  fn heap() -> Heap<MemoryRegion> {
    Heap::new(MemoryRegion::with_capacity(4096))
  }

  #[test]
  fn invalid_size_returns_none() {
    let mut h = heap();
    assert!(h.allocate(0).is_none());
    assert_eq!(h.heap_size(), 0);
  }

  #[test]
  fn first_allocation_grows_the_heap() {
    let mut h = heap();
    let ptr = h.allocate(16).unwrap();
    assert_eq!(h.heap_size(), INFO_SIZE + FREE_INFO_SIZE);
    unsafe { ptr.as_ptr().write(0xAB) };
  }

  #[test]
  fn release_then_allocate_reuses_block_no_growth() {
    let mut h = heap();
    let a = h.allocate(16).unwrap();
    let size_after_first = h.heap_size();
    h.release(a);
    let b = h.allocate(16).unwrap();
    assert_eq!(a, b);
    assert_eq!(h.heap_size(), size_after_first);
  }

  #[test]
  fn sequential_allocations_then_release_all_merge_into_one_block() {
    let mut h = heap();
    let a = h.allocate(24).unwrap();
    let b = h.allocate(32).unwrap();
    let c = h.allocate(16).unwrap();

    h.release(c);
    h.release(b);
    h.release(a);

    assert_eq!(h.free_list().len(), 1);
    let only = h.free_list().head().unwrap();
    // Three bodies (32, 32, 16) plus the two headers absorbed by coalescing.
    assert_eq!(only.size(), 32 + 32 + 16 + 2 * INFO_SIZE);
    h.check(true).unwrap();
  }

  #[test]
  fn coalesce_with_previous() {
    let mut h = heap();
    let a = h.allocate(16).unwrap();
    let b = h.allocate(16).unwrap();
    let _c = h.allocate(16).unwrap();

    h.release(a);
    h.release(b);

    assert_eq!(h.free_list().len(), 1);
    assert_eq!(h.free_list().head().unwrap().size(), 16 + INFO_SIZE + 16);
    h.check(true).unwrap();
  }

  #[test]
  fn coalesce_with_next() {
    let mut h = heap();
    let a = h.allocate(16).unwrap();
    let b = h.allocate(16).unwrap();
    let _c = h.allocate(16).unwrap();

    h.release(b);
    h.release(a);

    assert_eq!(h.free_list().len(), 1);
    assert_eq!(h.free_list().head().unwrap().size(), 16 + INFO_SIZE + 16);
    h.check(true).unwrap();
  }

  #[test]
  fn three_way_coalesce_covers_whole_heap() {
    let mut h = heap();
    let a = h.allocate(16).unwrap();
    let b = h.allocate(16).unwrap();
    let c = h.allocate(16).unwrap();

    h.release(a);
    h.release(c);
    h.release(b);

    assert_eq!(h.free_list().len(), 1);
    assert_eq!(h.free_list().head().unwrap().size(), 16 * 3 + 2 * INFO_SIZE);
    h.check(true).unwrap();
  }

  #[test]
  fn split_produces_remainder() {
    let mut h = heap();
    let big = h.allocate(64).unwrap();
    h.release(big);

    let small = h.allocate(16).unwrap();
    assert_ne!(small, big);

    assert_eq!(h.free_list().len(), 1);
    let remainder = h.free_list().head().unwrap();
    assert_eq!(remainder.size(), 64 - 16 - INFO_SIZE);
    h.check(true).unwrap();
  }

  #[test]
  fn double_free_is_a_no_op() {
    let mut h = heap();
    let a = h.allocate(16).unwrap();
    h.release(a);
    let size_after_release = h.heap_size();
    let free_count_after_release = h.free_list().len();

    h.release(a);

    assert_eq!(h.heap_size(), size_after_release);
    assert_eq!(h.free_list().len(), free_count_after_release);
  }
}
