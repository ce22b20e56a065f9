//! Consistency checking and diagnostic dumps.
//!
//! Ported from the source material's `check_heap`/`examine_heap`, but reported
//! through `tracing` events instead of writes to stderr, so the crate's embedder
//! decides whether (and where) to surface them — see `SPEC_FULL.md` §7/§8.

use tracing::{error, trace};

use crate::alloc::Heap;
use crate::error::AllocError;
use crate::region::HeapRegion;

impl<R: HeapRegion> Heap<R> {
  /// Walks the implicit heap list and the free list, verifying the invariants from
  /// `SPEC_FULL.md` §3. When `strict` is `true`, also verifies that no two
  /// physically-adjacent blocks are both free (the coalescing post-condition).
  pub fn check(&self, strict: bool) -> Result<(), AllocError> {
    let heap_end = self.heap_end();
    let mut free_count = 0usize;
    let mut last = None;
    let mut current = self.first_block();
    let mut prev_was_free = false;

    while let Some(block) = current {
      if block.prev_block() != last {
        let detail = format!(
          "block at {:p} has prev_block {:?}, expected {:?}",
          block.as_ptr(),
          block.prev_block().map(|b| b.as_ptr()),
          last.map(|b: crate::block::BlockPtr| b.as_ptr())
        );
        error!(%detail, "heap check: prev_block link broken");
        return Err(AllocError::HeapCorruption { detail });
      }

      if block.is_free() {
        free_count += 1;
        if strict && prev_was_free {
          let detail = format!("adjacent free blocks ending at block {:p}", block.as_ptr());
          error!(%detail, "heap check: adjacent free blocks");
          return Err(AllocError::HeapCorruption { detail });
        }
      }
      prev_was_free = block.is_free();

      last = Some(block);
      current = block.next_block(heap_end);
    }

    match (last, self.tail()) {
      (None, None) => {}
      (Some(last), Some(tail)) if last == tail => {}
      _ => {
        let detail = "tail pointer does not match the physically-last block".to_string();
        error!(%detail, "heap check: tail mismatch");
        return Err(AllocError::HeapCorruption { detail });
      }
    }

    let mut hops = 0usize;
    let mut current = self.free_list().head();
    while let Some(block) = current {
      hops += 1;
      if hops > free_count {
        let detail = "free list has more entries than free blocks counted on the heap, or contains a cycle".to_string();
        error!(%detail, "heap check: free-list cycle or overcount");
        return Err(AllocError::HeapCorruption { detail });
      }
      if !block.is_free() {
        let detail = format!("block {:p} is in the free list but tagged allocated", block.as_ptr());
        error!(%detail, "heap check: allocated block in free list");
        return Err(AllocError::HeapCorruption { detail });
      }
      current = block.next_free();
    }
    if hops != free_count {
      let detail = format!("free list has {hops} entries, expected {free_count}");
      error!(%detail, "heap check: free-list count mismatch");
      return Err(AllocError::HeapCorruption { detail });
    }

    Ok(())
  }

  /// Emits one `tracing::trace!` event per block (implicit list) and one per
  /// free-list entry — the rewrite's equivalent of the source's `examine_heap`.
  /// A no-op cost-wise when no subscriber is installed.
  pub fn dump(&self) {
    let heap_end = self.heap_end();
    let mut current = self.first_block();
    while let Some(block) = current {
      trace!(
        addr = ?block.as_ptr(),
        size = block.size(),
        free = block.is_free(),
        prev = ?block.prev_block().map(|b| b.as_ptr()),
        "heap block"
      );
      current = block.next_block(heap_end);
    }

    let mut current = self.free_list().head();
    while let Some(block) = current {
      trace!(addr = ?block.as_ptr(), "free list entry");
      current = block.next_free();
    }
  }
}
