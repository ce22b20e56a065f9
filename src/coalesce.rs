//! Merging a just-freed block with its physical neighbors.
//!
//! Called exactly once, from `Heap::release`, after the freed block has already been
//! tagged free and pushed onto the free list. Implements the four-case table from
//! `SPEC_FULL.md` §4.5.

use crate::block::{BlockPtr, INFO_SIZE};
use crate::freelist::FreeList;

/// Merges `block` with up to one adjacent free neighbor on each side.
///
/// `heap_end` is the current trailing edge of the whole heap region
/// (`low_address + heap_size`), needed to find `block`'s physical successor.
pub fn coalesce(
  free_list: &mut FreeList,
  tail: &mut Option<BlockPtr>,
  block: BlockPtr,
  heap_end: *const u8,
) {
  let prev = block.prev_block().filter(|p| p.is_free());
  let next = block.next_block(heap_end).filter(|n| n.is_free());

  match (prev, next) {
    (Some(p), Some(n)) => {
      let grown = p.size() + 2 * INFO_SIZE + block.size() + n.size();
      p.set_size(grown);
      match n.next_block(heap_end) {
        Some(after) => after.set_prev_block(Some(p)),
        None => *tail = Some(p),
      }
      free_list.remove(block);
      free_list.remove(n);
    }
    (Some(p), None) => {
      let grown = p.size() + INFO_SIZE + block.size();
      p.set_size(grown);
      match block.next_block(heap_end) {
        Some(next_of_block) => next_of_block.set_prev_block(Some(p)),
        None => *tail = Some(p),
      }
      free_list.remove(block);
    }
    (None, Some(n)) => {
      let grown = block.size() + INFO_SIZE + n.size();
      block.set_size(grown);
      match n.next_block(heap_end) {
        Some(after) => after.set_prev_block(Some(block)),
        None => *tail = Some(block),
      }
      free_list.remove(n);
    }
    (None, None) => {}
  }
}
