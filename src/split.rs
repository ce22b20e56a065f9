//! Splitting a free block to avoid handing out more than was asked for.

use crate::block::{BlockPtr, BlockState, INFO_SIZE, SPLIT_THRESHOLD};
use crate::freelist::FreeList;

/// Carves a new free block out of the high end of `block` if the surplus over
/// `req_size` meets [`SPLIT_THRESHOLD`].
///
/// On return, `block`'s own body size is exactly `req_size`; the caller is still
/// responsible for removing `block` from `free_list` and flipping it to allocated —
/// this function only ever pushes the *new* remainder block, never touches `block`'s
/// free-list linkage.
///
/// Returns the remainder block if a split happened, or `None` if the surplus was too
/// small and the whole block should be handed out as-is.
pub fn split(
  free_list: &mut FreeList,
  tail: &mut Option<BlockPtr>,
  block: BlockPtr,
  req_size: usize,
) -> Option<BlockPtr> {
  let surplus = block.size() - req_size;
  if surplus < SPLIT_THRESHOLD {
    return None;
  }

  // `block`'s trailing edge doesn't move: shrinking its body and growing a new
  // block out of the freed space lands the remainder's end exactly where the old
  // body ended. So the block that used to follow `block` (if any) is the one whose
  // header already sits at that unchanged trailing edge — `was_tail` tells us
  // whether such a block exists at all.
  let was_tail = *tail == Some(block);
  let old_trailing_edge = block.body_end();

  let new_size = surplus - INFO_SIZE;
  block.set_size(req_size);

  let remainder = unsafe {
    let addr = block.body_end();
    BlockPtr::new(std::ptr::NonNull::new_unchecked(addr as *mut crate::block::Block))
  };
  remainder.set_prev_block(Some(block));
  remainder.set_state(BlockState::Free);
  remainder.set_size(new_size);

  if was_tail {
    *tail = Some(remainder);
  } else {
    let old_next = unsafe {
      BlockPtr::new(std::ptr::NonNull::new_unchecked(old_trailing_edge as *mut crate::block::Block))
    };
    old_next.set_prev_block(Some(remainder));
  }

  free_list.push(remainder);
  Some(remainder)
}
