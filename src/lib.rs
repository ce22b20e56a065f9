//! # rallocator - An explicit-free-list memory allocator
//!
//! This crate grows a heap over an `sbrk`-like region and serves allocations out of
//! it with an **explicit free list**: free blocks are threaded together through a
//! doubly-linked list living inside their own bodies, so `allocate` never has to scan
//! allocated blocks to find space to reuse.
//!
//! ## Overview
//!
//! ```text
//!   Implicit heap list (every block, walked by address):
//!
//!   ┌──────────┬───────────┬──────────┬───────────┬──────────┬───────────┐
//!   │  header  │ body (16) │  header  │ body (32) │  header  │ body (16) │
//!   │ ALLOC    │           │ FREE     │           │ ALLOC    │           │
//!   └──────────┴───────────┴──────────┴───────────┴──────────┴───────────┘
//!              ▲
//!              └── low_address                                    heap_end ──▲
//!
//!   Explicit free list (only the free blocks, via an overlay on their bodies):
//!
//!   head ──▶ [ FREE, body 32 ] ──▶ None
//! ```
//!
//! `allocate` walks the free list with a first-fit search, carving off a new,
//! smaller free block (`split`) when a match leaves a big enough surplus.
//! `release` tags a block free, pushes it onto the free list, and merges it with
//! whichever physical neighbors are themselves free (`coalesce`), so adjacent free
//! space never fragments into unusable slivers.
//!
//! ## Crate structure
//!
//! ```text
//!   rallocator
//!   ├── align      - alignment macro
//!   ├── error      - AllocError, the in-band failure taxonomy
//!   ├── region     - HeapRegion trait; SbrkRegion and (test-util) MemoryRegion
//!   ├── block      - block header layout; BlockPtr, the pointer-arithmetic boundary
//!   ├── freelist   - the explicit free list
//!   ├── split      - carving a remainder off an over-large free block
//!   ├── coalesce   - merging a freed block with its free neighbors
//!   ├── alloc      - Heap<R>, the allocate()/release() facade
//!   ├── check      - consistency checking and diagnostic dumps
//!   └── global     - an optional #[global_allocator] adapter (feature "global-allocator")
//! ```
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use rallocator::{Heap, SbrkRegion};
//!
//! let mut heap = Heap::new(SbrkRegion::new());
//! let ptr = heap.allocate(64).expect("size 0 is the only way to get None");
//! unsafe { ptr.as_ptr().write(0xAB) };
//! heap.release(ptr);
//! ```
//!
//! ## Safety
//!
//! Like its ancestor, this crate deals in raw memory. [`Heap::allocate`] and
//! [`Heap::release`] are themselves safe to call — the unsafety is concentrated in
//! what a caller does with the returned `NonNull<u8>` (writing past its size, using
//! it after `release`, and so on), exactly as with any other allocator.
//!
//! ## Limitations
//!
//! - **Single-threaded only**: no synchronization; see `SPEC_FULL.md`'s Non-goals.
//! - **First-fit, not best-fit**: favors O(1)-ish search over minimal fragmentation.
//! - **Never shrinks**: a freed block at the very top of the heap is kept on the
//!   free list rather than returned to the region provider.

pub mod align;
mod alloc;
mod block;
mod check;
mod coalesce;
mod error;
mod freelist;
mod region;
mod split;

#[cfg(feature = "global-allocator")]
mod global;

pub use alloc::Heap;
pub use block::{BlockState, FREE_INFO_SIZE, INFO_SIZE, SPLIT_THRESHOLD};
pub use error::AllocError;
pub use region::{HeapRegion, SbrkRegion};

#[cfg(feature = "test-util")]
pub use region::MemoryRegion;

#[cfg(feature = "global-allocator")]
pub use global::GlobalHeap;
