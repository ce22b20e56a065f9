//! Randomized interleaved allocate/release sequences, checked for consistency
//! after every single mutation — not just at the end of the run.
//!
//! `Heap::check(true)` already runs after every mutation in debug builds (see
//! `Heap::debug_check_after_mutation`); this test additionally asserts on the
//! `Result` directly so a violated invariant fails the test with its own message
//! instead of only a `tracing::error!` line a CI log might scroll past.

use rallocator::{Heap, MemoryRegion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn init_tracing() {
  let _ = tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_test_writer()
    .try_init();
}

/// Drives `iterations` random allocate/release decisions against a private heap,
/// asserting the full consistency check after every single one, then releases
/// whatever is still outstanding and checks once more.
fn run_random_sequence(seed: u64, iterations: usize, max_request: usize, capacity: usize) {
  init_tracing();

  let mut rng = StdRng::seed_from_u64(seed);
  let mut h = Heap::new(MemoryRegion::with_capacity(capacity));
  let mut live = Vec::new();

  for step in 0..iterations {
    let do_allocate = live.is_empty() || rng.gen_bool(0.6);

    if do_allocate {
      let size = rng.gen_range(1..=max_request);
      if let Some(ptr) = h.allocate(size) {
        unsafe { ptr.as_ptr().write(0xAA) };
        live.push(ptr);
      }
    } else {
      let index = rng.gen_range(0..live.len());
      let ptr = live.swap_remove(index);
      h.release(ptr);
    }

    h.check(true).unwrap_or_else(|err| {
      panic!("heap invariant violated after step {step} (seed {seed}): {err}")
    });
  }

  for ptr in live {
    h.release(ptr);
  }
  h.check(true).unwrap();
}

#[test]
fn random_sequence_small_blocks_stays_consistent() {
  run_random_sequence(0xC0FFEE, 2_000, 64, 1 << 20);
}

#[test]
fn random_sequence_mixed_block_sizes_stays_consistent() {
  run_random_sequence(0xDEADBEEF, 2_000, 4096, 1 << 22);
}

#[test]
fn random_sequence_is_deterministic_given_the_same_seed() {
  // Same seed, same request/release decisions, twice over: the heap shape at the
  // end should be identical, not just individually consistent.
  let mut first = Heap::new(MemoryRegion::with_capacity(1 << 20));
  let mut second = Heap::new(MemoryRegion::with_capacity(1 << 20));

  for h in [&mut first, &mut second] {
    let mut rng = StdRng::seed_from_u64(42);
    let mut live = Vec::new();
    for _ in 0..500 {
      let do_allocate = live.is_empty() || rng.gen_bool(0.5);
      if do_allocate {
        let size = rng.gen_range(1..=256);
        if let Some(ptr) = h.allocate(size) {
          live.push(ptr);
        }
      } else {
        let index = rng.gen_range(0..live.len());
        h.release(live.swap_remove(index));
      }
    }
  }

  assert_eq!(first.heap_size(), second.heap_size());
}
