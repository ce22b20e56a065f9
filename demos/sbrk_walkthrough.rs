use libc::sbrk;
use rallocator::{Heap, SbrkRegion};

/// Waits until the user presses ENTER.
/// Useful when you want to inspect memory state with tools like `pmap`, `htop`,
/// `gdb`, or just visually track how allocations change the program break.
fn block_until_enter_pressed() {
  println!("\n>>> Press ENTER to continue...");
  let mut line = String::new();
  let _ = std::io::stdin().read_line(&mut line);
}

/// Prints the current program break using `sbrk(0)`.
fn print_program_break(label: &str) {
  println!(
    "[{}] PID = {}, program break (sbrk(0)) = {:?}",
    label,
    std::process::id(),
    unsafe { sbrk(0) },
  );
}

fn main() {
  let mut heap = Heap::new(SbrkRegion::new());

  print_program_break("start");
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 1) Allocate 4 bytes (the size of a u32).
  // --------------------------------------------------------------------
  println!("\n[1] Allocate 4 bytes");
  let first_block = heap.allocate(4).expect("nonzero size never returns None");
  unsafe { (first_block.as_ptr() as *mut u32).write(0xDEADBEEF) };
  println!("[1] first_block = {:?}, heap_size = {}", first_block, heap.heap_size());

  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 2) Allocate 12 odd-sized bytes; watch the size get rounded up.
  // --------------------------------------------------------------------
  println!("\n[2] Allocate 12 bytes");
  let second_block = heap.allocate(12).unwrap();
  unsafe { std::ptr::write_bytes(second_block.as_ptr(), 0xAB, 12) };
  println!("[2] second_block = {:?}, heap_size = {}", second_block, heap.heap_size());

  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 3) Allocate an 8-byte block.
  // --------------------------------------------------------------------
  println!("\n[3] Allocate 8 bytes");
  let third_block = heap.allocate(8).unwrap();
  unsafe { (third_block.as_ptr() as *mut u64).write(0x1122334455667788) };
  println!("[3] third_block = {:?}, heap_size = {}", third_block, heap.heap_size());

  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 4) Release the first block, then ask for something small enough to
  //    fit inside it again.
  // --------------------------------------------------------------------
  println!("\n[4] Release first_block at {:?}", first_block);
  heap.release(first_block);
  block_until_enter_pressed();

  println!("\n[5] Allocate 2 bytes (watch it reuse the freed block)");
  let fifth_block = heap.allocate(2).unwrap();
  println!(
    "[5] fifth_block == first_block? {}",
    if fifth_block == first_block {
      "yes, the free list handed the same block back"
    } else {
      "no, it allocated somewhere else"
    }
  );

  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 6) Allocate something large enough to force the heap to grow.
  // --------------------------------------------------------------------
  print_program_break("before large alloc");
  println!("\n[6] Allocate 64 KiB");
  let big_block = heap.allocate(64 * 1024).unwrap();
  println!("[6] big_block = {:?}, heap_size = {}", big_block, heap.heap_size());
  print_program_break("after large alloc");

  block_until_enter_pressed();

  println!("\n[7] End of walkthrough. Process will exit and the OS will reclaim everything.");
}
