//! A small scripted allocate/free/reallocate sequence against a real
//! `SbrkProvider`, printing heap growth via `sbrk(0)` probes the way the
//! bump-allocator demo this replaces did.

use libc::sbrk;
use rallocator::{Allocator, SbrkProvider, TEAM};

unsafe fn print_program_break(label: &str) {
  println!(
    "[{}] PID = {}, program break (sbrk(0)) = {:?}",
    label,
    std::process::id(),
    unsafe { sbrk(0) },
  );
}

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .init();

  println!("team: {} / {} ({})", TEAM.team_name, TEAM.member_name, TEAM.member_id);

  let mut alloc = Allocator::new(SbrkProvider::default());
  unsafe { print_program_break("before init") };
  assert_eq!(alloc.init(), 0, "init failed");
  unsafe { print_program_break("after init") };

  println!("\n[1] Allocate 100 bytes");
  let p1 = alloc.allocate(100).expect("allocation should succeed");
  unsafe { p1.as_ptr().write_bytes(0xAB, 100) };
  unsafe { print_program_break("after [1]") };

  println!("\n[2] Allocate 4096 bytes (forces the large region)");
  let p2 = alloc.allocate(4096).expect("allocation should succeed");
  unsafe { p2.as_ptr().write_bytes(0xCD, 4096) };
  unsafe { print_program_break("after [2]") };

  println!("\n[3] Free the small allocation, then reallocate it larger");
  alloc.free(p1);
  let p3 = alloc.reallocate(None, 40).expect("allocation should succeed");
  println!("reallocate(None, 40) behaved like allocate -> {p3:?}");

  println!("\n[4] Grow p3 in place or relocate it");
  let p3 = alloc.reallocate(Some(p3), 200).expect("reallocate should succeed");
  unsafe { print_program_break("after [4]") };

  println!("\n[check] walking the heap for invariant violations");
  let violations = alloc.check(true);
  if violations.is_empty() {
    println!("heap is consistent");
  } else {
    for v in &violations {
      println!("VIOLATION: {v}");
    }
  }

  alloc.free(p2);
  alloc.free(p3);
  unsafe { print_program_break("end") };
}
