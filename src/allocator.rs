//! Public operations: `init`, `allocate`, `free`, `reallocate`, `check`.
//!
//! [`Allocator`] owns the global mutable state spec.md §5 calls out
//! ("heap base, two list roots, interlude address, init guard") as a
//! single record, exactly as §9's "package them into a single
//! allocator-context record" design note asks, rather than as process-wide
//! statics. One `Allocator` is one independent context.

use std::ptr::NonNull;

use crate::arena::{Arena, Offset, NULL_OFFSET};
use crate::block;
use crate::error::AllocatorError;
use crate::list::FreeLists;
use crate::provider::MemoryProvider;
use crate::tuning::{
  CHUNKSIZE, DSIZE, MIN_BLOCK_SIZE, OVERHEAD, SMALL_REGION_DENOMINATOR, SMALL_REGION_NUMERATOR,
  WSIZE,
};

/// Freeform identity record a trace driver can read off the allocator.
/// Content is unconstrained by spec.md §6 beyond "freeform".
#[derive(Debug, Clone, Copy)]
pub struct TeamInfo {
  pub team_name: &'static str,
  pub member_name: &'static str,
  pub member_id: &'static str,
}

pub const TEAM: TeamInfo = TeamInfo {
  team_name: "rallocator",
  member_name: "student",
  member_id: "0001",
};

/// A single allocator context: one arena, one pair of segregated free
/// lists, one memory provider. `!Sync`/`!Send` by construction (the arena
/// holds a raw base pointer) — a multi-threaded host wraps this in a
/// mutex externally, per spec.md §5.
pub struct Allocator<P: MemoryProvider> {
  pub(crate) provider: P,
  pub(crate) arena: Arena,
  pub(crate) lists: FreeLists,
  /// `bp` of the first real (non-sentinel) block; stable for the life
  /// of the context, used as the walk-start point by [`Allocator::check`].
  heap_start: Offset,
  /// Set while [`Allocator::init`] is running; makes `coalesce` a no-op
  /// (spec.md §4.5, "Special Case 0"). Read by [`crate::heap`].
  pub(crate) init_guard: bool,
  initialized: bool,
}

impl<P: MemoryProvider> Allocator<P> {
  /// Build a context over `provider`. The context does nothing useful
  /// until [`Allocator::init`] succeeds.
  pub fn new(provider: P) -> Self {
    Self {
      provider,
      // Placeholder arena; overwritten by the first `grow` in `init`.
      // Never dereferenced before `init` runs because every other
      // method requires `self.initialized`.
      arena: Arena::placeholder(),
      lists: FreeLists::new(),
      heap_start: NULL_OFFSET,
      init_guard: true,
      initialized: false,
    }
  }

  /// Set up the arena: prologue, epilogue, small region, interlude,
  /// large region. Must be called once before any other operation.
  /// Returns `0` on success, `-1` on provider failure, matching
  /// spec.md §6's `init() -> 0 | -1`.
  pub fn init(&mut self) -> i32 {
    match self.try_init() {
      Ok(()) => 0,
      Err(err) => {
        tracing::error!(error = %err, "init failed");
        -1
      }
    }
  }

  fn try_init(&mut self) -> Result<(), AllocatorError> {
    self.init_guard = true;

    // Step 1: pad + prologue header/footer + initial epilogue header.
    let base = self.provider.grow((4 * WSIZE) as usize)?;
    self.arena = Arena::new(base, (4 * WSIZE) as usize);
    self.arena.write_word(0, 0);
    self.arena.write_word(WSIZE, block::pack(OVERHEAD, true));
    self.arena.write_word(2 * WSIZE, block::pack(OVERHEAD, true));
    self.arena.write_word(3 * WSIZE, block::pack(0, true));
    self.heap_start = 4 * WSIZE;

    // Step 2: extend for the small region's share of the initial chunk.
    let small_words =
      (CHUNKSIZE * SMALL_REGION_NUMERATOR / SMALL_REGION_DENOMINATOR) / WSIZE;
    let small_bp = self.extend_heap(small_words)?;
    let small_size =
      block::size_of_word(self.arena.read_word(block::header_offset(small_bp)));

    // Step 3: shrink the small block by OVERHEAD bytes and stamp the
    // interlude sentinel in the freed tail.
    let shrunk_size = small_size - OVERHEAD;
    self.arena
      .write_word(block::header_offset(small_bp), block::pack(shrunk_size, false));
    self.arena.write_word(
      block::footer_offset(small_bp, shrunk_size),
      block::pack(shrunk_size, false),
    );
    let interlude_bp = block::next_block_offset(small_bp, shrunk_size);
    debug_assert_eq!(
      interlude_bp % DSIZE,
      0,
      "interlude block pointer must be 8-byte aligned (spec.md §9 open question)"
    );
    self.arena
      .write_word(block::header_offset(interlude_bp), block::pack(OVERHEAD, true));
    self.arena
      .write_word(block::footer_offset(interlude_bp, OVERHEAD), block::pack(OVERHEAD, true));

    self.lists.small_root = small_bp;
    crate::link::set_prev(&mut self.arena, small_bp, NULL_OFFSET);
    crate::link::set_next(&mut self.arena, small_bp, NULL_OFFSET);

    // Step 4: extend for the large region's share.
    let large_words =
      (CHUNKSIZE - CHUNKSIZE * SMALL_REGION_NUMERATOR / SMALL_REGION_DENOMINATOR) / WSIZE;
    let large_bp = self.extend_heap(large_words)?;
    self.lists.large_root = large_bp;
    crate::link::set_prev(&mut self.arena, large_bp, NULL_OFFSET);
    crate::link::set_next(&mut self.arena, large_bp, NULL_OFFSET);

    // Step 5: store the region boundary.
    self.lists.interlude_addr = interlude_bp;

    // Step 6: clear the init guard; the allocator is live from here.
    self.init_guard = false;
    self.initialized = true;
    tracing::debug!(
      heap_start = self.heap_start,
      interlude = interlude_bp,
      "allocator initialized"
    );
    Ok(())
  }

  fn asize_for(size: usize) -> u32 {
    if size <= DSIZE as usize {
      MIN_BLOCK_SIZE
    } else {
      crate::align8!((size as u32) + OVERHEAD)
    }
  }

  /// Returns a pointer with at least `size` usable payload bytes,
  /// 8-byte aligned, or null if `size == 0` or the heap cannot grow
  /// enough to satisfy the request.
  pub fn allocate(&mut self, size: usize) -> Option<NonNull<u8>> {
    debug_assert!(self.initialized, "allocate called before init");
    if size == 0 {
      return None;
    }
    let asize = Self::asize_for(size);

    let bp = match self.find_fit(asize) {
      Some(bp) => bp,
      None => {
        let words = std::cmp::max(asize, CHUNKSIZE) / WSIZE;
        match self.extend_heap(words) {
          Ok(bp) => bp,
          Err(err) => {
            tracing::error!(error = %err, size, "allocate: heap exhausted");
            return None;
          }
        }
      }
    };
    let bp = self.place(bp, asize);
    tracing::trace!(bp, size, asize, "allocate");
    NonNull::new(self.arena.addr(bp))
  }

  /// Releases a block previously returned by [`Allocator::allocate`] or
  /// [`Allocator::reallocate`]. Behavior is undefined if `ptr` was not
  /// so obtained or has already been freed (spec.md §6).
  pub fn free(&mut self, ptr: NonNull<u8>) {
    debug_assert!(self.initialized, "free called before init");
    let bp = self.arena.offset_of(ptr.as_ptr());
    let size = block::size_of_word(self.arena.read_word(block::header_offset(bp)));
    self.arena.write_word(block::header_offset(bp), block::pack(size, false));
    self.arena.write_word(block::footer_offset(bp, size), block::pack(size, false));
    self.coalesce(bp);
    tracing::trace!(bp, size, "free");
  }

  /// Returns a pointer with at least `size` payload bytes, preserving
  /// the first `min(size, old_size)` payload bytes, per spec.md §4.7.
  pub fn reallocate(&mut self, ptr: Option<NonNull<u8>>, size: usize) -> Option<NonNull<u8>> {
    debug_assert!(self.initialized, "reallocate called before init");
    let ptr = match ptr {
      None => return self.allocate(size),
      Some(ptr) => ptr,
    };
    if size == 0 {
      self.free(ptr);
      return None;
    }

    let asize = Self::asize_for(size);
    let bp = self.arena.offset_of(ptr.as_ptr());
    let cur = block::size_of_word(self.arena.read_word(block::header_offset(bp)));
    let next_bp = block::next_block_offset(bp, cur);
    let next_header = self.arena.read_word(block::header_offset(next_bp));
    let next_alloc = block::alloc_of_word(next_header);
    let next_size = block::size_of_word(next_header);

    if cur >= asize + OVERHEAD {
      // Case A: in-place fit, with a word of slack baked into the
      // split size (spec.md §9's documented, kept-as-is asymmetry
      // versus case B's plain `asize`).
      let saved = self.save_first_two_words(bp);
      self.arena.write_word(block::header_offset(bp), block::pack(cur, false));
      self.arena.write_word(block::footer_offset(bp, cur), block::pack(cur, false));
      self.lists.insert_at_head(&mut self.arena, bp);
      let new_bp = self.place(bp, asize + OVERHEAD);
      debug_assert_eq!(new_bp, bp, "case A never relocates bp");
      self.restore_first_two_words(bp, saved);
      tracing::trace!(bp, size, "reallocate: in-place fit");
      return NonNull::new(self.arena.addr(bp));
    }

    if !next_alloc && cur + next_size >= asize {
      // Case B: merge forward, then split/consume to `asize` exactly.
      let saved = self.save_first_two_words(bp);
      self.arena.write_word(block::header_offset(bp), block::pack(cur, false));
      self.arena.write_word(block::footer_offset(bp, cur), block::pack(cur, false));
      self.lists.unlink(&mut self.arena, next_bp);
      self.lists.insert_at_head(&mut self.arena, bp);
      let combined = cur + next_size;
      self.arena
        .write_word(block::header_offset(bp), block::pack(combined, false));
      self.arena
        .write_word(block::footer_offset(bp, combined), block::pack(combined, false));
      let new_bp = self.place(bp, asize);
      debug_assert_eq!(new_bp, bp, "case B never relocates bp");
      self.restore_first_two_words(bp, saved);
      tracing::trace!(bp, size, "reallocate: merged forward");
      return NonNull::new(self.arena.addr(bp));
    }

    // Case C: allocate fresh, copy, free the old block.
    let new_ptr = self.allocate(size)?;
    let copy_len = std::cmp::min(size, (cur - OVERHEAD) as usize);
    unsafe {
      std::ptr::copy_nonoverlapping(ptr.as_ptr(), new_ptr.as_ptr(), copy_len);
    }
    self.free(ptr);
    tracing::trace!(old_bp = bp, size, "reallocate: relocated");
    Some(new_ptr)
  }

  fn save_first_two_words(&self, bp: Offset) -> [u32; 2] {
    [self.arena.read_word(bp), self.arena.read_word(bp + WSIZE)]
  }

  fn restore_first_two_words(&mut self, bp: Offset, saved: [u32; 2]) {
    self.arena.write_word(bp, saved[0]);
    self.arena.write_word(bp + WSIZE, saved[1]);
  }

  /// Walks the free lists, the prologue sentinel, and the full block
  /// sequence, verifying spec.md §3's eight invariants. Returns the
  /// violations found (empty means the heap is consistent); also emits
  /// a `tracing` event per violation, and, when `verbose`, a
  /// `tracing::info!` per block. Mirrors `mm_checkheap`'s walk in the
  /// original source, which starts at the prologue rather than the
  /// first user block.
  pub fn check(&self, verbose: bool) -> Vec<String> {
    let mut violations: Vec<AllocatorError> = Vec::new();
    let mut free_reachable = std::collections::HashSet::new();
    for &(root, region) in &[(self.lists.small_root, "small"), (self.lists.large_root, "large")] {
      let mut cur = root;
      while cur != NULL_OFFSET {
        if region == "small" && !self.lists.is_small_region(cur) {
          violations.push(AllocatorError::InvariantViolation(format!(
            "small list root/member {cur} lies outside the small region"
          )));
        }
        if region == "large" && self.lists.is_small_region(cur) {
          violations.push(AllocatorError::InvariantViolation(format!(
            "large list root/member {cur} lies outside the large region"
          )));
        }
        free_reachable.insert(cur);
        cur = crate::link::get_next(&self.arena, cur);
      }
    }

    let prologue_bp = 2 * WSIZE;
    let prologue_word = self.arena.read_word(block::header_offset(prologue_bp));
    let prologue_footer = self.arena.read_word(block::footer_offset(prologue_bp, OVERHEAD));
    if prologue_word != block::pack(OVERHEAD, true) || prologue_footer != block::pack(OVERHEAD, true) {
      violations.push(AllocatorError::InvariantViolation(format!(
        "bad prologue at {prologue_bp}: header {prologue_word:#x} footer {prologue_footer:#x}"
      )));
    }
    if verbose {
      tracing::info!(bp = prologue_bp, size = OVERHEAD, alloc = true, "check: prologue");
    }

    let mut bp = self.heap_start;
    let mut prev_was_free = false;
    loop {
      let header = self.arena.read_word(block::header_offset(bp));
      let size = block::size_of_word(header);
      let alloc = block::alloc_of_word(header);
      if size == 0 {
        if !alloc {
          violations.push(AllocatorError::InvariantViolation(
            "epilogue is not marked allocated".to_string(),
          ));
        }
        break;
      }

      let footer = self.arena.read_word(block::footer_offset(bp, size));
      if header != footer {
        violations.push(AllocatorError::InvariantViolation(format!(
          "block {bp}: header {header:#x} != footer {footer:#x}"
        )));
      }
      if bp % DSIZE != 0 {
        violations.push(AllocatorError::InvariantViolation(format!(
          "block {bp}: not 8-byte aligned"
        )));
      }
      if size != OVERHEAD && size < MIN_BLOCK_SIZE {
        violations.push(AllocatorError::InvariantViolation(format!(
          "block {bp}: size {size} below minimum"
        )));
      }

      let is_reachable = free_reachable.contains(&bp);
      if alloc && is_reachable {
        violations.push(AllocatorError::InvariantViolation(format!(
          "block {bp}: allocated but reachable from a free list"
        )));
      }
      if !alloc && !is_reachable && size != OVERHEAD {
        violations.push(AllocatorError::InvariantViolation(format!(
          "block {bp}: free but unreachable from any free list"
        )));
      }
      if !alloc && prev_was_free {
        violations.push(AllocatorError::InvariantViolation(format!(
          "block {bp}: adjacent to a free predecessor (coalescing broken)"
        )));
      }

      if verbose {
        tracing::info!(bp, size, alloc, "check: block");
      }
      prev_was_free = !alloc;
      bp = block::next_block_offset(bp, size);
    }

    for violation in &violations {
      tracing::error!(error = %violation, "check: invariant violation");
    }
    violations.into_iter().map(|err| err.to_string()).collect()
  }
}
