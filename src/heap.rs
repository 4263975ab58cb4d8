//! Heap extender and coalescer (spec.md §4.4, §4.5).
//!
//! Both operate on an already-`init`ialized [`Allocator`], which is why
//! they live as inherent methods on it rather than free functions: they
//! need the provider, the arena, and the free lists together.

use crate::allocator::Allocator;
use crate::arena::Offset;
use crate::block;
use crate::error::AllocatorError;
use crate::provider::MemoryProvider;
use crate::tuning::{DSIZE, WSIZE};

impl<P: MemoryProvider> Allocator<P> {
  /// Ask the provider for `words · W` bytes (rounded up to an even word
  /// count), stamp a free block over them, move the epilogue past the
  /// new region, and coalesce. Returns the (possibly merged) block's
  /// `bp`.
  pub(crate) fn extend_heap(&mut self, words: u32) -> Result<Offset, AllocatorError> {
    let words = if words % 2 != 0 { words + 1 } else { words };
    let size = words * WSIZE;

    let old_len = self.arena.len() as Offset;
    let new_base = self.provider.grow(size as usize)?;
    debug_assert_eq!(
      new_base.as_ptr(),
      self.arena.addr(old_len),
      "provider must grow contiguously onto the arena's current end"
    );
    self.arena.grow_by(size as usize);

    // bp sits one word into the acquired region: the header overlays
    // the word that used to be the epilogue header (spec.md §4.4
    // step 3, "the newly-acquired region overlays the previous
    // epilogue").
    let bp = old_len;
    self.arena
      .write_word(block::header_offset(bp), block::pack(size, false));
    self.arena
      .write_word(block::footer_offset(bp, size), block::pack(size, false));

    let epilogue_bp = block::next_block_offset(bp, size);
    self.arena
      .write_word(block::header_offset(epilogue_bp), block::pack(0, true));

    tracing::debug!(bp, size, "extend_heap");
    Ok(self.coalesce(bp))
  }

  /// Merge a just-freed block (header/footer already rewritten with the
  /// allocated bit cleared, not yet on any list) with free neighbors.
  /// Returns the resulting block's `bp`, which is always on a list
  /// afterward. A no-op during `init` (spec.md §4.5, "Special Case 0").
  pub(crate) fn coalesce(&mut self, bp: Offset) -> Offset {
    if self.init_guard {
      return bp;
    }

    let prev_footer = self.arena.read_word(bp - DSIZE);
    let prev_alloc = block::alloc_of_word(prev_footer);
    let prev_size = block::size_of_word(prev_footer);

    let size = block::size_of_word(self.arena.read_word(block::header_offset(bp)));
    let next_bp = block::next_block_offset(bp, size);
    let next_header = self.arena.read_word(block::header_offset(next_bp));
    let next_alloc = block::alloc_of_word(next_header);
    let next_size = block::size_of_word(next_header);

    let result = match (prev_alloc, next_alloc) {
      (true, true) => {
        self.lists.insert_at_head(&mut self.arena, bp);
        bp
      }
      (true, false) => {
        self.lists.unlink(&mut self.arena, next_bp);
        let new_size = size + next_size;
        self.arena
          .write_word(block::header_offset(bp), block::pack(new_size, false));
        self.arena
          .write_word(block::footer_offset(bp, new_size), block::pack(new_size, false));
        self.lists.insert_at_head(&mut self.arena, bp);
        bp
      }
      (false, true) => {
        let prev_bp = block::prev_block_offset(bp, prev_size);
        self.lists.unlink(&mut self.arena, prev_bp);
        let new_size = size + prev_size;
        self.arena
          .write_word(block::header_offset(prev_bp), block::pack(new_size, false));
        self.arena
          .write_word(block::footer_offset(bp, size), block::pack(new_size, false));
        self.lists.insert_at_head(&mut self.arena, prev_bp);
        prev_bp
      }
      (false, false) => {
        let prev_bp = block::prev_block_offset(bp, prev_size);
        self.lists.unlink(&mut self.arena, prev_bp);
        self.lists.unlink(&mut self.arena, next_bp);
        let new_size = prev_size + size + next_size;
        self.arena
          .write_word(block::header_offset(prev_bp), block::pack(new_size, false));
        self.arena
          .write_word(block::footer_offset(next_bp, next_size), block::pack(new_size, false));
        self.lists.insert_at_head(&mut self.arena, prev_bp);
        prev_bp
      }
    };

    tracing::trace!(bp = result, "coalesce");
    result
  }
}
