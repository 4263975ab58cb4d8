//! Finder and placer (spec.md §4.6).

use crate::allocator::Allocator;
use crate::arena::{Offset, NULL_OFFSET};
use crate::block;
use crate::provider::MemoryProvider;
use crate::tuning::{MIN_BLOCK_SIZE, SMALL_THRESHOLD};

impl<P: MemoryProvider> Allocator<P> {
  /// First-fit search: small requests try the small list first, then
  /// fall back to the large list; large requests go straight to the
  /// large list. This keeps small requests out of the large region so
  /// they don't fragment it, without giving up on a large-region fit
  /// when the small region has nothing suitable.
  pub(crate) fn find_fit(&self, asize: u32) -> Option<Offset> {
    if asize <= SMALL_THRESHOLD {
      if let Some(bp) = self.scan_list(self.lists.small_root, asize) {
        return Some(bp);
      }
    }
    self.scan_list(self.lists.large_root, asize)
  }

  fn scan_list(&self, root: Offset, asize: u32) -> Option<Offset> {
    let mut cur = root;
    while cur != NULL_OFFSET {
      let size = block::size_of_word(self.arena.read_word(block::header_offset(cur)));
      if size >= asize {
        return Some(cur);
      }
      cur = crate::link::get_next(&self.arena, cur);
    }
    None
  }

  /// Place an `asize`-byte allocation into the free block at `bp`
  /// (`bp` must currently be on a list). Splits off a remainder if it
  /// would be a valid block on its own, otherwise consumes the whole
  /// block. Returns `bp`, still the allocated block's pointer — the
  /// split remainder is addressed separately as `newbp` and never
  /// returned to the caller.
  pub(crate) fn place(&mut self, bp: Offset, asize: u32) -> Offset {
    let csize = block::size_of_word(self.arena.read_word(block::header_offset(bp)));

    if csize - asize >= MIN_BLOCK_SIZE {
      let newbp = bp + asize;
      // The remainder takes bp's list position in place, rather
      // than unlink(bp) + insert(newbp), so first-fit ordering for
      // other blocks in the list is undisturbed (spec.md §9).
      self.lists.replace(&mut self.arena, bp, newbp);

      self.arena
        .write_word(block::header_offset(bp), block::pack(asize, true));
      self.arena
        .write_word(block::footer_offset(bp, asize), block::pack(asize, true));

      let rem_size = csize - asize;
      self.arena
        .write_word(block::header_offset(newbp), block::pack(rem_size, false));
      self.arena
        .write_word(block::footer_offset(newbp, rem_size), block::pack(rem_size, false));

      tracing::trace!(bp, newbp, asize, rem_size, "place: split");
    } else {
      self.lists.unlink(&mut self.arena, bp);
      self.arena
        .write_word(block::header_offset(bp), block::pack(csize, true));
      self.arena
        .write_word(block::footer_offset(bp, csize), block::pack(csize, true));
      tracing::trace!(bp, csize, "place: consumed whole");
    }

    bp
  }
}
