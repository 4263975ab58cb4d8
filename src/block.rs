//! Block layout primitives.
//!
//! A block is a contiguous run of bytes starting one word before its
//! block pointer (`bp`): a header word, the payload, and a footer word
//! duplicating the header. All functions here are pure offset arithmetic
//! with no failure modes — they never touch the arena themselves, only
//! the caller's already-read header/footer words. See `SPEC_FULL.md` §4.1.

use crate::arena::Offset;
use crate::tuning::{DSIZE, WSIZE};

/// Packs a `size`/`alloc` pair into a header or footer word. `size` must
/// already be a multiple of [`DSIZE`]; `alloc` occupies bit 0.
#[inline]
pub fn pack(size: u32, alloc: bool) -> u32 {
  debug_assert_eq!(size % DSIZE, 0, "block size must be a multiple of DSIZE");
  size | (alloc as u32)
}

/// Extracts the size field from a header/footer word.
#[inline]
pub fn size_of_word(word: u32) -> u32 {
  word & !0x7
}

/// Extracts the allocated bit from a header/footer word.
#[inline]
pub fn alloc_of_word(word: u32) -> bool {
  (word & 0x1) != 0
}

/// Offset of `bp`'s header word.
#[inline]
pub fn header_offset(bp: Offset) -> Offset {
  bp - WSIZE
}

/// Offset of `bp`'s footer word, given the block's total `size`.
#[inline]
pub fn footer_offset(bp: Offset, size: u32) -> Offset {
  bp + size - DSIZE
}

/// Offset of the next block's `bp`, given this block's total `size`.
#[inline]
pub fn next_block_offset(bp: Offset, size: u32) -> Offset {
  bp + size
}

/// Offset of the previous block's `bp`, given that block's total
/// `prev_size` (read from its footer, which sits at `bp - DSIZE`).
#[inline]
pub fn prev_block_offset(bp: Offset, prev_size: u32) -> Offset {
  bp - prev_size
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn pack_roundtrips_through_accessors() {
    for size in [16u32, 24, 192, 200, 1 << 14] {
      for alloc in [true, false] {
        let word = pack(size, alloc);
        assert_eq!(size_of_word(word), size);
        assert_eq!(alloc_of_word(word), alloc);
      }
    }
  }

  #[test]
  fn header_footer_and_neighbor_offsets() {
    let bp: Offset = 100;
    let size = 32;
    assert_eq!(header_offset(bp), 96);
    assert_eq!(footer_offset(bp, size), 124);
    assert_eq!(next_block_offset(bp, size), 132);
    assert_eq!(prev_block_offset(bp, 40), 60);
  }

  #[test]
  #[should_panic]
  fn pack_rejects_unaligned_size() {
    pack(17, true);
  }
}
