//! Tuning constants fixed at build time.
//!
//! These are the literal knobs from the allocator's design: word/double
//! word sizes, the chunk size requested from the memory provider on a
//! miss, boundary-tag overhead, and the size threshold that separates the
//! small region from the large region.

/// Machine word size, in bytes. Every header, footer, and free-list link
/// occupies exactly one word. Kept at 4 (not `size_of::<usize>()`) so that
/// the boundary-tag format matches the specification bit-for-bit; see
/// [`crate::arena::Offset`] for how a 4-byte word still addresses an
/// arbitrarily large 64-bit heap.
pub const WSIZE: u32 = 4;

/// Double word size, in bytes. Payload size and block size are always
/// multiples of this.
pub const DSIZE: u32 = 2 * WSIZE;

/// Bytes requested from the memory provider when no fit is found and the
/// heap must grow.
pub const CHUNKSIZE: u32 = 1 << 14;

/// Boundary-tag overhead (header + footer) charged against every block.
pub const OVERHEAD: u32 = DSIZE;

/// Free blocks at or below this total size live on the small list;
/// anything larger lives on the large list.
pub const SMALL_THRESHOLD: u32 = 192;

/// Fraction of the initial chunk carved out for the small region at
/// `init` time; the remainder becomes the large region.
pub const SMALL_REGION_NUMERATOR: u32 = 1;
pub const SMALL_REGION_DENOMINATOR: u32 = 4;

/// Minimum total block size: header + one next-link word + one prev-link
/// word + footer.
pub const MIN_BLOCK_SIZE: u32 = 4 * WSIZE;

const _: () = assert!(MIN_BLOCK_SIZE == 16);
const _: () = assert!(DSIZE == 8);
const _: () = assert!(OVERHEAD == 8);
