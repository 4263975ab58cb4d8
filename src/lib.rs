//! # rallocator - A Segregated-Fit Dynamic Storage Allocator
//!
//! This crate provides a **boundary-tag, segregated free-list** allocator
//! in the classic malloc-lab style: an explicit free list threaded
//! through payload bytes, split across two address-partitioned regions,
//! built over a pluggable [`provider::MemoryProvider`] rather than a
//! fixed `sbrk` call.
//!
//! ## Overview
//!
//! ```text
//!   Heap layout after init():
//!
//!   ┌─────┬──────────┬───────────────────────┬──────────┬───────────────────────┬──────────┐
//!   │ pad │ prologue │   small region         │interlude │   large region        │ epilogue │
//!   │  W  │  (8,1)   │ (free list: small_root)│  (8,1)   │ (free list: large_root)│  (0,1)   │
//!   └─────┴──────────┴───────────────────────┴──────────┴───────────────────────┴──────────┘
//!
//!   Every block: [header: size|alloc] [payload ...] [footer: size|alloc]
//!   Free block payload opens with two link words: [next] [prev]
//! ```
//!
//! Small requests (≤ [`tuning::SMALL_THRESHOLD`] bytes) are served from
//! the small region first, falling back to the large region; anything
//! larger goes straight to the large region. This keeps small
//! allocations from fragmenting the region large allocations rely on.
//!
//! ## Crate Structure
//!
//! ```text
//!   rallocator
//!   ├── tuning     - Build-time constants (WSIZE, CHUNKSIZE, ...)
//!   ├── arena      - Offset-addressed byte arena, the one pointer-arithmetic seam
//!   ├── align      - Alignment macros (align_to!, align8!)
//!   ├── block      - Header/footer pack/decode, neighbor navigation
//!   ├── link       - Free-list link word read/write
//!   ├── list       - Segregated free-list insert/unlink/replace
//!   ├── provider   - MemoryProvider trait, SbrkProvider, FixedProvider
//!   ├── heap       - extend_heap + coalesce (private, methods on Allocator)
//!   ├── find       - find_fit + place (private, methods on Allocator)
//!   ├── allocator  - Allocator: init/allocate/free/reallocate/check
//!   └── error      - AllocatorError
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use rallocator::{Allocator, FixedProvider};
//!
//! let mut alloc = Allocator::new(FixedProvider::new(1 << 20));
//! assert_eq!(alloc.init(), 0);
//!
//! let p = alloc.allocate(100).expect("heap has room");
//! unsafe { p.as_ptr().write_bytes(0xAB, 100) };
//! alloc.free(p);
//! assert!(alloc.check(false).is_empty());
//! ```
//!
//! ## Limitations
//!
//! - **Single-threaded only**: no internal synchronization; wrap in a
//!   mutex to share across threads.
//! - **Memory is never returned to the provider**: the arena grows
//!   monotonically.
//! - **Best-effort error detection only**: double-free and bogus-pointer
//!   inputs are out of contract.

pub mod align;
pub mod allocator;
pub mod arena;
pub mod block;
pub mod error;
mod find;
mod heap;
pub mod link;
pub mod list;
pub mod provider;
pub mod tuning;

pub use allocator::{Allocator, TeamInfo, TEAM};
pub use error::AllocatorError;
pub use provider::{FixedProvider, MemoryProvider, SbrkProvider};
