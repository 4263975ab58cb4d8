//! The memory-provider seam.
//!
//! `SPEC_FULL.md` generalizes spec.md's fixed `sbrk`/`heap_lo`/`heap_hi`
//! collaborator into a `MemoryProvider` trait, grounded in
//! `martician1-rusty_malloc`'s `Grower` abstraction. [`SbrkProvider`] is
//! the literal real-`sbrk` implementation spec.md describes;
//! [`FixedProvider`] is an in-process bounded arena used by tests so
//! heap-exhaustion is deterministic and independent tests don't race over
//! the process's real program break.

use std::ptr::NonNull;

use crate::error::AllocatorError;

/// Extends a byte arena on demand and reports its current bounds. The
/// allocator never asks a provider to shrink — growth is monotonic.
pub trait MemoryProvider {
  /// Extend the arena by `additional` bytes, returning the address of
  /// the first newly-available byte. Fails if the provider's fixed
  /// maximum would be exceeded.
  fn grow(&mut self, additional: usize) -> Result<NonNull<u8>, AllocatorError>;

  /// Address of the first byte ever handed out, or `None` before the
  /// first successful [`grow`](MemoryProvider::grow).
  fn heap_lo(&self) -> Option<NonNull<u8>>;

  /// Address one past the last byte currently committed.
  fn heap_hi(&self) -> Option<NonNull<u8>>;

  /// The provider's fixed compile-time maximum heap size, in bytes.
  fn max_heap_size(&self) -> usize;
}

/// The real provider: extends the process heap via `libc::sbrk`.
pub struct SbrkProvider {
  base: Option<NonNull<u8>>,
  committed: usize,
  max_heap_size: usize,
}

impl SbrkProvider {
  /// `max_heap_size` bounds how far this provider will let the
  /// allocator grow; `sbrk` itself has no such limit, so this is
  /// enforced in software to match spec.md's "fixed compile-time
  /// maximum" contract.
  pub fn new(max_heap_size: usize) -> Self {
    Self {
      base: None,
      committed: 0,
      max_heap_size,
    }
  }
}

impl Default for SbrkProvider {
  fn default() -> Self {
    // 64 MiB, a generous default for a single-process heap lab allocator.
    Self::new(64 * 1024 * 1024)
  }
}

impl MemoryProvider for SbrkProvider {
  fn grow(&mut self, additional: usize) -> Result<NonNull<u8>, AllocatorError> {
    if self.committed + additional > self.max_heap_size {
      tracing::error!(
        committed = self.committed,
        additional,
        max = self.max_heap_size,
        "sbrk provider refused growth past its fixed maximum"
      );
      return Err(AllocatorError::HeapExhausted {
        requested: additional,
      });
    }

    let raw = unsafe { libc::sbrk(additional as libc::intptr_t) };
    if raw == usize::MAX as *mut libc::c_void {
      tracing::error!(additional, "sbrk failed");
      return Err(AllocatorError::HeapExhausted {
        requested: additional,
      });
    }

    let base = raw as *mut u8;
    if self.base.is_none() {
      self.base = NonNull::new(base);
    }
    self.committed += additional;
    tracing::debug!(?base, additional, committed = self.committed, "sbrk grew heap");
    Ok(NonNull::new(base).expect("sbrk returned a null non-failure pointer"))
  }

  fn heap_lo(&self) -> Option<NonNull<u8>> {
    self.base
  }

  fn heap_hi(&self) -> Option<NonNull<u8>> {
    let base = self.base?;
    Some(unsafe { NonNull::new_unchecked(base.as_ptr().add(self.committed)) })
  }

  fn max_heap_size(&self) -> usize {
    self.max_heap_size
  }
}

/// A deterministic, in-process bounded arena for tests: pre-reserves
/// `max_heap_size` bytes up front and "grows" by bumping a commit marker
/// into that fixed reservation, failing once the marker would exceed it.
pub struct FixedProvider {
  storage: Box<[u8]>,
  committed: usize,
}

impl FixedProvider {
  pub fn new(max_heap_size: usize) -> Self {
    Self {
      storage: vec![0u8; max_heap_size].into_boxed_slice(),
      committed: 0,
    }
  }
}

impl MemoryProvider for FixedProvider {
  fn grow(&mut self, additional: usize) -> Result<NonNull<u8>, AllocatorError> {
    if self.committed + additional > self.storage.len() {
      return Err(AllocatorError::HeapExhausted {
        requested: additional,
      });
    }
    let base = unsafe { NonNull::new_unchecked(self.storage.as_mut_ptr().add(self.committed)) };
    self.committed += additional;
    Ok(base)
  }

  fn heap_lo(&self) -> Option<NonNull<u8>> {
    if self.committed == 0 {
      None
    } else {
      NonNull::new(self.storage.as_ptr() as *mut u8)
    }
  }

  fn heap_hi(&self) -> Option<NonNull<u8>> {
    if self.committed == 0 {
      None
    } else {
      Some(unsafe { NonNull::new_unchecked(self.storage.as_ptr().cast_mut().add(self.committed)) })
    }
  }

  fn max_heap_size(&self) -> usize {
    self.storage.len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fixed_provider_grows_contiguously() {
    let mut p = FixedProvider::new(4096);
    let a = p.grow(64).unwrap();
    let b = p.grow(64).unwrap();
    assert_eq!(unsafe { a.as_ptr().add(64) }, b.as_ptr());
  }

  #[test]
  fn fixed_provider_refuses_growth_past_max() {
    let mut p = FixedProvider::new(128);
    assert!(p.grow(64).is_ok());
    assert!(p.grow(128).is_err());
  }

  #[test]
  fn fixed_provider_reports_none_bounds_before_first_grow() {
    let p = FixedProvider::new(128);
    assert!(p.heap_lo().is_none());
    assert!(p.heap_hi().is_none());
  }
}
