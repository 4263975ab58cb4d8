//! End-to-end scenarios from spec.md §8, run against a real
//! `Allocator<FixedProvider>` so behavior is deterministic and
//! parallel-test-safe.

use rallocator::{Allocator, FixedProvider};

const ONE_MEBIBYTE: usize = 1 << 20;

fn fresh() -> Allocator<FixedProvider> {
    let mut alloc = Allocator::new(FixedProvider::new(ONE_MEBIBYTE));
    assert_eq!(alloc.init(), 0);
    alloc
}

#[test]
fn simple_alloc_free() {
    let mut alloc = fresh();
    let p = alloc.allocate(100).expect("allocation should succeed");
    assert_eq!(p.as_ptr() as usize % 8, 0);

    unsafe { p.as_ptr().write_bytes(0xAB, 100) };
    alloc.free(p);

    assert!(alloc.check(false).is_empty());
}

#[test]
fn split_then_consume_reuses_freed_block() {
    let mut alloc = fresh();
    let p1 = alloc.allocate(40).unwrap();
    let _p2 = alloc.allocate(40).unwrap();
    alloc.free(p1);
    let p3 = alloc.allocate(40).unwrap();

    // Head-insert + first-fit means the most recently freed block wins.
    assert_eq!(p3, p1);
    assert!(alloc.check(false).is_empty());
}

#[test]
fn full_coalesce_after_three_frees() {
    let mut alloc = fresh();
    let p1 = alloc.allocate(64).unwrap();
    let p2 = alloc.allocate(64).unwrap();
    let p3 = alloc.allocate(64).unwrap();

    alloc.free(p1);
    alloc.free(p3);
    alloc.free(p2);

    let violations = alloc.check(false);
    assert!(violations.is_empty(), "{violations:?}");
}

#[test]
fn segregation_keeps_small_and_large_apart() {
    let mut alloc = fresh();
    let s = alloc.allocate(32).unwrap();
    let l = alloc.allocate(4096).unwrap();

    alloc.free(s);
    alloc.free(l);

    assert!(alloc.check(false).is_empty());
}

#[test]
fn realloc_grow_in_place_preserves_prefix() {
    let mut alloc = fresh();
    let p = alloc.allocate(24).unwrap();
    unsafe { p.as_ptr().write_bytes(0x11, 24) };

    // Free the immediately-following block so there's room to grow into.
    let follower = alloc.allocate(64).unwrap();
    alloc.free(follower);

    let q = alloc.reallocate(Some(p), 80).unwrap();
    assert_eq!(q, p);

    let bytes = unsafe { std::slice::from_raw_parts(q.as_ptr(), 24) };
    assert!(bytes.iter().all(|&b| b == 0x11));
    assert!(alloc.check(false).is_empty());
}

#[test]
fn realloc_relocate_when_no_room_to_grow() {
    let mut alloc = fresh();
    let p = alloc.allocate(24).unwrap();
    unsafe { p.as_ptr().write_bytes(0x22, 24) };
    let _n = alloc.allocate(24).unwrap(); // keeps the follower allocated

    let q = alloc.reallocate(Some(p), 4096).unwrap();
    assert_ne!(q, p);

    let bytes = unsafe { std::slice::from_raw_parts(q.as_ptr(), 24) };
    assert!(bytes.iter().all(|&b| b == 0x22));
    assert!(alloc.check(false).is_empty());
}

#[test]
fn realloc_null_pointer_behaves_like_allocate() {
    let mut alloc = fresh();
    let p = alloc.reallocate(None, 48).unwrap();
    assert!(alloc.check(false).is_empty());
    alloc.free(p);
}

#[test]
fn realloc_to_zero_frees_and_returns_none() {
    let mut alloc = fresh();
    let p = alloc.allocate(48).unwrap();
    assert!(alloc.reallocate(Some(p), 0).is_none());
    assert!(alloc.check(false).is_empty());
}

#[test]
fn allocate_zero_returns_none() {
    let mut alloc = fresh();
    assert!(alloc.allocate(0).is_none());
}

#[test]
fn repeated_same_size_realloc_preserves_contents() {
    let mut alloc = fresh();
    let mut p = alloc.allocate(56).unwrap();
    unsafe { p.as_ptr().write_bytes(0x7E, 56) };

    for _ in 0..5 {
        p = alloc.reallocate(Some(p), 56).unwrap();
        let bytes = unsafe { std::slice::from_raw_parts(p.as_ptr(), 56) };
        assert!(bytes.iter().all(|&b| b == 0x7E));
    }
    assert!(alloc.check(false).is_empty());
}

#[test]
fn heap_exhaustion_returns_none_without_panicking() {
    let mut alloc = Allocator::new(FixedProvider::new(1 << 14));
    assert_eq!(alloc.init(), 0);

    // Keep allocating until the small fixed arena is exhausted; the
    // allocator must degrade to `None`, never panic or corrupt state.
    let mut outstanding = Vec::new();
    loop {
        match alloc.allocate(256) {
            Some(p) => outstanding.push(p),
            None => break,
        }
        if outstanding.len() > 10_000 {
            panic!("allocator never reported exhaustion");
        }
    }
    assert!(alloc.check(false).is_empty());
}

#[test]
fn randomized_soak_sequence_stays_consistent() {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let mut alloc = Allocator::new(FixedProvider::new(8 << 20));
    assert_eq!(alloc.init(), 0);

    let mut rng = StdRng::seed_from_u64(0xC0FFEE);
    let mut live: Vec<(std::ptr::NonNull<u8>, usize)> = Vec::new();

    for _ in 0..2000 {
        let op = rng.gen_range(0..3);
        if op == 0 || live.is_empty() {
            let size = rng.gen_range(1..=4096);
            if let Some(p) = alloc.allocate(size) {
                unsafe { p.as_ptr().write_bytes(0x5A, size) };
                live.push((p, size));
            }
        } else if op == 1 {
            let idx = rng.gen_range(0..live.len());
            let (p, _) = live.swap_remove(idx);
            alloc.free(p);
        } else {
            let idx = rng.gen_range(0..live.len());
            let (p, old_size) = live[idx];
            let new_size = rng.gen_range(1..=4096);
            if let Some(q) = alloc.reallocate(Some(p), new_size) {
                let preserved = std::cmp::min(old_size, new_size);
                let bytes = unsafe { std::slice::from_raw_parts(q.as_ptr(), preserved) };
                assert!(bytes.iter().all(|&b| b == 0x5A));
                live[idx] = (q, new_size);
            } else {
                live.swap_remove(idx);
            }
        }

        let violations = alloc.check(false);
        assert!(violations.is_empty(), "{violations:?}");
    }
}
