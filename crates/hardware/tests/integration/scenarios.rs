//! Hit/miss sequences on a direct-mapped cache with 8-byte blocks.

use crate::common::harness::TestHarness;

fn hits_and_misses(h: &TestHarness) -> (u64, u64) {
    let s = h.stats("dl1");
    (s.misses, s.hits)
}

#[test]
fn test_repeated_reads_of_one_block() {
    let mut h = TestHarness::single("dl1:256:8:1:l");

    for _ in 0..3 {
        h.read("dl1", 0);
    }
    assert_eq!(hits_and_misses(&h), (1, 2));

    // Same block, different offset
    for _ in 0..3 {
        h.read("dl1", 4);
    }
    assert_eq!(hits_and_misses(&h), (1, 5));

    // Next block lands in set 1, nothing is evicted
    for _ in 0..3 {
        h.read("dl1", 8);
    }
    assert_eq!(hits_and_misses(&h), (2, 7));

    let s = h.stats("dl1");
    assert_eq!(s.accesses, 9);
    assert_eq!(s.replacements, 0);
}

#[test]
fn test_next_block_in_single_set_replaces() {
    let mut h = TestHarness::single("dl1:1:8:1:l");

    for addr in [0, 0, 0, 4, 4, 4, 8, 8, 8] {
        h.read("dl1", addr);
    }

    let s = h.stats("dl1");
    assert_eq!((s.misses, s.hits), (2, 7));
    assert_eq!(s.replacements, 1);
    assert_eq!(s.writebacks, 0);
}

#[test]
fn test_hit_and_miss_latencies() {
    let mut h = TestHarness::with_levels(&[("dl1", "dl1:256:8:1:l", None)], 10);

    assert_eq!(h.read("dl1", 0), 10);
    assert_eq!(h.read("dl1", 0), 1);
    assert_eq!(h.now, 11);
}

#[test]
fn test_dirty_eviction_costs_a_writeback() {
    let mut h = TestHarness::with_levels(&[("dl1", "dl1:1:8:1:l", None)], 10);

    assert_eq!(h.write("dl1", 0), 10);
    // Victim write-back plus fill
    assert_eq!(h.read("dl1", 8), 20);

    let s = h.stats("dl1");
    assert_eq!(s.writebacks, 1);
    assert_eq!(s.replacements, 1);
    assert_eq!(h.hierarchy.memory().transfers, 3);
}

#[test]
fn test_write_allocates_and_marks_dirty() {
    let mut h = TestHarness::single("dl1:4:16:2:l");

    h.write("dl1", 0x40);
    let cache = h.hierarchy.cache_by_name("dl1").unwrap();
    assert!(cache.probe(0x40));
    assert!(cache.is_dirty(0x4c));

    h.read("dl1", 0x44);
    let s = h.stats("dl1");
    assert_eq!((s.misses, s.hits), (1, 1));
}

#[test]
fn test_lru_keeps_recently_used_block() {
    let mut h = TestHarness::single("dl1:1:8:2:l");

    h.read("dl1", 0);
    h.read("dl1", 8);
    h.read("dl1", 0);
    h.read("dl1", 16); // evicts 8

    let cache = h.hierarchy.cache_by_name("dl1").unwrap();
    assert!(cache.probe(0));
    assert!(!cache.probe(8));
    assert!(cache.probe(16));
}

#[test]
fn test_fifo_ignores_hits() {
    let mut h = TestHarness::single("dl1:1:8:2:f");

    h.read("dl1", 0);
    h.read("dl1", 8);
    h.read("dl1", 0);
    h.read("dl1", 16); // evicts 0, the first filled

    let cache = h.hierarchy.cache_by_name("dl1").unwrap();
    assert!(!cache.probe(0));
    assert!(cache.probe(8));
    assert!(cache.probe(16));
}

#[test]
fn test_invalidate_counts_and_forces_miss() {
    let mut h = TestHarness::single("dl1:256:8:1:l");

    h.read("dl1", 0x100);
    assert_eq!(h.hierarchy.invalidate("dl1", 0x100), Ok(true));
    assert_eq!(h.hierarchy.invalidate("dl1", 0x100), Ok(false));
    h.read("dl1", 0x100);

    let s = h.stats("dl1");
    assert_eq!(s.invalidations, 1);
    assert_eq!(s.misses, 2);
    assert_eq!(s.replacements, 0);
}
