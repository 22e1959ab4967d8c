use rstest::rstest;
use simcache::common::AccessRequest;
use simcache::core::units::cache::policies::ReplacementKind;
use simcache::soc::MainMemory;
use simcache::CacheInstance;

fn read(cache: &mut CacheInstance, memory: &mut MainMemory, addr: u64) {
    cache
        .access(&AccessRequest::read(addr, 4, 0), memory)
        .unwrap();
}

/// With one way per set every policy degenerates to direct mapping: a block
/// is resident exactly when it was the last one referenced in its set.
#[rstest]
#[case::lru('l')]
#[case::fifo('f')]
#[case::random('r')]
fn test_direct_mapped_law(#[case] policy: char) {
    let spec = format!("dm:16:16:1:{}", policy);
    let mut cache = CacheInstance::from_spec(&spec, 1, 7).unwrap();
    let mut memory = MainMemory::fixed(1);

    let stream = [0x000, 0x100, 0x010, 0x100, 0x200, 0x110, 0x010, 0x200];
    for (i, &addr) in stream.iter().enumerate() {
        read(&mut cache, &mut memory, addr);
        for &other in &stream[..=i] {
            let set = (other >> 4) & 0xf;
            let last_in_set = stream[..=i]
                .iter()
                .rev()
                .find(|&&a| (a >> 4) & 0xf == set)
                .copied();
            assert_eq!(cache.probe(other), last_in_set == Some(other), "addr {:#x}", other);
        }
    }
    assert_eq!(cache.stats().misses, 6);
    assert_eq!(cache.stats().hits, 2);
}

#[rstest]
#[case::lru("l", ReplacementKind::Lru)]
#[case::fifo("f", ReplacementKind::Fifo)]
#[case::random("R", ReplacementKind::Random)]
fn test_policy_characters(#[case] text: &str, #[case] kind: ReplacementKind) {
    assert_eq!(text.parse::<ReplacementKind>(), Ok(kind));
    assert_eq!(kind.as_char().to_string(), text.to_lowercase());
}

#[test]
fn test_empty_ways_fill_before_eviction() {
    for policy in ['l', 'f'] {
        let mut cache = CacheInstance::from_spec(&format!("c:1:8:4:{}", policy), 1, 1).unwrap();
        let mut memory = MainMemory::fixed(1);
        for addr in [0, 8, 16, 24] {
            read(&mut cache, &mut memory, addr);
        }
        assert_eq!(cache.stats().replacements, 0);
        assert_eq!(cache.sets()[0].valid_count(), 4);
    }
}

#[test]
fn test_random_is_deterministic_per_seed() {
    let stream: Vec<u64> = (0..400u64).map(|i| (i * 37 % 23) * 8).collect();

    let run = |seed: u64| {
        let mut cache = CacheInstance::from_spec("r4:2:8:4:r", 1, seed).unwrap();
        let mut memory = MainMemory::fixed(1);
        let mut residency = Vec::new();
        for &addr in &stream {
            read(&mut cache, &mut memory, addr);
            let snapshot: Vec<(bool, u64)> = cache
                .sets()
                .iter()
                .flat_map(|s| s.ways().iter().map(|w| (w.valid, w.tag)))
                .collect();
            residency.push(snapshot);
        }
        (*cache.stats(), residency)
    };

    let (stats_a, trail_a) = run(99);
    let (stats_b, trail_b) = run(99);
    assert_eq!(stats_a, stats_b);
    assert_eq!(trail_a, trail_b);
    assert!(stats_a.replacements > 0);
}
