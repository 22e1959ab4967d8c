use proptest::prelude::*;
use rstest::rstest;
use simcache::common::ConfigError;
use simcache::core::units::cache::geometry::CacheGeometry;

#[rstest]
#[case(3, 32, 1, ConfigError::NotPowerOfTwo { what: "nsets", value: 3 })]
#[case(0, 32, 1, ConfigError::NotPowerOfTwo { what: "nsets", value: 0 })]
#[case(64, 48, 2, ConfigError::NotPowerOfTwo { what: "block size", value: 48 })]
#[case(64, 32, 0, ConfigError::ZeroAssociativity)]
#[case(1 << 40, 1 << 30, 1, ConfigError::AddressOverflow { bits: 70 })]
fn test_invalid_geometry(
    #[case] nsets: usize,
    #[case] block_size: u64,
    #[case] assoc: usize,
    #[case] expected: ConfigError,
) {
    assert_eq!(CacheGeometry::resolve(nsets, block_size, assoc, 1), Err(expected));
}

#[test]
fn test_capacity() {
    let g = CacheGeometry::resolve(1024, 64, 4, 1).unwrap();
    assert_eq!(g.capacity(), 256 * 1024);
    assert_eq!(g.tagset_mask, !63);
}

fn geometry() -> impl Strategy<Value = CacheGeometry> {
    (0u32..12, 0u32..8, 1usize..8).prop_map(|(set_bits, block_bits, assoc)| {
        CacheGeometry::resolve(1 << set_bits, 1 << block_bits, assoc, 1).unwrap()
    })
}

proptest! {
    #[test]
    fn decode_is_stable_within_a_block(g in geometry(), addr in any::<u64>()) {
        let d = g.decode(addr);
        let base = g.decode(g.block_addr(addr));

        prop_assert_eq!(d.tag, base.tag);
        prop_assert_eq!(d.set, base.set);
        prop_assert_eq!(d.tagset, base.tagset);
        prop_assert_eq!(base.offset, 0);
        prop_assert!(d.set < g.nsets);
        prop_assert_eq!(d.tagset | d.offset, addr);
        prop_assert_eq!(g.make_block_addr(d.tag, d.set), d.tagset);
    }
}
