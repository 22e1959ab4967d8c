use simcache::common::AccessRequest;
use simcache::soc::MainMemory;
use simcache::soc::bus::Bus;
use simcache::CacheInstance;

#[test]
fn test_back_to_back_transfers_queue() {
    let mut bus = Bus::new(4);
    assert_eq!(bus.arbitrate(0), 4);
    assert_eq!(bus.arbitrate(1), 7);
    assert_eq!(bus.arbitrate(20), 4);
    assert_eq!(bus.free_tick(), 24);
}

#[test]
fn test_bus_delay_added_to_latency() {
    let mut cache = CacheInstance::from_spec("b:16:32:1:l", 1, 1)
        .unwrap()
        .with_bus(Bus::new(2));
    let mut memory = MainMemory::fixed(5);

    assert_eq!(cache.access(&AccessRequest::read(0, 4, 0), &mut memory), Ok(7));
    // Issued while the bus is still busy until tick 2
    assert_eq!(cache.access(&AccessRequest::read(0, 4, 1), &mut memory), Ok(1 + 3));
    assert_eq!(cache.stats().accesses, 2);
}
