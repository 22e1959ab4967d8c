//! First-In First-Out (FIFO) Replacement Policy.
//!
//! Ways are stamped once, when a block is filled into them. Hits leave the
//! stamp alone, so the oldest insertion is evicted regardless of reuse.

use super::{ReplacementPolicy, oldest_way};
use crate::common::Tick;
use crate::core::units::cache::block::CacheSet;

/// FIFO policy state.
#[derive(Debug, Default)]
pub struct FifoPolicy {
    inserted: u64,
}

impl FifoPolicy {
    /// Creates a new FIFO policy instance.
    pub fn new() -> Self {
        Self { inserted: 0 }
    }
}

impl ReplacementPolicy for FifoPolicy {
    fn select_victim(&mut self, set: &CacheSet) -> usize {
        oldest_way(set)
    }

    fn on_access(&mut self, set: &mut CacheSet, way: usize, is_hit: bool, _now: Tick) {
        if is_hit {
            return;
        }
        self.inserted += 1;
        set.way_mut(way).order = self.inserted;
    }
}
