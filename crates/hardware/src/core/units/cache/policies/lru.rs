//! Least Recently Used (LRU) Replacement Policy.
//!
//! Every access, hit or fill, stamps the touched way with the next value of a
//! strictly increasing sequence counter. The victim is an invalid way if one
//! exists, otherwise the way with the smallest stamp.

use super::{ReplacementPolicy, oldest_way};
use crate::common::Tick;
use crate::core::units::cache::block::CacheSet;

/// LRU policy state.
#[derive(Debug, Default)]
pub struct LruPolicy {
    /// Last stamp handed out. Shared by all sets of the cache.
    sequence: u64,
}

impl LruPolicy {
    /// Creates a new LRU policy instance.
    pub fn new() -> Self {
        Self { sequence: 0 }
    }
}

impl ReplacementPolicy for LruPolicy {
    fn select_victim(&mut self, set: &CacheSet) -> usize {
        oldest_way(set)
    }

    /// Moves `way` to the most recently used position.
    fn on_access(&mut self, set: &mut CacheSet, way: usize, _is_hit: bool, _now: Tick) {
        self.sequence += 1;
        set.way_mut(way).order = self.sequence;
    }
}
