//! Random Replacement Policy.
//!
//! Victims are drawn uniformly over every way of the set, valid or not, from a
//! xorshift generator owned by the policy. The generator is seeded when the
//! cache is created, so identical reference streams evict identically.

use super::ReplacementPolicy;
use crate::common::Tick;
use crate::common::constants::DEFAULT_RANDOM_SEED;
use crate::core::units::cache::block::CacheSet;

/// Random policy state.
#[derive(Debug)]
pub struct RandomPolicy {
    state: u64,
}

impl RandomPolicy {
    /// Creates a policy seeded with `seed`. A zero seed would lock xorshift at
    /// zero and is replaced by the default seed.
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { DEFAULT_RANDOM_SEED } else { seed },
        }
    }

    fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

impl ReplacementPolicy for RandomPolicy {
    fn select_victim(&mut self, set: &CacheSet) -> usize {
        (self.next() % set.len() as u64) as usize
    }

    fn on_access(&mut self, _set: &mut CacheSet, _way: usize, _is_hit: bool, _now: Tick) {}
}
