//! Replacement Policies.
//!
//! A policy decides which way of a set to evict on a miss and keeps the
//! per-way ordering stamps current on every access. Policies never touch tags
//! or validity; the access engine owns those.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::block::CacheSet;
use crate::common::{ConfigError, Tick};

pub use self::fifo::FifoPolicy;
pub use self::lru::LruPolicy;
pub use self::random::RandomPolicy;

mod fifo;
mod lru;
mod random;

/// Victim selection and ordering update for one cache.
pub trait ReplacementPolicy {
    /// Picks the way to evict from `set`.
    fn select_victim(&mut self, set: &CacheSet) -> usize;

    /// Records an access to `way`, either a hit or the fill after a miss.
    fn on_access(&mut self, set: &mut CacheSet, way: usize, is_hit: bool, now: Tick);
}

/// Replacement policy selector, written `l`, `f` or `r` in cache specs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReplacementKind {
    /// Least recently used.
    Lru,
    /// First in, first out.
    Fifo,
    /// Uniformly random victim.
    Random,
}

impl ReplacementKind {
    /// Maps a policy character to its kind.
    pub fn from_char(c: char) -> Result<Self, ConfigError> {
        match c {
            'l' | 'L' => Ok(ReplacementKind::Lru),
            'f' | 'F' => Ok(ReplacementKind::Fifo),
            'r' | 'R' => Ok(ReplacementKind::Random),
            other => Err(ConfigError::UnknownPolicy(other)),
        }
    }

    /// The character used for this policy in cache specs.
    pub fn as_char(self) -> char {
        match self {
            ReplacementKind::Lru => 'l',
            ReplacementKind::Fifo => 'f',
            ReplacementKind::Random => 'r',
        }
    }

    /// Builds a fresh policy instance. `seed` is only used by Random.
    pub fn build(self, seed: u64) -> Box<dyn ReplacementPolicy> {
        match self {
            ReplacementKind::Lru => Box::new(LruPolicy::new()),
            ReplacementKind::Fifo => Box::new(FifoPolicy::new()),
            ReplacementKind::Random => Box::new(RandomPolicy::new(seed)),
        }
    }
}

impl FromStr for ReplacementKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c),
            _ => Err(ConfigError::UnknownPolicy(s.chars().next().unwrap_or(' '))),
        }
    }
}

impl fmt::Display for ReplacementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplacementKind::Lru => write!(f, "LRU"),
            ReplacementKind::Fifo => write!(f, "FIFO"),
            ReplacementKind::Random => write!(f, "Random"),
        }
    }
}

/// Lowest-indexed invalid way, else the valid way with the smallest stamp.
///
/// Shared by the stamp-ordered policies (LRU and FIFO).
fn oldest_way(set: &CacheSet) -> usize {
    if let Some(way) = set.first_invalid() {
        return way;
    }
    set.ways()
        .iter()
        .enumerate()
        .min_by_key(|(_, w)| w.order)
        .map(|(i, _)| i)
        .unwrap_or(0)
}
