//! Hierarchy Link.
//!
//! A cache resolves its misses and write-backs through a link to exactly one
//! next level. The link is a capability: given a command, a block address, a
//! block size and the current tick it returns a latency. The terminal variant
//! is main memory; the next-level-cache variant lives in the hierarchy builder,
//! where it recursively runs the lower cache's access engine.

use crate::common::{Addr, CacheError, Command, Tick};
use crate::soc::memory::{MemoryController, SimpleController};

/// Delegation of a block transfer to the next level of the hierarchy.
#[cfg_attr(test, mockall::automock)]
pub trait HierarchyLink {
    /// Transfers the block at `block_addr` and returns its latency in ticks.
    fn delegate(
        &mut self,
        command: Command,
        block_addr: Addr,
        block_size: u64,
        now: Tick,
    ) -> Result<u64, CacheError>;
}

/// Terminal level of a hierarchy.
pub struct MainMemory {
    controller: Box<dyn MemoryController>,
    /// Block transfers served.
    pub transfers: u64,
}

impl MainMemory {
    /// Wraps a memory timing controller.
    pub fn new(controller: Box<dyn MemoryController>) -> Self {
        Self {
            controller,
            transfers: 0,
        }
    }

    /// Memory with a fixed latency per block transfer.
    pub fn fixed(latency: u64) -> Self {
        Self::new(Box::new(SimpleController::new(latency)))
    }
}

impl HierarchyLink for MainMemory {
    fn delegate(
        &mut self,
        command: Command,
        block_addr: Addr,
        _block_size: u64,
        _now: Tick,
    ) -> Result<u64, CacheError> {
        self.transfers += 1;
        Ok(self.controller.access_latency(command, block_addr))
    }
}

impl std::fmt::Debug for MainMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MainMemory")
            .field("transfers", &self.transfers)
            .finish_non_exhaustive()
    }
}

/// Handle of a cache instance inside a [`Hierarchy`](crate::soc::Hierarchy).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheId(pub usize);

/// Where a cache sends its misses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NextLevel {
    /// The cache is the last level; misses go to main memory.
    #[default]
    Memory,
    /// Misses go to another cache instance of the same hierarchy.
    Cache(CacheId),
}
