//! Cache core: geometry, block store, replacement and the access engine.

/// Functional units of the simulated memory system.
pub mod units;

pub use self::units::cache::CacheInstance;
