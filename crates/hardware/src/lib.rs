//! Set-associative cache hierarchy simulator.
//!
//! Models a configurable hierarchy of set-associative caches in front of main
//! memory. Each reference is classified as a hit or a miss, misses are chained
//! to the next level, and per-cache counters are accumulated for reporting.
//!
//! # Layout
//!
//! - [`common`]: shared address, command and error types.
//! - [`config`]: serde configuration and cache spec strings.
//! - [`core`]: the cache units (geometry, sets, replacement policies, access engine).
//! - [`soc`]: bus model, hierarchy link, memory controllers and the hierarchy builder.
//! - [`sim`]: trace loading and replay.
//! - [`stats`]: counters, the statistics registry and report formatting.

/// Shared types, constants and errors.
pub mod common;

/// Simulator configuration.
pub mod config;

/// Cache units.
pub mod core;

/// Trace loading and replay.
pub mod sim;

/// Hierarchy wiring and main memory.
pub mod soc;

/// Statistics collection and reporting.
pub mod stats;

pub use crate::common::{AccessRequest, Addr, CacheError, Command, ConfigError, Tick};
pub use crate::config::Config;
pub use crate::core::CacheInstance;
pub use crate::soc::Hierarchy;
