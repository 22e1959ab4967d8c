//! Common utilities and types used throughout the cache simulator.
//!
//! This module provides the request types, error taxonomy and shared
//! constants used by the geometry resolver, the access engine and the
//! hierarchy wiring.

/// Shared constants and default parameters.
pub mod constants;

/// Memory reference types (commands, requests, address/tick aliases).
pub mod data;

/// Error types for configuration and access contract violations.
pub mod error;

pub use data::{AccessRequest, Addr, Command, Tick};
pub use error::{CacheError, ConfigError};
