//! Functional units.

/// Set-associative cache.
pub mod cache;
