//! # Cache Unit Tests
//!
//! Geometry decoding, replacement laws and access-engine invariants, checked
//! against single caches backed by fixed-latency memory.

/// Geometry validation and address decoding.
pub mod geometry;

/// Replacement-policy laws.
pub mod policies;
