//! Integration tests: whole hierarchies driven by reference streams.


/// Hit/miss sequences on a single cache.
pub mod scenarios;


/// Trace files replayed through the standard hierarchy.
pub mod replay;
