//! Reference-stream loading and replay.
//!
//! Handles reading traces from disk and feeding them, in program order,
//! through a cache hierarchy.

/// Replay driver.
pub mod replay;

/// Trace file formats.
pub mod trace;

pub use replay::{ReplaySummary, Replayer};
pub use trace::{RefKind, TraceError, TraceRef, load_trace, parse_trace};
