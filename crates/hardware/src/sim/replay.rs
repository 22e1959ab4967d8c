//! Trace replay.
//!
//! Feeds references to a hierarchy strictly in program order. Instruction
//! fetches enter at `il1`, loads and stores at `dl1`. A reference that spans
//! several blocks of the entry cache is issued as one request per block. The
//! clock starts at zero and advances by the latency of every request.

use log::debug;
use serde::Serialize;

use super::trace::TraceRef;
use crate::common::{AccessRequest, CacheError, Tick};
use crate::core::units::cache::span::{BlockPiece, split_blocks};
use crate::soc::{Hierarchy, Target};

/// Totals of a replay run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    /// References replayed.
    pub refs: u64,
    /// Requests issued after block splitting.
    pub requests: u64,
    /// Final clock value.
    pub ticks: Tick,
}

/// Drives a hierarchy with a reference stream.
pub struct Replayer<'h> {
    hierarchy: &'h mut Hierarchy,
    summary: ReplaySummary,
}

impl<'h> Replayer<'h> {
    /// Creates a replayer starting at tick zero.
    pub fn new(hierarchy: &'h mut Hierarchy) -> Self {
        Self {
            hierarchy,
            summary: ReplaySummary::default(),
        }
    }

    /// Current simulated time.
    pub fn now(&self) -> Tick {
        self.summary.ticks
    }

    /// Totals so far.
    pub fn summary(&self) -> ReplaySummary {
        self.summary
    }

    /// Replays one reference and returns its total latency.
    pub fn step(&mut self, r: &TraceRef) -> Result<u64, CacheError> {
        let entry = r.kind.entry();
        let target = self
            .hierarchy
            .entry(entry)
            .ok_or_else(|| CacheError::UnknownEntry(entry.to_string()))?;

        let pieces = match target {
            Target::Cache(id) => {
                let block_size = self
                    .hierarchy
                    .cache(id)
                    .map(|c| c.geometry().block_size)
                    .ok_or_else(|| CacheError::UnknownEntry(entry.to_string()))?;
                split_blocks(r.addr, r.size, block_size)
            }
            Target::Memory => vec![BlockPiece {
                addr: r.addr,
                size: r.size,
            }],
        };

        let mut total = 0;
        for piece in pieces {
            let req = AccessRequest::new(r.kind.command(), piece.addr, piece.size, self.summary.ticks);
            let latency = self.hierarchy.access_target(target, &req)?;
            self.summary.ticks += latency;
            self.summary.requests += 1;
            total += latency;
        }
        self.summary.refs += 1;
        Ok(total)
    }

    /// Replays a whole stream and returns the totals.
    pub fn run(&mut self, refs: &[TraceRef]) -> Result<ReplaySummary, CacheError> {
        for r in refs {
            self.step(r)?;
        }
        debug!(
            "replayed {} references as {} requests in {} ticks",
            self.summary.refs, self.summary.requests, self.summary.ticks
        );
        Ok(self.summary)
    }
}
