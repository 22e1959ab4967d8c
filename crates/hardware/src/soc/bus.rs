//! Bus Resource Model.
//!
//! Each cache owns one serialized transfer resource. Every access occupies it
//! for `transfer_cost` ticks starting no earlier than the access itself, and the
//! access is charged for the time until the resource is free again.

use crate::common::Tick;

/// A single serialized transfer resource.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bus {
    /// Ticks one transfer holds the bus.
    pub transfer_cost: u64,
    /// First tick at which the bus is free.
    free_tick: Tick,
}

impl Bus {
    /// Creates a bus with a fixed per-access transfer cost.
    pub fn new(transfer_cost: u64) -> Self {
        Self {
            transfer_cost,
            free_tick: 0,
        }
    }

    /// Creates a bus whose transfer cost is derived from its width and base
    /// latency for moving `bytes` per access.
    ///
    /// # Arguments
    ///
    /// * `width_bytes` - Bytes moved per bus beat.
    /// * `latency_cycles` - Base latency of a transaction.
    /// * `bytes` - Bytes moved per access (normally the block size).
    pub fn with_width(width_bytes: u64, latency_cycles: u64, bytes: u64) -> Self {
        Self::new(calculate_transit_time(width_bytes, latency_cycles, bytes))
    }

    /// Reserves the bus for one transfer issued at `now` and returns the delay
    /// charged to the access, `free_tick - now` after the reservation.
    pub fn arbitrate(&mut self, now: Tick) -> u64 {
        self.free_tick = self.free_tick.max(now) + self.transfer_cost;
        self.free_tick.saturating_sub(now)
    }

    /// First tick at which the bus is free.
    pub fn free_tick(&self) -> Tick {
        self.free_tick
    }
}

/// Cycles needed to move `bytes` over a bus `width_bytes` wide.
pub fn calculate_transit_time(width_bytes: u64, latency_cycles: u64, bytes: u64) -> u64 {
    let width = width_bytes.max(1);
    latency_cycles + bytes.div_ceil(width)
}
