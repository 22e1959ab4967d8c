//! Memory Timing Controller.
//!
//! This module defines the `MemoryController` trait and the models used for
//! the terminal level of a cache hierarchy. The simple model charges a fixed
//! latency per block transfer; the DRAM model accounts for row buffer
//! locality.

use crate::common::{Addr, Command};

/// Trait for memory controller implementations.
pub trait MemoryController {
    /// Calculates the latency for a block transfer at a specific address.
    ///
    /// # Arguments
    ///
    /// * `command` - Whether the block is read or written back.
    /// * `addr` - The block address being transferred.
    ///
    /// # Returns
    ///
    /// The latency in ticks.
    fn access_latency(&mut self, command: Command, addr: Addr) -> u64;
}

/// A memory controller with fixed latency.
///
/// Models an ideal memory where every transfer takes a constant amount of time.
#[derive(Debug)]
pub struct SimpleController {
    latency: u64,
}

impl SimpleController {
    /// Creates a new SimpleController.
    ///
    /// # Arguments
    ///
    /// * `latency` - The fixed latency in ticks.
    pub fn new(latency: u64) -> Self {
        Self { latency }
    }
}

impl MemoryController for SimpleController {
    fn access_latency(&mut self, _command: Command, _addr: Addr) -> u64 {
        self.latency
    }
}

/// A DRAM-aware memory controller.
///
/// Tracks the currently open row of a single bank. Row buffer hits pay only
/// `t_cas`; a closed bank pays `t_ras + t_cas`; a conflict with another open
/// row additionally pays `t_pre`.
#[derive(Debug)]
pub struct DramController {
    last_row: Option<Addr>,
    t_cas: u64,
    t_ras: u64,
    t_pre: u64,
    row_mask: Addr,
}

impl DramController {
    /// Row size assumed by the model (2 KiB).
    pub const ROW_BYTES: u64 = 2048;

    /// Creates a new DramController.
    ///
    /// # Arguments
    ///
    /// * `t_cas` - CAS latency.
    /// * `t_ras` - RAS latency.
    /// * `t_pre` - Precharge latency.
    pub fn new(t_cas: u64, t_ras: u64, t_pre: u64) -> Self {
        Self {
            last_row: None,
            t_cas,
            t_ras,
            t_pre,
            row_mask: !(Self::ROW_BYTES - 1),
        }
    }
}

impl MemoryController for DramController {
    fn access_latency(&mut self, _command: Command, addr: Addr) -> u64 {
        let row = addr & self.row_mask;

        match self.last_row {
            Some(open_row) if open_row == row => self.t_cas,
            Some(_) => {
                self.last_row = Some(row);
                self.t_pre + self.t_ras + self.t_cas
            }
            None => {
                self.last_row = Some(row);
                self.t_ras + self.t_cas
            }
        }
    }
}
