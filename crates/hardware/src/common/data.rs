//! Memory Reference Types.
//!
//! This module defines the commands and requests that flow through the
//! access engine. A request is a single reference against a single block;
//! wider spans are split by the caller before reaching a cache.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::CacheError;

/// A simulated address.
pub type Addr = u64;

/// A simulated clock value, supplied by the caller.
pub type Tick = u64;

/// Cache access command.
///
/// Only reads and writes exist at the engine level. Raw command values coming
/// from traces or foreign callers are converted with [`Command::try_from`] or
/// [`str::parse`], which reject anything else with
/// [`CacheError::InvalidCommand`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// Load a block (or part of one) from the cache.
    Read,
    /// Store into a block; the block becomes dirty.
    Write,
}

impl Command {
    /// Returns `true` for [`Command::Write`].
    #[inline(always)]
    pub fn is_write(self) -> bool {
        matches!(self, Command::Write)
    }
}

impl TryFrom<u32> for Command {
    type Error = CacheError;

    /// Converts the raw encoding used by block-access callbacks
    /// (`0` = read, `1` = write).
    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Command::Read),
            1 => Ok(Command::Write),
            other => Err(CacheError::InvalidCommand(other.to_string())),
        }
    }
}

impl FromStr for Command {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "r" | "read" => Ok(Command::Read),
            "w" | "write" => Ok(Command::Write),
            other => Err(CacheError::InvalidCommand(other.to_string())),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Read => write!(f, "Read"),
            Command::Write => write!(f, "Write"),
        }
    }
}

/// A single memory reference presented to a cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccessRequest {
    /// Read or write.
    pub command: Command,
    /// First byte referenced.
    pub addr: Addr,
    /// Number of bytes referenced; `[addr, addr + size)` must stay in one block.
    pub size: u64,
    /// Current simulated time.
    pub now: Tick,
}

impl AccessRequest {
    /// Creates a new request.
    pub fn new(command: Command, addr: Addr, size: u64, now: Tick) -> Self {
        Self {
            command,
            addr,
            size,
            now,
        }
    }

    /// Shorthand for a read request.
    pub fn read(addr: Addr, size: u64, now: Tick) -> Self {
        Self::new(Command::Read, addr, size, now)
    }

    /// Shorthand for a write request.
    pub fn write(addr: Addr, size: u64, now: Tick) -> Self {
        Self::new(Command::Write, addr, size, now)
    }
}
