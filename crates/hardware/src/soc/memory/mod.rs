//! Terminal memory models.

/// Memory timing controllers.
pub mod controller;

pub use controller::{DramController, MemoryController, SimpleController};
