//! Hierarchy-level components.
//!
//! The bus resource each cache owns, the link through which a cache reaches
//! its next level, the terminal memory models, and the builder that wires
//! caches into a hierarchy.

/// Hierarchy construction and entry points.
pub mod builder;

/// Serialized bus resource model.
pub mod bus;

/// Next-level delegation capability.
pub mod link;

/// Terminal memory timing.
pub mod memory;

pub use builder::{BuildOptions, Hierarchy, LevelDef, Target};
pub use link::{CacheId, HierarchyLink, MainMemory, NextLevel};
