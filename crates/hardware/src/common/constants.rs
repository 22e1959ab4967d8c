//! Simulator-wide constants.

/// Width of a simulated address in bits.
pub const ADDRESS_BITS: u32 = u64::BITS;

/// Size of an instruction fetch in bytes (32-bit instruction words).
pub const INSTRUCTION_SIZE: u64 = 4;

/// Default reference size when a trace line omits it.
pub const DEFAULT_REF_SIZE: u64 = 4;

/// Largest reference size a trace line may carry, in bytes.
pub const MAX_REF_SIZE: u64 = 4096;

/// Hit latency used when none is configured.
pub const DEFAULT_HIT_LATENCY: u64 = 1;

/// Latency returned by the terminal memory level when none is configured.
pub const DEFAULT_MEMORY_LATENCY: u64 = 1;

/// Seed for Random replacement when none is configured.
pub const DEFAULT_RANDOM_SEED: u64 = 123_456_789;
