//! Error Types.
//!
//! Configuration errors are fatal at creation time: the cache or hierarchy is
//! never constructed. Access errors are fatal to the single call that raised
//! them and leave cache state untouched. Misses, write-backs and
//! invalidations are normal operation and never surface here.

use std::fmt;

use super::data::Addr;

/// Invalid cache or hierarchy configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A size parameter that must be a power of two is not.
    NotPowerOfTwo {
        /// Which parameter (`nsets`, `block size`, ...).
        what: &'static str,
        /// The offending value.
        value: u64,
    },
    /// Associativity below one.
    ZeroAssociativity,
    /// Set-index and block-offset bits together exceed the address width.
    AddressOverflow {
        /// Bits consumed by set index plus block offset.
        bits: u32,
    },
    /// Replacement-policy character other than `l`, `f` or `r`.
    UnknownPolicy(char),
    /// A cache spec string that does not follow `<name>:<nsets>:<bsize>:<assoc>:<repl>`.
    MalformedSpec(String),
    /// Reference to a level that was never declared.
    UnknownLevel(String),
    /// Hierarchy wiring that loops back on itself; holds the offending path.
    Cycle(Vec<String>),
    /// Alias onto a level this entry point may not share.
    InvalidAlias {
        /// Level carrying the alias.
        level: String,
        /// Level it tried to alias.
        target: String,
    },
    /// A lower level was configured without the upper level it sits under.
    MissingUpperLevel {
        /// Level that is configured.
        level: String,
        /// Level it requires.
        requires: String,
    },
    /// A next-level cache with blocks smaller than the level above it.
    BlockSizeMismatch {
        /// Name of the upper cache.
        upper: String,
        /// Name of the lower cache.
        lower: String,
    },
    /// Configuration file could not be read.
    Io(String),
    /// Configuration file could not be parsed.
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NotPowerOfTwo { what, value } => {
                write!(f, "{} must be a positive power of two, got {}", what, value)
            }
            ConfigError::ZeroAssociativity => write!(f, "cache associativity must be at least 1"),
            ConfigError::AddressOverflow { bits } => write!(
                f,
                "set index and block offset need {} bits, more than an address holds",
                bits
            ),
            ConfigError::UnknownPolicy(c) => write!(f, "unrecognized replacement policy `{}`", c),
            ConfigError::MalformedSpec(s) => write!(
                f,
                "bad cache parms `{}`, expected <name>:<nsets>:<bsize>:<assoc>:<repl>",
                s
            ),
            ConfigError::UnknownLevel(name) => write!(f, "unknown cache level `{}`", name),
            ConfigError::Cycle(path) => {
                write!(f, "cache hierarchy contains a cycle: {}", path.join(" -> "))
            }
            ConfigError::InvalidAlias { level, target } => {
                write!(f, "level `{}` cannot be aliased onto `{}`", level, target)
            }
            ConfigError::MissingUpperLevel { level, requires } => {
                write!(f, "level `{}` is defined but `{}` is not", level, requires)
            }
            ConfigError::BlockSizeMismatch { upper, lower } => write!(
                f,
                "block size of `{}` must be at least the block size of `{}`",
                lower, upper
            ),
            ConfigError::Io(msg) => write!(f, "cannot read configuration: {}", msg),
            ConfigError::Parse(msg) => write!(f, "cannot parse configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Error raised by a cache access or a hierarchy operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheError {
    /// The cache or hierarchy could not be built.
    Configuration(ConfigError),
    /// A raw command that is neither a read nor a write.
    InvalidCommand(String),
    /// A reference whose span crosses a block boundary.
    MisalignedAccess {
        /// First byte of the reference.
        addr: Addr,
        /// Size of the reference in bytes.
        size: u64,
        /// Block size of the cache that rejected it.
        block_size: u64,
    },
    /// An entry point name the hierarchy does not know.
    UnknownEntry(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::Configuration(e) => write!(f, "configuration error: {}", e),
            CacheError::InvalidCommand(raw) => {
                write!(f, "invalid cache command `{}`, expected Read or Write", raw)
            }
            CacheError::MisalignedAccess {
                addr,
                size,
                block_size,
            } => write!(
                f,
                "access of {} bytes at {:#x} crosses a {}-byte block boundary",
                size, addr, block_size
            ),
            CacheError::UnknownEntry(name) => write!(f, "unknown hierarchy entry `{}`", name),
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CacheError::Configuration(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for CacheError {
    fn from(e: ConfigError) -> Self {
        CacheError::Configuration(e)
    }
}
