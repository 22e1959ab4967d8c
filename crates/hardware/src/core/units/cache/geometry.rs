//! Cache Geometry.
//!
//! Validates the user-supplied set count, block size and associativity and
//! derives the masks and shifts that split an address into
//! `(tag, set index, block offset)`. The decomposition is computed once when a
//! cache is created and is the only place address bits are interpreted.

use std::fmt;

use crate::common::constants::ADDRESS_BITS;
use crate::common::{Addr, ConfigError};

/// An address split into its cache coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DecodedAddr {
    /// High-order bits identifying the block within its set.
    pub tag: u64,
    /// Index of the set the block maps to.
    pub set: usize,
    /// Byte offset within the block.
    pub offset: u64,
    /// Address with the block offset cleared (tag and set index combined).
    pub tagset: Addr,
}

/// Immutable addressing constants for one cache.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheGeometry {
    /// Number of sets (power of two).
    pub nsets: usize,
    /// Block size in bytes (power of two).
    pub block_size: u64,
    /// Ways per set.
    pub associativity: usize,
    /// Ticks charged on a hit.
    pub hit_latency: u64,
    /// log2(nsets).
    pub set_index_bits: u32,
    /// log2(block_size).
    pub block_offset_bits: u32,
    /// Mask selecting the block offset.
    pub blk_mask: Addr,
    /// Shift that brings the set index to bit 0.
    pub set_shift: u32,
    /// Mask applied to the shifted set index.
    pub set_mask: Addr,
    /// Shift that brings the tag to bit 0.
    pub tag_shift: u32,
    /// Mask selecting tag and set index (everything but the block offset).
    pub tagset_mask: Addr,
}

impl CacheGeometry {
    /// Validates the parameters and derives the address decomposition.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when `nsets` or `block_size` is not a power
    /// of two, when `associativity` is zero, or when the set index and block
    /// offset together do not fit in an address.
    pub fn resolve(
        nsets: usize,
        block_size: u64,
        associativity: usize,
        hit_latency: u64,
    ) -> Result<Self, ConfigError> {
        if !nsets.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo {
                what: "nsets",
                value: nsets as u64,
            });
        }
        if !block_size.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo {
                what: "block size",
                value: block_size,
            });
        }
        if associativity < 1 {
            return Err(ConfigError::ZeroAssociativity);
        }

        let block_offset_bits = block_size.trailing_zeros();
        let set_index_bits = nsets.trailing_zeros();
        let bits = block_offset_bits + set_index_bits;
        if bits > ADDRESS_BITS {
            return Err(ConfigError::AddressOverflow { bits });
        }

        let blk_mask = block_size - 1;
        Ok(Self {
            nsets,
            block_size,
            associativity,
            hit_latency,
            set_index_bits,
            block_offset_bits,
            blk_mask,
            set_shift: block_offset_bits,
            set_mask: (nsets as u64) - 1,
            tag_shift: bits,
            tagset_mask: !blk_mask,
        })
    }

    /// Splits `addr` into tag, set index, block offset and tagset.
    #[inline]
    pub fn decode(&self, addr: Addr) -> DecodedAddr {
        DecodedAddr {
            tag: addr.checked_shr(self.tag_shift).unwrap_or(0),
            set: ((addr >> self.set_shift) & self.set_mask) as usize,
            offset: addr & self.blk_mask,
            tagset: addr & self.tagset_mask,
        }
    }

    /// Address of the first byte of the block containing `addr`.
    #[inline]
    pub fn block_addr(&self, addr: Addr) -> Addr {
        addr & self.tagset_mask
    }

    /// Rebuilds a block address from a resident tag and its set index.
    #[inline]
    pub fn make_block_addr(&self, tag: u64, set: usize) -> Addr {
        tag.checked_shl(self.tag_shift).unwrap_or(0) | ((set as u64) << self.set_shift)
    }

    /// Total data capacity in bytes.
    pub fn capacity(&self) -> u64 {
        self.nsets as u64 * self.associativity as u64 * self.block_size
    }
}

impl fmt::Display for CacheGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} sets, {}-byte blocks, {}-way, {} bytes, hit latency {}",
            self.nsets,
            self.block_size,
            self.associativity,
            self.capacity(),
            self.hit_latency
        )
    }
}
