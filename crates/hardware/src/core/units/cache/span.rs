//! Block span handling.
//!
//! A single cache request must stay inside one block. This module detects
//! references that cross a block boundary and splits them into per-block
//! pieces for callers (such as trace replay) that issue wide references.

use crate::common::Addr;

/// Checks whether a reference at `addr` with `size` bytes crosses a block
/// boundary.
///
/// # Arguments
///
/// * `addr` - The byte address of the reference.
/// * `size` - The reference width in bytes.
/// * `block_size` - The block size in bytes (a power of two).
///
/// # Returns
///
/// `true` if the reference starts in one block and ends in another.
pub fn crosses_block(addr: Addr, size: u64, block_size: u64) -> bool {
    size > block_size - (addr & (block_size - 1))
}

/// One per-block piece of a wider reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockPiece {
    /// First byte of the piece.
    pub addr: Addr,
    /// Bytes in the piece; never crosses a block boundary.
    pub size: u64,
}

/// Splits `[addr, addr + size)` into pieces that each stay inside one block.
///
/// A zero-sized reference yields a single empty piece at `addr`, so callers
/// still issue exactly one request for it.
pub fn split_blocks(addr: Addr, size: u64, block_size: u64) -> Vec<BlockPiece> {
    if !crosses_block(addr, size, block_size) {
        return vec![BlockPiece { addr, size }];
    }

    let mut pieces = Vec::new();
    let mut cursor = addr;
    let mut remaining = size;
    while remaining > 0 {
        let to_boundary = block_size - (cursor & (block_size - 1));
        let len = remaining.min(to_boundary);
        pieces.push(BlockPiece {
            addr: cursor,
            size: len,
        });
        cursor = cursor.wrapping_add(len);
        remaining -= len;
    }
    pieces
}
