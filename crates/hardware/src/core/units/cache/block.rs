//! Block Store.
//!
//! Each set holds a fixed number of associative ways. A way records the tag
//! of the block it holds, its validity and dirtiness, and a single stamp the
//! replacement policy uses to order ways within the set.

/// One associative slot within a set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Way {
    /// Tag of the resident block.
    pub tag: u64,
    /// Whether the way holds a block.
    pub valid: bool,
    /// Whether the resident block was written since it was filled.
    pub dirty: bool,
    /// Replacement ordering stamp (last touch for LRU, insertion for FIFO).
    pub order: u64,
}

impl Way {
    /// Returns `true` if the way holds a valid block with `tag`.
    #[inline(always)]
    pub fn holds(&self, tag: u64) -> bool {
        self.valid && self.tag == tag
    }
}

/// A group of ways selected by the set-index bits of an address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheSet {
    ways: Vec<Way>,
}

impl CacheSet {
    /// Creates a set of `associativity` invalid ways.
    pub fn new(associativity: usize) -> Self {
        Self {
            ways: vec![Way::default(); associativity],
        }
    }

    /// Index of the valid way holding `tag`, if any.
    #[inline]
    pub fn find(&self, tag: u64) -> Option<usize> {
        self.ways.iter().position(|w| w.holds(tag))
    }

    /// Lowest-indexed invalid way, if any.
    #[inline]
    pub fn first_invalid(&self) -> Option<usize> {
        self.ways.iter().position(|w| !w.valid)
    }

    /// Number of ways in the set.
    pub fn len(&self) -> usize {
        self.ways.len()
    }

    /// Returns `true` if the set has no ways.
    pub fn is_empty(&self) -> bool {
        self.ways.is_empty()
    }

    /// Number of ways currently holding a block.
    pub fn valid_count(&self) -> usize {
        self.ways.iter().filter(|w| w.valid).count()
    }

    /// Shared view of the ways.
    pub fn ways(&self) -> &[Way] {
        &self.ways
    }

    /// Shared access to a single way.
    pub fn way(&self, index: usize) -> &Way {
        &self.ways[index]
    }

    /// Mutable access to a single way.
    pub fn way_mut(&mut self, index: usize) -> &mut Way {
        &mut self.ways[index]
    }
}
