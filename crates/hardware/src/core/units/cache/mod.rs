//! Set-associative cache model and access engine.
//!
//! A [`CacheInstance`] owns its geometry, its sets, a replacement policy, a
//! bus resource and its statistics. Each call to [`CacheInstance::access`]
//! runs one reference to completion: decode, lookup, hit or miss handling
//! (victim selection, write-back and fill through the hierarchy link), policy
//! update, statistics update and latency computation. Fills are always
//! requested from the next level as reads; only write-backs go down as writes.

/// Ways and sets.
pub mod block;

/// Address decomposition.
pub mod geometry;

/// Replacement policies (LRU, FIFO, Random).
pub mod policies;

/// Block-boundary checks and splitting.
pub mod span;

use std::fmt;

use log::{debug, info, trace};

use self::block::{CacheSet, Way};
use self::geometry::{CacheGeometry, DecodedAddr};
use self::policies::{ReplacementKind, ReplacementPolicy};
use self::span::crosses_block;
use crate::common::{AccessRequest, Addr, CacheError, Command, ConfigError, Tick};
use crate::config::CacheParams;
use crate::soc::bus::Bus;
use crate::soc::link::{HierarchyLink, NextLevel};
use crate::stats::StatCounters;

/// Most recently used block, kept to skip the associative scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct LastAccess {
    tagset: Addr,
    way: usize,
}

/// One cache level.
pub struct CacheInstance {
    name: String,
    geometry: CacheGeometry,
    sets: Vec<CacheSet>,
    kind: ReplacementKind,
    policy: Box<dyn ReplacementPolicy>,
    next: NextLevel,
    bus: Bus,
    stats: StatCounters,
    last: Option<LastAccess>,
    fast_path: bool,
}

impl CacheInstance {
    /// Creates an empty cache.
    ///
    /// # Arguments
    ///
    /// * `name` - Name used in reports and logs.
    /// * `geometry` - Resolved geometry.
    /// * `kind` - Replacement policy.
    /// * `seed` - Seed for the Random policy; ignored by the others.
    pub fn new(name: &str, geometry: CacheGeometry, kind: ReplacementKind, seed: u64) -> Self {
        let sets = (0..geometry.nsets)
            .map(|_| CacheSet::new(geometry.associativity))
            .collect();
        let cache = Self {
            name: name.to_string(),
            sets,
            kind,
            policy: kind.build(seed),
            next: NextLevel::Memory,
            bus: Bus::default(),
            stats: StatCounters::default(),
            last: None,
            fast_path: true,
            geometry,
        };
        info!("cache {} created: {}", cache.name, cache);
        cache
    }

    /// Creates a cache from parsed spec parameters.
    pub fn from_params(params: &CacheParams, hit_latency: u64, seed: u64) -> Result<Self, ConfigError> {
        let geometry =
            CacheGeometry::resolve(params.nsets, params.block_size, params.associativity, hit_latency)?;
        Ok(Self::new(&params.name, geometry, params.policy, seed))
    }

    /// Creates a cache from a `<name>:<nsets>:<bsize>:<assoc>:<repl>` string.
    pub fn from_spec(spec: &str, hit_latency: u64, seed: u64) -> Result<Self, ConfigError> {
        let params: CacheParams = spec.parse()?;
        Self::from_params(&params, hit_latency, seed)
    }

    /// Replaces the bus resource of this cache.
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = bus;
        self
    }

    /// Name used in reports.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Addressing constants.
    pub fn geometry(&self) -> &CacheGeometry {
        &self.geometry
    }

    /// Replacement policy selector.
    pub fn policy_kind(&self) -> ReplacementKind {
        self.kind
    }

    /// Live counters.
    pub fn stats(&self) -> &StatCounters {
        &self.stats
    }

    /// All sets, in index order.
    pub fn sets(&self) -> &[CacheSet] {
        &self.sets
    }

    /// Where misses are sent.
    pub fn next_level(&self) -> NextLevel {
        self.next
    }

    pub(crate) fn set_next_level(&mut self, next: NextLevel) {
        self.next = next;
    }

    /// The bus resource of this cache.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Enables or disables the last-access fast path. Outcomes are identical
    /// either way; only the lookup cost changes.
    pub fn set_fast_path(&mut self, enabled: bool) {
        self.fast_path = enabled;
        self.last = None;
    }

    /// Runs one reference through the cache and returns its latency in ticks.
    ///
    /// # Errors
    ///
    /// [`CacheError::MisalignedAccess`] if the reference crosses a block
    /// boundary; errors raised by the next level are passed through. A failed
    /// access leaves the counters and the resident blocks untouched.
    pub fn access(
        &mut self,
        req: &AccessRequest,
        link: &mut dyn HierarchyLink,
    ) -> Result<u64, CacheError> {
        if crosses_block(req.addr, req.size, self.geometry.block_size) {
            return Err(CacheError::MisalignedAccess {
                addr: req.addr,
                size: req.size,
                block_size: self.geometry.block_size,
            });
        }

        let decoded = self.geometry.decode(req.addr);
        let path_latency = match self.lookup(&decoded) {
            Some(way) => self.hit(&decoded, way, req),
            None => self.miss(&decoded, req, link)?,
        };

        let bus_delay = self.bus.arbitrate(req.now);
        self.stats.accesses += 1;
        Ok(path_latency + bus_delay)
    }

    /// Returns `true` if the block holding `addr` is resident. No state changes.
    pub fn probe(&self, addr: Addr) -> bool {
        let d = self.geometry.decode(addr);
        self.sets[d.set].find(d.tag).is_some()
    }

    /// Returns `true` if the block holding `addr` is resident and dirty.
    pub fn is_dirty(&self, addr: Addr) -> bool {
        let d = self.geometry.decode(addr);
        self.sets[d.set]
            .find(d.tag)
            .is_some_and(|way| self.sets[d.set].way(way).dirty)
    }

    /// Drops the block holding `addr` without writing it back.
    ///
    /// Returns `true` and counts an invalidation if the block was resident.
    pub fn invalidate(&mut self, addr: Addr) -> bool {
        let d = self.geometry.decode(addr);
        let Some(way) = self.sets[d.set].find(d.tag) else {
            return false;
        };
        *self.sets[d.set].way_mut(way) = Way::default();
        self.stats.invalidations += 1;
        self.forget(d.tagset);
        debug!("{}: invalidated block {:#x}", self.name, d.tagset);
        true
    }

    /// Writes back (if dirty) and invalidates the block holding `addr`.
    ///
    /// Returns the write-back latency, zero if the block was clean or absent.
    pub fn flush_addr(
        &mut self,
        addr: Addr,
        now: Tick,
        link: &mut dyn HierarchyLink,
    ) -> Result<u64, CacheError> {
        let d = self.geometry.decode(addr);
        let Some(way) = self.sets[d.set].find(d.tag) else {
            return Ok(0);
        };

        let mut latency = 0;
        if self.sets[d.set].way(way).dirty {
            latency = link.delegate(Command::Write, d.tagset, self.geometry.block_size, now)?;
            self.stats.writebacks += 1;
        }
        *self.sets[d.set].way_mut(way) = Way::default();
        self.stats.invalidations += 1;
        self.forget(d.tagset);
        Ok(latency)
    }

    /// Writes back every dirty block and invalidates the whole cache.
    ///
    /// Each resident block counts one invalidation. Returns the accumulated
    /// write-back latency.
    pub fn flush(&mut self, now: Tick, link: &mut dyn HierarchyLink) -> Result<u64, CacheError> {
        let mut latency = 0;
        for set_index in 0..self.sets.len() {
            for way_index in 0..self.geometry.associativity {
                let way = *self.sets[set_index].way(way_index);
                if !way.valid {
                    continue;
                }
                if way.dirty {
                    let baddr = self.geometry.make_block_addr(way.tag, set_index);
                    latency += link.delegate(
                        Command::Write,
                        baddr,
                        self.geometry.block_size,
                        now + latency,
                    )?;
                    self.stats.writebacks += 1;
                }
                *self.sets[set_index].way_mut(way_index) = Way::default();
                self.stats.invalidations += 1;
            }
        }
        self.last = None;
        debug!("{}: flushed, {} ticks of write-back", self.name, latency);
        Ok(latency)
    }

    fn lookup(&mut self, d: &DecodedAddr) -> Option<usize> {
        if self.fast_path {
            if let Some(last) = self.last {
                if last.tagset == d.tagset && self.sets[d.set].way(last.way).holds(d.tag) {
                    return Some(last.way);
                }
                self.last = None;
            }
        }
        self.sets[d.set].find(d.tag)
    }

    fn hit(&mut self, d: &DecodedAddr, way: usize, req: &AccessRequest) -> u64 {
        self.stats.hits += 1;

        let set = &mut self.sets[d.set];
        if req.command.is_write() {
            set.way_mut(way).dirty = true;
        }
        self.policy.on_access(set, way, true, req.now);
        self.last = Some(LastAccess {
            tagset: d.tagset,
            way,
        });

        trace!(
            "{}: {} {:#x} hit set {} way {}",
            self.name, req.command, req.addr, d.set, way
        );
        self.geometry.hit_latency
    }

    fn miss(
        &mut self,
        d: &DecodedAddr,
        req: &AccessRequest,
        link: &mut dyn HierarchyLink,
    ) -> Result<u64, CacheError> {
        let block_size = self.geometry.block_size;
        let victim = self.policy.select_victim(&self.sets[d.set]);
        let evicted = *self.sets[d.set].way(victim);

        let mut latency = 0;
        if evicted.valid && evicted.dirty {
            let victim_addr = self.geometry.make_block_addr(evicted.tag, d.set);
            latency += link.delegate(Command::Write, victim_addr, block_size, req.now)?;
        }
        latency += link.delegate(Command::Read, d.tagset, block_size, req.now + latency)?;

        self.stats.misses += 1;
        if evicted.valid {
            self.stats.replacements += 1;
            if evicted.dirty {
                self.stats.writebacks += 1;
            }
            debug!(
                "{}: evicted block {:#x} from set {} way {}{}",
                self.name,
                self.geometry.make_block_addr(evicted.tag, d.set),
                d.set,
                victim,
                if evicted.dirty { " (written back)" } else { "" }
            );
        }

        let set = &mut self.sets[d.set];
        *set.way_mut(victim) = Way {
            tag: d.tag,
            valid: true,
            dirty: req.command.is_write(),
            order: evicted.order,
        };
        self.policy.on_access(set, victim, false, req.now);
        self.last = Some(LastAccess {
            tagset: d.tagset,
            way: victim,
        });

        trace!(
            "{}: {} {:#x} miss set {} way {}, {} ticks below",
            self.name, req.command, req.addr, d.set, victim, latency
        );
        Ok(latency)
    }

    fn forget(&mut self, tagset: Addr) {
        if self.last.is_some_and(|last| last.tagset == tagset) {
            self.last = None;
        }
    }
}

impl fmt::Display for CacheInstance {
    /// Configuration dump: geometry, policy and bus.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {} replacement", self.geometry, self.kind)?;
        if self.bus.transfer_cost > 0 {
            write!(f, ", bus transfer {} ticks", self.bus.transfer_cost)?;
        }
        Ok(())
    }
}

impl fmt::Debug for CacheInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheInstance")
            .field("name", &self.name)
            .field("geometry", &self.geometry)
            .field("kind", &self.kind)
            .field("next", &self.next)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
