//! Cache Hierarchy Builder.
//!
//! This module defines the [`Hierarchy`] structure, which owns every cache
//! instance and the terminal memory. Wiring is described as an explicit graph
//! of named levels, checked for unknown references and cycles, and resolved
//! once at construction. Instances live in an arena ordered lower levels
//! first, so a cache's next level always sits below it and a miss can borrow
//! the lower part of the arena while the delegating cache is borrowed from the
//! upper part.

use std::collections::HashMap;
use std::io::{self, Write};

use log::info;

use crate::common::{AccessRequest, Addr, CacheError, Command, ConfigError, Tick};
use crate::config::{Config, LevelSpec, MemoryConfig, MemoryControllerKind};
use crate::core::units::cache::CacheInstance;
use crate::soc::bus::Bus;
use crate::soc::link::{CacheId, HierarchyLink, MainMemory, NextLevel};
use crate::soc::memory::{DramController, SimpleController};
use crate::stats::{StatRecord, StatRegistry};

/// One named level of a hierarchy description.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelDef {
    /// Entry-point name (`il1`, `dl2`, ...).
    pub name: String,
    /// What the level holds.
    pub spec: LevelSpec,
    /// Level that receives this level's misses; `None` means main memory.
    pub next: Option<String>,
    /// Hit latency of the cache defined here.
    pub hit_latency: u64,
}

impl LevelDef {
    /// Parses `spec` and builds a level description.
    pub fn new(name: &str, spec: &str, next: Option<&str>, hit_latency: u64) -> Result<Self, ConfigError> {
        Ok(Self {
            name: name.to_string(),
            spec: spec.parse()?,
            next: next.map(str::to_string),
            hit_latency,
        })
    }
}

/// Where an entry point sends its references.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    /// A cache instance.
    Cache(CacheId),
    /// No cache on the path; straight to memory.
    Memory,
}

impl From<Target> for NextLevel {
    fn from(target: Target) -> Self {
        match target {
            Target::Cache(id) => NextLevel::Cache(id),
            Target::Memory => NextLevel::Memory,
        }
    }
}

/// Options applied to every instance created by the builder.
#[derive(Clone, Debug, Default)]
pub struct BuildOptions {
    /// Seed for Random replacement.
    pub seed: u64,
    /// Bus width and base latency; `None` leaves buses free of cost.
    pub bus: Option<(u64, u64)>,
}

/// A cache hierarchy: instances, entry points, memory and statistics.
pub struct Hierarchy {
    caches: Vec<CacheInstance>,
    entries: Vec<(String, Target)>,
    memory: MainMemory,
    stats: StatRegistry,
}

impl Hierarchy {
    /// Builds a hierarchy from level descriptions.
    ///
    /// # Errors
    ///
    /// * [`ConfigError::UnknownLevel`] - a `next` or alias names an undeclared level.
    /// * [`ConfigError::Cycle`] - the wiring loops.
    /// * [`ConfigError::BlockSizeMismatch`] - a next level has smaller blocks.
    /// * Any geometry error of an individual cache.
    pub fn build(levels: &[LevelDef], memory: MainMemory, options: &BuildOptions) -> Result<Self, ConfigError> {
        let mut index = HashMap::new();
        for (i, level) in levels.iter().enumerate() {
            if index.insert(level.name.as_str(), i).is_some() {
                return Err(ConfigError::MalformedSpec(format!("duplicate level `{}`", level.name)));
            }
        }

        let edges = levels
            .iter()
            .map(|level| {
                let target = match &level.spec {
                    LevelSpec::Alias(target) => Some(target),
                    _ => level.next.as_ref(),
                };
                target
                    .map(|name| {
                        index
                            .get(name.as_str())
                            .copied()
                            .ok_or_else(|| ConfigError::UnknownLevel(name.clone()))
                    })
                    .transpose()
            })
            .collect::<Result<Vec<_>, _>>()?;

        check_acyclic(levels, &edges)?;

        let mut resolver = Resolver {
            levels,
            edges: &edges,
            resolved: vec![None; levels.len()],
            caches: Vec::new(),
            options,
        };
        let mut entries = Vec::with_capacity(levels.len());
        for (i, level) in levels.iter().enumerate() {
            entries.push((level.name.clone(), resolver.resolve(i)?));
        }

        let mut stats = StatRegistry::new();
        for (level, (_, target)) in levels.iter().zip(&entries) {
            if let (LevelSpec::Cache(_), Target::Cache(id)) = (&level.spec, target) {
                stats.register(resolver.caches[id.0].name(), *id);
            }
        }

        let hierarchy = Self {
            caches: resolver.caches,
            entries,
            memory,
            stats,
        };
        for (name, target) in &hierarchy.entries {
            info!("entry {} -> {}", name, hierarchy.describe_target(*target));
        }
        Ok(hierarchy)
    }

    /// Builds the standard instruction/data hierarchy from a [`Config`].
    ///
    /// Entry points `il1 -> il2 -> memory` and `dl1 -> dl2 -> memory`. `il1`
    /// may share `dl1` and `il2` may share `dl2`; a unified first level
    /// requires a unified (or absent) second level, and a second level
    /// requires its first level.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let il1: LevelSpec = config.cache.il1.parse()?;
        let dl1: LevelSpec = config.cache.dl1.parse()?;
        let il2: LevelSpec = config.cache.il2.parse()?;
        let dl2: LevelSpec = config.cache.dl2.parse()?;

        check_alias("il1", &il1, Some("dl1"))?;
        check_alias("il2", &il2, Some("dl2"))?;
        check_alias("dl1", &dl1, None)?;
        check_alias("dl2", &dl2, None)?;

        if il1 == LevelSpec::Alias("dl1".into())
            && !matches!(&il2, LevelSpec::None)
            && il2 != LevelSpec::Alias("dl2".into())
        {
            return Err(ConfigError::InvalidAlias {
                level: "il2".into(),
                target: config.cache.il2.clone(),
            });
        }
        if dl1 == LevelSpec::None && dl2 != LevelSpec::None {
            return Err(ConfigError::MissingUpperLevel {
                level: "dl2".into(),
                requires: "dl1".into(),
            });
        }
        if il1 == LevelSpec::None && il2 != LevelSpec::None {
            return Err(ConfigError::MissingUpperLevel {
                level: "il2".into(),
                requires: "il1".into(),
            });
        }

        let lat = &config.latency;
        let levels = [
            level("il1", il1, Some("il2"), lat.il1),
            level("il2", il2, None, lat.il2),
            level("dl1", dl1, Some("dl2"), lat.dl1),
            level("dl2", dl2, None, lat.dl2),
        ];
        let options = BuildOptions {
            seed: config.random_seed,
            bus: config
                .bus
                .enabled
                .then_some((config.bus.width_bytes, config.bus.latency)),
        };
        Self::build(&levels, build_memory(&config.memory), &options)
    }

    /// Resolves an entry point name.
    pub fn entry(&self, name: &str) -> Option<Target> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, target)| *target)
    }

    /// Entry points in declaration order.
    pub fn entries(&self) -> &[(String, Target)] {
        &self.entries
    }

    /// Runs a reference through the named entry point.
    pub fn access(&mut self, entry: &str, req: &AccessRequest) -> Result<u64, CacheError> {
        let target = self
            .entry(entry)
            .ok_or_else(|| CacheError::UnknownEntry(entry.to_string()))?;
        self.access_target(target, req)
    }

    /// Runs a reference against a resolved target.
    pub fn access_target(&mut self, target: Target, req: &AccessRequest) -> Result<u64, CacheError> {
        match target {
            Target::Memory => self.memory.delegate(req.command, req.addr, req.size, req.now),
            Target::Cache(id) => {
                with_cache(&mut self.caches, &mut self.memory, id, |cache, link| cache.access(req, link))
            }
        }
    }

    /// Invalidates the block holding `addr` in the cache behind `entry`.
    pub fn invalidate(&mut self, entry: &str, addr: Addr) -> Result<bool, CacheError> {
        match self.entry(entry) {
            Some(Target::Cache(id)) => Ok(self.caches[id.0].invalidate(addr)),
            Some(Target::Memory) => Ok(false),
            None => Err(CacheError::UnknownEntry(entry.to_string())),
        }
    }

    /// Flushes every cache, upper levels first so their write-backs land in
    /// the levels below before those are flushed. Returns the total latency.
    pub fn flush_all(&mut self, now: Tick) -> Result<u64, CacheError> {
        let mut latency = 0;
        for id in (0..self.caches.len()).rev() {
            let at = now + latency;
            latency += with_cache(&mut self.caches, &mut self.memory, CacheId(id), |cache, link| {
                cache.flush(at, link)
            })?;
        }
        Ok(latency)
    }

    /// Shared access to an instance.
    pub fn cache(&self, id: CacheId) -> Option<&CacheInstance> {
        self.caches.get(id.0)
    }

    /// Mutable access to an instance.
    pub fn cache_mut(&mut self, id: CacheId) -> Option<&mut CacheInstance> {
        self.caches.get_mut(id.0)
    }

    /// Instance behind an entry point, if the entry leads to a cache.
    pub fn cache_by_entry(&self, entry: &str) -> Option<&CacheInstance> {
        match self.entry(entry)? {
            Target::Cache(id) => self.cache(id),
            Target::Memory => None,
        }
    }

    /// Instance by its own (report) name.
    pub fn cache_by_name(&self, name: &str) -> Option<&CacheInstance> {
        self.caches.iter().find(|c| c.name() == name)
    }

    /// All instances, lower levels first.
    pub fn caches(&self) -> &[CacheInstance] {
        &self.caches
    }

    /// The terminal memory level.
    pub fn memory(&self) -> &MainMemory {
        &self.memory
    }

    /// The statistics registry.
    pub fn stat_registry(&self) -> &StatRegistry {
        &self.stats
    }

    /// Current statistics of every registered instance.
    pub fn report(&self) -> Vec<StatRecord> {
        self.stats.report(|id| self.caches.get(id.0).map(|c| c.stats()))
    }

    /// Writes a configuration dump: one line per entry point.
    pub fn write_config<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for (name, target) in &self.entries {
            writeln!(out, "{:<6} {}", name, self.describe_target(*target))?;
        }
        Ok(())
    }

    fn describe_target(&self, target: Target) -> String {
        match target {
            Target::Memory => "memory".to_string(),
            Target::Cache(id) => {
                let cache = &self.caches[id.0];
                let below = match cache.next_level() {
                    NextLevel::Memory => "memory".to_string(),
                    NextLevel::Cache(next) => self.caches[next.0].name().to_string(),
                };
                format!("{} ({}) -> {}", cache.name(), cache, below)
            }
        }
    }
}

impl std::fmt::Debug for Hierarchy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hierarchy")
            .field("caches", &self.caches)
            .field("entries", &self.entries)
            .field("memory", &self.memory)
            .finish_non_exhaustive()
    }
}

/// Terminal memory built from its configuration.
pub fn build_memory(config: &MemoryConfig) -> MainMemory {
    match config.controller {
        MemoryControllerKind::Simple => MainMemory::new(Box::new(SimpleController::new(config.latency))),
        MemoryControllerKind::Dram => MainMemory::new(Box::new(DramController::new(
            config.t_cas,
            config.t_ras,
            config.t_pre,
        ))),
    }
}

fn level(name: &str, spec: LevelSpec, next: Option<&str>, hit_latency: u64) -> LevelDef {
    LevelDef {
        name: name.to_string(),
        spec,
        next: next.map(str::to_string),
        hit_latency,
    }
}

fn check_alias(level: &str, spec: &LevelSpec, allowed: Option<&str>) -> Result<(), ConfigError> {
    match spec {
        LevelSpec::Alias(target) if Some(target.as_str()) != allowed => Err(ConfigError::InvalidAlias {
            level: level.to_string(),
            target: target.clone(),
        }),
        _ => Ok(()),
    }
}

/// Every level has at most one outgoing edge (alias target or next level),
/// so a cycle is found by walking each chain until it ends or revisits.
fn check_acyclic(levels: &[LevelDef], edges: &[Option<usize>]) -> Result<(), ConfigError> {
    const UNSEEN: u8 = 0;
    const ON_PATH: u8 = 1;
    const DONE: u8 = 2;

    let mut state = vec![UNSEEN; levels.len()];
    for start in 0..levels.len() {
        let mut path: Vec<usize> = Vec::new();
        let mut cursor = Some(start);
        while let Some(node) = cursor {
            match state[node] {
                DONE => break,
                ON_PATH => {
                    let from = path.iter().position(|&n| n == node).unwrap_or(0);
                    let mut names: Vec<String> =
                        path[from..].iter().map(|&n| levels[n].name.clone()).collect();
                    names.push(levels[node].name.clone());
                    return Err(ConfigError::Cycle(names));
                }
                _ => {
                    state[node] = ON_PATH;
                    path.push(node);
                    cursor = edges[node];
                }
            }
        }
        for node in path {
            state[node] = DONE;
        }
    }
    Ok(())
}

/// Turns level descriptions into instances, lower levels first.
struct Resolver<'a> {
    levels: &'a [LevelDef],
    edges: &'a [Option<usize>],
    resolved: Vec<Option<Target>>,
    caches: Vec<CacheInstance>,
    options: &'a BuildOptions,
}

impl Resolver<'_> {
    fn resolve(&mut self, i: usize) -> Result<Target, ConfigError> {
        if let Some(target) = self.resolved[i] {
            return Ok(target);
        }

        let below = match self.edges[i] {
            Some(next) => self.resolve(next)?,
            None => Target::Memory,
        };

        let levels = self.levels;
        let level = &levels[i];
        let target = match &level.spec {
            LevelSpec::None | LevelSpec::Alias(_) => below,
            LevelSpec::Cache(params) => {
                let mut cache = CacheInstance::from_params(params, level.hit_latency, self.options.seed)?;
                if let Target::Cache(next) = below {
                    let lower = &self.caches[next.0];
                    if lower.geometry().block_size < cache.geometry().block_size {
                        return Err(ConfigError::BlockSizeMismatch {
                            upper: cache.name().to_string(),
                            lower: lower.name().to_string(),
                        });
                    }
                }
                if let Some((width, latency)) = self.options.bus {
                    let bus = Bus::with_width(width, latency, cache.geometry().block_size);
                    cache = cache.with_bus(bus);
                }
                cache.set_next_level(below.into());
                self.caches.push(cache);
                Target::Cache(CacheId(self.caches.len() - 1))
            }
        };

        self.resolved[i] = Some(target);
        Ok(target)
    }
}

/// The next level of one cache: lower part of the arena plus memory.
struct LowerLevels<'a> {
    caches: &'a mut [CacheInstance],
    memory: &'a mut MainMemory,
    next: NextLevel,
}

impl HierarchyLink for LowerLevels<'_> {
    fn delegate(
        &mut self,
        command: Command,
        block_addr: Addr,
        block_size: u64,
        now: Tick,
    ) -> Result<u64, CacheError> {
        match self.next {
            NextLevel::Memory => self.memory.delegate(command, block_addr, block_size, now),
            NextLevel::Cache(id) => {
                let req = AccessRequest::new(command, block_addr, block_size, now);
                with_cache(self.caches, self.memory, id, |cache, link| cache.access(&req, link))
            }
        }
    }
}

/// Borrows cache `id` together with a link to everything below it.
fn with_cache<R, F>(
    caches: &mut [CacheInstance],
    memory: &mut MainMemory,
    id: CacheId,
    f: F,
) -> Result<R, CacheError>
where
    F: FnOnce(&mut CacheInstance, &mut dyn HierarchyLink) -> Result<R, CacheError>,
{
    if id.0 >= caches.len() {
        return Err(CacheError::UnknownEntry(format!("cache #{}", id.0)));
    }
    let (lower, rest) = caches.split_at_mut(id.0);
    let cache = &mut rest[0];
    let mut link = LowerLevels {
        caches: lower,
        memory,
        next: cache.next_level(),
    };
    f(cache, &mut link)
}
