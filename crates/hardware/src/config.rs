//! Simulator configuration.
//!
//! Cache levels are described by spec strings of the form
//! `<name>:<nsets>:<bsize>:<assoc>:<repl>`, by `none` for an absent level, or
//! by the name of another level to share that level's instance (a unified
//! cache). The surrounding [`Config`] adds latencies, the memory model, the
//! bus model and the Random policy seed, and is loaded from JSON.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::ConfigError;
use crate::common::constants::{DEFAULT_HIT_LATENCY, DEFAULT_MEMORY_LATENCY, DEFAULT_RANDOM_SEED};
use crate::core::units::cache::policies::ReplacementKind;

/// Parameters of one cache parsed from a spec string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheParams {
    pub name: String,
    pub nsets: usize,
    pub block_size: u64,
    pub associativity: usize,
    pub policy: ReplacementKind,
}

impl FromStr for CacheParams {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ConfigError::MalformedSpec(s.to_string());
        let fields: Vec<&str> = s.trim().split(':').collect();
        let [name, nsets, bsize, assoc, repl] = fields.as_slice() else {
            return Err(malformed());
        };
        if name.is_empty() {
            return Err(malformed());
        }

        Ok(Self {
            name: name.to_string(),
            nsets: nsets.parse().map_err(|_| malformed())?,
            block_size: bsize.parse().map_err(|_| malformed())?,
            associativity: assoc.parse().map_err(|_| malformed())?,
            policy: repl.parse()?,
        })
    }
}

impl fmt::Display for CacheParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}",
            self.name,
            self.nsets,
            self.block_size,
            self.associativity,
            self.policy.as_char()
        )
    }
}

/// What a hierarchy level holds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LevelSpec {
    /// The level is absent; references pass through to the next level.
    None,
    /// The level shares the instance of the named level.
    Alias(String),
    /// The level is its own cache.
    Cache(CacheParams),
}

impl FromStr for LevelSpec {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "none" {
            Ok(LevelSpec::None)
        } else if s.contains(':') {
            Ok(LevelSpec::Cache(s.parse()?))
        } else if !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            Ok(LevelSpec::Alias(s.to_string()))
        } else {
            Err(ConfigError::MalformedSpec(s.to_string()))
        }
    }
}

/// Top-level simulator configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cache: CacheHierarchyConfig,
    #[serde(default)]
    pub latency: LatencyConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub bus: BusConfig,
    #[serde(default = "default_seed")]
    pub random_seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache: CacheHierarchyConfig::default(),
            latency: LatencyConfig::default(),
            memory: MemoryConfig::default(),
            bus: BusConfig::default(),
            random_seed: default_seed(),
        }
    }
}

impl Config {
    /// Parses a JSON configuration. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    /// Serializes the configuration as pretty-printed JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Spec strings of the four standard hierarchy levels.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheHierarchyConfig {
    #[serde(default = "d_il1")]
    pub il1: String,
    #[serde(default = "d_dl1")]
    pub dl1: String,
    #[serde(default = "d_il2")]
    pub il2: String,
    #[serde(default = "d_dl2")]
    pub dl2: String,
}

impl Default for CacheHierarchyConfig {
    fn default() -> Self {
        Self {
            il1: d_il1(),
            dl1: d_dl1(),
            il2: d_il2(),
            dl2: d_dl2(),
        }
    }
}

fn d_il1() -> String {
    "il1:256:32:1:l".to_string()
}

fn d_dl1() -> String {
    "dl1:256:32:4:l".to_string()
}

fn d_il2() -> String {
    "dl2".to_string()
}

fn d_dl2() -> String {
    "ul2:1024:64:4:l".to_string()
}

/// Hit latency of each standard level, in ticks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencyConfig {
    #[serde(default = "d_lat")]
    pub il1: u64,
    #[serde(default = "d_lat")]
    pub dl1: u64,
    #[serde(default = "d_lat")]
    pub il2: u64,
    #[serde(default = "d_lat")]
    pub dl2: u64,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            il1: d_lat(),
            dl1: d_lat(),
            il2: d_lat(),
            dl2: d_lat(),
        }
    }
}

fn d_lat() -> u64 {
    DEFAULT_HIT_LATENCY
}

/// Timing model of the terminal memory level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryControllerKind {
    /// Fixed latency per block.
    #[default]
    Simple,
    /// Single-bank DRAM with a row buffer.
    #[serde(alias = "DRAM")]
    Dram,
}

/// Terminal memory configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default)]
    pub controller: MemoryControllerKind,
    #[serde(default = "d_mem_lat")]
    pub latency: u64,
    #[serde(default = "d_t_cas")]
    pub t_cas: u64,
    #[serde(default = "d_t_ras")]
    pub t_ras: u64,
    #[serde(default = "d_t_pre")]
    pub t_pre: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            controller: MemoryControllerKind::Simple,
            latency: d_mem_lat(),
            t_cas: d_t_cas(),
            t_ras: d_t_ras(),
            t_pre: d_t_pre(),
        }
    }
}

fn d_mem_lat() -> u64 {
    DEFAULT_MEMORY_LATENCY
}

fn d_t_cas() -> u64 {
    14
}

fn d_t_ras() -> u64 {
    14
}

fn d_t_pre() -> u64 {
    14
}

/// Per-cache bus model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "d_bus_width")]
    pub width_bytes: u64,
    #[serde(default)]
    pub latency: u64,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            width_bytes: d_bus_width(),
            latency: 0,
        }
    }
}

fn d_bus_width() -> u64 {
    8
}

fn default_seed() -> u64 {
    DEFAULT_RANDOM_SEED
}
