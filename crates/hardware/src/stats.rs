//! Cache statistics collection and reporting.
//!
//! Every cache instance accumulates monotonically increasing counters. The
//! registry associates instances with report names and derives the rates
//! from the live counters each time a report is produced, so repeated reports
//! during a run always reflect the current state.

use std::fmt;
use std::io::{self, Write};

use serde::Serialize;

use crate::soc::link::CacheId;

/// Per-cache counters.
///
/// `accesses == hits + misses` holds after every completed access.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatCounters {
    pub accesses: u64,
    pub hits: u64,
    pub misses: u64,
    pub replacements: u64,
    pub writebacks: u64,
    pub invalidations: u64,
}

impl StatCounters {
    fn rate(&self, count: u64) -> f64 {
        if self.accesses == 0 {
            0.0
        } else {
            count as f64 / self.accesses as f64
        }
    }

    /// misses / accesses.
    pub fn miss_rate(&self) -> f64 {
        self.rate(self.misses)
    }

    /// replacements / accesses.
    pub fn repl_rate(&self) -> f64 {
        self.rate(self.replacements)
    }

    /// writebacks / accesses.
    pub fn wb_rate(&self) -> f64 {
        self.rate(self.writebacks)
    }

    /// invalidations / accesses.
    pub fn inv_rate(&self) -> f64 {
        self.rate(self.invalidations)
    }

    /// Report records for one cache, in report order.
    pub fn records(&self, cache_name: &str) -> Vec<StatRecord> {
        let counts = [
            ("accesses", self.accesses, "total number of accesses"),
            ("hits", self.hits, "total number of hits"),
            ("misses", self.misses, "total number of misses"),
            ("replacements", self.replacements, "total number of replacements"),
            ("writebacks", self.writebacks, "total number of writebacks"),
            ("invalidations", self.invalidations, "total number of invalidations"),
        ];
        let rates = [
            ("miss_rate", self.miss_rate(), "miss rate (i.e., misses/ref)"),
            ("repl_rate", self.repl_rate(), "replacement rate (i.e., repls/ref)"),
            ("wb_rate", self.wb_rate(), "writeback rate (i.e., wrbks/ref)"),
            ("inv_rate", self.inv_rate(), "invalidation rate (i.e., invs/ref)"),
        ];

        let counts = counts.into_iter().map(|(counter, value, description)| StatRecord {
            name: format!("{}.{}", cache_name, counter),
            value: StatValue::Count(value),
            description,
        });
        let rates = rates.into_iter().map(|(counter, value, description)| StatRecord {
            name: format!("{}.{}", cache_name, counter),
            value: StatValue::Rate(value),
            description,
        });
        counts.chain(rates).collect()
    }
}

/// A reported value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatValue {
    /// Raw counter.
    Count(u64),
    /// Derived rate, printed with four decimals.
    Rate(f64),
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StatValue::Count(v) => v.to_string(),
            StatValue::Rate(v) => format!("{:.4}", v),
        };
        f.pad(&text)
    }
}

/// One line of a report.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StatRecord {
    /// `<cache>.<counter>`.
    pub name: String,
    pub value: StatValue,
    pub description: &'static str,
}

/// Named reporting sink for cache counters.
#[derive(Clone, Debug, Default)]
pub struct StatRegistry {
    entries: Vec<(String, CacheId)>,
}

impl StatRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the counters of cache `id` under `name`.
    ///
    /// An instance reachable from several entry points (a unified cache) is
    /// reported once, under the first name it was registered with.
    pub fn register(&mut self, name: &str, id: CacheId) {
        if self.entries.iter().any(|(_, existing)| *existing == id) {
            return;
        }
        self.entries.push((name.to_string(), id));
    }

    /// Registered `(name, id)` pairs in registration order.
    pub fn entries(&self) -> &[(String, CacheId)] {
        &self.entries
    }

    /// Builds a report from the live counters returned by `lookup`.
    ///
    /// Instances that `lookup` does not know are skipped.
    pub fn report<'a, F>(&self, lookup: F) -> Vec<StatRecord>
    where
        F: Fn(CacheId) -> Option<&'a StatCounters>,
    {
        self.entries
            .iter()
            .filter_map(|(name, id)| lookup(*id).map(|counters| counters.records(name)))
            .flatten()
            .collect()
    }
}

/// Prints records as `name  value  # description` lines.
pub fn write_report<W: Write>(records: &[StatRecord], out: &mut W) -> io::Result<()> {
    for record in records {
        writeln!(
            out,
            "{:<22} {:>12} # {}",
            record.name, record.value, record.description
        )?;
    }
    Ok(())
}
