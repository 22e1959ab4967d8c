//! Trace replay through the standard hierarchy.

use std::io::Write;

use simcache::config::Config;
use simcache::sim::{Replayer, TraceError, load_trace};
use simcache::soc::Hierarchy;
use tempfile::NamedTempFile;

use crate::common::harness::init_logging;

fn trace_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn icache_only(spec: &str) -> Config {
    let mut config = Config::default();
    config.cache.il1 = spec.to_string();
    config.cache.il2 = "none".to_string();
    config.cache.dl1 = "none".to_string();
    config.cache.dl2 = "none".to_string();
    config
}

#[test]
fn test_pc_trace_fetches_through_il1() {
    init_logging();
    let mut csv = String::from("#,PC\n");
    for i in 0..10u64 {
        csv.push_str(&format!("{},{}\n", i, 0x400000 + 4 * i));
    }
    let file = trace_file(&csv);

    let refs = load_trace(file.path()).unwrap();
    let mut hierarchy = Hierarchy::from_config(&icache_only("il1:256:32:1:l")).unwrap();
    let summary = Replayer::new(&mut hierarchy).run(&refs).unwrap();

    let s = hierarchy.cache_by_name("il1").unwrap().stats();
    assert_eq!(summary.refs, 10);
    assert_eq!((s.accesses, s.hits, s.misses), (10, 8, 2));
    // Two memory fills and eight hits at one tick each
    assert_eq!(summary.ticks, 10);
}

#[test]
fn test_wide_reference_is_split_per_block() {
    init_logging();
    let file = trace_file("# split\nr 0x1c 8\nw 0x20 4\n");
    let refs = load_trace(file.path()).unwrap();

    let mut hierarchy = Hierarchy::from_config(&Config::default()).unwrap();
    let summary = Replayer::new(&mut hierarchy).run(&refs).unwrap();

    assert_eq!(summary.refs, 2);
    assert_eq!(summary.requests, 3);
    let dl1 = hierarchy.cache_by_name("dl1").unwrap();
    assert_eq!((dl1.stats().accesses, dl1.stats().hits), (3, 1));
    assert!(dl1.is_dirty(0x20));
}

#[test]
fn test_malformed_trace_reports_line() {
    let file = trace_file("r 0x10\nw 0x20 4\nr zz\n");
    match load_trace(file.path()) {
        Err(TraceError::Parse { line, .. }) => assert_eq!(line, 3),
        other => panic!("expected a parse error, got {:?}", other),
    }
}

#[test]
fn test_missing_trace_file() {
    let err = load_trace("/nonexistent/simcache/trace.csv").unwrap_err();
    assert!(matches!(err, TraceError::Io(_)));
}

/// Full instruction trace of a reference run; the file is large and not
/// checked in. Point `SIMCACHE_SCENARIO_D_TRACE` at it to enable.
#[test]
fn test_reference_instruction_trace() {
    let Ok(path) = std::env::var("SIMCACHE_SCENARIO_D_TRACE") else {
        return;
    };
    init_logging();

    let refs = load_trace(&path).unwrap();
    let mut hierarchy = Hierarchy::from_config(&icache_only("il1:256:32:1:l")).unwrap();
    Replayer::new(&mut hierarchy).run(&refs).unwrap();

    let s = hierarchy.cache_by_name("il1").unwrap().stats();
    assert_eq!(s.accesses, 53459);
    assert_eq!(s.hits, 47366);
    assert_eq!(s.misses, 6093);
    assert_eq!(s.replacements, 5837);
    assert_eq!(s.writebacks, 0);
    assert_eq!(s.invalidations, 0);
}
