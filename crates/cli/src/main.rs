//! Cache hierarchy simulator CLI.
//!
//! Replays a reference trace through the standard instruction/data hierarchy
//! and prints the per-cache statistics.

use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use simcache::config::Config;
use simcache::sim::{ReplaySummary, Replayer, load_trace};
use simcache::soc::Hierarchy;
use simcache::stats::{StatRecord, write_report};

#[derive(Parser, Debug)]
#[command(
    name = "sim-cache",
    author,
    version,
    about = "Set-associative cache hierarchy simulator",
    long_about = None,
)]
struct Cli {
    /// JSON configuration file; built-in defaults when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// L1 instruction cache: `<name>:<nsets>:<bsize>:<assoc>:<repl>`, `none` or `dl1`.
    #[arg(long = "cache-il1", value_name = "SPEC")]
    cache_il1: Option<String>,

    /// L1 data cache: `<name>:<nsets>:<bsize>:<assoc>:<repl>` or `none`.
    #[arg(long = "cache-dl1", value_name = "SPEC")]
    cache_dl1: Option<String>,

    /// L2 instruction cache: `<name>:<nsets>:<bsize>:<assoc>:<repl>`, `none` or `dl2`.
    #[arg(long = "cache-il2", value_name = "SPEC")]
    cache_il2: Option<String>,

    /// L2 data cache: `<name>:<nsets>:<bsize>:<assoc>:<repl>` or `none`.
    #[arg(long = "cache-dl2", value_name = "SPEC")]
    cache_dl2: Option<String>,

    /// Main memory latency in ticks.
    #[arg(long = "mem-lat", value_name = "TICKS")]
    mem_lat: Option<u64>,

    /// Seed for Random replacement.
    #[arg(long)]
    seed: Option<u64>,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,

    /// Print the effective configuration as JSON and exit.
    #[arg(long = "dump-config")]
    dump_config: bool,

    /// Trace file (PC CSV or reference list).
    #[arg(required_unless_present = "dump_config")]
    trace: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let config = load_config(&cli).unwrap_or_else(|e| fail(&e));
    if cli.dump_config {
        println!("{}", config.to_json());
        return;
    }
    let Some(trace_path) = cli.trace.as_ref() else {
        fail(&"a trace file is required");
    };

    let mut hierarchy = Hierarchy::from_config(&config).unwrap_or_else(|e| fail(&e));
    let refs = load_trace(trace_path).unwrap_or_else(|e| fail(&e));

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if !cli.json {
        print_config(&hierarchy, &mut out).unwrap_or_else(|e| fail(&e));
    }

    let summary = Replayer::new(&mut hierarchy)
        .run(&refs)
        .unwrap_or_else(|e| fail(&e));
    log::info!(
        "{} references, {} requests, {} ticks",
        summary.refs,
        summary.requests,
        summary.ticks
    );

    let records = hierarchy.report();
    print_report(&summary, &records, cli.json, &mut out).unwrap_or_else(|e| fail(&e));
}

fn print_config<W: Write>(hierarchy: &Hierarchy, out: &mut W) -> io::Result<()> {
    writeln!(out, "sim: cache configuration")?;
    hierarchy.write_config(out)?;
    writeln!(out)
}

fn print_report<W: Write>(
    summary: &ReplaySummary,
    records: &[StatRecord],
    json: bool,
    out: &mut W,
) -> io::Result<()> {
    if json {
        let body = serde_json::json!({
            "summary": summary,
            "stats": records,
        });
        serde_json::to_writer_pretty(&mut *out, &body)?;
        writeln!(out)?;
    } else {
        writeln!(out, "sim: ** simulation statistics **")?;
        writeln!(
            out,
            "{:<22} {:>12} # {}",
            "sim_num_refs", summary.refs, "total number of references replayed"
        )?;
        writeln!(
            out,
            "{:<22} {:>12} # {}",
            "sim_cycle", summary.ticks, "total simulated ticks"
        )?;
        write_report(records, out)?;
    }
    out.flush()
}

fn load_config(cli: &Cli) -> Result<Config, simcache::ConfigError> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(spec) = &cli.cache_il1 {
        config.cache.il1 = spec.clone();
    }
    if let Some(spec) = &cli.cache_dl1 {
        config.cache.dl1 = spec.clone();
    }
    if let Some(spec) = &cli.cache_il2 {
        config.cache.il2 = spec.clone();
    }
    if let Some(spec) = &cli.cache_dl2 {
        config.cache.dl2 = spec.clone();
    }
    if let Some(latency) = cli.mem_lat {
        config.memory.latency = latency;
    }
    if let Some(seed) = cli.seed {
        config.random_seed = seed;
    }
    Ok(config)
}

fn fail(e: &dyn std::fmt::Display) -> ! {
    eprintln!("\x1b[1;31merror:\x1b[0m {}", e);
    process::exit(1);
}
