//! Soak command - concurrent stress run against a bounded cache.
//!
//! Every thread works on its own key range so it knows the last value it
//! wrote for each key; any read that returns something else is a violation.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Instant;

use anyhow::{Result, bail};
use clap::Args;
use console::Style;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, warn};
use viewstash_cache::BoundedCache;

use super::Context;

/// Arguments for the soak command.
#[derive(Args, Debug)]
pub struct SoakArgs {
    /// Number of worker threads
    #[arg(short, long, default_value_t = 8)]
    pub threads: u64,

    /// Operations per thread
    #[arg(short, long, default_value_t = 10_000)]
    pub ops: usize,

    /// Cache capacity
    #[arg(short, long, default_value_t = 100)]
    pub capacity: usize,

    /// Distinct keys per thread
    #[arg(short, long, default_value_t = 50)]
    pub keys: u64,

    /// Seed for the per-thread random generators
    #[arg(short, long, default_value_t = 0)]
    pub seed: u64,
}

/// Per-thread tallies.
#[derive(Debug, Default)]
struct WorkerReport {
    inserted: u64,
    removed: u64,
    stale_reads: u64,
    max_len: usize,
}

/// Soak results for JSON output.
#[derive(Debug, Serialize)]
struct SoakOutput {
    threads: u64,
    operations: u64,
    capacity: usize,
    inserted: u64,
    removed: u64,
    evicted: u64,
    final_size: usize,
    full: bool,
    max_observed_size: usize,
    stale_reads: u64,
    elapsed_ms: u128,
    violations: Vec<String>,
}

/// Run the soak command.
pub fn run(args: SoakArgs, ctx: &Context) -> Result<()> {
    let evicted = Arc::new(AtomicU64::new(0));
    let cache = {
        let evicted = Arc::clone(&evicted);
        BoundedCache::with_listener(args.capacity, move |_key: (u64, u64), _value: u64| {
            evicted.fetch_add(1, Ordering::Relaxed);
        })
    };

    info!(
        threads = args.threads,
        ops = args.ops,
        capacity = args.capacity,
        "Starting soak run"
    );
    let started = Instant::now();

    let (reports, mut violations) = thread::scope(|scope| {
        let workers: Vec<_> = (0..args.threads)
            .map(|t| {
                let cache = cache.clone();
                let args = &args;
                scope.spawn(move || worker(&cache, t, args))
            })
            .collect();

        gather(workers.into_iter().map(|w| w.join()))
    });
    let all_joined = violations.is_empty();

    let elapsed = started.elapsed();
    let inserted: u64 = reports.iter().map(|r| r.inserted).sum();
    let removed: u64 = reports.iter().map(|r| r.removed).sum();
    let stale_reads: u64 = reports.iter().map(|r| r.stale_reads).sum();
    let max_len = reports.iter().map(|r| r.max_len).max().unwrap_or(0);
    let evicted = evicted.load(Ordering::SeqCst);
    let stats = cache.stats();

    if args.capacity > 0 && max_len > args.capacity {
        violations.push(format!(
            "observed {} entries with capacity {}",
            max_len, args.capacity
        ));
    }
    if stale_reads > 0 {
        violations.push(format!("{} reads returned a stale value", stale_reads));
    }
    if evicted != stats.evictions {
        violations.push(format!(
            "listener saw {} evictions, cache counted {}",
            evicted, stats.evictions
        ));
    }
    // A panicked worker's tallies are lost, so the totals cannot balance.
    if all_joined && inserted != removed + evicted + stats.size as u64 {
        violations.push(format!(
            "inserted {} != removed {} + evicted {} + remaining {}",
            inserted, removed, evicted, stats.size
        ));
    }

    debug!(violations = violations.len(), "Soak run checked");

    if ctx.json_output {
        let output = SoakOutput {
            threads: args.threads,
            operations: args.threads * args.ops as u64,
            capacity: args.capacity,
            inserted,
            removed,
            evicted,
            final_size: stats.size,
            full: stats.is_full(),
            max_observed_size: max_len,
            stale_reads,
            elapsed_ms: elapsed.as_millis(),
            violations: violations.clone(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        let dim = Style::new().dim();
        println!(
            "  {} {} threads x {} ops in {:?}",
            dim.apply_to("Run:      "),
            args.threads,
            args.ops,
            elapsed
        );
        println!("  {} {}", dim.apply_to("Inserted: "), inserted);
        println!("  {} {}", dim.apply_to("Removed:  "), removed);
        println!("  {} {}", dim.apply_to("Evicted:  "), evicted);
        println!(
            "  {} {}{} (max observed {}, capacity {})",
            dim.apply_to("Size:     "),
            stats.size,
            if stats.is_full() { " full" } else { "" },
            max_len,
            args.capacity
        );
        println!("  {} {:.2}", dim.apply_to("Hit rate: "), stats.hit_rate());
    }

    if !violations.is_empty() {
        bail!("cache invariants violated: {}", violations.join("; "));
    }

    Ok(())
}

fn worker(cache: &BoundedCache<(u64, u64), u64>, t: u64, args: &SoakArgs) -> WorkerReport {
    let mut rng = StdRng::seed_from_u64(args.seed ^ t.wrapping_mul(0x9e37_79b9_7f4a_7c15));
    let mut last_written: HashMap<u64, u64> = HashMap::new();
    let mut report = WorkerReport::default();
    let keys = args.keys.max(1);

    for op in 0..args.ops {
        let key = rng.random_range(0..keys);
        match rng.random_range(0..3) {
            0 => {
                if let Some(value) = cache.get(&(t, key)) {
                    if last_written.get(&key) != Some(&value) {
                        report.stale_reads += 1;
                    }
                }
            }
            1 => {
                let value = op as u64;
                if cache.put((t, key), value).is_none() {
                    report.inserted += 1;
                }
                last_written.insert(key, value);
            }
            _ => {
                if cache.remove(&(t, key)).is_some() {
                    report.removed += 1;
                }
            }
        }

        report.max_len = report.max_len.max(cache.len());
    }

    report
}

/// Split joined workers into their reports and one violation per panic.
fn gather<I>(results: I) -> (Vec<WorkerReport>, Vec<String>)
where
    I: IntoIterator<Item = thread::Result<WorkerReport>>,
{
    let mut reports = Vec::new();
    let mut violations = Vec::new();
    for (t, result) in results.into_iter().enumerate() {
        match result {
            Ok(report) => reports.push(report),
            Err(_) => {
                warn!(worker = t, "Soak worker panicked");
                violations.push(format!("worker {} panicked", t));
            }
        }
    }
    (reports, violations)
}
