//! # Worker — Parallel Hunt Loop and Aggregation
//!
//! Runs N long-lived workers on a dedicated Rayon pool. Worker `rank` draws
//! nonces rank, rank + N, rank + 2N, … so the nonce space partitions with no
//! queue and no coordination; the set of origins examined is a function of
//! the tag and nonce set alone, independent of how many threads share the
//! work.
//!
//! ## Locking Discipline
//!
//! Two mutexes, so bulk aggregation never stalls per-chain reporting:
//!
//! - **stats mutex** — global per-length counts, the error counter, and
//!   every `found chain` line (held for the increment and the print).
//! - **aggregation mutex** — total hashes tried and the sieve/primality
//!   timing split, merged once per `merge_every` iterations.
//!
//! When both are needed (the periodic banner) the aggregation mutex is
//! taken first; nothing acquires them in the other order. Each is released
//! exactly once per acquisition.
//!
//! Everything else a worker touches — sieves, oracle scratch, the stats
//! shadow — is thread-local and reused across iterations.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use anyhow::{ensure, Context, Result};
use rug::Integer;
use tracing::{info, warn};

use crate::chain::{self, ChainHit, ChainKind};
use crate::fermat::FermatOracle;
use crate::origin;
use crate::params::{HuntParams, MAX_THREADS};
use crate::sieve::{self, SievePair};
use crate::stats::{self, StatsTable, Totals};

/// Final state of a bounded hunt (`passes` set), for callers that want the
/// numbers rather than the printed banner.
#[derive(Debug)]
pub struct Summary {
    pub table: StatsTable,
    pub totals: Totals,
    pub errors: u64,
    pub elapsed_secs: f64,
}

struct GlobalStats {
    table: StatsTable,
    errors: u64,
}

struct Shared<'a> {
    stats: Mutex<GlobalStats>,
    totals: Mutex<Totals>,
    stop: &'a AtomicBool,
    start: Instant,
}

/// Run the hunt across `threads` workers. Returns only when every worker
/// has finished, which requires `passes` to be set or `stop` to be raised;
/// an unbounded hunt runs until the process is killed.
pub fn run(params: &HuntParams, threads: usize, stop: &AtomicBool) -> Result<Summary> {
    params.validate()?;
    ensure!(
        (1..=MAX_THREADS).contains(&threads),
        "number of threads must be between 1 and {MAX_THREADS}"
    );

    let primes = sieve::generate_primes(params.max_prime);
    info!(
        threads,
        primes = primes.len(),
        sieve = params.sieve_size,
        primorial = params.primorial,
        "chain hunt starting"
    );

    let shared = Shared {
        stats: Mutex::new(GlobalStats {
            table: StatsTable::new(),
            errors: 0,
        }),
        totals: Mutex::new(Totals::default()),
        stop,
        start: Instant::now(),
    };

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .context("building worker pool")?;
    pool.broadcast(|ctx| worker_loop(ctx.index(), threads, params, &primes, &shared));

    let elapsed_secs = shared.start.elapsed().as_secs_f64();
    let stats = shared.stats.into_inner().unwrap();
    let totals = shared.totals.into_inner().unwrap();
    info!(
        tried = totals.tried,
        found = stats.table.total(),
        errors = stats.errors,
        "chain hunt finished"
    );
    Ok(Summary {
        table: stats.table,
        totals,
        errors: stats.errors,
        elapsed_secs,
    })
}

fn worker_loop(
    rank: usize,
    threads: usize,
    params: &HuntParams,
    primes: &[u32],
    shared: &Shared<'_>,
) {
    let mut oracle = FermatOracle::new(params.refine);
    let mut recheck = params.verify.then(|| FermatOracle::new(false));
    let mut sieves = SievePair::new(params.sieve_size);
    let mut shadow = StatsTable::new();
    let mut window = Totals::default();
    let mut hits: Vec<ChainHit> = Vec::new();

    let mut nonce = rank as u64;
    let mut iterations = 0u64;
    loop {
        if shared.stop.load(Ordering::Relaxed) {
            break;
        }
        if let Some(limit) = params.passes {
            if iterations >= limit {
                break;
            }
        }

        let origin = origin::derive(params.tag.as_bytes(), nonce, primes, params.primorial);
        nonce += threads as u64;
        if params.show_hashes {
            println!("try hash {}", origin.digest_hex);
        }

        let sieve_start = Instant::now();
        sieves.populate(&origin.value, primes, params.primorial);
        window.sieve_secs += sieve_start.elapsed().as_secs_f64();

        let probe_start = Instant::now();
        hits.clear();
        chain::scan(&origin.value, &sieves, &mut oracle, params, |hit| {
            hits.push(hit)
        });
        window.prime_secs += probe_start.elapsed().as_secs_f64();

        for hit in &hits {
            shadow.record(hit.kind, hit.length);
            // Ground-truth recomputation happens outside any lock; only the
            // verdict goes under the stats mutex with the report line.
            let mismatch = recheck
                .as_mut()
                .map(|o| disagrees_with_brute_force(o, &origin.value, hit))
                .unwrap_or(false);
            let mut stats = shared.stats.lock().unwrap();
            println!(
                "found chain type {} length {:.12}",
                hit.kind.type_code(),
                hit.length as f64 + hit.fraction
            );
            if mismatch {
                stats.errors += 1;
                warn!(
                    start = hit.start,
                    length = hit.length,
                    kind = hit.kind.type_code() as u32,
                    "locator result disagrees with brute-force recheck"
                );
            }
        }

        window.tried += 1;
        iterations += 1;
        if iterations % params.merge_every == 0 {
            merge_window(params, threads, shared, &mut shadow, &mut window);
        }
    }
    // Final merge so bounded runs account for the tail window.
    merge_window(params, threads, shared, &mut shadow, &mut window);
}

/// Fold this worker's window into the global totals and, when the global
/// hash count crosses the report cadence, print the banner.
fn merge_window(
    params: &HuntParams,
    threads: usize,
    shared: &Shared<'_>,
    shadow: &mut StatsTable,
    window: &mut Totals,
) {
    let mut totals = shared.totals.lock().unwrap();
    totals.absorb(window);
    let report_due =
        totals.tried > 0 && totals.tried % (params.report_every * threads as u64) == 0;
    let snapshot = *totals;

    let mut stats = shared.stats.lock().unwrap();
    stats.table.merge(shadow);
    shadow.clear();
    if report_due {
        stats::print_banner(
            &snapshot,
            shared.start.elapsed().as_secs_f64(),
            &stats.table,
            stats.errors,
        );
    }
    // Both guards drop here — once each.
}

/// Walk the reported chain from its start with the dumb reference scan and
/// compare lengths and end fractions. Bi-twin hits are derived from the two
/// one-sided results and need no separate recheck.
fn disagrees_with_brute_force(oracle: &mut FermatOracle, origin: &Integer, hit: &ChainHit) -> bool {
    let offs = match hit.kind {
        ChainKind::First => -1i32,
        ChainKind::Second => 1,
        ChainKind::BiTwin => return false,
    };
    let mut start = Integer::from(origin * hit.start);
    if offs < 0 {
        start -= 1u32;
    } else {
        start += 1u32;
    }
    let (length, fraction) = chain::brute_force(oracle, &start, hit.kind);
    (length as f64 + fraction - (hit.length as f64 + hit.fraction)).abs() > 1e-6
}
