//! # Main — CLI Entry Point
//!
//! Parses the worker count and tunables, initializes logging, and hands off
//! to the hunt loop. The hunt is a long-running compute job: without
//! `--passes` it prints progressively until interrupted.
//!
//! Result output (per-chain `found chain` lines, `try hash` lines, and the
//! periodic banner) goes to stdout; lifecycle logging goes to stderr via
//! `tracing` (`LOG_FORMAT=json` for structured output).

use std::sync::atomic::AtomicBool;

use anyhow::Result;
use clap::Parser;
use rug::Integer;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use chainhunt::chain::{self, ChainKind};
use chainhunt::fermat::FermatOracle;
use chainhunt::params::HuntParams;
use chainhunt::{stats, worker};

#[derive(Parser)]
#[command(
    name = "chainhunt",
    about = "Hunt for Cunningham and bi-twin prime chains near hash multiples"
)]
struct Cli {
    /// Number of worker threads
    #[arg(default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..=1024))]
    threads: u64,

    /// Sieve window size (multipliers examined per origin)
    #[arg(long, default_value_t = 1_000_000)]
    sieve_size: usize,

    /// Largest prime marking composites in the sieve
    #[arg(long, default_value_t = 50_000)]
    max_prime: u32,

    /// Fold primes up to this bound into every origin
    #[arg(long, default_value_t = 31)]
    primorial: u32,

    /// Sieve-contiguous doublings required before a candidate is probed
    #[arg(long, default_value_t = 6)]
    min_chain: usize,

    /// Minimum chain length to accept
    #[arg(long, default_value_t = 5)]
    min_accept: usize,

    /// Do not extend candidates past the sieve window
    #[arg(long)]
    no_beyond: bool,

    /// Enable the Euler-Lagrange-Lifchitz refinement (stricter, slower)
    #[arg(long)]
    refine: bool,

    /// Re-derive every accepted chain by brute force and count mismatches
    #[arg(long)]
    verify: bool,

    /// Print each origin hash as it is tried
    #[arg(long)]
    show_hashes: bool,

    /// Tag hashed together with the worker nonce
    #[arg(long, default_value = "sopp")]
    tag: String,

    /// Stop each worker after this many origins (default: run until killed)
    #[arg(long)]
    passes: Option<u64>,

    /// Hashes tried per thread between progress banners
    #[arg(long, default_value_t = 1000)]
    report_every: u64,

    /// Walk the known-chain reference set with the brute-force scan and exit
    #[arg(long)]
    self_test: bool,
}

fn main() -> Result<()> {
    // Structured logging: LOG_FORMAT=json for machines, human-readable otherwise
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt().json().with_target(false).init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    let cli = Cli::parse();
    if cli.self_test {
        return run_self_test();
    }

    let params = HuntParams {
        sieve_size: cli.sieve_size,
        max_prime: cli.max_prime,
        primorial: cli.primorial,
        min_chain: cli.min_chain,
        min_accept: cli.min_accept,
        beyond: !cli.no_beyond,
        refine: cli.refine,
        verify: cli.verify,
        show_hashes: cli.show_hashes,
        tag: cli.tag.clone(),
        report_every: cli.report_every,
        passes: cli.passes,
        ..HuntParams::default()
    };

    let stop = AtomicBool::new(false);
    let summary = worker::run(&params, cli.threads as usize, &stop)?;

    // Only bounded hunts get here; close with a final banner.
    stats::print_banner(
        &summary.totals,
        summary.elapsed_secs,
        &summary.table,
        summary.errors,
    );
    Ok(())
}

/// Brute-force both chain kinds from each known anchor and print the
/// fractional lengths, mirroring the report-line format.
fn run_self_test() -> Result<()> {
    let mut oracle = FermatOracle::new(false);
    for anchor in chain::KNOWN_CHAINS {
        let n = Integer::from_str_radix(anchor, 10)?;
        println!("try {anchor}:");
        for kind in [ChainKind::First, ChainKind::Second] {
            let (length, fraction) = chain::brute_force(&mut oracle, &n, kind);
            println!("  found {:.12}", length as f64 + fraction);
        }
    }
    Ok(())
}
