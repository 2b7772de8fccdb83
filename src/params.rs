//! # Params — Hunt Configuration
//!
//! All tunables are run-time values with the defaults the hunt was tuned
//! around. They trade against each other: a larger sieve window surfaces
//! longer candidates but raises per-origin overhead; a deeper prime table
//! removes more composites per origin at a fixed cost per prime; a larger
//! primorial densifies candidates while inflating every tested number.
//! `min_chain` gates which candidates reach the oracle at all, and
//! `min_accept` is the floor below which the locator abandons a shrinking
//! range.

use anyhow::{ensure, Result};

/// Upper bound on worker threads.
pub const MAX_THREADS: usize = 1024;

#[derive(Clone, Debug)]
pub struct HuntParams {
    /// Sieve window size S — multipliers i ∈ [1, S) are examined per origin.
    pub sieve_size: usize,
    /// Primes below this bound mark composites in the sieve.
    pub max_prime: u32,
    /// Primes up to this bound are folded into the origin.
    pub primorial: u32,
    /// Minimum sieve-contiguous run before a candidate is probed at all.
    pub min_chain: usize,
    /// Minimum length the locator will accept.
    pub min_accept: usize,
    /// Extend candidates past the sieve window with direct probes.
    pub beyond: bool,
    /// Enable the Euler–Lagrange–Lifchitz refinement stage.
    pub refine: bool,
    /// Re-derive every accepted chain by brute force; count mismatches.
    pub verify: bool,
    /// Print each origin digest as it is tried.
    pub show_hashes: bool,
    /// Tag hashed together with the nonce.
    pub tag: String,
    /// Worker iterations between merges into the global totals.
    pub merge_every: u64,
    /// Hashes tried (per thread) between progress banners.
    pub report_every: u64,
    /// Stop each worker after this many origins; `None` runs until killed.
    pub passes: Option<u64>,
}

impl Default for HuntParams {
    fn default() -> Self {
        HuntParams {
            sieve_size: 1_000_000,
            max_prime: 50_000,
            primorial: 31,
            min_chain: 6,
            min_accept: 5,
            beyond: true,
            refine: false,
            verify: false,
            show_hashes: false,
            tag: "sopp".to_string(),
            merge_every: 100,
            report_every: 1000,
            passes: None,
        }
    }
}

impl HuntParams {
    /// Candidate multipliers run over [1, S / 2^min_chain).
    pub fn candidate_limit(&self) -> u64 {
        (self.sieve_size >> self.min_chain) as u64
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.min_accept >= 2, "min_accept must be at least 2");
        ensure!(
            self.min_chain >= self.min_accept,
            "min_chain ({}) must not be below min_accept ({})",
            self.min_chain,
            self.min_accept
        );
        ensure!(self.min_chain < 32, "min_chain {} is out of range", self.min_chain);
        ensure!(
            self.sieve_size > (1 << self.min_chain),
            "sieve of {} elements cannot hold a length-{} window",
            self.sieve_size,
            self.min_chain
        );
        ensure!(
            self.sieve_size <= 1 << 30,
            "sieve window of {} elements is unreasonably large",
            self.sieve_size
        );
        ensure!(
            self.max_prime > self.primorial,
            "max_prime ({}) must exceed the primorial bound ({})",
            self.max_prime,
            self.primorial
        );
        ensure!(
            self.max_prime <= 10_000_000,
            "prime table bound {} is unreasonably large",
            self.max_prime
        );
        ensure!(self.merge_every > 0, "merge_every must be positive");
        ensure!(self.report_every > 0, "report_every must be positive");
        ensure!(
            !(self.verify && !self.beyond),
            "verification needs beyond-sieve extension: the brute-force recheck \
             is not bounded by the sieve window"
        );
        ensure!(
            !(self.verify && self.refine),
            "verification and the refinement stage probe with different \
             congruences and cannot be combined"
        );
        Ok(())
    }
}
