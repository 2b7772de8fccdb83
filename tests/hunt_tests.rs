//! End-to-end hunts exercising the full pipeline in-process.
//!
//! Three concerns live here rather than in per-module unit tests:
//!
//! - **Known-chain anchors**: the brute-force reference walk must reproduce
//!   the recorded lengths for the five anchor numbers, both chain kinds.
//! - **Locator vs. brute force on a real origin**: every chain the sieved
//!   locator accepts for a hash-derived origin must re-derive identically
//!   from scratch.
//! - **Thread-count determinism**: identical nonce sets must yield identical
//!   summed statistics no matter how the workers split them.

use std::sync::atomic::AtomicBool;

use rug::Integer;

use chainhunt::chain::{self, ChainHit, ChainKind, KNOWN_CHAINS};
use chainhunt::fermat::FermatOracle;
use chainhunt::origin;
use chainhunt::params::HuntParams;
use chainhunt::sieve::{self, SievePair};
use chainhunt::worker;

// == Known-Chain Anchors =======================================================

/// Recorded (first kind, second kind) brute-force lengths for each anchor.
const ANCHOR_LENGTHS: [(u32, u32); 5] = [(13, 1), (1, 14), (1, 15), (1, 16), (1, 17)];

#[test]
fn anchors_reproduce_recorded_lengths() {
    let mut oracle = FermatOracle::new(false);
    for (anchor, (first, second)) in KNOWN_CHAINS.iter().zip(ANCHOR_LENGTHS) {
        let n = Integer::from_str_radix(anchor, 10).unwrap();
        let (l1, f1) = chain::brute_force(&mut oracle, &n, ChainKind::First);
        let (l2, f2) = chain::brute_force(&mut oracle, &n, ChainKind::Second);
        assert_eq!(l1, first, "first-kind length for {anchor}");
        assert_eq!(l2, second, "second-kind length for {anchor}");
        assert!((0.0..1.0).contains(&f1), "fraction {f1} for {anchor}");
        assert!((0.0..1.0).contains(&f2), "fraction {f2} for {anchor}");
    }
}

#[test]
fn anchor_fractions_match_reference() {
    // End fractions of the longest side, computed independently from the
    // Fermat residue of each chain's terminating element.
    let expected = [
        13.443389907204,
        14.494607819095,
        15.565878306323,
        16.757092446749,
        17.842504710548,
    ];
    let kinds = [
        ChainKind::First,
        ChainKind::Second,
        ChainKind::Second,
        ChainKind::Second,
        ChainKind::Second,
    ];
    let mut oracle = FermatOracle::new(false);
    for ((anchor, kind), want) in KNOWN_CHAINS.iter().zip(kinds).zip(expected) {
        let n = Integer::from_str_radix(anchor, 10).unwrap();
        let (length, fraction) = chain::brute_force(&mut oracle, &n, kind);
        assert!(
            (length as f64 + fraction - want).abs() < 1e-9,
            "{anchor}: got {}",
            length as f64 + fraction
        );
    }
}

// == Locator vs. Brute Force on a Hashed Origin ================================

#[test]
fn locator_agrees_with_brute_force_on_hashed_origin() {
    let params = HuntParams {
        sieve_size: 65_536,
        max_prime: 2_000,
        primorial: 13,
        min_chain: 4,
        min_accept: 3,
        ..HuntParams::default()
    };
    let primes = sieve::generate_primes(params.max_prime);
    let origin = origin::derive(b"sopp", 0, &primes, params.primorial);
    let mut sieves = SievePair::new(params.sieve_size);
    sieves.populate(&origin.value, &primes, params.primorial);

    let mut oracle = FermatOracle::new(false);
    let mut hits: Vec<ChainHit> = Vec::new();
    chain::scan(&origin.value, &sieves, &mut oracle, &params, |h| {
        hits.push(h)
    });

    let mut recheck = FermatOracle::new(false);
    for hit in hits.iter().filter(|h| h.kind != ChainKind::BiTwin) {
        let offs = match hit.kind {
            ChainKind::First => -1i32,
            ChainKind::Second => 1,
            ChainKind::BiTwin => unreachable!(),
        };
        let mut start = Integer::from(&origin.value * hit.start);
        if offs < 0 {
            start -= 1u32;
        } else {
            start += 1u32;
        }
        let (length, fraction) = chain::brute_force(&mut recheck, &start, hit.kind);
        assert_eq!(length, hit.length, "{hit:?} disagrees with brute force");
        assert!(
            (fraction - hit.fraction).abs() < 1e-9,
            "{hit:?} end fraction disagrees: {fraction}"
        );
    }
}

// == Thread-Count Determinism ==================================================

fn determinism_params(passes: u64) -> HuntParams {
    HuntParams {
        sieve_size: 32_768,
        max_prime: 2_000,
        primorial: 13,
        min_chain: 4,
        min_accept: 3,
        report_every: 1_000_000,
        merge_every: 2,
        passes: Some(passes),
        ..HuntParams::default()
    }
}

#[test]
fn one_and_eight_workers_agree_on_the_same_nonces() {
    // 1 worker x 8 passes and 8 workers x 1 pass both cover nonces 0..8.
    let stop = AtomicBool::new(false);
    let solo = worker::run(&determinism_params(8), 1, &stop).unwrap();
    let fleet = worker::run(&determinism_params(1), 8, &stop).unwrap();
    assert_eq!(solo.totals.tried, 8);
    assert_eq!(fleet.totals.tried, 8);
    assert_eq!(solo.table, fleet.table);
}

#[test]
fn uneven_splits_agree_on_the_same_nonces() {
    // 2x3 and 3x2 both cover nonces 0..6.
    let stop = AtomicBool::new(false);
    let a = worker::run(&determinism_params(3), 2, &stop).unwrap();
    let b = worker::run(&determinism_params(2), 3, &stop).unwrap();
    assert_eq!(a.totals.tried, 6);
    assert_eq!(b.totals.tried, 6);
    assert_eq!(a.table, b.table);
}

#[test]
fn repeated_runs_are_reproducible() {
    let stop = AtomicBool::new(false);
    let first = worker::run(&determinism_params(4), 2, &stop).unwrap();
    let second = worker::run(&determinism_params(4), 2, &stop).unwrap();
    assert_eq!(first.table, second.table);
    assert_eq!(first.errors, second.errors);
}
