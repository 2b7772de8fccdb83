//! # Chain — Candidate Enumeration and the Center-First Locator
//!
//! Walks one sieved origin looking for Cunningham chains of both kinds and
//! bi-twin chains. A candidate is a starting multiplier i; doubling i walks
//! the implied chain i·B ± 1, 2i·B ± 1, 4i·B ± 1, … entirely inside the
//! sieve until the window runs out.
//!
//! ## Candidate Gating
//!
//! Even multipliers are admitted only when the half multiplier is already
//! marked composite: otherwise the same chain was counted starting from i/2,
//! and starting at i would double-count it. A candidate then needs
//! `min_chain` consecutive unmarked doublings before any big-integer work
//! happens.
//!
//! ## Center-First Verification
//!
//! Surviving candidates are verified middle-out: probe the middle element
//! first, and on failure shrink to the longer half (a tie keeps the upper
//! half) and restart. A single composite near the middle costs at most half
//! the probes of a left-to-right walk, and ranges shrinking below
//! `min_accept` are abandoned without further testing. Elements already
//! proven during the beyond-sieve extension are carried in a bit mask and
//! never re-probed.
//!
//! ## Bi-Twin Combination
//!
//! A bi-twin chain needs both i·2ᵏ·B − 1 and i·2ᵏ·B + 1 prime for the same
//! leading multipliers, so the two one-sided results combine as
//! 2·min(L₁, L₂) when they differ and L₁ + L₂ when equal.

use rug::Integer;

use crate::fermat::{FermatOracle, Probe};
use crate::params::HuntParams;
use crate::sieve::SievePair;

/// Chain family. The numeric codes 1/2/3 appear in report lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChainKind {
    /// pᵢ₊₁ = 2pᵢ + 1, elements i·2ᵏ·B − 1.
    First,
    /// pᵢ₊₁ = 2pᵢ − 1, elements i·2ᵏ·B + 1.
    Second,
    /// Both sides prime around the shared multipliers.
    BiTwin,
}

impl ChainKind {
    pub fn type_code(self) -> u8 {
        match self {
            ChainKind::First => 1,
            ChainKind::Second => 2,
            ChainKind::BiTwin => 3,
        }
    }

    pub(crate) fn column(self) -> usize {
        match self {
            ChainKind::First => 0,
            ChainKind::Second => 1,
            ChainKind::BiTwin => 2,
        }
    }
}

/// One accepted chain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChainHit {
    pub kind: ChainKind,
    /// Effective starting multiplier (the candidate shifted past any
    /// composite prefix). The first element is `start`·B ± 1.
    pub start: u64,
    pub length: u32,
    /// Fractional residue of the element terminating the chain, in [0, 1).
    /// For bi-twin hits this is the mean of the two sides' fractions.
    pub fraction: f64,
}

/// Anchors with known brute-force chain lengths, used by the self-test.
pub const KNOWN_CHAINS: [&str; 5] = [
    "978230124172507899911260068253742404889",
    "335898524600734221050749906451371",
    "28320350134887132315879689643841",
    "2368823992523350998418445521",
    "1302312696655394336638441",
];

/// Combined bi-twin length from the two one-sided lengths.
///
/// The shorter side bounds the number of usable pairs; only when the sides
/// tie do both spares contribute.
pub fn bitwin_length(l1: u32, l2: u32) -> u32 {
    if l1 == l2 {
        l1 + l2
    } else {
        2 * l1.min(l2)
    }
}

/// Enumerate every chain in the sieved window around `origin`, calling
/// `emit` for each accepted find. Hits from one candidate multiplier are
/// emitted first-kind, second-kind, then bi-twin.
pub fn scan<F: FnMut(ChainHit)>(
    origin: &Integer,
    sieves: &SievePair,
    oracle: &mut FermatOracle,
    params: &HuntParams,
    mut emit: F,
) {
    let limit = (sieves.len() >> params.min_chain) as u64;
    for i in 1..limit {
        let minus = hunt_side(origin, sieves.minus(), oracle, params, i, -1);
        let plus = hunt_side(origin, sieves.plus(), oracle, params, i, 1);
        if let Some((start, length, fraction)) = minus {
            emit(ChainHit {
                kind: ChainKind::First,
                start,
                length,
                fraction,
            });
        }
        if let Some((start, length, fraction)) = plus {
            emit(ChainHit {
                kind: ChainKind::Second,
                start,
                length,
                fraction,
            });
        }
        let (l1, f1) = minus.map_or((0, 0.0), |(_, l, f)| (l, f));
        let (l2, f2) = plus.map_or((0, 0.0), |(_, l, f)| (l, f));
        let l3 = bitwin_length(l1, l2);
        if l3 > 0 {
            emit(ChainHit {
                kind: ChainKind::BiTwin,
                start: i,
                length: l3,
                fraction: (f1 + f2) * 0.5,
            });
        }
    }
}

/// Chains can never be tracked past this many doublings; the probe mask is
/// a single machine word.
const MAX_DOUBLINGS: usize = 64;

fn hunt_side(
    origin: &Integer,
    lane: &[bool],
    oracle: &mut FermatOracle,
    params: &HuntParams,
    i: u64,
    offs: i32,
) -> Option<(u64, u32, f64)> {
    // Even multipliers only start a chain when the half multiplier is
    // composite; otherwise this chain was already counted from i/2.
    if i & 1 == 0 && !lane[(i >> 1) as usize] {
        return None;
    }
    for k in 0..params.min_chain {
        if lane[(i as usize) << k] {
            return None;
        }
    }
    let mut k = params.min_chain;
    let mut mask = 0u64;
    let mut end_fraction = None;
    if params.beyond {
        // Walk further doublings: sieve reads inside the window, direct
        // probes past its end. Probable primes found here feed the mask so
        // the locator never re-tests them.
        let head_room = (i.leading_zeros() as usize).min(MAX_DOUBLINGS - 1);
        while k <= head_room {
            let mul = i << k;
            if mul < lane.len() as u64 {
                if lane[mul as usize] {
                    break;
                }
            } else {
                match oracle.probe_element(origin, mul, offs) {
                    Probe::Prime => mask |= 1 << k,
                    Probe::Composite { fraction } => {
                        end_fraction = Some(fraction);
                        break;
                    }
                }
            }
            k += 1;
        }
    }
    locate(
        origin,
        oracle,
        i,
        mask,
        k - 1,
        offs,
        params.min_accept,
        end_fraction,
    )
}

/// Longest accepted chain among the doublings [0, hi] of `i`, middle first.
///
/// A failed probe shrinks the range to the strictly longer half (ties keep
/// the upper half) and the search restarts; ranges below `min_accept` are
/// abandoned. When the lower half is kept, the failing element sits just
/// past the new end and its fraction terminates the chain.
#[allow(clippy::too_many_arguments)]
fn locate(
    origin: &Integer,
    oracle: &mut FermatOracle,
    i: u64,
    mut mask: u64,
    mut hi: usize,
    offs: i32,
    min_accept: usize,
    mut end_fraction: Option<f64>,
) -> Option<(u64, u32, f64)> {
    let mut lo = 0usize;
    loop {
        if hi - lo + 1 < min_accept {
            return None;
        }
        match probe_range(origin, oracle, i, &mut mask, lo, hi, offs) {
            None => break,
            Some((j, fraction)) => {
                let lower = j as i64 - 1 - lo as i64;
                let upper = hi as i64 - (j as i64 + 1);
                if lower > upper {
                    hi = j - 1;
                    end_fraction = Some(fraction);
                } else {
                    lo = j + 1;
                }
            }
        }
    }
    let fraction = match end_fraction {
        Some(f) => f,
        None => probe_past(origin, oracle, i, hi, offs),
    };
    Some((i << lo, (hi - lo + 1) as u32, fraction))
}

/// Probe [lo, hi] middle-outward. `None` when every element passes,
/// otherwise the failing index and its fractional residue.
fn probe_range(
    origin: &Integer,
    oracle: &mut FermatOracle,
    i: u64,
    mask: &mut u64,
    lo: usize,
    hi: usize,
    offs: i32,
) -> Option<(usize, f64)> {
    let len = hi - lo;
    let mid = lo + len / 2;
    let (down, up) = if len % 2 == 1 {
        (mid, mid + 1)
    } else {
        if let Err(f) = probe_one(origin, oracle, i, mask, mid, offs) {
            return Some((mid, f));
        }
        if mid == lo {
            return None;
        }
        (mid - 1, mid + 1)
    };
    for t in 0..=(down - lo) {
        let j = down - t;
        if let Err(f) = probe_one(origin, oracle, i, mask, j, offs) {
            return Some((j, f));
        }
        let j = up + t;
        if let Err(f) = probe_one(origin, oracle, i, mask, j, offs) {
            return Some((j, f));
        }
    }
    None
}

fn probe_one(
    origin: &Integer,
    oracle: &mut FermatOracle,
    i: u64,
    mask: &mut u64,
    j: usize,
    offs: i32,
) -> Result<(), f64> {
    if *mask & (1 << j) != 0 {
        return Ok(());
    }
    match oracle.probe_element(origin, i << j, offs) {
        Probe::Prime => {
            *mask |= 1 << j;
            Ok(())
        }
        Probe::Composite { fraction } => Err(fraction),
    }
}

/// One extra probe just past an accepted range, for the end fraction.
fn probe_past(origin: &Integer, oracle: &mut FermatOracle, i: u64, hi: usize, offs: i32) -> f64 {
    let k = hi + 1;
    if k >= MAX_DOUBLINGS || k as u32 > i.leading_zeros() {
        return 0.0;
    }
    match oracle.probe_element(origin, i << k, offs) {
        // A pseudoprime straddling the end: the fraction is genuinely
        // unknown, report a whole length.
        Probe::Prime => 0.0,
        Probe::Composite { fraction } => fraction,
    }
}

/// Walk a chain by plain doublings from `start`, testing every element.
///
/// The dumb reference scan: no sieve, no reordering, no early abort. Used by
/// the verify mode, the startup self-test, and the test suite as ground
/// truth. Even starts terminate immediately (chain elements are odd).
pub fn brute_force(oracle: &mut FermatOracle, start: &Integer, kind: ChainKind) -> (u32, f64) {
    let mut p = start.clone();
    if p.is_even() {
        return (0, 0.0);
    }
    let mut length = 0u32;
    loop {
        match oracle.probe(&p) {
            Probe::Prime => {
                length += 1;
                p <<= 1u32;
                match kind {
                    ChainKind::First => p += 1u32,
                    ChainKind::Second => p -= 1u32,
                    ChainKind::BiTwin => {
                        unreachable!("bi-twin chains are walked one side at a time")
                    }
                }
            }
            Probe::Composite { fraction } => return (length, fraction),
        }
    }
}
