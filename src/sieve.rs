//! # Sieve — Small Primes, Modular Inverses, and the Origin Sieve Pair
//!
//! Number-theoretic ground floor of the chain hunt. Provides:
//!
//! 1. **Prime generation** by trial division up to a configurable bound.
//!    The table is built once at startup and shared read-only by every worker.
//! 2. **Modular inverse** via the extended Euclidean algorithm over signed
//!    machine integers, normalized into [0, p).
//! 3. **The sieve pair** ([`SievePair`]): for one origin B, two boolean lanes
//!    of length S where `minus[i]` means i·B − 1 is composite and `plus[i]`
//!    means i·B + 1 is composite. Index 0 is unused; a cleared bit means
//!    "unknown, probably prime".
//!
//! ## Algorithm: Marking by Inverse
//!
//! For a sieve prime p with B mod p = r ≠ 0, the multipliers i with
//! p | i·B − 1 are exactly i ≡ r⁻¹ (mod p), so one modular inverse gives the
//! first mark and every later mark is a stride of p. For i·B + 1 the first
//! mark is r⁻¹·(p − 1) mod p, i.e. −r⁻¹. One big-integer remainder per prime,
//! everything after that is machine arithmetic.
//!
//! Primes up to the primorial bound are never used for marking: the origin
//! construction (see [`crate::origin`]) guarantees they divide B, so they can
//! never divide i·B ± 1. Larger primes that happen to divide B are skipped
//! for the same reason.

use rug::Integer;

/// Generate all primes below `limit`, smallest first, by trial division.
///
/// Deterministic and intentionally simple: the table is built once per
/// process and the bound stays small (tens of thousands), so segmented-sieve
/// machinery would buy nothing here.
pub fn generate_primes(limit: u32) -> Vec<u32> {
    let mut primes = Vec::new();
    if limit > 2 {
        primes.push(2);
    }
    let mut n = 3;
    while n < limit {
        if is_prime_u32(n) {
            primes.push(n);
        }
        n += 2;
    }
    primes
}

fn is_prime_u32(n: u32) -> bool {
    if n < 4 {
        return n > 1;
    }
    let mut d = 2;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 1;
    }
    true
}

/// Multiplicative inverse of `a` modulo the prime `p`, in [0, p).
///
/// Extended Euclidean algorithm over `i64`. Precondition: `p` prime and
/// `a` not divisible by `p` (so the inverse exists); callers uphold this by
/// construction and it is asserted in debug builds.
pub fn mod_inverse(a: u32, p: u32) -> u32 {
    debug_assert!(p > 1 && a % p != 0, "inverse of {a} mod {p} does not exist");
    let (mut r0, mut r1) = (a as i64, p as i64);
    let (mut x0, mut x1) = (1i64, 0i64);
    while r1 != 0 {
        let q = r0 / r1;
        let r = r0 % r1;
        r0 = r1;
        r1 = r;
        let x = x0 - q * x1;
        x0 = x1;
        x1 = x;
    }
    let mut inv = x0 % p as i64;
    if inv < 0 {
        inv += p as i64;
    }
    debug_assert_eq!(
        (a as u64 * inv as u64) % p as u64,
        1,
        "egcd produced a non-inverse for {a} mod {p}"
    );
    inv as u32
}

/// Two composite-marking lanes for one origin B: `minus[i]` covers i·B − 1,
/// `plus[i]` covers i·B + 1. Owned by a single worker and re-populated for
/// each origin; the backing storage is allocated once and reused.
pub struct SievePair {
    minus: Vec<bool>,
    plus: Vec<bool>,
}

impl SievePair {
    pub fn new(size: usize) -> Self {
        SievePair {
            minus: vec![false; size],
            plus: vec![false; size],
        }
    }

    /// Number of multipliers covered (the S in i ∈ [1, S)).
    pub fn len(&self) -> usize {
        self.minus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.minus.is_empty()
    }

    /// Lane for the i·B − 1 side (Cunningham chains of the first kind).
    pub fn minus(&self) -> &[bool] {
        &self.minus
    }

    /// Lane for the i·B + 1 side (Cunningham chains of the second kind).
    pub fn plus(&self) -> &[bool] {
        &self.plus
    }

    fn clear(&mut self) {
        self.minus.fill(false);
        self.plus.fill(false);
    }

    /// Mark every multiplier i for which some sieve prime divides i·B ± 1.
    ///
    /// Only primes above `primorial` participate: smaller primes divide B
    /// itself. A larger prime dividing B (possible, since the hash part of
    /// B is arbitrary) contributes no marks either and is skipped.
    pub fn populate(&mut self, origin: &Integer, primes: &[u32], primorial: u32) {
        self.clear();
        let size = self.minus.len();
        for &p in primes.iter().filter(|&&p| p > primorial) {
            let r = origin.mod_u(p);
            if r == 0 {
                continue;
            }
            let a = mod_inverse(r, p);
            // i ≡ a (mod p)  ⇒  p | i·B − 1
            let mut j = a as usize;
            while j < size {
                self.minus[j] = true;
                j += p as usize;
            }
            // i ≡ −a (mod p)  ⇒  p | i·B + 1
            let mut j = (a as u64 * (p as u64 - 1) % p as u64) as usize;
            while j < size {
                self.plus[j] = true;
                j += p as usize;
            }
        }
    }

    /// Reference marker: decides each mark by dividing i·B ± 1 directly.
    ///
    /// Quadratically slower than [`populate`](Self::populate); exists so the
    /// test suite can cross-check the inverse-based marking against first
    /// principles.
    pub fn populate_naive(&mut self, origin: &Integer, primes: &[u32], primorial: u32) {
        self.clear();
        for i in 1..self.minus.len() {
            let x = Integer::from(origin * i as u64);
            let below = Integer::from(&x - 1u32);
            let above = x + 1u32;
            for &p in primes.iter().filter(|&&p| p > primorial) {
                if below.is_divisible_u(p) {
                    self.minus[i] = true;
                }
                if above.is_divisible_u(p) {
                    self.plus[i] = true;
                }
            }
        }
    }
}
