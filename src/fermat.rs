//! # Fermat — Probable-Primality Oracle
//!
//! Base-2 Fermat screening for chain elements, plus the Euler–Lagrange–
//! Lifchitz refinement as an opt-in second stage. Passing is not a proof;
//! the hunt only ever claims probable primes.
//!
//! ## Fractional Residues
//!
//! A failed probe yields more than a boolean: the residue t = 2ⁿ mod n is
//! converted to the scalar f = (n − t)/n ∈ [0, 1), a proxy for how close the
//! candidate came to satisfying Fermat. The locator reports f for the first
//! element past an accepted chain, giving each find a fractional length.
//!
//! ## Scratch Space
//!
//! Every probe needs a handful of temporaries the size of the candidate. The
//! oracle owns them ([`FermatOracle`]) so a worker allocates once and reuses
//! across millions of probes; each worker holds its own oracle and nothing
//! here is shared.

use rug::{Assign, Integer};

/// Outcome of a single probe.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Probe {
    Prime,
    Composite {
        /// Fractional residue of the failing test, in [0, 1).
        fraction: f64,
    },
}

impl Probe {
    pub fn is_prime(self) -> bool {
        matches!(self, Probe::Prime)
    }

    /// The fractional residue, or 0 for a passing probe.
    pub fn fraction(self) -> f64 {
        match self {
            Probe::Prime => 0.0,
            Probe::Composite { fraction } => fraction,
        }
    }
}

/// Base-2 Fermat tester with owned scratch integers.
pub struct FermatOracle {
    two: Integer,
    candidate: Integer,
    modulus: Integer,
    residue: Integer,
    scratch: Integer,
    refine: bool,
}

impl FermatOracle {
    /// `refine` enables the Euler–Lagrange–Lifchitz second stage for directed
    /// probes. Off by default everywhere: the refinement is kept as a working
    /// entry point, not as part of the hunting configuration.
    pub fn new(refine: bool) -> Self {
        FermatOracle {
            two: Integer::from(2u32),
            candidate: Integer::new(),
            modulus: Integer::new(),
            residue: Integer::new(),
            scratch: Integer::new(),
            refine,
        }
    }

    /// Probe the chain element `origin`·`mul` + `offs`.
    ///
    /// `offs` is −1 on the first-kind side and +1 on the second-kind side;
    /// it also selects which Euler–Lagrange–Lifchitz congruence applies when
    /// refinement is enabled.
    pub fn probe_element(&mut self, origin: &Integer, mul: u64, offs: i32) -> Probe {
        self.candidate.assign(origin * mul);
        if offs > 0 {
            self.candidate += offs as u32;
        } else if offs < 0 {
            self.candidate -= (-offs) as u32;
        }
        self.run_tests(offs)
    }

    /// Probe an arbitrary number directly (used by the brute-force reference
    /// scan, where no chain side applies).
    pub fn probe(&mut self, n: &Integer) -> Probe {
        self.candidate.assign(n);
        self.run_tests(0)
    }

    fn run_tests(&mut self, offs: i32) -> Probe {
        // Fermat, base 2: t = 2^n mod n must come back as 2.
        let pm = self
            .two
            .pow_mod_ref(&self.candidate, &self.candidate)
            .expect("chain elements are positive");
        self.residue.assign(pm);
        if self.residue != self.two {
            let z = self.candidate.to_f64();
            return Probe::Composite {
                fraction: (z - self.residue.to_f64()) / z,
            };
        }
        if !self.refine || offs == 0 {
            return Probe::Prime;
        }
        self.lifchitz(offs)
    }

    /// Euler–Lagrange–Lifchitz stage: Euler's criterion on the successor
    /// element m = 2n − offs. For prime m, 2^((m−1)/2) ≡ (2|m) (mod m), and
    /// the Legendre symbol folds down to bit 1 of n and the chain side
    /// (m ≡ ±1 mod 8 exactly when n ≡ 3 mod 4 on the minus side, n ≡ 1 on
    /// the plus side). A failing congruence proves the successor composite,
    /// ending the chain at n; the fractional residue then comes from m.
    fn lifchitz(&mut self, offs: i32) -> Probe {
        self.modulus.assign(&self.candidate << 1u32);
        let rel = -offs;
        if rel > 0 {
            self.modulus += rel as u32;
        } else {
            self.modulus -= (-rel) as u32;
        }
        self.scratch.assign(&self.modulus >> 1u32); // (m − 1) / 2, m odd
        let pm = self
            .two
            .pow_mod_ref(&self.scratch, &self.modulus)
            .expect("lifchitz modulus is positive");
        self.residue.assign(pm);
        let expect_one = self.candidate.get_bit(1) ^ (offs == 1);
        let passed = if expect_one {
            self.residue == 1u32
        } else {
            self.scratch.assign(&self.modulus - 1u32);
            self.residue == self.scratch
        };
        if passed {
            Probe::Prime
        } else {
            let z = self.modulus.to_f64();
            Probe::Composite {
                fraction: (z - self.residue.to_f64()) / z,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oracle() -> FermatOracle {
        FermatOracle::new(false)
    }

    #[test]
    fn probe_accepts_odd_primes() {
        let mut o = oracle();
        for &p in &[3u32, 5, 7, 11, 13, 101, 1009, 10007, 104_729] {
            assert!(
                o.probe(&Integer::from(p)).is_prime(),
                "Fermat rejected prime {p}"
            );
        }
    }

    #[test]
    fn probe_rejects_odd_composites_with_fraction() {
        let mut o = oracle();
        for &c in &[9u32, 15, 21, 25, 49, 91, 1001, 10001] {
            match o.probe(&Integer::from(c)) {
                Probe::Prime => panic!("Fermat accepted composite {c}"),
                Probe::Composite { fraction } => {
                    assert!(
                        (0.0..1.0).contains(&fraction),
                        "fraction {fraction} out of range for {c}"
                    );
                }
            }
        }
    }

    #[test]
    fn probe_fraction_matches_definition() {
        // 15: 2^15 mod 15 = 8, so f = (15 - 8) / 15
        let mut o = oracle();
        match o.probe(&Integer::from(15u32)) {
            Probe::Composite { fraction } => {
                assert!((fraction - 7.0 / 15.0).abs() < 1e-12);
            }
            Probe::Prime => panic!("15 accepted"),
        }
    }

    #[test]
    fn probe_accepts_base2_pseudoprimes() {
        // 341 = 11*31 satisfies 2^341 ≡ 2 (mod 341). The oracle is a screen,
        // not a proof, and must report what the Fermat congruence says.
        let mut o = oracle();
        assert!(o.probe(&Integer::from(341u32)).is_prime());
    }

    #[test]
    fn probe_element_applies_multiplier_and_offset() {
        // origin 30, mul 7, offs -1 → 209 = 11*19; offs +1 → 211 prime
        let mut o = oracle();
        let origin = Integer::from(30u32);
        assert!(!o.probe_element(&origin, 7, -1).is_prime());
        assert!(o.probe_element(&origin, 7, 1).is_prime());
    }

    #[test]
    fn probe_element_large_multiplier() {
        // Multipliers come shifted up by the locator, so exercise a value
        // well past u32.
        let mut o = oracle();
        let origin = Integer::from(2u32);
        let mul = 1u64 << 40;
        // 2^41 - 1 = 13367 * 164511353
        assert!(!o.probe_element(&origin, mul, -1).is_prime());
        // 2^41 + 1 = 3 * 83 * 8831418697
        assert!(!o.probe_element(&origin, mul, 1).is_prime());
    }

    #[test]
    fn oracle_scratch_is_reusable() {
        // Alternating pass/fail probes must not contaminate each other.
        let mut o = oracle();
        for _ in 0..3 {
            assert!(o.probe(&Integer::from(101u32)).is_prime());
            assert!(!o.probe(&Integer::from(100001u32)).is_prime()); // 11*9091
        }
    }

    #[test]
    fn refined_probe_accepts_chain_members() {
        // 89 → 179 → 359 → 719 → 1439 → 2879 is a first-kind chain; element k
        // is 90·2^k − 1. For k < 5 the Lifchitz modulus 2n + 1 is the (prime)
        // successor, so the refined minus-side probe must pass.
        let mut o = FermatOracle::new(true);
        let origin = Integer::from(90u32);
        for k in 0..5 {
            assert!(
                o.probe_element(&origin, 1 << k, -1).is_prime(),
                "refined probe rejected 90*2^{k} - 1"
            );
        }
    }

    #[test]
    fn refined_probe_accepts_plus_side_chain_member() {
        // Second-kind pair 31 → 61: probing 31 (= 30·1 + 1) checks Euler's
        // criterion on 61, which holds.
        let mut o = FermatOracle::new(true);
        let origin = Integer::from(30u32);
        assert!(o.probe_element(&origin, 1, 1).is_prime());
    }

    #[test]
    fn refined_probe_rejects_prime_with_composite_successor() {
        // 61 is prime but its second-kind successor 121 = 11² flunks
        // Euler's criterion, so the refined probe ends the chain here.
        let mut o = FermatOracle::new(true);
        let origin = Integer::from(30u32);
        match o.probe_element(&origin, 2, 1) {
            Probe::Prime => panic!("refined probe accepted 61 despite successor 121"),
            Probe::Composite { fraction } => assert!((0.0..1.0).contains(&fraction)),
        }
    }

    #[test]
    fn refined_probe_rejects_composites() {
        let mut o = FermatOracle::new(true);
        let origin = Integer::from(90u32);
        // 90*64 - 1 = 5759 = 13*443, ends the chain above at the Fermat stage
        match o.probe_element(&origin, 64, -1) {
            Probe::Prime => panic!("5759 accepted"),
            Probe::Composite { fraction } => assert!((0.0..1.0).contains(&fraction)),
        }
    }
}
