//! # Chainhunt — Core Library
//!
//! Hunts Cunningham chains and bi-twin chains anchored near multiples of a
//! SHA-256 derived origin, reporting per-length statistics over time. A
//! Cunningham chain of the first kind doubles upward (pᵢ₊₁ = 2pᵢ + 1), the
//! second kind doubles downward (pᵢ₊₁ = 2pᵢ − 1), and a bi-twin chain keeps
//! both sides of a common center prime at every doubling.
//!
//! ## Pipeline
//!
//! Every hunted origin flows through the same stages:
//!
//! 1. [`origin`] — hash a (tag, nonce) pair and fold in a primorial, giving
//!    the big-integer origin B.
//! 2. [`sieve`] — mark multipliers i where a small prime divides i·B ± 1,
//!    using one modular inverse per sieve prime.
//! 3. [`chain`] — enumerate surviving multipliers, extend them through
//!    doublings, and verify candidates center-first against the
//!    probable-primality oracle in [`fermat`].
//! 4. [`worker`] — N nonce-stepping workers folding finds into the shared
//!    tables in [`stats`].
//!
//! Tunables live in [`params::HuntParams`]; the defaults are the
//! configuration the pipeline was tuned around.
//!
//! Primality is never proven here: the oracle is a base-2 Fermat screen
//! (with an optional Euler–Lagrange–Lifchitz stage), so every reported
//! chain is a chain of probable primes.

pub mod chain;
pub mod fermat;
pub mod origin;
pub mod params;
pub mod sieve;
pub mod stats;
pub mod worker;
