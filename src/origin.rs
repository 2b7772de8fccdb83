//! # Origin — Hash-Anchored Search Origins
//!
//! Every sieve pass hunts around one origin B, derived from a SHA-256 digest
//! so the searched region is effectively random but exactly reproducible:
//!
//! ```text
//! B = int(sha256(tag ‖ nonce_le64)) · ∏ { p ≤ primorial : hash mod p ≠ 0 } p
//! ```
//!
//! Folding in the small primes forces every i·B ± 1 to be coprime to them,
//! which multiplies the density of chain candidates surviving the sieve. The
//! fold is conditional: a prime already dividing the hash integer is left
//! out, keeping B's factor structure exact (each small prime divides B
//! exactly as often as needed, never redundantly skipped nor doubled).

use rug::integer::Order;
use rug::Integer;
use sha2::{Digest, Sha256};

/// One derived origin: the adjusted integer B plus the digest it came from.
pub struct Origin {
    pub value: Integer,
    pub digest_hex: String,
}

/// SHA-256 of tag ‖ nonce (little-endian 8 bytes).
pub fn digest(tag: &[u8], nonce: u64) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(tag);
    hasher.update(nonce.to_le_bytes());
    hasher.finalize().into()
}

/// Big-endian interpretation of a digest as a nonnegative integer.
pub fn digest_to_int(digest: &[u8; 32]) -> Integer {
    Integer::from_digits(digest, Order::Msf)
}

pub fn digest_hex(digest: &[u8; 32]) -> String {
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Derive the origin for one (tag, nonce) pair.
///
/// `primes` must be the ascending small-prime table; only entries up to
/// `primorial` participate in the fold.
pub fn derive(tag: &[u8], nonce: u64, primes: &[u32], primorial: u32) -> Origin {
    let d = digest(tag, nonce);
    let mut value = digest_to_int(&d);
    for &p in primes.iter().take_while(|&&p| p <= primorial) {
        if value.mod_u(p) != 0 {
            value *= p;
        }
    }
    Origin {
        value,
        digest_hex: digest_hex(&d),
    }
}
