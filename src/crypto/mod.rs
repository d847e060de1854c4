//! Key derivation and address encoding.
//!
//! This module provides:
//! - Deterministic secret-key derivation from seed strings (Keccak-256)
//! - Ethereum address derivation and EIP-55 encoding
//! - The `KeyDeriver` seam the search loop is generic over

mod address;
mod deriver;
mod keypair;

pub use address::Address;
pub use deriver::{KeyDeriver, SeedDeriver};
pub use keypair::Keypair;

use tiny_keccak::{Hasher, Keccak};

/// Keccak-256 digest of `data`.
pub(crate) fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut digest = [0u8; 32];
    hasher.finalize(&mut digest);
    digest
}
