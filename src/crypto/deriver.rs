//! Seed-string to keypair derivation.

use secp256k1::{Secp256k1, SignOnly};

use crate::error::DerivationError;

use super::{keccak256, Keypair};

/// Turns a seed string into a keypair.
///
/// The search loop only needs this one operation, so it sits behind a trait;
/// tests substitute derivers with scripted addresses or failures.
pub trait KeyDeriver {
    fn derive(&self, seed: &str) -> Result<Keypair, DerivationError>;
}

/// Production deriver: Keccak-256 of the seed bytes becomes the secret key.
///
/// The same seed always yields the same keypair, which is what makes a
/// phrase-plus-nonce search reproducible.
#[derive(Clone)]
pub struct SeedDeriver {
    secp: Secp256k1<SignOnly>,
}

impl SeedDeriver {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::signing_only(),
        }
    }
}

impl Default for SeedDeriver {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyDeriver for SeedDeriver {
    fn derive(&self, seed: &str) -> Result<Keypair, DerivationError> {
        Keypair::from_secret_bytes(&self.secp, keccak256(seed.as_bytes()))
    }
}
