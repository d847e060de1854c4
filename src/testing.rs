//! Shared fixtures for the test suite.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::crypto::{Address, KeyDeriver, Keypair};
use crate::entropy::SEED_SEPARATOR;
use crate::error::DerivationError;

/// Recovers the nonce from a seed string built by `SeedPhrase::seed`.
pub(crate) fn seed_nonce(seed: &str) -> u64 {
    seed.rsplit(SEED_SEPARATOR)
        .next()
        .and_then(|tail| tail.parse().ok())
        .expect("seed carries no nonce")
}

/// Builds an address whose hex body starts with `head`, zero-padded.
pub(crate) fn addr(head: &str) -> Address {
    let mut body = String::from(head);
    while body.len() < Address::HEX_LEN {
        body.push('0');
    }
    let bytes: [u8; 20] = hex::decode(body).unwrap().try_into().unwrap();
    Address::from_bytes(bytes)
}

/// Scripted deriver: maps each nonce to a fixed address, optionally failing
/// on one nonce, and counting every call. Clones share the call counter.
#[derive(Clone)]
pub(crate) struct StubDeriver {
    address_for: fn(u64) -> Address,
    fail_on: Option<u64>,
    calls: Arc<AtomicU64>,
}

impl StubDeriver {
    pub(crate) fn new(address_for: fn(u64) -> Address) -> Self {
        Self {
            address_for,
            fail_on: None,
            calls: Arc::new(AtomicU64::new(0)),
        }
    }

    pub(crate) fn failing_on(mut self, nonce: u64) -> Self {
        self.fail_on = Some(nonce);
        self
    }

    pub(crate) fn call_count(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }
}

impl KeyDeriver for StubDeriver {
    fn derive(&self, seed: &str) -> Result<Keypair, DerivationError> {
        self.calls.fetch_add(1, Ordering::Relaxed);

        let nonce = seed_nonce(seed);
        if self.fail_on == Some(nonce) {
            return Err(DerivationError::InvalidSecretKey(
                secp256k1::Error::InvalidSecretKey,
            ));
        }
        Ok(Keypair::from_raw_parts([0x42; 32], (self.address_for)(nonce)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_nonce_roundtrip() {
        use crate::entropy::SeedPhrase;

        let phrase = SeedPhrase::new("some phrase");
        assert_eq!(seed_nonce(&phrase.seed(42)), 42);
        assert_eq!(seed_nonce(&phrase.seed(u64::MAX)), u64::MAX);
    }

    #[test]
    fn test_addr_pads_to_full_width() {
        assert_eq!(addr("ab").to_hex(), format!("ab{}", "0".repeat(38)));
    }
}
