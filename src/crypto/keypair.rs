//! Secret key plus the address it derives to.

use secp256k1::{PublicKey, Secp256k1, SecretKey, SignOnly};

use crate::error::DerivationError;

use super::Address;

/// A secp256k1 private key together with its Ethereum address.
#[derive(Debug, Clone)]
pub struct Keypair {
    secret: [u8; 32],
    address: Address,
}

impl Keypair {
    /// Builds a keypair from raw secret bytes.
    ///
    /// Fails when the bytes are not a valid secp256k1 scalar (zero, or at or
    /// above the curve order). Callers feeding digest output hit this with
    /// negligible probability but must still handle it.
    pub fn from_secret_bytes(
        secp: &Secp256k1<SignOnly>,
        secret: [u8; 32],
    ) -> Result<Self, DerivationError> {
        let secret_key = SecretKey::from_slice(&secret)?;
        let public_key = PublicKey::from_secret_key(secp, &secret_key);

        Ok(Self {
            secret,
            address: Address::from_public_key(&public_key),
        })
    }

    #[inline]
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Private key as lowercase hex, no 0x marker.
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.secret)
    }

    pub fn private_key_bytes(&self) -> &[u8; 32] {
        &self.secret
    }

    /// Assembles a keypair without touching the curve. Lets tests pin an
    /// address to a nonce without doing real key derivation.
    #[cfg(test)]
    pub(crate) fn from_raw_parts(secret: [u8; 32], address: Address) -> Self {
        Self { secret, address }
    }
}
