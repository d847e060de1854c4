//! Ethereum address representation and encodings.

use std::fmt;

use secp256k1::PublicKey;

use super::keccak256;

/// A 20-byte Ethereum address.
///
/// Matching works on the lowercase hex body; display uses the EIP-55
/// checksummed form the rest of the ecosystem prints.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; 20]);

impl Address {
    /// Length in bytes.
    pub const LEN: usize = 20;

    /// Length of the hex body, without a 0x marker.
    pub const HEX_LEN: usize = 40;

    #[inline]
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Standard Ethereum address transform: Keccak-256 over the uncompressed
    /// public key body (the 64 bytes after the 0x04 tag), keeping the last
    /// 20 bytes of the digest.
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        let uncompressed = public_key.serialize_uncompressed();
        let digest = keccak256(&uncompressed[1..]);

        let mut bytes = [0u8; Self::LEN];
        bytes.copy_from_slice(&digest[32 - Self::LEN..]);
        Self(bytes)
    }

    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Lowercase hex body, no 0x marker. This is the form prefixes are
    /// matched against.
    #[inline]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// EIP-55 checksummed form with the 0x marker.
    ///
    /// Each hex letter is uppercased when the corresponding nibble of
    /// Keccak-256(lowercase body) is >= 8; digits pass through unchanged.
    pub fn to_checksum(&self) -> String {
        let body = self.to_hex();
        let digest = keccak256(body.as_bytes());

        let mut out = String::with_capacity(2 + Self::HEX_LEN);
        out.push_str("0x");
        for (i, ch) in body.chars().enumerate() {
            let byte = digest[i / 2];
            let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
            if nibble >= 8 {
                out.push(ch.to_ascii_uppercase());
            } else {
                out.push(ch);
            }
        }
        out
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_checksum())
    }
}
