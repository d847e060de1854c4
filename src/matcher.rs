//! Prefix matching against candidate addresses.

use std::fmt;

use crate::crypto::Address;
use crate::error::ConfigError;

/// A validated hex prefix, normalized to lowercase.
///
/// Parsing strips an optional 0x marker so users can paste prefixes in the
/// same shape addresses are displayed in. Matching runs against the lowercase
/// address body, which makes it case-insensitive by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prefix {
    hex: String,
}

impl Prefix {
    /// Longest useful prefix: the full address body.
    pub const MAX_LEN: usize = Address::HEX_LEN;

    /// Validates and normalizes a user-supplied prefix.
    pub fn parse(input: &str) -> Result<Self, ConfigError> {
        let trimmed = input.trim();
        let body = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if body.is_empty() {
            return Err(ConfigError::EmptyPrefix);
        }
        if !body.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ConfigError::PrefixNotHex(body.to_string()));
        }
        if body.len() > Self::MAX_LEN {
            return Err(ConfigError::PrefixTooLong(body.len()));
        }

        Ok(Self {
            hex: body.to_ascii_lowercase(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.hex
    }

    pub fn len(&self) -> usize {
        self.hex.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hex.is_empty()
    }

    /// True when the address hex body starts with this prefix.
    #[inline]
    pub fn matches(&self, address: &Address) -> bool {
        address.to_hex().starts_with(&self.hex)
    }

    /// Expected attempts per match. Each hex position has 16 possible values,
    /// so a prefix of length n costs about 16^n attempts.
    pub fn estimated_difficulty(&self) -> u64 {
        16u64.saturating_pow(self.hex.len() as u32)
    }

    /// Human-readable difficulty estimate.
    pub fn difficulty_description(&self) -> String {
        match self.estimated_difficulty() {
            0..=1_000 => "Very Easy (< 1 second)".into(),
            1_001..=100_000 => "Easy (seconds)".into(),
            100_001..=10_000_000 => "Medium (minutes)".into(),
            10_000_001..=1_000_000_000 => "Hard (hours)".into(),
            _ => "Very Hard (days or more)".into(),
        }
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex)
    }
}
