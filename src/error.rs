//! Error types for the vanity address search.

use thiserror::Error;

/// Rejected configuration. Surfaced before any derivation work starts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("target prefix must not be empty")]
    EmptyPrefix,

    #[error("target prefix may only contain hex digits (0-9, a-f): {0:?}")]
    PrefixNotHex(String),

    #[error("target prefix is {0} characters, longer than a 40-character address")]
    PrefixTooLong(usize),

    #[error("match count must be at least 1")]
    TargetCountZero,

    #[error("--max-attempts must be at least 1 (use --unbounded to search forever)")]
    MaxAttemptsZero,

    #[error("worker count must be at least 1")]
    WorkersZero,
}

/// A single attempt's key derivation failed.
///
/// The search loop discards the attempt and moves on to the next nonce; this
/// never terminates a run.
#[derive(Debug, Error)]
pub enum DerivationError {
    /// The seed hash fell outside the valid secp256k1 scalar range
    /// (zero or >= the curve order). Roughly a 2^-128 event per seed.
    #[error("seed digest is not a usable secp256k1 secret key: {0}")]
    InvalidSecretKey(#[from] secp256k1::Error),
}

/// Terminal search outcomes other than success.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("gave up after {attempts} attempts: found {found} of {target} match(es)")]
    Exhausted {
        attempts: u64,
        found: u64,
        target: u64,
    },
}
