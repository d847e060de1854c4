//! # seed_vanity
//!
//! Seeded Ethereum vanity address generator: derives keypairs from an
//! entropy phrase plus a per-attempt nonce and keeps the ones whose address
//! starts with a wanted hex prefix.
//!
//! ## Architecture
//!
//! - `entropy`: Seed phrase and nonce sources
//! - `crypto`: Seed-to-key derivation and address encoding
//! - `matcher`: Prefix validation and matching
//! - `search`: Single-threaded search loop
//! - `worker`: Parallel execution and worker pool management
//! - `config`: Runtime configuration
//!
//! Derived keys are only as safe as the entropy phrase: anyone who can guess
//! the phrase can regenerate every key, so searches meant to hold funds need
//! a phrase with real entropy behind it.

pub mod config;
pub mod crypto;
pub mod entropy;
pub mod error;
pub mod matcher;
pub mod search;
pub mod worker;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use crypto::{Address, KeyDeriver, Keypair, SeedDeriver};
pub use entropy::{NonceMode, NonceSource, RandomNonces, SeedPhrase, SequentialNonces};
pub use error::{ConfigError, DerivationError, SearchError};
pub use matcher::Prefix;
pub use search::{MatchResult, Search, SearchPlan};
pub use worker::{PoolEvent, WorkerPool};
