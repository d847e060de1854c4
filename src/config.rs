//! Runtime configuration for the vanity address search.

use clap::Parser;

use crate::entropy::{NonceMode, SeedPhrase, DEFAULT_PHRASE};
use crate::error::ConfigError;
use crate::matcher::Prefix;
use crate::search::SearchPlan;

/// Seeded Ethereum vanity address generator
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Hex prefix the address must start with (0x marker optional)
    #[arg(short, long, env = "GENERATOR_PREFIX")]
    pub prefix: String,

    /// Entropy phrase that seeds every derivation
    #[arg(short, long, env = "GENERATOR_ENTROPY", default_value = DEFAULT_PHRASE)]
    pub entropy: String,

    /// Stop after finding this many addresses
    #[arg(short = 'n', long, default_value = "10")]
    pub count: u64,

    /// Number of worker threads (default: number of CPU cores)
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Nonce selection: random or sequential
    #[arg(long, default_value = "random", value_name = "MODE")]
    pub nonce_mode: NonceMode,

    /// Give up after this many derivation attempts
    #[arg(long, conflicts_with = "unbounded")]
    pub max_attempts: Option<u64>,

    /// Keep searching until the target count is reached, with no attempt limit
    #[arg(long)]
    pub unbounded: bool,

    /// Progress report interval in seconds
    #[arg(short = 'r', long, default_value = "5")]
    pub report_interval: u64,

    /// Enable debug logging
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl Config {
    /// Returns the number of workers, defaulting to CPU count
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get)
    }

    /// Validates the configuration and builds the search plan.
    pub fn plan(&self) -> Result<SearchPlan, ConfigError> {
        if self.workers == Some(0) {
            return Err(ConfigError::WorkersZero);
        }
        if self.count == 0 {
            return Err(ConfigError::TargetCountZero);
        }

        let prefix = Prefix::parse(&self.prefix)?;
        let max_attempts = self.attempt_bound(&prefix)?;

        SearchPlan::new(
            SeedPhrase::new(self.entropy.clone()),
            prefix,
            self.count,
            max_attempts,
            self.nonce_mode,
        )
    }

    /// The explicit budget if one was given, or a default of 64 attempts per
    /// expected match. Spending the default without reaching the target means
    /// the run was overwhelmingly unlucky or the prefix is misjudged.
    fn attempt_bound(&self, prefix: &Prefix) -> Result<Option<u64>, ConfigError> {
        if self.unbounded {
            return Ok(None);
        }

        match self.max_attempts {
            Some(0) => Err(ConfigError::MaxAttemptsZero),
            Some(n) => Ok(Some(n)),
            None => Ok(Some(
                prefix
                    .estimated_difficulty()
                    .saturating_mul(self.count)
                    .saturating_mul(64),
            )),
        }
    }
}
