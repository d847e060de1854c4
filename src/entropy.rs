//! Seed material: base phrase plus a per-attempt nonce.

use std::fmt;
use std::str::FromStr;

use rand::rngs::ThreadRng;
use rand::Rng;

/// Fallback entropy phrase, for trying the tool out.
///
/// Anyone can recompute every key this phrase produces, so operators must
/// supply their own phrase before deriving anything that will hold funds.
pub const DEFAULT_PHRASE: &str = "Entropy party: dishes piled, guests gone.";

/// Separator between the phrase and the nonce inside a seed string.
pub const SEED_SEPARATOR: &str = " - ";

/// The base phrase every candidate seed is built from.
///
/// A seed is `"{phrase} - {nonce}"`; distinct nonces give distinct seeds, and
/// the same phrase with the same nonce sequence reproduces the same search.
#[derive(Debug, Clone)]
pub struct SeedPhrase(String);

impl SeedPhrase {
    pub fn new(phrase: impl Into<String>) -> Self {
        Self(phrase.into())
    }

    /// Builds the seed string for one attempt.
    #[inline]
    pub fn seed(&self, nonce: u64) -> String {
        format!("{}{}{}", self.0, SEED_SEPARATOR, nonce)
    }

    /// True when the operator left the built-in phrase in place.
    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_PHRASE
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SeedPhrase {
    fn default() -> Self {
        Self::new(DEFAULT_PHRASE)
    }
}

/// Supplies one nonce per attempt.
///
/// Uniqueness within a run is all the search needs; unpredictability is a
/// bonus that keeps separate runs over the same phrase from retreading the
/// same seeds.
pub trait NonceSource {
    fn next_nonce(&mut self) -> u64;
}

impl<T: NonceSource + ?Sized> NonceSource for Box<T> {
    #[inline]
    fn next_nonce(&mut self) -> u64 {
        (**self).next_nonce()
    }
}

/// Deterministic nonce sequence: `start`, `start + step`, `start + 2*step`, …
///
/// Striding lets parallel workers cover disjoint slices of the nonce space.
#[derive(Debug, Clone)]
pub struct SequentialNonces {
    next: u64,
    step: u64,
}

impl SequentialNonces {
    /// Counts 0, 1, 2, …
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(start: u64) -> Self {
        Self::strided(start, 1)
    }

    pub fn strided(start: u64, step: u64) -> Self {
        debug_assert!(step > 0, "a zero step would repeat one nonce forever");
        Self { next: start, step }
    }
}

impl Default for SequentialNonces {
    fn default() -> Self {
        Self::new()
    }
}

impl NonceSource for SequentialNonces {
    #[inline]
    fn next_nonce(&mut self) -> u64 {
        let nonce = self.next;
        self.next = self.next.wrapping_add(self.step);
        nonce
    }
}

/// Uniform random nonces from the thread-local CSPRNG.
pub struct RandomNonces {
    rng: ThreadRng,
}

impl RandomNonces {
    pub fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }
}

impl Default for RandomNonces {
    fn default() -> Self {
        Self::new()
    }
}

impl NonceSource for RandomNonces {
    #[inline]
    fn next_nonce(&mut self) -> u64 {
        self.rng.gen()
    }
}

/// Which nonce source a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NonceMode {
    /// Cryptographically strong draws; the right choice for real searches.
    #[default]
    Random,
    /// Reproducible 0, 1, 2, … sequence for tests and replayable runs.
    Sequential,
}

impl FromStr for NonceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "random" | "rand" => Ok(NonceMode::Random),
            "sequential" | "seq" => Ok(NonceMode::Sequential),
            _ => Err(format!("Unknown nonce mode: {}", s)),
        }
    }
}

impl fmt::Display for NonceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NonceMode::Random => write!(f, "random"),
            NonceMode::Sequential => write!(f, "sequential"),
        }
    }
}
