//! Single-threaded search over the nonce space.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::debug;

use crate::crypto::{KeyDeriver, Keypair};
use crate::entropy::{NonceMode, NonceSource, SeedPhrase};
use crate::error::{ConfigError, SearchError};
use crate::matcher::Prefix;

/// One found address, in output form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// EIP-55 checksummed address with the 0x marker.
    pub address: String,
    /// Private key as 0x-prefixed hex.
    pub private_key: String,
    /// The nonce whose seed produced this keypair.
    pub nonce: u64,
}

impl MatchResult {
    pub(crate) fn new(keypair: &Keypair, nonce: u64) -> Self {
        Self {
            address: keypair.address().to_checksum(),
            private_key: format!("0x{}", keypair.private_key_hex()),
            nonce,
        }
    }
}

/// Everything a search needs to know before it starts.
#[derive(Debug, Clone)]
pub struct SearchPlan {
    pub phrase: SeedPhrase,
    pub prefix: Prefix,
    /// How many matches to collect before stopping.
    pub target: u64,
    /// Attempt budget across the whole run. `None` searches until the target
    /// is reached or the run is cancelled.
    pub max_attempts: Option<u64>,
    pub nonce_mode: NonceMode,
}

impl SearchPlan {
    pub fn new(
        phrase: SeedPhrase,
        prefix: Prefix,
        target: u64,
        max_attempts: Option<u64>,
        nonce_mode: NonceMode,
    ) -> Result<Self, ConfigError> {
        if target == 0 {
            return Err(ConfigError::TargetCountZero);
        }
        if max_attempts == Some(0) {
            return Err(ConfigError::MaxAttemptsZero);
        }

        Ok(Self {
            phrase,
            prefix,
            target,
            max_attempts,
            nonce_mode,
        })
    }
}

/// Iterator over matches for a plan.
///
/// Each `next` call runs derivation attempts until a match turns up, the
/// attempt budget runs out (one `Err` item, then the iterator is finished),
/// the target count is reached, or the cancel flag is raised. Nonces whose
/// seed digests are not valid secret keys are skipped, not treated as errors.
pub struct Search<D, N> {
    plan: SearchPlan,
    deriver: D,
    nonces: N,
    cancel: Arc<AtomicBool>,
    attempts: u64,
    found: u64,
    done: bool,
}

impl<D: KeyDeriver, N: NonceSource> Search<D, N> {
    pub fn new(plan: SearchPlan, deriver: D, nonces: N) -> Self {
        Self {
            plan,
            deriver,
            nonces,
            cancel: Arc::new(AtomicBool::new(false)),
            attempts: 0,
            found: 0,
            done: false,
        }
    }

    /// Handle for external cancellation, e.g. a Ctrl-C handler. Raising it
    /// stops the search before its next attempt.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Derivation attempts so far, including skipped nonces.
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    pub fn found(&self) -> u64 {
        self.found
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    pub fn plan(&self) -> &SearchPlan {
        &self.plan
    }
}

impl<D: KeyDeriver, N: NonceSource> Iterator for Search<D, N> {
    type Item = Result<MatchResult, SearchError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.found >= self.plan.target {
            return None;
        }

        loop {
            if self.cancel.load(Ordering::Relaxed) {
                return None;
            }

            if let Some(max) = self.plan.max_attempts {
                if self.attempts >= max {
                    self.done = true;
                    return Some(Err(SearchError::Exhausted {
                        attempts: self.attempts,
                        found: self.found,
                        target: self.plan.target,
                    }));
                }
            }

            self.attempts += 1;
            let nonce = self.nonces.next_nonce();
            let seed = self.plan.phrase.seed(nonce);

            let keypair = match self.deriver.derive(&seed) {
                Ok(keypair) => keypair,
                Err(err) => {
                    debug!("skipping nonce {}: {}", nonce, err);
                    continue;
                }
            };

            if self.plan.prefix.matches(keypair.address()) {
                self.found += 1;
                return Some(Ok(MatchResult::new(&keypair, nonce)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::crypto::SeedDeriver;
    use crate::entropy::SequentialNonces;
    use crate::testing::{addr, StubDeriver};

    fn plan(prefix: &str, target: u64, max_attempts: Option<u64>) -> SearchPlan {
        SearchPlan::new(
            SeedPhrase::new("test phrase"),
            Prefix::parse(prefix).unwrap(),
            target,
            max_attempts,
            NonceMode::Sequential,
        )
        .unwrap()
    }

    #[test]
    fn test_plan_rejects_zero_target() {
        let result = SearchPlan::new(
            SeedPhrase::new("p"),
            Prefix::parse("a").unwrap(),
            0,
            None,
            NonceMode::Sequential,
        );
        assert_eq!(result.unwrap_err(), ConfigError::TargetCountZero);
    }

    #[test]
    fn test_plan_rejects_zero_budget() {
        let result = SearchPlan::new(
            SeedPhrase::new("p"),
            Prefix::parse("a").unwrap(),
            1,
            Some(0),
            NonceMode::Sequential,
        );
        assert_eq!(result.unwrap_err(), ConfigError::MaxAttemptsZero);
    }

    #[test]
    fn test_finds_match_and_stops_at_target() {
        // Nonce 1 is the only hit.
        let deriver = StubDeriver::new(|nonce| if nonce == 1 { addr("ab") } else { addr("00") });
        let mut search = Search::new(plan("ab", 1, None), deriver, SequentialNonces::new());

        let result = search.next().unwrap().unwrap();
        assert_eq!(result.nonce, 1);
        assert_eq!(search.attempts(), 2);
        assert_eq!(search.found(), 1);

        // Target reached, iterator is finished.
        assert!(search.next().is_none());
    }

    #[test]
    fn test_collects_matches_in_nonce_order() {
        // Every fifth nonce matches.
        let deriver = StubDeriver::new(|nonce| if nonce % 5 == 4 { addr("ab") } else { addr("00") });
        let mut search = Search::new(plan("ab", 3, None), deriver, SequentialNonces::new());

        let nonces: Vec<u64> = search.by_ref().map(|item| item.unwrap().nonce).collect();
        assert_eq!(nonces, vec![4, 9, 14]);
        assert_eq!(search.attempts(), 15);
        assert_eq!(search.found(), 3);
    }

    #[test]
    fn test_found_agrees_with_consumer_count() {
        let deriver = StubDeriver::new(|nonce| if nonce % 2 == 0 { addr("ab") } else { addr("00") });
        let mut search = Search::new(plan("ab", 3, None), deriver, SequentialNonces::new());

        // A consumer numbering matches as they arrive sees the same count
        // the search reports once the loop ends.
        let mut seen: u64 = 0;
        for item in search.by_ref() {
            seen += 1;
            assert_eq!(item.unwrap().nonce % 2, 0);
        }

        assert_eq!(seen, 3);
        assert_eq!(search.found(), seen);
        assert_eq!(search.attempts(), 5);
    }

    #[test]
    fn test_skipped_derivation_counts_as_attempt() {
        let deriver =
            StubDeriver::new(|nonce| if nonce == 1 { addr("ab") } else { addr("00") }).failing_on(0);
        let mut search = Search::new(plan("ab", 1, None), deriver.clone(), SequentialNonces::new());

        let result = search.next().unwrap().unwrap();
        assert_eq!(result.nonce, 1);
        assert_eq!(search.attempts(), 2);
        assert_eq!(deriver.call_count(), 2);
    }

    #[test]
    fn test_budget_exhaustion_yields_one_error() {
        let deriver = StubDeriver::new(|_| addr("00"));
        let mut search = Search::new(plan("ab", 1, Some(10)), deriver.clone(), SequentialNonces::new());

        match search.next() {
            Some(Err(SearchError::Exhausted {
                attempts,
                found,
                target,
            })) => {
                assert_eq!(attempts, 10);
                assert_eq!(found, 0);
                assert_eq!(target, 1);
            }
            other => panic!("expected exhaustion, got {:?}", other.map(|r| r.map(|m| m.nonce))),
        }
        assert_eq!(deriver.call_count(), 10);

        // The error is terminal.
        assert!(search.next().is_none());
    }

    #[test]
    fn test_partial_matches_reported_on_exhaustion() {
        let deriver = StubDeriver::new(|nonce| if nonce == 2 { addr("ab") } else { addr("00") });
        let mut search = Search::new(plan("ab", 5, Some(10)), deriver, SequentialNonces::new());

        assert_eq!(search.next().unwrap().unwrap().nonce, 2);
        match search.next() {
            Some(Err(SearchError::Exhausted { found, .. })) => assert_eq!(found, 1),
            other => panic!("expected exhaustion, got {:?}", other.map(|r| r.map(|m| m.nonce))),
        }
    }

    #[test]
    fn test_cancel_before_start() {
        let deriver = StubDeriver::new(|_| addr("ab"));
        let mut search = Search::new(plan("ab", 1, None), deriver, SequentialNonces::new());

        search.cancel_flag().store(true, Ordering::Relaxed);
        assert!(search.next().is_none());
        assert_eq!(search.attempts(), 0);
        assert!(search.is_cancelled());
    }

    #[test]
    fn test_cancel_keeps_earlier_matches() {
        let deriver = StubDeriver::new(|_| addr("ab"));
        let mut search = Search::new(plan("ab", 10, None), deriver, SequentialNonces::new());

        assert!(search.next().unwrap().is_ok());
        search.cancel_flag().store(true, Ordering::Relaxed);

        assert!(search.next().is_none());
        assert_eq!(search.found(), 1);
    }

    #[test]
    fn test_real_derivation_honors_prefix() {
        let search = Search::new(
            plan("a", 2, Some(10_000)),
            SeedDeriver::new(),
            SequentialNonces::new(),
        );

        let results: Vec<MatchResult> = search.map(|item| item.unwrap()).collect();
        assert_eq!(results.len(), 2);
        for result in &results {
            assert!(result.address.starts_with("0x"));
            assert!(result.address[2..].to_ascii_lowercase().starts_with('a'));
            assert_eq!(result.private_key.len(), 2 + 64);
        }
    }

    #[test]
    fn test_real_derivation_is_reproducible() {
        let run = || {
            Search::new(
                plan("a", 2, Some(10_000)),
                SeedDeriver::new(),
                SequentialNonces::new(),
            )
            .map(|item| item.unwrap())
            .collect::<Vec<MatchResult>>()
        };

        assert_eq!(run(), run());
    }
}
