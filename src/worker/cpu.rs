//! CPU worker: one thread's slice of the search.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{SendTimeoutError, Sender};
use log::debug;

use crate::crypto::KeyDeriver;
use crate::entropy::NonceSource;
use crate::search::{MatchResult, SearchPlan};

/// How long a blocked result send waits between stop-flag checks.
const SEND_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Counters shared by every worker in a pool.
#[derive(Debug, Default)]
pub struct SearchStats {
    /// Derivation attempts, including skipped nonces.
    pub attempts: AtomicU64,
    /// Matches found.
    pub matches: AtomicU64,
}

impl SearchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    pub fn total_matches(&self) -> u64 {
        self.matches.load(Ordering::Relaxed)
    }
}

/// A worker that derives and tests keypairs from its own nonce source.
pub struct CpuWorker<D, N> {
    id: usize,
    plan: SearchPlan,
    /// This worker's share of the pool-wide attempt budget.
    budget: Option<u64>,
    deriver: D,
    nonces: N,
    result_tx: Sender<MatchResult>,
    stop_flag: Arc<AtomicBool>,
    stats: Arc<SearchStats>,
}

impl<D: KeyDeriver, N: NonceSource> CpuWorker<D, N> {
    pub fn new(
        id: usize,
        plan: SearchPlan,
        budget: Option<u64>,
        deriver: D,
        nonces: N,
        result_tx: Sender<MatchResult>,
        stop_flag: Arc<AtomicBool>,
        stats: Arc<SearchStats>,
    ) -> Self {
        Self {
            id,
            plan,
            budget,
            deriver,
            nonces,
            result_tx,
            stop_flag,
            stats,
        }
    }

    /// Runs the worker loop until one of:
    /// - the stop flag is raised
    /// - the pool-wide match count reaches the target
    /// - this worker's attempt budget is spent
    /// - the result channel is closed
    pub fn run(mut self) {
        let mut attempted: u64 = 0;

        loop {
            if self.stop_flag.load(Ordering::Relaxed) {
                break;
            }
            if self.stats.total_matches() >= self.plan.target {
                break;
            }
            if let Some(budget) = self.budget {
                if attempted >= budget {
                    break;
                }
            }

            attempted += 1;
            self.stats.attempts.fetch_add(1, Ordering::Relaxed);

            let nonce = self.nonces.next_nonce();
            let seed = self.plan.phrase.seed(nonce);
            let keypair = match self.deriver.derive(&seed) {
                Ok(keypair) => keypair,
                Err(err) => {
                    debug!("worker {}: skipping nonce {}: {}", self.id, nonce, err);
                    continue;
                }
            };

            if self.plan.prefix.matches(keypair.address()) {
                self.stats.matches.fetch_add(1, Ordering::Relaxed);
                if !self.send_result(MatchResult::new(&keypair, nonce)) {
                    break;
                }
            }
        }

        debug!("worker {} done after {} attempts", self.id, attempted);
    }

    /// Delivers a match, waking periodically so a worker parked on a full
    /// channel still honors the stop flag. Returns `false` when the worker
    /// should exit instead: stopped, or the receiving side is gone.
    fn send_result(&self, result: MatchResult) -> bool {
        let mut pending = result;
        loop {
            if self.stop_flag.load(Ordering::Relaxed) {
                return false;
            }
            match self.result_tx.send_timeout(pending, SEND_POLL_INTERVAL) {
                Ok(()) => return true,
                Err(SendTimeoutError::Timeout(result)) => pending = result,
                Err(SendTimeoutError::Disconnected(_)) => return false,
            }
        }
    }
}
