//! Worker pool management.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};

use crate::crypto::KeyDeriver;
use crate::entropy::{NonceMode, NonceSource, RandomNonces, SequentialNonces};
use crate::search::{MatchResult, SearchPlan};

use super::cpu::{CpuWorker, SearchStats};

/// Result channel capacity. Matches are rare relative to attempts, so a
/// small buffer keeps workers from ever blocking on send in practice.
const RESULT_BUFFER: usize = 100;

/// What the consumer loop sees next.
#[derive(Debug)]
pub enum PoolEvent {
    /// A worker found a matching address.
    Match(MatchResult),
    /// Nothing arrived within the wait window.
    Tick,
    /// Every worker has exited and the result channel is drained.
    Finished,
}

/// Runs a search plan across several threads.
pub struct WorkerPool {
    num_workers: usize,
    /// Worker thread handles (Option to allow taking during join)
    handles: Option<Vec<JoinHandle<()>>>,
    result_rx: Receiver<MatchResult>,
    stop_flag: Arc<AtomicBool>,
    stats: Arc<SearchStats>,
    start_time: Instant,
}

impl WorkerPool {
    /// Spawns `num_workers` threads searching `plan`.
    ///
    /// A finite attempt budget is split into contiguous per-worker slices,
    /// so the pool performs at most `plan.max_attempts` derivations in total
    /// and a bounded sequential run covers exactly the nonces `0..budget`.
    /// Unbounded sequential workers stride the nonce space instead.
    pub fn spawn<D>(plan: &SearchPlan, num_workers: usize, deriver: D) -> Self
    where
        D: KeyDeriver + Clone + Send + 'static,
    {
        debug_assert!(num_workers > 0);

        let (result_tx, result_rx) = bounded(RESULT_BUFFER);
        let stop_flag = Arc::new(AtomicBool::new(false));
        let stats = Arc::new(SearchStats::new());

        let handles = split_budget(plan.max_attempts, num_workers)
            .into_iter()
            .enumerate()
            .map(|(id, slice)| {
                let plan = plan.clone();
                let result_tx = result_tx.clone();
                let stop_flag = stop_flag.clone();
                let stats = stats.clone();
                let deriver = deriver.clone();

                thread::Builder::new()
                    .name(format!("vanity-worker-{}", id))
                    .spawn(move || {
                        // Built inside the thread because the thread-local rng
                        // behind Random is not Send.
                        let nonces: Box<dyn NonceSource> = match (plan.nonce_mode, slice) {
                            (NonceMode::Sequential, Some((start, _))) => {
                                Box::new(SequentialNonces::starting_at(start))
                            }
                            (NonceMode::Sequential, None) => {
                                Box::new(SequentialNonces::strided(id as u64, num_workers as u64))
                            }
                            (NonceMode::Random, _) => Box::new(RandomNonces::new()),
                        };
                        let budget = slice.map(|(_, len)| len);

                        CpuWorker::new(
                            id, plan, budget, deriver, nonces, result_tx, stop_flag, stats,
                        )
                        .run();
                    })
                    .expect("Failed to spawn worker thread")
            })
            .collect();

        Self {
            num_workers,
            handles: Some(handles),
            result_rx,
            stop_flag,
            stats,
            start_time: Instant::now(),
        }
    }

    /// Waits up to `timeout` for the next pool event.
    pub fn next_event(&self, timeout: Duration) -> PoolEvent {
        match self.result_rx.recv_timeout(timeout) {
            Ok(result) => PoolEvent::Match(result),
            Err(RecvTimeoutError::Timeout) => PoolEvent::Tick,
            Err(RecvTimeoutError::Disconnected) => PoolEvent::Finished,
        }
    }

    /// Blocking iterator over matches; ends once every worker has exited.
    pub fn results(&self) -> impl Iterator<Item = MatchResult> + '_ {
        self.result_rx.iter()
    }

    /// Signals all workers to stop.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }

    /// Waits for all workers to complete.
    pub fn join(mut self) {
        self.stop();
        if let Some(handles) = self.handles.take() {
            for handle in handles {
                let _ = handle.join();
            }
        }
    }

    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Derivation attempts across all workers, including skipped nonces.
    pub fn total_attempts(&self) -> u64 {
        self.stats.total_attempts()
    }

    pub fn total_matches(&self) -> u64 {
        self.stats.total_matches()
    }

    /// Elapsed time since the pool was spawned.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Current attempt rate over the whole run.
    pub fn attempts_per_second(&self) -> f64 {
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.total_attempts() as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Returns a clone of the stop flag for external use (e.g., signal handlers).
    pub fn stop_flag_clone(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    pub fn is_stopped(&self) -> bool {
        self.stop_flag.load(Ordering::Relaxed)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.stop();
        // Wait for workers to finish if they haven't been joined
        if let Some(handles) = self.handles.take() {
            for handle in handles {
                let _ = handle.join();
            }
        }
    }
}

/// Splits a total attempt budget into per-worker `(start, len)` slices.
///
/// Slices are contiguous and the remainder goes to the lowest worker ids,
/// so the union of slices is exactly `0..total`.
fn split_budget(total: Option<u64>, num_workers: usize) -> Vec<Option<(u64, u64)>> {
    let Some(total) = total else {
        return vec![None; num_workers];
    };

    let workers = num_workers as u64;
    let base = total / workers;
    let remainder = total % workers;

    let mut slices = Vec::with_capacity(num_workers);
    let mut start = 0u64;
    for id in 0..workers {
        let len = if id < remainder { base + 1 } else { base };
        slices.push(Some((start, len)));
        start += len;
    }
    slices
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::entropy::{SeedPhrase, SequentialNonces};
    use crate::matcher::Prefix;
    use crate::search::Search;
    use crate::testing::{addr, StubDeriver};

    fn plan(target: u64, max_attempts: Option<u64>) -> SearchPlan {
        SearchPlan::new(
            SeedPhrase::new("pool phrase"),
            Prefix::parse("ab").unwrap(),
            target,
            max_attempts,
            NonceMode::Sequential,
        )
        .unwrap()
    }

    fn every_fifth() -> StubDeriver {
        StubDeriver::new(|nonce| if nonce % 5 == 4 { addr("ab") } else { addr("00") })
    }

    #[test]
    fn test_split_budget_unbounded() {
        assert_eq!(split_budget(None, 3), vec![None, None, None]);
    }

    #[test]
    fn test_split_budget_even() {
        assert_eq!(
            split_budget(Some(100), 4),
            vec![Some((0, 25)), Some((25, 25)), Some((50, 25)), Some((75, 25))]
        );
    }

    #[test]
    fn test_split_budget_remainder_to_low_ids() {
        assert_eq!(
            split_budget(Some(10), 3),
            vec![Some((0, 4)), Some((4, 3)), Some((7, 3))]
        );
    }

    #[test]
    fn test_split_budget_smaller_than_pool() {
        // A zero-length slice never draws a nonce, so its start is unused.
        assert_eq!(
            split_budget(Some(2), 4),
            vec![Some((0, 1)), Some((1, 1)), Some((2, 0)), Some((2, 0))]
        );
    }

    #[test]
    fn test_bounded_pool_agrees_with_single_threaded_run() {
        let plan = plan(u64::MAX, Some(100));

        let baseline: Vec<u64> = Search::new(plan.clone(), every_fifth(), SequentialNonces::new())
            .filter_map(|item| item.ok())
            .map(|result| result.nonce)
            .collect();

        let pool = WorkerPool::spawn(&plan, 4, every_fifth());
        let mut nonces: Vec<u64> = pool.results().map(|result| result.nonce).collect();
        nonces.sort_unstable();

        assert_eq!(pool.num_workers(), 4);
        assert_eq!(pool.total_attempts(), 100);
        assert_eq!(nonces, (4..100).step_by(5).collect::<Vec<u64>>());
        assert_eq!(nonces, baseline);
        pool.join();
    }

    #[test]
    fn test_pool_stops_itself_at_target() {
        let pool = WorkerPool::spawn(&plan(3, None), 4, every_fifth());

        // The iterator ending proves every worker exited without stop().
        let results: Vec<MatchResult> = pool.results().collect();
        assert!(results.len() >= 3);
        for result in &results {
            assert_eq!(result.nonce % 5, 4);
        }
        assert!(!pool.is_stopped());
        pool.join();
    }

    #[test]
    fn test_exhausted_pool_reports_finished() {
        let deriver = StubDeriver::new(|_| addr("00"));
        let pool = WorkerPool::spawn(&plan(1, Some(40)), 4, deriver);

        loop {
            match pool.next_event(Duration::from_secs(30)) {
                PoolEvent::Match(result) => panic!("unexpected match at nonce {}", result.nonce),
                PoolEvent::Tick => continue,
                PoolEvent::Finished => break,
            }
        }
        assert_eq!(pool.total_attempts(), 40);
        assert_eq!(pool.total_matches(), 0);
        assert!(!pool.is_stopped());
        pool.join();
    }

    #[test]
    fn test_stop_ends_unbounded_run() {
        let deriver = StubDeriver::new(|_| addr("00"));
        let pool = WorkerPool::spawn(&plan(1, None), 2, deriver);

        pool.stop_flag_clone().store(true, Ordering::Relaxed);
        // Workers notice the flag; join returning is the assertion.
        pool.join();
    }

    #[test]
    fn test_join_returns_while_workers_flood_the_channel() {
        // Every nonce matches, so the result buffer fills long before the
        // target and workers end up parked in send.
        let deriver = StubDeriver::new(|_| addr("ab"));
        let pool = WorkerPool::spawn(&plan(u64::MAX, None), 2, deriver);

        while pool.total_matches() <= RESULT_BUFFER as u64 {
            thread::sleep(Duration::from_millis(10));
        }

        // Parked workers must still honor the stop raised by join.
        pool.join();
    }
}
