//! Seeded Ethereum Vanity Address Search CLI
//!
//! Usage:
//!   seed_vanity -p dead                     # 10 addresses starting with "dead"
//!   seed_vanity -p 0xcafe -n 1 -w 1         # one match, single-threaded
//!   seed_vanity -p ab --nonce-mode seq --unbounded

use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use log::warn;

use seed_vanity::{
    Config, MatchResult, NonceMode, NonceSource, PoolEvent, RandomNonces, Search, SearchError,
    SearchPlan, SeedDeriver, SequentialNonces, WorkerPool,
};

enum RunOutcome {
    Completed,
    Cancelled,
    Exhausted(SearchError),
}

fn main() {
    let config = Config::parse();
    init_logging(config.verbose);

    let plan = match config.plan() {
        Ok(plan) => plan,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    };

    if plan.phrase.is_default() {
        warn!("using the built-in entropy phrase; anyone can recompute these keys");
    }

    let workers = config.worker_count();
    print_banner(&plan, workers);

    let outcome = if workers == 1 {
        run_single(plan)
    } else {
        run_pool(
            plan,
            workers,
            Duration::from_secs(config.report_interval.max(1)),
        )
    };

    if let RunOutcome::Exhausted(e) = outcome {
        eprintln!("\n{}", e);
        process::exit(1);
    }
}

/// Single-threaded run, driving the search iterator directly.
fn run_single(plan: SearchPlan) -> RunOutcome {
    let deriver = SeedDeriver::new();
    match plan.nonce_mode {
        NonceMode::Sequential => drive_search(Search::new(plan, deriver, SequentialNonces::new())),
        NonceMode::Random => drive_search(Search::new(plan, deriver, RandomNonces::new())),
    }
}

fn drive_search<N: NonceSource>(mut search: Search<SeedDeriver, N>) -> RunOutcome {
    ctrlc_handler(search.cancel_flag());
    let start = Instant::now();

    let mut found: u64 = 0;
    let mut exhausted = None;
    for item in search.by_ref() {
        match item {
            Ok(result) => {
                found += 1;
                print_match(&result, found);
            }
            Err(e) => {
                exhausted = Some(e);
                break;
            }
        }
    }

    let outcome = if let Some(e) = exhausted {
        RunOutcome::Exhausted(e)
    } else if search.found() >= search.plan().target {
        println!("\nTarget reached! Found {} address(es).", search.found());
        RunOutcome::Completed
    } else {
        println!("\nStopped by user.");
        RunOutcome::Cancelled
    };

    print_stats(search.attempts(), search.found(), start.elapsed());
    outcome
}

/// Multi-worker run, consuming pool events until the target is reached, the
/// budget is spent, or the user stops the search.
fn run_pool(plan: SearchPlan, workers: usize, report_interval: Duration) -> RunOutcome {
    let target = plan.target;
    let pool = WorkerPool::spawn(&plan, workers, SeedDeriver::new());
    ctrlc_handler(pool.stop_flag_clone());

    let mut found: u64 = 0;
    let outcome = loop {
        match pool.next_event(report_interval) {
            PoolEvent::Match(result) => {
                found += 1;
                print_match(&result, found);

                if found >= target {
                    println!("\nTarget reached! Found {} address(es).", found);
                    break RunOutcome::Completed;
                }
            }
            PoolEvent::Tick => print_progress(&pool),
            PoolEvent::Finished => {
                if pool.is_stopped() {
                    println!("\nStopped by user.");
                    break RunOutcome::Cancelled;
                }
                break RunOutcome::Exhausted(SearchError::Exhausted {
                    attempts: pool.total_attempts(),
                    found,
                    target,
                });
            }
        }

        // Check if we should stop (ctrl-c was pressed)
        if pool.is_stopped() {
            println!("\nStopped by user.");
            break RunOutcome::Cancelled;
        }
    };

    print_stats(pool.total_attempts(), found, pool.elapsed());
    pool.join();
    outcome
}

fn print_banner(plan: &SearchPlan, workers: usize) {
    println!("Seeded Vanity Address Search");
    println!("============================");
    println!("Prefix:     {}", plan.prefix);
    println!("Difficulty: {}", plan.prefix.difficulty_description());
    println!("Phrase:     {:?}", plan.phrase.as_str());
    println!("Nonces:     {}", plan.nonce_mode);
    println!("Workers:    {}", workers);
    println!("Target:     {} address(es)", plan.target);
    match plan.max_attempts {
        Some(max) => println!("Budget:     {} attempts", format_number(max)),
        None => println!("Budget:     unbounded"),
    }
    println!();
    println!("Searching... (Press Ctrl+C to stop)\n");
}

fn print_match(result: &MatchResult, index: u64) {
    println!(
        "[{}] Address: {} , PrivateKey: {} (nonce {})",
        index, result.address, result.private_key, result.nonce
    );
}

fn print_progress(pool: &WorkerPool) {
    println!(
        "[{:>4}s] {} attempts ({}/s), {} match(es)",
        pool.elapsed().as_secs(),
        format_number(pool.total_attempts()),
        format_number(pool.attempts_per_second() as u64),
        pool.total_matches()
    );
}

fn print_stats(attempts: u64, found: u64, elapsed: Duration) {
    let rate = if elapsed.as_secs_f64() > 0.0 {
        attempts as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    };

    println!("\n--- Final Statistics ---");
    println!("Total attempts:  {}", format_number(attempts));
    println!("Matches found:   {}", found);
    println!("Time elapsed:    {:.2}s", elapsed.as_secs_f64());
    println!("Average speed:   {}/s", format_number(rate as u64));
}

fn format_number(n: u64) -> String {
    if n >= 1_000_000_000 {
        format!("{:.2}B", n as f64 / 1_000_000_000.0)
    } else if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.2}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

fn ctrlc_handler(stop_flag: Arc<AtomicBool>) {
    ctrlc::set_handler(move || {
        stop_flag.store(true, Ordering::Relaxed);
    })
    .expect("Error setting Ctrl-C handler");
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();
}
