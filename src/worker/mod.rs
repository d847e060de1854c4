//! Multi-threaded search.
//!
//! A pool of CPU workers shares one plan, one stop flag, and one set of
//! counters; matches flow back to the consumer over a bounded channel.

mod cpu;
mod pool;

pub use cpu::{CpuWorker, SearchStats};
pub use pool::{PoolEvent, WorkerPool};
