//! Worker pool for parallel vanity key search.
//!
//! This module provides:
//! - Multi-threaded CPU workers with batched attempt counting
//! - A first-writer-wins rendezvous for the winning key
//! - Cooperative cancellation and periodic progress sampling

mod cancel;
mod counter;
mod cpu;
mod pool;
mod progress;
mod rendezvous;

pub use cancel::CancelToken;
pub use counter::AttemptCounter;
pub use cpu::{CpuWorker, WorkerExit};
pub use pool::{
    run, SearchConfig, SearchOutcome, VanityResult, WorkerPool, DEFAULT_BATCH_SIZE,
    DEFAULT_REPORT_INTERVAL, DEFAULT_WORKER_MULTIPLIER,
};
pub use progress::{format_elapsed, ProgressReporter, ProgressSample};
pub use rendezvous::{rendezvous, Publisher, Waiter};
