//! Worker pool management.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::crypto::{EncodedPublicKey, KeySource, Keypair};
use crate::matcher::Matcher;

use super::cpu::{CpuWorker, WorkerExit};
use super::progress::{ProgressReporter, ProgressSample};
use super::rendezvous::{rendezvous, Publisher, Waiter};
use super::{AttemptCounter, CancelToken};

/// Default number of workers per available CPU.
pub const DEFAULT_WORKER_MULTIPLIER: usize = 3;

/// Default attempts per counter flush.
pub const DEFAULT_BATCH_SIZE: u64 = 1000;

/// Default progress sampling interval.
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// Tunables for one search run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Number of worker threads
    pub workers: usize,
    /// Attempts each worker makes between touches of shared state
    pub batch_size: u64,
    /// Progress sampling interval
    pub report_interval: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get() * DEFAULT_WORKER_MULTIPLIER,
            batch_size: DEFAULT_BATCH_SIZE,
            report_interval: DEFAULT_REPORT_INTERVAL,
        }
    }
}

/// Result of a successful vanity key search.
#[derive(Debug, Clone)]
pub struct VanityResult {
    /// The matching keypair
    pub keypair: Keypair,
    /// Its encoded public key, which contains the target
    pub public_key: EncodedPublicKey,
    /// Global attempt count at the moment of the match, including the
    /// winner's unflushed batch
    pub attempts_at_match: u64,
    /// The ID of the worker that found this result
    pub worker_id: usize,
}

/// How a search run ended.
#[derive(Debug)]
pub enum SearchOutcome {
    /// A worker found a match. `total_attempts` was read after every worker
    /// stopped, so it is at least `result.attempts_at_match`.
    Found {
        result: VanityResult,
        total_attempts: u64,
        elapsed: Duration,
    },
    /// The pool was cancelled externally before any match.
    Interrupted { total_attempts: u64, elapsed: Duration },
}

impl SearchOutcome {
    pub fn total_attempts(&self) -> u64 {
        match self {
            SearchOutcome::Found { total_attempts, .. }
            | SearchOutcome::Interrupted { total_attempts, .. } => *total_attempts,
        }
    }

    /// Returns the first summary line printed after the search.
    pub fn headline(&self) -> String {
        match self {
            SearchOutcome::Found { result, .. } => {
                format!("Match found after {} attempts!", result.attempts_at_match)
            }
            SearchOutcome::Interrupted { .. } => "Search interrupted by user".into(),
        }
    }

    /// Returns the winning result, if any.
    pub fn into_result(self) -> Option<VanityResult> {
        match self {
            SearchOutcome::Found { result, .. } => Some(result),
            SearchOutcome::Interrupted { .. } => None,
        }
    }
}

/// Manages a pool of workers searching for one matching key.
///
/// Lifecycle: searching until a worker publishes, then cancelling the rest,
/// then draining (joining every worker) before the outcome is returned.
pub struct WorkerPool {
    /// Worker thread handles (Option to allow taking during join)
    handles: Option<Vec<JoinHandle<WorkerExit>>>,
    /// Receiving end of the first-match rendezvous
    waiter: Waiter<VanityResult>,
    /// Progress sampler, if one was requested
    reporter: Option<ProgressReporter>,
    /// Shared stop signal
    cancel: CancelToken,
    /// Shared attempt counter
    counter: Arc<AttemptCounter>,
    /// Start time
    start_time: Instant,
}

impl WorkerPool {
    /// Starts `config.workers` workers without progress reporting.
    pub fn new(
        config: &SearchConfig,
        source: Arc<dyn KeySource>,
        matcher: Arc<dyn Matcher>,
    ) -> Self {
        Self::start(
            config,
            source,
            matcher,
            CancelToken::new(),
            None::<fn(&ProgressSample)>,
        )
    }

    /// Starts `config.workers` workers plus a progress reporter calling
    /// `on_progress` every `config.report_interval`.
    ///
    /// `cancel` may be handed to a signal handler before the pool starts; a
    /// token that is already cancelled ends the search without any attempt.
    pub fn with_progress<F>(
        config: &SearchConfig,
        source: Arc<dyn KeySource>,
        matcher: Arc<dyn Matcher>,
        cancel: CancelToken,
        on_progress: F,
    ) -> Self
    where
        F: FnMut(&ProgressSample) + Send + 'static,
    {
        Self::start(config, source, matcher, cancel, Some(on_progress))
    }

    fn start<F>(
        config: &SearchConfig,
        source: Arc<dyn KeySource>,
        matcher: Arc<dyn Matcher>,
        cancel: CancelToken,
        on_progress: Option<F>,
    ) -> Self
    where
        F: FnMut(&ProgressSample) + Send + 'static,
    {
        let num_workers = config.workers.max(1);
        let (publisher, waiter) = rendezvous();
        let counter = Arc::new(AttemptCounter::new());
        let start_time = Instant::now();

        let reporter = on_progress.map(|callback| {
            ProgressReporter::spawn(counter.clone(), config.report_interval, start_time, callback)
        });

        // The pool keeps no publisher, so the waiter wakes with `None` once
        // every worker has exited without a match.
        let handles = Self::spawn_workers(
            num_workers,
            config.batch_size,
            source,
            matcher,
            publisher,
            cancel.clone(),
            counter.clone(),
        );
        debug!(workers = num_workers, batch_size = config.batch_size, "pool started");

        Self {
            handles: Some(handles),
            waiter,
            reporter,
            cancel,
            counter,
            start_time,
        }
    }

    /// Spawns worker threads.
    fn spawn_workers(
        num_workers: usize,
        batch_size: u64,
        source: Arc<dyn KeySource>,
        matcher: Arc<dyn Matcher>,
        publisher: Publisher<VanityResult>,
        cancel: CancelToken,
        counter: Arc<AttemptCounter>,
    ) -> Vec<JoinHandle<WorkerExit>> {
        (0..num_workers)
            .map(|id| {
                let worker = CpuWorker::new(
                    id,
                    source.clone(),
                    matcher.clone(),
                    publisher.clone(),
                    cancel.clone(),
                    counter.clone(),
                    batch_size,
                );

                thread::Builder::new()
                    .name(format!("vanity-worker-{}", id))
                    .spawn(move || worker.run())
                    .expect("Failed to spawn worker thread")
            })
            .collect()
    }

    /// Blocks until the search ends, then drains the pool.
    ///
    /// On a match, the remaining workers are cancelled and joined, and the
    /// reporter is stopped, before the final total is read.
    pub fn wait(mut self) -> SearchOutcome {
        let winner = self.waiter.wait();
        self.cancel.cancel();
        let exits = self.join_workers();
        if let Some(reporter) = self.reporter.take() {
            reporter.stop();
        }

        let total_attempts = self.counter.load();
        let elapsed = self.start_time.elapsed();
        let lost = exits.iter().filter(|&&e| e == WorkerExit::Lost).count();

        match winner {
            Some(result) => {
                info!(
                    worker = result.worker_id,
                    attempts_at_match = result.attempts_at_match,
                    total_attempts,
                    lost_races = lost,
                    "search finished"
                );
                SearchOutcome::Found {
                    result,
                    total_attempts,
                    elapsed,
                }
            }
            None => {
                info!(total_attempts, "search interrupted");
                SearchOutcome::Interrupted {
                    total_attempts,
                    elapsed,
                }
            }
        }
    }

    fn join_workers(&mut self) -> Vec<WorkerExit> {
        self.handles
            .take()
            .map(|handles| {
                handles
                    .into_iter()
                    .filter_map(|handle| {
                        let name = handle.thread().name().unwrap_or("worker").to_owned();
                        match handle.join() {
                            Ok(exit) => Some(exit),
                            Err(_) => {
                                warn!(thread = %name, "worker thread panicked");
                                None
                            }
                        }
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.cancel.cancel();
        // Wait for workers to finish if they haven't been joined
        self.join_workers();
        if let Some(reporter) = self.reporter.take() {
            reporter.stop();
        }
    }
}

/// Runs one search to completion with progress reporting.
pub fn run<F>(
    config: &SearchConfig,
    source: Arc<dyn KeySource>,
    matcher: Arc<dyn Matcher>,
    cancel: CancelToken,
    on_progress: F,
) -> SearchOutcome
where
    F: FnMut(&ProgressSample) + Send + 'static,
{
    WorkerPool::with_progress(config, source, matcher, cancel, on_progress).wait()
}
