//! CPU-based worker for vanity key search.

use std::sync::Arc;

use tracing::{debug, info, trace};

use crate::crypto::{EncodedPublicKey, KeySource, KeygenError, Keypair};
use crate::matcher::Matcher;

use super::{AttemptCounter, CancelToken, Publisher, VanityResult};

/// How a worker's loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerExit {
    /// This worker's match was accepted
    Won,
    /// This worker matched, but another worker had already won
    Lost,
    /// The cancel signal was observed
    Cancelled,
}

/// A CPU worker that generates and tests keypairs.
pub struct CpuWorker {
    /// Worker ID
    id: usize,
    /// Where candidate keypairs come from
    source: Arc<dyn KeySource>,
    /// The predicate a candidate must satisfy
    matcher: Arc<dyn Matcher>,
    /// Slot the winning result is offered to
    publisher: Publisher<VanityResult>,
    /// Shared stop signal
    cancel: CancelToken,
    /// Shared attempt counter
    counter: Arc<AttemptCounter>,
    /// Attempts between counter flushes
    batch_size: u64,
}

impl CpuWorker {
    /// Creates a new CPU worker.
    pub fn new(
        id: usize,
        source: Arc<dyn KeySource>,
        matcher: Arc<dyn Matcher>,
        publisher: Publisher<VanityResult>,
        cancel: CancelToken,
        counter: Arc<AttemptCounter>,
        batch_size: u64,
    ) -> Self {
        Self {
            id,
            source,
            matcher,
            publisher,
            cancel,
            counter,
            batch_size: batch_size.max(1),
        }
    }

    /// Runs the worker loop.
    ///
    /// Generates keypairs and tests them against the matcher until:
    /// - A match is found (offered to the rendezvous)
    /// - The cancel signal is raised
    ///
    /// The cancel signal and the shared counter are only touched between
    /// batches. Failed attempts are skipped and not counted, but still use
    /// up a slot in the batch so a failing source cannot stall cancellation.
    pub fn run(&self) -> WorkerExit {
        debug!(worker = self.id, "worker started");

        loop {
            if self.cancel.is_cancelled() {
                debug!(worker = self.id, "worker cancelled");
                return WorkerExit::Cancelled;
            }

            let mut attempts = 0u64;
            for _ in 0..self.batch_size {
                let (keypair, encoded) = match self.attempt() {
                    Ok(candidate) => candidate,
                    Err(e) => {
                        trace!(worker = self.id, error = %e, "skipping failed attempt");
                        continue;
                    }
                };
                attempts += 1;

                if self.matcher.matches(encoded.as_bytes()) {
                    return self.publish(keypair, encoded, attempts);
                }
            }

            self.counter.add(attempts);
        }
    }

    fn attempt(&self) -> Result<(Keypair, EncodedPublicKey), KeygenError> {
        let keypair = self.source.generate()?;
        let encoded = keypair.encode_public()?;
        Ok((keypair, encoded))
    }

    /// Offers a match to the rendezvous. `attempts` counts the matching
    /// attempt and the rest of the unflushed batch.
    fn publish(&self, keypair: Keypair, public_key: EncodedPublicKey, attempts: u64) -> WorkerExit {
        let result = VanityResult {
            keypair,
            public_key,
            attempts_at_match: self.counter.load() + attempts,
            worker_id: self.id,
        };
        let attempts_at_match = result.attempts_at_match;

        match self.publisher.publish(result) {
            Ok(()) => {
                // Flushed after publishing so the final total read after the
                // join covers the winning attempt.
                self.counter.add(attempts);
                info!(worker = self.id, attempts_at_match, "match published");
                WorkerExit::Won
            }
            Err(_) => {
                debug!(worker = self.id, "match discarded, another worker won");
                WorkerExit::Lost
            }
        }
    }
}
