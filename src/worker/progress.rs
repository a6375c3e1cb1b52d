//! Periodic progress sampling.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, select, tick, Sender, TryRecvError};

use super::AttemptCounter;

/// One reading of the shared counter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSample {
    /// Attempts flushed so far
    pub attempts: u64,
    /// Attempts per second since the previous sample
    pub rate: u64,
    /// Attempts per second since the search started
    pub average: f64,
    /// Time since the search started
    pub elapsed: Duration,
}

impl ProgressSample {
    /// Renders the sample as a single progress line, without line ending.
    pub fn render(&self) -> String {
        format!(
            "Attempts: {} | Rate: {}/s | Avg: {:.0}/s | Elapsed: {}",
            self.attempts,
            self.rate,
            self.average,
            format_elapsed(self.elapsed)
        )
    }
}

/// Formats a duration as `1m05s`, or `2h03m07s` past the hour.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if hours > 0 {
        format!("{}h{:02}m{:02}s", hours, minutes, seconds)
    } else {
        format!("{}m{:02}s", minutes, seconds)
    }
}

/// Background thread sampling an [`AttemptCounter`] on a fixed interval.
///
/// Only reads the counter. After [`stop`](Self::stop) returns the callback
/// is never invoked again.
pub struct ProgressReporter {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl ProgressReporter {
    /// Starts sampling `counter` every `interval`, measuring from `start`.
    pub fn spawn<F>(
        counter: Arc<AttemptCounter>,
        interval: Duration,
        start: Instant,
        mut on_sample: F,
    ) -> Self
    where
        F: FnMut(&ProgressSample) + Send + 'static,
    {
        let (stop_tx, stop_rx) = bounded::<()>(0);

        let handle = thread::Builder::new()
            .name("vanity-progress".into())
            .spawn(move || {
                let ticker = tick(interval);
                let mut last_attempts = 0u64;
                let mut last_time = start;

                loop {
                    select! {
                        recv(stop_rx) -> _ => break,
                        recv(ticker) -> now => {
                            let Ok(now) = now else { break };
                            // Both arms may be ready at once.
                            if matches!(stop_rx.try_recv(), Err(TryRecvError::Disconnected)) {
                                break;
                            }

                            let current = counter.load();
                            let since_last = now.saturating_duration_since(last_time).as_secs_f64();
                            let elapsed = now.saturating_duration_since(start);
                            let rate = if since_last > 0.0 {
                                (current.saturating_sub(last_attempts) as f64 / since_last) as u64
                            } else {
                                0
                            };
                            let average = if elapsed.as_secs_f64() > 0.0 {
                                current as f64 / elapsed.as_secs_f64()
                            } else {
                                0.0
                            };

                            on_sample(&ProgressSample {
                                attempts: current,
                                rate,
                                average,
                                elapsed,
                            });

                            last_attempts = current;
                            last_time = now;
                        }
                    }
                }
            })
            .expect("Failed to spawn progress thread");

        Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }
    }

    /// Stops the reporter and waits for its thread to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // Dropping the sender disconnects the stop channel.
        drop(self.stop_tx.take());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.shutdown();
    }
}
