//! Shared attempt counter.

use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide count of attempts, flushed by workers in batches.
///
/// Only [`add`](Self::add) and [`load`](Self::load) are exposed, so the
/// count can never decrease.
#[derive(Debug, Default)]
pub struct AttemptCounter {
    attempts: AtomicU64,
}

impl AttemptCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `count` attempts.
    #[inline]
    pub fn add(&self, count: u64) {
        self.attempts.fetch_add(count, Ordering::Relaxed);
    }

    /// Returns the attempts flushed so far.
    #[inline]
    pub fn load(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn test_concurrent_adds_are_not_lost() {
        let counter = Arc::new(AttemptCounter::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let counter = counter.clone();
                thread::spawn(move || {
                    for _ in 0..1000 {
                        counter.add(3);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(counter.load(), 8 * 1000 * 3);
    }
}
