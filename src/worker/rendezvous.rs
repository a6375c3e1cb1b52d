//! One-shot, single-slot exchange between many workers and the pool.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender};

struct Slot<T> {
    claimed: AtomicBool,
    tx: Sender<T>,
}

/// Producer half. Cloned into every worker; the first [`publish`](Self::publish) wins.
pub struct Publisher<T> {
    slot: Arc<Slot<T>>,
}

/// Consumer half, held by the pool.
pub struct Waiter<T> {
    rx: Receiver<T>,
}

/// Creates a connected publisher/waiter pair.
///
/// The waiter is woken either by the single accepted value or by the last
/// publisher clone being dropped.
pub fn rendezvous<T>() -> (Publisher<T>, Waiter<T>) {
    let (tx, rx) = bounded(1);
    let slot = Arc::new(Slot {
        claimed: AtomicBool::new(false),
        tx,
    });
    (Publisher { slot }, Waiter { rx })
}

impl<T> Publisher<T> {
    /// Offers `value`. Returns it back as `Err` if another publisher already won.
    pub fn publish(&self, value: T) -> Result<(), T> {
        if self
            .slot
            .claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(value);
        }
        // Only the claimant ever sends, so the one-element buffer has room.
        self.slot.tx.try_send(value).map_err(|e| e.into_inner())
    }
}

impl<T> Clone for Publisher<T> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
        }
    }
}

impl<T> Waiter<T> {
    /// Blocks until a value is published.
    ///
    /// Returns `None` if every publisher was dropped without publishing.
    pub fn wait(&self) -> Option<T> {
        self.rx.recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Barrier;
    use std::thread;

    use crossbeam_channel::TryRecvError;

    use super::*;

    #[test]
    fn test_first_publish_wins() {
        let (publisher, waiter) = rendezvous();
        let other = publisher.clone();

        assert!(publisher.publish(1).is_ok());
        assert_eq!(other.publish(2), Err(2));
        assert_eq!(publisher.publish(3), Err(3));
        assert_eq!(waiter.wait(), Some(1));
    }

    #[test]
    fn test_wait_returns_none_when_publishers_dropped() {
        let (publisher, waiter) = rendezvous::<u32>();
        let clone = publisher.clone();
        drop(publisher);
        assert_eq!(waiter.rx.try_recv(), Err(TryRecvError::Empty));
        drop(clone);
        assert_eq!(waiter.wait(), None);
    }

    #[test]
    fn test_contended_publish_has_single_winner() {
        const THREADS: usize = 16;
        let (publisher, waiter) = rendezvous();
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|id| {
                let publisher = publisher.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    publisher.publish(id).is_ok()
                })
            })
            .collect();
        drop(publisher);

        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&won| won)
            .count();
        assert_eq!(wins, 1);

        let winner = waiter.wait().unwrap();
        assert!(winner < THREADS);
        assert_eq!(waiter.wait(), None);
    }
}
