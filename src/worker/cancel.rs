//! Broadcast stop signal.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One-shot, idempotent stop flag shared by the pool, its workers and
/// external handlers such as Ctrl-C.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the signal. Returns true only for the call that raised it.
    pub fn cancel(&self) -> bool {
        !self.flag.swap(true, Ordering::Release)
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_is_one_shot_and_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());

        assert!(token.cancel());
        assert!(!clone.cancel());
        assert!(clone.is_cancelled());
        assert!(token.is_cancelled());
    }
}
