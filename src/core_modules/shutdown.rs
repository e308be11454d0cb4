// The cooperative cancellation flag every stage observes. Written at most
// once, to true, by either the foreground loop (quit) or the session
// controller (natural end of stream). Stages poll it at loop-iteration
// granularity; there is no mid-operation preemption. Liveness after the
// flag is set comes from channel-close propagation, not from this flag.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Clone, Default)]
pub struct ShutdownFlag {
    triggered: Arc<AtomicBool>,
}

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transitions to the cancelled state. Idempotent.
    pub fn trigger(&self) {
        self.triggered.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_clear_and_latches_true() {
        let flag = ShutdownFlag::new();
        assert!(!flag.is_triggered());
        flag.trigger();
        assert!(flag.is_triggered());
        flag.trigger();
        assert!(flag.is_triggered());
    }

    #[test]
    fn clones_share_the_same_flag() {
        let flag = ShutdownFlag::new();
        let observer = flag.clone();
        flag.trigger();
        assert!(observer.is_triggered());
    }
}
