// src/stats/counter.rs
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Count of hash attempts performed by one session
///
/// Cloning yields another handle to the same counter. Workers increment it
/// concurrently; readers take relaxed snapshots, which may trail the writers
/// slightly.
#[derive(Debug, Clone, Default)]
pub struct AttemptCounter {
    attempts: Arc<AtomicU64>,
}

impl AttemptCounter {
    /// Creates a counter at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one evaluated candidate
    #[inline]
    pub fn record(&self) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
    }

    /// Current number of attempts
    pub fn snapshot(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }
}

/// Attempts per second, guarding against a zero elapsed time
pub fn hashrate(attempts: u64, elapsed_secs: f64) -> f64 {
    attempts as f64 / elapsed_secs.max(1e-9)
}
