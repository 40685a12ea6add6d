//! Round metrics and statistics.
//!
//! Tracks how rounds move through the pipeline and how long settlement takes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

/// Round pipeline metrics shared by every orchestrator of a runtime.
///
/// Uses atomics for lock-free access across threads.
#[derive(Debug, Default)]
pub struct RoundMetrics {
    /// Battle transactions accepted by the node
    submitted: AtomicU64,

    /// Rounds whose receipt was confirmed and decoded
    settled: AtomicU64,

    /// Rounds abandoned before settlement
    aborted: AtomicU64,

    /// Commands dropped because the arena slot was busy
    duplicates: AtomicU64,

    /// Submission-to-settlement time, summed over settled rounds (nanoseconds)
    total_settlement_nanos: AtomicU64,
}

impl RoundMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_settled(&self, latency: Duration) {
        self.settled.fetch_add(1, Ordering::Relaxed);
        self.total_settlement_nanos
            .fetch_add(latency.as_nanos() as u64, Ordering::Relaxed);
    }

    pub fn record_aborted(&self) {
        self.aborted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_duplicate(&self) {
        self.duplicates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }

    pub fn settled(&self) -> u64 {
        self.settled.load(Ordering::Relaxed)
    }

    pub fn aborted(&self) -> u64 {
        self.aborted.load(Ordering::Relaxed)
    }

    pub fn duplicates(&self) -> u64 {
        self.duplicates.load(Ordering::Relaxed)
    }

    /// Mean submission-to-settlement latency.
    pub fn avg_settlement_time(&self) -> Duration {
        let settled = self.settled();
        if settled == 0 {
            Duration::ZERO
        } else {
            let total_nanos = self.total_settlement_nanos.load(Ordering::Relaxed);
            Duration::from_nanos(total_nanos / settled)
        }
    }

    /// Creates a snapshot of all metrics for display/logging.
    ///
    /// Note: individual fields are read atomically but the snapshot as a
    /// whole may be inconsistent while rounds are being recorded.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            submitted: self.submitted(),
            settled: self.settled(),
            aborted: self.aborted(),
            duplicates: self.duplicates(),
            avg_settlement_time: self.avg_settlement_time(),
        }
    }
}

/// Snapshot of metrics at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub submitted: u64,
    pub settled: u64,
    pub aborted: u64,
    pub duplicates: u64,
    pub avg_settlement_time: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_settlement_latency() {
        let metrics = RoundMetrics::new();
        assert_eq!(metrics.avg_settlement_time(), Duration::ZERO);

        metrics.record_submitted();
        metrics.record_submitted();
        metrics.record_settled(Duration::from_millis(100));
        metrics.record_settled(Duration::from_millis(300));
        metrics.record_aborted();
        metrics.record_duplicate();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.submitted, 2);
        assert_eq!(snapshot.settled, 2);
        assert_eq!(snapshot.aborted, 1);
        assert_eq!(snapshot.duplicates, 1);
        assert_eq!(snapshot.avg_settlement_time, Duration::from_millis(200));
    }
}
