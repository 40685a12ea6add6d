//! Phase countdowns computed from ledger timestamps.

/// Pure clock arithmetic over unix-second timestamps.
pub struct PhaseTimer;

impl PhaseTimer {
    /// Seconds left in a phase that started at `started_at` and lasts
    /// `duration`. Never negative; saturates instead of overflowing.
    pub const fn remaining(now: u64, started_at: u64, duration: u64) -> u64 {
        started_at.saturating_add(duration).saturating_sub(now)
    }

    pub const fn is_expired(now: u64, started_at: u64, duration: u64) -> bool {
        Self::remaining(now, started_at, duration) == 0
    }
}
