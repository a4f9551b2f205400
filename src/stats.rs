//! Driver activity counters.
//!
//! Counters are atomics so one [`Stats`] can be shared by every driver in the
//! process. [`Stats::global`] is the instance drivers use unless they are
//! given their own.
//!
//! # Example
//!
//! ```
//! use etherio::Stats;
//!
//! let stats = Stats::new();
//! let snapshot = stats.snapshot();
//! assert_eq!(snapshot.commands, 0);
//! stats.clear();
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

/// Monotonic driver counters, reset only by [`Stats::clear`].
#[derive(Debug, Default)]
pub struct Stats {
    commands: AtomicU64,
    packets: AtomicU64,
    read_retries: AtomicU64,
    write_retries: AtomicU64,
    max_read_retry: AtomicU64,
    max_write_retry: AtomicU64,
}

/// Point-in-time copy of [`Stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatsSnapshot {
    /// Commands issued.
    pub commands: u64,
    /// Packets sent or received.
    pub packets: u64,
    /// Failed exchanges that triggered a read retry.
    pub read_retries: u64,
    /// Read-back mismatches that triggered a write retry.
    pub write_retries: u64,
    /// Deepest read retry reached by any one command.
    pub max_read_retry: u64,
    /// Deepest write retry reached by any one command.
    pub max_write_retry: u64,
}

impl Stats {
    /// Creates a zeroed counter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide counter set.
    pub fn global() -> Arc<Stats> {
        static GLOBAL: OnceLock<Arc<Stats>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(Stats::new())))
    }

    pub(crate) fn command_issued(&self) {
        self.commands.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn packet(&self) {
        self.packets.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn read_retry(&self) {
        self.read_retries.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn read_retry_depth(&self, depth: u32) {
        self.max_read_retry
            .fetch_max(u64::from(depth), Ordering::Relaxed);
    }

    pub(crate) fn write_retry(&self) {
        self.write_retries.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn write_retry_depth(&self, depth: u32) {
        self.max_write_retry
            .fetch_max(u64::from(depth), Ordering::Relaxed);
    }

    /// Returns a copy of all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            commands: self.commands.load(Ordering::Relaxed),
            packets: self.packets.load(Ordering::Relaxed),
            read_retries: self.read_retries.load(Ordering::Relaxed),
            write_retries: self.write_retries.load(Ordering::Relaxed),
            max_read_retry: self.max_read_retry.load(Ordering::Relaxed),
            max_write_retry: self.max_write_retry.load(Ordering::Relaxed),
        }
    }

    /// Resets all counters to zero.
    pub fn clear(&self) {
        for counter in [
            &self.commands,
            &self.packets,
            &self.read_retries,
            &self.write_retries,
            &self.max_read_retry,
            &self.max_write_retry,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

impl std::fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "commands={} packets={} read_retries={} write_retries={} max_read_retry={} max_write_retry={}",
            self.commands,
            self.packets,
            self.read_retries,
            self.write_retries,
            self.max_read_retry,
            self.max_write_retry
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let stats = Stats::new();
        stats.command_issued();
        stats.packet();
        stats.packet();
        stats.read_retry();
        stats.write_retry();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.commands, 1);
        assert_eq!(snapshot.packets, 2);
        assert_eq!(snapshot.read_retries, 1);
        assert_eq!(snapshot.write_retries, 1);
    }

    #[test]
    fn test_depth_keeps_maximum() {
        let stats = Stats::new();
        stats.read_retry_depth(3);
        stats.read_retry_depth(1);
        stats.write_retry_depth(2);
        stats.write_retry_depth(5);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.max_read_retry, 3);
        assert_eq!(snapshot.max_write_retry, 5);
    }

    #[test]
    fn test_clear() {
        let stats = Stats::new();
        stats.command_issued();
        stats.read_retry_depth(4);
        stats.clear();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn test_global_is_shared() {
        assert!(Arc::ptr_eq(&Stats::global(), &Stats::global()));
    }
}
