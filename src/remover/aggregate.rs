//! Run totals and throughput
//!
//! Worker statistics are merged exactly once, after every worker has
//! reported. Nothing here prints; see `progress` for formatting.

use crate::remover::worker::WorkerStats;
use std::time::Duration;

/// Final report of one worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerReport {
    /// Worker index
    pub index: usize,

    /// Counters at termination
    pub stats: WorkerStats,

    /// Time from run start until the report was collected
    pub finished_after: Duration,
}

/// Result of a completed removal
#[derive(Debug, Clone)]
pub struct RunTotals {
    /// Per-worker reports, in worker-index order
    pub workers: Vec<WorkerReport>,

    /// Sum of all worker counters
    pub totals: WorkerStats,

    /// Directories produced by the enumerator and dispatched
    pub dirs_enumerated: u64,

    /// Time from run start until enumeration finished
    pub enumerated_after: Duration,

    /// Time from run start until the last worker was joined
    pub elapsed: Duration,
}

impl RunTotals {
    pub fn from_reports(
        workers: Vec<WorkerReport>,
        dirs_enumerated: u64,
        enumerated_after: Duration,
        elapsed: Duration,
    ) -> Self {
        let mut totals = WorkerStats::default();
        for report in &workers {
            totals.merge(&report.stats);
        }

        Self {
            workers,
            totals,
            dirs_enumerated,
            enumerated_after,
            elapsed,
        }
    }

    pub fn files_removed(&self) -> u64 {
        self.totals.files_removed
    }

    pub fn dirs_removed(&self) -> u64 {
        self.totals.dirs_removed
    }

    pub fn collisions(&self) -> u64 {
        self.totals.collisions
    }

    pub fn nonempty_skips(&self) -> u64 {
        self.totals.nonempty_skips
    }

    /// Calculate files per second rate
    pub fn files_per_second(&self) -> f64 {
        per_second(self.totals.files_removed, self.elapsed)
    }

    /// Calculate dirs per second rate
    pub fn dirs_per_second(&self) -> f64 {
        per_second(self.totals.dirs_removed, self.elapsed)
    }
}

pub(crate) fn per_second(count: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        count as f64 / secs
    } else {
        0.0
    }
}
