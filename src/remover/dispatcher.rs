//! Removal coordinator - owns the worker pool and drives the run
//!
//! The coordinator is responsible for:
//! - Validating the configuration and spawning workers before enumeration
//! - Assigning enumerated directories to workers round-robin
//! - Sending termination tokens and collecting reports in worker order
//! - Aborting the run on the first fatal error or on a signal

use crate::config::RemoveConfig;
use crate::error::{RemoverError, Result, WorkerError};
use crate::remover::aggregate::{per_second, RunTotals, WorkerReport};
use crate::remover::enumerate::PostOrderDirs;
use crate::remover::worker::Worker;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Timing markers go to info when verbose, debug otherwise
macro_rules! marker {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            info!($($arg)+)
        } else {
            debug!($($arg)+)
        }
    };
}

/// Strict round-robin worker selection
///
/// The i-th call yields `i mod count`. No load awareness.
#[derive(Debug, Clone)]
pub struct RoundRobin {
    count: usize,
    next: usize,
}

impl RoundRobin {
    pub fn new(count: usize) -> Self {
        Self { count, next: 0 }
    }
}

impl Iterator for RoundRobin {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.count == 0 {
            return None;
        }
        let current = self.next;
        self.next = (self.next + 1) % self.count;
        Some(current)
    }
}

/// Dispatch progress, written only by the dispatching thread
#[derive(Debug)]
pub struct DispatchProgress {
    dispatched: AtomicU64,
    enumeration_done: AtomicBool,
    workers: usize,
    start: Instant,
}

impl DispatchProgress {
    fn new(workers: usize) -> Self {
        Self {
            dispatched: AtomicU64::new(0),
            enumeration_done: AtomicBool::new(false),
            workers,
            start: Instant::now(),
        }
    }

    /// Current progress for display
    pub fn snapshot(&self) -> RemoveProgress {
        RemoveProgress {
            dirs_dispatched: self.dispatched.load(Ordering::Relaxed),
            enumeration_done: self.enumeration_done.load(Ordering::Relaxed),
            workers: self.workers,
            elapsed: self.start.elapsed(),
        }
    }
}

/// Progress information for display
#[derive(Debug, Clone)]
pub struct RemoveProgress {
    /// Directories handed to workers so far
    pub dirs_dispatched: u64,

    /// Enumeration finished; waiting for workers
    pub enumeration_done: bool,

    /// Worker count
    pub workers: usize,

    /// Elapsed time
    pub elapsed: Duration,
}

impl RemoveProgress {
    /// Calculate dispatched dirs per second rate
    pub fn dirs_per_second(&self) -> f64 {
        per_second(self.dirs_dispatched, self.elapsed)
    }
}

/// Coordinates the parallel removal
pub struct RemovalCoordinator {
    /// Validated configuration
    config: RemoveConfig,

    /// Worker handles, in index order
    workers: Vec<Worker>,

    /// Abort signal shared with workers and signal handlers
    abort: Arc<AtomicBool>,

    /// Dispatch progress
    progress: Arc<DispatchProgress>,
}

impl RemovalCoordinator {
    /// Create a new coordinator; rejects invalid configuration
    pub fn new(config: RemoveConfig) -> Result<Self> {
        let config = config.validate()?;
        let progress = Arc::new(DispatchProgress::new(config.worker_count));

        Ok(Self {
            config,
            workers: Vec::new(),
            abort: Arc::new(AtomicBool::new(false)),
            progress,
        })
    }

    /// Get a clone of the abort flag (for signal handlers)
    pub fn abort_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.abort)
    }

    /// Get the dispatch progress handle
    pub fn progress(&self) -> Arc<DispatchProgress> {
        Arc::clone(&self.progress)
    }

    /// Root being removed
    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// Run the removal
    pub fn run(mut self) -> Result<RunTotals> {
        let start = Instant::now();
        let verbose = self.config.verbose;

        info!(
            root = %self.config.root.display(),
            workers = self.config.worker_count,
            "Starting removal"
        );

        if let Err(e) = self.spawn_workers() {
            self.abort.store(true, Ordering::SeqCst);
            self.shutdown(start);
            return Err(e.into());
        }

        let dispatched = self.dispatch();
        let enumerated_after = start.elapsed();
        self.progress.enumeration_done.store(true, Ordering::Relaxed);

        marker!(
            verbose,
            elapsed_secs = enumerated_after.as_secs_f64(),
            "Constructed directory list, awaiting worker completions"
        );

        let reports = self.shutdown(start);
        let elapsed = start.elapsed();

        let dirs_enumerated = dispatched?;

        let mut workers = Vec::with_capacity(reports.len());
        for report in reports {
            workers.push(report?);
        }

        if self.abort.load(Ordering::SeqCst) {
            return Err(RemoverError::Interrupted);
        }

        let totals = RunTotals::from_reports(workers, dirs_enumerated, enumerated_after, elapsed);

        marker!(
            verbose,
            files = totals.files_removed(),
            dirs = totals.dirs_removed(),
            collisions = totals.collisions(),
            nonempty = totals.nonempty_skips(),
            elapsed_secs = elapsed.as_secs_f64(),
            files_per_sec = totals.files_per_second(),
            dirs_per_sec = totals.dirs_per_second(),
            "Removal completed"
        );

        Ok(totals)
    }

    /// Spawn worker threads
    fn spawn_workers(&mut self) -> std::result::Result<(), WorkerError> {
        let root: Arc<Path> = Arc::from(self.config.root.as_path());

        for id in 0..self.config.worker_count {
            let worker = Worker::spawn(
                id,
                Arc::clone(&root),
                self.config.queue_depth,
                Arc::clone(&self.abort),
            )?;

            self.workers.push(worker);
        }

        debug!(count = self.workers.len(), "Workers spawned");
        Ok(())
    }

    /// Enumerate the tree and hand each directory to the next worker
    ///
    /// Returns the number of directories dispatched.
    fn dispatch(&self) -> Result<u64> {
        self.dispatch_to(|index, dir| self.workers[index].assign(dir))
    }

    /// Enumerate the tree, passing the i-th directory to `assign` along with
    /// worker index `i mod worker_count`
    ///
    /// Stops early when `assign` returns false or the run is aborted.
    fn dispatch_to<F>(&self, mut assign: F) -> Result<u64>
    where
        F: FnMut(usize, PathBuf) -> bool,
    {
        let mut rotation = RoundRobin::new(self.config.worker_count);
        let mut dispatched = 0u64;

        for dir in PostOrderDirs::new(self.config.root.as_path()) {
            if self.abort.load(Ordering::Relaxed) {
                debug!("Abort requested, stopping enumeration");
                break;
            }

            let dir = match dir {
                Ok(dir) => dir,
                Err(e) => {
                    self.abort.store(true, Ordering::SeqCst);
                    return Err(e);
                }
            };

            let Some(index) = rotation.next() else {
                break;
            };

            if !assign(index, dir) {
                // The worker failed; its report carries the error
                debug!(worker = index, "Worker stopped accepting tasks");
                break;
            }

            dispatched += 1;
            self.progress.dispatched.store(dispatched, Ordering::Relaxed);
        }

        Ok(dispatched)
    }

    /// Terminate workers one by one, in index order, collecting each report
    fn shutdown(&mut self, start: Instant) -> Vec<std::result::Result<WorkerReport, WorkerError>> {
        let verbose = self.config.verbose;
        let timeout = self.config.report_timeout;
        let workers = std::mem::take(&mut self.workers);

        workers
            .into_iter()
            .map(|worker| {
                let index = worker.id();
                worker.terminate();

                let report = worker.finish(timeout).map(|stats| WorkerReport {
                    index,
                    stats,
                    finished_after: start.elapsed(),
                });

                match &report {
                    Ok(report) => marker!(
                        verbose,
                        worker = index,
                        elapsed_secs = report.finished_after.as_secs_f64(),
                        files = report.stats.files_removed,
                        dirs = report.stats.dirs_removed,
                        collisions = report.stats.collisions,
                        nonempty = report.stats.nonempty_skips,
                        "Worker finished"
                    ),
                    Err(e) => warn!(worker = e.worker_id(), error = %e, "Worker did not finish cleanly"),
                }

                report
            })
            .collect()
    }
}
