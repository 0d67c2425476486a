//! Worker thread logic for parallel removal
//!
//! Each worker:
//! - Owns a private task channel and a report channel back to the dispatcher
//! - Receives directory tasks one at a time, in assignment order
//! - Unlinks the non-directory entries of each directory
//! - Prunes the directory and its now-empty ancestors up to the root
//! - Replies with its statistics when it receives the termination token
//!
//! No directory is ever locked. When two workers race on the same path the
//! filesystem lets exactly one of them win; the loser sees "not found" or
//! "not empty", which is counted and otherwise ignored.

use crate::error::{FsOp, RemoveOutcome, WorkerError};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::any::Any;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, trace};

/// Message delivered to a worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerMessage {
    /// Clear and prune this directory
    Remove(PathBuf),

    /// No more tasks; report and exit
    Terminate,
}

/// Statistics collected by a single worker
///
/// Owned by the worker thread and handed to the dispatcher once, with the
/// final report.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkerStats {
    /// Directory tasks delivered to this worker
    pub tasks_received: u64,

    /// Non-directory entries unlinked
    pub files_removed: u64,

    /// Directories removed (own tasks and pruned ancestors)
    pub dirs_removed: u64,

    /// Operations whose target was already gone
    pub collisions: u64,

    /// Prune attempts stopped by a directory that still had children
    pub nonempty_skips: u64,
}

impl WorkerStats {
    /// Add another worker's counters to these
    pub fn merge(&mut self, other: &WorkerStats) {
        self.tasks_received += other.tasks_received;
        self.files_removed += other.files_removed;
        self.dirs_removed += other.dirs_removed;
        self.collisions += other.collisions;
        self.nonempty_skips += other.nonempty_skips;
    }
}

type Report = Result<WorkerStats, WorkerError>;

/// Handle to a running worker thread
pub struct Worker {
    /// Worker index
    id: usize,

    /// Task channel
    tasks: Sender<WorkerMessage>,

    /// Final report channel
    report: Receiver<Report>,

    /// Thread handle
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Spawn a new worker thread
    pub fn spawn(
        id: usize,
        root: Arc<Path>,
        queue_depth: usize,
        abort: Arc<AtomicBool>,
    ) -> Result<Self, WorkerError> {
        let (task_tx, task_rx) = bounded(queue_depth);
        let (report_tx, report_rx) = bounded(1);

        let handle = thread::Builder::new()
            .name(format!("rmrf-worker-{}", id))
            .spawn(move || worker_loop(id, root, task_rx, report_tx, abort))
            .map_err(|e| WorkerError::InitFailed {
                id,
                reason: e.to_string(),
            })?;

        Ok(Self {
            id,
            tasks: task_tx,
            report: report_rx,
            handle: Some(handle),
        })
    }

    /// Get worker index
    pub fn id(&self) -> usize {
        self.id
    }

    /// Queue a directory for this worker
    ///
    /// Blocks while the worker's queue is full. Returns false if the worker
    /// has already exited, in which case its report carries the reason.
    pub fn assign(&self, dir: PathBuf) -> bool {
        self.tasks.send(WorkerMessage::Remove(dir)).is_ok()
    }

    /// Send the termination token
    pub fn terminate(&self) {
        if self.tasks.send(WorkerMessage::Terminate).is_err() {
            debug!(worker = self.id, "Worker already exited before termination");
        }
    }

    /// Wait for the final report, then join the thread
    ///
    /// Without a timeout this blocks until the worker reports or dies. On
    /// timeout the thread is left running detached.
    pub fn finish(mut self, timeout: Option<Duration>) -> Result<WorkerStats, WorkerError> {
        let report = match timeout {
            Some(timeout) => match self.report.recv_timeout(timeout) {
                Ok(report) => Some(report),
                Err(RecvTimeoutError::Timeout) => {
                    return Err(WorkerError::ReportTimeout {
                        id: self.id,
                        timeout,
                    })
                }
                Err(RecvTimeoutError::Disconnected) => None,
            },
            None => self.report.recv().ok(),
        };

        self.join()?;

        report.unwrap_or(Err(WorkerError::ReportChannelClosed { id: self.id }))
    }

    fn join(&mut self) -> Result<(), WorkerError> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|payload| WorkerError::Panicked {
                id: self.id,
                message: panic_message(payload.as_ref()),
            }),
            None => Ok(()),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Worker thread panicked".into()
    }
}

/// Main worker loop
fn worker_loop(
    id: usize,
    root: Arc<Path>,
    tasks: Receiver<WorkerMessage>,
    report: Sender<Report>,
    abort: Arc<AtomicBool>,
) {
    debug!(worker = id, "Worker starting");

    let result = run_tasks(id, &root, &tasks, &abort);

    match &result {
        Ok(stats) => debug!(
            worker = id,
            files = stats.files_removed,
            dirs = stats.dirs_removed,
            "Worker shutting down"
        ),
        Err(e) => {
            abort.store(true, Ordering::SeqCst);
            error!(worker = id, error = %e, "Worker failed");
        }
    }

    // Close the task channel before reporting so the dispatcher stops
    // sending to a failed worker.
    drop(tasks);

    if report.send(result).is_err() {
        debug!(worker = id, "Dispatcher stopped waiting for report");
    }
}

fn run_tasks(
    id: usize,
    root: &Path,
    tasks: &Receiver<WorkerMessage>,
    abort: &AtomicBool,
) -> Result<WorkerStats, WorkerError> {
    let mut stats = WorkerStats::default();

    loop {
        let dir = match tasks.recv() {
            Ok(WorkerMessage::Remove(dir)) => dir,
            Ok(WorkerMessage::Terminate) => break,
            Err(_) => {
                debug!(worker = id, "Task channel closed without termination token");
                break;
            }
        };

        stats.tasks_received += 1;

        // Drain without touching the filesystem once the run is aborting
        if abort.load(Ordering::Relaxed) {
            trace!(worker = id, path = %dir.display(), "Skipping task after abort");
            continue;
        }

        remove_directory(id, &dir, root, &mut stats)?;
    }

    Ok(stats)
}

/// Clear one directory's files and prune it upward
///
/// This is the whole per-task protocol:
/// 1. list `dir` (already gone counts as a collision and ends the task),
/// 2. unlink every entry that is not a directory, symlinks included,
/// 3. remove `dir` and then each ancestor, stopping at the first ancestor
///    that is still populated or already gone, or once the path leaves `root`.
///
/// Subdirectories are left for their own tasks. Benign races only update
/// `stats`; any other OS error is returned.
pub fn remove_directory(
    id: usize,
    dir: &Path,
    root: &Path,
    stats: &mut WorkerStats,
) -> Result<(), WorkerError> {
    let fatal = |op: FsOp, path: &Path, source: io::Error| WorkerError::Fs {
        id,
        op,
        path: path.to_path_buf(),
        source,
    };

    let entries = match list_entries(dir) {
        Ok(entries) => entries,
        Err(e) => match RemoveOutcome::from_error(FsOp::List, e) {
            Ok(_) => {
                trace!(worker = id, path = %dir.display(), "Directory already removed");
                stats.collisions += 1;
                return Ok(());
            }
            Err(e) => return Err(fatal(FsOp::List, dir, e)),
        },
    };

    for entry in entries {
        let path = entry.path();

        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(e) => {
                RemoveOutcome::from_error(FsOp::List, e).map_err(|e| fatal(FsOp::List, &path, e))?;
                stats.collisions += 1;
                continue;
            }
        };

        if file_type.is_dir() {
            continue;
        }

        match RemoveOutcome::of(FsOp::Unlink, fs::remove_file(&path))
            .map_err(|e| fatal(FsOp::Unlink, &path, e))?
        {
            RemoveOutcome::Done => stats.files_removed += 1,
            _ => stats.collisions += 1,
        }
    }

    let mut current = Some(dir);
    while let Some(path) = current.filter(|p| p.starts_with(root)) {
        match RemoveOutcome::of(FsOp::Rmdir, fs::remove_dir(path))
            .map_err(|e| fatal(FsOp::Rmdir, path, e))?
        {
            RemoveOutcome::Done => {
                stats.dirs_removed += 1;
                current = path.parent();
            }
            RemoveOutcome::NotEmpty => {
                trace!(worker = id, path = %path.display(), "Directory not empty yet");
                stats.nonempty_skips += 1;
                break;
            }
            RemoveOutcome::Collision => {
                trace!(worker = id, path = %path.display(), "Directory pruned by another worker");
                stats.collisions += 1;
                break;
            }
        }
    }

    Ok(())
}

/// Read all entries up front; entries are removed while iterating
fn list_entries(dir: &Path) -> io::Result<Vec<fs::DirEntry>> {
    fs::read_dir(dir)?.collect()
}
