//! Error types for parallel-rm-rf
//!
//! This module defines the error hierarchy for:
//! - Configuration and precondition errors (rejected before any worker starts)
//! - Worker thread errors (fatal filesystem errors, panics, lost reports)
//! - Enumeration errors
//!
//! Benign races (a path already removed by another worker, an ancestor that
//! still has children) are never errors here. They are classified by
//! [`RemoveOutcome`] and end up as counters in the worker statistics.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Top-level error type for the remover
#[derive(Error, Debug)]
pub enum RemoverError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Worker/concurrency errors
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    /// Directory enumeration failed
    #[error("Failed to enumerate '{}': {source}", path.display())]
    Enumerate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Interrupted by signal
    #[error("Operation interrupted by signal")]
    Interrupted,
}

/// Configuration and precondition errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid worker count
    #[error("Invalid worker count {count}: must be at least 1")]
    InvalidWorkerCount { count: usize },

    /// Invalid per-worker queue depth
    #[error("Invalid queue depth {depth}: must be at least 1")]
    InvalidQueueDepth { depth: usize },

    /// Root is missing, a symlink, or not a directory
    #[error("Invalid root '{}': {reason}", path.display())]
    InvalidRoot { path: PathBuf, reason: String },
}

/// Filesystem operation issued by a worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsOp {
    /// Listing a directory
    List,
    /// Unlinking a non-directory entry
    Unlink,
    /// Removing an (expected empty) directory
    Rmdir,
}

impl fmt::Display for FsOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FsOp::List => "list",
            FsOp::Unlink => "unlink",
            FsOp::Rmdir => "rmdir",
        };
        f.write_str(name)
    }
}

/// Worker thread errors
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Unclassified filesystem error; aborts the worker and the run
    #[error("Worker {id} failed to {op} '{}': {source}", path.display())]
    Fs {
        id: usize,
        op: FsOp,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Worker panicked
    #[error("Worker {id} panicked: {message}")]
    Panicked { id: usize, message: String },

    /// Worker thread could not be spawned
    #[error("Failed to initialize worker {id}: {reason}")]
    InitFailed { id: usize, reason: String },

    /// Worker did not report within the configured timeout
    #[error("Worker {id} did not report within {timeout:?}")]
    ReportTimeout { id: usize, timeout: Duration },

    /// Worker exited without sending its report
    #[error("Worker {id} exited without reporting")]
    ReportChannelClosed { id: usize },
}

impl WorkerError {
    /// Id of the worker this error belongs to
    pub fn worker_id(&self) -> usize {
        match self {
            WorkerError::Fs { id, .. }
            | WorkerError::Panicked { id, .. }
            | WorkerError::InitFailed { id, .. }
            | WorkerError::ReportTimeout { id, .. }
            | WorkerError::ReportChannelClosed { id } => *id,
        }
    }
}

/// Result type alias for RemoverError
pub type Result<T> = std::result::Result<T, RemoverError>;

/// Benign outcome of a single filesystem call made by a worker
///
/// Anything that is not one of these is returned as the `Err` side of
/// [`RemoveOutcome::of`] and is fatal for the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The call succeeded
    Done,

    /// Target was already gone (another worker or process removed it)
    Collision,

    /// Directory still has children (a sibling subtree is not finished)
    NotEmpty,
}

impl RemoveOutcome {
    /// Classify the result of a filesystem call
    pub fn of(op: FsOp, result: io::Result<()>) -> io::Result<RemoveOutcome> {
        match result {
            Ok(()) => Ok(RemoveOutcome::Done),
            Err(e) => Self::from_error(op, e),
        }
    }

    /// Classify a failed filesystem call
    ///
    /// "Not empty" only counts as benign for `rmdir`.
    pub fn from_error(op: FsOp, error: io::Error) -> io::Result<RemoveOutcome> {
        match error.kind() {
            io::ErrorKind::NotFound => Ok(RemoveOutcome::Collision),
            io::ErrorKind::DirectoryNotEmpty if op == FsOp::Rmdir => Ok(RemoveOutcome::NotEmpty),
            _ => Err(error),
        }
    }
}
