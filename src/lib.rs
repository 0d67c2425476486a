//! parallel-rm-rf - Parallel recursive directory removal
//!
//! Deletes a directory tree faster than a single-threaded `rm -rf` by
//! spreading the work over a fixed pool of worker threads.
//!
//! # How it works
//!
//! - **Bottom-up enumeration**: directories are produced lazily in
//!   post-order, so every directory is assigned after all of its
//!   subdirectories.
//!
//! - **Round-robin dispatch**: the i-th directory goes to worker `i mod N`
//!   over that worker's private channel.
//!
//! - **Race-tolerant workers**: each worker unlinks the files of its
//!   directory, then removes the directory and walks up removing empty
//!   ancestors. Workers never lock anything; "already gone" and "not empty"
//!   results are counted as collisions and skips instead of errors.
//!
//! - **Aggregate at the end**: each worker keeps its own counters and hands
//!   them back once, when it receives the termination token.
//!
//! # Example
//!
//! ```bash
//! # Delete with the default 8 workers
//! parallel-rm-rf /scratch/old-build
//!
//! # More workers, with per-worker timing
//! parallel-rm-rf /data/run-2019 -p 32 -v
//! ```
//!
//! ```no_run
//! let totals = parallel_rm_rf::remove_tree("/scratch/old-build", 8, false)?;
//! println!("{} files, {} dirs", totals.files_removed(), totals.dirs_removed());
//! # Ok::<(), parallel_rm_rf::RemoverError>(())
//! ```

pub mod config;
pub mod error;
pub mod progress;
pub mod remover;

pub use config::{CliArgs, RemoveConfig};
pub use error::{ConfigError, RemoverError, Result, WorkerError};
pub use remover::{RemovalCoordinator, RunTotals, WorkerReport, WorkerStats};

use std::path::Path;

/// Remove the tree at `root` using `worker_count` workers
///
/// Preconditions (`root` is an existing directory and not a symlink,
/// `worker_count` is positive) are checked before any worker starts. When
/// `verbose` is set, timing markers and per-worker completions are logged at
/// info level; they are always available in the returned [`RunTotals`].
pub fn remove_tree(root: impl AsRef<Path>, worker_count: usize, verbose: bool) -> Result<RunTotals> {
    let config = RemoveConfig::new(root.as_ref(), worker_count).verbose(verbose);
    RemovalCoordinator::new(config)?.run()
}
