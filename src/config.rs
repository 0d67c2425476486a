//! Configuration types for parallel-rm-rf
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation

use crate::error::ConfigError;
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default number of workers
pub const DEFAULT_WORKERS: usize = 8;

/// Default capacity of each worker's task channel
pub const DEFAULT_QUEUE_DEPTH: usize = 1024;

/// Parallel rm -rf for faster deletes on Unix systems
#[derive(Parser, Debug, Clone)]
#[command(
    name = "parallel-rm-rf",
    version,
    about = "Parallel rm -rf command for faster deletes on Unix systems",
    long_about = "Deletes a directory tree using a pool of worker threads.\n\n\
                  Directories are enumerated bottom-up and handed to workers round-robin.\n\
                  Workers unlink files and prune empty directories upward, relying on the\n\
                  filesystem to arbitrate races instead of locks.",
    after_help = "EXAMPLES:\n    \
        parallel-rm-rf /scratch/build-output\n    \
        parallel-rm-rf /data/old-run -p 32 -v\n    \
        parallel-rm-rf ./node_modules --quiet"
)]
pub struct CliArgs {
    /// Path to directory to delete
    #[arg(value_name = "DIRPATH")]
    pub dirpath: PathBuf,

    /// Number of parallel workers
    #[arg(
        short = 'p',
        long = "processes",
        visible_alias = "workers",
        default_value_t = DEFAULT_WORKERS,
        value_name = "NUM"
    )]
    pub processes: usize,

    /// Print additional info (timing and per-worker statistics)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Quiet mode - suppress progress and summary output
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Capacity of each worker's task queue
    #[arg(long, default_value_t = DEFAULT_QUEUE_DEPTH, value_name = "NUM")]
    pub queue_depth: usize,

    /// Give up waiting for a worker's final report after this many seconds
    /// (waits forever if not set)
    #[arg(long, value_name = "SECS")]
    pub report_timeout: Option<u64>,
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct RemoveConfig {
    /// Root of the tree to delete
    pub root: PathBuf,

    /// Number of worker threads
    pub worker_count: usize,

    /// Task channel capacity per worker
    pub queue_depth: usize,

    /// Emit timing markers at info level
    pub verbose: bool,

    /// Show progress indicator
    pub show_progress: bool,

    /// Bound on the wait for each worker's final report
    pub report_timeout: Option<Duration>,
}

impl RemoveConfig {
    /// Configuration with defaults for everything but root and worker count
    pub fn new(root: impl Into<PathBuf>, worker_count: usize) -> Self {
        Self {
            root: root.into(),
            worker_count,
            queue_depth: DEFAULT_QUEUE_DEPTH,
            verbose: false,
            show_progress: false,
            report_timeout: None,
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn queue_depth(mut self, depth: usize) -> Self {
        self.queue_depth = depth;
        self
    }

    pub fn report_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.report_timeout = timeout;
        self
    }

    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        let config = Self {
            root: args.dirpath,
            worker_count: args.processes,
            queue_depth: args.queue_depth,
            verbose: args.verbose,
            show_progress: !args.quiet,
            report_timeout: args.report_timeout.map(Duration::from_secs),
        };
        config.validate()
    }

    /// Check preconditions and make the root absolute
    ///
    /// The root is made absolute lexically (no symlink resolution), so the
    /// upward pruning bound matches the paths the enumerator produces.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        if self.worker_count == 0 {
            return Err(ConfigError::InvalidWorkerCount {
                count: self.worker_count,
            });
        }

        if self.queue_depth == 0 {
            return Err(ConfigError::InvalidQueueDepth {
                depth: self.queue_depth,
            });
        }

        check_root(&self.root)?;

        self.root = std::path::absolute(&self.root).map_err(|e| ConfigError::InvalidRoot {
            path: self.root.clone(),
            reason: e.to_string(),
        })?;

        Ok(self)
    }
}

fn check_root(root: &Path) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidRoot {
        path: root.to_path_buf(),
        reason,
    };

    if root.as_os_str().is_empty() {
        return Err(invalid("path is empty".into()));
    }

    let metadata = fs::symlink_metadata(root).map_err(|e| invalid(e.to_string()))?;

    if metadata.file_type().is_symlink() {
        return Err(invalid("root is a symbolic link".into()));
    }

    if !metadata.is_dir() {
        return Err(invalid("not a directory".into()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_rejects_zero_workers() {
        let dir = tempdir().unwrap();
        let err = RemoveConfig::new(dir.path(), 0).validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidWorkerCount { count: 0, .. }));
    }

    #[test]
    fn test_accepts_large_worker_count() {
        let dir = tempdir().unwrap();
        let config = RemoveConfig::new(dir.path(), 2048).validate().unwrap();
        assert_eq!(config.worker_count, 2048);
    }

    #[test]
    fn test_rejects_zero_queue_depth() {
        let dir = tempdir().unwrap();
        let err = RemoveConfig::new(dir.path(), 2)
            .queue_depth(0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidQueueDepth { depth: 0 }));
    }

    #[test]
    fn test_rejects_missing_root() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = RemoveConfig::new(&missing, 2).validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRoot { .. }));
    }

    #[test]
    fn test_rejects_file_root() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("file.txt");
        fs::write(&file, "x").unwrap();
        let err = RemoveConfig::new(&file, 2).validate().unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[cfg(unix)]
    #[test]
    fn test_rejects_symlink_root() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("target");
        let link = dir.path().join("link");
        fs::create_dir(&target).unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let err = RemoveConfig::new(&link, 2).validate().unwrap_err();
        assert!(err.to_string().contains("symbolic link"));
    }

    #[test]
    fn test_validate_makes_root_absolute() {
        let dir = tempdir().unwrap();
        let config = RemoveConfig::new(dir.path(), 4).validate().unwrap();
        assert!(config.root.is_absolute());
        assert_eq!(config.worker_count, 4);
    }

    #[test]
    fn test_cli_defaults() {
        let args = CliArgs::parse_from(["parallel-rm-rf", "/tmp/x"]);
        assert_eq!(args.processes, DEFAULT_WORKERS);
        assert_eq!(args.queue_depth, DEFAULT_QUEUE_DEPTH);
        assert!(!args.verbose);
        assert!(args.report_timeout.is_none());

        let args = CliArgs::parse_from(["parallel-rm-rf", "/tmp/x", "-p", "3", "-v"]);
        assert_eq!(args.processes, 3);
        assert!(args.verbose);
    }
}
