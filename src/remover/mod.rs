//! Parallel tree removal engine
//!
//! Directories are enumerated bottom-up and handed out round-robin to a fixed
//! pool of worker threads. Each worker has its own task channel; nothing is
//! locked. Workers race freely on shared ancestors and classify the losing
//! side of each race as a benign collision or a non-empty skip.
//!
//! # Architecture
//!
//! ```text
//!                 ┌──────────────────────────┐
//!                 │      PostOrderDirs       │
//!                 │  children before parents │
//!                 └────────────┬─────────────┘
//!                              │ dir paths
//!                 ┌────────────▼─────────────┐
//!                 │   RemovalCoordinator     │
//!                 │  round-robin, i mod N    │
//!                 └──┬──────────┬─────────┬──┘
//!                    │          │         │   Remove(dir) ... Terminate
//!              ┌─────▼────┐ ┌───▼──────┐ ┌▼─────────┐
//!              │ Worker 0 │ │ Worker 1 │ │ Worker N │
//!              │ unlink   │ │ unlink   │ │ unlink   │
//!              │ rmdir ↑  │ │ rmdir ↑  │ │ rmdir ↑  │
//!              └─────┬────┘ └───┬──────┘ └┬─────────┘
//!                    │          │         │   WorkerStats
//!                 ┌──▼──────────▼─────────▼──┐
//!                 │        RunTotals         │
//!                 └──────────────────────────┘
//! ```
//!
//! # Known limitation
//!
//! Pruning is attempted once per task and never retried. If an ancestor's
//! removal loses a "not empty" race and no later prune reaches it, it stays
//! behind as an empty directory. A run never leaves files behind.

pub mod aggregate;
pub mod dispatcher;
pub mod enumerate;
pub mod worker;

pub use aggregate::{RunTotals, WorkerReport};
pub use dispatcher::{DispatchProgress, RemovalCoordinator, RemoveProgress, RoundRobin};
pub use enumerate::PostOrderDirs;
pub use worker::{remove_directory, Worker, WorkerMessage, WorkerStats};
