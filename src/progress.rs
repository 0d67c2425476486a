//! Progress reporting for the remover
//!
//! Provides a live spinner using indicatif and the final summary printed by
//! the CLI. The engine itself never prints.

use crate::remover::{DispatchProgress, RemoveProgress, RunTotals};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const TICK: Duration = Duration::from_millis(100);

/// Progress reporter that displays removal status
pub struct ProgressReporter {
    /// Progress bar
    bar: ProgressBar,

    /// Stop signal for the updater thread
    stop: Arc<AtomicBool>,

    /// Updater thread
    updater: Option<JoinHandle<()>>,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();

        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .expect("Invalid progress template")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );

        bar.enable_steady_tick(TICK);

        Self {
            bar,
            stop: Arc::new(AtomicBool::new(false)),
            updater: None,
        }
    }

    /// Poll the dispatcher's progress until finished
    pub fn follow(&mut self, source: Arc<DispatchProgress>) {
        let bar = self.bar.clone();
        let stop = Arc::clone(&self.stop);

        self.updater = Some(thread::spawn(move || {
            while !stop.load(Ordering::Relaxed) {
                bar.set_message(progress_message(&source.snapshot()));
                thread::sleep(TICK);
            }
        }));
    }

    /// Set a status message
    pub fn set_status(&self, status: &str) {
        self.bar.set_message(status.to_string());
    }

    /// Finish the progress display with a final message
    pub fn finish(&mut self, message: &str) {
        self.stop_updater();
        self.bar.finish_with_message(message.to_string());
    }

    /// Finish and clear the progress display
    pub fn finish_and_clear(&mut self) {
        self.stop_updater();
        self.bar.finish_and_clear();
    }

    fn stop_updater(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(updater) = self.updater.take() {
            let _ = updater.join();
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn progress_message(progress: &RemoveProgress) -> String {
    let phase = if progress.enumeration_done {
        "Waiting for workers"
    } else {
        "Dispatching"
    };

    format!(
        "{} | Dirs: {} | Rate: {:.0}/s | Workers: {}",
        phase,
        format_number(progress.dirs_dispatched),
        progress.dirs_per_second(),
        progress.workers,
    )
}

/// Format a number with thousands separators
fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }

    out
}

/// Print the per-worker timing lines shown in verbose mode
pub fn print_worker_reports(totals: &RunTotals) {
    println!(
        "constructed directory list and awaiting worker completions after {:9.2} sec",
        totals.enumerated_after.as_secs_f64()
    );

    for report in &totals.workers {
        println!(
            "after {:7.2} sec worker {} removed {} files and {} dirs with {} collisions and {} non-empty dirs",
            report.finished_after.as_secs_f64(),
            report.index,
            report.stats.files_removed,
            report.stats.dirs_removed,
            report.stats.collisions,
            report.stats.nonempty_skips,
        );
    }

    println!("elapsed time = {:7.2} sec", totals.elapsed.as_secs_f64());
    println!("files per second = {:8.2}", totals.files_per_second());
    println!("directories per second = {:8.2}", totals.dirs_per_second());
}

/// Print a summary of the removal
pub fn print_summary(totals: &RunTotals) {
    let duration_secs = totals.elapsed.as_secs_f64();

    println!();
    println!("{}", style("Removal Complete").green().bold());
    println!("{}", style("─".repeat(50)).dim());
    println!(
        "  {} {}",
        style("Files removed:").bold(),
        format_number(totals.files_removed())
    );
    println!(
        "  {} {}",
        style("Directories removed:").bold(),
        format_number(totals.dirs_removed())
    );
    println!(
        "  {} {:.1}s ({:.0} files/sec, {:.0} dirs/sec)",
        style("Duration:").bold(),
        duration_secs,
        totals.files_per_second(),
        totals.dirs_per_second()
    );

    let leftover = totals.dirs_enumerated.saturating_sub(totals.dirs_removed());
    if leftover > 0 {
        println!(
            "  {} {} (empty directories left after lost prune races)",
            style("Not pruned:").yellow().bold(),
            format_number(leftover)
        );
    }
    println!();
}

/// Print a header at the start of the run
pub fn print_header(root: &str, workers: usize) {
    println!();
    println!(
        "{} {}",
        style("parallel-rm-rf").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", style("─".repeat(50)).dim());
    println!("  {} {}", style("Root:").bold(), root);
    println!("  {} {}", style("Workers:").bold(), workers);
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
        assert_eq!(format_number(1234567890), "1,234,567,890");
    }

    #[test]
    fn test_progress_message_phase() {
        let mut progress = RemoveProgress {
            dirs_dispatched: 12345,
            enumeration_done: false,
            workers: 8,
            elapsed: Duration::from_secs(1),
        };
        let msg = progress_message(&progress);
        assert!(msg.starts_with("Dispatching"));
        assert!(msg.contains("12,345"));

        progress.enumeration_done = true;
        assert!(progress_message(&progress).starts_with("Waiting for workers"));
    }
}
