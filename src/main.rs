//! parallel-rm-rf - Parallel recursive directory removal
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use parallel_rm_rf::config::{CliArgs, RemoveConfig};
use parallel_rm_rf::progress::{print_header, print_summary, print_worker_reports, ProgressReporter};
use parallel_rm_rf::RemovalCoordinator;
use std::process::ExitCode;
use std::sync::atomic::Ordering;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Setup logging
    setup_logging(args.verbose)?;

    // Validate and create config
    let config = RemoveConfig::from_args(args).context("Invalid configuration")?;

    if config.show_progress {
        print_header(&config.root.display().to_string(), config.worker_count);
    }

    let coordinator = RemovalCoordinator::new(config.clone())
        .context("Failed to initialize remover")?;

    // Setup signal handler for graceful shutdown
    let abort_flag = coordinator.abort_flag();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupt received, shutting down...");
        abort_flag.store(true, Ordering::SeqCst);
    })
    .context("Failed to set signal handler")?;

    let mut progress = if config.show_progress {
        let mut reporter = ProgressReporter::new();
        reporter.set_status("Enumerating directories...");
        reporter.follow(coordinator.progress());
        Some(reporter)
    } else {
        None
    };

    let result = coordinator.run();

    if let Some(ref mut p) = progress {
        match &result {
            Ok(_) => p.finish("Removal completed"),
            Err(_) => p.finish_and_clear(),
        }
    }

    let totals = result.with_context(|| format!("Failed to remove '{}'", config.root.display()))?;

    if config.verbose {
        print_worker_reports(&totals);
    }

    if config.show_progress {
        print_summary(&totals);
    }

    if totals.dirs_removed() < totals.dirs_enumerated {
        info!(
            remaining = totals.dirs_enumerated - totals.dirs_removed(),
            "Some empty directories were not pruned; re-run to remove them"
        );
    }

    Ok(())
}

fn setup_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("parallel_rm_rf=debug,warn")
    } else {
        EnvFilter::new("parallel_rm_rf=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}
