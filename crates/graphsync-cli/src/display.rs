//! Terminal display utilities for the graphsync CLI

use console::style;
use graphsync_sync::{HeaderReport, SyncOutcome, SyncResult};
use graphsync_types::{ChangeStatus, GraphStatus, Manifest, ServiceHealth, SyncCounts};
use std::time::Duration;

/// Display the summary of a sync run
pub fn display_sync_result(result: &SyncResult, verbose: bool) {
    match result.outcome {
        SyncOutcome::UpToDate => {
            println!(
                "{} Workspace {} is up to date",
                style("✓").green().bold(),
                style(&result.workspace_id).cyan()
            );
        }
        SyncOutcome::Submitted(counts) => {
            println!(
                "{} Synchronized workspace {}{}",
                style("✓").green().bold(),
                style(&result.workspace_id).cyan(),
                if result.replace { " (initial upload)" } else { "" }
            );
            display_counts(&counts);
            if verbose {
                display_changes(result);
            }
        }
        SyncOutcome::DryRun => {
            println!(
                "{} Dry run - {} changes would be submitted{}",
                style("ℹ").yellow().bold(),
                style(result.changes.len()).bold(),
                if result.replace {
                    " as an initial upload"
                } else {
                    ""
                }
            );
            display_changes(result);
        }
    }

    if !result.skipped.is_empty() {
        println!(
            "  {} {} paths skipped",
            style("!").yellow().bold(),
            style(result.skipped.len()).yellow()
        );
        if verbose {
            for skipped in &result.skipped {
                println!(
                    "    {} {}",
                    style(skipped.path.display()).dim(),
                    style(&skipped.reason).dim()
                );
            }
        }
    }

    println!(
        "  Scanned {} files in {}",
        style(result.files_scanned).green(),
        style(format_duration(result.duration)).blue()
    );
}

/// Display counts reported by the remote store
pub fn display_counts(counts: &SyncCounts) {
    println!();
    println!("{}", style("Sync Statistics:").bold().underlined());
    println!("  Added: {}", style(counts.added).green());
    println!("  Modified: {}", style(counts.modified).yellow());
    println!("  Deleted: {}", style(counts.deleted).red());
    println!("  Upserts: {}", style(counts.upserts).cyan());
}

fn display_changes(result: &SyncResult) {
    println!();
    for change in &result.changes {
        let marker = match change.status {
            ChangeStatus::Added => style("+").green(),
            ChangeStatus::Modified => style("~").yellow(),
            ChangeStatus::Deleted => style("-").red(),
        };
        println!("  {} {}", marker, change.path);
    }
}

/// Display a remote manifest, one `hash  path` line per entry
pub fn display_manifest(manifest: &Manifest) {
    for (path, hash) in manifest.iter() {
        println!("{}  {}", style(hash).dim(), path);
    }
    println!(
        "{} {} files tracked",
        style("ℹ").blue().bold(),
        style(manifest.len()).bold()
    );
}

/// Display remote graph node counts
pub fn display_status(status: &GraphStatus) {
    println!("{}", style("Graph Status:").bold().underlined());
    println!("  Files: {}", style(status.files).green());
    println!("  Classes: {}", style(status.classes).green());
    println!("  Functions: {}", style(status.functions).green());
}

/// Display the per-file results of a header operation
pub fn display_header_report(action: &str, report: &HeaderReport, verbose: bool) {
    let icon = if report.is_success() {
        style("✓").green().bold()
    } else {
        style("✗").red().bold()
    };
    println!(
        "{} Headers {}: {} updated, {} unchanged, {} failed",
        icon,
        action,
        style(report.updated.len()).green(),
        style(report.unchanged.len()).dim(),
        style(report.failed.len()).red()
    );

    if verbose {
        for path in &report.updated {
            println!("  {} {}", style("~").yellow(), path.display());
        }
    }
    for failure in &report.failed {
        println!(
            "  {} {}: {}",
            style("!").red(),
            failure.path.display(),
            failure.reason
        );
    }
}

/// Display the header service health report
pub fn display_health(health: &ServiceHealth) {
    let status = if health.is_healthy() {
        style(health.status.as_str()).green()
    } else {
        style(health.status.as_str()).red()
    };
    println!("{}: {}", style(&health.service).bold(), status);
}

/// Format duration as human-readable string
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{:.2}s", duration.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
