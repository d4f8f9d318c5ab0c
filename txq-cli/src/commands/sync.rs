//! Run one sync pass.

use anyhow::{bail, Result};
use txq_core::{PassDisposition, SyncReport};

use crate::remote::Queue;

/// Run the sync command.
///
/// Fails after printing the report when any record is drifting, so scripts
/// see a non-zero exit.
pub async fn run(queue: &Queue, json: bool) -> Result<()> {
    let report = queue.run_sync_pass().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    check_drift(&report)
}

/// Error if the pass left records whose remote answer is not stored locally.
pub fn check_drift(report: &SyncReport) -> Result<()> {
    let drifting = report.drift.len() + report.held_count;
    if drifting > 0 {
        bail!(
            "{} transaction(s) settled remotely but not locally; they are held and will not be resubmitted",
            drifting
        );
    }
    Ok(())
}

/// Print a pass report for humans.
pub fn print_report(report: &SyncReport) {
    match report.disposition {
        PassDisposition::Unreachable => {
            println!("Remote unreachable; nothing submitted");
            return;
        }
        PassDisposition::AlreadyRunning => {
            println!("Another sync pass is running; nothing submitted");
            return;
        }
        PassDisposition::Cancelled => println!("Sync pass cancelled"),
        PassDisposition::Completed => println!("Sync pass completed"),
    }

    println!("  Successful:       {}", report.success_count);
    println!("  Failed:           {}", report.failed_count);
    println!("  Still pending:    {}", report.pending_count);
    println!("  Transport errors: {}", report.transport_error_count);
    if report.healed_count > 0 {
        println!("  Drift healed:     {}", report.healed_count);
    }
    if report.held_count > 0 {
        println!("  Held by drift:    {}", report.held_count);
    }

    for failure in &report.transport_failures {
        println!("  ! {}: {}", failure.id, failure.reason);
    }
    for failure in &report.read_failures {
        println!("  ! {}: read failed: {}", failure.id, failure.reason);
    }
    for entry in &report.drift {
        eprintln!(
            "  DRIFT {}: remote {:?} but local write failed: {}",
            entry.id, entry.remote, entry.reason
        );
    }
}
