//! Run sync passes in the foreground until interrupted.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Notify;
use txq_client::{spawn_sync_task, ScheduleConfig};

use crate::remote::Queue;

/// Run the watch command.
///
/// Each line read from stdin triggers an extra pass. Ctrl-C stops after the
/// record currently being submitted.
pub async fn run(queue: Queue, interval: Duration) -> Result<()> {
    let queue = Arc::new(queue);
    let trigger = Arc::new(Notify::new());

    println!(
        "Watching (interval: {}s). Press Enter to sync now, Ctrl-C to stop.",
        interval.as_secs()
    );

    let task = spawn_sync_task(
        Arc::clone(&queue),
        ScheduleConfig { interval },
        Arc::clone(&trigger),
    );

    let stdin_trigger = Arc::clone(&trigger);
    let stdin_task = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(_)) = lines.next_line().await {
            stdin_trigger.notify_one();
        }
    });

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    println!("Stopping...");

    queue.shutdown();
    stdin_task.abort();
    task.await.context("Sync task panicked")?;

    let drifted = queue.drifted().await;
    if !drifted.is_empty() {
        eprintln!(
            "{} transactions were answered remotely but not recorded locally:",
            drifted.len()
        );
        for entry in drifted {
            eprintln!("  {}: remote {:?}", entry.id, entry.remote);
        }
    }

    queue.store().close().await;
    Ok(())
}
