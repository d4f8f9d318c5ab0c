//! Show queue and remote status.

use anyhow::Result;
use std::path::Path;
use txq_client::{ConnectivityGate, RecordStore};
use txq_types::TransactionStatus;

use crate::config::Config;
use crate::remote::{build_gate, open_store};

/// Run the status command.
pub async fn run(config: &Config, data_dir: &Path, use_mock: bool) -> Result<()> {
    println!("=== txq status ===");
    println!();

    let store = open_store(config, data_dir).await?;
    println!("Queue:");
    println!("  Database: {}", config.database_path(data_dir).display());
    for status in [
        TransactionStatus::Pending,
        TransactionStatus::Successful,
        TransactionStatus::Failed,
    ] {
        let count = store.query_summaries_by_status(status).await?.len();
        println!("  {:<11} {}", format!("{}:", status), count);
    }
    store.close().await;

    println!();

    let gate = build_gate(config, use_mock)?;
    println!("Remote:");
    if use_mock {
        println!("  Endpoint: mock submitter");
    } else {
        println!("  Endpoint: {}", config.remote.base_url);
    }
    let reachable = if gate.is_reachable().await {
        "ONLINE"
    } else {
        "OFFLINE"
    };
    println!("  Probe:    {} ({})", gate.describe(), reachable);

    Ok(())
}
