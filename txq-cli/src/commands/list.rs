//! List stored transactions.

use anyhow::Result;
use txq_client::now_millis;
use txq_types::{TransactionRecord, TransactionStatus, TransactionSummary};

use crate::remote::Queue;

const ALL_STATUSES: [TransactionStatus; 3] = [
    TransactionStatus::Pending,
    TransactionStatus::Successful,
    TransactionStatus::Failed,
];

/// Run the list command.
///
/// With a counterparty, full records are shown; otherwise summaries.
pub async fn run(
    queue: &Queue,
    counterparty: Option<&str>,
    status: Option<TransactionStatus>,
    json: bool,
) -> Result<()> {
    if let Some(counterparty) = counterparty {
        let mut records = queue.query_by_counterparty(counterparty).await?;
        if let Some(status) = status {
            records.retain(|r| r.status == status);
        }
        return print_records(&records, json);
    }

    let statuses = match status {
        Some(status) => vec![status],
        None => ALL_STATUSES.to_vec(),
    };
    let mut summaries = Vec::new();
    for status in statuses {
        summaries.extend(queue.summaries_by_status(status).await?);
    }
    summaries.sort_by_key(|s| s.id);
    print_summaries(&summaries, json)
}

/// Run the pending command.
pub async fn pending(queue: &Queue, json: bool) -> Result<()> {
    run(queue, None, Some(TransactionStatus::Pending), json).await
}

fn print_records(records: &[TransactionRecord], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(records)?);
        return Ok(());
    }
    if records.is_empty() {
        println!("No transactions");
        return Ok(());
    }

    println!("{:>6}  {:<10}  {:>12}  {:<16}  CREATED", "ID", "STATUS", "AMOUNT", "COUNTERPARTY");
    for r in records {
        println!(
            "{:>6}  {:<10}  {:>12}  {:<16}  {}",
            r.id.value(),
            r.status,
            r.amount,
            r.counterparty_identifier,
            format_age(r.created_at)
        );
    }
    Ok(())
}

fn print_summaries(summaries: &[TransactionSummary], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summaries)?);
        return Ok(());
    }
    if summaries.is_empty() {
        println!("No transactions");
        return Ok(());
    }

    println!("{:>6}  {:<10}  {:>12}", "ID", "STATUS", "AMOUNT");
    for s in summaries {
        println!("{:>6}  {:<10}  {:>12}", s.id.value(), s.status, s.amount);
    }
    Ok(())
}

/// Format an epoch-millisecond timestamp as an age.
fn format_age(created_at_ms: i64) -> String {
    let diff = now_millis().saturating_sub(created_at_ms).max(0) / 1000;

    if diff < 60 {
        "just now".to_string()
    } else if diff < 3600 {
        format!("{} minutes ago", diff / 60)
    } else if diff < 86400 {
        format!("{} hours ago", diff / 3600)
    } else {
        format!("{} days ago", diff / 86400)
    }
}
