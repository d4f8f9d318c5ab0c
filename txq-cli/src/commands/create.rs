//! Queue a new transaction.

use anyhow::Result;
use txq_types::Decimal;

use crate::remote::Queue;

/// Run the create command.
pub async fn run(queue: &Queue, amount: Decimal, counterparty: &str) -> Result<()> {
    let id = queue.create_transaction(amount, counterparty).await?;
    println!("Queued transaction {} ({} to {})", id, amount, counterparty);
    println!("Status: pending (delivered on the next sync pass)");
    Ok(())
}
