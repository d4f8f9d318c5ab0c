//! Delete a transaction by id.

use anyhow::Result;
use txq_types::TransactionId;

use crate::remote::Queue;

/// Run the delete command.
///
/// A missing id is reported, not treated as a failure.
pub async fn run(queue: &Queue, id: TransactionId) -> Result<()> {
    if queue.delete_transaction(id).await? {
        println!("Deleted transaction {}", id);
    } else {
        println!("Transaction {} not found", id);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::remote::open_queue;
    use tempfile::tempdir;
    use txq_types::Decimal;

    #[tokio::test]
    async fn delete_removes_record() {
        let dir = tempdir().unwrap();
        let queue = open_queue(&Config::default(), dir.path(), true).await.unwrap();
        let id = queue.create_transaction(Decimal::new(10, 0), "+1").await.unwrap();

        run(&queue, id).await.unwrap();

        assert!(queue.get(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_missing_is_ok() {
        let dir = tempdir().unwrap();
        let queue = open_queue(&Config::default(), dir.path(), true).await.unwrap();

        assert!(run(&queue, TransactionId::new(99)).await.is_ok());
    }
}
