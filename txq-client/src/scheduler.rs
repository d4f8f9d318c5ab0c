//! Background sync task.
//!
//! Runs a pass on a fixed interval and whenever the trigger is notified
//! (for example on reconnect or app foreground). Ends when the queue is
//! shut down.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::{interval, MissedTickBehavior};

use crate::gate::ConnectivityGate;
use crate::queue::TransactionQueue;
use crate::store::RecordStore;
use crate::submitter::RemoteSubmitter;

/// Shortest interval the scheduler will run at.
pub const MIN_SYNC_INTERVAL: Duration = Duration::from_secs(1);

/// Scheduler settings.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleConfig {
    /// Time between timed passes
    pub interval: Duration,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
        }
    }
}

/// Spawn the background sync task.
///
/// The first pass runs immediately. Notifying `trigger` runs an extra pass
/// without waiting for the timer.
pub fn spawn_sync_task<S, R, G>(
    queue: Arc<TransactionQueue<S, R, G>>,
    config: ScheduleConfig,
    trigger: Arc<Notify>,
) -> tokio::task::JoinHandle<()>
where
    S: RecordStore + 'static,
    R: RemoteSubmitter + 'static,
    G: ConnectivityGate + 'static,
{
    tokio::spawn(async move {
        let period = config.interval.max(MIN_SYNC_INTERVAL);
        tracing::info!("Sync task started (interval: {}s)", period.as_secs());

        let shutdown = queue.cancellation_token();
        let mut timer = interval(period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = timer.tick() => {}
                _ = trigger.notified() => {
                    tracing::debug!("Sync triggered");
                }
            }

            match queue.run_sync_pass().await {
                Ok(report) => {
                    if report.has_drift() {
                        tracing::error!(
                            "Sync pass left {} records drifted from the remote",
                            report.drift.len()
                        );
                    }
                    tracing::debug!("Sync pass ended: {:?}", report.disposition);
                }
                Err(e) => {
                    tracing::error!("Sync pass error: {}", e);
                }
            }
        }

        tracing::info!("Sync task stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::MockGate;
    use crate::store::SqliteStore;
    use crate::submitter::MockSubmitter;
    use txq_types::Decimal;

    type TestQueue = TransactionQueue<SqliteStore, MockSubmitter, MockGate>;

    async fn test_queue() -> (Arc<TestQueue>, MockSubmitter) {
        let store = Arc::new(SqliteStore::in_memory().await.unwrap());
        let submitter = MockSubmitter::new();
        let queue = TransactionQueue::new(store, submitter.clone(), MockGate::new(true));
        (Arc::new(queue), submitter)
    }

    async fn wait_for_submissions(submitter: &MockSubmitter, count: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while submitter.submit_count() < count {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("submissions should arrive");
    }

    fn hourly() -> ScheduleConfig {
        ScheduleConfig {
            interval: Duration::from_secs(3600),
        }
    }

    #[tokio::test]
    async fn first_pass_runs_immediately() {
        let (queue, submitter) = test_queue().await;
        queue.create_transaction(Decimal::new(100, 0), "+1").await.unwrap();

        let handle = spawn_sync_task(Arc::clone(&queue), hourly(), Arc::new(Notify::new()));
        wait_for_submissions(&submitter, 1).await;

        queue.shutdown();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn trigger_runs_extra_pass() {
        let (queue, submitter) = test_queue().await;
        let trigger = Arc::new(Notify::new());
        queue.create_transaction(Decimal::new(100, 0), "+1").await.unwrap();

        let handle = spawn_sync_task(Arc::clone(&queue), hourly(), Arc::clone(&trigger));
        wait_for_submissions(&submitter, 1).await;

        queue.create_transaction(Decimal::new(200, 0), "+2").await.unwrap();
        trigger.notify_one();
        wait_for_submissions(&submitter, 2).await;

        queue.shutdown();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn task_stops_on_shutdown() {
        let (queue, _) = test_queue().await;
        let handle = spawn_sync_task(Arc::clone(&queue), hourly(), Arc::new(Notify::new()));

        queue.shutdown();

        tokio::time::timeout(Duration::from_millis(500), handle)
            .await
            .expect("task should stop on shutdown")
            .expect("task should not panic");
    }

    #[test]
    fn default_interval_is_one_minute() {
        assert_eq!(ScheduleConfig::default().interval, Duration::from_secs(60));
    }
}
