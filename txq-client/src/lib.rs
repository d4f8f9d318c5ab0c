//! # txq-client
//!
//! Offline-first transaction queue: capture locally, deliver when connected.
//!
//! Transactions are persisted as `pending` the moment they are created and
//! reconciled with the remote authority by sync passes, which run whenever
//! the remote is reachable.
//!
//! ## Architecture
//!
//! ```text
//! TransactionQueue ──► RecordStore (SQLite, WAL)
//!        │                  ▲
//!        ▼                  │
//!    SyncEngine ────────────┘
//!        │
//!        ├──► ConnectivityGate (TCP probe, static, mock)
//!        └──► RemoteSubmitter  (HTTP, mock)
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use txq_client::{HttpSubmitter, SqliteStore, SubmitterConfig, TcpProbeGate, TransactionQueue};
//!
//! let store = Arc::new(SqliteStore::open(path).await?);
//! let config = SubmitterConfig::new("https://payments.example.com");
//! let gate = TcpProbeGate::for_base_url(&config.parsed_base_url()?, DEFAULT_PROBE_TIMEOUT)?;
//! let queue = TransactionQueue::new(store, HttpSubmitter::new(&config)?, gate);
//!
//! let id = queue.create_transaction(amount, "+254700000001").await?;
//! let report = queue.run_sync_pass().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clock;
pub mod engine;
pub mod error;
pub mod gate;
pub mod queue;
pub mod scheduler;
pub mod store;
pub mod submitter;

pub use clock::now_millis;
pub use engine::SyncEngine;
pub use error::{QueueError, SyncError};
pub use gate::{ConnectivityGate, MockGate, StaticGate, TcpProbeGate, DEFAULT_PROBE_TIMEOUT};
pub use queue::TransactionQueue;
pub use scheduler::{spawn_sync_task, ScheduleConfig, MIN_SYNC_INTERVAL};
pub use store::{PassLock, RecordStore, SqliteStore, StoreError};
pub use submitter::{
    HttpSubmitter, MockResponse, MockSubmitter, RemoteSubmitter, SubmitError, SubmitterConfig,
    SubmitterConfigError, DEFAULT_CONNECT_TIMEOUT, DEFAULT_SUBMIT_TIMEOUT,
};
