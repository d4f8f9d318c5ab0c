//! Stub remote endpoint.
//!
//! Speaks the same wire protocol as the real remote authority and keeps an
//! in-memory ledger of what it received. Amounts above `reject_above` are
//! answered with `{"success": false}`.

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use txq_types::{Decimal, SubmitRequest, SubmitResponse, TRANSACTIONS_PATH};

/// One received submission.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerEntry {
    /// Submitted amount
    pub amount: Decimal,
    /// Submitted counterparty
    pub phone_number: String,
    /// Client-side creation time
    pub timestamp: i64,
    /// Whether it was accepted
    pub accepted: bool,
}

/// Shared state of the stub server.
#[derive(Debug, Default)]
pub struct ServeState {
    ledger: Mutex<Vec<LedgerEntry>>,
    reject_above: Option<Decimal>,
}

impl ServeState {
    /// Create state with an optional rejection threshold.
    pub fn new(reject_above: Option<Decimal>) -> Self {
        Self {
            ledger: Mutex::new(Vec::new()),
            reject_above,
        }
    }

    fn ledger(&self) -> MutexGuard<'_, Vec<LedgerEntry>> {
        self.ledger.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Everything received so far, in arrival order.
    pub fn entries(&self) -> Vec<LedgerEntry> {
        self.ledger().clone()
    }

    fn record(&self, request: SubmitRequest) -> bool {
        let accepted = self
            .reject_above
            .map_or(true, |limit| request.amount <= limit);
        self.ledger().push(LedgerEntry {
            amount: request.amount,
            phone_number: request.phone_number,
            timestamp: request.timestamp,
            accepted,
        });
        accepted
    }
}

/// Health status response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// Overall status.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Submissions accepted so far.
    pub accepted: usize,
    /// Submissions rejected so far.
    pub rejected: usize,
}

/// Build the HTTP router with all endpoints.
pub fn build_router(state: Arc<ServeState>) -> Router {
    Router::new()
        .route(TRANSACTIONS_PATH, post(submit_handler))
        .route("/health", get(health_handler))
        .layer(Extension(state))
}

async fn submit_handler(
    Extension(state): Extension<Arc<ServeState>>,
    Json(request): Json<SubmitRequest>,
) -> Json<SubmitResponse> {
    let amount = request.amount;
    let success = state.record(request);
    if success {
        tracing::info!("Accepted transaction of {}", amount);
    } else {
        tracing::info!("Rejected transaction of {} (above threshold)", amount);
    }
    Json(SubmitResponse { success })
}

async fn health_handler(Extension(state): Extension<Arc<ServeState>>) -> Json<HealthStatus> {
    let entries = state.entries();
    let accepted = entries.iter().filter(|e| e.accepted).count();

    Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        accepted,
        rejected: entries.len() - accepted,
    })
}

/// Run the serve command until Ctrl-C.
pub async fn run(bind_address: &str, reject_above: Option<Decimal>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    let local = listener.local_addr().context("Failed to read bound address")?;

    println!("Stub remote listening on http://{}", local);
    if let Some(limit) = reject_above {
        println!("  Rejecting amounts above {}", limit);
    }

    let app = build_router(Arc::new(ServeState::new(reject_above)));
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("Stub server failed")?;

    println!("Stub remote stopped");
    Ok(())
}
