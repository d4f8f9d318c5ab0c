//! Remote submission abstraction.
//!
//! A [`RemoteSubmitter`] makes exactly one attempt to hand one transaction
//! to the remote authority. It never retries and does not make submissions
//! idempotent; both are the sync engine's concern.
//!
//! # Outcomes
//!
//! - `Ok(SubmitOutcome::Accepted)` - remote answered `{"success": true}`
//! - `Ok(SubmitOutcome::Rejected)` - remote answered `{"success": false}`
//! - `Err(SubmitError)` - no usable answer (transport failure)

mod http;
mod mock;

pub use http::{
    HttpSubmitter, SubmitterConfig, SubmitterConfigError, DEFAULT_CONNECT_TIMEOUT,
    DEFAULT_SUBMIT_TIMEOUT,
};
pub use mock::{MockResponse, MockSubmitter};

use async_trait::async_trait;
use thiserror::Error;
use txq_types::{SubmitOutcome, SubmitRequest};

/// Transport failures: the remote gave no usable answer.
///
/// The transaction may or may not have reached the remote.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// Could not connect to the remote.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Remote answered with a non-success HTTP status.
    #[error("remote returned status {0}")]
    Status(u16),

    /// Response body was not `{"success": bool}`.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Any other request failure.
    #[error("request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for SubmitError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SubmitError::Timeout
        } else if e.is_connect() {
            SubmitError::Connect(e.to_string())
        } else if e.is_decode() {
            SubmitError::Malformed(e.to_string())
        } else {
            SubmitError::Request(e.to_string())
        }
    }
}

/// Sends one transaction to the remote authority.
#[async_trait]
pub trait RemoteSubmitter: Send + Sync {
    /// Submit once and report the remote's answer.
    async fn submit(&self, request: &SubmitRequest) -> Result<SubmitOutcome, SubmitError>;
}
