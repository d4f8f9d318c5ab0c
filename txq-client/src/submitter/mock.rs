//! Mock submitter for testing.
//!
//! Allows scripting remote answers and capturing submitted requests for verification.

use super::{RemoteSubmitter, SubmitError};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use txq_types::{SubmitOutcome, SubmitRequest};

/// Scripted answer for one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockResponse {
    /// Remote accepts
    Accept,
    /// Remote rejects
    Reject,
    /// Transport failure with the given reason
    TransportFailure(String),
}

/// Mock submitter for testing.
///
/// Answer precedence: queued one-shot responses, then per-counterparty
/// scripts, then the default (accept). Clones share state.
#[derive(Debug, Default, Clone)]
pub struct MockSubmitter {
    inner: Arc<Mutex<MockSubmitterInner>>,
}

#[derive(Debug, Default)]
struct MockSubmitterInner {
    default_response: Option<MockResponse>,
    by_counterparty: HashMap<String, MockResponse>,
    queued: VecDeque<MockResponse>,
    submitted: Vec<SubmitRequest>,
    delay: Option<Duration>,
}

impl MockSubmitter {
    /// Create a mock that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    fn inner(&self) -> MutexGuard<'_, MockSubmitterInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Answer every unscripted submission with `response`.
    pub fn set_default(&self, response: MockResponse) {
        self.inner().default_response = Some(response);
    }

    /// Answer submissions for one counterparty with `response`.
    pub fn respond_to(&self, counterparty: &str, response: MockResponse) {
        self.inner()
            .by_counterparty
            .insert(counterparty.to_string(), response);
    }

    /// Answer the next submission with `response`, ahead of any script.
    pub fn queue_response(&self, response: MockResponse) {
        self.inner().queued.push_back(response);
    }

    /// Wait this long before answering each submission.
    pub fn set_delay(&self, delay: Duration) {
        self.inner().delay = Some(delay);
    }

    /// All requests submitted so far, in order.
    pub fn submitted(&self) -> Vec<SubmitRequest> {
        self.inner().submitted.clone()
    }

    /// Number of submissions so far.
    pub fn submit_count(&self) -> usize {
        self.inner().submitted.len()
    }

    /// Clear all scripts and captured requests.
    pub fn reset(&self) {
        *self.inner() = MockSubmitterInner::default();
    }
}

#[async_trait]
impl RemoteSubmitter for MockSubmitter {
    async fn submit(&self, request: &SubmitRequest) -> Result<SubmitOutcome, SubmitError> {
        let (response, delay) = {
            let mut inner = self.inner();
            inner.submitted.push(request.clone());
            let response = inner
                .queued
                .pop_front()
                .or_else(|| inner.by_counterparty.get(&request.phone_number).cloned())
                .or_else(|| inner.default_response.clone())
                .unwrap_or(MockResponse::Accept);
            (response, inner.delay)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match response {
            MockResponse::Accept => Ok(SubmitOutcome::Accepted),
            MockResponse::Reject => Ok(SubmitOutcome::Rejected),
            MockResponse::TransportFailure(reason) => Err(SubmitError::Connect(reason)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use txq_types::Decimal;

    fn request(phone: &str) -> SubmitRequest {
        SubmitRequest {
            amount: Decimal::ONE,
            phone_number: phone.to_string(),
            timestamp: 0,
        }
    }

    #[tokio::test]
    async fn accepts_by_default_and_records_requests() {
        let mock = MockSubmitter::new();

        let outcome = mock.submit(&request("+1")).await.unwrap();

        assert_eq!(outcome, SubmitOutcome::Accepted);
        assert_eq!(mock.submit_count(), 1);
        assert_eq!(mock.submitted()[0].phone_number, "+1");
    }

    #[tokio::test]
    async fn counterparty_script_overrides_default() {
        let mock = MockSubmitter::new();
        mock.set_default(MockResponse::Reject);
        mock.respond_to("+2", MockResponse::Accept);

        assert_eq!(
            mock.submit(&request("+1")).await.unwrap(),
            SubmitOutcome::Rejected
        );
        assert_eq!(
            mock.submit(&request("+2")).await.unwrap(),
            SubmitOutcome::Accepted
        );
    }

    #[tokio::test]
    async fn queued_response_is_one_shot() {
        let mock = MockSubmitter::new();
        mock.queue_response(MockResponse::TransportFailure("link down".into()));

        let first = mock.submit(&request("+1")).await;
        assert!(matches!(first, Err(SubmitError::Connect(_))));

        let second = mock.submit(&request("+1")).await.unwrap();
        assert_eq!(second, SubmitOutcome::Accepted);
    }

    #[tokio::test]
    async fn clone_shares_state() {
        let mock1 = MockSubmitter::new();
        let mock2 = mock1.clone();

        mock2.submit(&request("+1")).await.unwrap();
        assert_eq!(mock1.submit_count(), 1);
    }

    #[tokio::test]
    async fn reset_clears_all() {
        let mock = MockSubmitter::new();
        mock.set_default(MockResponse::Reject);
        mock.submit(&request("+1")).await.unwrap();

        mock.reset();

        assert_eq!(mock.submit_count(), 0);
        assert_eq!(
            mock.submit(&request("+1")).await.unwrap(),
            SubmitOutcome::Accepted
        );
    }
}
