//! HTTP submitter.

use super::{RemoteSubmitter, SubmitError};
use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;
use thiserror::Error;
use txq_types::{SubmitOutcome, SubmitRequest, SubmitResponse, TRANSACTIONS_PATH};

/// Default bound on one submission, connect through response body.
pub const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(15);

/// Default bound on establishing the TCP/TLS connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for [`HttpSubmitter`].
#[derive(Debug, Clone)]
pub struct SubmitterConfig {
    /// Base URL of the remote, e.g. `https://payments.example.com`.
    pub base_url: String,
    /// Whole-request timeout.
    pub timeout: Duration,
    /// Connect timeout.
    pub connect_timeout: Duration,
    /// Optional bearer token sent as `Authorization: Bearer ...`.
    pub bearer_token: Option<String>,
}

impl SubmitterConfig {
    /// Create a configuration with default timeouts and no credentials.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            timeout: DEFAULT_SUBMIT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            bearer_token: None,
        }
    }

    /// Set the whole-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Send a bearer token with every submission.
    pub fn with_bearer_token(mut self, token: &str) -> Self {
        self.bearer_token = Some(token.to_string());
        self
    }

    /// Parse and check the base URL.
    pub fn parsed_base_url(&self) -> Result<Url, SubmitterConfigError> {
        let url = Url::parse(&self.base_url).map_err(|e| SubmitterConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(SubmitterConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason: format!("unsupported scheme {:?}", url.scheme()),
            });
        }
        if url.host_str().is_none() {
            return Err(SubmitterConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason: "missing host".to_string(),
            });
        }

        Ok(url)
    }

    /// Full URL of the transactions endpoint.
    pub fn endpoint(&self) -> Result<Url, SubmitterConfigError> {
        let base = self.parsed_base_url()?;
        let joined = format!("{}{}", base.as_str().trim_end_matches('/'), TRANSACTIONS_PATH);
        Url::parse(&joined).map_err(|e| SubmitterConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })
    }
}

/// Submitter configuration errors.
#[derive(Debug, Error)]
pub enum SubmitterConfigError {
    /// Base URL unusable.
    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl {
        /// The configured URL.
        url: String,
        /// Why it was refused.
        reason: String,
    },

    /// HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Submits transactions as JSON over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpSubmitter {
    client: reqwest::Client,
    endpoint: Url,
    bearer_token: Option<String>,
}

impl HttpSubmitter {
    /// Build a submitter from explicit configuration.
    pub fn new(config: &SubmitterConfig) -> Result<Self, SubmitterConfigError> {
        let endpoint = config.endpoint()?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint,
            bearer_token: config.bearer_token.clone(),
        })
    }

    /// The endpoint every submission is posted to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl RemoteSubmitter for HttpSubmitter {
    async fn submit(&self, request: &SubmitRequest) -> Result<SubmitOutcome, SubmitError> {
        let mut builder = self.client.post(self.endpoint.clone()).json(request);
        if let Some(token) = &self.bearer_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SubmitError::Status(status.as_u16()));
        }

        let body: SubmitResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                SubmitError::Timeout
            } else {
                SubmitError::Malformed(e.to_string())
            }
        })?;

        Ok(body.into())
    }
}
