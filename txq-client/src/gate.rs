//! Connectivity gate.
//!
//! Answers "is the remote reachable right now?" once per sync pass. Answers
//! are never cached; connectivity is assumed to change at any time.

use async_trait::async_trait;
use reqwest::Url;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;

use crate::submitter::SubmitterConfigError;

/// Default bound on one reachability probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Reports whether the remote endpoint is currently reachable.
#[async_trait]
pub trait ConnectivityGate: Send + Sync {
    /// Probe reachability. Must not have side effects on the remote.
    async fn is_reachable(&self) -> bool;
}

/// Probes reachability by opening a TCP connection to the remote host.
///
/// The connection is dropped immediately; nothing is written to it.
#[derive(Debug, Clone)]
pub struct TcpProbeGate {
    host: String,
    port: u16,
    timeout: Duration,
}

impl TcpProbeGate {
    /// Probe `host:port`.
    pub fn new(host: &str, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.to_string(),
            port,
            timeout,
        }
    }

    /// Probe the host and port a base URL points at.
    pub fn for_base_url(base_url: &Url, timeout: Duration) -> Result<Self, SubmitterConfigError> {
        let invalid = |reason: &str| SubmitterConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: reason.to_string(),
        };
        let host = base_url.host_str().ok_or_else(|| invalid("missing host"))?;
        let port = base_url
            .port_or_known_default()
            .ok_or_else(|| invalid("no port for scheme"))?;

        // Url keeps IPv6 literals bracketed; the resolver wants them bare
        let host = host.trim_start_matches('[').trim_end_matches(']');
        Ok(Self::new(host, port, timeout))
    }

    /// The `host:port` being probed.
    pub fn target(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[async_trait]
impl ConnectivityGate for TcpProbeGate {
    async fn is_reachable(&self) -> bool {
        let connect = TcpStream::connect((self.host.as_str(), self.port));
        match tokio::time::timeout(self.timeout, connect).await {
            Ok(Ok(_stream)) => true,
            Ok(Err(e)) => {
                tracing::debug!("Probe to {} failed: {}", self.target(), e);
                false
            }
            Err(_) => {
                tracing::debug!("Probe to {} timed out after {:?}", self.target(), self.timeout);
                false
            }
        }
    }
}

/// Gate with a fixed answer.
#[derive(Debug, Clone, Copy)]
pub struct StaticGate(pub bool);

#[async_trait]
impl ConnectivityGate for StaticGate {
    async fn is_reachable(&self) -> bool {
        self.0
    }
}

/// Toggleable gate that counts probes (for testing).
///
/// Clones share state.
#[derive(Debug, Clone)]
pub struct MockGate {
    reachable: Arc<AtomicBool>,
    probes: Arc<AtomicUsize>,
}

impl MockGate {
    /// Create a gate with the given initial answer.
    pub fn new(reachable: bool) -> Self {
        Self {
            reachable: Arc::new(AtomicBool::new(reachable)),
            probes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Change the answer.
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// How many times the gate was asked.
    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConnectivityGate for MockGate {
    async fn is_reachable(&self) -> bool {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.reachable.load(Ordering::SeqCst)
    }
}
