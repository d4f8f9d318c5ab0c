//! Wiring of the store, submitter and gate behind the CLI commands.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use txq_client::{
    ConnectivityGate, HttpSubmitter, MockSubmitter, RemoteSubmitter, SqliteStore, StaticGate,
    SubmitError, SubmitterConfig, TcpProbeGate, TransactionQueue,
};
use txq_types::{SubmitOutcome, SubmitRequest};

use crate::config::Config;

/// Submitter selected by `--mock`.
pub enum Submitter {
    /// Real HTTP endpoint
    Http(HttpSubmitter),
    /// Accepts everything without any network I/O
    Mock(MockSubmitter),
}

#[async_trait]
impl RemoteSubmitter for Submitter {
    async fn submit(&self, request: &SubmitRequest) -> Result<SubmitOutcome, SubmitError> {
        match self {
            Submitter::Http(http) => http.submit(request).await,
            Submitter::Mock(mock) => mock.submit(request).await,
        }
    }
}

/// Gate selected by `--mock`.
pub enum Gate {
    /// TCP probe of the remote host
    Tcp(TcpProbeGate),
    /// Always reachable
    Static(StaticGate),
}

impl Gate {
    /// Human-readable probe target.
    pub fn describe(&self) -> String {
        match self {
            Gate::Tcp(tcp) => tcp.target(),
            Gate::Static(_) => "mock (always reachable)".to_string(),
        }
    }
}

#[async_trait]
impl ConnectivityGate for Gate {
    async fn is_reachable(&self) -> bool {
        match self {
            Gate::Tcp(tcp) => tcp.is_reachable().await,
            Gate::Static(fixed) => fixed.is_reachable().await,
        }
    }
}

/// The queue as wired by the CLI.
pub type Queue = TransactionQueue<SqliteStore, Submitter, Gate>;

fn submitter_config(config: &Config) -> SubmitterConfig {
    let mut submitter = SubmitterConfig::new(&config.remote.base_url)
        .with_timeout(config.remote.timeout())
        .with_connect_timeout(config.remote.connect_timeout());
    if let Some(token) = &config.remote.bearer_token {
        submitter = submitter.with_bearer_token(token);
    }
    submitter
}

/// Build the submitter for this invocation.
pub fn build_submitter(config: &Config, mock: bool) -> Result<Submitter> {
    if mock {
        return Ok(Submitter::Mock(MockSubmitter::new()));
    }
    let http = HttpSubmitter::new(&submitter_config(config))
        .context("Failed to configure remote submitter")?;
    Ok(Submitter::Http(http))
}

/// Build the connectivity gate for this invocation.
pub fn build_gate(config: &Config, mock: bool) -> Result<Gate> {
    if mock {
        return Ok(Gate::Static(StaticGate(true)));
    }
    let base_url = submitter_config(config)
        .parsed_base_url()
        .context("Invalid remote base_url")?;
    let gate = TcpProbeGate::for_base_url(&base_url, config.sync.probe_timeout())
        .context("Invalid remote base_url")?;
    Ok(Gate::Tcp(gate))
}

/// Open the local store.
pub async fn open_store(config: &Config, data_dir: &Path) -> Result<Arc<SqliteStore>> {
    let path = config.database_path(data_dir);
    let store = SqliteStore::open(&path)
        .await
        .with_context(|| format!("Failed to open database {}", path.display()))?;
    Ok(Arc::new(store))
}

/// Open the store and wire a queue around it.
pub async fn open_queue(config: &Config, data_dir: &Path, mock: bool) -> Result<Queue> {
    let store = open_store(config, data_dir).await?;
    let submitter = build_submitter(config, mock)?;
    let gate = build_gate(config, mock)?;
    Ok(TransactionQueue::new(store, submitter, gate))
}
