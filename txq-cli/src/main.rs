//! # txq
//!
//! Offline-first transaction queue from the command line.
//!
//! ## Commands
//!
//! - `create`: Queue a transaction locally (no network)
//! - `list` / `pending`: Show stored transactions
//! - `delete`: Remove a transaction by id
//! - `sync`: Run one sync pass against the remote
//! - `watch`: Sync on an interval until interrupted
//! - `status`: Show queue counts and remote reachability
//! - `serve`: Run a stub remote endpoint for demos
//!
//! ## Example
//!
//! ```bash
//! # Start a stub remote that rejects anything above 500
//! txq serve --reject-above 500
//!
//! # Queue transactions while offline
//! txq create 12.50 +254700000001
//! txq create 900 +254700000002
//!
//! # Deliver them
//! txq sync
//! txq list
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use txq_types::{Decimal, TransactionId, TransactionStatus};

mod commands;
mod config;
mod remote;

use commands::{create, delete, list, serve, status, sync, watch};
use config::{Config, CONFIG_FILE};

/// Offline-first transaction queue.
#[derive(Parser, Debug)]
#[command(name = "txq")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Config file (default: txq.toml in the data directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory for the transaction database
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use a mock remote that accepts everything (for testing/demo)
    #[arg(long, global = true)]
    mock: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Queue a new transaction
    Create {
        /// Amount, e.g. 12.50
        amount: Decimal,

        /// Counterparty identifier (phone number)
        counterparty: String,
    },

    /// List stored transactions
    List {
        /// Only this counterparty
        #[arg(long, short)]
        counterparty: Option<String>,

        /// Only this status (pending, successful, failed)
        #[arg(long, short)]
        status: Option<TransactionStatus>,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// List transactions not yet delivered
    Pending {
        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a transaction
    Delete {
        /// Transaction id
        id: i64,
    },

    /// Run one sync pass
    Sync {
        /// Print the pass report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sync on an interval until Ctrl-C
    Watch {
        /// Seconds between passes (default: from config)
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Show queue and remote status
    Status,

    /// Run a stub remote endpoint
    Serve {
        /// Bind address (default: from config)
        #[arg(long)]
        bind: Option<String>,

        /// Reject amounts above this value (default: from config)
        #[arg(long)]
        reject_above: Option<Decimal>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so command output stays scriptable
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };

    tokio::fs::create_dir_all(&data_dir)
        .await
        .context("Failed to create data directory")?;

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load_or_default(&data_dir.join(CONFIG_FILE))?,
    };

    match cli.command {
        Commands::Create {
            amount,
            counterparty,
        } => {
            let queue = remote::open_queue(&config, &data_dir, cli.mock).await?;
            create::run(&queue, amount, &counterparty).await?;
        }
        Commands::List {
            counterparty,
            status,
            json,
        } => {
            let queue = remote::open_queue(&config, &data_dir, cli.mock).await?;
            list::run(&queue, counterparty.as_deref(), status, json).await?;
        }
        Commands::Pending { json } => {
            let queue = remote::open_queue(&config, &data_dir, cli.mock).await?;
            list::pending(&queue, json).await?;
        }
        Commands::Delete { id } => {
            let queue = remote::open_queue(&config, &data_dir, cli.mock).await?;
            delete::run(&queue, TransactionId::new(id)).await?;
        }
        Commands::Sync { json } => {
            let queue = remote::open_queue(&config, &data_dir, cli.mock).await?;
            sync::run(&queue, json).await?;
        }
        Commands::Watch { interval } => {
            let queue = remote::open_queue(&config, &data_dir, cli.mock).await?;
            let interval = interval
                .map(Duration::from_secs)
                .unwrap_or_else(|| config.sync.interval());
            watch::run(queue, interval).await?;
        }
        Commands::Status => {
            status::run(&config, &data_dir, cli.mock).await?;
        }
        Commands::Serve { bind, reject_above } => {
            let bind = bind.unwrap_or_else(|| config.serve.bind_address.clone());
            serve::run(&bind, reject_above.or(config.serve.reject_above)).await?;
        }
    }

    Ok(())
}

/// Get the default data directory for txq.
fn default_data_dir() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("io", "offline-txq", "txq")
        .context("Could not determine home directory")?;
    Ok(dirs.data_dir().to_path_buf())
}
