//! hello-api service binary.
//!
//! Serves the embedded contract on `0.0.0.0:8081` by default. Any startup
//! failure (invalid contract, missing handler, occupied port) exits with
//! status 1 before the listener accepts a single connection.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use portico::prelude::{init_logging, Contract, LogConfig, Server, ServerConfig};
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "hello-api", version, about = "Contract-driven hello service")]
struct Args {
    /// Address to bind.
    #[arg(long, default_value = "0.0.0.0:8081")]
    addr: String,

    /// Contract file overriding the embedded one.
    #[arg(long)]
    contract: Option<PathBuf>,

    /// Seconds to wait for in-flight requests on shutdown.
    #[arg(long, default_value_t = 30)]
    drain_timeout: u64,

    /// Human-readable debug logging instead of JSON.
    #[arg(long)]
    dev: bool,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        error!(error = %format!("{err:#}"), "fatal");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_config = if args.dev {
        LogConfig::development()
    } else {
        LogConfig::production()
    };
    init_logging(&log_config)?;

    let contract = match &args.contract {
        Some(path) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("reading contract file {}", path.display()))?;
            Contract::from_slice(&bytes)
                .with_context(|| format!("loading contract file {}", path.display()))?
        }
        None => hello_api::contract().context("loading embedded contract")?,
    };
    info!(
        contract = contract.name(),
        version = contract.version(),
        operations = contract.operations().len(),
        "contract loaded"
    );

    let registry = hello_api::handlers::registry().context("registering handlers")?;

    let config = ServerConfig::builder()
        .bind_addr(&args.addr)
        .drain_timeout(Duration::from_secs(args.drain_timeout))
        .build();

    Server::new(config, contract, registry)
        .run()
        .await
        .context("serving")?;

    Ok(())
}
