//! Sidequest daemon — entry point for running the lifecycle engine.

use clap::Parser;
use sidequest_node::{NodeConfig, SidequestNode};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sidequest-daemon", about = "Sidequest lifecycle engine daemon")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings are
    /// used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON-RPC endpoint of the ledger node.
    #[arg(long, env = "SIDEQUEST_LEDGER_RPC_URL")]
    ledger_rpc_url: Option<String>,

    /// The escrow program's address.
    #[arg(long, env = "SIDEQUEST_PROGRAM_ADDRESS")]
    program_address: Option<String>,

    /// Hex-encoded 32-byte seed for the settlement identity.
    #[arg(long, env = "SIDEQUEST_SETTLEMENT_KEY")]
    settlement_key: Option<String>,

    /// Shared secret for webhook re-trigger signatures.
    #[arg(long, env = "SIDEQUEST_WEBHOOK_SECRET")]
    webhook_secret: Option<String>,

    /// Seconds between crank runs.
    #[arg(long, env = "SIDEQUEST_CRANK_INTERVAL_SECS")]
    crank_interval_secs: Option<u64>,

    /// Log format: "human" or "json".
    #[arg(long, default_value = "human", env = "SIDEQUEST_LOG_FORMAT")]
    log_format: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.log_format == "json" {
        sidequest_utils::logging::init_tracing_json();
    } else {
        sidequest_utils::init_tracing();
    }

    let base = match &cli.config {
        Some(path) => {
            let cfg = NodeConfig::from_toml_file(&path.display().to_string())?;
            tracing::info!("loaded config from {}", path.display());
            cfg
        }
        None => NodeConfig::default(),
    };

    let config = NodeConfig {
        ledger_rpc_url: cli.ledger_rpc_url.unwrap_or(base.ledger_rpc_url),
        program_address: cli.program_address.unwrap_or(base.program_address),
        settlement_key_hex: cli.settlement_key.unwrap_or(base.settlement_key_hex),
        webhook_secret: cli.webhook_secret.unwrap_or(base.webhook_secret),
        crank_interval_secs: cli.crank_interval_secs.unwrap_or(base.crank_interval_secs),
        log_format: cli.log_format,
        ..base
    };

    tracing::info!(
        ledger = %config.ledger_rpc_url,
        program = %config.program_address,
        crank_interval_secs = config.crank_interval_secs,
        "starting sidequest node"
    );

    let mut node = SidequestNode::new(config)?;
    node.start()?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received, stopping node");
    node.stop().await;

    tracing::info!("sidequest daemon exited cleanly");
    Ok(())
}
