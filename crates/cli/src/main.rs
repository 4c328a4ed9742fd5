//! CLI application for the validator rewards API.

mod server;

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::info;
use validator_api_beacon::{BeaconAdapter, HttpBeaconClient};
use validator_api_execution::RpcClient;
use validator_api_heuristics::RelayClassifier;
use validator_api_rewards::{RewardService, SyncDutiesService};
use validator_api_telemetry::{init_logging, Metrics};

use crate::server::AppState;

#[derive(Parser)]
#[command(name = "validator-api")]
#[command(about = "Block reward attribution and sync duty lookups for Ethereum validators")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Beacon node REST base URL
        #[arg(long, env = "BEACON_NODE_URL")]
        beacon_url: String,

        /// Execution JSON-RPC URL (defaults to the beacon node URL)
        #[arg(long, env = "EXECUTION_RPC_URL")]
        execution_rpc_url: Option<String>,

        /// Address to bind the HTTP server to
        #[arg(long, env = "BIND_ADDRESS", default_value = "0.0.0.0:8080")]
        bind_address: String,

        /// Timeout for each upstream request, in seconds
        #[arg(long, env = "REQUEST_TIMEOUT_SECONDS", default_value = "30")]
        request_timeout_seconds: u64,

        /// Relay name fragment to look for in block extra data (repeatable)
        #[arg(long = "relay", env = "KNOWN_RELAYS", value_delimiter = ',')]
        relays: Vec<String>,

        /// Log level
        #[arg(long, env = "LOG_LEVEL")]
        log_level: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            beacon_url,
            execution_rpc_url,
            bind_address,
            request_timeout_seconds,
            relays,
            log_level,
        } => {
            init_logging(log_level.as_deref())?;
            let execution_rpc_url = execution_rpc_url.unwrap_or_else(|| beacon_url.clone());
            run_server(
                &beacon_url,
                &execution_rpc_url,
                &bind_address,
                Duration::from_secs(request_timeout_seconds),
                relays,
            )
            .await?;
        }
    }

    Ok(())
}

async fn run_server(
    beacon_url: &str,
    execution_rpc_url: &str,
    bind_address: &str,
    timeout: Duration,
    relays: Vec<String>,
) -> anyhow::Result<()> {
    info!("Starting validator rewards API");

    let classifier = if relays.is_empty() {
        RelayClassifier::default()
    } else {
        RelayClassifier::new(&relays)
    };
    info!("Classifying relays by extra data fragments {:?}", classifier.relays());

    let metrics = Metrics::new()?;
    let beacon: Arc<dyn BeaconAdapter> =
        Arc::new(HttpBeaconClient::new(beacon_url, timeout, metrics.clone())?);
    let execution = Arc::new(RpcClient::new(execution_rpc_url, timeout, metrics.clone())?);

    let state = AppState {
        rewards: Arc::new(RewardService::new(
            beacon.clone(),
            execution,
            classifier,
            metrics.clone(),
        )),
        duties: Arc::new(SyncDutiesService::new(beacon)),
        metrics,
    };

    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    info!("API server listening on http://{}", bind_address);

    axum::serve(listener, server::router(state)).await?;

    Ok(())
}
