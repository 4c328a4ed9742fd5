//! Ethereum JSON-RPC client for execution block retrieval.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tokio::time::Instant;
use tracing::{debug, info};
use validator_api_telemetry::{endpoint_host, Metrics};

use crate::{ExecutionAdapter, ExecutionBlock, ExecutionError, ExecutionResult};

/// Ethereum RPC client wrapper.
pub struct RpcClient {
    client: Client,
    rpc_url: String,
    metrics: Metrics,
}

impl RpcClient {
    /// Create a new RPC client.
    ///
    /// # Arguments
    /// * `rpc_url` - HTTP/HTTPS JSON-RPC endpoint URL
    /// * `timeout` - Applied to every outbound request
    /// * `metrics` - Metrics collector
    pub fn new(rpc_url: &str, timeout: Duration, metrics: Metrics) -> ExecutionResult<Self> {
        info!("Initialized RPC client for {}", endpoint_host(rpc_url));

        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            rpc_url: rpc_url.to_string(),
            metrics,
        })
    }

    async fn call_rpc(&self, method: &str, params: Value) -> ExecutionResult<Value> {
        let payload = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        let response = self.client
            .post(&self.rpc_url)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ExecutionError::Status(response.status().as_u16()));
        }

        let body = response.bytes().await?;
        let mut result: Value = serde_json::from_slice(&body)?;

        if let Some(error) = result.get("error") {
            return Err(ExecutionError::Rpc(error.to_string()));
        }

        Ok(result.get_mut("result").map(Value::take).unwrap_or(Value::Null))
    }

    async fn fetch_block(&self, block_number: u64) -> ExecutionResult<ExecutionBlock> {
        let hex_block = format!("0x{:x}", block_number);
        let result = self.call_rpc("eth_getBlockByNumber", json!([hex_block, true])).await?;

        if result.is_null() {
            return Err(ExecutionError::BlockNotFound(block_number));
        }

        let block: ExecutionBlock = serde_json::from_value(result)?;
        debug!(
            "Fetched block {} ({}) with {} transactions",
            block_number,
            block.number.as_deref().unwrap_or("no number"),
            block.transactions.len()
        );
        Ok(block)
    }
}

#[async_trait]
impl ExecutionAdapter for RpcClient {
    async fn get_block_by_number(&self, block_number: u64) -> ExecutionResult<ExecutionBlock> {
        let start = Instant::now();
        // reqwest errors embed the full URL, which may carry a provider key
        let result = self.fetch_block(block_number).await.map_err(|e| match e {
            ExecutionError::Network(e) => ExecutionError::Network(e.without_url()),
            e => e,
        });
        let duration = start.elapsed().as_secs_f64();
        self.metrics.observe_upstream_latency("get_execution_block", duration);
        if result.is_err() {
            self.metrics.inc_upstream_errors();
        }
        result
    }
}
