//! Execution-layer JSON-RPC access for the validator rewards API.

pub mod quantity;
pub mod rpc_client;
pub mod types;

use async_trait::async_trait;

pub use quantity::{hex_to_u64, HexError};
pub use rpc_client::RpcClient;
pub use types::{ExecutionBlock, Transaction};

/// Error type for execution RPC operations.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("failed to send RPC request: {0}")]
    Network(#[from] reqwest::Error),
    #[error("RPC request failed with status: {0}")]
    Status(u16),
    #[error("failed to decode RPC response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("RPC error: {0}")]
    Rpc(String),
    #[error("block {0} not found")]
    BlockNotFound(u64),
}

pub type ExecutionResult<T> = Result<T, ExecutionError>;

/// Source of execution-layer blocks.
#[async_trait]
pub trait ExecutionAdapter: Send + Sync {
    /// Get a block by number with full transaction objects.
    async fn get_block_by_number(&self, block_number: u64) -> ExecutionResult<ExecutionBlock>;
}
